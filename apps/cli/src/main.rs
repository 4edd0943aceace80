// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Roof take-off CLI: drawn segments in, measurement report out.
//!
//! Each input file holds the segments drawn for one property. Faces are
//! extracted, accepted as structures A, B, C, ... in descending-area order,
//! and totalled. Files are processed in parallel.
//!
//! Usage:
//!   roof-takeoff <property.json>... [options]

use anyhow::{bail, Context, Result};
use rayon::prelude::*;
use roof_lite_takeoff::PitchRatio;
use std::env;
use std::io::Write;
use std::path::PathBuf;

mod config;
mod property;

use config::Config;

struct Args {
    inputs: Vec<PathBuf>,
    output: Option<PathBuf>,
    pitch_override: Option<PitchRatio>,
    compact: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,roof_lite_geometry=debug".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::from_env();
    let Some(args) = parse_args(env::args().skip(1).collect(), &mut config)? else {
        print_usage();
        return Ok(());
    };

    tracing::info!(
        files = args.inputs.len(),
        frame = ?config.frame,
        worker_threads = config.worker_threads,
        "Starting roof take-off"
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.worker_threads)
        .build()
        .context("failed to build worker pool")?;

    let reports = pool.install(|| {
        args.inputs
            .par_iter()
            .map(|path| {
                let input = property::load(path)?;
                property::process(&input, &config, args.pitch_override)
            })
            .collect::<Result<Vec<_>>>()
    })?;

    let json = match (reports.as_slice(), args.compact) {
        ([single], false) => serde_json::to_string_pretty(single)?,
        ([single], true) => serde_json::to_string(single)?,
        (all, false) => serde_json::to_string_pretty(all)?,
        (all, true) => serde_json::to_string(all)?,
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("cannot write '{}'", path.display()))?;
            tracing::info!(output = %path.display(), "Report written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", json)?;
        }
    }
    Ok(())
}

/// Parse command-line options. `None` means help was requested.
fn parse_args(args: Vec<String>, config: &mut Config) -> Result<Option<Args>> {
    let mut parsed = Args {
        inputs: Vec::new(),
        output: None,
        pitch_override: None,
        compact: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        let mut value = |name: &str| iter.next().with_context(|| format!("{} needs a value", name));
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "--output" | "-o" => parsed.output = Some(PathBuf::from(value("--output")?)),
            "--pitch" => {
                parsed.pitch_override = Some(value("--pitch")?.parse().context("invalid --pitch")?)
            }
            "--frame" => {
                config.frame = value("--frame")?
                    .parse()
                    .map_err(|e| anyhow::anyhow!("invalid --frame: {}", e))?
            }
            "--min-face-area" => {
                config.min_face_area = value("--min-face-area")?
                    .parse()
                    .context("invalid --min-face-area")?
            }
            "--max-hops" => {
                config.max_hops = Some(value("--max-hops")?.parse().context("invalid --max-hops")?)
            }
            "--threads" => {
                config.worker_threads = value("--threads")?.parse().context("invalid --threads")?
            }
            "--compact" => parsed.compact = true,
            other if other.starts_with('-') => bail!("unknown option: {}", other),
            path => parsed.inputs.push(PathBuf::from(path)),
        }
    }

    if parsed.inputs.is_empty() {
        return Ok(None);
    }
    Ok(Some(parsed))
}

fn print_usage() {
    eprintln!("Usage: roof-takeoff <property.json>... [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -o, --output <path>      Write the report here instead of stdout");
    eprintln!("  --pitch <rise/run>       Apply one pitch to every structure in the totals");
    eprintln!("  --frame <wgs84|planar>   Coordinate frame for inputs that do not name one");
    eprintln!("  --min-face-area <m2>     Drop faces smaller than this (default: 1.0)");
    eprintln!("  --max-hops <n>           Hop limit per face trace");
    eprintln!("  --threads <n>            Worker threads (default: WORKER_THREADS or CPU count)");
    eprintln!("  --compact                Single-line JSON");
    eprintln!();
    eprintln!("Environment: ROOF_FRAME, ROOF_MIN_FACE_AREA, ROOF_MAX_HOPS,");
    eprintln!("  ROOF_EAVE_MAX_OFFSET_DEG, ROOF_RAKE_MIN_OFFSET_DEG, WORKER_THREADS, RUST_LOG");
}
