use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context};
use clap::Parser;
use env_logger::{Builder, Env};
use log::{error, info, warn, LevelFilter};
use rayon::prelude::*;

use leaf_saliency_rust_lib::{
    check_unique_output_names, get_image_files_in_dir, load_image, load_image_under,
    process_image, write_severity_csv, Config, Diagnosis, ScanRecord,
};

/// Command-line arguments
#[derive(Parser, Debug)]
#[clap(author, version, about = "LeafSaliency - Disease heatmaps and severity for leaf photographs")]
struct Args {
    /// Path to input file or directory
    #[clap(short, long)]
    input: Option<String>,

    /// Path to output directory
    #[clap(short, long)]
    output: Option<String>,

    /// Path to configuration file
    #[clap(short, long, default_value = "config.toml")]
    config: String,

    /// Diagnosis label applied to every input (overwrites config)
    #[clap(long)]
    diagnosis: Option<String>,

    /// Seed for severity jitter and healthy noise (overwrites config)
    #[clap(long)]
    seed: Option<u64>,

    /// Enable debug mode (save intermediate maps and log more)
    #[clap(short, long)]
    debug: bool,
}

fn init_logging(debug: bool) {
    // RUST_LOG wins when set; otherwise --debug picks the level
    let mut logger = if std::env::var_os("RUST_LOG").is_some() {
        Builder::from_env(Env::default())
    } else {
        let mut b = Builder::new();
        b.filter_level(if debug { LevelFilter::Debug } else { LevelFilter::Info });
        b
    };
    logger.init();
}

fn load_config(path: &str) -> anyhow::Result<Config> {
    if Path::new(path).exists() {
        Config::from_file(path).with_context(|| format!("loading config from {}", path))
    } else {
        warn!("Config file {} not found, using defaults", path);
        Ok(Config::default())
    }
}

fn process_path(path: &Path, root: &Path, config: &Config, debug: bool) -> Option<ScanRecord> {
    info!("Processing: {}", path.display());
    match load_image_under(path, root).and_then(|input_image| process_image(input_image, config, debug)) {
        Ok(record) => Some(record),
        Err(e) => {
            error!("Error processing {}: {}", path.display(), e);
            None
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    let mut config = load_config(&args.config)?;

    // Override config with command-line arguments
    if let Some(input) = args.input.clone() {
        config.input_path = input;
    }

    if let Some(output) = args.output.clone() {
        config.output_base_dir = output;
    }

    if let Some(diagnosis) = args.diagnosis.clone() {
        config.diagnosis_label = diagnosis;
    }

    if args.seed.is_some() {
        config.heatmap.seed = args.seed;
    }

    config.validate().context("invalid configuration")?;

    info!(
        "Diagnosis label '{}' treated as {}",
        config.diagnosis_label,
        Diagnosis::from_label(&config.diagnosis_label)
    );

    let start_time = Instant::now();
    let input_path = PathBuf::from(&config.input_path);

    let records: Vec<ScanRecord> = if input_path.is_file() {
        info!("Processing single file: {}", input_path.display());
        let input_image = load_image(&input_path)
            .with_context(|| format!("loading {}", input_path.display()))?;
        vec![process_image(input_image, &config, args.debug)?]
    } else if input_path.is_dir() {
        info!("Processing directory: {}", input_path.display());
        let image_files = get_image_files_in_dir(&input_path)?;
        info!("Found {} image files", image_files.len());
        check_unique_output_names(&image_files, &input_path)?;

        if config.use_parallel {
            image_files
                .par_iter()
                .filter_map(|path| process_path(path, &input_path, &config, args.debug))
                .collect()
        } else {
            image_files
                .iter()
                .filter_map(|path| process_path(path, &input_path, &config, args.debug))
                .collect()
        }
    } else {
        bail!("Invalid input path: {}", input_path.display());
    };

    let csv_path = write_severity_csv(&records, &config.output_base_dir)?;
    info!("Wrote {} rows to {}", records.len(), csv_path.display());

    let elapsed = start_time.elapsed();
    info!("Processing completed in {:.2} seconds", elapsed.as_secs_f64());

    Ok(())
}
