use anyhow::{Context, Result};
use clap::Parser;
use color_labeler::{AnalysisConfig, DecodeFailurePolicy};
use std::path::PathBuf;
use tracing::Level;

/// Label every image in a directory with the names of its average and dominant colors.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Number of k-means clusters used to find the dominant color
    num_clusters: usize,

    /// Directory containing the images to label
    picture_directory: PathBuf,

    /// Reference color file, one `<name> <R> <G> <B>` per line
    target_color_file: PathBuf,

    /// Where to write the CSV output
    csv_file: PathBuf,

    /// JSON file with analysis settings; command line options take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for k-means initialization, for reproducible dominant colors
    #[arg(long)]
    seed: Option<u64>,

    /// Independent k-means runs per image
    #[arg(long)]
    attempts: Option<usize>,

    /// Iteration limit of a single k-means run
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Centroid movement below which k-means has converged
    #[arg(long)]
    epsilon: Option<f64>,

    /// Accepted file name suffix, case-sensitive. May be repeated; replaces the defaults
    #[arg(short = 'e', long = "extension")]
    extensions: Vec<String>,

    /// Skip images that cannot be decoded instead of aborting the batch
    #[arg(long)]
    skip_undecodable: bool,

    /// Number of images analyzed in parallel
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    /// Log every k-means attempt
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn analysis_config(&self) -> Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::from_json_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => AnalysisConfig::default(),
        };

        config.clusters = self.num_clusters;

        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }

        if let Some(attempts) = self.attempts {
            config.attempts = attempts;
        }

        if let Some(max_iterations) = self.max_iterations {
            config.max_iterations = max_iterations;
        }

        if let Some(epsilon) = self.epsilon {
            config.epsilon = epsilon;
        }

        if !self.extensions.is_empty() {
            config.extensions = self.extensions.clone();
        }

        if self.skip_undecodable {
            config.on_decode_error = DecodeFailurePolicy::Skip;
        }

        if let Some(threads) = self.threads {
            config.threads = threads;
        }

        Ok(config)
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = args.analysis_config()?;
    let report = color_labeler::label_directory(
        &args.picture_directory,
        &args.target_color_file,
        &args.csv_file,
        config,
    )
    .context("labeling failed")?;

    tracing::info!(
        labeled = report.results.len(),
        skipped = report.failures.len(),
        output = %args.csv_file.display(),
        "Done"
    );

    Ok(())
}
