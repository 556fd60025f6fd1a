use clap::{Parser, Subcommand};
use std::path::PathBuf;

use filtersnap::config::AppConfig;
use filtersnap::db::PredictionDb;
use filtersnap::detect::labels::ClassNames;
use filtersnap::detect::runner::CommandDetector;
use filtersnap::imaging::steps::{FilterSpec, build_pipeline};
use filtersnap::storage::FsObjectStore;
use filtersnap::{Img, PredictService};

#[derive(Parser)]
#[command(name = "filtersnap")]
#[command(about = "Apply pixel filters to images and run object detection on them")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a chain of filters to an image and save it with a _filtered suffix
    Filter {
        /// Path to input image file
        #[arg(value_name = "IMAGE")]
        image_path: PathBuf,

        /// Filters to apply in order, e.g. blur=8 rotate segment concat=side.png:horizontal
        #[arg(value_name = "FILTER", required = true)]
        filters: Vec<FilterSpec>,

        /// Save debug outputs to directory (must be empty)
        #[arg(long, value_name = "DIR")]
        debug_out: Option<PathBuf>,
    },

    /// Run the detection flow for an image already uploaded to the store
    Predict {
        /// Object key of the uploaded image
        #[arg(value_name = "IMG_NAME")]
        img_name: String,

        /// Root directory of the object store
        #[arg(long, value_name = "DIR")]
        store_root: PathBuf,

        /// Bucket holding originals and annotated results
        #[arg(long)]
        bucket: String,

        /// Working directory for downloaded images and run outputs
        #[arg(long, value_name = "DIR")]
        workspace: PathBuf,

        /// Model weights passed to the detector
        #[arg(long, value_name = "FILE")]
        weights: PathBuf,

        /// JSON class-name table
        #[arg(long, value_name = "FILE")]
        classes: PathBuf,

        /// External detector program
        #[arg(long, value_name = "CMD")]
        detector: PathBuf,

        /// SQLite file for prediction summaries (defaults to predictions.db
        /// in the workspace)
        #[arg(long, value_name = "FILE")]
        db: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Filter {
            image_path,
            filters,
            debug_out,
        } => run_filter(image_path, filters, debug_out, cli.verbose),
        Commands::Predict {
            img_name,
            store_root,
            bucket,
            workspace,
            weights,
            classes,
            detector,
            db,
        } => {
            let config = AppConfig {
                bucket,
                db_file: db.unwrap_or_else(|| workspace.join("predictions.db")),
                workspace,
                weights,
                class_names_file: classes,
            };
            run_predict(config, store_root, detector, img_name).await
        }
    }
}

fn run_filter(
    image_path: PathBuf,
    filters: Vec<FilterSpec>,
    debug_out: Option<PathBuf>,
    verbose: bool,
) -> anyhow::Result<()> {
    if verbose {
        println!("Loading image: {:?}", image_path);
    }

    let mut img = Img::open(&image_path)?;
    if verbose {
        println!("Image loaded: {}x{}\n", img.height(), img.width());
    }

    let mut pipeline = build_pipeline(filters, verbose)?;
    if let Some(debug_dir) = debug_out {
        pipeline = pipeline.with_debug(debug_dir)?;
    }

    pipeline.run(&mut img)?;

    let saved = img.save()?;
    println!("Saved filtered image to {:?}", saved);
    Ok(())
}

async fn run_predict(
    config: AppConfig,
    store_root: PathBuf,
    detector: PathBuf,
    img_name: String,
) -> anyhow::Result<()> {
    let class_names = ClassNames::from_file(&config.class_names_file)?;
    let store = FsObjectStore::new(store_root);
    let detector = CommandDetector::new(detector);
    let repo = PredictionDb::new(&config.db_file).await?;

    let service = PredictService::new(&config, class_names, store, detector, repo);
    let summary = service.predict(&img_name).await?;

    println!(
        "Prediction {} processed successfully ({} objects)",
        summary.prediction_id,
        summary.labels.len()
    );
    print!("{}", summary.summary_text());
    Ok(())
}
