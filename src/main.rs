use clap::Parser;
use std::path::PathBuf;

use stackcrop::{AggregationMode, DetectionParams, DetectionPipeline, Pipeline};

#[derive(Parser)]
#[command(name = "stackcrop")]
#[command(about = "Segment an image stack and crop it to the centered object")]
struct Cli {
    /// Path to input multi-page TIFF
    #[arg(value_name = "STACK")]
    input: PathBuf,

    /// Directory receiving the outputs
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    work_dir: PathBuf,

    /// Output base name; `_seg.tif` and `_crop.tif` are appended to its stem
    #[arg(short, long, value_name = "NAME")]
    output: Option<PathBuf>,

    /// JSON file with detection parameters
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Crop margin in pixels
    #[arg(short, long)]
    margin: Option<u32>,

    /// Seed for the threshold solver
    #[arg(long)]
    seed: Option<u64>,

    /// Skip frames without a detectable region instead of failing
    #[arg(long)]
    lenient: bool,

    /// Do not write output files
    #[arg(long)]
    no_save: bool,

    /// Save overlay images to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let level = if args.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut params = match &args.config {
        Some(path) => DetectionParams::from_json_file(path)?,
        None => DetectionParams::default(),
    };
    if let Some(margin) = args.margin {
        params.margin = margin;
    }
    if args.seed.is_some() {
        params.seed = args.seed;
    }
    if args.lenient {
        params.mode = AggregationMode::Lenient;
    }

    let mut pipeline = Pipeline::new(DetectionPipeline::with_params(params)).with_save(!args.no_save);
    if let Some(dir) = args.debug_out {
        pipeline = pipeline.with_debug(dir)?;
    }

    let summary = pipeline.run_file(&args.input, &args.work_dir, args.output.as_deref())?;

    let (depth, height, width) = summary.shape;
    println!("Input: {depth} frames of {width}x{height}");
    println!("Bounding box: {:?}", summary.bbox.as_tuple());
    println!("Crop window: {:?}", summary.window.as_tuple());
    let (depth, height, width) = summary.cropped_shape;
    println!("Cropped: {depth} frames of {width}x{height}");

    let skipped: Vec<usize> = summary
        .report
        .frame_boxes
        .iter()
        .enumerate()
        .filter(|(_, b)| b.is_none())
        .map(|(i, _)| i)
        .collect();
    if !skipped.is_empty() {
        println!("Frames without a region: {skipped:?}");
    }
    if let Some(thresholds) = &summary.report.thresholds {
        println!("Thresholds: {thresholds:?}");
    }
    if let Some(paths) = &summary.outputs {
        println!("Segmented: {}", paths.segmented.display());
        println!("Cropped:   {}", paths.cropped.display());
    }

    Ok(())
}
