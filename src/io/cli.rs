//! Command-line interface: region selection, blending and image comparison

use std::path::{Path, PathBuf};
use std::sync::mpsc::RecvTimeoutError;
use std::time::{Duration, Instant};

use clap::{ArgAction, Args, Parser, Subcommand};
use image::RgbaImage;

use crate::algorithm::compositor::merge_patch;
use crate::algorithm::executor::{BlendOutcome, SolverConfig, Status};
use crate::algorithm::problem::BlendProblem;
use crate::algorithm::worker::BlendWorker;
use crate::analysis::similarity::Similarity;
use crate::io::configuration::{
    DEFAULT_MAX_ITERATIONS, DEFAULT_METHOD, DEFAULT_TOLERANCE, PROGRESS_TICK_MS,
};
use crate::io::error::{Result, config_error};
use crate::io::image::{default_output_path, extract_patch, load_rgba, save_rgba};
use crate::io::logger;
use crate::io::progress::ProgressManager;
use crate::io::region::{Region, load_polygon, load_region, save_region};
use crate::spatial::border::densify_border;
use crate::spatial::mask::{Selection, build_mask};

#[derive(Parser)]
#[command(name = "poissonblend")]
#[command(
    author,
    version,
    about = "Seamlessly blend a selected source region into a target image"
)]
/// Command-line arguments for the blending tool
pub struct Cli {
    /// Operation to run
    #[command(subcommand)]
    pub command: Command,

    /// Suppress progress output and all logging below errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log detail (repeat for more)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// Available operations
#[derive(Subcommand)]
pub enum Command {
    /// Cut a polygon selection out of a source image and store it as a region
    Select(SelectArgs),
    /// Blend a region into a target image
    Blend(BlendArgs),
    /// Print similarity metrics between two images
    Compare(CompareArgs),
}

/// Arguments of `select`
#[derive(Args)]
pub struct SelectArgs {
    /// Image the selection is cut from
    #[arg(short, long)]
    pub source: PathBuf,

    /// Polygon vertices, one `x y` pair per line
    #[arg(short, long)]
    pub polygon: PathBuf,

    /// Region file to write (patch and mask are stored beside it)
    #[arg(short, long)]
    pub output: PathBuf,
}

/// Arguments of `blend`
#[derive(Args)]
pub struct BlendArgs {
    /// Image the selection is blended into
    #[arg(short, long)]
    pub target: PathBuf,

    /// Previously saved region
    #[arg(short, long, conflicts_with_all = ["source", "polygon"], required_unless_present = "source")]
    pub region: Option<PathBuf>,

    /// Source image, used together with --polygon instead of --region
    #[arg(short, long, requires = "polygon")]
    pub source: Option<PathBuf>,

    /// Polygon vertices on the source image
    #[arg(short, long, requires = "source")]
    pub polygon: Option<PathBuf>,

    /// Translation `DX,DY` applied to the selection before blending
    #[arg(long, value_parser = parse_offset, allow_hyphen_values = true, default_value = "0,0")]
    pub offset: (i32, i32),

    /// Relaxation method: JACOBI, GS, SOR, AOR, TOR or RGS
    #[arg(short, long, default_value = DEFAULT_METHOD)]
    pub method: String,

    /// Positional relaxation parameter (w, r, s, t); repeat as needed
    #[arg(long = "param", allow_hyphen_values = true)]
    pub params: Vec<String>,

    /// Residual at which relaxation stops
    #[arg(long, default_value_t = DEFAULT_TOLERANCE)]
    pub tolerance: f64,

    /// Iterations allowed before reporting divergence
    #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    pub max_iterations: usize,

    /// Cancel the solve after this many seconds and keep the partial result
    #[arg(long, value_name = "SECS")]
    pub time_limit: Option<f64>,

    /// Output image (defaults to `<target>_blended.png`)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments of `compare`
#[derive(Args)]
pub struct CompareArgs {
    /// Reference image
    pub reference: PathBuf,

    /// Image compared against the reference
    pub test: PathBuf,
}

/// Result of a `blend` run
#[derive(Debug)]
pub struct BlendReport {
    /// Solver outcome
    pub outcome: BlendOutcome,
    /// Where the composited image was written
    pub output: PathBuf,
}

impl Cli {
    /// Install logging and run the selected command
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails
    // Allow print for user-facing reports
    #[allow(clippy::print_stdout)]
    pub fn execute(&self) -> Result<()> {
        logger::init(logger::level_for(self.quiet, self.verbose));

        match &self.command {
            Command::Select(args) => {
                let selection = select(args)?;
                println!(
                    "Saved region {} ({} border points, {} interior pixels)",
                    args.output.display(),
                    selection.border.len(),
                    selection.area.len()
                );
            }
            Command::Blend(args) => {
                let report = blend(args, self.quiet)?;
                println!("{}", report.outcome.summary());
                println!("Saved: {}", report.output.display());
            }
            Command::Compare(args) => {
                println!("{}", compare(args)?);
            }
        }
        Ok(())
    }
}

/// Parse a `DX,DY` offset
///
/// # Errors
///
/// Returns a message if the text is not two comma-separated integers
pub fn parse_offset(text: &str) -> std::result::Result<(i32, i32), String> {
    let (dx, dy) = text
        .split_once(',')
        .ok_or_else(|| format!("expected DX,DY, found '{text}'"))?;
    let parse = |value: &str| {
        value
            .trim()
            .parse::<i32>()
            .map_err(|e| format!("'{value}': {e}"))
    };
    Ok((parse(dx)?, parse(dy)?))
}

/// Cut the polygon selection out of the source image and save the region
///
/// # Errors
///
/// Returns an error if an input cannot be read, the polygon is degenerate on
/// the source canvas, or the region cannot be written
pub fn select(args: &SelectArgs) -> Result<Selection> {
    let source = load_rgba(&args.source)?;
    let region = cut_region(&source, &args.polygon)?;
    save_region(&args.output, &region.selection, &region.patch)?;
    Ok(region.selection)
}

/// Build the selection and patch for a polygon drawn on `source`
///
/// # Errors
///
/// Returns an error if the polygon file cannot be read or is degenerate on
/// the source canvas
pub fn cut_region(source: &RgbaImage, polygon_path: &Path) -> Result<Region> {
    let polygon = load_polygon(polygon_path)?;
    let border = densify_border(&polygon);
    let (_, selection) = build_mask(
        &border,
        source.width() as usize,
        source.height() as usize,
    )?;
    let patch = extract_patch(source, &selection)?;
    Ok(Region { selection, patch })
}

/// Assemble the blend problem described by `args` on `target`
///
/// # Errors
///
/// Returns an error if the region or source cannot be loaded, or the
/// translated selection does not fit the target
pub fn prepare_problem(args: &BlendArgs, target: &RgbaImage) -> Result<BlendProblem> {
    let region = match (&args.region, &args.source, &args.polygon) {
        (Some(region), _, _) => load_region(region)?,
        (None, Some(source), Some(polygon)) => cut_region(&load_rgba(source)?, polygon)?,
        _ => {
            return Err(config_error(
                "region",
                &"<none>",
                &"either a region or a source image with a polygon is required",
            ));
        }
    };

    let (dx, dy) = args.offset;
    let selection = region.selection.translated(dx, dy)?;
    BlendProblem::from_selection(selection, &region.patch, target)
}

/// Run the `blend` command
///
/// # Errors
///
/// Returns an error if the configuration is invalid, an input cannot be
/// loaded, the solver diverges or the output cannot be saved
pub fn blend(args: &BlendArgs, quiet: bool) -> Result<BlendReport> {
    let config = SolverConfig::from_arguments(
        &args.method,
        &args.params,
        args.tolerance,
        args.max_iterations,
    )?;
    let time_limit = args
        .time_limit
        .map(|seconds| {
            Duration::try_from_secs_f64(seconds)
                .map_err(|e| config_error("time_limit", &seconds, &e))
        })
        .transpose()?;

    let target = load_rgba(&args.target)?;
    let problem = prepare_problem(args, &target)?;
    let origin = problem.origin();

    let progress = (!quiet).then(|| ProgressManager::new(&config.method.to_string()));
    let worker = BlendWorker::spawn(problem, config)?;
    let deadline = time_limit.map(|limit| Instant::now() + limit);
    let mut cancelled = false;

    loop {
        match worker
            .records()
            .recv_timeout(Duration::from_millis(PROGRESS_TICK_MS))
        {
            Ok(record) => {
                if let Some(ref pm) = progress {
                    pm.update(&record);
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
        if !cancelled && deadline.is_some_and(|d| Instant::now() >= d) {
            log::warn!("time limit reached, cancelling");
            worker.cancel();
            cancelled = true;
        }
    }

    let outcome = match worker.join() {
        Ok(outcome) => outcome,
        Err(e) => {
            if let Some(ref pm) = progress {
                pm.abandon();
            }
            return Err(e);
        }
    };
    if let Some(ref pm) = progress {
        pm.finish();
    }
    if outcome.status == Status::Cancelled {
        log::warn!("saving the partial result of a cancelled run");
    }

    let mut canvas = target;
    merge_patch(&mut canvas, &outcome.patch, origin);
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.target));
    save_rgba(&canvas, &output)?;

    Ok(BlendReport { outcome, output })
}

/// Run the `compare` command
///
/// # Errors
///
/// Returns an error if an image cannot be loaded or the sizes differ
pub fn compare(args: &CompareArgs) -> Result<Similarity> {
    let reference = load_rgba(&args.reference)?;
    let test = load_rgba(&args.test)?;
    Similarity::compare(&reference, &test)
}
