//! Labelreview: review shape labels of an image dataset.
//!
//! A label file lists images and the shapes labeled on them (boxes, splines,
//! boundaries and polygons) in original-image pixel coordinates. Labelreview
//! shows those shapes on a downscaled copy of each image, lets a reviewer
//! attach a verdict to every shape, and writes every change straight back to
//! the label file.
//!
//! # Modules
//!
//! - [`ir`]: label file schema, typed shapes and the widget payloads
//! - [`scale`]: mapping between original and display coordinates
//! - [`store`]: shapes of the image under review, with stable ids
//! - [`review`]: verdicts and the deletion policy
//! - [`session`]: navigation and write-through persistence
//! - [`validation`]: label file checks
//! - [`inspect`]: review progress reports
//! - [`error`]: error types

pub mod error;
pub mod inspect;
pub mod ir;
pub mod logging;
pub mod review;
pub mod scale;
pub mod session;
pub mod store;
pub mod validation;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

pub use error::ReviewError;

use crate::ir::ShapeId;
use crate::review::ErrorCode;
use crate::scale::{DisplayPolicy, RadiusScale, DEFAULT_MAX_DISPLAY};
use crate::session::{ImageSelector, ReviewSession, SessionOptions};

/// The labelreview CLI application.
#[derive(Parser)]
#[command(name = "labelreview")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Log progress at info level (overridden by RUST_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Validate a label file for errors and warnings.
    Validate(ValidateArgs),
    /// Report review progress per image, shape type and verdict.
    Inspect(InspectArgs),
    /// Print what the review widget would draw for one image, as JSON.
    Show(ShowArgs),
    /// Set the verdict of a shape.
    Review(ReviewArgs),
    /// Delete an Untagged shape.
    Delete(DeleteArgs),
}

/// Arguments for the validate subcommand.
#[derive(clap::Args)]
struct ValidateArgs {
    /// Label file to validate.
    input: PathBuf,

    /// Treat warnings as errors (exit non-zero if any warnings).
    #[arg(long)]
    strict: bool,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Arguments for the inspect subcommand.
#[derive(clap::Args)]
struct InspectArgs {
    /// Label file to inspect.
    input: PathBuf,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// How the display image is sized and where images live.
#[derive(clap::Args)]
struct DisplayArgs {
    /// Maximum display width in pixels.
    #[arg(long, env = "LABELREVIEW_MAX_WIDTH", default_value_t = DEFAULT_MAX_DISPLAY)]
    max_width: u32,

    /// Maximum display height in pixels.
    #[arg(long, env = "LABELREVIEW_MAX_HEIGHT", default_value_t = DEFAULT_MAX_DISPLAY)]
    max_height: u32,

    /// How spline and boundary radii are scaled.
    #[arg(long, value_enum, default_value_t = RadiusScale::Width)]
    radius_scale: RadiusScale,

    /// Directory holding the images (defaults to the label file's directory).
    #[arg(long, env = "LABELREVIEW_IMAGE_DIR")]
    image_dir: Option<PathBuf>,
}

impl DisplayArgs {
    fn session_options(&self) -> SessionOptions {
        SessionOptions {
            policy: DisplayPolicy {
                max_width: self.max_width,
                max_height: self.max_height,
                radius: self.radius_scale,
            },
            image_dir: self.image_dir.clone(),
        }
    }
}

/// Arguments for the show subcommand.
#[derive(clap::Args)]
struct ShowArgs {
    /// Label file to read.
    input: PathBuf,

    /// Image to show: zero-based position or file name.
    #[arg(long)]
    image: ImageSelector,

    #[command(flatten)]
    display: DisplayArgs,
}

/// Arguments for the review subcommand.
#[derive(clap::Args)]
struct ReviewArgs {
    /// Label file to update.
    input: PathBuf,

    /// Image holding the shape: zero-based position or file name.
    #[arg(long)]
    image: ImageSelector,

    /// Shape id.
    #[arg(long)]
    shape: u64,

    /// Verdict (Untagged, Correct, WrongLabel, WrongGeometry, WrongAttribute,
    /// FalsePositive, Duplicate, Other).
    #[arg(long)]
    code: ErrorCode,

    /// Free-text comment.
    #[arg(long, default_value = "")]
    comment: String,

    #[command(flatten)]
    display: DisplayArgs,
}

/// Arguments for the delete subcommand.
#[derive(clap::Args)]
struct DeleteArgs {
    /// Label file to update.
    input: PathBuf,

    /// Image holding the shape: zero-based position or file name.
    #[arg(long)]
    image: ImageSelector,

    /// Shape id.
    #[arg(long)]
    shape: u64,

    #[command(flatten)]
    display: DisplayArgs,
}

/// Run the labelreview CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), ReviewError> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Some(Commands::Validate(args)) => run_validate(args),
        Some(Commands::Inspect(args)) => run_inspect(args),
        Some(Commands::Show(args)) => run_show(args),
        Some(Commands::Review(args)) => run_review(args),
        Some(Commands::Delete(args)) => run_delete(args),
        None => {
            println!("labelreview {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Review shape labels of an image dataset.");
            println!();
            println!("Run 'labelreview --help' for usage information.");
            Ok(())
        }
    }
}

/// Rejects output formats other than text and json.
fn check_output(output: &str) -> Result<(), ReviewError> {
    match output {
        "text" | "json" => Ok(()),
        other => Err(ReviewError::UnsupportedFormat(format!(
            "'{}' (supported: text, json)",
            other
        ))),
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<(), ReviewError> {
    let text = serde_json::to_string_pretty(value).map_err(|source| {
        ReviewError::LabelJsonWrite {
            path: PathBuf::from("<stdout>"),
            source,
        }
    })?;
    println!("{}", text);
    Ok(())
}

/// Execute the validate subcommand.
fn run_validate(args: ValidateArgs) -> Result<(), ReviewError> {
    check_output(&args.output)?;
    let labels = ir::io_json::read_label_json(&args.input)?;

    let opts = validation::ValidateOptions {
        strict: args.strict,
        ..Default::default()
    };
    let report = validation::validate_label_file(&labels, &opts);

    if args.output == "json" {
        print_json(&report.to_json())?;
    } else {
        print!("{}", report);
    }

    let has_errors = report.error_count() > 0;
    let has_warnings = report.warning_count() > 0;

    if has_errors || (opts.strict && has_warnings) {
        Err(ReviewError::ValidationFailed {
            error_count: report.error_count(),
            warning_count: report.warning_count(),
            report,
        })
    } else {
        Ok(())
    }
}

/// Execute the inspect subcommand.
fn run_inspect(args: InspectArgs) -> Result<(), ReviewError> {
    check_output(&args.output)?;
    let labels = ir::io_json::read_label_json(&args.input)?;
    let report = inspect::inspect_label_file(&labels, &inspect::InspectOptions::default());

    if args.output == "json" {
        print_json(&report)
    } else {
        print!("{}", report);
        Ok(())
    }
}

fn open(
    input: &Path,
    display: &DisplayArgs,
    image: &ImageSelector,
) -> Result<ReviewSession, ReviewError> {
    ReviewSession::open_at(input, display.session_options(), image)
}

/// Execute the show subcommand.
fn run_show(args: ShowArgs) -> Result<(), ReviewError> {
    let session = open(&args.input, &args.display, &args.image)?;
    for issue in &session.load_report().issues {
        eprintln!("{}", issue);
    }
    print_json(&session.render_request())
}

/// Execute the review subcommand.
fn run_review(args: ReviewArgs) -> Result<(), ReviewError> {
    let mut session = open(&args.input, &args.display, &args.image)?;
    let id = ShapeId::new(args.shape);
    session.set_review(id, args.code, args.comment)?;
    println!(
        "Shape {} in {} marked {}",
        id,
        session.store().image_name(),
        args.code
    );
    Ok(())
}

/// Execute the delete subcommand.
fn run_delete(args: DeleteArgs) -> Result<(), ReviewError> {
    let mut session = open(&args.input, &args.display, &args.image)?;
    let id = ShapeId::new(args.shape);
    session.delete_shape(id)?;
    println!("Shape {} deleted from {}", id, session.store().image_name());
    Ok(())
}
