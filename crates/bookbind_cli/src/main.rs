mod cli;

use std::path::PathBuf;

use anyhow::{anyhow, bail};
use bookbind_core::pipeline::{self, JoinRequest, ProgressEvent};
use bookbind_core::tools::Toolchain;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::cli::build_cli;

const INSTALL_HELP: &str = "\
Please install ffmpeg (which includes ffprobe) and make sure it is in PATH.
  - Windows: download a static build from https://www.gyan.dev/ffmpeg/builds/ (ffmpeg-git-full.7z)
  - Linux: sudo apt install ffmpeg
  - macOS: brew install ffmpeg";

/// Initialize the global tracing subscriber.
///
/// Respects RUST_LOG, falling back to debug with `--verbose` and to
/// warnings-only otherwise. Output goes to stderr.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    let matches = build_cli().get_matches();
    let verbose = matches.get_flag("verbose");
    init_tracing(verbose);

    let input_dir = matches
        .get_one::<PathBuf>("input_dir")
        .expect("required argument");
    let order_file = matches
        .get_one::<PathBuf>("order_file")
        .expect("required argument");
    let output_file = matches
        .get_one::<PathBuf>("output_file")
        .expect("required argument");
    let cover = matches.get_one::<PathBuf>("cover").cloned();

    let tools = Toolchain::locate().map_err(|e| anyhow!("{e}\n{INSTALL_HELP}"))?;

    if !input_dir.is_dir() {
        bail!("Input directory '{}' does not exist", input_dir.display());
    }
    if !order_file.is_file() {
        bail!("Order file '{}' does not exist", order_file.display());
    }
    if let Some(cover) = &cover {
        if !cover.is_file() {
            bail!("Cover image file '{}' not found", cover.display());
        }
    }

    let request = JoinRequest {
        input_dir: input_dir.clone(),
        order_file: order_file.clone(),
        output: output_file.clone(),
        cover,
    };

    println!("Reading order file and analyzing audio files...");

    let progress = ProgressBar::new(0);
    progress.set_draw_target(ProgressDrawTarget::stderr());
    progress.set_style(
        ProgressStyle::with_template("{prefix} |{bar:40.cyan/blue}| {percent}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    progress.set_prefix("Processing:");
    progress.set_message("Complete");

    let progress_handle = progress.clone();
    let cover_note = request.cover.clone();
    let result = pipeline::run(&request, &tools, move |event| match event {
        ProgressEvent::Start { total_files } => {
            println!("Found {total_files} files to process.");
            progress_handle.set_length(total_files as u64);
        }
        ProgressEvent::Analyzed { index, .. } => {
            progress_handle.set_position(index as u64 + 1);
        }
        ProgressEvent::SkippedMissing { .. } => {}
        ProgressEvent::Joining => {
            progress_handle.finish();
            println!("Generating metadata file...");
            println!("Joining files...");
            if let Some(cover) = &cover_note {
                println!("Embedding cover image: {}", cover.display());
            }
        }
    });

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            progress.finish_and_clear();
            return Err(e.into());
        }
    };

    println!("Success! Output saved to: {}", report.output.display());
    Ok(())
}
