use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    Command::new("bookbind")
        .about("Join audio files into a chapterized M4B container without re-encoding")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("input_dir")
                .value_name("INPUT_DIR")
                .help("Directory containing the source audio files")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("order_file")
                .value_name("ORDER_FILE")
                .help("Text file listing the join order, one 'filename|Chapter Title' per line")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("output_file")
                .value_name("OUTPUT_FILE")
                .help("Output .m4b filename")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("cover")
                .long("cover")
                .value_name("IMAGE")
                .help("Cover image (jpg/png) to embed as attached cover art")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose output")
                .action(ArgAction::SetTrue),
        )
}
