use crate::constants::DEFAULT_SLIDER_POSITION;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "squeeze-compare",
    about = "Compress an image with two encoders and compare the results",
    long_about = "squeeze-compare compresses an image with a single-pass compressor (encoder A) and/or a \
                  size-targeting encoder (encoder B), prints before/after statistics, renders a \
                  side-by-side or slider comparison and writes the latest result as \
                  compressed_<timestamp>.<extension>.",
    version,
    after_help = "EXAMPLES:\n  \
    squeeze-compare compress photo.png -e both -q 0.7 -w 1920\n  \
    squeeze-compare compress photo.jpg -e b -f webp --view side-by-side --view-output cmp.png\n  \
    squeeze-compare sweep photo.jpg -q 0.9 -q 0.7 -q 0.5 --report report.json\n  \
    squeeze-compare info photo.png"
)]
pub struct Args {
    #[arg(long, global = true, conflicts_with = "verbose", help = "Only print errors")]
    pub quiet: bool,

    #[arg(long, global = true, help = "Print debug output")]
    pub verbose: bool,

    #[arg(
        short = 'j',
        long,
        global = true,
        help = "Number of parallel threads (default: auto)",
        long_help = "Number of threads the image codecs and the PNG optimizer may use. \
                     If not specified, uses number of CPU cores."
    )]
    pub threads: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Which encoder(s) a command runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EncoderChoice {
    A,
    B,
    Both,
}

/// Comparison shown after compressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ViewChoice {
    None,
    SideBySide,
    Slider,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(
        about = "Compress an image and compare the result",
        long_about = "Compress an image with encoder A, encoder B or both. Statistics are printed for \
                      every result, the comparison view is selected (slider by default) and the \
                      most recent result is written to the output directory."
    )]
    Compress {
        #[arg(help = "Input image file path")]
        input: PathBuf,

        #[arg(
            short = 'e',
            long,
            value_enum,
            default_value = "a",
            help = "Encoder to run (a, b, both)"
        )]
        encoder: EncoderChoice,

        #[arg(
            short = 'q',
            long,
            help = "Compression quality (0.0-1.0, default: 0.8)",
            long_help = "Lossy quality from 0.0 (lowest) to 1.0 (highest). \
                         For PNG: >=0.9 uses Zopfli, >=0.7 uses high compression, <0.7 uses standard compression."
        )]
        quality: Option<f32>,

        #[arg(
            short = 'w',
            long,
            help = "Maximum width in pixels",
            long_help = "Resize image to maximum width while preserving aspect ratio. \
                         Image will only be resized if larger than specified width."
        )]
        width: Option<u32>,

        #[arg(
            short = 'H',
            long,
            help = "Maximum height in pixels",
            long_help = "Resize image to maximum height while preserving aspect ratio. \
                         Image will only be resized if larger than specified height."
        )]
        height: Option<u32>,

        #[arg(
            short = 'f',
            long,
            help = "Output format (jpeg, png, webp, avif or a mime type)"
        )]
        format: Option<String>,

        #[arg(
            short = 'o',
            long,
            default_value = ".",
            help = "Directory the compressed result is written to"
        )]
        output_dir: PathBuf,

        #[arg(long, value_enum, default_value = "slider", help = "Comparison to select")]
        view: ViewChoice,

        #[arg(long, help = "Write the rendered comparison to this image file")]
        view_output: Option<PathBuf>,

        #[arg(long, default_value_t = DEFAULT_SLIDER_POSITION, help = "Slider split position (0.0-1.0)")]
        slider_position: f32,

        #[arg(
            long,
            help = "Size target of encoder B in KiB (default: 1024)"
        )]
        max_size_kb: Option<u64>,
    },

    #[command(
        about = "Run one encoder over several quality settings",
        long_about = "Compress the same image once per --quality value and print a JSON report \
                      with the size, compression ratio and size reduction of each run."
    )]
    Sweep {
        #[arg(help = "Input image file path")]
        input: PathBuf,

        #[arg(
            short = 'q',
            long = "quality",
            required = true,
            num_args = 1..,
            help = "Quality values to try (0.0-1.0), repeatable"
        )]
        qualities: Vec<f32>,

        #[arg(short = 'e', long, value_enum, default_value = "a", help = "Encoder to run (a, b)")]
        encoder: EncoderChoice,

        #[arg(short = 'w', long, help = "Maximum width in pixels")]
        width: Option<u32>,

        #[arg(short = 'H', long, help = "Maximum height in pixels")]
        height: Option<u32>,

        #[arg(short = 'f', long, help = "Output format (jpeg, png, webp, avif)")]
        format: Option<String>,

        #[arg(long, help = "Write the JSON report to this file instead of stdout")]
        report: Option<PathBuf>,

        #[arg(long, help = "Size target of encoder B in KiB (default: 1024)")]
        max_size_kb: Option<u64>,
    },

    #[command(
        about = "Display comprehensive image information",
        long_about = "Analyze and display information about an image file including \
                      dimensions, type, file size, and compression recommendations."
    )]
    Info {
        #[arg(help = "Image file path to analyze")]
        input: PathBuf,
    },
}
