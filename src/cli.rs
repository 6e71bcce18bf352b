use std::num::{IntErrorKind, ParseIntError};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::{ArgAction, Parser};

use crate::error::{Error, Result};
use crate::mif::word_size;

/// Convert a raw binary image into a Memory Initialization File (.mif).
#[derive(Parser, Debug)]
#[command(name = "bin2mif", version)]
pub struct Args {
    /// Bits per word, a multiple of 8.
    #[arg(short, long, value_name = "BITS", default_value = "8", allow_hyphen_values = true)]
    pub width: String,

    /// Number of words to emit [default: as many as the input holds].
    #[arg(short, long, value_name = "WORDS", allow_hyphen_values = true)]
    pub depth: Option<String>,

    /// Destination file [default: standard output].
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Binary input file [default: standard input].
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Log more; repeat for more detail.
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Log errors only.
    #[arg(short, long)]
    pub quiet: bool,
}

/// A validated conversion request. `None` paths stand for the standard
/// streams and a `None` depth is derived from the input size.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub width: u32,
    pub depth: Option<u64>,
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

impl TryFrom<&Args> for Config {
    type Error = Error;

    fn try_from(args: &Args) -> Result<Self> {
        let width: u32 = parse_number(&args.width)?;
        word_size(width)?;
        let depth = args.depth.as_deref().map(parse_number::<u64>).transpose()?;

        Ok(Config {
            width,
            depth,
            input: stream_path(args.input.as_deref()),
            output: stream_path(args.output.as_deref()),
        })
    }
}

/// `-` names the standard stream.
fn stream_path(path: Option<&Path>) -> Option<PathBuf> {
    path.filter(|path| *path != Path::new("-")).map(Path::to_path_buf)
}

/// Parses a decimal integer, telling malformed text apart from values that
/// do not fit `T`. Negative numbers count as out of range.
pub fn parse_number<T>(text: &str) -> Result<T>
where
    T: FromStr<Err = ParseIntError>,
{
    text.parse().map_err(|e: ParseIntError| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => Error::NumericOverflow,
        _ if is_negative(text) => Error::NumericOverflow,
        _ => Error::BadNumberFormat,
    })
}

fn is_negative(text: &str) -> bool {
    match text.strip_prefix('-') {
        Some(digits) => !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}
