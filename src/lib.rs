//! Conversion of raw binary images into Memory Initialization Files.
//!
//! A MIF lists one `address : value;` record per memory word between a
//! small header and an `END;` line, and is what FPGA tool chains load into
//! simulated or synthesized ROM and RAM:
//!
//! ```text
//! DEPTH = 4;
//! WIDTH = 8;
//! ADDRESS_RADIX = HEX;
//! DATA_RADIX = HEX;
//! CONTENT
//! BEGIN
//! 0 : 00;
//! 1 : 01;
//! 2 : 02;
//! 3 : 03;
//! END;
//! ```
//!
//! ```
//! use std::io::Cursor;
//!
//! let mut mif = Vec::new();
//! bin2mif::convert(Cursor::new([0x12u8, 0x34]), &mut mif, 1, 16).unwrap();
//! assert!(String::from_utf8(mif).unwrap().contains("0 : 3412;\n"));
//! ```

pub mod cli;
pub mod depth;
pub mod error;
pub mod handle;
pub mod hex;
pub mod mif;
pub mod word_reader;

use tracing::{info, warn};

pub use cli::{Args, Config};
pub use depth::resolve_depth;
pub use error::{Error, Result};
pub use handle::{Input, Output};
pub use hex::{format_address, format_word_bytes};
pub use mif::{convert, emit, generate};
pub use word_reader::{WordReader, BUFFER_CAPACITY};

/// Runs one conversion as described by `config`.
///
/// The depth is settled before the output is created, so a request that
/// cannot be satisfied leaves the destination untouched. A generation error
/// or early stop takes precedence over a failure to close the output.
pub fn run(config: &Config) -> Result<()> {
    let input = Input::open(config.input.as_deref())?;
    let depth = resolve_depth(config.depth, input.size(), config.width)?;

    let mut output = Output::create(config.output.as_deref())?;
    info!(
        input = %display_path(input.path(), "<stdin>"),
        output = %display_path(output.path(), "<stdout>"),
        depth,
        width = config.width,
        "converting"
    );

    let generated = convert(input, &mut output, depth, config.width);
    let closed = output.close();

    match (generated, closed) {
        (Err(e), Err(close_error)) => {
            warn!(error = %close_error, "output was not closed cleanly");
            Err(e)
        }
        (Err(e), Ok(())) => Err(e),
        (Ok(()), closed) => closed,
    }
}

fn display_path(path: Option<&std::path::Path>, stream: &str) -> String {
    match path {
        Some(path) => path.display().to_string(),
        None => stream.to_string(),
    }
}
