use std::io::{self, Read, Write};

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::hex::{address_width, HexAddress, HexWord};
use crate::word_reader::WordReader;

const ADDRESS_RADIX: &str = "HEX";
const DATA_RADIX: &str = "HEX";

pub const MAX_WIDTH: u32 = 1024;

/// Checks that `width` is a whole, non-zero number of bytes no wider than
/// [`MAX_WIDTH`] and returns the word size in bytes.
pub fn word_size(width: u32) -> Result<usize> {
    if width == 0 || width % 8 != 0 || width > MAX_WIDTH {
        return Err(Error::InvalidArguments);
    }
    Ok((width / 8) as usize)
}

pub fn write_header<W: Write>(sink: &mut W, depth: u64, width: u32) -> io::Result<()> {
    write!(
        sink,
        "DEPTH = {depth};\n\
         WIDTH = {width};\n\
         ADDRESS_RADIX = {ADDRESS_RADIX};\n\
         DATA_RADIX = {DATA_RADIX};\n\
         CONTENT\n\
         BEGIN\n"
    )
}

pub fn write_footer<W: Write>(sink: &mut W) -> io::Result<()> {
    sink.write_all(b"END;\n")
}

/// Writes one `addr : word;` record per address in `0..depth`.
///
/// Returns the number of records written. That is `depth` unless the input
/// ran out first, in which case it is the count of complete words the input
/// held. Read and write errors abort at once; records already written stay
/// in `sink`.
pub fn emit<R: Read, W: Write>(source: R, sink: &mut W, depth: u64, width: u32) -> Result<u64> {
    let word_size = word_size(width)?;
    let digit_width = address_width(depth);
    let mut reader = WordReader::new(source, word_size);

    let mut address = 0;
    while address < depth {
        let words_read = refill(&mut reader)?;
        if words_read == 0 {
            warn!(requested = depth, produced = address, "unexpected end of input");
            return Ok(address);
        }

        let remaining = usize::try_from(depth - address).unwrap_or(usize::MAX);
        for word in reader.words().take(remaining) {
            writeln!(
                sink,
                "{} : {};",
                HexAddress { value: address, digit_width },
                HexWord(word)
            )
            .map_err(Error::WriteFailure)?;
            address += 1;
        }
    }

    Ok(address)
}

/// Fills until at least one word is available or the input ends; zero means
/// the input ended.
fn refill<R: Read>(reader: &mut WordReader<R>) -> Result<usize> {
    loop {
        let words_read = reader.fill().map_err(Error::ReadFailure)?;
        if words_read > 0 || reader.is_exhausted() {
            if words_read == 0 && !reader.carry().is_empty() {
                debug!(trailing = reader.carry().len(), "dropping incomplete final word");
            }
            return Ok(words_read);
        }
    }
}

/// Writes a complete MIF document: header, records and `END;`.
///
/// The footer is written even when the input ran short, so the output stays
/// well-formed; the returned count tells the caller how far it got.
pub fn generate<R: Read, W: Write>(
    source: R,
    sink: &mut W,
    depth: u64,
    width: u32,
) -> Result<u64> {
    word_size(width)?;
    debug!(depth, width, "generating mif");

    write_header(sink, depth, width).map_err(Error::WriteFailure)?;
    let produced = emit(source, sink, depth, width)?;
    write_footer(sink).map_err(Error::WriteFailure)?;

    Ok(produced)
}

pub fn convert<R: Read, W: Write>(source: R, sink: &mut W, depth: u64, width: u32) -> Result<()> {
    let produced = generate(source, sink, depth, width)?;
    if produced != depth {
        return Err(Error::EarlyStop { requested: depth, produced });
    }
    Ok(())
}
