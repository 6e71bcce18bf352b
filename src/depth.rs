use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::mif::word_size;

/// Settles how many words to emit.
///
/// An explicit `requested` depth is kept as given, even when the input is
/// known to be too short for it; the shortfall surfaces later as an early
/// stop. Without one, the depth is the number of whole words in
/// `input_size`, which is only known for size-determinable inputs.
pub fn resolve_depth(requested: Option<u64>, input_size: Option<u64>, width: u32) -> Result<u64> {
    let word_size = word_size(width)? as u64;

    let depth = match (requested, input_size) {
        (Some(depth), _) => depth,
        (None, Some(size)) => {
            let depth = size / word_size;
            debug!(size, depth, "derived depth from input size");
            depth
        }
        (None, None) => return Err(Error::DepthRequired),
    };

    if let Some(size) = input_size {
        let needed = depth.saturating_mul(word_size);
        if needed > size {
            warn!(
                depth,
                needed,
                available = size,
                "input holds fewer bytes than the requested depth needs"
            );
        }
    }

    Ok(depth)
}
