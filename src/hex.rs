use std::fmt::{self, Display, Formatter};

/// Number of hex digits needed to print every address below `depth`.
///
/// Computed from `depth - 1`, with at least one digit, so `depth` of 0 or 1
/// both give a width of 1.
pub fn address_width(depth: u64) -> usize {
    let mut last = depth.saturating_sub(1) / 16;
    let mut width = 1;
    while last > 0 {
        last /= 16;
        width += 1;
    }
    return width;
}

pub fn format_address(value: u64, digit_width: usize) -> String {
    HexAddress { value, digit_width }.to_string()
}

pub fn format_word_bytes(bytes: &[u8]) -> String {
    HexWord(bytes).to_string()
}

#[derive(Clone, Copy, Debug)]
pub struct HexAddress {
    pub value: u64,
    pub digit_width: usize,
}

impl Display for HexAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$x}", self.value, width = self.digit_width)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct HexWord<'a>(pub &'a [u8]);

impl Display for HexWord<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for byte in self.0.iter().rev() {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}
