use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Every way a conversion can end other than success.
///
/// None of these are recoverable: the converter stops at the first one and
/// whatever was already written to the output stays there.
#[derive(Error, Debug)]
pub enum Error {
    #[error("bad number format")]
    BadNumberFormat,

    #[error("integer variable range overflow")]
    NumericOverflow,

    #[error("invalid command line arguments")]
    InvalidArguments,

    #[error("failed to open file {}", path.display())]
    OpenFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to close file {}", path.display())]
    CloseFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read binary words from input")]
    ReadFailure(#[source] io::Error),

    #[error("failed to write record to output")]
    WriteFailure(#[source] io::Error),

    #[error("{requested} words were requested, but only {produced} could be generated")]
    EarlyStop {
        requested: u64,
        produced: u64,
    },

    #[error("depth cannot be derived from this input, it must be given explicitly")]
    DepthRequired,
}

impl Error {
    /// Process exit status for this outcome. Read and write failures share
    /// the "generation failed" status.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::BadNumberFormat => 1,
            Error::NumericOverflow => 2,
            Error::InvalidArguments => 3,
            Error::OpenFailure { .. } => 4,
            Error::CloseFailure { .. } => 5,
            Error::ReadFailure(_) | Error::WriteFailure(_) => 6,
            Error::EarlyStop { .. } => 7,
            Error::DepthRequired => 8,
        }
    }
}
