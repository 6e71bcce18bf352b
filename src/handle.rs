use std::fs::{File, Metadata};
use std::io::{self, BufWriter, Read, StdinLock, Stdout, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};

pub enum Input {
    Stdin(StdinLock<'static>),
    File { path: PathBuf, file: File },
}

impl Input {
    pub fn open(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => return Ok(Input::Stdin(io::stdin().lock())),
        };

        let file = File::open(path).map_err(|source| Error::OpenFailure {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "opened input");
        Ok(Input::File { path: path.to_path_buf(), file })
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Input::Stdin(_) => None,
            Input::File { path, .. } => Some(path),
        }
    }

    pub fn size(&self) -> Option<u64> {
        match self {
            Input::Stdin(_) => stdin_size(),
            Input::File { file, .. } => regular_file_size(&file.metadata().ok()?),
        }
    }
}

impl Read for Input {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Input::Stdin(stdin) => stdin.read(buf),
            Input::File { file, .. } => file.read(buf),
        }
    }
}

fn regular_file_size(metadata: &Metadata) -> Option<u64> {
    if metadata.is_file() {
        Some(metadata.len())
    } else {
        None
    }
}

/// Standard input redirected from a regular file can be measured through its
/// descriptor, minus whatever an earlier process already consumed.
#[cfg(unix)]
fn stdin_size() -> Option<u64> {
    use std::io::Seek;
    use std::os::fd::AsFd;

    let fd = io::stdin().as_fd().try_clone_to_owned().ok()?;
    let mut file = File::from(fd);
    let len = regular_file_size(&file.metadata().ok()?)?;
    let position = file.stream_position().ok()?;
    Some(len.saturating_sub(position))
}

#[cfg(not(unix))]
fn stdin_size() -> Option<u64> {
    None
}

/// Where the text goes. Call [`close`](Output::close) to learn whether the
/// buffered tail made it out; dropping releases the handle regardless.
pub enum Output {
    Stdout(BufWriter<Stdout>),
    File { path: PathBuf, writer: BufWriter<File> },
}

impl Output {
    pub fn create(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => return Ok(Output::Stdout(BufWriter::new(io::stdout()))),
        };

        let file = File::create(path).map_err(|source| Error::OpenFailure {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "created output");
        Ok(Output::File { path: path.to_path_buf(), writer: BufWriter::new(file) })
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Output::Stdout(_) => None,
            Output::File { path, .. } => Some(path),
        }
    }

    /// Flushes buffered text and releases the handle.
    ///
    /// A failure on standard output is a write failure; on a named file it
    /// is a failure to close that file.
    pub fn close(self) -> Result<()> {
        match self {
            Output::Stdout(mut writer) => writer.flush().map_err(Error::WriteFailure),
            Output::File { path, writer } => match writer.into_inner() {
                Ok(_file) => Ok(()),
                Err(e) => Err(Error::CloseFailure { path, source: e.into_error() }),
            },
        }
    }
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout(writer) => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout(writer) => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}
