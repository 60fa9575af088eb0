//! Error types for reading K-files. Parsing itself never fails; only getting
//! the text in can.

use std::error::Error;
use std::fmt::Display;
use std::io;
use std::path::PathBuf;

/// Errors when reading a deck.
#[derive(Debug)]
pub enum KFileError {
  /// The path doesn't exist.
  FileNotFound(PathBuf),
  /// The file couldn't be read.
  Io(io::Error)
}

impl Display for KFileError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    return match self {
      Self::FileNotFound(p) => write!(f, "file not found: {}", p.display()),
      Self::Io(e) => write!(f, "I/O error: {}", e),
    };
  }
}

impl Error for KFileError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    return match self {
      Self::Io(e) => Some(e),
      Self::FileNotFound(_) => None,
    };
  }
}

impl From<io::Error> for KFileError {
  fn from(e: io::Error) -> Self {
    return Self::Io(e);
  }
}

/// Shorthand for results with our error type.
pub type Result<T> = std::result::Result<T, KFileError>;
