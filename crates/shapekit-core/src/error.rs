//! Error handling for ShapeKit
//!
//! Provides error types for the resource loaders consumed by the shape
//! generators. Generation itself never fails: invalid parameters degrade
//! to a sentinel comment and formatting problems render inline markers,
//! so neither appears here.
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Font loading error type
///
/// Raised when a stroke-font file cannot be turned into a complete font.
/// A font is all-or-nothing: any of these aborts the load and no font is
/// returned.
#[derive(Error, Debug)]
pub enum FontError {
    /// The font file could not be opened or read
    #[error("Failed to read font file {path}: {source}")]
    Io {
        /// Path of the font file.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// No version header was found anywhere in the file
    #[error("No version header found in font file {path}")]
    MissingVersion {
        /// Path of the font file.
        path: String,
    },

    /// A line or arc command carried coordinates that did not parse
    #[error("Malformed coordinates at line {line}: {text}")]
    MalformedCoordinates {
        /// 1-based line number in the font file.
        line: usize,
        /// The offending line text.
        text: String,
    },
}

/// Subroutine loading error type
#[derive(Error, Debug)]
pub enum SubroutineError {
    /// The subroutine file could not be opened or read
    #[error("Failed to read subroutine file {path}: {source}")]
    Io {
        /// Path of the subroutine file.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file contains no `o<name> sub` header
    #[error("No subroutine definition found in {path}")]
    MissingName {
        /// Path of the subroutine file.
        path: String,
    },

    /// A directory scan found no subroutine files at all
    #[error("No subroutine files found in {path}")]
    EmptyDirectory {
        /// The scanned directory.
        path: String,
    },
}

/// Main error type for ShapeKit
///
/// A unified error type wrapping the loader errors. This is the primary
/// error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Font loading error
    #[error(transparent)]
    Font(#[from] FontError),

    /// Subroutine loading error
    #[error(transparent)]
    Subroutine(#[from] SubroutineError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a font error
    pub fn is_font_error(&self) -> bool {
        matches!(self, Error::Font(_))
    }

    /// Check if this is a subroutine error
    pub fn is_subroutine_error(&self) -> bool {
        matches!(self, Error::Subroutine(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
