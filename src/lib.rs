//! A library for decoding ESRI `.sde` connection files into readable
//! key/value connection properties.
//!
//! An `.sde` file is an undocumented binary dump of a geodatabase
//! connection property set. This crate scrubs the blob down to its
//! printable payload, repairs the known corruption patterns left behind
//! by different producer-tool versions, and reassembles the result as
//! ordered `[KEY]=VALUE;` pairs. It is a best-effort compatibility shim,
//! not a conformant parser of a documented format.
//!
//! # Examples
//!
//! ```no_run
//! use sde2string::{SdeDecoder, SdeEncoding};
//!
//! // Decode a file and print the connection string
//! let decoded = SdeDecoder::decode_file("Sample.sde", SdeEncoding::Ascii).unwrap();
//! println!("{}", decoded.connection_string(false));
//!
//! // Or decode bytes already in memory
//! let bytes = std::fs::read("Sample.sde").unwrap();
//! let decoded = SdeDecoder::decode_bytes(&bytes, SdeEncoding::Ascii).unwrap();
//! for line in decoded.property_lines(true) {
//!     println!("{line}");
//! }
//! ```

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub mod cli;
mod converter;
mod decode;
mod encoding;

pub use converter::SdeDecoder;
pub use decode::{DecodedSde, decode_bytes};
pub use encoding::SdeEncoding;

/// Error types for `.sde` decoding
#[derive(Error, Debug)]
pub enum SdeError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),
    #[error("input is empty (zero bytes)")]
    EmptyInput,
    #[error("no {ANCHOR} marker found - not a recognizable SDE property dump")]
    AnchorNotFound,
    #[error("unsupported encoding: {0} (expected DEFAULT|ASCII|UTF7|UTF8|UTF16|UTF32)")]
    UnsupportedEncoding(String),
}

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, SdeError>;

/// First property name of a recognizable connection dump; everything
/// before it is discarded.
pub const ANCHOR: &str = "SERVER";

/// Synthetic field delimiter that NUL runs collapse into.
pub const DELIMITER: char = '|';
