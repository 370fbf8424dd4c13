use crate::{DecodedSde, Result, SdeEncoding, SdeError, decode};
use std::fs;
use std::io::{self, Read};
use std::path::Path;

/// High-level facade over the blob decoder
pub struct SdeDecoder;

impl SdeDecoder {
    /// Decode an `.sde` file on disk.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use sde2string::{SdeDecoder, SdeEncoding};
    ///
    /// let decoded = SdeDecoder::decode_file("Sample.sde", SdeEncoding::Ascii).unwrap();
    /// println!("{}", decoded.connection_string(false));
    /// ```
    pub fn decode_file<P: AsRef<Path>>(path: P, encoding: SdeEncoding) -> Result<DecodedSde> {
        let bytes = Self::read_file(path)?;
        decode::decode_bytes(&bytes, encoding)
    }

    /// Decode an `.sde` blob from any reader.
    pub fn decode_reader<R: Read>(mut reader: R, encoding: SdeEncoding) -> Result<DecodedSde> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        decode::decode_bytes(&bytes, encoding)
    }

    /// Decode an `.sde` blob piped on stdin.
    pub fn decode_stdin(encoding: SdeEncoding) -> Result<DecodedSde> {
        Self::decode_reader(io::stdin().lock(), encoding)
    }

    /// Decode an `.sde` blob already in memory.
    pub fn decode_bytes(bytes: &[u8], encoding: SdeEncoding) -> Result<DecodedSde> {
        decode::decode_bytes(bytes, encoding)
    }

    /// Convenience: decode a file straight to its connection string.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use sde2string::SdeDecoder;
    ///
    /// let conn = SdeDecoder::connection_string_from_file("Sample.sde", true).unwrap();
    /// assert!(conn.contains("SERVER="));
    /// ```
    pub fn connection_string_from_file<P: AsRef<Path>>(
        path: P,
        bracketless: bool,
    ) -> Result<String> {
        let decoded = Self::decode_file(path, SdeEncoding::Ascii)?;
        Ok(decoded.connection_string(bracketless))
    }

    /// Read a file's raw bytes, mapping a missing file to
    /// [`SdeError::FileNotFound`] so callers can report the path.
    pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(SdeError::FileNotFound(path.to_path_buf()));
        }
        Ok(fs::read(path)?)
    }

    /// Slurp stdin to a byte buffer.
    pub fn read_stdin() -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        io::stdin().lock().read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}
