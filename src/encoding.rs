use crate::{Result, SdeError};
use base64::Engine;
use base64::engine::general_purpose::STANDARD_NO_PAD;

/// Text encodings a `.sde` blob may be decoded under.
///
/// The true encoding of an `.sde` file is undocumented and varies by
/// producer tool and version, so the caller picks. Every variant decodes
/// permissively: malformed sequences become replacement characters (which
/// the decoder scrubs out later) rather than errors, because the input is
/// not valid text under any single encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdeEncoding {
    /// Single-byte passthrough (each byte is its own code point).
    Default,
    /// 7-bit ASCII; bytes above 0x7F become `?`.
    Ascii,
    /// UTF-7 with packed segments in modified base64.
    Utf7,
    /// UTF-8, lossy.
    Utf8,
    /// UTF-16 little-endian, lossy.
    Utf16,
    /// UTF-32 little-endian, lossy.
    Utf32,
}

impl SdeEncoding {
    /// Parse an encoding name (case-insensitive).
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_uppercase().as_str() {
            "DEFAULT" => Ok(Self::Default),
            "ASCII" => Ok(Self::Ascii),
            "UTF7" => Ok(Self::Utf7),
            "UTF8" => Ok(Self::Utf8),
            "UTF16" => Ok(Self::Utf16),
            "UTF32" => Ok(Self::Utf32),
            _ => Err(SdeError::UnsupportedEncoding(name.to_string())),
        }
    }

    /// Decode raw bytes to text. Never fails; undecodable sequences are
    /// replaced, not rejected.
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Self::Default => bytes.iter().map(|&b| b as char).collect(),
            Self::Ascii => bytes
                .iter()
                .map(|&b| if b < 0x80 { b as char } else { '?' })
                .collect(),
            Self::Utf7 => decode_utf7(bytes),
            Self::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Self::Utf16 => {
                let units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                    .collect();
                String::from_utf16_lossy(&units)
            }
            Self::Utf32 => bytes
                .chunks_exact(4)
                .map(|quad| {
                    let cp = u32::from_le_bytes([quad[0], quad[1], quad[2], quad[3]]);
                    char::from_u32(cp).unwrap_or(char::REPLACEMENT_CHARACTER)
                })
                .collect(),
        }
    }
}

/// Decode UTF-7: direct characters pass through, `+...-` sections hold
/// UTF-16BE code units packed in modified base64, and `+-` is a literal `+`.
/// Undecodable sections are dropped rather than rejected.
fn decode_utf7(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    let mut iter = bytes.iter().copied().peekable();

    while let Some(b) = iter.next() {
        if b != b'+' {
            out.push(b as char);
            continue;
        }
        if iter.peek() == Some(&b'-') {
            iter.next();
            out.push('+');
            continue;
        }
        let mut packed = String::new();
        while let Some(&next) = iter.peek() {
            if next.is_ascii_alphanumeric() || next == b'+' || next == b'/' {
                packed.push(next as char);
                iter.next();
            } else {
                break;
            }
        }
        // Optional explicit terminator.
        if iter.peek() == Some(&b'-') {
            iter.next();
        }
        out.push_str(&unpack_utf7_section(&packed));
    }

    out
}

fn unpack_utf7_section(packed: &str) -> String {
    // Modified base64 carries no padding; trailing bits that do not fill
    // a whole UTF-16 unit are discarded.
    let mut trimmed = packed;
    while !trimmed.is_empty() {
        match STANDARD_NO_PAD.decode(trimmed) {
            Ok(decoded) => {
                let units: Vec<u16> = decoded
                    .chunks_exact(2)
                    .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                    .collect();
                return String::from_utf16_lossy(&units);
            }
            Err(_) => trimmed = &trimmed[..trimmed.len() - 1],
        }
    }
    String::new()
}
