use crate::{ANCHOR, DELIMITER, Result, SdeEncoding, SdeError};
use regex::Regex;
use std::sync::LazyLock;

/// Everything outside printable ASCII is binary-format noise, except NUL,
/// which is kept as a structural marker for the collapse pass.
static NON_PRINTABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\x20-\x7F\x00]").unwrap());

/// Ordered collapse rules: runs of NUL padding between properties become a
/// single field delimiter. The more specific patterns run first so the
/// plain-run rule does not consume their context. Each pattern encodes one
/// observed producer-tool quirk.
static COLLAPSE_RULES: LazyLock<Vec<(Regex, &str)>> = LazyLock::new(|| {
    vec![
        // NUL run interrupted by a backspace marker and a stray byte.
        (Regex::new(r"\x00{3,}\x08\x00.?\x00{3,}").unwrap(), "|"),
        // NUL run with a single stray byte in the middle.
        (Regex::new(r"\x00{3,}.?\x00{3,}").unwrap(), "|"),
        // Plain NUL run.
        (Regex::new(r"\x00{3,}").unwrap(), "|"),
        // Leftover single NULs carry no structure.
        (Regex::new(r"\x00").unwrap(), ""),
        // Normalize whitespace runs.
        (Regex::new(r"\s+").unwrap(), " "),
    ]
});

/// The span between `PASSWORD` and the next well-known property is
/// unrecoverable garbage in corrupted dumps; the password is dropped
/// rather than emitted as noise.
static PASSWORD_TO_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"PASSWORD.*VERSION").unwrap());
static PASSWORD_TO_CONNPROP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"PASSWORD.*CONNPROP").unwrap());

/// Some producer versions append a second, malformed copy of the trailing
/// revision tag. Three suffix shapes have been observed; each collapses
/// back to the single well-formed tag.
static REVISION_RULES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"Rev1\.0\|Rev.*$").unwrap(),
        Regex::new(r"Rev1\.0\|ev.*$").unwrap(),
        Regex::new(r"Rev1\.0\|\.0.*$").unwrap(),
    ]
});

/// Result of one decode pass over an `.sde` blob.
///
/// Carries every intermediate form the CLI can emit, so a single pass
/// serves all output modes.
#[derive(Debug, Clone)]
pub struct DecodedSde {
    /// The blob decoded to text, before any cleanup.
    pub unparsed: String,
    /// Printable-scrubbed, NUL-collapsed text with `|` field delimiters.
    pub raw: String,
    /// Ordered key/value pairs. Duplicate keys are kept as-is.
    pub properties: Vec<(String, String)>,
}

impl DecodedSde {
    /// Render the properties as a single `[KEY]=VALUE;` string
    /// (or `KEY=VALUE;` when `bracketless`).
    pub fn connection_string(&self, bracketless: bool) -> String {
        let mut out = String::new();
        for (key, value) in &self.properties {
            if bracketless {
                out.push_str(key);
            } else {
                out.push('[');
                out.push_str(key);
                out.push(']');
            }
            out.push('=');
            out.push_str(value);
            out.push(';');
        }
        out
    }

    /// Render one property per line, same key formatting as
    /// [`connection_string`](Self::connection_string).
    pub fn property_lines(&self, bracketless: bool) -> Vec<String> {
        self.connection_string(bracketless)
            .split(';')
            .filter(|segment| !segment.trim().is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Decode an `.sde` blob into its unparsed, raw, and parsed forms.
pub fn decode_bytes(bytes: &[u8], encoding: SdeEncoding) -> Result<DecodedSde> {
    if bytes.is_empty() {
        return Err(SdeError::EmptyInput);
    }

    let unparsed = encoding.decode(bytes);
    let raw = collapse(&scrub(&unparsed));
    let properties = parse_properties(&raw)?;

    Ok(DecodedSde {
        unparsed,
        raw,
        properties,
    })
}

fn scrub(text: &str) -> String {
    NON_PRINTABLE.replace_all(text, "").into_owned()
}

fn collapse(text: &str) -> String {
    let mut out = text.to_string();
    for (pattern, replacement) in COLLAPSE_RULES.iter() {
        out = pattern.replace_all(&out, *replacement).into_owned();
    }
    out
}

/// Steps 5-9 of the pipeline: anchor, repair, split, pair walk.
fn parse_properties(raw: &str) -> Result<Vec<(String, String)>> {
    let start = raw.find(ANCHOR).ok_or(SdeError::AnchorNotFound)?;
    let mut payload = raw[start..].to_string();

    // The greedy span eats the delimiters too, so the replacement
    // reinstates an empty value slot for PASSWORD.
    if payload.contains("VERSION") {
        payload = PASSWORD_TO_VERSION
            .replace_all(&payload, "PASSWORD||VERSION")
            .into_owned();
    } else {
        payload = PASSWORD_TO_CONNPROP
            .replace_all(&payload, "PASSWORD||CONNPROP")
            .into_owned();
    }

    for rule in REVISION_RULES.iter() {
        payload = rule.replace_all(&payload, "Rev1.0").into_owned();
    }

    let segments: Vec<&str> = payload.split(DELIMITER).collect();
    let mut properties = Vec::with_capacity(segments.len() / 2);
    for pair in segments.chunks_exact(2) {
        properties.push((pair[0].to_string(), pair[1].to_string()));
    }
    // chunks_exact drops a dangling final key, which has no value anyway.

    Ok(properties)
}
