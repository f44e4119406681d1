//! Canonical payload serialization.
//!
//! The HMAC is computed over a serialized string, not over the logical JSON
//! structure, so both peers must produce byte-identical output: compact
//! separators, keys in their original order, and every non-ASCII character
//! escaped as `\uXXXX` (UTF-16 code units, lowercase hex).

use std::io;

use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};

use crate::error::Result;

/// Compact formatter that escapes everything outside printable ASCII.
struct AsciiFormatter;

impl Formatter for AsciiFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (index, ch) in fragment.char_indices() {
            if ch.is_ascii() && ch != '\u{7f}' {
                continue;
            }
            writer.write_all(fragment[start..index].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{unit:04x}")?;
            }
            start = index + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}

/// Serialize a value the way it is signed on the wire.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use sinric_protocol::canonical_json;
///
/// let value = json!({"b": 1, "a": "é"});
/// assert_eq!(canonical_json(&value).unwrap(), r#"{"b":1,"a":"\u00e9"}"#);
/// ```
pub fn canonical_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut buffer = Vec::with_capacity(256);
    let mut serializer = Serializer::with_formatter(&mut buffer, AsciiFormatter);
    value.serialize(&mut serializer)?;
    // The formatter only ever emits ASCII
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
