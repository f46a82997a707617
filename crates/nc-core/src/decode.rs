//! Decoding of serverinfo documents.
//!
//! The upstream API has two encodings that plain serde mapping gets wrong:
//! some booleans arrive as the strings `"yes"`/`"no"`, and the database size
//! arrives either as a JSON number or as a quoted decimal string. Both are
//! handled by the `deserialize_with` helpers below.

use std::fmt;

use serde::de::{self, Deserialize, Deserializer, Unexpected, Visitor};

use crate::error::DecodeError;
use crate::snapshot::Snapshot;

/// Decode a raw serverinfo response body.
pub fn decode_snapshot(body: &[u8]) -> Result<Snapshot, DecodeError> {
    serde_json::from_slice(body).map_err(|e| {
        let (line, column) = (e.line(), e.column());
        let full = e.to_string();
        let message = full
            .strip_suffix(&format!(" at line {line} column {column}"))
            .unwrap_or(&full)
            .to_string();
        // A missing key is reported at the end of its parent object, where the
        // nearest key belongs to some nested sibling.
        let field = if message.starts_with("missing field") {
            None
        } else {
            key_near(body, line, column)
        };
        DecodeError {
            field,
            message,
            line,
            column,
        }
    })
}

/// Deserialize a field that is `null` or absent as `T::default()`.
pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserialize the literal strings `"yes"` and `"no"` as a bool.
///
/// Everything else, including JSON booleans and `null`, is rejected.
pub fn yes_no<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(YesNoVisitor)
}

struct YesNoVisitor;

impl Visitor<'_> for YesNoVisitor {
    type Value = bool;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("\"yes\" or \"no\"")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<bool, E> {
        match v {
            "yes" => Ok(true),
            "no" => Ok(false),
            other => Err(E::invalid_value(Unexpected::Str(other), &self)),
        }
    }
}

/// Deserialize an integer sent either as a JSON number or a quoted decimal
/// string. `null` resolves to zero.
pub fn int_or_string<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(IntOrStringVisitor)
}

struct IntOrStringVisitor;

impl Visitor<'_> for IntOrStringVisitor {
    type Value = i64;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an integer or a string holding a base-10 integer")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
        Ok(v)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
        i64::try_from(v).map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<i64, E> {
        v.parse::<i64>()
            .map_err(|_| E::invalid_value(Unexpected::Str(v), &self))
    }

    fn visit_unit<E: de::Error>(self) -> Result<i64, E> {
        Ok(0)
    }
}

/// Find the last object key that precedes a 1-based (line, column) position.
fn key_near(body: &[u8], line: usize, column: usize) -> Option<String> {
    if line == 0 {
        return None;
    }
    let line_start: usize = body
        .split(|b| *b == b'\n')
        .take(line - 1)
        .map(|l| l.len() + 1)
        .sum();
    let end = (line_start + column).min(body.len());
    let head = &body[..end];

    for (idx, _) in head.iter().enumerate().rev().filter(|(_, b)| **b == b':') {
        let before = head[..idx].trim_ascii_end();
        let Some(inner) = before.strip_suffix(b"\"") else {
            continue;
        };
        let Some(open) = inner.iter().rposition(|b| *b == b'"') else {
            continue;
        };
        return Some(String::from_utf8_lossy(&inner[open + 1..]).into_owned());
    }
    None
}
