//! Deterministic JSON output.
//!
//! Published documents are committed to source control, so two runs over the
//! same data must produce the same bytes. Output has sorted object keys, four
//! space indentation, `\uXXXX` escapes for anything outside ASCII and a single
//! trailing newline.

use std::io::{self, Write};

use serde::Serialize;
use serde_json::{
    ser::{Formatter, PrettyFormatter},
    Map, Serializer, Value,
};

const INDENT: &[u8] = b"    ";

/// Serializes `value` in canonical form.
///
/// # Examples
///
/// ```
/// use pkgindex_registry::canonical::to_canonical_string;
///
/// let value = serde_json::json!({"b": 1, "a": ["é"]});
/// assert_eq!(
///     to_canonical_string(&value).unwrap(),
///     "{\n    \"a\": [\n        \"\\u00e9\"\n    ],\n    \"b\": 1\n}\n"
/// );
/// ```
pub fn to_canonical_string<T>(value: &T) -> serde_json::Result<String>
where
    T: Serialize + ?Sized,
{
    let value = sort_keys(serde_json::to_value(value)?);

    let mut out = Vec::with_capacity(4096);
    let mut serializer = Serializer::with_formatter(&mut out, AsciiFormatter::new());
    value.serialize(&mut serializer)?;
    out.push(b'\n');

    // The formatter only ever emits ASCII.
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Rebuilds every object in `value` with its keys in ascending order.
pub fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut sorted = Map::with_capacity(entries.len());
            for (key, value) in entries {
                sorted.insert(key, sort_keys(value));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

/// Pretty formatter that escapes non-ASCII characters.
struct AsciiFormatter<'a> {
    inner: PrettyFormatter<'a>,
}

impl AsciiFormatter<'_> {
    fn new() -> Self {
        Self {
            inner: PrettyFormatter::with_indent(INDENT),
        }
    }
}

impl Formatter for AsciiFormatter<'_> {
    fn begin_array<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.inner.begin_array(writer)
    }

    fn end_array<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.inner.end_array(writer)
    }

    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.inner.begin_array_value(writer, first)
    }

    fn end_array_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.inner.end_array_value(writer)
    }

    fn begin_object<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.inner.begin_object(writer)
    }

    fn end_object<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.inner.end_object(writer)
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.inner.begin_object_key(writer, first)
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.inner.begin_object_value(writer)
    }

    fn end_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.inner.end_object_value(writer)
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if fragment.is_ascii() {
            return writer.write_all(fragment.as_bytes());
        }

        let mut units = [0u16; 2];
        for ch in fragment.chars() {
            if ch.is_ascii() {
                writer.write_all(&[ch as u8])?;
            } else {
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{unit:04x}")?;
                }
            }
        }
        Ok(())
    }
}
