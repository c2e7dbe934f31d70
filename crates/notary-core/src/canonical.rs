//! Canonical JSON encoding for deterministic hashing.
//!
//! Statements are hashed over a pinned text layout:
//! - Object keys ordered by the versioned [`KeyOrder`] table, unknown keys
//!   after every known key in UTF-16 code unit order
//! - `signature` always last, copied verbatim
//! - Arrays keep their order
//! - Two-space indented JSON with `JSON.stringify` escaping and number
//!   formatting
//!
//! **This layout is FROZEN.** Every computed token and every `previous`
//! pointer in existing ledgers depends on it. Changing the table or the
//! text layout is a new wire version, never an in-place edit.

use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::io;
use std::sync::{Arc, OnceLock};

use crate::error::{CoreError, Result};

/// Field that is never sorted and always emitted last.
pub const SIGNATURE: &str = "signature";

/// Version of the key priority table below.
pub const KEY_ORDER_VERSION: u32 = 1;

/// Key priorities, wire format v1. Priority 14 is unused.
const KEY_ORDER_V1: [(&str, u32); 28] = [
    ("statement", 0),
    ("time", 1),
    ("I", 2),
    ("trust", 3),
    ("block", 4),
    ("replace", 5),
    ("delegate", 6),
    ("clear", 7),
    ("rate", 8),
    ("relate", 9),
    ("dontRelate", 10),
    ("equate", 11),
    ("dontEquate", 12),
    ("follow", 13),
    ("with", 15),
    ("other", 16),
    ("moniker", 17),
    ("revokeAt", 18),
    ("domain", 19),
    ("tags", 20),
    ("recommend", 21),
    ("dismiss", 22),
    ("censor", 23),
    ("stars", 24),
    ("comment", 25),
    ("contentType", 26),
    ("previous", 27),
    ("signature", 28),
];

/// An immutable key priority table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyOrder {
    version: u32,
    ranks: BTreeMap<String, u32>,
}

impl KeyOrder {
    /// Build a table, rejecting keys that share a priority.
    pub fn new<K: Into<String>>(
        version: u32,
        entries: impl IntoIterator<Item = (K, u32)>,
    ) -> Result<Self> {
        let mut ranks = BTreeMap::new();
        let mut owners: BTreeMap<u32, String> = BTreeMap::new();

        for (key, rank) in entries {
            let key = key.into();
            match owners.entry(rank) {
                Entry::Occupied(owner) if *owner.get() != key => {
                    return Err(CoreError::DuplicatePriority {
                        first: owner.get().clone(),
                        second: key,
                        rank,
                    });
                }
                Entry::Occupied(_) => {}
                Entry::Vacant(slot) => {
                    slot.insert(key.clone());
                }
            }
            if let Some(previous) = ranks.insert(key.clone(), rank) {
                if previous != rank {
                    return Err(CoreError::DuplicatePriority {
                        first: key.clone(),
                        second: key,
                        rank,
                    });
                }
            }
        }

        Ok(Self { version, ranks })
    }

    /// The shared v1 table.
    pub fn v1() -> Arc<KeyOrder> {
        static V1: OnceLock<Arc<KeyOrder>> = OnceLock::new();
        V1.get_or_init(|| {
            Arc::new(
                KeyOrder::new(KEY_ORDER_VERSION, KEY_ORDER_V1)
                    .expect("v1 key table has unique priorities"),
            )
        })
        .clone()
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Priority of a known key.
    pub fn rank(&self, key: &str) -> Option<u32> {
        self.ranks.get(key).copied()
    }

    /// Known keys, in priority order.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<(&str, u32)> =
            self.ranks.iter().map(|(k, r)| (k.as_str(), *r)).collect();
        keys.sort_by_key(|(_, rank)| *rank);
        keys.into_iter().map(|(k, _)| k).collect()
    }

    /// Compare two distinct object keys.
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match (self.rank(a), self.rank(b)) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            // JavaScript and Dart compare strings by UTF-16 code units.
            (None, None) => a.encode_utf16().cmp(b.encode_utf16()),
        }
    }
}

/// Reorders object keys into canonical order.
#[derive(Debug, Clone)]
pub struct CanonicalEncoder {
    key_order: Arc<KeyOrder>,
}

impl Default for CanonicalEncoder {
    fn default() -> Self {
        Self::new(KeyOrder::v1())
    }
}

impl CanonicalEncoder {
    pub fn new(key_order: Arc<KeyOrder>) -> Self {
        Self { key_order }
    }

    pub fn key_order(&self) -> &KeyOrder {
        &self.key_order
    }

    /// Return `value` with every object's keys in canonical order.
    ///
    /// Scalars are returned unchanged and arrays keep their element order.
    pub fn order(&self, value: &Value) -> Value {
        match value {
            Value::Array(items) => Value::Array(items.iter().map(|v| self.order(v)).collect()),
            Value::Object(map) => Value::Object(self.order_object(map)),
            scalar => scalar.clone(),
        }
    }

    /// Canonically order an object.
    pub fn order_object(&self, map: &Map<String, Value>) -> Map<String, Value> {
        let mut entries: Vec<(&String, &Value)> =
            map.iter().filter(|(k, _)| k.as_str() != SIGNATURE).collect();
        entries.sort_by(|(a, _), (b, _)| self.key_order.compare(a, b));

        let mut out = Map::with_capacity(map.len());
        for (key, value) in entries {
            out.insert(key.clone(), self.order(value));
        }
        if let Some(signature) = map.get(SIGNATURE).filter(|s| is_truthy(s)) {
            out.insert(SIGNATURE.to_string(), signature.clone());
        }
        out
    }

    /// Canonical text of `value` as bytes.
    pub fn canonical_bytes(&self, value: &Value) -> Result<Vec<u8>> {
        let ordered = self.order(value);
        let mut buf = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, CanonicalFormatter::new());
        ordered.serialize(&mut ser)?;
        Ok(buf)
    }

    /// Canonical text of `value`.
    pub fn canonical_text(&self, value: &Value) -> Result<String> {
        String::from_utf8(self.canonical_bytes(value)?)
            .map_err(|e| CoreError::Encoding(e.to_string()))
    }
}

/// JavaScript truthiness, which decides whether a signature is re-emitted.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Two-space pretty printer with ECMAScript number formatting.
///
/// Structure is delegated to serde_json's `PrettyFormatter`; only floats are
/// written differently, because `JSON.stringify(2.0)` is `2`, not `2.0`.
pub struct CanonicalFormatter {
    pretty: PrettyFormatter<'static>,
}

impl CanonicalFormatter {
    pub fn new() -> Self {
        Self {
            pretty: PrettyFormatter::with_indent(b"  "),
        }
    }
}

impl Default for CanonicalFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for CanonicalFormatter {
    fn write_f64<W>(&mut self, writer: &mut W, value: f64) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(format_js_number(value).as_bytes())
    }

    fn begin_array<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.pretty.begin_array(writer)
    }

    fn end_array<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.pretty.end_array(writer)
    }

    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.pretty.begin_array_value(writer, first)
    }

    fn end_array_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.pretty.end_array_value(writer)
    }

    fn begin_object<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.pretty.begin_object(writer)
    }

    fn end_object<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.pretty.end_object(writer)
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.pretty.begin_object_key(writer, first)
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.pretty.begin_object_value(writer)
    }

    fn end_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.pretty.end_object_value(writer)
    }
}

/// Format a float the way ECMAScript `Number.prototype.toString` does.
pub fn format_js_number(value: f64) -> String {
    if !value.is_finite() {
        return "null".to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    // Rust's `{:e}` yields the shortest round-trip digits, e.g. "1.2345e-7".
    let sci = format!("{:e}", value.abs());
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let exponent: i32 = exponent.parse().unwrap_or(0);

    // value = 0.d1d2..dk * 10^n
    let k = digits.len() as i32;
    let n = exponent + 1;

    let mut out = String::new();
    if value < 0.0 {
        out.push('-');
    }

    if k <= n && n <= 21 {
        out.push_str(&digits);
        out.extend(std::iter::repeat('0').take((n - k) as usize));
    } else if 0 < n && n <= 21 {
        let (int_part, frac_part) = digits.split_at(n as usize);
        out.push_str(int_part);
        out.push('.');
        out.push_str(frac_part);
    } else if -6 < n && n <= 0 {
        out.push_str("0.");
        out.extend(std::iter::repeat('0').take((-n) as usize));
        out.push_str(&digits);
    } else {
        let e = n - 1;
        let (first, rest) = digits.split_at(1);
        out.push_str(first);
        if !rest.is_empty() {
            out.push('.');
            out.push_str(rest);
        }
        out.push('e');
        out.push(if e >= 0 { '+' } else { '-' });
        out.push_str(&e.abs().to_string());
    }
    out
}

/// Canonically order a value with the v1 table.
pub fn canonicalize(value: &Value) -> Value {
    CanonicalEncoder::default().order(value)
}

/// Canonical bytes of a value with the v1 table.
pub fn canonical_bytes(value: &Value) -> Result<Vec<u8>> {
    CanonicalEncoder::default().canonical_bytes(value)
}
