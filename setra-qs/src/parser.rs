//! Querystring decoding into value trees.
//!
//! REST callers encode sets and filters with bracket notation:
//! `?filter[where][name]=foo&filter[limit]=10&set[actives]=`. This module
//! percent-decodes each pair, parses the bracket path of the key, and
//! assembles the pairs into nested [`Value`] trees, one per top-level
//! root (`filter`, `set`, ...).

use indexmap::IndexMap;
use smol_str::SmolStr;
use thiserror::Error;
use tracing::debug;

use setra_filter::{Filter, Set, Value};

/// Numeric bracket segments up to this index are treated as array
/// positions; larger numbers become plain object keys, so a hostile
/// `a[999999999]=x` cannot force a huge allocation.
const ARRAY_LIMIT: usize = 20;

/// Errors from decoding a querystring.
///
/// Only structural problems fail: a `%` not followed by two hex digits,
/// or a malformed bracket path. Value-level oddities never error; they
/// surface as plain strings in the decoded tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QsError {
    /// A `%` escape without two hex digits after it.
    #[error("invalid percent escape in {0:?}")]
    InvalidEscape(String),
    /// A `[` in a key with no matching `]`.
    #[error("unterminated bracket in key {0:?}")]
    UnterminatedBracket(String),
    /// Characters between or after bracket groups, e.g. `a[b]c`.
    #[error("unexpected characters after bracket group in key {0:?}")]
    TrailingKey(String),
}

/// The decoded querystring: one value tree per top-level key.
///
/// ```
/// use setra_qs::parse_query;
///
/// let params = parse_query("filter[limit]=10&set[actives]=").unwrap();
/// assert_eq!(params.filter().limit, Some(10));
/// assert!(!params.set().is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    roots: IndexMap<SmolStr, Value>,
}

impl QueryParams {
    /// An empty parameter map.
    pub fn new() -> Self {
        Self::default()
    }

    /// True if the querystring carried no pairs.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Borrow the decoded tree under a top-level key.
    pub fn get(&self, root: &str) -> Option<&Value> {
        self.roots.get(root)
    }

    /// Decode the `set` root into a [`Set`]. Absent or malformed input
    /// yields the empty set.
    pub fn set(&self) -> Set {
        self.get("set")
            .cloned()
            .map(Set::from_value)
            .unwrap_or_default()
    }

    /// Decode the `filter` root into a [`Filter`]. Absent or malformed
    /// input yields the empty filter.
    pub fn filter(&self) -> Filter {
        self.get("filter")
            .cloned()
            .map(Filter::from_value)
            .unwrap_or_default()
    }

    /// Iterate the top-level keys in querystring order.
    pub fn roots(&self) -> impl Iterator<Item = (&SmolStr, &Value)> {
        self.roots.iter()
    }

    fn insert_path(&mut self, root: SmolStr, segments: &[Segment], leaf: Value) {
        let slot = self.roots.entry(root).or_insert(Value::Null);
        insert(slot, segments, leaf);
    }
}

/// Decode a whole querystring. A leading `?` is ignored, empty pairs are
/// skipped, and a key without `=` decodes to the empty string. Repeated
/// paths follow last-wins semantics.
pub fn parse_query(query: &str) -> Result<QueryParams, QsError> {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut params = QueryParams::new();
    let mut pairs = 0usize;
    for pair in query.split('&') {
        if pair.is_empty() {
            continue;
        }
        let (raw_key, raw_value) = match pair.split_once('=') {
            Some((key, value)) => (key, value),
            None => (pair, ""),
        };
        let key = decode_component(raw_key)?;
        let value = decode_component(raw_value)?;
        let (root, segments) = parse_key(&key)?;
        params.insert_path(root, &segments, Value::String(value.into()));
        pairs += 1;
    }
    debug!(pairs, "decoded query string");
    Ok(params)
}

/// One step of a bracket path.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// `[name]`: descend into an object key.
    Key(SmolStr),
    /// `[3]`: descend into an array position.
    Index(usize),
    /// `[]`: append to an array.
    Append,
}

impl Segment {
    fn parse(text: &str) -> Self {
        if text.is_empty() {
            return Segment::Append;
        }
        if text.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(index) = text.parse::<usize>() {
                if index <= ARRAY_LIMIT {
                    return Segment::Index(index);
                }
            }
        }
        Segment::Key(text.into())
    }
}

fn parse_key(key: &str) -> Result<(SmolStr, Vec<Segment>), QsError> {
    let Some(open) = key.find('[') else {
        return Ok((key.into(), Vec::new()));
    };
    let root = &key[..open];
    let mut segments = Vec::new();
    let mut rest = &key[open..];
    while !rest.is_empty() {
        let Some(inner) = rest.strip_prefix('[') else {
            return Err(QsError::TrailingKey(key.to_string()));
        };
        let Some(close) = inner.find(']') else {
            return Err(QsError::UnterminatedBracket(key.to_string()));
        };
        segments.push(Segment::parse(&inner[..close]));
        rest = &inner[close + 1..];
    }
    Ok((root.into(), segments))
}

/// Percent-decode one key or value. `+` decodes to a space; decoded
/// bytes that are not valid UTF-8 are replaced rather than rejected.
fn decode_component(raw: &str) -> Result<String, QsError> {
    let src = raw.as_bytes();
    let mut bytes = Vec::with_capacity(src.len());
    let mut i = 0;
    while i < src.len() {
        match src[i] {
            b'%' => {
                let escape = (src.get(i + 1).copied(), src.get(i + 2).copied());
                let (Some(hi), Some(lo)) = escape else {
                    return Err(QsError::InvalidEscape(raw.to_string()));
                };
                let (Some(hi), Some(lo)) = (hex_value(hi), hex_value(lo)) else {
                    return Err(QsError::InvalidEscape(raw.to_string()));
                };
                bytes.push((hi << 4) | lo);
                i += 3;
            }
            b'+' => {
                bytes.push(b' ');
                i += 1;
            }
            byte => {
                bytes.push(byte);
                i += 1;
            }
        }
    }
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

/// Place a leaf at the end of a bracket path, materializing containers
/// along the way. A container mismatch (object where the path wants an
/// array, scalar where it wants either) is resolved by replacing the
/// existing value.
fn insert(slot: &mut Value, path: &[Segment], leaf: Value) {
    let Some((segment, rest)) = path.split_first() else {
        *slot = leaf;
        return;
    };
    match segment {
        Segment::Key(key) => {
            if !matches!(slot, Value::Object(_)) {
                *slot = Value::Object(IndexMap::new());
            }
            if let Value::Object(map) = slot {
                insert(map.entry(key.clone()).or_insert(Value::Null), rest, leaf);
            }
        }
        Segment::Index(index) => {
            if !matches!(slot, Value::List(_)) {
                *slot = Value::List(Vec::new());
            }
            if let Value::List(items) = slot {
                if items.len() <= *index {
                    items.resize(index + 1, Value::Null);
                }
                insert(&mut items[*index], rest, leaf);
            }
        }
        Segment::Append => {
            if !matches!(slot, Value::List(_)) {
                *slot = Value::List(Vec::new());
            }
            if let Value::List(items) = slot {
                items.push(Value::Null);
                let end = items.len() - 1;
                insert(&mut items[end], rest, leaf);
            }
        }
    }
}
