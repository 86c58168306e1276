//! Feed request query parameters.
//!
//! A fetch is an HTTP GET whose query string carries:
//!
//! | Parameter | Meaning |
//! |-----------|---------|
//! | `n` | Partition count the client believes the server has |
//! | `cursor<id>` | Resume position for partition `<id>`, one per partition |
//! | `pagesizehint` | Optional page size hint, omitted when 0 |
//! | `headers` | Comma-separated header names, or `_all`, omitted when empty |

use crate::cursor::Cursor;
use crate::error::{ProtocolError, ProtocolResult};
use std::fmt::Write as _;

/// Query parameter carrying the partition count.
pub const PARTITION_COUNT_PARAM: &str = "n";

/// Query parameter carrying the page size hint.
pub const PAGE_SIZE_HINT_PARAM: &str = "pagesizehint";

/// Query parameter carrying the requested header names.
pub const HEADERS_PARAM: &str = "headers";

/// Prefix of the per-partition cursor parameters.
pub const CURSOR_PARAM_PREFIX: &str = "cursor";

/// `headers` value requesting every header the server has.
pub const ALL_HEADERS: &str = "_all";

/// Page size hint meaning "let the server decide".
pub const DEFAULT_PAGE_SIZE_HINT: u32 = 0;

/// Which event headers the client wants returned.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HeaderSelection {
    /// No headers.
    #[default]
    None,
    /// Every header available.
    All,
    /// The named headers, in the order given.
    Named(Vec<String>),
}

impl HeaderSelection {
    /// Creates a selection of named headers.
    pub fn named<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Named(names.into_iter().map(Into::into).collect())
    }

    /// Returns true if no headers are requested.
    pub fn is_empty(&self) -> bool {
        match self {
            HeaderSelection::None => true,
            HeaderSelection::All => false,
            HeaderSelection::Named(names) => names.is_empty(),
        }
    }

    /// Returns true if the given header should be returned.
    pub fn includes(&self, name: &str) -> bool {
        match self {
            HeaderSelection::None => false,
            HeaderSelection::All => true,
            HeaderSelection::Named(names) => names.iter().any(|n| n == name),
        }
    }

    /// Returns the wire value, or `None` when the parameter is omitted.
    pub fn to_param(&self) -> Option<String> {
        match self {
            HeaderSelection::None => None,
            HeaderSelection::All => Some(ALL_HEADERS.to_string()),
            HeaderSelection::Named(names) if names.is_empty() => None,
            HeaderSelection::Named(names) => Some(names.join(",")),
        }
    }

    /// Parses the wire value of the `headers` parameter.
    pub fn from_param(value: &str) -> Self {
        if value == ALL_HEADERS {
            return Self::All;
        }
        let names: Vec<String> = value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if names.is_empty() {
            Self::None
        } else {
            Self::Named(names)
        }
    }
}

/// Ordered query parameters.
///
/// Setting an existing name replaces its value in place, so the first
/// position and the last value win.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Creates an empty parameter list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a parameter, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(n, _)| *n == name) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((name, value)),
        }
    }

    /// Returns the value of a parameter.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Iterates over the parameters in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Returns the number of parameters.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns true if there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Returns the parameters as owned pairs.
    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.pairs
    }

    /// Renders an `application/x-www-form-urlencoded` query string
    /// (without the leading `?`).
    pub fn to_query_string(&self) -> String {
        let mut out = String::new();
        for (i, (name, value)) in self.pairs.iter().enumerate() {
            if i > 0 {
                out.push('&');
            }
            form_encode(&mut out, name);
            out.push('=');
            form_encode(&mut out, value);
        }
        out
    }
}

fn form_encode(out: &mut String, s: &str) {
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'*' => {
                out.push(byte as char)
            }
            b' ' => out.push('+'),
            _ => {
                let _ = write!(out, "%{:02X}", byte);
            }
        }
    }
}

/// Encodes a feed request into query parameters.
///
/// Fails with [`ProtocolError::NoCursors`] if `cursors` is empty. When a
/// partition appears more than once, the last cursor for it wins.
pub fn encode_query<'a, I>(
    cursors: I,
    partition_count: u32,
    page_size_hint: u32,
    headers: &HeaderSelection,
) -> ProtocolResult<QueryParams>
where
    I: IntoIterator<Item = &'a Cursor>,
{
    let mut params = QueryParams::new();
    params.set(PARTITION_COUNT_PARAM, partition_count.to_string());

    let mut any_cursor = false;
    for cursor in cursors {
        params.set(cursor.query_key(), cursor.value());
        any_cursor = true;
    }
    if !any_cursor {
        return Err(ProtocolError::NoCursors);
    }

    if page_size_hint != DEFAULT_PAGE_SIZE_HINT {
        params.set(PAGE_SIZE_HINT_PARAM, page_size_hint.to_string());
    }

    if let Some(value) = headers.to_param() {
        params.set(HEADERS_PARAM, value);
    }

    Ok(params)
}

/// A decoded feed request, as seen by a server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedQuery {
    /// Declared partition count.
    pub partition_count: u32,
    /// One cursor per requested partition, in first-appearance order.
    pub cursors: Vec<Cursor>,
    /// Page size hint; `None` lets the server decide.
    pub page_size_hint: Option<u32>,
    /// Requested headers.
    pub headers: HeaderSelection,
}

impl FeedQuery {
    /// Parses decoded query pairs. Unknown parameters are ignored.
    pub fn parse<I, K, V>(pairs: I) -> ProtocolResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut partition_count = None;
        let mut cursors: Vec<Cursor> = Vec::new();
        let mut page_size_hint = None;
        let mut headers = HeaderSelection::None;

        for (name, value) in pairs {
            let (name, value) = (name.as_ref(), value.as_ref());
            if name == PARTITION_COUNT_PARAM {
                partition_count = Some(value.parse::<u32>().map_err(|_| {
                    ProtocolError::InvalidQuery(format!("n is not a partition count: {value:?}"))
                })?);
            } else if name == PAGE_SIZE_HINT_PARAM {
                let hint = value.parse::<u32>().map_err(|_| {
                    ProtocolError::InvalidQuery(format!("pagesizehint is not a number: {value:?}"))
                })?;
                page_size_hint = (hint != DEFAULT_PAGE_SIZE_HINT).then_some(hint);
            } else if name == HEADERS_PARAM {
                headers = HeaderSelection::from_param(value);
            } else if let Some(suffix) = name.strip_prefix(CURSOR_PARAM_PREFIX) {
                let partition_id = suffix.parse::<u32>().map_err(|_| {
                    ProtocolError::InvalidQuery(format!("bad cursor parameter {name:?}"))
                })?;
                let cursor = Cursor::new(partition_id, value);
                match cursors.iter_mut().find(|c| c.partition_id() == partition_id) {
                    Some(existing) => *existing = cursor,
                    None => cursors.push(cursor),
                }
            }
        }

        let partition_count = partition_count
            .ok_or_else(|| ProtocolError::InvalidQuery("missing n".into()))?;
        if cursors.is_empty() {
            return Err(ProtocolError::InvalidQuery("no cursors given".into()));
        }

        Ok(Self {
            partition_count,
            cursors,
            page_size_hint,
            headers,
        })
    }

    /// Encodes back into query parameters.
    pub fn to_params(&self) -> ProtocolResult<QueryParams> {
        encode_query(
            &self.cursors,
            self.partition_count,
            self.page_size_hint.unwrap_or(DEFAULT_PAGE_SIZE_HINT),
            &self.headers,
        )
    }

    /// Returns the cursor given for a partition.
    pub fn cursor(&self, partition_id: u32) -> Option<&Cursor> {
        self.cursors.iter().find(|c| c.partition_id() == partition_id)
    }
}

/// Returns true if `name` is one of the parameters a feed request sets:
/// `n`, `pagesizehint`, `headers` or `cursor<id>`.
pub fn is_feed_param(name: &str) -> bool {
    name == PARTITION_COUNT_PARAM
        || name == PAGE_SIZE_HINT_PARAM
        || name == HEADERS_PARAM
        || name
            .strip_prefix(CURSOR_PARAM_PREFIX)
            .is_some_and(|id| !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()))
}
