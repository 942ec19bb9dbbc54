//! Pagination types for connection queries.
//!
//! These types implement Relay-style forward cursor pagination over an
//! ordered list of related identifiers. A cursor encodes an absolute,
//! zero-based offset into that list; a [`Window`] is the half-open range
//! of offsets materialized for one page request.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::error::{ResolveError, ResolveResult};
use crate::models::EntityId;

/// Literal tag prepended to the offset before base64 encoding.
const CURSOR_TAG: &str = "cursor";

// =============================================================================
// Cursor Codec
// =============================================================================

/// Opaque cursor for pagination.
///
/// The cursor value is implementation-specific and should be treated
/// as an opaque token by clients. It is only meaningful relative to the
/// identifier list it was issued for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cursor {
    pub value: String,
}

impl Cursor {
    /// Encode a zero-based offset as a cursor.
    pub fn encode(offset: usize) -> Self {
        Self {
            value: BASE64.encode(format!("{CURSOR_TAG}{offset}")),
        }
    }

    /// Decode a cursor string back to its offset.
    ///
    /// Only strings produced by [`Cursor::encode`] are accepted: the digits
    /// must be canonical (no sign, no leading zeros).
    pub fn decode(value: &str) -> ResolveResult<usize> {
        let bytes = BASE64
            .decode(value)
            .map_err(|e| ResolveError::InvalidCursor(format!("malformed encoding: {e}")))?;

        let text = String::from_utf8(bytes)
            .map_err(|_| ResolveError::InvalidCursor("cursor is not valid UTF-8".into()))?;

        let digits = text
            .strip_prefix(CURSOR_TAG)
            .ok_or_else(|| ResolveError::InvalidCursor("missing cursor tag".into()))?;

        let canonical = !digits.is_empty()
            && digits.bytes().all(|b| b.is_ascii_digit())
            && (digits == "0" || !digits.starts_with('0'));
        if !canonical {
            return Err(ResolveError::InvalidCursor(format!(
                "offset '{digits}' is not a non-negative integer"
            )));
        }

        digits
            .parse()
            .map_err(|_| ResolveError::InvalidCursor(format!("offset '{digits}' is out of range")))
    }
}

// =============================================================================
// Arguments
// =============================================================================

/// Forward pagination arguments for a connection field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionArgs {
    /// Maximum number of edges to return. `None` returns everything.
    pub first: Option<usize>,
    /// Cursor of the edge to start after.
    pub after: Option<String>,
}

impl ConnectionArgs {
    pub fn new(first: Option<usize>, after: Option<String>) -> Self {
        Self { first, after }
    }
}

// =============================================================================
// Identifier Window
// =============================================================================

/// Half-open offset range `[from, to)` over an identifier list.
///
/// `from <= to` always holds. `from` may exceed the list length when the
/// caller resumes from a cursor issued before the list shrank; the window
/// is then empty. Windows are only built by [`Window::compute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    from: usize,
    to: usize,
}

impl Window {
    /// Compute the window for a list of `list_len` identifiers.
    ///
    /// - no `after`: start at offset 0, otherwise start right after the
    ///   decoded offset;
    /// - no `first`: run to the end of the list, otherwise take at most
    ///   `first` items (oversized values are clamped, not rejected).
    pub fn compute(list_len: usize, after: Option<&str>, first: Option<usize>) -> ResolveResult<Self> {
        let from = match after {
            Some(cursor) => Cursor::decode(cursor)?.saturating_add(1),
            None => 0,
        };

        let to = match first {
            Some(n) => from.saturating_add(n).min(list_len),
            None => list_len,
        };

        Ok(Self {
            from,
            to: to.max(from),
        })
    }

    /// Convenience wrapper over [`Window::compute`] taking [`ConnectionArgs`].
    pub fn for_args(list_len: usize, args: &ConnectionArgs) -> ResolveResult<Self> {
        Self::compute(list_len, args.after.as_deref(), args.first)
    }

    /// First offset in the window.
    pub fn from(&self) -> usize {
        self.from
    }

    /// One past the last offset in the window.
    pub fn to(&self) -> usize {
        self.to
    }

    /// Number of offsets covered.
    pub fn len(&self) -> usize {
        self.to - self.from
    }

    pub fn is_empty(&self) -> bool {
        self.from == self.to
    }

    /// Identifiers inside the window, clamped to the list bounds.
    pub fn slice<'a>(&self, ids: &'a [EntityId]) -> &'a [EntityId] {
        let from = self.from.min(ids.len());
        let to = self.to.min(ids.len());
        &ids[from..to]
    }

    /// Page info for this window relative to a list of `list_len` items.
    pub fn page_info(&self, list_len: usize) -> PageInfo {
        let (start_cursor, end_cursor) = if self.is_empty() {
            (None, None)
        } else {
            (Some(Cursor::encode(self.from)), Some(Cursor::encode(self.to - 1)))
        };

        PageInfo {
            has_next_page: self.to < list_len,
            has_previous_page: self.from > 0,
            start_cursor,
            end_cursor,
        }
    }
}

// =============================================================================
// Connection
// =============================================================================

/// Paginated result set with edges and page info.
///
/// This is the Relay connection pattern for cursor-based pagination.
#[derive(Debug, Clone)]
pub struct Connection<T> {
    /// List of edges (node + cursor pairs).
    pub edges: Vec<Edge<T>>,
    /// Information about the current page.
    pub page_info: PageInfo,
    /// Total number of related items, regardless of the window.
    pub total_count: usize,
}

/// A single item in a paginated result.
#[derive(Debug, Clone)]
pub struct Edge<T> {
    /// The actual item.
    pub node: T,
    /// Cursor for this item (absolute offset in the identifier list).
    pub cursor: Cursor,
}

/// Information about the current page in a paginated result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageInfo {
    /// Whether there are more items after this page.
    pub has_next_page: bool,
    /// Whether there are items before this page.
    pub has_previous_page: bool,
    /// Cursor of the first item in this page (`None` for an empty page).
    pub start_cursor: Option<Cursor>,
    /// Cursor of the last item in this page (`None` for an empty page).
    pub end_cursor: Option<Cursor>,
}
