// ── Request parsing ──
//
// Requests are ASCII, whitespace separated. `GET <category>...` asks for a
// merged, compressed reply; a bare `<category>` asks for that record alone,
// uncompressed.

use tracing::warn;

use crate::record::Category;

/// Keyword opening a multi-category request.
pub const GET: &str = "GET";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("empty request")]
    Empty,

    #[error("unknown category '{0}'")]
    UnknownCategory(String),
}

/// A parsed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// `GET a b c`: merged per-device reply, deflated.
    Multi(Vec<Category>),
    /// Bare category name: one uncompressed record per device.
    Single(Category),
}

impl Request {
    /// The request push mode synthesizes every cycle.
    pub fn full() -> Self {
        Self::Multi(Category::ALL.to_vec())
    }

    /// Parse a raw datagram. Unknown categories inside a `GET` are logged
    /// and skipped; duplicates are collapsed in first-seen order.
    pub fn parse(payload: &[u8]) -> Result<Self, RequestError> {
        let text = String::from_utf8_lossy(payload);
        let mut tokens = text
            .trim_matches(|c: char| c == '\0' || c.is_whitespace())
            .split_whitespace();

        let first = tokens.next().ok_or(RequestError::Empty)?;
        if first != GET {
            return first
                .parse::<Category>()
                .map(Self::Single)
                .map_err(|_| RequestError::UnknownCategory(first.to_owned()));
        }

        let mut categories = Vec::with_capacity(Category::ALL.len());
        for token in tokens {
            match token.parse::<Category>() {
                Ok(category) if !categories.contains(&category) => categories.push(category),
                Ok(_) => {}
                Err(_) => warn!(category = token, "skipping unknown category in request"),
            }
        }
        Ok(Self::Multi(categories))
    }

    pub fn categories(&self) -> &[Category] {
        match self {
            Self::Multi(categories) => categories,
            Self::Single(category) => std::slice::from_ref(category),
        }
    }

    /// Whether replies to this request are deflated.
    pub fn compressed(&self) -> bool {
        matches!(self, Self::Multi(_))
    }
}
