//! Key ranges for scans and bulk operations.

use std::borrow::Cow;

/// The set of keys an operation applies to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyRange {
    /// Exactly this key.
    Exact(String),
    /// The key itself and every key under `key + "/"`.
    ///
    /// Siblings that merely share the string prefix (`key-old`, `keyboard`)
    /// are not included.
    Subtree(String),
    /// Every key starting with this string.
    Prefix(String),
    /// Keys without a `/`: the workspace roots.
    TopLevel,
    /// The whole table.
    All,
}

/// A lexically contiguous run of keys.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Span<'a> {
    Key(&'a str),
    Prefix(Cow<'a, str>),
    /// Not contiguous; backends filter on [`KeyRange::contains`].
    TopLevel,
}

impl KeyRange {
    pub fn exact(key: impl Into<String>) -> Self {
        KeyRange::Exact(key.into())
    }

    pub fn subtree(key: impl Into<String>) -> Self {
        KeyRange::Subtree(key.into())
    }

    pub fn prefix(prefix: impl Into<String>) -> Self {
        KeyRange::Prefix(prefix.into())
    }

    pub fn contains(&self, key: &str) -> bool {
        match self {
            KeyRange::Exact(k) => key == k,
            KeyRange::Subtree(k) => {
                key == k
                    || key
                        .strip_prefix(k.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            }
            KeyRange::Prefix(p) => key.starts_with(p.as_str()),
            KeyRange::TopLevel => !key.contains('/'),
            KeyRange::All => true,
        }
    }

    /// Contiguous runs covering this range, in ascending key order.
    ///
    /// A subtree is not contiguous: `a-b` and `a.txt` sort between `a` and
    /// `a/`, so it is split into the key itself and the `a/` prefix run.
    pub(crate) fn spans(&self) -> Vec<Span<'_>> {
        match self {
            KeyRange::Exact(k) => vec![Span::Key(k)],
            KeyRange::Subtree(k) => vec![Span::Key(k), Span::Prefix(Cow::Owned(format!("{}/", k)))],
            KeyRange::Prefix(p) => vec![Span::Prefix(Cow::Borrowed(p))],
            KeyRange::TopLevel => vec![Span::TopLevel],
            KeyRange::All => vec![Span::Prefix(Cow::Borrowed(""))],
        }
    }
}

impl std::fmt::Display for KeyRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyRange::Exact(k) => write!(f, "{}", k),
            KeyRange::Subtree(k) => write!(f, "{}/**", k),
            KeyRange::Prefix(p) => write!(f, "{}*", p),
            KeyRange::TopLevel => write!(f, "*/"),
            KeyRange::All => write!(f, "*"),
        }
    }
}
