use std::fmt;

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Canonical form of a free-text location that is used for grouping
/// and as cache key.
///
/// The text is decomposed (NFD), stripped of all combining marks,
/// lower-cased and all whitespace runs are collapsed into a single
/// space. Normalizing an already normalized key yields the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NormalizedKey(String);

impl NormalizedKey {
    pub fn normalize(text: &str) -> Self {
        let stripped: String = text
            .nfd()
            .filter(|c| !is_combining_mark(*c))
            .flat_map(char::to_lowercase)
            .collect();
        let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
        // Lower-casing may produce decomposable characters again.
        if collapsed.nfd().any(is_combining_mark) {
            return Self::normalize(&collapsed);
        }
        Self(collapsed)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for NormalizedKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<NormalizedKey> for String {
    fn from(from: NormalizedKey) -> Self {
        from.0
    }
}

impl fmt::Display for NormalizedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
