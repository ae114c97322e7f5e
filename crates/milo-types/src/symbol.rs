use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A label identified purely by its text.
///
/// Symbols name every type tag, object name and cross-reference in a scene.
/// Two symbols are equal when their text is equal; there is no global intern
/// table, so a `Symbol` built in a test compares equal to one decoded from a
/// stream.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Create a symbol from any string-like value.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The empty symbol. Used for absent references.
    pub fn empty() -> Self {
        Self(String::new())
    }

    /// The symbol text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the symbol has no text.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of characters in the symbol.
    ///
    /// Symbols are encoded one byte per character, so this is also the
    /// encoded payload length.
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }

    /// Consume the symbol and return its text.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({:?})", self.0)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(text: &str) -> Self {
        Self(text.to_owned())
    }
}

impl From<String> for Symbol {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Symbol {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Symbol {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn equality_is_by_value() {
        let a = Symbol::new("ObjectDir");
        let b = Symbol::from(String::from("ObjectDir"));
        assert_eq!(a, b);
        assert_eq!(a, "ObjectDir");
        assert_ne!(a, Symbol::new("RndDir"));
    }

    #[test]
    fn empty_symbol() {
        let s = Symbol::empty();
        assert!(s.is_empty());
        assert_eq!(s, Symbol::default());
        assert_eq!(s.char_len(), 0);
    }

    #[test]
    fn borrow_lookup_in_map() {
        let mut map = HashMap::new();
        map.insert(Symbol::new("BandSongPref"), 1);
        assert_eq!(map.get("BandSongPref"), Some(&1));
    }

    #[test]
    fn display_and_debug() {
        let s = Symbol::new("song.milo");
        assert_eq!(s.to_string(), "song.milo");
        assert_eq!(format!("{s:?}"), "Symbol(\"song.milo\")");
    }

    #[test]
    fn serde_is_transparent() {
        let s = Symbol::new("cam01");
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, "\"cam01\"");
        let parsed: Symbol = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, s);
    }
}
