//! Interned names for declarations, namespace entries and hierarchy nodes.
//!
//! Every name that takes part in index lookups (frame names, file names,
//! template path segments) is stored as an [`Id`]. Comparing and hashing an
//! `Id` is a symbol comparison; the string is only materialized for display
//! and path building.

use std::{
    fmt,
    sync::{Mutex, OnceLock},
};

use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Process-wide interner shared by all workspaces.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn interner() -> std::sync::MutexGuard<'static, DefaultStringInterner> {
    INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .expect("Failed to acquire interner lock")
}

/// An interned declaration name.
///
/// # Examples
///
/// ```
/// use uidesc_core::identifier::Id;
///
/// let a = Id::new("GameUI");
/// let b = Id::new("GameUI");
/// assert_eq!(a, b);
/// assert_eq!(a, "GameUI");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Interns `name` and returns its identifier.
    pub fn new(name: &str) -> Self {
        Self(interner().get_or_intern(name))
    }

    /// Builds the synthesized name `{prefix}_{idx}` used for anonymous
    /// declarations.
    ///
    /// ```
    /// use uidesc_core::identifier::Id;
    ///
    /// assert_eq!(Id::anonymous("Button", 3), "Button_3");
    /// ```
    pub fn anonymous(prefix: &str, idx: usize) -> Self {
        Self::new(&format!("{prefix}_{idx}"))
    }

    /// Returns the interned string, owned.
    pub fn as_string(&self) -> String {
        interner()
            .resolve(self.0)
            .expect("Symbol should exist in interner")
            .to_string()
    }

    /// Joins a sequence of identifiers into a `/`-delimited path.
    ///
    /// ```
    /// use uidesc_core::identifier::Id;
    ///
    /// let path = Id::join_path(&[Id::new("Main"), Id::new("Title")]);
    /// assert_eq!(path, "Main/Title");
    /// ```
    pub fn join_path(segments: &[Id]) -> String {
        let interner = interner();
        let mut out = String::new();
        for (i, seg) in segments.iter().enumerate() {
            if i > 0 {
                out.push('/');
            }
            out.push_str(
                interner
                    .resolve(seg.0)
                    .expect("Symbol should exist in interner"),
            );
        }
        out
    }

    /// Splits a `/`-delimited path into identifiers, skipping empty segments.
    pub fn split_path(path: &str) -> Vec<Id> {
        path.split('/')
            .filter(|seg| !seg.is_empty())
            .map(Id::new)
            .collect()
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let interner = interner();
        let value = interner
            .resolve(self.0)
            .expect("Symbol should exist in interner");
        f.write_str(value)
    }
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    fn eq(&self, other: &str) -> bool {
        let interner = interner();
        interner
            .resolve(self.0)
            .is_some_and(|value| value == other)
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interning_is_stable() {
        let a = Id::new("Frame");
        let b = Id::new("Frame");
        let c = Id::new("Animation");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, "Frame");
    }

    #[test]
    fn test_anonymous() {
        assert_eq!(Id::anonymous("Label", 0), "Label_0");
        assert_ne!(Id::anonymous("Label", 0), Id::anonymous("Label", 1));
    }

    #[test]
    fn test_join_and_split_path() {
        let segments = Id::split_path("GameUI//Main/Title/");
        assert_eq!(segments.len(), 3);
        assert_eq!(Id::join_path(&segments), "GameUI/Main/Title");
        assert_eq!(Id::join_path(&[]), "");
    }

    #[test]
    fn test_display_and_as_string() {
        let id = Id::new("display_test");
        assert_eq!(format!("{id}"), "display_test");
        assert_eq!(id.as_string(), "display_test");
    }

    #[test]
    fn test_eq_str_ref() {
        let id = Id::new("Button");
        let name = String::from("Button");
        assert!(id == name.as_str());
        assert!(id != "Label");
    }
}
