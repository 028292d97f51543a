//! Identity (principal collection) types.
//!
//! An [`IdentifierCollection`] is the opaque token naming the subject
//! whose access is being checked. It records which realm vouched for
//! each identifier, and the first identifier added is the primary one.
//! Realms key their authorization caches by the primary identifier.

use serde::{Deserialize, Serialize};

/// A single identifier together with the realm that supplied it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
struct SourcedIdentifier {
    source: String,
    identifier: String,
}

/// Ordered collection of identifiers for one subject.
///
/// # Example
///
/// ```
/// use warden_types::IdentifierCollection;
///
/// let mut ids = IdentifierCollection::new("ldap", "alice");
/// ids.add("accounts", "alice@example.com");
///
/// assert_eq!(ids.primary_identifier(), Some("alice"));
/// assert_eq!(ids.from_source("accounts").collect::<Vec<_>>(), ["alice@example.com"]);
/// assert_eq!(ids.to_string(), "alice");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentifierCollection {
    entries: Vec<SourcedIdentifier>,
}

impl IdentifierCollection {
    /// Creates a collection holding one identifier from `source`.
    #[must_use]
    pub fn new(source: impl Into<String>, identifier: impl Into<String>) -> Self {
        let mut ids = Self::default();
        ids.add(source, identifier);
        ids
    }

    /// Appends an identifier. Exact duplicates are ignored.
    pub fn add(&mut self, source: impl Into<String>, identifier: impl Into<String>) {
        let entry = SourcedIdentifier {
            source: source.into(),
            identifier: identifier.into(),
        };
        if !self.entries.contains(&entry) {
            self.entries.push(entry);
        }
    }

    /// Returns the first identifier added, if any.
    #[must_use]
    pub fn primary_identifier(&self) -> Option<&str> {
        self.entries.first().map(|e| e.identifier.as_str())
    }

    /// Iterates identifiers supplied by `source`, in insertion order.
    pub fn from_source<'a>(&'a self, source: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |e| e.source == source)
            .map(|e| e.identifier.as_str())
    }

    /// Iterates the distinct source realm names, in insertion order.
    pub fn source_names(&self) -> impl Iterator<Item = &str> {
        let mut seen: Vec<&str> = Vec::new();
        self.entries.iter().filter_map(move |e| {
            if seen.contains(&e.source.as_str()) {
                None
            } else {
                seen.push(e.source.as_str());
                Some(e.source.as_str())
            }
        })
    }

    /// Returns `true` if no identifier has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl std::fmt::Display for IdentifierCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.primary_identifier() {
            Some(id) => write!(f, "{id}"),
            None => write!(f, "<anonymous>"),
        }
    }
}
