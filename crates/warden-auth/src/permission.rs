//! Wildcard permissions.
//!
//! A permission is written `domain[:action[:target]]`. Each part is a
//! comma-separated set of tokens, and the token `*` matches anything.
//!
//! ```text
//! doc:read,write:report-42
//! ─┬─ ─────┬──── ────┬────
//!  │       │         └─ target part (optional)
//!  │       └─ action part (optional)
//!  └─ domain part (required)
//! ```
//!
//! Tokens are trimmed and lowercased at parse time, so `Doc:READ` and
//! `doc:read` are the same permission.
//!
//! # Implication
//!
//! A granted permission `A` implies a requested permission `B` when, for
//! every part of `B`, `A` either has no such part, or `A`'s part contains
//! `*`, or `A`'s part is a superset of `B`'s part. Any parts `A` has
//! beyond `B`'s length must contain `*`.
//!
//! | Granted | Requested | Implies |
//! |---------|-----------|---------|
//! | `doc` | `doc:read:42` | yes |
//! | `doc:*:42` | `doc:read:42` | yes |
//! | `doc:read,write` | `doc:read` | yes |
//! | `doc:read` | `doc` | no |
//! | `doc:read:*` | `doc:read` | yes |
//! | `*` | `anything:at:all` | yes |

use crate::AuthzError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

/// The token that matches any token in the same position.
pub const WILDCARD_TOKEN: &str = "*";

/// Separates the domain, action and target parts.
pub const PART_DIVIDER: char = ':';

/// Separates tokens inside one part.
pub const SUBPART_DIVIDER: char = ',';

/// Maximum number of parts (domain, action, target).
pub const MAX_PARTS: usize = 3;

/// A parsed wildcard permission.
///
/// Immutable once parsed. Ordering and equality are structural, so
/// `doc:*` and `doc` compare unequal even though each implies the other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Permission {
    parts: Vec<BTreeSet<String>>,
}

impl Permission {
    /// Parses permission text.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::InvalidFormat`] if the text is empty, has
    /// more than [`MAX_PARTS`] parts, or any part has no tokens.
    pub fn parse(text: &str) -> Result<Self, AuthzError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(AuthzError::invalid_format(text, "permission text is empty"));
        }

        let raw_parts: Vec<&str> = trimmed.split(PART_DIVIDER).collect();
        if raw_parts.len() > MAX_PARTS {
            return Err(AuthzError::invalid_format(
                text,
                "at most three parts (domain:action:target) are allowed",
            ));
        }

        let mut parts = Vec::with_capacity(raw_parts.len());
        for (index, raw) in raw_parts.into_iter().enumerate() {
            let tokens: BTreeSet<String> = raw
                .split(SUBPART_DIVIDER)
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_lowercase)
                .collect();
            if tokens.is_empty() {
                let reason = if index == 0 {
                    "domain part is empty"
                } else {
                    "a part contains only dividers"
                };
                return Err(AuthzError::invalid_format(text, reason));
            }
            parts.push(tokens);
        }

        Ok(Self { parts })
    }

    /// The all-powerful `*` permission.
    #[must_use]
    pub fn wildcard() -> Self {
        Self {
            parts: vec![BTreeSet::from([WILDCARD_TOKEN.to_string()])],
        }
    }

    /// All parts, domain first.
    #[must_use]
    pub fn parts(&self) -> &[BTreeSet<String>] {
        &self.parts
    }

    /// Domain tokens. Always present.
    #[must_use]
    pub fn domain(&self) -> &BTreeSet<String> {
        // parse() guarantees at least one part
        &self.parts[0]
    }

    /// Action tokens, if an action part was written.
    #[must_use]
    pub fn action(&self) -> Option<&BTreeSet<String>> {
        self.parts.get(1)
    }

    /// Target tokens, if a target part was written.
    #[must_use]
    pub fn target(&self) -> Option<&BTreeSet<String>> {
        self.parts.get(2)
    }

    /// Returns `true` if holding `self` grants `requested`.
    #[must_use]
    pub fn implies(&self, requested: &Permission) -> bool {
        for (index, wanted) in requested.parts.iter().enumerate() {
            match self.parts.get(index) {
                // Shorter grants are implicitly wildcarded.
                None => return true,
                Some(held) => {
                    if !is_wildcard_part(held) && !held.is_superset(wanted) {
                        return false;
                    }
                }
            }
        }

        self.parts
            .iter()
            .skip(requested.parts.len())
            .all(is_wildcard_part)
    }
}

/// Returns `true` if `part` contains the [`WILDCARD_TOKEN`].
#[must_use]
pub fn is_wildcard_part(part: &BTreeSet<String>) -> bool {
    part.contains(WILDCARD_TOKEN)
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (index, part) in self.parts.iter().enumerate() {
            if index > 0 {
                write!(f, "{PART_DIVIDER}")?;
            }
            for (i, token) in part.iter().enumerate() {
                if i > 0 {
                    write!(f, "{SUBPART_DIVIDER}")?;
                }
                f.write_str(token)?;
            }
        }
        Ok(())
    }
}

impl FromStr for Permission {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Permission {
    type Error = AuthzError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Permission> for String {
    fn from(value: Permission) -> Self {
        value.to_string()
    }
}
