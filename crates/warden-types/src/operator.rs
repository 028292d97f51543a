//! The `all` / `any` combinator applied across requested items.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Reduction applied across the per-item verdicts of a collective check.
///
/// Reduction over no items follows the usual fold identities:
/// `All` yields `true`, `Any` yields `false`.
///
/// # Example
///
/// ```
/// use warden_types::LogicalOperator;
///
/// assert!(!LogicalOperator::All.apply([true, false]));
/// assert!(LogicalOperator::Any.apply([true, false]));
/// assert!(LogicalOperator::All.apply(std::iter::empty()));
/// assert!(!LogicalOperator::Any.apply(std::iter::empty()));
///
/// let op: LogicalOperator = "any".parse().unwrap();
/// assert_eq!(op, LogicalOperator::Any);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalOperator {
    /// Every item must be granted.
    #[default]
    All,
    /// At least one item must be granted.
    Any,
}

impl LogicalOperator {
    /// Folds `verdicts` into one boolean.
    pub fn apply<I>(self, verdicts: I) -> bool
    where
        I: IntoIterator<Item = bool>,
    {
        let mut verdicts = verdicts.into_iter();
        match self {
            Self::All => verdicts.all(|v| v),
            Self::Any => verdicts.any(|v| v),
        }
    }

    /// Returns the lowercase name (`"all"` / `"any"`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Any => "any",
        }
    }
}

impl std::fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when text names neither `all` nor `any`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown logical operator '{0}', expected 'all' or 'any'")]
pub struct ParseOperatorError(pub String);

impl FromStr for LogicalOperator {
    type Err = ParseOperatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "any" => Ok(Self::Any),
            _ => Err(ParseOperatorError(s.to_string())),
        }
    }
}
