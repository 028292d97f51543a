//! Core types for the warden authorization engine.
//!
//! This crate holds the vocabulary shared by every other warden crate.
//! It carries no authorization logic of its own.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Capability Layer                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  warden-types   : identities, ids, combinator  ◄── HERE      │
//! │  warden-event   : Topic, Event, EventBus trait              │
//! │  warden-auth    : Permission, authz info, verifiers, Realm  │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Runtime Layer                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  warden-runtime : ModularRealmAuthorizer, LocalEventBus,    │
//! │                   AccountStoreRealm, SecurityManager        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use warden_types::{IdentifierCollection, LogicalOperator};
//!
//! let ids = IdentifierCollection::new("accounts", "alice");
//! assert_eq!(ids.primary_identifier(), Some("alice"));
//!
//! assert!(LogicalOperator::All.apply([true, true]));
//! assert!(LogicalOperator::Any.apply([false, true]));
//! ```

mod error;
mod id;
mod identity;
mod operator;

pub use error::{assert_error_code, assert_error_codes, ErrorCode};
pub use id::{EventId, SessionId};
pub use identity::IdentifierCollection;
pub use operator::{LogicalOperator, ParseOperatorError};
