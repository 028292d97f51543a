//! Event system for warden.
//!
//! The authorizer talks to the rest of the process only through an
//! in-process publish/subscribe bus. Two flows use it:
//!
//! ```text
//!  outbound (authorizer publishes)          inbound (authorizer subscribes)
//!
//!  ModularRealmAuthorizer                   session / authc subsystems
//!     │ AUTHORIZATION.GRANTED                  │ SESSION.STOP
//!     │ AUTHORIZATION.DENIED                   │ SESSION.EXPIRE
//!     │ AUTHORIZATION.RESULTS                  │ AUTHENTICATION.SUCCEEDED
//!     ▼                                        ▼
//!  ┌──────────────────────── EventBus ─────────────────────────┐
//!  └───────────────────────────────────────────────────────────┘
//!     │                                        │
//!     ▼                                        ▼
//!  audit / metrics subscribers             authorizer listeners
//!                                           └─► realm.clear_cached_authorization_info()
//! ```
//!
//! This crate defines the message types and the [`EventBus`] capability
//! trait. The synchronous in-process implementation lives in
//! `warden-runtime`.
//!
//! # Usage
//!
//! ```
//! use warden_event::{Event, Payload, Topic};
//! use warden_types::IdentifierCollection;
//!
//! let ids = IdentifierCollection::new("accounts", "alice");
//! let event = Event::new(Topic::AuthenticationSucceeded, Payload::authentication(ids));
//!
//! assert_eq!(event.topic.as_str(), "AUTHENTICATION.SUCCEEDED");
//! assert_eq!(event.payload.identifier().and_then(|i| i.primary_identifier()), Some("alice"));
//! ```

mod bus;
mod error;
mod event;
mod topic;

pub use bus::{EventBus, Handler, Listener, ListenerId};
pub use error::EventError;
pub use event::{AuthorizationPayload, AuthzItem, Event, Payload, SessionPayload};
pub use topic::Topic;
