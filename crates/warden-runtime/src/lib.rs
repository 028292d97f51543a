//! Runtime layer for the warden authorization engine.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    SecurityManager                           │
//! │   from_config · check_* · session_stopped / _expired · authc │
//! └──────────────┬──────────────────────────────┬───────────────┘
//!                │                              │
//!                ▼                              ▼
//! ┌──────────────────────────────┐   ┌──────────────────────────┐
//! │   ModularRealmAuthorizer     │──►│      LocalEventBus        │
//! │  fan-out · OR · all/any      │   │  AUTHORIZATION.*          │
//! │  cache-clear listeners       │◄──│  SESSION.* · AUTHC.*      │
//! └──────────────┬───────────────┘   └──────────────────────────┘
//!                │
//!                ▼
//! ┌──────────────────────────────┐
//! │  AccountStoreRealm           │
//! │  cache ─► AccountStore        │
//! └──────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`authorizer`] | [`ModularRealmAuthorizer`] |
//! | [`eventbus`] | [`LocalEventBus`] |
//! | [`realm`] | [`AccountStoreRealm`], [`AccountStore`], [`MemoryAccountStore`] |
//! | [`manager`] | [`SecurityManager`] |
//! | [`config`] | [`WardenConfig`](config::WardenConfig), [`ConfigLoader`](config::ConfigLoader) |
//! | [`logging`] | tracing subscriber setup |

pub mod authorizer;
pub mod config;
pub mod eventbus;
pub mod logging;
pub mod manager;
pub mod realm;

pub use authorizer::{ModularRealmAuthorizer, AUTHC_CACHE_LISTENER, SESSION_CACHE_LISTENER};
pub use eventbus::LocalEventBus;
pub use manager::SecurityManager;
pub use realm::{AccountAuthz, AccountStore, AccountStoreRealm, MemoryAccountStore};
