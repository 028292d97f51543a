//! Realm implementations.
//!
//! ```text
//! AccountStoreRealm ──► AccountStore (trait)
//!        │                    └── MemoryAccountStore
//!        ├── cache: primary identifier → IndexedAuthorizationInfo
//!        └── IndexedPermissionVerifier / SimpleRoleVerifier
//! ```

mod account;
mod store;

pub use account::AccountStoreRealm;
pub use store::{AccountAuthz, AccountStore, MemoryAccountStore};
