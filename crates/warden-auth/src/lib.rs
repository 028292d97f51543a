//! Permission model and realm capabilities for warden.
//!
//! This crate holds the pure decision logic: nothing here publishes
//! events or touches configuration.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 Realm (trait)                │
//! │   is_permitted · has_role · cache_handler    │
//! └──────────────┬───────────────────────────────┘
//!                │ loads
//!                ▼
//! ┌──────────────────────────────────────────────┐
//! │          IndexedAuthorizationInfo            │
//! │   roles + { domain → {PermissionEntry} }     │
//! └──────────────┬───────────────────────────────┘
//!                │ consulted by
//!                ▼
//! ┌──────────────────────┐  ┌───────────────────┐
//! │ IndexedPermission-   │  │ SimpleRoleVerifier│
//! │ Verifier             │  │                   │
//! │  Permission::implies │  │  set membership   │
//! └──────────────────────┘  └───────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use warden_auth::{IndexedAuthorizationInfo, IndexedPermissionVerifier, Permission, PermissionVerifier};
//!
//! let info = IndexedAuthorizationInfo::from_parts(["editor"], ["doc:read,write", "*:audit"]);
//! let wanted = [Permission::parse("doc:write")?, Permission::parse("doc:delete")?];
//!
//! let verdicts = IndexedPermissionVerifier.is_permitted(&info, &wanted)?;
//! assert!(verdicts[0].1);
//! assert!(!verdicts[1].1);
//! # Ok::<(), warden_auth::AuthzError>(())
//! ```

mod authz_info;
mod error;
pub mod permission;
mod realm;
mod verifier;

pub use authz_info::{IndexedAuthorizationInfo, PermissionEntry};
pub use error::{AuthzError, ItemKind};
pub use permission::{Permission, WILDCARD_TOKEN};
pub use realm::{AuthorizationCacheHandler, Realm};
pub use verifier::{
    IndexedPermissionVerifier, PermissionVerifier, RoleVerifier, SimpleRoleVerifier,
};
