//! Access Control
//! Mission: Decide what each staff role may see and change, without touching the database

pub mod permissions;
pub mod resolver;
pub mod roles;

pub use permissions::PermissionTable;
pub use resolver::{AccessResolver, Feature};
pub use roles::{AuthorityTier, Role};
