//! Staff Portal
//! Mission: Announcements, leave, absences, salaries, research and notifications, gated by role

pub mod api;
pub mod models;
pub mod repository;
pub mod seed;
pub mod service;

pub use api::{portal_router, PortalState};
pub use repository::{PortalError, PortalResult};
pub use service::{PortalRepositories, PortalService};
