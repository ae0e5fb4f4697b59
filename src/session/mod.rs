//! Client Session
//! Mission: Hold the issued token on the client side and present it on every protected call

pub mod client;
pub mod holder;
pub mod storage;

pub use client::{ClientError, PortalClient};
pub use holder::SessionHolder;
pub use storage::{FileSessionStorage, MemorySessionStorage, SessionStorage, StoredSession};
