//! Database Access
//! Mission: Share a bounded set of SQLite connections across concurrent requests

pub mod pool;

pub use pool::{DbError, DbPool, PoolConfig};
