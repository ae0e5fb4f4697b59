pub mod routes;

pub use routes::{build_router, cors_layer, HealthResponse, RouterOptions};
