mod protocol;
pub mod routes;
mod service;

pub use protocol::*;
pub use routes::{build_routes, AppState};
pub use service::*;
