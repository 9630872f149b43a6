//! REST API implementation
//!
//! - types: response bodies and shared state
//! - extractors: JSON body extraction with `{"detail"}` rejections
//! - handlers: endpoint handlers
//! - router: router creation and layers

mod extractors;
mod handlers;
mod router;
pub mod types;

pub use extractors::JsonExtractor;
pub use router::create_router;
pub use types::{AppState, HealthResponse, RootResponse};
