pub mod engine;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod rollup;
pub mod service;
pub mod stay;

pub use engine::*;
pub use error::*;
pub use handlers::*;
pub use metrics::*;
pub use rollup::*;
pub use service::*;
pub use stay::*;
