/// Tower middleware module
///
/// Layers wrapped around the router in the accept loop. Header redaction
/// comes from `tower-http`. The timeout layer answers in the JSON error
/// shape.
pub mod tower_timeout_handler;

pub use tower_timeout_handler::{TimeoutLayer, TimeoutService};
