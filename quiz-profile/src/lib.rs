pub mod handle;
pub mod http;
pub mod store;

// Re-export main components
pub use handle::*;
pub use http::*;
pub use store::*;
