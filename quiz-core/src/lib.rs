pub mod events;
pub mod protocol;
pub mod state_machine;

// Re-export main components
pub use events::*;
pub use protocol::*;
pub use state_machine::*;
