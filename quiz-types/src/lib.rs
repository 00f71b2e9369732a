pub mod game;
pub mod messages;
pub mod user;

// Re-export all types
pub use game::*;
pub use messages::*;
pub use user::*;
