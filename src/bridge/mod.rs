//! Bridging between the game servers and the chat platform.

pub mod monitor;
pub mod relay;
pub mod supervisor;

pub use monitor::LogNotification;
pub use relay::Bridge;
pub use supervisor::Supervisor;
