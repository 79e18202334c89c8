pub mod acquisition;
pub mod cli;
pub mod config;
pub mod error;
pub mod interactive;
pub mod location;
pub mod recognition;
pub mod render;
pub mod session;

pub use session::{PendingSubmission, Session, View};
