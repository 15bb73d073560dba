pub mod queue;
pub mod scheduler;
pub mod session;
pub mod state;
pub mod station;

pub use session::{BroadcastSession, SessionEvent};
pub use state::*;
pub use station::Station;
