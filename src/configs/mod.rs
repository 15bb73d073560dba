pub mod base;
pub mod logging;
pub mod metadata;
pub mod player;
pub mod server;
pub mod sources;
pub mod stream;

pub use base::*;
pub use logging::*;
pub use metadata::*;
pub use player::*;
pub use server::*;
pub use sources::*;
pub use stream::*;
