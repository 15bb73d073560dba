pub mod audio;
pub mod common;
pub mod configs;
pub mod metadata;
pub mod player;
pub mod server;
pub mod sources;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;
