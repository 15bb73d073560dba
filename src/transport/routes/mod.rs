pub mod info;
pub mod search;
pub mod station;
pub mod stream;
