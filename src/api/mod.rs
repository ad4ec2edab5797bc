pub mod error;
pub mod exercises;
pub mod payloads;
pub mod server;
pub mod users;
