pub mod handlers;
pub mod map;
pub mod server;
