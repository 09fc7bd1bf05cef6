//! The MySQL-wire-compatible front end: framing, handshake, the per-connection
//! command dispatcher, prepared statements, and result streaming. Delegates
//! all SQL semantics to an `engine::Engine` implementation.
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handshake;
pub mod packets;
pub mod prepared;
pub mod result_streamer;
pub mod session;

mod listener;

pub use config::Config;
pub use error::CommandError;
pub use listener::Server;
