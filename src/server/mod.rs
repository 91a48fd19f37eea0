// Server module entry point
// Listener setup, connection serving and graceful shutdown

pub mod connection;
pub mod listener;
pub mod signal;

// `loop` is a keyword, so the module is named server_loop
#[path = "loop.rs"]
pub mod server_loop;

pub use listener::{create_reusable_listener, LISTEN_BACKLOG};
pub use server_loop::run_server;
pub use signal::shutdown_signal;
