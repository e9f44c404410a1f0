pub mod protocol;
pub mod rest;
pub mod state;
pub mod turn_task;

// Re-export the router assembly to make it easily accessible to the binary
// that builds the web server.
pub use rest::{api_router, ask_handler, start_chat_handler};
