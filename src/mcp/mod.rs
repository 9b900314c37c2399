//! MCP server
//!
//! The SNA tool service served over stdio.

mod server;

pub use server::SnaService;
