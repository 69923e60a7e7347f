//! `Taskboard` demo todo service library.
//!
//! Exposes the server for use in tests and embedding. The server keeps a
//! todo list in memory and speaks the same JSON API as the public demo
//! service the client targets by default.

pub mod config;
pub mod server;
pub mod store;
