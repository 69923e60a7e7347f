//! `Taskboard`: terminal task board library.
//!
//! The core is [`store::TaskStore`], a client-side mirror of a remote todo
//! collection reached through [`remote::RemoteCollection`].

pub mod app;
pub mod config;
pub mod login;
pub mod remote;
pub mod store;
pub mod ui;
pub mod worker;
