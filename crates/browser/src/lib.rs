//! Octo Browse - a terminal front-end for the browser shell.
//!
//! This crate wires the shell session to concrete collaborators:
//! - TOML configuration loading
//! - A headless engine fetching pages over HTTP
//! - HTML text extraction
//! - HTTP-backed JSON fetch and summarization
//! - A line-oriented command interface

pub mod commands;
pub mod config;
pub mod headless;
pub mod http;
pub mod page;

pub use config::load_config;
pub use headless::HeadlessEngine;

/// Browser version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
