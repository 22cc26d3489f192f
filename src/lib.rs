//! ragchat is a terminal client for a retrieval-augmented agent backend.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the session transcript, the backend clients, trace
//!   interpretation, configuration, and turn orchestration.
//! - [`api`] defines the JSON payloads exchanged with the backend.
//! - [`cli`] parses arguments and runs the interactive chat and one-shot
//!   commands.
//! - [`ui`] prints transcripts and traces to the terminal.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;
