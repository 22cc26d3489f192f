//! Plain terminal output for transcripts, traces and upload results.

pub mod transcript;
