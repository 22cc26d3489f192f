pub mod chat_client;
pub mod config;
pub mod controller;
pub mod error;
pub mod http;
pub mod message;
pub mod session;
pub mod trace;
pub mod upload;
