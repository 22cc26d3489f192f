pub mod data;
pub mod io;
pub mod printing;

pub use data::{Config, ResolvedSettings};
pub use io::ConfigError;
