pub mod azure;
pub mod cli;
pub mod config;
pub mod error;
pub mod io;

pub use error::{ExemptError, Result};
