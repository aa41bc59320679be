pub mod acquire;
pub mod catalog;
pub mod config;
pub mod error;
pub mod inference;
pub mod server;
pub mod tryon;
pub mod validate;

pub use error::{Error, Result};
