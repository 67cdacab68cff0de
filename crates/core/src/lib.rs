//! Core library for the task tracker
//!
//! This crate contains the core business logic, including:
//! - The task model and its query/update types
//! - The task repository interface and its file-backed implementation

pub mod error;
pub mod task;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
