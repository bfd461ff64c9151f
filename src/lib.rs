// src/lib.rs

pub mod cli;
pub mod config;
pub mod core;
pub mod data;
pub mod error;
pub mod file;
pub mod log;
pub mod runner;
pub mod specs;
pub mod store;

pub use data::TerminalSecurityRecord;
pub use error::{Result, ScrapeError};
