//! Tabula Decision-Table Engine Host Library
//!
//! Configuration, service initialization and the JSON-lines command
//! protocol, split out of the binary for testing and reuse.

pub mod config;
pub mod engine;
pub mod error;
pub mod protocol;
