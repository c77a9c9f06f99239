//! Core functionality: manifest model, library access, retrieval and session state

pub mod config;
pub mod error;
pub mod loader;
pub mod manifest;
pub mod session;
pub mod source;

#[cfg(test)]
pub mod test_support;
