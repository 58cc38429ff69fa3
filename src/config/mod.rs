//! Configuration model for oncefetch.
//!
//! Defines the Config struct loaded from an optional YAML file. It supports
//! forward-compatible parsing (unknown fields are ignored), defaults for
//! every field, and validation of values. Command-line flags override it.

mod model;
mod operations;

#[cfg(test)]
mod tests;

pub use model::Config;
