//! interfacer-core
//!
//! Core library for adding a method to a Go interface and stubbing it into
//! every type that implements it.
//!
//! The crate holds the Go syntax front end, the symbol model and scanner that
//! work out which structs implement which interfaces, the source writer, and
//! the configuration layer. The CLI is a thin frontend over [`services`].

pub mod config;
pub mod model;
pub mod scanner;
pub mod services;
pub mod syntax;
pub mod writer;

/// Returns the library version as encoded at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
