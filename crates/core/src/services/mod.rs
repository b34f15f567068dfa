//! Multi-step operations built on the scanner and the writer.

pub mod implement;

pub use implement::{implement, ImplementError, ImplementReport, StubReport, SubModuleReport};
