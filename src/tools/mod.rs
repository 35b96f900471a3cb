//! External toolchain collaborators: CMake, patching, source retrieval.

pub mod cmake;
pub mod command;
pub mod extract;
pub mod files;

pub use cmake::{CMake, Definitions};
pub use extract::ExtractOptions;
