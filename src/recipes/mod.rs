//! Concrete recipes.

pub mod log4cxx;
pub mod test_package;

pub use log4cxx::Log4cxx;
pub use test_package::TestPackage;
