//! Log output helpers

pub mod banner;

pub use banner::banner;
