//! Data serialization.

pub mod yaml;

pub use yaml::to_yaml;
