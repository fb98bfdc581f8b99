//! Virtual filesystem contracts: path helpers, provider service, and shared entry types.

pub mod path;
pub mod service;
pub mod types;
