//! Command implementations

pub mod bump;
