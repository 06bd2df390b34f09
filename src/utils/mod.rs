//! Shared helpers

pub mod string;
