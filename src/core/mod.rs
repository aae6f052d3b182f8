//! Core resolution modules.

pub mod address;
pub mod manifest;
pub mod resolver;
