//! Core data structures used across the shelter search subsystem.

pub mod documents;
pub mod enums;
pub mod filter;
pub mod search_result;
