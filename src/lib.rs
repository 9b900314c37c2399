//! School Nutrition Analyzer (SNA) Library
//!
//! Recommended-intake calculation, school meal nutrition parsing and the
//! store and tools built around them.

pub mod build_info;
pub mod config;
pub mod db;
pub mod mcp;
pub mod models;
pub mod nutrition;
pub mod tools;
