//! CLI command implementations

pub mod completions;
pub mod config;
pub mod dimension;
pub mod element;
pub mod filter;
pub mod io;
pub mod load;
