//! MCP Request Handlers

pub mod initialize;
pub mod tools;
