//! Node.js API Documentation MCP Service
//!
//! This crate provides a Model Context Protocol (MCP) service exposing the
//! Node.js built-in modules API reference to LLM clients. The published
//! `all.json` corpus is fetched once, cached with a time-to-live, and rendered
//! to markdown on demand.
//!
//! # Features
//!
//! - Search all documented modules and their methods
//! - Retrieve one module's documentation by name, optionally filtered by method
//! - TTL cache for remote fetches
//! - stdio and SSE transports
//!
//! # Modules
//!
//! - [`cache`]: TTL cache for expensive fetches
//! - [`fetcher`]: HTTP fetching through the cache
//! - [`model`]: documentation tree types
//! - [`normalize`]: module name lookup keys
//! - [`formatter`]: markdown rendering
//! - [`api_docs`]: module repository built on the above
//! - [`mcp`]: MCP tools, prompts and resources
//! - [`server`]: transport bootstrap

pub mod api_docs;
pub mod cache;
pub mod config;
pub mod fetcher;
pub mod formatter;
pub mod mcp;
pub mod model;
pub mod normalize;
pub mod server;
