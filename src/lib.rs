//! Privacy Shield - backend for the Privacy Shield browser extension
//!
//! Accepts tracker and cookie events from the extension, keeps a per-user
//! blocklist, serves aggregated dashboard statistics and asks a hosted LLM for
//! security reports.
//!
//! # Architecture
//! - `storage`: SQL warehouse access (sea-orm) and aggregation queries
//! - `enrichment`: domain → company matching against the DuckDuckGo entity map
//! - `ai`: text generation client, prompts and report parsing
//! - `services`: business logic shared by the HTTP handlers
//! - `api`: HTTP routes and middleware
//! - `config`: configuration loading
//! - `runtime`: startup wiring, server mode and graceful shutdown
//! - `system`: logging

pub mod ai;
pub mod api;
pub mod cli;
pub mod config;
pub mod enrichment;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
