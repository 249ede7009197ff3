//! Blogkeeper - scheduled maintenance jobs for a blog backend
//!
//! Each job is a short run-to-completion unit invoked by an external
//! scheduler: unique visitor snapshots, visitor area statistics, visitor
//! cache cleanup, search engine URL push, job log retention, API resource
//! import and search index rebuild.
//!
//! # Architecture
//! - `jobs`: Job kinds, runner and per-job logic
//! - `cache`: Key-value cache (Redis or in-memory)
//! - `storage`: Relational store on SeaORM
//! - `search`: Article search index (Elasticsearch or in-memory)
//! - `services`: Region lookup, SEO push, API doc import, job log and user info services
//! - `config`: Configuration management
//! - `runtime`: Startup wiring
//! - `system`: Logging and panic handling

pub mod cache;
pub mod cli;
pub mod config;
pub mod errors;
pub mod jobs;
pub mod runtime;
pub mod search;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
