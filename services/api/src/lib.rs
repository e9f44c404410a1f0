//! services/api/src/lib.rs
//!
//! Library surface of the `api` service: configuration, the service-wide
//! error type, the concrete adapters behind the core ports, and the web
//! layer (handlers, wire protocol, turn orchestration).

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
