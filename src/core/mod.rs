//! Core functionality for the gateway
//!
//! This module contains the routing orchestrator and the components it
//! composes: classifier, rate tracker, response cache, usage logger, and the
//! provider clients.

pub mod cache;
pub mod classifier;
pub mod providers;
pub mod rate_limiter;
pub mod router;
pub mod types;
pub mod usage;
