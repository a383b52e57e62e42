//! Request routing
//!
//! The [`ServiceManager`] composes the classifier, response cache, rate
//! tracker, provider registry, and usage logger into one request/response
//! state machine: classify, check the cache, walk the fallback chain under
//! quota accounting, cache and log the outcome, and degrade gracefully when
//! the chain is exhausted.

mod context;
mod orchestrator;


pub use context::ContextSource;
pub use orchestrator::ServiceManager;
