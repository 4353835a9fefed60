//! Value objects shared by the proxy services and the list orchestrator.

pub mod envelope;
pub mod page;
pub mod search;
