//! Admission control logic and per-client state management.

mod bucket;
mod client;
mod registry;
mod service;

pub use bucket::TokenBucket;
pub use client::ClientState;
pub use registry::ClientRegistry;
pub use service::{AdmissionService, Decision, RejectReason};
