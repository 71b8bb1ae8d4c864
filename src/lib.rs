//! Gatehouse - Per-Client Admission Control Service
//!
//! This crate implements an in-process admission-control core: given a
//! stream of identified requests, it decides per client whether to admit or
//! reject each one under two independent rate-limiting policies (a fixed
//! one-second window counter and a token bucket). A thin HTTP layer exposes
//! the two decisions as endpoints keyed on the `X-Client-ID` header.

pub mod admission;
pub mod config;
pub mod error;
pub mod http;
