//! Shared substrate for the AstraDock service fleet.
//!
//! This crate carries everything the services have in common but none of
//! their business rules:
//!
//! - [`bus`]: consumer/producer abstractions over a partitioned log
//!   (rdkafka), with a composable middleware chain
//! - [`events`]: the wire events exchanged between services, with their
//!   binary codec
//! - [`closer`]: an ordered registry of teardown actions driven during
//!   graceful shutdown
//! - [`signal`]: SIGINT/SIGTERM wait used by every run loop
//! - [`telemetry`]: tracing subscriber setup shared by every binary
//! - [`env`]: strict environment-variable configuration helpers

#![forbid(unsafe_code)]

pub mod bus;
pub mod closer;
pub mod env;
pub mod events;
pub mod signal;
pub mod telemetry;
