//! Parts catalog service library.
//!
//! Read-only lookup over the rocket-part catalog with a conjunctive
//! multi-field filter. Parts are seeded once at bootstrap and never
//! change afterwards.

pub mod api;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod model;
pub mod repository;
pub mod seed;
pub mod service;
