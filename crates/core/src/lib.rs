//! Vivarium Core - Shared types library.
//!
//! This crate provides common types used across all Vivarium client components:
//! - `client` - Session, access control, cart, and API plumbing for the
//!   marketplace frontend
//! - `integration-tests` - End-to-end scenarios against a running backend
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, roles, prices, emails,
//!   and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
