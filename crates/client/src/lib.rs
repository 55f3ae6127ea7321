//! Vivarium marketplace client library.
//!
//! This crate provides the session, access control, cart, and API plumbing
//! behind the marketplace frontend, allowing it to be tested and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod access;
pub mod api;
pub mod cart;
pub mod config;
pub mod error;
pub mod identity;
pub mod payment;
pub mod storage;
