//! Shopping cart state.
//!
//! Anonymous visitors build a cart in [`LocalCartStore`], backed by durable
//! storage and never the network. When such a visitor signs in, a
//! [`CartSyncCoordinator`] replays the local lines into the server cart
//! through the [`CartApi`] port and clears the local copy on full success.

pub mod local;
pub mod sync;

pub use local::{CartLine, CartLineStatus, LocalCartStore};
pub use sync::{CartApi, CartSyncCoordinator, SyncOutcome};
