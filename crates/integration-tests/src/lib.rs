//! Integration tests for Vivarium.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process scenario tests (no server required)
//! cargo test -p vivarium-integration-tests
//!
//! # Live API smoke tests (require a running Vivarium API)
//! VIVARIUM_API_BASE=http://localhost:8000/api \
//!     cargo test -p vivarium-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `route_authorization` - navigation guard scenarios across role mixes
//!   and sign-in/sign-out transitions
//! - `login_cart_sync` - anonymous cart capture and the post-login
//!   migration into the server cart
