//! Signed-in identity and its durable store.
//!
//! The [`IdentityStore`] is the single source of truth for "who is logged
//! in, with what roles." It persists across reloads through a
//! [`StorageBackend`] and notifies subscribers synchronously on every
//! sign-in and sign-out, so navigation decisions made immediately after a
//! state change always observe the new identity.
//!
//! # Persistence
//!
//! The stored record tolerates the role shapes the backend has emitted over
//! time: roles arrive either as plain tags (`"seller"`) or as records
//! (`{"id": 3, "name": "seller"}`). Both are normalized into [`Role`] at the
//! store boundary; unrecognized tags are dropped. A record that cannot be
//! parsed, or that normalizes to zero roles, is purged and the session
//! degrades silently to anonymous.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use vivarium_core::{Email, Role, UserId};

use crate::storage::{StorageBackend, keys};

/// Errors that can occur when constructing an [`Identity`].
#[derive(Debug, Error)]
pub enum IdentityError {
    /// An authenticated identity must hold at least one recognized role.
    #[error("authenticated identity must hold at least one role")]
    NoRoles,
}

/// An authenticated user.
///
/// Holds at least one role by construction; anonymous sessions are
/// represented by the absence of an `Identity`, never by an empty role set.
#[derive(Debug, Clone)]
pub struct Identity {
    user_id: UserId,
    display_name: String,
    email: Email,
    roles: Vec<Role>,
    session_token: SecretString,
}

impl Identity {
    /// Create an identity from a successful login or registration response.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::NoRoles`] if `roles` is empty.
    pub fn new(
        user_id: UserId,
        display_name: impl Into<String>,
        email: Email,
        roles: Vec<Role>,
        session_token: SecretString,
    ) -> Result<Self, IdentityError> {
        if roles.is_empty() {
            return Err(IdentityError::NoRoles);
        }

        Ok(Self {
            user_id,
            display_name: display_name.into(),
            email,
            roles,
            session_token,
        })
    }

    /// The user's database ID.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// The user's display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// The user's email address.
    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }

    /// All roles held by this user.
    #[must_use]
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// Whether this user holds `role`.
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// The highest-ranked role this user holds.
    ///
    /// Used wherever a single role must stand in for the whole set, such as
    /// picking a landing page after a denied navigation.
    #[must_use]
    pub fn primary_role(&self) -> Role {
        self.roles
            .iter()
            .copied()
            .max_by_key(Role::rank)
            .unwrap_or(Role::Buyer)
    }

    /// The opaque session token issued at login.
    #[must_use]
    pub fn session_token(&self) -> &SecretString {
        &self.session_token
    }
}

// =============================================================================
// Persisted record
// =============================================================================

/// Identity as persisted in durable storage.
///
/// Kept separate from [`Identity`] so the tolerant wire shapes never leak
/// past the store boundary.
#[derive(Debug, Serialize, Deserialize)]
struct StoredIdentity {
    user_id: UserId,
    display_name: String,
    email: Email,
    roles: Vec<RoleShape>,
    session_token: String,
}

/// Role shapes observed in persisted records and API responses.
///
/// The backend has emitted both over time; everything normalizes through
/// [`normalize_roles`] before reaching an [`Identity`].
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum RoleShape {
    /// Plain tag, e.g. `"seller"`.
    Name(String),
    /// Record shape, e.g. `{"id": 3, "name": "seller"}`.
    Record {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<i64>,
        name: String,
    },
}

impl RoleShape {
    fn name(&self) -> &str {
        match self {
            Self::Name(name) | Self::Record { name, .. } => name,
        }
    }
}

/// Normalize duck-typed role shapes into canonical tags, deduplicated in
/// first-seen order. Unrecognized names are dropped with a warning.
pub(crate) fn normalize_roles(shapes: &[RoleShape]) -> Vec<Role> {
    let mut roles = Vec::with_capacity(shapes.len());
    for shape in shapes {
        match shape.name().parse::<Role>() {
            Ok(role) => {
                if !roles.contains(&role) {
                    roles.push(role);
                }
            }
            Err(error) => {
                warn!(%error, "dropping unrecognized role tag");
            }
        }
    }
    roles
}

impl StoredIdentity {
    fn from_identity(identity: &Identity) -> Self {
        Self {
            user_id: identity.user_id,
            display_name: identity.display_name.clone(),
            email: identity.email.clone(),
            roles: identity
                .roles
                .iter()
                .map(|role| RoleShape::Name(role.to_string()))
                .collect(),
            session_token: identity.session_token.expose_secret().to_owned(),
        }
    }

    /// Normalize into an [`Identity`], dropping unrecognized role tags.
    fn into_identity(self) -> Result<Identity, IdentityError> {
        Identity::new(
            self.user_id,
            self.display_name,
            self.email,
            normalize_roles(&self.roles),
            SecretString::from(self.session_token),
        )
    }
}

// =============================================================================
// IdentityStore
// =============================================================================

/// State change delivered to [`IdentityStore`] subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityEvent {
    /// A new identity replaced the current state.
    SignedIn {
        /// Whether the store held no identity before this sign-in.
        from_anonymous: bool,
    },
    /// The identity was cleared.
    SignedOut,
}

type Subscriber = Arc<dyn Fn(IdentityEvent) + Send + Sync>;

/// Single source of truth for the signed-in identity.
///
/// Every mutation writes through to durable storage immediately; a storage
/// failure is logged and swallowed, leaving the in-memory identity
/// authoritative for the rest of the session.
pub struct IdentityStore {
    storage: Box<dyn StorageBackend>,
    current: RwLock<Option<Identity>>,
    subscribers: Mutex<Vec<Subscriber>>,
}

impl IdentityStore {
    /// Open the store, restoring any persisted identity.
    ///
    /// A record that cannot be read or parsed degrades silently to
    /// anonymous; a corrupt record is purged so it cannot fail again on the
    /// next load.
    #[must_use]
    pub fn open(storage: Box<dyn StorageBackend>) -> Self {
        let current = Self::load(storage.as_ref());

        Self {
            storage,
            current: RwLock::new(current),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    fn load(storage: &dyn StorageBackend) -> Option<Identity> {
        let raw = match storage.get(keys::IDENTITY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(error) => {
                warn!(%error, "failed to read stored identity; starting anonymous");
                return None;
            }
        };

        let stored = match serde_json::from_str::<StoredIdentity>(&raw) {
            Ok(stored) => stored,
            Err(error) => {
                warn!(%error, "failed to parse stored identity; purging and starting anonymous");
                Self::purge(storage);
                return None;
            }
        };

        match stored.into_identity() {
            Ok(identity) => {
                debug!(user_id = %identity.user_id(), "restored identity from storage");
                Some(identity)
            }
            Err(error) => {
                warn!(%error, "stored identity held no usable roles; purging and starting anonymous");
                Self::purge(storage);
                None
            }
        }
    }

    fn purge(storage: &dyn StorageBackend) {
        if let Err(error) = storage.remove(keys::IDENTITY) {
            warn!(%error, "failed to purge corrupt identity record");
        }
    }

    /// The current identity, if authenticated.
    #[must_use]
    pub fn current(&self) -> Option<Identity> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether an identity is currently signed in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Replace the current identity and persist it.
    ///
    /// Subscribers are notified synchronously before this returns, so the
    /// next navigation decision observes the new identity.
    pub fn set_identity(&self, identity: Identity) {
        let stored = StoredIdentity::from_identity(&identity);
        match serde_json::to_string(&stored) {
            Ok(raw) => {
                if let Err(error) = self.storage.set(keys::IDENTITY, &raw) {
                    warn!(%error, "failed to persist identity; session will not survive reload");
                }
            }
            Err(error) => {
                warn!(%error, "failed to encode identity; session will not survive reload");
            }
        }

        let from_anonymous = {
            let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
            let from_anonymous = current.is_none();
            *current = Some(identity);
            from_anonymous
        };

        self.notify(IdentityEvent::SignedIn { from_anonymous });
    }

    /// Remove the identity and its persisted record. Equivalent to logout.
    ///
    /// Clearing an already-anonymous store is a no-op and notifies nobody.
    pub fn clear(&self) {
        if let Err(error) = self.storage.remove(keys::IDENTITY) {
            warn!(%error, "failed to remove persisted identity");
        }

        let was_authenticated = {
            let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
            current.take().is_some()
        };

        if was_authenticated {
            self.notify(IdentityEvent::SignedOut);
        }
    }

    /// Register a subscriber for identity state changes.
    ///
    /// Subscribers are invoked synchronously, in registration order, on the
    /// thread that performed the mutation.
    pub fn subscribe(&self, subscriber: impl Fn(IdentityEvent) + Send + Sync + 'static) {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(subscriber));
    }

    fn notify(&self, event: IdentityEvent) {
        // Snapshot under the lock, invoke outside it, so subscribers can
        // call back into the store without deadlocking.
        let subscribers: Vec<Subscriber> = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        for subscriber in subscribers {
            subscriber(event);
        }
    }
}
