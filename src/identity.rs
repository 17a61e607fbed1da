//! Identity provider boundary.
//!
//! The authentication handshake itself is out of scope; the engine consumes
//! an opaque, already-authenticated identity with its profile claims. The
//! embedding application obtains one from its auth provider and hands it to
//! [`crate::session::Session::establish`].

use serde::{Deserialize, Serialize};

/// An authenticated identity as yielded by the external auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthIdentity {
    /// Opaque unique id. Doubles as the profile document id.
    pub uid: String,
    /// Display name claim, if the provider supplied one.
    pub display_name: Option<String>,
    /// Avatar URL claim, if the provider supplied one.
    pub photo_url: Option<String>,
    /// Email claim, if the provider supplied one.
    pub email: Option<String>,
    /// True for anonymous (guest) sessions.
    pub is_anonymous: bool,
}

impl AuthIdentity {
    /// Creates an identity with only a uid; all claims absent.
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            display_name: None,
            photo_url: None,
            email: None,
            is_anonymous: false,
        }
    }

    /// Creates an anonymous (guest) identity.
    pub fn anonymous(uid: impl Into<String>) -> Self {
        Self {
            is_anonymous: true,
            ..Self::new(uid)
        }
    }

    /// Sets the display name claim.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Sets the photo URL claim.
    pub fn with_photo_url(mut self, url: impl Into<String>) -> Self {
        self.photo_url = Some(url.into());
        self
    }

    /// Sets the email claim.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Returns the local part of the email claim, if present and non-empty.
    pub fn email_local_part(&self) -> Option<&str> {
        self.email
            .as_deref()
            .and_then(|e| e.split('@').next())
            .filter(|local| !local.is_empty())
    }
}
