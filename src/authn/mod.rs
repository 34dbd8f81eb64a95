mod basic;
mod global;

pub mod challenge;
pub mod registry;

pub use basic::BasicAuthenticator;
pub use challenge::{AuthChallenge, Parameters};
pub use global::GlobalAuthenticator;
pub use registry::SchemeRegistry;

use thiserror::Error;

use crate::permission::Grants;

/// Scheme that, besides authenticating, makes the gate enforce permissions.
pub const GLOBAL_SCHEME: &str = "Global";
pub const BASIC_SCHEME: &str = "Basic";

/// Trait for credential verifiers, one per authentication scheme.
///
/// A verifier is built for every request from the factory registered for its
/// scheme, with the credential store it needs, and is asked once to turn the
/// challenge parameters into a caller identity.
pub trait Authenticator {
    /// # Returns
    ///
    /// * `Ok(identity)` - Credentials are valid
    /// * `Err(_)` - Credentials are rejected; the error carries the status to
    ///   answer with
    fn verify(&self, params: &Parameters) -> Result<Identity, AuthnError>;
}

/// Caller established by a successful authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,

    /// Permission bits the caller holds. Empty for schemes that carry none.
    pub grants: Grants,
}

impl Identity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            grants: Grants::new(),
        }
    }

    pub fn with_grants(id: impl Into<String>, grants: Grants) -> Self {
        Self {
            id: id.into(),
            grants,
        }
    }
}

/// Failure reported by a scheme's verifier.
#[derive(Debug, Error)]
pub enum AuthnError {
    /// Credentials could not be read at all.
    #[error("{0}")]
    Malformed(String),

    /// Credentials were read but do not match anything.
    #[error("{0}")]
    Invalid(String),

    /// The credential store failed.
    #[error("credential store: {0:#}")]
    Store(anyhow::Error),

    /// Scheme-specific rejection with its own status.
    #[error("{message}")]
    Rejected { status: u16, message: String },
}

impl AuthnError {
    pub fn malformed(msg: impl ToString) -> Self {
        Self::Malformed(msg.to_string())
    }

    pub fn invalid(msg: impl ToString) -> Self {
        Self::Invalid(msg.to_string())
    }

    pub fn status(&self) -> u16 {
        match self {
            AuthnError::Malformed(_) => 400,
            AuthnError::Invalid(_) => 401,
            AuthnError::Store(_) => 500,
            AuthnError::Rejected { status, .. } => *status,
        }
    }
}
