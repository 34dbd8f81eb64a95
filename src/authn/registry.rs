use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::connections::Connections;
use crate::errors::GateError;

use super::basic::BasicAuthenticator;
use super::global::GlobalAuthenticator;
use super::{AuthChallenge, Authenticator, Identity, BASIC_SCHEME, GLOBAL_SCHEME};

/// Builds the verifier for one request, handing it the credential store.
pub type SchemeFactory = Arc<dyn Fn(Arc<dyn Connections>) -> Box<dyn Authenticator> + Send + Sync>;

/// Scheme name (case-sensitive) -> verifier factory.
///
/// Filled once when the application starts; dispatch only reads it.
#[derive(Clone, Default)]
pub struct SchemeRegistry {
    schemes: HashMap<String, SchemeFactory>,
}

impl SchemeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the `Basic` and `Global` schemes.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(BASIC_SCHEME, |conns| {
            Box::new(BasicAuthenticator::new(conns))
        });
        registry.register(GLOBAL_SCHEME, |conns| {
            Box::new(GlobalAuthenticator::new(conns))
        });
        registry
    }

    /// Adds a scheme, replacing any factory registered under the same name.
    pub fn register<F>(&mut self, scheme: impl Into<String>, factory: F)
    where
        F: Fn(Arc<dyn Connections>) -> Box<dyn Authenticator> + Send + Sync + 'static,
    {
        self.schemes.insert(scheme.into(), Arc::new(factory));
    }

    pub fn contains(&self, scheme: &str) -> bool {
        self.schemes.contains_key(scheme)
    }

    pub fn scheme_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.schemes.keys().cloned().collect();
        names.sort();
        names
    }

    /// Verifies `challenge` with the verifier registered for its scheme.
    pub fn dispatch(
        &self,
        challenge: &AuthChallenge,
        conns: &Arc<dyn Connections>,
    ) -> Result<Identity, GateError> {
        let factory = match self.schemes.get(&challenge.scheme) {
            Some(factory) => factory,
            None => return Err(GateError::UnknownAuthScheme(challenge.scheme.clone())),
        };

        let authenticator = factory(conns.clone());
        authenticator
            .verify(&challenge.parameters)
            .map_err(GateError::AuthenticationRejected)
    }
}

impl fmt::Debug for SchemeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemeRegistry")
            .field("schemes", &self.scheme_names())
            .finish()
    }
}
