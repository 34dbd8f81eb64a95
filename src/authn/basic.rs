use std::sync::Arc;

use log::error;

use crate::code;
use crate::connections::Connections;

use super::{Authenticator, AuthnError, Identity, Parameters};

/// `Basic base64(user:password)` against the users of the credential store.
pub struct BasicAuthenticator {
    conns: Arc<dyn Connections>,
}

impl BasicAuthenticator {
    pub fn new(conns: Arc<dyn Connections>) -> Self {
        Self { conns }
    }
}

impl Authenticator for BasicAuthenticator {
    fn verify(&self, params: &Parameters) -> Result<Identity, AuthnError> {
        let token = match params.token() {
            Some(token) => token.trim(),
            None => return Err(AuthnError::malformed("basic auth expects a single token")),
        };

        let auth = code::base64_decode_string(token)
            .map_err(|e| AuthnError::malformed(format!("decode basic token: {e}")))?;
        let (username, password) = match auth.split_once(':') {
            Some(fields) => fields,
            None => return Err(AuthnError::malformed("basic auth missing password")),
        };
        if username.is_empty() {
            return Err(AuthnError::malformed("basic auth missing username"));
        }

        let user = match self.conns.find_user(username) {
            Ok(user) => user,
            Err(e) => {
                error!("Auth store error: {e:#}");
                return Err(AuthnError::Store(e));
            }
        };
        let user = match user {
            Some(user) => user,
            None => return Err(AuthnError::invalid("incorrect username or password")),
        };

        let hashed = code::sha256(format!("{password}{}", user.salt));
        if hashed != user.password {
            return Err(AuthnError::invalid("incorrect username or password"));
        }

        Ok(Identity::new(user.name))
    }
}
