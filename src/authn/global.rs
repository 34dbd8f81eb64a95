use std::sync::Arc;

use log::error;

use crate::connections::Connections;

use super::{Authenticator, AuthnError, Identity, Parameters};

/// Site-wide API keys: `Global <key>` or `Global key=<key>`.
///
/// The key's grants travel with the identity so the gate can enforce
/// permissions afterwards.
pub struct GlobalAuthenticator {
    conns: Arc<dyn Connections>,
}

impl GlobalAuthenticator {
    pub fn new(conns: Arc<dyn Connections>) -> Self {
        Self { conns }
    }

    fn key(params: &Parameters) -> Option<&str> {
        let key = params.token().or_else(|| params.get("key"))?;
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        Some(key)
    }
}

impl Authenticator for GlobalAuthenticator {
    fn verify(&self, params: &Parameters) -> Result<Identity, AuthnError> {
        let key = match Self::key(params) {
            Some(key) => key,
            None => return Err(AuthnError::malformed("global auth missing api key")),
        };

        let record = match self.conns.find_api_key(key) {
            Ok(record) => record,
            Err(e) => {
                error!("Auth store error: {e:#}");
                return Err(AuthnError::Store(e));
            }
        };
        match record {
            Some(record) => Ok(Identity::with_grants(record.owner, record.grants)),
            None => Err(AuthnError::invalid("unknown api key")),
        }
    }
}
