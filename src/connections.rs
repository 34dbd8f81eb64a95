use std::collections::HashMap;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::permission::Grants;

/// Credential store handed, untouched, to every scheme verifier.
pub trait Connections: Send + Sync {
    fn find_user(&self, name: &str) -> Result<Option<UserRecord>>;

    fn find_api_key(&self, key: &str) -> Result<Option<ApiKeyRecord>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub name: String,

    /// Lower-case hex `sha256(password + salt)`.
    pub password: String,

    #[serde(default)]
    pub salt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyRecord {
    pub key: String,

    /// Identity the key authenticates as.
    pub owner: String,

    #[serde(default)]
    pub grants: Grants,
}

/// Credentials kept in memory, usually loaded from the gate config.
#[derive(Debug, Clone, Default)]
pub struct MemoryConnections {
    users: HashMap<String, UserRecord>,
    api_keys: HashMap<String, ApiKeyRecord>,
}

impl MemoryConnections {
    pub fn new(users: Vec<UserRecord>, api_keys: Vec<ApiKeyRecord>) -> Result<Self> {
        let mut conns = Self::default();
        for user in users {
            if user.name.is_empty() {
                bail!("user name cannot be empty");
            }
            if conns.users.contains_key(&user.name) {
                bail!("duplicate user '{}'", user.name);
            }
            conns.users.insert(user.name.clone(), user);
        }
        for api_key in api_keys {
            if api_key.key.is_empty() {
                bail!("api key cannot be empty");
            }
            if api_key.owner.is_empty() {
                bail!("api key owner cannot be empty");
            }
            if conns.api_keys.contains_key(&api_key.key) {
                bail!("duplicate api key for owner '{}'", api_key.owner);
            }
            conns.api_keys.insert(api_key.key.clone(), api_key);
        }
        Ok(conns)
    }
}

impl Connections for MemoryConnections {
    fn find_user(&self, name: &str) -> Result<Option<UserRecord>> {
        Ok(self.users.get(name).cloned())
    }

    fn find_api_key(&self, key: &str) -> Result<Option<ApiKeyRecord>> {
        Ok(self.api_keys.get(key).cloned())
    }
}
