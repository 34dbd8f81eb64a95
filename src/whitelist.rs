use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// A controller, or some of its methods, that can be called without authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhitelistRule {
    pub controller: String,

    /// `None` opens every method of the controller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<String>>,
}

impl WhitelistRule {
    pub fn controller(controller: impl Into<String>) -> Self {
        Self {
            controller: controller.into(),
            methods: None,
        }
    }

    pub fn methods<I, S>(controller: impl Into<String>, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            controller: controller.into(),
            methods: Some(methods.into_iter().map(Into::into).collect()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Whitelist {
    rules: Vec<WhitelistRule>,
}

impl Whitelist {
    pub fn new(rules: Vec<WhitelistRule>) -> Self {
        Self { rules }
    }

    /// Reads a JSON array of rules, `[{"controller": "status"}, ...]`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("read whitelist file '{}'", path.display()))?;
        let whitelist: Whitelist = serde_json::from_str(&data)
            .with_context(|| format!("parse whitelist file '{}' json", path.display()))?;
        Ok(whitelist)
    }

    pub fn rules(&self) -> &[WhitelistRule] {
        &self.rules
    }

    /// Only the first rule naming `controller` is consulted; an empty
    /// controller (no route) is always let through to the 404 path.
    pub fn is_whitelisted(&self, controller: &str, method: &str) -> bool {
        if controller.is_empty() {
            return true;
        }

        let rule = match self.rules.iter().find(|rule| rule.controller == controller) {
            Some(rule) => rule,
            None => return false,
        };

        match &rule.methods {
            None => true,
            Some(methods) => methods.iter().any(|m| m == method),
        }
    }
}
