use std::collections::HashMap;

use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::controller::ControllerRegistry;
use crate::errors::GateError;
use crate::response::Response;

pub type Bitmask = u64;

/// Permission bits a caller holds, per controller. Controllers not listed
/// are granted nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grants(HashMap<String, Bitmask>);

impl Grants {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&mut self, controller: impl Into<String>, bits: Bitmask) {
        *self.0.entry(controller.into()).or_insert(0) |= bits;
    }

    pub fn with(mut self, controller: impl Into<String>, bits: Bitmask) -> Self {
        self.grant(controller, bits);
        self
    }

    pub fn granted(&self, controller: &str) -> Bitmask {
        self.0.get(controller).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Bits each handler method requires, declared by the application as
/// `controller -> method -> bits`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionTable {
    required: HashMap<String, HashMap<String, Bitmask>>,
}

impl PermissionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require(
        &mut self,
        controller: impl Into<String>,
        method: impl Into<String>,
        bits: Bitmask,
    ) {
        self.required
            .entry(controller.into())
            .or_default()
            .insert(method.into(), bits);
    }

    pub fn with(
        mut self,
        controller: impl Into<String>,
        method: impl Into<String>,
        bits: Bitmask,
    ) -> Self {
        self.require(controller, method, bits);
        self
    }

    pub fn required(&self, controller: &str, method: &str) -> Option<Bitmask> {
        self.required.get(controller)?.get(method).copied()
    }

    /// Fails on the first handler that has no required-bits entry.
    pub fn validate(&self, controllers: &ControllerRegistry) -> Result<(), GateError> {
        let mut handlers: Vec<_> = controllers.handlers().collect();
        handlers.sort();
        for (controller, method) in handlers {
            if self.required(controller, method).is_none() {
                return Err(GateError::MissingPermissionDefinition {
                    controller: controller.to_string(),
                    method: method.to_string(),
                });
            }
        }
        Ok(())
    }

    /// True iff every required bit for `controller.method` is granted.
    pub fn check_permission(
        &self,
        grants: &Grants,
        controller: &str,
        method: &str,
    ) -> Result<bool, GateError> {
        let required = match self.required(controller, method) {
            Some(required) => required,
            None => {
                return Err(GateError::MissingPermissionDefinition {
                    controller: controller.to_string(),
                    method: method.to_string(),
                })
            }
        };
        let granted = grants.granted(controller);
        Ok(granted & required == required)
    }

    /// Sets 403 when the check fails; a missing definition sets 500. Control
    /// always returns to the caller, which reads the outcome from `resp`.
    pub fn enforce_permission(
        &self,
        grants: &Grants,
        controller: &str,
        method: &str,
        resp: &mut Response,
    ) {
        match self.check_permission(grants, controller, method) {
            Ok(true) => {}
            Ok(false) => {
                debug!("Permission denied for {controller}.{method}");
                resp.reject(&GateError::PermissionDenied);
            }
            Err(e) => {
                error!("Permission check failed: {e}");
                resp.reject(&e);
            }
        }
    }
}
