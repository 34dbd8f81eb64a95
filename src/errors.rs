use thiserror::Error;

use crate::authn::AuthnError;
use crate::probe::AvailableVerbs;

/// Every way the gate can stop a request. Each maps onto the status code
/// the gate writes into the response.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("No route to resource")]
    RouteNotFound,

    #[error("Method not allowed, available: {}", .0.header_value())]
    MethodNotAllowed(AvailableVerbs),

    #[error("Missing credentials")]
    MissingCredentials,

    #[error("Unknown authentication scheme '{0}'")]
    UnknownAuthScheme(String),

    #[error("Authentication rejected: {0}")]
    AuthenticationRejected(#[source] AuthnError),

    #[error("Permission denied")]
    PermissionDenied,

    #[error("No permission defined for {controller}.{method}")]
    MissingPermissionDefinition { controller: String, method: String },
}

impl GateError {
    pub fn status(&self) -> u16 {
        match self {
            GateError::RouteNotFound => 404,
            GateError::MethodNotAllowed(_) => 405,
            GateError::MissingCredentials => 401,
            GateError::UnknownAuthScheme(_) => 400,
            GateError::AuthenticationRejected(e) => e.status(),
            GateError::PermissionDenied => 403,
            GateError::MissingPermissionDefinition { .. } => 500,
        }
    }

    /// Extra header lines the response must carry.
    pub fn headers(&self) -> Option<Vec<String>> {
        match self {
            GateError::MethodNotAllowed(verbs) => Some(verbs.headers()),
            _ => None,
        }
    }
}
