use serde::{Deserialize, Serialize};

use crate::errors::GateError;

/// Response state the gate writes into while a request moves through it.
///
/// Nothing set means the request may proceed to its controller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    status: Option<u16>,
    message: Option<String>,
    headers: Vec<String>,
}

/// JSON body sent with every status the gate produces.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommonResponse {
    pub code: u16,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites any status set before; header lines are `Name: value`.
    pub fn set_status(&mut self, code: u16, message: Option<&str>, headers: Option<Vec<String>>) {
        self.status = Some(code);
        self.message = message.map(String::from);
        self.headers = headers.unwrap_or_default();
    }

    pub fn reject(&mut self, err: &GateError) {
        let message = err.to_string();
        self.set_status(err.status(), Some(&message), err.headers());
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Header lines split into `(name, value)`; malformed lines are skipped.
    pub fn header_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .filter_map(|line| line.split_once(':'))
            .map(|(name, value)| (name.trim(), value.trim()))
    }

    pub fn is_set(&self) -> bool {
        self.status.is_some()
    }

    pub fn body(&self) -> Option<CommonResponse> {
        let code = self.status?;
        Some(CommonResponse {
            code,
            message: self.message.clone(),
        })
    }
}
