use crate::verb::HttpVerb;

pub const HEADER_AUTHORIZATION: &str = "Authorization";

/// What the gate needs to know about an incoming request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub verb: HttpVerb,
    pub path: String,
    pub authorization: Option<String>,
}

impl Request {
    pub fn new(verb: HttpVerb, path: impl Into<String>) -> Self {
        Self {
            verb,
            path: path.into(),
            authorization: None,
        }
    }

    pub fn with_authorization(mut self, value: impl Into<String>) -> Self {
        self.authorization = Some(value.into());
        self
    }

    /// The `Authorization` value, treating a blank header as absent.
    pub fn authorization(&self) -> Option<&str> {
        let value = self.authorization.as_deref()?.trim();
        if value.is_empty() {
            return None;
        }
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization() {
        let req = Request::new(HttpVerb::Get, "/widgets");
        assert_eq!(req.authorization(), None);

        let req = req.with_authorization("   ");
        assert_eq!(req.authorization(), None);

        let req = Request::new(HttpVerb::Get, "/widgets").with_authorization(" Basic abc ");
        assert_eq!(req.authorization(), Some("Basic abc"));
    }
}
