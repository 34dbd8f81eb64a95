use crate::controller::ControllerCatalog;
use crate::verb::HttpVerb;

pub const HEADER_ALLOW: &str = "Allow";
pub const HEADER_CORS_ALLOW_METHODS: &str = "Access-Control-Allow-Methods";

/// Verbs a controller implements for one handler stem, in probe order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvailableVerbs(Vec<HttpVerb>);

impl AvailableVerbs {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, verb: HttpVerb) -> bool {
        self.0.contains(&verb)
    }

    pub fn verbs(&self) -> &[HttpVerb] {
        &self.0
    }

    /// `GET,POST`: comma-joined, no spaces.
    pub fn header_value(&self) -> String {
        self.0
            .iter()
            .map(HttpVerb::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// The `Allow` and CORS header lines shared by OPTIONS and 405 responses.
    pub fn headers(&self) -> Vec<String> {
        let value = self.header_value();
        vec![
            format!("{HEADER_ALLOW}: {value}"),
            format!("{HEADER_CORS_ALLOW_METHODS}: {value}"),
        ]
    }
}

/// Finds which verbs `controller` implements for the handler stem `base`.
pub fn available_verbs(
    catalog: &dyn ControllerCatalog,
    controller: &str,
    base: &str,
) -> AvailableVerbs {
    let verbs = HttpVerb::PROBE_ORDER
        .into_iter()
        .filter(|verb| catalog.method_exists(controller, &verb.method_name(base)))
        .collect();
    AvailableVerbs(verbs)
}

#[cfg(test)]
mod tests {
    use crate::controller::ControllerRegistry;

    use super::*;

    #[test]
    fn test_available_verbs() {
        let registry = ControllerRegistry::new().with(
            "widgets",
            ["patchWidget", "getWidget", "postWidget", "getWidgets"],
        );

        let verbs = available_verbs(&registry, "widgets", "Widget");
        assert_eq!(
            verbs.verbs(),
            &[HttpVerb::Get, HttpVerb::Post, HttpVerb::Patch]
        );
        assert_eq!(verbs.header_value(), "GET,POST,PATCH");
        assert!(!verbs.contains(HttpVerb::Delete));

        let verbs = available_verbs(&registry, "widgets", "Widgets");
        assert_eq!(verbs.header_value(), "GET");

        let verbs = available_verbs(&registry, "gadgets", "Widget");
        assert!(verbs.is_empty());
        assert_eq!(verbs.header_value(), "");
    }

    #[test]
    fn test_headers() {
        let registry = ControllerRegistry::new().with("widgets", ["getWidget", "postWidget"]);
        let verbs = available_verbs(&registry, "widgets", "Widget");
        assert_eq!(
            verbs.headers(),
            vec![
                "Allow: GET,POST".to_string(),
                "Access-Control-Allow-Methods: GET,POST".to_string(),
            ]
        );
    }
}
