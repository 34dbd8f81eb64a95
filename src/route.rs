use crate::verb::HttpVerb;

/// Resolved target of a request.
///
/// An empty `controller` means no route matched the path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    pub verb: HttpVerb,
    pub controller: String,
    pub method: String,
    pub resource_id: Option<String>,

    /// Verb-free handler stem, `Widget` for `getWidget`.
    pub base: String,
}

impl RouteInfo {
    pub fn unmatched(verb: HttpVerb) -> Self {
        Self {
            verb,
            controller: String::new(),
            method: String::new(),
            resource_id: None,
            base: String::new(),
        }
    }

    pub fn is_matched(&self) -> bool {
        !self.controller.is_empty()
    }
}

/// Turns `verb + path` into a [`RouteInfo`].
///
/// Paths look like `/{controller}[/{id}[/{sub}]]`, below an optional prefix:
/// - `GET /widgets` -> `getWidgets`
/// - `GET /widgets/5` -> `getWidget`, id `5`
/// - `PUT /widgets/5/parts` -> `putWidgetParts`, id `5`
#[derive(Debug, Clone, Default)]
pub struct Router {
    prefix: String,
}

impl Router {
    pub fn new(prefix: impl AsRef<str>) -> Self {
        let prefix = prefix.as_ref().trim_matches('/');
        let prefix = if prefix.is_empty() {
            String::new()
        } else {
            format!("/{prefix}")
        };
        Self { prefix }
    }

    pub fn resolve(&self, verb: HttpVerb, path: &str) -> RouteInfo {
        let path = match self.strip_prefix(path) {
            Some(path) => path.trim_matches('/'),
            None => return RouteInfo::unmatched(verb),
        };
        if path.is_empty() {
            return RouteInfo::unmatched(verb);
        }

        let parts: Vec<&str> = path.split('/').collect();
        if parts.iter().any(|part| part.is_empty()) {
            return RouteInfo::unmatched(verb);
        }

        let (controller, id, base) = match parts.as_slice() {
            [controller] => (*controller, None, pascal(controller)),
            [controller, id] => (*controller, Some(*id), pascal(singular(controller))),
            [controller, id, sub] => {
                let base = format!("{}{}", pascal(singular(controller)), pascal(sub));
                (*controller, Some(*id), base)
            }
            _ => return RouteInfo::unmatched(verb),
        };

        RouteInfo {
            verb,
            controller: controller.to_string(),
            method: verb.method_name(&base),
            resource_id: id.map(String::from),
            base,
        }
    }

    fn strip_prefix<'a>(&self, path: &'a str) -> Option<&'a str> {
        if self.prefix.is_empty() {
            return Some(path);
        }
        let rest = path.strip_prefix(&self.prefix)?;
        if rest.is_empty() || rest.starts_with('/') {
            Some(rest)
        } else {
            None
        }
    }
}

fn singular(word: &str) -> &str {
    if word.len() > 1 {
        if let Some(stem) = word.strip_suffix('s') {
            return stem;
        }
    }
    word
}

fn pascal(word: &str) -> String {
    let mut result = String::with_capacity(word.len());
    for part in word.split(['-', '_']) {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            result.extend(first.to_uppercase());
            result.push_str(chars.as_str());
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_item() {
        let router = Router::default();
        let route = router.resolve(HttpVerb::Get, "/widgets/5");
        assert_eq!(route.controller, "widgets");
        assert_eq!(route.method, "getWidget");
        assert_eq!(route.resource_id.as_deref(), Some("5"));
        assert_eq!(route.base, "Widget");
        assert_eq!(route.verb, HttpVerb::Get);
    }

    #[test]
    fn test_resolve_collection_and_sub() {
        let router = Router::default();

        let route = router.resolve(HttpVerb::Post, "/widgets/");
        assert_eq!(route.method, "postWidgets");
        assert_eq!(route.resource_id, None);

        let route = router.resolve(HttpVerb::Put, "widgets/5/spare-parts");
        assert_eq!(route.method, "putWidgetSpareParts");
        assert_eq!(route.resource_id.as_deref(), Some("5"));

        let route = router.resolve(HttpVerb::Get, "/user_groups/me");
        assert_eq!(route.controller, "user_groups");
        assert_eq!(route.method, "getUserGroup");
        assert_eq!(route.resource_id.as_deref(), Some("me"));
    }

    #[test]
    fn test_resolve_unmatched() {
        let router = Router::default();
        assert!(!router.resolve(HttpVerb::Get, "/").is_matched());
        assert!(!router.resolve(HttpVerb::Get, "").is_matched());
        assert!(!router.resolve(HttpVerb::Get, "/a/b/c/d").is_matched());
        assert!(!router.resolve(HttpVerb::Get, "/a//b").is_matched());
    }

    #[test]
    fn test_resolve_prefix() {
        let router = Router::new("/api/");
        let route = router.resolve(HttpVerb::Delete, "/api/widgets/7");
        assert_eq!(route.controller, "widgets");
        assert_eq!(route.method, "deleteWidget");

        assert!(!router.resolve(HttpVerb::Get, "/apix/widgets").is_matched());
        assert!(!router.resolve(HttpVerb::Get, "/widgets").is_matched());
        assert!(!router.resolve(HttpVerb::Get, "/api").is_matched());
    }

    #[test]
    fn test_singular() {
        assert_eq!(singular("widgets"), "widget");
        assert_eq!(singular("s"), "s");
        assert_eq!(singular("data"), "data");
    }
}
