use std::collections::{BTreeSet, HashMap};

/// Lookup surface over the application's controllers.
///
/// Routing and the verb prober only ever ask these two questions, so any
/// registry of controller descriptors can back the gate.
pub trait ControllerCatalog: Send + Sync {
    fn controller_exists(&self, controller: &str) -> bool;

    fn method_exists(&self, controller: &str, method: &str) -> bool;
}

/// Controller name -> handler method names.
#[derive(Debug, Clone, Default)]
pub struct ControllerRegistry {
    controllers: HashMap<String, BTreeSet<String>>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a controller with its handler methods. Registering the same
    /// controller again adds to its method set.
    pub fn register<I, S>(&mut self, controller: impl Into<String>, methods: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self.controllers.entry(controller.into()).or_default();
        entry.extend(methods.into_iter().map(Into::into));
    }

    pub fn with<I, S>(mut self, controller: impl Into<String>, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.register(controller, methods);
        self
    }

    /// Every `(controller, method)` pair, sorted by method within a controller.
    pub fn handlers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.controllers.iter().flat_map(|(controller, methods)| {
            methods
                .iter()
                .map(move |method| (controller.as_str(), method.as_str()))
        })
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }
}

impl ControllerCatalog for ControllerRegistry {
    fn controller_exists(&self, controller: &str) -> bool {
        self.controllers.contains_key(controller)
    }

    fn method_exists(&self, controller: &str, method: &str) -> bool {
        match self.controllers.get(controller) {
            Some(methods) => methods.contains(method),
            None => false,
        }
    }
}
