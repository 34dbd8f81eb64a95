use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use log::{debug, info};

use crate::authn::{AuthChallenge, Identity, SchemeRegistry, GLOBAL_SCHEME};
use crate::connections::{Connections, MemoryConnections};
use crate::controller::{ControllerCatalog, ControllerRegistry};
use crate::errors::GateError;
use crate::permission::PermissionTable;
use crate::probe::{self, AvailableVerbs};
use crate::request::Request;
use crate::response::Response;
use crate::route::{RouteInfo, Router};
use crate::verb::HttpVerb;
use crate::whitelist::Whitelist;

/// Data the gate decides with. Requests read one snapshot from start to
/// finish; reloads swap in a whole new one.
#[derive(Debug, Clone)]
pub struct GateState {
    pub router: Router,
    pub controllers: ControllerRegistry,
    pub whitelist: Whitelist,
    pub permissions: PermissionTable,
    pub schemes: SchemeRegistry,
}

impl GateState {
    fn validate(&self) -> Result<(), GateError> {
        self.permissions.validate(&self.controllers)
    }

    pub fn available_verbs(&self, controller: &str, base: &str) -> AvailableVerbs {
        probe::available_verbs(&self.controllers, controller, base)
    }

    /// 404 when nothing handles the route, 405 when the controller handles
    /// the path with other verbs only.
    fn check_route(&self, route: &RouteInfo) -> Result<(), GateError> {
        if !route.is_matched() || !self.controllers.controller_exists(&route.controller) {
            return Err(GateError::RouteNotFound);
        }
        if self.controllers.method_exists(&route.controller, &route.method) {
            return Ok(());
        }

        let verbs = self.available_verbs(&route.controller, &route.base);
        if verbs.is_empty() {
            return Err(GateError::RouteNotFound);
        }
        Err(GateError::MethodNotAllowed(verbs))
    }
}

/// Result of running one request through the gate.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub response: Response,
    pub route: RouteInfo,

    /// `None` when no authentication ran.
    pub identity: Option<Identity>,
}

impl Outcome {
    /// The request may be handed to its controller.
    pub fn is_pass(&self) -> bool {
        !self.response.is_set()
    }
}

/// The request-authorization gate.
pub struct Gate {
    state: ArcSwap<GateState>,
    conns: Arc<dyn Connections>,
}

impl Gate {
    pub fn builder() -> GateBuilder {
        GateBuilder::default()
    }

    pub fn state(&self) -> Arc<GateState> {
        self.state.load_full()
    }

    /// Runs `req` through routing, OPTIONS handling, the whitelist,
    /// authentication and permission enforcement, in that order.
    pub fn activate(&self, req: &Request) -> Outcome {
        let state = self.state.load();
        let mut response = Response::new();
        let mut route = state.router.resolve(req.verb, &req.path);

        if route.verb == HttpVerb::Options {
            let verbs = state.available_verbs(&route.controller, &route.base);
            debug!("Options for {}: [{}]", req.path, verbs.header_value());
            response.set_status(204, None, Some(verbs.headers()));
            return Outcome {
                response,
                route,
                identity: None,
            };
        }

        if let Err(e) = state.check_route(&route) {
            debug!("Route {} {} rejected: {e}", route.verb, req.path);
            response.reject(&e);
            return Outcome {
                response,
                route,
                identity: None,
            };
        }

        if state.whitelist.is_whitelisted(&route.controller, &route.method) {
            debug!("{}.{} is whitelisted", route.controller, route.method);
            return Outcome {
                response,
                route,
                identity: None,
            };
        }

        let (scheme, identity) = match self.authenticate(&state, req) {
            Ok(result) => result,
            Err(e) => {
                info!("Authentication for {} {} failed: {e}", route.verb, req.path);
                response.reject(&e);
                return Outcome {
                    response,
                    route,
                    identity: None,
                };
            }
        };

        if route.resource_id.as_deref() == Some("me") {
            route.resource_id = Some(identity.id.clone());
        }

        if scheme == GLOBAL_SCHEME {
            state.permissions.enforce_permission(
                &identity.grants,
                &route.controller,
                &route.method,
                &mut response,
            );
        }

        Outcome {
            response,
            route,
            identity: Some(identity),
        }
    }

    fn authenticate(
        &self,
        state: &GateState,
        req: &Request,
    ) -> Result<(String, Identity), GateError> {
        let header = match req.authorization() {
            Some(header) => header,
            None => return Err(GateError::MissingCredentials),
        };

        let challenge = AuthChallenge::parse(header);
        let identity = state.schemes.dispatch(&challenge, &self.conns)?;
        debug!(
            "Authenticated '{}' with scheme {}",
            identity.id, challenge.scheme
        );
        Ok((challenge.scheme, identity))
    }

    pub fn reload_whitelist(&self, whitelist: Whitelist) {
        self.state.rcu(|cur| {
            let mut next = GateState::clone(cur);
            next.whitelist = whitelist.clone();
            next
        });
    }

    pub fn reload_whitelist_from(&self, path: impl AsRef<Path>) -> Result<()> {
        let whitelist = Whitelist::load(path)?;
        let rules = whitelist.rules().len();
        self.reload_whitelist(whitelist);
        info!("Reloaded whitelist with {rules} rules");
        Ok(())
    }

    /// Swaps in a new state after checking that every handler has a
    /// permission definition. The old state stays on failure.
    pub fn reload(&self, state: GateState) -> Result<()> {
        state.validate().context("validate gate state")?;
        self.state.store(Arc::new(state));
        Ok(())
    }
}

#[derive(Default)]
pub struct GateBuilder {
    router: Router,
    controllers: ControllerRegistry,
    whitelist: Whitelist,
    permissions: PermissionTable,
    schemes: Option<SchemeRegistry>,
    conns: Option<Arc<dyn Connections>>,
}

impl GateBuilder {
    pub fn router(mut self, router: Router) -> Self {
        self.router = router;
        self
    }

    pub fn controllers(mut self, controllers: ControllerRegistry) -> Self {
        self.controllers = controllers;
        self
    }

    pub fn whitelist(mut self, whitelist: Whitelist) -> Self {
        self.whitelist = whitelist;
        self
    }

    pub fn permissions(mut self, permissions: PermissionTable) -> Self {
        self.permissions = permissions;
        self
    }

    /// Defaults to [`SchemeRegistry::with_builtin`].
    pub fn schemes(mut self, schemes: SchemeRegistry) -> Self {
        self.schemes = Some(schemes);
        self
    }

    /// Defaults to an empty [`MemoryConnections`].
    pub fn connections(mut self, conns: Arc<dyn Connections>) -> Self {
        self.conns = Some(conns);
        self
    }

    pub fn build(self) -> Result<Gate> {
        let state = GateState {
            router: self.router,
            controllers: self.controllers,
            whitelist: self.whitelist,
            permissions: self.permissions,
            schemes: self.schemes.unwrap_or_else(SchemeRegistry::with_builtin),
        };
        state.validate().context("validate gate state")?;

        let conns = match self.conns {
            Some(conns) => conns,
            None => Arc::new(MemoryConnections::default()),
        };

        Ok(Gate {
            state: ArcSwap::from_pointee(state),
            conns,
        })
    }
}
