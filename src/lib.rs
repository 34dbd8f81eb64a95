pub mod authn;
pub mod code;
pub mod config;
pub mod connections;
pub mod controller;
pub mod errors;
pub mod gate;
pub mod logs;
pub mod permission;
pub mod probe;
pub mod request;
pub mod response;
pub mod restful;
pub mod route;
pub mod verb;
pub mod whitelist;

pub use errors::GateError;
pub use gate::{Gate, GateBuilder, GateState, Outcome};
pub use request::Request;
pub use response::Response;
pub use route::{RouteInfo, Router};
pub use verb::HttpVerb;
