use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::web::{self, Data, ServiceConfig};
use actix_web::{App, HttpRequest, HttpResponse, HttpResponseBuilder, HttpServer};
use anyhow::{Context, Result};
use chrono::Local;
use log::{error, info, warn};
use openssl::ssl::SslAcceptorBuilder;
use sd_notify::NotifyState;
use serde::{Deserialize, Serialize};

use crate::gate::{Gate, Outcome};
use crate::request::{Request, HEADER_AUTHORIZATION};
use crate::response::CommonResponse;
use crate::verb::HttpVerb;

pub const HEADER_GATE_CONTROLLER: &str = "X-Gate-Controller";
pub const HEADER_GATE_METHOD: &str = "X-Gate-Method";
pub const HEADER_GATE_RESOURCE_ID: &str = "X-Gate-Resource-Id";
pub const HEADER_GATE_IDENTITY: &str = "X-Gate-Identity";

pub const HEALTHZ_PATH: &str = "/healthz";

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthzResponse {
    pub now: u64,
    pub time_zone: String,
    pub client_ip: Option<String>,
    pub version: String,
}

/// Forward-authorization front: every request is run through the gate and
/// answered with the gate's decision.
pub struct RestfulServer {
    ssl: Option<SslAcceptorBuilder>,
    gate: Arc<Gate>,

    keep_alive_secs: Option<u64>,
    workers: Option<u64>,

    bind: String,

    whitelist_path: Option<PathBuf>,
}

impl RestfulServer {
    pub fn new(bind: String, gate: Arc<Gate>) -> Self {
        Self {
            ssl: None,
            gate,
            keep_alive_secs: None,
            workers: None,
            bind,
            whitelist_path: None,
        }
    }

    pub fn set_ssl(&mut self, ssl: SslAcceptorBuilder) {
        self.ssl = Some(ssl);
    }

    pub fn set_keep_alive_secs(&mut self, keep_alive_secs: u64) {
        self.keep_alive_secs = Some(keep_alive_secs);
    }

    pub fn set_workers(&mut self, workers: u64) {
        self.workers = Some(workers);
    }

    /// File re-read into the gate on SIGHUP.
    pub fn set_whitelist_path(&mut self, path: PathBuf) {
        self.whitelist_path = Some(path);
    }

    pub async fn run(mut self) -> Result<()> {
        let gate = self.gate.clone();
        let mut srv = HttpServer::new(move || {
            App::new()
                .app_data(Data::new(gate.clone()))
                .configure(configure)
        });

        if let Some(ssl) = self.ssl.take() {
            info!("Binding to https://{}", self.bind);
            srv = srv.bind_openssl(&self.bind, ssl).context("bind with ssl")?
        } else {
            warn!("Using HTTP (without SSL). THIS IS DANGEROUS, DO NOT USE IN PRODUCTION");
            info!("Binding to http://{}", self.bind);
            srv = srv.bind(&self.bind).context("bind without ssl")?
        };

        if let Some(keep_alive) = self.keep_alive_secs {
            srv = srv.keep_alive(Duration::from_secs(keep_alive));
        }
        if let Some(workers) = self.workers {
            srv = srv.workers(workers as usize);
        }

        if let Some(path) = self.whitelist_path.take() {
            Self::watch_reload(self.gate.clone(), path).context("watch reload signal")?;
        }

        sd_notify::notify(true, &[NotifyState::Ready]).context("notify systemd")?;
        info!("Starting gate server");
        srv.run().await.context("run server")?;

        info!("Server stopped by user");
        Ok(())
    }

    #[cfg(unix)]
    fn watch_reload(gate: Arc<Gate>, path: PathBuf) -> Result<()> {
        use tokio::signal::unix::{signal, SignalKind};

        let mut hangup = signal(SignalKind::hangup()).context("listen SIGHUP")?;
        tokio::spawn(async move {
            while hangup.recv().await.is_some() {
                info!("Received SIGHUP, reloading whitelist");
                if let Err(e) = gate.reload_whitelist_from(&path) {
                    error!("Reload whitelist failed, keep the old one: {e:#}");
                }
            }
        });
        Ok(())
    }

    #[cfg(not(unix))]
    fn watch_reload(_gate: Arc<Gate>, _path: PathBuf) -> Result<()> {
        warn!("Whitelist reload on signal is not supported on this platform");
        Ok(())
    }
}

/// Routes of the gate service. Expects `Data<Arc<Gate>>` in the app data.
pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(web::resource(HEALTHZ_PATH).route(web::get().to(handle_healthz)))
        .default_service(web::route().to(handle_gate));
}

async fn handle_gate(req: HttpRequest, gate: Data<Arc<Gate>>) -> HttpResponse {
    let verb: HttpVerb = match req.method().as_str().parse() {
        Ok(verb) => verb,
        Err(e) => {
            return err_response(StatusCode::METHOD_NOT_ALLOWED, e.to_string());
        }
    };

    let authorization = match req.headers().get(HEADER_AUTHORIZATION) {
        Some(value) => match value.to_str() {
            Ok(value) => Some(value.to_string()),
            Err(_) => {
                return err_response(
                    StatusCode::BAD_REQUEST,
                    "invalid authorization header value",
                );
            }
        },
        None => None,
    };

    let request = Request {
        verb,
        path: req.uri().path().to_string(),
        authorization,
    };
    let outcome = gate.activate(&request);
    outcome_response(&outcome)
}

async fn handle_healthz(req: HttpRequest) -> HttpResponse {
    let local = Local::now();
    let resp = HealthzResponse {
        now: local.timestamp() as u64,
        time_zone: format!("{}", local.offset()),
        client_ip: req.connection_info().peer_addr().map(String::from),
        version: String::from(env!("CARGO_PKG_VERSION")),
    };
    HttpResponse::Ok().json(resp)
}

/// Turns the gate's decision into the HTTP answer.
pub fn outcome_response(outcome: &Outcome) -> HttpResponse {
    let code = match outcome.response.status() {
        Some(code) => code,
        None => return pass_response(outcome),
    };

    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut resp = HttpResponseBuilder::new(status);
    for (name, value) in outcome.response.header_pairs() {
        resp.append_header((name, value));
    }

    if status == StatusCode::NO_CONTENT {
        return resp.finish();
    }
    let body = CommonResponse {
        code: status.as_u16(),
        message: outcome.response.message().map(String::from),
    };
    resp.json(body)
}

fn pass_response(outcome: &Outcome) -> HttpResponse {
    let route = &outcome.route;
    let mut resp = HttpResponse::Ok();
    resp.append_header((HEADER_GATE_CONTROLLER, route.controller.as_str()));
    resp.append_header((HEADER_GATE_METHOD, route.method.as_str()));
    if let Some(id) = route.resource_id.as_deref() {
        resp.append_header((HEADER_GATE_RESOURCE_ID, id));
    }
    if let Some(identity) = outcome.identity.as_ref() {
        resp.append_header((HEADER_GATE_IDENTITY, identity.id.as_str()));
    }
    resp.json(CommonResponse {
        code: StatusCode::OK.as_u16(),
        message: None,
    })
}

fn err_response(status: StatusCode, message: impl ToString) -> HttpResponse {
    let body = CommonResponse {
        code: status.as_u16(),
        message: Some(message.to_string()),
    };
    HttpResponseBuilder::new(status).json(body)
}
