use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::{fs, io};

use anyhow::{bail, Context, Result};
use log::{info, warn};
use openssl::ssl::{SslAcceptor, SslAcceptorBuilder, SslFiletype, SslMethod};
use serde::{Deserialize, Serialize};

use crate::connections::{ApiKeyRecord, MemoryConnections, UserRecord};
use crate::controller::ControllerRegistry;
use crate::gate::Gate;
use crate::logs::LogsConfig;
use crate::permission::PermissionTable;
use crate::restful::RestfulServer;
use crate::route::Router;
use crate::whitelist::Whitelist;

pub trait CommonConfig {
    /// Validates the config and fills in derived values.
    fn complete(&mut self) -> Result<()>;
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GateConfig {
    #[serde(default = "GateConfig::default_bind")]
    pub bind: String,

    /// Path prefix every routed path lives below, e.g. `/api`.
    #[serde(default)]
    pub prefix: String,

    /// JSON whitelist file. No file means every route needs authentication.
    #[serde(default)]
    pub whitelist_path: String,

    #[serde(default)]
    pub ssl: bool,

    #[serde(default)]
    pub cert_path: String,

    #[serde(default)]
    pub key_path: String,

    pub keep_alive_secs: Option<u64>,

    pub workers: Option<u64>,

    #[serde(default)]
    pub logs: LogsConfig,

    /// Controller name -> handler method names.
    #[serde(default)]
    pub controllers: BTreeMap<String, Vec<String>>,

    /// Controller -> method -> required permission bits.
    #[serde(default)]
    pub permissions: PermissionTable,

    #[serde(default)]
    pub users: Vec<UserRecord>,

    #[serde(default)]
    pub api_keys: Vec<ApiKeyRecord>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            bind: Self::default_bind(),
            prefix: String::new(),
            whitelist_path: String::new(),
            ssl: false,
            cert_path: String::new(),
            key_path: String::new(),
            keep_alive_secs: None,
            workers: None,
            logs: LogsConfig::default(),
            controllers: BTreeMap::new(),
            permissions: PermissionTable::default(),
            users: vec![],
            api_keys: vec![],
        }
    }
}

impl CommonConfig for GateConfig {
    fn complete(&mut self) -> Result<()> {
        self.bind = expandenv("bind", &self.bind)?;
        if self.bind.is_empty() {
            bail!("bind is required");
        }

        self.whitelist_path = expandenv("whitelist_path", &self.whitelist_path)?;

        if self.ssl {
            self.cert_path = expandenv("cert_path", &self.cert_path)?;
            if self.cert_path.is_empty() {
                bail!("cert_path is required when ssl is enabled");
            }
            self.key_path = expandenv("key_path", &self.key_path)?;
            if self.key_path.is_empty() {
                bail!("key_path is required when ssl is enabled");
            }
        }

        if let Some(keep_alive_secs) = self.keep_alive_secs {
            if keep_alive_secs == 0 {
                bail!("keep_alive_secs must be greater than 0");
            }
        }

        if let Some(workers) = self.workers {
            if workers == 0 {
                bail!("workers must be greater than 0");
            }
        }

        for (controller, methods) in self.controllers.iter() {
            if controller.is_empty() {
                bail!("controller name cannot be empty");
            }
            if methods.iter().any(|m| m.is_empty()) {
                bail!("controller '{controller}' has an empty method name");
            }
        }

        self.logs.complete().context("logs")?;

        Ok(())
    }
}

impl GateConfig {
    /// Reads a TOML config. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut cfg: Self = match fs::read_to_string(path) {
            Ok(s) => toml::from_str(&s)
                .with_context(|| format!("parse config file '{}' toml", path.display()))?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                warn!("Config file '{}' not found, using defaults", path.display());
                Self::default()
            }
            Err(err) => {
                return Err(err).with_context(|| format!("read config file '{}'", path.display()))
            }
        };

        cfg.complete().context("validate config")?;
        Ok(cfg)
    }

    pub fn default_path() -> PathBuf {
        match std::env::var_os("AUTHGATE_CONFIG") {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from("authgate.toml"),
        }
    }

    pub fn build_controllers(&self) -> ControllerRegistry {
        let mut controllers = ControllerRegistry::new();
        for (controller, methods) in self.controllers.iter() {
            controllers.register(controller.clone(), methods.iter().cloned());
        }
        controllers
    }

    pub fn build_whitelist(&self) -> Result<Whitelist> {
        if self.whitelist_path.is_empty() {
            warn!("No whitelist configured, every route requires authentication");
            return Ok(Whitelist::default());
        }
        Whitelist::load(&self.whitelist_path)
    }

    pub fn build_gate(&self) -> Result<Gate> {
        let conns = MemoryConnections::new(self.users.clone(), self.api_keys.clone())
            .context("init credential store")?;
        let whitelist = self.build_whitelist()?;
        let controllers = self.build_controllers();
        info!(
            "Gate has {} controllers, {} whitelist rules, {} users, {} api keys",
            controllers.len(),
            whitelist.rules().len(),
            self.users.len(),
            self.api_keys.len()
        );

        Gate::builder()
            .router(Router::new(&self.prefix))
            .controllers(controllers)
            .whitelist(whitelist)
            .permissions(self.permissions.clone())
            .connections(Arc::new(conns))
            .build()
    }

    pub fn build_restful_server(&self, gate: Arc<Gate>) -> Result<RestfulServer> {
        let mut srv = RestfulServer::new(self.bind.clone(), gate);
        if self.ssl {
            let ssl = self.build_ssl()?;
            srv.set_ssl(ssl);
        }

        if let Some(keep_alive_secs) = self.keep_alive_secs {
            srv.set_keep_alive_secs(keep_alive_secs);
        }

        if let Some(workers) = self.workers {
            srv.set_workers(workers);
        }

        if !self.whitelist_path.is_empty() {
            srv.set_whitelist_path(PathBuf::from(&self.whitelist_path));
        }

        Ok(srv)
    }

    fn build_ssl(&self) -> Result<SslAcceptorBuilder> {
        if !Path::new(&self.key_path).exists() {
            bail!("ssl key file not exists: {:?}", self.key_path);
        }
        if !Path::new(&self.cert_path).exists() {
            bail!("ssl cert file not exists: {:?}", self.cert_path);
        }

        let mut builder =
            SslAcceptor::mozilla_intermediate(SslMethod::tls()).context("init ssl acceptor")?;

        builder
            .set_private_key_file(&self.key_path, SslFiletype::PEM)
            .context("load ssl key file")?;
        builder
            .set_certificate_chain_file(&self.cert_path)
            .context("load ssl cert file")?;

        Ok(builder)
    }

    fn default_bind() -> String {
        String::from("127.0.0.1:13580")
    }
}

/// See: [`shellexpand::full`].
pub fn expandenv(name: &str, s: impl AsRef<str>) -> Result<String> {
    let s =
        shellexpand::full(s.as_ref()).with_context(|| format!("expand env value for '{name}'"))?;
    Ok(s.to_string())
}
