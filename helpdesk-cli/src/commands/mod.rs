//! Subcommand implementations and the connection they share.

pub mod admin;
pub mod categories;
pub mod completion;
pub mod config;
pub mod navigate;
pub mod notifications;
pub mod session;
pub mod tickets;

use anyhow::{Context, Result, bail};
use client::{Helpdesk, Route};
use reqwest::cookie::Jar;
use serde_json::Value;
use shared::config::ClientConfig;
use std::{path::PathBuf, sync::Arc};
use tracing::debug;

use crate::GlobalArgs;

/// A configured client plus the cookie jar persisted between invocations.
#[derive(Debug)]
pub struct Connection {
    config: ClientConfig,
    helpdesk: Helpdesk,
    jar: Arc<Jar>,
    jar_path: PathBuf,
}

/// Layer defaults, the configuration file, the environment and `--base-url`.
pub fn load_config(global: &GlobalArgs) -> Result<ClientConfig> {
    ClientConfig::load_config(global.config.clone(), global.base_url.clone())
        .context("failed to load configuration")
}

impl Connection {
    /// Restore the saved cookie jar, if any, and build the client.
    pub fn open(config: ClientConfig) -> Result<Self> {
        let jar_path = session::session_path();
        let jar = match session::load_cookie_jar(&config.base_url, &jar_path) {
            Ok(jar) => jar,
            Err(err) => {
                debug!(error = %err, "starting without saved cookies");
                Arc::new(Jar::default())
            }
        };
        let helpdesk = Helpdesk::with_jar(&config, jar.clone())
            .context("failed to build HTTP client")?;

        Ok(Self {
            config,
            helpdesk,
            jar,
            jar_path,
        })
    }

    pub fn helpdesk(&self) -> &Helpdesk {
        &self.helpdesk
    }

    /// Navigate to `route` through the guard; fails when the guard redirects.
    pub async fn enter(&self, route: Route) -> Result<()> {
        let navigation = self.helpdesk.navigator().navigate(route).await;
        self.save()?;
        if navigation.redirected() {
            bail!(
                "access to {} denied; redirected to {}",
                navigation.requested,
                navigation.landed
            );
        }
        Ok(())
    }

    /// Write the cookie jar back to disk.
    pub fn save(&self) -> Result<()> {
        session::persist_cookie_jar(&self.jar, &self.config.base_url, &self.jar_path)
    }
}

/// Pretty-print a JSON payload to stdout.
pub fn print_json(value: &Value) -> Result<()> {
    if !value.is_null() {
        println!("{}", serde_json::to_string_pretty(value)?);
    }
    Ok(())
}

/// Parse `key=value` pairs given on the command line.
pub fn parse_pairs(pairs: &[String]) -> Result<Vec<(String, String)>> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
                .with_context(|| format!("expected key=value, got '{pair}'"))
        })
        .collect()
}

/// Fail with the store's recorded error, if the last action set one.
pub fn check_error(error: Option<String>) -> Result<()> {
    match error {
        Some(message) => bail!(message),
        None => Ok(()),
    }
}
