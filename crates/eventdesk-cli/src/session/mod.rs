//! Session persistence and client construction for CLI commands.

mod console;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use directories::ProjectDirs;
use eventdesk::{ApiClient, BackendKind, BaseUrl, ClientConfig, FileStorage, SessionStore};

use console::{ConsoleNotifier, TerminalNavigator};

use crate::cli::Cli;

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub api_url: Option<String>,
    pub backend: BackendKind,
    pub data_dir: Option<PathBuf>,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            api_url: cli.api_url.clone(),
            backend: cli.backend,
            data_dir: cli.data_dir.clone(),
        }
    }

    /// Directory the session file lives in.
    pub fn session_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        let dirs = ProjectDirs::from("", "", "eventdesk")
            .context("Could not determine data directory")?;
        Ok(dirs.data_dir().to_path_buf())
    }

    pub fn storage(&self) -> Result<Arc<FileStorage>> {
        Ok(Arc::new(FileStorage::in_dir(self.session_dir()?)))
    }

    /// The stored session, without any network access.
    pub fn session(&self) -> Result<SessionStore> {
        Ok(SessionStore::restore(self.storage()?))
    }

    /// A client for the configured backend, working on the stored session.
    ///
    /// `location` is the dashboard page the command stands for; it becomes
    /// the return path if the session has to end.
    pub fn client(&self, location: &str) -> Result<ApiClient> {
        let url = self
            .api_url
            .as_deref()
            .context("No API URL. Pass --api-url or set EVENTDESK_API_URL.")?;
        let base = BaseUrl::new(url).context("Invalid API URL")?;
        let config = ClientConfig::new(base).with_backend(self.backend);

        let client = ApiClient::builder(config)
            .storage(self.storage()?)
            .notifier(Arc::new(ConsoleNotifier))
            .navigator(Arc::new(TerminalNavigator::new(location)))
            .build()
            .context("Failed to create API client")?;

        Ok(client)
    }

    /// Like [`Context::client`], but fails early when nobody is logged in.
    pub fn authenticated_client(&self, location: &str) -> Result<ApiClient> {
        let client = self.client(location)?;
        client
            .require_session()
            .context("No active session. Run 'eventdesk auth login' first.")?;
        Ok(client)
    }
}
