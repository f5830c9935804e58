// Runtime configuration read from the process environment and `.env` files.

use crate::api::{Endpoints, CATBOX_ROOT, LITTERBOX_ROOT};
use std::path::PathBuf;
use tracing::debug;

pub const USERHASH_VAR: &str = "USERHASH";
pub const CATBOX_URL_VAR: &str = "CAT_TREE_CATBOX_URL";
pub const LITTERBOX_URL_VAR: &str = "CAT_TREE_LITTERBOX_URL";

#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Catbox account hash; uploads are attached to that account when set.
    pub account_token: Option<String>,
    pub endpoints: Endpoints,
}

impl Config {
    /// Load `.env` files, then read configuration from the environment.
    ///
    /// A `.env` in the working directory (or a parent) is read first, then
    /// `<config dir>/cat-tree/.env`. Variables that are already set are never
    /// overridden.
    pub fn from_env() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "loaded .env"),
            Err(err) => debug!(error = %err, "no .env in working directory"),
        }
        if let Some(path) = user_env_file().filter(|path| path.is_file()) {
            if let Err(err) = dotenvy::from_path(&path) {
                debug!(path = %path.display(), error = %err, "could not load user .env");
            }
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let account_token = lookup(USERHASH_VAR).filter(|token| !token.trim().is_empty());
        let standard = lookup(CATBOX_URL_VAR).unwrap_or_else(|| CATBOX_ROOT.into());
        let ephemeral = lookup(LITTERBOX_URL_VAR).unwrap_or_else(|| LITTERBOX_ROOT.into());
        Config {
            account_token,
            endpoints: Endpoints::new(standard, ephemeral),
        }
    }
}

fn user_env_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("cat-tree").join(".env"))
}
