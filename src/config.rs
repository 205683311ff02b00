//! Backend configuration for nerium-contrib.
//!
//! Collects `<CODE>_BACKEND` connection strings from a dotenv file and the
//! process environment into an immutable [`BackendConfig`] that is built once
//! at startup and shared by every adapter.

use crate::error::{NeriumError, Result};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::Path;
use tracing::{debug, info};

/// Suffix shared by every backend variable (`PGSQL_BACKEND`, `MYSQL_BACKEND`, ...).
pub const BACKEND_SUFFIX: &str = "_BACKEND";

/// Connection string returned when no backend is configured for a code.
pub const NO_BACKEND: &str = "NO BACKEND";

/// Dotenv file read when no `.env` is found from the working directory up.
pub const FALLBACK_DOTENV_PATH: &str = "/dotenv/.env";

/// Immutable mapping from backend variable names to connection strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendConfig {
    backends: BTreeMap<String, String>,
}

impl BackendConfig {
    /// Loads configuration from the nearest `.env` (falling back to
    /// [`FALLBACK_DOTENV_PATH`]) layered under the process environment.
    pub fn load() -> Result<Self> {
        Self::load_with(None)
    }

    /// Like [`BackendConfig::load`], but an explicit dotenv file replaces the
    /// search. The explicit file must exist.
    pub fn load_with(env_file: Option<&Path>) -> Result<Self> {
        let dotenv_entries = match env_file {
            Some(path) => read_dotenv(path)?,
            None => {
                let cwd = std::env::current_dir()
                    .map_err(|e| NeriumError::config(format!("Cannot read working directory: {e}")))?;
                discover_dotenv(&cwd, Path::new(FALLBACK_DOTENV_PATH))?
            }
        };

        let config = Self::layered(dotenv_entries, std::env::vars_os());
        info!("Loaded {} backend(s)", config.backend_count());
        Ok(config)
    }

    /// Builds a configuration from explicit `(name, value)` pairs.
    ///
    /// Pairs whose name does not end in `_BACKEND` are ignored.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut config = Self::default();
        config.extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        config
    }

    /// Adds a backend for the given code, returning the updated config.
    pub fn with_backend(mut self, code: &str, connection_string: impl Into<String>) -> Self {
        self.backends
            .insert(variable_name(code), connection_string.into());
        self
    }

    /// Resolves a backend code to its connection string.
    ///
    /// Never fails: an unconfigured code yields [`NO_BACKEND`].
    pub fn backend_lookup(&self, backend_code: &str) -> String {
        let key = variable_name(backend_code);
        match self.backends.get(&key) {
            Some(value) => value.clone(),
            None => NO_BACKEND.to_string(),
        }
    }

    /// Number of configured backends.
    pub fn backend_count(&self) -> usize {
        self.backends.len()
    }

    /// Dotenv entries first, then environment variables on top. Variables
    /// that are not valid UTF-8 cannot name a backend and are skipped.
    fn layered(
        dotenv_entries: Vec<(String, String)>,
        env: impl IntoIterator<Item = (OsString, OsString)>,
    ) -> Self {
        let mut config = Self::default();
        config.extend(dotenv_entries);
        config.extend(
            env.into_iter()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?))),
        );
        config
    }

    fn extend(&mut self, vars: impl IntoIterator<Item = (String, String)>) {
        for (key, value) in vars {
            if key.ends_with(BACKEND_SUFFIX) {
                self.backends.insert(key, value);
            }
        }
    }
}

/// Returns the environment variable name for a backend code.
pub fn variable_name(backend_code: &str) -> String {
    format!("{}{BACKEND_SUFFIX}", backend_code.to_uppercase())
}

/// Searches for `.env` from `start` upward, then tries `fallback`. Missing
/// files are not an error.
fn discover_dotenv(start: &Path, fallback: &Path) -> Result<Vec<(String, String)>> {
    if let Some(found) = start.ancestors().map(|dir| dir.join(".env")).find(|p| p.is_file()) {
        return read_dotenv(&found);
    }

    match dotenvy::from_path_iter(fallback) {
        Ok(iter) => {
            debug!("Reading backends from {}", fallback.display());
            collect_entries(iter, fallback)
        }
        Err(e) if e.not_found() => Ok(Vec::new()),
        Err(e) => Err(dotenv_error(fallback, e)),
    }
}

fn read_dotenv(path: &Path) -> Result<Vec<(String, String)>> {
    let iter = dotenvy::from_path_iter(path).map_err(|e| dotenv_error(path, e))?;
    debug!("Reading backends from {}", path.display());
    collect_entries(iter, path)
}

fn collect_entries<R: std::io::Read>(
    iter: dotenvy::Iter<R>,
    path: &Path,
) -> Result<Vec<(String, String)>> {
    iter.map(|entry| entry.map_err(|e| dotenv_error(path, e)))
        .collect()
}

fn dotenv_error(path: &Path, e: dotenvy::Error) -> NeriumError {
    NeriumError::config(format!("Failed to read {}: {e}", path.display()))
}
