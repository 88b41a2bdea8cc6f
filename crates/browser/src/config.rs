//! Configuration file discovery and loading.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use shell::SessionConfig;
use tracing::{info, warn};

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "OCTO_BROWSE_CONFIG";

/// Config file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "octo-browse.toml";

/// Load the session configuration.
///
/// Looks in order at `explicit` (from `--config`), the file named by
/// `OCTO_BROWSE_CONFIG`, and `./octo-browse.toml`. Without a file the
/// defaults are used. A file that exists but does not parse is an error.
pub fn load_config(explicit: Option<&Path>) -> Result<SessionConfig> {
    let env = std::env::var(CONFIG_ENV).ok();
    let cwd = std::env::current_dir().context("cannot determine working directory")?;

    match find_config_path(explicit, env.as_deref(), &cwd)? {
        Some(path) => read_config(&path),
        None => {
            info!("No config file found, using defaults");
            Ok(SessionConfig::default())
        }
    }
}

/// Pick the config file to read.
pub fn find_config_path(explicit: Option<&Path>, env: Option<&str>, cwd: &Path) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.is_file() {
            bail!("config file not found: {}", path.display());
        }
        return Ok(Some(path.to_path_buf()));
    }

    if let Some(path) = env.filter(|p| !p.is_empty()) {
        let path = PathBuf::from(path);
        if path.is_file() {
            return Ok(Some(path));
        }
        warn!(path = %path.display(), "{CONFIG_ENV} does not name a file, ignoring");
    }

    let path = cwd.join(CONFIG_FILE_NAME);
    Ok(path.is_file().then_some(path))
}

/// Parse one config file.
pub fn read_config(path: &Path) -> Result<SessionConfig> {
    let content =
        fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    let config = toml::from_str::<SessionConfig>(&content)
        .with_context(|| format!("invalid config file {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid config file {}", path.display()))?;
    info!(path = %path.display(), "Configuration loaded");
    Ok(config)
}
