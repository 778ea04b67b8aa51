use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::builder::FalseyValueParser;
use clap::Parser;
use vault_rest_core::{ClientConfig, DEFAULT_API_HOST};

#[derive(Debug, Parser)]
#[command(name = "vault-rest-mcp", version, about = "MCP server for an Obsidian vault's REST API")]
pub struct Settings {
    /// API key of the Local REST API plugin
    #[arg(long, env = "OBSIDIAN_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Base URL of the Local REST API
    #[arg(long, env = "OBSIDIAN_API_HOST", default_value = DEFAULT_API_HOST)]
    pub api_host: String,

    /// Accept self-signed TLS certificates from the vault server
    #[arg(long, env = "OBSIDIAN_INSECURE_TLS", value_parser = FalseyValueParser::new())]
    pub insecure_tls: bool,

    /// Append logs to this file and expose it as an MCP resource
    #[arg(long, env = "MCP_OBSIDIAN_LOG")]
    pub log_file: Option<PathBuf>,
}

impl Settings {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.api_key.clone(), self.api_host.clone())
            .with_insecure_tls(self.insecure_tls)
    }
}

/// `$XDG_CONFIG_HOME/mcp_obsidian/config`, falling back to `~/.config`.
pub fn xdg_config_file() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))?;
    Some(base.join("mcp_obsidian").join("config"))
}

pub fn config_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from(".env")];
    candidates.extend(xdg_config_file());
    candidates
}

/// Load the first existing env-style file into the process environment.
/// Variables that are already set are left alone.
pub fn load_env_file(candidates: &[PathBuf]) -> Result<Option<PathBuf>> {
    let Some(path) = candidates.iter().find(|p| p.is_file()) else {
        return Ok(None);
    };
    load(path)?;
    Ok(Some(path.clone()))
}

fn load(path: &Path) -> Result<()> {
    dotenvy::from_path(path)
        .with_context(|| format!("failed to load config file {}", path.display()))
}
