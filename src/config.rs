//! CLI configuration: store location and credentials.

use std::path::PathBuf;

use anyhow::{Context, Result};
use luach_core::JsonStore;

/// The CLI is single-user; all rows belong to this owner.
pub const OWNER_ID: &str = "local";

const TOKEN_ENV: &str = "LUACH_GOOGLE_TOKEN";

pub fn data_dir() -> Result<PathBuf> {
    let base = dirs::data_dir().context("Could not determine the platform data directory")?;
    Ok(base.join("luach"))
}

pub fn open_store() -> Result<JsonStore> {
    let path = data_dir()?.join("store.json");
    JsonStore::open(path).context("Failed to open the luach store")
}

/// Access token for the Google Calendar API: `--token` wins, then the
/// environment. Token issuance (OAuth) is outside this tool; pass a token
/// minted elsewhere.
pub fn access_token(flag: Option<String>) -> Result<String> {
    if let Some(token) = flag
        && !token.is_empty()
    {
        return Ok(token);
    }
    std::env::var(TOKEN_ENV)
        .ok()
        .filter(|token| !token.is_empty())
        .with_context(|| format!("No access token; pass --token or set {}", TOKEN_ENV))
}
