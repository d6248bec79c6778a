//! We can have a little hard-coded config, plus the two knobs that actually
//! vary between machines, which come from the environment (or `.env`).

use anyhow::{Context, Result};
use std::{net::SocketAddr, path::PathBuf, time::Duration};

/// How long the search box waits after the last keystroke before the filter
/// is applied. Shared by the htmx trigger and the client-side controller.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Checklist notes only preview this many items on a card; the rest are
/// summarized as "+ N more".
pub const MAX_VISIBLE_CHECKLIST_ITEMS: usize = 5;

pub const HTMX_SRC: &str = "https://unpkg.com/htmx.org@1.9.6";
pub const TAILWIND_SRC: &str = "https://cdn.tailwindcss.com";

const DEFAULT_DATABASE: &str = "data/notes.db";
const DEFAULT_BIND: &str = "127.0.0.1:8000";

#[derive(Clone, Debug)]
pub struct Config {
    pub database_path: PathBuf,
    pub bind_addr: SocketAddr,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_path = lookup("NOTEKEEP_DATABASE")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string())
            .into();
        let bind = lookup("NOTEKEEP_BIND")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind_addr = bind
            .parse()
            .with_context(|| format!("NOTEKEEP_BIND={bind} is not a socket address"))?;

        Ok(Self {
            database_path,
            bind_addr,
        })
    }
}
