use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// Read API server.
    #[serde(default = "default_server")]
    pub server: String,
    pub supabase_url: Option<String>,
    pub anon_key: Option<String>,
    #[serde(default = "default_bucket")]
    pub bucket: String,
    #[serde(default = "default_table")]
    pub table: String,
    pub gallery_dir: Option<PathBuf>,
}

/// Backend settings that passed validation.
pub struct Backend<'a> {
    pub url: &'a str,
    pub anon_key: &'a str,
    pub bucket: &'a str,
    pub table: &'a str,
}

fn default_server() -> String {
    "http://localhost:8080".into()
}

fn default_bucket() -> String {
    "fotos".into()
}

fn default_table() -> String {
    "usaha_foto".into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: default_server(),
            supabase_url: None,
            anon_key: None,
            bucket: default_bucket(),
            table: default_table(),
            gallery_dir: None,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let dir = dirs::config_dir()
        .context("could not find config directory")?
        .join("geofoto");
    Ok(dir.join("config.toml"))
}

impl Config {
    /// Config file values with `SUPABASE_URL` / `SUPABASE_ANON_KEY` applied on top.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;
        config.apply_overrides(|key| env::var(key).ok());
        Ok(config)
    }

    pub fn load_file() -> Result<Self> {
        let path = config_path()?;
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            toml::from_str(&content).with_context(|| format!("invalid {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = config_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("SUPABASE_URL") {
            self.supabase_url = Some(url);
        }
        if let Some(key) = lookup("SUPABASE_ANON_KEY") {
            self.anon_key = Some(key);
        }
    }

    pub fn backend(&self) -> Result<Backend<'_>> {
        let url = self
            .supabase_url
            .as_deref()
            .context("Supabase URL not set; run `geofoto config set --supabase-url ...` or export SUPABASE_URL")?;
        let anon_key = self
            .anon_key
            .as_deref()
            .context("Supabase anon key not set; run `geofoto config set --anon-key ...` or export SUPABASE_ANON_KEY")?;

        if is_placeholder(url) {
            bail!("Supabase URL {url:?} is still a placeholder");
        }
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            bail!("Supabase URL must start with http:// or https://");
        }
        if is_placeholder(anon_key) {
            bail!("Supabase anon key is empty or still a placeholder");
        }

        Ok(Backend {
            url: url.trim_end_matches('/'),
            anon_key,
            bucket: &self.bucket,
            table: &self.table,
        })
    }

    pub fn gallery_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.gallery_dir {
            return Ok(dir.clone());
        }
        let base = dirs::picture_dir()
            .or_else(dirs::home_dir)
            .context("could not find a pictures directory; set gallery_dir")?;
        Ok(base.join("geofoto"))
    }
}

fn is_placeholder(value: &str) -> bool {
    let value = value.trim();
    let lower = value.to_ascii_lowercase();
    value.is_empty()
        || lower.contains("your-project")
        || lower.contains("your_")
        || lower.contains("your-")
        || (value.starts_with('<') && value.ends_with('>'))
}
