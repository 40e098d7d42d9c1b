use anyhow::{bail, Context, Result};
use reqwest::Url;
use std::env;

/// Which credential the Supabase REST backend was configured with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyRole {
    ServiceRole,
    Anon,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Clone)]
pub enum Backend {
    /// Process-local store, for development and tests.
    Memory,
    Postgres {
        database_url: String,
        max_connections: u32,
    },
    Supabase {
        url: String,
        api_key: String,
        key_role: KeyRole,
    },
}

#[derive(Clone)]
pub struct Config {
    pub bind_address: String,
    pub backend: Backend,
    pub otlp_endpoint: Option<String>,
    pub log_format: LogFormat,
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = match lookup("GEOFOTO_BACKEND").as_deref() {
            Some("memory") => Backend::Memory,
            None => backend_from_credentials(&lookup)?,
            Some(other) => bail!("unknown GEOFOTO_BACKEND {other:?}"),
        };

        Ok(Self {
            bind_address: lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:8080".into()),
            backend,
            otlp_endpoint: lookup("OTEL_EXPORTER_OTLP_ENDPOINT"),
            log_format: match lookup("LOG_FORMAT").as_deref() {
                None | Some("json") => LogFormat::Json,
                Some("pretty") => LogFormat::Pretty,
                Some(other) => bail!("unknown LOG_FORMAT {other:?}, expected json or pretty"),
            },
            request_timeout_secs: lookup("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|| "30".into())
                .parse()
                .context("REQUEST_TIMEOUT_SECS must be a number of seconds")?,
        })
    }
}

fn backend_from_credentials<F>(lookup: &F) -> Result<Backend>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(database_url) = lookup("DATABASE_URL") {
        require_real("DATABASE_URL", &database_url)?;
        return Ok(Backend::Postgres {
            database_url,
            max_connections: lookup("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|| "10".into())
                .parse()
                .context("DB_MAX_CONNECTIONS must be a number")?,
        });
    }

    let url = lookup("SUPABASE_URL").context("SUPABASE_URL or DATABASE_URL required")?;
    require_real("SUPABASE_URL", &url)?;
    let parsed = Url::parse(&url).context("SUPABASE_URL is not a valid URL")?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!("SUPABASE_URL must use http or https");
    }

    let (api_key, key_role) = match lookup("SUPABASE_SERVICE_ROLE_KEY") {
        Some(key) => (key, KeyRole::ServiceRole),
        None => (
            lookup("SUPABASE_ANON_KEY")
                .context("SUPABASE_SERVICE_ROLE_KEY or SUPABASE_ANON_KEY required")?,
            KeyRole::Anon,
        ),
    };
    require_real("Supabase API key", &api_key)?;

    Ok(Backend::Supabase {
        url: url.trim_end_matches('/').to_string(),
        api_key,
        key_role,
    })
}

fn require_real(name: &str, value: &str) -> Result<()> {
    if is_placeholder(value) {
        bail!("{name} is empty or still a placeholder value");
    }
    Ok(())
}

/// Values copied verbatim from an example `.env` file.
pub fn is_placeholder(value: &str) -> bool {
    let value = value.trim();
    let lower = value.to_ascii_lowercase();
    value.is_empty()
        || lower.contains("your-project")
        || lower.contains("your_")
        || lower.contains("your-")
        || (value.starts_with('<') && value.ends_with('>'))
}
