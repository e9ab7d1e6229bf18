use std::env;
use std::fmt;

pub const SUPABASE_URL_VAR: &str = "NEXT_PUBLIC_SUPABASE_URL";
pub const SERVICE_ROLE_KEY_VAR: &str = "SUPABASE_SERVICE_ROLE_KEY";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),
}

#[derive(Clone)]
pub struct Config {
    pub supabase_url: String,
    pub service_role_key: String,
    pub table: String,
    pub page_size: usize,
    pub timeout_secs: u64,
    pub max_listed_rows: usize,
}

impl Config {
    /// Read credentials and tunables from the process environment.
    ///
    /// The two credentials are required and must be non-blank. Tunables fall
    /// back to their defaults when absent or unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Config {
            supabase_url: required(SUPABASE_URL_VAR)?
                .trim_end_matches('/')
                .to_string(),
            service_role_key: required(SERVICE_ROLE_KEY_VAR)?,
            table: env::var("CATALOG_TABLE")
                .ok()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| "passeios".to_string()),
            page_size: env::var("REMOTE_PAGE_SIZE")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .ok()
                .filter(|n| *n > 0)
                .unwrap_or(1000),
            timeout_secs: env::var("REMOTE_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
            max_listed_rows: env::var("REMOTE_MAX_ROWS")
                .unwrap_or_else(|_| "100000".to_string())
                .parse()
                .ok()
                .filter(|n| *n > 0)
                .unwrap_or(100_000),
        })
    }

    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.supabase_url)
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingVar(name))
}

// The service-role key bypasses row level security; keep it out of logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("supabase_url", &self.supabase_url)
            .field("service_role_key", &"<redacted>")
            .field("table", &self.table)
            .field("page_size", &self.page_size)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_listed_rows", &self.max_listed_rows)
            .finish()
    }
}

/// Load `.env.local` and then `.env` from the working directory.
///
/// Variables already present in the environment are never overwritten, and
/// missing files are ignored.
pub fn load_dotenv_files() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::dotenv();
}
