use anyhow::{bail, Context, Result};
use clap::Args;
use url::Url;

use crate::history::DEFAULT_PAGE_SIZE;

/// Connection options shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub struct ConnectionArgs {
    /// Base URL of the analytics backend
    #[arg(long, global = true, env = "CRM_API_URL", default_value = "http://127.0.0.1:5000")]
    pub base_url: String,
    /// Session cookie value forwarded with every request
    #[arg(long, global = true, env = "CRM_SESSION", hide_env_values = true)]
    pub session: Option<String>,
    /// Request timeout in seconds
    #[arg(long, global = true, env = "CRM_TIMEOUT_SECS", default_value_t = 120)]
    pub timeout_secs: u64,
    /// Rows per history page
    #[arg(long, global = true, env = "CRM_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub base_url: Url,
    pub session: Option<String>,
    pub timeout_secs: u64,
    pub page_size: usize,
}

impl Config {
    pub fn from_args(args: &ConnectionArgs) -> Result<Self> {
        let mut base_url = Url::parse(args.base_url.trim())
            .with_context(|| format!("invalid base url {:?}", args.base_url))?;
        if base_url.cannot_be_a_base() {
            bail!("base url {base_url} cannot carry api paths");
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        if args.page_size == 0 {
            bail!("page size must be at least 1");
        }
        if args.timeout_secs == 0 {
            bail!("timeout must be at least 1 second");
        }
        Ok(Self {
            base_url,
            session: args
                .session
                .as_deref()
                .map(str::trim)
                .filter(|session| !session.is_empty())
                .map(str::to_string),
            timeout_secs: args.timeout_secs,
            page_size: args.page_size,
        })
    }
}
