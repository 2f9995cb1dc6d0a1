//! Runtime configuration for the documentation service.

use clap::Args;

use crate::cache::DEFAULT_TTL_DAYS;

pub const DEFAULT_CORPUS_URL: &str = "https://nodejs.org/docs/latest/api/all.json";
pub const DEFAULT_RELEASES_CHART_URL: &str =
    "https://raw.githubusercontent.com/nodejs/Release/main/schedule.svg?sanitize=true";

/// Where the documentation comes from and how long fetched copies stay fresh.
///
/// Every field can be set from the command line or the environment.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// URL of the Node.js `all.json` API documentation corpus
    #[arg(long, env = "NODEJS_DOCS_CORPUS_URL", default_value = DEFAULT_CORPUS_URL)]
    pub corpus_url: String,

    /// URL of the Node.js releases schedule chart (SVG)
    #[arg(long, env = "NODEJS_DOCS_RELEASES_CHART_URL", default_value = DEFAULT_RELEASES_CHART_URL)]
    pub releases_chart_url: String,

    /// Days a fetched document is served from cache before it is fetched again
    #[arg(long, env = "NODEJS_DOCS_TTL_DAYS", default_value_t = DEFAULT_TTL_DAYS)]
    pub ttl_days: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            corpus_url: DEFAULT_CORPUS_URL.to_string(),
            releases_chart_url: DEFAULT_RELEASES_CHART_URL.to_string(),
            ttl_days: DEFAULT_TTL_DAYS,
        }
    }
}
