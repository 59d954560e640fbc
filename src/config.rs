use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::fmt;
use std::time::Duration;

use crate::error::{Result, TryonError};

/// Environment variable holding the service host and path prefix.
pub const ENV_TRYON_URL: &str = "tryon_url";
/// Environment variable holding the access token.
pub const ENV_TOKEN: &str = "token";
/// Environment variable holding the session cookie.
pub const ENV_COOKIE: &str = "Cookie";
/// Environment variable holding the referer.
pub const ENV_REFERER: &str = "referer";

/// Opaque credentials forwarded to the service as request headers.
///
/// `Debug` output is redacted, and the generated header values are marked
/// sensitive so they never show up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub cookie: String,
    pub referer: String,
}

impl Credentials {
    pub fn new(
        token: impl Into<String>,
        cookie: impl Into<String>,
        referer: impl Into<String>,
    ) -> Self {
        Self {
            token: token.into(),
            cookie: cookie.into(),
            referer: referer.into(),
        }
    }

    /// Build the `token`, `Cookie` and `referer` headers.
    pub fn header_map(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        for (name, value) in [
            ("token", &self.token),
            ("cookie", &self.cookie),
            ("referer", &self.referer),
        ] {
            let mut value =
                HeaderValue::from_str(value).map_err(|_| TryonError::InvalidHeader(name))?;
            value.set_sensitive(true);
            headers.insert(HeaderName::from_static(name), value);
        }
        Ok(headers)
    }
}

fn redact(secret: &str) -> String {
    if secret.chars().count() <= 4 {
        return "***".to_string();
    }
    let prefix: String = secret.chars().take(4).collect();
    format!("{prefix}***")
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &redact(&self.token))
            .field("cookie", &redact(&self.cookie))
            .field("referer", &self.referer)
            .finish()
    }
}

/// Timeouts and the fixed polling schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSchedule {
    /// Timeout of the job submission POST.
    pub submit_timeout: Duration,
    /// Wait after submission before the first status query.
    pub initial_delay: Duration,
    /// Maximum number of status queries.
    pub max_attempts: u32,
    /// Timeout of each status query.
    pub query_timeout: Duration,
    /// Wait between status queries.
    pub retry_delay: Duration,
    /// Timeout of the synchronous try-on POST.
    pub sync_timeout: Duration,
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self {
            submit_timeout: Duration::from_secs(50),
            initial_delay: Duration::from_secs(9),
            max_attempts: 10,
            query_timeout: Duration::from_secs(15),
            retry_delay: Duration::from_secs(1),
            sync_timeout: Duration::from_secs(60),
        }
    }
}

impl PollSchedule {
    pub fn with_submit_timeout(mut self, timeout: Duration) -> Self {
        self.submit_timeout = timeout;
        self
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_sync_timeout(mut self, timeout: Duration) -> Self {
        self.sync_timeout = timeout;
        self
    }
}

/// Everything a [`TryonClient`](crate::TryonClient) needs, loaded once per
/// process and passed in explicitly.
#[derive(Debug, Clone)]
pub struct TryonConfig {
    /// Host and path prefix, e.g. `tryon.example.com/api/`. Endpoint names
    /// are appended directly.
    pub tryon_url: String,
    pub credentials: Credentials,
    pub schedule: PollSchedule,
}

impl TryonConfig {
    pub fn new(tryon_url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            tryon_url: tryon_url.into(),
            credentials,
            schedule: PollSchedule::default(),
        }
    }

    /// Read `tryon_url`, `token`, `Cookie` and `referer` from the process
    /// environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).ok_or_else(|| TryonError::MissingEnv(key.to_string()));
        let tryon_url = get(ENV_TRYON_URL)?;
        let credentials = Credentials::new(get(ENV_TOKEN)?, get(ENV_COOKIE)?, get(ENV_REFERER)?);
        Ok(Self::new(tryon_url, credentials))
    }

    pub fn with_schedule(mut self, schedule: PollSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Base URL with a scheme. `http://` is assumed when none is given.
    pub fn base_url(&self) -> String {
        if self.tryon_url.starts_with("http://") || self.tryon_url.starts_with("https://") {
            self.tryon_url.clone()
        } else {
            format!("http://{}", self.tryon_url)
        }
    }
}
