use crate::error::MonoError;
use crate::models::{
    ApiErrorBody, StatementItem, UserInfo, WebhookRequest, parse_client_info, parse_error,
    parse_statements,
};
use chrono::{DateTime, TimeDelta, Utc};
use log::{debug, info, warn};
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::{Client as HttpClient, Method, RequestBuilder};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

const BASE_URL: &str = "https://api.monobank.ua";
const TOKEN_HEADER: HeaderName = HeaderName::from_static("x-token");
const CLIENT_INFO_ENDPOINT: &str = "personal/client-info";
const STATEMENT_ENDPOINT: &str = "personal/statement";
const WEBHOOK_ENDPOINT: &str = "personal/webhook";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Account identifier the API resolves to the client's primary account.
pub const DEFAULT_ACCOUNT: &str = "0";

/// Longest accepted statement period: 31 days and 1 hour, exclusive.
pub const MAX_STATEMENT_RANGE_SECS: i64 = 2_682_000;

/// Statement requests closer together than this (inclusive) are refused.
pub const MIN_STATEMENT_INTERVAL_SECS: i64 = 60;

const INITIAL_BACKDATE_SECS: i64 = 120;

/// Source of wall-clock time for the statement rate guard.
pub trait Clock: fmt::Debug + Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Client for the Monobank personal API.
///
/// The base URL must point at the API host; endpoint paths are appended to it
/// as-is. Clones share the HTTP connection pool and the statement rate guard.
#[derive(Debug, Clone)]
pub struct Client {
    token: HeaderValue,
    http: HttpClient,
    base_url: String,
    clock: Arc<dyn Clock>,
    last_statement_request: Arc<Mutex<DateTime<Utc>>>,
}

impl Client {
    /// Create a new client with its own HTTP transport and the default base URL.
    pub fn new(token: impl AsRef<str>) -> Result<Self, MonoError> {
        let http = build_http(DEFAULT_TIMEOUT)?;
        let client = Self::with_http_client(http, token)?;
        info!("Initialized Monobank API client with default base URL");
        Ok(client)
    }

    /// Create a client on top of an existing HTTP transport.
    pub fn with_http_client(http: HttpClient, token: impl AsRef<str>) -> Result<Self, MonoError> {
        let token = token_header(token.as_ref())?;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let last = initial_last_request(clock.as_ref());
        Ok(Self {
            token,
            http,
            base_url: BASE_URL.to_string(),
            clock,
            last_statement_request: Arc::new(Mutex::new(last)),
        })
    }

    /// Override the base URL (useful for tests or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        info!("Updated Monobank API base URL to {}", self.base_url);
        self
    }

    /// Replace the HTTP transport with a fresh one using the given request timeout.
    ///
    /// Meant for clients built with [`Client::new`]. A transport passed to
    /// [`Client::with_http_client`] is discarded along with its proxy, TLS and
    /// pool settings; configure the timeout on that transport instead.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, MonoError> {
        self.http = build_http(timeout)?;
        debug!("Rebuilt HTTP transport with timeout {:?}", timeout);
        Ok(self)
    }

    /// Use another time source for the statement rate guard.
    ///
    /// Resets the guard so the first statement request is allowed.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        let last = initial_last_request(clock.as_ref());
        self.last_statement_request = Arc::new(Mutex::new(last));
        self.clock = clock;
        self
    }

    /// Fetch client identity, accounts and jars.
    pub async fn fetch_client_info(&self) -> Result<UserInfo, MonoError> {
        debug!("Fetching client info");
        let body = self.send(self.request(Method::GET, CLIENT_INFO_ENDPOINT)).await?;
        parse_client_info(&body)
    }

    /// Fetch statement items of the default account for the given period.
    pub async fn fetch_statements(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<StatementItem>, MonoError> {
        self.fetch_account_statements(DEFAULT_ACCOUNT, from, to).await
    }

    /// Fetch statement items of `account` for the given period.
    ///
    /// Fails without sending anything when the period is too long or when the
    /// previous successful statement request was at most 60 seconds ago.
    pub async fn fetch_account_statements(
        &self,
        account: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<StatementItem>, MonoError> {
        // Only the upper bound is checked; the API answers reversed periods itself.
        check_range(from, to)?;

        // Held across the request so concurrent callers cannot both pass the guard.
        let mut last = self.last_statement_request.lock().await;
        check_interval(*last, self.clock.now())?;

        let path = format!(
            "{}/{}/{}/{}",
            STATEMENT_ENDPOINT,
            account,
            from.timestamp(),
            to.timestamp()
        );
        debug!(
            "Fetching statements for account {} from {} to {}",
            account, from, to
        );
        let body = self.send(self.request(Method::GET, &path)).await?;
        let items = parse_statements(&body)?;

        *last = (*last).max(self.clock.now());
        Ok(items)
    }

    /// Register a webhook URL. Returns whether the API accepted it.
    ///
    /// Failures are not reported beyond `false`; use [`Client::try_set_webhook`]
    /// to get the reason.
    pub async fn set_webhook(&self, url: &str) -> bool {
        info!("Registering webhook {}", url);
        match self.webhook_request(url).send().await {
            Ok(response) => {
                let status = response.status();
                debug!("Received status {}", status);
                status.is_success()
            }
            Err(err) => {
                warn!("Webhook registration failed: {}", err);
                false
            }
        }
    }

    /// Register a webhook URL, reporting why the API rejected it.
    pub async fn try_set_webhook(&self, url: &str) -> Result<(), MonoError> {
        info!("Registering webhook {}", url);
        self.send(self.webhook_request(url)).await?;
        Ok(())
    }

    /// Parse client info from a JSON string returned by the API.
    pub fn parse_client_info(&self, data: &str) -> Result<UserInfo, MonoError> {
        parse_client_info(data)
    }

    /// Parse statement items from a JSON string returned by the API.
    pub fn parse_statements(&self, data: &str) -> Result<Vec<StatementItem>, MonoError> {
        parse_statements(data)
    }

    /// Parse an error payload returned with a non-success status.
    pub fn parse_error(&self, data: &str) -> Result<ApiErrorBody, MonoError> {
        parse_error(data)
    }

    fn webhook_request(&self, url: &str) -> RequestBuilder {
        self.request(Method::POST, WEBHOOK_ENDPOINT)
            .json(&WebhookRequest { web_hook_url: url })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        debug!("{} request to {}", method, url);
        self.http
            .request(method, url)
            .header(TOKEN_HEADER, self.token.clone())
    }

    async fn send(&self, request: RequestBuilder) -> Result<String, MonoError> {
        let response = request.send().await?;
        let status = response.status();
        debug!("Received status {}", status);
        let body = response.text().await?;
        if status.is_success() {
            return Ok(body);
        }
        let error = parse_error(&body)?;
        warn!("API rejected request ({}): {}", status, error.description);
        Err(MonoError::Api {
            status,
            description: error.description,
        })
    }
}

fn build_http(timeout: Duration) -> Result<HttpClient, MonoError> {
    Ok(HttpClient::builder().timeout(timeout).build()?)
}

fn token_header(token: &str) -> Result<HeaderValue, MonoError> {
    if token.is_empty() {
        return Err(MonoError::InvalidToken("token must not be empty"));
    }
    let mut value = HeaderValue::from_str(token)
        .map_err(|_| MonoError::InvalidToken("token is not a valid header value"))?;
    value.set_sensitive(true);
    Ok(value)
}

fn initial_last_request(clock: &dyn Clock) -> DateTime<Utc> {
    clock.now() - TimeDelta::seconds(INITIAL_BACKDATE_SECS)
}

fn check_range(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<(), MonoError> {
    let span = to.timestamp() - from.timestamp();
    if span >= MAX_STATEMENT_RANGE_SECS {
        return Err(MonoError::InvalidDateRange { from, to });
    }
    Ok(())
}

fn check_interval(last: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), MonoError> {
    let min_interval = TimeDelta::seconds(MIN_STATEMENT_INTERVAL_SECS);
    let elapsed = now - last;
    if elapsed <= min_interval {
        let retry_after = (min_interval - elapsed).to_std().unwrap_or_default();
        debug!("Statement request refused, retry in {:?}", retry_after);
        return Err(MonoError::RateLimited { retry_after });
    }
    Ok(())
}
