//! Client for the external book-availability API.
//!
//! One call asks one library whether one book is currently available to
//! borrow. The provider answers a small XML document: a definitive
//! `loanAvailable` flag on success, or an `error` element when the auth key
//! is rejected or quota-limited. This module owns the wire format and hands
//! the rest of the engine a decoded [`AvailabilityReply`].

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;

use crate::{
    config::AvailabilityConfig,
    error::{AppError, AppResult, ProbeError},
    models::Credential,
};

/// Decoded availability endpoint reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AvailabilityReply {
    /// The provider gave a definitive yes/no for this library and book.
    Definitive(bool),
    /// The provider rejected the auth key (bad key, quota exceeded). The
    /// same probe may be retried with the next key in the pool.
    CredentialRejected { message: String },
}

/// One availability check against the external provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AvailabilityApi: Send + Sync {
    async fn book_exists(
        &self,
        auth_key: &Credential,
        library_code: &str,
        isbn: &str,
    ) -> Result<AvailabilityReply, ProbeError>;
}

/// HTTP implementation of [`AvailabilityApi`].
#[derive(Debug, Clone)]
pub struct BookApiClient {
    http: reqwest::Client,
    endpoint: String,
}

impl BookApiClient {
    /// Build the client. The per-request timeout lives here, on the HTTP
    /// client, so every probe is bounded without the coordinator having to
    /// track deadlines.
    pub fn new(config: &AvailabilityConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl AvailabilityApi for BookApiClient {
    async fn book_exists(
        &self,
        auth_key: &Credential,
        library_code: &str,
        isbn: &str,
    ) -> Result<AvailabilityReply, ProbeError> {
        let url = format!("{}/api/bookExist", self.endpoint);

        let response = self
            .http
            .get(&url)
            .query(&[
                ("authKey", auth_key.reveal()),
                ("libCode", library_code),
                ("isbn13", isbn),
            ])
            .send()
            .await
            .map_err(|source| ProbeError::Transport {
                library_code: library_code.to_string(),
                source,
            })?;

        let body = response
            .text()
            .await
            .map_err(|source| ProbeError::Transport {
                library_code: library_code.to_string(),
                source,
            })?;

        parse_book_exist(&body, library_code)
    }
}

static ERROR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<error>(.*?)</error>").expect("hard-coded pattern"));
static LOAN_AVAILABLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<loanAvailable>(.*?)</loanAvailable>").expect("hard-coded pattern"));

/// Decode a `bookExist` response body.
///
/// An `error` element always wins: it is the provider's auth/quota signal
/// and means no definitive answer was produced. Otherwise `loanAvailable`
/// must be `Y` or `N`; anything else is a parse failure, never a silent
/// "not available".
fn parse_book_exist(body: &str, library_code: &str) -> Result<AvailabilityReply, ProbeError> {
    if let Some(message) = extract(&ERROR_RE, body) {
        return Ok(AvailabilityReply::CredentialRejected { message });
    }

    match extract(&LOAN_AVAILABLE_RE, body).as_deref() {
        Some("Y") => Ok(AvailabilityReply::Definitive(true)),
        Some("N") => Ok(AvailabilityReply::Definitive(false)),
        Some(other) => Err(ProbeError::ResponseParse {
            library_code: library_code.to_string(),
            reason: format!("unexpected loanAvailable value {other:?}"),
        }),
        None => Err(ProbeError::ResponseParse {
            library_code: library_code.to_string(),
            reason: "missing loanAvailable element".to_string(),
        }),
    }
}

/// First capture of `re` in `body`, trimmed and unwrapped from CDATA.
/// Empty elements count as absent.
fn extract(re: &Regex, body: &str) -> Option<String> {
    let raw = re.captures(body)?.get(1)?.as_str().trim();
    let value = raw
        .strip_prefix("<![CDATA[")
        .and_then(|v| v.strip_suffix("]]>"))
        .map(str::trim)
        .unwrap_or(raw);

    (!value.is_empty()).then(|| value.to_string())
}
