use std::time::Duration;

use common_values_core::{FrequencyRecord, PageRequest};
use engine_logging::engine_debug;
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;

use crate::decode::decode_values_page;
use crate::{FailureKind, FetchError};

pub const DEFAULT_USER_AGENT: &str = concat!("common-values/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
    pub user_agent: String,
    pub allowed_content_types: Vec<String>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 8 * 1024 * 1024,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            allowed_content_types: vec!["application/json".to_string()],
        }
    }
}

/// Source of value-frequency pages, sorted by descending count.
#[async_trait::async_trait]
pub trait StatsSource: Send + Sync {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Vec<FrequencyRecord>, FetchError>;
}

/// Build `{base_url}/values?key=..&sortname=count&sortorder=desc&rp=..&page=..`.
pub fn values_url(base_url: &Url, request: &PageRequest) -> Result<Url, FetchError> {
    let mut url = base_url.clone();
    url.path_segments_mut()
        .map_err(|_| FetchError::new(FailureKind::InvalidUrl, format!("{base_url} cannot be a base")))?
        .pop_if_empty()
        .push("values");
    url.query_pairs_mut()
        .clear()
        .append_pair("key", &request.key)
        .append_pair("sortname", "count")
        .append_pair("sortorder", "desc")
        .append_pair("rp", &request.page_size.to_string())
        .append_pair("page", &request.page.to_string());
    Ok(url)
}

/// HTTP client for the statistics service.
#[derive(Debug, Clone)]
pub struct ReqwestStatsSource {
    base_url: Url,
    settings: FetchSettings,
    client: reqwest::Client,
}

impl ReqwestStatsSource {
    pub fn new(base_url: Url, settings: FetchSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            base_url,
            settings,
            client,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn is_content_type_allowed(&self, content_type: &str) -> bool {
        let ct = content_type.split(';').next().unwrap_or(content_type).trim();
        self.settings
            .allowed_content_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ct))
    }
}

#[async_trait::async_trait]
impl StatsSource for ReqwestStatsSource {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Vec<FrequencyRecord>, FetchError> {
        let url = values_url(&self.base_url, request)?;
        engine_debug!("Opening {}", url);

        let response = self.client.get(url).send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes: self.settings.max_bytes,
                        actual: Some(content_len),
                    },
                    "response too large",
                ));
            }
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());
        if let Some(ct) = content_type.as_deref() {
            if !self.is_content_type_allowed(ct) {
                return Err(FetchError::new(
                    FailureKind::UnsupportedContentType {
                        content_type: ct.to_string(),
                    },
                    "unsupported content type",
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes: self.settings.max_bytes,
                        actual: Some(next_len),
                    },
                    "response too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }

        decode_values_page(&bytes)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return FetchError::new(FailureKind::Decode, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
