//! reqwest-backed transport.

use reqwest::header::CONTENT_LENGTH;
use reqwest::Client;
use url::Url;

use super::{ApiRequest, ApiResponse, Transport, TransportError};
use crate::config::ServiceConfig;
use crate::error::{Error, Result};

/// HTTP client bound to one service host.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: Url,
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url())
            .map_err(|error| Error::Config(format!("invalid service URL: {error}")))?;
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(TransportError::from)?;
        Ok(Self { base_url, client })
    }

    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn build_url(&self, request: &ApiRequest) -> std::result::Result<Url, TransportError> {
        let mut url = self
            .base_url
            .join(&request.path)
            .map_err(|error| TransportError::InvalidUrl(format!("{}: {error}", request.path)))?;
        if let Some(segment) = request.segment.as_deref() {
            // `push` drops dot segments instead of encoding them.
            if segment.is_empty() || segment == "." || segment == ".." {
                return Err(TransportError::InvalidUrl(format!(
                    "{}: unusable key {segment:?}",
                    request.path
                )));
            }
            url.path_segments_mut()
                .map_err(|()| TransportError::InvalidUrl(request.path.clone()))?
                .pop_if_empty()
                .push(segment);
        }
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }
        Ok(url)
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> std::result::Result<ApiResponse, TransportError> {
        let url = self.build_url(&request)?;
        let builder = self.client.request(request.method, url);
        let builder = match request.body {
            Some(body) => builder.body(body),
            None => builder.header(CONTENT_LENGTH, 0),
        };

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.text().await.map_err(map_reqwest_error)?;

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}

fn map_reqwest_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::TimedOut
    } else {
        TransportError::Request(error)
    }
}
