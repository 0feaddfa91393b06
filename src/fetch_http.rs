use async_trait::async_trait;
use reqwest::StatusCode;

use crate::{fetch::BlobFetcher, AccessUrl, Error};

/// A [`BlobFetcher`] for pre-signed URLs (Azure SAS, S3 presigned), which only need a plain GET.
/// It performs a single attempt: no retries.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Initialize a [`HttpFetcher`] with its own connection pool
    pub fn new() -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Unexpected(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Initialize a [`HttpFetcher`] from an existing client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

/// At most this many bytes of an error response are read
const ERROR_BODY_LIMIT: usize = 4096;

/// Error codes answered with `400 Bad Request` when the signature part of the URL is malformed
/// (S3 presigned URLs) or its authentication is invalid (Azure SAS URLs)
static SIGNATURE_ERROR_CODES: &[&str] = &[
    "AuthorizationQueryParametersError",
    "AuthorizationHeaderMalformed",
    "InvalidAuthenticationInfo",
    "AuthenticationFailed",
    "ExpiredToken",
    "InvalidToken",
];

/// Maps a non-success response into [`Error`].
///
/// Azure answers `403 AuthenticationFailed` for an expired SAS and S3 answers
/// `403 AccessDenied` for an expired presigned URL.
pub(crate) fn status_to_error(status: StatusCode, url: String, body: &str) -> Error {
    let detail = if body.is_empty() {
        status.to_string()
    } else {
        format!("{status}: {}", first_line(body))
    };
    match status {
        StatusCode::NOT_FOUND | StatusCode::GONE => Error::NotFound { url, detail },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Access { url, detail },
        StatusCode::BAD_REQUEST
            if error_code(body).is_some_and(|code| SIGNATURE_ERROR_CODES.contains(&code)) =>
        {
            Error::Access { url, detail }
        }
        StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => {
            Error::Transport { url, detail }
        }
        s if s.is_server_error() => Error::Transport { url, detail },
        _ => Error::Unexpected(format!("Unexpected response from {url}: {detail}")),
    }
}

fn first_line(body: &str) -> &str {
    body.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("")
}

/// The `<Code>` of an XML error body, as answered by both S3 and Azure Blob Storage
fn error_code(body: &str) -> Option<&str> {
    let start = body.find("<Code>")? + "<Code>".len();
    let end = body[start..].find("</Code>")?;
    Some(body[start..start + end].trim())
}

/// Reads the start of a response body, dropping the rest
async fn body_prefix(mut response: reqwest::Response, limit: usize) -> String {
    let mut body = Vec::new();
    while body.len() < limit {
        match response.chunk().await {
            Ok(Some(chunk)) => body.extend_from_slice(&chunk),
            _ => break,
        }
    }
    body.truncate(limit);
    String::from_utf8_lossy(&body).into_owned()
}

fn request_to_error(error: reqwest::Error, url: String) -> Error {
    if error.is_builder() {
        Error::Configuration(format!("Invalid request to {url}: {error}"))
    } else if error.is_connect()
        || error.is_timeout()
        || error.is_request()
        || error.is_body()
        || error.is_decode()
    {
        Error::Transport {
            url,
            detail: error.to_string(),
        }
    } else {
        Error::Unexpected(format!("Request to {url} failed: {error}"))
    }
}

#[async_trait]
impl BlobFetcher for HttpFetcher {
    async fn get(&self, url: &AccessUrl) -> Result<Vec<u8>, Error> {
        // errors from reqwest embed the full url, signature included
        let response = self
            .client
            .get(url.as_url().clone())
            .send()
            .await
            .map_err(|e| request_to_error(e.without_url(), url.redacted()))?;

        let status = response.status();
        if !status.is_success() {
            let body = body_prefix(response, ERROR_BODY_LIMIT).await;
            return Err(status_to_error(status, url.redacted(), &body));
        }

        Ok(response
            .bytes()
            .await
            .map_err(|e| request_to_error(e.without_url(), url.redacted()))?
            .to_vec())
    }
}
