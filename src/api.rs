//! HTTP client for the Nextcloud serverinfo endpoint

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use thiserror::Error;

use crate::config::Config;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No hostname given")]
    MissingHost,
    #[error("Http request returned {status} ({reason})")]
    Status { status: u16, reason: String },
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Failed to read response: {0}")]
    ReadError(String),
}

/// A GET request ready to be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

/// What the transport hands back, whatever the status
#[derive(Debug, Clone, Default)]
pub struct Response {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Sends a single request and waits for the whole response
pub trait Transport {
    fn get(&self, request: &Request) -> Result<Response, ApiError>;
}

const USER_AGENT: &str = concat!("check-nextcloud-counters/", env!("CARGO_PKG_VERSION"));

/// Transport backed by a blocking ureq agent
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Option<Duration>) -> Self {
        let mut builder = ureq::AgentBuilder::new().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        UreqTransport {
            agent: builder.build(),
        }
    }
}

impl Transport for UreqTransport {
    fn get(&self, request: &Request) -> Result<Response, ApiError> {
        let mut req = self.agent.get(&request.url);
        for (name, value) in &request.headers {
            req = req.set(name, value);
        }

        // ureq reports 4xx/5xx as errors; the caller decides what a status means
        let resp = match req.call() {
            Ok(resp) => resp,
            Err(ureq::Error::Status(_, resp)) => resp,
            Err(ureq::Error::Transport(t)) => return Err(ApiError::NetworkError(t.to_string())),
        };

        let status = resp.status();
        let status_text = resp.status_text().to_string();
        let headers = resp
            .headers_names()
            .into_iter()
            .filter_map(|name| {
                let value = resp.header(&name)?.to_string();
                Some((name, value))
            })
            .collect();
        let body = resp
            .into_string()
            .map_err(|e| ApiError::ReadError(e.to_string()))?;

        Ok(Response {
            status,
            status_text,
            headers,
            body,
        })
    }
}

/// Build `https://<host><uri>` with the JSON format query appended
pub fn build_url(hostname: &str, uri: &str) -> Result<String, ApiError> {
    let host = hostname.trim().trim_end_matches('/');
    if host.is_empty() {
        return Err(ApiError::MissingHost);
    }
    let path = if uri.starts_with('/') {
        uri.to_string()
    } else {
        format!("/{}", uri)
    };
    let separator = if path.contains('?') { '&' } else { '?' };
    Ok(format!("https://{}{}{}format=json", host, path, separator))
}

fn basic_auth(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", username, password)))
}

/// Build the authenticated request for a config
pub fn build_request(config: &Config) -> Result<Request, ApiError> {
    Ok(Request {
        url: build_url(&config.hostname, &config.uri)?,
        headers: vec![
            (
                "Authorization".to_string(),
                basic_auth(&config.username, &config.password),
            ),
            ("Accept".to_string(), "application/json".to_string()),
            ("OCS-APIRequest".to_string(), "true".to_string()),
        ],
    })
}

/// Standard reason phrase for the codes Nextcloud tends to send
fn canonical_reason(status: u16) -> &'static str {
    match status {
        300 => "Multiple Choices",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        304 => "Not Modified",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        408 => "Request Timeout",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "",
    }
}

/// Fetch the serverinfo document, returning the raw body
pub fn fetch<T: Transport + ?Sized>(config: &Config, transport: &T) -> Result<String, ApiError> {
    let request = build_request(config)?;
    log::debug!("initiating GET request to {}", request.url);

    let response = transport.get(&request)?;
    if response.status > 299 {
        let reason = if response.status_text.trim().is_empty() {
            canonical_reason(response.status).to_string()
        } else {
            response.status_text
        };
        return Err(ApiError::Status {
            status: response.status,
            reason,
        });
    }

    log::debug!("Status {} {}", response.status, response.status_text);
    log::debug!("{:#?}", response.headers);
    log::debug!("{}", response.body);
    Ok(response.body)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Canned(Response);

    impl Transport for Canned {
        fn get(&self, _request: &Request) -> Result<Response, ApiError> {
            Ok(self.0.clone())
        }
    }

    fn config() -> Config {
        Config {
            hostname: "cloud.example.org".to_string(),
            username: "admin".to_string(),
            password: "secret".to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn test_build_url_default_uri() {
        let url = build_url("cloud.example.org", crate::config::DEFAULT_URI).unwrap();
        assert_eq!(
            url,
            "https://cloud.example.org/ocs/v2.php/apps/serverinfo/api/v1/info?format=json"
        );
    }

    #[test]
    fn test_build_url_normalizes_slashes_and_query() {
        assert_eq!(
            build_url("cloud.example.org/", "status").unwrap(),
            "https://cloud.example.org/status?format=json"
        );
        assert_eq!(
            build_url("cloud.example.org", "/info?skipApps=false").unwrap(),
            "https://cloud.example.org/info?skipApps=false&format=json"
        );
    }

    #[test]
    fn test_build_url_requires_host() {
        assert!(matches!(build_url("  ", "/info"), Err(ApiError::MissingHost)));
    }

    #[test]
    fn test_build_request_basic_auth() {
        let request = build_request(&config()).unwrap();
        let auth = request
            .headers
            .iter()
            .find(|(name, _)| name == "Authorization")
            .map(|(_, value)| value.as_str());
        // base64("admin:secret")
        assert_eq!(auth, Some("Basic YWRtaW46c2VjcmV0"));
    }

    #[test]
    fn test_fetch_returns_body() {
        let transport = Canned(Response {
            status: 200,
            status_text: "OK".to_string(),
            headers: vec![],
            body: "{}".to_string(),
        });
        assert_eq!(fetch(&config(), &transport).unwrap(), "{}");
    }

    #[test]
    fn test_fetch_status_error() {
        let transport = Canned(Response {
            status: 401,
            status_text: "Unauthorized".to_string(),
            ..Response::default()
        });
        let err = fetch(&config(), &transport).unwrap_err();
        assert_eq!(err.to_string(), "Http request returned 401 (Unauthorized)");
    }

    #[test]
    fn test_fetch_redirect_is_an_error() {
        let transport = Canned(Response {
            status: 302,
            ..Response::default()
        });
        let err = fetch(&config(), &transport).unwrap_err();
        assert_eq!(err.to_string(), "Http request returned 302 (Found)");
    }
}
