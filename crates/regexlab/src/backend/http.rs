//! HTTP client for the remote regex service.

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::wire::{
    ErrorResponse, EvaluateResponse, PairRequest, ShareResponse, ValidateRequest,
    ValidateResponse,
};
use super::{BackendType, RegexService};
use crate::config::ServiceConfig;
use crate::error::{LabError, Operation, Result};
use crate::types::{MatchSet, RegexPair, ShareId, ShareRecord};

/// User agent string for API requests.
const USER_AGENT_VALUE: &str = concat!("regexlab/", env!("CARGO_PKG_VERSION"));

/// Client for the regex service's JSON API.
#[derive(Debug, Clone)]
pub struct HttpService {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpService {
    /// Create a client from service settings.
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let base = config.base_url.trim_end_matches('/');
        let base_url = Url::parse(base)
            .map_err(|e| LabError::config(format!("invalid service URL '{base}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(LabError::config(format!(
                "service URL '{base}' cannot carry a path"
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| LabError::config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    /// Get the API base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// URL of `{base}/regex/{segment}`, with `segment` encoded as a single
    /// path segment.
    fn url(&self, segment: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["regex", segment]);
        }
        url
    }

    async fn post<B, R>(&self, operation: Operation, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = self.url(path);
        debug!(%operation, %url, "sending request");

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| LabError::transport(operation, e.to_string()))?;
        Self::handle_response(operation, response).await
    }

    /// Checks the status and decodes the JSON body.
    async fn handle_response<R: DeserializeOwned>(
        operation: Operation,
        response: reqwest::Response,
    ) -> Result<R> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LabError::transport(operation, e.to_string()))?;

        if status == StatusCode::NOT_FOUND && operation == Operation::Resolve {
            return Err(LabError::not_found(""));
        }

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map_or(body, |e| e.error);
            return Err(LabError::transport(
                operation,
                format!("service returned {status}: {message}"),
            ));
        }

        serde_json::from_str(&body).map_err(|e| LabError::malformed(operation, e.to_string()))
    }
}

impl RegexService for HttpService {
    async fn validate(&self, pattern: &str) -> Result<bool> {
        let response: ValidateResponse = self
            .post(Operation::Validate, "validate", &ValidateRequest { pattern })
            .await?;
        Ok(response.is_valid)
    }

    async fn evaluate(&self, pattern: &str, test_string: &str) -> Result<MatchSet> {
        let body = PairRequest {
            pattern,
            test_string,
        };
        let response: EvaluateResponse = self.post(Operation::Evaluate, "test", &body).await?;
        Ok(response.into_matches())
    }

    async fn share(&self, pair: &RegexPair) -> Result<ShareId> {
        let body = PairRequest {
            pattern: &pair.pattern,
            test_string: &pair.test_string,
        };
        let response: ShareResponse = self.post(Operation::Share, "share", &body).await?;
        if !response.share_id.is_fragment_safe() {
            return Err(LabError::malformed(
                Operation::Share,
                format!("share id '{}' cannot be used in a link", response.share_id),
            ));
        }
        Ok(response.share_id)
    }

    async fn resolve(&self, id: &ShareId) -> Result<ShareRecord> {
        // The service never issues such ids.
        if !id.is_fragment_safe() {
            return Err(LabError::not_found(id.as_str()));
        }

        let url = self.url(id.as_str());
        debug!(operation = %Operation::Resolve, %url, "sending request");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| LabError::transport(Operation::Resolve, e.to_string()))?;
        Self::handle_response(Operation::Resolve, response)
            .await
            .map_err(|e| match e {
                LabError::NotFound { .. } => LabError::not_found(id.as_str()),
                other => other,
            })
    }

    fn backend_type(&self) -> BackendType {
        BackendType::Http
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    use super::*;

    /// Canned answers keyed by request path: `(path, status, body)`.
    type Routes = &'static [(&'static str, u16, &'static str)];

    /// HTTP server on a loopback port answering from a fixed route table.
    struct StubServer {
        base_url: String,
        paths: Arc<Mutex<Vec<String>>>,
    }

    impl StubServer {
        async fn start(routes: Routes) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            let paths = Arc::new(Mutex::new(Vec::new()));
            let seen = Arc::clone(&paths);

            tokio::spawn(async move {
                while let Ok((socket, _)) = listener.accept().await {
                    let seen = Arc::clone(&seen);
                    tokio::spawn(answer(socket, routes, seen));
                }
            });

            Self {
                base_url: format!("http://{addr}/api"),
                paths,
            }
        }

        fn service(&self) -> HttpService {
            let config = ServiceConfig::new(self.base_url.as_str())
                .timeout(std::time::Duration::from_secs(5));
            let mut service = HttpService::new(&config).unwrap();
            // Loopback traffic must not go through an ambient proxy.
            service.client = reqwest::Client::builder()
                .timeout(config.request_timeout())
                .no_proxy()
                .build()
                .unwrap();
            service
        }

        fn paths(&self) -> Vec<String> {
            self.paths.lock().unwrap().clone()
        }
    }

    async fn answer(mut socket: TcpStream, routes: Routes, seen: Arc<Mutex<Vec<String>>>) {
        let head = read_request(&mut socket).await;
        let path = head.split_whitespace().nth(1).unwrap_or_default().to_string();
        seen.lock().unwrap().push(path.clone());

        let (status, body) = routes
            .iter()
            .find(|(route, _, _)| *route == path)
            .map_or((404, r#"{"error":"no such route"}"#), |(_, status, body)| {
                (*status, *body)
            });
        let reason = match status {
            200 => "OK",
            404 => "Not Found",
            500 => "Internal Server Error",
            _ => "Unknown",
        };
        let response = format!(
            "HTTP/1.1 {status} {reason}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
    }

    /// Read one request, body included, and return its head.
    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                return String::from_utf8_lossy(&buf).into_owned();
            }
            buf.extend_from_slice(&chunk[..n]);

            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).into_owned();
                let body_len = head
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + body_len {
                    return head;
                }
            }
        }
    }

    #[test]
    fn client_creation() {
        let service = HttpService::new(&ServiceConfig::default());
        assert!(service.is_ok());
    }

    #[test]
    fn unparseable_base_url_is_config_error() {
        let err = HttpService::new(&ServiceConfig::new("not a url")).unwrap_err();
        assert!(matches!(err, LabError::Config { .. }));
    }

    #[test]
    fn urls_are_relative_to_base() {
        let service = HttpService::new(&ServiceConfig::new("http://localhost:8080/api/")).unwrap();
        assert_eq!(service.base_url(), "http://localhost:8080/api");
        assert_eq!(
            service.url("validate").as_str(),
            "http://localhost:8080/api/regex/validate"
        );
        assert_eq!(
            service.url("1a2b3c4d").as_str(),
            "http://localhost:8080/api/regex/1a2b3c4d"
        );
    }

    #[test]
    fn url_segment_is_encoded() {
        let service = HttpService::new(&ServiceConfig::new("http://localhost:8080/api")).unwrap();
        assert_eq!(
            service.url("abc#junk").as_str(),
            "http://localhost:8080/api/regex/abc%23junk"
        );
        assert_eq!(
            service.url("a/b").as_str(),
            "http://localhost:8080/api/regex/a%2Fb"
        );
        assert_eq!(
            service.url("a?b").as_str(),
            "http://localhost:8080/api/regex/a%3Fb"
        );
    }

    #[tokio::test]
    async fn unreachable_service_is_transport_error() {
        let config = ServiceConfig::new("http://127.0.0.1:1/api")
            .timeout(std::time::Duration::from_millis(500));
        let service = HttpService::new(&config).unwrap();

        let err = service.validate("a").await.unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn resolve_returns_record() {
        let server = StubServer::start(&[(
            "/api/regex/abc",
            200,
            r#"{"pattern":"secret","testString":"s"}"#,
        )])
        .await;

        let record = server.service().resolve(&ShareId::new("abc")).await.unwrap();
        assert_eq!(record, RegexPair::new("secret", "s"));
        assert_eq!(server.paths(), vec!["/api/regex/abc"]);
    }

    #[tokio::test]
    async fn resolve_404_is_not_found() {
        let server = StubServer::start(&[]).await;

        let err = server
            .service()
            .resolve(&ShareId::new("deadbeef"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(matches!(err, LabError::NotFound { ref share_id } if share_id == "deadbeef"));
        assert_eq!(server.paths(), vec!["/api/regex/deadbeef"]);
    }

    #[tokio::test]
    async fn ids_outside_the_link_alphabet_never_reach_other_records() {
        let server = StubServer::start(&[(
            "/api/regex/abc",
            200,
            r#"{"pattern":"secret","testString":"s"}"#,
        )])
        .await;
        let service = server.service();

        for id in ["abc#junk", "zzz/../abc", "abc?x=1", "abc/", "a bc"] {
            let err = service.resolve(&ShareId::new(id)).await.unwrap_err();
            assert!(err.is_not_found(), "{id} resolved: {err:?}");
        }
        assert!(server.paths().is_empty());
    }

    #[tokio::test]
    async fn error_status_is_transport_with_service_message() {
        let server =
            StubServer::start(&[("/api/regex/validate", 500, r#"{"error":"boom"}"#)]).await;

        let err = server.service().validate("a").await.unwrap_err();
        assert!(matches!(err, LabError::Transport { operation: Operation::Validate, .. }));
        assert!(err.to_string().contains("boom"), "{err}");
    }

    #[tokio::test]
    async fn not_found_outside_resolve_is_transport() {
        let server = StubServer::start(&[]).await;

        let err = server.service().evaluate("a", "a").await.unwrap_err();
        assert!(matches!(err, LabError::Transport { operation: Operation::Evaluate, .. }));
        assert!(err.to_string().contains("no such route"), "{err}");
    }

    #[tokio::test]
    async fn undecodable_body_is_malformed() {
        let server = StubServer::start(&[("/api/regex/test", 200, "<html>oops</html>")]).await;

        let err = server.service().evaluate("a", "a").await.unwrap_err();
        assert!(matches!(
            err,
            LabError::MalformedResponse { operation: Operation::Evaluate, .. }
        ));
    }

    #[tokio::test]
    async fn null_matches_over_the_wire_are_empty() {
        let server = StubServer::start(&[("/api/regex/test", 200, r#"{"matches":null}"#)]).await;

        let matches = server.service().evaluate("z", "abc").await.unwrap();
        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn share_returns_issued_id() {
        let server =
            StubServer::start(&[("/api/regex/share", 200, r#"{"shareId":"1a2b3c4d"}"#)]).await;

        let id = server
            .service()
            .share(&RegexPair::new("a", "b"))
            .await
            .unwrap();
        assert_eq!(id.as_str(), "1a2b3c4d");
    }

    #[tokio::test]
    async fn share_id_outside_the_link_alphabet_is_malformed() {
        let server =
            StubServer::start(&[("/api/regex/share", 200, r##"{"shareId":"abc#junk"}"##)]).await;

        let err = server
            .service()
            .share(&RegexPair::new("a", "b"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LabError::MalformedResponse { operation: Operation::Share, .. }
        ));
    }
}
