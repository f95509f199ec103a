//! HTTP client for the course site and the playback resolver.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, COOKIE};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::config::OriginConfig;
use crate::metrics::EXTERNAL_REQUESTS;
use crate::registry::Batch;

use super::{
    CompletionEntry, MediaResolver, PageSource, Resolution, TransportError, UnresolvableReason,
};

/// `accept` header sent to the course site.
pub const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Stage one: `GET /video-data?encoded=<token>`
///
/// The site is loose with types here (`success` has been seen as `null`
/// and `0`), so fields are kept as raw JSON and judged by truthiness.
#[derive(Debug, Deserialize)]
struct VideoDataResponse {
    #[serde(default)]
    success: Value,
    #[serde(default)]
    data: Value,
}

impl VideoDataResponse {
    /// The opaque payload for stage two, if the site vouched for it.
    fn payload(self) -> Option<String> {
        if !is_truthy(&self.success) {
            return None;
        }
        non_empty_string(self.data)
    }
}

/// Stage two: `GET <resolver>/?data=<data>`
#[derive(Debug, Deserialize)]
struct StreamResponse {
    #[serde(default)]
    m3u8_url: Value,
}

/// `null`, `false`, zero, and empty strings, arrays or objects are falsy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

fn non_empty_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    }
}

pub struct OriginClient {
    client: Client,
    base_url: String,
    resolver_url: String,
}

impl OriginClient {
    pub fn new(config: &OriginConfig) -> Result<Self, TransportError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            resolver_url: config.resolver_url.trim_end_matches('/').to_string(),
        })
    }

    fn subject_url(&self, batch_id: &str) -> String {
        format!("{}/subjects/{}", self.base_url, batch_id)
    }

    fn video_data_url(&self, token: &str) -> String {
        format!(
            "{}/video-data?encoded={}",
            self.base_url,
            urlencoding::encode(token)
        )
    }

    fn resolver_query_url(&self, data: &str) -> String {
        format!("{}/?data={}", self.resolver_url, urlencoding::encode(data))
    }

    /// Attach the batch session the way the site's own pages do.
    fn with_session(&self, request: RequestBuilder, batch: &Batch) -> RequestBuilder {
        request
            .header(ACCEPT, HTML_ACCEPT)
            .header(COOKIE, format!("session={}", batch.token))
    }

    async fn send(
        &self,
        service: &str,
        request: RequestBuilder,
        url: &str,
    ) -> Result<Response, TransportError> {
        let result = request.send().await.map_err(TransportError::from);
        let result = result.and_then(|response| {
            let status = response.status();
            if status.is_success() {
                Ok(response)
            } else {
                Err(TransportError::Status {
                    status: status.as_u16(),
                    url: url.to_string(),
                })
            }
        });

        let label = if result.is_ok() { "ok" } else { "error" };
        EXTERNAL_REQUESTS.with_label_values(&[service, label]).inc();
        result
    }
}

#[async_trait]
impl PageSource for OriginClient {
    async fn fetch_subject_page(&self, batch: &Batch) -> Result<String, TransportError> {
        let url = self.subject_url(&batch.id);
        debug!(batch_id = %batch.id, "Fetching subject page");

        let request = self.with_session(self.client.get(&url), batch);
        let response = self.send("origin_page", request, &url).await?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl MediaResolver for OriginClient {
    async fn resolve(
        &self,
        batch: &Batch,
        entry: &CompletionEntry,
    ) -> Result<Resolution, TransportError> {
        let url = self.video_data_url(entry.token());
        let request = self.with_session(self.client.get(&url), batch);
        let video_data: VideoDataResponse = self
            .send("origin_video_data", request, &url)
            .await?
            .json()
            .await?;

        let data = match video_data.payload() {
            Some(data) => data,
            None => {
                debug!(media_path = %entry.media_path, "video-data not available");
                return Ok(Resolution::Unresolvable(
                    UnresolvableReason::VideoDataUnavailable,
                ));
            }
        };

        // The resolver is a third party; it gets no session.
        let url = self.resolver_query_url(&data);
        let stream: StreamResponse = self
            .send("resolver", self.client.get(&url), &url)
            .await?
            .json()
            .await?;

        match non_empty_string(stream.m3u8_url) {
            Some(m3u8) => Ok(Resolution::Stream(m3u8)),
            None => {
                debug!(media_path = %entry.media_path, "resolver returned no m3u8_url");
                Ok(Resolution::Unresolvable(UnresolvableReason::NoStreamUrl))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn batch() -> Batch {
        Batch {
            id: "B1".to_string(),
            name: "Batch One".to_string(),
            token: "tok".to_string(),
        }
    }

    fn client_for(origin: &MockServer, resolver: &MockServer) -> OriginClient {
        OriginClient::new(&OriginConfig {
            base_url: origin.uri(),
            resolver_url: resolver.uri(),
            request_timeout_secs: Some(5),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_subject_page_sends_session_cookie() {
        let origin = MockServer::start().await;
        let resolver = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/subjects/B1"))
            .and(header("cookie", "session=tok"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .expect(1)
            .mount(&origin)
            .await;

        let client = client_for(&origin, &resolver);
        let body = client.fetch_subject_page(&batch()).await.unwrap();
        assert_eq!(body, "<html>ok</html>");

        let requests = origin.received_requests().await.unwrap();
        let accept = requests[0].headers.get("accept").unwrap();
        assert_eq!(accept.to_str().unwrap(), HTML_ACCEPT);
    }

    #[tokio::test]
    async fn test_fetch_subject_page_non_2xx_is_transport_error() {
        let origin = MockServer::start().await;
        let resolver = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/subjects/B1"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&origin)
            .await;

        let client = client_for(&origin, &resolver);
        let err = client.fetch_subject_page(&batch()).await.unwrap_err();
        assert!(matches!(err, TransportError::Status { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_unsuccessful_video_data_skips_resolver() {
        let origin = MockServer::start().await;
        let resolver = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/video-data"))
            .and(query_param("encoded", "abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": false
            })))
            .mount(&origin)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&resolver)
            .await;

        let client = client_for(&origin, &resolver);
        let resolution = client
            .resolve(&batch(), &CompletionEntry::new("/media/abc123"))
            .await
            .unwrap();
        assert_eq!(
            resolution,
            Resolution::Unresolvable(UnresolvableReason::VideoDataUnavailable)
        );
    }

    async fn resolve_with_video_data(body: serde_json::Value) -> Resolution {
        let origin = MockServer::start().await;
        let resolver = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/video-data"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&origin)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&resolver)
            .await;

        client_for(&origin, &resolver)
            .resolve(&batch(), &CompletionEntry::new("/media/abc123"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_falsy_success_values_skip_resolver() {
        let unavailable = Resolution::Unresolvable(UnresolvableReason::VideoDataUnavailable);

        for body in [
            serde_json::json!({"success": null}),
            serde_json::json!({"success": 0, "data": "x"}),
            serde_json::json!({"success": "", "data": "x"}),
            serde_json::json!({"data": "x"}),
        ] {
            assert_eq!(resolve_with_video_data(body.clone()).await, unavailable, "{}", body);
        }
    }

    #[tokio::test]
    async fn test_non_string_data_skips_resolver() {
        let unavailable = Resolution::Unresolvable(UnresolvableReason::VideoDataUnavailable);

        for body in [
            serde_json::json!({"success": true, "data": null}),
            serde_json::json!({"success": true, "data": 42}),
            serde_json::json!({"success": 1, "data": ""}),
        ] {
            assert_eq!(resolve_with_video_data(body.clone()).await, unavailable, "{}", body);
        }
    }

    #[tokio::test]
    async fn test_truthy_non_bool_success_reaches_resolver() {
        let origin = MockServer::start().await;
        let resolver = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/video-data"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": 1,
                "data": "X"
            })))
            .mount(&origin)
            .await;
        Mock::given(method("GET"))
            .and(query_param("data", "X"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "m3u8_url": null
            })))
            .expect(1)
            .mount(&resolver)
            .await;

        let resolution = client_for(&origin, &resolver)
            .resolve(&batch(), &CompletionEntry::new("/media/abc123"))
            .await
            .unwrap();
        assert_eq!(
            resolution,
            Resolution::Unresolvable(UnresolvableReason::NoStreamUrl)
        );
    }

    #[test]
    fn test_truthiness() {
        use serde_json::json;
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!([])));
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(-1)));
        assert!(is_truthy(&json!("false")));
        assert!(is_truthy(&json!({"k": 1})));
    }

    #[tokio::test]
    async fn test_missing_m3u8_url_is_unresolvable() {
        let origin = MockServer::start().await;
        let resolver = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/video-data"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "data": "X"
            })))
            .mount(&origin)
            .await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("data", "X"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&resolver)
            .await;

        let client = client_for(&origin, &resolver);
        let resolution = client
            .resolve(&batch(), &CompletionEntry::new("/media/abc123"))
            .await
            .unwrap();
        assert_eq!(
            resolution,
            Resolution::Unresolvable(UnresolvableReason::NoStreamUrl)
        );
    }

    #[tokio::test]
    async fn test_resolves_stream_url_exactly() {
        let origin = MockServer::start().await;
        let resolver = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/video-data"))
            .and(query_param("encoded", "abc123"))
            .and(header("cookie", "session=tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "data": "pay+load/=="
            })))
            .mount(&origin)
            .await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("data", "pay+load/=="))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "m3u8_url": "https://x/y.m3u8"
            })))
            .mount(&resolver)
            .await;

        let client = client_for(&origin, &resolver);
        let resolution = client
            .resolve(&batch(), &CompletionEntry::new("/media/abc123"))
            .await
            .unwrap();
        assert_eq!(resolution, Resolution::Stream("https://x/y.m3u8".to_string()));
    }

    #[tokio::test]
    async fn test_resolver_does_not_receive_session() {
        let origin = MockServer::start().await;
        let resolver = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/video-data"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "data": "d"
            })))
            .mount(&origin)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "m3u8_url": "https://x/y.m3u8"
            })))
            .mount(&resolver)
            .await;

        let client = client_for(&origin, &resolver);
        client
            .resolve(&batch(), &CompletionEntry::new("/media/abc"))
            .await
            .unwrap();

        let requests = resolver.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].headers.get("cookie").is_none());
    }

    #[tokio::test]
    async fn test_malformed_video_data_is_transport_error() {
        let origin = MockServer::start().await;
        let resolver = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/video-data"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
            .mount(&origin)
            .await;

        let client = client_for(&origin, &resolver);
        let result = client
            .resolve(&batch(), &CompletionEntry::new("/media/abc"))
            .await;
        assert!(result.is_err());
    }
}
