use cadence::{AnalysisRequest, AnalyticsProvider, AnalyticsRecord, ProviderError};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::identity::Identity;

/// Successful answer of the analytics service
#[derive(Deserialize)]
struct AnalyticsResponse {
    analytics: AnalyticsRecord,
}

/// Error answer of the analytics service
#[derive(Deserialize)]
struct ErrorResponse {
    detail: String,
}

/// Analytics service reached over HTTP
///
/// `POST {url}/analytics` with the [`AnalysisRequest`] as body.
#[derive(Debug, Clone)]
pub struct RemoteAnalytics {
    url: String,
    timeout_seconds: u64,
    identity: Option<Identity>,
}

impl RemoteAnalytics {
    pub fn new(base_url: &str, timeout_seconds: u64, identity: Option<Identity>) -> Self {
        Self {
            url: format!("{}/analytics", base_url.trim_end_matches('/')),
            timeout_seconds,
            identity,
        }
    }
}

impl AnalyticsProvider for RemoteAnalytics {
    fn analyze(&self, request: &AnalysisRequest) -> Result<AnalyticsRecord, ProviderError> {
        debug!(url = %self.url, "requesting analytics");

        let mut http = minreq::post(&self.url)
            .with_timeout(self.timeout_seconds)
            .with_json(request)
            .map_err(unavailable)?;

        if let Some(identity) = &self.identity {
            http = http.with_header("Authorization", identity.authorization());
        }

        let response = http.send().map_err(unavailable)?;
        let body = response.as_str().map_err(unavailable)?;

        parse_response(response.status_code, body).inspect_err(|error| {
            warn!(%error, status = response.status_code, "analytics service failed");
        })
    }
}

fn unavailable(error: minreq::Error) -> ProviderError {
    ProviderError::Unavailable(error.to_string())
}

/// Interpret an answer of the analytics service
///
/// 2xx with `{"analytics": ...}` is a record, any other status with
/// `{"detail": ...}` is a rejection. Everything else means the service is
/// unavailable.
pub fn parse_response(status: i32, body: &str) -> Result<AnalyticsRecord, ProviderError> {
    if (200..300).contains(&status) {
        return serde_json::from_str::<AnalyticsResponse>(body)
            .map(|response| response.analytics)
            .map_err(|error| ProviderError::Unavailable(format!("malformed response: {error}")));
    }

    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(ErrorResponse { detail }) => Err(ProviderError::Rejected(detail)),
        Err(_) => Err(ProviderError::Unavailable(format!("status {status}"))),
    }
}

#[cfg(test)]
mod tests {
    use cadence::CharError;

    use super::*;

    const RECORD: &str = r#"{
        "wpm": 20,
        "rawWpm": 20,
        "accuracy": 86,
        "correctChars": 6,
        "incorrectChars": 1,
        "totalCharsCompared": 7,
        "timeTakenSeconds": 6.0,
        "consistency": 100,
        "burstWpm": 20,
        "charErrors": [{"position": 4, "expected": "d", "typed": "x"}]
    }"#;

    #[test]
    fn test_parse_success() {
        let body = format!(r#"{{"analytics": {RECORD}}}"#);
        let record = parse_response(200, &body).unwrap();

        assert_eq!(record.wpm, 20);
        assert_eq!(record.accuracy, 86);
        assert_eq!(
            record.char_errors,
            vec![CharError {
                position: 4,
                expected: 'd',
                typed: 'x'
            }]
        );
    }

    #[test]
    fn test_parse_rejection() {
        let result = parse_response(401, r#"{"detail": "Invalid token"}"#);
        assert_eq!(result, Err(ProviderError::Rejected("Invalid token".into())));
    }

    #[test]
    fn test_parse_unavailable() {
        assert!(matches!(
            parse_response(502, "<html>Bad Gateway</html>"),
            Err(ProviderError::Unavailable(_))
        ));
        assert!(matches!(
            parse_response(200, r#"{"analytics": {"wpm": "fast"}}"#),
            Err(ProviderError::Unavailable(_))
        ));
        assert!(matches!(
            parse_response(200, ""),
            Err(ProviderError::Unavailable(_))
        ));
    }

    #[test]
    fn test_endpoint() {
        let remote = RemoteAnalytics::new("https://typing.example/api/", 5, None);
        assert_eq!(remote.url, "https://typing.example/api/analytics");
    }

    #[test]
    fn test_unreachable_service_is_unavailable() {
        // Nothing listens on port 9 on loopback
        let remote = RemoteAnalytics::new("http://127.0.0.1:9", 1, None);
        let request = AnalysisRequest {
            words: vec!["cat".into()],
            input_text: "cat".into(),
            start_timestamp_ms: 0,
            end_timestamp_ms: 1000,
            sample_trace: cadence::InputTrace::new(),
        };

        assert!(matches!(
            remote.analyze(&request),
            Err(ProviderError::Unavailable(_))
        ));
    }
}
