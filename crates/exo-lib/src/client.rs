//! HTTP client for the analysis backend.

use crate::config::ClientConfig;
use crate::error::{AnalysisError, RemoteError};
use crate::multipart::MultipartBody;
use crate::result::AnalysisResult;
use crate::selection::SelectedFileSet;
use serde::Deserialize;
use std::io::Read;

const MAX_RESPONSE_BYTES: usize = 64 * 1024 * 1024;
const UPLOAD_MEDIA_TYPE: &str = "text/csv";

/// Anything that can turn a file selection into an analysis result. The HTTP
/// client is the production implementation; tests substitute in-memory ones.
pub trait AnalysisBackend: Send + Sync {
    fn analyze(&self, files: &SelectedFileSet) -> Result<AnalysisResult, AnalysisError>;
}

pub struct UploadClient {
    agent: ureq::Agent,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

impl UploadClient {
    pub fn new(config: &ClientConfig) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(config.timeout()).build();
        Self {
            agent,
            endpoint: config.endpoint(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Upload every populated slot in one POST. Issues no request at all when
    /// the selection is empty.
    pub fn submit(&self, files: &SelectedFileSet) -> Result<AnalysisResult, AnalysisError> {
        files.ensure_ready()?;

        let mut body = MultipartBody::new();
        for (slot, file) in files.populated() {
            body.add_file(slot.field_name(), &file.name, UPLOAD_MEDIA_TYPE, &file.bytes);
        }
        let content_type = body.content_type();
        let payload = body.finish();

        log::info!(
            "uploading {} dataset(s) ({} bytes) to {}",
            files.len(),
            payload.len(),
            self.endpoint
        );

        let response = match self
            .agent
            .post(&self.endpoint)
            .set("Content-Type", &content_type)
            .set("Accept", "application/json")
            .send_bytes(&payload)
        {
            Ok(response) => response,
            Err(ureq::Error::Status(code, response)) => {
                let body = read_body_limited(response).unwrap_or_default();
                let err = status_error(code, &body);
                log::warn!("analysis backend returned HTTP {code}: {err}");
                return Err(err.into());
            }
            Err(ureq::Error::Transport(err)) => {
                log::warn!("analysis request failed: {err}");
                return Err(RemoteError::Transport(err.to_string()).into());
            }
        };

        let status = response.status();
        let body = read_body_limited(response).map_err(RemoteError::MalformedResponse)?;
        let result = AnalysisResult::from_json(&body)
            .map_err(|err| RemoteError::MalformedResponse(err.to_string()))?;
        log::info!(
            "analysis backend answered HTTP {status} (status={})",
            result.status.as_deref().unwrap_or("<none>")
        );
        Ok(result)
    }
}

impl AnalysisBackend for UploadClient {
    fn analyze(&self, files: &SelectedFileSet) -> Result<AnalysisResult, AnalysisError> {
        self.submit(files)
    }
}

/// Prefer the backend's `error` field; fall back to a status-derived message
/// when the body is absent, not JSON, or lacks the field.
pub fn status_error(code: u16, body: &[u8]) -> RemoteError {
    let message = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error)
        .filter(|message| !message.trim().is_empty());
    match message {
        Some(message) => RemoteError::Status { code, message },
        None => RemoteError::status_fallback(code),
    }
}

fn read_body_limited(response: ureq::Response) -> Result<Vec<u8>, String> {
    let mut limited = response.into_reader().take(MAX_RESPONSE_BYTES as u64 + 1);
    let mut bytes = Vec::new();
    limited
        .read_to_end(&mut bytes)
        .map_err(|err| err.to_string())?;
    if bytes.len() > MAX_RESPONSE_BYTES {
        return Err(format!("response exceeded {MAX_RESPONSE_BYTES} bytes"));
    }
    Ok(bytes)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::selection::{MissionSlot, SelectedFile};
    use crossbeam_channel::{bounded, Receiver};
    use std::io::Write;
    use std::net::{TcpListener, TcpStream};
    use std::thread;

    /// Serve one canned HTTP response on a loopback port and hand back the raw
    /// request that was received.
    pub(crate) fn serve_once(response: String) -> (String, Receiver<Vec<u8>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = bounded(1);
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let request = read_request(&mut stream);
                let _ = stream.write_all(response.as_bytes());
                let _ = tx.send(request);
            }
        });
        (format!("http://{addr}"), rx)
    }

    fn read_request(stream: &mut TcpStream) -> Vec<u8> {
        let mut data = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let read = stream.read(&mut buf).unwrap_or(0);
            if read == 0 {
                break;
            }
            data.extend_from_slice(&buf[..read]);
            if let Some(header_end) = find(&data, b"\r\n\r\n") {
                let headers = String::from_utf8_lossy(&data[..header_end]).to_ascii_lowercase();
                let length = headers
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|value| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if data.len() >= header_end + 4 + length {
                    break;
                }
            }
        }
        data
    }

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack
            .windows(needle.len())
            .position(|window| window == needle)
    }

    pub(crate) fn http_response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    fn client_for(base_url: String) -> UploadClient {
        UploadClient::new(&ClientConfig {
            base_url,
            ..ClientConfig::default()
        })
    }

    fn koi_selection() -> SelectedFileSet {
        let mut files = SelectedFileSet::new();
        files
            .select_file(
                MissionSlot::Koi,
                SelectedFile::new("koi_data.csv", b"kepid,koi_score\n1,0.9\n".to_vec()),
            )
            .unwrap();
        files
    }

    #[test]
    fn empty_selection_never_touches_network() {
        // Nothing listens here; a request would surface as a transport error.
        let client = client_for("http://127.0.0.1:9".into());
        let err = client.submit(&SelectedFileSet::new()).unwrap_err();
        assert_eq!(err, AnalysisError::Validation(ValidationError::NoFilesSelected));
    }

    #[test]
    fn success_parses_result_and_posts_multipart() {
        let body = r#"{"status":"Success","meta_model_evaluation":{"auc":0.91,"precision":0.88,"recall":0.84},"cm_image":"aGVsbG8=","shap_image":"d29ybGQ="}"#;
        let (url, requests) = serve_once(http_response("200 OK", body));
        let mut files = koi_selection();
        files
            .select_file(MissionSlot::K2, SelectedFile::new("k2.csv", b"x\n".to_vec()))
            .unwrap();

        let result = client_for(url).submit(&files).unwrap();
        assert_eq!(result.status.as_deref(), Some("Success"));
        assert_eq!(result.meta_model_evaluation.unwrap().auc, Some(0.91));

        let request = String::from_utf8(requests.recv().unwrap()).unwrap();
        assert!(request.starts_with("POST /upload_and_analyze "));
        assert!(request.contains("multipart/form-data; boundary="));
        assert!(request.contains("name=\"koi_file\"; filename=\"koi_data.csv\""));
        assert!(request.contains("name=\"k2_file\"; filename=\"k2.csv\""));
        assert!(!request.contains("toi_file"));
    }

    #[test]
    fn server_error_uses_backend_message() {
        let (url, _requests) = serve_once(http_response(
            "500 Internal Server Error",
            r#"{"error":"model training failed"}"#,
        ));
        let err = client_for(url).submit(&koi_selection()).unwrap_err();
        assert_eq!(err.to_string(), "model training failed");
    }

    #[test]
    fn server_error_with_garbage_body_falls_back_to_status() {
        let (url, _requests) =
            serve_once(http_response("500 Internal Server Error", "<html>boom</html>"));
        let err = client_for(url).submit(&koi_selection()).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::Remote(RemoteError::Status {
                code: 500,
                message: "Request failed with status code 500".into()
            })
        );
    }

    #[test]
    fn malformed_success_body_is_remote_error() {
        let (url, _requests) = serve_once(http_response("200 OK", "not json"));
        let err = client_for(url).submit(&koi_selection()).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Remote(RemoteError::MalformedResponse(_))
        ));
    }

    #[test]
    fn wrong_typed_metric_still_succeeds() {
        let body = r#"{"status":"Success","meta_model_evaluation":{"auc":"N/A","precision":0.88,"recall":0.84},"cm_image":"aGVsbG8=","shap_image":"d29ybGQ="}"#;
        let (url, _requests) = serve_once(http_response("200 OK", body));
        let result = client_for(url).submit(&koi_selection()).unwrap();
        let eval = result.meta_model_evaluation.unwrap();
        assert_eq!(eval.auc, None);
        assert_eq!(eval.precision, Some(0.88));
        assert_eq!(result.cm_image.as_deref(), Some("aGVsbG8="));
    }

    #[test]
    fn transport_failure_is_reported() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let err = client_for(format!("http://{addr}"))
            .submit(&koi_selection())
            .unwrap_err();
        match err {
            AnalysisError::Remote(RemoteError::Transport(message)) => assert!(!message.is_empty()),
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[test]
    fn status_error_ignores_blank_error_field() {
        assert_eq!(
            status_error(404, br#"{"error":"  "}"#),
            RemoteError::status_fallback(404)
        );
        assert_eq!(status_error(503, b""), RemoteError::status_fallback(503));
    }
}
