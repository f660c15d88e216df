//! REST client store.
//!
//! Talks to the survey API:
//!
//! - `POST {base}/responses/`      create
//! - `GET  {base}/responses/`      list
//! - `GET  {base}/responses/{id}/` detail
//!
//! Failures are reported as [`SurveyError::Transport`] with the server's
//! message kept verbatim. Nothing is retried: a retried POST could store the
//! same submission twice.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use tracing::{error, info};

use super::ResponseStore;
use crate::error::{Result, SurveyError};
use crate::response::SurveyResponse;
use crate::submission::ValidResponse;

/// HTTP store configuration
#[derive(Debug, Clone)]
pub struct HttpStoreConfig {
    /// API root, e.g. `http://localhost:8000/api`
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for HttpStoreConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Store backed by the survey REST API
pub struct HttpStore {
    client: Client,
    config: HttpStoreConfig,
}

impl HttpStore {
    pub fn new(config: HttpStoreConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SurveyError::transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Collection endpoint
    pub fn responses_url(&self) -> String {
        format!("{}/responses/", self.config.base_url.trim_end_matches('/'))
    }

    /// Detail endpoint
    pub fn response_url(&self, id: u64) -> String {
        format!("{}{}/", self.responses_url(), id)
    }

    fn check(response: Response, id: Option<u64>) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::NOT_FOUND {
            if let Some(id) = id {
                return Err(SurveyError::NotFound(id));
            }
        }

        let body = response.text().unwrap_or_default();
        error!(%status, %body, "Survey API request failed");
        Err(SurveyError::transport(format!(
            "Server responded {}: {}",
            status, body
        )))
    }
}

impl ResponseStore for HttpStore {
    fn create(&mut self, response: ValidResponse) -> Result<SurveyResponse> {
        let payload = response.to_payload();
        let url = self.responses_url();
        info!(%url, index_number = %payload.index_number, "Submitting response");

        let reply = self.client.post(&url).json(&payload).send()?;
        let stored = Self::check(reply, None)?.json::<SurveyResponse>()?;
        Ok(stored)
    }

    fn list(&self) -> Result<Vec<SurveyResponse>> {
        let reply = self.client.get(self.responses_url()).send()?;
        let responses = Self::check(reply, None)?.json::<Vec<SurveyResponse>>()?;
        Ok(responses)
    }

    fn get(&self, id: u64) -> Result<SurveyResponse> {
        let reply = self.client.get(self.response_url(id)).send()?;
        let response = Self::check(reply, Some(id))?.json::<SurveyResponse>()?;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    use crate::catalog::Catalog;
    use crate::response::{NewResponse, Selections};
    use crate::submission::{AdmissionPolicy, admit};

    /// Serve exactly one request with a canned reply. The handle yields the
    /// request line the server saw.
    fn serve_once(status: &str, body: &str) -> (HttpStore, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let reply = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );

        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);

            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            let mut content_length = 0;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if line == "\r\n" || line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap();
                    }
                }
            }
            let mut request_body = vec![0; content_length];
            reader.read_exact(&mut request_body).unwrap();

            let mut stream = reader.into_inner();
            stream.write_all(reply.as_bytes()).unwrap();
            stream.flush().unwrap();
            request_line.trim_end().to_string()
        });

        let store = HttpStore::new(HttpStoreConfig {
            base_url: format!("http://{}/api", addr),
            timeout: Duration::from_secs(5),
        })
        .unwrap();
        (store, handle)
    }

    fn valid() -> ValidResponse {
        let payload = NewResponse {
            email: "kojo@st.umat.edu.gh".into(),
            index_number: "MN/0042/22".into(),
            year_of_study: "Year 3".into(),
            phone_number: "0244444444".into(),
            selected_option: Some("Option 3".into()),
            selections: Selections {
                category1_selections: vec!["Drilling Technology & Equipment".into()],
                category2_selections: vec!["Hauling & Transportation Systems".into()],
                software_selections: vec!["Matlab".into(), "Ansys".into()],
                ..Selections::default()
            },
            additional_courses: None,
        };
        admit(&payload, &Catalog::standard(), AdmissionPolicy::default()).unwrap()
    }

    #[test]
    fn test_endpoint_urls() {
        let store = HttpStore::new(HttpStoreConfig {
            base_url: "http://survey.local/api/".into(),
            timeout: Duration::from_secs(1),
        })
        .unwrap();
        assert_eq!(store.responses_url(), "http://survey.local/api/responses/");
        assert_eq!(store.response_url(12), "http://survey.local/api/responses/12/");
    }

    #[test]
    fn test_unreachable_server_is_transport_error() {
        let store = HttpStore::new(HttpStoreConfig {
            // Port 9 (discard) on localhost is closed in test environments
            base_url: "http://127.0.0.1:9/api".into(),
            timeout: Duration::from_millis(500),
        })
        .unwrap();
        assert!(matches!(store.list(), Err(SurveyError::Transport(_))));
    }

    #[test]
    fn test_list_decodes_api_records() {
        let body = r#"[{
            "id": 14,
            "email": "kojo@st.umat.edu.gh",
            "index_number": "MN/0042/22",
            "year_of_study": "Year 3",
            "phone_number": "0244444444",
            "selected_option": "Option 3",
            "category1_selections": ["Drilling Technology & Equipment"],
            "category2_selections": null,
            "software_selections": ["Matlab", "Ansys", "Surpac"],
            "additional_courses": "",
            "submitted_at": "2025-05-20T08:00:00.123456Z",
            "email_sent": true,
            "email_sent_at": "2025-05-20T08:00:03.654321Z"
        }]"#;
        let (store, server) = serve_once("200 OK", body);

        let responses = store.list().unwrap();
        assert_eq!(server.join().unwrap(), "GET /api/responses/ HTTP/1.1");

        assert_eq!(responses.len(), 1);
        let record = &responses[0];
        assert_eq!(record.id, 14);
        assert_eq!(record.selected_option, crate::types::SelectedOption::Option3);
        assert!(record.selections.category(2).unwrap().is_empty());
        assert_eq!(record.selections.software().len(), 3);
        assert_eq!(record.submitted_at.timestamp_subsec_micros(), 123456);
        assert_eq!(record.email_sent, Some(true));
        assert!(record.email_sent_at.is_some());
    }

    #[test]
    fn test_missing_record_is_not_found() {
        let (store, server) = serve_once("404 Not Found", r#"{"detail":"Not found."}"#);

        assert!(matches!(store.get(9), Err(SurveyError::NotFound(9))));
        assert_eq!(server.join().unwrap(), "GET /api/responses/9/ HTTP/1.1");
    }

    #[test]
    fn test_server_rejection_keeps_message() {
        let body = r#"{"email":["Enter a valid email address."]}"#;
        let (mut store, server) = serve_once("400 Bad Request", body);

        let err = store.create(valid()).unwrap_err();
        assert_eq!(server.join().unwrap(), "POST /api/responses/ HTTP/1.1");
        assert!(matches!(err, SurveyError::Transport(_)));
        assert_eq!(
            err.to_string(),
            r#"Transport error: Server responded 400 Bad Request: {"email":["Enter a valid email address."]}"#
        );
    }
}
