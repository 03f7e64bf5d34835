//! HTTP plumbing for the Sheets API: retry, backoff, error
//! classification. Auth errors and request rejections fail immediately;
//! rate limits and upstream errors retry with exponential backoff.

use std::thread;
use std::time::Duration;

use duesheet_recon::StoreError;

// ── Constants ───────────────────────────────────────────────────────

const MAX_RETRIES: u32 = 3;
const USER_AGENT: &str = concat!("duesheet/", env!("CARGO_PKG_VERSION"));

// ── Client ──────────────────────────────────────────────────────────

pub(crate) struct SheetsClient {
    http: reqwest::blocking::Client,
    base_url: String,
    access_token: String,
}

impl SheetsClient {
    pub(crate) fn new(base_url: String, access_token: String) -> Self {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .expect("failed to build HTTP client");

        Self {
            http,
            base_url,
            access_token,
        }
    }

    pub(crate) fn get(&self, path: &str) -> Result<serde_json::Value, StoreError> {
        let url = format!("{}{}", self.base_url, path);
        self.request_with_retry(|http| http.get(&url))
    }

    pub(crate) fn put_json(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, StoreError> {
        let url = format!("{}{}", self.base_url, path);
        self.request_with_retry(|http| http.put(&url).json(body))
    }

    pub(crate) fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, StoreError> {
        let url = format!("{}{}", self.base_url, path);
        self.request_with_retry(|http| http.post(&url).json(body))
    }

    /// Run one API call with retry + exponential backoff.
    ///
    /// `build_request` is called once per attempt; the bearer token is
    /// attached here so callers only describe the operation.
    fn request_with_retry(
        &self,
        build_request: impl Fn(&reqwest::blocking::Client) -> reqwest::blocking::RequestBuilder,
    ) -> Result<serde_json::Value, StoreError> {
        let mut backoff_secs = 1u64;

        for attempt in 0..=MAX_RETRIES {
            let req = build_request(&self.http).bearer_auth(&self.access_token);

            match req.send() {
                Ok(resp) => {
                    let status = resp.status().as_u16();

                    // Auth errors: fail immediately
                    if status == 401 || status == 403 {
                        let body: serde_json::Value =
                            resp.json().unwrap_or(serde_json::Value::Null);
                        return Err(StoreError::Auth(format!(
                            "Sheets API {}: {}",
                            status,
                            api_error_message(&body),
                        )));
                    }

                    // Other 4xx (not 429): the request itself is bad
                    if status >= 400 && status < 500 && status != 429 {
                        let body: serde_json::Value =
                            resp.json().unwrap_or(serde_json::Value::Null);
                        return Err(StoreError::Backend(format!(
                            "Sheets API {}: {}",
                            status,
                            api_error_message(&body),
                        )));
                    }

                    // Retryable: 429, 5xx
                    if status == 429 || status >= 500 {
                        if attempt == MAX_RETRIES {
                            return Err(StoreError::Unavailable(format!(
                                "Sheets API {} after {} attempts",
                                status, MAX_RETRIES,
                            )));
                        }

                        // Respect Retry-After for 429
                        let wait = if status == 429 {
                            resp.headers()
                                .get("retry-after")
                                .and_then(|v| v.to_str().ok())
                                .and_then(|v| v.parse::<u64>().ok())
                                .unwrap_or(backoff_secs)
                        } else {
                            backoff_secs
                        };

                        eprintln!(
                            "warning: retry {}/{} in {}s (HTTP {})",
                            attempt + 1,
                            MAX_RETRIES,
                            wait,
                            status,
                        );
                        thread::sleep(Duration::from_secs(wait));
                        backoff_secs *= 2;
                        continue;
                    }

                    return resp.json().map_err(|e| {
                        StoreError::Backend(format!("invalid JSON from Sheets API: {}", e))
                    });
                }
                Err(e) => {
                    // Network/timeout errors: retry
                    if attempt == MAX_RETRIES {
                        return Err(StoreError::Unavailable(format!(
                            "Sheets API unreachable after {} attempts: {}",
                            MAX_RETRIES, e,
                        )));
                    }

                    eprintln!(
                        "warning: retry {}/{} in {}s ({})",
                        attempt + 1,
                        MAX_RETRIES,
                        backoff_secs,
                        e,
                    );
                    thread::sleep(Duration::from_secs(backoff_secs));
                    backoff_secs *= 2;
                }
            }
        }

        unreachable!()
    }
}

fn api_error_message(body: &serde_json::Value) -> String {
    body["error"]["message"]
        .as_str()
        .unwrap_or("unknown error")
        .to_string()
}
