//! OAuth2 credentials for the Sheets backend.
//!
//! A JSON file holds the client pair and refresh token; every run
//! exchanges the refresh token for a fresh access token and persists the
//! rotated credentials back. Never inline secrets.

use std::path::Path;

use serde::{Deserialize, Serialize};

use duesheet_recon::StoreError;

pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SheetsCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    #[serde(default)]
    pub access_token: String,
}

pub fn load_credentials(path: &Path) -> Result<SheetsCredentials, StoreError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        StoreError::Auth(format!(
            "cannot read credentials file {}: {}",
            path.display(),
            e,
        ))
    })?;

    // Warn if file is world-readable (Unix only)
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(meta) = std::fs::metadata(path) {
            let mode = meta.permissions().mode();
            if mode & 0o077 != 0 {
                eprintln!(
                    "warning: credentials file {} is accessible by others (mode {:o}), consider chmod 600",
                    path.display(),
                    mode & 0o777,
                );
            }
        }
    }

    serde_json::from_str(&content).map_err(|e| {
        StoreError::Auth(format!(
            "invalid credentials JSON in {}: {}",
            path.display(),
            e,
        ))
    })
}

pub fn save_credentials(creds: &SheetsCredentials, path: &Path) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(creds)
        .map_err(|e| StoreError::Backend(format!("failed to serialize credentials: {}", e)))?;
    std::fs::write(path, json).map_err(|e| {
        StoreError::Backend(format!(
            "failed to write credentials to {}: {}",
            path.display(),
            e,
        ))
    })?;
    Ok(())
}

/// Exchange the refresh token for a fresh access token.
pub fn refresh_access_token(
    creds: &SheetsCredentials,
    http: &reqwest::blocking::Client,
    token_url: &str,
) -> Result<SheetsCredentials, StoreError> {
    let resp = http
        .post(token_url)
        .form(&[
            ("grant_type", "refresh_token"),
            ("client_id", creds.client_id.as_str()),
            ("client_secret", creds.client_secret.as_str()),
            ("refresh_token", creds.refresh_token.as_str()),
        ])
        .send()
        .map_err(|e| StoreError::Auth(format!("token refresh request failed: {}", e)))?;

    let status = resp.status().as_u16();
    if status != 200 {
        let body: serde_json::Value = resp.json().unwrap_or(serde_json::Value::Null);
        let msg = body["error_description"]
            .as_str()
            .or_else(|| body["error"].as_str())
            .unwrap_or("unknown error");
        return Err(StoreError::Auth(format!(
            "token refresh failed ({}): {}",
            status, msg,
        )));
    }

    let body: serde_json::Value = resp
        .json()
        .map_err(|e| StoreError::Auth(format!("token refresh response invalid: {}", e)))?;

    let new_access = body["access_token"].as_str().ok_or_else(|| {
        StoreError::Auth("token refresh response missing access_token".to_string())
    })?;

    // Google normally keeps the refresh token stable; take a rotated one
    // if the response carries it.
    let new_refresh = body["refresh_token"]
        .as_str()
        .unwrap_or(&creds.refresh_token);

    Ok(SheetsCredentials {
        client_id: creds.client_id.clone(),
        client_secret: creds.client_secret.clone(),
        refresh_token: new_refresh.to_string(),
        access_token: new_access.to_string(),
    })
}
