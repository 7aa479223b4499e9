use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::config::EnvSource;

const IMDS_ENDPOINT: &str = "http://169.254.169.254/metadata/identity/oauth2/token";

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Token request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Token endpoint returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Bearer tokens from the host's managed identity.
///
/// Hosted runtimes expose `IDENTITY_ENDPOINT` + `IDENTITY_HEADER`; VMs fall
/// back to the instance metadata service.
#[derive(Clone)]
pub struct ManagedIdentity {
    client: Client,
    endpoint: String,
    identity_header: Option<String>,
}

impl ManagedIdentity {
    pub fn from_env(env: &EnvSource) -> Result<Self, IdentityError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(match (env.get("IDENTITY_ENDPOINT"), env.get("IDENTITY_HEADER")) {
            (Some(endpoint), Some(header)) => Self {
                client,
                endpoint,
                identity_header: Some(header),
            },
            _ => Self {
                client,
                endpoint: IMDS_ENDPOINT.to_string(),
                identity_header: None,
            },
        })
    }

    pub async fn token(&self, resource: &str) -> Result<String, IdentityError> {
        debug!("Requesting managed identity token for {}", resource);

        let request = match &self.identity_header {
            Some(header) => self
                .client
                .get(&self.endpoint)
                .query(&[("api-version", "2019-08-01"), ("resource", resource)])
                .header("X-IDENTITY-HEADER", header),
            None => self
                .client
                .get(&self.endpoint)
                .query(&[("api-version", "2018-02-01"), ("resource", resource)])
                .header("Metadata", "true"),
        };

        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(IdentityError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(resp.json::<TokenResponse>().await?.access_token)
    }
}
