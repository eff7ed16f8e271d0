use std::time::Duration;

use async_trait::async_trait;

use crate::error::DeployError;
use crate::model::DeploymentSpec;

const APP_DEPLOYMENTS_PATH: &str = "/api/appdeployments";
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Submits deployments to the backend.
#[async_trait]
pub trait DeploymentClient: Send + Sync {
    /// Saves `spec` and resolves with the record the server stored.
    async fn save(&self, spec: &DeploymentSpec) -> Result<DeploymentSpec, DeployError>;
}

pub struct HttpDeploymentClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpDeploymentClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, DeployError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            APP_DEPLOYMENTS_PATH
        )
    }
}

#[async_trait]
impl DeploymentClient for HttpDeploymentClient {
    async fn save(&self, spec: &DeploymentSpec) -> Result<DeploymentSpec, DeployError> {
        let url = self.endpoint();
        tracing::debug!(%url, name = %spec.name, "Posting deployment");

        let response = self.http.post(&url).json(spec).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DeployError::Rejected {
                status: status.as_u16(),
                message: message.trim().to_string(),
            });
        }

        // An accepted deployment without an echoed record keeps what was sent
        let body = response.bytes().await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            tracing::debug!(%status, "Deployment accepted without a response body");
            return Ok(spec.clone());
        }

        Ok(serde_json::from_slice::<DeploymentSpec>(&body)?)
    }
}
