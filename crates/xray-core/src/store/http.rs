//! HttpStore - REST client for a remote trace store

use super::traits::TraceStore;
use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::trace::{StepId, Trace, TraceId, TraceStatus, TraceWithSteps};
use crate::wire::{NewStep, NewTrace, StatusUpdate};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Deserialize;
use tracing::{debug, instrument};

#[derive(Deserialize)]
struct Created<T> {
    id: T,
}

/// Trace store reached over HTTP with JSON bodies
#[derive(Clone)]
pub struct HttpStore {
    client: Client,
    config: StoreConfig,
}

impl HttpStore {
    /// Create a new HTTP store client
    pub fn new(config: StoreConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(StoreConfig::from_env())
    }

    /// Get the client configuration
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    async fn send<T: DeserializeOwned>(&self, path: &str, request: RequestBuilder) -> Result<T> {
        let response = request.send().await.map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(format!("{path}: {}", body.trim())));
        }
        if !status.is_success() {
            return Err(Error::Store {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| Error::InvalidResponse(format!("{path}: {e}")))
    }

    fn transport_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::Timeout(self.config.timeout.as_millis() as u64)
        } else if e.is_connect() {
            Error::Network(format!(
                "failed to connect to trace store at {}: {e}",
                self.config.base_url
            ))
        } else {
            Error::Network(e.to_string())
        }
    }
}

#[async_trait::async_trait]
impl TraceStore for HttpStore {
    #[instrument(skip(self, trace), fields(name = %trace.name))]
    async fn create_trace(&self, trace: &NewTrace) -> Result<TraceId> {
        let request = self.client.post(self.config.url("/traces")).json(trace);
        let created: Created<TraceId> = self.send("/traces", request).await?;
        debug!(trace_id = %created.id, "trace created");
        Ok(created.id)
    }

    #[instrument(skip(self))]
    async fn update_trace_status(&self, id: &TraceId, status: &TraceStatus) -> Result<()> {
        let path = format!("/traces/{id}");
        let body = StatusUpdate {
            status: status.clone(),
        };
        let request = self.client.patch(self.config.url(&path)).json(&body);
        let _: IgnoredAny = self.send(&path, request).await?;
        Ok(())
    }

    #[instrument(skip(self, step), fields(trace_id = %step.trace_id, step = %step.step_name))]
    async fn create_step(&self, step: &NewStep) -> Result<StepId> {
        let request = self.client.post(self.config.url("/steps")).json(step);
        let created: Created<StepId> = self.send("/steps", request).await?;
        Ok(created.id)
    }

    #[instrument(skip(self))]
    async fn list_traces(&self) -> Result<Vec<Trace>> {
        let request = self.client.get(self.config.url("/traces"));
        let traces: Option<Vec<Trace>> = self.send("/traces", request).await?;
        Ok(traces.unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn get_trace_detail(&self, id: &TraceId) -> Result<TraceWithSteps> {
        let path = format!("/traces/{id}");
        let request = self.client.get(self.config.url(&path));
        self.send(&path, request).await
    }
}
