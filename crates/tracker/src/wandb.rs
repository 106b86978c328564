// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Weights & Biases tracker adapter, grounded on
//! `training_manager/wandb_monitor.py`'s `get_run_status()` / `get_run_name()`.
//!
//! The Python original goes through the `wandb` SDK's `Api().run(...)`,
//! which itself talks to W&B's GraphQL endpoint authenticated with HTTP
//! Basic auth (API key as username, empty password). This adapter speaks
//! that GraphQL endpoint directly over `reqwest`.

use crate::{RunState, Tracker};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

const GRAPHQL_ENDPOINT: &str = "https://api.wandb.ai/graphql";

#[derive(Debug, Error)]
pub enum WandbError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("graphql error: {0}")]
    GraphQl(String),
    #[error("run not found")]
    NotFound,
}

const RUN_QUERY: &str = r#"
query Run($entity: String!, $project: String!, $runId: String!) {
  project(name: $project, entityName: $entity) {
    run(name: $runId) {
      id
      name
      state
    }
  }
}
"#;

#[derive(Deserialize)]
struct GraphQlEnvelope<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
struct RunQueryData {
    project: Option<RunProject>,
}

#[derive(Deserialize)]
struct RunProject {
    run: Option<RunPayload>,
}

#[derive(Deserialize)]
struct RunPayload {
    name: String,
    state: String,
}

/// Talks to W&B's GraphQL API for run state/name lookups (§4.2).
pub struct WandbTracker {
    client: reqwest::Client,
    api_key: String,
    entity: String,
    project: String,
}

impl WandbTracker {
    pub fn new(api_key: impl Into<String>, entity: impl Into<String>, project: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            api_key: api_key.into(),
            entity: entity.into(),
            project: project.into(),
        }
    }

    async fn fetch_run(&self, run_id: &str) -> Result<RunPayload, WandbError> {
        let body = serde_json::json!({
            "query": RUN_QUERY,
            "variables": {
                "entity": self.entity,
                "project": self.project,
                "runId": run_id,
            },
        });

        let response = self
            .client
            .post(GRAPHQL_ENDPOINT)
            .basic_auth(&self.api_key, Some(""))
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let envelope: GraphQlEnvelope<RunQueryData> = response.json().await?;
        if let Some(errors) = envelope.errors {
            let message = errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(WandbError::GraphQl(message));
        }
        envelope
            .data
            .and_then(|d| d.project)
            .and_then(|p| p.run)
            .ok_or(WandbError::NotFound)
    }
}

fn classify_state(raw: &str) -> RunState {
    match raw.to_ascii_lowercase().as_str() {
        "running" => RunState::Running,
        "finished" => RunState::Finished,
        "crashed" | "failed" | "killed" => RunState::Crashed,
        _ => RunState::Unknown,
    }
}

#[async_trait]
impl Tracker for WandbTracker {
    async fn state_of(&self, run_id: &str) -> RunState {
        match self.fetch_run(run_id).await {
            Ok(payload) => classify_state(&payload.state),
            Err(err) => {
                tracing::warn!(run_id, error = %err, "wandb run state lookup failed");
                RunState::Unknown
            }
        }
    }

    async fn display_name_of(&self, run_id: &str) -> Option<String> {
        match self.fetch_run(run_id).await {
            Ok(payload) => Some(payload.name),
            Err(err) => {
                tracing::warn!(run_id, error = %err, "wandb run name lookup failed");
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "wandb_tests.rs"]
mod tests;
