//! HTTP client for the transactional Cypher endpoint

use crate::config::RemoteConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Failures talking to the remote database
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Cypher error {code}: {message}")]
    Cypher { code: String, message: String },
}

pub type RemoteResult<T> = Result<T, RemoteError>;

#[derive(Debug, Serialize)]
struct Statement<'a> {
    statement: &'a str,
    parameters: &'a Value,
}

#[derive(Debug, Serialize)]
struct CommitRequest<'a> {
    statements: Vec<Statement<'a>>,
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
    #[serde(default)]
    results: Vec<StatementResult>,
    #[serde(default)]
    errors: Vec<ServerError>,
}

#[derive(Debug, Deserialize)]
struct StatementResult {
    #[serde(default)]
    data: Vec<ResultRow>,
}

#[derive(Debug, Deserialize)]
struct ResultRow {
    #[serde(default)]
    row: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct ServerError {
    code: String,
    message: String,
}

/// Sends single Cypher statements to `{uri}/db/{database}/tx/commit`.
///
/// Every call is its own auto-committed transaction, bounded by the
/// configured timeout.
pub struct CypherClient {
    http_client: Client,
    commit_url: String,
    username: String,
    password: String,
}

impl CypherClient {
    pub fn new(config: &RemoteConfig) -> RemoteResult<Self> {
        let http_client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            http_client,
            commit_url: config.commit_url(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    pub fn commit_url(&self) -> &str {
        &self.commit_url
    }

    /// Run one statement and return its result rows
    pub async fn run(&self, statement: &str, parameters: Value) -> RemoteResult<Vec<Vec<Value>>> {
        debug!("Cypher: {} {}", statement, parameters);
        let body = CommitRequest {
            statements: vec![Statement {
                statement,
                parameters: &parameters,
            }],
        };

        let response = self
            .http_client
            .post(&self.commit_url)
            .basic_auth(&self.username, Some(&self.password))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let result: CommitResponse = response.json().await?;
        if let Some(error) = result.errors.into_iter().next() {
            return Err(RemoteError::Cypher {
                code: error.code,
                message: error.message,
            });
        }

        Ok(result
            .results
            .into_iter()
            .next()
            .map(|r| r.data.into_iter().map(|d| d.row).collect())
            .unwrap_or_default())
    }
}
