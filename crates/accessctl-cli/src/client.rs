//! Shared HTTP plumbing and error types for the CLI.

use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use anyhow::anyhow;
use reqwest::{Client, Response, Url};
use serde::Serialize;

use crate::prompt::Prompter;

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

/// Application context passed to command handlers.
#[derive(Clone)]
pub(crate) struct AppContext {
    pub(crate) client: Client,
    pub(crate) base_url: Url,
    pub(crate) token: String,
    pub(crate) prompter: Prompter,
}

impl AppContext {
    /// Build a context with a freshly configured HTTP client.
    pub(crate) fn new(
        base_url: Url,
        token: String,
        timeout_secs: u64,
        prompter: Prompter,
    ) -> CliResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|err| CliError::failure(anyhow!("failed to build HTTP client: {err}")))?;
        Ok(Self {
            client,
            base_url,
            token,
            prompter,
        })
    }

    /// Resolve an endpoint path (e.g. `rule/find`) against the base URL,
    /// keeping any path prefix the base carries.
    pub(crate) fn endpoint(&self, path: &str) -> CliResult<Url> {
        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            let trailing = format!("{}/", base.path());
            base.set_path(&trailing);
        }
        base.join(path)
            .map_err(|err| CliError::failure(anyhow!("invalid base URL: {err}")))
    }

    /// POST a JSON body to a read endpoint. Finds carry no auth header.
    pub(crate) async fn post_find(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> CliResult<Response> {
        let url = self.endpoint(path)?;
        tracing::debug!(endpoint = path, "sending find request");
        self.client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|err| CliError::failure(anyhow!("request to {path} failed: {err}")))
    }

    /// POST a JSON body to a mutating endpoint with the auth token attached.
    pub(crate) async fn post_mutation(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> CliResult<Response> {
        let url = self.endpoint(path)?;
        tracing::debug!(endpoint = path, "sending mutation request");
        self.client
            .post(url)
            .header("Authorization", format!("Token {}", self.token))
            .json(body)
            .send()
            .await
            .map_err(|err| CliError::failure(anyhow!("request to {path} failed: {err}")))
    }
}

/// Turn a non-success HTTP response into a CLI error carrying the numeric
/// status and the server's reason/body text verbatim.
pub(crate) async fn classify_problem(response: Response) -> CliError {
    let status = response.status();
    let bytes = response.bytes().await.unwrap_or_default();
    problem_from_parts(status, &bytes)
}

/// As [`classify_problem`], for callers that already consumed the body.
pub(crate) fn problem_from_parts(status: reqwest::StatusCode, body: &[u8]) -> CliError {
    let reason = String::from_utf8_lossy(body);
    let reason = reason.trim();

    if reason.is_empty() {
        CliError::failure(anyhow!("request failed with status {status}"))
    } else {
        CliError::failure(anyhow!("request failed with status {status}: {reason}"))
    }
}
