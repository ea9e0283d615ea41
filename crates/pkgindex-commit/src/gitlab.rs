use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use pkgindex_config::config::RemoteConfig;
use serde_json::Value;
use tracing::{debug, info};
use ureq::Agent;

use crate::{
    api::CommitApi,
    error::{CommitError, Result},
    http_client::ClientConfig,
    types::{CommitReceipt, CommitRequest},
};

/// Submits commits through a GitLab-style `repository/commits` endpoint.
pub struct GitlabCommitApi {
    agent: Agent,
    client: ClientConfig,
    commits_url: String,
    token: String,
}

impl GitlabCommitApi {
    pub fn new(remote: &RemoteConfig, client: &ClientConfig) -> Self {
        Self {
            agent: client.build(),
            client: client.clone(),
            commits_url: commits_url(&remote.api_url, &remote.project_id),
            token: remote.token.clone(),
        }
    }

    pub fn commits_url(&self) -> &str {
        &self.commits_url
    }
}

impl CommitApi for GitlabCommitApi {
    fn commit(&self, request: &CommitRequest) -> Result<CommitReceipt> {
        info!(
            "Submitting commit with {} file(s) to branch {}",
            request.actions.len(),
            request.branch
        );

        let req = self
            .agent
            .post(&self.commits_url)
            .header("PRIVATE-TOKEN", &self.token);
        let resp = self
            .client
            .apply_headers(req)
            .send_json(request)
            .map_err(|err| CommitError::transport(&self.commits_url, err))?;

        let status = resp.status().as_u16();
        let body = resp
            .into_body()
            .read_to_string()
            .map_err(|err| CommitError::transport(&self.commits_url, err))?;

        interpret_response(status, &body)
    }
}

/// `<api_url>/projects/<id>/repository/commits`, with the project id
/// percent-encoded so namespaced paths like `group/project` work too.
fn commits_url(api_url: &str, project_id: &str) -> String {
    format!(
        "{}/projects/{}/repository/commits",
        api_url.trim_end_matches('/'),
        utf8_percent_encode(project_id, NON_ALPHANUMERIC)
    )
}

/// Turns a raw commit API response into a receipt.
///
/// The body must be JSON whatever the status is.
fn interpret_response(status: u16, body: &str) -> Result<CommitReceipt> {
    let value: Value = serde_json::from_str(body).map_err(|err| {
        CommitError::ResponseDecode {
            reason: format!("body is not valid JSON: {err}"),
        }
    })?;
    debug!("Commit API response ({status}): {value}");

    if !(200..300).contains(&status) {
        let message = value
            .get("message")
            .or_else(|| value.get("error"))
            .map(|m| {
                m.as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| m.to_string())
            })
            .unwrap_or_else(|| value.to_string());
        return Err(CommitError::HttpError {
            status,
            message,
        });
    }

    let reference = value
        .get("web_url")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            CommitError::ResponseDecode {
                reason: "missing `web_url`".to_string(),
            }
        })?
        .to_string();
    let id = value.get("id").and_then(Value::as_str).map(str::to_string);

    Ok(CommitReceipt {
        reference,
        id,
    })
}
