// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! HTTP/JSON client of the remote.

use std::time::Duration;

use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;

use tunequeue_core::{DeltaBatch, MutationRecord, UserId};

use crate::{
    Remote, RemoteError, RemoteResult, is_transient_status,
    json::{DeltasResponse, MutationRequest, MutationResponse, MutationStatus},
};

#[derive(Debug, Clone)]
pub struct WebApi {
    client: Client,
    base_url: Url,
}

impl WebApi {
    /// Create a new client.
    ///
    /// The `timeout` applies to each request, including the time
    /// for connecting and receiving the response body.
    pub fn new(base_url: Url, timeout: Duration) -> anyhow::Result<Self> {
        if base_url.cannot_be_a_base() {
            anyhow::bail!("invalid base URL: {base_url}");
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    fn join_api_url(&self, path: &str) -> RemoteResult<Url> {
        let mut base_url = self.base_url.clone();
        if !base_url.path().ends_with('/') {
            // Otherwise the last path segment would be replaced
            base_url.set_path(&format!("{path}/", path = base_url.path()));
        }
        base_url.join(path).map_err(|err| RemoteError::Rejected {
            reason: err.to_string(),
        })
    }
}

fn request_error(err: reqwest::Error) -> RemoteError {
    if err.is_timeout() || err.is_connect() || err.is_request() || err.is_body() {
        return RemoteError::transient(err);
    }
    if let Some(status) = err.status()
        && !is_transient_status(status.as_u16())
    {
        return RemoteError::Rejected {
            reason: err.to_string(),
        };
    }
    RemoteError::transient(err)
}

async fn receive_response_body<T>(response: Response) -> RemoteResult<T>
where
    T: DeserializeOwned,
{
    let response_status = response.status();
    let bytes = response.bytes().await.map_err(request_error)?;
    if !response_status.is_success() {
        let body = String::from_utf8_lossy(&bytes);
        let reason = if body.trim().is_empty() {
            response_status.to_string()
        } else {
            format!("{response_status}: {body}")
        };
        if is_transient_status(response_status.as_u16()) {
            return Err(RemoteError::transient(anyhow::anyhow!(reason)));
        }
        return Err(RemoteError::Rejected { reason });
    }
    // An unexpected response might be caused by an intermediate
    // proxy and is not considered as final.
    serde_json::from_slice(&bytes).map_err(RemoteError::transient)
}

impl Remote for WebApi {
    async fn post_mutation(&self, record: &MutationRecord) -> RemoteResult<()> {
        let url = self.join_api_url("mutations")?;
        log::debug!(
            "Posting mutation record {key} ({kind}) to {url}",
            key = record.key,
            kind = record.kind,
        );
        let response = self
            .client
            .post(url)
            .json(&MutationRequest::from(record))
            .send()
            .await
            .map_err(request_error)?;
        let MutationResponse { status, reason } = receive_response_body(response).await?;
        match status {
            MutationStatus::Acknowledged => Ok(()),
            MutationStatus::Rejected => Err(RemoteError::Rejected {
                reason: reason.unwrap_or_else(|| "rejected without reason".to_owned()),
            }),
        }
    }

    async fn pull_deltas(
        &self,
        user_id: &UserId,
        cursor: Option<&str>,
    ) -> RemoteResult<DeltaBatch> {
        let mut url = self.join_api_url("deltas")?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(cursor) = cursor {
                query.append_pair("since", cursor);
            }
            query.append_pair("userId", user_id.as_str());
        }
        log::debug!("Pulling remote changes from {url}");
        let response = self.client.get(url).send().await.map_err(request_error)?;
        let response: DeltasResponse = receive_response_body(response).await?;
        Ok(response.into())
    }
}
