//! Lazy pager over `Microsoft.Compute/disks` in one subscription
//!
//! One page is buffered at a time. `nextLink` is only followed once the
//! buffer has been drained, so callers pull disks one by one without the
//! whole listing ever being held in memory.

use crate::azure::credential::{AccessToken, TokenCredential};
use crate::azure::types::{ArmErrorResponse, DiskListPage};
use crate::error::{CollaboratorStage, Result};
use crate::error_helpers::{collaborator_error, collaborator_error_from, http_error, with_troubleshooting};
use crate::provider::{DiskSource, RawDisk};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::debug;

pub struct DiskPager {
    http: reqwest::Client,
    credential: Arc<dyn TokenCredential>,
    resource: String,
    token: Option<AccessToken>,
    next_url: Option<String>,
    buffer: VecDeque<RawDisk>,
    pages_fetched: usize,
}

impl std::fmt::Debug for DiskPager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiskPager")
            .field("resource", &self.resource)
            .field("next_url", &self.next_url)
            .field("pages_fetched", &self.pages_fetched)
            .finish_non_exhaustive()
    }
}

impl DiskPager {
    pub(crate) fn new(
        http: reqwest::Client,
        credential: Arc<dyn TokenCredential>,
        resource: String,
        first_page_url: String,
    ) -> Self {
        Self {
            http,
            credential,
            resource,
            token: None,
            next_url: Some(first_page_url),
            buffer: VecDeque::new(),
            pages_fetched: 0,
        }
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    async fn bearer_token(&mut self) -> Result<String> {
        if let Some(token) = self.token.as_ref().filter(|t| !t.is_expired()) {
            return Ok(token.secret.clone());
        }
        let token = self.credential.get_token(&self.http, &self.resource).await?;
        let secret = token.secret.clone();
        self.token = Some(token);
        Ok(secret)
    }

    async fn fetch_page(&mut self, url: &str) -> Result<()> {
        let token = self.bearer_token().await?;
        debug!("Fetching disk page {}: {}", self.pages_fetched + 1, url);

        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| http_error("Failed to reach Azure Resource Manager", e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| http_error("Failed to read disk listing", e))?;

        if !status.is_success() {
            return Err(listing_error(status, &body));
        }

        let page: DiskListPage = serde_json::from_str(&body).map_err(|e| {
            collaborator_error_from(
                CollaboratorStage::Enumerate,
                "Malformed disk listing page",
                e,
            )
        })?;

        self.pages_fetched += 1;
        debug!(
            "Page {} returned {} disks{}",
            self.pages_fetched,
            page.value.len(),
            if page.next_link.is_some() { ", more to come" } else { "" }
        );
        self.buffer.extend(page.value.into_iter().map(RawDisk::from));
        self.next_url = page.next_link.filter(|link| !link.is_empty());
        Ok(())
    }
}

/// Turn a non-success ARM response into an enumeration error
fn listing_error(status: StatusCode, body: &str) -> crate::error::ZombieError {
    let detail = serde_json::from_str::<ArmErrorResponse>(body)
        .ok()
        .map(|e| {
            let code = e.error.code.unwrap_or_else(|| "UnknownError".to_string());
            match e.error.message {
                Some(message) => format!("{} - {}", code, message),
                None => code,
            }
        })
        .unwrap_or_else(|| body.trim().to_string());

    let message = format!("HTTP {}: {}", status.as_u16(), detail);
    let message = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => with_troubleshooting(
            message,
            &[
                "Check that the identity has the Reader role on the subscription",
                "Run 'az account show' to confirm which account is signed in",
            ],
        ),
        StatusCode::NOT_FOUND => with_troubleshooting(
            message,
            &["Check the subscription ID with 'az account list --output table'"],
        ),
        _ => message,
    };
    collaborator_error(CollaboratorStage::Enumerate, message)
}

#[async_trait]
impl DiskSource for DiskPager {
    fn name(&self) -> &'static str {
        "azure"
    }

    async fn next_disk(&mut self) -> Result<Option<RawDisk>> {
        loop {
            if let Some(disk) = self.buffer.pop_front() {
                return Ok(Some(disk));
            }
            // An empty page can still carry a nextLink
            let Some(url) = self.next_url.take() else {
                return Ok(None);
            };
            self.fetch_page(&url).await?;
        }
    }
}
