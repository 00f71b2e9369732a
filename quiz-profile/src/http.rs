use anyhow::Result;
use async_trait::async_trait;

use crate::store::{ProfileStore, UserPatch};

/// Profile store backed by the user API: `PATCH {base}/users/{id}`.
pub struct HttpProfileStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpProfileStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ProfileStore for HttpProfileStore {
    async fn update_user(&self, id: &str, patch: UserPatch) -> Result<()> {
        let url = format!("{}/users/{}", self.base_url, id);
        self.client
            .patch(&url)
            .json(&patch)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
