use crate::models::{CreateNote, Note, UpdateNote};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

/// The network seam of the board. Errors carry the server's message when it
/// sent one.
#[async_trait]
pub trait NotesApi: Send + Sync {
    async fn list_active(&self) -> Result<Vec<Note>>;
    async fn list_archived(&self) -> Result<Vec<Note>>;
    async fn create(&self, note: &CreateNote) -> Result<Note>;
    async fn update(&self, id: i64, patch: &UpdateNote) -> Result<Note>;
    async fn delete(&self, id: i64) -> Result<()>;
}

/// `NotesApi` over the JSON routes of a running server.
pub struct HttpNotesApi {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl HttpNotesApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = match resp.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status.to_string(),
        };
        Err(anyhow!("HTTP {}: {}", status.as_u16(), message))
    }
}

#[async_trait]
impl NotesApi for HttpNotesApi {
    async fn list_active(&self) -> Result<Vec<Note>> {
        let resp = self
            .client
            .get(self.url("/notes"))
            .send()
            .await
            .context("list notes failed")?;

        Ok(Self::check(resp).await?.json().await?)
    }

    async fn list_archived(&self) -> Result<Vec<Note>> {
        let resp = self
            .client
            .get(self.url("/notes/archived"))
            .send()
            .await
            .context("list archived notes failed")?;

        Ok(Self::check(resp).await?.json().await?)
    }

    async fn create(&self, note: &CreateNote) -> Result<Note> {
        let resp = self
            .client
            .post(self.url("/notes"))
            .json(note)
            .send()
            .await
            .context("create note failed")?;

        Ok(Self::check(resp).await?.json().await?)
    }

    async fn update(&self, id: i64, patch: &UpdateNote) -> Result<Note> {
        let resp = self
            .client
            .put(self.url(&format!("/notes/{id}")))
            .json(patch)
            .send()
            .await
            .with_context(|| format!("update note {id} failed"))?;

        Ok(Self::check(resp).await?.json().await?)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let resp = self
            .client
            .delete(self.url(&format!("/notes/{id}")))
            .send()
            .await
            .with_context(|| format!("delete note {id} failed"))?;
        Self::check(resp).await?;

        Ok(())
    }
}
