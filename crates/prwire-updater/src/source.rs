//! HTTP access to the release source.

use std::{path::Path, time::Duration};

use reqwest::{Client, header};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt as _;

use crate::{Error, Result, config::PluginConfig};

/// A downloadable release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
  pub name:        String,
  pub archive_url: String,
}

#[derive(Deserialize)]
struct RemoteTag {
  name:        String,
  zipball_url: String,
}

pub(crate) struct RemoteSource {
  http:             Client,
  request_timeout:  Duration,
  download_timeout: Duration,
}

impl RemoteSource {
  pub(crate) fn new(config: &PluginConfig) -> Result<Self> {
    let http = Client::builder()
      .user_agent(concat!("prwire-updater/", env!("CARGO_PKG_VERSION")))
      .build()?;
    Ok(Self {
      http,
      request_timeout: config.request_timeout(),
      download_timeout: config.download_timeout(),
    })
  }

  pub(crate) async fn fetch_text(&self, url: &str) -> Result<String> {
    let text = self
      .http
      .get(url)
      .timeout(self.request_timeout)
      .send()
      .await?
      .error_for_status()?
      .text()
      .await?;
    Ok(text)
  }

  pub(crate) async fn fetch_tags(&self, url: &str) -> Result<Vec<Tag>> {
    let tags: Vec<RemoteTag> = self
      .http
      .get(url)
      .header(header::ACCEPT, "application/vnd.github.v3+json")
      .timeout(self.request_timeout)
      .send()
      .await?
      .error_for_status()?
      .json()
      .await?;
    Ok(
      tags
        .into_iter()
        .map(|t| Tag { name: t.name, archive_url: t.zipball_url })
        .collect(),
    )
  }

  /// Stream `url` into the file at `dest`, returning the bytes written.
  pub(crate) async fn download(&self, url: &str, dest: &Path) -> Result<u64> {
    let mut resp = self
      .http
      .get(url)
      .timeout(self.download_timeout)
      .send()
      .await?
      .error_for_status()?;

    let mut file = tokio::fs::File::create(dest)
      .await
      .map_err(Error::fs("create download", dest))?;
    let mut written = 0u64;
    while let Some(chunk) = resp.chunk().await? {
      file.write_all(&chunk).await.map_err(Error::fs("write download", dest))?;
      written += chunk.len() as u64;
    }
    file.flush().await.map_err(Error::fs("flush download", dest))?;
    Ok(written)
  }
}
