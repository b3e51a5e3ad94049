//! Async HTTP client for the spreadsheet web-app endpoint.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::debug;

use crate::{
  Error, Result,
  encode::{RawRow, WriteRequest},
};

/// Reply envelope: `{"status": "ok", ...}` or `{"status": "error", "message"}`.
#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum Reply<T> {
  Ok(T),
  Error { message: String },
}

#[derive(Debug, Deserialize)]
struct Rows {
  #[serde(default)]
  data: Vec<RawRow>,
}

#[derive(Debug, Deserialize)]
struct Ack {}

/// Outcome of a write the endpoint refused.
pub enum WriteOutcome {
  Done,
  Refused(String),
}

/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct SheetClient {
  client:   Client,
  endpoint: String,
}

impl SheetClient {
  pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
    let client = Client::builder().timeout(timeout).build()?;
    Ok(Self { client, endpoint: endpoint.into() })
  }

  async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<Reply<T>> {
    if !resp.status().is_success() {
      return Err(Error::HttpStatus(resp.status()));
    }
    let bytes = resp.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
  }

  /// `GET <endpoint>`: every row of the `feedback` tab.
  pub async fn fetch_rows(&self) -> Result<Vec<RawRow>> {
    let resp = self.client.get(&self.endpoint).send().await?;
    match Self::decode::<Rows>(resp).await? {
      Reply::Ok(rows) => {
        debug!(rows = rows.data.len(), "fetched sheet");
        Ok(rows.data)
      }
      Reply::Error { message } => Err(Error::Remote(message)),
    }
  }

  /// `POST <endpoint>` with an append or status-update body.
  pub async fn write(&self, request: &WriteRequest<'_>) -> Result<WriteOutcome> {
    let resp = self.client.post(&self.endpoint).json(request).send().await?;
    match Self::decode::<Ack>(resp).await? {
      Reply::Ok(Ack {}) => Ok(WriteOutcome::Done),
      Reply::Error { message } => Ok(WriteOutcome::Refused(message)),
    }
  }
}
