use async_trait::async_trait;
use billed_core::{AttachmentUpload, Bill, BillStore, CreatedBill, StoreError};
use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("base url must start with http:// or https://: {0}")]
    InvalidBaseUrl(String),

    #[error("building http client: {0}")]
    Build(#[from] reqwest::Error),
}

/// [`BillStore`] backed by the billing REST API.
///
/// - `POST   {base}/bills`      multipart `file` + `email`, answers `{fileUrl, key}`
/// - `PATCH  {base}/bills/{id}` JSON record, answers the stored bill
///   (`PATCH {base}/bills` when no upload gave the form a key)
/// - `GET    {base}/bills`      answers the bill list
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: reqwest::Client,
    base_url: String,
    jwt: Option<String>,
}

impl HttpStore {
    pub fn new(
        base_url: &str,
        jwt: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::InvalidBaseUrl(base_url));
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            jwt,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.jwt {
            Some(token) => req.header(AUTHORIZATION, format!("Bearer {token}")),
            None => req,
        }
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, StoreError> {
        let resp = self.authorized(req).send().await.map_err(transport)?;
        let resp = check_status(resp)?;
        resp.json::<T>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }
}

fn transport(e: reqwest::Error) -> StoreError {
    StoreError::Transport(e.to_string())
}

fn check_status(resp: Response) -> Result<Response, StoreError> {
    let status = resp.status();
    if !status.is_success() {
        return Err(StoreError::Status(status.as_u16()));
    }
    Ok(resp)
}

#[async_trait]
impl BillStore for HttpStore {
    async fn create(&self, upload: AttachmentUpload) -> Result<CreatedBill, StoreError> {
        let mime = upload.file.mime_type();
        // No explicit content type: reqwest writes the multipart boundary itself.
        let part = Part::bytes(upload.file.content.to_vec())
            .file_name(upload.file.name.clone())
            .mime_str(mime)
            .map_err(transport)?;
        let form = Form::new().part("file", part).text("email", upload.email);

        debug!(file = %upload.file.name, "POST bills");
        self.send(self.client.post(self.url("bills")).multipart(form))
            .await
    }

    async fn update(&self, selector: Option<&str>, bill: &Bill) -> Result<Bill, StoreError> {
        let path = match selector {
            Some(id) => format!("bills/{id}"),
            None => "bills".to_string(),
        };
        debug!(key = selector.unwrap_or("-"), "PATCH bills");
        self.send(self.client.patch(self.url(&path)).json(bill)).await
    }

    async fn list(&self) -> Result<Vec<Bill>, StoreError> {
        debug!("GET bills");
        self.send(self.client.get(self.url("bills"))).await
    }
}
