use futures::future::BoxFuture;
use futures::FutureExt;

use crate::error::BoxError;

/// Delivers one encoded request and returns the raw response.
///
/// Status handling is left to the caller, so implementations should only fail
/// when no response was received at all.
pub trait Transport: Send + Sync {
    fn send(&self, request: http::Request<Vec<u8>>) -> BoxFuture<'_, Result<http::Response<Vec<u8>>, BoxError>>;
}

/// [`Transport`] over a shared [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        ReqwestTransport { client }
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: http::Request<Vec<u8>>) -> BoxFuture<'_, Result<http::Response<Vec<u8>>, BoxError>> {
        send(&self.client, request).boxed()
    }
}

async fn send(client: &reqwest::Client, request: http::Request<Vec<u8>>) -> Result<http::Response<Vec<u8>>, BoxError> {
    let request = reqwest::Request::try_from(request)?;
    let response = client.execute(request).await?;

    let mut builder = http::Response::builder()
        .status(response.status())
        .version(response.version());
    if let Some(headers) = builder.headers_mut() {
        headers.extend(response.headers().clone());
    }
    let body = response.bytes().await?;
    Ok(builder.body(body.to_vec())?)
}
