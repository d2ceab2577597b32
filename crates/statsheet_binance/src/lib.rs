pub mod klines;
pub mod method;
pub mod ticker;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Client, ClientBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.binance.com";

/// Error body the exchange returns with non-2xx responses.
#[derive(Deserialize, Debug)]
struct ApiErrorBody {
    code: i64,
    msg: String,
}

#[derive(Error, Debug)]
pub enum BinanceError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Exchange rejected the request (code {code}): {msg}")]
    Api { code: i64, msg: String },
    #[error("Exchange returned status {status}: {body}")]
    Status { status: u16, body: String },
}

pub type BinanceResult<T> = Result<T, BinanceError>;

/// Client for the public (unauthenticated) market data endpoints.
#[derive(Clone)]
pub struct BinanceClient {
    base_url: String,
    reqwest: Client,
}

impl BinanceClient {
    pub fn new(base_url: &str, timeout: Duration) -> BinanceResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let reqwest = ClientBuilder::new()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            reqwest,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) async fn get<T: DeserializeOwned, P: Serialize + ?Sized>(
        &self,
        path: &str,
        params: &P,
    ) -> BinanceResult<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "GET");

        let response = self.reqwest.get(&url).query(params).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(match serde_json::from_str::<ApiErrorBody>(&body) {
                Ok(ApiErrorBody { code, msg }) => BinanceError::Api { code, msg },
                Err(_) => BinanceError::Status {
                    status: status.as_u16(),
                    body,
                },
            });
        }

        Ok(response.json::<T>().await?)
    }

    pub async fn call<M: method::Method>(&self, params: M::Params) -> BinanceResult<M::Response> {
        self.get(M::PATH, &params).await
    }
}
