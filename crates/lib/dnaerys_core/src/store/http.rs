// @zen-component: VQ-StoreHttp
//
//! HTTP implementation of the variant store contract.
//!
//! Every operation is a JSON `POST` to `{base_url}/{endpoint}`. Scalar and
//! set replies are single JSON documents. Allele selects reply with
//! newline-delimited JSON, one `{"alleles": [...]}` batch per line, which
//! is decoded incrementally as chunks arrive.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::{Stream, StreamExt, TryStreamExt, stream};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::{debug, info};
use url::Url;

use super::config::StoreConfig;
use super::models::{DatasetInfo, KinshipRequest, RegionRequest, Relatedness, VariantRecord};
use super::{AlleleStream, Endpoint, StoreError, VariantStore};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DatasetInfoRequest {
    return_samples_names: bool,
}

#[derive(Deserialize)]
struct CountResponse {
    #[serde(default)]
    count: u64,
}

#[derive(Deserialize)]
struct SamplesResponse {
    #[serde(default)]
    samples: Vec<String>,
}

#[derive(Deserialize)]
struct KinshipResponse {
    #[serde(default)]
    rel: Vec<Relatedness>,
}

#[derive(Deserialize)]
struct AllelesBatch {
    #[serde(default)]
    alleles: Vec<VariantRecord>,
}

/// Process-wide handle to the remote store.
///
/// Built once at startup and shared by reference. The HTTP client behind
/// it is created lazily on first use and reused by all concurrent calls.
pub struct StoreChannel {
    config: StoreConfig,
    base: Url,
    client: OnceCell<Client>,
}

impl StoreChannel {
    /// Validate the configured base URL. No connection is opened yet.
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        let mut base = Url::parse(&config.base_url)?;
        // `Url::join` drops the last path segment unless it ends in '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            config,
            base,
            client: OnceCell::new(),
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// The shared HTTP client, created on first call.
    pub async fn client(&self) -> Result<&Client, StoreError> {
        self.client
            .get_or_try_init(|| async {
                info!(base_url = %self.config.base_url, "opening store channel");
                Client::builder()
                    .timeout(self.config.timeout)
                    .build()
                    .map_err(StoreError::from)
            })
            .await
    }

    /// Absolute URL of an endpoint.
    pub fn url(&self, endpoint: Endpoint) -> Result<Url, StoreError> {
        Ok(self.base.join(endpoint.path())?)
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        endpoint: Endpoint,
        body: &B,
    ) -> Result<reqwest::Response, StoreError> {
        let url = self.url(endpoint)?;
        debug!(%endpoint, %url, "store request");

        let resp = self.client().await?.post(url).json(body).send().await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(StoreError::Status { status, body });
        }

        Ok(resp)
    }

    async fn post_json<B, R>(&self, endpoint: Endpoint, body: &B) -> Result<R, StoreError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let bytes = self.post(endpoint, body).await?.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// [`VariantStore`] backed by the store's HTTP gateway.
#[derive(Clone)]
pub struct HttpVariantStore {
    channel: Arc<StoreChannel>,
}

impl HttpVariantStore {
    pub fn new(channel: Arc<StoreChannel>) -> Self {
        Self { channel }
    }

    pub fn channel(&self) -> &Arc<StoreChannel> {
        &self.channel
    }
}

#[async_trait]
impl VariantStore for HttpVariantStore {
    async fn dataset_info(&self, with_sample_names: bool) -> Result<DatasetInfo, StoreError> {
        let request = DatasetInfoRequest {
            return_samples_names: with_sample_names,
        };
        self.channel.post_json(Endpoint::DatasetInfo, &request).await
    }

    async fn count(
        &self,
        endpoint: Endpoint,
        request: &RegionRequest,
    ) -> Result<u64, StoreError> {
        let resp: CountResponse = self.channel.post_json(endpoint, request).await?;
        Ok(resp.count)
    }

    async fn select_alleles(
        &self,
        endpoint: Endpoint,
        request: &RegionRequest,
    ) -> Result<AlleleStream, StoreError> {
        let resp = self.channel.post(endpoint, request).await?;
        let bytes = resp.bytes_stream().map_err(StoreError::from).boxed();
        Ok(ndjson_batches(bytes))
    }

    async fn select_samples(&self, request: &RegionRequest) -> Result<Vec<String>, StoreError> {
        let resp: SamplesResponse = self
            .channel
            .post_json(Endpoint::SelectSamplesInRegion, request)
            .await?;
        Ok(resp.samples)
    }

    async fn kinship(&self, request: &KinshipRequest) -> Result<Vec<Relatedness>, StoreError> {
        let resp: KinshipResponse = self.channel.post_json(Endpoint::KinshipDuo, request).await?;
        Ok(resp.rel)
    }
}

struct LineBuffer<S> {
    bytes: S,
    buf: Vec<u8>,
    exhausted: bool,
}

/// Decode a byte stream of newline-delimited allele batches.
///
/// Lines may be split across chunks; blank lines are skipped and a final
/// line without a trailing newline is still decoded.
pub fn ndjson_batches<S, B>(bytes: S) -> AlleleStream
where
    S: Stream<Item = Result<B, StoreError>> + Send + Unpin + 'static,
    B: AsRef<[u8]> + Send + 'static,
{
    let state = LineBuffer {
        bytes,
        buf: Vec::new(),
        exhausted: false,
    };

    stream::try_unfold(state, next_batch).boxed()
}

async fn next_batch<S, B>(
    mut state: LineBuffer<S>,
) -> Result<Option<(Vec<VariantRecord>, LineBuffer<S>)>, StoreError>
where
    S: Stream<Item = Result<B, StoreError>> + Unpin,
    B: AsRef<[u8]>,
{
    loop {
        if let Some(pos) = state.buf.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = state.buf.drain(..=pos).collect();
            if let Some(batch) = parse_batch(&line)? {
                return Ok(Some((batch, state)));
            }
            continue;
        }

        if state.exhausted {
            let rest = std::mem::take(&mut state.buf);
            return Ok(parse_batch(&rest)?.map(|batch| (batch, state)));
        }

        match state.bytes.next().await {
            Some(chunk) => state.buf.extend_from_slice(chunk?.as_ref()),
            None => state.exhausted = true,
        }
    }
}

fn parse_batch(line: &[u8]) -> Result<Option<Vec<VariantRecord>>, StoreError> {
    let line = line.trim_ascii();
    if line.is_empty() {
        return Ok(None);
    }
    let batch: AllelesBatch = serde_json::from_slice(line)?;
    Ok(Some(batch.alleles))
}
