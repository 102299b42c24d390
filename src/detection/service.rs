use std::future::Future;
use std::pin::Pin;

use tracing::debug;

use super::encode::EncodedFrame;
use super::types::{DetectionResponse, RawDetection};
use crate::config::DetectionConfig;
use crate::error::DetectionError;

/// Boxed future returned by [`DetectionService::detect`]
pub type DetectFuture =
    Pin<Box<dyn Future<Output = Result<Option<Vec<RawDetection>>, DetectionError>> + Send>>;

/// An out-of-process face detector
///
/// `Ok(None)` means the service answered without a `detections` field;
/// `Ok(Some(vec![]))` means it found no faces.
pub trait DetectionService: Send + Sync + 'static {
    fn detect(&self, frame: EncodedFrame) -> DetectFuture;
}

/// Detection over HTTP: POSTs `{"image": "<data url>"}` as JSON
#[derive(Debug, Clone)]
pub struct HttpDetectionService {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpDetectionService {
    pub fn new(config: &DetectionConfig) -> Result<Self, DetectionError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl DetectionService for HttpDetectionService {
    fn detect(&self, frame: EncodedFrame) -> DetectFuture {
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();

        Box::pin(async move {
            let body = serde_json::json!({ "image": frame.to_data_url() });
            debug!(
                "POST {} ({} byte JPEG, {}x{})",
                endpoint,
                frame.bytes.len(),
                frame.width,
                frame.height
            );

            let response = client.post(&endpoint).json(&body).send().await?;

            let status = response.status();
            if !status.is_success() {
                return Err(DetectionError::Status {
                    status: status.as_u16(),
                });
            }

            let parsed: DetectionResponse =
                response
                    .json()
                    .await
                    .map_err(|e| DetectionError::InvalidResponse {
                        reason: e.to_string(),
                    })?;

            Ok(parsed.detections)
        })
    }
}
