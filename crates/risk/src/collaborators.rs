//! External collaborator interfaces
//!
//! Asset classification, invoice OCR and image forensics run in external
//! services whose model internals are out of scope here; the engine only
//! sees confidence values and boolean verdicts through these narrow
//! traits. Calls run under a bounded timeout with a small retry budget;
//! a collaborator that stays down degrades the corresponding signal to an
//! `*_UNAVAILABLE` flag instead of blocking the pipeline.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::warn;

use loanguard_core::Media;

/// Failure of an external classifier/OCR/forensics call.
#[derive(Debug, Clone, Error)]
pub enum CollaboratorError {
    #[error("collaborator timed out after {0}ms")]
    Timeout(u64),

    #[error("collaborator unavailable: {0}")]
    Unavailable(String),
}

/// Timeout/retry policy for collaborator calls.
#[derive(Debug, Clone)]
pub struct CollaboratorConfig {
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub backoff_ms: u64,
}

impl Default for CollaboratorConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 500,
            max_retries: 2,
            backoff_ms: 100,
        }
    }
}

impl CollaboratorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Verdict from the asset classifier.
#[derive(Debug, Clone)]
pub struct ClassifierVerdict {
    /// The allowed asset type that matched, if any
    pub matched_asset: Option<String>,
    /// Best label reported by the model (diagnostic only)
    pub best_label: String,
    /// Confidence of the best label, 0.0-1.0
    pub confidence: f64,
}

/// Classifies the financed asset visible in a media item.
#[async_trait]
pub trait AssetClassifier: Send + Sync {
    async fn classify(
        &self,
        media: &Media,
        allowed_assets: &[String],
    ) -> Result<ClassifierVerdict, CollaboratorError>;
}

/// Reads the invoice amount off a document image.
#[async_trait]
pub trait InvoiceOcr: Send + Sync {
    /// `None` when no amount-like text could be extracted.
    async fn read_amount(&self, media: &Media) -> Result<Option<Decimal>, CollaboratorError>;
}

/// Aggregate forensics verdict over a submission's imagery.
#[derive(Debug, Clone, Default)]
pub struct ForensicsReport {
    pub duplicate_image: bool,
    pub ela_tampered: bool,
    pub ai_generated: bool,
}

/// Perceptual-hash duplicate search, ELA tamper analysis and
/// AI-generation detection.
#[async_trait]
pub trait ImageForensics: Send + Sync {
    async fn inspect(
        &self,
        media: &[Media],
        max_hash_distance: u32,
    ) -> Result<ForensicsReport, CollaboratorError>;
}

/// The collaborator bundle the engine evaluates with. A `None` slot means
/// the deployment has no such service; enabled rule sections that need it
/// degrade accordingly.
#[derive(Clone, Default)]
pub struct Collaborators {
    pub classifier: Option<Arc<dyn AssetClassifier>>,
    pub ocr: Option<Arc<dyn InvoiceOcr>>,
    pub forensics: Option<Arc<dyn ImageForensics>>,
    pub config: CollaboratorConfig,
}

impl Collaborators {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn AssetClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn with_ocr(mut self, ocr: Arc<dyn InvoiceOcr>) -> Self {
        self.ocr = Some(ocr);
        self
    }

    pub fn with_forensics(mut self, forensics: Arc<dyn ImageForensics>) -> Self {
        self.forensics = Some(forensics);
        self
    }

    pub fn with_config(mut self, config: CollaboratorConfig) -> Self {
        self.config = config;
        self
    }
}

/// Run a collaborator call under the configured timeout, retrying with
/// linear backoff. Returns the last error when the budget is exhausted.
pub(crate) async fn call_with_retry<T, F, Fut>(
    config: &CollaboratorConfig,
    what: &str,
    mut call: F,
) -> Result<T, CollaboratorError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CollaboratorError>>,
{
    let mut last_error = CollaboratorError::Unavailable("no attempts made".to_string());

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            tokio::time::sleep(Duration::from_millis(config.backoff_ms * attempt as u64)).await;
        }

        match tokio::time::timeout(config.timeout(), call()).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(err)) => {
                warn!(collaborator = what, attempt, error = %err, "collaborator call failed");
                last_error = err;
            }
            Err(_) => {
                warn!(collaborator = what, attempt, timeout_ms = config.timeout_ms, "collaborator call timed out");
                last_error = CollaboratorError::Timeout(config.timeout_ms);
            }
        }
    }

    Err(last_error)
}

// === Mock implementations for tests and local runs ===

/// Mock classifier with per-file-key verdicts and a configurable default.
pub struct MockClassifier {
    verdicts: RwLock<HashMap<String, ClassifierVerdict>>,
    fallback: RwLock<Result<ClassifierVerdict, String>>,
}

impl MockClassifier {
    /// A classifier that matches every image as the first allowed asset
    /// with the given confidence.
    pub fn recognizing(confidence: f64) -> Self {
        Self {
            verdicts: RwLock::new(HashMap::new()),
            fallback: RwLock::new(Ok(ClassifierVerdict {
                matched_asset: None, // filled from allowed_assets at call time
                best_label: "ASSET".to_string(),
                confidence,
            })),
        }
    }

    /// A classifier that always fails, for degrade-path tests.
    pub fn unavailable() -> Self {
        Self {
            verdicts: RwLock::new(HashMap::new()),
            fallback: RwLock::new(Err("connection refused".to_string())),
        }
    }

    /// Pin a verdict for a specific media file key.
    pub fn set_verdict(&self, file_key: impl Into<String>, verdict: ClassifierVerdict) {
        if let Ok(mut verdicts) = self.verdicts.write() {
            verdicts.insert(file_key.into(), verdict);
        }
    }
}

#[async_trait]
impl AssetClassifier for MockClassifier {
    async fn classify(
        &self,
        media: &Media,
        allowed_assets: &[String],
    ) -> Result<ClassifierVerdict, CollaboratorError> {
        if let Ok(verdicts) = self.verdicts.read() {
            if let Some(verdict) = verdicts.get(&media.file_key) {
                return Ok(verdict.clone());
            }
        }

        match &*self
            .fallback
            .read()
            .map_err(|_| CollaboratorError::Unavailable("mock lock poisoned".to_string()))?
        {
            Ok(verdict) => {
                let mut verdict = verdict.clone();
                if verdict.matched_asset.is_none() {
                    verdict.matched_asset = allowed_assets.first().cloned();
                    if let Some(asset) = &verdict.matched_asset {
                        verdict.best_label = asset.clone();
                    }
                }
                Ok(verdict)
            }
            Err(reason) => Err(CollaboratorError::Unavailable(reason.clone())),
        }
    }
}

/// Mock OCR returning a fixed amount (or failure).
pub struct MockOcr {
    amount: RwLock<Result<Option<Decimal>, String>>,
}

impl MockOcr {
    pub fn reading(amount: Option<Decimal>) -> Self {
        Self {
            amount: RwLock::new(Ok(amount)),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            amount: RwLock::new(Err("connection refused".to_string())),
        }
    }

    pub fn set_amount(&self, amount: Option<Decimal>) {
        if let Ok(mut slot) = self.amount.write() {
            *slot = Ok(amount);
        }
    }
}

#[async_trait]
impl InvoiceOcr for MockOcr {
    async fn read_amount(&self, _media: &Media) -> Result<Option<Decimal>, CollaboratorError> {
        match &*self
            .amount
            .read()
            .map_err(|_| CollaboratorError::Unavailable("mock lock poisoned".to_string()))?
        {
            Ok(amount) => Ok(*amount),
            Err(reason) => Err(CollaboratorError::Unavailable(reason.clone())),
        }
    }
}

/// Mock forensics returning a fixed report (or failure).
pub struct MockForensics {
    report: RwLock<Result<ForensicsReport, String>>,
}

impl MockForensics {
    pub fn clean() -> Self {
        Self {
            report: RwLock::new(Ok(ForensicsReport::default())),
        }
    }

    pub fn reporting(report: ForensicsReport) -> Self {
        Self {
            report: RwLock::new(Ok(report)),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            report: RwLock::new(Err("connection refused".to_string())),
        }
    }
}

#[async_trait]
impl ImageForensics for MockForensics {
    async fn inspect(
        &self,
        _media: &[Media],
        _max_hash_distance: u32,
    ) -> Result<ForensicsReport, CollaboratorError> {
        match &*self
            .report
            .read()
            .map_err(|_| CollaboratorError::Unavailable("mock lock poisoned".to_string()))?
        {
            Ok(report) => Ok(report.clone()),
            Err(reason) => Err(CollaboratorError::Unavailable(reason.clone())),
        }
    }
}
