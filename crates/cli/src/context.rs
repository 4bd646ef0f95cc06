//! Application context - wires everything together

use std::path::{Path, PathBuf};
use std::sync::Arc;

use loanguard_conflict::{ConflictDetector, DetectorConfig, MockSentiment};
use loanguard_ledger::{JsonlStore, Ledger};
use loanguard_risk::{
    Collaborators, MockClassifier, MockForensics, MockOcr, RiskEngine, ValidationService,
};
use rust_decimal::Decimal;

/// Wires the JSONL-backed ledger, the risk engine and the conflict
/// detector for CLI use.
pub struct AppContext {
    service: ValidationService<JsonlStore>,
    detector: ConflictDetector,
    mock_ocr: Option<Arc<MockOcr>>,
    ledger_path: PathBuf,
}

impl AppContext {
    /// Create a context rooted at `data_path`. With `mock_services` the
    /// classifier/OCR/forensics/sentiment slots are filled with permissive
    /// mocks; without it the slots stay empty and enabled rule sections
    /// degrade to `*_UNAVAILABLE` flags.
    pub fn new(data_path: impl AsRef<Path>, mock_services: bool) -> anyhow::Result<Self> {
        let ledger_path = data_path.as_ref().join("ledger");
        let store = JsonlStore::new(&ledger_path)?;
        let ledger = Ledger::new(store);

        let mut mock_ocr = None;
        let collaborators = if mock_services {
            let ocr = Arc::new(MockOcr::reading(None));
            mock_ocr = Some(Arc::clone(&ocr));
            Collaborators::none()
                .with_classifier(Arc::new(MockClassifier::recognizing(0.95)))
                .with_ocr(ocr)
                .with_forensics(Arc::new(MockForensics::clean()))
        } else {
            Collaborators::none()
        };

        let mut detector = ConflictDetector::new(DetectorConfig::for_tenant("default"));
        if mock_services {
            detector = detector.with_analyzer(Arc::new(MockSentiment::scoring(5)));
        }

        Ok(Self {
            service: ValidationService::new(RiskEngine::new(collaborators), ledger),
            detector,
            mock_ocr,
            ledger_path,
        })
    }

    /// Point the mock OCR at the loan's sanction amount so a mock-service
    /// run reads a matching invoice. No-op without `mock_services`.
    pub fn prime_mock_ocr(&self, amount: Decimal) {
        if let Some(ocr) = &self.mock_ocr {
            ocr.set_amount(Some(amount));
        }
    }

    pub fn service(&self) -> &ValidationService<JsonlStore> {
        &self.service
    }

    pub fn ledger(&self) -> &Ledger<JsonlStore> {
        self.service.ledger()
    }

    pub fn detector(&self) -> &ConflictDetector {
        &self.detector
    }

    pub fn ledger_path(&self) -> &Path {
        &self.ledger_path
    }
}
