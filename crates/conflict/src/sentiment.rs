//! Sentiment analysis collaborator
//!
//! Remarks scoring is an external NLP concern; the detector only sees a
//! 0-10 integer through this trait. 0 is very negative, 5 neutral, 10
//! very positive.

use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{ConflictError, ConflictResult};

/// Score assumed when the analyzer is absent or fails.
pub const NEUTRAL_SENTIMENT: u8 = 5;

#[async_trait]
pub trait SentimentAnalyzer: Send + Sync {
    /// Score the remarks 0-10.
    async fn score(&self, remarks: &str) -> ConflictResult<u8>;
}

/// Mock analyzer returning a fixed score (or failure).
pub struct MockSentiment {
    score: RwLock<Result<u8, String>>,
}

impl MockSentiment {
    pub fn scoring(score: u8) -> Self {
        Self {
            score: RwLock::new(Ok(score.min(10))),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            score: RwLock::new(Err("connection refused".to_string())),
        }
    }

    pub fn set_score(&self, score: u8) {
        if let Ok(mut slot) = self.score.write() {
            *slot = Ok(score.min(10));
        }
    }
}

#[async_trait]
impl SentimentAnalyzer for MockSentiment {
    async fn score(&self, _remarks: &str) -> ConflictResult<u8> {
        match &*self
            .score
            .read()
            .map_err(|_| ConflictError::Analyzer("mock lock poisoned".to_string()))?
        {
            Ok(score) => Ok(*score),
            Err(reason) => Err(ConflictError::Analyzer(reason.clone())),
        }
    }
}
