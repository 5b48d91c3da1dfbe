use std::time::Duration;

use thiserror::Error;

use dereseny_core::ParsedReceipt;

use crate::engine::OcrEngine;
use crate::extract::Extractor;
use crate::preprocess::prepare_for_ocr;
use crate::score::select_best;
use crate::strategy::{StrategyRunner, STRATEGIES};

/// Terminal pipeline failures. Each variant reads as a user-facing message;
/// callers distinguish a broken environment from a bad photo by variant.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("image data is missing or unreadable")]
    ImageUnavailable,
    /// Every strategy failed because the OCR engine itself could not be
    /// executed. Retrying with another photo will not help.
    #[error("text recognition engine is not installed or not on PATH")]
    EngineUnavailable,
    #[error("no readable text could be extracted from the image")]
    NoUsableText,
}

/// End-to-end orchestration: preprocess, fan out the OCR strategies, pick
/// the best read, extract fields.
pub struct ReceiptPipeline<E> {
    engine: E,
    timeout: Duration,
}

impl<E: OcrEngine> ReceiptPipeline<E> {
    pub fn new(engine: E) -> Self {
        Self { engine, timeout: Duration::from_secs(30) }
    }

    /// Per-strategy recognition deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Parse one receipt photo into a structured record.
    ///
    /// Field-level misses inside extraction never fail the pipeline; only
    /// the three `PipelineError` conditions do.
    pub async fn parse_image(
        &self,
        image: &[u8],
        payer_hint: Option<&str>,
    ) -> Result<ParsedReceipt, PipelineError> {
        if image.is_empty() {
            return Err(PipelineError::ImageUnavailable);
        }

        let prepared = prepare_for_ocr(image);
        let runner = StrategyRunner::new(&STRATEGIES, self.timeout);
        let (candidates, failures) = runner.candidates(&self.engine, &prepared).await;

        if candidates.is_empty() {
            if !failures.is_empty() && failures.iter().all(|e| e.is_missing()) {
                return Err(PipelineError::EngineUnavailable);
            }
            return Err(PipelineError::NoUsableText);
        }

        let best = select_best(&candidates).ok_or(PipelineError::NoUsableText)?;
        tracing::info!(
            strategy = best.strategy_id,
            score = best.quality_score,
            chars = best.text.chars().count(),
            candidates = candidates.len(),
            "OCR selection complete"
        );

        Ok(Extractor::parse(&best.text, payer_hint))
    }

    /// Text-only entry point for callers that already hold recognized text.
    pub fn parse_text(
        &self,
        text: &str,
        payer_hint: Option<&str>,
    ) -> Result<ParsedReceipt, PipelineError> {
        if text.trim().is_empty() {
            return Err(PipelineError::NoUsableText);
        }
        Ok(Extractor::parse(text, payer_hint))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{MockEngine, TesseractEngine};
    use dereseny_core::{Category, Currency, PaymentStatus};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    const RECEIPT: &str = "Fuel Station Alem\n\
        Amount: 4581.00 ETB\n\
        Date: 05-01-2026 19:46:30\n\
        Status: Completed\n";

    #[tokio::test]
    async fn happy_path_parses_structured_record() {
        let pipeline = ReceiptPipeline::new(MockEngine::uniform(RECEIPT));
        let receipt = pipeline.parse_image(b"png bytes", None).await.unwrap();
        assert_eq!(receipt.amount, Some(Decimal::from_str("4581.00").unwrap()));
        assert_eq!(receipt.currency, Currency::Etb);
        assert_eq!(receipt.status, PaymentStatus::Completed);
        assert_eq!(receipt.category, Category::Fuel);
        assert_eq!(receipt.raw_text, RECEIPT);
    }

    #[tokio::test]
    async fn empty_image_is_image_unavailable() {
        let pipeline = ReceiptPipeline::new(MockEngine::uniform(RECEIPT));
        let err = pipeline.parse_image(b"", None).await.unwrap_err();
        assert!(matches!(err, PipelineError::ImageUnavailable));
    }

    #[tokio::test]
    async fn missing_engine_is_engine_unavailable() {
        let engine = TesseractEngine::new("/nonexistent/bin/tesseract", "eng");
        let pipeline = ReceiptPipeline::new(engine);
        let err = pipeline.parse_image(b"png bytes", None).await.unwrap_err();
        assert!(matches!(err, PipelineError::EngineUnavailable));
    }

    #[tokio::test]
    async fn all_strategies_empty_is_no_usable_text() {
        let pipeline = ReceiptPipeline::new(MockEngine::per_strategy(vec![]));
        let err = pipeline.parse_image(b"png bytes", None).await.unwrap_err();
        assert!(matches!(err, PipelineError::NoUsableText));
    }

    #[tokio::test]
    async fn best_scoring_strategy_wins() {
        let engine = MockEngine::per_strategy(vec![
            ("uniform_block", "%%%% @@@@ ####".to_string()),
            ("auto", RECEIPT.to_string()),
        ]);
        let pipeline = ReceiptPipeline::new(engine);
        let receipt = pipeline.parse_image(b"png bytes", None).await.unwrap();
        assert_eq!(receipt.raw_text, RECEIPT);
    }

    #[tokio::test]
    async fn payer_hint_flows_through_to_extraction() {
        let pipeline = ReceiptPipeline::new(MockEngine::uniform(RECEIPT));
        let receipt = pipeline
            .parse_image(b"png bytes", Some("Sara Tesfaye"))
            .await
            .unwrap();
        assert_eq!(receipt.payer_name.as_deref(), Some("Sara Tesfaye"));
    }

    #[test]
    fn parse_text_rejects_blank_input() {
        let pipeline = ReceiptPipeline::new(MockEngine::uniform(RECEIPT));
        assert!(matches!(
            pipeline.parse_text("  \n", None),
            Err(PipelineError::NoUsableText)
        ));
        assert!(pipeline.parse_text(RECEIPT, None).is_ok());
    }
}
