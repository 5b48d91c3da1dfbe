use std::time::Duration;

use futures_util::future::join_all;

use crate::engine::{EngineError, OcrEngine};
use crate::score::score_text;

/// One engine configuration: a page-segmentation mode and a stable id used
/// for logging and deterministic tie-breaking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OcrStrategy {
    pub id: &'static str,
    pub psm: u8,
}

/// Fixed strategy table, in priority order. Structured receipts read best as
/// a uniform block (PSM 6); tabular bank slips as a single column (PSM 4);
/// fully automatic layout (PSM 3) is the fallback.
pub const STRATEGIES: [OcrStrategy; 3] = [
    OcrStrategy { id: "uniform_block", psm: 6 },
    OcrStrategy { id: "single_column", psm: 4 },
    OcrStrategy { id: "auto", psm: 3 },
];

/// One engine invocation's text output, awaiting selection.
/// Transient — exists only between recognition and scoring.
#[derive(Debug, Clone)]
pub struct OcrCandidate {
    pub strategy_id: &'static str,
    pub text: String,
    pub quality_score: i64,
}

/// Runs every configured strategy against one preprocessed image,
/// concurrently, each bounded by `timeout`.
pub struct StrategyRunner<'a> {
    strategies: &'a [OcrStrategy],
    timeout: Duration,
}

impl Default for StrategyRunner<'static> {
    fn default() -> Self {
        Self { strategies: &STRATEGIES, timeout: Duration::from_secs(30) }
    }
}

impl<'a> StrategyRunner<'a> {
    pub fn new(strategies: &'a [OcrStrategy], timeout: Duration) -> Self {
        Self { strategies, timeout }
    }

    /// Fan out one recognition task per strategy and join them all.
    ///
    /// Results come back in strategy-table order regardless of completion
    /// order, which keeps downstream tie-breaking deterministic. A timeout
    /// or failure in one strategy is that strategy's failure only.
    pub async fn run<E: OcrEngine>(
        &self,
        engine: &E,
        image_png: &[u8],
    ) -> Vec<(&'static str, Result<String, EngineError>)> {
        let tasks = self.strategies.iter().map(|strategy| async move {
            let result = match tokio::time::timeout(
                self.timeout,
                engine.recognize(image_png, strategy),
            )
            .await
            {
                Ok(r) => r,
                Err(_) => Err(EngineError::Timeout),
            };
            if let Err(e) = &result {
                tracing::warn!(strategy = strategy.id, "OCR strategy failed: {e}");
            }
            (strategy.id, result)
        });

        join_all(tasks).await
    }

    /// Run all strategies and keep only the usable outputs, scored.
    pub async fn candidates<E: OcrEngine>(
        &self,
        engine: &E,
        image_png: &[u8],
    ) -> (Vec<OcrCandidate>, Vec<EngineError>) {
        let mut candidates = Vec::new();
        let mut failures = Vec::new();
        for (strategy_id, result) in self.run(engine, image_png).await {
            match result {
                Ok(text) => {
                    let quality_score = score_text(&text);
                    candidates.push(OcrCandidate { strategy_id, text, quality_score });
                }
                Err(e) => failures.push(e),
            }
        }
        (candidates, failures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MockEngine;
    use std::future::Future;

    /// Hangs on one strategy, answers promptly on the rest.
    struct SlowOnUniformBlock;

    impl OcrEngine for SlowOnUniformBlock {
        fn recognize(
            &self,
            _image_png: &[u8],
            strategy: &OcrStrategy,
        ) -> impl Future<Output = Result<String, EngineError>> + Send {
            let id = strategy.id;
            async move {
                if id == "uniform_block" {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                }
                Ok(format!("Amount: 45.00 via {id}"))
            }
        }
    }

    #[tokio::test]
    async fn results_preserve_strategy_order() {
        let engine = MockEngine::uniform("Total: 10.00");
        let runner = StrategyRunner::default();
        let results = runner.run(&engine, b"png").await;
        let ids: Vec<_> = results.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec!["uniform_block", "single_column", "auto"]);
    }

    #[tokio::test]
    async fn failed_strategy_does_not_sink_the_others() {
        let engine = MockEngine::per_strategy(vec![
            ("single_column", "Amount: 20.00 ETB".to_string()),
        ]);
        let runner = StrategyRunner::default();
        let (candidates, failures) = runner.candidates(&engine, b"png").await;
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].strategy_id, "single_column");
        assert_eq!(failures.len(), 2);
    }

    #[tokio::test]
    async fn timeout_fails_only_the_slow_strategy() {
        let runner = StrategyRunner::new(&STRATEGIES, Duration::from_millis(50));
        let (candidates, failures) = runner.candidates(&SlowOnUniformBlock, b"png").await;
        let ids: Vec<_> = candidates.iter().map(|c| c.strategy_id).collect();
        assert_eq!(ids, vec!["single_column", "auto"]);
        assert_eq!(failures.len(), 1);
        assert!(matches!(failures[0], EngineError::Timeout));
    }

    #[tokio::test]
    async fn no_strategies_yield_empty_candidate_set() {
        let engine = MockEngine::per_strategy(vec![]);
        let runner = StrategyRunner::default();
        let (candidates, failures) = runner.candidates(&engine, b"png").await;
        assert!(candidates.is_empty());
        assert_eq!(failures.len(), STRATEGIES.len());
    }
}
