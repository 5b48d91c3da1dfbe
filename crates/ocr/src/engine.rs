use std::future::Future;
use std::io::Write;
use std::path::PathBuf;
use std::process::Stdio;

use thiserror::Error;

use crate::strategy::OcrStrategy;

/// OCR engine mode 3 = combined LSTM + legacy, the best-quality setting for
/// noisy receipt photos.
const OEM_COMBINED: u8 = 3;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine binary could not be located or executed at all. Every
    /// strategy fails identically with this; it means a broken environment,
    /// not a bad receipt, and is surfaced distinctly upstream.
    #[error("OCR engine not found at '{0}'")]
    Missing(PathBuf),
    #[error("OCR engine failed: {0}")]
    Failed(String),
    #[error("OCR engine timed out")]
    Timeout,
    /// The engine ran but recognized nothing (empty or whitespace-only text).
    #[error("OCR engine returned no text")]
    Empty,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub fn is_missing(&self) -> bool {
        matches!(self, EngineError::Missing(_))
    }
}

/// Abstraction over an external text-recognition engine.
///
/// One call recognizes one image under one strategy. Implementations must be
/// cancellation-safe: dropping the returned future must not leave work
/// running (the subprocess backend uses `kill_on_drop`).
pub trait OcrEngine: Send + Sync {
    fn recognize(
        &self,
        image_png: &[u8],
        strategy: &OcrStrategy,
    ) -> impl Future<Output = Result<String, EngineError>> + Send;
}

// ── Tesseract subprocess backend ──────────────────────────────────────────────

/// Invokes the `tesseract` binary as a bounded subprocess, one run per
/// strategy. The image is handed over through a named temp file that is
/// deleted on every exit path when the guard drops.
pub struct TesseractEngine {
    binary: PathBuf,
    lang: String,
}

impl TesseractEngine {
    pub fn new(binary: impl Into<PathBuf>, lang: &str) -> Self {
        Self { binary: binary.into(), lang: lang.to_string() }
    }

    /// Binary path from `TESSERACT_CMD` when set, else `tesseract` on PATH.
    pub fn from_env() -> Self {
        let binary = std::env::var_os("TESSERACT_CMD")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("tesseract"));
        Self::new(binary, "eng")
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize(
        &self,
        image_png: &[u8],
        strategy: &OcrStrategy,
    ) -> impl Future<Output = Result<String, EngineError>> + Send {
        async move {
            let mut file = tempfile::Builder::new()
                .prefix("receipt-")
                .suffix(".png")
                .tempfile()?;
            file.write_all(image_png)?;
            file.flush()?;

            let output = tokio::process::Command::new(&self.binary)
                .arg(file.path())
                .arg("stdout")
                .args(["--psm", &strategy.psm.to_string()])
                .args(["--oem", &OEM_COMBINED.to_string()])
                .args(["--dpi", "300"])
                .args(["-l", &self.lang])
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .output()
                .await
                .map_err(|e| match e.kind() {
                    std::io::ErrorKind::NotFound => EngineError::Missing(self.binary.clone()),
                    _ => EngineError::Io(e),
                })?;

            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                return Err(EngineError::Failed(format!(
                    "exit {} (psm {}): {}",
                    output.status.code().unwrap_or(-1),
                    strategy.psm,
                    stderr.trim()
                )));
            }

            let text = String::from_utf8_lossy(&output.stdout).into_owned();
            if text.trim().is_empty() {
                return Err(EngineError::Empty);
            }
            Ok(text)
        }
    }
}

// ── Mock backend (always available, used for tests) ───────────────────────────

/// Returns one pre-set text per strategy — lets extraction and orchestration
/// be tested without Tesseract installed. A strategy with no configured text
/// reports `Empty`, mirroring a run that recognized nothing.
pub struct MockEngine {
    texts: Vec<(&'static str, String)>,
}

impl MockEngine {
    /// Same text for every strategy.
    pub fn uniform(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            texts: crate::strategy::STRATEGIES
                .iter()
                .map(|s| (s.id, text.clone()))
                .collect(),
        }
    }

    /// Per-strategy texts, keyed by strategy id.
    pub fn per_strategy(texts: Vec<(&'static str, String)>) -> Self {
        Self { texts }
    }
}

impl OcrEngine for MockEngine {
    fn recognize(
        &self,
        _image_png: &[u8],
        strategy: &OcrStrategy,
    ) -> impl Future<Output = Result<String, EngineError>> + Send {
        let result = self
            .texts
            .iter()
            .find(|(id, _)| *id == strategy.id)
            .map(|(_, t)| t.clone())
            .filter(|t| !t.trim().is_empty())
            .ok_or(EngineError::Empty);
        async move { result }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::STRATEGIES;

    #[tokio::test]
    async fn mock_returns_preset_text() {
        let engine = MockEngine::uniform("Total: 45.00 ETB");
        let text = engine.recognize(b"png", &STRATEGIES[0]).await.unwrap();
        assert_eq!(text, "Total: 45.00 ETB");
    }

    #[tokio::test]
    async fn mock_blank_text_reports_empty() {
        let engine = MockEngine::uniform("   \n");
        let err = engine.recognize(b"png", &STRATEGIES[0]).await.unwrap_err();
        assert!(matches!(err, EngineError::Empty));
    }

    #[tokio::test]
    async fn mock_unknown_strategy_reports_empty() {
        let engine = MockEngine::per_strategy(vec![("uniform_block", "hi".into())]);
        let err = engine.recognize(b"png", &STRATEGIES[2]).await.unwrap_err();
        assert!(matches!(err, EngineError::Empty));
    }

    #[tokio::test]
    async fn missing_binary_is_distinct_error() {
        let engine = TesseractEngine::new("/nonexistent/bin/tesseract", "eng");
        let err = engine.recognize(b"png", &STRATEGIES[0]).await.unwrap_err();
        assert!(err.is_missing(), "expected Missing, got {err:?}");
    }
}
