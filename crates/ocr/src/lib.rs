pub mod amount;
pub mod classify;
pub mod date;
pub mod engine;
pub mod extract;
pub mod pipeline;
pub mod preprocess;
pub mod score;
pub mod strategy;

pub use classify::classify;
pub use engine::{EngineError, MockEngine, OcrEngine, TesseractEngine};
pub use extract::Extractor;
pub use pipeline::{PipelineError, ReceiptPipeline};
pub use preprocess::prepare_for_ocr;
pub use score::{score_text, select_best};
pub use strategy::{OcrCandidate, OcrStrategy, StrategyRunner, STRATEGIES};
