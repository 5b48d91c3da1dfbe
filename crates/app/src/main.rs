use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use image::ImageFormat;

use dereseny_ocr::{PipelineError, ReceiptPipeline, TesseractEngine};

/// Upload-boundary limits, checked before any OCR work starts.
const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;
const ALLOWED_FORMATS: [ImageFormat; 4] = [
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Gif,
    ImageFormat::WebP,
];

const USAGE: &str = "usage: dereseny <receipt-image> [--payer NAME]";

struct Args {
    image: PathBuf,
    payer: Option<String>,
}

/// Returns `None` when the invocation only asked for usage help.
fn parse_args(argv: impl IntoIterator<Item = String>) -> Result<Option<Args>> {
    let mut image = None;
    let mut payer = None;

    let mut argv = argv.into_iter();
    while let Some(arg) = argv.next() {
        match arg.as_str() {
            "--payer" => {
                payer = Some(argv.next().context("--payer requires a value")?);
            }
            "--help" | "-h" => {
                println!("{USAGE}");
                return Ok(None);
            }
            _ if image.is_none() => image = Some(PathBuf::from(arg)),
            _ => bail!("unexpected argument: {arg}"),
        }
    }

    Ok(Some(Args { image: image.context(USAGE)?, payer }))
}

/// Reject oversized files and non-image bytes before spending OCR time on
/// them. Format is sniffed from content, never trusted from the extension.
fn load_image(path: &PathBuf) -> Result<Vec<u8>> {
    let data = std::fs::read(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    if data.len() > MAX_IMAGE_BYTES {
        bail!(
            "{} is {} bytes; the limit is {} bytes",
            path.display(),
            data.len(),
            MAX_IMAGE_BYTES
        );
    }

    let format = image::guess_format(&data)
        .with_context(|| format!("{} is not a recognized image", path.display()))?;
    if !ALLOWED_FORMATS.contains(&format) {
        bail!("unsupported image format {format:?}; use JPEG, PNG, GIF or WebP");
    }

    Ok(data)
}

async fn run() -> Result<()> {
    let Some(args) = parse_args(std::env::args().skip(1))? else {
        return Ok(());
    };
    let data = load_image(&args.image)?;

    let pipeline = ReceiptPipeline::new(TesseractEngine::from_env());
    match pipeline.parse_image(&data, args.payer.as_deref()).await {
        Ok(receipt) => {
            println!("{}", serde_json::to_string_pretty(&receipt)?);
            Ok(())
        }
        Err(e @ PipelineError::NoUsableText) => {
            // Still a JSON response so scripted callers get one shape.
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "error": e.to_string(),
                    "raw_text": serde_json::Value::Null,
                }))?
            );
            bail!(e);
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Result<Option<Args>> {
        parse_args(v.iter().map(|s| s.to_string()))
    }

    #[test]
    fn help_is_not_an_error() {
        assert!(matches!(args(&["--help"]), Ok(None)));
        assert!(matches!(args(&["-h"]), Ok(None)));
    }

    #[test]
    fn image_and_payer_are_parsed() {
        let parsed = args(&["slip.png", "--payer", "Sara Tesfaye"]).unwrap().unwrap();
        assert_eq!(parsed.image, PathBuf::from("slip.png"));
        assert_eq!(parsed.payer.as_deref(), Some("Sara Tesfaye"));
    }

    #[test]
    fn missing_image_is_an_error() {
        assert!(args(&[]).is_err());
        assert!(args(&["--payer", "Sara"]).is_err());
    }

    #[test]
    fn extra_positional_is_rejected() {
        assert!(args(&["a.png", "b.png"]).is_err());
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
