//! ocrs text recognition backend.
//!
//! Wraps an [`ocrs::OcrEngine`] loaded from local `.rten` models. Frames are
//! rotated upright before recognition; the engine itself is treated as a
//! black box.

use std::path::Path;

use anyhow::{Context, Result};
use image::RgbImage;
use ocrs::{ImageSource, OcrEngine, OcrEngineParams};
use rten::Model;
use tracing::info;

use crate::capture::{FrameImage, Rotation};
use crate::vision::{RecognizeError, Recognizer};

const DETECTION_MODEL: &str = "text-detection.rten";
const RECOGNITION_MODEL: &str = "text-recognition.rten";

pub struct OcrsRecognizer {
    engine: OcrEngine,
}

impl OcrsRecognizer {
    /// Load detection and recognition models from `model_dir`.
    ///
    /// Expects `text-detection.rten` and `text-recognition.rten` in that
    /// directory.
    pub fn new(model_dir: &Path) -> Result<Self> {
        let detection_path = model_dir.join(DETECTION_MODEL);
        let recognition_path = model_dir.join(RECOGNITION_MODEL);

        let detection_model = Model::load_file(&detection_path)
            .with_context(|| format!("failed to load {}", detection_path.display()))?;
        let recognition_model = Model::load_file(&recognition_path)
            .with_context(|| format!("failed to load {}", recognition_path.display()))?;

        let engine = OcrEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })
        .context("failed to initialize OCR engine")?;

        info!("OCR engine initialized from {}", model_dir.display());
        Ok(Self { engine })
    }
}

impl Recognizer for OcrsRecognizer {
    fn recognize(
        &mut self,
        image: &FrameImage,
        rotation: Rotation,
    ) -> Result<String, RecognizeError> {
        let upright = rotate_upright(image, rotation)?;
        let (width, height) = upright.dimensions();

        let source = ImageSource::from_bytes(upright.as_raw(), (width, height))
            .map_err(|err| RecognizeError::InvalidImage(err.to_string()))?;
        let input = self
            .engine
            .prepare_input(source)
            .map_err(|err| RecognizeError::Backend(err.to_string()))?;
        let text = self
            .engine
            .get_text(&input)
            .map_err(|err| RecognizeError::Backend(err.to_string()))?;

        Ok(text.trim_end().to_string())
    }
}

/// Rotate the raw frame so its text is upright for the engine.
fn rotate_upright(image: &FrameImage, rotation: Rotation) -> Result<RgbImage, RecognizeError> {
    let buffer = RgbImage::from_raw(image.width, image.height, image.data.clone())
        .ok_or_else(|| {
            RecognizeError::InvalidImage("pixel buffer does not match dimensions".to_string())
        })?;

    Ok(match rotation {
        Rotation::Deg0 => buffer,
        Rotation::Deg90 => image::imageops::rotate90(&buffer),
        Rotation::Deg180 => image::imageops::rotate180(&buffer),
        Rotation::Deg270 => image::imageops::rotate270(&buffer),
    })
}
