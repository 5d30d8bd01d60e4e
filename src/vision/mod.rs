//! Vision Layer
//!
//! Text recognition on captured frames, behind a pluggable backend trait:
//! - ocrs/rten on-device OCR (feature `ocr-ocrs`)
//! - a scripted fake for demos and tests

pub mod fake;
#[cfg(feature = "ocr-ocrs")]
pub mod ocrs;

use thiserror::Error;

use crate::capture::{FrameImage, Rotation};

pub use fake::FakeRecognizer;
#[cfg(feature = "ocr-ocrs")]
pub use ocrs::OcrsRecognizer;

#[derive(Debug, Error)]
pub enum RecognizeError {
    #[error("image could not be prepared for recognition: {0}")]
    InvalidImage(String),
    #[error("recognition backend error: {0}")]
    Backend(String),
}

/// The opaque text recognition capability consulted once per frame.
///
/// `rotation` is the rotation that makes the image upright; backends
/// normalize it before recognition. There is no retry contract: a failed
/// recognition is simply a lost frame.
pub trait Recognizer: Send {
    fn recognize(&mut self, image: &FrameImage, rotation: Rotation)
        -> Result<String, RecognizeError>;
}

impl Recognizer for Box<dyn Recognizer> {
    fn recognize(
        &mut self,
        image: &FrameImage,
        rotation: Rotation,
    ) -> Result<String, RecognizeError> {
        (**self).recognize(image, rotation)
    }
}
