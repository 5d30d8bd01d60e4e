//! Frame Analysis Loop
//!
//! The one piece of real control flow in the crate. For each frame delivered
//! through the gate: validate it carries an image, run recognition, publish
//! non-empty text to the display state. The frame is released exactly once on
//! every path because release rides on `Drop`.
//!
//! Failures never escape this layer. A failed or empty recognition leaves the
//! display untouched; with a continuous frame stream, a lost frame is normal
//! operation, not an error the user should see.

use tracing::debug;

use crate::capture::{Frame, FrameGate};
use crate::shared::DisplayState;
use crate::vision::Recognizer;

pub struct FrameAnalyzer<R: Recognizer> {
    recognizer: R,
    display: DisplayState,
    min_text_len: usize,
}

impl<R: Recognizer> FrameAnalyzer<R> {
    pub fn new(recognizer: R, display: DisplayState) -> Self {
        Self {
            recognizer,
            display,
            min_text_len: 1,
        }
    }

    /// Require at least `len` characters before a result is published.
    /// The default of 1 publishes any non-empty text.
    pub fn with_min_text_len(mut self, len: usize) -> Self {
        self.min_text_len = len.max(1);
        self
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    /// Run one analysis cycle. The frame is consumed and released when the
    /// cycle ends, whatever the outcome.
    pub fn analyze(&mut self, frame: Frame) {
        let Some(image) = frame.image() else {
            debug!("frame carried no image, skipping");
            return;
        };

        match self.recognizer.recognize(image, frame.rotation()) {
            Ok(text) if self.accepts(&text) => {
                debug!(len = text.len(), "recognized text");
                self.display.publish(text);
            }
            Ok(_) => {
                // Empty result: keep the last recognized text on screen.
            }
            Err(err) => {
                debug!("recognition failed: {err}");
            }
        }
    }

    fn accepts(&self, text: &str) -> bool {
        !text.is_empty() && text.chars().count() >= self.min_text_len
    }

    /// Drain the gate until it closes.
    pub fn run(&mut self, gate: &FrameGate) {
        while let Some(frame) = gate.take() {
            self.analyze(frame);
        }
        debug!("frame gate closed, analyzer done");
    }
}
