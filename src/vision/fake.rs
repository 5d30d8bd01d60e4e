//! Scripted recognizer for demos and tests.

use crate::capture::{FrameImage, Rotation};
use crate::vision::{RecognizeError, Recognizer};

/// One scripted recognition outcome.
#[derive(Debug, Clone)]
pub enum ScriptStep {
    /// Successful recognition, possibly with empty text
    Text(String),
    /// Failed recognition
    Fail(String),
}

impl ScriptStep {
    pub fn text(text: &str) -> Self {
        ScriptStep::Text(text.to_string())
    }

    pub fn fail(message: &str) -> Self {
        ScriptStep::Fail(message.to_string())
    }
}

/// Replays a fixed script of outcomes, one per `recognize` call.
///
/// With `cycling`, the script repeats forever; otherwise the last step
/// repeats once the script is exhausted.
pub struct FakeRecognizer {
    script: Vec<ScriptStep>,
    cursor: usize,
    cycle: bool,
    calls: usize,
}

impl FakeRecognizer {
    pub fn with_script(script: Vec<ScriptStep>) -> Self {
        Self {
            script,
            cursor: 0,
            cycle: false,
            calls: 0,
        }
    }

    /// A recognizer that cycles through the given phrases forever.
    pub fn cycling(phrases: &[&str]) -> Self {
        let script = phrases.iter().map(|p| ScriptStep::text(p)).collect();
        Self {
            script,
            cursor: 0,
            cycle: true,
            calls: 0,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl Recognizer for FakeRecognizer {
    fn recognize(
        &mut self,
        _image: &FrameImage,
        _rotation: Rotation,
    ) -> Result<String, RecognizeError> {
        self.calls += 1;

        let step = if self.script.is_empty() {
            return Ok(String::new());
        } else if self.cursor < self.script.len() {
            let step = self.script[self.cursor].clone();
            self.cursor += 1;
            if self.cycle && self.cursor == self.script.len() {
                self.cursor = 0;
            }
            step
        } else {
            // Script exhausted: repeat the last step.
            self.script[self.script.len() - 1].clone()
        };

        match step {
            ScriptStep::Text(text) => Ok(text),
            ScriptStep::Fail(message) => Err(RecognizeError::Backend(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_image() -> FrameImage {
        FrameImage::new(vec![0u8; 12], 2, 2)
    }

    #[test]
    fn test_script_replays_in_order() {
        let mut recognizer = FakeRecognizer::with_script(vec![
            ScriptStep::text("Stop"),
            ScriptStep::text(""),
            ScriptStep::fail("blurred"),
        ]);
        let image = test_image();

        assert_eq!(
            recognizer.recognize(&image, Rotation::Deg0).unwrap(),
            "Stop"
        );
        assert_eq!(recognizer.recognize(&image, Rotation::Deg0).unwrap(), "");
        assert!(recognizer.recognize(&image, Rotation::Deg0).is_err());
        assert_eq!(recognizer.calls(), 3);
    }

    #[test]
    fn test_exhausted_script_repeats_last_step() {
        let mut recognizer = FakeRecognizer::with_script(vec![ScriptStep::text("Exit")]);
        let image = test_image();

        for _ in 0..3 {
            assert_eq!(
                recognizer.recognize(&image, Rotation::Deg0).unwrap(),
                "Exit"
            );
        }
    }

    #[test]
    fn test_cycling_wraps_around() {
        let mut recognizer = FakeRecognizer::cycling(&["a", "b"]);
        let image = test_image();

        let outputs: Vec<String> = (0..5)
            .map(|_| recognizer.recognize(&image, Rotation::Deg0).unwrap())
            .collect();
        assert_eq!(outputs, ["a", "b", "a", "b", "a"]);
    }
}
