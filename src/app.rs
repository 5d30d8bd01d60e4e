//! Application Coordinator
//!
//! Wires the camera, gate, analyzer, and display state together and manages
//! the worker threads' lifecycle.

use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{info, warn};

use crate::analyzer::FrameAnalyzer;
use crate::capture::{CameraPermission, CameraSource, CaptureError, FrameGate};
use crate::shared::DisplayState;
use crate::vision::Recognizer;

/// Main application coordinator
pub struct SmartLensApp {
    display: DisplayState,
    gate: FrameGate,
    stop: Arc<AtomicBool>,
    capture_handle: Option<JoinHandle<()>>,
    analyzer_handle: Option<JoinHandle<()>>,
}

impl SmartLensApp {
    pub fn new() -> Self {
        Self {
            display: DisplayState::new(),
            gate: FrameGate::new(),
            stop: Arc::new(AtomicBool::new(false)),
            capture_handle: None,
            analyzer_handle: None,
        }
    }

    /// The shared display state, for the overlay and for subscribers.
    pub fn display(&self) -> DisplayState {
        self.display.clone()
    }

    /// Start the capture and analysis threads.
    ///
    /// Without camera authorization this is a no-op: no frames are ever
    /// produced and the overlay simply never shows text.
    pub fn start(
        &mut self,
        mut camera: Box<dyn CameraSource>,
        recognizer: Box<dyn Recognizer>,
        permission: CameraPermission,
        min_text_len: usize,
    ) -> Result<()> {
        if !permission.is_authorized() {
            info!("camera permission not granted yet; not starting capture");
            return Ok(());
        }
        if self.capture_handle.is_some() {
            return Ok(()); // Already running
        }

        camera.start()?;

        // Capture thread: camera -> gate, never blocked by analysis.
        let gate = self.gate.clone();
        let stop = self.stop.clone();
        let capture_handle = std::thread::spawn(move || {
            info!("capture thread starting");
            while !stop.load(Ordering::Relaxed) {
                match camera.next_frame() {
                    Ok(frame) => gate.offer(frame),
                    Err(CaptureError::Disconnected) => {
                        warn!("camera disconnected");
                        break;
                    }
                    Err(err) => {
                        // Transient capture errors lose one frame, nothing
                        // else.
                        warn!("frame capture failed: {err}");
                    }
                }
            }
            let _ = camera.stop();
            info!("capture thread exiting");
        });

        // Analyzer thread: gate -> recognizer -> display.
        let gate = self.gate.clone();
        let display = self.display.clone();
        let analyzer_handle = std::thread::spawn(move || {
            info!("analyzer thread starting");
            let mut analyzer =
                FrameAnalyzer::new(recognizer, display).with_min_text_len(min_text_len);
            analyzer.run(&gate);
            info!("analyzer thread exiting");
        });

        // Trace each detection. Detached: it parks on the subscription and
        // dies with the process.
        let detections = self.display.subscribe();
        std::thread::spawn(move || {
            for text in detections.iter() {
                info!("detected text: {text}");
            }
        });

        self.capture_handle = Some(capture_handle);
        self.analyzer_handle = Some(analyzer_handle);
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.capture_handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Stop capture, drain the gate, and join the workers.
    pub fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.capture_handle.take() {
            let _ = handle.join();
        }
        self.gate.close();
        if let Some(handle) = self.analyzer_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Default for SmartLensApp {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SmartLensApp {
    fn drop(&mut self) {
        self.shutdown();
    }
}
