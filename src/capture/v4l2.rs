//! V4L2 camera backend (Linux).
//!
//! Opens the device, negotiates MJPEG at the requested mode, and runs a
//! capture thread that copies each mmap buffer out and decodes it to RGB8.
//! The copy means the kernel queue never stalls on a slow analyzer; the
//! keep-only-latest policy itself lives in [`crate::capture::FrameGate`].

use std::io::ErrorKind;
use std::path::PathBuf;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver};
use image::ImageFormat;
use tracing::{info, warn};
use v4l::buffer::Type;
use v4l::io::mmap::Stream as MmapStream;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::{Device, Format, FourCC};

use crate::capture::{CameraInfo, CameraSource, CaptureConfig, CaptureError, Frame, FrameImage};

const STREAM_BUFFERS: u32 = 4;

/// `Ok(None)` is a capture the backend could not decode; it still flows
/// downstream as an imageless frame so its release is accounted for.
type FrameResult = Result<Option<FrameImage>, CaptureError>;

pub struct V4l2Camera {
    config: CaptureConfig,
    receiver: Option<Receiver<FrameResult>>,
    thread_handle: Option<JoinHandle<()>>,
}

impl V4l2Camera {
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            receiver: None,
            thread_handle: None,
        }
    }

    fn open_device(&self) -> Result<Device, CaptureError> {
        let path = &self.config.device;
        let device = Device::with_path(path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => CaptureError::DeviceNotFound(path.display().to_string()),
            ErrorKind::PermissionDenied => {
                CaptureError::PermissionDenied(path.display().to_string())
            }
            _ => CaptureError::Backend(err.to_string()),
        })?;

        // Negotiate MJPEG at the requested mode. The device may adjust the
        // resolution; it must not change the pixel format.
        let requested = Format::new(self.config.width, self.config.height, FourCC::new(b"MJPG"));
        let actual = Capture::set_format(&device, &requested)
            .map_err(|err| CaptureError::Backend(err.to_string()))?;
        if actual.fourcc != FourCC::new(b"MJPG") {
            return Err(CaptureError::Backend(
                "MJPEG format not supported by device".to_string(),
            ));
        }

        let params = v4l::video::capture::Parameters::with_fps(self.config.max_fps);
        Capture::set_params(&device, &params)
            .map_err(|err| CaptureError::Backend(err.to_string()))?;

        info!(
            "opened {} at {}x{} ({} fps max)",
            self.config.device.display(),
            actual.width,
            actual.height,
            self.config.max_fps
        );
        Ok(device)
    }

    fn capture_loop(device: Device, tx: crossbeam_channel::Sender<FrameResult>) {
        let mut stream = match MmapStream::with_buffers(&device, Type::VideoCapture, STREAM_BUFFERS)
        {
            Ok(stream) => stream,
            Err(err) => {
                let _ = tx.send(Err(CaptureError::Backend(err.to_string())));
                return;
            }
        };

        loop {
            let result = match CaptureStream::next(&mut stream) {
                Ok((buffer, _meta)) => {
                    // The buffer is only valid until the next call; copy out.
                    match decode_mjpeg(buffer.to_vec()) {
                        Ok(image) => Ok(Some(image)),
                        Err(err) => {
                            warn!("{err}");
                            Ok(None)
                        }
                    }
                }
                Err(err) => {
                    // Stream errors are not recoverable from here; report and
                    // stop the thread.
                    let _ = tx.send(Err(CaptureError::Backend(err.to_string())));
                    break;
                }
            };

            // A full channel means the consumer lags; block until it drains.
            // A closed channel means the camera was stopped.
            if tx.send(result).is_err() {
                break;
            }
        }
    }
}

fn decode_mjpeg(buffer: Vec<u8>) -> Result<FrameImage, CaptureError> {
    let decoded = image::load_from_memory_with_format(&buffer, ImageFormat::Jpeg)
        .map_err(|err| CaptureError::Backend(format!("MJPEG decode failed: {err}")))?;
    let rgb = decoded.to_rgb8();
    let (width, height) = rgb.dimensions();
    Ok(FrameImage::new(rgb.into_raw(), width, height))
}

impl CameraSource for V4l2Camera {
    fn start(&mut self) -> Result<(), CaptureError> {
        if self.receiver.is_some() {
            return Ok(());
        }

        let device = self.open_device()?;
        let (tx, rx) = bounded(STREAM_BUFFERS as usize);
        let handle = thread::spawn(move || Self::capture_loop(device, tx));

        self.receiver = Some(rx);
        self.thread_handle = Some(handle);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), CaptureError> {
        // Dropping the receiver ends the capture thread at its next send.
        drop(self.receiver.take());
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Frame, CaptureError> {
        let receiver = self
            .receiver
            .as_ref()
            .ok_or_else(|| CaptureError::Backend("camera not started".to_string()))?;

        match receiver.recv() {
            Ok(Ok(Some(image))) => Ok(Frame::new(image, self.config.rotation)),
            Ok(Ok(None)) => Ok(Frame::without_image(self.config.rotation)),
            Ok(Err(err)) => Err(err),
            Err(_) => Err(CaptureError::Disconnected),
        }
    }
}

impl Drop for V4l2Camera {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Enumerate V4L2 capture devices.
pub fn enumerate() -> Vec<CameraInfo> {
    v4l::context::enum_devices()
        .into_iter()
        .map(|node| CameraInfo {
            index: node.index(),
            path: PathBuf::from(node.path()),
            name: node.name(),
        })
        .collect()
}
