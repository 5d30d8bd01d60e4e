//! Frame data structures for captured camera content

use std::fmt;
use std::time::Instant;

/// Clockwise rotation that must be applied to a frame's pixels to make them
/// upright, as reported by the capture backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Map a degree value to a rotation. Only the four right angles are valid.
    pub fn from_degrees(degrees: u32) -> Option<Self> {
        match degrees % 360 {
            0 => Some(Rotation::Deg0),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }

    pub fn degrees(self) -> u32 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }
}

/// Decoded RGB8 pixels of one captured frame.
#[derive(Debug, Clone)]
pub struct FrameImage {
    /// Raw RGB pixel data, row-major, 3 bytes per pixel
    pub data: Vec<u8>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
}

impl FrameImage {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
        }
    }

    /// Get frame dimensions as (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Runs every registered hook exactly once, when dropped.
///
/// This is the release guarantee for a [`Frame`]: whatever path an analysis
/// cycle takes, dropping the frame runs its hooks, and the hooks cannot run
/// twice because `drain` empties them.
#[derive(Default)]
pub struct ReleaseHandle {
    hooks: Vec<Box<dyn FnOnce() + Send>>,
}

impl ReleaseHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook to run when the handle is dropped.
    pub fn on_release(&mut self, hook: impl FnOnce() + Send + 'static) {
        self.hooks.push(Box::new(hook));
    }
}

impl Drop for ReleaseHandle {
    fn drop(&mut self) {
        for hook in self.hooks.drain(..) {
            hook();
        }
    }
}

impl fmt::Debug for ReleaseHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReleaseHandle")
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

/// One captured camera frame plus its rotation metadata.
///
/// A frame is owned by whoever holds it and is released exactly once, when it
/// is dropped. A frame may carry no image at all, which models a capture the
/// backend could not decode; such frames are still released normally.
#[derive(Debug)]
pub struct Frame {
    image: Option<FrameImage>,
    rotation: Rotation,
    captured_at: Instant,
    release: ReleaseHandle,
}

impl Frame {
    pub fn new(image: FrameImage, rotation: Rotation) -> Self {
        Self {
            image: Some(image),
            rotation,
            captured_at: Instant::now(),
            release: ReleaseHandle::new(),
        }
    }

    /// A frame whose image could not be decoded.
    pub fn without_image(rotation: Rotation) -> Self {
        Self {
            image: None,
            rotation,
            captured_at: Instant::now(),
            release: ReleaseHandle::new(),
        }
    }

    pub fn image(&self) -> Option<&FrameImage> {
        self.image.as_ref()
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn captured_at(&self) -> Instant {
        self.captured_at
    }

    /// Register a hook to run when this frame is released.
    pub fn on_release(&mut self, hook: impl FnOnce() + Send + 'static) {
        self.release.on_release(hook);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn test_image() -> FrameImage {
        FrameImage::new(vec![0u8; 12], 2, 2)
    }

    #[test]
    fn test_release_hook_runs_exactly_once_on_drop() {
        let released = Arc::new(AtomicUsize::new(0));
        let mut frame = Frame::new(test_image(), Rotation::Deg0);
        let counter = released.clone();
        frame.on_release(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(released.load(Ordering::SeqCst), 0);
        drop(frame);
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_all_hooks_run() {
        let released = Arc::new(AtomicUsize::new(0));
        let mut frame = Frame::without_image(Rotation::Deg90);
        for _ in 0..3 {
            let counter = released.clone();
            frame.on_release(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }

        drop(frame);
        assert_eq!(released.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_frame_without_image_has_no_image() {
        let frame = Frame::without_image(Rotation::Deg180);
        assert!(frame.image().is_none());
        assert_eq!(frame.rotation(), Rotation::Deg180);
    }

    #[test]
    fn test_frame_keeps_image_and_rotation() {
        let frame = Frame::new(test_image(), Rotation::Deg270);
        let image = frame.image().unwrap();
        assert_eq!(image.dimensions(), (2, 2));
        assert_eq!(frame.rotation().degrees(), 270);
    }

    #[test]
    fn test_rotation_from_degrees() {
        assert_eq!(Rotation::from_degrees(0), Some(Rotation::Deg0));
        assert_eq!(Rotation::from_degrees(90), Some(Rotation::Deg90));
        assert_eq!(Rotation::from_degrees(450), Some(Rotation::Deg90));
        assert_eq!(Rotation::from_degrees(45), None);
    }
}
