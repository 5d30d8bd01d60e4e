//! Synthetic camera for demos and tests. Produces paced gradient frames
//! without touching any hardware.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use image::{Rgb, RgbImage};

use crate::capture::{CameraSource, CaptureConfig, CaptureError, Frame, FrameImage};

pub struct FakeCamera {
    config: CaptureConfig,
    running: bool,
    /// Every nth frame is produced without an image, 0 disables
    missing_image_every: usize,
    frames_produced: usize,
    frames_released: Arc<AtomicUsize>,
    last_frame_at: Option<Instant>,
}

impl FakeCamera {
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            running: false,
            missing_image_every: 0,
            frames_produced: 0,
            frames_released: Arc::new(AtomicUsize::new(0)),
            last_frame_at: None,
        }
    }

    /// Make every `n`th frame carry no image, exercising the undecodable
    /// capture path.
    pub fn with_missing_image_every(mut self, n: usize) -> Self {
        self.missing_image_every = n;
        self
    }

    /// Counter shared with every produced frame's release hook.
    pub fn released_counter(&self) -> Arc<AtomicUsize> {
        self.frames_released.clone()
    }

    fn synth_image(&self) -> FrameImage {
        let (width, height) = (self.config.width, self.config.height);
        let seed = (self.frames_produced % 255) as u8;
        let image = RgbImage::from_fn(width, height, |x, y| {
            Rgb([seed, (x % 256) as u8, (y % 256) as u8])
        });
        FrameImage::new(image.into_raw(), width, height)
    }
}

impl CameraSource for FakeCamera {
    fn start(&mut self) -> Result<(), CaptureError> {
        self.running = true;
        self.last_frame_at = None;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), CaptureError> {
        self.running = false;
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Frame, CaptureError> {
        if !self.running {
            return Err(CaptureError::Disconnected);
        }

        // Pace to the configured frame rate.
        let interval = Duration::from_secs(1) / self.config.max_fps.max(1);
        if let Some(last) = self.last_frame_at {
            let elapsed = last.elapsed();
            if elapsed < interval {
                std::thread::sleep(interval - elapsed);
            }
        }
        self.last_frame_at = Some(Instant::now());
        self.frames_produced += 1;

        let missing = self.missing_image_every != 0
            && self.frames_produced % self.missing_image_every == 0;
        let mut frame = if missing {
            Frame::without_image(self.config.rotation)
        } else {
            Frame::new(self.synth_image(), self.config.rotation)
        };

        let released = self.frames_released.clone();
        frame.on_release(move || {
            released.fetch_add(1, Ordering::SeqCst);
        });
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_config() -> CaptureConfig {
        CaptureConfig {
            max_fps: 1000,
            width: 8,
            height: 8,
            ..CaptureConfig::default()
        }
    }

    #[test]
    fn test_requires_start() {
        let mut camera = FakeCamera::new(fast_config());
        assert!(matches!(
            camera.next_frame(),
            Err(CaptureError::Disconnected)
        ));
    }

    #[test]
    fn test_produces_frames_with_images() {
        let mut camera = FakeCamera::new(fast_config());
        camera.start().unwrap();

        let frame = camera.next_frame().unwrap();
        let image = frame.image().unwrap();
        assert_eq!(image.dimensions(), (8, 8));
        assert_eq!(image.data.len(), 8 * 8 * 3);
    }

    #[test]
    fn test_missing_image_cadence() {
        let mut camera = FakeCamera::new(fast_config()).with_missing_image_every(3);
        camera.start().unwrap();

        let mut missing = 0;
        for _ in 0..6 {
            if camera.next_frame().unwrap().image().is_none() {
                missing += 1;
            }
        }
        assert_eq!(missing, 2);
    }

    #[test]
    fn test_release_counter_tracks_dropped_frames() {
        let mut camera = FakeCamera::new(fast_config());
        let released = camera.released_counter();
        camera.start().unwrap();

        for _ in 0..4 {
            drop(camera.next_frame().unwrap());
        }
        assert_eq!(released.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_stop_ends_the_stream() {
        let mut camera = FakeCamera::new(fast_config());
        camera.start().unwrap();
        camera.next_frame().unwrap();
        camera.stop().unwrap();
        assert!(matches!(
            camera.next_frame(),
            Err(CaptureError::Disconnected)
        ));
    }
}
