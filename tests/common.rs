#![allow(dead_code)]

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use squeeze_compare::{
    CompressionError, CompressionSettings, EncodeRequest, EncodedImage, Encoder, Result,
    SourceImage,
};
use std::collections::VecDeque;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;

#[derive(Debug, Clone, Copy)]
pub enum Outcome {
    /// `len` bytes, every byte set to `fill`
    Bytes { len: usize, fill: u8 },
    Fail,
}

/// Test encoder that sleeps for `delay` (tokio time, so paused clocks work)
/// and then plays back its scripted outcomes; the last one repeats.
pub struct ScriptedEncoder {
    delay: Duration,
    outcomes: Mutex<VecDeque<Outcome>>,
    calls: AtomicUsize,
}

impl ScriptedEncoder {
    pub fn new(outcomes: impl IntoIterator<Item = Outcome>) -> Self {
        Self {
            delay: Duration::ZERO,
            outcomes: Mutex::new(outcomes.into_iter().collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn ok(len: usize) -> Self {
        Self::new([Outcome::Bytes { len, fill: 0xAB }])
    }

    pub fn failing() -> Self {
        Self::new([Outcome::Fail])
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_outcome(&self) -> Outcome {
        let mut outcomes = self.outcomes.lock().unwrap();
        if outcomes.len() > 1 {
            outcomes.pop_front().unwrap()
        } else {
            *outcomes.front().expect("scripted encoder needs an outcome")
        }
    }
}

#[async_trait]
impl Encoder for ScriptedEncoder {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn encode(&self, request: EncodeRequest) -> Result<EncodedImage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let outcome = self.next_outcome();
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match outcome {
            Outcome::Bytes { len, fill } => Ok(EncodedImage {
                bytes: vec![fill; len],
                format: request.settings.output_type,
            }),
            Outcome::Fail => Err(CompressionError::EncoderTask("scripted failure".to_string())),
        }
    }
}

pub fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

pub fn settings() -> CompressionSettings {
    CompressionSettings::default()
}

/// A source of `size` zero bytes; only the attributes matter to scripted encoders.
pub fn sized_source(size: usize) -> SourceImage {
    SourceImage::from_parts(vec![0u8; size], "image/png", 1920, 1080).unwrap()
}

pub fn gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 3 % 256) as u8, (y * 5 % 256) as u8, ((x + y) % 256) as u8])
    }))
}

pub fn encoded_bytes(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
    buf
}

pub fn write_test_image(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    let format = ImageFormat::from_path(&path).unwrap();
    std::fs::write(&path, encoded_bytes(&gradient(width, height), format)).unwrap();
    path
}

pub fn create_temp_directory() -> TempDir {
    TempDir::new().unwrap()
}
