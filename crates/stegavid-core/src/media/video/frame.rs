use image::{Rgb, RgbImage};

use crate::error::StegError;
use crate::result::Result;

/// channels of a decoded frame, blue green red
pub const BGR_CHANNELS: usize = 3;

/// One decoded video frame, 8 bit BGR interleaved in row major order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        if data.len() != Self::byte_len(width, height) {
            return Err(StegError::CarrierUnreadable(format!(
                "frame of {width}x{height} needs {} bytes, got {}",
                Self::byte_len(width, height),
                data.len()
            )));
        }

        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; Self::byte_len(width, height)],
        }
    }

    pub fn byte_len(width: u32, height: u32) -> usize {
        width as usize * height as usize * BGR_CHANNELS
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn samples(&self) -> &[u8] {
        &self.data
    }

    pub fn samples_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_samples(self) -> Vec<u8> {
        self.data
    }

    pub fn from_rgb_image(image: &RgbImage) -> Self {
        let mut data = Vec::with_capacity(Self::byte_len(image.width(), image.height()));
        for Rgb([r, g, b]) in image.pixels() {
            data.extend_from_slice(&[*b, *g, *r]);
        }

        Self {
            width: image.width(),
            height: image.height(),
            data,
        }
    }

    pub fn to_rgb_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width, self.height, |x, y| {
            let i = (y as usize * self.width as usize + x as usize) * BGR_CHANNELS;
            Rgb([self.data[i + 2], self.data[i + 1], self.data[i]])
        })
    }
}

/// What the embedders and the capacity math need to know about a video carrier
#[derive(Debug, Clone, PartialEq)]
pub struct VideoGeometry {
    pub frame_count: usize,
    pub width: u32,
    pub height: u32,
    pub channels: usize,
    pub fps: f64,
    pub has_audio: bool,
}

impl VideoGeometry {
    pub fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize * self.channels
    }

    pub fn validate(&self) -> Result<()> {
        if self.frame_count == 0 || self.width == 0 || self.height == 0 || self.channels == 0 {
            return Err(StegError::CarrierUnreadable(format!(
                "video geometry {}x{}x{} with {} frames is empty",
                self.width, self.height, self.channels, self.frame_count
            )));
        }
        if !(self.fps.is_finite() && self.fps > 0.0) {
            return Err(StegError::CarrierUnreadable(format!(
                "video frame rate {} is invalid",
                self.fps
            )));
        }

        Ok(())
    }
}
