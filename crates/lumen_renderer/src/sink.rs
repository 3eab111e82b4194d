//! Pixel sinks: where finished, gamma-corrected pixels go.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::{RenderError, RenderResult};

/// 8-bit RGB pixel.
pub type Rgb8 = [u8; 3];

/// Receiver for finished pixels.
///
/// Rows may arrive in any order when rendering in parallel; `y` is always
/// the output row with 0 at the top.
pub trait PixelSink {
    /// Store one pixel.
    fn put_pixel(&mut self, x: u32, y: u32, rgb: Rgb8) -> RenderResult<()>;

    /// Store a full row, leftmost pixel first.
    fn put_row(&mut self, y: u32, row: &[Rgb8]) -> RenderResult<()> {
        for (x, rgb) in row.iter().enumerate() {
            self.put_pixel(x as u32, y, *rgb)?;
        }
        Ok(())
    }
}

/// Simple in-memory image buffer for storing render output.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Rgb8>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0; 3]; width as usize * height as usize],
        }
    }

    fn index(&self, x: u32, y: u32) -> RenderResult<usize> {
        if x >= self.width || y >= self.height {
            return Err(RenderError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(y as usize * self.width as usize + x as usize)
    }

    /// Get the pixel at (x, y), or `None` outside the image.
    pub fn get(&self, x: u32, y: u32) -> Option<Rgb8> {
        let index = self.index(x, y).ok()?;
        Some(self.pixels[index])
    }

    /// Borrow one row of pixels, or `None` below the last row.
    pub fn row(&self, y: u32) -> Option<&[Rgb8]> {
        let start = self.index(0, y).ok()?;
        Some(&self.pixels[start..start + self.width as usize])
    }

    /// Convert to an `image` crate RGB image.
    pub fn to_rgb_image(&self) -> image::RgbImage {
        let bytes = self.pixels.iter().flatten().copied().collect();
        image::RgbImage::from_vec(self.width, self.height, bytes)
            .unwrap_or_else(|| image::RgbImage::new(self.width, self.height))
    }

    /// Write the image as plain-text PPM (P3).
    pub fn write_ppm<W: Write>(&self, writer: &mut W) -> RenderResult<()> {
        writeln!(writer, "P3")?;
        writeln!(writer, "{} {}", self.width, self.height)?;
        writeln!(writer, "255")?;

        for [r, g, b] in &self.pixels {
            writeln!(writer, "{r} {g} {b}")?;
        }

        Ok(())
    }

    /// Save to disk. `.ppm` is written as text PPM, anything else goes
    /// through the `image` crate and is picked by extension.
    pub fn save(&self, path: impl AsRef<Path>) -> RenderResult<()> {
        let path = path.as_ref();
        let is_ppm = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("ppm"));

        if is_ppm {
            let mut writer = BufWriter::new(File::create(path)?);
            self.write_ppm(&mut writer)?;
            writer.flush()?;
        } else {
            self.to_rgb_image().save(path)?;
        }

        log::info!("Saved {}x{} image to {}", self.width, self.height, path.display());
        Ok(())
    }
}

impl PixelSink for ImageBuffer {
    fn put_pixel(&mut self, x: u32, y: u32, rgb: Rgb8) -> RenderResult<()> {
        let index = self.index(x, y)?;
        self.pixels[index] = rgb;
        Ok(())
    }

    fn put_row(&mut self, y: u32, row: &[Rgb8]) -> RenderResult<()> {
        if row.len() != self.width as usize {
            return Err(RenderError::OutOfBounds {
                x: row.len() as u32,
                y,
                width: self.width,
                height: self.height,
            });
        }
        let start = self.index(0, y)?;
        self.pixels[start..start + row.len()].copy_from_slice(row);
        Ok(())
    }
}

impl PixelSink for image::RgbImage {
    fn put_pixel(&mut self, x: u32, y: u32, rgb: Rgb8) -> RenderResult<()> {
        if x >= self.width() || y >= self.height() {
            return Err(RenderError::OutOfBounds {
                x,
                y,
                width: self.width(),
                height: self.height(),
            });
        }
        image::RgbImage::put_pixel(self, x, y, image::Rgb(rgb));
        Ok(())
    }
}
