// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Pristine image loading.
//!
//! This module decodes the untouched base raster of an exploded view and
//! checks it against the fixed canvas size. The original encoded bytes are
//! kept alongside the decoded pixels so they can be embedded unchanged in
//! every saved artifact.

use crate::error::EditorError;
use crate::util::geometry::{CANVAS_HEIGHT, CANVAS_WIDTH};
use image::RgbaImage;
use std::path::Path;

/// The original, unannotated raster that all edits are layered onto.
#[derive(Clone)]
pub struct PristineImage {
    /// Encoded bytes exactly as uploaded
    bytes: Vec<u8>,
    /// MIME type detected from the bytes
    mime: String,
    /// Decoded RGBA pixels for display
    pixels: RgbaImage,
}

impl std::fmt::Debug for PristineImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PristineImage")
            .field("mime", &self.mime)
            .field("bytes", &self.bytes.len())
            .field("width", &self.pixels.width())
            .field("height", &self.pixels.height())
            .finish()
    }
}

impl PartialEq for PristineImage {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl PristineImage {
    /// Decode `bytes` and require the exact canvas size.
    pub fn decode(bytes: Vec<u8>) -> Result<Self, EditorError> {
        let format = image::guess_format(&bytes)
            .map_err(|e| EditorError::ImageLoad(format!("unrecognised image data: {}", e)))?;
        let pixels = image::load_from_memory_with_format(&bytes, format)
            .map_err(|e| EditorError::ImageLoad(e.to_string()))?
            .to_rgba8();

        let (width, height) = pixels.dimensions();
        if width != CANVAS_WIDTH as u32 || height != CANVAS_HEIGHT as u32 {
            return Err(EditorError::DimensionMismatch { width, height });
        }

        Ok(Self {
            bytes,
            mime: format.to_mime_type().to_string(),
            pixels,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn size(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// Usual file extension for the encoded format.
    pub fn extension(&self) -> &'static str {
        image::ImageFormat::from_mime_type(&self.mime)
            .and_then(|format| format.extensions_str().first().copied())
            .unwrap_or("bin")
    }

    /// Write the untouched encoded bytes to disk.
    pub fn export(&self, path: &Path) -> anyhow::Result<()> {
        std::fs::write(path, &self.bytes)?;
        Ok(())
    }
}

/// Read an image file from disk for a fresh editing session.
pub fn read_image_file(path: &Path) -> Result<Vec<u8>, EditorError> {
    std::fs::read(path).map_err(|e| EditorError::ImageLoad(format!("{}: {}", path.display(), e)))
}

/// Encode a solid-colour PNG, used to build fixtures.
#[cfg(test)]
pub fn solid_png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let image = RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut buffer = std::io::Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, image::ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}
