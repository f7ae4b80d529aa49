//! Texture data decoded from pixel maps, ready for GPU upload.

use std::path::Path;

use anyhow::Context;

use crate::{error::AssetResult, ppm};

/// Texture data in CPU-friendly format before GPU upload.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureData {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Channel depth declared by the source. Parsed, not enforced.
    pub max_value: u32,
    pub format: TextureFormat,
}

/// Supported texture formats.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TextureFormat {
    Rgba8,
}

impl TextureData {
    /// Create a new texture with given dimensions and RGBA8 format.
    pub fn new_rgba8(width: u32, height: u32, data: Vec<u8>) -> Self {
        assert_eq!(
            data.len(),
            width as usize * height as usize * 4,
            "Data size doesn't match RGBA8 format"
        );
        Self {
            data,
            width,
            height,
            max_value: 255,
            format: TextureFormat::Rgba8,
        }
    }

    /// Expand tightly packed RGB triples to RGBA with opaque alpha.
    /// `rgb` must hold exactly `width * height` triples.
    pub fn from_rgb(width: u32, height: u32, max_value: u32, rgb: &[u8]) -> Self {
        let mut data = Vec::with_capacity(rgb.len() / 3 * 4);
        for px in rgb.chunks_exact(3) {
            data.extend_from_slice(px);
            data.push(255);
        }
        Self {
            max_value,
            ..Self::new_rgba8(width, height, data)
        }
    }

    /// Decode a `P3`/`P6` pixel map held in memory.
    pub fn from_ppm(raw: &[u8]) -> AssetResult<Self> {
        ppm::decode(raw)
    }

    /// Load texture from a `P3`/`P6` pixel-map file.
    pub fn load_ppm<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        log::info!("Loading texture from {:?}", path);

        let raw = std::fs::read(path)
            .with_context(|| format!("Failed to read pixel map {:?}", path))?;
        let texture = Self::from_ppm(&raw)
            .with_context(|| format!("Failed to decode pixel map {:?}", path))?;

        log::info!(
            "Loaded texture {}x{} with {} bytes",
            texture.width,
            texture.height,
            texture.data.len()
        );
        Ok(texture)
    }

    /// Write the RGBA buffer out as a PNG file.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        image::save_buffer(
            path,
            &self.data,
            self.width,
            self.height,
            image::ExtendedColorType::Rgba8,
        )
        .map_err(|e| anyhow::anyhow!("Failed to save image {:?}: {}", path, e))?;

        log::info!("Saved texture {}x{} to {:?}", self.width, self.height, path);
        Ok(())
    }

    /// Create a simple test texture (checkerboard pattern).
    pub fn create_test_texture(size: u32) -> Self {
        let mut data = Vec::with_capacity((size * size * 4) as usize);

        for y in 0..size {
            for x in 0..size {
                let checker = ((x / 8) + (y / 8)) % 2;
                if checker == 0 {
                    // White square
                    data.extend_from_slice(&[255, 255, 255, 255]);
                } else {
                    // Gray square
                    data.extend_from_slice(&[128, 128, 128, 255]);
                }
            }
        }

        Self::new_rgba8(size, size, data)
    }

    /// Get the number of bytes per pixel for the format.
    pub fn bytes_per_pixel(&self) -> u32 {
        match self.format {
            TextureFormat::Rgba8 => 4,
        }
    }

    /// Check if the texture data is valid.
    pub fn is_valid(&self) -> bool {
        let expected_size =
            self.width as usize * self.height as usize * self.bytes_per_pixel() as usize;
        self.data.len() == expected_size && self.width > 0 && self.height > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_is_expanded_with_opaque_alpha() {
        let tex = TextureData::from_rgb(2, 1, 255, &[1, 2, 3, 4, 5, 6]);
        assert_eq!(tex.data, vec![1, 2, 3, 255, 4, 5, 6, 255]);
        assert_eq!(tex.bytes_per_pixel(), 4);
    }

    #[test]
    fn test_texture_is_valid_checkerboard() {
        let tex = TextureData::create_test_texture(16);
        assert!(tex.is_valid());
        assert_eq!(&tex.data[..4], &[255, 255, 255, 255]);
        // Pixel (8, 0) falls in the next checker cell.
        assert_eq!(&tex.data[8 * 4..8 * 4 + 4], &[128, 128, 128, 255]);
    }

    #[test]
    fn empty_image_is_not_valid() {
        let tex = TextureData::from_rgb(0, 0, 255, &[]);
        assert!(!tex.is_valid());
    }
}
