//! Texture loading.

use std::path::Path;

use tracing::info;

use crate::error::{AssetError, AssetResult};

/// Decoded image, always RGBA8.
#[derive(Clone, Debug)]
pub struct TextureData {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl TextureData {
    /// Size of the pixel data in bytes (width * height * 4).
    #[inline]
    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }
}

/// Loads a PNG file and converts it to RGBA8.
pub fn load_png(path: &Path) -> AssetResult<TextureData> {
    if !path.exists() {
        return Err(AssetError::FileNotFound(path.to_path_buf()));
    }

    let image = image::open(path)?.to_rgba8();
    let (width, height) = image.dimensions();

    info!("Loaded texture '{}': {}x{}", path.display(), width, height);

    Ok(TextureData {
        pixels: image.into_raw(),
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_reported() {
        let result = load_png(Path::new("does_not_exist.png"));
        assert!(matches!(result, Err(AssetError::FileNotFound(_))));
    }

    #[test]
    fn byte_size_is_pixel_count_times_four() {
        let texture = TextureData {
            pixels: vec![0; 16 * 16 * 4],
            width: 16,
            height: 16,
        };
        assert_eq!(texture.byte_size(), 1024);
    }
}
