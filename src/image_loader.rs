// Image loading module
// Decodes background source images from files, piped bytes, or the built-in default

use crate::cli::ParsedArgs;
use anyhow::{Context, Result};
use image::{DynamicImage, Rgba, RgbaImage};
use std::fs;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure to turn a file into a background image
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read image file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("image type not supported: {0}")]
    Unsupported(#[from] image::ImageError),
}

/// Resolve the initial background source from the parsed arguments
pub fn load_source(args: &ParsedArgs) -> Result<DynamicImage> {
    if let Some(ref data) = args.image_data {
        // Load from raw bytes (stdin)
        load_from_bytes(data).context("Failed to decode image from stdin")
    } else if let Some(ref path) = args.image_path {
        load_from_path(path)
            .with_context(|| format!("Failed to load background image: {}", path.display()))
    } else {
        Ok(default_background(args.width, args.height))
    }
}

/// Read and decode an image file, detecting the format from its contents
pub fn load_from_path(path: &Path) -> Result<DynamicImage, LoadError> {
    let data = fs::read(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_bytes(&data)
}

/// Load an image from raw bytes, auto-detecting the format
pub fn load_from_bytes(data: &[u8]) -> Result<DynamicImage, LoadError> {
    let format = image::guess_format(data)?;
    let img = image::load(Cursor::new(data), format)?;
    Ok(img)
}

/// Built-in background: a diagonal teal-to-indigo gradient with a soft grid
pub fn default_background(width: u32, height: u32) -> DynamicImage {
    let width = width.max(1);
    let height = height.max(1);
    let span = (width + height) as f32;

    let img = RgbaImage::from_fn(width, height, |x, y| {
        let t = (x + y) as f32 / span;
        let lerp = |a: f32, b: f32| (a + (b - a) * t) as u8;
        let grid = if x % 24 == 0 || y % 24 == 0 { 18 } else { 0 };
        Rgba([
            lerp(32.0, 74.0).saturating_add(grid),
            lerp(178.0, 54.0).saturating_add(grid),
            lerp(170.0, 160.0).saturating_add(grid),
            255,
        ])
    });
    DynamicImage::ImageRgba8(img)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes() -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(3, 2, Rgba([1, 2, 3, 255])));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_load_png_bytes() {
        let img = load_from_bytes(&png_bytes()).unwrap();
        assert_eq!((img.width(), img.height()), (3, 2));
    }

    #[test]
    fn test_garbage_is_unsupported() {
        let err = load_from_bytes(b"definitely not an image").unwrap_err();
        assert!(matches!(err, LoadError::Unsupported(_)));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = load_from_path(Path::new("/nonexistent/rbounce/background.png")).unwrap_err();
        assert!(matches!(err, LoadError::Read { .. }));
    }

    #[test]
    fn test_default_background_size_and_opacity() {
        let img = default_background(246, 200).to_rgba8();
        assert_eq!(img.dimensions(), (246, 200));
        assert!(img.pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn test_default_background_never_empty() {
        let img = default_background(0, 0);
        assert_eq!((img.width(), img.height()), (1, 1));
    }
}
