// Background module
// The three surfaces the window paints: plain, hover tint and pressed tint

use crate::image_loader::{self, LoadError};
use image::imageops::{self, FilterType};
use image::{DynamicImage, Pixel, Rgba, RgbaImage};
use log::{debug, info};
use std::path::Path;

/// Translucent cyan laid over the background while the pointer hovers
pub const HOVER_TINT: Rgba<u8> = Rgba([61, 215, 232, 75]);

/// Translucent blue laid over the background while the button is held
pub const PRESSED_TINT: Rgba<u8> = Rgba([36, 16, 218, 75]);

/// Which of the three surfaces is current
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tint {
    #[default]
    Plain,
    Hover,
    Pressed,
}

impl Tint {
    pub const ALL: [Tint; 3] = [Tint::Plain, Tint::Hover, Tint::Pressed];
}

pub struct Backgrounds {
    plain: RgbaImage,
    hover: RgbaImage,
    pressed: RgbaImage,
    /// Bumped whenever the surfaces are regenerated
    generation: u64,
}

impl Backgrounds {
    /// Derive all three surfaces from `source`, resized to the client size
    pub fn new(source: &DynamicImage, width: u32, height: u32) -> Self {
        let plain = imageops::resize(&source.to_rgba8(), width, height, FilterType::Lanczos3);
        let hover = tinted(&plain, HOVER_TINT);
        let pressed = tinted(&plain, PRESSED_TINT);
        debug!("Built background surfaces at {}x{}", width, height);
        Self {
            plain,
            hover,
            pressed,
            generation: 0,
        }
    }

    pub fn surface(&self, tint: Tint) -> &RgbaImage {
        match tint {
            Tint::Plain => &self.plain,
            Tint::Hover => &self.hover,
            Tint::Pressed => &self.pressed,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.plain.dimensions()
    }

    /// Swap in a new source image read from `path`.
    ///
    /// The file is decoded before anything is touched, so a failure leaves
    /// every surface exactly as it was.
    pub fn replace_from_path(&mut self, path: &Path) -> Result<(), LoadError> {
        let source = image_loader::load_from_path(path)?;
        let (width, height) = self.dimensions();
        let generation = self.generation + 1;
        *self = Self::new(&source, width, height);
        self.generation = generation;
        info!("Background replaced from {}", path.display());
        Ok(())
    }
}

/// Copy `base` with `tint` composited source-over on every pixel
fn tinted(base: &RgbaImage, tint: Rgba<u8>) -> RgbaImage {
    let mut out = base.clone();
    for pixel in out.pixels_mut() {
        pixel.blend(&tint);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn solid(color: [u8; 4]) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba(color)))
    }

    fn temp_file(name: &str, contents: &[u8]) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("rbounce-{}-{}", std::process::id(), name));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents).unwrap();
        path
    }

    #[test]
    fn test_surfaces_match_client_size() {
        let backgrounds = Backgrounds::new(&solid([10, 20, 30, 255]), 246, 200);
        for tint in Tint::ALL {
            assert_eq!(backgrounds.surface(tint).dimensions(), (246, 200));
        }
    }

    #[test]
    fn test_tints_shift_colour_towards_overlay() {
        let backgrounds = Backgrounds::new(&solid([0, 0, 0, 255]), 4, 4);
        let plain = backgrounds.surface(Tint::Plain).get_pixel(1, 1);
        let hover = backgrounds.surface(Tint::Hover).get_pixel(1, 1);
        let pressed = backgrounds.surface(Tint::Pressed).get_pixel(1, 1);

        assert_eq!(*plain, Rgba([0, 0, 0, 255]));
        // Hover is cyan-ish: green and blue lifted well above red
        assert!(hover[1] > hover[0] && hover[2] > hover[0]);
        // Pressed is blue-ish
        assert!(pressed[2] > pressed[0] && pressed[2] > pressed[1]);
        assert_eq!(hover[3], 255);
        assert_eq!(pressed[3], 255);
    }

    #[test]
    fn test_unsupported_file_leaves_surfaces_untouched() {
        let mut backgrounds = Backgrounds::new(&solid([90, 80, 70, 255]), 16, 12);
        let before: Vec<RgbaImage> = Tint::ALL
            .iter()
            .map(|t| backgrounds.surface(*t).clone())
            .collect();

        let path = temp_file("not-an-image.txt", b"hello, not pixels");
        let result = backgrounds.replace_from_path(&path);
        let _ = std::fs::remove_file(&path);

        assert!(matches!(result, Err(LoadError::Unsupported(_))));
        for (tint, old) in Tint::ALL.iter().zip(before.iter()) {
            assert_eq!(backgrounds.surface(*tint), old);
        }
        assert_eq!(backgrounds.generation(), 0);
    }

    #[test]
    fn test_replacement_rebuilds_at_same_size() {
        let mut backgrounds = Backgrounds::new(&solid([0, 0, 0, 255]), 16, 12);

        let mut png = std::io::Cursor::new(Vec::new());
        solid([255, 255, 255, 255])
            .write_to(&mut png, image::ImageFormat::Png)
            .unwrap();
        let path = temp_file("white.png", png.get_ref());
        let result = backgrounds.replace_from_path(&path);
        let _ = std::fs::remove_file(&path);

        assert!(result.is_ok());
        assert_eq!(backgrounds.generation(), 1);
        assert_eq!(backgrounds.dimensions(), (16, 12));
        let pixel = backgrounds.surface(Tint::Plain).get_pixel(5, 5);
        assert!(pixel[0] >= 250 && pixel[1] >= 250 && pixel[2] >= 250);
    }
}
