//! Output document assembly: one captured image per PDF page.
//!
//! Pages are A4 landscape. Each image is scaled to fit a 277 x 190 mm box
//! (keeping its aspect ratio) and centered on the page.

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbaImage};
use oxidize_pdf::{Document, Image, Page};
use std::path::Path;

const MM_TO_PT: f64 = 72.0 / 25.4;

pub const PAGE_WIDTH_MM: f64 = 297.0;
pub const PAGE_HEIGHT_MM: f64 = 210.0;
pub const IMAGE_BOX_WIDTH_MM: f64 = 277.0;
pub const IMAGE_BOX_HEIGHT_MM: f64 = 190.0;

/// Name the image is registered under in each page's resources.
const PAGE_IMAGE_NAME: &str = "Im1";

/// Where an image lands on the page, in PDF points (origin bottom-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Fits an image of `width_px` x `height_px` into the image box, centered.
///
/// The image first takes the full box width; if that makes it too tall,
/// the height is clamped and the width follows the aspect ratio.
pub fn fit_centered(width_px: u32, height_px: u32) -> Placement {
    let aspect_ratio = height_px.max(1) as f64 / width_px.max(1) as f64;

    let mut width_mm = IMAGE_BOX_WIDTH_MM;
    let mut height_mm = width_mm * aspect_ratio;
    if height_mm > IMAGE_BOX_HEIGHT_MM {
        height_mm = IMAGE_BOX_HEIGHT_MM;
        width_mm = height_mm / aspect_ratio;
    }

    let x_mm = (PAGE_WIDTH_MM - width_mm) / 2.0;
    let y_mm = (PAGE_HEIGHT_MM - height_mm) / 2.0;

    Placement {
        x: x_mm * MM_TO_PT,
        y: y_mm * MM_TO_PT,
        width: width_mm * MM_TO_PT,
        height: height_mm * MM_TO_PT,
    }
}

/// JPEG-encodes a captured region. Alpha is dropped.
pub fn encode_page_image(image: &RgbaImage, quality: u8) -> Result<Vec<u8>, DocumentError> {
    let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100)).encode_image(&rgb)?;
    Ok(bytes)
}

/// In-progress multi-page output document.
pub struct PageDocument {
    inner: Document,
}

impl PageDocument {
    pub fn new(title: &str) -> Self {
        let mut inner = Document::new();
        inner.set_title(title);
        inner.set_creator("Page Snap");
        Self { inner }
    }

    /// Appends one page holding the JPEG image stored at `path`.
    pub fn append_image_file(&mut self, path: &Path) -> Result<(), DocumentError> {
        let image = Image::from_jpeg_file(path)?;
        let placement = fit_centered(image.width(), image.height());

        let mut page = Page::new(PAGE_WIDTH_MM * MM_TO_PT, PAGE_HEIGHT_MM * MM_TO_PT);
        page.add_image(PAGE_IMAGE_NAME, image);
        page.draw_image(
            PAGE_IMAGE_NAME,
            placement.x,
            placement.y,
            placement.width,
            placement.height,
        )?;

        self.inner.add_page(page);
        Ok(())
    }

    pub fn page_count(&self) -> usize {
        self.inner.page_count()
    }

    pub fn save(&mut self, path: &Path) -> Result<(), DocumentError> {
        self.inner.save(path)?;
        log::info!(
            "[PDF] Wrote {} page(s) to {}",
            self.page_count(),
            path.display()
        );
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Image encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("PDF assembly failed: {0}")]
    Pdf(#[from] oxidize_pdf::PdfError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn wide_image_takes_full_box_width() {
        let p = fit_centered(1000, 100);
        assert!(approx(p.width, 277.0 * MM_TO_PT));
        assert!(approx(p.height, 27.7 * MM_TO_PT));
        assert!(approx(p.x, 10.0 * MM_TO_PT));
        assert!(approx(p.y, (210.0 - 27.7) / 2.0 * MM_TO_PT));
    }

    #[test]
    fn tall_image_is_clamped_to_box_height() {
        let p = fit_centered(100, 1000);
        assert!(approx(p.height, 190.0 * MM_TO_PT));
        assert!(approx(p.width, 19.0 * MM_TO_PT));
        assert!(approx(p.y, 10.0 * MM_TO_PT));
        assert!(approx(p.x, (297.0 - 19.0) / 2.0 * MM_TO_PT));
    }

    #[test]
    fn placement_stays_on_page() {
        for (w, h) in [(1, 1), (1920, 1080), (600, 800), (3000, 10)] {
            let p = fit_centered(w, h);
            assert!(p.x >= 0.0 && p.y >= 0.0);
            assert!(p.x + p.width <= PAGE_WIDTH_MM * MM_TO_PT + 1e-6);
            assert!(p.y + p.height <= PAGE_HEIGHT_MM * MM_TO_PT + 1e-6);
        }
    }

    #[test]
    fn encoded_page_is_jpeg() {
        let img = RgbaImage::from_pixel(16, 8, image::Rgba([10, 20, 30, 255]));
        let bytes = encode_page_image(&img, 90).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn appended_pages_are_written() {
        let dir = tempfile::tempdir().unwrap();
        let img = RgbaImage::from_pixel(40, 30, image::Rgba([200, 200, 200, 255]));
        let jpeg = dir.path().join("page.jpg");
        std::fs::write(&jpeg, encode_page_image(&img, 80).unwrap()).unwrap();

        let mut doc = PageDocument::new("test");
        doc.append_image_file(&jpeg).unwrap();
        doc.append_image_file(&jpeg).unwrap();
        assert_eq!(doc.page_count(), 2);

        let out = dir.path().join("out.pdf");
        doc.save(&out).unwrap();
        let written = std::fs::read(&out).unwrap();
        assert!(written.starts_with(b"%PDF"));
    }

    #[test]
    fn missing_image_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc = PageDocument::new("test");
        assert!(doc.append_image_file(&dir.path().join("nope.jpg")).is_err());
        assert_eq!(doc.page_count(), 0);
    }
}
