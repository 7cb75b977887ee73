// ABOUTME: Decodes a picked photo, scales it and re-encodes it as a JPEG data URI
// ABOUTME: Two fits: cover into a fixed canvas, or bounded under a maximum edge

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use std::path::Path;
use tracing::debug;

use crate::data_uri;
use crate::error::{MediaError, MediaResult};
use crate::{JPEG_QUALITY, MAX_UPLOAD_BYTES};

/// A photo chosen by the user, checked but not yet decoded
#[derive(Debug, Clone)]
pub struct ImageUpload {
    name: String,
    bytes: Vec<u8>,
    format: ImageFormat,
}

impl ImageUpload {
    /// Check size and content type. Size is checked first so oversized files are never sniffed.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> MediaResult<Self> {
        let size = bytes.len() as u64;
        if size > MAX_UPLOAD_BYTES {
            return Err(MediaError::TooLarge { size });
        }

        let format = image::guess_format(&bytes).map_err(|_| MediaError::NotAnImage)?;

        Ok(Self {
            name: name.into(),
            bytes,
            format,
        })
    }

    /// Read and check a file from disk
    pub async fn read(path: &Path) -> MediaResult<Self> {
        let size = tokio::fs::metadata(path).await?.len();
        if size > MAX_UPLOAD_BYTES {
            return Err(MediaError::TooLarge { size });
        }

        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Self::from_bytes(name, bytes)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    fn decode(&self) -> MediaResult<DynamicImage> {
        Ok(image::load_from_memory_with_format(&self.bytes, self.format)?)
    }

    /// Scale to cover a `width` x `height` canvas and crop the overflow evenly
    pub fn cover_fit(&self, width: u32, height: u32) -> MediaResult<EncodedPhoto> {
        let source = self.decode()?;
        let (src_w, src_h) = (source.width() as f64, source.height() as f64);

        let scale = (width as f64 / src_w).max(height as f64 / src_h);
        let scaled_w = (src_w * scale).round().max(width as f64) as u32;
        let scaled_h = (src_h * scale).round().max(height as f64) as u32;

        // Canvas offsets are negative; crop from their mirror
        let crop_x = -js_round((width as f64 - scaled_w as f64) / 2.0);
        let crop_y = -js_round((height as f64 - scaled_h as f64) / 2.0);

        let fitted = source
            .resize_exact(scaled_w, scaled_h, FilterType::Triangle)
            .crop_imm(crop_x.max(0.0) as u32, crop_y.max(0.0) as u32, width, height);

        debug!(
            name = %self.name,
            from = ?(source.width(), source.height()),
            to = ?(width, height),
            "Cover-fit photo"
        );
        EncodedPhoto::encode(&fitted)
    }

    /// Shrink so neither edge exceeds `max_edge`. Small images keep their size.
    pub fn bounded_fit(&self, max_edge: u32) -> MediaResult<EncodedPhoto> {
        let source = self.decode()?;
        let (src_w, src_h) = (source.width() as f64, source.height() as f64);

        let scale = (max_edge as f64 / src_w)
            .min(max_edge as f64 / src_h)
            .min(1.0);
        let target_w = ((src_w * scale).round() as u32).max(1);
        let target_h = ((src_h * scale).round() as u32).max(1);

        let fitted = if scale < 1.0 {
            source.resize_exact(target_w, target_h, FilterType::Triangle)
        } else {
            source
        };

        debug!(name = %self.name, to = ?(target_w, target_h), "Bounded-fit photo");
        EncodedPhoto::encode(&fitted)
    }
}

/// Canvas rounding: halves go towards positive infinity
fn js_round(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// A re-encoded JPEG ready to embed in a JSON body
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedPhoto {
    pub width: u32,
    pub height: u32,
    pub jpeg: Vec<u8>,
}

impl EncodedPhoto {
    fn encode(image: &DynamicImage) -> MediaResult<Self> {
        let rgb = image.to_rgb8();
        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY)
            .encode_image(&rgb)
            .map_err(|e| MediaError::Encode(e.to_string()))?;

        Ok(Self {
            width: rgb.width(),
            height: rgb.height(),
            jpeg,
        })
    }

    pub fn to_data_uri(&self) -> String {
        data_uri::encode("image/jpeg", &self.jpeg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([180, 40, 40]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn decoded_size(photo: &EncodedPhoto) -> (u32, u32) {
        let img = image::load_from_memory_with_format(&photo.jpeg, ImageFormat::Jpeg).unwrap();
        (img.width(), img.height())
    }

    #[test]
    fn test_rejects_non_image() {
        let err = ImageUpload::from_bytes("notes.txt", b"plain text".to_vec()).unwrap_err();
        assert!(matches!(err, MediaError::NotAnImage));
        assert_eq!(err.to_string(), "Please select a valid image file");
    }

    #[test]
    fn test_rejects_oversized_file() {
        let bytes = vec![0u8; (MAX_UPLOAD_BYTES + 1) as usize];
        let err = ImageUpload::from_bytes("huge.png", bytes).unwrap_err();
        assert!(err.is_rejected_upload());
        assert_eq!(err.to_string(), "Image must be under 10MB");
    }

    #[test]
    fn test_cover_fit_fills_canvas() {
        let upload = ImageUpload::from_bytes("wide.png", png(1200, 400)).unwrap();
        let photo = upload.cover_fit(600, 420).unwrap();
        assert_eq!((photo.width, photo.height), (600, 420));
        assert_eq!(decoded_size(&photo), (600, 420));
    }

    #[test]
    fn test_cover_fit_upscales_small_images() {
        let upload = ImageUpload::from_bytes("tiny.png", png(60, 60)).unwrap();
        let photo = upload.cover_fit(600, 420).unwrap();
        assert_eq!(decoded_size(&photo), (600, 420));
    }

    #[test]
    fn test_bounded_fit_shrinks_long_edge() {
        let upload = ImageUpload::from_bytes("big.png", png(3000, 1500)).unwrap();
        let photo = upload.bounded_fit(1280).unwrap();
        assert_eq!((photo.width, photo.height), (1280, 640));
    }

    #[test]
    fn test_bounded_fit_never_upscales() {
        let upload = ImageUpload::from_bytes("small.png", png(640, 480)).unwrap();
        let photo = upload.bounded_fit(1280).unwrap();
        assert_eq!(decoded_size(&photo), (640, 480));
    }

    #[test]
    fn test_data_uri_prefix() {
        let upload = ImageUpload::from_bytes("a.png", png(10, 10)).unwrap();
        let uri = upload.bounded_fit(1280).unwrap().to_data_uri();
        assert!(uri.starts_with("data:image/jpeg;base64,"));
    }

    #[tokio::test]
    async fn test_read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        tokio::fs::write(&path, png(20, 10)).await.unwrap();

        let upload = ImageUpload::read(&path).await.unwrap();
        assert_eq!(upload.name(), "photo.png");
        assert_eq!(upload.format(), ImageFormat::Png);
    }
}
