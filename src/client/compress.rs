use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageResult};

use crate::models::registration::Attachment;

/// JPEG qualities tried in turn until the output fits.
const QUALITY_STEPS: [u8; 6] = [85, 75, 65, 55, 45, 35];

/// Ceiling applied to image attachments before upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionLimits {
    pub max_bytes: usize,
    pub max_long_edge: u32,
}

impl Default for CompressionLimits {
    fn default() -> Self {
        Self {
            max_bytes: 400 * 1024,
            max_long_edge: 1600,
        }
    }
}

/// Shrink an image attachment; anything else, or any failure, returns it untouched.
pub fn compress_attachment(attachment: Attachment, limits: CompressionLimits) -> Attachment {
    if !attachment.is_image() || attachment.is_empty() {
        return attachment;
    }

    match shrink(&attachment.bytes, limits) {
        Ok(Some(bytes)) if bytes.len() < attachment.bytes.len() => Attachment {
            file_name: with_jpeg_extension(&attachment.file_name),
            mime_type: "image/jpeg".to_string(),
            bytes,
        },
        Ok(_) => attachment,
        Err(e) => {
            log::warn!("Could not compress {}, sending original: {e}", attachment.file_name);
            attachment
        }
    }
}

/// `None` when the image already fits both limits.
fn shrink(bytes: &[u8], limits: CompressionLimits) -> ImageResult<Option<Vec<u8>>> {
    let img = image::load_from_memory(bytes)?;
    let long_edge = img.width().max(img.height());
    if long_edge <= limits.max_long_edge && bytes.len() <= limits.max_bytes {
        return Ok(None);
    }

    let img = if long_edge > limits.max_long_edge {
        img.resize(limits.max_long_edge, limits.max_long_edge, FilterType::Triangle)
    } else {
        img
    };

    let mut smallest: Option<Vec<u8>> = None;
    for quality in QUALITY_STEPS {
        let encoded = encode_jpeg(&img, quality)?;
        let fits = encoded.len() <= limits.max_bytes;
        if smallest.as_ref().is_none_or(|s| encoded.len() < s.len()) {
            smallest = Some(encoded);
        }
        if fits {
            break;
        }
    }
    Ok(smallest)
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> ImageResult<Vec<u8>> {
    let rgb = img.to_rgb8();
    let mut out = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut out, quality);
    encoder.encode_image(&rgb)?;
    Ok(out)
}

fn with_jpeg_extension(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => format!("{stem}.jpg"),
        _ => format!("{name}.jpg"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |_, _| Rgb(rand::random::<[u8; 3]>()));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    const SMALL_LIMITS: CompressionLimits = CompressionLimits {
        max_bytes: 40 * 1024,
        max_long_edge: 400,
    };

    #[test]
    fn default_limits() {
        let limits = CompressionLimits::default();
        assert_eq!(limits.max_bytes, 409_600);
        assert_eq!(limits.max_long_edge, 1600);
    }

    #[test]
    fn large_image_is_downscaled_to_jpeg() {
        let original = Attachment::new("foto certificato.png", "image/png", png(800, 400));
        let original_len = original.bytes.len();
        let out = compress_attachment(original, SMALL_LIMITS);

        assert_eq!(out.mime_type, "image/jpeg");
        assert_eq!(out.file_name, "foto certificato.jpg");
        assert!(out.bytes.len() < original_len);
        let decoded = image::load_from_memory(&out.bytes).unwrap();
        assert_eq!(decoded.width(), 400);
        assert_eq!(decoded.height(), 200);
    }

    #[test]
    fn small_image_is_left_alone() {
        let original = Attachment::new("mini.png", "image/png", png(40, 30));
        let out = compress_attachment(original.clone(), CompressionLimits::default());
        assert_eq!(out, original);
    }

    #[test]
    fn non_images_pass_through() {
        let pdf = Attachment::new("cert.pdf", "application/pdf", vec![0x25, 0x50, 0x44, 0x46]);
        assert_eq!(compress_attachment(pdf.clone(), CompressionLimits::default()), pdf);
    }

    #[test]
    fn undecodable_image_falls_back_to_original() {
        let broken = Attachment::new("rotto.jpg", "image/jpeg", vec![1, 2, 3, 4, 5]);
        assert_eq!(compress_attachment(broken.clone(), CompressionLimits::default()), broken);
    }

    #[test]
    fn extension_is_swapped_or_added() {
        assert_eq!(with_jpeg_extension("a.b.png"), "a.b.jpg");
        assert_eq!(with_jpeg_extension("scan"), "scan.jpg");
        assert_eq!(with_jpeg_extension(".hidden"), ".hidden.jpg");
    }
}
