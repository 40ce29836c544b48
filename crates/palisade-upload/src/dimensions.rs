//! Image header decoding

use std::path::Path;

use image::{ImageFormat, ImageReader};
use palisade_core::{ImageType, UploadError, UploadResult};

/// Formats the uploader cannot work without. The build must carry a decoder
/// for each of them.
const REQUIRED_FORMATS: &[(ImageFormat, &str)] = &[
    (ImageFormat::Jpeg, "jpeg"),
    (ImageFormat::Png, "png"),
    (ImageFormat::Gif, "gif"),
];

/// Decoder format for a sniffed type, when the build can decode it.
pub fn decoder_format(image_type: ImageType) -> Option<ImageFormat> {
    let format = match image_type {
        ImageType::Jpeg => ImageFormat::Jpeg,
        ImageType::Png => ImageFormat::Png,
        ImageType::Gif => ImageFormat::Gif,
        ImageType::Bmp => ImageFormat::Bmp,
        ImageType::Tiff => ImageFormat::Tiff,
        ImageType::Ico => ImageFormat::Ico,
        _ => return None,
    };
    format.reading_enabled().then_some(format)
}

/// Fail when one of the required decoders was compiled out.
pub fn check_capability() -> UploadResult<()> {
    let missing: Vec<&str> = REQUIRED_FORMATS
        .iter()
        .filter(|(format, _)| !format.reading_enabled())
        .map(|(_, name)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(UploadError::CapabilityMissing(format!(
            "no decoder for {}",
            missing.join(", ")
        )))
    }
}

/// Read `(width, height)` from the image header without decoding pixels.
///
/// `imagesize` reads the header of every format it knows (PSD and IFF
/// included). Anything it rejects goes through the `image` reader, pinned to
/// the sniffed type when the build can decode it.
pub fn probe_dimensions(path: &Path, image_type: Option<ImageType>) -> UploadResult<(u32, u32)> {
    match imagesize::size(path) {
        Ok(size) => {
            return match (u32::try_from(size.width), u32::try_from(size.height)) {
                (Ok(width), Ok(height)) => Ok((width, height)),
                _ => Err(UploadError::UnreadableDimensions),
            };
        }
        Err(e) => {
            tracing::debug!(
                path = %path.display(),
                error = %e,
                "Header size lookup failed, trying decoder"
            );
        }
    }

    decoder_dimensions(path, image_type)
}

fn decoder_dimensions(path: &Path, image_type: Option<ImageType>) -> UploadResult<(u32, u32)> {
    let mut reader =
        ImageReader::open(path).map_err(|e| UploadError::Unreadable(e.to_string()))?;

    match image_type.and_then(decoder_format) {
        Some(format) => reader.set_format(format),
        None => {
            reader = reader
                .with_guessed_format()
                .map_err(|e| UploadError::Unreadable(e.to_string()))?;
        }
    }

    reader.into_dimensions().map_err(|e| {
        tracing::debug!(path = %path.display(), error = %e, "Failed to read image header");
        UploadError::UnreadableDimensions
    })
}
