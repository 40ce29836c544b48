use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Image types recognised by signature sniffing.
///
/// The string form is the short lowercase name (`"jpeg"`, `"png"`), which is
/// what allow-lists contain and what is used as the stored file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageType {
    Gif,
    Jpeg,
    Png,
    Swf,
    Psd,
    Bmp,
    Tiff,
    Jpc,
    Jp2,
    Jpx,
    Jb2,
    Swc,
    Iff,
    Wbmp,
    Xbm,
    Ico,
}

impl ImageType {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageType::Gif => "gif",
            ImageType::Jpeg => "jpeg",
            ImageType::Png => "png",
            ImageType::Swf => "swf",
            ImageType::Psd => "psd",
            ImageType::Bmp => "bmp",
            ImageType::Tiff => "tiff",
            ImageType::Jpc => "jpc",
            ImageType::Jp2 => "jp2",
            ImageType::Jpx => "jpx",
            ImageType::Jb2 => "jb2",
            ImageType::Swc => "swc",
            ImageType::Iff => "iff",
            ImageType::Wbmp => "wbmp",
            ImageType::Xbm => "xbm",
            ImageType::Ico => "ico",
        }
    }

    /// Extension used for the persisted file.
    pub fn extension(self) -> &'static str {
        self.as_str()
    }
}

impl Display for ImageType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gif" => Ok(ImageType::Gif),
            "jpeg" | "jpg" => Ok(ImageType::Jpeg),
            "png" => Ok(ImageType::Png),
            "swf" => Ok(ImageType::Swf),
            "psd" => Ok(ImageType::Psd),
            "bmp" => Ok(ImageType::Bmp),
            "tiff" | "tif" => Ok(ImageType::Tiff),
            "jpc" => Ok(ImageType::Jpc),
            "jp2" => Ok(ImageType::Jp2),
            "jpx" => Ok(ImageType::Jpx),
            "jb2" => Ok(ImageType::Jb2),
            "swc" => Ok(ImageType::Swc),
            "iff" => Ok(ImageType::Iff),
            "wbmp" => Ok(ImageType::Wbmp),
            "xbm" => Ok(ImageType::Xbm),
            "ico" => Ok(ImageType::Ico),
            _ => Err(anyhow::anyhow!("Unknown image type: {}", s)),
        }
    }
}

/// Descriptor of a successfully persisted upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedImage {
    /// Final file name, without extension
    pub name: String,
    /// Sniffed image type
    pub mime: ImageType,
    pub width: u32,
    pub height: u32,
    /// Size in bytes
    pub size: u64,
    /// Storage directory
    pub storage: PathBuf,
    /// Full path of the stored file (`storage/name.mime`)
    pub path: PathBuf,
}

impl UploadedImage {
    /// Flat JSON object with the `name`, `mime`, `width`, `height`, `size`,
    /// `storage` and `path` keys.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_type_parses_aliases() {
        assert_eq!("jpg".parse::<ImageType>().unwrap(), ImageType::Jpeg);
        assert_eq!(" JPEG ".parse::<ImageType>().unwrap(), ImageType::Jpeg);
        assert_eq!("tif".parse::<ImageType>().unwrap(), ImageType::Tiff);
        assert!("webp".parse::<ImageType>().is_err());
    }

    #[test]
    fn test_extension_is_short_name() {
        assert_eq!(ImageType::Jpeg.extension(), "jpeg");
        assert_eq!(ImageType::Png.to_string(), "png");
    }

    #[test]
    fn test_uploaded_image_json_is_flat() {
        let image = UploadedImage {
            name: "0192f0c4_abc".to_string(),
            mime: ImageType::Png,
            width: 640,
            height: 480,
            size: 2048,
            storage: PathBuf::from("uploads"),
            path: PathBuf::from("uploads/0192f0c4_abc.png"),
        };

        let json: serde_json::Value = serde_json::from_str(&image.to_json().unwrap()).unwrap();
        assert_eq!(json["name"], "0192f0c4_abc");
        assert_eq!(json["mime"], "png");
        assert_eq!(json["width"], 640);
        assert_eq!(json["height"], 480);
        assert_eq!(json["size"], 2048);
        assert_eq!(json["storage"], "uploads");
        assert_eq!(json["path"], "uploads/0192f0c4_abc.png");
        assert_eq!(json.as_object().unwrap().len(), 7);
    }
}
