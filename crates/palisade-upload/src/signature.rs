//! Binary signature sniffing.
//!
//! The image type is decided from the leading bytes of the staged file only.
//! Neither the client-supplied filename nor its declared content type is ever
//! consulted.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use palisade_core::ImageType;

/// Bytes read from the start of a file for sniffing.
pub const SNIFF_LEN: usize = 512;

/// A set of byte runs that must all match at their offsets.
struct Signature {
    image_type: ImageType,
    parts: &'static [(usize, &'static [u8])],
}

const JP2_BOX: &[u8] = b"\x00\x00\x00\x0cjP  \r\n\x87\n";

/// Ordered lookup table; the first matching entry wins, so more specific
/// entries sharing a prefix come first.
const SIGNATURES: &[Signature] = &[
    Signature {
        image_type: ImageType::Jpeg,
        parts: &[(0, b"\xff\xd8\xff")],
    },
    Signature {
        image_type: ImageType::Png,
        parts: &[(0, b"\x89PNG\r\n\x1a\n")],
    },
    Signature {
        image_type: ImageType::Gif,
        parts: &[(0, b"GIF87a")],
    },
    Signature {
        image_type: ImageType::Gif,
        parts: &[(0, b"GIF89a")],
    },
    Signature {
        image_type: ImageType::Swf,
        parts: &[(0, b"FWS")],
    },
    Signature {
        image_type: ImageType::Swc,
        parts: &[(0, b"CWS")],
    },
    Signature {
        image_type: ImageType::Psd,
        parts: &[(0, b"8BPS")],
    },
    Signature {
        image_type: ImageType::Bmp,
        parts: &[(0, b"BM")],
    },
    Signature {
        image_type: ImageType::Tiff,
        parts: &[(0, b"II*\x00")],
    },
    Signature {
        image_type: ImageType::Tiff,
        parts: &[(0, b"MM\x00*")],
    },
    Signature {
        image_type: ImageType::Jpc,
        parts: &[(0, b"\xff\x4f\xff\x51")],
    },
    Signature {
        image_type: ImageType::Jpx,
        parts: &[(0, JP2_BOX), (16, b"ftyp"), (20, b"jpx ")],
    },
    Signature {
        image_type: ImageType::Jp2,
        parts: &[(0, JP2_BOX)],
    },
    Signature {
        image_type: ImageType::Jb2,
        parts: &[(0, b"\x97JB2\r\n\x1a\n")],
    },
    Signature {
        image_type: ImageType::Iff,
        parts: &[(0, b"FORM"), (8, b"ILBM")],
    },
    Signature {
        image_type: ImageType::Iff,
        parts: &[(0, b"FORM"), (8, b"PBM ")],
    },
    Signature {
        image_type: ImageType::Ico,
        parts: &[(0, b"\x00\x00\x01\x00")],
    },
];

impl Signature {
    fn matches(&self, header: &[u8]) -> bool {
        self.parts.iter().all(|(offset, magic)| {
            header
                .get(*offset..offset + magic.len())
                .is_some_and(|bytes| bytes == *magic)
        })
    }
}

/// Identify the image type from a file header.
pub fn sniff(header: &[u8]) -> Option<ImageType> {
    SIGNATURES
        .iter()
        .find(|signature| signature.matches(header))
        .map(|signature| signature.image_type)
        .or_else(|| looks_like_xbm(header).then_some(ImageType::Xbm))
        .or_else(|| looks_like_wbmp(header).then_some(ImageType::Wbmp))
}

/// Read the head of the file at `path` and identify its image type.
pub fn sniff_file(path: &Path) -> io::Result<Option<ImageType>> {
    let mut header = Vec::with_capacity(SNIFF_LEN);
    File::open(path)?
        .take(SNIFF_LEN as u64)
        .read_to_end(&mut header)?;
    Ok(sniff(&header))
}

/// XBM files are C source: `#define name_width 16`.
fn looks_like_xbm(header: &[u8]) -> bool {
    let text = String::from_utf8_lossy(header);
    text.trim_start().starts_with("#define") && text.contains("_width")
}

/// WBMP type 0: a zero type byte, a zero fixed-header byte, then width and
/// height as non-zero multi-byte integers.
fn looks_like_wbmp(header: &[u8]) -> bool {
    if header.len() < 4 || header[0] != 0 || header[1] != 0 {
        return false;
    }

    let mut rest = &header[2..];
    for _ in 0..2 {
        match read_multibyte(rest) {
            Some((value, consumed)) if value > 0 && value <= 2048 => rest = &rest[consumed..],
            _ => return false,
        }
    }
    true
}

fn read_multibyte(bytes: &[u8]) -> Option<(u32, usize)> {
    let mut value: u32 = 0;
    for (i, byte) in bytes.iter().take(4).enumerate() {
        value = (value << 7) | u32::from(byte & 0x7f);
        if byte & 0x80 == 0 {
            return Some((value, i + 1));
        }
    }
    None
}
