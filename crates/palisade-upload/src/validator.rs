use palisade_core::{ImageType, UploadError, UploadPolicy, UploadResult};

/// Image upload validator
///
/// Borrows the bounds of an [`UploadPolicy`] and checks already-extracted
/// facts about a file against them. It does no I/O itself.
#[derive(Debug, Clone, Copy)]
pub struct ImageValidator<'a> {
    policy: &'a UploadPolicy,
}

impl<'a> ImageValidator<'a> {
    pub fn new(policy: &'a UploadPolicy) -> Self {
        Self { policy }
    }

    /// Sniffed type must be present and in the allow-list.
    pub fn validate_mime(&self, sniffed: Option<ImageType>) -> UploadResult<ImageType> {
        match sniffed {
            Some(image_type) if self.policy.allows(image_type.as_str()) => Ok(image_type),
            _ => Err(UploadError::InvalidMime {
                allowed: self.policy.allowed_mime_types.clone(),
            }),
        }
    }

    /// Size must lie within `[min, max]`, both ends inclusive.
    pub fn validate_size(&self, size: u64) -> UploadResult<()> {
        if size < self.policy.min_size_bytes || size > self.policy.max_size_bytes {
            return Err(UploadError::InvalidSize {
                min: self.policy.min_size_bytes,
                max: self.policy.max_size_bytes,
            });
        }
        Ok(())
    }

    /// Declared and on-disk sizes must agree.
    pub fn validate_declared_size(&self, declared: u64, actual: u64) -> UploadResult<()> {
        if declared != actual {
            return Err(UploadError::SizeMismatch { declared, actual });
        }
        Ok(())
    }

    /// Height is checked before width; both bounds are inclusive.
    pub fn validate_dimensions(&self, width: u32, height: u32) -> UploadResult<()> {
        if height > self.policy.max_height {
            return Err(UploadError::HeightExceeded {
                max_height: self.policy.max_height,
            });
        }

        if width > self.policy.max_width {
            return Err(UploadError::WidthExceeded {
                max_width: self.policy.max_width,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn default_policy() -> UploadPolicy {
        UploadPolicy::default()
    }

    #[test]
    fn test_validate_mime_ok() {
        let policy = default_policy();
        let validator = ImageValidator::new(&policy);
        assert_eq!(validator.validate_mime(Some(ImageType::Jpeg)), Ok(ImageType::Jpeg));
        assert_eq!(validator.validate_mime(Some(ImageType::Gif)), Ok(ImageType::Gif));
    }

    #[test]
    fn test_validate_mime_rejects_unlisted_and_unknown() {
        let policy = default_policy();
        let validator = ImageValidator::new(&policy);
        let expected = "Invalid File! Only (jpeg, png, gif, jpg) image types are allowed";

        let err = validator.validate_mime(Some(ImageType::Bmp)).unwrap_err();
        assert_eq!(err.to_string(), expected);

        let err = validator.validate_mime(None).unwrap_err();
        assert_eq!(err.to_string(), expected);
    }

    #[test]
    fn test_validate_mime_lists_configured_types_only() {
        let policy = UploadPolicy {
            allowed_mime_types: vec!["png".to_string(), "ico".to_string()],
            ..UploadPolicy::default()
        };
        let validator = ImageValidator::new(&policy);

        let err = validator.validate_mime(Some(ImageType::Jpeg)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid File! Only (png, ico) image types are allowed"
        );
        assert!(validator.validate_mime(Some(ImageType::Ico)).is_ok());
    }

    #[test]
    fn test_validate_mime_case_insensitive_allow_list() {
        let policy = UploadPolicy {
            allowed_mime_types: vec!["PNG".to_string()],
            ..UploadPolicy::default()
        };
        assert!(ImageValidator::new(&policy)
            .validate_mime(Some(ImageType::Png))
            .is_ok());
    }

    #[test]
    fn test_validate_size_boundaries() {
        let policy = default_policy();
        let validator = ImageValidator::new(&policy);
        assert!(validator.validate_size(100).is_ok());
        assert!(validator.validate_size(5_000_000).is_ok());
        assert!(validator.validate_size(99).is_err());
        assert!(validator.validate_size(5_000_001).is_err());
    }

    #[test]
    fn test_validate_size_message() {
        let policy = default_policy();
        let err = ImageValidator::new(&policy).validate_size(6_000_000).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("100 bytes"));
        assert!(message.contains("5000 kb"));
    }

    #[test]
    fn test_validate_declared_size() {
        let policy = default_policy();
        let validator = ImageValidator::new(&policy);
        assert!(validator.validate_declared_size(512, 512).is_ok());
        assert_eq!(
            validator.validate_declared_size(100, 5_000_000),
            Err(UploadError::SizeMismatch {
                declared: 100,
                actual: 5_000_000
            })
        );
    }

    #[test]
    fn test_validate_dimensions_boundaries() {
        let policy = default_policy();
        let validator = ImageValidator::new(&policy);
        assert!(validator.validate_dimensions(5000, 5000).is_ok());
        assert_eq!(
            validator.validate_dimensions(5000, 5001),
            Err(UploadError::HeightExceeded { max_height: 5000 })
        );
        assert_eq!(
            validator.validate_dimensions(5001, 5000),
            Err(UploadError::WidthExceeded { max_width: 5000 })
        );
    }

    #[test]
    fn test_validate_dimensions_checks_height_first() {
        let policy = default_policy();
        let validator = ImageValidator::new(&policy);
        assert_eq!(
            validator.validate_dimensions(9000, 9000),
            Err(UploadError::HeightExceeded { max_height: 5000 })
        );
    }

    #[test]
    fn test_width_error_reports_width_bound() {
        let policy = UploadPolicy {
            max_width: 800,
            max_height: 600,
            ..UploadPolicy::default()
        };
        let err = ImageValidator::new(&policy)
            .validate_dimensions(801, 10)
            .unwrap_err();
        assert_eq!(err.to_string(), "Image width should be smaller than (800) pixels");
    }

    proptest! {
        #[test]
        fn prop_size_accepted_iff_within_bounds(
            min in 0u64..10_000,
            span in 0u64..10_000,
            size in 0u64..25_000,
        ) {
            let max = min + span;
            let policy = UploadPolicy {
                min_size_bytes: min,
                max_size_bytes: max,
                ..UploadPolicy::default()
            };
            let ok = ImageValidator::new(&policy).validate_size(size).is_ok();
            prop_assert_eq!(ok, min <= size && size <= max);
        }

        #[test]
        fn prop_dimensions_accepted_iff_within_bounds(
            max_width in 1u32..6000,
            max_height in 1u32..6000,
            width in 0u32..8000,
            height in 0u32..8000,
        ) {
            let policy = UploadPolicy {
                max_width,
                max_height,
                ..UploadPolicy::default()
            };
            let ok = ImageValidator::new(&policy)
                .validate_dimensions(width, height)
                .is_ok();
            prop_assert_eq!(ok, height <= max_height && width <= max_width);
        }
    }
}
