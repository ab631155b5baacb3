//! Caller-supplied metadata for the primary header

use std::path::Path;

use serde::Deserialize;

use super::header::{is_valid_keyword, Header, HeaderValue};
use super::ProductError;

/// Keywords owned by the product layout itself.
pub const STRUCTURAL_KEYWORDS: [&str; 3] = ["ETYPE", "ECAT", "EDATA"];

/// Prefix of the per-wavelength extension index keywords.
pub const WAVE_EXTENSION_PREFIX: &str = "WAVEEXT";

/// Keywords with a dedicated field in [`ProductMetadata`].
pub const RECOGNISED_KEYWORDS: [&str; 5] = ["AUTHOR", "DATE_CRE", "DATE_MOD", "SOURCE", "STATUS"];

/// Descriptive metadata written to the primary header.
///
/// The recognised keys are always present (empty strings by default).
/// Anything else goes in `extra`, which may not reuse a recognised or
/// structural keyword.
///
/// Can be loaded from JSON; `extra` is a list of `[keyword, value]` pairs so
/// card order is preserved:
///
/// ```json
/// { "author": "A. Astronomer", "extra": [["FILTER", "Ks"], ["NDIT", 12]] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProductMetadata {
    pub author: String,
    pub date_created: String,
    pub date_modified: String,
    pub source: String,
    pub status: String,
    pub extra: Vec<(String, HeaderValue)>,
}

impl ProductMetadata {
    /// Loads and validates metadata from a JSON file; missing keys are empty.
    pub fn from_json_file(path: &Path) -> Result<Self, ProductError> {
        let text = std::fs::read_to_string(path).map_err(|source| ProductError::MetadataIo {
            path: path.display().to_string(),
            source,
        })?;
        let metadata: ProductMetadata = serde_json::from_str(&text)?;
        metadata.validate()?;
        Ok(metadata)
    }

    pub fn with_extra(mut self, keyword: &str, value: impl Into<HeaderValue>) -> Self {
        self.extra.push((keyword.to_string(), value.into()));
        self
    }

    /// Fails on extra keywords that are malformed, reserved, or repeated.
    pub fn validate(&self) -> Result<(), ProductError> {
        let mut seen: Vec<&str> = Vec::with_capacity(self.extra.len());
        for (keyword, _) in &self.extra {
            if !is_valid_keyword(keyword) {
                return Err(ProductError::InvalidKeyword(keyword.clone()));
            }
            if is_reserved(keyword) {
                return Err(ProductError::ReservedKeyword(keyword.clone()));
            }
            if seen.contains(&keyword.as_str()) {
                return Err(ProductError::DuplicateKeyword(keyword.clone()));
            }
            seen.push(keyword);
        }
        Ok(())
    }

    /// Writes the recognised keys into `header`.
    pub(crate) fn write_recognised(&self, header: &mut Header) {
        header.set("AUTHOR", self.author.as_str());
        header.set("DATE_CRE", self.date_created.as_str());
        header.set("DATE_MOD", self.date_modified.as_str());
        header.set("SOURCE", self.source.as_str());
        header.set("STATUS", self.status.as_str());
    }

    /// Writes the caller's extra cards into `header`.
    pub(crate) fn write_extra(&self, header: &mut Header) {
        for (keyword, value) in &self.extra {
            header.set(keyword, value.clone());
        }
    }
}

fn is_reserved(keyword: &str) -> bool {
    STRUCTURAL_KEYWORDS.contains(&keyword)
        || RECOGNISED_KEYWORDS.contains(&keyword)
        || keyword.starts_with(WAVE_EXTENSION_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_header(meta: &ProductMetadata) -> Header {
        let mut header = Header::new();
        meta.write_recognised(&mut header);
        meta.write_extra(&mut header);
        header
    }

    #[test]
    fn test_recognised_keys_always_present() {
        let header = to_header(&ProductMetadata::default());
        for key in RECOGNISED_KEYWORDS {
            assert_eq!(header.get_str(key), Some(""));
        }
    }

    #[test]
    fn test_extras_follow_recognised_keys() {
        let meta = ProductMetadata {
            author: "A. Astronomer".to_string(),
            ..Default::default()
        }
        .with_extra("INSTRUME", "MICADO")
        .with_extra("NPIX", 512i64);
        meta.validate().unwrap();

        let header = to_header(&meta);
        assert_eq!(header.get_str("AUTHOR"), Some("A. Astronomer"));
        assert_eq!(header.get_str("INSTRUME"), Some("MICADO"));
        assert_eq!(header.get_int("NPIX"), Some(512));
        assert_eq!(header.keywords().last(), Some("NPIX"));
    }

    #[test]
    fn test_reserved_keywords_rejected() {
        for key in ["ECAT", "EDATA", "ETYPE", "WAVEEXT2", "WAVEEXT17", "AUTHOR"] {
            let meta = ProductMetadata::default().with_extra(key, 1i64);
            assert!(matches!(
                meta.validate(),
                Err(ProductError::ReservedKeyword(k)) if k == key
            ));
        }
    }

    #[test]
    fn test_malformed_and_duplicate_keywords_rejected() {
        let meta = ProductMetadata::default().with_extra("bad key", 1i64);
        assert!(matches!(meta.validate(), Err(ProductError::InvalidKeyword(_))));

        let meta = ProductMetadata::default()
            .with_extra("FILTER", "Ks")
            .with_extra("FILTER", "H");
        assert!(matches!(meta.validate(), Err(ProductError::DuplicateKeyword(_))));
    }

    #[test]
    fn test_load_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meta.json");
        std::fs::write(
            &path,
            r#"{"author": "A. Astronomer", "extra": [["FILTER", "Ks"], ["NDIT", 12]]}"#,
        )
        .unwrap();

        let meta = ProductMetadata::from_json_file(&path).unwrap();
        assert_eq!(meta.author, "A. Astronomer");
        assert_eq!(meta.status, "");
        assert_eq!(
            meta.extra,
            vec![
                ("FILTER".to_string(), HeaderValue::Str("Ks".to_string())),
                ("NDIT".to_string(), HeaderValue::Int(12)),
            ]
        );
    }

    #[test]
    fn test_loaded_metadata_is_validated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meta.json");
        std::fs::write(&path, r#"{"extra": [["EDATA", 3]]}"#).unwrap();
        assert!(matches!(
            ProductMetadata::from_json_file(&path),
            Err(ProductError::ReservedKeyword(_))
        ));

        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            ProductMetadata::from_json_file(&path),
            Err(ProductError::MetadataParse(_))
        ));

        assert!(matches!(
            ProductMetadata::from_json_file(&dir.path().join("missing.json")),
            Err(ProductError::MetadataIo { .. })
        ));
    }
}
