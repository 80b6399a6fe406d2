//! Read side of the content repository.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::Result;
use crate::field::{FieldConverterRegistry, FieldValue};

/// A content type declaring at least one field of a requested field type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    pub id: i64,
    pub identifier: String,
}

/// Metadata of one content version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    pub content_id: i64,
    pub version_no: i32,
    pub language_codes: Vec<String>,
    /// Version names keyed by language code. Internal drafts may have none.
    pub names: BTreeMap<String, String>,
}

impl VersionInfo {
    /// Name used when reporting this version: the first name, or empty.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.names.values().next().map(String::as_str).unwrap_or_default()
    }
}

/// A converted field of a loaded version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub field_type: String,
    pub language_code: String,
    pub value: FieldValue,
}

/// A loaded content version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    pub fields: Vec<Field>,
}

/// Enumerates and loads content from the content repository.
///
/// `load_version` converts every field through the converter registered in
/// [`ContentRepository::field_converters`] for its field type.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Content types declaring a field of `field_type`.
    async fn list_content_types_with_field_type(&self, field_type: &str)
        -> Result<Vec<ContentType>>;

    /// Ids of all content items of a content type.
    async fn find_content_ids_by_type(&self, type_id: i64) -> Result<Vec<i64>>;

    /// All versions of a content item.
    async fn list_versions(&self, content_id: i64) -> Result<Vec<VersionInfo>>;

    /// Load and convert the fields of one version.
    ///
    /// A field the converter rejects is returned as `FieldValue::Invalid`.
    ///
    /// # Errors
    /// `ContentNotFound` for a missing version, storage errors, and
    /// `BlockDefinitionNotFound` from the landing page converter.
    async fn load_version(
        &self,
        content_id: i64,
        version_no: i32,
        language_codes: &[String],
    ) -> Result<Content>;

    /// Field value converters used by `load_version`.
    fn field_converters(&self) -> &FieldConverterRegistry;
}
