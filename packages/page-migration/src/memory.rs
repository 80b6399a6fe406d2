//! In-memory content repository and page store.
//!
//! They behave like the database backed implementations in
//! [`crate::storage`]: the repository converts fields through its shared
//! converter registry, and the page store stages writes made inside a
//! transaction until they are committed.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::{MigrationError, Result};
use crate::field::{convert_stored_field, FieldConverterRegistry, StorageFieldValue};
use crate::gateway::PageGateway;
use crate::repository::{Content, ContentRepository, ContentType, Field, VersionInfo};

/// A stored, unconverted field.
#[derive(Debug, Clone)]
pub struct StoredField {
    pub field_type: String,
    pub language_code: String,
    pub value: StorageFieldValue,
}

impl StoredField {
    #[must_use]
    pub fn new(
        field_type: impl Into<String>,
        language_code: impl Into<String>,
        value: StorageFieldValue,
    ) -> Self {
        Self {
            field_type: field_type.into(),
            language_code: language_code.into(),
            value,
        }
    }
}

/// A stored content version.
#[derive(Debug, Clone)]
pub struct StoredVersion {
    pub version_no: i32,
    pub names: BTreeMap<String, String>,
    pub fields: Vec<StoredField>,
}

impl StoredVersion {
    #[must_use]
    pub fn new(version_no: i32) -> Self {
        Self {
            version_no,
            names: BTreeMap::new(),
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_name(mut self, language_code: impl Into<String>, name: impl Into<String>) -> Self {
        self.names.insert(language_code.into(), name.into());
        self
    }

    #[must_use]
    pub fn with_field(mut self, field: StoredField) -> Self {
        self.fields.push(field);
        self
    }
}

#[derive(Debug, Clone)]
struct StoredContentType {
    content_type: ContentType,
    field_types: Vec<String>,
}

#[derive(Debug, Clone)]
struct StoredContent {
    type_id: i64,
    versions: Vec<StoredVersion>,
}

/// Content repository backed by memory.
#[derive(Debug, Default)]
pub struct InMemoryContentRepository {
    content_types: Vec<StoredContentType>,
    contents: BTreeMap<i64, StoredContent>,
    converters: FieldConverterRegistry,
    unreadable_versions: HashSet<(i64, i32)>,
    loads: AtomicUsize,
}

impl InMemoryContentRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a content type and the field types of its field definitions.
    pub fn add_content_type<I, S>(&mut self, id: i64, identifier: impl Into<String>, field_types: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.content_types.push(StoredContentType {
            content_type: ContentType {
                id,
                identifier: identifier.into(),
            },
            field_types: field_types.into_iter().map(Into::into).collect(),
        });
    }

    /// Add a version to a content item, creating the item if needed.
    pub fn add_version(&mut self, content_id: i64, type_id: i64, version: StoredVersion) {
        self.contents
            .entry(content_id)
            .or_insert_with(|| StoredContent {
                type_id,
                versions: Vec::new(),
            })
            .versions
            .push(version);
    }

    /// Fail every `load_version` call for this content version.
    pub fn make_unreadable(&mut self, content_id: i64, version_no: i32) {
        self.unreadable_versions.insert((content_id, version_no));
    }

    /// Number of `load_version` calls so far.
    #[must_use]
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }

    fn convert(&self, field: &StoredField) -> Result<Field> {
        let value = convert_stored_field(&self.converters, &field.field_type, &field.value)?;
        Ok(Field {
            field_type: field.field_type.clone(),
            language_code: field.language_code.clone(),
            value,
        })
    }
}

#[async_trait]
impl ContentRepository for InMemoryContentRepository {
    async fn list_content_types_with_field_type(
        &self,
        field_type: &str,
    ) -> Result<Vec<ContentType>> {
        Ok(self
            .content_types
            .iter()
            .filter(|stored| stored.field_types.iter().any(|t| t == field_type))
            .map(|stored| stored.content_type.clone())
            .collect())
    }

    async fn find_content_ids_by_type(&self, type_id: i64) -> Result<Vec<i64>> {
        Ok(self
            .contents
            .iter()
            .filter(|(_, content)| content.type_id == type_id)
            .map(|(id, _)| *id)
            .collect())
    }

    async fn list_versions(&self, content_id: i64) -> Result<Vec<VersionInfo>> {
        let Some(content) = self.contents.get(&content_id) else {
            return Ok(Vec::new());
        };

        Ok(content
            .versions
            .iter()
            .map(|version| {
                let language_codes: BTreeSet<_> = version
                    .fields
                    .iter()
                    .map(|field| field.language_code.clone())
                    .collect();
                VersionInfo {
                    content_id,
                    version_no: version.version_no,
                    language_codes: language_codes.into_iter().collect(),
                    names: version.names.clone(),
                }
            })
            .collect())
    }

    async fn load_version(
        &self,
        content_id: i64,
        version_no: i32,
        language_codes: &[String],
    ) -> Result<Content> {
        self.loads.fetch_add(1, Ordering::Relaxed);

        if self.unreadable_versions.contains(&(content_id, version_no)) {
            return Err(MigrationError::Gateway(format!(
                "content {content_id} version {version_no} is unreadable"
            )));
        }

        let version = self
            .contents
            .get(&content_id)
            .and_then(|content| {
                content
                    .versions
                    .iter()
                    .find(|version| version.version_no == version_no)
            })
            .ok_or(MigrationError::ContentNotFound {
                content_id,
                version_no,
            })?;

        let fields = version
            .fields
            .iter()
            .filter(|field| language_codes.contains(&field.language_code))
            .map(|field| self.convert(field))
            .collect::<Result<Vec<_>>>()?;

        Ok(Content { fields })
    }

    fn field_converters(&self) -> &FieldConverterRegistry {
        &self.converters
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRow {
    pub id: i64,
    pub content_id: i64,
    pub version_no: i32,
    pub language_code: String,
    pub layout: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneRow {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRow {
    pub id: i64,
    pub block_type: String,
    pub name: String,
    pub view: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDesignRow {
    pub block_id: i64,
    pub style: String,
    pub compiled: String,
    pub class: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockVisibilityRow {
    pub block_id: i64,
    pub since: Option<i64>,
    pub till: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRow {
    pub id: i64,
    pub name: String,
    pub value: String,
}

/// Normalized page tables.
///
/// Link tables hold `(child_id, parent_id)` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageTables {
    pub pages: Vec<PageRow>,
    pub zones: Vec<ZoneRow>,
    pub blocks: Vec<BlockRow>,
    pub block_designs: Vec<BlockDesignRow>,
    pub block_visibilities: Vec<BlockVisibilityRow>,
    pub attributes: Vec<AttributeRow>,
    pub attribute_blocks: Vec<(i64, i64)>,
    pub block_zones: Vec<(i64, i64)>,
    pub zone_pages: Vec<(i64, i64)>,
    next_id: i64,
}

impl PageTables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// Attributes linked to a block, in insertion order.
    #[must_use]
    pub fn block_attributes(&self, block_id: i64) -> Vec<&AttributeRow> {
        self.attribute_blocks
            .iter()
            .filter(|(_, linked_block)| *linked_block == block_id)
            .filter_map(|(attribute_id, _)| self.attributes.iter().find(|a| a.id == *attribute_id))
            .collect()
    }
}

/// Page store backed by memory with transaction staging.
#[derive(Debug, Default)]
pub struct InMemoryPageStore {
    committed: PageTables,
    staged: Option<PageTables>,
    rejected_zone_names: HashSet<String>,
}

impl InMemoryPageStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every `insert_zone` call for zones with this name.
    #[must_use]
    pub fn rejecting_zone(mut self, name: impl Into<String>) -> Self {
        self.rejected_zone_names.insert(name.into());
        self
    }

    /// Committed state.
    #[must_use]
    pub fn tables(&self) -> &PageTables {
        &self.committed
    }

    #[must_use]
    pub fn in_transaction(&self) -> bool {
        self.staged.is_some()
    }

    fn tables_mut(&mut self) -> &mut PageTables {
        self.staged.as_mut().unwrap_or(&mut self.committed)
    }

    fn current(&self) -> &PageTables {
        self.staged.as_ref().unwrap_or(&self.committed)
    }
}

#[async_trait]
impl PageGateway for InMemoryPageStore {
    async fn begin(&mut self) -> Result<()> {
        if self.staged.is_some() {
            return Err(MigrationError::Gateway(
                "transaction already active".into(),
            ));
        }
        self.staged = Some(self.committed.clone());
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        let staged = self
            .staged
            .take()
            .ok_or_else(|| MigrationError::Gateway("no active transaction".into()))?;
        self.committed = staged;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        self.staged
            .take()
            .map(|_| ())
            .ok_or_else(|| MigrationError::Gateway("no active transaction".into()))
    }

    async fn page_exists(
        &mut self,
        content_id: i64,
        version_no: i32,
        language_code: &str,
    ) -> Result<bool> {
        Ok(self.current().pages.iter().any(|page| {
            page.content_id == content_id
                && page.version_no == version_no
                && page.language_code == language_code
        }))
    }

    async fn insert_page(
        &mut self,
        content_id: i64,
        version_no: i32,
        language_code: &str,
        layout: &str,
    ) -> Result<i64> {
        let tables = self.tables_mut();
        let id = tables.next_id();
        tables.pages.push(PageRow {
            id,
            content_id,
            version_no,
            language_code: language_code.to_string(),
            layout: layout.to_string(),
        });
        Ok(id)
    }

    async fn insert_zone(&mut self, name: &str) -> Result<i64> {
        if self.rejected_zone_names.contains(name) {
            return Err(MigrationError::Gateway(format!(
                "zone \"{name}\" rejected by storage"
            )));
        }
        let tables = self.tables_mut();
        let id = tables.next_id();
        tables.zones.push(ZoneRow {
            id,
            name: name.to_string(),
        });
        Ok(id)
    }

    async fn insert_block(&mut self, block_type: &str, name: &str, view: &str) -> Result<i64> {
        let tables = self.tables_mut();
        let id = tables.next_id();
        tables.blocks.push(BlockRow {
            id,
            block_type: block_type.to_string(),
            name: name.to_string(),
            view: view.to_string(),
        });
        Ok(id)
    }

    async fn insert_block_design(
        &mut self,
        block_id: i64,
        style: &str,
        compiled: &str,
        class: &str,
    ) -> Result<()> {
        self.tables_mut().block_designs.push(BlockDesignRow {
            block_id,
            style: style.to_string(),
            compiled: compiled.to_string(),
            class: class.to_string(),
        });
        Ok(())
    }

    async fn insert_block_visibility(
        &mut self,
        block_id: i64,
        since: Option<i64>,
        till: Option<i64>,
    ) -> Result<()> {
        self.tables_mut()
            .block_visibilities
            .push(BlockVisibilityRow {
                block_id,
                since,
                till,
            });
        Ok(())
    }

    async fn insert_attribute(&mut self, name: &str, value: &str) -> Result<i64> {
        let tables = self.tables_mut();
        let id = tables.next_id();
        tables.attributes.push(AttributeRow {
            id,
            name: name.to_string(),
            value: value.to_string(),
        });
        Ok(id)
    }

    async fn assign_attribute_to_block(&mut self, attribute_id: i64, block_id: i64) -> Result<()> {
        self.tables_mut()
            .attribute_blocks
            .push((attribute_id, block_id));
        Ok(())
    }

    async fn assign_block_to_zone(&mut self, block_id: i64, zone_id: i64) -> Result<()> {
        self.tables_mut().block_zones.push((block_id, zone_id));
        Ok(())
    }

    async fn assign_zone_to_page(&mut self, zone_id: i64, page_id: i64) -> Result<()> {
        self.tables_mut().zone_pages.push((zone_id, page_id));
        Ok(())
    }
}
