//! Content repository over the legacy content tables.
//!
//! Field values are converted while a version is loaded, through the
//! converter registry shared with the migrator.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use sqlx::MySqlPool;

use crate::error::{MigrationError, Result};
use crate::field::{convert_stored_field, FieldConverterRegistry, StorageFieldValue};
use crate::repository::{Content, ContentRepository, ContentType, Field, VersionInfo};

/// Content repository reading the legacy content tables.
#[derive(Debug, Clone)]
pub struct MySqlContentRepository {
    pool: MySqlPool,
    converters: FieldConverterRegistry,
}

impl MySqlContentRepository {
    #[must_use]
    pub fn new(pool: MySqlPool) -> Self {
        Self {
            pool,
            converters: FieldConverterRegistry::new(),
        }
    }
}

#[async_trait]
impl ContentRepository for MySqlContentRepository {
    #[tracing::instrument(skip(self))]
    async fn list_content_types_with_field_type(
        &self,
        field_type: &str,
    ) -> Result<Vec<ContentType>> {
        let rows = sqlx::query_as::<_, (i64, String)>(
            r#"
            SELECT DISTINCT c.id, c.identifier
            FROM ezcontentclass c
            INNER JOIN ezcontentclass_attribute a
                ON a.contentclass_id = c.id AND a.version = c.version
            WHERE a.data_type_string = ? AND c.version = 0
            ORDER BY c.id
            "#,
        )
        .bind(field_type)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, identifier)| ContentType { id, identifier })
            .collect())
    }

    #[tracing::instrument(skip(self))]
    async fn find_content_ids_by_type(&self, type_id: i64) -> Result<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            r#"SELECT id FROM ezcontentobject WHERE contentclass_id = ? ORDER BY id"#,
        )
        .bind(type_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    #[tracing::instrument(skip(self))]
    async fn list_versions(&self, content_id: i64) -> Result<Vec<VersionInfo>> {
        let version_numbers = sqlx::query_scalar::<_, i32>(
            r#"
            SELECT version FROM ezcontentobject_version
            WHERE contentobject_id = ?
            ORDER BY version
            "#,
        )
        .bind(content_id)
        .fetch_all(&self.pool)
        .await?;

        let languages = sqlx::query_as::<_, (i32, String)>(
            r#"
            SELECT DISTINCT version, language_code FROM ezcontentobject_attribute
            WHERE contentobject_id = ?
            "#,
        )
        .bind(content_id)
        .fetch_all(&self.pool)
        .await?;

        let names = sqlx::query_as::<_, (i32, String, Option<String>)>(
            r#"
            SELECT content_version, content_translation, name FROM ezcontentobject_name
            WHERE contentobject_id = ?
            "#,
        )
        .bind(content_id)
        .fetch_all(&self.pool)
        .await?;

        let mut languages_by_version: BTreeMap<i32, BTreeSet<String>> = BTreeMap::new();
        for (version_no, language_code) in languages {
            languages_by_version
                .entry(version_no)
                .or_default()
                .insert(language_code);
        }

        let mut names_by_version: BTreeMap<i32, BTreeMap<String, String>> = BTreeMap::new();
        for (version_no, language_code, name) in names {
            names_by_version
                .entry(version_no)
                .or_default()
                .insert(language_code, name.unwrap_or_default());
        }

        Ok(version_numbers
            .into_iter()
            .map(|version_no| VersionInfo {
                content_id,
                version_no,
                language_codes: languages_by_version
                    .remove(&version_no)
                    .unwrap_or_default()
                    .into_iter()
                    .collect(),
                names: names_by_version.remove(&version_no).unwrap_or_default(),
            })
            .collect())
    }

    #[tracing::instrument(skip(self))]
    async fn load_version(
        &self,
        content_id: i64,
        version_no: i32,
        language_codes: &[String],
    ) -> Result<Content> {
        let rows = sqlx::query_as::<_, (String, String, Option<String>)>(
            r#"
            SELECT data_type_string, language_code, data_text
            FROM ezcontentobject_attribute
            WHERE contentobject_id = ? AND version = ?
            ORDER BY contentclassattribute_id, language_code
            "#,
        )
        .bind(content_id)
        .bind(version_no)
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() {
            return Err(MigrationError::ContentNotFound {
                content_id,
                version_no,
            });
        }

        let mut fields = Vec::new();
        for (field_type, language_code, data_text) in rows {
            if !language_codes.contains(&language_code) {
                continue;
            }

            let value = convert_stored_field(
                &self.converters,
                &field_type,
                &StorageFieldValue { data_text },
            )?;
            fields.push(Field {
                field_type,
                language_code,
                value,
            });
        }

        Ok(Content { fields })
    }

    fn field_converters(&self) -> &FieldConverterRegistry {
        &self.converters
    }
}
