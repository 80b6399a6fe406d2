#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use sqlx::MySqlPool;
use testcontainers::runners::AsyncRunner;
use testcontainers::ContainerAsync;
use testcontainers_modules::mysql::Mysql;

use page_migration::config::{Definitions, MigrationConfig};
use page_migration::field::{LandingPageFieldConverter, StorageFieldValue};
use page_migration::memory::{
    InMemoryContentRepository, InMemoryPageStore, StoredField, StoredVersion,
};
use page_migration::migrator::{
    MigrationEvent, MigrationOptions, MigrationOutcome, Migrator, Operator, Prompt,
};
use page_migration::storage;

pub const LANDING_PAGE_TYPE_ID: i64 = 1;
pub const ARTICLE_TYPE_ID: i64 = 2;

pub const DEFINITIONS: &str = r#"
layouts:
  - id: default
    name: Default layout
    zones:
      - id: default
        name: Default zone
  - id: 2zonesLayout1
    name: Two zones
    zones:
      - id: left
      - id: right
blocks:
  - identifier: tag
    name: Code
  - identifier: collection
    name: Collection
  - identifier: video
    name: Video
attribute_converters:
  tag: default
  collection: collection
"#;

/// Operator answering prompts from a script, falling back to the default
/// answer once the script runs out.
#[derive(Default)]
pub struct ScriptedOperator {
    answers: VecDeque<bool>,
    pub events: Vec<MigrationEvent>,
    pub prompts: Vec<String>,
}

impl ScriptedOperator {
    pub fn answering(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn has_event(&self, event: &MigrationEvent) -> bool {
        self.events.contains(event)
    }

    pub fn count(&self, predicate: impl Fn(&MigrationEvent) -> bool) -> usize {
        self.events.iter().filter(|e| predicate(e)).count()
    }
}

impl Operator for ScriptedOperator {
    fn report(&mut self, event: &MigrationEvent) {
        self.events.push(event.clone());
    }

    fn decide(&mut self, prompt: Prompt<'_>) -> bool {
        self.prompts.push(prompt.to_string());
        self.answers
            .pop_front()
            .unwrap_or_else(|| prompt.default_answer())
    }
}

pub fn landing_page_converter() -> Arc<LandingPageFieldConverter> {
    let parser = Definitions::from_yaml(DEFINITIONS).unwrap().into_parser();
    Arc::new(LandingPageFieldConverter::new(parser))
}

/// A single zone page on the default layout.
pub fn page_xml(zone_name: &str, blocks: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<page layout="default">
  <zones>
    <zone id="default" name="{zone_name}">
      <blocks>{blocks}</blocks>
    </zone>
  </zones>
</page>"#
    )
}

pub fn tag_block(id: &str, content: &str) -> String {
    format!(
        r#"<block id="{id}" type="tag" view="default" name="Block {id}">
  <attributes><attribute name="content">{content}</attribute></attributes>
</block>"#
    )
}

pub fn unknown_block(id: &str, block_type: &str) -> String {
    format!(r#"<block id="{id}" type="{block_type}" view="default"/>"#)
}

/// Repository declaring a landing page content type and an article type.
pub fn repository() -> InMemoryContentRepository {
    let mut repository = InMemoryContentRepository::new();
    repository.add_content_type(
        LANDING_PAGE_TYPE_ID,
        "landing_page",
        ["ezstring", "ezlandingpage"],
    );
    repository.add_content_type(ARTICLE_TYPE_ID, "article", ["ezstring", "ezrichtext"]);
    repository
}

/// A landing page version with one landing page field per language.
pub fn landing_page_version(version_no: i32, name: &str, pages: &[(&str, &str)]) -> StoredVersion {
    let mut version = StoredVersion::new(version_no);
    for (language_code, xml) in pages {
        version = version
            .with_name(*language_code, name)
            .with_field(StoredField::new(
                "ezstring",
                *language_code,
                StorageFieldValue::text(name),
            ))
            .with_field(StoredField::new(
                "ezlandingpage",
                *language_code,
                StorageFieldValue::text(*xml),
            ));
    }
    version
}

pub async fn migrate(
    repository: &InMemoryContentRepository,
    store: &mut InMemoryPageStore,
    operator: &mut ScriptedOperator,
    dry_run: bool,
) -> MigrationOutcome {
    migrate_with(
        repository,
        store,
        operator,
        landing_page_converter(),
        dry_run,
    )
    .await
}

pub async fn migrate_with(
    repository: &InMemoryContentRepository,
    store: &mut InMemoryPageStore,
    operator: &mut ScriptedOperator,
    converter: Arc<LandingPageFieldConverter>,
    dry_run: bool,
) -> MigrationOutcome {
    let options = MigrationOptions::default().with_dry_run(dry_run);
    Migrator::new(repository, store, operator, converter, options)
        .run()
        .await
        .unwrap()
}

const SCHEMA: &str = include_str!("../fixtures/schema.sql");

pub struct TestDb {
    pub pool: MySqlPool,
    // Hold the container so it stays alive for the duration of the test
    _container: ContainerAsync<Mysql>,
}

impl TestDb {
    pub async fn new() -> Self {
        let container = Mysql::default().start().await.unwrap();

        let host_port = container.get_host_port_ipv4(3306).await.unwrap();
        let database_url = format!("mysql://root@127.0.0.1:{}/test", host_port);

        let config = MigrationConfig::new(&database_url);
        let pool = storage::create_pool(&config).await.unwrap();
        for statement in SCHEMA.split(';').filter(|s| !s.trim().is_empty()) {
            sqlx::query(statement).execute(&pool).await.unwrap();
        }

        Self {
            pool,
            _container: container,
        }
    }

    /// Declare a content type with one field definition per field type.
    pub async fn add_content_type(&self, id: i64, identifier: &str, field_types: &[&str]) {
        sqlx::query("INSERT INTO ezcontentclass (id, version, identifier) VALUES (?, 0, ?)")
            .bind(id)
            .bind(identifier)
            .execute(&self.pool)
            .await
            .unwrap();

        for field_type in field_types {
            sqlx::query(
                "INSERT INTO ezcontentclass_attribute (contentclass_id, version, data_type_string) VALUES (?, 0, ?)",
            )
            .bind(id)
            .bind(field_type)
            .execute(&self.pool)
            .await
            .unwrap();
        }
    }

    /// Add a version holding a name and a landing page field per language,
    /// creating the content item on its first version.
    pub async fn add_landing_page_version(
        &self,
        content_id: i64,
        type_id: i64,
        version_no: i32,
        pages: &[(&str, &str, Option<&str>)],
    ) {
        sqlx::query("INSERT IGNORE INTO ezcontentobject (id, contentclass_id) VALUES (?, ?)")
            .bind(content_id)
            .bind(type_id)
            .execute(&self.pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO ezcontentobject_version (contentobject_id, version) VALUES (?, ?)")
            .bind(content_id)
            .bind(version_no)
            .execute(&self.pool)
            .await
            .unwrap();

        for (language_code, name, xml) in pages {
            sqlx::query(
                "INSERT INTO ezcontentobject_name (contentobject_id, content_version, content_translation, name) VALUES (?, ?, ?, ?)",
            )
            .bind(content_id)
            .bind(version_no)
            .bind(*language_code)
            .bind(*name)
            .execute(&self.pool)
            .await
            .unwrap();

            for (class_attribute_id, field_type, data_text) in
                [(1_i64, "ezstring", Some(*name)), (2, "ezlandingpage", *xml)]
            {
                sqlx::query(
                    r#"
                    INSERT INTO ezcontentobject_attribute
                        (contentobject_id, version, contentclassattribute_id, language_code, data_type_string, data_text)
                    VALUES (?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(content_id)
                .bind(version_no)
                .bind(class_attribute_id)
                .bind(*language_code)
                .bind(field_type)
                .bind(data_text)
                .execute(&self.pool)
                .await
                .unwrap();
            }
        }
    }

    pub async fn count(&self, table: &str) -> i64 {
        let sql = format!("SELECT COUNT(*) FROM {table}");
        sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }
}
