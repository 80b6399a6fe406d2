//! Page gateway over the normalized `ezpage_*` tables.
//!
//! Zones, blocks and attributes get their own rows and are linked through
//! the `ezpage_map_*` tables.

use async_trait::async_trait;
use sqlx::mysql::{MySqlArguments, MySqlQueryResult};
use sqlx::query::Query;
use sqlx::{MySql, MySqlPool, Transaction};

use crate::error::{MigrationError, Result};
use crate::gateway::PageGateway;

/// Page gateway writing the `ezpage_*` tables.
///
/// While a transaction is open every statement runs on its connection,
/// otherwise statements run on the pool and commit immediately.
pub struct MySqlPageGateway {
    pool: MySqlPool,
    tx: Option<Transaction<'static, MySql>>,
}

impl MySqlPageGateway {
    #[must_use]
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool, tx: None }
    }

    async fn execute<'q>(
        &mut self,
        query: Query<'q, MySql, MySqlArguments>,
    ) -> Result<MySqlQueryResult> {
        let result = match self.tx.as_mut() {
            Some(tx) => query.execute(&mut **tx).await?,
            None => query.execute(&self.pool).await?,
        };
        Ok(result)
    }

    async fn insert<'q>(&mut self, query: Query<'q, MySql, MySqlArguments>) -> Result<i64> {
        let result = self.execute(query).await?;
        i64::try_from(result.last_insert_id())
            .map_err(|e| MigrationError::Gateway(format!("insert id out of range: {e}")))
    }
}

#[async_trait]
impl PageGateway for MySqlPageGateway {
    async fn begin(&mut self) -> Result<()> {
        if self.tx.is_some() {
            return Err(MigrationError::Gateway(
                "transaction already active".into(),
            ));
        }
        self.tx = Some(self.pool.begin().await?);
        tracing::debug!("Transaction started");
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        let tx = self
            .tx
            .take()
            .ok_or_else(|| MigrationError::Gateway("no active transaction".into()))?;
        tx.commit().await?;
        tracing::debug!("Transaction committed");
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        let tx = self
            .tx
            .take()
            .ok_or_else(|| MigrationError::Gateway("no active transaction".into()))?;
        tx.rollback().await?;
        tracing::debug!("Transaction rolled back");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn page_exists(
        &mut self,
        content_id: i64,
        version_no: i32,
        language_code: &str,
    ) -> Result<bool> {
        let query = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM ezpage_pages
            WHERE content_id = ? AND version_no = ? AND language_code = ?
            "#,
        )
        .bind(content_id)
        .bind(version_no)
        .bind(language_code);

        let count = match self.tx.as_mut() {
            Some(tx) => query.fetch_one(&mut **tx).await?,
            None => query.fetch_one(&self.pool).await?,
        };
        Ok(count > 0)
    }

    async fn insert_page(
        &mut self,
        content_id: i64,
        version_no: i32,
        language_code: &str,
        layout: &str,
    ) -> Result<i64> {
        self.insert(
            sqlx::query(
                r#"
                INSERT INTO ezpage_pages (content_id, version_no, language_code, layout)
                VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(content_id)
            .bind(version_no)
            .bind(language_code)
            .bind(layout),
        )
        .await
    }

    async fn insert_zone(&mut self, name: &str) -> Result<i64> {
        self.insert(sqlx::query(r#"INSERT INTO ezpage_zones (name) VALUES (?)"#).bind(name))
            .await
    }

    async fn insert_block(&mut self, block_type: &str, name: &str, view: &str) -> Result<i64> {
        self.insert(
            sqlx::query(r#"INSERT INTO ezpage_blocks (type, name, view) VALUES (?, ?, ?)"#)
                .bind(block_type)
                .bind(name)
                .bind(view),
        )
        .await
    }

    async fn insert_block_design(
        &mut self,
        block_id: i64,
        style: &str,
        compiled: &str,
        class: &str,
    ) -> Result<()> {
        self.execute(
            sqlx::query(
                r#"
                INSERT INTO ezpage_blocks_design (block_id, style, compiled, class)
                VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(block_id)
            .bind(style)
            .bind(compiled)
            .bind(class),
        )
        .await?;
        Ok(())
    }

    async fn insert_block_visibility(
        &mut self,
        block_id: i64,
        since: Option<i64>,
        till: Option<i64>,
    ) -> Result<()> {
        self.execute(
            sqlx::query(
                r#"INSERT INTO ezpage_blocks_visibility (block_id, since, till) VALUES (?, ?, ?)"#,
            )
            .bind(block_id)
            .bind(since)
            .bind(till),
        )
        .await?;
        Ok(())
    }

    async fn insert_attribute(&mut self, name: &str, value: &str) -> Result<i64> {
        self.insert(
            sqlx::query(r#"INSERT INTO ezpage_attributes (name, value) VALUES (?, ?)"#)
                .bind(name)
                .bind(value),
        )
        .await
    }

    async fn assign_attribute_to_block(&mut self, attribute_id: i64, block_id: i64) -> Result<()> {
        self.execute(
            sqlx::query(
                r#"INSERT INTO ezpage_map_attributes_blocks (attribute_id, block_id) VALUES (?, ?)"#,
            )
            .bind(attribute_id)
            .bind(block_id),
        )
        .await?;
        Ok(())
    }

    async fn assign_block_to_zone(&mut self, block_id: i64, zone_id: i64) -> Result<()> {
        self.execute(
            sqlx::query(r#"INSERT INTO ezpage_map_blocks_zones (block_id, zone_id) VALUES (?, ?)"#)
                .bind(block_id)
                .bind(zone_id),
        )
        .await?;
        Ok(())
    }

    async fn assign_zone_to_page(&mut self, zone_id: i64, page_id: i64) -> Result<()> {
        self.execute(
            sqlx::query(r#"INSERT INTO ezpage_map_zones_pages (zone_id, page_id) VALUES (?, ?)"#)
                .bind(zone_id)
                .bind(page_id),
        )
        .await?;
        Ok(())
    }
}
