//! Write side of the page storage.

use async_trait::async_trait;

use crate::error::Result;

/// Persists page graphs into the normalized page tables.
///
/// Calls made between [`PageGateway::begin`] and [`PageGateway::commit`] or
/// [`PageGateway::rollback`] belong to one transaction. Outside a transaction
/// every call is applied immediately.
#[async_trait]
pub trait PageGateway: Send {
    async fn begin(&mut self) -> Result<()>;

    async fn commit(&mut self) -> Result<()>;

    async fn rollback(&mut self) -> Result<()>;

    /// Whether a page exists for the content version and language.
    async fn page_exists(
        &mut self,
        content_id: i64,
        version_no: i32,
        language_code: &str,
    ) -> Result<bool>;

    async fn insert_page(
        &mut self,
        content_id: i64,
        version_no: i32,
        language_code: &str,
        layout: &str,
    ) -> Result<i64>;

    async fn insert_zone(&mut self, name: &str) -> Result<i64>;

    async fn insert_block(&mut self, block_type: &str, name: &str, view: &str) -> Result<i64>;

    async fn insert_block_design(
        &mut self,
        block_id: i64,
        style: &str,
        compiled: &str,
        class: &str,
    ) -> Result<()>;

    /// Store the visibility window as unix timestamps.
    async fn insert_block_visibility(
        &mut self,
        block_id: i64,
        since: Option<i64>,
        till: Option<i64>,
    ) -> Result<()>;

    async fn insert_attribute(&mut self, name: &str, value: &str) -> Result<i64>;

    async fn assign_attribute_to_block(&mut self, attribute_id: i64, block_id: i64) -> Result<()>;

    async fn assign_block_to_zone(&mut self, block_id: i64, zone_id: i64) -> Result<()>;

    async fn assign_zone_to_page(&mut self, zone_id: i64, page_id: i64) -> Result<()>;
}
