//! Migration orchestrator.
//!
//! A run goes through these steps:
//!
//! 1. Install the landing page field converter (restored on every exit path).
//! 2. Discover content items having a landing page field.
//! 3. Ask the operator to confirm the scope.
//! 4. For every version: load it, then for every landing page field check
//!    whether it was already migrated and persist its page.
//! 5. Commit, or roll back when the operator refuses to ignore unknown blocks.
//!
//! All writes of a run share one transaction. A field whose XML cannot be
//! converted, or whose page cannot be saved, is reported and the run moves on
//! to the next field; the transaction still commits at the end. Only a version
//! that cannot be loaded at all is skipped as a whole. Dry runs skip the transaction and every write but
//! report exactly the same events.

use std::fmt;
use std::sync::Arc;

use crate::config::LANDING_PAGE_FIELD_TYPE;
use crate::error::{MigrationError, Result};
use crate::field::{FieldValue, LandingPageFieldConverter};
use crate::gateway::PageGateway;
use crate::repository::{Content, ContentRepository, VersionInfo};
use crate::types::Page;

/// A yes/no decision the run waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt<'a> {
    /// Continue with the discovered content items?
    ConfirmScope { candidates: usize },
    /// Ignore unknown blocks for the rest of the run?
    IgnoreUnknownBlocks { block_type: &'a str },
}

impl Prompt<'_> {
    /// Answer assumed when the operator just presses enter.
    #[must_use]
    pub fn default_answer(&self) -> bool {
        match self {
            Self::ConfirmScope { .. } => false,
            Self::IgnoreUnknownBlocks { .. } => true,
        }
    }
}

impl fmt::Display for Prompt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfirmScope { candidates } => write!(
                f,
                "Found {candidates} content items. Do you want to continue?"
            ),
            Self::IgnoreUnknownBlocks { .. } => {
                f.write_str("Do you want to ignore unknown blocks in migrated Landing Pages?")
            }
        }
    }
}

/// How an event is presented to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventLevel {
    Note,
    Warning,
    Section,
    Error,
    Success,
}

/// Something the run reports to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationEvent {
    DryRun,
    Irreversible,
    NothingFound,
    /// Start of a page: content version and language being migrated.
    PageSection {
        name: String,
        content_id: i64,
        version_no: i32,
        language_code: String,
    },
    AlreadyMigrated,
    Migrated,
    SaveFailed { message: String },
    LoadFailed {
        content_id: i64,
        version_no: i32,
        message: String,
    },
    UnknownBlockType { block_type: String },
    Aborted,
}

impl MigrationEvent {
    #[must_use]
    pub fn level(&self) -> EventLevel {
        match self {
            Self::DryRun | Self::AlreadyMigrated => EventLevel::Note,
            Self::Irreversible | Self::NothingFound => EventLevel::Warning,
            Self::PageSection { .. } => EventLevel::Section,
            Self::SaveFailed { .. }
            | Self::LoadFailed { .. }
            | Self::UnknownBlockType { .. }
            | Self::Aborted => EventLevel::Error,
            Self::Migrated => EventLevel::Success,
        }
    }
}

impl fmt::Display for MigrationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DryRun => f.write_str(
                "--dry-run switch activated. Operation won't be persisted to the database.",
            ),
            Self::Irreversible => f.write_str(
                "You are about to run data migration process for Landing Pages. This operation cannot be reverted.",
            ),
            Self::NothingFound => f.write_str("Found 0 content items. Exiting..."),
            Self::PageSection {
                name,
                content_id,
                version_no,
                language_code,
            } => write!(
                f,
                "\"{name}\" [contentId: {content_id}, versionNo: {version_no}, languageCode: {language_code}]"
            ),
            Self::AlreadyMigrated => f.write_str("Page has already been migrated. Skipping..."),
            Self::Migrated => f.write_str("Page has been successfully migrated"),
            Self::SaveFailed { message } => {
                write!(f, "Cannot save Page due to the error: {message}")
            }
            Self::LoadFailed {
                content_id,
                version_no,
                message,
            } => write!(
                f,
                "Cannot load content {content_id} version {version_no}: {message}"
            ),
            Self::UnknownBlockType { block_type } => write!(
                f,
                "Cannot find block definition for block type \"{block_type}\"."
            ),
            Self::Aborted => f.write_str("Migration aborted, no changes were saved."),
        }
    }
}

/// The person running the migration: receives events, answers prompts.
pub trait Operator {
    fn report(&mut self, event: &MigrationEvent);

    fn decide(&mut self, prompt: Prompt<'_>) -> bool;
}

#[derive(Debug, Clone)]
pub struct MigrationOptions {
    /// Report everything, write nothing.
    pub dry_run: bool,
    /// Field type holding legacy landing pages.
    pub field_type: String,
}

impl Default for MigrationOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            field_type: LANDING_PAGE_FIELD_TYPE.to_string(),
        }
    }
}

impl MigrationOptions {
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    #[must_use]
    pub fn with_field_type(mut self, field_type: impl Into<String>) -> Self {
        self.field_type = field_type.into();
        self
    }
}

/// Counters of a migration run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationSummary {
    /// Content items found.
    pub candidates: usize,
    /// Versions of those items.
    pub versions: usize,
    /// Pages written (or that would be written in a dry run).
    pub migrated: usize,
    /// Fields skipped because their page already exists.
    pub skipped: usize,
    /// Fields whose page could not be converted or saved.
    pub failed: usize,
    /// Versions that could not be loaded.
    pub unreadable_versions: usize,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// No content item has a landing page field.
    NothingToMigrate,
    /// The operator did not confirm the scope.
    Cancelled,
    /// The operator refused to ignore an unknown block type; rolled back.
    Aborted {
        block_type: String,
        summary: MigrationSummary,
    },
    /// All versions processed and committed.
    Completed(MigrationSummary),
}

/// Operator answer to an unknown block type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnknownBlockResolution {
    /// Ignore unknown blocks from now on and load the version again.
    IgnoreAndRetry,
    /// Roll back and stop the run.
    Abort,
}

impl UnknownBlockResolution {
    fn from_answer(ignore: bool) -> Self {
        if ignore {
            Self::IgnoreAndRetry
        } else {
            Self::Abort
        }
    }
}

/// Result of loading one version.
enum LoadStep {
    Loaded(Content),
    Skip,
    Abort { block_type: String },
}

/// Drives one migration run.
pub struct Migrator<'a, R: ?Sized, G: ?Sized, O: ?Sized> {
    repository: &'a R,
    gateway: &'a mut G,
    operator: &'a mut O,
    converter: Arc<LandingPageFieldConverter>,
    options: MigrationOptions,
}

impl<'a, R, G, O> Migrator<'a, R, G, O>
where
    R: ContentRepository + ?Sized,
    G: PageGateway + ?Sized,
    O: Operator + ?Sized,
{
    pub fn new(
        repository: &'a R,
        gateway: &'a mut G,
        operator: &'a mut O,
        converter: Arc<LandingPageFieldConverter>,
        options: MigrationOptions,
    ) -> Self {
        Self {
            repository,
            gateway,
            operator,
            converter,
            options,
        }
    }

    /// Run the migration.
    ///
    /// # Errors
    /// Discovery failures and transaction failures (begin, commit, rollback).
    /// Per-version and per-field failures are reported, not returned.
    pub async fn run(mut self) -> Result<MigrationOutcome> {
        if self.options.dry_run {
            self.operator.report(&MigrationEvent::DryRun);
        }
        self.operator.report(&MigrationEvent::Irreversible);

        let _restore = self
            .repository
            .field_converters()
            .swap(self.options.field_type.clone(), self.converter.clone());

        let content_ids = self.discover().await?;
        if content_ids.is_empty() {
            self.operator.report(&MigrationEvent::NothingFound);
            return Ok(MigrationOutcome::NothingToMigrate);
        }

        let scope = Prompt::ConfirmScope {
            candidates: content_ids.len(),
        };
        if !self.operator.decide(scope) {
            tracing::info!("Migration cancelled by operator");
            return Ok(MigrationOutcome::Cancelled);
        }

        let mut versions = Vec::new();
        for content_id in &content_ids {
            versions.extend(self.repository.list_versions(*content_id).await?);
        }

        let mut summary = MigrationSummary {
            candidates: content_ids.len(),
            versions: versions.len(),
            ..MigrationSummary::default()
        };
        tracing::info!(
            candidates = summary.candidates,
            versions = summary.versions,
            dry_run = self.options.dry_run,
            "Starting landing page migration"
        );

        if !self.options.dry_run {
            self.gateway.begin().await?;
        }

        for version in &versions {
            let content = match self.load(version, &mut summary).await {
                LoadStep::Loaded(content) => content,
                LoadStep::Skip => continue,
                LoadStep::Abort { block_type } => {
                    if !self.options.dry_run {
                        self.gateway.rollback().await?;
                    }
                    self.operator.report(&MigrationEvent::Aborted);
                    tracing::warn!(block_type = %block_type, "Migration aborted and rolled back");
                    return Ok(MigrationOutcome::Aborted {
                        block_type,
                        summary,
                    });
                }
            };

            self.migrate_fields(version, &content, &mut summary).await;
        }

        if !self.options.dry_run {
            self.gateway.commit().await?;
        }

        tracing::info!(
            migrated = summary.migrated,
            skipped = summary.skipped,
            failed = summary.failed,
            "Landing page migration finished"
        );
        Ok(MigrationOutcome::Completed(summary))
    }

    async fn discover(&self) -> Result<Vec<i64>> {
        let content_types = self
            .repository
            .list_content_types_with_field_type(&self.options.field_type)
            .await?;

        let mut content_ids = Vec::new();
        for content_type in &content_types {
            let ids = self
                .repository
                .find_content_ids_by_type(content_type.id)
                .await?;
            tracing::debug!(
                content_type = %content_type.identifier,
                items = ids.len(),
                "Discovered landing page content"
            );
            content_ids.extend(ids);
        }

        Ok(content_ids)
    }

    async fn load(&mut self, version: &VersionInfo, summary: &mut MigrationSummary) -> LoadStep {
        let error = match self.load_once(version).await {
            Ok(content) => return LoadStep::Loaded(content),
            Err(e) => e,
        };

        let Some(block_type) = error.unknown_block_type().map(str::to_string) else {
            self.report_load_failure(version, &error, summary);
            return LoadStep::Skip;
        };

        self.operator.report(&MigrationEvent::UnknownBlockType {
            block_type: block_type.clone(),
        });
        let answer = self.operator.decide(Prompt::IgnoreUnknownBlocks {
            block_type: &block_type,
        });

        match UnknownBlockResolution::from_answer(answer) {
            UnknownBlockResolution::Abort => LoadStep::Abort { block_type },
            UnknownBlockResolution::IgnoreAndRetry => {
                tracing::info!(block_type = %block_type, "Ignoring unknown blocks for the rest of the run");
                self.converter.set_ignore_unknown_blocks(true);

                match self.load_once(version).await {
                    Ok(content) => LoadStep::Loaded(content),
                    Err(e) => {
                        self.report_load_failure(version, &e, summary);
                        LoadStep::Skip
                    }
                }
            }
        }
    }

    async fn load_once(&self, version: &VersionInfo) -> Result<Content> {
        self.repository
            .load_version(
                version.content_id,
                version.version_no,
                &version.language_codes,
            )
            .await
    }

    fn report_load_failure(
        &mut self,
        version: &VersionInfo,
        error: &MigrationError,
        summary: &mut MigrationSummary,
    ) {
        tracing::warn!(
            content_id = version.content_id,
            version_no = version.version_no,
            error = %error,
            "Cannot load content version"
        );
        summary.unreadable_versions += 1;
        self.operator.report(&MigrationEvent::LoadFailed {
            content_id: version.content_id,
            version_no: version.version_no,
            message: error.to_string(),
        });
    }

    async fn migrate_fields(
        &mut self,
        version: &VersionInfo,
        content: &Content,
        summary: &mut MigrationSummary,
    ) {
        for field in &content.fields {
            if field.field_type != self.options.field_type {
                continue;
            }

            let language_code = field.language_code.as_str();
            self.operator.report(&MigrationEvent::PageSection {
                name: version.display_name().to_string(),
                content_id: version.content_id,
                version_no: version.version_no,
                language_code: language_code.to_string(),
            });

            match self
                .gateway
                .page_exists(version.content_id, version.version_no, language_code)
                .await
            {
                Ok(true) => {
                    self.operator.report(&MigrationEvent::AlreadyMigrated);
                    summary.skipped += 1;
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    self.report_save_failure(e.to_string(), summary);
                    continue;
                }
            }

            let page = match &field.value {
                FieldValue::Page(page) => page,
                FieldValue::Invalid(message) => {
                    tracing::warn!(
                        content_id = version.content_id,
                        version_no = version.version_no,
                        language_code = %language_code,
                        error = %message,
                        "Cannot convert field"
                    );
                    self.report_save_failure(message.clone(), summary);
                    continue;
                }
                FieldValue::Text(_) => {
                    self.report_save_failure(
                        format!("field of type {} holds no landing page", field.field_type),
                        summary,
                    );
                    continue;
                }
            };

            if !self.options.dry_run {
                if let Err(e) = self
                    .insert_page(version.content_id, version.version_no, language_code, page)
                    .await
                {
                    tracing::warn!(
                        content_id = version.content_id,
                        version_no = version.version_no,
                        language_code = %language_code,
                        error = %e,
                        "Cannot save page"
                    );
                    self.report_save_failure(e.to_string(), summary);
                    continue;
                }
            }

            tracing::info!(
                content_id = version.content_id,
                version_no = version.version_no,
                language_code = %language_code,
                "Page migrated"
            );
            summary.migrated += 1;
            self.operator.report(&MigrationEvent::Migrated);
        }
    }

    fn report_save_failure(&mut self, message: String, summary: &mut MigrationSummary) {
        summary.failed += 1;
        self.operator.report(&MigrationEvent::SaveFailed { message });
    }

    /// Write one page graph: page, then per zone its blocks with design,
    /// visibility and attributes, linking each row to its parent.
    async fn insert_page(
        &mut self,
        content_id: i64,
        version_no: i32,
        language_code: &str,
        page: &Page,
    ) -> Result<()> {
        let page_id = self
            .gateway
            .insert_page(content_id, version_no, language_code, &page.layout)
            .await?;

        for zone in &page.zones {
            let zone_id = self.gateway.insert_zone(&zone.name).await?;

            for block in &zone.blocks {
                let block_id = self
                    .gateway
                    .insert_block(&block.block_type, &block.name, &block.view)
                    .await?;
                self.gateway
                    .insert_block_design(block_id, &block.style, &block.compiled, &block.class)
                    .await?;
                let (since, till) = block.visibility_timestamps();
                self.gateway
                    .insert_block_visibility(block_id, since, till)
                    .await?;

                for attribute in &block.attributes {
                    let attribute_id = self
                        .gateway
                        .insert_attribute(&attribute.name, &attribute.value)
                        .await?;
                    self.gateway
                        .assign_attribute_to_block(attribute_id, block_id)
                        .await?;
                }

                self.gateway.assign_block_to_zone(block_id, zone_id).await?;
            }

            self.gateway.assign_zone_to_page(zone_id, page_id).await?;
        }

        tracing::debug!(page_id, zones = page.zones.len(), "Inserted page graph");
        Ok(())
    }
}
