//! Page Migration - Move legacy XML landing pages into normalized page tables.
//!
//! This crate parses the XML stored in legacy landing page fields into a
//! page/zone/block/attribute model and writes every page into the normalized
//! page tables, one row graph per content version and language.
//!
//! # Example
//!
//! ```
//! use page_migration::config::Definitions;
//!
//! let definitions = Definitions::from_yaml(
//!     "layouts:\n  - id: default\n    zones: [{id: default}]\nblocks:\n  - identifier: tag\n",
//! )
//! .unwrap();
//! let parser = definitions.into_parser();
//!
//! let page = parser
//!     .parse(
//!         r#"<page layout="default"><zones><zone id="default" name="Main"><blocks>
//!             <block id="1" type="tag" view="default"/>
//!         </blocks></zone></zones></page>"#,
//!         false,
//!     )
//!     .unwrap();
//! assert_eq!(page.block_count(), 1);
//! ```
//!
//! # Architecture
//!
//! - [`types`]: Page, Zone, Block and Attribute
//! - [`definitions`]: Layout registry and block definition catalog
//! - [`error`]: Error types and Result alias
//! - [`xml`]: XML utilities
//! - [`converter`]: Per block type attribute converters
//! - [`parser`]: Landing page XML parser
//! - [`config`]: Environment settings and the definitions file
//! - [`field`]: Field value converters and the swappable converter slot
//! - [`repository`]: Content repository interface
//! - [`gateway`]: Page table writer interface
//! - [`memory`]: In-memory repository and page store
//! - [`storage`]: MySQL repository and page store
//! - [`migrator`]: Migration run orchestration
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod converter;
pub mod definitions;
pub mod error;
pub mod field;
pub mod gateway;
pub mod memory;
pub mod migrator;
pub mod parser;
pub mod repository;
pub mod storage;
pub mod types;
pub mod xml;

// Re-export commonly used items
pub use config::{Definitions, MigrationConfig};
pub use error::{MigrationError, Result};
pub use field::{FieldConverterRegistry, LandingPageFieldConverter};
pub use migrator::{MigrationEvent, MigrationOptions, MigrationOutcome, MigrationSummary, Migrator};
pub use parser::PageParser;
pub use types::{Attribute, Block, Page, Zone};
