//! Attribute converter system for block-specific attribute dialects.
//!
//! Every block type can interpret its `<attributes>` sub-tree differently.
//! Converters are registered per block type identifier and looked up through
//! the [`XmlAttributeProcessor`] while a page is parsed.

mod config;
mod core;
pub mod converters;
mod handler;
mod processor;

pub use config::{create_attribute_converter_registry, ConverterKind};
pub use core::ConverterRegistry;
pub use handler::AttributeConverter;
pub use processor::XmlAttributeProcessor;
