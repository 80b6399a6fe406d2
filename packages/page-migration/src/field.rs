//! Field value conversion on the content repository side.
//!
//! A content repository turns stored field rows into field values through a
//! converter registered per field type. The migration temporarily installs
//! [`LandingPageFieldConverter`] for the landing page field type so that
//! loading a version yields parsed [`Page`] values, and restores the previous
//! converter through a [`ConverterSwapGuard`] when the run ends.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::Result;
use crate::parser::PageParser;
use crate::types::Page;

/// Raw field data as stored by the content repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageFieldValue {
    pub data_text: Option<String>,
}

impl StorageFieldValue {
    /// Create a storage value holding text.
    #[must_use]
    pub fn text(data_text: impl Into<String>) -> Self {
        Self {
            data_text: Some(data_text.into()),
        }
    }
}

/// A converted field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// A parsed landing page.
    Page(Page),
    /// Untouched text data.
    Text(Option<String>),
    /// Stored data the converter rejected, with the error message.
    Invalid(String),
}

impl FieldValue {
    /// Get the page if this value holds one.
    #[must_use]
    pub fn as_page(&self) -> Option<&Page> {
        match self {
            Self::Page(page) => Some(page),
            Self::Text(_) | Self::Invalid(_) => None,
        }
    }
}

/// Converts stored field data into a field value.
pub trait FieldValueConverter: Send + Sync {
    /// Convert a stored value.
    ///
    /// # Errors
    /// Converter specific; the landing page converter returns parse errors.
    fn to_field_value(&self, value: &StorageFieldValue) -> Result<FieldValue>;
}

/// Converter that passes stored text through unchanged.
pub struct TextFieldConverter;

impl FieldValueConverter for TextFieldConverter {
    fn to_field_value(&self, value: &StorageFieldValue) -> Result<FieldValue> {
        Ok(FieldValue::Text(value.data_text.clone()))
    }
}

/// Converter parsing legacy landing page XML into a [`Page`].
///
/// Fields without XML become [`Page::empty`].
pub struct LandingPageFieldConverter {
    parser: PageParser,
    ignore_unknown_blocks: AtomicBool,
}

impl LandingPageFieldConverter {
    #[must_use]
    pub fn new(parser: PageParser) -> Self {
        Self {
            parser,
            ignore_unknown_blocks: AtomicBool::new(false),
        }
    }

    /// Whether blocks of unknown types are dropped instead of failing the page.
    #[must_use]
    pub fn ignores_unknown_blocks(&self) -> bool {
        self.ignore_unknown_blocks.load(Ordering::Relaxed)
    }

    /// Switch unknown block handling for subsequent conversions.
    pub fn set_ignore_unknown_blocks(&self, ignore: bool) {
        self.ignore_unknown_blocks.store(ignore, Ordering::Relaxed);
    }
}

impl FieldValueConverter for LandingPageFieldConverter {
    fn to_field_value(&self, value: &StorageFieldValue) -> Result<FieldValue> {
        let page = match value.data_text.as_deref() {
            Some(xml) => self.parser.parse(xml, self.ignores_unknown_blocks())?,
            None => Page::empty(),
        };
        Ok(FieldValue::Page(page))
    }
}

/// Convert one stored field through the converter registered for its type.
///
/// Fields without a registered converter pass through as text. Converter
/// errors stay with the field as [`FieldValue::Invalid`], except
/// `BlockDefinitionNotFound`, which fails the whole load so the operator can
/// decide how unknown blocks are handled.
///
/// # Errors
/// Returns `BlockDefinitionNotFound` from the landing page converter.
pub fn convert_stored_field(
    registry: &FieldConverterRegistry,
    field_type: &str,
    value: &StorageFieldValue,
) -> Result<FieldValue> {
    let converted = match registry.get(field_type) {
        Some(converter) => converter.to_field_value(value),
        None => TextFieldConverter.to_field_value(value),
    };

    match converted {
        Ok(value) => Ok(value),
        Err(e) if e.unknown_block_type().is_some() => Err(e),
        Err(e) => {
            tracing::debug!(field_type = %field_type, error = %e, "Field value conversion failed");
            Ok(FieldValue::Invalid(e.to_string()))
        }
    }
}

type ConverterMap = HashMap<String, Arc<dyn FieldValueConverter>>;

/// Shared table of field value converters keyed by field type.
///
/// Cloning yields another handle to the same table, so a converter swapped in
/// through one handle is seen by every reader.
#[derive(Clone, Default)]
pub struct FieldConverterRegistry {
    converters: Arc<RwLock<ConverterMap>>,
}

impl FieldConverterRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a converter, returning the one it replaces.
    pub fn register(
        &self,
        field_type: impl Into<String>,
        converter: Arc<dyn FieldValueConverter>,
    ) -> Option<Arc<dyn FieldValueConverter>> {
        self.converters.write().insert(field_type.into(), converter)
    }

    /// Remove the converter for a field type, returning it.
    pub fn unregister(&self, field_type: &str) -> Option<Arc<dyn FieldValueConverter>> {
        self.converters.write().remove(field_type)
    }

    /// Get the converter for a field type.
    #[must_use]
    pub fn get(&self, field_type: &str) -> Option<Arc<dyn FieldValueConverter>> {
        self.converters.read().get(field_type).cloned()
    }

    /// Install `converter` for `field_type` until the returned guard drops.
    ///
    /// The previous converter (or its absence) is restored on drop, on every
    /// exit path of the caller.
    #[must_use = "the previous converter is restored as soon as the guard drops"]
    pub fn swap(
        &self,
        field_type: impl Into<String>,
        converter: Arc<dyn FieldValueConverter>,
    ) -> ConverterSwapGuard {
        let field_type = field_type.into();
        let previous = self.register(field_type.clone(), converter);
        tracing::debug!(
            field_type = %field_type,
            had_previous = previous.is_some(),
            "Installed temporary field value converter"
        );

        ConverterSwapGuard {
            registry: self.clone(),
            field_type,
            previous,
        }
    }
}

impl fmt::Debug for FieldConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let converters = self.converters.read();
        let mut field_types: Vec<_> = converters.keys().collect();
        field_types.sort();
        f.debug_struct("FieldConverterRegistry")
            .field("field_types", &field_types)
            .finish()
    }
}

/// RAII guard restoring a swapped field value converter on drop.
pub struct ConverterSwapGuard {
    registry: FieldConverterRegistry,
    field_type: String,
    previous: Option<Arc<dyn FieldValueConverter>>,
}

impl Drop for ConverterSwapGuard {
    fn drop(&mut self) {
        match self.previous.take() {
            Some(previous) => {
                self.registry.register(self.field_type.clone(), previous);
            }
            None => {
                self.registry.unregister(&self.field_type);
            }
        }
        tracing::debug!(field_type = %self.field_type, "Restored field value converter");
    }
}
