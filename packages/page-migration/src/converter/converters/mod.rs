//! Built-in attribute converters.

mod collection;
mod default;

pub use collection::CollectionConverter;
pub use default::DefaultConverter;
