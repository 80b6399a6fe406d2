//! XML utilities for navigating legacy landing page documents.

mod utils;

pub use utils::{
    attribute_or_empty, element_children, find_descendant, find_descendants, get_tag_name,
    get_text, text_content,
};
