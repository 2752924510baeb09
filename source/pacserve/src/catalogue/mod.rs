//! The catalogue: correlated zones and templates, folded into a
//! queryable prefix tree and published behind an atomic swap.

pub mod builder;
pub mod element;
pub mod store;
pub mod tree;

pub use element::LookupElement;
pub use store::{CatalogueStore, StoreConfig};
pub use tree::Tree;
