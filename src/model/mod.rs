// File: ./src/model/mod.rs
pub mod boundary;
pub mod display;
pub mod entry;
pub mod filter;
pub mod normalize;
pub mod order;
pub mod parser;
pub mod record;

pub use display::EntryDisplay;
pub use entry::{Entry, EntrySource};
pub use filter::TagSelection;
pub use order::Classification;
pub use parser::Zone;
pub use record::{Catalog, CatalogRecord, DeadlineRecord};
