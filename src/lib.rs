//! Taxonomic suggestion ranking for species-identification and media-tagging
//! search boxes.
//!
//! [`engine::rank`] turns a flat batch of backend search hits into a display
//! order that keeps taxonomic subtrees together and floats the best query
//! match to the top. [`resolver::SynonymResolver`] swaps a picked synonym for
//! its accepted name before the selection is committed.

pub mod backend;
pub mod engine;
pub mod model;
pub mod resolver;
pub mod util;
