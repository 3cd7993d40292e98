//! Vault model for Quire.
//!
//! Turns a folder of interlinked markdown documents into the structures a
//! site build needs:
//!
//! - [`SourceTree`]: included documents and the folder tree
//! - [`output_path`] / [`href`]: safe, collision-free output paths and links
//! - [`canonical_title`]: display titles without ordinal prefixes
//! - [`LinkIndex`]: case-insensitive `[[reference]]` resolution
//! - [`RewrittenText`]: references replaced by collapsible embeds
//! - [`render_navigation`]: the per-page sidebar
//! - [`SearchRecord`]: entries of the client-side search index
//!
//! [`Vault`] bundles all of it into one immutable snapshot. Load it once, then
//! render pages in any order (or in parallel) against `&Vault`.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use quire_site::Vault;
//!
//! let vault = Vault::load(Path::new("content"), &["md".to_owned()])?;
//! for doc in vault.documents() {
//!     let text = vault.read_document(doc.id)?;
//!     let rewritten = vault.rewrite_references(doc.id, &text);
//!     println!("{} -> {} ({} embeds)", doc.rel_path, doc.output_path, rewritten.embed_count());
//! }
//! # Ok::<(), quire_site::VaultError>(())
//! ```

mod embed;
mod link_index;
mod navigation;
mod path;
mod search;
mod title;
mod tree;
mod vault;

pub use embed::{RewrittenText, rewrite_references};
pub use link_index::{Ambiguity, LinkIndex};
pub use navigation::render_navigation;
pub use path::{
    HOME_PAGE_PATH, MAX_STEM_BYTES, MAX_STEM_LEN, encode_path, href, output_path, sanitize_stem,
};
pub use search::{
    CONTEXT_AFTER, CONTEXT_BEFORE, MAX_RESULTS, SEARCH_INDEX_PATH, SEARCH_PAGE_PATH, SearchRecord,
    excerpt, search_index_json,
};
pub use title::canonical_title;
pub use tree::{DirectoryNode, Document, DocumentId, SourceTree, VaultError, is_document_name};
pub use vault::Vault;
