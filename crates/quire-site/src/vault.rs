//! Immutable snapshot of a scanned vault.

use std::fs;
use std::path::{Path, PathBuf};

use quire_renderer::MarkdownRenderer;
use rayon::prelude::*;

use crate::embed::{RewrittenText, rewrite_references};
use crate::link_index::LinkIndex;
use crate::navigation::render_navigation;
use crate::path::encode_path;
use crate::search::{SearchRecord, excerpt};
use crate::tree::{DirectoryNode, Document, DocumentId, SourceTree, VaultError};

/// Everything known about a vault before any page is written.
///
/// Built once by [`Vault::load`]: the folder tree, the ordered document list,
/// the link index and the rendered content of every document (used as embed
/// bodies). Nothing changes afterwards, so per-page work can share one
/// `&Vault` across threads.
#[derive(Debug)]
pub struct Vault {
    source_dir: PathBuf,
    tree: SourceTree,
    links: LinkIndex,
    embeds: Vec<String>,
}

impl Vault {
    /// Scan `source_dir` and build the link index and embed bodies.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError`] if the source directory is missing, is not a
    /// directory, or cannot be listed. Unreadable documents do not fail the
    /// load; their embed body is empty.
    pub fn load(source_dir: &Path, extensions: &[String]) -> Result<Self, VaultError> {
        let tree = SourceTree::scan(source_dir, extensions)?;
        tracing::info!(documents = tree.documents.len(), "Scanned vault");

        let links = LinkIndex::build(&tree.documents);
        let ambiguous = links.ambiguities().len();
        if ambiguous > 0 {
            tracing::info!(
                keys = ambiguous,
                "Some reference keys match several documents, earliest document wins"
            );
        }

        let embeds = tree
            .documents
            .par_iter()
            .map(|doc| {
                let text = read_or_empty(doc);
                MarkdownRenderer::new().render_markdown(&text).html
            })
            .collect();

        Ok(Self {
            source_dir: source_dir.to_path_buf(),
            tree,
            links,
            embeds,
        })
    }

    #[must_use]
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Documents in build order: root index first, then by lowercase path.
    #[must_use]
    pub fn documents(&self) -> &[Document] {
        &self.tree.documents
    }

    /// # Panics
    ///
    /// Panics if `id` was not issued by this vault.
    #[must_use]
    pub fn document(&self, id: DocumentId) -> &Document {
        &self.tree.documents[id.index()]
    }

    /// Look up a document by its `/`-separated path relative to the vault root.
    #[must_use]
    pub fn document_by_path(&self, rel_path: &str) -> Option<&Document> {
        self.tree.documents.iter().find(|doc| doc.rel_path == rel_path)
    }

    /// Root of the navigation tree.
    #[must_use]
    pub fn root(&self) -> &DirectoryNode {
        &self.tree.root
    }

    #[must_use]
    pub fn links(&self) -> &LinkIndex {
        &self.links
    }

    /// Rendered content of a document, as shown inside embeds.
    #[must_use]
    pub fn embed_html(&self, id: DocumentId) -> &str {
        &self.embeds[id.index()]
    }

    /// Read a document's source text.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Io`] if the file cannot be read as UTF-8.
    pub fn read_document(&self, id: DocumentId) -> Result<String, VaultError> {
        let doc = self.document(id);
        fs::read_to_string(&doc.source_path).map_err(|source| VaultError::Io {
            path: doc.source_path.clone(),
            source,
        })
    }

    /// Replace `[[references]]` in the text of document `current`.
    #[must_use]
    pub fn rewrite_references(&self, current: DocumentId, text: &str) -> RewrittenText {
        rewrite_references(self, current, text)
    }

    /// Navigation fragment for document `current`.
    #[must_use]
    pub fn navigation(&self, current: DocumentId) -> String {
        render_navigation(self, current)
    }

    /// One search record per document, in document order.
    ///
    /// Unreadable documents still get a record, with empty text.
    #[must_use]
    pub fn search_records(&self) -> Vec<SearchRecord> {
        self.tree
            .documents
            .par_iter()
            .map(|doc| SearchRecord {
                title: doc.title.clone(),
                path: encode_path(&doc.output_path),
                text: excerpt(&read_or_empty(doc)),
            })
            .collect()
    }
}

fn read_or_empty(doc: &Document) -> String {
    match fs::read_to_string(&doc.source_path) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(path = %doc.source_path.display(), error = %e, "Failed to read document, using empty text");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    static_assertions::assert_impl_all!(Vault: Send, Sync);

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_load_missing_source() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = Vault::load(&temp_dir.path().join("missing"), &["md".to_owned()]);
        assert!(matches!(result, Err(VaultError::SourceNotFound(_))));
    }

    #[test]
    fn test_embed_html_precomputed() {
        let temp_dir = tempfile::tempdir().unwrap();
        write(temp_dir.path(), "1-guide/intro.md", "# Intro\n\nHello **world**");
        let vault = Vault::load(temp_dir.path(), &["md".to_owned()]).unwrap();

        let id = vault.document_by_path("1-guide/intro.md").unwrap().id;
        assert_eq!(
            vault.embed_html(id),
            r#"<h1 id="intro">Intro</h1><p>Hello <strong>world</strong></p>"#
        );
    }

    #[test]
    fn test_read_document() {
        let temp_dir = tempfile::tempdir().unwrap();
        write(temp_dir.path(), "1-guide/intro.md", "text");
        let vault = Vault::load(temp_dir.path(), &["md".to_owned()]).unwrap();

        let id = vault.documents()[0].id;
        assert_eq!(vault.read_document(id).unwrap(), "text");

        fs::remove_file(temp_dir.path().join("1-guide/intro.md")).unwrap();
        assert!(matches!(vault.read_document(id), Err(VaultError::Io { .. })));
    }

    #[test]
    fn test_search_records() {
        let temp_dir = tempfile::tempdir().unwrap();
        write(temp_dir.path(), "index.md", "# Welcome");
        write(temp_dir.path(), "1-guide/02 - First Steps.md", "Do `this` first");
        let vault = Vault::load(temp_dir.path(), &["md".to_owned()]).unwrap();

        assert_eq!(
            vault.search_records(),
            vec![
                SearchRecord {
                    title: "index".to_owned(),
                    path: "index.html".to_owned(),
                    text: "Welcome".to_owned(),
                },
                SearchRecord {
                    title: "First Steps".to_owned(),
                    path: "1-guide/02%20-%20First%20Steps.html".to_owned(),
                    text: "Do first".to_owned(),
                },
            ]
        );
    }

    #[test]
    fn test_unreadable_document_still_indexed() {
        let temp_dir = tempfile::tempdir().unwrap();
        write(temp_dir.path(), "1-guide/broken.md", "");
        fs::write(temp_dir.path().join("1-guide/broken.md"), [0xff, 0xfe, 0x00]).unwrap();
        let vault = Vault::load(temp_dir.path(), &["md".to_owned()]).unwrap();

        let records = vault.search_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "broken");
        assert_eq!(records[0].text, "");
        assert_eq!(vault.embed_html(vault.documents()[0].id), "");
    }
}
