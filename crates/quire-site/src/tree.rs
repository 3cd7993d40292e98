//! Document discovery and the navigation tree.
//!
//! Inclusion rules:
//! - hidden entries (leading dot) are skipped at every level
//! - at the vault root only folders whose name starts with a digit are
//!   entered, and only a document named `index` is taken
//! - below an included top-level folder every folder and every document with
//!   a recognised extension is taken

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::path::{forced_output_path, output_path, split_source};
use crate::title::{canonical_title, starts_with_ordinal};

/// Error returned when the vault cannot be scanned.
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    #[error("Source directory not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Source path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Position of a document in the ordered document list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(usize);

impl DocumentId {
    /// Index into [`SourceTree::documents`].
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A text document included in the build.
#[derive(Clone, Debug)]
pub struct Document {
    pub id: DocumentId,
    /// Absolute path of the source file.
    pub source_path: PathBuf,
    /// Source path relative to the vault root, `/`-separated.
    pub rel_path: String,
    /// File name without extension.
    pub stem: String,
    /// Stem with its ordinal prefix removed.
    pub title: String,
    /// Output path relative to the site root, `/`-separated.
    pub output_path: String,
}

impl Document {
    /// File name including extension.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.rel_path
            .rsplit_once('/')
            .map_or(self.rel_path.as_str(), |(_, name)| name)
    }
}

/// A folder in the navigation hierarchy.
#[derive(Clone, Debug, Default)]
pub struct DirectoryNode {
    /// Folder name as found on disk (empty for the vault root).
    pub name: String,
    /// Path relative to the vault root, `/`-separated (empty for the root).
    pub rel_path: String,
    /// Documents directly in this folder, ordered by lowercase file name.
    pub documents: Vec<DocumentId>,
    pub children: BTreeMap<String, DirectoryNode>,
}

impl DirectoryNode {
    fn new(name: String, rel_path: String) -> Self {
        Self {
            name,
            rel_path,
            documents: Vec::new(),
            children: BTreeMap::new(),
        }
    }

    /// Whether `rel_path` (a document source path) lies inside this folder.
    #[must_use]
    pub fn contains(&self, rel_path: &str) -> bool {
        self.rel_path.is_empty()
            || rel_path
                .strip_prefix(self.rel_path.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
    }

    fn node_mut(&mut self, rel_dir: &str) -> Option<&mut DirectoryNode> {
        if rel_dir.is_empty() {
            return Some(self);
        }
        let mut node = self;
        for segment in rel_dir.split('/') {
            node = node.children.get_mut(segment)?;
        }
        Some(node)
    }
}

/// Result of scanning a vault: the folder tree and the ordered document list.
#[derive(Clone, Debug)]
pub struct SourceTree {
    pub root: DirectoryNode,
    /// Root index first (if present), then by lowercase relative path.
    pub documents: Vec<Document>,
}

impl SourceTree {
    /// Scan `source_dir`, taking documents whose extension is in `extensions`.
    ///
    /// Extensions are compared case-insensitively and given without a dot.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError`] if `source_dir` is missing, is not a directory,
    /// or a folder inside it cannot be listed.
    pub fn scan(source_dir: &Path, extensions: &[String]) -> Result<Self, VaultError> {
        if !source_dir.exists() {
            return Err(VaultError::SourceNotFound(source_dir.to_path_buf()));
        }
        if !source_dir.is_dir() {
            return Err(VaultError::NotADirectory(source_dir.to_path_buf()));
        }

        let scanner = Scanner { extensions };
        let mut root = DirectoryNode::default();
        let mut found = Vec::new();
        scanner.scan_directory(source_dir, &mut root, &mut found)?;

        found.sort_by_cached_key(|rel: &String| (!is_root_index(rel), rel.to_lowercase()));

        let documents = assign_documents(source_dir, found);
        for doc in &documents {
            let (parent, _) = split_source(&doc.rel_path);
            if let Some(node) = root.node_mut(parent) {
                node.documents.push(doc.id);
            }
        }
        sort_documents(&mut root, &documents);

        Ok(Self { root, documents })
    }
}

struct Scanner<'a> {
    extensions: &'a [String],
}

impl Scanner<'_> {
    fn scan_directory(
        &self,
        dir_path: &Path,
        node: &mut DirectoryNode,
        found: &mut Vec<String>,
    ) -> Result<(), VaultError> {
        let at_root = node.rel_path.is_empty();

        for entry in read_entries(dir_path)? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            let path = entry.path();
            let is_dir = entry
                .file_type()
                .map_err(|source| VaultError::Io {
                    path: path.clone(),
                    source,
                })?
                .is_dir();
            let rel_path = if at_root {
                name.clone()
            } else {
                format!("{}/{name}", node.rel_path)
            };

            if is_dir {
                if at_root && !starts_with_ordinal(&name) {
                    continue;
                }
                let mut child = DirectoryNode::new(name.clone(), rel_path);
                self.scan_directory(&path, &mut child, found)?;
                node.children.insert(name, child);
            } else if self.is_document(&name) {
                if at_root && !is_root_index(&name) {
                    continue;
                }
                found.push(rel_path);
            }
        }
        Ok(())
    }

    fn is_document(&self, file_name: &str) -> bool {
        is_document_name(file_name, self.extensions)
    }
}

/// List a directory, failing on the first entry that cannot be read.
fn read_entries(dir_path: &Path) -> Result<Vec<fs::DirEntry>, VaultError> {
    let io_error = |source: std::io::Error| VaultError::Io {
        path: dir_path.to_path_buf(),
        source,
    };
    fs::read_dir(dir_path)
        .map_err(io_error)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_error)
}

/// Whether `file_name` has one of the recognised text-document extensions.
#[must_use]
pub fn is_document_name(file_name: &str, extensions: &[String]) -> bool {
    file_name.rsplit_once('.').is_some_and(|(stem, ext)| {
        !stem.is_empty() && extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    })
}

fn is_root_index(rel_path: &str) -> bool {
    let (parent, stem) = split_source(rel_path);
    parent.is_empty() && stem.eq_ignore_ascii_case("index")
}

/// Build documents in order, keeping output paths unique case-insensitively.
fn assign_documents(source_dir: &Path, rel_paths: Vec<String>) -> Vec<Document> {
    let mut taken: HashSet<String> = HashSet::with_capacity(rel_paths.len());
    let mut documents = Vec::with_capacity(rel_paths.len());

    for (index, rel_path) in rel_paths.into_iter().enumerate() {
        let mut output = output_path(&rel_path);
        let mut salt = 0;
        while taken.contains(&output.to_lowercase()) {
            tracing::debug!(source = %rel_path, output = %output, "Output path collision, adding hash");
            output = forced_output_path(&rel_path, salt);
            salt += 1;
        }
        taken.insert(output.to_lowercase());

        let (_, stem) = split_source(&rel_path);
        let stem = stem.to_owned();
        documents.push(Document {
            id: DocumentId(index),
            source_path: source_dir.join(&rel_path),
            title: canonical_title(&stem),
            stem,
            output_path: output,
            rel_path,
        });
    }
    documents
}

fn sort_documents(node: &mut DirectoryNode, documents: &[Document]) {
    node.documents
        .sort_by_cached_key(|id| documents[id.index()].file_name().to_lowercase());
    for child in node.children.values_mut() {
        sort_documents(child, documents);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn extensions() -> Vec<String> {
        vec!["md".to_owned(), "markdown".to_owned()]
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn rel_paths(tree: &SourceTree) -> Vec<&str> {
        tree.documents.iter().map(|d| d.rel_path.as_str()).collect()
    }

    #[test]
    fn test_scan_missing_source() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = SourceTree::scan(&temp_dir.path().join("nope"), &extensions()).unwrap_err();
        assert!(matches!(err, VaultError::SourceNotFound(_)));
    }

    #[test]
    fn test_scan_source_is_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        write(temp_dir.path(), "file.md", "x");
        let err = SourceTree::scan(&temp_dir.path().join("file.md"), &extensions()).unwrap_err();
        assert!(matches!(err, VaultError::NotADirectory(_)));
    }

    #[test]
    fn test_root_only_takes_index() {
        let temp_dir = tempfile::tempdir().unwrap();
        write(temp_dir.path(), "index.md", "# Home");
        write(temp_dir.path(), "readme.md", "# Readme");
        write(temp_dir.path(), "1-guide/intro.md", "# Intro");

        let tree = SourceTree::scan(temp_dir.path(), &extensions()).unwrap();
        assert_eq!(rel_paths(&tree), vec!["index.md", "1-guide/intro.md"]);
    }

    #[test]
    fn test_top_level_requires_leading_digit() {
        let temp_dir = tempfile::tempdir().unwrap();
        write(temp_dir.path(), "drafts/a.md", "");
        write(temp_dir.path(), "½-extra/d.md", "");
        write(temp_dir.path(), "2-notes/b.md", "");
        write(temp_dir.path(), "2-notes/sub/c.md", "");

        let tree = SourceTree::scan(temp_dir.path(), &extensions()).unwrap();
        assert_eq!(rel_paths(&tree), vec!["2-notes/b.md", "2-notes/sub/c.md"]);
        assert!(!tree.root.children.contains_key("drafts"));
        assert!(!tree.root.children.contains_key("½-extra"));
        assert!(tree.root.children["2-notes"].children.contains_key("sub"));
    }

    #[test]
    fn test_read_entries_reports_path_on_failure() {
        let temp_dir = tempfile::tempdir().unwrap();
        write(temp_dir.path(), "1-a/x.md", "");
        assert_eq!(read_entries(&temp_dir.path().join("1-a")).unwrap().len(), 1);

        let missing = temp_dir.path().join("gone");
        match read_entries(&missing) {
            Err(VaultError::Io { path, .. }) => assert_eq!(path, missing),
            other => panic!("expected Io error, got {other:?}"),
        }
    }

    #[test]
    fn test_hidden_entries_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        write(temp_dir.path(), ".1-hidden/a.md", "");
        write(temp_dir.path(), "1-guide/.obsidian/x.md", "");
        write(temp_dir.path(), "1-guide/.draft.md", "");
        write(temp_dir.path(), "1-guide/ok.md", "");

        let tree = SourceTree::scan(temp_dir.path(), &extensions()).unwrap();
        assert_eq!(rel_paths(&tree), vec!["1-guide/ok.md"]);
    }

    #[test]
    fn test_only_recognised_extensions() {
        let temp_dir = tempfile::tempdir().unwrap();
        write(temp_dir.path(), "1-guide/a.MD", "");
        write(temp_dir.path(), "1-guide/b.markdown", "");
        write(temp_dir.path(), "1-guide/c.txt", "");
        write(temp_dir.path(), "1-guide/d.png", "");

        let tree = SourceTree::scan(temp_dir.path(), &extensions()).unwrap();
        assert_eq!(rel_paths(&tree), vec!["1-guide/a.MD", "1-guide/b.markdown"]);
    }

    #[test]
    fn test_flat_order_root_index_first_then_case_insensitive() {
        let temp_dir = tempfile::tempdir().unwrap();
        write(temp_dir.path(), "1-a/Zeta.md", "");
        write(temp_dir.path(), "1-a/alpha.md", "");
        write(temp_dir.path(), "0-first/x.md", "");
        write(temp_dir.path(), "Index.md", "");

        let tree = SourceTree::scan(temp_dir.path(), &extensions()).unwrap();
        assert_eq!(
            rel_paths(&tree),
            vec!["Index.md", "0-first/x.md", "1-a/alpha.md", "1-a/Zeta.md"]
        );
        for (i, doc) in tree.documents.iter().enumerate() {
            assert_eq!(doc.id.index(), i);
        }
    }

    #[test]
    fn test_directory_documents_sorted_by_file_name() {
        let temp_dir = tempfile::tempdir().unwrap();
        write(temp_dir.path(), "1-a/b.md", "");
        write(temp_dir.path(), "1-a/A.md", "");
        write(temp_dir.path(), "1-a/c.md", "");

        let tree = SourceTree::scan(temp_dir.path(), &extensions()).unwrap();
        let names: Vec<_> = tree.root.children["1-a"]
            .documents
            .iter()
            .map(|id| tree.documents[id.index()].file_name())
            .collect();
        assert_eq!(names, vec!["A.md", "b.md", "c.md"]);
    }

    #[test]
    fn test_empty_folders_kept() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(temp_dir.path().join("3-empty/inner")).unwrap();

        let tree = SourceTree::scan(temp_dir.path(), &extensions()).unwrap();
        let empty = &tree.root.children["3-empty"];
        assert!(empty.documents.is_empty());
        assert_eq!(empty.children["inner"].rel_path, "3-empty/inner");
    }

    #[test]
    fn test_document_fields() {
        let temp_dir = tempfile::tempdir().unwrap();
        write(temp_dir.path(), "1-guide/03 - Setup.md", "");

        let tree = SourceTree::scan(temp_dir.path(), &extensions()).unwrap();
        let doc = &tree.documents[0];
        assert_eq!(doc.stem, "03 - Setup");
        assert_eq!(doc.title, "Setup");
        assert_eq!(doc.output_path, "1-guide/03 - Setup.html");
        assert_eq!(doc.source_path, temp_dir.path().join("1-guide/03 - Setup.md"));
        assert_eq!(doc.file_name(), "03 - Setup.md");
    }

    #[test]
    fn test_colliding_outputs_get_distinct_paths() {
        let temp_dir = tempfile::tempdir().unwrap();
        write(temp_dir.path(), "1-a/setup.md", "");
        write(temp_dir.path(), "1-a/setup.markdown", "");

        let tree = SourceTree::scan(temp_dir.path(), &extensions()).unwrap();
        let find = |rel: &str| tree.documents.iter().find(|d| d.rel_path == rel).unwrap();
        let md = find("1-a/setup.md");
        let markdown = find("1-a/setup.markdown");
        // "setup.markdown" sorts first and keeps the clean name.
        assert_eq!(markdown.output_path, "1-a/setup.html");
        assert!(md.output_path.starts_with("1-a/setup-"));
        assert_ne!(md.output_path, markdown.output_path);
    }

    #[test]
    fn test_output_paths_pairwise_distinct_ignoring_case() {
        let temp_dir = tempfile::tempdir().unwrap();
        for name in ["Note.md", "note.markdown", "a?b.md", "a*b.md", "index.md", "INDEX.markdown"] {
            write(temp_dir.path(), &format!("1-x/{name}"), "");
        }

        let tree = SourceTree::scan(temp_dir.path(), &extensions()).unwrap();
        let outputs: HashSet<_> = tree
            .documents
            .iter()
            .map(|d| d.output_path.to_lowercase())
            .collect();
        assert_eq!(outputs.len(), tree.documents.len());
    }

    #[test]
    fn test_contains() {
        let node = DirectoryNode::new("1-guide".to_owned(), "1-guide".to_owned());
        assert!(node.contains("1-guide/intro.md"));
        assert!(node.contains("1-guide/deep/x.md"));
        assert!(!node.contains("1-guidebook/x.md"));
        assert!(!node.contains("index.md"));
        assert!(DirectoryNode::default().contains("index.md"));
    }
}
