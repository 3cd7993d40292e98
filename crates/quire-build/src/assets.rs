//! Copying of non-document files into the output directory.

use std::fs;
use std::path::Path;

use quire_site::is_document_name;

use crate::builder::BuildError;

/// Copies every file that is not a text document, preserving relative paths.
///
/// Hidden entries are skipped at every level, and so is `skip_dir` (the
/// output directory, when it lies inside the source tree).
pub(crate) struct AssetCopier<'a> {
    pub extensions: &'a [String],
    pub skip_dir: Option<&'a Path>,
}

impl AssetCopier<'_> {
    /// Copy assets from `source_dir` into `output_dir`, returning the file count.
    pub(crate) fn copy(&self, source_dir: &Path, output_dir: &Path) -> Result<usize, BuildError> {
        self.copy_directory(source_dir, output_dir)
    }

    fn copy_directory(&self, dir: &Path, target: &Path) -> Result<usize, BuildError> {
        let mut copied = 0;

        for entry in read_entries(dir)? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            let path = entry.path();

            if path.is_dir() {
                if self.is_skipped(&path) {
                    tracing::debug!(path = %path.display(), "Skipping output directory");
                    continue;
                }
                copied += self.copy_directory(&path, &target.join(&name))?;
            } else if path.is_file() && !is_document_name(&name, self.extensions) {
                fs::create_dir_all(target).map_err(|e| BuildError::io(target, e))?;
                let dest = target.join(&name);
                fs::copy(&path, &dest).map_err(|e| BuildError::io(&dest, e))?;
                copied += 1;
            }
        }
        Ok(copied)
    }

    fn is_skipped(&self, dir: &Path) -> bool {
        self.skip_dir.is_some_and(|skip| {
            dir.canonicalize()
                .is_ok_and(|canonical| canonical == skip)
        })
    }
}

/// List a directory, failing on the first entry that cannot be read.
fn read_entries(dir: &Path) -> Result<Vec<fs::DirEntry>, BuildError> {
    fs::read_dir(dir)
        .map_err(|e| BuildError::io(dir, e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| BuildError::io(dir, e))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn extensions() -> Vec<String> {
        vec!["md".to_owned(), "markdown".to_owned()]
    }

    #[test]
    fn test_copies_non_documents_preserving_paths() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = temp_dir.path().join("content");
        let output = temp_dir.path().join("site");
        write(&source, "1-guide/img/diagram.png", "png");
        write(&source, "1-guide/intro.md", "# Intro");
        write(&source, "attachments/file.pdf", "pdf");
        write(&source, "notes.MARKDOWN", "text");

        let extensions = extensions();
        let copier = AssetCopier {
            extensions: &extensions,
            skip_dir: None,
        };
        let copied = copier.copy(&source, &output).unwrap();

        assert_eq!(copied, 2);
        assert_eq!(
            fs::read_to_string(output.join("1-guide/img/diagram.png")).unwrap(),
            "png"
        );
        assert!(output.join("attachments/file.pdf").exists());
        assert!(!output.join("1-guide/intro.md").exists());
        assert!(!output.join("notes.MARKDOWN").exists());
    }

    #[test]
    fn test_skips_hidden_entries() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = temp_dir.path().join("content");
        let output = temp_dir.path().join("site");
        write(&source, ".obsidian/workspace.json", "{}");
        write(&source, "1-guide/.DS_Store", "");
        write(&source, "1-guide/logo.svg", "<svg/>");

        let extensions = extensions();
        let copier = AssetCopier {
            extensions: &extensions,
            skip_dir: None,
        };
        assert_eq!(copier.copy(&source, &output).unwrap(), 1);
        assert!(!output.join(".obsidian").exists());
        assert!(!output.join("1-guide/.DS_Store").exists());
    }

    #[test]
    fn test_skips_output_inside_source() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = temp_dir.path().join("content");
        write(&source, "logo.png", "png");
        write(&source, "_site/old.png", "stale");
        let output = source.join("_site");
        let skip = output.canonicalize().unwrap();

        let extensions = extensions();
        let copier = AssetCopier {
            extensions: &extensions,
            skip_dir: Some(&skip),
        };
        assert_eq!(copier.copy(&source, &output).unwrap(), 1);
        assert!(output.join("logo.png").exists());
        assert!(!output.join("_site").exists());
    }

    #[test]
    fn test_unlistable_directory_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("gone");

        let extensions = extensions();
        let copier = AssetCopier {
            extensions: &extensions,
            skip_dir: None,
        };
        match copier.copy(&missing, &temp_dir.path().join("site")) {
            Err(BuildError::Io { path, .. }) => assert_eq!(path, missing),
            other => panic!("expected Io error, got {other:?}"),
        }
    }
}
