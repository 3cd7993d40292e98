//! Static site builder.
//!
//! A build runs in three phases:
//! 1. load the [`Vault`] (scan, link index, embed bodies) and prepare a clean
//!    output directory with the assets copied in
//! 2. assemble and write every page, in parallel, against the shared vault
//! 3. write the search index and search page

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use quire_config::Config;
use quire_renderer::{MarkdownRenderer, TocEntry};
use quire_site::{
    Document, SEARCH_INDEX_PATH, SEARCH_PAGE_PATH, Vault, VaultError, href,
    search_index_json,
};
use rayon::prelude::*;

use crate::assets::AssetCopier;
use crate::template::{self, PageData, STYLESHEET, STYLESHEET_PATH};

/// Smallest table of contents worth showing next to a page.
const MIN_TOC_ENTRIES: usize = 2;

/// Configuration for static site building.
#[derive(Clone, Debug)]
pub struct BuildConfig {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Recognised document extensions, lowercase, without dots.
    pub extensions: Vec<String>,
    /// Appended to every browser title; empty for none.
    pub site_title: String,
}

impl BuildConfig {
    /// Build settings from a loaded configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            source_dir: config.vault_resolved.source_dir.clone(),
            output_dir: config.output_dir.clone(),
            extensions: config.vault_resolved.extensions.clone(),
            site_title: config.site.title.clone(),
        }
    }
}

/// Error returned by the static site builder.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Vault(#[from] VaultError),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize search index: {0}")]
    Json(#[from] serde_json::Error),

    #[error(
        "Output directory {} would replace source directory {}",
        output.display(),
        source_dir.display()
    )]
    OutputOverlapsSource { output: PathBuf, source_dir: PathBuf },
}

impl BuildError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Counts reported after a successful build.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub pages: usize,
    pub assets: usize,
    pub embeds: usize,
}

/// Builds a static site from a vault directory.
pub struct StaticSiteBuilder {
    config: BuildConfig,
}

impl StaticSiteBuilder {
    #[must_use]
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    /// Run a clean build.
    ///
    /// The output directory is removed and recreated. Nothing is written when
    /// the source directory is missing or the output directory would contain
    /// it.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] if the vault cannot be scanned, the directories
    /// overlap, a document cannot be read, or any output cannot be written.
    pub fn build(&self) -> Result<BuildSummary, BuildError> {
        let source_dir = &self.config.source_dir;
        let output_dir = &self.config.output_dir;

        // Phase 1: global barrier. Everything below reads this snapshot only.
        let vault = Vault::load(source_dir, &self.config.extensions)?;
        let skip_dir = check_overlap(source_dir, output_dir)?;

        clean_output(output_dir)?;
        let assets = AssetCopier {
            extensions: &self.config.extensions,
            skip_dir: skip_dir.as_deref(),
        }
        .copy(source_dir, output_dir)?;
        tracing::info!(assets, "Copied assets");
        write_file(&output_dir.join(STYLESHEET_PATH), STYLESHEET)?;

        // Phase 2: pages, independent of each other.
        let embeds: usize = vault
            .documents()
            .par_iter()
            .map(|doc| self.build_page(&vault, doc))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .sum();
        tracing::info!(pages = vault.documents().len(), embeds, "Wrote pages");

        // Phase 3: search.
        let records = vault.search_records();
        write_file(
            &output_dir.join(SEARCH_INDEX_PATH),
            &search_index_json(&records)?,
        )?;
        write_file(
            &output_dir.join(SEARCH_PAGE_PATH),
            &template::render_search_page(&self.config.site_title),
        )?;

        Ok(BuildSummary {
            pages: vault.documents().len(),
            assets,
            embeds,
        })
    }

    /// Assemble and write one page, returning the number of embeds it holds.
    fn build_page(&self, vault: &Vault, doc: &Document) -> Result<usize, BuildError> {
        let text = vault.read_document(doc.id)?;
        let rewritten = vault.rewrite_references(doc.id, &text);
        let rendered =
            rewritten.restore_page(MarkdownRenderer::new().render_markdown(&rewritten.text));

        let toc: &[TocEntry] = if rendered.toc.len() >= MIN_TOC_ENTRIES {
            rendered.toc.as_slice()
        } else {
            &[]
        };
        let navigation = vault.navigation(doc.id);
        let css_path = href(&doc.output_path, STYLESHEET_PATH);

        let html = template::render_page(&PageData {
            title: &doc.title,
            site_title: &self.config.site_title,
            navigation: &navigation,
            html_content: &rendered.html,
            toc,
            css_path: &css_path,
        });

        let path = self.config.output_dir.join(&doc.output_path);
        write_file(&path, &html)?;
        tracing::debug!(
            source = %doc.rel_path,
            output = %doc.output_path,
            embeds = rewritten.embed_count(),
            "Wrote page"
        );
        Ok(rewritten.embed_count())
    }
}

/// Refuse output directories that equal or contain the source directory.
///
/// Returns the canonical output directory when it lies inside the source
/// tree, so the asset copier can skip it.
fn check_overlap(source_dir: &Path, output_dir: &Path) -> Result<Option<PathBuf>, BuildError> {
    let source = source_dir
        .canonicalize()
        .map_err(|e| BuildError::io(source_dir, e))?;
    let output = resolve(output_dir).map_err(|e| BuildError::io(output_dir, e))?;

    if source.starts_with(&output) {
        return Err(BuildError::OutputOverlapsSource {
            output: output_dir.to_path_buf(),
            source_dir: source_dir.to_path_buf(),
        });
    }
    Ok(output.starts_with(&source).then_some(output))
}

/// Canonicalize a path that may not exist yet.
fn resolve(path: &Path) -> io::Result<PathBuf> {
    if path.exists() {
        return path.canonicalize();
    }
    let absolute = std::path::absolute(path)?;
    match (absolute.parent(), absolute.file_name()) {
        (Some(parent), Some(name)) => Ok(resolve(parent)?.join(name)),
        _ => Ok(absolute),
    }
}

fn clean_output(output_dir: &Path) -> Result<(), BuildError> {
    if output_dir.exists() {
        fs::remove_dir_all(output_dir).map_err(|e| BuildError::io(output_dir, e))?;
    }
    fs::create_dir_all(output_dir).map_err(|e| BuildError::io(output_dir, e))
}

fn write_file(path: &Path, contents: &str) -> Result<(), BuildError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
    }
    fs::write(path, contents).map_err(|e| BuildError::io(path, e))
}
