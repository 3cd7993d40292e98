//! Static site generation for Quire.
//!
//! [`StaticSiteBuilder`] turns a vault directory into a browsable site: one
//! HTML page per document with sidebar navigation, embedded `[[references]]`
//! and a contents panel, the vault's other files copied alongside, and a
//! client-side search page backed by `assets/search_index.json`.
//!
//! ```no_run
//! use quire_build::{BuildConfig, StaticSiteBuilder};
//!
//! let config = BuildConfig {
//!     source_dir: "content".into(),
//!     output_dir: "site".into(),
//!     extensions: vec!["md".to_owned()],
//!     site_title: "Field Notes".to_owned(),
//! };
//! let summary = StaticSiteBuilder::new(config).build()?;
//! println!("{} pages", summary.pages);
//! # Ok::<(), quire_build::BuildError>(())
//! ```

mod assets;
mod builder;
mod template;

pub use builder::{BuildConfig, BuildError, BuildSummary, StaticSiteBuilder};
