//! `[[target]]` references rewritten into collapsible embeds.
//!
//! Rewriting happens in two steps. [`rewrite_references`] swaps every
//! resolvable marker for a placeholder token before markdown conversion;
//! [`RewrittenText::restore_page`] swaps the tokens for the embed HTML
//! afterwards, so the converter never sees (or escapes) the inserted markup.
//! Markers inside code spans and code blocks are left as written.

use std::collections::HashSet;
use std::fmt::Write;
use std::ops::Range;
use std::sync::LazyLock;

use pulldown_cmark::{Event, Parser, Tag};
use quire_renderer::{MarkdownRenderer, RenderResult, escape_html, slugify};
use regex::{Captures, Regex};

use crate::path::href;
use crate::tree::{Document, DocumentId};
use crate::vault::Vault;

/// `[[target]]`, `[[target#fragment]]`, `[[target|alias]]` and combinations.
static REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\]|#]+)(?:#([^\]|]+))?(?:\|([^\]]+))?\]\]").unwrap());

/// Placeholder tokens are delimited by private-use code points, which
/// markdown sources do not contain.
const TOKEN_START: char = '\u{E000}';
const TOKEN_END: char = '\u{E001}';

fn placeholder(index: usize) -> String {
    format!("{TOKEN_START}{index}{TOKEN_END}")
}

#[derive(Clone, Debug)]
struct Embed {
    /// Target title, shown wherever only plain text fits.
    label: String,
    html: String,
}

/// Document text with references replaced by placeholder tokens.
#[derive(Clone, Debug, Default)]
pub struct RewrittenText {
    /// Text to hand to the markdown converter.
    pub text: String,
    embeds: Vec<Embed>,
}

impl RewrittenText {
    /// Number of references that resolved.
    #[must_use]
    pub fn embed_count(&self) -> usize {
        self.embeds.len()
    }

    /// Replace placeholder tokens in converted HTML with the embed blocks.
    ///
    /// A token that ended up alone in a paragraph replaces the whole
    /// paragraph, keeping the block-level embed out of `<p>`.
    #[must_use]
    pub fn restore(&self, html: &str) -> String {
        let mut result = html.to_owned();
        for (index, embed) in self.embeds.iter().enumerate() {
            let token = placeholder(index);
            result = result
                .replace(&format!("<p>{token}</p>"), &embed.html)
                .replace(&token, &embed.html);
        }
        result
    }

    /// Replace placeholder tokens in plain text with the target titles.
    #[must_use]
    pub fn restore_text(&self, text: &str) -> String {
        let mut result = text.to_owned();
        for (index, embed) in self.embeds.iter().enumerate() {
            result = result.replace(&placeholder(index), &embed.label);
        }
        result
    }

    /// Restore a converted page.
    ///
    /// Headings that held a reference get the target title in their table of
    /// contents entry and a fresh anchor derived from it; the heading `id` in
    /// the HTML is renamed to match. Then [`Self::restore`] inserts the embeds.
    #[must_use]
    pub fn restore_page(&self, rendered: RenderResult) -> RenderResult {
        let RenderResult { mut html, mut toc } = rendered;
        let mut taken: HashSet<String> = toc.iter().map(|entry| entry.id.clone()).collect();

        for entry in toc.iter_mut().filter(|entry| entry.title.contains(TOKEN_START)) {
            entry.title = self.restore_text(&entry.title);
            let id = unique_id(&slugify(&entry.title), &taken);
            html = html.replacen(
                &format!(r#" id="{}">"#, entry.id),
                &format!(r#" id="{id}">"#),
                1,
            );
            taken.insert(id.clone());
            entry.id = id;
        }

        RenderResult {
            html: self.restore(&html),
            toc,
        }
    }
}

fn unique_id(base: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_owned();
    }
    (1..)
        .map(|n| format!("{base}-{n}"))
        .find(|id| !taken.contains(id))
        .unwrap_or_default()
}

/// Byte ranges of code spans and code blocks in markdown source.
fn code_ranges(text: &str) -> Vec<Range<usize>> {
    Parser::new_ext(text, MarkdownRenderer::parser_options())
        .into_offset_iter()
        .filter_map(|(event, range)| match event {
            Event::Code(_) | Event::Start(Tag::CodeBlock(_)) => Some(range),
            _ => None,
        })
        .collect()
}

/// Replace resolvable references in `text`, the source of document `current`.
///
/// The embed label is always the target's title; alias text is ignored.
/// References that do not resolve, or that sit inside code, are left exactly
/// as written.
#[must_use]
pub fn rewrite_references(vault: &Vault, current: DocumentId, text: &str) -> RewrittenText {
    let current = vault.document(current);
    let code = code_ranges(text);
    let mut embeds = Vec::new();

    let text = REFERENCE.replace_all(text, |caps: &Captures<'_>| {
        let start = caps.get(0).map_or(0, |m| m.start());
        if code.iter().any(|range| range.contains(&start)) {
            return caps[0].to_owned();
        }
        let Some(target) = vault.links().resolve(&caps[1]) else {
            tracing::debug!(page = %current.rel_path, reference = &caps[0], "Unresolved reference");
            return caps[0].to_owned();
        };
        let target = vault.document(target);
        let fragment = caps
            .get(2)
            .map(|m| m.as_str().trim())
            .filter(|f| !f.is_empty());
        embeds.push(Embed {
            label: target.title.clone(),
            html: embed_block(vault, current, target, fragment),
        });
        placeholder(embeds.len() - 1)
    });

    RewrittenText {
        text: text.into_owned(),
        embeds,
    }
}

fn embed_block(vault: &Vault, current: &Document, target: &Document, fragment: Option<&str>) -> String {
    let mut link = href(&current.output_path, &target.output_path);
    if let Some(fragment) = fragment {
        link.push('#');
        link.push_str(&slugify(fragment));
    }

    let mut html = String::with_capacity(256);
    html.push_str(r#"<details class="embed-block mb-3">"#);
    html.push_str(
        r#"<summary class="text-muted d-flex align-items-center justify-content-between">"#,
    );
    let _ = write!(
        html,
        r#"<span>{}</span><span class="chev" aria-hidden="true">▸</span></summary>"#,
        escape_html(&target.title)
    );
    html.push_str(r#"<div class="mt-2">"#);
    html.push_str(vault.embed_html(target.id));
    let _ = write!(
        html,
        r#"<div class="mt-2"><a href="{}" class="link-secondary">Open page →</a></div>"#,
        escape_html(&link)
    );
    html.push_str("</div></details>");
    html
}
