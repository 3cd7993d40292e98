//! Sidebar navigation rendered for one page.

use std::fmt::Write;

use quire_renderer::escape_html;

use crate::path::{HOME_PAGE_PATH, href};
use crate::search::SEARCH_PAGE_PATH;
use crate::title::canonical_title;
use crate::tree::{DirectoryNode, Document, DocumentId};
use crate::vault::Vault;

/// Render the navigation fragment for page `current`.
///
/// Every link is relative to the current page. Folders are `<details>`
/// sections that start open only when they contain the current page.
#[must_use]
pub fn render_navigation(vault: &Vault, current: DocumentId) -> String {
    let current = vault.document(current);

    let mut items = String::with_capacity(2048);
    render_directory(&mut items, vault, vault.root(), current);

    let search = escape_html(&href(&current.output_path, SEARCH_PAGE_PATH));
    let home = escape_html(&href(&current.output_path, HOME_PAGE_PATH));

    let mut html = String::with_capacity(items.len() + 512);
    html.push_str(r#"<div class="p-2">"#);
    let _ = write!(
        html,
        r#"<form class="mb-2" action="{search}" method="get"><div class="input-group input-group-sm">"#
    );
    html.push_str(
        r#"<input class="form-control" type="text" name="q" placeholder="Search…"><button class="btn btn-outline-secondary" type="submit">Search</button>"#,
    );
    html.push_str("</div></form>");
    let _ = write!(
        html,
        r#"<a class="btn btn-outline-primary w-100 mb-2" href="{home}">Home</a>"#
    );
    let _ = write!(html, r#"<ul class="list-unstyled">{items}</ul></div>"#);
    html
}

fn render_directory(html: &mut String, vault: &Vault, node: &DirectoryNode, current: &Document) {
    for &id in &node.documents {
        let doc = vault.document(id);
        let (class, aria) = if id == current.id {
            (" active", r#" aria-current="page""#)
        } else {
            ("", "")
        };
        let _ = write!(
            html,
            r#"<li class="nav-item"><a class="nav-link{class}"{aria} href="{}">{}</a></li>"#,
            escape_html(&href(&current.output_path, &doc.output_path)),
            escape_html(&doc.title),
        );
    }

    let mut children: Vec<&DirectoryNode> = node.children.values().collect();
    children.sort_by_cached_key(|child| child.name.to_lowercase());

    for child in children {
        let open = if child.contains(&current.rel_path) {
            " open"
        } else {
            ""
        };
        let _ = write!(
            html,
            r#"<li><details class="mb-1"{open}><summary class="fw-semibold d-flex align-items-center justify-content-between"><span>{}</span><span class="chev" aria-hidden="true">▸</span></summary>"#,
            escape_html(&canonical_title(&child.name)),
        );
        html.push_str(r#"<ul class="list-unstyled ms-3 my-1">"#);
        render_directory(html, vault, child, current);
        html.push_str("</ul></details></li>");
    }
}
