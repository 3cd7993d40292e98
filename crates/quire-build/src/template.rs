//! HTML shells for content pages and the search page.
//!
//! Layout: a sticky navigation sidebar on the left, the page content in the
//! middle and an optional "On this page" panel on the right. Styling comes
//! from Bootstrap (CDN) plus the site stylesheet written next to the search
//! index.

use std::fmt::Write;

use quire_renderer::{TocEntry, escape_html as escape};
use quire_site::{CONTEXT_AFTER, CONTEXT_BEFORE, MAX_RESULTS, SEARCH_INDEX_PATH};

/// Output path of the site stylesheet.
pub(crate) const STYLESHEET_PATH: &str = "assets/quire.css";

const BOOTSTRAP_CSS: &str = "https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css";

/// All data needed to render a content page.
pub(crate) struct PageData<'a> {
    pub title: &'a str,
    pub site_title: &'a str,
    /// Navigation fragment, already relative to this page.
    pub navigation: &'a str,
    pub html_content: &'a str,
    /// Empty when the page should not show a contents panel.
    pub toc: &'a [TocEntry],
    /// Stylesheet href relative to this page.
    pub css_path: &'a str,
}

/// Browser title: `"<page> · <site>"`, or just the page title.
fn browser_title(title: &str, site_title: &str) -> String {
    if site_title.is_empty() {
        title.to_owned()
    } else {
        format!("{title} · {site_title}")
    }
}

fn render_head(html: &mut String, title: &str, css_path: &str) {
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str(
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n",
    );
    let _ = writeln!(html, "<title>{}</title>", escape(title));
    let _ = writeln!(html, "<link rel=\"stylesheet\" href=\"{BOOTSTRAP_CSS}\">");
    let _ = writeln!(html, "<link rel=\"stylesheet\" href=\"{}\">", escape(css_path));
    html.push_str("</head>\n");
}

/// Render a complete content page.
pub(crate) fn render_page(page: &PageData<'_>) -> String {
    let mut html = String::with_capacity(page.html_content.len() + page.navigation.len() + 4096);

    render_head(
        &mut html,
        &browser_title(page.title, page.site_title),
        page.css_path,
    );
    html.push_str("<body>\n<div class=\"layout-container\">\n");

    // Navigation sidebar
    let _ = writeln!(html, "<aside class=\"sidebar\">{}</aside>", page.navigation);

    // Main content
    html.push_str("<main class=\"content\">\n");
    let _ = writeln!(html, "<h1 class=\"h3\">{}</h1>", escape(page.title));
    html.push_str("<hr>\n");
    html.push_str(page.html_content);
    html.push_str("\n</main>\n");

    render_toc(&mut html, page.toc);

    html.push_str("</div>\n</body>\n</html>\n");
    html
}

/// Render the right-hand contents panel.
fn render_toc(html: &mut String, toc: &[TocEntry]) {
    if toc.is_empty() {
        return;
    }
    html.push_str("<aside class=\"rightbar\">\n<h2>On this page</h2>\n");
    html.push_str("<div class=\"toc\">\n<ul class=\"list-unstyled\">\n");
    for entry in toc {
        let indent = match entry.level {
            0..=2 => "",
            3 => " class=\"ms-3\"",
            _ => " class=\"ms-4\"",
        };
        let _ = writeln!(
            html,
            "<li{indent}><a href=\"#{}\">{}</a></li>",
            escape(&entry.id),
            escape(&entry.title),
        );
    }
    html.push_str("</ul>\n</div>\n</aside>\n");
}

/// Render the standalone search page served from the site root.
///
/// Loads the search index and filters it in the browser by
/// case-insensitive substring match over title and text. Title matches rank
/// first, then earlier matches.
pub(crate) fn render_search_page(site_title: &str) -> String {
    let mut html = String::with_capacity(4096);

    render_head(
        &mut html,
        &browser_title("Search", site_title),
        STYLESHEET_PATH,
    );
    html.push_str("<body class=\"search-page\">\n<div class=\"container\">\n");
    html.push_str("<h1>Search</h1>\n");
    html.push_str("<p><a href=\"index.html\">Home</a></p>\n");
    html.push_str("<form id=\"searchForm\" class=\"mb-3\">\n<div class=\"input-group\">\n");
    html.push_str(
        "<input type=\"text\" id=\"searchInput\" class=\"form-control\" placeholder=\"Search…\">\n",
    );
    html.push_str("<button type=\"submit\" class=\"btn btn-primary\">Search</button>\n");
    html.push_str("</div>\n</form>\n<div id=\"results\"></div>\n</div>\n");

    html.push_str("<script>\n");
    let _ = writeln!(
        html,
        "const MAX_RESULTS = {MAX_RESULTS};\nconst BEFORE = {CONTEXT_BEFORE};\nconst AFTER = {CONTEXT_AFTER};"
    );
    let _ = writeln!(html, "const INDEX_URL = './{SEARCH_INDEX_PATH}';");
    html.push_str(SEARCH_SCRIPT);
    html.push_str("</script>\n</body>\n</html>\n");
    html
}

const SEARCH_SCRIPT: &str = r#"let searchIndex = [];

function escapeHtml(text) {
  const div = document.createElement('div');
  div.textContent = text;
  return div.innerHTML.replace(/"/g, '&quot;');
}

function snippetFor(item, query) {
  const pos = item.text.toLowerCase().indexOf(query);
  if (pos < 0) {
    return item.text.substring(0, BEFORE + AFTER);
  }
  const start = Math.max(0, pos - BEFORE);
  const end = Math.min(item.text.length, pos + AFTER);
  let snippet = item.text.substring(start, end);
  if (start > 0) snippet = '...' + snippet;
  if (end < item.text.length) snippet = snippet + '...';
  return snippet;
}

function performSearch() {
  const query = document.getElementById('searchInput').value.toLowerCase().trim();
  const resultsDiv = document.getElementById('results');
  if (!query) {
    resultsDiv.innerHTML = '';
    return;
  }

  const matches = [];
  searchIndex.forEach((item, order) => {
    const title = item.title.toLowerCase();
    const pos = (title + ' ' + item.text.toLowerCase()).indexOf(query);
    if (pos < 0) return;
    const titlePos = title.indexOf(query);
    matches.push({ item, order, inTitle: titlePos >= 0, pos: titlePos >= 0 ? titlePos : pos });
  });
  matches.sort((a, b) => (b.inTitle - a.inTitle) || (a.pos - b.pos) || (a.order - b.order));

  if (matches.length === 0) {
    resultsDiv.innerHTML = '<p class="text-muted">No results found.</p>';
    return;
  }

  resultsDiv.innerHTML = matches.slice(0, MAX_RESULTS).map(({ item }) =>
    '<div class="result">' +
      '<a href="' + escapeHtml(item.path) + '" class="title">' + escapeHtml(item.title) + '</a>' +
      '<div class="snippet">' + escapeHtml(snippetFor(item, query)) + '</div>' +
    '</div>'
  ).join('');
}

fetch(INDEX_URL)
  .then(response => response.json())
  .then(data => {
    searchIndex = data;
    performSearch();
  });

const initialQuery = new URLSearchParams(window.location.search).get('q') || '';
document.getElementById('searchInput').value = initialQuery;
document.getElementById('searchForm').addEventListener('submit', event => {
  event.preventDefault();
  performSearch();
});
document.getElementById('searchInput').addEventListener('input', performSearch);
"#;

/// Site stylesheet, written once to [`STYLESHEET_PATH`].
pub(crate) const STYLESHEET: &str = r":root {
  --quire-body-bg: #fcfcfc;
  --quire-text: #222;
  --quire-muted: #6c757d;
  --quire-border: #e5e5e5;
}
body {
  overflow-y: scroll;
  background: var(--quire-body-bg);
  color: var(--quire-text);
}
.layout-container {
  display: grid;
  grid-template-columns: 260px 1fr 240px;
  column-gap: 2rem;
  min-height: 100vh;
}
.sidebar {
  position: sticky;
  top: 0;
  height: 100vh;
  overflow-y: auto;
  padding: 1.25rem;
  background: #fafafa;
  border-right: 1px solid var(--quire-border);
}
.sidebar .nav-link {
  padding: .2rem .4rem;
  color: var(--quire-text);
}
.sidebar .nav-link:hover {
  background: #eef2f6;
  border-radius: .25rem;
}
.sidebar .nav-link.active {
  background: #e7effa;
  border-radius: .25rem;
  font-weight: 600;
}
details > summary {
  cursor: pointer;
  list-style: none;
}
details > summary::marker {
  display: none;
}
details > summary .chev {
  margin-left: .5rem;
  opacity: .6;
  transition: transform .15s ease;
}
details[open] > summary .chev {
  transform: rotate(90deg);
}
.content {
  max-width: 980px;
  margin: 2.5rem 0 5rem;
  padding: 3rem 4rem;
  line-height: 1.7;
  background: white;
  border: 1px solid var(--quire-border);
  border-radius: 8px;
}
.content img {
  max-width: 100%;
  height: auto;
}
.content pre {
  padding: .75rem 1rem;
  background: #f7f7f7;
  border: 1px solid var(--quire-border);
  border-radius: 6px;
}
.embed-block {
  padding: .5rem .75rem;
  background: #fafafa;
  border: 1px dashed var(--quire-border);
  border-radius: 6px;
}
.embed-block > summary::before {
  content: 'Relevant page: ';
  margin-right: .5rem;
  font-size: .75rem;
  color: var(--quire-muted);
}
blockquote {
  margin-bottom: 1rem;
  padding: .5rem 1rem;
  border-left: 4px solid var(--quire-border);
  color: var(--quire-muted);
}
.rightbar {
  position: sticky;
  top: 2.5rem;
  align-self: start;
  max-height: calc(100vh - 2.5rem);
  overflow: auto;
  margin: 2.5rem 0 5rem;
  padding: 2rem 1.5rem;
  background: white;
  border: 1px solid var(--quire-border);
  border-radius: 8px;
}
.rightbar h2 {
  font-size: 1rem;
  text-transform: uppercase;
  letter-spacing: .06em;
  color: var(--quire-muted);
}
.search-page {
  padding: 2rem;
}
.search-page .result {
  margin-bottom: 1rem;
}
.search-page .result .title {
  display: block;
  font-weight: 600;
}
.search-page .result .snippet {
  color: var(--quire-muted);
}
";

#[cfg(test)]
mod tests {
    use super::*;

    fn page<'a>(toc: &'a [TocEntry]) -> PageData<'a> {
        PageData {
            title: "Setup",
            site_title: "",
            navigation: "<div class=\"p-2\">nav</div>",
            html_content: "<p>Hello world</p>",
            toc,
            css_path: "../assets/quire.css",
        }
    }

    fn entry(level: u8, title: &str, id: &str) -> TocEntry {
        TocEntry {
            level,
            title: title.to_owned(),
            id: id.to_owned(),
        }
    }

    #[test]
    fn render_page_contains_content_and_navigation() {
        let html = render_page(&page(&[]));
        assert!(html.contains("<p>Hello world</p>"));
        assert!(html.contains("<aside class=\"sidebar\"><div class=\"p-2\">nav</div></aside>"));
        assert!(html.contains("<h1 class=\"h3\">Setup</h1>"));
        assert!(html.contains("href=\"../assets/quire.css\""));
    }

    #[test]
    fn render_page_title_without_site_title() {
        let html = render_page(&page(&[]));
        assert!(html.contains("<title>Setup</title>"));
    }

    #[test]
    fn render_page_title_with_site_title() {
        let mut data = page(&[]);
        data.site_title = "Field Notes";
        let html = render_page(&data);
        assert!(html.contains("<title>Setup · Field Notes</title>"));
    }

    #[test]
    fn render_page_escapes_title() {
        let mut data = page(&[]);
        data.title = "R&D <draft>";
        let html = render_page(&data);
        assert!(html.contains("<title>R&amp;D &lt;draft&gt;</title>"));
        assert!(html.contains("<h1 class=\"h3\">R&amp;D &lt;draft&gt;</h1>"));
    }

    #[test]
    fn render_page_without_toc_has_no_panel() {
        let html = render_page(&page(&[]));
        assert!(!html.contains("On this page"));
        assert!(!html.contains("rightbar"));
    }

    #[test]
    fn render_page_contains_toc() {
        let toc = [entry(2, "Intro", "intro"), entry(3, "Details", "details")];
        let html = render_page(&page(&toc));
        assert!(html.contains("On this page"));
        assert!(html.contains("<li><a href=\"#intro\">Intro</a></li>"));
        assert!(html.contains("<li class=\"ms-3\"><a href=\"#details\">Details</a></li>"));
    }

    #[test]
    fn search_page_embeds_limits_and_index_location() {
        let html = render_search_page("Field Notes");
        assert!(html.contains("<title>Search · Field Notes</title>"));
        assert!(html.contains("const MAX_RESULTS = 20;"));
        assert!(html.contains("const BEFORE = 50;"));
        assert!(html.contains("const AFTER = 150;"));
        assert!(html.contains("const INDEX_URL = './assets/search_index.json';"));
        assert!(html.contains("href=\"assets/quire.css\""));
    }
}
