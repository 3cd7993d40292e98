//! Source path to output path mapping.
//!
//! Paths handled here are relative, forward-slash separated strings:
//! `1-guide/intro.md` maps to `1-guide/intro.html`. Only the file stem is
//! sanitized; directory components are kept as they are.

use std::sync::LazyLock;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use regex::Regex;
use sha2::{Digest, Sha256};

/// Output path of the site home page.
pub const HOME_PAGE_PATH: &str = "index.html";

/// Longest stem (in characters) written to disk, hash suffix included.
pub const MAX_STEM_LEN: usize = 80;

/// Longest stem in UTF-8 bytes, hash suffix included. With `.html` appended
/// the file name stays well under the usual 255-byte limit.
pub const MAX_STEM_BYTES: usize = 200;

/// Bytes of the SHA-256 digest used as uniqueness suffix (6 hex characters).
const HASH_BYTES: usize = 3;

const RESERVED_NAMES: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

static INVALID_CHARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"[<>:"/\\|?*]"#).unwrap());

/// Characters escaped inside a single href path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'\'')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Split a relative source path into (parent directory, file stem).
///
/// The parent is empty for files at the vault root.
pub(crate) fn split_source(rel_source: &str) -> (&str, &str) {
    let (parent, file_name) = rel_source.rsplit_once('/').unwrap_or(("", rel_source));
    let stem = match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    };
    (parent, stem)
}

/// Map a document's relative source path to its output path.
///
/// `index` documents keep their folder: `index.md` becomes the site home
/// page and `guide/Index.md` becomes `guide/index.html`.
///
/// ```
/// use quire_site::output_path;
///
/// assert_eq!(output_path("index.md"), "index.html");
/// assert_eq!(output_path("1-guide/intro.md"), "1-guide/intro.html");
/// assert_eq!(output_path("1-guide/Index.md"), "1-guide/index.html");
/// ```
#[must_use]
pub fn output_path(rel_source: &str) -> String {
    let (parent, stem) = split_source(rel_source);
    if stem.eq_ignore_ascii_case("index") {
        return join(parent, HOME_PAGE_PATH);
    }
    let safe = sanitize(stem, rel_source, false);
    join(parent, &format!("{safe}.html"))
}

/// Map a source path to an output path that always carries the hash suffix.
///
/// Used to break collisions between documents whose plain output paths
/// coincide (`setup.md` and `setup.markdown`, case-only differences).
/// `salt` varies the hash when the first forced path is also taken.
pub(crate) fn forced_output_path(rel_source: &str, salt: usize) -> String {
    let (parent, stem) = split_source(rel_source);
    let hash_input = if salt == 0 {
        rel_source.to_owned()
    } else {
        format!("{rel_source}#{salt}")
    };
    let safe = sanitize(stem, &hash_input, true);
    join(parent, &format!("{safe}.html"))
}

/// Make a file stem safe on every common filesystem.
///
/// Invalid characters become `-`, control characters are dropped and
/// surrounding whitespace and dots are trimmed. Reserved device names gain a
/// trailing `_`. Whenever the stem had to change or be truncated, a short hash
/// of `rel_source` is appended so distinct documents stay distinct.
#[must_use]
pub fn sanitize_stem(stem: &str, rel_source: &str) -> String {
    sanitize(stem, rel_source, false)
}

fn sanitize(stem: &str, hash_input: &str, force_hash: bool) -> String {
    let replaced = INVALID_CHARS.replace_all(stem, "-");
    let cleaned: String = replaced.chars().filter(|c| !c.is_control()).collect();
    let mut safe = trim_stem(&cleaned).to_owned();

    let mut needs_hash = force_hash || safe != stem;
    let keep = truncated_len(&safe, MAX_STEM_LEN, MAX_STEM_BYTES);
    if keep < safe.len() {
        safe.truncate(keep);
        needs_hash = true;
    }
    if let Some(marked) = mark_reserved(&safe) {
        safe = marked;
        needs_hash = true;
    }

    let hash = short_hash(hash_input);
    if safe.is_empty() {
        return format!("untitled-{hash}");
    }
    if needs_hash {
        let suffix = hash.len() + 1;
        safe.truncate(truncated_len(&safe, MAX_STEM_LEN - suffix, MAX_STEM_BYTES - suffix));
        let trimmed = trim_stem(&safe);
        if trimmed.is_empty() {
            return format!("untitled-{hash}");
        }
        return format!("{trimmed}-{hash}");
    }
    safe
}

/// Byte length of the longest prefix of `stem` within both limits, ending on a
/// char boundary.
fn truncated_len(stem: &str, max_chars: usize, max_bytes: usize) -> usize {
    stem.char_indices()
        .take(max_chars)
        .map(|(start, c)| start + c.len_utf8())
        .take_while(|&end| end <= max_bytes)
        .last()
        .unwrap_or(0)
}

fn trim_stem(stem: &str) -> &str {
    stem.trim_matches(|c: char| c.is_whitespace() || c == '.')
}

/// Append `_` to the device-name part of a reserved stem (`CON`, `nul.tar`).
fn mark_reserved(stem: &str) -> Option<String> {
    let (base, rest) = match stem.split_once('.') {
        Some((base, rest)) => (base, Some(rest)),
        None => (stem, None),
    };
    let upper = base.trim_end().to_ascii_uppercase();
    if !RESERVED_NAMES.contains(&upper.as_str()) {
        return None;
    }
    Some(match rest {
        Some(rest) => format!("{base}_.{rest}"),
        None => format!("{base}_"),
    })
}

fn short_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    hex::encode(&digest[..HASH_BYTES])
}

fn join(parent: &str, file_name: &str) -> String {
    if parent.is_empty() {
        file_name.to_owned()
    } else {
        format!("{parent}/{file_name}")
    }
}

/// Percent-encode every segment of a relative path, keeping the separators.
#[must_use]
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// Compute the href from the page at output path `from` to output path `to`.
///
/// Both arguments are relative to the output root. The result is relative to
/// the directory of `from` and percent-encoded per segment.
///
/// ```
/// use quire_site::href;
///
/// assert_eq!(href("1-guide/intro.html", "index.html"), "../index.html");
/// assert_eq!(href("index.html", "2-notes/a b.html"), "2-notes/a%20b.html");
/// ```
#[must_use]
pub fn href(from: &str, to: &str) -> String {
    encode_path(&relative_path(from, to))
}

/// Relative path from the directory of document `from` to `to`.
fn relative_path(from: &str, to: &str) -> String {
    let from_segs: Vec<&str> = from.split('/').filter(|s| !s.is_empty()).collect();
    let to_segs: Vec<&str> = to.split('/').filter(|s| !s.is_empty()).collect();

    // Last segment of `from` is the page itself.
    let from_dir = from_segs.split_last().map_or(&[][..], |(_, dir)| dir);

    let common = from_dir
        .iter()
        .zip(&to_segs)
        .take_while(|(a, b)| a == b)
        .count();

    let ups = "../".repeat(from_dir.len() - common);
    let down = to_segs[common..].join("/");

    let result = format!("{ups}{down}");
    if result.is_empty() {
        "./".to_owned()
    } else {
        result
    }
}
