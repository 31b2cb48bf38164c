//! Raw text extraction for supported file types.
//!
//! Which extractor runs is decided by a fixed extension table; files with
//! any other extension are rejected before they are read.

use pulldown_cmark::{Event, Options, Parser, TagEnd};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{IndexerError, Result};

/// How a file's bytes are turned into indexable text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// Indexed verbatim.
    PlainText,
    /// Rendered to plain text with `pulldown-cmark`.
    Markdown,
    /// Tags, scripts and styles stripped.
    Html,
}

/// Supported extensions (without the dot, matched case-insensitively).
pub const SUPPORTED_EXTENSIONS: &[(&str, ContentKind)] = &[
    ("txt", ContentKind::PlainText),
    ("md", ContentKind::Markdown),
    ("html", ContentKind::Html),
];

/// Elements whose bodies are never text.
const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

/// Resolve the content kind of `path` from its extension.
#[must_use]
pub fn content_kind(path: &Path) -> Option<ContentKind> {
    let extension = path.extension()?.to_str()?;
    SUPPORTED_EXTENSIONS
        .iter()
        .find(|(ext, _)| ext.eq_ignore_ascii_case(extension))
        .map(|&(_, kind)| kind)
}

/// Read `path` and convert it to raw text.
///
/// # Errors
/// Returns `IndexerError` if:
/// - The extension is not in [`SUPPORTED_EXTENSIONS`]
/// - The file is larger than `max_file_size`
/// - The file cannot be read or is not valid UTF-8
pub fn extract(path: &Path, max_file_size: u64) -> Result<String> {
    let kind = content_kind(path).ok_or_else(|| IndexerError::UnsupportedExtension {
        path: path.to_string_lossy().to_string(),
        extension: path.extension().map(|e| e.to_string_lossy().to_string()).unwrap_or_default(),
    })?;

    let raw = read_file_content(path, max_file_size)?;
    Ok(match kind {
        ContentKind::PlainText => raw,
        ContentKind::Markdown => markdown_to_text(&raw),
        ContentKind::Html => strip_html(&raw),
    })
}

/// Read file content with a size limit and UTF-8 validation.
///
/// Reads at most `max_file_size + 1` bytes so a file growing while it is
/// read is still rejected.
fn read_file_content(path: &Path, max_file_size: u64) -> Result<String> {
    let file = File::open(path)?;
    let size = file.metadata()?.len();
    if size > max_file_size {
        return Err(IndexerError::FileTooLarge { size, max: max_file_size });
    }

    // size <= max_file_size, which the CLI bounds to 256MB.
    #[allow(clippy::cast_possible_truncation)]
    let mut bytes = Vec::with_capacity(size as usize);
    file.take(max_file_size.saturating_add(1)).read_to_end(&mut bytes)?;

    if bytes.len() as u64 > max_file_size {
        return Err(IndexerError::FileTooLarge { size: bytes.len() as u64, max: max_file_size });
    }

    String::from_utf8(bytes)
        .map_err(|_| IndexerError::InvalidUtf8 { path: path.to_string_lossy().to_string() })
}

/// Render Markdown to plain text: text and code spans are kept, markup and
/// raw HTML dropped, block ends become line breaks.
#[must_use]
pub fn markdown_to_text(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut text = String::with_capacity(markdown.len());
    for event in Parser::new_ext(markdown, options) {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(&t),
            Event::SoftBreak | Event::HardBreak => text.push('\n'),
            Event::End(
                TagEnd::Paragraph
                | TagEnd::Heading(_)
                | TagEnd::Item
                | TagEnd::CodeBlock
                | TagEnd::TableCell,
            ) => text.push('\n'),
            _ => {}
        }
    }
    text
}

/// Strip tags from HTML, dropping `<script>`/`<style>` bodies and decoding
/// common entities. Every tag is replaced by a space.
#[must_use]
pub fn strip_html(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(open) = rest.find('<') {
        text.push_str(&rest[..open]);
        text.push(' ');
        rest = &rest[open..];

        if let Some(comment) = rest.strip_prefix("<!--") {
            rest = comment.find("-->").map_or("", |end| &comment[end + 3..]);
            continue;
        }

        if let Some(name) = raw_text_element(rest) {
            let closing = format!("</{name}");
            match rest.to_ascii_lowercase().find(&closing) {
                Some(end) => rest = &rest[end..],
                None => {
                    rest = "";
                    break;
                }
            }
        }

        rest = tag_end(rest).map_or("", |close| &rest[close + 1..]);
    }
    text.push_str(rest);

    decode_entities(&text)
}

/// Byte offset of the `>` closing the tag at the start of `tag`, skipping
/// quoted attribute values.
fn tag_end(tag: &str) -> Option<usize> {
    let mut quote = None;
    for (i, b) in tag.bytes().enumerate() {
        match (quote, b) {
            (None, b'>') => return Some(i),
            (None, b'"' | b'\'') => quote = Some(b),
            (Some(q), _) if q == b => quote = None,
            _ => {}
        }
    }
    None
}

/// Name of the raw-text element opened at the start of `tag`, if any.
fn raw_text_element(tag: &str) -> Option<&'static str> {
    RAW_TEXT_ELEMENTS.into_iter().find(|name| {
        tag.get(1..=name.len()).is_some_and(|s| s.eq_ignore_ascii_case(name))
            && tag[name.len() + 1..].chars().next().is_none_or(|c| !c.is_ascii_alphanumeric())
    })
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;
    use std::fs;
    use tempfile::tempdir;

    const MAX: u64 = 1024 * 1024;

    fn tokens(text: &str) -> Vec<String> {
        tokenize(text).collect()
    }

    #[test]
    fn test_content_kind_lookup() {
        assert_eq!(content_kind(Path::new("a.txt")), Some(ContentKind::PlainText));
        assert_eq!(content_kind(Path::new("dir/b.md")), Some(ContentKind::Markdown));
        assert_eq!(content_kind(Path::new("c.HTML")), Some(ContentKind::Html));
        assert_eq!(content_kind(Path::new("d.rs")), None);
        assert_eq!(content_kind(Path::new("Makefile")), None);
        assert_eq!(content_kind(Path::new(".txt")), None);
    }

    #[test]
    fn test_extract_plain_text_verbatim() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "Plain <b>text</b> stays").unwrap();
        assert_eq!(extract(&path, MAX).unwrap(), "Plain <b>text</b> stays");
    }

    #[test]
    fn test_extract_rejects_unsupported_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("main.rs");
        fs::write(&path, "fn main() {}").unwrap();

        match extract(&path, MAX) {
            Err(IndexerError::UnsupportedExtension { extension, .. }) => {
                assert_eq!(extension, "rs");
            }
            other => panic!("expected UnsupportedExtension, got {other:?}"),
        }
    }

    #[test]
    fn test_extract_rejects_large_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("big.txt");
        fs::write(&path, "x".repeat(65)).unwrap();

        assert!(matches!(
            extract(&path, 64),
            Err(IndexerError::FileTooLarge { size: 65, max: 64 })
        ));
        assert!(extract(&path, 65).is_ok());
    }

    #[test]
    fn test_extract_rejects_invalid_utf8() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("binary.txt");
        fs::write(&path, [0x80, 0x81, 0x82, 0xff]).unwrap();
        assert!(matches!(extract(&path, MAX), Err(IndexerError::InvalidUtf8 { .. })));
    }

    #[test]
    fn test_extract_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gone.md");
        assert!(matches!(extract(&path, MAX), Err(IndexerError::Io { .. })));
    }

    #[test]
    fn test_markdown_to_text() {
        let md = "# Title\n\nSome *emphasis* and `code`.\n\n- item one\n- item two\n\n[link](http://example.com)";
        let text = markdown_to_text(md);
        assert_eq!(tokens(&text), [
            "TITLE", "SOME", "EMPHASIS", "AND", "CODE", ".", "ITEM", "ONE", "ITEM", "TWO", "LINK"
        ]);
        assert!(!text.contains('#'));
        assert!(!text.contains("http"));
    }

    #[test]
    fn test_markdown_code_block_kept() {
        let md = "```rust\nlet x = 1;\n```\n";
        assert!(markdown_to_text(md).contains("let x = 1;"));
    }

    #[test]
    fn test_markdown_inline_html_dropped() {
        let text = markdown_to_text("before <span>inside</span> after");
        assert_eq!(tokens(&text), ["BEFORE", "INSIDE", "AFTER"]);
    }

    #[test]
    fn test_strip_html_tags() {
        let text = strip_html("<p>Hello <strong>world</strong>!</p>");
        assert_eq!(tokens(&text), ["HELLO", "WORLD", "!"]);
    }

    #[test]
    fn test_strip_html_script_and_style() {
        let html = "<html><head><style>body { color: red; }</style></head>\
                    <body><p>Before</p><SCRIPT type=\"x\">alert('hi');</SCRIPT><p>After</p></body></html>";
        let text = strip_html(html);
        assert_eq!(tokens(&text), ["BEFORE", "AFTER"]);
    }

    #[test]
    fn test_strip_html_unclosed_script_drops_rest() {
        let text = strip_html("<p>kept</p><script>never closed");
        assert_eq!(tokens(&text), ["KEPT"]);
    }

    #[test]
    fn test_strip_html_similar_tag_names_are_not_raw_text() {
        let text = strip_html("<scripture>verse</scripture><styles>look</styles>");
        assert_eq!(tokens(&text), ["VERSE", "LOOK"]);
    }

    #[test]
    fn test_strip_html_comments() {
        let text = strip_html("<p>before<!-- a > b --> after</p><!-- unterminated > x");
        assert_eq!(tokens(&text), ["BEFORE", "AFTER"]);
    }

    #[test]
    fn test_strip_html_quoted_attribute_with_gt() {
        let text = strip_html(r#"<a title="x > y" data-q='1>2'>link</a>"#);
        assert_eq!(tokens(&text), ["LINK"]);
    }

    #[test]
    fn test_strip_html_entities() {
        let text = strip_html("<p>Fish &amp; chips &lt;fresh&gt; &amp;lt;</p>");
        assert_eq!(text.trim(), "Fish & chips <fresh> &lt;");
    }

    #[test]
    fn test_extract_html_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("page.html");
        fs::write(&path, "<h1>Heading</h1><p>Body text</p>").unwrap();
        assert_eq!(tokens(&extract(&path, MAX).unwrap()), ["HEADING", "BODY", "TEXT"]);
    }
}
