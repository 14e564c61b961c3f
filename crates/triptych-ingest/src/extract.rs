//! Plain-text extraction from documentation HTML.

use scraper::{ElementRef, Html, Node, Selector};

/// Tags whose entire subtree is page chrome rather than content.
const SKIPPED_TAGS: &[&str] = &["script", "style", "nav", "header", "footer", "aside"];

/// Boilerplate prefixes dropped from extracted text.
const SKIP_PREFIXES: &[&str] = &[
    "Navigation",
    "Next",
    "Previous",
    "© Copyright",
    "Built with",
    "Note:",
    "Note ",
    "Warning:",
    "Warning ",
    "Important:",
    "Important ",
];

/// Extract readable text from an HTML page.
///
/// Prefers the Sphinx `div.document` wrapper when present, falling back to
/// the page body. Chrome subtrees, comments and boilerplate lines are
/// dropped; what remains is joined with single newlines.
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let content = Selector::parse("div.document").unwrap();
    let body = Selector::parse("body").unwrap();

    let root = document
        .select(&content)
        .next()
        .or_else(|| document.select(&body).next())
        .unwrap_or_else(|| document.root_element());

    let mut raw = String::new();
    collect_text(root, &mut raw);

    clean_text(&raw)
}

/// Concatenate text nodes, skipping chrome subtrees.
///
/// Text nodes are joined without separators so inline markup does not split
/// words; line structure comes from the newlines already present in the
/// source markup.
fn collect_text(element: ElementRef<'_>, out: &mut String) {
    if SKIPPED_TAGS.contains(&element.value().name()) {
        return;
    }

    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            collect_text(child_element, out);
        } else if let Node::Text(text) = child.value() {
            out.push_str(text);
        }
    }
}

/// Split raw text into trimmed phrases and drop blanks and boilerplate.
///
/// Within each line, runs of two spaces separate phrases that were laid out
/// as columns in the page.
fn clean_text(raw: &str) -> String {
    raw.lines()
        .flat_map(|line| line.trim().split("  "))
        .map(str::trim)
        .filter(|chunk| {
            !chunk.is_empty() && !SKIP_PREFIXES.iter().any(|prefix| chunk.starts_with(prefix))
        })
        .collect::<Vec<_>>()
        .join("\n")
}
