//! Tolerant HTML tree access.
//!
//! Content documents are parsed with html5ever (via `scraper`), which never
//! rejects malformed markup. On top of the parsed tree this module exposes a
//! minimal traversal API — find-by-tag and whitespace-collapsed text
//! collection — rather than a CSS selector engine; the extraction policy
//! only ever needs tag-name lookup.

use scraper::{ElementRef, Html};

/// Tags whose subtrees never contribute body text.
pub const EXCLUDED_TAGS: &[&str] = &["script", "style", "nav", "header", "footer"];

/// Parse an HTML/XHTML content document. Never fails; malformed markup is
/// recovered the way a browser would.
pub fn parse_html(html: &str) -> Html {
    Html::parse_document(html)
}

/// First element with the given tag name, in document order.
pub fn find_first<'a>(doc: &'a Html, tag: &str) -> Option<ElementRef<'a>> {
    doc.root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == tag)
}

/// All elements matching any of `tags`, in document order, skipping
/// subtrees rooted at an `excluded` tag.
pub fn find_all<'a>(root: ElementRef<'a>, tags: &[&str], excluded: &[&str]) -> Vec<ElementRef<'a>> {
    let mut out = Vec::new();
    collect_matching(root, tags, excluded, &mut out);
    out
}

fn collect_matching<'a>(
    el: ElementRef<'a>,
    tags: &[&str],
    excluded: &[&str],
    out: &mut Vec<ElementRef<'a>>,
) {
    for child in el.children().filter_map(ElementRef::wrap) {
        let name = child.value().name();
        if excluded.contains(&name) {
            continue;
        }
        if tags.contains(&name) {
            out.push(child);
        }
        collect_matching(child, tags, excluded, out);
    }
}

/// Text content of an element with all whitespace runs collapsed to single
/// spaces and the ends trimmed. Subtrees rooted at an `excluded` tag
/// contribute nothing.
pub fn text_content(el: ElementRef<'_>, excluded: &[&str]) -> String {
    let mut raw = String::new();
    collect_text(el, excluded, &mut raw);
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_text(el: ElementRef<'_>, excluded: &[&str], out: &mut String) {
    for node in el.children() {
        if let Some(text) = node.value().as_text() {
            out.push_str(text);
        } else if let Some(child) = ElementRef::wrap(node) {
            if excluded.contains(&child.value().name()) {
                continue;
            }
            collect_text(child, excluded, out);
        }
    }
}
