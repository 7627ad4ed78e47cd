//! Locating where main content begins.
//!
//! Cover pages, title pages and other front matter come before the
//! "bodymatter" landmark of the EPUB 3 navigation document, or before the
//! legacy guide's first `text` reference. The returned href (fragment
//! stripped) is the cutoff the chapter extractor gates on; `None` means the
//! whole spine is treated as main content.

use std::io::{Read, Seek};

use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::debug;

use super::archive::Archive;
use super::opf::{attr_local, local_name};

pub fn find_body_start<R: Read + Seek>(archive: &mut Archive<R>) -> Option<String> {
    find_bodymatter_landmark(archive).or_else(|| find_text_reference(archive))
}

/// EPUB 3: nav document -> `nav[type=landmarks]` -> `a[type=bodymatter]`.
fn find_bodymatter_landmark<R: Read + Seek>(archive: &mut Archive<R>) -> Option<String> {
    let nav_id = archive.item_id_with_property("nav")?;
    let content = match archive.read_item_text(&nav_id) {
        Ok(content) => content,
        Err(err) => {
            debug!("navigation document unreadable: {err}");
            return None;
        }
    };
    let href = parse_landmark_href(&content, "bodymatter")?;
    Some(strip_fragment(&href).to_string())
}

/// EPUB 2 fallback: the guide's first reference of type `text`.
fn find_text_reference<R: Read + Seek>(archive: &mut Archive<R>) -> Option<String> {
    archive
        .guide
        .iter()
        .find(|r| r.ref_type == "text")
        .map(|r| strip_fragment(&r.href).to_string())
}

/// Pull the href of the `a[type=<link_type>]` link inside
/// `nav[type=landmarks]` out of a navigation document.
///
/// The document is treated as XML with namespaces stripped (`epub:type`
/// matches as `type`); a malformed document yields `None`, never an error.
fn parse_landmark_href(xml: &str, link_type: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut depth = 0usize;
    let mut landmarks_depth: Option<usize> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                depth += 1;
                let name = e.name();
                let local = local_name(name.as_ref());

                if local == b"nav"
                    && landmarks_depth.is_none()
                    && attr_local(&e, "type").as_deref() == Some("landmarks")
                {
                    landmarks_depth = Some(depth);
                }

                if landmarks_depth.is_some()
                    && local == b"a"
                    && attr_local(&e, "type").as_deref() == Some(link_type)
                    && let Some(href) = attr_local(&e, "href")
                {
                    return Some(href);
                }
            }
            Ok(Event::Empty(e)) => {
                let name = e.name();
                let local = local_name(name.as_ref());
                if landmarks_depth.is_some()
                    && local == b"a"
                    && attr_local(&e, "type").as_deref() == Some(link_type)
                    && let Some(href) = attr_local(&e, "href")
                {
                    return Some(href);
                }
            }
            Ok(Event::End(e)) => {
                let name = e.name();
                if local_name(name.as_ref()) == b"nav" && landmarks_depth == Some(depth) {
                    landmarks_depth = None;
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                debug!("malformed navigation document: {err}");
                return None;
            }
            _ => {}
        }
    }

    None
}

fn strip_fragment(href: &str) -> &str {
    href.split('#').next().unwrap_or(href)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAV_DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops">
<body>
  <nav epub:type="toc">
    <ol>
      <li><a href="cover.xhtml">Cover</a></li>
      <li><a href="ch1.xhtml">Chapter 1</a></li>
    </ol>
  </nav>
  <nav epub:type="landmarks">
    <ol>
      <li><a epub:type="cover" href="cover.xhtml">Cover</a></li>
      <li><a epub:type="bodymatter" href="ch1.xhtml#start">Start Reading</a></li>
    </ol>
  </nav>
</body>
</html>"#;

    #[test]
    fn test_parse_landmark_href() {
        assert_eq!(
            parse_landmark_href(NAV_DOC, "bodymatter"),
            Some("ch1.xhtml#start".to_string())
        );
        assert_eq!(
            parse_landmark_href(NAV_DOC, "cover"),
            Some("cover.xhtml".to_string())
        );
    }

    #[test]
    fn test_landmark_links_outside_landmarks_nav_are_ignored() {
        let doc = r#"<html xmlns:epub="http://www.idpf.org/2007/ops"><body>
  <nav epub:type="toc">
    <ol><li><a epub:type="bodymatter" href="wrong.xhtml">Oops</a></li></ol>
  </nav>
</body></html>"#;
        assert_eq!(parse_landmark_href(doc, "bodymatter"), None);
    }

    #[test]
    fn test_missing_landmarks_nav() {
        let doc = r#"<html><body><nav epub:type="toc"><ol/></nav></body></html>"#;
        assert_eq!(parse_landmark_href(doc, "bodymatter"), None);
    }

    #[test]
    fn test_strip_fragment() {
        assert_eq!(strip_fragment("ch1.xhtml#start"), "ch1.xhtml");
        assert_eq!(strip_fragment("ch1.xhtml"), "ch1.xhtml");
        assert_eq!(strip_fragment("#frag"), "");
    }
}
