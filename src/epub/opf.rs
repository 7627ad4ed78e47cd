//! Package document parsing (container.xml and OPF).

use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{ParseError, Result};
use crate::util::strip_bom;

/// A manifest entry: one content item in the package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestItem {
    pub href: String,
    pub media_type: String,
    /// Space-separated `properties` attribute values (e.g. "nav",
    /// "cover-image").
    pub properties: Vec<String>,
}

impl ManifestItem {
    pub fn has_property(&self, name: &str) -> bool {
        self.properties.iter().any(|p| p == name)
    }
}

/// A legacy `<guide>` reference (EPUB 2 structural hint).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuideReference {
    pub ref_type: String,
    pub href: String,
}

/// Dublin Core metadata plus the legacy cover pointer.
#[derive(Debug, Clone, Default)]
pub struct PackageMetadata {
    pub title: Option<String>,
    pub creator: Option<String>,
    /// Item id from an EPUB 2 `<meta name="cover" content="..."/>` entry.
    pub cover_id: Option<String>,
}

/// Parsed OPF package data.
#[derive(Debug, Clone, Default)]
pub struct OpfData {
    pub metadata: PackageMetadata,
    /// Maps manifest id -> item.
    pub manifest: HashMap<String, ManifestItem>,
    /// Spine item ids in reading order.
    pub spine: Vec<String>,
    pub guide: Vec<GuideReference>,
}

/// Parse META-INF/container.xml to find the OPF path.
pub fn parse_container_xml(bytes: &[u8]) -> Result<String> {
    let content = String::from_utf8(strip_bom(bytes).to_vec())?;

    let mut reader = Reader::from_str(&content);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == b"rootfile" => {
                if let Some(path) = attr_local(&e, "full-path") {
                    return Ok(path);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
    }

    Err(ParseError::InvalidPackage(
        "no rootfile found in container.xml".into(),
    ))
}

/// Parse the OPF package document: metadata, manifest, spine and guide.
pub fn parse_opf(content: &str) -> Result<OpfData> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut data = OpfData::default();

    let mut in_metadata = false;
    let mut in_guide = false;
    let mut current_element: Option<String> = None;
    let mut buf_text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.name();
                let local = local_name(name.as_ref());

                match local {
                    b"metadata" => in_metadata = true,
                    b"guide" => in_guide = true,
                    b"title" | b"creator" => {
                        if in_metadata {
                            current_element = Some(String::from_utf8_lossy(local).to_string());
                            buf_text.clear();
                        }
                    }
                    _ => handle_structural_element(&e, local, in_guide, &mut data),
                }
            }
            Ok(Event::Empty(e)) => {
                let name = e.name();
                let local = local_name(name.as_ref());
                handle_structural_element(&e, local, in_guide, &mut data);
            }
            Ok(Event::Text(e)) => {
                if current_element.is_some() {
                    buf_text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if current_element.is_some() {
                    let entity = String::from_utf8_lossy(e.as_ref());
                    if let Some(resolved) = resolve_entity(&entity) {
                        buf_text.push_str(&resolved);
                    }
                }
            }
            Ok(Event::End(e)) => {
                let name = e.name();
                let local = local_name(name.as_ref());

                match local {
                    b"metadata" => in_metadata = false,
                    b"guide" => in_guide = false,
                    _ => {}
                }

                if let Some(ref elem) = current_element {
                    let value = buf_text.trim();
                    if !value.is_empty() {
                        match elem.as_str() {
                            "title" if data.metadata.title.is_none() => {
                                data.metadata.title = Some(value.to_string());
                            }
                            "creator" if data.metadata.creator.is_none() => {
                                data.metadata.creator = Some(value.to_string());
                            }
                            _ => {}
                        }
                    }
                    current_element = None;
                    buf_text.clear();
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
    }

    Ok(data)
}

/// Manifest items, spine refs, cover metas and guide references may appear
/// as self-closing or as open/close pairs; both event shapes land here.
fn handle_structural_element(e: &BytesStart, local: &[u8], in_guide: bool, data: &mut OpfData) {
    match local {
        b"item" => {
            if let Some((id, item)) = parse_manifest_item(e) {
                data.manifest.insert(id, item);
            }
        }
        b"itemref" => {
            if let Some(idref) = attr_local(e, "idref") {
                data.spine.push(idref);
            }
        }
        b"meta" => {
            if attr_local(e, "name").as_deref() == Some("cover")
                && let Some(content) = attr_local(e, "content")
                && !content.is_empty()
            {
                data.metadata.cover_id = Some(content);
            }
        }
        b"reference" if in_guide => {
            if let (Some(ref_type), Some(href)) =
                (attr_local(e, "type"), attr_local(e, "href"))
            {
                data.guide.push(GuideReference { ref_type, href });
            }
        }
        _ => {}
    }
}

fn parse_manifest_item(e: &BytesStart) -> Option<(String, ManifestItem)> {
    let id = attr_local(e, "id")?;
    if id.is_empty() {
        return None;
    }
    let href = attr_local(e, "href").unwrap_or_default();
    let media_type = attr_local(e, "media-type").unwrap_or_default();
    let properties = attr_local(e, "properties")
        .map(|p| p.split_ascii_whitespace().map(str::to_string).collect())
        .unwrap_or_default();

    Some((
        id,
        ManifestItem {
            href,
            media_type,
            properties,
        },
    ))
}

/// Value of the attribute with the given *local* name (namespace prefixes
/// such as `opf:` or `epub:` are ignored).
pub(crate) fn attr_local(e: &BytesStart, name: &str) -> Option<String> {
    for attr in e.attributes().flatten() {
        if local_name(attr.key.as_ref()) == name.as_bytes() {
            return Some(String::from_utf8_lossy(&attr.value).into_owned());
        }
    }
    None
}

/// Extract local name from a namespaced XML name (e.g., "dc:title" -> "title").
pub(crate) fn local_name(name: &[u8]) -> &[u8] {
    name.iter()
        .rposition(|&b| b == b':')
        .map(|i| &name[i + 1..])
        .unwrap_or(name)
}

/// Resolve XML entity references.
fn resolve_entity(entity: &str) -> Option<String> {
    match entity {
        "apos" => return Some("'".to_string()),
        "quot" => return Some("\"".to_string()),
        "lt" => return Some("<".to_string()),
        "gt" => return Some(">".to_string()),
        "amp" => return Some("&".to_string()),
        _ => {}
    }

    if let Some(hex) = entity.strip_prefix("#x") {
        if let Ok(code) = u32::from_str_radix(hex, 16)
            && let Some(c) = char::from_u32(code)
        {
            return Some(c.to_string());
        }
    } else if let Some(dec) = entity.strip_prefix('#')
        && let Ok(code) = dec.parse::<u32>()
        && let Some(c) = char::from_u32(code)
    {
        return Some(c.to_string());
    }

    None
}
