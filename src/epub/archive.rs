//! Zip container access and parsed package state.

use std::collections::HashMap;
use std::io::{Read, Seek};
use std::path::Path;

use zip::ZipArchive;

use super::opf::{GuideReference, ManifestItem, OpfData, PackageMetadata};
use super::opf::{parse_container_xml, parse_opf};
use crate::error::{ParseError, Result};
use crate::util::{decode_text, extract_xml_encoding, strip_bom};

/// An opened package: the zip archive plus the parsed package document.
///
/// The package data (metadata, manifest, spine, guide) is immutable once
/// parsed; reading item content takes `&mut self` because the underlying
/// zip reader seeks. The input reader is owned here and released when the
/// archive is dropped, on every exit path.
pub struct Archive<R: Read + Seek> {
    zip: ZipArchive<R>,
    opf_dir: String,
    pub metadata: PackageMetadata,
    pub manifest: HashMap<String, ManifestItem>,
    pub spine: Vec<String>,
    pub guide: Vec<GuideReference>,
}

impl<R: Read + Seek> Archive<R> {
    /// Open a zip container and parse its package document.
    ///
    /// Fails when the archive cannot be opened or the package document is
    /// missing or malformed; absent metadata fields are not errors.
    pub fn open(reader: R) -> Result<Self> {
        let mut zip = ZipArchive::new(reader)?;

        let container = read_file_bytes(&mut zip, "META-INF/container.xml")
            .map_err(|_| ParseError::InvalidPackage("missing META-INF/container.xml".into()))?;
        let opf_path = parse_container_xml(&container)?;
        let opf_dir = Path::new(&opf_path)
            .parent()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default();

        let opf_bytes = read_file_bytes(&mut zip, &opf_path).map_err(|_| {
            ParseError::InvalidPackage(format!("missing package document: {opf_path}"))
        })?;
        let hint = extract_xml_encoding(&opf_bytes);
        let opf_text = decode_text(strip_bom(&opf_bytes), hint);
        let OpfData {
            metadata,
            manifest,
            spine,
            guide,
        } = parse_opf(&opf_text)?;

        Ok(Self {
            zip,
            opf_dir,
            metadata,
            manifest,
            spine,
            guide,
        })
    }

    /// Look up a manifest item by id.
    pub fn item(&self, id: &str) -> Option<&ManifestItem> {
        self.manifest.get(id)
    }

    /// Id of the first manifest item carrying the given property.
    pub fn item_id_with_property(&self, property: &str) -> Option<String> {
        self.manifest
            .iter()
            .find(|(_, item)| item.has_property(property))
            .map(|(id, _)| id.clone())
    }

    /// Raw bytes of a manifest item, resolved against the package directory.
    pub fn read_item_bytes(&mut self, id: &str) -> Result<Vec<u8>> {
        let href = self
            .manifest
            .get(id)
            .ok_or_else(|| ParseError::InvalidPackage(format!("unknown manifest item: {id}")))?
            .href
            .clone();
        let path = resolve_path(&self.opf_dir, &href);
        read_file_bytes(&mut self.zip, &path)
    }

    /// Item content decoded to text: UTF-8 first, then the XML-declaration
    /// encoding, then Windows-1252.
    pub fn read_item_text(&mut self, id: &str) -> Result<String> {
        let bytes = self.read_item_bytes(id)?;
        let hint = extract_xml_encoding(&bytes);
        Ok(decode_text(strip_bom(&bytes), hint).into_owned())
    }
}

fn read_file_bytes<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<Vec<u8>> {
    // Try direct lookup first
    match archive.by_name(path) {
        Ok(mut file) => {
            let mut contents = Vec::new();
            file.read_to_end(&mut contents)?;
            return Ok(contents);
        }
        Err(zip::result::ZipError::FileNotFound) => {}
        Err(e) => return Err(e.into()),
    }

    // Fallback: percent-decoded path (handles malformed packages whose
    // manifest hrefs are URL-encoded)
    let decoded = percent_encoding::percent_decode_str(path)
        .decode_utf8()
        .map_err(|_| ParseError::InvalidPackage(format!("invalid UTF-8 in path: {path}")))?;

    let mut file = archive.by_name(&decoded)?;
    let mut contents = Vec::new();
    file.read_to_end(&mut contents)?;
    Ok(contents)
}

fn resolve_path(base: &str, href: &str) -> String {
    if base.is_empty() {
        href.to_string()
    } else {
        format!("{base}/{href}")
    }
}
