//! Cover image resolution.

use std::io::{Read, Seek};

use tracing::debug;

use super::archive::Archive;
use crate::book::CoverImage;
use crate::util::filename_from_href;

/// Locate the cover image: the manifest item with the `cover-image`
/// property, or the item named by a legacy `<meta name="cover">` entry.
///
/// A pure lookup plus one read; anything that goes wrong just means no
/// cover, never a failed parse.
pub fn resolve_cover<R: Read + Seek>(archive: &mut Archive<R>) -> Option<CoverImage> {
    let id = archive.item_id_with_property("cover-image").or_else(|| {
        archive
            .metadata
            .cover_id
            .clone()
            .filter(|id| archive.manifest.contains_key(id))
    })?;

    let (href, media_type) = {
        let item = archive.item(&id)?;
        (item.href.clone(), item.media_type.clone())
    };

    match archive.read_item_bytes(&id) {
        Ok(data) => Some(CoverImage {
            data,
            media_type,
            filename: filename_from_href(&href),
        }),
        Err(err) => {
            debug!(%href, "cover image unreadable: {err}");
            None
        }
    }
}
