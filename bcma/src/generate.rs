//! BCMA generation
//!
//! The mirror of extraction: every layout encodes to CLYT bytes, layouts and
//! textures pack into named inner DARCs, each inner archive is LZSS-10
//! compressed, and the outer DARC wraps the lot. Emission order and
//! alignments reproduce the console container exactly: `BcmaInfo`,
//! `Common_texture` (names 0x100 / files 0x80), the specific texture arcs,
//! then for every language in ascending `<REGION>_<lang>` order its index,
//! large and small bundles; the outer archive aligns names to 0x20 and
//! files to 0x10.

use clyt::{Clyt, EncodeOptions, UsdMode};
use darc::{BuildOptions, Darc};
use lzss10::Compressor;
use tracing::{debug, trace};

use crate::document::{COMMON_TEXTURE_ARC, LanguagePages, Manual, NamedImage, PageSize};
use crate::langs::region_lang_key;
use crate::Result;

fn layout_bytes(layout: &Clyt, usd_mode: UsdMode) -> Result<Vec<u8>> {
    Ok(layout.build(&EncodeOptions { usd_mode })?)
}

/// Sub-pages tagged "info" infer the user-data name placement per entry.
fn sub_page_usd_mode(tag: &str) -> UsdMode {
    if tag == "info" {
        UsdMode::Auto
    } else {
        UsdMode::Adjacent
    }
}

fn image_archive(images: &[NamedImage]) -> Result<Vec<u8>> {
    let mut archive = Darc::default();
    for image in images {
        archive.push(format!("timg/{}.bclim", image.name), image.data.clone());
    }
    Ok(archive.build(&BuildOptions::aligned(0x100, 0x80))?)
}

fn page_archive(pages: &LanguagePages, size: PageSize) -> Result<Vec<u8>> {
    let mut archive = Darc::default();
    for page in &pages.pages {
        for sub in &page.sub_pages {
            if sub.size == size {
                archive.push(
                    format!("blyt/Page_{}_{}_{}.bclyt", page.number, size.code(), sub.tag),
                    layout_bytes(&sub.layout, sub_page_usd_mode(&sub.tag))?,
                );
            }
        }
    }
    Ok(archive.build(&BuildOptions::aligned(4, 4))?)
}

/// Generate a complete BCMA container from a manual document.
pub fn generate(manual: &Manual, compressor: &dyn Compressor) -> Result<Vec<u8>> {
    manual.validate()?;
    let mut inner: Vec<(String, Vec<u8>)> = Vec::new();

    let mut info_archive = Darc::default();
    info_archive.push(
        "blyt/BcmaInfo.bclyt",
        layout_bytes(&manual.info, UsdMode::Adjacent)?,
    );
    inner.push((
        "BcmaInfo".to_owned(),
        info_archive.build(&BuildOptions::default())?,
    ));

    inner.push((
        COMMON_TEXTURE_ARC.to_owned(),
        image_archive(&manual.common_images)?,
    ));
    for arc in &manual.image_arcs {
        inner.push((arc.name.clone(), image_archive(&arc.images)?));
    }

    let mut languages: Vec<(String, &LanguagePages)> = Vec::new();
    for region in &manual.regions {
        for pages in &region.languages {
            languages.push((region_lang_key(region.region, pages.language), pages));
        }
    }
    languages.sort_by(|a, b| a.0.cmp(&b.0));

    for (key, pages) in languages {
        let mut index_archive = Darc::default();
        // Index layouts place every user-data name in the trailing block.
        index_archive.push(
            "blyt/Index.bclyt",
            layout_bytes(&pages.index, UsdMode::Trailing)?,
        );
        inner.push((
            format!("{key}_index"),
            index_archive.build(&BuildOptions::default())?,
        ));
        inner.push((format!("{key}_large"), page_archive(pages, PageSize::Large)?));
        inner.push((format!("{key}_small"), page_archive(pages, PageSize::Small)?));
    }

    let mut outer = Darc::default();
    for (name, bytes) in inner {
        let compressed = compressor.compress(&bytes)?;
        trace!(
            "member {name}: {} bytes, {} compressed",
            bytes.len(),
            compressed.len()
        );
        outer.push(format!("{name}.arc"), compressed);
    }

    let out = outer.build(&BuildOptions::aligned(0x20, 0x10))?;
    debug!("BCMA built: {} members, {} bytes", outer.files.len(), out.len());
    Ok(out)
}
