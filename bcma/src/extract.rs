//! BCMA extraction
//!
//! Runs the container dataflow wholly in memory: outer DARC, LZSS-10 decode
//! of each member, inner DARC, layout decode, document assembly. Inner
//! archives are routed by name: `BcmaInfo`, `Common_texture`, the
//! `<REGION>_<lang>_{index,large,small}` page bundles, and anything else is
//! a named image arc.

use std::collections::HashMap;

use clyt::Clyt;
use darc::Darc;
use tracing::{debug, trace, warn};

use crate::clim::ClimInfo;
use crate::document::{
    COMMON_TEXTURE_ARC, ImageArc, LanguagePages, Manual, NamedImage, Page, PageSize, RegionPages,
    SubPage,
};
use crate::langs::{Language, Region, region_lang_key};
use crate::{Error, Result};

/// Transparently unwrap LZSS-10; buffers that do not decode pass through.
fn maybe_decompress(data: &[u8]) -> Vec<u8> {
    match lzss10::decompress(data) {
        Ok(out) => {
            trace!("LZSS-10 member: {} -> {} bytes", data.len(), out.len());
            out
        }
        Err(_) => data.to_vec(),
    }
}

fn arc_kind(name: &str) -> Option<(Region, Language, &str)> {
    let mut parts = name.splitn(3, '_');
    let region = Region::from_code(parts.next()?).ok()?;
    let language = Language::from_code(parts.next()?).ok()?;
    let kind = parts.next()?;
    matches!(kind, "index" | "large" | "small").then_some((region, language, kind))
}

/// Split `Page_<nnn>_<size>_<sub>` into page number and sub-page tag.
fn parse_page_stem(stem: &str) -> Result<(String, String)> {
    let rest = stem
        .strip_prefix("Page_")
        .ok_or_else(|| Error::BadPageName(stem.to_owned()))?;
    let number = rest
        .get(0..3)
        .filter(|n| n.bytes().all(|b| b.is_ascii_digit()))
        .ok_or_else(|| Error::BadPageName(stem.to_owned()))?;
    let tag = stem
        .rsplit('_')
        .next()
        .ok_or_else(|| Error::BadPageName(stem.to_owned()))?;
    Ok((number.to_owned(), tag.to_owned()))
}

fn image_name(path: &str) -> String {
    let base = path.rsplit('/').next().unwrap_or(path);
    base.strip_suffix(".bclim").unwrap_or(base).to_owned()
}

fn images_of(archive: &Darc) -> Vec<NamedImage> {
    archive
        .files
        .iter()
        .map(|file| {
            if let Ok(info) = ClimInfo::probe(&file.data) {
                trace!(
                    "texture {:?}: {}x{} {:?}",
                    file.path, info.width, info.height, info.format
                );
            }
            NamedImage {
                name: image_name(&file.path),
                data: file.data.clone(),
            }
        })
        .collect()
}

#[derive(Default)]
struct LangAccum {
    index: Option<Clyt>,
    pages: Vec<Page>,
}

impl LangAccum {
    fn add_sub_page(&mut self, number: String, sub: SubPage) {
        match self.pages.iter_mut().find(|p| p.number == number) {
            Some(page) => page.sub_pages.push(sub),
            None => self.pages.push(Page {
                number,
                sub_pages: vec![sub],
            }),
        }
    }
}

/// Extract a BCMA container into its editable document form.
pub fn extract(data: &[u8]) -> Result<Manual> {
    let outer_bytes = maybe_decompress(data);
    let outer = Darc::parse(&outer_bytes)?;
    debug!("outer archive: {} members", outer.files.len());

    let mut info = None;
    let mut common_images = Vec::new();
    let mut image_arcs = Vec::new();
    let mut langs: HashMap<(Region, Language), LangAccum> = HashMap::new();

    for member in &outer.files {
        let Some(arc_name) = member.path.strip_suffix(".arc") else {
            warn!("skipping outer member {:?}: not an .arc", member.path);
            continue;
        };
        let inner_bytes = maybe_decompress(&member.data);
        let inner = Darc::parse(&inner_bytes)?;
        trace!("member {:?}: {} files", arc_name, inner.files.len());

        if arc_name == "BcmaInfo" {
            let file = inner.file("blyt/BcmaInfo.bclyt").ok_or(Error::MissingMember {
                archive: arc_name.to_owned(),
                member: "blyt/BcmaInfo.bclyt".to_owned(),
            })?;
            info = Some(Clyt::parse(&file.data)?);
        } else if arc_name == COMMON_TEXTURE_ARC {
            common_images = images_of(&inner);
        } else if let Some((region, language, kind)) = arc_kind(arc_name) {
            let accum = langs.entry((region, language)).or_default();
            match kind {
                "index" => {
                    let file = inner.file("blyt/Index.bclyt").ok_or(Error::MissingMember {
                        archive: arc_name.to_owned(),
                        member: "blyt/Index.bclyt".to_owned(),
                    })?;
                    accum.index = Some(Clyt::parse(&file.data)?);
                }
                size_code => {
                    let size = PageSize::from_code(size_code).unwrap_or(PageSize::Small);
                    for file in &inner.files {
                        let base = file.path.rsplit('/').next().unwrap_or(&file.path);
                        let stem = base.strip_suffix(".bclyt").unwrap_or(base);
                        let (number, tag) = parse_page_stem(stem)?;
                        accum.add_sub_page(
                            number,
                            SubPage {
                                size,
                                tag,
                                layout: Clyt::parse(&file.data)?,
                            },
                        );
                    }
                }
            }
        } else {
            image_arcs.push(ImageArc {
                name: arc_name.to_owned(),
                images: images_of(&inner),
            });
        }
    }

    // Regions and languages assemble in canonical document order.
    let mut regions = Vec::new();
    for region in Region::ALL {
        let mut languages = Vec::new();
        for &language in region.languages() {
            if let Some(accum) = langs.remove(&(region, language)) {
                languages.push(LanguagePages {
                    language,
                    index: accum.index.ok_or_else(|| Error::MissingMember {
                        archive: format!("{}_index", region_lang_key(region, language)),
                        member: "blyt/Index.bclyt".to_owned(),
                    })?,
                    pages: accum.pages,
                });
            }
        }
        if !languages.is_empty() {
            regions.push(RegionPages { region, languages });
        }
    }
    if let Some(((region, language), _)) = langs.into_iter().next() {
        return Err(Error::LanguageNotPermitted {
            region: region.code(),
            language: language.code(),
        });
    }

    let manual = Manual {
        common_images,
        image_arcs,
        info: info.ok_or(Error::MissingElement("BcmaInfo"))?,
        regions,
    };
    debug!(
        "extracted manual: {} common images, {} arcs, {} regions",
        manual.common_images.len(),
        manual.image_arcs.len(),
        manual.regions.len()
    );
    Ok(manual)
}
