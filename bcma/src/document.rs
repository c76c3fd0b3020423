//! The editable manual document
//!
//! A [`Manual`] is the single editable artefact the toolchain round-trips:
//! texture sets, the `BcmaInfo` layout, and per-region, per-language page
//! bundles. Ordering is meaningful everywhere: images, regions, languages,
//! pages and sub-pages all serialize in stored order.

use clyt::Clyt;
use tracing::debug;

use crate::langs::{Language, Region};
use crate::layout_xml::{clyt_from_xml, clyt_to_xml};
use crate::rle;
use crate::xml::XmlNode;
use crate::{Error, Result};

/// The arc name holding the images every language shares.
pub const COMMON_TEXTURE_ARC: &str = "Common_texture";

/// A named image blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedImage {
    pub name: String,
    pub data: Vec<u8>,
}

/// A named set of images, one inner archive on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageArc {
    pub name: String,
    pub images: Vec<NamedImage>,
}

/// Whether a sub-page belongs to the small- or large-screen set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSize {
    Small,
    Large,
}

impl PageSize {
    pub fn code(self) -> &'static str {
        match self {
            PageSize::Small => "small",
            PageSize::Large => "large",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "small" => Some(PageSize::Small),
            "large" => Some(PageSize::Large),
            _ => None,
        }
    }
}

/// One variant layout of a page.
#[derive(Debug, Clone, PartialEq)]
pub struct SubPage {
    pub size: PageSize,
    /// The textual variant tag, e.g. `"info"` or a digit suffix.
    pub tag: String,
    pub layout: Clyt,
}

/// A numbered manual page with its sub-page variants in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Decimal page number as it appears in file names (three digits).
    pub number: String,
    pub sub_pages: Vec<SubPage>,
}

/// All pages of one language: the index layout plus the page list.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguagePages {
    pub language: Language,
    pub index: Clyt,
    pub pages: Vec<Page>,
}

/// The languages of one region, in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionPages {
    pub region: Region,
    pub languages: Vec<LanguagePages>,
}

/// The complete editable manual.
#[derive(Debug, Clone, PartialEq)]
pub struct Manual {
    pub common_images: Vec<NamedImage>,
    pub image_arcs: Vec<ImageArc>,
    pub info: Clyt,
    pub regions: Vec<RegionPages>,
}

impl Manual {
    /// Check the region/language and page invariants.
    pub fn validate(&self) -> Result<()> {
        for region in &self.regions {
            for pages in &region.languages {
                if !region.region.permits(pages.language) {
                    return Err(Error::LanguageNotPermitted {
                        region: region.region.code(),
                        language: pages.language.code(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Parse a document string into a manual.
    pub fn from_document_str(text: &str) -> Result<Self> {
        Self::from_xml(&XmlNode::parse(text)?)
    }

    /// Serialize the manual as a document string.
    pub fn to_document_string(&self) -> Result<String> {
        self.to_xml().to_document_string()
    }

    /// Build a manual from a parsed `<Manual>` element.
    pub fn from_xml(root: &XmlNode) -> Result<Self> {
        if root.tag != "Manual" {
            return Err(Error::MissingElement("Manual"));
        }

        let mut common_images = Vec::new();
        let mut image_arcs = Vec::new();
        let mut info = None;
        let mut regions = Vec::new();

        for child in &root.children {
            match child.tag.as_str() {
                "ImageArcs" => {
                    for arc in child.children_named("ImageArc") {
                        let name = arc.require_attr("name")?.to_owned();
                        let mut images = Vec::new();
                        for image in arc.children_named("Image") {
                            images.push(NamedImage {
                                name: image.require_attr("name")?.to_owned(),
                                data: rle::decode_bytes(&image.text)?,
                            });
                        }
                        if name == COMMON_TEXTURE_ARC {
                            common_images = images;
                        } else {
                            image_arcs.push(ImageArc { name, images });
                        }
                    }
                }
                "BcmaInfo" => {
                    info = Some(clyt_from_xml(child.only_child("BCLYT")?)?);
                }
                "Region" => {
                    regions.push(region_from_xml(child)?);
                }
                other => {
                    return Err(Error::UnknownTag {
                        parent: root.tag.clone(),
                        tag: other.to_owned(),
                    });
                }
            }
        }

        let manual = Manual {
            common_images,
            image_arcs,
            info: info.ok_or(Error::MissingElement("BcmaInfo"))?,
            regions,
        };
        manual.validate()?;
        debug!(
            "manual document loaded: {} common images, {} arcs, {} regions",
            manual.common_images.len(),
            manual.image_arcs.len(),
            manual.regions.len()
        );
        Ok(manual)
    }

    /// Serialize as a `<Manual>` element.
    pub fn to_xml(&self) -> XmlNode {
        let mut root = XmlNode::new("Manual");

        let mut arcs = XmlNode::new("ImageArcs");
        if !self.common_images.is_empty() {
            arcs.push(image_arc_to_xml(COMMON_TEXTURE_ARC, &self.common_images));
        }
        for arc in &self.image_arcs {
            arcs.push(image_arc_to_xml(&arc.name, &arc.images));
        }
        root.push(arcs);

        root.push(XmlNode::new("BcmaInfo").with_child(clyt_to_xml(&self.info)));

        for region in &self.regions {
            let mut region_node =
                XmlNode::new("Region").with_attr("region", region.region.code());
            for pages in &region.languages {
                let mut pages_node =
                    XmlNode::new("Pages").with_attr("lang", pages.language.code());
                pages_node.push(XmlNode::new("Index").with_child(clyt_to_xml(&pages.index)));
                for page in &pages.pages {
                    let mut page_node = XmlNode::new("Page").with_attr("page", &page.number);
                    for sub in &page.sub_pages {
                        page_node.push(
                            XmlNode::new("SubPage")
                                .with_attr("pagesize", sub.size.code())
                                .with_attr("subpage", &sub.tag)
                                .with_child(clyt_to_xml(&sub.layout)),
                        );
                    }
                    pages_node.push(page_node);
                }
                region_node.push(pages_node);
            }
            root.push(region_node);
        }
        root
    }
}

fn image_arc_to_xml(name: &str, images: &[NamedImage]) -> XmlNode {
    let mut arc = XmlNode::new("ImageArc").with_attr("name", name);
    for image in images {
        arc.push(
            XmlNode::new("Image")
                .with_attr("name", &image.name)
                .with_text(rle::encode_bytes(&image.data)),
        );
    }
    arc
}

fn region_from_xml(node: &XmlNode) -> Result<RegionPages> {
    let region = Region::from_code(node.require_attr("region")?)?;
    let mut languages = Vec::new();

    for pages_node in &node.children {
        if pages_node.tag != "Pages" {
            return Err(Error::UnknownTag {
                parent: node.tag.clone(),
                tag: pages_node.tag.clone(),
            });
        }
        let language = Language::from_code(pages_node.require_attr("lang")?)?;

        let mut index = None;
        let mut pages = Vec::new();
        for entry in &pages_node.children {
            match entry.tag.as_str() {
                "Index" => index = Some(clyt_from_xml(entry.only_child("BCLYT")?)?),
                "Page" => {
                    let number = entry.require_attr("page")?.to_owned();
                    let mut sub_pages = Vec::new();
                    for sub in entry.children_named("SubPage") {
                        let size_code = sub.require_attr("pagesize")?;
                        let size = PageSize::from_code(size_code).ok_or(Error::BadValue {
                            tag: sub.tag.clone(),
                            what: "pagesize",
                            value: size_code.to_owned(),
                        })?;
                        sub_pages.push(SubPage {
                            size,
                            tag: sub.require_attr("subpage")?.to_owned(),
                            layout: clyt_from_xml(sub.only_child("BCLYT")?)?,
                        });
                    }
                    pages.push(Page { number, sub_pages });
                }
                other => {
                    return Err(Error::UnknownTag {
                        parent: pages_node.tag.clone(),
                        tag: other.to_owned(),
                    });
                }
            }
        }

        languages.push(LanguagePages {
            language,
            index: index.ok_or(Error::MissingElement("Index"))?,
            pages,
        });
    }

    Ok(RegionPages { region, languages })
}
