//! PDF case file: one A4 page per ticker, charts drawn as vector graphics.
//!
//! Each page is rendered on its own, then all pages are assembled into a
//! single document sharing one font resource dictionary.

pub mod canvas;
pub mod chart;
pub mod page;

pub use page::{render_page, RenderedPage, PAGE_HEIGHT, PAGE_WIDTH};

use super::ReportError;
use canvas::{real, Font, Link};
use finsleuth_core::analysis::AnalysisSet;
use lopdf::content::Content;
use lopdf::{dictionary, Dictionary, Document, Object, Stream};

/// Render all pages in set order and serialize the merged document.
pub fn render_pdf(set: &AnalysisSet) -> Result<Vec<u8>, ReportError> {
    let pages: Vec<RenderedPage> = set
        .iter()
        .map(|(ticker, result)| {
            let page = render_page(ticker, result);
            tracing::info!(ticker, stage = "report", "page rendered");
            page
        })
        .collect();
    assemble(pages)
}

fn link_annotation(link: &Link) -> Dictionary {
    let [x0, y0, x1, y1] = link.rect;
    dictionary! {
        "Type" => "Annot",
        "Subtype" => "Link",
        "Rect" => vec![real(x0), real(y0), real(x1), real(y1)],
        "Border" => vec![Object::Integer(0); 3],
        "A" => dictionary! {
            "S" => "URI",
            "URI" => Object::string_literal(link.url.as_str()),
        },
    }
}

fn assemble(pages: Vec<RenderedPage>) -> Result<Vec<u8>, ReportError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut fonts = Dictionary::new();
    for font in Font::ALL {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => font.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(font.resource_name(), font_id);
    }
    let resources_id = doc.add_object(dictionary! { "Font" => fonts });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page in pages {
        let content = Content {
            operations: page.operations,
        };
        let encoded = content
            .encode()
            .map_err(|e| ReportError::Pdf(format!("{}: {e}", page.ticker)))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

        let annots: Vec<Object> = page
            .links
            .iter()
            .map(|link| doc.add_object(link_annotation(link)).into())
            .collect();

        let mut page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        };
        if !annots.is_empty() {
            page_dict.set("Annots", annots);
        }
        kids.push(doc.add_object(page_dict).into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), real(PAGE_WIDTH), real(PAGE_HEIGHT)],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut out = Vec::new();
    doc.save_to(&mut out)
        .map_err(|e| ReportError::Pdf(e.to_string()))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporting::test_support::{result_for, set_of};

    fn sample_set() -> AnalysisSet {
        let up: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let wave: Vec<f64> = (0..40).map(|i| 50.0 + (i as f64 * 0.5).sin() * 3.0).collect();
        set_of(vec![result_for("AAPL", &up), result_for("MSFT", &wave)])
    }

    #[test]
    fn one_page_per_ticker() {
        let bytes = render_pdf(&sample_set()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn pages_follow_set_order() {
        let bytes = render_pdf(&sample_set()).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let pages = doc.get_pages();

        let first = doc.get_page_content(pages[&1]).unwrap();
        let second = doc.get_page_content(pages[&2]).unwrap();
        assert!(String::from_utf8_lossy(&first).contains("Detective's Report: AAPL"));
        assert!(String::from_utf8_lossy(&second).contains("Detective's Report: MSFT"));
    }

    #[test]
    fn indicator_labels_are_linked() {
        let bytes = render_pdf(&sample_set()).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let page_id = doc.get_pages()[&1];
        let annots = doc
            .get_dictionary(page_id)
            .unwrap()
            .get(b"Annots")
            .unwrap()
            .as_array()
            .unwrap()
            .len();
        assert_eq!(annots, 7);
    }
}
