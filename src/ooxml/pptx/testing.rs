//! In-memory fixture decks for tests.

use crate::ooxml::opc::constants::content_type as ct;
use crate::ooxml::pptx::Package;
use quick_xml::escape::escape;
use std::io::{Cursor, Write};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;
const RT: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const CT_MASTER: &str = "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml";
const CT_LAYOUT: &str = "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";

struct SlideSpec {
    texts: Vec<String>,
    notes: Option<String>,
}

/// Builds a small but well-formed .pptx: one master, one layout, and slides
/// with one text shape per entry and optional notes.
///
/// Slide `n` (1-based) is `/ppt/slides/slide{n}.xml`, has slide id `255 + n`
/// and is related from the presentation as `rId{n + 1}`.
pub(crate) struct DeckBuilder {
    slides: Vec<SlideSpec>,
    sections: bool,
    main_content_type: String,
}

impl DeckBuilder {
    pub(crate) fn new() -> Self {
        Self {
            slides: Vec::new(),
            sections: false,
            main_content_type: ct::PML_PRESENTATION_MAIN.to_string(),
        }
    }

    pub(crate) fn slide(mut self, texts: &[&str], notes: Option<&str>) -> Self {
        self.slides.push(SlideSpec {
            texts: texts.iter().map(|t| t.to_string()).collect(),
            notes: notes.map(str::to_string),
        });
        self
    }

    /// Put every slide into a single `p14` section.
    pub(crate) fn with_sections(mut self) -> Self {
        self.sections = true;
        self
    }

    pub(crate) fn main_content_type(mut self, content_type: &str) -> Self {
        self.main_content_type = content_type.to_string();
        self
    }

    pub(crate) fn build(&self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let mut put = |name: &str, body: String| {
            zip.start_file(name, SimpleFileOptions::default()).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        };

        put("[Content_Types].xml", self.content_types());
        put(
            "_rels/.rels",
            rels(&[("rId1", "officeDocument", "ppt/presentation.xml")]),
        );
        put("ppt/presentation.xml", self.presentation());

        let mut pres_rels = vec![(
            "rId1".to_string(),
            "slideMaster",
            "slideMasters/slideMaster1.xml".to_string(),
        )];
        for n in 1..=self.slides.len() {
            pres_rels.push((format!("rId{}", n + 1), "slide", format!("slides/slide{n}.xml")));
        }
        let pres_rels: Vec<(&str, &str, &str)> = pres_rels
            .iter()
            .map(|(id, t, target)| (id.as_str(), *t, target.as_str()))
            .collect();
        put("ppt/_rels/presentation.xml.rels", rels(&pres_rels));

        put(
            "ppt/slideMasters/slideMaster1.xml",
            format!(r#"<p:sldMaster {NS}><p:cSld><p:spTree/></p:cSld></p:sldMaster>"#),
        );
        put(
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            rels(&[("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml")]),
        );
        put(
            "ppt/slideLayouts/slideLayout1.xml",
            format!(r#"<p:sldLayout {NS}><p:cSld><p:spTree/></p:cSld></p:sldLayout>"#),
        );
        put(
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            rels(&[("rId1", "slideMaster", "../slideMasters/slideMaster1.xml")]),
        );

        for (i, spec) in self.slides.iter().enumerate() {
            let n = i + 1;
            put(&format!("ppt/slides/slide{n}.xml"), slide_xml(&spec.texts));

            let layout = ("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml");
            let notes_target = format!("../notesSlides/notesSlide{n}.xml");
            let slide_rels = match spec.notes {
                Some(_) => rels(&[layout, ("rId2", "notesSlide", notes_target.as_str())]),
                None => rels(&[layout]),
            };
            put(&format!("ppt/slides/_rels/slide{n}.xml.rels"), slide_rels);

            if let Some(notes) = &spec.notes {
                let slide_target = format!("../slides/slide{n}.xml");
                put(&format!("ppt/notesSlides/notesSlide{n}.xml"), notes_xml(notes));
                put(
                    &format!("ppt/notesSlides/_rels/notesSlide{n}.xml.rels"),
                    rels(&[("rId1", "slide", slide_target.as_str())]),
                );
            }
        }

        zip.finish().unwrap().into_inner()
    }

    fn content_types(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/>"#,
        );
        let mut add = |partname: &str, content_type: &str| {
            xml.push_str(&format!(
                r#"<Override PartName="{partname}" ContentType="{content_type}"/>"#
            ));
        };
        add("/ppt/presentation.xml", &self.main_content_type);
        add("/ppt/slideMasters/slideMaster1.xml", CT_MASTER);
        add("/ppt/slideLayouts/slideLayout1.xml", CT_LAYOUT);
        for (i, spec) in self.slides.iter().enumerate() {
            let n = i + 1;
            add(&format!("/ppt/slides/slide{n}.xml"), ct::PML_SLIDE);
            if spec.notes.is_some() {
                add(&format!("/ppt/notesSlides/notesSlide{n}.xml"), ct::PML_NOTES_SLIDE);
            }
        }
        xml.push_str("</Types>");
        xml
    }

    fn presentation(&self) -> String {
        let ids: String = (1..=self.slides.len())
            .map(|n| format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 255 + n, n + 1))
            .collect();
        let sections = if self.sections {
            let refs: String = (1..=self.slides.len())
                .map(|n| format!(r#"<p14:sldId id="{}"/>"#, 255 + n))
                .collect();
            format!(
                r#"<p:extLst><p:ext uri="{{521415D9-36F7-43E2-AB2F-B90AF26B5E84}}"><p14:sectionLst xmlns:p14="http://schemas.microsoft.com/office/powerpoint/2010/main"><p14:section name="Default Section" id="{{8A4E1F0B-1C2D-4E5F-9A0B-1C2D3E4F5A6B}}"><p14:sldIdLst>{refs}</p14:sldIdLst></p14:section></p14:sectionLst></p:ext></p:extLst>"#
            )
        } else {
            String::new()
        };
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation {NS}><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst>{ids}</p:sldIdLst><p:sldSz cx="12192000" cy="6858000"/><p:notesSz cx="6858000" cy="9144000"/>{sections}</p:presentation>"#
        )
    }
}

fn rels(entries: &[(&str, &str, &str)]) -> String {
    let body: String = entries
        .iter()
        .map(|(id, reltype, target)| {
            format!(r#"<Relationship Id="{id}" Type="{RT}/{reltype}" Target="{target}"/>"#)
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{body}</Relationships>"#
    )
}

fn paragraphs(text: &str) -> String {
    text.split('\n')
        .map(|line| format!(r#"<a:p><a:r><a:rPr lang="en-US" dirty="0"/><a:t>{}</a:t></a:r></a:p>"#, escape(line)))
        .collect()
}

fn slide_xml(texts: &[String]) -> String {
    let shapes: String = texts
        .iter()
        .enumerate()
        .map(|(i, text)| {
            format!(
                r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="TextBox {}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:lstStyle/>{}</p:txBody></p:sp>"#,
                i + 2,
                i + 1,
                paragraphs(text)
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld {NS}><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{shapes}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#
    )
}

fn notes_xml(notes: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:notes {NS}><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/><p:sp><p:nvSpPr><p:cNvPr id="2" name="Slide Image Placeholder 1"/><p:cNvSpPr/><p:nvPr><p:ph type="sldImg"/></p:nvPr></p:nvSpPr><p:spPr/></p:sp><p:sp><p:nvSpPr><p:cNvPr id="3" name="Notes Placeholder 2"/><p:cNvSpPr/><p:nvPr><p:ph type="body" idx="1"/></p:nvPr></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:lstStyle/>{}</p:txBody></p:sp></p:spTree></p:cSld></p:notes>"#,
        paragraphs(notes)
    )
}

/// Shape text of every slide, in order.
pub(crate) fn slide_texts(pkg: &Package) -> Vec<String> {
    pkg.presentation()
        .unwrap()
        .slides()
        .unwrap()
        .iter()
        .map(|slide| slide.text().unwrap())
        .collect()
}
