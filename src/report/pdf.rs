// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Single-page PDF rendering of a screening decision
//!
//! Output is a plain uncompressed PDF with one Helvetica page. Identical
//! `(decision, generated_at)` pairs render to identical bytes.

use chrono::NaiveDateTime;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use super::ReportError;
use crate::decision::Decision;

/// Report title line
pub const REPORT_TITLE: &str = "Mammogram Cancer Prediction Report";

/// Timestamp layout used on the report
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const DISCLAIMER: &str =
    "This report was generated by an automated screening model and is not a medical diagnosis.";
const DISCLAIMER_FOLLOW_UP: &str =
    "Please consult a qualified radiologist or physician about these results.";

// A4 in points
const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN_LEFT: i64 = 56;

/// Lines of text placed on the report, top to bottom
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLines {
    pub title: String,
    pub result: String,
    pub confidence: String,
    pub generated: String,
}

impl ReportLines {
    pub fn new(decision: &Decision, generated_at: NaiveDateTime) -> Self {
        Self {
            title: REPORT_TITLE.to_string(),
            result: format!("Prediction Result: {}", decision.label.display_name()),
            confidence: format!("Confidence Score: {}", decision.confidence_percent()),
            generated: format!("Date Generated: {}", generated_at.format(TIMESTAMP_FORMAT)),
        }
    }
}

/// Render the decision as PDF bytes
pub fn render(decision: &Decision, generated_at: NaiveDateTime) -> Result<Vec<u8>, ReportError> {
    let lines = ReportLines::new(decision, generated_at);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut operations = Vec::new();
    push_text(&mut operations, &lines.title, 14, title_x(&lines.title, 14), 780);
    push_text(&mut operations, &lines.result, 12, MARGIN_LEFT, 730);
    push_text(&mut operations, &lines.confidence, 12, MARGIN_LEFT, 710);
    push_text(&mut operations, &lines.generated, 12, MARGIN_LEFT, 690);
    push_text(&mut operations, DISCLAIMER, 9, MARGIN_LEFT, 640);
    push_text(&mut operations, DISCLAIMER_FOLLOW_UP, 9, MARGIN_LEFT, 626);

    let content = Content { operations };
    let encoded = content
        .encode()
        .map_err(|e| ReportError::Encode(e.to_string()))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(REPORT_TITLE),
        "Producer" => Object::string_literal("mammo-screen"),
    });
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| ReportError::Encode(e.to_string()))?;
    Ok(bytes)
}

fn push_text(operations: &mut Vec<Operation>, text: &str, size: i64, x: i64, y: i64) {
    operations.push(Operation::new("BT", vec![]));
    operations.push(Operation::new(
        "Tf",
        vec![Object::Name(b"F1".to_vec()), Object::Integer(size)],
    ));
    operations.push(Operation::new(
        "Td",
        vec![Object::Integer(x), Object::Integer(y)],
    ));
    operations.push(Operation::new("Tj", vec![Object::string_literal(text)]));
    operations.push(Operation::new("ET", vec![]));
}

// Rough centering: Helvetica averages about half an em per glyph
fn title_x(text: &str, size: i64) -> i64 {
    let approx_width = text.chars().count() as i64 * size / 2;
    ((PAGE_WIDTH - approx_width) / 2).max(MARGIN_LEFT)
}
