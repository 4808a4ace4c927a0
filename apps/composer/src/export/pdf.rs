//! PDF writing with lopdf: base-14 Type1 fonts, WinAnsi-encoded text, one
//! content stream per page.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::export::paginate::{PageLayout, PlacedItem};
use crate::export::{ExportError, ExportMode};
use crate::layout::{get_metrics, FontFace, FontMetricTable};
use crate::render::{Align, Block, BlockKind, VisualTree};

const REGULAR_FONT: &str = "F1";
const BOLD_FONT: &str = "F2";
const RULE_THICKNESS_PT: f32 = 0.75;
const BULLET_GLYPH: &str = "\u{2022}";
const BULLET_OFFSET_PT: f32 = 9.0;

/// Encodes the paginated tree as a complete PDF file.
pub fn write_pdf(
    tree: &VisualTree,
    pages: &[PageLayout],
    mode: ExportMode,
) -> Result<Vec<u8>, ExportError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_regular = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => tree.font.base_font(FontFace::Regular),
        "Encoding" => "WinAnsiEncoding",
    });
    let font_bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => tree.font.base_font(FontFace::Bold),
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            REGULAR_FONT => font_regular,
            BOLD_FONT => font_bold,
        },
    });

    let painter = Painter {
        tree,
        mode,
        metrics: get_metrics(tree.font),
    };

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page in pages {
        let content = Content {
            operations: painter.page_operations(page),
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id: ObjectId = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Count" => kids.len() as i64,
        "Kids" => kids,
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            tree.page.width_pt.into(),
            tree.page.height_pt.into(),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}

struct Painter<'a> {
    tree: &'a VisualTree,
    mode: ExportMode,
    metrics: &'static FontMetricTable,
}

impl Painter<'_> {
    fn page_operations(&self, page: &PageLayout) -> Vec<Operation> {
        let mut ops = Vec::new();
        for item in &page.items {
            let block = &self.tree.blocks[item.block];
            match item.line {
                None => self.rule(&mut ops, block, item),
                Some(line) => self.line(&mut ops, block, item, line),
            }
        }
        ops
    }

    fn top_y(&self, item: &PlacedItem) -> f32 {
        self.tree.page.height_pt - self.tree.page.margin_pt - item.top_pt
    }

    fn column_frame(&self, block: &Block) -> (f32, f32) {
        match self.mode {
            ExportMode::Visual => {
                let frame = &self.tree.columns[block.column];
                (frame.x_pt, frame.width_pt)
            }
            ExportMode::TextStream => (self.tree.page.margin_pt, self.tree.page.content_width()),
        }
    }

    fn rule(&self, ops: &mut Vec<Operation>, block: &Block, item: &PlacedItem) {
        if self.mode == ExportMode::TextStream {
            return;
        }
        let (x, width) = self.column_frame(block);
        let y = self.top_y(item) - block.line_height_pt / 2.0;
        let (r, g, b) = block.color.rgb();
        ops.push(Operation::new("rg", vec![r.into(), g.into(), b.into()]));
        ops.push(Operation::new(
            "re",
            vec![
                x.into(),
                y.into(),
                width.into(),
                RULE_THICKNESS_PT.into(),
            ],
        ));
        ops.push(Operation::new("f", vec![]));
    }

    fn line(&self, ops: &mut Vec<Operation>, block: &Block, item: &PlacedItem, line: usize) {
        let Some(text) = block.lines.get(line) else {
            return;
        };
        let (col_x, col_width) = self.column_frame(block);
        let font = match block.face {
            FontFace::Regular => REGULAR_FONT,
            FontFace::Bold => BOLD_FONT,
        };

        let mut x = col_x + block.indent_pt;
        if self.mode == ExportMode::Visual && block.align == Align::Center {
            let width = self.metrics.measure_str(text, block.face, block.size_pt);
            x = col_x + ((col_width - width) / 2.0).max(0.0);
        }

        // Baseline sits in the middle of the leading, with a descender allowance.
        let half_leading = (block.line_height_pt - block.size_pt) / 2.0;
        let baseline = self.top_y(item) - half_leading - block.size_pt * 0.8;

        let (r, g, b) = match self.mode {
            ExportMode::Visual => block.color.rgb(),
            ExportMode::TextStream => (0.0, 0.0, 0.0),
        };
        ops.push(Operation::new("rg", vec![r.into(), g.into(), b.into()]));

        if block.kind == BlockKind::Bullet && line == 0 {
            push_text(ops, font, block.size_pt, x - BULLET_OFFSET_PT, baseline, BULLET_GLYPH);
        }
        push_text(ops, font, block.size_pt, x, baseline, text);
    }
}

fn push_text(ops: &mut Vec<Operation>, font: &str, size: f32, x: f32, y: f32, text: &str) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("Tf", vec![font.into(), size.into()]));
    ops.push(Operation::new("Td", vec![x.into(), y.into()]));
    ops.push(Operation::new(
        "Tj",
        vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
    ));
    ops.push(Operation::new("ET", vec![]));
}

/// Maps text to WinAnsiEncoding bytes. Characters with no WinAnsi code point
/// become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\u{A0}'..='\u{FF}' => c as u32 as u8,
            '\u{20AC}' => 0x80,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{2122}' => 0x99,
            _ => b'?',
        })
        .collect()
}
