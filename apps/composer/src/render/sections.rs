// Section builders. Each returns blocks for one column in reading order; a
// section with nothing to show returns nothing, heading included.

use crate::document::{DocumentModel, EducationEntry, ExperienceEntry, SkillGroup};
use crate::layout::{get_metrics, wrap_text, FontFace, FontFamily, FontMetricTable};
use crate::render::{Align, Block, BlockKind, ColumnFrame};
use crate::style::{ColorScheme, LayoutVariant, StyleModel, TypeSizes};

const SECTION_GAP_PT: f32 = 12.0;
const ENTRY_GAP_PT: f32 = 6.0;
const PARAGRAPH_GAP_PT: f32 = 6.0;
const RULE_GAP_PT: f32 = 2.0;
const RULE_HEIGHT_PT: f32 = 4.0;
const BULLET_INDENT_PT: f32 = 12.0;
const CONTACT_SEPARATOR: &str = "  |  ";

pub(crate) struct Context {
    metrics: &'static FontMetricTable,
    sizes: TypeSizes,
    colors: ColorScheme,
}

struct Column<'a> {
    ctx: &'a Context,
    index: usize,
    width: f32,
    blocks: Vec<Block>,
}

/// Text styling for one block.
struct Look {
    kind: BlockKind,
    face: FontFace,
    size: f32,
    color: Ink,
    indent: f32,
    space_before: f32,
    align: Align,
}

#[derive(Clone, Copy)]
enum Ink {
    Text,
    Accent,
    Muted,
}

impl Context {
    pub(crate) fn new(font: FontFamily, style: &StyleModel) -> Self {
        Self {
            metrics: get_metrics(font),
            sizes: style.typography.sizes(),
            colors: style.color_scheme.clone(),
        }
    }

    fn look(&self, kind: BlockKind) -> Look {
        let s = self.sizes;
        let (face, size, color, space_before) = match kind {
            BlockKind::Name => (FontFace::Bold, s.name, Ink::Text, 0.0),
            BlockKind::Headline => (FontFace::Regular, s.heading, Ink::Accent, 2.0),
            BlockKind::ContactLine => (FontFace::Regular, s.body, Ink::Muted, 2.0),
            BlockKind::SectionHeading => (FontFace::Bold, s.heading, Ink::Accent, SECTION_GAP_PT),
            BlockKind::EntryTitle => (FontFace::Bold, s.body, Ink::Text, ENTRY_GAP_PT),
            BlockKind::EntryMeta => (FontFace::Regular, s.body, Ink::Muted, 0.0),
            BlockKind::Paragraph => (FontFace::Regular, s.body, Ink::Text, 0.0),
            BlockKind::Bullet => (FontFace::Regular, s.body, Ink::Text, 0.0),
            BlockKind::SkillLine => (FontFace::Regular, s.body, Ink::Text, 0.0),
            BlockKind::Rule => (FontFace::Regular, s.body, Ink::Accent, RULE_GAP_PT),
        };
        Look {
            kind,
            face,
            size,
            color,
            indent: if kind == BlockKind::Bullet { BULLET_INDENT_PT } else { 0.0 },
            space_before,
            align: Align::Left,
        }
    }
}

impl Look {
    fn space_before(mut self, pt: f32) -> Self {
        self.space_before = pt;
        self
    }

    fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }
}

impl<'a> Column<'a> {
    fn new(ctx: &'a Context, index: usize, frame: &ColumnFrame) -> Self {
        Self {
            ctx,
            index,
            width: frame.width_pt,
            blocks: Vec::new(),
        }
    }

    fn text(&mut self, look: Look, text: &str) {
        let lines = wrap_text(
            text,
            self.ctx.metrics,
            look.face,
            look.size,
            self.width - look.indent,
        );
        if lines.is_empty() {
            return;
        }
        let line_height = look.size * self.ctx.sizes.leading;
        let color = match look.color {
            Ink::Text => self.ctx.colors.text(),
            Ink::Accent => self.ctx.colors.accent(),
            Ink::Muted => self.ctx.colors.muted(),
        }
        .clone();
        self.blocks.push(Block {
            kind: look.kind,
            column: self.index,
            indent_pt: look.indent,
            face: look.face,
            size_pt: look.size,
            line_height_pt: line_height,
            space_before_pt: look.space_before,
            color,
            align: look.align,
            height_pt: look.space_before + line_height * lines.len() as f32,
            lines,
        });
    }

    fn rule(&mut self) {
        self.blocks.push(Block {
            kind: BlockKind::Rule,
            column: self.index,
            indent_pt: 0.0,
            face: FontFace::Regular,
            size_pt: 0.0,
            line_height_pt: RULE_HEIGHT_PT,
            space_before_pt: RULE_GAP_PT,
            color: self.ctx.colors.accent().clone(),
            align: Align::Left,
            lines: Vec::new(),
            height_pt: RULE_GAP_PT + RULE_HEIGHT_PT,
        });
    }

    fn heading(&mut self, title: &str) {
        let look = self.ctx.look(BlockKind::SectionHeading);
        let look = if self.blocks.is_empty() {
            look.space_before(0.0)
        } else {
            look
        };
        self.text(look, &title.to_uppercase());
        self.rule();
    }

    fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Shared sections
// ────────────────────────────────────────────────────────────────────────────

fn header(col: &mut Column, doc: &DocumentModel, align: Align, stacked_contact: bool) {
    let ctx = col.ctx;
    col.text(ctx.look(BlockKind::Name).align(align), &doc.contact.full_name);
    let headline = ctx.look(BlockKind::Headline).align(align);
    let headline = if col.is_empty() { headline.space_before(0.0) } else { headline };
    col.text(headline, &doc.contact.headline);

    let c = &doc.contact;
    let parts: Vec<&str> = [&c.email, &c.phone, &c.location, &c.website]
        .into_iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();

    if stacked_contact {
        for part in parts {
            col.text(ctx.look(BlockKind::ContactLine).align(align), part);
        }
    } else if !parts.is_empty() {
        col.text(
            ctx.look(BlockKind::ContactLine).align(align),
            &parts.join(CONTACT_SEPARATOR),
        );
    }
}

fn summary(col: &mut Column, doc: &DocumentModel) {
    if doc.summary.trim().is_empty() {
        return;
    }
    col.heading("Summary");
    paragraphs(col, &doc.summary);
}

fn experience(col: &mut Column, entries: &[ExperienceEntry]) {
    let entries: Vec<&ExperienceEntry> = entries.iter().filter(|e| !is_blank_experience(e)).collect();
    if entries.is_empty() {
        return;
    }
    let ctx = col.ctx;
    col.heading("Experience");
    for (i, entry) in entries.into_iter().enumerate() {
        let title = ctx.look(BlockKind::EntryTitle);
        let title = if i == 0 { title.space_before(0.0) } else { title };
        col.text(title, &join_non_empty(&[entry.title.as_str(), entry.company.as_str()], ", "));
        let dates = date_range(&entry.start_date, &entry.end_date);
        col.text(
            ctx.look(BlockKind::EntryMeta),
            &join_non_empty(&[entry.location.as_str(), dates.as_str()], CONTACT_SEPARATOR),
        );
        for line in entry.bullet_lines() {
            col.text(ctx.look(BlockKind::Bullet), line);
        }
    }
}

fn education(col: &mut Column, entries: &[EducationEntry]) {
    let entries: Vec<&EducationEntry> = entries.iter().filter(|e| !is_blank_education(e)).collect();
    if entries.is_empty() {
        return;
    }
    let ctx = col.ctx;
    col.heading("Education");
    for (i, entry) in entries.into_iter().enumerate() {
        let title = ctx.look(BlockKind::EntryTitle);
        let title = if i == 0 { title.space_before(0.0) } else { title };
        col.text(title, &join_non_empty(&[entry.degree.as_str(), entry.institution.as_str()], ", "));
        let dates = date_range(&entry.start_date, &entry.end_date);
        col.text(
            ctx.look(BlockKind::EntryMeta),
            &join_non_empty(&[entry.location.as_str(), dates.as_str()], CONTACT_SEPARATOR),
        );
        col.text(ctx.look(BlockKind::Paragraph), &entry.details);
    }
}

fn skills(col: &mut Column, groups: &[SkillGroup]) {
    let lines: Vec<String> = groups.iter().filter_map(skill_line).collect();
    if lines.is_empty() {
        return;
    }
    let ctx = col.ctx;
    col.heading("Skills");
    for line in lines {
        col.text(ctx.look(BlockKind::SkillLine), &line);
    }
}

fn paragraphs(col: &mut Column, text: &str) {
    let ctx = col.ctx;
    for (i, para) in split_paragraphs(text).into_iter().enumerate() {
        let look = ctx.look(BlockKind::Paragraph);
        let look = if i == 0 { look } else { look.space_before(PARAGRAPH_GAP_PT) };
        col.text(look, &para);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Document layouts
// ────────────────────────────────────────────────────────────────────────────

pub(crate) fn resume_single(
    ctx: &Context,
    doc: &DocumentModel,
    frame: &ColumnFrame,
    layout: LayoutVariant,
) -> Vec<Block> {
    let align = header_align(layout);
    let mut col = Column::new(ctx, 0, frame);
    header(&mut col, doc, align, false);
    summary(&mut col, doc);
    experience(&mut col, &doc.experience);
    education(&mut col, &doc.education);
    skills(&mut col, &doc.skills);
    col.blocks
}

pub(crate) fn resume_sidebar(
    ctx: &Context,
    doc: &DocumentModel,
    side_frame: &ColumnFrame,
    main_frame: &ColumnFrame,
) -> Vec<Block> {
    let mut side = Column::new(ctx, 0, side_frame);
    header(&mut side, doc, Align::Left, true);
    skills(&mut side, &doc.skills);

    let mut main = Column::new(ctx, 1, main_frame);
    summary(&mut main, doc);
    experience(&mut main, &doc.experience);
    education(&mut main, &doc.education);

    let mut blocks = side.blocks;
    blocks.extend(main.blocks);
    blocks
}

pub(crate) fn letter(
    ctx: &Context,
    doc: &DocumentModel,
    frame: &ColumnFrame,
    layout: LayoutVariant,
) -> Vec<Block> {
    let mut col = Column::new(ctx, 0, frame);
    header(&mut col, doc, header_align(layout), false);
    if !col.is_empty() {
        col.rule();
    }

    let l = &doc.letter;
    let recipient: Vec<&str> = [&l.recipient_name, &l.recipient_title, &l.company, &l.company_address]
        .into_iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    for (i, line) in recipient.iter().enumerate() {
        let look = ctx.look(BlockKind::Paragraph);
        let look = if i == 0 { look.space_before(SECTION_GAP_PT) } else { look };
        col.text(look, line);
    }

    if l.body.trim().is_empty() {
        return col.blocks;
    }

    let addressee = match l.recipient_name.trim() {
        "" => "Hiring Manager",
        name => name,
    };
    col.text(
        ctx.look(BlockKind::Paragraph).space_before(SECTION_GAP_PT),
        &format!("Dear {addressee},"),
    );
    for para in split_paragraphs(&l.body) {
        col.text(ctx.look(BlockKind::Paragraph).space_before(PARAGRAPH_GAP_PT), &para);
    }
    col.text(
        ctx.look(BlockKind::Paragraph).space_before(SECTION_GAP_PT),
        "Sincerely,",
    );
    col.text(ctx.look(BlockKind::Paragraph), &doc.contact.full_name);
    col.blocks
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn header_align(layout: LayoutVariant) -> Align {
    match layout {
        LayoutVariant::Centered => Align::Center,
        LayoutVariant::Classic | LayoutVariant::Sidebar => Align::Left,
    }
}

/// Blank-line separated paragraphs, inner newlines kept as hard breaks.
fn split_paragraphs(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                out.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line.trim());
        }
    }
    if !current.is_empty() {
        out.push(current.join("\n"));
    }
    out
}

fn join_non_empty(parts: &[&str], separator: &str) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

fn date_range(start: &str, end: &str) -> String {
    match (start.trim(), end.trim()) {
        ("", "") => String::new(),
        ("", end) => end.to_string(),
        (start, "") => format!("{start} \u{2013} Present"),
        (start, end) => format!("{start} \u{2013} {end}"),
    }
}

fn skill_line(group: &SkillGroup) -> Option<String> {
    let items: Vec<&str> = group
        .items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if items.is_empty() {
        return None;
    }
    let items = items.join(", ");
    Some(match group.category.trim() {
        "" => items,
        category => format!("{category}: {items}"),
    })
}

fn is_blank_experience(e: &ExperienceEntry) -> bool {
    [&e.title, &e.company, &e.location, &e.start_date, &e.end_date, &e.description]
        .iter()
        .all(|s| s.trim().is_empty())
}

fn is_blank_education(e: &EducationEntry) -> bool {
    [&e.degree, &e.institution, &e.location, &e.start_date, &e.end_date, &e.details]
        .iter()
        .all(|s| s.trim().is_empty())
}
