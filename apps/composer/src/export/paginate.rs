//! Splits a visual tree into A4 pages.
//!
//! Pages break only between lines, never inside one. A block that must stay
//! with its successor (section heading, rule, entry title, entry meta) moves to
//! the next page together with the successor's first line. Columns paginate
//! independently; page `n` of every column lands on the same physical page.

use crate::export::ExportMode;
use crate::render::{Block, BlockKind, VisualTree};

/// One line (or rule) positioned on a page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedItem {
    /// Index into `VisualTree::blocks`.
    pub block: usize,
    /// Line within the block; `None` for rules.
    pub line: Option<usize>,
    /// Distance from the top of the printable area to the top of the line box.
    pub top_pt: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub items: Vec<PlacedItem>,
}

/// Lays out every flow of `tree` for `mode`. Always returns at least one page.
pub fn paginate(tree: &VisualTree, mode: ExportMode) -> Vec<PageLayout> {
    let height = tree.page.printable_height();
    let flows: Vec<Vec<usize>> = match mode {
        ExportMode::Visual => (0..tree.columns.len())
            .map(|c| {
                tree.blocks
                    .iter()
                    .enumerate()
                    .filter(|(_, b)| b.column == c)
                    .map(|(i, _)| i)
                    .collect()
            })
            .collect(),
        ExportMode::TextStream => vec![tree
            .blocks
            .iter()
            .enumerate()
            .filter(|(_, b)| b.kind != BlockKind::Rule)
            .map(|(i, _)| i)
            .collect()],
    };

    let mut pages: Vec<PageLayout> = vec![PageLayout::default()];
    for flow in flows {
        for (page_index, items) in paginate_flow(&tree.blocks, &flow, height)
            .into_iter()
            .enumerate()
        {
            if pages.len() <= page_index {
                pages.resize_with(page_index + 1, PageLayout::default);
            }
            pages[page_index].items.extend(items);
        }
    }
    pages
}

struct Cursor {
    pages: Vec<Vec<PlacedItem>>,
    y: f32,
    height: f32,
}

impl Cursor {
    fn at_top(&self) -> bool {
        self.pages.last().map_or(true, Vec::is_empty)
    }

    fn break_page(&mut self) {
        if !self.at_top() {
            self.pages.push(Vec::new());
            self.y = 0.0;
        }
    }

    fn fits(&self, extent: f32) -> bool {
        self.y + extent <= self.height + f32::EPSILON
    }

    /// Places one unit, breaking first if it would overflow.
    fn place(&mut self, block: usize, line: Option<usize>, gap: f32, extent: f32) {
        let gap = if self.at_top() { 0.0 } else { gap };
        if !self.fits(gap + extent) {
            self.break_page();
        }
        let gap = if self.at_top() { 0.0 } else { gap };
        let top_pt = self.y + gap;
        if let Some(page) = self.pages.last_mut() {
            page.push(PlacedItem { block, line, top_pt });
        }
        self.y = top_pt + extent;
    }
}

fn paginate_flow(blocks: &[Block], flow: &[usize], height: f32) -> Vec<Vec<PlacedItem>> {
    let mut cursor = Cursor {
        pages: vec![Vec::new()],
        y: 0.0,
        height,
    };

    for (pos, &index) in flow.iter().enumerate() {
        let block = &blocks[index];

        if block.kind.keeps_with_next() && !cursor.at_top() {
            let needed = keep_extent(blocks, &flow[pos..]);
            if !cursor.fits(needed) && needed <= height {
                cursor.break_page();
            }
        }

        if block.kind == BlockKind::Rule {
            cursor.place(index, None, block.space_before_pt, block.line_height_pt);
            continue;
        }
        for line in 0..block.lines.len() {
            let gap = if line == 0 { block.space_before_pt } else { 0.0 };
            cursor.place(index, Some(line), gap, block.line_height_pt);
        }
    }

    cursor.pages
}

/// Height of a keep-with-next chain starting at `rest[0]`, through the first
/// line of the block that ends it.
fn keep_extent(blocks: &[Block], rest: &[usize]) -> f32 {
    let mut extent = 0.0;
    for &index in rest {
        let block = &blocks[index];
        if block.kind.keeps_with_next() {
            extent += block.height_pt;
        } else {
            let first_line = if block.lines.is_empty() { 0.0 } else { block.line_height_pt };
            return extent + block.space_before_pt + first_line;
        }
    }
    extent
}
