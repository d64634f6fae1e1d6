use crate::contract::{BlockKind, ExtractionResult, TextBlock};

/// Joins every LINE block in service order, each followed by a newline.
///
/// Blocks are not re-sorted; the service order is taken as reading order.
/// A LINE block without text still contributes its newline.
pub fn reduce_lines<'a, I>(blocks: I) -> ExtractionResult
where
    I: IntoIterator<Item = &'a TextBlock>,
{
    let mut extracted_text = String::new();
    for block in blocks {
        if block.kind != BlockKind::Line {
            continue;
        }
        if let Some(text) = &block.text {
            extracted_text.push_str(text);
        }
        extracted_text.push('\n');
    }

    ExtractionResult { extracted_text }
}

pub fn line_count<'a, I>(blocks: I) -> usize
where
    I: IntoIterator<Item = &'a TextBlock>,
{
    blocks
        .into_iter()
        .filter(|block| block.kind == BlockKind::Line)
        .count()
}
