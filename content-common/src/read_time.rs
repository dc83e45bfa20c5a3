use crate::models::ContentBlock;

/// 平均阅读速度（每分钟字数）
pub const WORDS_PER_MINUTE: usize = 225;

/// 统计内容块中的字数
///
/// 文本块的每个片段、引用块的引文都参与统计，
/// 带有子块的块会被递归遍历，图片等其他块计为0。
pub fn count_words(blocks: &[ContentBlock]) -> usize {
    blocks.iter().map(count_block_words).sum()
}

fn count_block_words(block: &ContentBlock) -> usize {
    let own = match block {
        ContentBlock::Text(text) => text
            .children
            .iter()
            .map(|span| count_text_words(&span.text))
            .sum(),
        ContentBlock::BlockQuote { quote, .. } => count_text_words(quote),
        ContentBlock::FullWidthImage { .. }
        | ContentBlock::TwoImages { .. }
        | ContentBlock::Unknown { .. } => 0,
    };

    own + count_words(block.nested())
}

fn count_text_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// 估算阅读时间（分钟）
///
/// 没有正文字段或正文为空时返回0，否则至少返回1。
pub fn estimate_minutes(content: Option<&[ContentBlock]>) -> u32 {
    let blocks = match content {
        Some(blocks) if !blocks.is_empty() => blocks,
        _ => return 0,
    };

    let minutes = count_words(blocks).div_ceil(WORDS_PER_MINUTE);
    u32::try_from(minutes).unwrap_or(u32::MAX).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BlockStyle, Span, TextBlock};

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[test]
    fn absent_or_empty_content_reads_in_zero_minutes() {
        assert_eq!(estimate_minutes(None), 0);
        assert_eq!(estimate_minutes(Some(&[][..])), 0);
    }

    #[test]
    fn short_paragraph_reads_in_one_minute() {
        let content = vec![ContentBlock::paragraph("one two three")];
        assert_eq!(estimate_minutes(Some(content.as_slice())), 1);
    }

    #[test]
    fn minutes_round_up_past_each_full_minute() {
        let exact = vec![ContentBlock::paragraph(words(450))];
        assert_eq!(estimate_minutes(Some(exact.as_slice())), 2);

        let over = vec![ContentBlock::paragraph(words(451))];
        assert_eq!(estimate_minutes(Some(over.as_slice())), 3);
    }

    #[test]
    fn images_only_still_report_one_minute() {
        let content = vec![ContentBlock::FullWidthImage {
            image: Default::default(),
            alt: Some("a quiet living room with linen curtains".to_string()),
            caption: Some("Living room".to_string()),
            content: Vec::new(),
        }];
        assert_eq!(count_words(&content), 0);
        assert_eq!(estimate_minutes(Some(content.as_slice())), 1);
    }

    #[test]
    fn whitespace_runs_and_spans_are_counted_per_token() {
        let block = ContentBlock::Text(TextBlock {
            style: BlockStyle::Normal,
            children: vec![
                Span::plain("  layered   textures\n"),
                Span::plain("\twarm light "),
                Span::plain("   "),
            ],
            content: Vec::new(),
        });
        assert_eq!(count_words(&[block]), 4);
    }

    #[test]
    fn quotes_and_nested_blocks_are_traversed() {
        let content = vec![
            ContentBlock::heading(2, "Start with texture"),
            ContentBlock::BlockQuote {
                quote: "Home is a feeling".to_string(),
                author: Some("Someone Wise".to_string()),
                citation: None,
                content: Vec::new(),
            },
            ContentBlock::Unknown {
                type_name: "callout".to_string(),
                content: vec![ContentBlock::Unknown {
                    type_name: "column".to_string(),
                    content: vec![ContentBlock::paragraph("deeply nested words")],
                }],
            },
        ];
        assert_eq!(count_words(&content), 3 + 4 + 3);
    }

    #[test]
    fn known_blocks_carrying_sub_blocks_count_them_too() {
        let quote = ContentBlock::BlockQuote {
            quote: "one two".to_string(),
            author: None,
            citation: None,
            content: vec![ContentBlock::paragraph("three four five")],
        };
        let mut paragraph = TextBlock {
            style: BlockStyle::Normal,
            children: vec![Span::plain("six")],
            content: Vec::new(),
        };
        paragraph.content.push(ContentBlock::FullWidthImage {
            image: Default::default(),
            alt: None,
            caption: None,
            content: vec![ContentBlock::heading(3, "seven eight")],
        });

        assert_eq!(count_words(&[quote]), 5);
        assert_eq!(count_words(&[ContentBlock::Text(paragraph)]), 3);
    }
}
