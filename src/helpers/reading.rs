//! Word counting and read-time estimation

use crate::cms::{as_text, ContentSection};

/// Words read per minute
pub const WORDS_PER_MINUTE: usize = 200;

/// Number of tokens produced by splitting on the space character
///
/// Only `' '` separates words, so an empty string counts as one word and
/// runs of spaces produce empty tokens that are counted too.
pub fn word_count(text: &str) -> usize {
    text.split(' ').count()
}

/// Total words of a post body, headings included
pub fn total_words(sections: &[ContentSection]) -> usize {
    sections
        .iter()
        .map(|section| word_count(&section.heading) + word_count(&as_text(&section.body)))
        .sum()
}

/// Estimated read time in whole minutes, rounded up
pub fn read_time_minutes(sections: &[ContentSection]) -> usize {
    total_words(sections).div_ceil(WORDS_PER_MINUTE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::RichTextBlock;

    fn section(heading: &str, body: &[&str]) -> ContentSection {
        ContentSection {
            heading: heading.to_string(),
            body: body.iter().map(|t| RichTextBlock::paragraph(t)).collect(),
        }
    }

    #[test]
    fn test_word_count_splits_on_spaces_only() {
        assert_eq!(word_count("a b c"), 3);
        assert_eq!(word_count("Intro"), 1);
        assert_eq!(word_count(""), 1);
        assert_eq!(word_count("a  b"), 3);
        assert_eq!(word_count("a\nb"), 1);
    }

    #[test]
    fn test_single_section_scenario() {
        let sections = vec![section("Intro", &["a b c"])];
        assert_eq!(total_words(&sections), 4);
        assert_eq!(read_time_minutes(&sections), 1);
    }

    #[test]
    fn test_read_time_rounds_up() {
        let body = vec!["word"; 199].join(" ");
        let sections = vec![section("Heading", &[&body])];
        assert_eq!(total_words(&sections), 200);
        assert_eq!(read_time_minutes(&sections), 1);

        let body = vec!["word"; 200].join(" ");
        let sections = vec![section("Heading", &[&body])];
        assert_eq!(total_words(&sections), 201);
        assert_eq!(read_time_minutes(&sections), 2);
    }

    #[test]
    fn test_read_time_across_sections() {
        let long = vec!["word"; 250].join(" ");
        let sections = vec![
            section("Part one", &[&long]),
            section("Part two", &["short body", "second block"]),
        ];
        // 2 + 250 + 2 + 4
        assert_eq!(total_words(&sections), 258);
        assert_eq!(read_time_minutes(&sections), 2);
    }

    #[test]
    fn test_no_sections() {
        assert_eq!(total_words(&[]), 0);
        assert_eq!(read_time_minutes(&[]), 0);
    }
}
