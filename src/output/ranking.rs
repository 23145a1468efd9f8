//! Ranked result display

use crate::index::RankedDocument;

/// Formats one result as `"content", score`
pub fn format_ranked(document: &RankedDocument, precision: u32) -> String {
    format!(
        "\"{}\", {:.*}",
        document.content, precision as usize, document.score
    )
}

/// Prints ranked results, one per line
pub fn print_ranking(query: &str, ranked: &[RankedDocument], precision: u32) {
    println!("Query: {}", query);
    if ranked.is_empty() {
        println!("No matching documents");
        return;
    }
    for document in ranked {
        println!("{}", format_ranked(document, precision));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_ranked() {
        let document = RankedDocument {
            document_id: 2,
            content: "Headache and dizziness are common effects of this medication.".to_string(),
            score: 1.0,
        };
        assert_eq!(
            format_ranked(&document, 2),
            "\"Headache and dizziness are common effects of this medication.\", 1.00"
        );
    }

    #[test]
    fn test_format_respects_precision() {
        let document = RankedDocument {
            document_id: 1,
            content: "x".to_string(),
            score: 0.29,
        };
        assert_eq!(format_ranked(&document, 3), "\"x\", 0.290");
    }
}
