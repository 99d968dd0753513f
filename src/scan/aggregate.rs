use std::collections::BTreeMap;

use crate::github::DecoratedFile;

/// Filename → titles of the pull requests that touched it, in discovery order.
///
/// Keys are sorted so the written document is stable between runs.
pub type AggregatedDocument = BTreeMap<String, Vec<String>>;

/// Group decorated files by filename. Repeated titles are kept.
pub fn aggregate(files: &[DecoratedFile]) -> AggregatedDocument {
    files.iter().fold(AggregatedDocument::new(), |mut doc, file| {
        doc.entry(file.file.filename.clone())
            .or_default()
            .push(file.pull.title.clone());
        doc
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::tests::{test_file, test_pull};

    const MERGED: &str = "2024-06-01T00:00:00Z";

    fn decorated(filename: &str, number: u64, title: &str) -> DecoratedFile {
        DecoratedFile::new(test_file(filename), test_pull(number, title, MERGED))
    }

    #[test]
    fn test_empty_input_gives_empty_document() {
        assert!(aggregate(&[]).is_empty());
    }

    #[test]
    fn test_titles_keep_encounter_order() {
        let files = vec![decorated("a.rs", 1, "A"), decorated("a.rs", 2, "B")];
        let doc = aggregate(&files);
        assert_eq!(doc["a.rs"], vec!["A", "B"]);
    }

    #[test]
    fn test_duplicate_titles_are_kept() {
        let files = vec![
            decorated("a.rs", 1, "same"),
            decorated("b.rs", 1, "same"),
            decorated("a.rs", 2, "same"),
        ];
        let doc = aggregate(&files);
        assert_eq!(doc["a.rs"], vec!["same", "same"]);
        assert_eq!(doc["b.rs"], vec!["same"]);
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let files = vec![
            decorated("z.rs", 3, "C"),
            decorated("a.rs", 1, "A"),
            decorated("z.rs", 2, "B"),
        ];
        let first = serde_json::to_string(&aggregate(&files)).unwrap();
        let second = serde_json::to_string(&aggregate(&files)).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, r#"{"a.rs":["A"],"z.rs":["C","B"]}"#);
    }
}
