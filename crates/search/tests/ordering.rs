use pretty_assertions::assert_eq;
use sift_index::{InvertedIndex, SynchronizedIndex};
use sift_search::{ConcurrentQueryProcessor, QueryProcessor, SequentialQueryProcessor};
use std::sync::Arc;

/// Index where `w` prefixes thousands of words across many documents while
/// the animal words are single lookups, so search costs differ widely.
fn skewed_index() -> Arc<SynchronizedIndex> {
    let mut index = InvertedIndex::new();
    for doc in 0..40 {
        let document = format!("doc{doc:02}.txt");
        let words: Vec<String> = (0..200).map(|n| format!("w{}", n * 40 + doc)).collect();
        let next = index.add_all(&words, &document, 1);
        index.add_all(&["cat", "dog", "bird"][doc % 3..], &document, next);
    }
    Arc::new(SynchronizedIndex::from(index))
}

#[test]
fn results_follow_submission_order() {
    let index = skewed_index();
    let mut processor = ConcurrentQueryProcessor::new(Arc::clone(&index), 4).unwrap();

    for line in ["cat", "dog", "bird"] {
        processor.parse_line(line);
    }
    processor.finish();

    let table = processor.table();
    assert_eq!(table.lines().collect::<Vec<_>>(), vec!["cat", "dog", "bird"]);
    assert_eq!(table.get("cat").map(|found| found.len()), Some(14));
    processor.close();
}

#[test]
fn slow_searches_do_not_reorder_fast_ones() {
    let index = skewed_index();
    let lines: Vec<String> = (0..60)
        .map(|n| match n % 4 {
            0 => "w".to_string(),
            1 => "cat".to_string(),
            2 => format!("w{n}"),
            _ => format!("bird dog {n}"),
        })
        .collect();

    let mut sequential = SequentialQueryProcessor::new(Arc::clone(&index));
    let mut concurrent = ConcurrentQueryProcessor::new(index, 8).unwrap();
    for line in &lines {
        sequential.parse_line(line);
        concurrent.parse_line(line);
    }
    concurrent.finish();

    let expected = sequential.table();
    let actual = concurrent.table();
    assert_eq!(actual.pending(), 0);
    assert_eq!(
        actual.lines().collect::<Vec<_>>(),
        expected.lines().collect::<Vec<_>>()
    );
    assert_eq!(actual, expected);
}
