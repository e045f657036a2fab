use notebox_core::{compute_view, Note, NoteId, SortMode};

fn note(id: &str, title: &str, body: &str, updated_at: i64) -> Note {
    Note {
        id: NoteId::new(id),
        title: title.to_string(),
        body: body.to_string(),
        updated_at,
    }
}

fn ids(notes: &[Note]) -> Vec<&str> {
    notes.iter().map(|n| n.id.as_str()).collect()
}

#[test]
fn empty_query_sorts_descending_by_default() {
    let notes = vec![
        note("A", "a", "", 100),
        note("B", "b", "", 300),
        note("C", "c", "", 200),
    ];

    let view = compute_view(&notes, "", SortMode::default());
    assert_eq!(ids(&view), vec!["B", "C", "A"]);
}

#[test]
fn ascending_sort_orders_oldest_first() {
    let notes = vec![
        note("A", "a", "", 100),
        note("B", "b", "", 300),
        note("C", "c", "", 200),
    ];

    let view = compute_view(&notes, "   ", SortMode::UpdatedAsc);
    assert_eq!(ids(&view), vec!["A", "C", "B"]);
}

#[test]
fn ties_keep_input_order_in_both_directions() {
    let notes = vec![
        note("first", "x", "", 50),
        note("newest", "x", "", 90),
        note("second", "x", "", 50),
        note("third", "x", "", 50),
    ];

    let desc = compute_view(&notes, "", SortMode::UpdatedDesc);
    assert_eq!(ids(&desc), vec!["newest", "first", "second", "third"]);

    let asc = compute_view(&notes, "", SortMode::UpdatedAsc);
    assert_eq!(ids(&asc), vec!["first", "second", "third", "newest"]);
}

#[test]
fn query_matches_title_or_body_case_insensitively() {
    let notes = vec![
        note("title-hit", "Weekly MEETING", "", 30),
        note("miss", "Groceries", "milk, eggs", 40),
        note("body-hit", "Plans", "prepare for the Meeting notes", 10),
        note("partial", "Meet", "ing", 20),
    ];

    let view = compute_view(&notes, "meeting", SortMode::UpdatedAsc);
    assert_eq!(ids(&view), vec!["body-hit", "title-hit"]);
}

#[test]
fn query_is_trimmed_before_matching() {
    let notes = vec![note("a", "Roadmap", "", 1), note("b", "Road trip", "", 2)];

    let view = compute_view(&notes, "  roadm  ", SortMode::UpdatedDesc);
    assert_eq!(ids(&view), vec!["a"]);
}

#[test]
fn query_folds_non_ascii_case() {
    let notes = vec![note("a", "Ärger im Büro", "", 1), note("b", "Other", "", 2)];

    let view = compute_view(&notes, "BÜRO", SortMode::UpdatedDesc);
    assert_eq!(ids(&view), vec!["a"]);
}

#[test]
fn inputs_are_left_untouched() {
    let notes = vec![note("A", "a", "", 100), note("B", "b", "", 300)];
    let snapshot = notes.clone();

    let view = compute_view(&notes, "", SortMode::UpdatedDesc);
    assert_eq!(ids(&view), vec!["B", "A"]);
    assert_eq!(notes, snapshot);
}

#[test]
fn no_matches_yields_empty_view() {
    let notes = vec![note("A", "a", "", 100)];
    assert!(compute_view(&notes, "zzz", SortMode::UpdatedAsc).is_empty());
    assert!(compute_view(&[], "", SortMode::UpdatedDesc).is_empty());
}
