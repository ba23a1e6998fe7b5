use simcore::{Document, EngineError, SearchHandle, Vectorizer, VectorizerConfig};
use std::sync::Arc;

fn docs(pairs: &[(&str, &str)]) -> Vec<Document> {
    pairs.iter().map(|(id, text)| Document::new(*id, *text)).collect()
}

fn movies() -> Vec<Document> {
    docs(&[
        ("Alien", "A crew aboard a space freighter is hunted by a deadly alien creature"),
        ("Aliens", "Marines travel to a space colony overrun by alien creatures"),
        ("Before Sunrise", "Two strangers meet on a train and spend one romantic night in Vienna"),
        ("Amelie", "A shy waitress in Paris decides to change the lives of those around her"),
        ("Interstellar", "Explorers travel through a wormhole in space to save humanity"),
        ("Heat", "A detective hunts a crew of professional bank robbers in Los Angeles"),
        ("Ronin", "A crew of mercenaries is hired to steal a case in Paris"),
        ("Gravity", "Two astronauts are stranded in space after debris destroys their shuttle"),
    ])
}

fn handle(documents: &[Document]) -> SearchHandle {
    SearchHandle::build(Vectorizer::default().fit(documents).unwrap())
}

#[test]
fn shared_terms_rank_first() {
    let corpus = docs(&[
        ("A", "space adventure robots"),
        ("B", "robots in space"),
        ("C", "romantic drama in paris"),
    ]);
    let config = VectorizerConfig::default().with_stop_words(["in"]);
    let handle = SearchHandle::build(Vectorizer::new(config).fit(&corpus).unwrap());

    let result = handle.query_by_identity("A", 1).unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].row, 1);

    let all = handle.query(0, 2).unwrap();
    assert_eq!(all.iter().map(|n| n.row).collect::<Vec<_>>(), vec![1, 2]);
    assert!(all[0].distance < all[1].distance);
}

#[test]
fn results_exclude_self_and_are_ordered() {
    let corpus = movies();
    let handle = handle(&corpus);
    let n = corpus.len();
    for doc in &corpus {
        for k in 1..n {
            let result = handle.recommend(&doc.identity, k).unwrap();
            assert_eq!(result.len(), k);
            assert!(result.iter().all(|r| r.identity != doc.identity));
            for pair in result.windows(2) {
                assert!(pair[0].distance <= pair[1].distance);
                if pair[0].distance == pair[1].distance {
                    assert!(pair[0].row < pair[1].row);
                }
            }
            assert!(result.iter().all(|r| (0.0..=2.0).contains(&r.distance)));
        }
    }
}

#[test]
fn space_movies_cluster() {
    let handle = handle(&movies());
    let result = handle.recommend("alien", 1).unwrap();
    assert_eq!(result[0].identity, "Aliens");
}

#[test]
fn identical_texts_have_zero_distance() {
    let handle = handle(&docs(&[("X", "alpha beta"), ("Y", "alpha beta"), ("Z", "gamma delta")]));
    let result = handle.query(0, 1).unwrap();
    assert_eq!(result[0].row, 1);
    assert_eq!(result[0].distance, 0.0);
}

#[test]
fn identical_pairs_always_report_zero() {
    for i in 1..60usize {
        let text: String = (0..i % 9 + 1).map(|j| format!("w{} ", (i * 13 + j * 7) % 29)).collect();
        let corpus = docs(&[("X", text.as_str()), ("Y", text.as_str()), ("Z", "filler words here")]);
        let result = handle(&corpus).query(0, 1).unwrap();
        assert_eq!(result[0].row, 1);
        assert_eq!(result[0].distance, 0.0);
    }
}

#[test]
fn equal_distances_break_ties_by_row() {
    let handle = handle(&docs(&[("X", "alpha beta"), ("Y", "alpha beta"), ("Z", "gamma delta")]));
    let result = handle.query(2, 2).unwrap();
    assert_eq!(result.iter().map(|n| n.row).collect::<Vec<_>>(), vec![0, 1]);
    assert_eq!(result[0].distance, result[1].distance);
}

#[test]
fn zero_vector_row_is_queryable() {
    let handle = handle(&docs(&[("Empty", "the and of"), ("P", "pirates sail"), ("Q", "quiet quarry")]));
    assert!(handle.index().vector(0).unwrap().is_zero());
    let result = handle.query(0, 2).unwrap();
    assert_eq!(result.iter().map(|n| n.row).collect::<Vec<_>>(), vec![1, 2]);
    assert!(result.iter().all(|n| (n.distance - 1.0).abs() < 1e-6));
}

#[test]
fn refitting_is_deterministic() {
    let corpus = movies();
    let a = Vectorizer::default().fit(&corpus).unwrap();
    let b = Vectorizer::default().fit(&corpus).unwrap();
    assert_eq!(a.vocabulary(), b.vocabulary());
    assert_eq!(a.vectors(), b.vectors());
    assert_eq!(a.idf_weights(), b.idf_weights());
}

#[test]
fn too_many_neighbors() {
    let handle = handle(&docs(&[("A", "red fox"), ("B", "blue fox"), ("C", "green owl")]));
    assert_eq!(
        handle.query(0, 5),
        Err(EngineError::InsufficientNeighbors { requested: 5, available: 2 })
    );
    assert!(matches!(handle.query(0, 3), Err(EngineError::InsufficientNeighbors { .. })));
    assert_eq!(handle.query(0, 0), Err(EngineError::InvalidNeighborCount));
}

#[test]
fn unknown_rows_and_identities() {
    let handle = handle(&movies());
    assert_eq!(handle.query(99, 1), Err(EngineError::UnknownDocument { row: 99, len: 8 }));
    assert_eq!(
        handle.query_by_identity("Nonexistent Title", 3),
        Err(EngineError::DocumentNotFound("Nonexistent Title".into()))
    );
    // exact match only, no partial matching
    assert!(matches!(handle.query_by_identity("Alie", 1), Err(EngineError::DocumentNotFound(_))));
    assert!(handle.query_by_identity("INTERSTELLAR", 1).is_ok());
}

#[test]
fn case_insensitive_duplicates_are_ambiguous() {
    let handle = handle(&docs(&[("Heat", "bank robbers"), ("HEAT", "summer wave"), ("Ronin", "mercenaries")]));
    assert_eq!(handle.resolve("heat"), Err(EngineError::AmbiguousIdentity("heat".into())));
    assert_eq!(handle.resolve("ronin"), Ok(2));
}

#[test]
fn fit_errors() {
    assert_eq!(Vectorizer::default().fit(&[]).unwrap_err(), EngineError::EmptyCorpus);
    let stop_only = docs(&[("A", "the and of"), ("B", "in on at")]);
    assert_eq!(Vectorizer::default().fit(&stop_only).unwrap_err(), EngineError::EmptyVocabulary);
}

#[test]
fn free_text_query() {
    let handle = handle(&movies());
    let result = handle.query_text("stranded astronauts in space", 2).unwrap();
    assert_eq!(handle.index().identity(result[0].row), Some("Gravity"));
    assert!(matches!(handle.query_text("space", 9), Err(EngineError::InsufficientNeighbors { .. })));
}

#[test]
fn concurrent_queries_agree() {
    let shared = Arc::new(handle(&movies()));
    let expected = shared.query(4, 3).unwrap();
    let threads: Vec<_> = (0..4)
        .map(|_| {
            let h = Arc::clone(&shared);
            std::thread::spawn(move || h.query(4, 3).unwrap())
        })
        .collect();
    for t in threads {
        assert_eq!(t.join().unwrap(), expected);
    }
}
