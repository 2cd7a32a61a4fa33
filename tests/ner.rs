use std::fs;

use health_ner::nlp::{Category, GazetteerNer, ModelError, Ner, Pattern};

fn gazetteer() -> GazetteerNer {
    GazetteerNer::from_patterns(
        [
            Pattern::new("DISEASE", "diabetes"),
            Pattern::new("DISEASE", "type 2 diabetes"),
            Pattern::new("SYMPTOM", "fever"),
            Pattern::new("SYMPTOM", "chest pain"),
            Pattern::new("TREATMENT", "insulin"),
            Pattern::new("DISEASE", "covid-19"),
        ],
        1_000,
    )
    .unwrap()
}

#[test]
fn spans_follow_text_order_and_keep_original_case() {
    let spans = gazetteer()
        .annotate("Insulin was started after FEVER and Chest Pain.")
        .unwrap();
    let found: Vec<(&str, &str)> = spans
        .iter()
        .map(|s| (s.label.as_str(), s.text.as_str()))
        .collect();
    assert_eq!(
        found,
        [
            ("TREATMENT", "Insulin"),
            ("SYMPTOM", "FEVER"),
            ("SYMPTOM", "Chest Pain")
        ]
    );
    assert_eq!(&"Insulin was started"[spans[0].start..spans[0].end], "Insulin");
}

#[test]
fn longest_phrase_wins() {
    let spans = gazetteer().annotate("history of type 2 diabetes").unwrap();
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].text, "type 2 diabetes");
}

#[test]
fn matches_whole_words_only() {
    let spans = gazetteer().annotate("feverish and prediabetes").unwrap();
    assert!(spans.is_empty());
}

#[test]
fn punctuation_inside_patterns_is_literal() {
    let spans = gazetteer().annotate("Confirmed COVID-19 case").unwrap();
    assert_eq!(spans[0].text, "COVID-19");
    assert!(gazetteer().annotate("covidx19").unwrap().is_empty());
}

#[test]
fn repeated_mentions_are_all_reported() {
    let spans = gazetteer().annotate("fever, then fever again").unwrap();
    assert_eq!(spans.len(), 2);
}

#[test]
fn duplicate_patterns_keep_first_label() {
    let ner = GazetteerNer::from_patterns(
        [Pattern::new("SYMPTOM", "rash"), Pattern::new("DISEASE", "Rash")],
        100,
    )
    .unwrap();
    assert_eq!(ner.pattern_count(), 1);
    assert_eq!(ner.annotate("a rash").unwrap()[0].label, "SYMPTOM");
}

#[test]
fn overlong_text_is_a_model_fault() {
    let ner = GazetteerNer::from_patterns([Pattern::new("SYMPTOM", "fever")], 5).unwrap();
    let err = ner.annotate("fever!").unwrap_err();
    assert!(matches!(err, ModelError::TextTooLong { len: 6, max: 5 }));
}

#[test]
fn empty_gazetteer_finds_nothing() {
    let ner = GazetteerNer::from_patterns(Vec::new(), 100).unwrap();
    assert!(ner.annotate("fever").unwrap().is_empty());
}

#[test]
fn loads_pattern_files_from_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("a.jsonl"),
        "{\"label\": \"DISEASE\", \"pattern\": \"asthma\"}\n\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("b.jsonl"),
        "{\"label\": \"TREATMENT\", \"pattern\": \"inhaler\"}\n",
    )
    .unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let ner = GazetteerNer::from_dir(dir.path(), 1_000).unwrap();
    assert_eq!(ner.pattern_count(), 2);
    let spans = ner.annotate("asthma managed with an inhaler").unwrap();
    assert_eq!(spans.len(), 2);
}

#[test]
fn empty_model_directory_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    assert!(GazetteerNer::from_dir(dir.path(), 1_000).is_err());
}

#[test]
fn malformed_pattern_line_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("bad.jsonl"), "{\"label\": \"DISEASE\"}\n").unwrap();
    assert!(GazetteerNer::from_dir(dir.path(), 1_000).is_err());
}

#[test]
fn seed_lexicon_covers_every_category() {
    let ner = GazetteerNer::seed(1_000).unwrap();
    let spans = ner
        .annotate("Pneumonia with fever was treated with antibiotics.")
        .unwrap();
    let categories: Vec<Category> = spans.iter().map(|s| Category::from_label(&s.label)).collect();
    assert_eq!(
        categories,
        [Category::Disease, Category::Symptom, Category::Treatment]
    );
}

#[test]
fn colors_follow_category() {
    assert_eq!(Category::from_label("DISEASE").color(), "red");
    assert_eq!(Category::from_label("symptom").color(), "orange");
    assert_eq!(Category::from_label("Treatment").color(), "green");
    assert_eq!(Category::from_label("GENE").color(), "grey");
}
