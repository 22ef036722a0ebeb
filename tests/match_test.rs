use std::collections::HashMap;

use varex::filter::{comparison_text, Filter};
use varex::{
    normalize, ExactMatcher, FilterSettings, FuzzyMatcher, ImageRecord, Matcher, SearchCategory,
};

fn paths(hits: &[varex::MatchResult]) -> Vec<&str> {
    hits.iter().map(|h| h.record.path.as_str()).collect()
}

// ---------------------------------------------------------------------------
// Exact
// ---------------------------------------------------------------------------

#[test]
fn exact_ignores_case_spaces_and_punctuation() {
    let candidates = vec![
        ImageRecord::from_path("tokens/Red_Dragon_01.webp"),
        ImageRecord::from_path("tokens/Blue_Dragon.webp"),
    ];
    let matcher = ExactMatcher { run_search_on_path: false };

    let hits = matcher.find("RED dragon", &candidates);
    assert_eq!(paths(&hits), vec!["tokens/Red_Dragon_01.webp"]);
    assert_eq!(hits[0].score, None);
    assert!(hits[0].indices.is_empty());
}

#[test]
fn exact_matches_chosen_names_not_file_names() {
    let candidates = vec![
        ImageRecord::named("art/0001.png", "Ancient Red Dragon"),
        ImageRecord::from_path("art/red%20dragon%20wyrmling.png"),
    ];
    let matcher = ExactMatcher { run_search_on_path: false };

    let hits = matcher.find("red dragon", &candidates);
    assert_eq!(hits.len(), 2);
    assert!(matcher.find("0001", &candidates).is_empty());
}

#[test]
fn exact_on_path_sees_directories() {
    let candidates = vec![
        ImageRecord::from_path("tokens/dragons/Smaug.webp"),
        ImageRecord::from_path("tokens/goblins/Grik.webp"),
    ];
    let on_path = ExactMatcher { run_search_on_path: true };
    let on_name = ExactMatcher { run_search_on_path: false };

    assert_eq!(paths(&on_path.find("dragons/", &candidates)), vec!["tokens/dragons/Smaug.webp"]);
    assert!(on_name.find("dragons", &candidates).is_empty());
}

#[test]
fn normalize_keeps_slashes() {
    assert_eq!(normalize("Red Dragon_01 (v2)"), "reddragon01v2");
    assert_eq!(normalize(r"a/B\c"), r"a/b\c");
}

// ---------------------------------------------------------------------------
// Fuzzy
// ---------------------------------------------------------------------------

fn fuzzy(threshold: f64) -> FuzzyMatcher {
    FuzzyMatcher {
        run_search_on_path: false,
        threshold,
        limit: 100,
    }
}

#[test]
fn fuzzy_ranks_closest_first_and_drops_distant_names() {
    let candidates = vec![
        ImageRecord::named("c.webp", "Blue Dragon"),
        ImageRecord::named("b.webp", "Redd Dragon"),
        ImageRecord::named("a.webp", "Red Dragon"),
    ];

    let hits = fuzzy(0.4).find("Red Dragon", &candidates);
    assert_eq!(paths(&hits), vec!["a.webp", "b.webp"]);
    assert_eq!(hits[0].score, Some(0.0));
    assert!(hits[1].score.unwrap() > 0.0 && hits[1].score.unwrap() <= 0.4);
}

#[test]
fn fuzzy_reports_match_ranges() {
    let candidates = vec![ImageRecord::named("a.webp", "Ancient Red Dragon")];
    let hits = fuzzy(0.3).find("dragon", &candidates);
    assert_eq!(hits[0].indices, vec![(12, 17)]);
}

#[test]
fn fuzzy_respects_the_limit() {
    let candidates: Vec<ImageRecord> = (0..10)
        .map(|i| ImageRecord::named(format!("{i}.webp"), format!("Goblin {i}")))
        .collect();
    let matcher = FuzzyMatcher { limit: 3, ..fuzzy(0.3) };
    assert_eq!(matcher.find("goblin", &candidates).len(), 3);
}

#[test]
fn empty_fuzzy_query_browses_in_order() {
    let candidates = vec![
        ImageRecord::named("z.webp", "Zombie"),
        ImageRecord::named("a.webp", "Archer"),
    ];
    let hits = fuzzy(0.3).find("", &candidates);
    assert_eq!(paths(&hits), vec!["z.webp", "a.webp"]);
}

#[test]
fn tags_make_unrelated_names_findable() {
    let candidates = vec![
        ImageRecord::named("x.webp", "Bob").with_tags(vec!["necromancer".into()]),
        ImageRecord::named("y.webp", "Alice"),
    ];
    let hits = fuzzy(0.3).find("necromancer", &candidates);
    assert_eq!(paths(&hits), vec!["x.webp"]);
}

#[test]
fn aliases_are_separate_hits() {
    let candidates = vec![
        ImageRecord::named("art/wolf.webp", "Dire Wolf"),
        ImageRecord::named("art/wolf.webp", "Winter Wolf"),
    ];
    let hits = fuzzy(0.3).find("wolf", &candidates);
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].record.name, "Dire Wolf");
    assert_eq!(hits[1].record.name, "Winter Wolf");
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

fn settings(include: &str, exclude: &str, regex: &str) -> FilterSettings {
    FilterSettings {
        include: include.into(),
        exclude: exclude.into(),
        regex:   regex.into(),
    }
}

#[test]
fn include_and_exclude_are_case_sensitive_substrings() {
    let filter = Filter::try_from_settings(&settings("Dragon", "Baby", "")).unwrap();

    assert!(filter.passes(&ImageRecord::from_path("t/Red_Dragon.webp"), false));
    assert!(!filter.passes(&ImageRecord::from_path("t/red_dragon.webp"), false));
    assert!(!filter.passes(&ImageRecord::from_path("t/Baby_Dragon.webp"), false));
}

#[test]
fn regex_takes_precedence_over_include() {
    let filter = Filter::try_from_settings(&settings("Goblin", "", r"^Orc")).unwrap();

    assert!(filter.passes(&ImageRecord::from_path("t/Orc_Chief.png"), false));
    assert!(!filter.passes(&ImageRecord::from_path("t/Goblin.png"), false));
}

#[test]
fn bad_regex_is_rejected_or_dropped() {
    let bad = settings("Orc", "", "([unclosed");
    assert!(Filter::try_from_settings(&bad).is_err());

    let mut filters = HashMap::new();
    filters.insert(SearchCategory::Token, bad);
    let filter = Filter::compose(SearchCategory::Token, &filters);
    assert!(filter.regex.is_none());
    assert!(filter.passes(&ImageRecord::from_path("t/Orc.png"), false));
    assert!(!filter.passes(&ImageRecord::from_path("t/Elf.png"), false));

    // Categories without a filter pass everything.
    assert!(Filter::compose(SearchCategory::Tile, &filters).is_empty());
}

#[test]
fn comparison_text_depends_on_the_name_source() {
    let default = ImageRecord::from_path("maps/Old%20Keep.jpg");
    let titled = ImageRecord::named("maps/0001.jpg", "Old Keep");

    assert_eq!(comparison_text(&default, false), "Old Keep.jpg");
    assert_eq!(comparison_text(&titled, false), "Old Keep");
    assert_eq!(comparison_text(&default, true), "maps/Old Keep.jpg");
}
