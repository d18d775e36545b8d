//! Property-based тесты для записей паролей, шаблонов и сопоставления
//! топиков.

use authplug::{hash_password, matches_filter, verify, HashParams, TopicTemplate};
use proptest::prelude::*;

const PROPTEST_CASES: u32 = 64;

fn fast_params() -> HashParams {
    HashParams {
        iterations: 2,
        ..HashParams::default()
    }
}

/// Уровень топика без wildcard-символов и `/`.
fn level() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_-]{0,8}"
}

fn topic() -> impl Strategy<Value = String> {
    prop::collection::vec(level(), 1..6)
        .prop_map(|levels| levels.join("/"))
        .prop_filter("non-empty topic", |t| !t.is_empty())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(PROPTEST_CASES))]

    #[test]
    fn prop_hash_then_verify(password in ".{1,32}", other in ".{1,32}") {
        let stored = hash_password(&password, &fast_params()).unwrap();
        prop_assert!(verify(&password, &stored));
        if other != password {
            prop_assert!(!verify(&other, &stored));
        }
    }

    #[test]
    fn prop_verify_never_panics(stored in ".*", password in ".*") {
        let _ = verify(&password, &stored);
        let _ = verify(&password, &format!("PBKDF2${stored}"));
    }

    #[test]
    fn prop_expand_length(template in "[a-z/%#+]{0,24}", username in "[a-z0-9]{0,12}") {
        let t = TopicTemplate::new(template.clone());
        let expanded = t.expand(&username);
        let n = template.matches('%').count();
        prop_assert_eq!(expanded.len(), template.len() + n * username.len() - n);
        prop_assert!(!expanded.contains('%') || username.contains('%'));
    }

    #[test]
    fn prop_topic_matches_itself(t in topic()) {
        prop_assert!(matches_filter(&t, &t));
    }

    #[test]
    fn prop_hash_matches_everything(t in topic()) {
        prop_assert!(matches_filter("#", &t));
    }

    #[test]
    fn prop_plus_replaces_any_level(levels in prop::collection::vec(level(), 1..6), idx in 0usize..6) {
        let idx = idx % levels.len();
        let topic = levels.join("/");
        let mut filter_levels: Vec<&str> = levels.iter().map(String::as_str).collect();
        filter_levels[idx] = "+";
        prop_assume!(!topic.is_empty());
        prop_assert!(matches_filter(&filter_levels.join("/"), &topic));
    }

    #[test]
    fn prop_dollar_topics_hidden_from_root_wildcards(rest in topic()) {
        let t = format!("$SYS/{rest}");
        prop_assert!(!matches_filter("#", &t));
        prop_assert!(matches_filter("$SYS/#", &t));
    }

    #[test]
    fn prop_matcher_never_panics(filter in ".{0,24}", topic in ".{0,24}") {
        let _ = matches_filter(&filter, &topic);
    }
}
