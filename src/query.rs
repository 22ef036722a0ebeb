use std::collections::HashSet;

/// Characters a query is split on for keyword search.
fn is_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, '_' | '-' | ':' | ',' | '|' | '(' | ')' | '[' | ']')
}

/// Parse the excluded-keywords setting: any run of non-word characters
/// separates entries. Entries are lower-cased.
pub fn parse_excluded(raw: &str) -> HashSet<String> {
    raw.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}

/// The passes one query runs as: the full text first, then (with keyword
/// search) every keyword longer than two characters that isn't excluded,
/// last keyword first.
pub fn sub_queries(text: &str, keyword_search: bool, excluded: &HashSet<String>) -> Vec<String> {
    let text = text.trim();
    let mut passes = vec![text.to_string()];
    if !keyword_search {
        return passes;
    }

    let keywords: Vec<&str> = text
        .split(is_separator)
        .filter(|w| w.chars().count() > 2 && !excluded.contains(&w.to_lowercase()))
        .collect();
    passes.extend(keywords.into_iter().rev().map(str::to_string));
    passes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_follow_the_full_query_in_reverse() {
        let passes = sub_queries("  Ancient Red Dragon ", true, &HashSet::new());
        assert_eq!(passes, vec!["Ancient Red Dragon", "Dragon", "Red", "Ancient"]);
    }

    #[test]
    fn short_and_excluded_words_are_dropped() {
        let excluded = parse_excluded("the, FOR");
        let passes = sub_queries("Knight_of-the (Round) Table for[Hire]", true, &excluded);
        assert_eq!(
            passes,
            vec!["Knight_of-the (Round) Table for[Hire]", "Hire", "Table", "Round", "Knight"]
        );
    }

    #[test]
    fn keyword_search_off_runs_one_pass() {
        assert_eq!(sub_queries("Red Dragon", false, &HashSet::new()), vec!["Red Dragon"]);
    }

    #[test]
    fn excluded_keywords_split_on_any_non_word() {
        let excluded = parse_excluded("and,for  the;of");
        assert_eq!(excluded.len(), 4);
        assert!(excluded.contains("the"));
    }
}
