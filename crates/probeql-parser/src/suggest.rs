//! "Did you mean" suggestions for misspelled function names

/// Candidates further than this edit distance are never suggested
const MAX_DISTANCE: usize = 2;

/// Levenshtein edit distance between two strings, case-sensitive.
///
/// Single-row dynamic programming, O(|a| * |b|) time and O(|b|) space.
pub fn levenshtein(a: &str, b: &str) -> usize {
    if a.is_empty() {
        return b.chars().count();
    }
    if b.is_empty() {
        return a.chars().count();
    }

    let b_chars: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b_chars.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut prev = row[0];
        row[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = if ca == *cb { 0 } else { 1 };
            let next = (prev + cost).min(row[j] + 1).min(row[j + 1] + 1);
            prev = row[j + 1];
            row[j + 1] = next;
        }
    }
    row[b_chars.len()]
}

/// Rank candidate names by edit distance to a misspelled query.
///
/// Matching is case-insensitive. Only candidates within the distance
/// threshold are returned, closest first, ties broken alphabetically.
pub fn suggestions<'a, I>(query: &str, candidates: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let query = query.to_ascii_uppercase();
    let mut ranked: Vec<(usize, &str)> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let distance = levenshtein(&query, &candidate.to_ascii_uppercase());
            (distance <= MAX_DISTANCE).then_some((distance, candidate))
        })
        .collect();
    ranked.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));
    ranked.into_iter().map(|(_, name)| name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("", "", 0)]
    #[case("abc", "", 3)]
    #[case("", "abc", 3)]
    #[case("kitten", "sitting", 3)]
    #[case("MD5", "MD5", 0)]
    #[case("md", "MD5", 1)]
    fn test_levenshtein(#[case] a: &str, #[case] b: &str, #[case] expected: usize) {
        assert_eq!(levenshtein(a, b), expected);
    }

    #[test]
    fn test_suggestions_are_ranked_and_bounded() {
        let catalog = ["MD5", "SHA1", "SHA256", "CIDR_CONTAINS"];
        assert_eq!(suggestions("md", catalog), vec!["MD5"]);
        assert_eq!(suggestions("sha", catalog), vec!["SHA1"]);
        assert_eq!(suggestions("zzzzzz", catalog), Vec::<&str>::new());
    }

    #[test]
    fn test_suggestions_match_case_insensitively() {
        let catalog = ["LOWER", "UPPER"];
        assert_eq!(suggestions("lowes", catalog), vec!["LOWER"]);
    }

    #[test]
    fn test_ties_break_alphabetically() {
        let catalog = ["RTRIM", "LTRIM"];
        assert_eq!(suggestions("TRIM", catalog), vec!["LTRIM", "RTRIM"]);
    }
}
