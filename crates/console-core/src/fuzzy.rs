//! # Fuzzy Matcher
//!
//! Scores how well a query matches a candidate string. The score favours
//! prefixes, contiguous runs and word-boundary hits while never dropping
//! below zero, so one acceptance threshold works for every candidate.
//!
//! Subsequence containment is a hard gate: a query whose characters do not
//! all appear in order in the candidate (ignoring case) scores zero.
//!
//! The weights are tuned together with the session's acceptance threshold
//! and must stay in step with it.

/// Score for a case-insensitive exact match
pub const EXACT_MATCH_SCORE: f32 = 1000.0;
/// Extra score when the exact match also agrees on case
pub const EXACT_CASE_BONUS: f32 = 100.0;
/// Base score for a subsequence match
pub const SUBSEQUENCE_BASE: f32 = 100.0;
/// Candidate starts with the query, ignoring case
pub const PREFIX_BONUS: f32 = 200.0;
/// Candidate starts with the query, case included
pub const PREFIX_CASE_BONUS: f32 = 50.0;
/// Per character of the longest consecutive run
pub const CONSECUTIVE_BONUS: f32 = 100.0;
/// Per matched character on a word boundary
pub const WORD_BOUNDARY_BONUS: f32 = 15.0;
/// Per matched character that agrees on case
pub const CASE_MATCH_BONUS: f32 = 5.0;
/// Scale of the average-position penalty
pub const POSITION_PENALTY: f32 = 50.0;
/// Scale of the query/candidate length ratio bonus
pub const COVERAGE_BONUS: f32 = 100.0;
/// Penalty per unmatched candidate character
pub const LENGTH_PENALTY: f32 = 0.5;

/// Score `query` against `candidate`.
///
/// Returns 0 when either input is empty or the query is not a subsequence of
/// the candidate.
pub fn score(candidate: &str, query: &str) -> f32 {
    if candidate.is_empty() || query.is_empty() {
        return 0.0;
    }

    let cand: Vec<char> = candidate.chars().collect();
    let query: Vec<char> = query.chars().collect();

    if eq_ignore_case(&cand, &query) {
        let case_bonus = if cand == query { EXACT_CASE_BONUS } else { 0.0 };
        return EXACT_MATCH_SCORE + case_bonus;
    }

    let Some(matched) = subsequence(&cand, &query) else {
        return 0.0;
    };

    let cand_len = cand.len() as f32;
    let query_len = query.len() as f32;
    let mut total = SUBSEQUENCE_BASE;

    if cand.len() >= query.len() && eq_ignore_case(&cand[..query.len()], &query) {
        total += PREFIX_BONUS;
        if cand[..query.len()] == query[..] {
            total += PREFIX_CASE_BONUS;
        }
    }

    total += longest_run(&matched) as f32 * CONSECUTIVE_BONUS;

    let boundaries = matched
        .iter()
        .filter(|&&idx| is_word_boundary(&cand, idx))
        .count();
    total += boundaries as f32 * WORD_BOUNDARY_BONUS;

    let case_hits = matched
        .iter()
        .zip(&query)
        .filter(|&(&idx, &q)| cand[idx] == q)
        .count();
    total += case_hits as f32 * CASE_MATCH_BONUS;

    let average = matched.iter().sum::<usize>() as f32 / matched.len() as f32;
    total -= average / cand_len * POSITION_PENALTY;

    total += query_len / cand_len * COVERAGE_BONUS;
    total -= (cand_len - query_len) * LENGTH_PENALTY;

    total.max(0.0)
}

/// Candidate positions matched by `query`, in order.
///
/// Every position for an exact (case-insensitive) match, the greedy
/// subsequence positions otherwise, or `None` when the query does not match.
pub fn match_indices(candidate: &str, query: &str) -> Option<Vec<usize>> {
    if candidate.is_empty() || query.is_empty() {
        return None;
    }
    let cand: Vec<char> = candidate.chars().collect();
    let query: Vec<char> = query.chars().collect();
    if eq_ignore_case(&cand, &query) {
        return Some((0..cand.len()).collect());
    }
    subsequence(&cand, &query)
}

/// Whether two names are equal ignoring case, by Unicode simple case folding
pub fn eq_fold(a: &str, b: &str) -> bool {
    a.chars().map(fold).eq(b.chars().map(fold))
}

/// `text` with every character case-folded
pub fn fold_str(text: &str) -> String {
    text.chars().map(fold).collect()
}

/// Whether `query` is a case-insensitive subsequence of `candidate`
pub fn is_subsequence(candidate: &str, query: &str) -> bool {
    let cand: Vec<char> = candidate.chars().collect();
    let query: Vec<char> = query.chars().collect();
    subsequence(&cand, &query).is_some()
}

fn subsequence(cand: &[char], query: &[char]) -> Option<Vec<usize>> {
    let mut matched = Vec::with_capacity(query.len());
    let mut remaining = query.iter().peekable();

    for (idx, &c) in cand.iter().enumerate() {
        let Some(&&q) = remaining.peek() else {
            break;
        };
        if fold(c) == fold(q) {
            matched.push(idx);
            remaining.next();
        }
    }

    remaining.peek().is_none().then_some(matched)
}

fn longest_run(matched: &[usize]) -> usize {
    let mut longest = 1;
    let mut current = 1;
    for pair in matched.windows(2) {
        if pair[1] == pair[0] + 1 {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 1;
        }
    }
    longest
}

fn is_word_boundary(text: &[char], idx: usize) -> bool {
    if idx == 0 {
        return true;
    }
    let current = text[idx];
    let previous = text[idx - 1];

    // camelCase / PascalCase
    if current.is_uppercase() && previous.is_lowercase() {
        return true;
    }
    // snake_case, kebab-case, dotted paths
    if current.is_alphabetic() && !previous.is_alphabetic() {
        return true;
    }
    current.is_numeric() && !previous.is_numeric()
}

fn eq_ignore_case(a: &[char], b: &[char]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(&x, &y)| fold(x) == fold(y))
}

fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}
