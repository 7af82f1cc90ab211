//! FTS5 match expressions for link search.
//!
//! A search term is matched two ways at once: as a phrase restricted to the
//! `shortcut` column, and as a prefix phrase across every column. Ranking is
//! left to bm25 with the shortcut column weighted up.

use crate::constants::constants;

/// Quote a term as an FTS5 string so punctuation is never parsed as syntax
fn quote(term: &str) -> String {
    format!("\"{}\"", term.replace('"', "\"\""))
}

/// Build `shortcut : "<term>" OR "<term>" *`, or `None` when the term
/// contains nothing the index could match.
pub fn match_expression(term: &str) -> Option<String> {
    let term = term.trim();
    // The tokenizer drops everything but letters and digits; such a term has no tokens.
    if !term.chars().any(char::is_alphanumeric) {
        return None;
    }
    let quoted = quote(term);
    Some(format!("shortcut : {quoted} OR {quoted} *"))
}

/// Select statement for a ranked search. Bound parameters: `?1` match expression,
/// `?2` shortcut weight, `?3` row limit (negative means unlimited).
pub fn search_sql() -> String {
    format!(
        "SELECT rowid, text, link, title, shortcut FROM {table} \
         WHERE {table} MATCH ?1 \
         ORDER BY bm25({table}, 1.0, 1.0, 1.0, ?2), rowid \
         LIMIT ?3",
        table = constants::TABLE_NAME
    )
}
