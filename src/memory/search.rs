use rusqlite::{params, Connection};
use std::collections::HashSet;

use crate::db::ChunkIndex;
use crate::error::Result;
use crate::memory::paths::store_key;
use crate::memory::types::SearchResult;

/// Score assigned to every full-text hit.
pub const PRIMARY_SCORE: f64 = 0.9;
/// Score assigned to every substring fallback hit.
pub const FALLBACK_SCORE: f64 = 0.7;
/// The substring fallback runs when the full-text stage finds fewer hits.
pub const FALLBACK_THRESHOLD: usize = 5;
/// Widest snippet window, in characters, before ellipsis markers.
pub const SNIPPET_MAX_CHARS: usize = 200;

const SNIPPET_BEFORE: usize = 50;
const SNIPPET_AFTER: usize = 100;

// ── Internal row struct ───────────────────────────────────────────────────────

struct ChunkHit {
    id: String,
    path: String,
    text: String,
    start_line: i64,
    end_line: i64,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Two-stage search: FTS5 prefix match, then substring fallback.
///
/// Full-text hits come first, in rank order, scored [`PRIMARY_SCORE`]. When
/// fewer than [`FALLBACK_THRESHOLD`] are found, a case-insensitive substring
/// scan tops the list up to `limit` with [`FALLBACK_SCORE`] hits whose ids are
/// not already present. A stage whose query fails is logged and contributes
/// nothing. Only an unopenable store is an error.
pub fn search(index: &mut ChunkIndex, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
    let query = query.trim();
    if query.is_empty() || limit == 0 {
        return Ok(Vec::new());
    }

    let root_name = index.root_name().to_string();
    let conn = index.connection()?;

    let mut seen: HashSet<String> = HashSet::new();
    let mut results: Vec<SearchResult> = Vec::new();

    let fts_query = build_fts_query(query);
    match fts_search(conn, &fts_query, limit) {
        Ok(hits) => {
            for hit in hits {
                if seen.insert(hit.id.clone()) {
                    results.push(to_result(hit, query, PRIMARY_SCORE, &root_name));
                }
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, fts_query = %fts_query, "full-text search failed, using substring fallback");
        }
    }
    let primary_hits = results.len();

    if primary_hits < FALLBACK_THRESHOLD && primary_hits < limit {
        let remaining = limit - primary_hits;
        match substring_search(conn, query, &seen, remaining) {
            Ok(hits) => {
                for hit in hits {
                    seen.insert(hit.id.clone());
                    results.push(to_result(hit, query, FALLBACK_SCORE, &root_name));
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "substring search failed");
            }
        }
    }

    tracing::debug!(
        query = %query,
        primary = primary_hits,
        fallback = results.len() - primary_hits,
        "search complete"
    );
    Ok(results)
}

/// Build an FTS5 MATCH expression: each whitespace-delimited term becomes a
/// quoted prefix match, joined with `OR`. Embedded quotes are doubled.
pub fn build_fts_query(query: &str) -> String {
    let terms: Vec<String> = query
        .split_whitespace()
        .filter(|t| !t.is_empty())
        .map(quote_prefix)
        .collect();

    if terms.is_empty() {
        quote_prefix(query)
    } else {
        terms.join(" OR ")
    }
}

/// Excerpt of `text` around the first case-insensitive occurrence of `query`.
///
/// Takes up to 50 characters before and 100 after the match, never more than
/// `max_chars` in total. Without a match, the first `max_chars` characters.
/// `...` marks a window that is cut at either end.
pub fn make_snippet(text: &str, query: &str, max_chars: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    let needle: Vec<char> = query.chars().collect();

    let (start, end) = match find_ignore_case(&chars, &needle) {
        Some(pos) => {
            let start = pos.saturating_sub(SNIPPET_BEFORE);
            let end = (pos + needle.len() + SNIPPET_AFTER)
                .min(chars.len())
                .min(start + max_chars);
            (start, end)
        }
        None => (0, chars.len().min(max_chars)),
    };

    let mut snippet = String::with_capacity(end - start + 6);
    if start > 0 {
        snippet.push_str("...");
    }
    snippet.extend(&chars[start..end]);
    if end < chars.len() {
        snippet.push_str("...");
    }
    snippet
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn quote_prefix(term: &str) -> String {
    format!("\"{}\"*", term.replace('"', "\"\""))
}

/// FTS5 prefix search, best rank first.
fn fts_search(conn: &Connection, fts_query: &str, limit: usize) -> rusqlite::Result<Vec<ChunkHit>> {
    let mut stmt = conn.prepare(
        "SELECT id, path, text, start_line, end_line FROM chunks_fts \
         WHERE chunks_fts MATCH ?1 ORDER BY rank LIMIT ?2",
    )?;
    let hits = stmt
        .query_map(params![fts_query, limit as i64], read_hit)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(hits)
}

/// Case-insensitive substring scan over chunk text, in `(path, start_line)`
/// order, skipping ids in `skip`.
///
/// SQLite's `LIKE` folds ASCII only, so rows are matched here with the same
/// Unicode folding the snippet uses.
fn substring_search(
    conn: &Connection,
    query: &str,
    skip: &HashSet<String>,
    limit: usize,
) -> rusqlite::Result<Vec<ChunkHit>> {
    let needle: Vec<char> = query.chars().collect();
    let mut stmt = conn.prepare(
        "SELECT id, path, text, start_line, end_line FROM chunks ORDER BY path, start_line",
    )?;
    let rows = stmt.query_map([], read_hit)?;

    let mut hits = Vec::new();
    for row in rows {
        let hit = row?;
        if skip.contains(&hit.id) {
            continue;
        }
        let text: Vec<char> = hit.text.chars().collect();
        if find_ignore_case(&text, &needle).is_some() {
            hits.push(hit);
            if hits.len() >= limit {
                break;
            }
        }
    }
    Ok(hits)
}

fn read_hit(row: &rusqlite::Row<'_>) -> rusqlite::Result<ChunkHit> {
    Ok(ChunkHit {
        id: row.get(0)?,
        path: row.get(1)?,
        text: row.get(2)?,
        start_line: row.get(3)?,
        end_line: row.get(4)?,
    })
}

fn to_result(hit: ChunkHit, query: &str, score: f64, root_name: &str) -> SearchResult {
    SearchResult {
        snippet: make_snippet(&hit.text, query, SNIPPET_MAX_CHARS),
        id: hit.id,
        path: store_key(&hit.path, root_name),
        score,
        start_line: hit.start_line,
        end_line: hit.end_line,
    }
}

fn find_ignore_case(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|window| {
        window
            .iter()
            .zip(needle)
            .all(|(a, b)| a == b || a.to_lowercase().eq(b.to_lowercase()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn test_store(chunks: &[(&str, &str, &str)]) -> (TempDir, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let db_path = tmp.path().join("main.sqlite");
        let conn = Connection::open(&db_path).unwrap();
        schema::init_schema(&conn).unwrap();
        for (i, (id, path, text)) in chunks.iter().enumerate() {
            let line = i as i64 * 10 + 1;
            schema::insert_chunk(&conn, id, path, text, (line, line + 9), "[0.0]").unwrap();
        }
        (tmp, db_path)
    }

    #[test]
    fn test_build_fts_query() {
        assert_eq!(build_fts_query("gateway"), "\"gateway\"*");
        assert_eq!(build_fts_query("deploy  gateway"), "\"deploy\"* OR \"gateway\"*");
        assert_eq!(build_fts_query("say \"hi\""), "\"say\"* OR \"\"\"hi\"\"\"*");
        assert_eq!(build_fts_query("   "), "\"   \"*");
    }

    #[test]
    fn test_snippet_centers_on_match() {
        let text = format!("{}NEEDLE{}", "a".repeat(120), "b".repeat(300));
        let snippet = make_snippet(&text, "needle", SNIPPET_MAX_CHARS);
        assert!(snippet.starts_with("..."));
        assert!(snippet.ends_with("..."));
        assert!(snippet.contains("NEEDLE"));
        // 50 before + 6 match + 100 after
        assert_eq!(snippet.chars().count(), 156 + 6);
    }

    #[test]
    fn test_snippet_without_match_takes_prefix() {
        let text = "x".repeat(500);
        let snippet = make_snippet(&text, "absent", SNIPPET_MAX_CHARS);
        assert_eq!(snippet, format!("{}...", "x".repeat(200)));
    }

    #[test]
    fn test_snippet_short_text_is_untouched() {
        assert_eq!(make_snippet("Deployed the gateway", "gateway", 200), "Deployed the gateway");
    }

    #[test]
    fn test_snippet_is_bounded_for_long_queries() {
        let query = "q".repeat(150);
        let text = format!("{}{}{}", "a".repeat(300), query, "b".repeat(300));
        let snippet = make_snippet(&text, &query, SNIPPET_MAX_CHARS);
        assert!(snippet.chars().count() <= SNIPPET_MAX_CHARS + 6);
    }

    #[test]
    fn test_snippet_handles_multibyte_text() {
        let text = format!("{}café crème{}", "é".repeat(80), "ü".repeat(200));
        let snippet = make_snippet(&text, "CAFÉ", SNIPPET_MAX_CHARS);
        assert!(snippet.contains("café"));
        assert!(snippet.chars().count() <= SNIPPET_MAX_CHARS + 6);
    }

    #[test]
    fn test_empty_query_returns_nothing() {
        let (_tmp, db_path) = test_store(&[("a", "a.md", "anything at all")]);
        let mut index = ChunkIndex::new(&db_path);
        assert!(search(&mut index, "", 10).unwrap().is_empty());
        assert!(search(&mut index, "   ", 10).unwrap().is_empty());
        assert!(search(&mut index, "anything", 0).unwrap().is_empty());
    }

    #[test]
    fn test_primary_hits_score_higher() {
        let (_tmp, db_path) = test_store(&[
            ("a", "memory/a.md", "Deployed the gateway on Friday"),
            ("b", "memory/b.md", "The megagateway cluster was resized"),
        ]);
        let mut index = ChunkIndex::new(&db_path);
        let results = search(&mut index, "gateway", 10).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "a");
        assert_eq!(results[0].score, PRIMARY_SCORE);
        assert_eq!(results[0].path, "a.md");
        // "megagateway" is not a token prefix match, only a substring match
        assert_eq!(results[1].id, "b");
        assert_eq!(results[1].score, FALLBACK_SCORE);
    }

    #[test]
    fn test_results_are_unique_by_id() {
        let (_tmp, db_path) = test_store(&[
            ("a", "a.md", "gateway one"),
            ("b", "b.md", "gateway two"),
            ("c", "c.md", "gateway three"),
        ]);
        let mut index = ChunkIndex::new(&db_path);
        let results = search(&mut index, "gateway", 10).unwrap();
        let ids: HashSet<&str> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), results.len());
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.score == PRIMARY_SCORE));
    }

    #[test]
    fn test_fallback_is_case_insensitive() {
        let (_tmp, db_path) = test_store(&[("a", "a.md", "SuperGATEWAYish notes")]);
        let mut index = ChunkIndex::new(&db_path);
        let results = search(&mut index, "gateway", 10).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].score, FALLBACK_SCORE);
    }

    #[test]
    fn test_limit_caps_combined_results() {
        let (_tmp, db_path) = test_store(&[
            ("a", "a.md", "gateway"),
            ("b", "b.md", "xgateway"),
            ("c", "c.md", "ygateway"),
            ("d", "d.md", "zgateway"),
        ]);
        let mut index = ChunkIndex::new(&db_path);
        let results = search(&mut index, "gateway", 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "a");
    }

    #[test]
    fn test_query_with_fts_operators() {
        let (_tmp, db_path) = test_store(&[("a", "a.md", "a (paren) in text")]);
        let mut index = ChunkIndex::new(&db_path);
        // Quoting keeps FTS5 operators in the query from being parsed.
        let results = search(&mut index, "(paren)", 10).unwrap();
        assert_eq!(results.len(), 1);
    }
}
