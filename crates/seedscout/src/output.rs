//! Result rendering.

use std::fmt::Write as _;

use seedscout_catalog::Album;
use seedscout_select::Match;

/// Numbered table: `rank. artist - title (similarity, closest seed)`.
pub fn render_matches(matches: &[Match]) -> String {
    if matches.is_empty() {
        return "No matching tracks found.\n".to_string();
    }
    let mut out = String::new();
    for (i, m) in matches.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>2}. {} - {} ({:.3}, like {})",
            i + 1,
            m.artist,
            m.title,
            m.similarity,
            m.closest_seed
        );
    }
    out
}

/// One line per album: `date  artist - title`.
pub fn render_albums(albums: &[Album]) -> String {
    let mut out = String::new();
    for a in albums {
        let _ = writeln!(out, "{}  {} - {}", a.release_date, a.artist, a.title);
    }
    out
}

/// Pretty JSON array.
pub fn render_json<T: serde::Serialize>(items: &[T]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(items)
}
