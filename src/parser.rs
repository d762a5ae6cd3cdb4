//! # Song Parser
//!
//! Parses song source text into a [`Song`].
//!
//! ## Source format
//!
//! An optional front-matter block delimited by `---` lines carries metadata
//! (`title`, `artist`, `timeSig`/`timesig`, `capo`, `bpm`). The body is a
//! sequence of sections, each a literal `[chords]` marker line followed by
//! one raw chord line, optionally followed by a literal `[lyrics]` marker
//! line and one raw lyric line:
//!
//! ```text
//! ---
//! title: Jimmy
//! timeSig: 4/4
//! bpm: 120
//! ---
//! [chords]
//! C:2 G:2
//! [lyrics]
//! heyo nuuhu
//! ```
//!
//! ## Degradation rules
//!
//! Parsing never fails:
//! - Front matter with no closing `---` (or a head that is not parseable
//!   YAML at all) yields empty metadata; the whole text is treated as body.
//! - A malformed field value inside otherwise valid front matter drops only
//!   that field; the remaining fields are kept.
//! - An unparseable time signature falls back to 4/4.
//! - A missing `[lyrics]` section yields an empty lyric line.
//! - Lines requested past end-of-input read as empty.
//!
//! ## Chord tokens
//!
//! Tokens are maximal non-whitespace runs. A `NAME:DURATION` suffix (the
//! duration a non-negative decimal) sets an explicit beat duration; a colon
//! whose suffix is not a valid decimal is part of the name. There is no
//! chord-name validation; any non-whitespace text is a legal name.

use crate::song::{Block, ChordToken, RawMetadata, Song};

/// Parse song source text. Infallible; see module docs for degradation.
pub fn parse(source: &str) -> Song {
    let (head, body) = split_front_matter(source);

    let metadata = head
        .map(parse_metadata_fields)
        .unwrap_or_default()
        .into_metadata();

    Song {
        metadata,
        blocks: parse_blocks(body),
    }
}

/// Collect metadata fields from the front-matter head one at a time, so a
/// single malformed value (say `bpm: fast`) drops only its own field. A head
/// that is not parseable YAML at all yields empty metadata.
fn parse_metadata_fields(head: &str) -> RawMetadata {
    let Ok(doc) = serde_yaml::from_str::<serde_yaml::Value>(head) else {
        return RawMetadata::default();
    };
    RawMetadata {
        title: string_field(&doc, "title"),
        artist: string_field(&doc, "artist"),
        time_sig: string_field(&doc, "timeSig").or_else(|| string_field(&doc, "timesig")),
        capo: doc.get("capo").cloned(),
        bpm: doc.get("bpm").and_then(serde_yaml::Value::as_i64),
    }
}

fn string_field(doc: &serde_yaml::Value, key: &str) -> Option<String> {
    doc.get(key).and_then(serde_yaml::Value::as_str).map(str::to_string)
}

/// Split off a `---`-delimited front-matter head. Returns `(head, body)`;
/// `head` is `None` when there is no complete front-matter block, in which
/// case the body is the entire input.
fn split_front_matter(source: &str) -> (Option<&str>, &str) {
    let trimmed = source.trim_start();
    if !trimmed.starts_with("---") {
        return (None, source);
    }
    // Closing fence must start a later line.
    let Some(end) = trimmed[3..].find("\n---") else {
        return (None, source);
    };
    let head = trimmed[3..3 + end].trim();
    let body = trimmed[3 + end + "\n---".len()..].trim_start_matches(['\r', '\n']);
    (Some(head), body)
}

/// Walk the body collecting `[chords]`/`[lyrics]` sections into blocks.
fn parse_blocks(body: &str) -> Vec<Block> {
    let lines: Vec<&str> = body.lines().collect();
    let mut blocks = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        if lines[i].trim() != "[chords]" {
            i += 1;
            continue;
        }
        let chords_raw = lines.get(i + 1).copied().unwrap_or("");
        i += 2;

        let mut lyrics_raw = "";
        if lines.get(i).map(|l| l.trim()) == Some("[lyrics]") {
            lyrics_raw = lines.get(i + 1).copied().unwrap_or("");
            i += 2;
        }

        blocks.push(Block::new(chords_raw.to_string(), lyrics_raw.to_string()));
    }

    blocks
}

/// Tokenize a chord line into named tokens with optional explicit durations.
pub fn tokenize_chords(chords_raw: &str) -> Vec<ChordToken> {
    chords_raw
        .split_whitespace()
        .map(|t| {
            let (name, duration) = split_duration_suffix(t);
            ChordToken {
                name: name.to_string(),
                duration,
            }
        })
        .collect()
}

/// Split `NAME:DURATION` on the last colon whose suffix is a valid
/// non-negative decimal. The colon may not be the first character (a token
/// needs at least one name character), and a non-numeric suffix leaves the
/// whole token as the name.
fn split_duration_suffix(token: &str) -> (&str, Option<f64>) {
    if let Some(pos) = token.rfind(':') {
        if pos > 0 {
            let suffix = &token[pos + 1..];
            if is_decimal(suffix) {
                if let Ok(value) = suffix.parse::<f64>() {
                    return (&token[..pos], Some(value));
                }
            }
        }
    }
    (token, None)
}

/// `\d+` optionally followed by `.\d+`. Rejects signs, exponents and a bare
/// trailing dot, matching the original token grammar.
fn is_decimal(s: &str) -> bool {
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s, None),
    };
    let all_digits = |p: &str| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit());
    all_digits(int_part) && frac_part.map_or(true, all_digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_bare_and_explicit_durations() {
        let tokens = tokenize_chords("C G:2 F#m:1.5 Am7");
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[0].name, "C");
        assert_eq!(tokens[0].duration, None);
        assert_eq!(tokens[1].name, "G");
        assert_eq!(tokens[1].duration, Some(2.0));
        assert_eq!(tokens[2].name, "F#m");
        assert_eq!(tokens[2].duration, Some(1.5));
        assert_eq!(tokens[3].name, "Am7");
        assert_eq!(tokens[3].duration, None);
    }

    #[test]
    fn test_tokenize_malformed_durations_are_part_of_the_name() {
        // Non-numeric suffix: no duration, colon stays in the name.
        assert_eq!(
            tokenize_chords("C:x")[0],
            ChordToken {
                name: "C:x".to_string(),
                duration: None
            }
        );
        // Trailing dot is not a valid decimal.
        assert_eq!(tokenize_chords("C:2.")[0].duration, None);
        assert_eq!(tokenize_chords("C:2.")[0].name, "C:2.");
        // Leading colon: the colon needs at least one name character before it.
        assert_eq!(tokenize_chords(":3")[0].name, ":3");
        assert_eq!(tokenize_chords(":3")[0].duration, None);
    }

    #[test]
    fn test_tokenize_splits_on_last_valid_colon() {
        // In "A:2:5" only the final ":5" has an all-decimal suffix.
        let tok = &tokenize_chords("A:2:5")[0];
        assert_eq!(tok.name, "A:2");
        assert_eq!(tok.duration, Some(5.0));
    }

    #[test]
    fn test_front_matter_basic() {
        let source = "---\ntitle: Jimmy\nartist: Someone\ntimeSig: 3/4\nbpm: 90\n---\n[chords]\nC\n";
        let song = parse(source);
        assert_eq!(song.metadata.title.as_deref(), Some("Jimmy"));
        assert_eq!(song.metadata.artist.as_deref(), Some("Someone"));
        assert_eq!(song.metadata.time_signature.beats_per_bar(), 3);
        assert_eq!(song.metadata.bpm, Some(90));
        assert_eq!(song.blocks.len(), 1);
    }

    #[test]
    fn test_front_matter_timesig_alias_and_capo_number() {
        let source = "---\ntimesig: 6/8\ncapo: 2\n---\n[chords]\nC\n";
        let song = parse(source);
        assert_eq!(song.metadata.time_signature.beats_per_bar(), 6);
        assert_eq!(song.metadata.capo.as_deref(), Some("2"));
    }

    #[test]
    fn test_front_matter_without_closing_fence_is_body() {
        let source = "---\ntitle: Lost\n[chords]\nC G\n";
        let song = parse(source);
        assert_eq!(song.metadata.title, None);
        // The [chords] section inside the unterminated head still parses as body.
        assert_eq!(song.blocks.len(), 1);
        assert_eq!(song.blocks[0].tokens.len(), 2);
    }

    #[test]
    fn test_malformed_field_drops_only_itself() {
        let source = "---\ntitle: Keep\nbpm: fast\ntimeSig: 3/4\n---\n[chords]\nC\n";
        let song = parse(source);
        assert_eq!(song.metadata.title.as_deref(), Some("Keep"));
        assert_eq!(song.metadata.bpm, None);
        assert_eq!(song.metadata.time_signature.beats_per_bar(), 3);
    }

    #[test]
    fn test_front_matter_bpm_clamped() {
        let song = parse("---\nbpm: 500\n---\n");
        assert_eq!(song.metadata.bpm, Some(260));
        let song = parse("---\nbpm: 10\n---\n");
        assert_eq!(song.metadata.bpm, Some(30));
    }

    #[test]
    fn test_bad_time_signature_falls_back_to_common_time() {
        let song = parse("---\ntimeSig: waltz\n---\n[chords]\nC\n");
        assert_eq!(song.metadata.time_signature.beats_per_bar(), 4);
    }

    #[test]
    fn test_missing_lyrics_section_yields_empty_lyric_line() {
        let song = parse("[chords]\nC G\n");
        assert_eq!(song.blocks.len(), 1);
        assert_eq!(song.blocks[0].lyrics_raw, "");
        // Prefix plus one segment per token, all blank.
        assert_eq!(song.blocks[0].aligned.lyric_segs.len(), 3);
    }

    #[test]
    fn test_chords_marker_at_end_of_input() {
        let song = parse("[chords]");
        assert_eq!(song.blocks.len(), 1);
        assert_eq!(song.blocks[0].chords_raw, "");
        assert!(song.blocks[0].tokens.is_empty());
    }

    #[test]
    fn test_interleaved_junk_lines_are_ignored() {
        let source = "intro text\n[chords]\nC\n[lyrics]\nla\nrandom\n[chords]\nG\n";
        let song = parse(source);
        assert_eq!(song.blocks.len(), 2);
        assert_eq!(song.blocks[1].tokens[0].name, "G");
    }
}
