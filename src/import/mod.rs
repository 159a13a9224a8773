use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::services::words::{NewWord, WordRepository};

// fiwn-synsets-extra.tsv columns.
const COL_SYNSET_ID: usize = 0;
const COL_POS: usize = 1;
const COL_SYNONYMS: usize = 2;
const COL_DEFINITION: usize = 3;
const COL_ENGLISH: usize = 4;
const COL_LEXFILE: usize = 6;

// fiwn-semrels-extra.tsv columns.
const COL_REL_NAME: usize = 2;

#[derive(Debug, Default)]
pub struct ImportReport {
    pub imported: u64,
    pub skipped: u64,
    pub relations: BTreeMap<String, u64>,
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Store(#[from] sqlx::Error),
}

/// One-shot batch import: per-record failures are logged and counted,
/// never fatal, so a partial run leaves committed rows intact.
pub async fn import_wordnet(
    repo: &WordRepository,
    synsets_path: &Path,
    semrels_path: Option<&Path>,
    truncate: bool,
) -> Result<ImportReport, ImportError> {
    let synsets = read_tsv(synsets_path)?;
    tracing::info!(count = synsets.len(), "loaded synset records");

    let mut report = ImportReport::default();

    if let Some(path) = semrels_path {
        let semrels = read_tsv(path)?;
        report.relations = tally_relations(&semrels);
        tracing::info!(count = semrels.len(), "loaded semantic relation records");
    }

    if truncate {
        let removed = repo.delete_all().await?;
        tracing::info!(removed, "cleared existing words");
    }

    for fields in &synsets {
        let Some(data) = entry_from_synset(fields) else {
            report.skipped += 1;
            continue;
        };

        match repo.create(data).await {
            Ok(_) => {
                report.imported += 1;
                if report.imported % 1000 == 0 {
                    tracing::info!(imported = report.imported, "import progress");
                }
            }
            Err(err) => {
                let synset_id = fields.first().map(String::as_str).unwrap_or("?");
                tracing::warn!(synset = synset_id, error = %err, "failed to import synset");
                report.skipped += 1;
            }
        }
    }

    Ok(report)
}

pub fn read_tsv(path: &Path) -> Result<Vec<Vec<String>>, ImportError> {
    let content = std::fs::read_to_string(path).map_err(|source| ImportError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split('\t').map(str::to_string).collect())
        .collect())
}

/// Maps a synset row onto the create contract; returns None for rows
/// missing their id, POS tag or a usable lemma.
pub fn entry_from_synset(fields: &[String]) -> Option<NewWord> {
    let synset_id = fields.get(COL_SYNSET_ID).map(String::as_str).unwrap_or("");
    let pos_tag = fields.get(COL_POS).map(String::as_str).unwrap_or("");
    let synonyms_raw = fields.get(COL_SYNONYMS).map(String::as_str).unwrap_or("");

    if synset_id.is_empty() || pos_tag.is_empty() || synonyms_raw.is_empty() {
        return None;
    }

    let synonyms = parse_synonyms(synonyms_raw);
    let lemma = synonyms.first()?.clone();

    let translation = fields
        .get(COL_ENGLISH)
        .map(|raw| parse_synonyms(raw).join(", "))
        .filter(|t| !t.is_empty());

    let definition = fields
        .get(COL_DEFINITION)
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());

    let lexical_category = fields
        .get(COL_LEXFILE)
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty());

    Some(NewWord {
        inflections: inflections_from_synonyms(&synonyms),
        lemma,
        pos: map_pos_tag(pos_tag),
        translation,
        definition,
        synonyms,
        lexical_category,
        example_sentences: Vec::new(),
    })
}

/// Splits a `|`-separated synonym list, dropping angle-bracket markup and
/// blank entries.
pub fn parse_synonyms(raw: &str) -> Vec<String> {
    raw.split('|')
        .map(|part| strip_tags(part).trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

pub fn map_pos_tag(tag: &str) -> String {
    match tag {
        "N" => "noun".to_string(),
        "V" => "verb".to_string(),
        "A" => "adjective".to_string(),
        "Adv" => "adverb".to_string(),
        other => other.to_lowercase(),
    }
}

/// Denormalized inflection map: every synonym after the lemma becomes a
/// numbered form slot.
pub fn inflections_from_synonyms(synonyms: &[String]) -> BTreeMap<String, String> {
    synonyms
        .iter()
        .skip(1)
        .enumerate()
        .map(|(index, form)| (format!("form_{}", index + 1), form.clone()))
        .collect()
}

/// The relation records carry no persisted counterpart; they are tallied
/// per relation name for the import report.
pub fn tally_relations(rows: &[Vec<String>]) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for row in rows {
        let Some(name) = row.get(COL_REL_NAME).map(|n| n.trim()) else {
            continue;
        };
        if name.is_empty() {
            continue;
        }
        *counts.entry(name.to_string()).or_insert(0) += 1;
    }
    counts
}

fn strip_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_tag = false;
    for ch in input.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            ch if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Write;

    fn row(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|f| f.to_string()).collect()
    }

    #[test]
    fn parse_synonyms_strips_markup_and_blanks() {
        assert_eq!(
            parse_synonyms("kala|<i>ahven</i>| |hauki "),
            vec!["kala", "ahven", "hauki"]
        );
        assert!(parse_synonyms("").is_empty());
        assert!(parse_synonyms(" | |").is_empty());
    }

    #[test]
    fn pos_tags_map_to_word_classes() {
        assert_eq!(map_pos_tag("N"), "noun");
        assert_eq!(map_pos_tag("V"), "verb");
        assert_eq!(map_pos_tag("A"), "adjective");
        assert_eq!(map_pos_tag("Adv"), "adverb");
        assert_eq!(map_pos_tag("Pron"), "pron");
    }

    #[test]
    fn inflections_skip_the_lemma() {
        let synonyms = vec![
            "kala".to_string(),
            "kalat".to_string(),
            "kalan".to_string(),
        ];
        let inflections = inflections_from_synonyms(&synonyms);
        assert_eq!(inflections.len(), 2);
        assert_eq!(inflections.get("form_1").map(String::as_str), Some("kalat"));
        assert_eq!(inflections.get("form_2").map(String::as_str), Some("kalan"));

        assert!(inflections_from_synonyms(&synonyms[..1]).is_empty());
    }

    #[test]
    fn synset_rows_become_create_payloads() {
        let fields = row(&[
            "fi-123-n",
            "N",
            "kala|kalat",
            "vedessä elävä selkärankainen",
            "fish|<i>food fish</i>",
            "",
            "noun.animal",
        ]);

        let word = entry_from_synset(&fields).unwrap();
        assert_eq!(word.lemma, "kala");
        assert_eq!(word.pos, "noun");
        assert_eq!(word.translation.as_deref(), Some("fish, food fish"));
        assert_eq!(
            word.definition.as_deref(),
            Some("vedessä elävä selkärankainen")
        );
        assert_eq!(word.synonyms, vec!["kala", "kalat"]);
        assert_eq!(word.lexical_category.as_deref(), Some("noun.animal"));
        assert!(word.example_sentences.is_empty());
    }

    #[test]
    fn incomplete_synset_rows_are_skipped() {
        assert!(entry_from_synset(&row(&["", "N", "kala"])).is_none());
        assert!(entry_from_synset(&row(&["fi-1-n", "", "kala"])).is_none());
        assert!(entry_from_synset(&row(&["fi-1-n", "N", ""])).is_none());
        // Markup-only synonym list leaves no lemma.
        assert!(entry_from_synset(&row(&["fi-1-n", "N", "<i></i>"])).is_none());
    }

    #[test]
    fn relation_names_are_tallied() {
        let rows = vec![
            row(&["fi-1-n", "x", "hypernym", "x", "fi-2-n", "a|b"]),
            row(&["fi-1-n", "x", "hypernym", "x", "fi-3-n", "c"]),
            row(&["fi-2-n", "x", "similar to", "x", "fi-4-n", "d"]),
            row(&["fi-2-n", "x"]),
        ];

        let counts = tally_relations(&rows);
        assert_eq!(counts.get("hypernym"), Some(&2));
        assert_eq!(counts.get("similar to"), Some(&1));
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn tsv_reader_skips_blank_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "fi-1-n\tN\tkala").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "fi-2-n\tV\tuida|uiskennella").unwrap();

        let rows = read_tsv(file.path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["fi-1-n", "N", "kala"]);
        assert_eq!(rows[1][2], "uida|uiskennella");
    }

    proptest! {
        #[test]
        fn parsed_synonyms_are_trimmed_and_markup_free(raw in ".*") {
            for synonym in parse_synonyms(&raw) {
                prop_assert!(!synonym.is_empty());
                prop_assert!(!synonym.contains('<'));
                prop_assert_eq!(synonym.trim(), synonym.as_str());
            }
        }
    }
}
