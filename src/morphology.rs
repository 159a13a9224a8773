use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Capability interface for the external morphological generator, so the
/// offline tooling can be exercised with a stub.
#[async_trait::async_trait]
pub trait MorphologyGenerator: Send + Sync {
    /// One lookup query in, first usable surface form out; `None` when the
    /// generator produces no candidate for the paradigm slot.
    async fn generate(&self, lemma: &str, paradigm_tag: &str) -> io::Result<Option<String>>;
}

pub const NOUN_TARGETS: &[(&str, &str)] = &[
    ("Sg_Nom", "+N+Sg+Nom"),
    ("Sg_Gen", "+N+Sg+Gen"),
    ("Sg_Par", "+N+Sg+Par"),
    ("Pl_Nom", "+N+Pl+Nom"),
    ("Pl_Gen", "+N+Pl+Gen"),
    ("Pl_Par", "+N+Pl+Par"),
    ("Sg_Ine", "+N+Sg+Ine"),
    ("Sg_Ill", "+N+Sg+Ill"),
];

pub const VERB_TARGETS: &[(&str, &str)] = &[
    ("Inf1", "+V+Inf"),
    ("Pres_3Sg", "+V+Act+Ind+Prs+Sg3"),
    ("Past_3Sg", "+V+Act+Ind+Prt+Sg3"),
    ("Cond_3Sg", "+V+Act+Cond+Sg3"),
    ("Potn_3Sg", "+V+Act+Pot+Sg3"),
    ("Imp_2Sg", "+V+Act+Imprt+Sg2"),
    ("Prs_Part_Act", "+V+Act+PrsPrc"),
    ("Pst_Part_Act", "+V+Act+Prc"),
];

pub const ADJECTIVE_TARGETS: &[(&str, &str)] = &[
    ("Pos_Sg_Nom", "+A+Pos+Sg+Nom"),
    ("Comp_Sg_Nom", "+A+Cmp+Sg+Nom"),
    ("Sup_Sg_Nom", "+A+Sup+Sg+Nom"),
    ("Sg_Par", "+A+Sg+Par"),
];

pub const ADVERB_TARGETS: &[(&str, &str)] = &[("Base", "+Adv")];

/// Unknown word classes fall back to the noun paradigm.
pub fn targets_for_pos(pos: &str) -> &'static [(&'static str, &'static str)] {
    match pos.to_lowercase().as_str() {
        "verb" => VERB_TARGETS,
        "adjective" => ADJECTIVE_TARGETS,
        "adverb" => ADVERB_TARGETS,
        _ => NOUN_TARGETS,
    }
}

/// Runs every paradigm slot for the word class; slots the generator cannot
/// fill are skipped, never fatal.
pub async fn generate_paradigm<G: MorphologyGenerator>(
    generator: &G,
    lemma: &str,
    pos: &str,
) -> BTreeMap<String, String> {
    let mut forms = BTreeMap::new();

    for (label, tags) in targets_for_pos(pos) {
        match generator.generate(lemma, tags).await {
            Ok(Some(form)) => {
                forms.insert(label.to_string(), form);
            }
            Ok(None) => {}
            Err(err) => {
                tracing::debug!(lemma, slot = label, error = %err, "morphology lookup failed");
            }
        }
    }

    forms
}

#[derive(Debug, Error)]
pub enum MorphologyError {
    #[error("OMORFI_GENERATOR_PATH is not set; point it at an omorfi generator .hfstol file")]
    Unconfigured,
}

/// Invokes `hfst-lookup` against an omorfi generator transducer, one
/// subprocess per query as the lookup tool is line-oriented.
#[derive(Debug, Clone)]
pub struct HfstGenerator {
    lookup_bin: String,
    generator_path: PathBuf,
}

impl HfstGenerator {
    pub fn new(lookup_bin: impl Into<String>, generator_path: impl Into<PathBuf>) -> Self {
        Self {
            lookup_bin: lookup_bin.into(),
            generator_path: generator_path.into(),
        }
    }

    pub fn from_env() -> Result<Self, MorphologyError> {
        let lookup_bin =
            std::env::var("OMORFI_LOOKUP_BIN").unwrap_or_else(|_| "hfst-lookup".to_string());

        let generator_path = std::env::var("OMORFI_GENERATOR_PATH")
            .or_else(|_| std::env::var("OMORFI_GEN"))
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .ok_or(MorphologyError::Unconfigured)?;

        Ok(Self::new(lookup_bin, generator_path))
    }
}

#[async_trait::async_trait]
impl MorphologyGenerator for HfstGenerator {
    async fn generate(&self, lemma: &str, paradigm_tag: &str) -> io::Result<Option<String>> {
        let mut child = Command::new(&self.lookup_bin)
            .arg(&self.generator_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(format!("{lemma}{paradigm_tag}\n").as_bytes())
                .await?;
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Ok(None);
        }

        Ok(first_candidate(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// hfst-lookup prints `query<TAB>candidate<TAB>weight` lines; `??` marks a
/// failed generation.
fn first_candidate(output: &str) -> Option<String> {
    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(">>>") {
            continue;
        }

        let mut parts = line.split('\t');
        let _query = parts.next();
        let Some(candidate) = parts.next() else {
            continue;
        };

        let surface = candidate
            .split('/')
            .next()
            .unwrap_or("")
            .trim()
            .to_string();
        if !surface.is_empty() && surface != "??" {
            return Some(surface);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubGenerator {
        forms: BTreeMap<&'static str, &'static str>,
    }

    #[async_trait::async_trait]
    impl MorphologyGenerator for StubGenerator {
        async fn generate(&self, _lemma: &str, paradigm_tag: &str) -> io::Result<Option<String>> {
            Ok(self.forms.get(paradigm_tag).map(|form| form.to_string()))
        }
    }

    struct FailingGenerator;

    #[async_trait::async_trait]
    impl MorphologyGenerator for FailingGenerator {
        async fn generate(&self, _lemma: &str, _tag: &str) -> io::Result<Option<String>> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "generator died"))
        }
    }

    #[test]
    fn first_candidate_skips_echo_and_failures() {
        let output = ">>> kala+N+Sg+Gen\nkala+N+Sg+Gen\t??\t inf\nkala+N+Sg+Gen\tkalan\t0.0\n";
        assert_eq!(first_candidate(output).as_deref(), Some("kalan"));
    }

    #[test]
    fn first_candidate_trims_alternative_suffixes() {
        let output = "uida+V+Inf\tuida/verb\t0.0\n";
        assert_eq!(first_candidate(output).as_deref(), Some("uida"));
    }

    #[test]
    fn first_candidate_handles_empty_output() {
        assert_eq!(first_candidate(""), None);
        assert_eq!(first_candidate("kala+N+Sg+Nom\t??\t inf\n"), None);
    }

    #[test]
    fn unknown_pos_falls_back_to_noun_paradigm() {
        assert_eq!(targets_for_pos("noun"), NOUN_TARGETS);
        assert_eq!(targets_for_pos("VERB"), VERB_TARGETS);
        assert_eq!(targets_for_pos("pronoun"), NOUN_TARGETS);
    }

    #[tokio::test]
    async fn paradigm_keeps_only_generated_slots() {
        let generator = StubGenerator {
            forms: BTreeMap::from([("+N+Sg+Nom", "kala"), ("+N+Sg+Gen", "kalan")]),
        };

        let forms = generate_paradigm(&generator, "kala", "noun").await;
        assert_eq!(forms.len(), 2);
        assert_eq!(forms.get("Sg_Nom").map(String::as_str), Some("kala"));
        assert_eq!(forms.get("Sg_Gen").map(String::as_str), Some("kalan"));
    }

    #[tokio::test]
    async fn paradigm_swallows_generator_errors() {
        let forms = generate_paradigm(&FailingGenerator, "kala", "noun").await;
        assert!(forms.is_empty());
    }
}
