use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use rfp_core::Requirement;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export directory unusable: {0}")]
    ExportDir(String),
    #[error("nothing to export: the response is empty")]
    EmptyResponse,
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// A generated answer to one requirement, ready to be written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseDocument<'a> {
    pub rfp: &'a str,
    pub requirement: &'a Requirement,
    pub instruction: &'a str,
    pub response: &'a str,
    pub generated_utc: &'a str,
}

impl ResponseDocument<'_> {
    /// Markdown body with a front-matter header describing the requirement.
    pub fn render(&self) -> String {
        let req = self.requirement;
        let instruction = if self.instruction.trim().is_empty() {
            "none"
        } else {
            self.instruction.trim()
        };
        format!(
            "---\nrfp: {rfp}\nsection_name: {name}\nsection_number: {number}\npage_number: {page}\ninstruction: {instruction}\ngenerated_utc: {at}\n---\n\n## Requirement\n\n{content}\n\n## Response\n\n{response}\n",
            rfp = scalar(self.rfp),
            name = scalar(&req.section_name),
            number = scalar(&req.section_number),
            page = scalar(&req.page_number),
            instruction = scalar(instruction),
            at = self.generated_utc,
            content = req.content.trim(),
            response = self.response.trim(),
        )
    }

    /// `{rfp}--{section_number}--{hash8}.md`; the hash keys on the requirement
    /// text so re-exporting the same requirement overwrites its file.
    pub fn filename(&self) -> String {
        let rfp = sanitize(self.rfp, "rfp");
        let section = sanitize(&self.requirement.section_number, "section");
        let hash = short_hash(&self.requirement.content);
        format!("{rfp}--{section}--{hash}.md")
    }
}

/// Writes response documents into one directory, atomically.
pub struct ResponseExporter {
    dir: PathBuf,
}

impl ResponseExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn export(&self, doc: &ResponseDocument<'_>) -> Result<PathBuf, ExportError> {
        if doc.response.trim().is_empty() {
            return Err(ExportError::EmptyResponse);
        }
        prepare_dir(&self.dir)?;

        let target = self.dir.join(doc.filename());
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(doc.render().as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&target).map_err(|err| ExportError::Io(err.error))?;
        Ok(target)
    }
}

fn prepare_dir(dir: &Path) -> Result<(), ExportError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| ExportError::ExportDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(ExportError::ExportDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| ExportError::ExportDir(e.to_string()))?;
    }
    Ok(())
}

fn one_line(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Front matter value on one line, double-quoted when YAML would otherwise
/// read it as something other than a plain string.
fn scalar(value: &str) -> String {
    let line = one_line(value);
    let needs_quotes = line.is_empty()
        || line.contains(": ")
        || line.contains(" #")
        || line.ends_with(':')
        || line.starts_with(|c: char| "-?:,[]{}#&*!|>'\"%@`".contains(c));
    if !needs_quotes {
        return line;
    }
    let escaped = line.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

fn sanitize(input: &str, fallback: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev_underscore = false;
    for c in input.trim().chars() {
        let c = if c.is_alphanumeric() || matches!(c, '.' | '-') {
            c
        } else {
            '_'
        };
        if c == '_' && prev_underscore {
            continue;
        }
        prev_underscore = c == '_';
        out.push(c);
    }
    let mut out = out.trim_matches(&['_', '.'][..]).to_string();
    if out.is_empty() {
        out = fallback.to_string();
    }
    if out.len() > 60 {
        let mut cut = 60;
        while !out.is_char_boundary(cut) {
            cut -= 1;
        }
        out.truncate(cut);
    }
    out
}

fn short_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}
