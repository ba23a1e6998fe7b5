//! Loading of already-cleaned `(identity, text)` records from JSON, JSON Lines or a directory.
//!
//! No deduplication or null-row repair happens here; a record without text is an error.

use crate::index::Document;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Deserialize)]
struct InputDoc {
    #[serde(alias = "title", alias = "name")]
    id: String,
    #[serde(default, alias = "description", alias = "body")]
    text: Option<String>,
}

impl InputDoc {
    fn into_document(self, file: &Path) -> Result<Document> {
        match self.text {
            Some(text) => Ok(Document::new(self.id, text)),
            None => bail!("{}: document {:?} has no text", file.display(), self.id),
        }
    }
}

/// Loads documents from a `.json`/`.jsonl` file, or every such file under a directory
/// (visited in file-name order so row numbering is stable).
pub fn load_documents<P: AsRef<Path>>(input: P) -> Result<Vec<Document>> {
    let input_path = input.as_ref();
    let mut files: Vec<PathBuf> = Vec::new();
    if input_path.is_dir() {
        for entry in WalkDir::new(input_path).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "json" | "jsonl") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
    } else if input_path.is_file() {
        files.push(input_path.to_path_buf());
    } else {
        bail!("input path {} does not exist", input_path.display());
    }

    let mut docs = Vec::new();
    for file in files {
        if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            load_jsonl(&file, &mut docs)?;
        } else {
            load_json(&file, &mut docs)?;
        }
    }
    tracing::info!(num_docs = docs.len(), input = %input_path.display(), "loaded documents");
    Ok(docs)
}

fn load_jsonl(file: &Path, docs: &mut Vec<Document>) -> Result<()> {
    let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
    let reader = BufReader::new(f);
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let doc: InputDoc = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}: invalid record", file.display(), lineno + 1))?;
        docs.push(doc.into_document(file)?);
    }
    Ok(())
}

fn load_json(file: &Path, docs: &mut Vec<Document>) -> Result<()> {
    let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
    let reader = BufReader::new(f);
    let json: serde_json::Value = serde_json::from_reader(reader)
        .with_context(|| format!("{}: invalid JSON", file.display()))?;
    match json {
        serde_json::Value::Array(arr) => {
            for (i, v) in arr.into_iter().enumerate() {
                let doc: InputDoc = serde_json::from_value(v)
                    .with_context(|| format!("{}: record {i}: invalid record", file.display()))?;
                docs.push(doc.into_document(file)?);
            }
        }
        serde_json::Value::Object(_) => {
            let doc: InputDoc = serde_json::from_value(json)
                .with_context(|| format!("{}: invalid record", file.display()))?;
            docs.push(doc.into_document(file)?);
        }
        _ => bail!("{}: expected a JSON array or object", file.display()),
    }
    Ok(())
}
