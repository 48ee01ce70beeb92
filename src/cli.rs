//! Minimal CLI: schema + documents → diagnostics
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use rayon::prelude::*;
use serde::Serialize;
use serde_json::Value;

use crate::builder::{make_field_validator, FieldValidator};
use crate::schema::load_schema;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// check JSON/NDJSON documents against a declarative props schema
#[derive(Parser, Debug)]
#[command(name = "prop-shape")]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// validate documents; exits with status 1 if any of them fails
    Check(CheckOut),
    /// print the display names of a schema's descriptors
    Describe(DescribeOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat input as newline-delimited JSON (NDJSON)
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// JSON Pointer to select a subnode in each document (e.g. /data/items/0/props)
    #[arg(long)]
    json_pointer: Option<String>,

    /// JQ pre-process filter for each document; every output is checked
    #[arg(long)]
    jq_expr: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(clap::Parser, Debug)]
struct CheckOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// schema file (`{ "props": ..., "strict": ..., "children": ... }`)
    #[arg(short, long)]
    schema: PathBuf,

    /// allow fields the schema does not declare
    #[arg(long)]
    no_strict: bool,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

#[derive(clap::Parser, Debug)]
struct DescribeOut {
    #[arg(short, long)]
    schema: PathBuf,
}

/// One loaded document, labelled by where it came from.
#[derive(Debug, Clone)]
struct Document {
    label: String,
    value: Value,
}

#[derive(Debug, Serialize)]
struct Outcome {
    label: String,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_documents(&self) -> Result<Vec<Document>> {
        let source_paths = resolve_file_path_patterns(&self.input)?;
        let mut out = Vec::new();
        for source_path in source_paths {
            let source_path_str = source_path.to_string_lossy().to_string();
            let source = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read source file {source_path_str}"))?;
            for (label, json_value) in parse_source(&source_path_str, &source, self.ndjson)? {
                self.select(label, json_value, &mut out)?;
            }
        }
        tracing::debug!(documents = out.len(), "loaded input documents");
        Ok(out)
    }

    fn select(&self, label: String, json_value: Value, out: &mut Vec<Document>) -> Result<()> {
        let json_value = match self.json_pointer.as_deref() {
            None => json_value,
            Some(ptr) => match json_value.pointer(ptr) {
                Some(x) => x.clone(),
                None => bail!("JSON pointer {ptr} selects nothing in {label}"),
            },
        };
        match self.jq_expr.as_ref() {
            None => out.push(Document { label, value: json_value }),
            Some(jq_expr) => {
                let result = crate::jq_exec::select_documents(jq_expr, &json_value)
                    .with_context(|| format!("failed to apply jq expression to {label}"))?;
                for (i, value) in result.into_iter().enumerate() {
                    out.push(Document { label: format!("{label}#{i}"), value });
                }
            }
        }
        Ok(())
    }
}

fn parse_source(path: &str, source: &str, ndjson: bool) -> Result<Vec<(String, Value)>> {
    if !ndjson {
        let value = serde_json::from_str::<Value>(source)
            .with_context(|| format!("failed to parse JSON source file ({path})"))?;
        return Ok(vec![(path.to_string(), value)]);
    }
    source
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| -> Result<(String, Value)> {
            let value = serde_json::from_str::<Value>(line)
                .with_context(|| format!("failed to parse line {} of {path}", i + 1))?;
            Ok((format!("{path}:{}", i + 1), value))
        })
        .collect()
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    /// Returns whether every checked document conformed.
    pub fn run(&self) -> Result<bool> {
        match &self.cmd {
            Command::Check(target) => target.run(),
            Command::Describe(target) => {
                let schema = load_schema(&target.schema)?;
                println!("props: {}", schema.descriptor);
                if let Some(children) = &schema.options.children {
                    println!("children: {children}");
                }
                println!("strict: {}", schema.options.strict);
                Ok(true)
            }
        }
    }
}

impl CheckOut {
    fn run(&self) -> Result<bool> {
        let mut schema = load_schema(&self.schema)?;
        if self.no_strict {
            schema.options.strict = false;
        }
        let validator = make_field_validator(schema.descriptor, schema.options);
        let documents = self.input_settings.load_documents()?;

        let outcomes = check_all(&validator, &documents);
        let all_ok = outcomes.iter().all(|o| o.ok);
        match self.format {
            Format::Json => println!("{}", serde_json::to_string_pretty(&outcomes)?),
            Format::Text => {
                for o in &outcomes {
                    match &o.message {
                        None => println!("{} {}", "ok".green(), o.label),
                        Some(message) => println!("{} {}{}", "FAIL".red().bold(), o.label, message),
                    }
                }
            }
        }
        Ok(all_ok)
    }
}

/// Checks documents in parallel; outcomes keep input order.
fn check_all(validator: &FieldValidator, documents: &[Document]) -> Vec<Outcome> {
    documents
        .par_iter()
        .map(|doc| {
            let diagnostic = validator.check(&doc.value, FieldValidator::HOOK_NAME, &doc.label);
            Outcome {
                label: doc.label.clone(),
                ok: diagnostic.is_none(),
                message: diagnostic.map(|d| d.message),
            }
        })
        .collect()
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if !has_glob_chars(pattern) {
            out.push(Path::new(pattern).to_path_buf());
            continue;
        }
        let mut matched = glob::glob(pattern)?
            .collect::<Result<Vec<_>, _>>()?;
        if matched.is_empty() {
            // an explicit glob that matches nothing is an error
            bail!("glob pattern matched no files: {pattern}");
        }
        out.append(&mut matched);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Options;
    use crate::ir::TypeDescriptor;
    use serde_json::json;

    #[test]
    fn ndjson_lines_are_labelled() {
        let docs = parse_source("in.ndjson", "{\"a\":1}\n\n{\"b\":2}\n", true).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].0, "in.ndjson:1");
        assert_eq!(docs[1], ("in.ndjson:3".to_string(), json!({ "b": 2 })));
        assert!(parse_source("x.ndjson", "{\n", true).is_err());
    }

    #[test]
    fn json_pointer_narrows_documents() {
        let settings = InputSettings {
            ndjson: false,
            json_pointer: Some("/props".into()),
            jq_expr: None,
            input: Vec::new(),
        };
        let mut out = Vec::new();
        settings.select("doc".into(), json!({ "props": { "a": 1 } }), &mut out).unwrap();
        assert_eq!(out[0].value, json!({ "a": 1 }));
        assert!(settings.select("doc".into(), json!({}), &mut out).is_err());
    }

    #[test]
    fn parallel_check_keeps_input_order() {
        let validator = make_field_validator(
            TypeDescriptor::record([("a", TypeDescriptor::number())]),
            Options::default(),
        );
        let documents = (0..64)
            .map(|i| Document {
                label: i.to_string(),
                value: if i % 3 == 0 { json!({ "a": i, "x": true }) } else { json!({ "a": i }) },
            })
            .collect::<Vec<_>>();
        let outcomes = check_all(&validator, &documents);
        for (i, o) in outcomes.iter().enumerate() {
            assert_eq!(o.label, i.to_string());
            assert_eq!(o.ok, i % 3 != 0);
        }
    }
}
