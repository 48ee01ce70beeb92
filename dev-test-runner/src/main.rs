//! Runs every fixture under `fixtures/` and prints a pass/fail table.
//!
//! Usage: `dev-test-runner [DIR] [--filter REGEX]`
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use prop_shape::path_de::{from_str_with_path, from_value_with_path};
use prop_shape::schema::SchemaFile;
use prop_shape::{make_field_validator, FieldValidator};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct Fixture {
    name: String,
    schema: Value,
    cases: Vec<Case>,
}

#[derive(Debug, Deserialize)]
struct Case {
    value: Value,
    expect: Option<String>,
}

/// run the fixture scenarios and print a pass/fail table
#[derive(Parser, Debug)]
struct Settings {
    /// fixtures directory (defaults to the workspace `fixtures/`)
    dir: Option<PathBuf>,

    /// only run fixtures whose name matches this regex
    #[arg(long)]
    filter: Option<Regex>,
}

impl Settings {
    fn fixtures_dir(&self) -> PathBuf {
        self.dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../fixtures")))
    }
}

fn load_fixture(path: &Path) -> Result<Fixture> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    from_str_with_path::<Fixture>(&source).with_context(|| format!("bad fixture {}", path.display()))
}

fn fixture_paths(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = std::fs::read_dir(dir)
        .with_context(|| format!("failed to list {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("failed to list {}", dir.display()))?;
    paths.retain(|p| p.extension().is_some_and(|ext| ext == "json"));
    paths.sort();
    Ok(paths)
}

fn run_fixture(fixture: &Fixture) -> Result<Vec<(usize, Option<String>, Option<String>)>> {
    let schema = from_value_with_path::<SchemaFile>(fixture.schema.clone())
        .with_context(|| format!("fixture {}: bad schema", fixture.name))?
        .compile()?;
    let validator = make_field_validator(schema.descriptor, schema.options);
    let mut mismatches = Vec::new();
    for (i, case) in fixture.cases.iter().enumerate() {
        let got = validator
            .check(&case.value, FieldValidator::HOOK_NAME, &fixture.name)
            .map(|d| d.message);
        if got != case.expect {
            mismatches.push((i, case.expect.clone(), got));
        }
    }
    Ok(mismatches)
}

fn main() -> ExitCode {
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("{} {error:#}", "error:".red());
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<bool> {
    let settings = Settings::parse();
    let mut failed = 0usize;
    for path in fixture_paths(&settings.fixtures_dir())? {
        let fixture = load_fixture(&path)?;
        if settings.filter.as_ref().is_some_and(|rx| !rx.is_match(&fixture.name)) {
            continue;
        }
        let mismatches = run_fixture(&fixture)?;
        if mismatches.is_empty() {
            println!("{} {} ({} cases)", "✅".green(), fixture.name, fixture.cases.len());
            continue;
        }
        failed += 1;
        println!("{} {}", "❌".red(), fixture.name.bold());
        for (i, expected, got) in mismatches {
            println!("    case #{i}");
            println!("      expected: {expected:?}");
            println!("      got:      {got:?}");
        }
    }
    Ok(failed == 0)
}
