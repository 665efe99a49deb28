use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use rayon::prelude::*;

use crate::case::{Case, CaseFile};
use crate::{TestFailure, TestResults};

/// Directory holding the bundled case files.
pub fn cases_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("cases")
}

#[derive(Debug, thiserror::Error)]
pub enum CollectCasesError {
    #[error("IO error in {}: {error}", path.display())]
    IoError { path: PathBuf, error: std::io::Error },
    #[error("Invalid case file {}: {error}", path.display())]
    ParseError {
        path: PathBuf,
        error: serde_json::Error,
    },
}

impl CollectCasesError {
    pub fn path(&self) -> &Path {
        match self {
            CollectCasesError::IoError { path, .. } => path,
            CollectCasesError::ParseError { path, .. } => path,
        }
    }
}

/// A parsed case file.
#[derive(Debug, Clone)]
pub struct ParsedCaseFile {
    pub path: PathBuf,
    pub file: CaseFile,
}

impl ParsedCaseFile {
    pub fn cases(&self) -> impl Iterator<Item = Case> + '_ {
        self.file
            .all_cases()
            .into_iter()
            .map(|(name, data)| Case::new(self.path.clone(), name.to_string(), data.clone()))
    }
}

pub struct TestRunner {
    cases_dir: PathBuf,
}

impl TestRunner {
    pub fn new(cases_dir: impl Into<PathBuf>) -> Self {
        Self {
            cases_dir: cases_dir.into(),
        }
    }

    /// Parse every `.json` file under the cases directory, sorted by path.
    pub fn collect(&self) -> Result<Vec<Result<ParsedCaseFile, CollectCasesError>>> {
        let mut files = Vec::new();
        walk_directory(&self.cases_dir, &mut files)?;
        files.sort();
        Ok(files.into_iter().map(parse_case_file).collect())
    }

    /// Discover and run all test cases
    pub fn run_all(&self) -> Result<TestResults> {
        let outcomes: Vec<Vec<(String, Option<String>)>> = self
            .collect()?
            .par_iter()
            .map(|parsed| match parsed {
                Ok(parsed) => parsed
                    .cases()
                    .map(|case| {
                        let name = case_id(&self.cases_dir, &case.path, &case.name);
                        let result = case.run_all();
                        let error = (!result.all_passed()).then(|| {
                            result
                                .failed_scenarios()
                                .iter()
                                .map(|s| match &s.result {
                                    crate::ScenarioResult::Failed { error } => {
                                        format!("{}: {}", s.name, error)
                                    }
                                    crate::ScenarioResult::Passed => String::new(),
                                })
                                .collect::<Vec<_>>()
                                .join("\n")
                        });
                        (name, error)
                    })
                    .collect(),
                Err(error) => vec![(
                    case_id(&self.cases_dir, error.path(), ""),
                    Some(error.to_string()),
                )],
            })
            .collect();

        let mut results = TestResults::new();
        for (name, error) in outcomes.into_iter().flatten() {
            match error {
                None => results.add_pass(),
                Some(error) => results.add_failure(TestFailure::new(name, error)),
            }
        }
        Ok(results)
    }
}

/// Friendly case identifier: the file path relative to the cases directory
/// without extension, plus `[name]` for cases in multi-case files.
pub fn case_id(cases_dir: &Path, path: &Path, name: &str) -> String {
    let file_name = path
        .strip_prefix(cases_dir)
        .unwrap_or(path)
        .with_extension("")
        .display()
        .to_string();
    if name.is_empty() {
        file_name
    } else {
        format!("{file_name}[{name}]")
    }
}

fn parse_case_file(path: PathBuf) -> Result<ParsedCaseFile, CollectCasesError> {
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(error) => return Err(CollectCasesError::IoError { path, error }),
    };
    match serde_json::from_str(&content) {
        Ok(file) => Ok(ParsedCaseFile { path, file }),
        Err(error) => Err(CollectCasesError::ParseError { path, error }),
    }
}

fn walk_directory(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    if !dir.exists() {
        return Ok(());
    }

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            walk_directory(&path, files)?;
        } else if path.extension().and_then(|s| s.to_str()) == Some("json") {
            files.push(path);
        }
    }

    Ok(())
}
