use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, bail};
use sigil_schema::{SchemaNode, Scope};
use sigil_value::Value;

/// Read input from file path or stdin.
/// - `None` or `Some("-")` reads from stdin
/// - `Some(path)` reads from file
pub fn read_input(file: Option<&str>) -> anyhow::Result<String> {
    match file {
        None | Some("-") => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Error reading from stdin")?;
            Ok(buffer)
        }
        Some(path) => fs::read_to_string(path).with_context(|| format!("Error reading {path}")),
    }
}

/// Helper to get display path for error messages
pub fn display_path(file: Option<&str>) -> &str {
    match file {
        None | Some("-") => "<stdin>",
        Some(path) => path,
    }
}

/// Parse a JSON document into a validation target.
pub fn parse_document(content: &str, origin: &str) -> anyhow::Result<Value> {
    Value::from_json_str(content).with_context(|| format!("{origin} is not valid JSON"))
}

pub fn load_schema(path: &Path) -> anyhow::Result<SchemaNode> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Error reading schema {}", path.display()))?;
    SchemaNode::from_json_str(&content)
        .with_context(|| format!("Invalid schema {}", path.display()))
}

/// Build the initial scope from `name=json` pairs.
pub fn parse_vars(vars: &[String]) -> anyhow::Result<Scope> {
    let mut scope = Scope::new();
    for var in vars {
        let Some((name, json)) = var.split_once('=') else {
            bail!("Invalid variable '{var}': expected NAME=JSON");
        };
        if name.is_empty() {
            bail!("Invalid variable '{var}': empty name");
        }
        let value = Value::from_json_str(json)
            .with_context(|| format!("Invalid value for variable '{name}'"))?;
        scope.bind(name, value);
    }
    Ok(scope)
}
