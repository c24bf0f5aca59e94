//! A [`Compiler`] that understands the declarations `DslRenderer` emits.
//!
//! Only single-line values are decoded; arrays and nested scopes are kept
//! as raw source text.

use std::sync::Mutex;

use obj_core::Compiler;
use obj_fs::NormalizedPath;
use obj_model::{AttributeSet, CompiledUnit, Declaration, Diagnostic};
use serde_json::Value;

#[derive(Debug, Default)]
pub struct FakeCompiler {
    fail_when_contains: Mutex<Option<String>>,
    compiled: Mutex<Vec<(NormalizedPath, String)>>,
}

impl FakeCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every compile whose source contains `needle`.
    pub fn fail_when_contains(&self, needle: &str) {
        *self.fail_when_contains.lock().unwrap() = Some(needle.to_string());
    }

    /// `(path, package)` of every successful compile.
    pub fn compiled(&self) -> Vec<(NormalizedPath, String)> {
        self.compiled.lock().unwrap().clone()
    }
}

impl Compiler for FakeCompiler {
    fn compile(
        &self,
        path: &NormalizedPath,
        source: &str,
        package: &str,
    ) -> Result<CompiledUnit, Diagnostic> {
        if let Some(needle) = self.fail_when_contains.lock().unwrap().as_deref() {
            if source.contains(needle) {
                return Err(Diagnostic::new(format!("syntax error near '{needle}'"))
                    .with_detail(format!("in {path}")));
            }
        }

        let declaration = parse_declaration(source)?;
        self.compiled
            .lock()
            .unwrap()
            .push((path.clone(), package.to_string()));

        Ok(CompiledUnit {
            path: path.clone(),
            package: package.to_string(),
            declarations: vec![declaration],
        })
    }
}

fn parse_declaration(source: &str) -> Result<Declaration, Diagnostic> {
    let mut lines = source.lines();
    let header = lines
        .next()
        .and_then(|line| line.strip_prefix("object "))
        .ok_or_else(|| Diagnostic::new("expected 'object'"))?;

    let (type_name, rest) = header
        .split_once(' ')
        .ok_or_else(|| Diagnostic::new("expected object type"))?;
    let (name, rest) = parse_string(rest)?;
    let ignore_on_error = rest.trim_start().starts_with("ignore_on_error");

    let mut templates = Vec::new();
    let mut attributes = AttributeSet::new();
    let mut nested: Option<(String, String)> = None;

    for line in lines {
        if let Some((key, raw)) = nested.as_mut() {
            raw.push('\n');
            raw.push_str(line);
            if line == "\t}" {
                attributes.insert(std::mem::take(key), Value::String(std::mem::take(raw)));
                nested = None;
            }
            continue;
        }

        let line = line.trim_start_matches('\t');
        if line.is_empty() || line == "}" {
            continue;
        }
        if let Some(template) = line.strip_prefix("import ") {
            templates.push(parse_string(template)?.0);
            continue;
        }

        let (key, value) = line
            .split_once(" = ")
            .ok_or_else(|| Diagnostic::new(format!("cannot parse '{line}'")))?;
        let key = parse_key(key)?;
        if value == "{" {
            nested = Some((key, value.to_string()));
        } else {
            attributes.insert(key, parse_value(value)?);
        }
    }

    Ok(Declaration {
        type_name: type_name.trim_start_matches('@').to_string(),
        name,
        templates,
        attributes,
        ignore_on_error,
    })
}

/// `vars["os"]` becomes `vars.os`.
fn parse_key(key: &str) -> Result<String, Diagnostic> {
    let (head, mut rest) = if key.starts_with('"') {
        parse_string(key)?
    } else {
        let end = key.find('[').unwrap_or(key.len());
        (key[..end].trim_start_matches('@').to_string(), &key[end..])
    };

    let mut path = head;
    while let Some(inner) = rest.strip_prefix('[') {
        let (segment, after) = parse_string(inner)?;
        path.push('.');
        path.push_str(&segment);
        rest = after
            .strip_prefix(']')
            .ok_or_else(|| Diagnostic::new("expected ']'"))?;
    }
    Ok(path)
}

fn parse_value(raw: &str) -> Result<Value, Diagnostic> {
    match raw {
        "null" => return Ok(Value::Null),
        "true" => return Ok(Value::Bool(true)),
        "false" => return Ok(Value::Bool(false)),
        _ => {}
    }
    if raw.starts_with('"') {
        return Ok(Value::String(parse_string(raw)?.0));
    }
    if let Ok(i) = raw.parse::<i64>() {
        return Ok(Value::from(i));
    }
    if let Ok(f) = raw.parse::<f64>() {
        return Ok(Value::from(f));
    }
    Ok(Value::String(raw.to_string()))
}

/// Parse a quoted string at the start of `input`, returning it and the rest.
fn parse_string(input: &str) -> Result<(String, &str), Diagnostic> {
    let body = input
        .strip_prefix('"')
        .ok_or_else(|| Diagnostic::new(format!("expected string in '{input}'")))?;

    let mut out = String::new();
    let mut chars = body.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Ok((out, &body[i + 1..])),
            '\\' => match chars.next().map(|(_, c)| c) {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some('b') => out.push('\u{8}'),
                Some('f') => out.push('\u{c}'),
                Some(other) => out.push(other),
                None => break,
            },
            other => out.push(other),
        }
    }
    Err(Diagnostic::new("unterminated string"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_rendered_service() {
        let source = "object Service \"ping\" ignore_on_error {\n\timport \"generic-service\"\n\n\tcheck_command = \"ping4\"\n\thost_name = \"host1\"\n\tvars[\"os\"] = \"Linux\"\n\tversion = 1700000000.500000\n}\n";
        let declaration = parse_declaration(source).unwrap();

        assert_eq!(declaration.type_name, "Service");
        assert_eq!(declaration.name, "ping");
        assert!(declaration.ignore_on_error);
        assert_eq!(declaration.templates, vec!["generic-service"]);
        assert_eq!(declaration.attributes["host_name"], json!("host1"));
        assert_eq!(declaration.attributes["vars.os"], json!("Linux"));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_declaration("template Host \"x\" {\n}").is_err());
    }
}
