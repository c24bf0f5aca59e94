//! Declaration rendering in the config DSL
//!
//! ```text
//! object Service "ping" {
//! 	import "generic-service"
//!
//! 	check_command = "ping4"
//! 	host_name = "host1"
//! 	vars["os"] = "Linux"
//! }
//! ```

use std::fmt::Write as _;

use obj_model::AttributeSet;
use serde_json::Value;

use crate::collab::Renderer;

/// Words the DSL parser reserves. Identifiers equal to one of these are
/// written with an `@` prefix.
const KEYWORDS: &[&str] = &[
    "object",
    "template",
    "include",
    "include_recursive",
    "include_zones",
    "library",
    "null",
    "true",
    "false",
    "const",
    "var",
    "this",
    "globals",
    "locals",
    "use",
    "__using",
    "default",
    "ignore_on_error",
    "current_filename",
    "current_line",
    "apply",
    "to",
    "where",
    "import",
    "assign",
    "ignore",
    "function",
    "return",
    "break",
    "continue",
    "for",
    "if",
    "else",
    "while",
    "throw",
    "try",
    "except",
];

/// Renders object declarations as DSL source.
#[derive(Debug, Clone, Copy, Default)]
pub struct DslRenderer;

impl Renderer for DslRenderer {
    fn render(
        &self,
        type_name: &str,
        object_name: &str,
        templates: &[String],
        attributes: &AttributeSet,
        ignore_on_error: bool,
    ) -> String {
        let mut out = String::new();

        out.push_str("object ");
        emit_identifier(&mut out, type_name, false);
        out.push(' ');
        emit_string(&mut out, object_name);
        if ignore_on_error {
            out.push_str(" ignore_on_error");
        }
        out.push_str(" {");

        for template in templates {
            out.push_str("\n\timport ");
            emit_string(&mut out, template);
        }
        if !templates.is_empty() {
            out.push('\n');
        }

        for (key, value) in attributes {
            out.push_str("\n\t");
            emit_attribute_path(&mut out, key);
            out.push_str(" = ");
            emit_value(&mut out, 1, value);
        }

        out.push_str("\n}");
        out
    }
}

fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

fn is_identifier(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn emit_identifier(out: &mut String, word: &str, in_assignment: bool) {
    if is_keyword(word) {
        out.push('@');
        out.push_str(word);
    } else if in_assignment && !is_identifier(word) {
        emit_string(out, word);
    } else {
        out.push_str(word);
    }
}

/// `vars.os` becomes `vars["os"]`.
fn emit_attribute_path(out: &mut String, path: &str) {
    let mut segments = path.split('.');
    if let Some(head) = segments.next() {
        emit_identifier(out, head, true);
    }
    for segment in segments {
        out.push('[');
        emit_string(out, segment);
        out.push(']');
    }
}

fn emit_string(out: &mut String, value: &str) {
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            other => out.push(other),
        }
    }
    out.push('"');
}

fn emit_number(out: &mut String, number: &serde_json::Number) {
    if let Some(i) = number.as_i64() {
        let _ = write!(out, "{i}");
    } else if let Some(u) = number.as_u64() {
        let _ = write!(out, "{u}");
    } else if let Some(f) = number.as_f64() {
        let _ = write!(out, "{f:.6}");
    }
}

fn emit_value(out: &mut String, indent: usize, value: &Value) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => emit_number(out, n),
        Value::String(s) => emit_string(out, s),
        Value::Array(items) => {
            out.push_str("[ ");
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                emit_value(out, indent, item);
            }
            if !items.is_empty() {
                out.push(' ');
            }
            out.push(']');
        }
        Value::Object(map) => {
            out.push('{');
            for (key, item) in map {
                out.push('\n');
                push_tabs(out, indent + 1);
                emit_identifier(out, key, true);
                out.push_str(" = ");
                emit_value(out, indent + 1, item);
            }
            out.push('\n');
            push_tabs(out, indent);
            out.push('}');
        }
    }
}

fn push_tabs(out: &mut String, count: usize) {
    for _ in 0..count {
        out.push('\t');
    }
}
