// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Markdown documents with a YAML metadata header.
//!
//! ```text
//! ---
//! id: workflow-grep-read-edit
//! confidence: 0.5
//! ---
//!
//! # Title
//!
//! ## Action
//! Follow the workflow pattern: Grep -> Read -> Edit
//! ```
//!
//! Only a narrow contract is needed here: split header from body, read
//! scalar and list values leniently, pull out one `## Section`, and render a
//! serializable header back in front of a body.

use serde::Serialize;
use serde_yaml::{Mapping, Value};

const DELIMITER: &str = "---";

/// Parsed metadata header of a document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter(Mapping);

impl Frontmatter {
    fn value(&self, key: &str) -> Option<&Value> {
        self.0.get(Value::String(key.to_string()))
    }

    /// Scalar value as text. Numbers and booleans are rendered.
    pub fn get_str(&self, key: &str) -> Option<String> {
        match self.value(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Numeric value, also accepting quoted numbers
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        match self.value(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn get_u32(&self, key: &str) -> Option<u32> {
        match self.value(key)? {
            Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// List value; a scalar is treated as a one-element list
    pub fn get_list(&self, key: &str) -> Vec<String> {
        match self.value(key) {
            Some(Value::Sequence(items)) => items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect(),
            Some(_) => self.get_str(key).into_iter().collect(),
            None => Vec::new(),
        }
    }
}

/// A document split into header and body
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub frontmatter: Frontmatter,
    pub body: String,
}

impl Document {
    /// Body text of the `## <name>` section without the blank lines around
    /// it. Ends at the next `## ` heading or the end of the document.
    pub fn section(&self, name: &str) -> Option<String> {
        let heading = format!("## {}", name);
        let mut lines = self.body.lines();
        lines.by_ref().find(|line| line.trim_end() == heading)?;

        let content: Vec<&str> = lines.take_while(|line| !line.starts_with("## ")).collect();
        let is_blank = |line: &&str| line.trim().is_empty();
        let start = content.iter().position(|line| !is_blank(line)).unwrap_or(content.len());
        let end = content.iter().rposition(|line| !is_blank(line)).map_or(start, |i| i + 1);
        Some(content[start..end].join("\n"))
    }
}

/// Split `content` into header and body. `None` when there is no header or
/// the header is not a YAML mapping.
pub fn parse(content: &str) -> Option<Document> {
    let (header, body) = split(content)?;
    let mapping = if header.trim().is_empty() {
        Mapping::new()
    } else {
        match serde_yaml::from_str::<Value>(header).ok()? {
            Value::Mapping(mapping) => mapping,
            _ => return None,
        }
    };
    Some(Document {
        frontmatter: Frontmatter(mapping),
        body: body.to_string(),
    })
}

fn split(content: &str) -> Option<(&str, &str)> {
    let rest = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

/// Render `header` as YAML between delimiters, followed by `body`.
pub fn render<T: Serialize>(header: &T, body: &str) -> crate::Result<String> {
    let yaml = serde_yaml::to_string(header)?;
    Ok(format!("{DELIMITER}\n{yaml}{DELIMITER}\n\n{body}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"---
id: workflow-grep-read-edit
trigger: "when performing multi-step code operations"
confidence: 0.85
observation_count: "7"
evolved_from:
  - a
  - b
---

# Workflow Grep Read Edit

## Action
Follow the workflow pattern: Grep -> Read -> Edit

## Evidence
- Observed 7 times
"#;

    #[test]
    fn test_parse_scalars_and_lists() {
        let doc = parse(SAMPLE).unwrap();
        let fm = &doc.frontmatter;
        assert_eq!(fm.get_str("id").as_deref(), Some("workflow-grep-read-edit"));
        assert_eq!(fm.get_f64("confidence"), Some(0.85));
        assert_eq!(fm.get_str("confidence").as_deref(), Some("0.85"));
        assert_eq!(fm.get_u32("observation_count"), Some(7));
        assert_eq!(fm.get_list("evolved_from"), vec!["a", "b"]);
        assert!(fm.get_str("missing").is_none());
    }

    #[test]
    fn test_section_extraction() {
        let doc = parse(SAMPLE).unwrap();
        assert_eq!(
            doc.section("Action").as_deref(),
            Some("Follow the workflow pattern: Grep -> Read -> Edit")
        );
        assert_eq!(doc.section("Evidence").as_deref(), Some("- Observed 7 times"));
        assert!(doc.section("Usage").is_none());
    }

    #[test]
    fn test_section_keeps_line_whitespace() {
        let doc = parse("---\nid: x\n---\n\n## Action\n\n  indented\ntrailing \n\n\n## Next\n").unwrap();
        assert_eq!(doc.section("Action").as_deref(), Some("  indented\ntrailing "));

        let doc = parse("---\nid: x\n---\n## Action\n\n").unwrap();
        assert_eq!(doc.section("Action").as_deref(), Some(""));
    }

    #[test]
    fn test_missing_or_unterminated_header() {
        assert!(parse("# Just markdown\n").is_none());
        assert!(parse("---\nid: x\nno closing delimiter\n").is_none());
        assert!(parse("---\n- a\n- b\n---\nbody").is_none());
    }

    #[test]
    fn test_empty_header() {
        let doc = parse("---\n---\nbody").unwrap();
        assert!(doc.frontmatter.get_str("id").is_none());
        assert_eq!(doc.body, "body");
    }

    #[test]
    fn test_render_then_parse() {
        #[derive(Serialize)]
        struct Header<'a> {
            name: &'a str,
            confidence: f64,
        }

        let content = render(&Header { name: "has: colon", confidence: 0.55 }, "## Action\nDo it\n")
            .unwrap();
        assert!(content.starts_with("---\n"));

        let doc = parse(&content).unwrap();
        assert_eq!(doc.frontmatter.get_str("name").as_deref(), Some("has: colon"));
        assert_eq!(doc.frontmatter.get_f64("confidence"), Some(0.55));
        assert_eq!(doc.section("Action").as_deref(), Some("Do it"));
    }
}
