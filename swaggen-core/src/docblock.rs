//! Structured metadata embedded in documentation text.
//!
//! Narrative text comes first; a line consisting only of `---` starts a YAML
//! block that may declare `description`, `required` and `properties`:
//!
//! ```text
//! A pet in the store.
//!
//! ---
//! required:
//!   - name
//! properties:
//!   name:
//!     type: string
//!   owner:
//!     ref: Owner
//! ```

use serde::Deserialize;
use serde_json::{Map, Value};

/// Documentation text split into narrative and structured block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocText {
    /// Narrative text before the delimiter, trimmed. `None` when blank.
    pub narrative: Option<String>,
    /// Raw YAML after the delimiter, dedented. `None` without a delimiter.
    pub block: Option<String>,
}

/// Parsed structured block.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DocBlock {
    pub description: Option<String>,
    pub required: Option<Vec<String>>,
    pub properties: Option<Map<String, Value>>,
}

const DELIMITER: &str = "---";

/// Split documentation text at the first `---` line.
pub fn split(doc: &str) -> DocText {
    let mut narrative = Vec::new();
    let mut block: Option<Vec<&str>> = None;

    for line in doc.lines() {
        match block {
            Some(ref mut lines) => lines.push(line),
            None if line.trim() == DELIMITER => block = Some(Vec::new()),
            None => narrative.push(line.trim()),
        }
    }

    let narrative = narrative.join("\n").trim().to_string();
    DocText {
        narrative: (!narrative.is_empty()).then_some(narrative),
        block: block.map(|lines| dedent(&lines)),
    }
}

/// Parse the YAML of a structured block.
///
/// An empty block parses to an empty [`DocBlock`].
pub fn parse_block(yaml: &str) -> Result<DocBlock, serde_yaml::Error> {
    if yaml.trim().is_empty() {
        return Ok(DocBlock::default());
    }
    serde_yaml::from_str(yaml)
}

/// Strip the indentation common to every non-blank line.
fn dedent(lines: &[&str]) -> String {
    let indent = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start_matches(' ').len())
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|l| if l.trim().is_empty() { "" } else { &l[indent..] })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_without_delimiter() {
        let text = split("  A plain description.\n  Second line.  ");
        assert_eq!(
            text.narrative.as_deref(),
            Some("A plain description.\nSecond line.")
        );
        assert!(text.block.is_none());
    }

    #[test]
    fn split_with_delimiter_dedents_block() {
        let text = split("A pet.\n\n ---\n required:\n   - name\n");
        assert_eq!(text.narrative.as_deref(), Some("A pet."));
        assert_eq!(text.block.as_deref(), Some("required:\n  - name"));
    }

    #[test]
    fn blank_lines_with_wide_whitespace() {
        let text = split("Pet.\n---\n  required:\n\u{3000}\n    - name\n");
        assert_eq!(text.block.as_deref(), Some("required:\n\n  - name"));
        let block = parse_block(text.block.as_deref().unwrap()).unwrap();
        assert_eq!(block.required, Some(vec!["name".to_string()]));
    }

    #[test]
    fn block_only() {
        let text = split("---\nproperties:\n  a:\n    type: string");
        assert!(text.narrative.is_none());
        let block = parse_block(text.block.as_deref().unwrap()).unwrap();
        assert!(block.properties.unwrap().contains_key("a"));
    }

    #[test]
    fn parse_full_block() {
        let block = parse_block(
            "description: A cat\nrequired:\n  - name\nproperties:\n  name:\n    type: string\n    example: Sylvester\n",
        )
        .unwrap();
        assert_eq!(block.description.as_deref(), Some("A cat"));
        assert_eq!(block.required, Some(vec!["name".to_string()]));
        let props = block.properties.unwrap();
        assert_eq!(props["name"]["example"], "Sylvester");
    }

    #[test]
    fn empty_block_is_default() {
        assert_eq!(parse_block("  \n").unwrap(), DocBlock::default());
    }

    #[test]
    fn scalar_block_is_an_error() {
        assert!(parse_block("just words").is_err());
    }
}
