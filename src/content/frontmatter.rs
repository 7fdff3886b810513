//! Front-matter parsing

use serde_yaml::{Mapping, Value};
use thiserror::Error;

/// Why a front-matter block could not be parsed
#[derive(Debug, Error)]
pub enum FrontMatterError {
    #[error("front-matter block is not closed")]
    Unterminated,

    #[error("invalid YAML front-matter: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON front-matter: {0}")]
    Json(#[from] serde_json::Error),
}

/// Front-matter of a project overlay.
///
/// Page rendering never reads these values. Only a block that is not valid
/// YAML (or JSON) is an error; keys of an unexpected shape are ignored.
#[derive(Debug, Clone, Default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub draft: bool,

    /// Every key of the block, as parsed
    pub values: Mapping,
}

impl FrontMatter {
    /// Read the known keys from a parsed block. A block that is not a
    /// mapping carries no metadata.
    fn from_value(value: Value) -> Self {
        let Value::Mapping(values) = value else {
            return Self::default();
        };

        let text = |key: &str| values.get(key).and_then(Value::as_str).map(str::to_string);
        let title = text("title");
        let summary = text("summary");
        let draft = values
            .get("draft")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        Self {
            title,
            summary,
            draft,
            values,
        }
    }

    /// Parse front-matter from content string
    /// Returns (front_matter, remaining_content)
    pub fn parse(content: &str) -> Result<(Self, &str), FrontMatterError> {
        let content = content.trim_start_matches('\u{feff}').trim_start();

        if content.starts_with("---") {
            return Self::parse_yaml(content);
        }

        if content.starts_with(";;;") {
            return Self::parse_json(content);
        }

        Ok((FrontMatter::default(), content))
    }

    fn parse_yaml(content: &str) -> Result<(Self, &str), FrontMatterError> {
        let rest = match content.find('\n') {
            Some(pos) if content[..pos].trim_end() == "---" => &content[pos + 1..],
            // "----" or "--- text" on the first line is markdown
            Some(_) => return Ok((FrontMatter::default(), content)),
            None => return Ok((FrontMatter::default(), content)),
        };

        let Some((yaml, remaining)) = split_at_fence(rest) else {
            if looks_like_yaml(rest) {
                return Err(FrontMatterError::Unterminated);
            }
            return Ok((FrontMatter::default(), content));
        };

        if yaml.trim().is_empty() {
            return Ok((FrontMatter::default(), remaining));
        }

        // A leading horizontal rule followed by prose is not front-matter
        if !looks_like_yaml(yaml) {
            return Ok((FrontMatter::default(), content));
        }

        let value: Value = serde_yaml::from_str(yaml)?;
        Ok((Self::from_value(value), remaining))
    }

    fn parse_json(content: &str) -> Result<(Self, &str), FrontMatterError> {
        let rest = &content[3..];
        let end_pos = rest.find(";;;").ok_or(FrontMatterError::Unterminated)?;
        let json = &rest[..end_pos];
        let remaining = rest[end_pos + 3..].trim_start_matches(['\n', '\r']);

        if json.trim().is_empty() {
            return Ok((FrontMatter::default(), remaining));
        }

        let value: Value = serde_json::from_str(json)?;
        Ok((Self::from_value(value), remaining))
    }
}

/// Split at the first line that is exactly `---` or `...`
fn split_at_fence(rest: &str) -> Option<(&str, &str)> {
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let trimmed = line.trim_end();
        if trimmed == "---" || trimmed == "..." {
            let remaining = rest[offset + line.len()..].trim_start_matches(['\n', '\r']);
            return Some((&rest[..offset], remaining));
        }
        offset += line.len();
    }
    None
}

/// Whether any line has the `key: value` shape of a YAML mapping
fn looks_like_yaml(block: &str) -> bool {
    block.lines().any(|line| {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return false;
        }
        let Some(colon_pos) = trimmed.find(':') else {
            return false;
        };
        let key = &trimmed[..colon_pos];
        let is_key = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            && !matches!(key, "http" | "https" | "ftp" | "mailto");
        let after = &trimmed[colon_pos + 1..];
        is_key && (after.is_empty() || after.starts_with(' '))
    })
}
