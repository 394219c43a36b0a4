//! Hashtag-style labels embedded in summary text.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::Error;

const NAME: &str = r"[\p{L}\d_-]+";

static HASH_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"#({NAME})(?:=("[^"]*"|'[^']*'|[\p{{L}}\d_-]*))?"#
    ))
    .unwrap()
});

static TAG_LITERAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^#?({NAME})(?:=(.*))?$")).unwrap());

/// A `#name` or `#name=value` label.
///
/// Names are case-insensitive and stored lowercased; values keep their case.
/// An empty value (`#ticket=`) is the same as no value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Tag {
    name: String,
    value: Option<String>,
}

impl Tag {
    pub fn new(name: &str, value: Option<&str>) -> Result<Self, Error> {
        let valid_name = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_alphanumeric() || c == '_' || c == '-');
        if !valid_name {
            return Err(Error::InvalidTag(name.to_string()));
        }
        Ok(Self {
            name: name.to_lowercase(),
            value: value.filter(|v| !v.is_empty()).map(str::to_string),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// The same tag with its value dropped.
    #[must_use]
    pub fn base(&self) -> Self {
        Self {
            name: self.name.clone(),
            value: None,
        }
    }

    /// Whether `candidate` satisfies this tag used as a query.
    ///
    /// A query without value matches the name with any value; a query with a
    /// value only matches that exact value.
    #[must_use]
    pub fn matches(&self, candidate: &Self) -> bool {
        self.name == candidate.name
            && self
                .value
                .as_ref()
                .is_none_or(|v| candidate.value.as_ref() == Some(v))
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.name)?;
        match &self.value {
            None => Ok(()),
            Some(v) if !v.is_empty() && v.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') => {
                write!(f, "={v}")
            }
            Some(v) if v.contains('"') => write!(f, "='{v}'"),
            Some(v) => write!(f, "=\"{v}\""),
        }
    }
}

impl FromStr for Tag {
    type Err = Error;

    /// Parses `project`, `#project`, `#ticket=123` or `#note="two words"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = TAG_LITERAL_RE
            .captures(s)
            .ok_or_else(|| Error::InvalidTag(s.to_string()))?;
        let value = caps.get(2).map(|v| unquote(v.as_str()));
        Self::new(&caps[1], value)
    }
}

canonical_string_conversions!(Tag);

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

/// Extracts every tag mentioned in `text`, deduplicated and sorted.
#[must_use]
pub fn tags_in(text: &str) -> BTreeSet<Tag> {
    HASH_TAG_RE
        .captures_iter(text)
        .map(|caps| Tag {
            name: caps[1].to_lowercase(),
            value: caps
                .get(2)
                .map(|v| unquote(v.as_str()).to_string())
                .filter(|v| !v.is_empty()),
        })
        .collect()
}

/// Whether `tags` satisfies every tag in `query`.
#[must_use]
pub fn satisfies_all(tags: &BTreeSet<Tag>, query: &[Tag]) -> bool {
    query.iter().all(|q| tags.iter().any(|t| q.matches(t)))
}
