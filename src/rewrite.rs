//! Pattern based rewriting of input paths into run directory locations.
//!
//! A [`PathRewriteRule`] is a compiled regex plus a replacement template.
//! The helper constructors build patterns that capture the pieces of a path
//! a template usually needs:
//!
//! | group    | captures                                              |
//! |----------|-------------------------------------------------------|
//! | `parent` | everything before the matched segment, with trailing `/` |
//! | `name`   | the whole matched segment                             |
//! | `match`  | the part of the segment equal to the search fragment  |
//! | `pre`    | segment text before `match` (right aligned, free)     |
//! | `post`   | segment text after `match` (left aligned, free)       |
//! | `child`  | the path below a matched directory (directory rules)  |
//!
//! Templates reference groups as `${name}`.

use crate::error::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// How a search fragment must line up with a path segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameMatch {
    /// The segment is exactly the fragment
    Exact,
    /// The segment starts with the fragment
    LeftAligned,
    /// The segment ends with the fragment
    RightAligned,
    /// The fragment appears anywhere in the segment
    #[default]
    Free,
}

impl NameMatch {
    /// Regex for one path segment containing `fragment` under this mode
    fn segment_pattern(self, fragment: &str) -> String {
        match self {
            Self::Exact => format!("(?P<match>{fragment})"),
            Self::LeftAligned => format!("(?P<match>{fragment})(?P<post>[^/]*?)"),
            Self::RightAligned => format!("(?P<pre>[^/]*?)(?P<match>{fragment})"),
            Self::Free => format!("(?P<pre>[^/]*?)(?P<match>{fragment})(?P<post>[^/]*?)"),
        }
    }
}

impl fmt::Display for NameMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Exact => "exact",
            Self::LeftAligned => "left_aligned",
            Self::RightAligned => "right_aligned",
            Self::Free => "free",
        };
        f.write_str(name)
    }
}

/// A search pattern and the replacement applied to paths it matches
#[derive(Debug, Clone)]
pub struct PathRewriteRule {
    /// Compiled search pattern
    pattern: Regex,
    /// Replacement template
    replacement: String,
}

impl PathRewriteRule {
    /// Compile a rule from a raw pattern
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::RegistryError::InvalidPattern`] if the pattern
    /// does not compile.
    pub fn new(pattern: &str, replacement: impl Into<String>) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            replacement: replacement.into(),
        })
    }

    /// Rule matching the final path segment against `name`
    ///
    /// `name` is a regex fragment; escape it with [`regex::escape`] to match
    /// a literal.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting pattern does not compile.
    pub fn from_filename(name: &str, replacement: impl Into<String>, mode: NameMatch) -> Result<Self> {
        let pattern = format!(
            "^(?P<parent>.*?/)?(?P<name>{})$",
            mode.segment_pattern(name)
        );
        Self::new(&pattern, replacement)
    }

    /// Rule matching an intermediate directory segment against `name`
    ///
    /// The directory must be followed by at least one more segment, which is
    /// captured as `child` including its leading `/`.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting pattern does not compile.
    pub fn from_dirname(name: &str, replacement: impl Into<String>, mode: NameMatch) -> Result<Self> {
        let pattern = format!(
            "^(?P<parent>.*?/)?(?P<name>{})(?P<child>/.+)$",
            mode.segment_pattern(name)
        );
        Self::new(&pattern, replacement)
    }

    /// Rewrite `path`, or return it unchanged when the pattern does not match
    ///
    /// A match whose substitution reproduces the input is indistinguishable
    /// from no match at all.
    #[must_use]
    pub fn apply<'a>(&self, path: &'a str) -> Cow<'a, str> {
        self.pattern.replace(path, self.replacement.as_str())
    }

    /// Source text of the search pattern
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Replacement template as given
    #[must_use]
    pub fn replacement(&self) -> &str {
        &self.replacement
    }
}
