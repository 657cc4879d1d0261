//! Minimal placeholder templates for page headers and footers.
//!
//! Supported syntax:
//! - `{{NAME}}` substitutes a variable (missing variables become empty)
//! - `{{#if NAME}}...{{/if}}` keeps its content only when `NAME` is set and
//!   non-empty
//! - `<!-- ... -->` comments are stripped from the output

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

static CONDITIONAL_REGEX: OnceLock<Regex> = OnceLock::new();
static VARIABLE_REGEX: OnceLock<Regex> = OnceLock::new();
static COMMENT_REGEX: OnceLock<Regex> = OnceLock::new();

fn conditional_regex() -> &'static Regex {
    CONDITIONAL_REGEX.get_or_init(|| {
        Regex::new(r"(?s)\{\{#if\s+(?P<name>[A-Za-z0-9_]+)\}\}(?P<body>.*?)\{\{/if\}\}").unwrap()
    })
}

fn variable_regex() -> &'static Regex {
    VARIABLE_REGEX.get_or_init(|| Regex::new(r"\{\{(?P<name>[A-Za-z0-9_]+)\}\}").unwrap())
}

fn comment_regex() -> &'static Regex {
    COMMENT_REGEX.get_or_init(|| Regex::new(r"(?s)<!--.*?-->").unwrap())
}

/// Variables available to a template
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateVars {
    values: BTreeMap<String, String>,
}

impl TemplateVars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `NAME=value` command-line assignments.
    ///
    /// Each argument is split at its first `=`; later assignments of the same
    /// name win. Arguments without `=` are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use wikiprep_core::TemplateVars;
    ///
    /// let vars = TemplateVars::from_assignments(["TITLE=My Book", "URL=a=b", "stray"]);
    /// assert_eq!(vars.get("TITLE"), Some("My Book"));
    /// assert_eq!(vars.get("URL"), Some("a=b"));
    /// assert_eq!(vars.len(), 2);
    /// ```
    pub fn from_assignments<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vars = Self::new();
        for arg in args {
            if let Some((key, value)) = arg.as_ref().split_once('=') {
                vars.insert(key, value);
            }
        }
        vars
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.values.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// True when the variable is present and non-empty
    pub fn is_truthy(&self, name: &str) -> bool {
        self.get(name).is_some_and(|value| !value.is_empty())
    }

    /// Merge `other` into `self`; values from `other` win
    pub fn extend(&mut self, other: TemplateVars) {
        self.values.extend(other.values);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for TemplateVars
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut vars = Self::new();
        for (name, value) in iter {
            vars.insert(name, value);
        }
        vars
    }
}

/// Render a template against `vars`.
///
/// Conditionals are evaluated first, then variables are substituted, then
/// comments are stripped. Conditionals do not nest: the first `{{/if}}`
/// closes the open block. Unclosed tags and malformed comments are kept as
/// literal text.
///
/// # Examples
///
/// ```
/// use wikiprep_core::{process_template, TemplateVars};
///
/// let vars: TemplateVars = [("TITLE", "Hello World")].into_iter().collect();
/// assert_eq!(process_template("<p>{{TITLE}}</p>", &vars), "<p>Hello World</p>");
/// assert_eq!(
///     process_template("{{#if URL}}<a href='{{URL}}'>Link</a>{{/if}}", &vars),
///     ""
/// );
/// ```
pub fn process_template(template: &str, vars: &TemplateVars) -> String {
    let conditionals = conditional_regex().replace_all(template, |caps: &Captures| {
        if vars.is_truthy(&caps["name"]) {
            caps["body"].to_string()
        } else {
            String::new()
        }
    });

    let substituted = variable_regex().replace_all(&conditionals, |caps: &Captures| {
        vars.get(&caps["name"]).unwrap_or_default().to_string()
    });

    comment_regex().replace_all(&substituted, "").into_owned()
}
