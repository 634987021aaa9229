//! Ant-style path patterns.

use regex::Regex;

use gatehouse_core::error::AppError;

/// A compiled path pattern.
///
/// `*` and `?` never cross a `/`; `**` as a whole segment spans zero or
/// more segments. Patterns compile to an anchored regular expression.
#[derive(Debug, Clone)]
pub struct PathMatcher {
    source: String,
    regex: Regex,
}

impl PathMatcher {
    /// Compiles `pattern`.
    pub fn new(pattern: &str) -> Result<Self, AppError> {
        let Some(rest) = pattern.strip_prefix('/') else {
            return Err(AppError::configuration(format!(
                "Path pattern '{pattern}' must start with '/'"
            )));
        };

        let mut expr = String::from("^");
        for segment in rest.split('/') {
            if segment == "**" {
                expr.push_str("(?:/[^/]*)*");
                continue;
            }
            if segment.contains("**") {
                return Err(AppError::configuration(format!(
                    "Path pattern '{pattern}': '**' must be a whole segment"
                )));
            }

            expr.push('/');
            for c in segment.chars() {
                match c {
                    '*' => expr.push_str("[^/]*"),
                    '?' => expr.push_str("[^/]"),
                    other => expr.push_str(&regex::escape(&other.to_string())),
                }
            }
        }
        expr.push('$');

        let regex = Regex::new(&expr).map_err(|e| {
            AppError::configuration(format!("Invalid path pattern '{pattern}': {e}"))
        })?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// Compiles every pattern in `patterns`.
    pub fn compile_all<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<Self>, AppError> {
        patterns.iter().map(|p| Self::new(p.as_ref())).collect()
    }

    /// Whether `path` matches. Paths with dot segments never match.
    pub fn matches(&self, path: &str) -> bool {
        is_normalized(path) && self.regex.is_match(path)
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// Whether `path` is absolute and free of `.`/`..` segments and empty
/// inner segments.
pub fn is_normalized(path: &str) -> bool {
    let Some(rest) = path.strip_prefix('/') else {
        return false;
    };
    if rest.is_empty() {
        return true;
    }

    let segments: Vec<&str> = rest.split('/').collect();
    let last = segments.len() - 1;
    segments.iter().enumerate().all(|(i, segment)| {
        *segment != "." && *segment != ".." && (!segment.is_empty() || i == last)
    })
}
