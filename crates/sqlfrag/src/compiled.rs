//! Compiled SQL text with opaque placeholder markers.
//!
//! Fragments compile to a [`Compiled`] value: a sequence of raw text pieces
//! and [`SqlPart::Param`] markers. A placeholder is never a `?` character in
//! the middle of a string, so text coming from identifiers or quoted literals
//! can't be mistaken for a placeholder when the final SQL is rendered.
//!
//! The only way a `?` becomes a marker is [`Compiled::from_sql`], used for raw
//! fragments whose `?` characters are bound placeholders by contract.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};

/// How placeholders are spelled in rendered SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderStyle {
    /// `?` (SQLite, MySQL)
    #[default]
    Question,
    /// `$1, $2, ...` (PostgreSQL)
    Dollar,
    /// `:1, :2, ...` (Oracle)
    Colon,
    /// `@p1, @p2, ...` (SQL Server)
    AtP,
}

impl PlaceholderStyle {
    /// Append the marker for the 1-based placeholder `idx`.
    fn write_marker(self, out: &mut String, idx: usize) {
        // Writing into a String cannot fail.
        let _ = match self {
            PlaceholderStyle::Question => {
                out.push('?');
                Ok(())
            }
            PlaceholderStyle::Dollar => write!(out, "${idx}"),
            PlaceholderStyle::Colon => write!(out, ":{idx}"),
            PlaceholderStyle::AtP => write!(out, "@p{idx}"),
        };
    }

    fn marker_len(self, idx: usize) -> usize {
        let digits = (idx.max(1).ilog10() as usize) + 1;
        match self {
            PlaceholderStyle::Question => 1,
            PlaceholderStyle::Dollar | PlaceholderStyle::Colon => 1 + digits,
            PlaceholderStyle::AtP => 2 + digits,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlPart {
    Raw(String),
    Param,
}

/// Rendered SQL with structural placeholder markers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compiled {
    parts: Vec<SqlPart>,
}

impl Compiled {
    pub fn new() -> Self {
        Self { parts: Vec::new() }
    }

    /// Literal text. `?` characters stay literal.
    pub fn text(s: impl Into<String>) -> Self {
        let s = s.into();
        let mut c = Self::new();
        if !s.is_empty() {
            c.parts.push(SqlPart::Raw(s));
        }
        c
    }

    /// Raw SQL in which every `?` is a placeholder.
    pub fn from_sql(sql: &str) -> Self {
        let mut c = Self::new();
        let mut rest = sql;
        while let Some(pos) = rest.find('?') {
            c.push_str(&rest[..pos]);
            c.push_param();
            rest = &rest[pos + 1..];
        }
        c.push_str(rest);
        c
    }

    /// Append literal text.
    pub fn push_str(&mut self, s: &str) -> &mut Self {
        if s.is_empty() {
            return self;
        }
        match self.parts.last_mut() {
            Some(SqlPart::Raw(last)) => last.push_str(s),
            _ => self.parts.push(SqlPart::Raw(s.to_string())),
        }
        self
    }

    /// Append one placeholder marker.
    pub fn push_param(&mut self) -> &mut Self {
        self.parts.push(SqlPart::Param);
        self
    }

    /// Append another compiled piece.
    pub fn append(&mut self, other: &Compiled) -> &mut Self {
        for part in &other.parts {
            match part {
                SqlPart::Raw(s) => {
                    self.push_str(s);
                }
                SqlPart::Param => {
                    self.push_param();
                }
            }
        }
        self
    }

    pub fn parts(&self) -> &[SqlPart] {
        &self.parts
    }

    /// True when there is neither text nor any placeholder.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Number of placeholder markers.
    pub fn param_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|p| matches!(p, SqlPart::Param))
            .count()
    }

    /// True when the text ends in whitespace (or is empty).
    pub(crate) fn ends_with_whitespace(&self) -> bool {
        match self.parts.last() {
            None => true,
            Some(SqlPart::Raw(s)) => s.ends_with(char::is_whitespace),
            Some(SqlPart::Param) => false,
        }
    }

    /// Strip trailing whitespace.
    pub(crate) fn trim_end(&mut self) {
        while let Some(SqlPart::Raw(last)) = self.parts.last_mut() {
            let trimmed = last.trim_end().len();
            last.truncate(trimmed);
            if last.is_empty() {
                self.parts.pop();
            } else {
                break;
            }
        }
    }

    /// Render SQL text, spelling placeholders in the given style and
    /// numbering them in order of appearance.
    pub fn render(&self, style: PlaceholderStyle) -> String {
        // Pre-size to avoid repeated reallocations (hot path).
        let mut idx = 0;
        let mut cap = 0;
        for part in &self.parts {
            match part {
                SqlPart::Raw(s) => cap += s.len(),
                SqlPart::Param => {
                    idx += 1;
                    cap += style.marker_len(idx);
                }
            }
        }

        let mut out = String::with_capacity(cap);
        idx = 0;
        for part in &self.parts {
            match part {
                SqlPart::Raw(s) => out.push_str(s),
                SqlPart::Param => {
                    idx += 1;
                    style.write_marker(&mut out, idx);
                }
            }
        }
        out
    }
}

impl fmt::Display for Compiled {
    /// Renders with generic `?` markers.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.parts {
            match part {
                SqlPart::Raw(s) => f.write_str(s)?,
                SqlPart::Param => f.write_char('?')?,
            }
        }
        Ok(())
    }
}

/// Renumber generic `?` markers in an already rendered string.
///
/// This is a plain character scan: every `?` is treated as a placeholder.
/// Prefer [`Compiled::render`], which can't confuse literal text with markers.
pub fn rewrite_placeholders(sql: &str, style: PlaceholderStyle) -> String {
    if style == PlaceholderStyle::Question {
        return sql.to_string();
    }
    Compiled::from_sql(sql).render(style)
}
