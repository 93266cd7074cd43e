//! Named-slot layout strings.
//!
//! A layout is plain text with three constructs:
//!
//! - `{name}`: a slot, replaced by the compiled child of that name
//!   (empty when the child is absent);
//! - `[ ... ]`: an optional group, emitted only when every slot inside is
//!   non-empty;
//! - `[ ... | ... ]`: an optional group with an alternative, emitted when
//!   the first branch isn't.
//!
//! `{{`, `}}`, `[[`, `]]` and `||` escape the literal characters.
//!
//! Whitespace in layout text is collapsed to single spaces and never doubled
//! up against the end of the output, so empty slots don't leave gaps. Slot
//! content is copied verbatim.

use crate::compiled::Compiled;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Text(String),
    Slot(String),
    Optional { then: Vec<Node>, otherwise: Vec<Node> },
}

/// A parsed layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    name: &'static str,
    nodes: Vec<Node>,
}

/// Slot values for one render.
pub type Slots<'a> = [(&'static str, &'a Compiled)];

impl Layout {
    /// Parse `source`, accepting only the slot names in `allowed`.
    pub fn parse(name: &'static str, source: &str, allowed: &[&str]) -> Result<Self> {
        let mut parser = Parser {
            name,
            chars: source.chars().collect(),
            pos: 0,
            allowed,
        };
        let nodes = parser.nodes(0)?;
        if parser.pos < parser.chars.len() {
            return Err(Error::layout(name, format!("unexpected '{}'", parser.chars[parser.pos])));
        }
        Ok(Self { name, nodes })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the layout references `slot` anywhere.
    pub fn uses(&self, slot: &str) -> bool {
        fn walk(nodes: &[Node], slot: &str) -> bool {
            nodes.iter().any(|n| match n {
                Node::Slot(s) => s == slot,
                Node::Optional { then, otherwise } => walk(then, slot) || walk(otherwise, slot),
                Node::Text(_) => false,
            })
        }
        walk(&self.nodes, slot)
    }

    /// Interpolate the slots.
    pub fn render(&self, slots: &Slots<'_>) -> Compiled {
        let mut out = Compiled::new();
        render_nodes(&self.nodes, slots, &mut out);
        out.trim_end();
        out
    }
}

fn lookup<'a>(slots: &Slots<'a>, name: &str) -> Option<&'a Compiled> {
    slots
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, c)| *c)
        .filter(|c| !c.is_empty())
}

fn all_present(nodes: &[Node], slots: &Slots<'_>) -> bool {
    nodes.iter().all(|n| match n {
        Node::Slot(name) => lookup(slots, name).is_some(),
        Node::Optional { .. } | Node::Text(_) => true,
    })
}

fn render_nodes(nodes: &[Node], slots: &Slots<'_>, out: &mut Compiled) {
    for node in nodes {
        match node {
            Node::Text(text) => push_layout_text(out, text),
            Node::Slot(name) => {
                if let Some(c) = lookup(slots, name) {
                    out.append(c);
                }
            }
            Node::Optional { then, otherwise } => {
                if all_present(then, slots) {
                    render_nodes(then, slots, out);
                } else {
                    render_nodes(otherwise, slots, out);
                }
            }
        }
    }
}

fn push_layout_text(out: &mut Compiled, text: &str) {
    let mut collapsed = String::with_capacity(text.len());
    let mut in_space = out.ends_with_whitespace();
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_space {
                collapsed.push(' ');
                in_space = true;
            }
        } else {
            collapsed.push(ch);
            in_space = false;
        }
    }
    out.push_str(&collapsed);
}

struct Parser<'a> {
    name: &'static str,
    chars: Vec<char>,
    pos: usize,
    allowed: &'a [&'a str],
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek2(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    /// Parse until end of input, or `]` / `|` when nested.
    fn nodes(&mut self, depth: usize) -> Result<Vec<Node>> {
        let mut nodes = Vec::new();
        let mut text = String::new();

        while let Some(ch) = self.peek() {
            match ch {
                '{' | '}' | '[' | ']' | '|' if self.peek2() == Some(ch) => {
                    text.push(ch);
                    self.pos += 2;
                }
                '{' => {
                    flush(&mut text, &mut nodes);
                    nodes.push(self.slot()?);
                }
                '[' => {
                    flush(&mut text, &mut nodes);
                    nodes.push(self.optional(depth)?);
                }
                ']' | '|' if depth > 0 => break,
                ']' | '}' | '|' => {
                    return Err(Error::layout(self.name, format!("unbalanced '{ch}'")));
                }
                _ => {
                    text.push(ch);
                    self.pos += 1;
                }
            }
        }
        flush(&mut text, &mut nodes);
        Ok(nodes)
    }

    fn slot(&mut self) -> Result<Node> {
        self.pos += 1; // '{'
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch == '}' {
                let name: String = self.chars[start..self.pos].iter().collect();
                self.pos += 1;
                let name = name.trim().to_string();
                if !self.allowed.contains(&name.as_str()) {
                    return Err(Error::layout(
                        self.name,
                        format!("unknown slot '{{{name}}}' (expected one of: {})", self.allowed.join(", ")),
                    ));
                }
                return Ok(Node::Slot(name));
            }
            self.pos += 1;
        }
        Err(Error::layout(self.name, "unclosed '{'"))
    }

    fn optional(&mut self, depth: usize) -> Result<Node> {
        self.pos += 1; // '['
        let then = self.nodes(depth + 1)?;
        let otherwise = if self.peek() == Some('|') {
            self.pos += 1;
            self.nodes(depth + 1)?
        } else {
            Vec::new()
        };
        if self.peek() != Some(']') {
            return Err(Error::layout(self.name, "unclosed '['"));
        }
        self.pos += 1;
        Ok(Node::Optional { then, otherwise })
    }
}

fn flush(text: &mut String, nodes: &mut Vec<Node>) {
    if !text.is_empty() {
        nodes.push(Node::Text(std::mem::take(text)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(src: &str) -> Layout {
        Layout::parse("test", src, &["a", "b", "table", "where"]).unwrap()
    }

    #[test]
    fn plain_slots() {
        let a = Compiled::text("x");
        let b = Compiled::from_sql("? + 1");
        let out = layout("{a} = {b}").render(&[("a", &a), ("b", &b)]);
        assert_eq!(out.to_string(), "x = ? + 1");
        assert_eq!(out.param_count(), 1);
    }

    #[test]
    fn empty_slots_leave_no_gaps() {
        let t = Compiled::text("\"users\"");
        let out = layout("SELECT * FROM {table}   {where}  {a}").render(&[("table", &t)]);
        assert_eq!(out.to_string(), "SELECT * FROM \"users\"");
    }

    #[test]
    fn optional_group_requires_its_slots() {
        let l = layout("SELECT 1[ WHERE {where}]");
        let w = Compiled::text("x");
        assert_eq!(l.render(&[]).to_string(), "SELECT 1");
        assert_eq!(l.render(&[("where", &w)]).to_string(), "SELECT 1 WHERE x");
    }

    #[test]
    fn optional_group_alternative() {
        let l = layout("INSERT INTO {table} [VALUES {a}|DEFAULT VALUES]");
        let t = Compiled::text("t");
        let v = Compiled::from_sql("(?)");
        assert_eq!(l.render(&[("table", &t)]).to_string(), "INSERT INTO t DEFAULT VALUES");
        assert_eq!(
            l.render(&[("table", &t), ("a", &v)]).to_string(),
            "INSERT INTO t VALUES (?)"
        );
    }

    #[test]
    fn slot_content_whitespace_is_verbatim() {
        let a = Compiled::text("'a  b'");
        assert_eq!(layout("x = {a}").render(&[("a", &a)]).to_string(), "x = 'a  b'");
    }

    #[test]
    fn escapes() {
        let a = Compiled::text("v");
        let out = layout("{{{a}}} [[x]] a || b").render(&[("a", &a)]);
        assert_eq!(out.to_string(), "{v} [x] a | b");
    }

    #[test]
    fn rejects_unknown_slot() {
        let err = Layout::parse("select", "SELECT {colums}", &["columns"]).unwrap_err();
        assert!(err.to_string().contains("colums"));
    }

    #[test]
    fn rejects_unbalanced() {
        assert!(Layout::parse("x", "[{a}", &["a"]).is_err());
        assert!(Layout::parse("x", "{a", &["a"]).is_err());
        assert!(Layout::parse("x", "a]", &["a"]).is_err());
    }

    #[test]
    fn uses_reports_nested_slots() {
        let l = layout("x[ {a}|{b}]");
        assert!(l.uses("a"));
        assert!(l.uses("b"));
        assert!(!l.uses("table"));
    }
}
