#![forbid(unsafe_code)]

//! CSS selector subset used by the page script.
//!
//! Supported grammar:
//!
//! - type (`div`), universal (`*`), id (`#navMenu`), class (`.ass-list__ass`)
//! - attribute presence (`[data-script]`) and equality (`[data-script="x"]`,
//!   single, double or no quotes)
//! - compound steps (`div.item[data-x]`)
//! - descendant (whitespace) and child (`>`) combinators
//! - selector groups (`a, b`)
//!
//! Pseudo-classes, sibling combinators and substring attribute operators are
//! rejected with [`DomError::InvalidSelector`].

use crate::DomError;
use crate::document::{Document, NodeId};

/// A parsed selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    groups: Vec<Vec<SelectorPart>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrCondition {
    Exists { name: String },
    Equals { name: String, value: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    universal: bool,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrCondition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SelectorPart {
    compound: Compound,
    // Relation to the part on the left.
    combinator: Option<Combinator>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Compound(String),
    Child,
}

impl Selector {
    /// Parse `source` into a selector.
    pub fn parse(source: &str) -> Result<Self, DomError> {
        let invalid = || DomError::InvalidSelector(source.to_owned());
        let mut groups = Vec::new();
        for group in split_groups(source).ok_or_else(invalid)? {
            groups.push(parse_chain(group).ok_or_else(invalid)?);
        }
        if groups.is_empty() {
            return Err(invalid());
        }
        Ok(Self {
            source: source.to_owned(),
            groups,
        })
    }

    /// Whether `node` matches any group of this selector.
    pub(crate) fn matches(&self, doc: &Document, node: NodeId) -> bool {
        self.groups
            .iter()
            .any(|chain| matches_chain(doc, node, chain))
    }
}

impl core::str::FromStr for Selector {
    type Err = DomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl core::fmt::Display for Selector {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.source)
    }
}

fn matches_chain(doc: &Document, node: NodeId, chain: &[SelectorPart]) -> bool {
    let Some((last, rest)) = chain.split_last() else {
        return false;
    };
    if !last.compound.matches(doc, node) {
        return false;
    }
    if rest.is_empty() {
        return true;
    }
    match last.combinator.unwrap_or(Combinator::Descendant) {
        Combinator::Child => doc
            .parent_of(node)
            .is_some_and(|parent| matches_chain(doc, parent, rest)),
        Combinator::Descendant => {
            let mut cursor = doc.parent_of(node);
            while let Some(ancestor) = cursor {
                if matches_chain(doc, ancestor, rest) {
                    return true;
                }
                cursor = doc.parent_of(ancestor);
            }
            false
        }
    }
}

impl Compound {
    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let Some(element) = doc.element(node) else {
            return false;
        };
        if let Some(tag) = &self.tag {
            if element.tag != *tag {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if element.id.as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| element.classes.contains(c)) {
            return false;
        }
        self.attrs.iter().all(|cond| match cond {
            AttrCondition::Exists { name } => element.attribute(name).is_some(),
            AttrCondition::Equals { name, value } => {
                element.attribute(name).as_deref() == Some(value.as_str())
            }
        })
    }
}

fn split_groups(source: &str) -> Option<Vec<&str>> {
    let mut groups = Vec::new();
    let mut start = 0;
    let mut in_brackets = false;
    let mut quote: Option<char> = None;
    for (idx, ch) in source.char_indices() {
        if let Some(q) = quote {
            if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' if in_brackets => quote = Some(ch),
            '[' => in_brackets = true,
            ']' => in_brackets = false,
            ',' if !in_brackets => {
                groups.push(source[start..idx].trim());
                start = idx + 1;
            }
            _ => {}
        }
    }
    groups.push(source[start..].trim());
    if groups.iter().any(|g| g.is_empty()) {
        return None;
    }
    Some(groups)
}

fn tokenize(group: &str) -> Option<Vec<Token>> {
    fn flush(current: &mut String, tokens: &mut Vec<Token>) {
        if !current.is_empty() {
            tokens.push(Token::Compound(core::mem::take(current)));
        }
    }

    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_brackets = false;
    let mut quote: Option<char> = None;
    for ch in group.chars() {
        if let Some(q) = quote {
            current.push(ch);
            if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' if in_brackets => {
                quote = Some(ch);
                current.push(ch);
            }
            '[' => {
                if in_brackets {
                    return None;
                }
                in_brackets = true;
                current.push(ch);
            }
            ']' => {
                if !in_brackets {
                    return None;
                }
                in_brackets = false;
                current.push(ch);
            }
            c if in_brackets => current.push(c),
            '>' => {
                flush(&mut current, &mut tokens);
                tokens.push(Token::Child);
            }
            c if c.is_whitespace() => flush(&mut current, &mut tokens),
            c => current.push(c),
        }
    }
    if in_brackets || quote.is_some() {
        return None;
    }
    flush(&mut current, &mut tokens);
    Some(tokens)
}

fn parse_chain(group: &str) -> Option<Vec<SelectorPart>> {
    let mut parts: Vec<SelectorPart> = Vec::new();
    let mut pending: Option<Combinator> = None;
    for token in tokenize(group)? {
        match token {
            Token::Child => {
                if pending.is_some() || parts.is_empty() {
                    return None;
                }
                pending = Some(Combinator::Child);
            }
            Token::Compound(text) => {
                let compound = parse_compound(&text)?;
                let combinator = if parts.is_empty() {
                    None
                } else {
                    Some(pending.take().unwrap_or(Combinator::Descendant))
                };
                parts.push(SelectorPart {
                    compound,
                    combinator,
                });
            }
        }
    }
    if parts.is_empty() || pending.is_some() {
        return None;
    }
    Some(parts)
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

fn read_ident(chars: &[char], start: usize) -> Option<(String, usize)> {
    let mut end = start;
    while end < chars.len() && is_ident_char(chars[end]) {
        end += 1;
    }
    (end > start).then(|| (chars[start..end].iter().collect(), end))
}

fn parse_compound(text: &str) -> Option<Compound> {
    let chars: Vec<char> = text.chars().collect();
    let mut compound = Compound::default();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => {
                if i != 0 {
                    return None;
                }
                compound.universal = true;
                i += 1;
            }
            '#' => {
                let (id, next) = read_ident(&chars, i + 1)?;
                if compound.id.replace(id).is_some() {
                    return None;
                }
                i = next;
            }
            '.' => {
                let (class, next) = read_ident(&chars, i + 1)?;
                compound.classes.push(class);
                i = next;
            }
            '[' => {
                let close = find_attr_close(&chars, i)?;
                let inner: String = chars[i + 1..close].iter().collect();
                compound.attrs.push(parse_attr_condition(&inner)?);
                i = close + 1;
            }
            _ => {
                if i != 0 {
                    return None;
                }
                let (tag, next) = read_ident(&chars, i)?;
                compound.tag = Some(tag.to_ascii_lowercase());
                i = next;
            }
        }
    }
    Some(compound)
}

fn find_attr_close(chars: &[char], open: usize) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (offset, &ch) in chars[open + 1..].iter().enumerate() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => {}
            None if ch == '"' || ch == '\'' => quote = Some(ch),
            None if ch == ']' => return Some(open + 1 + offset),
            None => {}
        }
    }
    None
}

fn parse_attr_condition(inner: &str) -> Option<AttrCondition> {
    let (name, value) = match inner.split_once('=') {
        Some((name, value)) => (name.trim(), Some(value.trim())),
        None => (inner.trim(), None),
    };
    let name_chars: Vec<char> = name.chars().collect();
    let (ident, end) = read_ident(&name_chars, 0)?;
    if end != name_chars.len() {
        return None;
    }
    let Some(raw) = value else {
        return Some(AttrCondition::Exists { name: ident });
    };
    let value = match raw.chars().next() {
        Some(q @ ('"' | '\'')) => {
            let body = raw.strip_prefix(q)?.strip_suffix(q)?;
            if body.contains(q) {
                return None;
            }
            body.to_owned()
        }
        Some(_) => {
            let value_chars: Vec<char> = raw.chars().collect();
            let (value, end) = read_ident(&value_chars, 0)?;
            if end != value_chars.len() {
                return None;
            }
            value
        }
        None => return None,
    };
    Some(AttrCondition::Equals { name: ident, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ElementSpec;

    fn page() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let body = doc.body();
        let nav = doc
            .append(body, ElementSpec::new("nav").id("navMenu").class("nav__menu"))
            .unwrap();
        let list = doc
            .append(body, ElementSpec::new("section").class("ass-list"))
            .unwrap();
        let item = doc
            .append(
                list,
                ElementSpec::new("div")
                    .class("ass-list__ass")
                    .attr("data-student-name", "Anna"),
            )
            .unwrap();
        (doc, nav, list, item)
    }

    #[test]
    fn parses_supported_forms() {
        for source in [
            "#navMenu",
            ".ass-list__ass",
            "div",
            "*",
            "div.a.b",
            "[data-script]",
            "[data-script=\"filterStudents\"]",
            "[data-script='filterStudents']",
            "[data-script=filterStudents]",
            "section > div",
            "section div",
            "#a, .b",
            "input[ type = \"text\" ]",
        ] {
            assert!(Selector::parse(source).is_ok(), "{source} should parse");
        }
    }

    #[test]
    fn rejects_unsupported_forms() {
        for source in [
            "",
            "  ",
            "a,",
            "> a",
            "a >",
            "a > > b",
            "a:hover",
            "a + b",
            "a ~ b",
            "[data",
            "data]",
            "[a^=b]",
            "[a=\"b]",
            "#",
            ".",
            "#a#b",
            "div*",
        ] {
            assert!(
                matches!(Selector::parse(source), Err(DomError::InvalidSelector(_))),
                "{source:?} should be rejected"
            );
        }
    }

    #[test]
    fn matches_compound_and_combinators() {
        let (doc, nav, list, item) = page();
        let sel = |s: &str| Selector::parse(s).unwrap();

        assert!(sel("#navMenu").matches(&doc, nav));
        assert!(sel("nav.nav__menu").matches(&doc, nav));
        assert!(!sel("div#navMenu").matches(&doc, nav));
        assert!(sel("[data-student-name]").matches(&doc, item));
        assert!(sel("[data-student-name=\"Anna\"]").matches(&doc, item));
        assert!(!sel("[data-student-name=\"anna\"]").matches(&doc, item));
        assert!(sel("section > .ass-list__ass").matches(&doc, item));
        assert!(sel("body .ass-list__ass").matches(&doc, item));
        assert!(!sel("body > .ass-list__ass").matches(&doc, item));
        assert!(sel("nav, section").matches(&doc, list));
        assert!(sel("*").matches(&doc, list));
    }

    #[test]
    fn class_and_id_attributes_are_matchable() {
        let (doc, nav, _, _) = page();
        assert!(Selector::parse("[id=navMenu]").unwrap().matches(&doc, nav));
        assert!(Selector::parse("[class]").unwrap().matches(&doc, nav));
    }
}
