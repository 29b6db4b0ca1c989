//! Parsed HTML with selector-based extraction.
//!
//! Scraped sites change their markup without notice and sometimes serve two
//! variants of the same element (a "cold" and a "warm" temperature, a
//! "disabled" precipitation value). A field is therefore described by a
//! [`SelectorRule`]: an ordered list of [`Rule`]s tried until one produces a
//! non-empty value. Running out of rules is an ordinary `None`, not an error.
//!
//! ```
//! use skrapa::html::{HtmlDocument, Rule, SelectorRule};
//!
//! let doc = HtmlDocument::parse(r#"<span class="temp warm">7°</span>"#.as_bytes());
//! let rule = SelectorRule::new(vec![Rule::text(".temp.cold"), Rule::text(".temp.warm")]);
//! assert_eq!(doc.extract(&rule).unwrap().as_deref(), Some("7°"));
//! ```

use itertools::Itertools;
use scraper::{ElementRef, Html, Selector};

use crate::error::SelectorError;

/// One way of locating a value in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    /// CSS selector; the first matching element is used.
    pub locator: &'static str,
    /// Read this attribute instead of the element text.
    pub attribute: Option<&'static str>,
    /// Drop this many leading characters (labels such as "Temperatur").
    pub skip_chars: usize,
    /// Strip surrounding whitespace after skipping.
    pub trim: bool,
}

impl Rule {
    pub const fn text(locator: &'static str) -> Self {
        Self {
            locator,
            attribute: None,
            skip_chars: 0,
            trim: false,
        }
    }

    pub const fn attr(locator: &'static str, attribute: &'static str) -> Self {
        Self {
            locator,
            attribute: Some(attribute),
            skip_chars: 0,
            trim: false,
        }
    }

    pub const fn skip_chars(mut self, n: usize) -> Self {
        self.skip_chars = n;
        self
    }

    pub const fn trimmed(mut self) -> Self {
        self.trim = true;
        self
    }

    fn apply(&self, raw: &str) -> String {
        let skipped: String = raw.chars().skip(self.skip_chars).collect();
        if self.trim {
            skipped.trim().to_string()
        } else {
            skipped
        }
    }
}

/// Ordered fallback chain for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorRule {
    rules: Vec<Rule>,
}

impl SelectorRule {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn single(rule: Rule) -> Self {
        Self { rules: vec![rule] }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

/// A best-effort parse tree. Malformed markup never fails to parse.
pub struct HtmlDocument {
    html: Html,
}

impl std::fmt::Debug for HtmlDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HtmlDocument")
            .field("errors", &self.html.errors.len())
            .finish()
    }
}

impl HtmlDocument {
    /// Parse raw response bytes. Invalid UTF-8 is replaced, not rejected.
    pub fn parse(bytes: &[u8]) -> Self {
        Self::parse_str(&String::from_utf8_lossy(bytes))
    }

    pub fn parse_str(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// Try each rule in order and return the first non-empty value.
    ///
    /// `Ok(None)` means no rule matched. `Err` is reserved for locators the
    /// CSS parser rejects, which is a programming error in the rule set.
    pub fn extract(&self, rule: &SelectorRule) -> Result<Option<String>, SelectorError> {
        for r in rule.rules() {
            let selector = parse_selector(r.locator)?;
            let Some(element) = self.html.select(&selector).next() else {
                continue;
            };
            let raw = match r.attribute {
                Some(name) => match element.value().attr(name) {
                    Some(v) => v.to_string(),
                    None => continue,
                },
                None => node_text(element),
            };
            let value = r.apply(&raw);
            if !value.trim().is_empty() {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    /// All nodes matching `locator`, in document order.
    pub fn find_all(&self, locator: &str) -> Result<Matches<'_>, SelectorError> {
        Ok(Matches {
            html: &self.html,
            selector: parse_selector(locator)?,
        })
    }

    /// Text of every node matching `locator`, concatenated without separator.
    /// Empty when nothing matches.
    pub fn concat_text(&self, locator: &str) -> Result<String, SelectorError> {
        Ok(self.find_all(locator)?.iter().map(node_text).join(""))
    }
}

/// Lazy view over the nodes matching one selector.
///
/// Each call to [`Matches::iter`] walks the document again from the start,
/// so the sequence can be counted and then iterated.
pub struct Matches<'a> {
    html: &'a Html,
    selector: Selector,
}

impl<'a> Matches<'a> {
    pub fn iter(&self) -> impl Iterator<Item = ElementRef<'a>> + '_ {
        self.html.select(&self.selector)
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

/// All descendant text of `node`.
pub fn node_text(node: ElementRef<'_>) -> String {
    node.text().collect()
}

/// `attribute` of the first descendant of `node` matching `locator`.
pub fn child_attr(
    node: ElementRef<'_>,
    locator: &str,
    attribute: &str,
) -> Result<Option<String>, SelectorError> {
    let selector = parse_selector(locator)?;
    Ok(node
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr(attribute))
        .map(str::to_string))
}

fn parse_selector(locator: &str) -> Result<Selector, SelectorError> {
    Selector::parse(locator).map_err(|e| SelectorError {
        locator: locator.to_string(),
        reason: e.to_string(),
    })
}
