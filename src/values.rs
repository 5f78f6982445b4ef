//! Scalar token codec and the delimited list container used by every
//! multi-valued mzTab field.
//!
//! All parse functions here resolve to `None` on malformed input instead of
//! erroring: a single bad cell in a large tab file must not abort decoding of
//! the remaining well-formed rows. Whether an absent value *should* have been
//! present is a validation concern that lives outside this crate.

use std::fmt::Display;
use std::str::FromStr;

/// Delimiter between the fields of one physical line.
pub const TAB: char = '\t';
/// Delimiter for most multi-valued cells.
pub const BAR: char = '|';
/// Delimiter for modification and ambiguity-member lists.
pub const COMMA: char = ',';
/// The literal an absent cell prints as.
pub const NULL: &str = "null";
/// The literal an IEEE NaN prints as.
pub const CALCULATE_ERROR: &str = "NaN";
/// The literal positive infinity prints as.
pub const INFINITY: &str = "INF";

/// The boolean vocabulary of the format: `1` for true, `0` for false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MZBoolean {
    True,
    False,
}

impl MZBoolean {
    pub const fn as_bool(&self) -> bool {
        matches!(self, Self::True)
    }
}

impl From<bool> for MZBoolean {
    fn from(value: bool) -> Self {
        if value {
            Self::True
        } else {
            Self::False
        }
    }
}

impl Display for MZBoolean {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::True => "1",
            Self::False => "0",
        })
    }
}

/// Reliability grade of an identification, `1` (high) through `3` (poor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Reliability {
    High,
    Medium,
    Poor,
}

impl Reliability {
    pub const fn level(&self) -> u8 {
        match self {
            Self::High => 1,
            Self::Medium => 2,
            Self::Poor => 3,
        }
    }
}

impl Display for Reliability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.level())
    }
}

/// A URI cell. Only the shape `scheme ":" rest` is enforced here; anything
/// less is reported as unset rather than failing the row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Uri(String);

impl Uri {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Uri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parse `1`/`0` after trimming. Anything else is absent.
pub fn parse_boolean(token: &str) -> Option<MZBoolean> {
    match token.trim() {
        "1" => Some(MZBoolean::True),
        "0" => Some(MZBoolean::False),
        _ => None,
    }
}

/// Parse a reliability grade, `1`, `2` or `3`.
pub fn parse_reliability(token: &str) -> Option<Reliability> {
    match token.trim() {
        "1" => Some(Reliability::High),
        "2" => Some(Reliability::Medium),
        "3" => Some(Reliability::Poor),
        _ => None,
    }
}

/// Parse an integer literal after trimming.
pub fn parse_integer(token: &str) -> Option<i32> {
    token.trim().parse().ok()
}

/// Parse a double cell. The format reserves three sentinels: `null` for an
/// absent value, `NaN`, and `INF`. `-INF` is accepted as well so that every
/// IEEE value survives a round trip.
pub fn parse_double(token: &str) -> Option<f64> {
    match token.trim() {
        "" | NULL => None,
        CALCULATE_ERROR => Some(f64::NAN),
        INFINITY => Some(f64::INFINITY),
        "-INF" => Some(f64::NEG_INFINITY),
        t => t.parse().ok(),
    }
}

/// The inverse of [`parse_double`].
pub fn print_double(value: Option<f64>) -> String {
    match value {
        None => NULL.to_string(),
        Some(v) if v.is_nan() => CALCULATE_ERROR.to_string(),
        Some(v) if v == f64::INFINITY => INFINITY.to_string(),
        Some(v) if v == f64::NEG_INFINITY => "-INF".to_string(),
        Some(v) => v.to_string(),
    }
}

/// Parse a URI cell. Requires an ALPHA-led scheme followed by `:`.
pub fn parse_uri(token: &str) -> Option<Uri> {
    let token = token.trim();
    let (scheme, rest) = token.split_once(':')?;
    if rest.is_empty() {
        return None;
    }
    let mut chars = scheme.chars();
    let lead = chars.next()?;
    if !lead.is_ascii_alphabetic() {
        return None;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
        return None;
    }
    Some(Uri(token.to_string()))
}

impl FromStr for Uri {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_uri(s).ok_or(())
    }
}

/// Split `text` on `separator`, ignoring separators inside `[...]` spans.
///
/// The format nests parameter tokens, whose internal separator is also a
/// comma, inside comma-delimited lists, so a plain `str::split` would corrupt
/// embedded values. Depth is tracked explicitly instead.
pub fn split_outside_brackets(text: &str, separator: char) -> Vec<&str> {
    let mut depth = 0usize;
    let mut last = 0usize;
    let mut fields = Vec::new();
    for (i, c) in text.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            c if c == separator && depth == 0 => {
                fields.push(&text[last..i]);
                last = i + c.len_utf8();
            }
            _ => {}
        }
    }
    fields.push(&text[last..]);
    fields
}

/// An ordered sequence of values sharing one serialization delimiter.
///
/// Every multi-valued mzTab cell is one of these: search engine lists,
/// retention times, modifications, ambiguity members, spectra references.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SplitList<T> {
    separator: char,
    items: Vec<T>,
}

impl<T> SplitList<T> {
    pub fn new(separator: char) -> Self {
        Self {
            separator,
            items: Vec::new(),
        }
    }

    pub fn bar() -> Self {
        Self::new(BAR)
    }

    pub fn comma() -> Self {
        Self::new(COMMA)
    }

    pub fn from_items(separator: char, items: Vec<T>) -> Self {
        Self { separator, items }
    }

    pub const fn separator(&self) -> char {
        self.separator
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn contains(&self, item: &T) -> bool
    where
        T: PartialEq,
    {
        self.items.contains(item)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T> Default for SplitList<T> {
    /// An empty bar-delimited list, the format's dominant list shape.
    fn default() -> Self {
        Self::new(BAR)
    }
}

impl<T> IntoIterator for SplitList<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a SplitList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: Display> Display for SplitList<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for item in &self.items {
            if !first {
                write!(f, "{}", self.separator)?;
            }
            write!(f, "{item}")?;
            first = false;
        }
        Ok(())
    }
}

/// Parse a delimited cell with a per-item parser. If any single item fails,
/// the whole list resolves to empty: the field as a whole is malformed, and
/// a partially populated list must never escape.
pub fn parse_list_with<T>(
    token: &str,
    separator: char,
    item_parser: impl Fn(&str) -> Option<T>,
) -> SplitList<T> {
    let token = token.trim();
    let mut list = SplitList::new(separator);
    if token.is_empty() || token == NULL {
        return list;
    }
    for part in split_outside_brackets(token, separator) {
        match item_parser(part.trim()) {
            Some(item) => list.push(item),
            None => {
                log::warn!("discarding malformed list cell {token:?}");
                return SplitList::new(separator);
            }
        }
    }
    list
}

/// Parse a bar-delimited list of doubles (retention times, windows).
pub fn parse_double_list(token: &str) -> SplitList<f64> {
    parse_list_with(token, BAR, parse_double)
}

/// Parse a string list with the given delimiter. Items are trimmed; an empty
/// item is malformed.
pub fn parse_string_list(token: &str, separator: char) -> SplitList<String> {
    parse_list_with(token, separator, |t| {
        if t.is_empty() {
            None
        } else {
            Some(t.to_string())
        }
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_boolean() {
        assert_eq!(parse_boolean(" 1 "), Some(MZBoolean::True));
        assert_eq!(parse_boolean("0"), Some(MZBoolean::False));
        assert_eq!(parse_boolean("true"), None);
        assert_eq!(parse_boolean(""), None);
        assert_eq!(MZBoolean::True.to_string(), "1");
    }

    #[test]
    fn test_parse_double_sentinels() {
        assert_eq!(parse_double("null"), None);
        assert_eq!(parse_double("  12.5"), Some(12.5));
        assert!(parse_double("NaN").unwrap().is_nan());
        assert_eq!(parse_double("INF"), Some(f64::INFINITY));
        assert_eq!(parse_double("-INF"), Some(f64::NEG_INFINITY));
        assert_eq!(parse_double("twelve"), None);
    }

    #[test]
    fn test_print_double_round_trip() {
        for d in [
            0.0,
            -1.5,
            1e-12,
            6.022e23,
            f64::INFINITY,
            f64::NEG_INFINITY,
        ] {
            assert_eq!(parse_double(&print_double(Some(d))), Some(d));
        }
        assert!(parse_double(&print_double(Some(f64::NAN))).unwrap().is_nan());
        assert_eq!(print_double(None), "null");
    }

    #[test]
    fn test_parse_uri() {
        assert!(parse_uri("https://www.ebi.ac.uk/pride").is_some());
        assert!(parse_uri("file:/tmp/run1.mzML").is_some());
        assert!(parse_uri("not a uri").is_none());
        assert!(parse_uri("1http://x").is_none());
    }

    #[test]
    fn test_split_outside_brackets() {
        assert_eq!(
            split_outside_brackets("a|b|c", '|'),
            vec!["a", "b", "c"]
        );
        // Commas inside a parameter token must not split the list
        assert_eq!(
            split_outside_brackets(
                "3-MOD:00412,8-[MS,MS:1000035,oxidation,]-MOD:00425",
                ','
            ),
            vec!["3-MOD:00412", "8-[MS,MS:1000035,oxidation,]-MOD:00425"]
        );
        assert_eq!(split_outside_brackets("", ','), vec![""]);
    }

    #[test]
    fn test_list_atomic_failure() {
        let ok = parse_double_list("10.2|11.5|13.0");
        assert_eq!(ok.len(), 3);
        assert_eq!(ok.get(1), Some(&11.5));

        // one bad item poisons the whole cell
        let bad = parse_double_list("10.2|eleven|13.0");
        assert!(bad.is_empty());

        assert!(parse_double_list("null").is_empty());
    }

    #[test]
    fn test_list_display() {
        let mut list = SplitList::bar();
        list.push(10.2);
        list.push(11.5);
        assert_eq!(list.to_string(), "10.2|11.5");
        assert_eq!(SplitList::<f64>::bar().to_string(), "");
    }
}
