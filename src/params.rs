//! The `[CV label, accession, name, value]` parameter type and its
//! publication cousin.

use std::fmt::Display;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::values::{parse_list_with, SplitList, BAR};

#[derive(Debug, Error)]
pub enum ParamError {
    #[error("A parameter name may not be empty")]
    EmptyName,
    #[error("{0:?} is not a [label,accession,name,value] parameter")]
    Malformed(String),
}

/// A single mzTab parameter: either a term drawn from a controlled
/// vocabulary or a free-text user parameter. Immutable once constructed;
/// the name is always non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Param {
    CV {
        cv_label: String,
        accession: String,
        name: String,
        value: String,
    },
    User {
        name: String,
        value: String,
    },
}

impl Param {
    /// A controlled-vocabulary parameter. The name must be non-empty.
    pub fn cv(
        cv_label: impl Into<String>,
        accession: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, ParamError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ParamError::EmptyName);
        }
        Ok(Self::CV {
            cv_label: cv_label.into(),
            accession: accession.into(),
            name,
            value: value.into(),
        })
    }

    /// A free-text parameter with no vocabulary binding.
    pub fn user(name: impl Into<String>, value: impl Into<String>) -> Result<Self, ParamError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ParamError::EmptyName);
        }
        Ok(Self::User {
            name,
            value: value.into(),
        })
    }

    pub fn name(&self) -> &str {
        match self {
            Self::CV { name, .. } | Self::User { name, .. } => name,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Self::CV { value, .. } | Self::User { value, .. } => value,
        }
    }

    pub fn cv_label(&self) -> Option<&str> {
        match self {
            Self::CV { cv_label, .. } => Some(cv_label),
            Self::User { .. } => None,
        }
    }

    pub fn accession(&self) -> Option<&str> {
        match self {
            Self::CV { accession, .. } => Some(accession),
            Self::User { .. } => None,
        }
    }

    pub const fn is_controlled(&self) -> bool {
        matches!(self, Self::CV { .. })
    }
}

impl Display for Param {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CV {
                cv_label,
                accession,
                name,
                value,
            } => write!(f, "[{cv_label},{accession},{name},{value}]"),
            Self::User { name, value } => write!(f, "[,,{name},{value}]"),
        }
    }
}

fn param_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"^\[([^,]*),([^,]*),\s*("[^"]*"|[^",]*)\s*,(.*)\]$"#)
            .expect("static parameter pattern")
    })
}

/// Parse one `[label,accession,name,value]` token. The name is mandatory; a
/// quoted name may contain commas; everything past the name comma belongs to
/// the value. When both label and accession are blank the result is a user
/// parameter.
pub fn parse_param(token: &str) -> Option<Param> {
    let captures = param_pattern().captures(token.trim())?;
    let cv_label = captures[1].trim().to_string();
    let accession = captures[2].trim().to_string();
    let name = captures[3].trim().to_string();
    let value = captures[4].trim().to_string();
    if name.is_empty() {
        return None;
    }
    if cv_label.is_empty() && accession.is_empty() {
        Some(Param::User { name, value })
    } else {
        Some(Param::CV {
            cv_label,
            accession,
            name,
            value,
        })
    }
}

impl FromStr for Param {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_param(s).ok_or_else(|| ParamError::Malformed(s.to_string()))
    }
}

/// A bar-delimited list of parameters, the value shape of `search_engine`,
/// `false_discovery_rate`, `sample_processing` and friends.
pub type ParamList = SplitList<Param>;

pub fn parse_param_list(token: &str) -> ParamList {
    parse_list_with(token, BAR, parse_param)
}

/// Where a publication entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PublicationItemType {
    PubMed,
    Doi,
}

impl PublicationItemType {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::PubMed => "pubmed",
            Self::Doi => "doi",
        }
    }
}

/// One entry of a `publication[n]` line, `pubmed:21063943` or
/// `doi:10.1007/978-1-60761-987-1_6`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PublicationItem {
    pub item_type: PublicationItemType,
    pub accession: String,
}

impl PublicationItem {
    pub fn new(item_type: PublicationItemType, accession: impl Into<String>) -> Self {
        Self {
            item_type,
            accession: accession.into(),
        }
    }
}

impl Display for PublicationItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.item_type.name(), self.accession)
    }
}

pub fn parse_publication_item(token: &str) -> Option<PublicationItem> {
    let (kind, accession) = token.trim().split_once(':')?;
    if accession.is_empty() {
        return None;
    }
    let item_type = match kind.trim() {
        "pubmed" => PublicationItemType::PubMed,
        "doi" => PublicationItemType::Doi,
        _ => return None,
    };
    Some(PublicationItem::new(item_type, accession.trim()))
}

pub fn parse_publication_items(token: &str) -> SplitList<PublicationItem> {
    parse_list_with(token, BAR, parse_publication_item)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_cv_param() {
        let p = parse_param("[MS,MS:1001207,Mascot,]").unwrap();
        assert!(p.is_controlled());
        assert_eq!(p.cv_label(), Some("MS"));
        assert_eq!(p.accession(), Some("MS:1001207"));
        assert_eq!(p.name(), "Mascot");
        assert_eq!(p.value(), "");
    }

    #[test]
    fn test_parse_user_param() {
        let p = parse_param("[,,linear gradient,25 min]").unwrap();
        assert!(!p.is_controlled());
        assert_eq!(p.name(), "linear gradient");
        assert_eq!(p.value(), "25 min");
    }

    #[test]
    fn test_parse_param_rejects() {
        assert!(parse_param("Mascot").is_none());
        assert!(parse_param("[,,,]").is_none());
        assert!(parse_param("[MS,MS:1001207,,value]").is_none());
    }

    #[test]
    fn test_quoted_name_and_comma_value() {
        let p = parse_param(r#"[MS,MS:1002453,"no fixed, modifications",]"#).unwrap();
        assert_eq!(p.name(), r#""no fixed, modifications""#);

        let p = parse_param("[,,custom,a,b,c]").unwrap();
        assert_eq!(p.value(), "a,b,c");
    }

    #[test]
    fn test_print_parse_round_trip() {
        for raw in [
            "[MS,MS:1001207,Mascot,]",
            "[MS,MS:1001171,Mascot:score,30.0]",
            "[,,some tool,1.2.3]",
        ] {
            let p = parse_param(raw).unwrap();
            assert_eq!(parse_param(&p.to_string()).unwrap(), p);
        }
    }

    #[test]
    fn test_constructor_invariants() {
        assert!(Param::cv("MS", "MS:1001207", "", "x").is_err());
        assert!(Param::user("  ", "x").is_err());
        assert!(Param::user("score", "1").is_ok());
    }

    #[test]
    fn test_param_list() {
        let list = parse_param_list("[MS,MS:1001207,Mascot,]|[MS,MS:1001208,Sequest,]");
        assert_eq!(list.len(), 2);
        assert_eq!(
            list.to_string(),
            "[MS,MS:1001207,Mascot,]|[MS,MS:1001208,Sequest,]"
        );

        // atomic failure
        assert!(parse_param_list("[MS,MS:1001207,Mascot,]|garbage").is_empty());
    }

    #[test]
    fn test_publication_items() {
        let items = parse_publication_items("pubmed:21063943|doi:10.1007/978-1-60761-987-1_6");
        assert_eq!(items.len(), 2);
        assert_eq!(
            items.to_string(),
            "pubmed:21063943|doi:10.1007/978-1-60761-987-1_6"
        );
        assert!(parse_publication_item("isbn:12345").is_none());
    }
}
