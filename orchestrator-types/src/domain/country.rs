//! Country codes and the country patterns used by method tables.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// European Union member states.
const EU_MEMBERS: &[&str] = &[
    "at", "be", "bg", "cy", "cz", "de", "dk", "ee", "es", "fi", "fr", "gr", "hr", "hu", "ie",
    "it", "lt", "lu", "lv", "mt", "nl", "pl", "pt", "ro", "se", "si", "sk",
];

/// EEA members outside the EU.
const EEA_EXTRA: &[&str] = &["is", "li", "no"];

/// Lower-case ISO 3166-1 alpha-2 country code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountryCode(String);

impl CountryCode {
    pub fn new(code: &str) -> Result<Self, DomainError> {
        let code = code.trim();
        if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DomainError::InvalidCountryCode(code.to_string()));
        }
        Ok(Self(code.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CountryCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CountryCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<CountryCode> for String {
    fn from(code: CountryCode) -> Self {
        code.0
    }
}

/// Named groups of countries accepted in method tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Eu,
    Eea,
}

impl Region {
    pub fn contains(&self, country: &CountryCode) -> bool {
        let code = country.as_str();
        match self {
            Region::Eu => EU_MEMBERS.contains(&code),
            Region::Eea => EU_MEMBERS.contains(&code) || EEA_EXTRA.contains(&code),
        }
    }
}

/// One entry of a `+3ds` / `-3ds` / `excl` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountryPattern {
    Any,
    Region(Region),
    Country(CountryCode),
}

impl CountryPattern {
    pub fn matches(&self, country: &CountryCode) -> bool {
        match self {
            CountryPattern::Any => true,
            CountryPattern::Region(region) => region.contains(country),
            CountryPattern::Country(code) => code == country,
        }
    }
}

impl FromStr for CountryPattern {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "*" => Ok(CountryPattern::Any),
            "eu" => Ok(CountryPattern::Region(Region::Eu)),
            "eea" => Ok(CountryPattern::Region(Region::Eea)),
            other => CountryCode::new(other).map(CountryPattern::Country),
        }
    }
}

/// A parsed country list. An empty set matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountrySet {
    patterns: Vec<CountryPattern>,
}

impl CountrySet {
    /// Parses raw configuration tokens (`"*"`, `"eu"`, `"br"`, ...).
    pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Result<Self, DomainError> {
        let patterns = tokens
            .iter()
            .map(|t| t.as_ref().parse())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn matches(&self, country: &CountryCode) -> bool {
        self.patterns.iter().any(|p| p.matches(country))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
