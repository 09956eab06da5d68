//! # Constraint Specifications
//!
//! Declarative descriptions of the rules attached to a field. A
//! [`ConstraintSpec`] carries only the parameters needed to evaluate it;
//! the evaluation logic is looked up by [`ConstraintSpec::kind`] in the
//! constraint catalog of `decaf-engine`.
//!
//! Parameters that need checking at compile time ([`DateFormat`],
//! [`RegexPattern`]) are validated by their constructors, so a compiled
//! schema can never hold an unusable format.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Kind names of the built-in constraints, in catalog order.
///
/// Custom constraint kinds must not reuse any of these names.
pub const BUILTIN_KINDS: [&str; 7] = [
    "Required",
    "MinLength",
    "MaxLength",
    "Min",
    "Max",
    "Pattern",
    "EqualsPath",
];

/// Kind name reported when a value has the wrong JSON type for its model.
pub const TYPE_KIND: &str = "Type";

/// Returns true if `name` is the kind name of a built-in constraint.
pub fn is_builtin_kind(name: &str) -> bool {
    BUILTIN_KINDS.contains(&name)
}

/// A single rule attached to a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintSpec {
    /// The value must be present, non-null, and not the empty string.
    Required,
    /// Minimum length of a string (characters) or sequence (elements).
    MinLength(usize),
    /// Maximum length of a string (characters) or sequence (elements).
    MaxLength(usize),
    /// Inclusive numeric lower bound.
    Min(f64),
    /// Inclusive numeric upper bound.
    Max(f64),
    /// The value must be a string in the given format.
    Pattern(PatternKind),
    /// The value must deeply equal the value found at a dotted path.
    EqualsPath(String),
    /// A constraint kind registered outside the built-in set.
    Custom {
        /// Registered kind name; the catalog dispatch key.
        name: String,
        /// Arguments as written in the declaration.
        args: Vec<ConstraintArg>,
    },
}

impl ConstraintSpec {
    /// The kind name used as catalog dispatch key and reported in
    /// [`FieldError`](crate::FieldError)s.
    pub fn kind(&self) -> &str {
        match self {
            Self::Required => "Required",
            Self::MinLength(_) => "MinLength",
            Self::MaxLength(_) => "MaxLength",
            Self::Min(_) => "Min",
            Self::Max(_) => "Max",
            Self::Pattern(_) => "Pattern",
            Self::EqualsPath(_) => "EqualsPath",
            Self::Custom { name, .. } => name,
        }
    }

    /// Whether this is the [`ConstraintSpec::Required`] constraint.
    pub fn is_required(&self) -> bool {
        matches!(self, Self::Required)
    }
}

/// The canonical formats checked by [`ConstraintSpec::Pattern`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    /// An e-mail address.
    Email,
    /// An absolute `http`, `https`, or `ftp` URL.
    Url,
    /// A calendar date and/or time in the given format.
    Date(DateFormat),
    /// A strong password: at least 8 characters, no whitespace, with a
    /// lowercase letter, an uppercase letter, a digit, and a symbol.
    Password,
    /// A user-supplied regular expression (unanchored).
    Regex(RegexPattern),
}

impl PatternKind {
    /// Short human-readable name of the format.
    pub fn describe(&self) -> String {
        match self {
            Self::Email => "an email address".to_string(),
            Self::Url => "a URL".to_string(),
            Self::Date(format) => format!("a date in format {}", format.pattern()),
            Self::Password => "a strong password".to_string(),
            Self::Regex(re) => format!("a value matching /{}/", re.as_str()),
        }
    }
}

/// A literal argument of a custom constraint declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConstraintArg {
    /// Numeric literal.
    Number(f64),
    /// Quoted string literal.
    Text(String),
}

impl ConstraintArg {
    /// The numeric value, if this is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }

    /// The string value, if this is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Number(_) => None,
            Self::Text(s) => Some(s),
        }
    }
}

impl fmt::Display for ConstraintArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s:?}"),
        }
    }
}

/// Which calendar components a [`DateFormat`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateShape {
    Date,
    Time,
    DateTime,
}

/// Token families seen while translating a [`DateFormat`].
#[derive(Debug, Default)]
struct TokenSet {
    year: bool,
    month: bool,
    day: bool,
    hour24: bool,
    hour12: bool,
    minute: bool,
    second: bool,
    fraction: bool,
    meridiem: bool,
}

impl TokenSet {
    fn mark(&mut self, token: char) {
        match token {
            'y' => self.year = true,
            'M' => self.month = true,
            'd' => self.day = true,
            'H' => self.hour24 = true,
            'h' => self.hour12 = true,
            'm' => self.minute = true,
            's' => self.second = true,
            'S' => self.fraction = true,
            _ => self.meridiem = true,
        }
    }

    fn has_date(&self) -> bool {
        self.year || self.month || self.day
    }

    fn has_time(&self) -> bool {
        self.hour24 || self.hour12 || self.minute || self.second || self.fraction || self.meridiem
    }

    /// The shape of a format whose tokens identify a single instant.
    fn shape(&self) -> Result<DateShape, &'static str> {
        let date = self.has_date();
        let time = self.has_time();
        if date && !(self.year && self.month && self.day) {
            return Err("a date needs year, month and day tokens");
        }
        if time {
            if self.hour24 && self.hour12 {
                return Err("mixes 24-hour and 12-hour tokens");
            }
            if !(self.hour24 || self.hour12) || !self.minute {
                return Err("a time needs hour and minute tokens");
            }
            if self.hour12 != self.meridiem {
                return Err("12-hour tokens 'h'/'hh' need the AM/PM token 'a' and vice versa");
            }
            if self.fraction && !self.second {
                return Err("'SSS' needs a seconds token");
            }
        }
        match (date, time) {
            (true, true) => Ok(DateShape::DateTime),
            (true, false) => Ok(DateShape::Date),
            (false, true) => Ok(DateShape::Time),
            (false, false) => Err("contains no date or time tokens"),
        }
    }
}

/// A date format written with `yyyy-MM-dd`-style tokens.
///
/// Supported tokens: `yyyy`, `yy`, `MMMM`, `MMM`, `MM`, `M`, `dd`, `d`,
/// `HH`, `H`, `hh`, `h`, `mm`, `m`, `ss`, `s`, `SSS`, `a`. Text inside
/// single quotes is literal; any other letter is rejected. Non-letters are
/// literal.
///
/// A format must pin down a whole date, a whole time, or both: a date
/// part has year, month and day; a time part has an hour and minutes, and
/// 12-hour clocks (`h`, `hh`) carry the `a` marker. Partial formats such as
/// `MM/yyyy` are rejected when parsed.
///
/// The format is translated once into a `chrono` strftime string, and
/// matching requires the whole value to parse as a real calendar date, so
/// `2024-13-40` fails `yyyy-MM-dd`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateFormat {
    pattern: String,
    strftime: String,
    shape: DateShape,
}

impl DateFormat {
    /// Translate a token pattern such as `yyyy-MM-dd`.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem if the pattern contains an
    /// unsupported token or an unterminated quote, or if its tokens do not
    /// describe a complete date or time.
    pub fn parse(pattern: &str) -> Result<Self, String> {
        let chars: Vec<char> = pattern.chars().collect();
        let mut strftime = String::new();
        let mut tokens = TokenSet::default();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];

            if c == '\'' {
                let start = i + 1;
                let Some(len) = chars[start..].iter().position(|&x| x == '\'') else {
                    return Err(format!("unterminated quote in date format {pattern:?}"));
                };
                for &literal in &chars[start..start + len] {
                    push_literal(&mut strftime, literal);
                }
                i = start + len + 1;
                continue;
            }

            if !c.is_ascii_alphabetic() {
                push_literal(&mut strftime, c);
                i += 1;
                continue;
            }

            let run = chars[i..].iter().take_while(|&&x| x == c).count();
            let spec = match (c, run) {
                ('y', 4) => "%Y",
                ('y', 2) => "%y",
                ('M', 1 | 2) => "%m",
                ('M', 3) => "%b",
                ('M', 4) => "%B",
                ('d', 1 | 2) => "%d",
                ('H', 1 | 2) => "%H",
                ('h', 1 | 2) => "%I",
                ('m', 1 | 2) => "%M",
                ('s', 1 | 2) => "%S",
                ('S', 3) => "%3f",
                ('a', 1) => "%p",
                _ => {
                    let token: String = std::iter::repeat(c).take(run).collect();
                    return Err(format!(
                        "unsupported token '{token}' in date format {pattern:?}"
                    ));
                }
            };
            tokens.mark(c);
            strftime.push_str(spec);
            i += run;
        }

        let shape = tokens
            .shape()
            .map_err(|reason| format!("date format {pattern:?}: {reason}"))?;

        Ok(Self {
            pattern: pattern.to_string(),
            strftime,
            shape,
        })
    }

    /// The pattern as written in the declaration.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The equivalent `chrono` strftime string.
    pub fn strftime(&self) -> &str {
        &self.strftime
    }

    /// Returns true if `value` parses completely as a valid date/time.
    pub fn matches(&self, value: &str) -> bool {
        match self.shape {
            DateShape::Date => NaiveDate::parse_from_str(value, &self.strftime).is_ok(),
            DateShape::Time => NaiveTime::parse_from_str(value, &self.strftime).is_ok(),
            DateShape::DateTime => NaiveDateTime::parse_from_str(value, &self.strftime).is_ok(),
        }
    }
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}

impl TryFrom<String> for DateFormat {
    type Error = String;

    fn try_from(pattern: String) -> Result<Self, Self::Error> {
        Self::parse(&pattern)
    }
}

impl From<DateFormat> for String {
    fn from(format: DateFormat) -> Self {
        format.pattern
    }
}

/// A compiled regular expression that compares by its source text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RegexPattern(Regex);

impl RegexPattern {
    /// Compile a regular expression.
    ///
    /// # Errors
    ///
    /// Returns the `regex` crate's error for invalid syntax.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self)
    }

    /// The source text of the expression.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns true if the expression matches anywhere in `value`.
    pub fn is_match(&self, value: &str) -> bool {
        self.0.is_match(value)
    }
}

impl PartialEq for RegexPattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl TryFrom<String> for RegexPattern {
    type Error = regex::Error;

    fn try_from(pattern: String) -> Result<Self, Self::Error> {
        Self::new(&pattern)
    }
}

impl From<RegexPattern> for String {
    fn from(pattern: RegexPattern) -> Self {
        pattern.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(ConstraintSpec::Required.kind(), "Required");
        assert_eq!(ConstraintSpec::MinLength(5).kind(), "MinLength");
        assert_eq!(ConstraintSpec::Max(100.0).kind(), "Max");
        assert_eq!(ConstraintSpec::Pattern(PatternKind::Email).kind(), "Pattern");
        assert_eq!(
            ConstraintSpec::EqualsPath("user.passwordRepeat".into()).kind(),
            "EqualsPath"
        );
        let custom = ConstraintSpec::Custom {
            name: "slug".into(),
            args: vec![],
        };
        assert_eq!(custom.kind(), "slug");
    }

    #[test]
    fn test_builtin_kinds_cover_every_variant() {
        let samples = [
            ConstraintSpec::Required,
            ConstraintSpec::MinLength(1),
            ConstraintSpec::MaxLength(1),
            ConstraintSpec::Min(0.0),
            ConstraintSpec::Max(0.0),
            ConstraintSpec::Pattern(PatternKind::Url),
            ConstraintSpec::EqualsPath("a".into()),
        ];
        for spec in &samples {
            assert!(is_builtin_kind(spec.kind()), "{} not listed", spec.kind());
        }
        assert!(!is_builtin_kind("slug"));
        assert!(!is_builtin_kind(TYPE_KIND));
    }

    #[test]
    fn test_date_format_iso() {
        let format = DateFormat::parse("yyyy-MM-dd").unwrap();
        assert_eq!(format.strftime(), "%Y-%m-%d");
        assert!(format.matches("2024-02-29"));
        assert!(!format.matches("2023-02-29"));
        assert!(!format.matches("2024-13-40"));
        assert!(!format.matches("2024-01-15T00:00:00"));
        assert!(!format.matches("not a date"));
    }

    #[test]
    fn test_date_format_european_with_time() {
        let format = DateFormat::parse("dd/MM/yyyy HH:mm").unwrap();
        assert_eq!(format.strftime(), "%d/%m/%Y %H:%M");
        assert!(format.matches("31/12/2024 23:59"));
        assert!(!format.matches("31/12/2024 24:00"));
    }

    #[test]
    fn test_date_format_time_only() {
        let format = DateFormat::parse("HH:mm:ss").unwrap();
        assert!(format.matches("08:30:00"));
        assert!(!format.matches("08:61:00"));
    }

    #[test]
    fn test_date_format_quoted_literal() {
        let format = DateFormat::parse("yyyy-MM-dd'T'HH:mm").unwrap();
        assert_eq!(format.strftime(), "%Y-%m-%dT%H:%M");
        assert!(format.matches("2024-01-15T10:00"));
    }

    #[test]
    fn test_date_format_escapes_percent() {
        let format = DateFormat::parse("yyyy%MM%dd").unwrap();
        assert_eq!(format.strftime(), "%Y%%%m%%%d");
        assert!(format.matches("2024%04%01"));
    }

    #[test]
    fn test_date_format_rejects_unknown_tokens() {
        assert!(DateFormat::parse("yyyy-MM-dd Q").is_err());
        assert!(DateFormat::parse("yyy-MM-dd").is_err());
        assert!(DateFormat::parse("'unterminated").is_err());
        assert!(DateFormat::parse("--").is_err());
    }

    #[test]
    fn test_date_format_twelve_hour_clock() {
        let format = DateFormat::parse("hh:mm a").unwrap();
        assert_eq!(format.strftime(), "%I:%M %p");
        assert!(format.matches("08:30 AM"));
        assert!(format.matches("08:30 pm"));
        assert!(!format.matches("13:30 PM"));

        let format = DateFormat::parse("dd/MM/yyyy h:mm a").unwrap();
        assert!(format.matches("01/04/2024 8:30 PM"));
        assert!(!format.matches("01/04/2024 8:30"));
    }

    #[test]
    fn test_date_format_single_digit_fields() {
        let format = DateFormat::parse("d/M/yyyy").unwrap();
        assert!(format.matches("1/4/2024"));
        assert!(format.matches("01/04/2024"));
    }

    #[test]
    fn test_date_format_rejects_partial_shapes() {
        for pattern in [
            "MM/yyyy",
            "yyyy",
            "dd/MM",
            "hh:mm",
            "dd/MM/yyyy hh:mm",
            "HH",
            "mm:ss",
            "HH:mm a",
            "hh:mm HH a",
            "HH:mm.SSS",
            "a",
        ] {
            let err = DateFormat::parse(pattern).unwrap_err();
            assert!(err.contains(&format!("{pattern:?}")), "{pattern}: {err}");
        }
    }

    #[test]
    fn test_date_format_seconds_and_fraction() {
        let format = DateFormat::parse("HH:mm:ss.SSS").unwrap();
        assert_eq!(format.strftime(), "%H:%M:%S.%3f");
        assert!(format.matches("23:59:58.125"));
        assert!(!format.matches("23:59:58"));
    }

    #[test]
    fn test_date_format_serde_as_pattern() {
        let format = DateFormat::parse("yyyy-MM-dd").unwrap();
        let json = serde_json::to_string(&format).unwrap();
        assert_eq!(json, "\"yyyy-MM-dd\"");
        let back: DateFormat = serde_json::from_str(&json).unwrap();
        assert_eq!(back, format);
        assert!(serde_json::from_str::<DateFormat>("\"yyyy-QQ\"").is_err());
        assert!(serde_json::from_str::<DateFormat>("\"MM/yyyy\"").is_err());
    }

    #[test]
    fn test_regex_pattern_equality_by_source() {
        let a = RegexPattern::new("^[a-z]+$").unwrap();
        let b = RegexPattern::new("^[a-z]+$").unwrap();
        assert_eq!(a, b);
        assert!(a.is_match("abc"));
        assert!(!a.is_match("ABC"));
        assert!(RegexPattern::new("(unclosed").is_err());
    }

    #[test]
    fn test_constraint_serde_shape() {
        let spec = ConstraintSpec::Pattern(PatternKind::Date(
            DateFormat::parse("yyyy-MM-dd").unwrap(),
        ));
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json, serde_json::json!({"pattern": {"date": "yyyy-MM-dd"}}));
        assert_eq!(
            serde_json::to_value(ConstraintSpec::Required).unwrap(),
            serde_json::json!("required")
        );
    }
}
