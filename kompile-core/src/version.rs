use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize, Serializer};

/// A Java platform version as reported by `java -version`, `javac -version`
/// or a JDK `release` file.
///
/// Both numbering schemes are understood: the legacy `1.8.0_292` form, whose
/// feature release is the second component, and the `11.0.2` / `17` form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct JavaVersion {
    major: u32,
    minor: u32,
    patch: u32,
    raw: String,
}

impl TryFrom<String> for JavaVersion {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl Serialize for JavaVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.raw)
    }
}

impl JavaVersion {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
            raw: format!("{}.{}.{}", major, minor, patch),
        }
    }

    /// The feature release (8 for `1.8.0_292`, 17 for `17.0.1`).
    pub fn major(&self) -> u32 {
        self.major
    }

    pub fn minor(&self) -> u32 {
        self.minor
    }

    pub fn patch(&self) -> u32 {
        self.patch
    }

    /// Whether this JDK has the module system (9 and later).
    pub fn is_modular(&self) -> bool {
        self.major >= 9
    }
}

impl fmt::Display for JavaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Leading decimal digits of `s`, if any.
fn leading_number(s: &str) -> Option<u32> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s[..end].parse().ok()
}

impl FromStr for JavaVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_matches('"');
        let trimmed = trimmed
            .strip_prefix("javac ")
            .or_else(|| trimmed.strip_prefix("java "))
            .unwrap_or(trimmed)
            .trim();
        let raw = trimmed.split_whitespace().next().unwrap_or_default();

        let mut parts = raw.split(['.', '_', '+', '-']);
        let first = parts
            .next()
            .and_then(leading_number)
            .ok_or_else(|| format!("invalid java version '{}'", s.trim()))?;
        let rest: Vec<u32> = parts.map_while(leading_number).collect();

        let (major, minor, patch) = if first == 1 && !rest.is_empty() {
            (rest[0], rest.get(1).copied().unwrap_or(0), rest.get(2).copied().unwrap_or(0))
        } else {
            (first, rest.first().copied().unwrap_or(0), rest.get(1).copied().unwrap_or(0))
        };

        Ok(Self {
            major,
            minor,
            patch,
            raw: raw.to_string(),
        })
    }
}
