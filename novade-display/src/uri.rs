//! Window descriptors.
//!
//! A descriptor names a backend scheme and carries named parameters:
//!
//! ```text
//! scheme:[key=value,key=value]//location
//! ```
//!
//! The bracket block and `//location` are optional, so `wayland` and
//! `default:[w=1024,h=768]` are both valid.

use crate::error::UriError;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Uri {
    pub scheme: String,
    pub location: String,
    params: BTreeMap<String, String>,
}

/// Conversion from a descriptor parameter string.
///
/// Implemented for anything `FromStr`; booleans get the wider
/// `1/0/yes/no/on/off` vocabulary through [`Flag`].
pub trait ParamValue: Sized {
    const EXPECTED: &'static str;
    fn parse_param(raw: &str) -> Option<Self>;
}

macro_rules! from_str_param {
    ($($ty:ty => $name:expr),* $(,)?) => {
        $(impl ParamValue for $ty {
            const EXPECTED: &'static str = $name;
            fn parse_param(raw: &str) -> Option<Self> {
                <$ty as FromStr>::from_str(raw.trim()).ok()
            }
        })*
    };
}

from_str_param!(
    i32 => "an integer",
    u32 => "a non-negative integer",
    u64 => "a non-negative integer",
    f32 => "a number",
    f64 => "a number",
);

impl ParamValue for String {
    const EXPECTED: &'static str = "a string";
    fn parse_param(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }
}

impl ParamValue for bool {
    const EXPECTED: &'static str = "a boolean";
    fn parse_param(raw: &str) -> Option<Self> {
        Flag::from_str(raw).ok().map(|Flag(b)| b)
    }
}

/// Boolean with the descriptor vocabulary. An empty value counts as `true`,
/// so `[double_buffered]` switches the flag on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flag(pub bool);

impl FromStr for Flag {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "1" | "true" | "yes" | "on" => Ok(Flag(true)),
            "0" | "false" | "no" | "off" => Ok(Flag(false)),
            _ => Err(()),
        }
    }
}

impl Uri {
    pub fn new(scheme: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            ..Self::default()
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) {
        self.params.insert(key.into(), value.to_string());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Typed parameter lookup; `default` when absent, an error when unreadable.
    pub fn get<T: ParamValue>(&self, key: &str, default: T) -> Result<T, UriError> {
        match self.params.get(key) {
            None => Ok(default),
            Some(raw) => T::parse_param(raw).ok_or_else(|| UriError::BadValue {
                key: key.to_string(),
                value: raw.clone(),
                expected: T::EXPECTED,
            }),
        }
    }

    pub fn parse(descriptor: &str) -> Result<Self, UriError> {
        let descriptor = descriptor.trim();
        if descriptor.is_empty() {
            return Err(UriError::Empty);
        }

        let Some((scheme, mut rest)) = descriptor.split_once(':') else {
            return Ok(Uri::new(descriptor));
        };
        let mut uri = Uri::new(scheme.trim());

        if let Some(block) = rest.strip_prefix('[') {
            let end = block
                .find(']')
                .ok_or_else(|| UriError::Unterminated(descriptor.to_string()))?;
            for pair in block[..end].split(',').filter(|p| !p.trim().is_empty()) {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                uri.set(key.trim(), value.trim());
            }
            rest = &block[end + 1..];
        }

        uri.location = rest.strip_prefix("//").unwrap_or(rest).to_string();
        if uri.scheme.is_empty() {
            return Err(UriError::Empty);
        }
        Ok(uri)
    }
}

impl FromStr for Uri {
    type Err = UriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uri::parse(s)
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.scheme)?;
        if !self.params.is_empty() || !self.location.is_empty() {
            write!(f, ":")?;
        }
        if !self.params.is_empty() {
            let pairs: Vec<String> = self.params.iter().map(|(k, v)| format!("{k}={v}")).collect();
            write!(f, "[{}]", pairs.join(","))?;
        }
        if !self.location.is_empty() {
            write!(f, "//{}", self.location)?;
        }
        Ok(())
    }
}
