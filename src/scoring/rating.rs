use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rating {
    #[serde(rename = "NR")]
    NotRated,
    R,
    D,
    C,
    B,
    A,
    #[serde(rename = "A+")]
    APlus,
}

impl Rating {
    /// Display order, worst to best.
    pub const ALL: [Rating; 7] = [
        Rating::NotRated,
        Rating::R,
        Rating::D,
        Rating::C,
        Rating::B,
        Rating::A,
        Rating::APlus,
    ];

    /// Classify a normalized total.
    ///
    /// Buckets are open intervals checked in order, so the exact values 50, 60,
    /// 70 and 80 fall through to `NR`.
    pub fn classify(score: f64) -> Self {
        if score > 29.0 && score < 50.0 {
            Rating::R
        } else if score > 49.0 && score < 60.0 {
            Rating::D
        } else if score > 59.0 && score < 70.0 {
            Rating::C
        } else if score > 69.0 && score < 80.0 {
            Rating::B
        } else if score > 79.0 && score < 90.0 {
            Rating::A
        } else if score >= 90.0 {
            Rating::APlus
        } else {
            Rating::NotRated
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Rating::NotRated => "NR",
            Rating::R => "R",
            Rating::D => "D",
            Rating::C => "C",
            Rating::B => "B",
            Rating::A => "A",
            Rating::APlus => "A+",
        }
    }

    /// Chart colour as an RGB triple.
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Rating::NotRated => (0x00, 0x00, 0x00),
            Rating::R => (0xF3, 0x6E, 0x6E),
            Rating::D => (0xF7, 0x9C, 0x74),
            Rating::C => (0xF5, 0xE9, 0x89),
            Rating::B => (0x82, 0xC7, 0x85),
            Rating::A => (0x60, 0xBF, 0x85),
            Rating::APlus => (0x31, 0x9D, 0x46),
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for Rating {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match Rating::ALL.iter().find(|r| r.label() == s.trim()) {
            Some(rating) => Ok(*rating),
            None => bail!("Unknown rating: {}", s),
        }
    }
}
