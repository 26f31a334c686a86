//! Object size axis parsing
//!
//! A size group is either a `lo-hi` range (one uniform draw per object at
//! execution time) or a comma-separated list of constant sizes. Units are
//! decimal (B, KB, MB, GB, TB), matched case-insensitively with k/m/g/t shortcuts.

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unit attached to every size value of one group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SizeUnit {
    B,
    KB,
    MB,
    GB,
    TB,
}

impl SizeUnit {
    /// Byte multiplier for one unit
    pub fn multiplier(self) -> u64 {
        match self {
            SizeUnit::B => 1,
            SizeUnit::KB => 1_000,
            SizeUnit::MB => 1_000_000,
            SizeUnit::GB => 1_000_000_000,
            SizeUnit::TB => 1_000_000_000_000,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SizeUnit::B => "B",
            SizeUnit::KB => "KB",
            SizeUnit::MB => "MB",
            SizeUnit::GB => "GB",
            SizeUnit::TB => "TB",
        }
    }
}

impl FromStr for SizeUnit {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "B" => Ok(SizeUnit::B),
            "K" | "KB" => Ok(SizeUnit::KB),
            "M" | "MB" => Ok(SizeUnit::MB),
            "G" | "GB" => Ok(SizeUnit::GB),
            "T" | "TB" => Ok(SizeUnit::TB),
            "" => Err(anyhow!("Size unit is empty")),
            other => Err(anyhow!(
                "Unknown size unit: {}. Supported: B, k/KB, m/MB, g/GB, t/TB",
                other
            )),
        }
    }
}

impl fmt::Display for SizeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The declared size axis of one group
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SizeAxis {
    /// `lo-hi`: a single pass, sizes drawn uniformly at execution time
    Range { lo: u64, hi: u64 },
    /// `a,b,c`: one full container x object pass per listed size
    Discrete(Vec<u64>),
}

impl SizeAxis {
    /// Parse the raw size string of one group
    ///
    /// Examples:
    /// - "1-4" → Range { lo: 1, hi: 4 }
    /// - "1,8,64" → Discrete([1, 8, 64])
    /// - "16" → Discrete([16])
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            bail!("Size specification is empty");
        }

        if raw.contains('-') {
            let bounds: Vec<&str> = raw.split('-').collect();
            if bounds.len() != 2 {
                bail!("Size range '{}' must have exactly two bounds (lo-hi)", raw);
            }
            let lo = parse_size_value(bounds[0])?;
            let hi = parse_size_value(bounds[1])?;
            if lo > hi {
                bail!("Size range '{}' has lower bound above upper bound", raw);
            }
            return Ok(SizeAxis::Range { lo, hi });
        }

        let mut values = Vec::new();
        for part in raw.split(',') {
            let value = parse_size_value(part)?;
            if values.contains(&value) {
                bail!("Size {} is listed more than once", value);
            }
            values.push(value);
        }
        Ok(SizeAxis::Discrete(values))
    }

    /// Number of outer size passes: 1 for a range, one per value otherwise
    pub fn passes(&self) -> usize {
        match self {
            SizeAxis::Range { .. } => 1,
            SizeAxis::Discrete(values) => values.len(),
        }
    }

    /// The size expression of every cell, in iteration order
    pub fn expressions(&self, unit: SizeUnit) -> Vec<SizeExpr> {
        match self {
            SizeAxis::Range { lo, hi } => vec![SizeExpr::Uniform {
                lo: *lo,
                hi: *hi,
                unit,
            }],
            SizeAxis::Discrete(values) => values
                .iter()
                .map(|&value| SizeExpr::Constant { value, unit })
                .collect(),
        }
    }
}

/// Canonical spelling: `lo-hi` or `a,b,c` with no whitespace
impl fmt::Display for SizeAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeAxis::Range { lo, hi } => write!(f, "{}-{}", lo, hi),
            SizeAxis::Discrete(values) => {
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", value)?;
                }
                Ok(())
            }
        }
    }
}

fn parse_size_value(input: &str) -> Result<u64> {
    let input = input.trim();
    if input.is_empty() {
        bail!("Empty size value");
    }
    input
        .parse::<u64>()
        .with_context(|| format!("Invalid size value: {}", input))
}

/// Size carried by prepare configs and write operations
///
/// Printed as `c(value)UNIT` for a constant size or `u(lo,hi)UNIT` for a
/// uniform draw between inclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeExpr {
    Constant { value: u64, unit: SizeUnit },
    Uniform { lo: u64, hi: u64, unit: SizeUnit },
}

impl SizeExpr {
    /// Parenthesised size with unit, e.g. `(1)KB` or `(1,4)KB`; used in stage names
    pub fn label(&self) -> String {
        match self {
            SizeExpr::Constant { value, unit } => format!("({}){}", value, unit),
            SizeExpr::Uniform { lo, hi, unit } => format!("({},{}){}", lo, hi, unit),
        }
    }

    /// Largest object this expression can produce, in bytes
    pub fn max_bytes(&self) -> u64 {
        match self {
            SizeExpr::Constant { value, unit } => value.saturating_mul(unit.multiplier()),
            SizeExpr::Uniform { hi, unit, .. } => hi.saturating_mul(unit.multiplier()),
        }
    }
}

impl fmt::Display for SizeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeExpr::Constant { .. } => write!(f, "c{}", self.label()),
            SizeExpr::Uniform { .. } => write!(f, "u{}", self.label()),
        }
    }
}

impl FromStr for SizeExpr {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let close = s
            .rfind(')')
            .ok_or_else(|| anyhow!("Size expression '{}' has no closing parenthesis", s))?;
        let unit: SizeUnit = s[close + 1..].parse()?;

        if let Some(body) = s[..close].strip_prefix("c(") {
            let value = parse_size_value(body)?;
            return Ok(SizeExpr::Constant { value, unit });
        }
        if let Some(body) = s[..close].strip_prefix("u(") {
            let (lo, hi) = body
                .split_once(',')
                .ok_or_else(|| anyhow!("Uniform size '{}' needs two bounds", s))?;
            return Ok(SizeExpr::Uniform {
                lo: parse_size_value(lo)?,
                hi: parse_size_value(hi)?,
                unit,
            });
        }
        bail!("Size expression '{}' must start with c( or u(", s)
    }
}
