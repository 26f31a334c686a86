// src/config.rs
//! Generation request configuration
//!
//! A request is a YAML document whose fields mirror the workload generator
//! form: parallel per-group lists (one entry per size group) plus global
//! timing, identity and mode settings. `RawRequest::validate` parses it once
//! into typed `Globals` and one `GroupSpec` per size group.
//!
//! Example:
//! ```yaml
//! auth: { type: swauth, config: "username=test:tester;password=testing" }
//! storage: { type: swift }
//! runtime: 60s
//! num_of_drivers: 2
//! generate_workload: true
//! object_sizes: ["1,4", "1-64"]
//! object_size_units: [KB, MB]
//! num_of_containers: ["2,3", "1"]
//! num_of_objects: ["5", "100,200"]
//! workers: ["4,8", "16"]
//! ratios:
//!   - { read: [70, 100], write: [20, 0], delete: [10, 0] }
//!   - { read: [80], write: [20], delete: [0] }
//! ```

use crate::constants;
use crate::error::{PlanError, PlanResult};
use crate::model::{Auth, Storage};
use crate::serde_helpers::{deserialize_opt_scalar, deserialize_scalar_list};
use crate::size::{SizeAxis, SizeUnit};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::num::{NonZeroU32, NonZeroU64};
use std::path::Path;
use std::str::FromStr;

/// Request exactly as supplied by the parameter source
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RawRequest {
    /// Workload name; defaults to "workload"
    #[serde(default)]
    pub name: Option<String>,

    /// Workload description; defaults to "workload description"
    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub auth: Option<Auth>,

    #[serde(default)]
    pub storage: Option<Storage>,

    /// Normal-stage runtime: integer seconds or humantime ("60s", "5m"). Required.
    #[serde(default, deserialize_with = "deserialize_opt_scalar")]
    pub runtime: Option<String>,

    /// Delay before each normal stage starts. Default: 0
    #[serde(default, deserialize_with = "deserialize_opt_scalar")]
    pub delay: Option<String>,

    /// Normal-stage ramp-up. Default: 0
    #[serde(default, deserialize_with = "deserialize_opt_scalar")]
    pub rampup: Option<String>,

    /// Number of drivers the prepare objects are split across. Required, >= 1.
    #[serde(default, deserialize_with = "deserialize_opt_scalar")]
    pub num_of_drivers: Option<String>,

    /// true: persist documents to the output directory; false: submit to the controller
    #[serde(default)]
    pub generate_workload: bool,

    /// Per group: "a,b,c" (discrete) or "lo-hi" (range)
    #[serde(default, deserialize_with = "deserialize_scalar_list")]
    pub object_sizes: Vec<String>,

    #[serde(default, deserialize_with = "deserialize_scalar_list")]
    pub object_size_units: Vec<String>,

    /// Per group: comma-separated object counts
    #[serde(default, deserialize_with = "deserialize_scalar_list")]
    pub num_of_objects: Vec<String>,

    /// Per group: comma-separated container counts
    #[serde(default, deserialize_with = "deserialize_scalar_list")]
    pub num_of_containers: Vec<String>,

    /// Per group: comma-separated worker counts
    #[serde(default, deserialize_with = "deserialize_scalar_list")]
    pub workers: Vec<String>,

    /// Per group: parallel read/write/delete ratio lists
    #[serde(default)]
    pub ratios: Vec<RawRatios>,
}

/// Parallel ratio lists of one group; entry i of each list forms triple i
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RawRatios {
    #[serde(default, deserialize_with = "deserialize_scalar_list")]
    pub read: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_scalar_list")]
    pub write: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_scalar_list")]
    pub delete: Vec<String>,
}

/// Where finished documents go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitMode {
    /// Write one document per size group to the output directory
    Persist,
    /// Submit each document to the controller and start it
    Submit,
}

/// Settings shared by every group of one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Globals {
    pub name: String,
    pub description: String,
    pub auth: Auth,
    pub storage: Storage,
    /// Seconds
    pub runtime: u64,
    /// Seconds
    pub delay: u64,
    /// Seconds
    pub rampup: u64,
    pub drivers: NonZeroU64,
    pub mode: EmitMode,
}

/// One (read%, write%, delete%) mix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RatioTriple {
    pub read: u32,
    pub write: u32,
    pub delete: u32,
}

impl RatioTriple {
    pub fn total(&self) -> u32 {
        self.read + self.write + self.delete
    }
}

impl fmt::Display for RatioTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}w{}d{}", self.read, self.write, self.delete)
    }
}

/// Typed axes of one size group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSpec {
    pub index: usize,
    pub sizes: SizeAxis,
    pub unit: SizeUnit,
    pub containers: Vec<NonZeroU64>,
    pub objects: Vec<NonZeroU64>,
    pub workers: Vec<NonZeroU32>,
    pub ratios: Vec<RatioTriple>,
}

impl GroupSpec {
    /// Deterministic document name, e.g. `objSizes-1,4KB`
    ///
    /// Built from the parsed axis and unit, so `"1, 4"`/`k` and `"1,4"`/`KB`
    /// name the same document.
    pub fn document_name(&self) -> String {
        format!("{}{}{}", constants::DOCUMENT_PREFIX, self.sizes, self.unit)
    }
}

/// A validated request: globals plus one result per size group
#[derive(Debug)]
pub struct PlanRequest {
    pub globals: Globals,
    pub groups: Vec<PlanResult<GroupSpec>>,
}

impl RawRequest {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse generation request YAML")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read request file: {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse request file: {}", path.display()))
    }

    /// Parse globals and every group; group failures are kept per group
    pub fn validate(&self) -> PlanResult<PlanRequest> {
        let globals = self.globals()?;

        let group_count = self.object_sizes.len();
        for (field, len) in [
            ("object_size_units", self.object_size_units.len()),
            ("num_of_objects", self.num_of_objects.len()),
            ("num_of_containers", self.num_of_containers.len()),
            ("workers", self.workers.len()),
            ("ratios", self.ratios.len()),
        ] {
            if len > group_count {
                return Err(PlanError::InvalidValue {
                    field,
                    reason: format!("{} entries but only {} size groups", len, group_count),
                });
            }
        }

        let mut names = HashSet::new();
        let groups = (0..group_count)
            .map(|i| {
                let group = self.group(i)?;
                if !names.insert(group.document_name()) {
                    return Err(PlanError::MalformedAxis {
                        group: i,
                        axis: "object_sizes",
                        reason: format!(
                            "document {} is already produced by an earlier size group",
                            group.document_name()
                        ),
                    });
                }
                Ok(group)
            })
            .collect();
        Ok(PlanRequest { globals, groups })
    }

    fn globals(&self) -> PlanResult<Globals> {
        let runtime = self
            .runtime
            .as_deref()
            .ok_or(PlanError::MissingField("runtime"))?;
        let drivers = self
            .num_of_drivers
            .as_deref()
            .ok_or(PlanError::MissingField("num_of_drivers"))?;
        let drivers = drivers
            .trim()
            .parse::<NonZeroU64>()
            .map_err(|e| PlanError::InvalidValue {
                field: "num_of_drivers",
                reason: format!("'{}': {}", drivers, e),
            })?;

        Ok(Globals {
            name: self
                .name
                .clone()
                .unwrap_or_else(|| constants::DEFAULT_WORKLOAD_NAME.to_string()),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| constants::DEFAULT_WORKLOAD_DESCRIPTION.to_string()),
            auth: self.auth.clone().unwrap_or_default(),
            storage: self.storage.clone().unwrap_or_default(),
            runtime: parse_seconds("runtime", runtime)?,
            delay: self.delay.as_deref().map_or(Ok(0), |d| parse_seconds("delay", d))?,
            rampup: self.rampup.as_deref().map_or(Ok(0), |r| parse_seconds("rampup", r))?,
            drivers,
            mode: if self.generate_workload {
                EmitMode::Persist
            } else {
                EmitMode::Submit
            },
        })
    }

    fn group(&self, index: usize) -> PlanResult<GroupSpec> {
        let malformed = |axis: &'static str, reason: String| PlanError::MalformedAxis {
            group: index,
            axis,
            reason,
        };
        let entry = |list: &[String], axis: &'static str| -> PlanResult<String> {
            list.get(index)
                .map(|s| s.trim().to_string())
                .ok_or_else(|| malformed(axis, "no entry for this group".into()))
        };

        let sizes = SizeAxis::parse(&entry(&self.object_sizes, "object_sizes")?).map_err(|e| malformed("object_sizes", e.to_string()))?;
        let unit = entry(&self.object_size_units, "object_size_units")?
            .parse::<SizeUnit>()
            .map_err(|e| malformed("object_size_units", e.to_string()))?;

        let containers = parse_list::<NonZeroU64>(&entry(&self.num_of_containers, "num_of_containers")?)
            .map_err(|reason| malformed("num_of_containers", reason))?;
        let objects = parse_list::<NonZeroU64>(&entry(&self.num_of_objects, "num_of_objects")?)
            .map_err(|reason| malformed("num_of_objects", reason))?;
        let workers = parse_list::<NonZeroU32>(&entry(&self.workers, "workers")?)
            .map_err(|reason| malformed("workers", reason))?;

        let raw_ratios = self
            .ratios
            .get(index)
            .ok_or_else(|| malformed("ratios", "no entry for this group".into()))?;
        let ratios = parse_ratios(raw_ratios).map_err(|reason| malformed("ratios", reason))?;

        Ok(GroupSpec {
            index,
            sizes,
            unit,
            containers,
            objects,
            workers,
            ratios,
        })
    }
}

/// Integer seconds ("60") or a humantime duration ("60s", "2m")
fn parse_seconds(field: &'static str, raw: &str) -> PlanResult<u64> {
    let raw = raw.trim();
    if let Ok(secs) = raw.parse::<u64>() {
        return Ok(secs);
    }
    let duration = humantime::parse_duration(raw).map_err(|e| PlanError::InvalidValue {
        field,
        reason: format!("'{}': {}", raw, e),
    })?;
    if duration.subsec_nanos() != 0 {
        return Err(PlanError::InvalidValue {
            field,
            reason: format!("'{}' is not a whole number of seconds", raw),
        });
    }
    Ok(duration.as_secs())
}

/// Comma-separated list of values; empty items and duplicates are rejected
fn parse_list<T>(raw: &str) -> std::result::Result<Vec<T>, String>
where
    T: FromStr + PartialEq,
    T::Err: fmt::Display,
{
    let mut values = Vec::new();
    for item in raw.split(',').map(str::trim) {
        if item.is_empty() {
            return Err(format!("empty value in '{}'", raw));
        }
        let value = item
            .parse::<T>()
            .map_err(|e| format!("'{}' is not a positive integer: {}", item, e))?;
        if values.contains(&value) {
            return Err(format!("'{}' is listed more than once", item));
        }
        values.push(value);
    }
    Ok(values)
}

fn parse_ratio(raw: &str) -> std::result::Result<u32, String> {
    let value = raw
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("ratio '{}' is not an integer: {}", raw, e))?;
    if value > constants::MAX_RATIO {
        return Err(format!("ratio {} exceeds {}", value, constants::MAX_RATIO));
    }
    Ok(value)
}

/// Zip the read/write/delete lists into triples; the sum is deliberately not checked
fn parse_ratios(raw: &RawRatios) -> std::result::Result<Vec<RatioTriple>, String> {
    if raw.read.len() != raw.write.len() || raw.read.len() != raw.delete.len() {
        return Err(format!(
            "read/write/delete lists differ in length ({}/{}/{})",
            raw.read.len(),
            raw.write.len(),
            raw.delete.len()
        ));
    }
    if raw.read.is_empty() {
        return Err("no ratio triples".into());
    }

    let mut triples = Vec::with_capacity(raw.read.len());
    for ((r, w), d) in raw.read.iter().zip(&raw.write).zip(&raw.delete) {
        let triple = RatioTriple {
            read: parse_ratio(r)?,
            write: parse_ratio(w)?,
            delete: parse_ratio(d)?,
        };
        if triples.contains(&triple) {
            return Err(format!("ratio triple {} is listed more than once", triple));
        }
        if triple.total() != 100 {
            tracing::debug!("Ratio triple {} sums to {}, kept as given", triple, triple.total());
        }
        triples.push(triple);
    }
    Ok(triples)
}
