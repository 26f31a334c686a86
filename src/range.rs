//! Contiguous id ranges and the per-phase range allocator
//!
//! Every phase re-partitions the container and object id spaces from offset 0.
//! Within a phase, allocation order is addressing order: callers must request
//! ranges in exactly the order the stages consume them.

use crate::error::{PlanError, PlanResult};
use std::fmt;
use std::num::NonZeroU64;

/// Inclusive interval of 1-based identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdRange {
    first: u64,
    last: u64,
}

impl IdRange {
    /// Returns None when `first > last` or `first == 0`
    pub fn new(first: u64, last: u64) -> Option<Self> {
        (first >= 1 && first <= last).then_some(Self { first, last })
    }

    pub fn first(&self) -> u64 {
        self.first
    }

    pub fn last(&self) -> u64 {
        self.last
    }

    /// Number of ids covered; never zero
    pub fn len(&self) -> u64 {
        self.last - self.first + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn overlaps(&self, other: &IdRange) -> bool {
        self.first <= other.last && other.first <= self.last
    }
}

impl fmt::Display for IdRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.first, self.last)
    }
}

/// Resource kind with its own id space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Container,
    Object,
}

impl ResourceKind {
    pub fn name(self) -> &'static str {
        match self {
            ResourceKind::Container => "container",
            ResourceKind::Object => "object",
        }
    }
}

/// Hands out disjoint, strictly increasing ranges per resource kind
#[derive(Debug, Default, Clone)]
pub struct RangeAllocator {
    containers: u64,
    objects: u64,
}

impl RangeAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate `[offset+1, offset+count]` and advance the offset by `count`
    pub fn next(&mut self, kind: ResourceKind, count: NonZeroU64) -> PlanResult<IdRange> {
        let offset = match kind {
            ResourceKind::Container => &mut self.containers,
            ResourceKind::Object => &mut self.objects,
        };
        let count = count.get();
        let last = offset.checked_add(count).ok_or(PlanError::RangeOverflow {
            kind: kind.name(),
            offset: *offset,
            count,
        })?;
        let range = IdRange {
            first: *offset + 1,
            last,
        };
        *offset = last;
        Ok(range)
    }

    /// Number of ids handed out so far for `kind`
    pub fn offset(&self, kind: ResourceKind) -> u64 {
        match kind {
            ResourceKind::Container => self.containers,
            ResourceKind::Object => self.objects,
        }
    }
}
