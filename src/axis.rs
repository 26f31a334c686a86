//! Expansion of the size x container x object axes into ordered cells
//!
//! Nesting order is fixed: size pass (outermost, one per discrete size, a
//! single pass for a size range) → container bucket → object bucket.

use crate::size::{SizeAxis, SizeExpr, SizeUnit};
use std::num::NonZeroU64;

/// One concrete size/container/object combination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub size: SizeExpr,
    pub containers: NonZeroU64,
    pub objects: NonZeroU64,
    /// Index of the size pass this cell belongs to
    pub pass: usize,
    /// Position of `containers` in the declared container list
    pub container_bucket: usize,
    /// Position of `objects` in the declared object list
    pub object_bucket: usize,
}

impl Cell {
    /// First cell of a (pass, container bucket) pair; a new container range starts here
    pub fn opens_container_bucket(&self) -> bool {
        self.object_bucket == 0
    }
}

/// Produces the cell sequence every phase walks
#[derive(Debug, Clone)]
pub struct AxisExpander<'a> {
    sizes: &'a SizeAxis,
    unit: SizeUnit,
    containers: &'a [NonZeroU64],
    objects: &'a [NonZeroU64],
}

impl<'a> AxisExpander<'a> {
    pub fn new(
        sizes: &'a SizeAxis,
        unit: SizeUnit,
        containers: &'a [NonZeroU64],
        objects: &'a [NonZeroU64],
    ) -> Self {
        Self {
            sizes,
            unit,
            containers,
            objects,
        }
    }

    pub fn expand(&self) -> Vec<Cell> {
        let passes = self.sizes.expressions(self.unit);
        let mut cells = Vec::with_capacity(passes.len() * self.containers.len() * self.objects.len());

        for (pass, size) in passes.into_iter().enumerate() {
            for (container_bucket, &containers) in self.containers.iter().enumerate() {
                for (object_bucket, &objects) in self.objects.iter().enumerate() {
                    cells.push(Cell {
                        size,
                        containers,
                        objects,
                        pass,
                        container_bucket,
                        object_bucket,
                    });
                }
            }
        }
        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(values: &[u64]) -> Vec<NonZeroU64> {
        values.iter().map(|&v| NonZeroU64::new(v).unwrap()).collect()
    }

    #[test]
    fn test_discrete_sizes_expand_per_value() {
        let sizes = SizeAxis::Discrete(vec![1, 4]);
        let containers = counts(&[2, 3]);
        let objects = counts(&[5]);
        let cells = AxisExpander::new(&sizes, SizeUnit::KB, &containers, &objects).expand();

        assert_eq!(cells.len(), 4);
        let order: Vec<(u64, u64)> = cells
            .iter()
            .map(|c| match c.size {
                SizeExpr::Constant { value, .. } => (value, c.containers.get()),
                SizeExpr::Uniform { .. } => panic!("Expected constant size"),
            })
            .collect();
        assert_eq!(order, vec![(1, 2), (1, 3), (4, 2), (4, 3)]);
    }

    #[test]
    fn test_range_size_is_single_pass() {
        let sizes = SizeAxis::Range { lo: 1, hi: 64 };
        let containers = counts(&[1, 2, 3]);
        let objects = counts(&[10, 20]);
        let cells = AxisExpander::new(&sizes, SizeUnit::MB, &containers, &objects).expand();

        assert_eq!(cells.len(), 6);
        assert!(cells.iter().all(|c| c.pass == 0));
        assert!(cells
            .iter()
            .all(|c| c.size == SizeExpr::Uniform { lo: 1, hi: 64, unit: SizeUnit::MB }));
    }

    #[test]
    fn test_object_bucket_is_innermost() {
        let sizes = SizeAxis::Discrete(vec![1]);
        let containers = counts(&[2, 3]);
        let objects = counts(&[5, 7]);
        let cells = AxisExpander::new(&sizes, SizeUnit::KB, &containers, &objects).expand();

        let buckets: Vec<(usize, usize)> = cells
            .iter()
            .map(|c| (c.container_bucket, c.object_bucket))
            .collect();
        assert_eq!(buckets, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
        let opens: Vec<bool> = cells.iter().map(Cell::opens_container_bucket).collect();
        assert_eq!(opens, vec![true, false, true, false]);
    }
}
