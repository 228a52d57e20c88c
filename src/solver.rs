use crate::grid::OccupancyGrid;
use crate::types::{RegionSpec, ShapeCatalog, ShapeMask, Verdict};
use crate::variants;
use std::collections::HashMap;
use std::sync::Arc;

/// One required copy of a shape, carrying its filled area and a shared
/// handle to the shape's precomputed variant set.
#[derive(Debug, Clone)]
struct Instance {
    area: usize,
    variants: Arc<Vec<ShapeMask>>,
}

enum Search {
    Solved,
    Unsolved,
    Budget,
}

/// Largest grid the evaluator will allocate, in cells.
const MAX_GRID_CELLS: u128 = 1 << 28;

/// Largest instance list the evaluator will search. Recursion depth equals
/// the instance count, so this also bounds the call stack.
const MAX_INSTANCES: u128 = 4096;

struct Solver {
    instances: Vec<Instance>,
    /// remaining[i] = total filled area of instances[i..]; one extra slot
    /// so remaining[len] == 0 at the base case.
    remaining: Vec<usize>,
    max_nodes: Option<u64>,
    nodes: u64,
}

impl Solver {
    fn new(instances: Vec<Instance>, max_nodes: Option<u64>) -> Self {
        let mut remaining = vec![0; instances.len() + 1];
        for i in (0..instances.len()).rev() {
            remaining[i] = remaining[i + 1] + instances[i].area;
        }
        Self {
            instances,
            remaining,
            max_nodes,
            nodes: 0,
        }
    }

    fn solve(&mut self, grid: &mut OccupancyGrid) -> Search {
        self.recurse(grid, 0)
    }

    /// Depth-first backtracking over `instances[index..]`. The grid holds
    /// every instance below `index` already placed; it is returned to that
    /// exact state whenever this call does not solve.
    fn recurse(&mut self, grid: &mut OccupancyGrid, index: usize) -> Search {
        if index == self.instances.len() {
            return Search::Solved;
        }

        self.nodes += 1;
        if let Some(max) = self.max_nodes
            && self.nodes > max
        {
            return Search::Budget;
        }

        // Necessary condition only: enough free cells left. Fragmentation
        // is caught by the placement scan below.
        if self.remaining[index] > grid.free_cells() {
            return Search::Unsolved;
        }

        let variant_set = Arc::clone(&self.instances[index].variants);
        let tag = b'A' + (index % 26) as u8;

        for variant in variant_set.iter() {
            if variant.width() > grid.width() || variant.height() > grid.height() {
                continue;
            }
            for y in 0..=grid.height() - variant.height() {
                for x in 0..=grid.width() - variant.width() {
                    if !grid.fits(variant, x, y) {
                        continue;
                    }
                    grid.place(variant, x, y, tag);
                    match self.recurse(grid, index + 1) {
                        Search::Solved => return Search::Solved,
                        Search::Unsolved => grid.unplace(variant, x, y),
                        Search::Budget => {
                            grid.unplace(variant, x, y);
                            return Search::Budget;
                        }
                    }
                }
            }
        }

        Search::Unsolved
    }
}

/// Decides whether `region`'s required shapes can be packed into it, with
/// an optional per-region node budget. Exhausting the budget yields
/// [`Verdict::Unknown`] rather than a claim either way.
pub fn evaluate_region_bounded(
    region: &RegionSpec,
    catalog: &ShapeCatalog,
    max_nodes: Option<u64>,
) -> Verdict {
    if region.width <= 0 || region.height <= 0 {
        return Verdict::Unsolvable;
    }
    let capacity = region.width as u128 * region.height as u128;

    // Resolve demands before expanding: a required shape missing from the
    // catalog settles the region, and the area bound is checked on
    // (qty x area) products so huge infeasible counts never allocate.
    let mut required: Vec<(usize, &ShapeMask, u64)> = Vec::new();
    let mut total_area: u128 = 0;
    let mut total_count: u128 = 0;
    for d in &region.demands {
        if d.qty == 0 {
            continue;
        }
        let Some(mask) = catalog.get(d.shape) else {
            return Verdict::Unsolvable;
        };
        total_area += d.qty as u128 * mask.area() as u128;
        total_count += d.qty as u128;
        required.push((d.shape, mask, d.qty));
    }

    if required.is_empty() {
        return Verdict::Solvable;
    }
    if total_area > capacity {
        return Verdict::Unsolvable;
    }
    // Past either ceiling the grid or the call stack would give out before
    // the search could answer; that is not a proof of infeasibility, so the
    // region reports Unknown instead of crashing.
    if capacity > MAX_GRID_CELLS || total_count > MAX_INSTANCES {
        return Verdict::Unknown;
    }
    let width = region.width as usize;
    let height = region.height as usize;

    // Variants are computed once per shape id, shared across its copies.
    let mut variant_sets: HashMap<usize, Arc<Vec<ShapeMask>>> = HashMap::new();
    let mut instances = Vec::new();
    for (id, mask, qty) in required {
        let set = variant_sets
            .entry(id)
            .or_insert_with(|| Arc::new(variants::variants(mask)));
        for _ in 0..qty {
            instances.push(Instance {
                area: mask.area(),
                variants: Arc::clone(set),
            });
        }
    }

    // Largest first: big shapes have the fewest placements and fail fast.
    instances.sort_by(|a, b| b.area.cmp(&a.area));

    let mut grid = OccupancyGrid::new(width, height);
    match Solver::new(instances, max_nodes).solve(&mut grid) {
        Search::Solved => Verdict::Solvable,
        Search::Unsolved => Verdict::Unsolvable,
        Search::Budget => Verdict::Unknown,
    }
}

/// Unbounded evaluation of one region.
pub fn evaluate_region(region: &RegionSpec, catalog: &ShapeCatalog) -> bool {
    evaluate_region_bounded(region, catalog, None) == Verdict::Solvable
}

/// Number of regions with a valid packing.
pub fn count_solvable(regions: &[RegionSpec], catalog: &ShapeCatalog) -> usize {
    regions
        .iter()
        .filter(|r| evaluate_region(r, catalog))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Demand;

    fn catalog(shapes: &[(usize, &[&str])]) -> ShapeCatalog {
        let mut cat = ShapeCatalog::new();
        for &(id, rows) in shapes {
            cat.insert(id, ShapeMask::from_rows(rows).unwrap());
        }
        cat
    }

    fn region(width: i64, height: i64, counts: &[u64]) -> RegionSpec {
        RegionSpec {
            width,
            height,
            demands: counts
                .iter()
                .enumerate()
                .map(|(shape, &qty)| Demand { shape, qty })
                .collect(),
        }
    }

    #[test]
    fn test_missing_shape_is_unsolvable() {
        // 1x1 region requiring one copy of undefined shape id 1.
        let cat = catalog(&[(0, &["#"])]);
        assert!(!evaluate_region(&region(1, 1, &[0, 1]), &cat));
    }

    #[test]
    fn test_zero_counts_trivially_solvable() {
        // All-zero counts need nothing, even with undefined shape ids.
        let cat = catalog(&[(0, &["#"])]);
        assert!(evaluate_region(&region(3, 3, &[0, 0, 0]), &cat));
        assert!(evaluate_region(&region(3, 3, &[]), &cat));
    }

    #[test]
    fn test_four_single_cells_fill_two_by_two() {
        let cat = catalog(&[(0, &["#"])]);
        assert!(evaluate_region(&region(2, 2, &[4]), &cat));
    }

    #[test]
    fn test_area_excess_is_unsolvable() {
        // Five cells into four: rejected by the area bound alone.
        let cat = catalog(&[(0, &["#"])]);
        assert!(!evaluate_region(&region(2, 2, &[5]), &cat));
    }

    #[test]
    fn test_area_excess_skips_expansion() {
        // A count far too large to ever expand still settles immediately.
        let cat = catalog(&[(0, &["#"])]);
        assert!(!evaluate_region(&region(10, 10, &[u64::MAX]), &cat));
    }

    #[test]
    fn test_non_positive_dimensions_unsolvable() {
        let cat = catalog(&[(0, &["#"])]);
        assert!(!evaluate_region(&region(0, 5, &[1]), &cat));
        assert!(!evaluate_region(&region(5, -1, &[1]), &cat));
        assert!(!evaluate_region(&region(0, 0, &[]), &cat));
    }

    #[test]
    fn test_partial_fill_allowed() {
        // Remaining cells may stay empty; only overlap is forbidden.
        let cat = catalog(&[(0, &["##"])]);
        assert!(evaluate_region(&region(5, 5, &[3]), &cat));
    }

    #[test]
    fn test_rotation_required() {
        // A 1x3 bar only fits a 1-wide column when rotated.
        let cat = catalog(&[(0, &["###"])]);
        assert!(evaluate_region(&region(1, 3, &[1]), &cat));
    }

    #[test]
    fn test_l_tromino_pair_tiles_box() {
        // Two L trominoes interlock to tile 2x3 exactly.
        let cat = catalog(&[(0, &["#.", "##"])]);
        assert!(evaluate_region(&region(2, 3, &[2]), &cat));
    }

    #[test]
    fn test_fragmentation_beats_area_bound() {
        // Two 2x2 squares have area 8 <= 9, but every pair of 2x2
        // placements in a 3x3 grid shares the center cell.
        let cat = catalog(&[(0, &["##", "##"])]);
        assert!(!evaluate_region(&region(3, 3, &[2]), &cat));
    }

    #[test]
    fn test_t_tetromino_pinwheel() {
        // Four T pieces tile 4x4 exactly, one per rotation.
        let cat = catalog(&[(0, &["###", ".#."])]);
        assert!(evaluate_region(&region(4, 4, &[4]), &cat));
    }

    #[test]
    fn test_l_tetromino_pair_tiles_column() {
        // Two L pieces tile a 2-wide, 4-tall region exactly.
        let cat = catalog(&[(0, &["#.", "#.", "##"])]);
        assert!(evaluate_region(&region(2, 4, &[2]), &cat));
    }

    #[test]
    fn test_count_solvable_mixed() {
        let cat = catalog(&[(0, &["#"])]);
        let regions = vec![region(2, 2, &[4]), region(2, 2, &[5])];
        assert_eq!(count_solvable(&regions, &cat), 1);
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let cat = catalog(&[(0, &[".##", "##."]), (1, &["##", "##"])]);
        let r = region(4, 4, &[2, 2]);
        let first = evaluate_region(&r, &cat);
        assert_eq!(evaluate_region(&r, &cat), first);
    }

    #[test]
    fn test_budget_exhaustion_is_unknown() {
        // A single node is not enough to place four pieces.
        let cat = catalog(&[(0, &["#.", "##"])]);
        let r = region(4, 3, &[4]);
        assert_eq!(
            evaluate_region_bounded(&r, &cat, Some(1)),
            Verdict::Unknown
        );
        assert_eq!(
            evaluate_region_bounded(&r, &cat, None),
            Verdict::Solvable
        );
    }

    #[test]
    fn test_huge_dimensions_are_unknown() {
        // A 5e9 x 5e9 grid can never be allocated. The demand area still
        // fits the capacity, so the region is not provably unsolvable; it
        // reports Unknown instead of overflowing or aborting.
        let cat = catalog(&[(0, &["#"])]);
        let r = region(5_000_000_000, 5_000_000_000, &[1]);
        assert_eq!(evaluate_region_bounded(&r, &cat, None), Verdict::Unknown);
        assert!(!evaluate_region(&r, &cat));
    }

    #[test]
    fn test_oversize_grid_is_unknown_below_overflow() {
        // Well under the multiply-overflow threshold but far past any
        // sane allocation.
        let cat = catalog(&[(0, &["#"])]);
        let r = region(100_000, 100_000, &[1]);
        assert_eq!(evaluate_region_bounded(&r, &cat, None), Verdict::Unknown);
    }

    #[test]
    fn test_excessive_instance_count_is_unknown() {
        // Search depth equals the instance count; past the ceiling the
        // region reports Unknown rather than risking the call stack.
        let cat = catalog(&[(0, &["#"])]);
        assert_eq!(
            evaluate_region_bounded(&region(100, 100, &[5000]), &cat, None),
            Verdict::Unknown
        );
        // The area bound still wins when it is conclusive.
        assert_eq!(
            evaluate_region_bounded(&region(10, 10, &[5000]), &cat, None),
            Verdict::Unsolvable
        );
    }

    #[test]
    fn test_budget_does_not_flip_fast_paths() {
        // Pre-checks settle before any search node is spent.
        let cat = catalog(&[(0, &["#"])]);
        assert_eq!(
            evaluate_region_bounded(&region(2, 2, &[5]), &cat, Some(1)),
            Verdict::Unsolvable
        );
        assert_eq!(
            evaluate_region_bounded(&region(2, 2, &[0]), &cat, Some(1)),
            Verdict::Solvable
        );
    }
}
