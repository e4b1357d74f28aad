use pretty_assertions::assert_eq;
use proptest::prelude::*;
use search_forest::{Error, KdTree, KdView, Point, Removal, SearchTree};

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 1_000;

/// Coordinates on a small grid, so ties and duplicates are common.
fn point_strategy() -> impl Strategy<Value = [i32; 2]> {
    [-30i32..30, -30i32..30]
}

fn distance(a: &[i32], b: &[i32]) -> u64 {
    a.iter().zip(b).map(|(&x, &y)| u64::from(x.abs_diff(y)).pow(2)).sum()
}

/// Asserts the split rule under `node` against the bounds collected on the way down.
fn assert_split(node: Option<KdView<'_, i32>>, bounds: &mut Vec<(usize, i32, bool)>) -> usize {
    let Some(node) = node else { return 0 };
    let point = node.point();
    for &(axis, split, is_left) in bounds.iter() {
        if is_left {
            assert!(point[axis] < split, "{point:?} should be below {split} on axis {axis}");
        } else {
            assert!(point[axis] >= split, "{point:?} should be at or above {split} on axis {axis}");
        }
    }
    let axis = node.axis();
    assert_eq!(axis, node.depth() % 2);

    bounds.push((axis, point[axis], true));
    let left = assert_split(node.left(), bounds);
    bounds.pop();
    bounds.push((axis, point[axis], false));
    let right = assert_split(node.right(), bounds);
    bounds.pop();
    1 + left + right
}

fn sorted(mut points: Vec<[i32; 2]>) -> Vec<[i32; 2]> {
    points.sort_unstable();
    points
}

fn stored(tree: &KdTree<i32>) -> Vec<[i32; 2]> {
    sorted(tree.points().into_iter().map(|p| [p[0], p[1]]).collect())
}

// ─── Operations enum for driving randomized tests ────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    Insert([i32; 2]),
    Delete([i32; 2]),
    Search([i32; 2]),
    Nearest([i32; 2]),
    Range([i32; 2], [i32; 2]),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => point_strategy().prop_map(Op::Insert),
        3 => point_strategy().prop_map(Op::Delete),
        2 => point_strategy().prop_map(Op::Search),
        2 => point_strategy().prop_map(Op::Nearest),
        1 => (point_strategy(), point_strategy()).prop_map(|(a, b)| {
            Op::Range([a[0].min(b[0]), a[1].min(b[1])], [a[0].max(b[0]), a[1].max(b[1])])
        }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Replays random operations on both KdTree and a plain Vec scanned by brute force.
    #[test]
    fn ops_match_brute_force(ops in proptest::collection::vec(op_strategy(), TEST_SIZE)) {
        let mut tree: KdTree<i32> = KdTree::new();
        let mut model: Vec<[i32; 2]> = Vec::new();

        for op in &ops {
            match op {
                Op::Insert(p) => {
                    prop_assert!(tree.insert(*p).unwrap().is_inserted());
                    model.push(*p);
                }
                Op::Delete(p) => {
                    let expected = match model.iter().position(|q| q == p) {
                        Some(index) => {
                            model.swap_remove(index);
                            Removal::Removed
                        }
                        None => Removal::NotFound,
                    };
                    prop_assert_eq!(tree.delete(p).unwrap(), expected, "delete({:?})", p);
                }
                Op::Search(p) => {
                    let found = tree.search(p).unwrap();
                    prop_assert_eq!(found.is_some(), model.contains(p), "search({:?})", p);
                    if let Some(id) = found {
                        prop_assert_eq!(tree.get(id).unwrap().as_slice(), p.as_slice());
                    }
                }
                Op::Nearest(target) => {
                    let best = model.iter().map(|p| distance(p, target)).min();
                    let found = tree.nearest(target).unwrap().and_then(|id| tree.get(id));
                    prop_assert_eq!(found.map(|p| distance(p, target)), best, "nearest({:?})", target);
                }
                Op::Range(min, max) => {
                    let expected = sorted(
                        model
                            .iter()
                            .filter(|p| (0..2).all(|i| min[i] <= p[i] && p[i] <= max[i]))
                            .copied()
                            .collect(),
                    );
                    let hits = tree.range(min, max).unwrap();
                    let actual = sorted(hits.into_iter().map(|id| {
                        let p = tree.get(id).unwrap();
                        [p[0], p[1]]
                    }).collect());
                    prop_assert_eq!(actual, expected, "range({:?}, {:?})", min, max);
                }
            }
            prop_assert_eq!(tree.len(), model.len());
            prop_assert_eq!(assert_split(tree.root_view(), &mut Vec::new()), model.len());
        }

        prop_assert_eq!(stored(&tree), sorted(model));
    }

    /// A k-d tree built over more than two axes still answers nearest exactly.
    #[test]
    fn nearest_in_three_dimensions(
        points in proptest::collection::vec([-50i64..50, -50i64..50, -50i64..50], 1..300),
        target in [-60i64..60, -60i64..60, -60i64..60],
    ) {
        let mut tree = KdTree::<i64>::with_dimensions(3).unwrap();
        for p in &points {
            tree.insert(*p).unwrap();
        }
        let squared = |p: &[i64]| -> u128 {
            p.iter().zip(&target).map(|(&x, &y)| u128::from(x.abs_diff(y)).pow(2)).sum()
        };
        let best = points.iter().map(|p| squared(p.as_slice())).min();
        let found = tree.nearest(&target).unwrap().and_then(|id| tree.get(id));
        prop_assert_eq!(found.map(|p| squared(p.as_slice())), best);
    }
}

// ─── Concrete scenarios ──────────────────────────────────────────────────────

fn four_points() -> KdTree<i32> {
    let mut tree: KdTree<i32> = KdTree::new();
    for p in [[2, 3], [5, 4], [9, 6], [4, 7]] {
        tree.insert(p).unwrap();
    }
    tree
}

#[test]
fn nearest_to_nine_two() {
    let tree = four_points();
    let id = tree.nearest(&[9, 2]).unwrap().unwrap();
    assert_eq!(tree.get(id), Some(&Point::from([9, 6])));
}

#[test]
fn range_over_the_upper_box() {
    let tree = four_points();
    let hits: Vec<[i32; 2]> = tree
        .range(&[3, 3], &[9, 7])
        .unwrap()
        .into_iter()
        .map(|id| {
            let p = tree.get(id).unwrap();
            [p[0], p[1]]
        })
        .collect();
    assert_eq!(sorted(hits), vec![[4, 7], [5, 4], [9, 6]]);
}

#[test]
fn wrong_dimensions_are_errors() {
    let mut tree = four_points();
    let mismatch = Err(Error::DimensionMismatch { expected: 2, found: 1 });
    assert_eq!(tree.nearest(&[1]), mismatch.clone());
    assert_eq!(tree.search(&[1]), mismatch);
    assert_eq!(SearchTree::insert(&mut tree, Point::from([1, 2, 3])).unwrap_err(), Error::DimensionMismatch {
        expected: 2,
        found: 3,
    });
    assert_eq!(tree.len(), 4);
    assert_eq!(stored(&tree), vec![[2, 3], [4, 7], [5, 4], [9, 6]]);
}

#[test]
fn empty_tree_queries() {
    let mut tree = KdTree::<f64>::new();
    assert_eq!(tree.nearest(&[0.0, 0.0]), Ok(None));
    assert_eq!(tree.range(&[0.0, 0.0], &[1.0, 1.0]), Ok(vec![]));
    assert_eq!(tree.delete(&[0.0, 0.0]), Ok(Removal::NotFound));
    assert!(tree.root_view().is_none());
}

#[test]
fn single_point_is_always_nearest() {
    let mut tree = KdTree::<f64>::new();
    tree.insert([3.0, 5.0]).unwrap();
    let id = tree.root().unwrap();

    // Far away, on the point itself, and just either side of the root's x split.
    for target in [[1e9, -1e9], [3.0, 5.0], [2.5, 5.0], [3.5, 5.0], [3.0, -40.0]] {
        assert_eq!(tree.nearest(&target), Ok(Some(id)), "target {target:?}");
    }

    assert_eq!(tree.range(&[3.0, 5.0], &[3.0, 5.0]), Ok(vec![id]));
    assert_eq!(tree.range(&[3.5, 0.0], &[9.0, 9.0]), Ok(vec![]));

    assert_eq!(tree.delete(&[3.0, 5.0]), Ok(Removal::Removed));
    assert!(tree.get(id).is_none());
    assert_eq!(tree.nearest(&[3.0, 5.0]), Ok(None));
}
