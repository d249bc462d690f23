use polyclip::{
    area, closed_paths_from_poly_tree, open_paths_from_poly_tree, orientation, poly_tree_to_paths,
    reverse_path, scale_path, ClipParams, ClipType, ClipperLib, IntPoint, LoadOptions, Path,
    PolyFillType, PolyTree, RequestedFormat, SubjectInput,
};
use proptest::prelude::*;

/// Star-shaped polygons: one vertex per evenly spaced angle at a random
/// radius. Simple by construction, counter-clockwise.
fn arb_simple_polygon() -> impl Strategy<Value = Path> {
    prop::collection::vec(50i64..1000, 3..10).prop_map(|radii| {
        let n = radii.len();
        radii
            .iter()
            .enumerate()
            .map(|(i, &r)| {
                let angle = std::f64::consts::TAU * i as f64 / n as f64;
                IntPoint::new(
                    (r as f64 * angle.cos()).round() as i64,
                    (r as f64 * angle.sin()).round() as i64,
                )
            })
            .collect()
    })
}

fn arb_rect() -> impl Strategy<Value = Path> {
    (-100i64..100, -100i64..100, 1i64..50, 1i64..50).prop_map(|(x, y, w, h)| {
        vec![
            IntPoint::new(x, y),
            IntPoint::new(x + w, y),
            IntPoint::new(x + w, y + h),
            IntPoint::new(x, y + h),
        ]
    })
}

fn cross3(o: IntPoint, a: IntPoint, b: IntPoint) -> i128 {
    (a.x as i128 - o.x as i128) * (b.y as i128 - o.y as i128)
        - (a.y as i128 - o.y as i128) * (b.x as i128 - o.x as i128)
}

/// True when the open interiors of the two segments intersect. Shared
/// endpoints and collinear touches do not count as crossings.
fn properly_cross(a1: IntPoint, a2: IntPoint, b1: IntPoint, b2: IntPoint) -> bool {
    let d1 = cross3(a1, a2, b1);
    let d2 = cross3(a1, a2, b2);
    let d3 = cross3(b1, b2, a1);
    let d4 = cross3(b1, b2, a2);
    d1 != 0 && d2 != 0 && d3 != 0 && d4 != 0 && (d1 > 0) != (d2 > 0) && (d3 > 0) != (d4 > 0)
}

fn closed_edges(paths: &[Path]) -> Vec<(IntPoint, IntPoint)> {
    let mut out = Vec::new();
    for path in paths {
        for i in 0..path.len() {
            let a = path[i];
            let b = path[(i + 1) % path.len()];
            if a != b {
                out.push((a, b));
            }
        }
    }
    out
}

proptest! {
    #[test]
    fn orientation_flips_under_reversal(mut poly in arb_simple_polygon()) {
        prop_assume!(area(&poly) != 0.0);
        let before = orientation(&poly);
        reverse_path(&mut poly);
        prop_assert_eq!(orientation(&poly), !before);
    }

    #[test]
    fn area_negates_under_reversal(mut poly in arb_simple_polygon()) {
        let before = area(&poly);
        reverse_path(&mut poly);
        prop_assert_eq!(area(&poly), -before);
    }

    #[test]
    fn scaling_by_one_is_identity(poly in arb_simple_polygon()) {
        prop_assert_eq!(scale_path(&poly, 1.0), poly);
    }

    #[test]
    fn tree_flatteners_partition_every_node(
        entries in prop::collection::vec(
            (arb_rect(), any::<bool>(), any::<prop::sample::Index>()),
            0..8,
        )
    ) {
        let mut tree = PolyTree::new();
        let mut nodes = vec![0usize];
        for (path, open, parent_pick) in entries {
            let parent = nodes[parent_pick.index(nodes.len())];
            nodes.push(tree.add_node(parent, path, open, false));
        }
        let all = poly_tree_to_paths(&tree);
        let open = open_paths_from_poly_tree(&tree);
        let closed = closed_paths_from_poly_tree(&tree);
        prop_assert_eq!(all.len(), tree.total());
        prop_assert_eq!(open.len() + closed.len(), all.len());
        for path in open.iter().chain(closed.iter()) {
            prop_assert!(all.contains(path));
        }
    }

    #[test]
    fn union_never_loses_area(a in arb_rect(), b in arb_rect()) {
        let lib = ClipperLib::load(
            RequestedFormat::WasmWithAsmJsFallback,
            &LoadOptions::default(),
        ).unwrap();
        let solution = lib.clip_to_paths(&ClipParams {
            clip_type: ClipType::Union,
            subject_inputs: vec![SubjectInput { data: vec![a.clone()], closed: true }],
            clip_inputs: vec![vec![b.clone()]],
            subject_fill_type: PolyFillType::NonZero,
            clip_fill_type: PolyFillType::NonZero,
        }).unwrap();
        let total: f64 = solution.iter().map(|p| area(p)).sum();
        let floor = area(&a).max(area(&b));
        prop_assert!(total >= floor - 1e-6, "union area {total} below {floor}");
    }

    #[test]
    fn boolean_outputs_never_cross(
        a in arb_simple_polygon(),
        b in arb_simple_polygon(),
        dx in -400i64..400,
        dy in -400i64..400,
    ) {
        let lib = ClipperLib::load(
            RequestedFormat::WasmWithAsmJsFallback,
            &LoadOptions::default(),
        ).unwrap();
        let b: Path = b.iter().map(|p| IntPoint::new(p.x + dx, p.y + dy)).collect();
        for clip_type in [
            ClipType::Intersection,
            ClipType::Union,
            ClipType::Difference,
            ClipType::Xor,
        ] {
            let solution = lib.clip_to_paths(&ClipParams {
                clip_type,
                subject_inputs: vec![SubjectInput { data: vec![a.clone()], closed: true }],
                clip_inputs: vec![vec![b.clone()]],
                subject_fill_type: PolyFillType::NonZero,
                clip_fill_type: PolyFillType::NonZero,
            }).unwrap();
            let edges = closed_edges(&solution);
            for (i, &(p1, p2)) in edges.iter().enumerate() {
                for &(q1, q2) in &edges[i + 1..] {
                    prop_assert!(
                        !properly_cross(p1, p2, q1, q2),
                        "{:?} output edges cross: ({:?},{:?}) x ({:?},{:?})",
                        clip_type, p1, p2, q1, q2,
                    );
                }
            }
        }
    }
}
