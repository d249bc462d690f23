use num_traits::Float;

/// Integer vertex in kernel coordinate space.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Vertex {
    pub x: i64,
    pub y: i64,
}

impl Vertex {
    #[inline(always)]
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

pub trait AlmostEqual<Rhs = Self> {
    fn almost_equal(self, other: Rhs, tolerance: Option<Rhs>) -> bool;
}

impl<T: Float> AlmostEqual for T {
    fn almost_equal(self, other: T, tolerance: Option<T>) -> bool {
        let tol = tolerance
            .or_else(|| T::from(1e-9))
            .unwrap_or_else(T::epsilon);
        (self - other).abs() < tol
    }
}

#[inline(always)]
pub fn cycle_index(index: usize, size: usize, offset: isize) -> usize {
    ((index as isize + offset).rem_euclid(size as isize)) as usize
}

/// Cross product of (a - o) and (b - o). Exact for all in-range coordinates.
#[inline]
pub fn cross3(o: Vertex, a: Vertex, b: Vertex) -> i128 {
    let ax = (a.x - o.x) as i128;
    let ay = (a.y - o.y) as i128;
    let bx = (b.x - o.x) as i128;
    let by = (b.y - o.y) as i128;
    ax * by - ay * bx
}

/// Twice the signed area, exact.
pub fn signed_area2(path: &[Vertex]) -> i128 {
    if path.len() < 3 {
        return 0;
    }
    let mut sum: i128 = 0;
    let mut j = path.len() - 1;
    for i in 0..path.len() {
        sum += (path[j].x as i128 + path[i].x as i128) * (path[i].y as i128 - path[j].y as i128);
        j = i;
    }
    sum
}

pub fn signed_area(path: &[Vertex]) -> f64 {
    signed_area2(path) as f64 / 2.0
}

/// Winding number of (x, y) summed over every path in `paths`.
/// Points exactly on an edge count as crossed on one side only; callers that
/// care about boundary coincidence must test for it separately.
pub fn winding_number(paths: &[Vec<Vertex>], x: f64, y: f64) -> i32 {
    let mut w = 0;
    for path in paths {
        if path.len() < 3 {
            continue;
        }
        let mut j = path.len() - 1;
        for i in 0..path.len() {
            let (ax, ay) = (path[j].x as f64, path[j].y as f64);
            let (bx, by) = (path[i].x as f64, path[i].y as f64);
            if ay <= y {
                if by > y && (bx - ax) * (y - ay) - (x - ax) * (by - ay) > 0.0 {
                    w += 1;
                }
            } else if by <= y && (bx - ax) * (y - ay) - (x - ax) * (by - ay) < 0.0 {
                w -= 1;
            }
            j = i;
        }
    }
    w
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum FillRule {
    EvenOdd = 0,
    NonZero = 1,
    Positive = 2,
    Negative = 3,
}

impl FillRule {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::EvenOdd),
            1 => Some(Self::NonZero),
            2 => Some(Self::Positive),
            3 => Some(Self::Negative),
            _ => None,
        }
    }

    #[inline]
    pub fn filled(self, winding: i32) -> bool {
        match self {
            Self::EvenOdd => winding % 2 != 0,
            Self::NonZero => winding != 0,
            Self::Positive => winding > 0,
            Self::Negative => winding < 0,
        }
    }
}

/// Proper or touching intersection between segments `a` and `b`.
pub enum SegCross {
    None,
    /// Single crossing; parameters along each segment in [0, 1].
    At { ta: f64, tb: f64 },
    /// Collinear overlap; parameters of b's endpoints along a and vice versa.
    Overlap {
        b_on_a: [Option<f64>; 2],
        a_on_b: [Option<f64>; 2],
    },
}

fn param_on(a1: Vertex, a2: Vertex, p: Vertex) -> Option<f64> {
    let dx = (a2.x - a1.x) as i128;
    let dy = (a2.y - a1.y) as i128;
    let px = (p.x - a1.x) as i128;
    let py = (p.y - a1.y) as i128;
    let len2 = dx * dx + dy * dy;
    if len2 == 0 {
        return None;
    }
    let dot = px * dx + py * dy;
    if dot <= 0 || dot >= len2 {
        return None;
    }
    Some(dot as f64 / len2 as f64)
}

pub fn segment_cross(a1: Vertex, a2: Vertex, b1: Vertex, b2: Vertex) -> SegCross {
    let d1x = (a2.x - a1.x) as i128;
    let d1y = (a2.y - a1.y) as i128;
    let d2x = (b2.x - b1.x) as i128;
    let d2y = (b2.y - b1.y) as i128;
    let denom = d1x * d2y - d1y * d2x;
    let ex = (b1.x - a1.x) as i128;
    let ey = (b1.y - a1.y) as i128;

    if denom == 0 {
        if ex * d1y - ey * d1x != 0 {
            return SegCross::None;
        }
        // Collinear: report interior projections of each other's endpoints.
        return SegCross::Overlap {
            b_on_a: [param_on(a1, a2, b1), param_on(a1, a2, b2)],
            a_on_b: [param_on(b1, b2, a1), param_on(b1, b2, a2)],
        };
    }

    let t_num = ex * d2y - ey * d2x;
    let u_num = ex * d1y - ey * d1x;
    // Reject without division when the crossing lies outside either segment.
    let (t_ok, u_ok) = if denom > 0 {
        (t_num >= 0 && t_num <= denom, u_num >= 0 && u_num <= denom)
    } else {
        (t_num <= 0 && t_num >= denom, u_num <= 0 && u_num >= denom)
    };
    if !t_ok || !u_ok {
        return SegCross::None;
    }
    SegCross::At {
        ta: t_num as f64 / denom as f64,
        tb: u_num as f64 / denom as f64,
    }
}

/// Point along segment at parameter t, snapped to the integer grid.
pub fn point_at(a: Vertex, b: Vertex, t: f64) -> Vertex {
    Vertex::new(
        (a.x as f64 + t * (b.x - a.x) as f64).round() as i64,
        (a.y as f64 + t * (b.y - a.y) as f64).round() as i64,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Vertex> {
        vec![
            Vertex::new(0, 0),
            Vertex::new(10, 0),
            Vertex::new(10, 10),
            Vertex::new(0, 10),
        ]
    }

    #[test]
    fn area_sign_tracks_orientation() {
        let mut sq = square();
        assert_eq!(signed_area2(&sq), 200);
        sq.reverse();
        assert_eq!(signed_area2(&sq), -200);
    }

    #[test]
    fn winding_inside_and_outside() {
        let paths = vec![square()];
        assert_eq!(winding_number(&paths, 5.0, 5.0), 1);
        assert_eq!(winding_number(&paths, -1.0, 5.0), 0);
    }

    #[test]
    fn crossing_segments_report_parameters() {
        match segment_cross(
            Vertex::new(0, 0),
            Vertex::new(10, 0),
            Vertex::new(5, -5),
            Vertex::new(5, 5),
        ) {
            SegCross::At { ta, tb } => {
                assert!(ta.almost_equal(0.5, None));
                assert!(tb.almost_equal(0.5, None));
            }
            _ => panic!("expected a single crossing"),
        }
    }

    #[test]
    fn collinear_overlap_reports_interior_endpoints() {
        match segment_cross(
            Vertex::new(0, 0),
            Vertex::new(10, 0),
            Vertex::new(4, 0),
            Vertex::new(14, 0),
        ) {
            SegCross::Overlap { b_on_a, a_on_b } => {
                assert!(b_on_a[0].unwrap().almost_equal(0.4, None));
                assert!(b_on_a[1].is_none());
                assert!(a_on_b[0].is_none());
                assert!(a_on_b[1].unwrap().almost_equal(0.6, None));
            }
            _ => panic!("expected collinear overlap"),
        }
    }

    #[test]
    fn fill_rules_classify_windings() {
        assert!(FillRule::EvenOdd.filled(1));
        assert!(!FillRule::EvenOdd.filled(2));
        assert!(FillRule::NonZero.filled(-2));
        assert!(FillRule::Positive.filled(1));
        assert!(!FillRule::Positive.filled(-1));
        assert!(FillRule::Negative.filled(-1));
    }
}
