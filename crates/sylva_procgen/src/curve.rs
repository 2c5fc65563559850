use glam::Vec3;

use crate::rng::RandomSequence;

/// Control-point count for trunk and branch medial axes.
pub const TRUNK_STEPS: u32 = 10;
/// Control-point count for grass-blade medial axes.
pub const BLADE_STEPS: u32 = 5;
/// Cross-section scale at the far end of a swept profile.
pub const SWEEP_TAPER: f32 = 0.5;

/// Grow a medial-axis polyline from `origin` rising to `origin.y + height`.
///
/// Each step adds horizontal drift of `asin(t)/90 * uniform(0, 200*curviness)`
/// per axis, accumulated from the previous point; asin grows steeply toward
/// t = 1, so the curve starts straight and leans harder near the tip.
/// `curviness` separates trunk, thin-branch, and grass-blade silhouettes.
pub fn grow_curve(
    rng: &mut RandomSequence,
    origin: Vec3,
    height: f32,
    curviness: f32,
    steps: u32,
) -> Vec<Vec3> {
    let steps = steps.max(1);
    let mut points = Vec::with_capacity(steps as usize + 1);
    points.push(origin);
    for k in 1..=steps {
        let t = k as f32 / steps as f32;
        let lean = t.asin() / 90.0;
        let prev = points[k as usize - 1];
        let dx = lean * rng.uniform(0.0, 200.0 * curviness);
        let dz = lean * rng.uniform(0.0, 200.0 * curviness);
        points.push(Vec3::new(
            prev.x + dx,
            origin.y + t * height,
            prev.z + dz,
        ));
    }
    points
}

/// Arc-length parameterized position on a polyline, `t` clamped to [0, 1].
pub fn point_at(points: &[Vec3], t: f32) -> Vec3 {
    let Some(first) = points.first() else {
        return Vec3::ZERO;
    };
    if points.len() == 1 {
        return *first;
    }

    let total: f32 = points.windows(2).map(|w| w[0].distance(w[1])).sum();
    if total <= f32::EPSILON {
        return *first;
    }

    let mut remaining = t.clamp(0.0, 1.0) * total;
    for w in points.windows(2) {
        let segment = w[0].distance(w[1]);
        if remaining <= segment {
            return w[0].lerp(w[1], remaining / segment);
        }
        remaining -= segment;
    }
    points[points.len() - 1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curve_point_count_and_rise() {
        let mut rng = RandomSequence::new(42);
        let points = grow_curve(&mut rng, Vec3::ZERO, 20.0, 1.0, TRUNK_STEPS);

        assert_eq!(points.len(), 11);
        assert_eq!(points[0], Vec3::ZERO);
        assert!((points[10].y - 20.0).abs() < 1e-4);

        // Height rises monotonically with the parameter
        for w in points.windows(2) {
            assert!(w[1].y > w[0].y);
        }
    }

    #[test]
    fn test_curve_is_deterministic() {
        let mut a = RandomSequence::new(7);
        let mut b = RandomSequence::new(7);
        let ca = grow_curve(&mut a, Vec3::new(1.0, 2.0, 3.0), 15.0, 0.5, TRUNK_STEPS);
        let cb = grow_curve(&mut b, Vec3::new(1.0, 2.0, 3.0), 15.0, 0.5, TRUNK_STEPS);
        assert_eq!(ca, cb);
    }

    #[test]
    fn test_zero_curviness_stays_vertical() {
        let mut rng = RandomSequence::new(3);
        let points = grow_curve(&mut rng, Vec3::ZERO, 10.0, 0.0, TRUNK_STEPS);
        for p in &points {
            assert_eq!(p.x, 0.0);
            assert_eq!(p.z, 0.0);
        }
    }

    #[test]
    fn test_drift_grows_toward_tip() {
        // With full curviness the tip wanders further from the axis than the
        // first step does, thanks to the asin ramp and accumulation.
        let mut rng = RandomSequence::new(11);
        let points = grow_curve(&mut rng, Vec3::ZERO, 30.0, 1.0, TRUNK_STEPS);
        let early = points[1].x.abs() + points[1].z.abs();
        let tip = points[10].x.abs() + points[10].z.abs();
        assert!(tip >= early);
    }

    #[test]
    fn test_point_at_endpoints() {
        let line = [Vec3::ZERO, Vec3::new(0.0, 10.0, 0.0)];
        assert_eq!(point_at(&line, 0.0), Vec3::ZERO);
        assert_eq!(point_at(&line, 1.0), Vec3::new(0.0, 10.0, 0.0));
        assert_eq!(point_at(&line, 0.5), Vec3::new(0.0, 5.0, 0.0));
    }

    #[test]
    fn test_point_at_clamps_parameter() {
        let line = [Vec3::ZERO, Vec3::new(0.0, 10.0, 0.0)];
        assert_eq!(point_at(&line, -1.0), Vec3::ZERO);
        assert_eq!(point_at(&line, 2.0), Vec3::new(0.0, 10.0, 0.0));
    }

    #[test]
    fn test_point_at_walks_arc_length() {
        // Two segments of unequal length: t = 0.75 lands inside the second
        let points = [
            Vec3::ZERO,
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 4.0, 0.0),
        ];
        let p = point_at(&points, 0.75);
        assert!((p.y - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_point_at_degenerate_inputs() {
        assert_eq!(point_at(&[], 0.5), Vec3::ZERO);
        let single = [Vec3::new(1.0, 1.0, 1.0)];
        assert_eq!(point_at(&single, 0.5), single[0]);
    }
}
