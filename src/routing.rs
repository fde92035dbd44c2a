use crate::config::RoutingConfig;
use crate::model::Point;

/// Which way an edge anchor leaves its node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    Up,
    Down,
    Left,
    Right,
}

impl Facing {
    fn unit(self) -> (f32, f32) {
        match self {
            Facing::Up => (0.0, -1.0),
            Facing::Down => (0.0, 1.0),
            Facing::Left => (-1.0, 0.0),
            Facing::Right => (1.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadraticCurve {
    pub start: Point,
    pub control: Point,
    pub end: Point,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicCurve {
    pub start: Point,
    pub control1: Point,
    pub control2: Point,
    pub end: Point,
}

/// The shape the host should draw for one edge. Recomputed per frame from
/// the current anchor geometry; nothing here is stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CurveDescriptor {
    Quadratic(QuadraticCurve),
    Cubic(CubicCurve),
    /// Backward step-around: two cubics meeting at an offset column.
    TwoSegment { first: CubicCurve, second: CubicCurve },
}

/// Picks a curve for an edge between two anchors. Four regimes: a bulged
/// quadratic for very short edges, a two-segment step-around when the target
/// sits above a downward-facing source, a hanging arc for near-horizontal
/// pairs, and a plain cubic otherwise.
pub fn route(
    source: Point,
    target: Point,
    source_facing: Facing,
    target_facing: Facing,
    config: &RoutingConfig,
) -> CurveDescriptor {
    let dx = target.x - source.x;
    let dy = target.y - source.y;
    let dist = (dx * dx + dy * dy).sqrt();

    if dist < config.short_distance {
        return short_curve(source, target, dx, dy, dist, config);
    }

    let backward = source_facing == Facing::Down && target_facing == Facing::Up && dy < 0.0;
    if backward {
        return step_around(source, target, dx, dy, config);
    }

    if dy.abs() < config.flat_dy {
        let arc = config.flat_arc_min.max(dx.abs() * config.flat_arc_ratio);
        return CurveDescriptor::Quadratic(QuadraticCurve {
            start: source,
            control: Point::new((source.x + target.x) / 2.0, source.y.max(target.y) + arc),
            end: target,
        });
    }

    let reach = (dist * config.forward_offset_ratio).clamp(0.0, config.forward_offset_max);
    let (sx, sy) = source_facing.unit();
    let (tx, ty) = target_facing.unit();
    CurveDescriptor::Cubic(CubicCurve {
        start: source,
        control1: Point::new(source.x + sx * reach, source.y + sy * reach),
        control2: Point::new(target.x + tx * reach, target.y + ty * reach),
        end: target,
    })
}

/// Very short edges bow out perpendicular to the chord so they stay legible,
/// bulging toward the side opposite the horizontal direction of travel.
fn short_curve(
    source: Point,
    target: Point,
    dx: f32,
    dy: f32,
    dist: f32,
    config: &RoutingConfig,
) -> CurveDescriptor {
    let bulge = config.short_bulge_min.max(dist * config.short_bulge_ratio);
    let side = if dx >= 0.0 { -1.0 } else { 1.0 };
    let (px, py) = if dist > f32::EPSILON {
        (-dy / dist, dx / dist)
    } else {
        (0.0, -1.0)
    };
    CurveDescriptor::Quadratic(QuadraticCurve {
        start: source,
        control: Point::new(
            (source.x + target.x) / 2.0 + px * bulge * side,
            (source.y + target.y) / 2.0 + py * bulge * side,
        ),
        end: target,
    })
}

/// Backward edges leave the source downward, run out to an offset column on
/// the side `dx` points at, then come back in under the target.
fn step_around(source: Point, target: Point, dx: f32, dy: f32, config: &RoutingConfig) -> CurveDescriptor {
    let offset = (dy.abs() * config.backward_offset_ratio)
        .clamp(config.backward_offset_min, config.backward_offset_max);
    let side = if dx >= 0.0 { 1.0 } else { -1.0 };
    let column_x = source.x + offset * side;
    let pad = config.backward_pad_min.max(dy.abs() * config.backward_pad_ratio);
    let mid_y = (source.y + target.y) / 2.0;

    let first = CubicCurve {
        start: source,
        control1: Point::new(source.x, source.y + pad),
        control2: Point::new(column_x, source.y + pad),
        end: Point::new(column_x, mid_y),
    };
    let second = CubicCurve {
        start: Point::new(column_x, mid_y),
        control1: Point::new(column_x, target.y + pad),
        control2: Point::new(target.x, target.y + pad),
        end: target,
    };
    CurveDescriptor::TwoSegment { first, second }
}
