//! Glyph outline strings.
//!
//! An outline is a whitespace-separated command stream in font units:
//!
//! | Command | Operands | Meaning |
//! |---------|----------|---------|
//! | `m` | `x y` | start a new contour |
//! | `l` | `x y` | straight line |
//! | `q` | `x y cx cy` | quadratic curve, end point first |
//! | `b` | `x y c1x c1y c2x c2y` | cubic curve, end point first |

use glam::Vec2;
use lyon::geom::{CubicBezierSegment, QuadraticBezierSegment};
use lyon::math::{point, Point};

/// One parsed outline command, in font units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutlineCommand {
    MoveTo(Vec2),
    LineTo(Vec2),
    QuadTo { ctrl: Vec2, to: Vec2 },
    CubicTo { ctrl1: Vec2, ctrl2: Vec2, to: Vec2 },
}

/// A closed polyline; the last point connects back to the first.
pub type Contour = Vec<Vec2>;

/// Parse an outline string. Errors carry a human-readable reason.
pub fn parse_outline(outline: &str) -> Result<Vec<OutlineCommand>, String> {
    let mut tokens = outline.split_whitespace();
    let mut commands = Vec::new();

    while let Some(op) = tokens.next() {
        let mut point = |what: &str| -> Result<Vec2, String> {
            let x = number(tokens.next(), op, what)?;
            let y = number(tokens.next(), op, what)?;
            Ok(Vec2::new(x, y))
        };

        let command = match op {
            "m" => OutlineCommand::MoveTo(point("point")?),
            "l" => OutlineCommand::LineTo(point("point")?),
            "q" => {
                let to = point("end point")?;
                let ctrl = point("control point")?;
                OutlineCommand::QuadTo { ctrl, to }
            }
            "b" => {
                let to = point("end point")?;
                let ctrl1 = point("first control point")?;
                let ctrl2 = point("second control point")?;
                OutlineCommand::CubicTo { ctrl1, ctrl2, to }
            }
            other => return Err(format!("unknown outline command {other:?}")),
        };
        commands.push(command);
    }

    Ok(commands)
}

fn number(token: Option<&str>, op: &str, what: &str) -> Result<f32, String> {
    let token = token.ok_or_else(|| format!("`{op}` is missing its {what}"))?;
    token
        .parse()
        .map_err(|_| format!("`{op}` has a non-numeric {what}: {token:?}"))
}

/// Flatten commands into contours, scaling font units and offsetting by the
/// pen position. Curves become `curve_segments` straight pieces; lines stay
/// single segments.
///
/// Fails if any placed point is not finite.
pub fn flatten(
    commands: &[OutlineCommand],
    scale: f32,
    offset: [f32; 2],
    curve_segments: u32,
) -> Result<Vec<Contour>, String> {
    let offset = Vec2::from(offset);
    let place = |p: Vec2| -> Result<Point, String> {
        let placed = p * scale + offset;
        if placed.is_finite() {
            Ok(point(placed.x, placed.y))
        } else {
            Err(format!("point ({}, {}) does not map to a finite position", p.x, p.y))
        }
    };
    let segments = curve_segments.max(1);
    let steps = (1..=segments).map(move |i| i as f32 / segments as f32);

    let mut contours: Vec<Contour> = Vec::new();
    let mut current: Contour = Vec::new();
    let pen = |current: &Contour, fallback: Point| {
        current.last().map_or(fallback, |p| point(p.x, p.y))
    };

    for command in commands {
        match *command {
            OutlineCommand::MoveTo(p) => {
                finish_contour(&mut contours, std::mem::take(&mut current));
                current.push(to_vec2(place(p)?));
            }
            OutlineCommand::LineTo(p) => current.push(to_vec2(place(p)?)),
            OutlineCommand::QuadTo { ctrl, to } => {
                let ctrl = place(ctrl)?;
                let curve = QuadraticBezierSegment {
                    from: pen(&current, ctrl),
                    ctrl,
                    to: place(to)?,
                };
                current.extend(steps.clone().map(|t| to_vec2(curve.sample(t))));
            }
            OutlineCommand::CubicTo { ctrl1, ctrl2, to } => {
                let ctrl1 = place(ctrl1)?;
                let curve = CubicBezierSegment {
                    from: pen(&current, ctrl1),
                    ctrl1,
                    ctrl2: place(ctrl2)?,
                    to: place(to)?,
                };
                current.extend(steps.clone().map(|t| to_vec2(curve.sample(t))));
            }
        }
    }
    finish_contour(&mut contours, current);

    Ok(contours)
}

fn to_vec2(p: Point) -> Vec2 {
    Vec2::new(p.x, p.y)
}

/// Drop a closing point that repeats the start, then keep the contour if it
/// still encloses anything.
fn finish_contour(contours: &mut Vec<Contour>, mut contour: Contour) {
    if contour.len() > 1 && contour.first() == contour.last() {
        contour.pop();
    }
    if contour.len() >= 3 {
        contours.push(contour);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_commands() {
        let cmds = parse_outline("m 0 0 l 10 0 q 10 10 20 5 b 0 10 5 12 2 11").unwrap();
        assert_eq!(
            cmds,
            vec![
                OutlineCommand::MoveTo(Vec2::new(0.0, 0.0)),
                OutlineCommand::LineTo(Vec2::new(10.0, 0.0)),
                OutlineCommand::QuadTo {
                    ctrl: Vec2::new(20.0, 5.0),
                    to: Vec2::new(10.0, 10.0),
                },
                OutlineCommand::CubicTo {
                    ctrl1: Vec2::new(5.0, 12.0),
                    ctrl2: Vec2::new(2.0, 11.0),
                    to: Vec2::new(0.0, 10.0),
                },
            ]
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_outline("z 1 2").unwrap_err().contains("unknown"));
        assert!(parse_outline("m 1").unwrap_err().contains("missing"));
        assert!(parse_outline("l 1 x").unwrap_err().contains("non-numeric"));
        assert!(parse_outline("").unwrap().is_empty());
    }

    #[test]
    fn test_flatten_scales_and_offsets() {
        let cmds = parse_outline("m 0 0 l 2 0 l 2 2 l 0 2").unwrap();
        let contours = flatten(&cmds, 0.5, [5.0, -1.0], 12).unwrap();
        assert_eq!(contours.len(), 1);
        assert_eq!(
            contours[0],
            vec![
                Vec2::new(5.0, -1.0),
                Vec2::new(6.0, -1.0),
                Vec2::new(6.0, 0.0),
                Vec2::new(5.0, 0.0),
            ]
        );
    }

    #[test]
    fn test_curves_use_segment_count() {
        let cmds = parse_outline("m 0 0 l 10 0 q 0 10 10 10").unwrap();
        let contours = flatten(&cmds, 1.0, [0.0, 0.0], 12).unwrap();
        // move + line + 12 curve points
        assert_eq!(contours[0].len(), 14);
        let last = *contours[0].last().unwrap();
        assert!((last - Vec2::new(0.0, 10.0)).length() < 1e-5);
    }

    #[test]
    fn test_closing_point_and_degenerate_contours() {
        let cmds = parse_outline("m 0 0 l 1 0 l 1 1 l 0 0 m 5 5 l 6 6").unwrap();
        let contours = flatten(&cmds, 1.0, [0.0, 0.0], 4).unwrap();
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].len(), 3);
    }

    #[test]
    fn test_cubic_samples() {
        let cmds = parse_outline("m 0 0 b 10 0 0 10 10 10").unwrap();
        let contours = flatten(&cmds, 1.0, [0.0, 0.0], 8).unwrap();
        // move + 8 curve points, ending on the curve's end point.
        assert_eq!(contours[0].len(), 9);
        assert!((contours[0][8] - Vec2::new(10.0, 0.0)).length() < 1e-5);

        let cmds = parse_outline("m 0 0 l 4 0 b 0 0 4 4 0 4").unwrap();
        let contours = flatten(&cmds, 1.0, [0.0, 0.0], 8).unwrap();
        // Closing point equals the start and is dropped.
        assert_eq!(contours[0].len(), 2 + 8 - 1);
        let mid = contours[0][2 + 3];
        // B(0.5) = (from + 3 ctrl1 + 3 ctrl2 + to) / 8
        assert!((mid - Vec2::new(2.0, 3.0)).length() < 1e-5);
    }

    #[test]
    fn test_non_finite_points_are_rejected() {
        let cmds = parse_outline("m 0 0 l 1 0 l 1 1").unwrap();
        let err = flatten(&cmds, f32::INFINITY, [0.0, 0.0], 4).unwrap_err();
        assert!(err.contains("finite"));

        let cmds = parse_outline("m 0 0 l inf 0 l 1 1").unwrap();
        assert!(flatten(&cmds, 1.0, [0.0, 0.0], 4).is_err());
    }
}
