//! Per-panel scene construction and drawing.
//!
//! [`build_panel_scene`] turns a point set, its group masks and a camera into
//! plain pixel-space primitives (panes, grid lines, markers, labels). The
//! drawing step only walks those primitives, so any plotters backend can be
//! used and the geometry can be checked without rendering.

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::projection::{Camera, Projector};
use super::{PanelView, Result, VisualizationError};
use crate::config::{Axis, AxesConfig, RenderConfig};
use crate::core::loaders::PointSet;
use crate::processors::classification::{Group, GroupMasks};

/// Share of the panel the plotting cube may occupy.
const CUBE_FILL: f64 = 0.86;

/// Pane background (white).
const PANE_COLOR: RGBColor = RGBColor(255, 255, 255);

/// Grid line color (mid gray).
const GRID_COLOR: RGBColor = RGBColor(128, 128, 128);

/// Marker outline for the 3D points (white).
const OUTLINE_COLOR: RGBColor = RGBColor(255, 255, 255);

/// Offset of tick labels beyond the cube edge, in cube units.
const TICK_OFFSET: f64 = 1.15;

/// Offset of axis names beyond the cube edge, in cube units.
const AXIS_LABEL_OFFSET: f64 = 1.4;

/// Markers are clamped to this many panel sizes around the panel center.
const MARKER_BOUND: f64 = 4.0;

/// Fixed drawing attributes of a group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupStyle {
    pub color: RGBColor,
    /// Multiplier applied to the base marker size
    pub size_factor: f64,
    pub shadow_alpha: f64,
    pub alpha: f64,
}

/// Look up the drawing attributes of a group.
///
/// `Other` is smaller and more transparent so the identified clusters stay
/// visually dominant.
pub fn group_style(group: Group) -> GroupStyle {
    let (color, size_factor, alpha) = match group {
        Group::OxygenRich => (RGBColor(255, 0, 0), 1.0, 0.8),
        Group::CarbonRich => (RGBColor(0x1A, 0x7E, 0xFF), 1.0, 0.8),
        Group::CoolShell => (RGBColor(0, 128, 0), 1.0, 0.8),
        Group::WarmShell => (RGBColor(0xFF, 0xC8, 0x1A), 1.0, 0.8),
        Group::Other => (RGBColor(51, 51, 51), 1.0 / 3.0, 0.4),
    };
    GroupStyle {
        color,
        size_factor,
        shadow_alpha: 0.3,
        alpha,
    }
}

/// Side length in pixels of a square marker of `size` points squared.
pub fn marker_side_px(size: f64, config: &RenderConfig) -> u32 {
    let side = config.points_to_px(size.max(0.0).sqrt()).round();
    side.max(1.0) as u32
}

/// A square marker centred on `pos`.
#[derive(Debug, Clone)]
pub struct Marker {
    pub group: Group,
    pub pos: (i32, i32),
    pub side: u32,
    pub color: RGBAColor,
    /// Light edge of 3D markers at least 2 px wide. A 2 px marker only gets
    /// its top edge outlined so the fill stays visible.
    pub outline: Option<RGBAColor>,
    pub depth: f64,
}

/// Text placed centred on `pos`.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub pos: (i32, i32),
    pub size_px: f64,
}

/// One of the three bounding planes the shadows are projected onto.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wall {
    /// Axis the wall is perpendicular to
    pub normal: Axis,
    /// Data value of `normal` on the wall
    pub at: f64,
}

impl Wall {
    /// The two axes spanning the wall.
    pub fn in_plane(&self) -> [Axis; 2] {
        match self.normal {
            Axis::X => [Axis::Y, Axis::Z],
            Axis::Y => [Axis::X, Axis::Z],
            Axis::Z => [Axis::X, Axis::Y],
        }
    }

    /// Flatten a data point onto the wall.
    #[inline]
    pub fn flatten(&self, mut p: [f64; 3]) -> [f64; 3] {
        p[self.normal.index()] = self.at;
        p
    }
}

/// Bottom (z = z_lo) and the two back walls (x = x_hi, y = y_hi).
pub fn shadow_walls(axes: &AxesConfig) -> [Wall; 3] {
    [
        Wall { normal: Axis::Z, at: axes.z.lo },
        Wall { normal: Axis::X, at: axes.x.hi },
        Wall { normal: Axis::Y, at: axes.y.hi },
    ]
}

/// Everything needed to draw one eye view.
#[derive(Debug, Clone)]
pub struct PanelScene {
    pub view: PanelView,
    pub panes: Vec<Vec<(i32, i32)>>,
    pub grid: Vec<[(i32, i32); 2]>,
    /// Shadow markers in drawing order
    pub shadows: Vec<Marker>,
    /// 3D markers in drawing order
    pub points: Vec<Marker>,
    pub labels: Vec<Label>,
}

impl PanelScene {
    /// Number of 3D markers drawn for `group`.
    pub fn point_count(&self, group: Group) -> usize {
        self.points.iter().filter(|m| m.group == group).count()
    }
}

/// Build the primitives of one panel of `width` x `height` pixels.
pub fn build_panel_scene(
    points: &PointSet,
    masks: &GroupMasks,
    config: &RenderConfig,
    view: PanelView,
    width: u32,
    height: u32,
) -> PanelScene {
    let camera = Camera {
        azimuth: view.azimuth,
        elevation: config.elevation,
    };
    let proj = Projector::fit(camera, width, height, CUBE_FILL);
    let axes = &config.axes;
    let walls = shadow_walls(axes);
    let to_px = |p: [f64; 3]| proj.to_pixel(axes.normalize(p));

    let mut panes = Vec::with_capacity(walls.len());
    let mut grid = Vec::new();
    for wall in &walls {
        let [a, b] = wall.in_plane();
        let (spec_a, spec_b) = (axes.get(a), axes.get(b));
        let corner = |va: f64, vb: f64| {
            let mut p = [0.0; 3];
            p[wall.normal.index()] = wall.at;
            p[a.index()] = va;
            p[b.index()] = vb;
            p
        };

        panes.push(vec![
            to_px(corner(spec_a.lo, spec_b.lo)),
            to_px(corner(spec_a.hi, spec_b.lo)),
            to_px(corner(spec_a.hi, spec_b.hi)),
            to_px(corner(spec_a.lo, spec_b.hi)),
        ]);

        for &t in &spec_a.ticks {
            grid.push([to_px(corner(t, spec_b.lo)), to_px(corner(t, spec_b.hi))]);
        }
        for &t in &spec_b.ticks {
            grid.push([to_px(corner(spec_a.lo, t)), to_px(corner(spec_a.hi, t))]);
        }
    }

    // Far-off objects are pinned outside the panel; unprojectable ones are skipped
    let bound = MARKER_BOUND * width.max(height) as f64;

    let mut shadows = Vec::new();
    let mut markers = Vec::new();
    for group in Group::ALL {
        let style = group_style(group);
        let side = marker_side_px(config.marker_size * style.size_factor, config);
        let indices = masks.indices(group);

        let shadow_color = style.color.mix(style.shadow_alpha);
        for wall in &walls {
            for &i in &indices {
                let p = axes.normalize(wall.flatten(points.point(i)));
                if let Some(pos) = proj.to_pixel_within(p, bound) {
                    shadows.push(Marker {
                        group,
                        pos,
                        side,
                        color: shadow_color,
                        outline: None,
                        depth: proj.depth(p),
                    });
                }
            }
        }

        let outline = (side >= 2).then(|| OUTLINE_COLOR.mix(style.alpha));
        let mut group_markers: Vec<Marker> = indices
            .iter()
            .filter_map(|&i| {
                let p = axes.normalize(points.point(i));
                let pos = proj.to_pixel_within(p, bound)?;
                Some(Marker {
                    group,
                    pos,
                    side,
                    color: style.color.mix(style.alpha),
                    outline,
                    depth: proj.depth(p),
                })
            })
            .collect();
        // Far to near within the group
        group_markers.sort_by(|a, b| a.depth.total_cmp(&b.depth));
        markers.extend(group_markers);
    }

    let labels = if config.draw_labels {
        axis_labels(&proj, config, view, width, height)
    } else {
        Vec::new()
    };

    PanelScene {
        view,
        panes,
        grid,
        shadows,
        points: markers,
        labels,
    }
}

/// Tick labels, axis names and the panel caption.
fn axis_labels(
    proj: &Projector,
    config: &RenderConfig,
    view: PanelView,
    width: u32,
    height: u32,
) -> Vec<Label> {
    let axes = &config.axes;
    let font_px = config.points_to_px(config.font_size);

    // Edges away from the shadow walls, in cube units
    let x_front = axes.x.normalize(axes.x.lo);
    let y_front = axes.y.normalize(axes.y.lo);
    let y_back = axes.y.normalize(axes.y.hi);
    let z_floor = axes.z.normalize(axes.z.lo);

    let anchor = |axis: Axis, t: f64, offset: f64| -> [f64; 3] {
        match axis {
            Axis::X => [t, y_front * offset, z_floor],
            Axis::Y => [x_front * offset, t, z_floor],
            Axis::Z => [x_front * offset, y_back * offset, t],
        }
    };

    let mut labels = Vec::new();
    for axis in Axis::ALL {
        let spec = axes.get(axis);
        for &tick in &spec.ticks {
            let t = spec.normalize(tick);
            labels.push(Label {
                text: format!("{}", tick),
                pos: proj.to_pixel(anchor(axis, t, TICK_OFFSET)),
                size_px: font_px,
            });
        }
        let mid = spec.normalize((spec.lo + spec.hi) / 2.0);
        labels.push(Label {
            text: spec.label.clone(),
            pos: proj.to_pixel(anchor(axis, mid, AXIS_LABEL_OFFSET)),
            size_px: font_px,
        });
    }

    labels.push(Label {
        text: view.caption(),
        pos: ((width / 2) as i32, height as i32 - font_px.round() as i32),
        size_px: font_px,
    });

    labels
}

fn plot_err<E: std::fmt::Display>(e: E) -> VisualizationError {
    VisualizationError::PlottingError(e.to_string())
}

fn draw_marker<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, marker: &Marker) -> Result<()> {
    let side = marker.side.min(i32::MAX as u32) as i32;
    let x0 = marker.pos.0.saturating_sub(side / 2);
    let y0 = marker.pos.1.saturating_sub(side / 2);
    let x1 = x0.saturating_add(side - 1);
    let y1 = y0.saturating_add(side - 1);

    area.draw(&Rectangle::new([(x0, y0), (x1, y1)], marker.color.filled()))
        .map_err(plot_err)?;
    match marker.outline {
        Some(outline) if side >= 3 => {
            area.draw(&Rectangle::new([(x0, y0), (x1, y1)], outline.stroke_width(1)))
                .map_err(plot_err)?;
        }
        Some(outline) => {
            area.draw(&PathElement::new(vec![(x0, y0), (x1, y0)], outline.stroke_width(1)))
                .map_err(plot_err)?;
        }
        None => {}
    }
    Ok(())
}

/// Draw a panel scene onto a drawing area of the size it was built for.
pub fn draw_panel_scene<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    scene: &PanelScene,
) -> Result<()> {
    for pane in &scene.panes {
        area.draw(&Polygon::new(pane.clone(), PANE_COLOR.filled()))
            .map_err(plot_err)?;
    }

    for line in &scene.grid {
        area.draw(&PathElement::new(line.to_vec(), GRID_COLOR.stroke_width(1)))
            .map_err(plot_err)?;
    }

    for marker in scene.shadows.iter().chain(&scene.points) {
        draw_marker(area, marker)?;
    }

    for label in &scene.labels {
        let style = ("sans-serif", label.size_px)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Center));
        area.draw(&Text::new(label.text.clone(), label.pos, style))
            .map_err(plot_err)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlotConfig;
    use crate::processors::classification::classify;

    fn sample_points() -> PointSet {
        PointSet::from_points(&[
            [1.0, 1.0, 1.0],   // oxygen-rich
            [1.5, 2.0, 0.8],   // carbon-rich
            [0.0, 0.0, 3.0],   // cool shell
            [0.8, 2.5, 2.0],   // warm shell
            [3.0, 3.0, 0.0],   // other
            [0.0, 0.0, -0.5],  // carbon-rich and cool shell
        ])
    }

    fn quiet_config() -> RenderConfig {
        let mut config = PlotConfig::default();
        config.figure.draw_labels = false;
        config.render_config()
    }

    #[test]
    fn test_style_table() {
        for group in Group::IDENTIFIED {
            let style = group_style(group);
            assert_eq!(style.size_factor, 1.0);
            assert_eq!(style.shadow_alpha, 0.3);
            assert_eq!(style.alpha, 0.8);
        }
        let other = group_style(Group::Other);
        assert!((other.size_factor - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(other.alpha, 0.4);
        assert_eq!(group_style(Group::CarbonRich).color, RGBColor(26, 126, 255));
    }

    #[test]
    fn test_marker_side_grows_with_resolution() {
        let mut config = PlotConfig::default();
        config.figure.width_px = 1280;
        let small = config.render_config();
        config.figure.width_px = 5120;
        let large = config.render_config();

        let s_small = marker_side_px(small.marker_size, &small);
        let s_large = marker_side_px(large.marker_size, &large);
        assert!(s_large > s_small);
        assert!(marker_side_px(small.marker_size / 3.0, &small) >= 1);
    }

    #[test]
    fn test_shadows_and_points_per_group() {
        let points = sample_points();
        let masks = classify(&points);
        let config = quiet_config();
        let view = PanelView { index: 1, azimuth: -18.0 };

        let scene = build_panel_scene(&points, &masks, &config, view, 600, 700);

        // Overlapping object drawn once per matching group
        assert_eq!(scene.points.len(), 7);
        assert_eq!(scene.shadows.len(), 3 * 7);
        assert_eq!(scene.point_count(Group::CarbonRich), 2);
        assert_eq!(scene.point_count(Group::CoolShell), 2);
        assert_eq!(scene.point_count(Group::Other), 1);

        assert_eq!(scene.panes.len(), 3);
        assert_eq!(scene.grid.len(), 3 * 10);
        assert!(scene.labels.is_empty());
    }

    #[test]
    fn test_group_drawing_order_and_alpha() {
        let points = sample_points();
        let masks = classify(&points);
        let config = quiet_config();
        let view = PanelView { index: 1, azimuth: -18.0 };

        let scene = build_panel_scene(&points, &masks, &config, view, 600, 700);

        let order: Vec<Group> = scene.points.iter().map(|m| m.group).collect();
        let mut sorted = order.clone();
        sorted.sort();
        assert_eq!(order, sorted);

        for m in &scene.shadows {
            assert!((m.color.3 - 0.3).abs() < 1e-12);
        }
        for m in &scene.points {
            let expected = if m.group == Group::Other { 0.4 } else { 0.8 };
            assert!((m.color.3 - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_shadow_lies_on_wall() {
        let points = PointSet::from_points(&[[1.0, 1.0, 1.0]]);
        let masks = classify(&points);
        let config = quiet_config();
        let view = PanelView { index: 1, azimuth: -18.0 };

        let scene = build_panel_scene(&points, &masks, &config, view, 600, 700);
        let proj = Projector::fit(
            Camera { azimuth: -18.0, elevation: config.elevation },
            600,
            700,
            CUBE_FILL,
        );

        let axes = &config.axes;
        let expected: Vec<(i32, i32)> = shadow_walls(axes)
            .iter()
            .map(|w| proj.to_pixel(axes.normalize(w.flatten([1.0, 1.0, 1.0]))))
            .collect();
        let actual: Vec<(i32, i32)> = scene.shadows.iter().map(|m| m.pos).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_far_and_infinite_objects_stay_near_panel() {
        let points = PointSet::from_points(&[
            [1.0, 1.0, 1.0],
            [1.0, 1.0, -1e12],
            [1.0, 1.0, f64::NEG_INFINITY],
        ]);
        let masks = classify(&points);
        let config = quiet_config();
        let view = PanelView { index: 1, azimuth: -18.0 };

        let scene = build_panel_scene(&points, &masks, &config, view, 600, 700);

        let memberships: usize = Group::ALL.iter().map(|&g| masks.count(g)).sum();
        assert_eq!(memberships, 3);
        // The infinite object has no 3D position and only its floor shadow
        assert_eq!(scene.points.len(), 2);
        assert_eq!(scene.shadows.len(), 3 * 2 + 1);

        let bound = (MARKER_BOUND * 700.0) as i32;
        for m in scene.shadows.iter().chain(&scene.points) {
            assert!((300 - bound..=300 + bound).contains(&m.pos.0), "{:?}", m.pos);
            assert!((350 - bound..=350 + bound).contains(&m.pos.1), "{:?}", m.pos);
        }
    }

    #[test]
    fn test_outline_at_default_resolution() {
        let points = sample_points();
        let masks = classify(&points);
        let config = PlotConfig::default().render_config();
        let view = PanelView { index: 1, azimuth: -18.0 };

        let scene = build_panel_scene(&points, &masks, &config, view, 600, 700);

        for m in &scene.points {
            if m.side >= 2 {
                assert!(m.outline.is_some());
            }
        }
        assert!(scene
            .points
            .iter()
            .any(|m| m.group != Group::Other && m.outline.is_some()));
        assert!(scene.shadows.iter().all(|m| m.outline.is_none()));
    }

    #[test]
    fn test_wall_flatten() {
        let axes = AxesConfig::default();
        let [bottom, x_wall, y_wall] = shadow_walls(&axes);
        assert_eq!(bottom.flatten([1.0, 2.0, 3.0]), [1.0, 2.0, -0.5]);
        assert_eq!(x_wall.flatten([1.0, 2.0, 3.0]), [4.0, 2.0, 3.0]);
        assert_eq!(y_wall.flatten([1.0, 2.0, 3.0]), [1.0, 4.0, 3.0]);
        assert_eq!(x_wall.in_plane(), [Axis::Y, Axis::Z]);
    }

    #[test]
    fn test_labels_when_enabled() {
        let points = sample_points();
        let masks = classify(&points);
        let config = PlotConfig::default().render_config();
        let view = PanelView { index: 2, azimuth: -23.0 };

        let scene = build_panel_scene(&points, &masks, &config, view, 600, 700);

        // 5 ticks + 1 name per axis, plus the caption
        assert_eq!(scene.labels.len(), 3 * 6 + 1);
        assert!(scene.labels.iter().any(|l| l.text == "W1 - W2 (mag)"));
        assert_eq!(scene.labels.last().unwrap().text, view.caption());
    }
}
