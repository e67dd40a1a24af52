//! Read-only views of a [`PalletPlan`]: 2D layer diagrams (SVG / PNG) and an
//! isometric 3D view of the full stack (SVG).
//!
//! Pallet coordinates have the origin at the bottom-left with `y` pointing up;
//! the renderers flip `y` for image space.

use crate::error::Result;
use crate::model::PlacedRect;
use crate::plan::PalletPlan;
use image::{Rgba, RgbaImage};
use std::fmt::Write as _;
use std::path::Path;

const FILL_UPRIGHT: &str = "#8ecae6";
const FILL_ROTATED: &str = "#ffb703";
const STROKE: &str = "#023047";
const BASE_FILL: &str = "#a47148";

/// Drawing options shared by the renderers.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Pixels per inch.
    pub scale: u32,
    /// Blank border around the drawing, in pixels.
    pub margin: u32,
    /// Draw the pallet base block under the stack (3D only).
    pub show_base: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            scale: 10,
            margin: 20,
            show_base: true,
        }
    }
}

/// 2D layer diagram: pallet boundary plus one labeled rectangle per carton (1-based).
pub fn render_svg_2d(plan: &PalletPlan, opts: &RenderOptions) -> String {
    let s = opts.scale.max(1);
    let m = opts.margin;
    let (pl, pw) = (plan.pallet.length, plan.pallet.width);
    let width = pl * s + 2 * m;
    let height = pw * s + 2 * m + 24;
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    );
    let _ = writeln!(
        svg,
        r#"<rect x="{m}" y="{m}" width="{}" height="{}" fill="none" stroke="black" stroke-width="2"/>"#,
        pl * s,
        pw * s
    );
    let placements = plan.layout.resolved_placements();
    for (i, p) in placements.iter().enumerate() {
        let x = m + p.x * s;
        let y = m + (pw - p.y - p.h) * s;
        let fill = if p.rotated { FILL_ROTATED } else { FILL_UPRIGHT };
        let _ = writeln!(
            svg,
            r#"<rect x="{x}" y="{y}" width="{}" height="{}" fill="{fill}" stroke="{STROKE}" stroke-width="1"/>"#,
            p.w * s,
            p.h * s
        );
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="{}" font-family="sans-serif" font-size="{}" text-anchor="middle" dominant-baseline="middle">{}</text>"#,
            x + p.w * s / 2,
            y + p.h * s / 2,
            (s * 2).max(8),
            i + 1
        );
    }
    let _ = writeln!(
        svg,
        r#"<text x="{m}" y="{}" font-family="sans-serif" font-size="14">{}</text>"#,
        height - 8,
        caption(plan)
    );
    svg.push_str("</svg>\n");
    svg
}

/// 2D layer diagram as an RGBA image (no labels).
pub fn render_png_2d(plan: &PalletPlan, opts: &RenderOptions) -> RgbaImage {
    let s = opts.scale.max(1);
    let m = opts.margin;
    let (pl, pw) = (plan.pallet.length, plan.pallet.width);
    let mut canvas = RgbaImage::from_pixel(pl * s + 2 * m, pw * s + 2 * m, Rgba([255, 255, 255, 255]));

    for p in plan.layout.resolved_placements() {
        let fill = if p.rotated {
            Rgba([255, 183, 3, 255])
        } else {
            Rgba([142, 202, 230, 255])
        };
        let (x, y, w, h) = to_image_space(&p, pw, s, m);
        fill_rect(&mut canvas, x, y, w, h, fill);
        outline_rect(&mut canvas, x, y, w, h, Rgba([2, 48, 71, 255]));
    }
    outline_rect(&mut canvas, m, m, pl * s, pw * s, Rgba([0, 0, 0, 255]));
    canvas
}

/// Writes [`render_png_2d`] to `path`.
pub fn save_png_2d(plan: &PalletPlan, opts: &RenderOptions, path: impl AsRef<Path>) -> Result<()> {
    render_png_2d(plan, opts).save(path.as_ref())?;
    Ok(())
}

fn to_image_space(p: &PlacedRect, pallet_width: u32, s: u32, m: u32) -> (u32, u32, u32, u32) {
    (m + p.x * s, m + (pallet_width - p.y - p.h) * s, p.w * s, p.h * s)
}

fn fill_rect(canvas: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, px: Rgba<u8>) {
    let (cw, ch) = canvas.dimensions();
    for yy in y..(y + h).min(ch) {
        for xx in x..(x + w).min(cw) {
            canvas.put_pixel(xx, yy, px);
        }
    }
}

fn outline_rect(canvas: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, px: Rgba<u8>) {
    let (cw, ch) = canvas.dimensions();
    if w == 0 || h == 0 {
        return;
    }
    let (x2, y2) = (x + w - 1, y + h - 1);
    for xx in x..=x2.min(cw.saturating_sub(1)) {
        if y < ch {
            canvas.put_pixel(xx, y, px);
        }
        if y2 < ch {
            canvas.put_pixel(xx, y2, px);
        }
    }
    for yy in y..=y2.min(ch.saturating_sub(1)) {
        if x < cw {
            canvas.put_pixel(x, yy, px);
        }
        if x2 < cw {
            canvas.put_pixel(x2, yy, px);
        }
    }
}

/// Axis-aligned box in pallet space (inches).
#[derive(Debug, Clone, Copy)]
struct Cuboid {
    x: f64,
    y: f64,
    z: f64,
    dx: f64,
    dy: f64,
    dz: f64,
}

const COS30: f64 = 0.866_025_403_784_438_6;
const SIN30: f64 = 0.5;

/// Isometric projection; screen `v` grows downward.
fn project(x: f64, y: f64, z: f64, s: f64) -> (f64, f64) {
    ((x - y) * COS30 * s, ((x + y) * SIN30 - z) * s)
}

/// Isometric view of the whole stack: every placement extruded by the carton height
/// for each of `max_layers` layers, optionally on top of the pallet base block.
pub fn render_svg_3d(plan: &PalletPlan, opts: &RenderOptions) -> String {
    let s = opts.scale.max(1) as f64;
    let (pl, pw) = (plan.pallet.length as f64, plan.pallet.width as f64);
    let base = if opts.show_base {
        plan.pallet.base_height as f64
    } else {
        0.0
    };
    let ch = plan.carton.height as f64;
    let top = base + ch * plan.max_layers as f64;

    // viewBox from the projected corners of the whole envelope
    let mut min_u = f64::MAX;
    let mut max_u = f64::MIN;
    let mut min_v = f64::MAX;
    let mut max_v = f64::MIN;
    for &(x, y, z) in &[
        (0.0, 0.0, 0.0),
        (pl, 0.0, 0.0),
        (0.0, pw, 0.0),
        (pl, pw, 0.0),
        (0.0, 0.0, top),
        (pl, 0.0, top),
        (0.0, pw, top),
        (pl, pw, top),
    ] {
        let (u, v) = project(x, y, z, s);
        min_u = min_u.min(u);
        max_u = max_u.max(u);
        min_v = min_v.min(v);
        max_v = max_v.max(v);
    }
    let m = opts.margin as f64;
    let vb_x = min_u - m;
    let vb_y = min_v - m;
    let vb_w = max_u - min_u + 2.0 * m;
    let vb_h = max_v - min_v + 2.0 * m + 24.0;

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{:.0}" height="{:.0}" viewBox="{:.2} {:.2} {:.2} {:.2}">"#,
        vb_w, vb_h, vb_x, vb_y, vb_w, vb_h
    );

    if opts.show_base && base > 0.0 {
        let pallet_base = Cuboid {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            dx: pl,
            dy: pw,
            dz: base,
        };
        draw_cuboid(&mut svg, &pallet_base, s, BASE_FILL);
    }

    let placements = plan.layout.resolved_placements();
    let mut boxes: Vec<(Cuboid, bool)> = Vec::with_capacity(placements.len() * plan.max_layers as usize);
    for layer in 0..plan.max_layers {
        for p in &placements {
            boxes.push((
                Cuboid {
                    x: p.x as f64,
                    y: p.y as f64,
                    z: base + ch * layer as f64,
                    dx: p.w as f64,
                    dy: p.h as f64,
                    dz: ch,
                },
                p.rotated,
            ));
        }
    }
    // painter's order: lower layers first, then back (small x + y) to front
    boxes.sort_by(|(a, _), (b, _)| {
        a.z.total_cmp(&b.z)
            .then((a.x + a.y).total_cmp(&(b.x + b.y)))
            .then(a.x.total_cmp(&b.x))
    });
    for (b, rotated) in &boxes {
        draw_cuboid(&mut svg, b, s, if *rotated { FILL_ROTATED } else { FILL_UPRIGHT });
    }

    let _ = writeln!(
        svg,
        r#"<text x="{:.2}" y="{:.2}" font-family="sans-serif" font-size="14">{}</text>"#,
        vb_x + m,
        vb_y + vb_h - 8.0,
        caption(plan)
    );
    svg.push_str("</svg>\n");
    svg
}

/// Draws the three faces visible from the (+x, +y, +z) direction.
fn draw_cuboid(svg: &mut String, c: &Cuboid, s: f64, fill: &str) {
    let (x0, y0, z0) = (c.x, c.y, c.z);
    let (x1, y1, z1) = (c.x + c.dx, c.y + c.dy, c.z + c.dz);
    let faces: [([(f64, f64, f64); 4], f64); 3] = [
        // +x face
        ([(x1, y0, z0), (x1, y1, z0), (x1, y1, z1), (x1, y0, z1)], 0.85),
        // +y face
        ([(x0, y1, z0), (x1, y1, z0), (x1, y1, z1), (x0, y1, z1)], 0.7),
        // top
        ([(x0, y0, z1), (x1, y0, z1), (x1, y1, z1), (x0, y1, z1)], 1.0),
    ];
    for (corners, opacity) in faces {
        let points: Vec<String> = corners
            .iter()
            .map(|&(x, y, z)| {
                let (u, v) = project(x, y, z, s);
                format!("{u:.2},{v:.2}")
            })
            .collect();
        let _ = writeln!(
            svg,
            r#"<polygon points="{}" fill="{fill}" fill-opacity="{opacity}" stroke="{STROKE}" stroke-width="0.5"/>"#,
            points.join(" ")
        );
    }
}

fn caption(plan: &PalletPlan) -> String {
    if !plan.fits() {
        return format!(
            "Carton {}x{} does not fit on the {}x{} pallet",
            plan.carton.length, plan.carton.width, plan.pallet.length, plan.pallet.width
        );
    }
    format!(
        "{} per layer ({}) x {} layers = {} cartons, area {:.1}%, volume {:.1}%",
        plan.layout.cartons_per_layer,
        plan.layout.kind,
        plan.max_layers,
        plan.total_cartons,
        plan.area_utilization,
        plan.volume_utilization
    )
}
