use crate::model::{PlacedRect, Rect};

pub mod guillotine;
pub mod maxrects;
pub mod skyline;

/// A packer places rectangles into a single bin (one pallet layer).
///
/// Implementations must ensure no overlaps and keep every placement inside the bin.
/// `pack` returns `None` if a `w x h` rectangle (or its rotation, when allowed) no longer fits.
pub trait Packer {
    fn can_pack(&self, w: u32, h: u32) -> bool;
    fn pack(&mut self, w: u32, h: u32) -> Option<PlacedRect>;
}

/// Feeds `candidates` to `packer` in order and returns the subset it placed.
///
/// Stops after `limit` placements, or at the first candidate that fits in neither
/// orientation: the remaining candidates are copies of the same carton.
pub fn fill<P: Packer + ?Sized>(packer: &mut P, candidates: &[(u32, u32)], limit: usize) -> Vec<PlacedRect> {
    let mut placed = Vec::new();
    for &(w, h) in candidates {
        if placed.len() >= limit {
            break;
        }
        match packer.pack(w, h) {
            Some(p) => placed.push(p),
            None => {
                if !packer.can_pack(w, h) && !packer.can_pack(h, w) {
                    break;
                }
            }
        }
    }
    placed
}

/// Leftover measures of placing `w x h` in free rect `fr`: `(area_fit, short_fit, long_fit)`.
pub(crate) fn leftovers(fr: &Rect, w: u32, h: u32) -> (i64, i64, i64) {
    let area_fit = fr.area() as i64 - (w as i64 * h as i64);
    let leftover_h = (fr.w as i64 - w as i64).abs();
    let leftover_v = (fr.h as i64 - h as i64).abs();
    (
        area_fit,
        leftover_h.min(leftover_v),
        leftover_h.max(leftover_v),
    )
}

/// Removes every free rect that is contained in another one.
pub(crate) fn prune_free_list(free: &mut Vec<Rect>) {
    let mut i = 0;
    while i < free.len() {
        let a = free[i];
        let mut remove_i = false;
        let mut j = i + 1;
        while j < free.len() {
            let b = free[j];
            if b.contains(&a) {
                remove_i = true;
                break;
            }
            if a.contains(&b) {
                free.remove(j);
                continue;
            }
            j += 1;
        }
        if remove_i {
            free.remove(i);
        } else {
            i += 1;
        }
    }
}

/// Joins free rects that share a full edge.
pub(crate) fn merge_free_list(free: &mut Vec<Rect>) {
    let mut merged = true;
    while merged {
        merged = false;
        'outer: for i in 0..free.len() {
            for j in i + 1..free.len() {
                let a = free[i];
                let b = free[j];
                // same band along y, contiguous in x
                if a.y == b.y && a.h == b.h && (a.x_end() == b.x || b.x_end() == a.x) {
                    free[i] = Rect::new(a.x.min(b.x), a.y, a.w + b.w, a.h);
                    free.remove(j);
                    merged = true;
                    break 'outer;
                }
                // same band along x, contiguous in y
                if a.x == b.x && a.w == b.w && (a.y_end() == b.y || b.y_end() == a.y) {
                    free[i] = Rect::new(a.x, a.y.min(b.y), a.w, a.h + b.h);
                    free.remove(j);
                    merged = true;
                    break 'outer;
                }
            }
        }
    }
}

/// Cuts `node` out of every free rect it intersects, keeping the maximal leftover strips.
pub(crate) fn subtract_from_free_list(free: &mut Vec<Rect>, node: &Rect) {
    let mut out: Vec<Rect> = Vec::with_capacity(free.len() + 4);
    for fr in free.drain(..) {
        if !fr.intersects(node) {
            out.push(fr);
            continue;
        }
        // below the node
        if node.y > fr.y {
            out.push(Rect::new(fr.x, fr.y, fr.w, node.y - fr.y));
        }
        // above the node
        if node.y_end() < fr.y_end() {
            out.push(Rect::new(fr.x, node.y_end(), fr.w, fr.y_end() - node.y_end()));
        }
        // left of the node
        if node.x > fr.x {
            out.push(Rect::new(fr.x, fr.y, node.x - fr.x, fr.h));
        }
        // right of the node
        if node.x_end() < fr.x_end() {
            out.push(Rect::new(node.x_end(), fr.y, fr.x_end() - node.x_end(), fr.h));
        }
    }
    *free = out;
}
