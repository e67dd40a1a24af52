use super::{Packer, leftovers, prune_free_list, subtract_from_free_list};
use crate::config::MaxRectsHeuristic;
use crate::model::{PlacedRect, Rect};

pub struct MaxRectsPacker {
    border: Rect,
    free: Vec<Rect>,
    used: Vec<Rect>,
    allow_rotation: bool,
    heuristic: MaxRectsHeuristic,
}

impl MaxRectsPacker {
    pub fn new(border: Rect, allow_rotation: bool, heuristic: MaxRectsHeuristic) -> Self {
        Self {
            border,
            free: vec![border],
            used: Vec::new(),
            allow_rotation,
            heuristic,
        }
    }

    fn place_rect(&mut self, node: &Rect) {
        subtract_from_free_list(&mut self.free, node);
        self.free.retain(|r| r.w > 0 && r.h > 0);
        prune_free_list(&mut self.free);
        self.used.push(*node);
    }

    fn score(&self, fr: &Rect, w: u32, h: u32) -> (i64, i64) {
        let (area_fit, short_fit, long_fit) = leftovers(fr, w, h);
        match self.heuristic {
            MaxRectsHeuristic::BestAreaFit => (area_fit, short_fit),
            MaxRectsHeuristic::BestShortSideFit => (short_fit, long_fit),
            MaxRectsHeuristic::BestLongSideFit => (long_fit, short_fit),
            MaxRectsHeuristic::BottomLeft => ((fr.y + h) as i64, fr.x as i64),
            MaxRectsHeuristic::ContactPoint => {
                // maximize contact score: use negative for minimization
                let contact = self.contact_point_score(fr.x, fr.y, w, h);
                (-(contact as i64), area_fit)
            }
        }
    }

    fn find_position(&self, w: u32, h: u32) -> Option<PlacedRect> {
        let mut best: Option<((i64, i64, u32, u32), PlacedRect)> = None;

        let orientations = [(w, h, false), (h, w, true)];
        let n = if self.allow_rotation && w != h { 2 } else { 1 };
        for fr in &self.free {
            for &(pw, ph, rotated) in &orientations[..n] {
                if fr.w < pw || fr.h < ph {
                    continue;
                }
                // perfect fit early-out
                if fr.w == pw && fr.h == ph {
                    return Some(PlacedRect::new(fr.x, fr.y, pw, ph, rotated));
                }
                let (s1, s2) = self.score(fr, pw, ph);
                // tie-break: lower far edge, then smaller x
                let key = (s1, s2, fr.y + ph, fr.x);
                if best.as_ref().is_none_or(|(k, _)| key < *k) {
                    best = Some((key, PlacedRect::new(fr.x, fr.y, pw, ph, rotated)));
                }
            }
        }
        best.map(|(_, p)| p)
    }

    fn contact_point_score(&self, x: u32, y: u32, w: u32, h: u32) -> u32 {
        let node = Rect::new(x, y, w, h);
        let mut score = 0u32;
        // contact with pallet edges
        if node.x == self.border.x {
            score += node.h;
        }
        if node.y == self.border.y {
            score += node.w;
        }
        if node.x_end() == self.border.x_end() {
            score += node.h;
        }
        if node.y_end() == self.border.y_end() {
            score += node.w;
        }

        // contact with placed cartons
        for u in &self.used {
            if node.x == u.x_end() || u.x == node.x_end() {
                score += overlap_1d(node.y, node.y_end(), u.y, u.y_end());
            }
            if node.y == u.y_end() || u.y == node.y_end() {
                score += overlap_1d(node.x, node.x_end(), u.x, u.x_end());
            }
        }
        score
    }
}

fn overlap_1d(a1: u32, a2: u32, b1: u32, b2: u32) -> u32 {
    let start = a1.max(b1);
    let end = a2.min(b2);
    end.saturating_sub(start)
}

impl Packer for MaxRectsPacker {
    fn can_pack(&self, w: u32, h: u32) -> bool {
        self.find_position(w, h).is_some()
    }

    fn pack(&mut self, w: u32, h: u32) -> Option<PlacedRect> {
        let place = self.find_position(w, h)?;
        self.place_rect(&place.rect());
        Some(place)
    }
}
