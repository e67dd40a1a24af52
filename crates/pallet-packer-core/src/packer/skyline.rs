use super::{Packer, leftovers, merge_free_list, prune_free_list, subtract_from_free_list};
use crate::config::{GuillotineChoice, SkylineHeuristic};
use crate::model::{PlacedRect, Rect};

/// One skyline segment: the stack reaches `y` over `[x, x + w)`.
#[derive(Clone, Copy, Debug)]
struct SkylineNode {
    x: u32,
    y: u32,
    w: u32,
}

impl SkylineNode {
    #[inline]
    fn x_end(&self) -> u32 {
        self.x + self.w
    }
}

pub struct SkylinePacker {
    border: Rect,
    skylines: Vec<SkylineNode>,
    allow_rotation: bool,
    heuristic: SkylineHeuristic,
    waste: Option<WasteMap>,
}

impl SkylinePacker {
    pub fn new(border: Rect, allow_rotation: bool, heuristic: SkylineHeuristic, use_waste_map: bool) -> Self {
        Self {
            border,
            skylines: vec![SkylineNode {
                x: border.x,
                y: border.y,
                w: border.w,
            }],
            allow_rotation,
            heuristic,
            waste: use_waste_map.then(|| WasteMap::new(allow_rotation, GuillotineChoice::BestShortSideFit)),
        }
    }

    /// Rect of `w x h` resting on the skyline starting at segment `i`, if it fits.
    fn can_put(&self, mut i: usize, w: u32, h: u32) -> Option<Rect> {
        let mut rect = Rect::new(self.skylines[i].x, self.skylines[i].y, w, h);
        if rect.x_end() > self.border.x_end() {
            return None;
        }
        let mut width_left = w;
        loop {
            rect.y = rect.y.max(self.skylines[i].y);
            if rect.y_end() > self.border.y_end() {
                return None;
            }
            if self.skylines[i].w >= width_left {
                return Some(rect);
            }
            width_left -= self.skylines[i].w;
            i += 1;
            if i >= self.skylines.len() {
                return None;
            }
        }
    }

    fn orientations(&self, w: u32, h: u32) -> &'static [bool] {
        if self.allow_rotation && w != h {
            &[false, true]
        } else {
            &[false]
        }
    }

    fn find_skyline(&self, w: u32, h: u32) -> Option<(usize, Rect, bool)> {
        let mut best: Option<((u64, u32, u32), usize, Rect, bool)> = None;
        for i in 0..self.skylines.len() {
            for &rotated in self.orientations(w, h) {
                let (pw, ph) = if rotated { (h, w) } else { (w, h) };
                let Some(r) = self.can_put(i, pw, ph) else {
                    continue;
                };
                let key = match self.heuristic {
                    SkylineHeuristic::BottomLeft => (r.y_end() as u64, self.skylines[i].w, r.x),
                    SkylineHeuristic::MinWaste => (self.wasted_area_for(i, &r), r.y_end(), r.x),
                };
                if best.as_ref().is_none_or(|(k, ..)| key < *k) {
                    best = Some((key, i, r, rotated));
                }
            }
        }
        best.map(|(_, i, r, rot)| (i, r, rot))
    }

    /// Area left uncovered between the skyline and the bottom of `r`.
    fn wasted_area_for(&self, start: usize, r: &Rect) -> u64 {
        let mut area = 0u64;
        let mut width_left = r.w;
        let mut i = start;
        while width_left > 0 && i < self.skylines.len() {
            let seg = &self.skylines[i];
            let use_w = width_left.min(seg.w);
            if seg.y < r.y {
                area += (r.y - seg.y) as u64 * use_w as u64;
            }
            width_left -= use_w;
            i += 1;
        }
        area
    }

    /// Raises the skyline under `rect` to its far edge.
    fn split(&mut self, index: usize, rect: &Rect) {
        self.skylines.insert(
            index,
            SkylineNode {
                x: rect.x,
                y: rect.y_end(),
                w: rect.w,
            },
        );
        let i = index + 1;
        let end = rect.x_end();
        while i < self.skylines.len() {
            let seg = self.skylines[i];
            if seg.x >= end {
                break;
            }
            let shrink = end - seg.x;
            if seg.w <= shrink {
                self.skylines.remove(i);
            } else {
                self.skylines[i].x += shrink;
                self.skylines[i].w -= shrink;
                break;
            }
        }
    }

    fn merge(&mut self) {
        let mut i = 1;
        while i < self.skylines.len() {
            if self.skylines[i - 1].y == self.skylines[i].y {
                let w = self.skylines[i].w;
                self.skylines[i - 1].w += w;
                self.skylines.remove(i);
            } else {
                i += 1;
            }
        }
    }

    /// Records the gaps left under `rect` (between the old skyline and `rect.y`).
    fn add_waste_areas(&mut self, index: usize, rect: &Rect) {
        let Some(wm) = self.waste.as_mut() else {
            return;
        };
        let mut i = index;
        while i < self.skylines.len() {
            let seg = self.skylines[i];
            if seg.x >= rect.x_end() {
                break;
            }
            let left = seg.x.max(rect.x);
            let right = seg.x_end().min(rect.x_end());
            if seg.y < rect.y && right > left {
                wm.add_area(Rect::new(left, seg.y, right - left, rect.y - seg.y));
            }
            i += 1;
        }
    }
}

impl Packer for SkylinePacker {
    fn can_pack(&self, w: u32, h: u32) -> bool {
        if let Some(wm) = &self.waste {
            if wm.choose(w, h).is_some() {
                return true;
            }
        }
        self.find_skyline(w, h).is_some()
    }

    fn pack(&mut self, w: u32, h: u32) -> Option<PlacedRect> {
        // Try waste map first
        if let Some(wm) = &mut self.waste {
            if let Some((place, rotated)) = wm.try_pack(w, h) {
                return Some(PlacedRect::new(place.x, place.y, place.w, place.h, rotated));
            }
        }

        let (i, place, rotated) = self.find_skyline(w, h)?;
        // waste is measured against the skyline before it is raised
        self.add_waste_areas(i, &place);
        self.split(i, &place);
        self.merge();
        Some(PlacedRect::new(place.x, place.y, place.w, place.h, rotated))
    }
}

/// Free areas trapped under the skyline, reused before raising it further.
#[derive(Clone)]
struct WasteMap {
    free: Vec<Rect>,
    allow_rotation: bool,
    choice: GuillotineChoice,
}

impl WasteMap {
    fn new(allow_rotation: bool, choice: GuillotineChoice) -> Self {
        // Starts empty; Skyline adds waste areas after placements.
        Self {
            free: Vec::new(),
            allow_rotation,
            choice,
        }
    }

    fn try_pack(&mut self, w: u32, h: u32) -> Option<(Rect, bool)> {
        let (r, rot) = self.choose(w, h)?;
        subtract_from_free_list(&mut self.free, &r);
        self.free.retain(|r| r.w > 0 && r.h > 0);
        prune_free_list(&mut self.free);
        Some((r, rot))
    }

    fn choose(&self, w: u32, h: u32) -> Option<(Rect, bool)> {
        let mut best: Option<((i64, i64), Rect, bool)> = None;
        for fr in &self.free {
            let mut consider = |pw: u32, ph: u32, rotated: bool| {
                if fr.w < pw || fr.h < ph {
                    return;
                }
                let s = score_choice(self.choice, fr, pw, ph);
                if best.as_ref().is_none_or(|(k, ..)| s < *k) {
                    best = Some((s, Rect::new(fr.x, fr.y, pw, ph), rotated));
                }
            };
            consider(w, h, false);
            if self.allow_rotation && w != h {
                consider(h, w, true);
            }
        }
        best.map(|(_, r, rot)| (r, rot))
    }

    fn add_area(&mut self, r: Rect) {
        if r.w > 0 && r.h > 0 {
            self.free.push(r);
        }
        prune_free_list(&mut self.free);
        merge_free_list(&mut self.free);
    }
}

fn score_choice(choice: GuillotineChoice, fr: &Rect, w: u32, h: u32) -> (i64, i64) {
    let (area_fit, short_fit, long_fit) = leftovers(fr, w, h);
    match choice {
        GuillotineChoice::BestAreaFit => (area_fit, short_fit),
        GuillotineChoice::BestShortSideFit => (short_fit, long_fit),
        GuillotineChoice::BestLongSideFit => (long_fit, short_fit),
        GuillotineChoice::WorstAreaFit => (-area_fit, -short_fit),
        GuillotineChoice::WorstShortSideFit => (-short_fit, -long_fit),
        GuillotineChoice::WorstLongSideFit => (-long_fit, -short_fit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disjoint(rects: &[PlacedRect]) -> bool {
        for i in 0..rects.len() {
            for j in (i + 1)..rects.len() {
                if rects[i].rect().intersects(&rects[j].rect()) {
                    return false;
                }
            }
        }
        true
    }

    #[test]
    fn bottom_left_stacks_rows() {
        let mut p = SkylinePacker::new(Rect::new(0, 0, 48, 40), false, SkylineHeuristic::BottomLeft, false);
        let a = p.pack(16, 10).unwrap();
        let b = p.pack(16, 10).unwrap();
        let c = p.pack(16, 10).unwrap();
        let d = p.pack(16, 10).unwrap();
        assert_eq!((a.x, a.y), (0, 0));
        assert_eq!((b.x, b.y), (16, 0));
        assert_eq!((c.x, c.y), (32, 0));
        assert_eq!(d.y, 10);
    }

    #[test]
    fn waste_map_reuses_gaps_without_overlap() {
        let mut p = SkylinePacker::new(Rect::new(0, 0, 48, 40), true, SkylineHeuristic::MinWaste, true);
        let mut placed = Vec::new();
        for (w, h) in [(30, 25), (18, 5), (10, 10), (6, 6), (8, 4), (12, 7), (5, 5)] {
            if let Some(r) = p.pack(w, h) {
                placed.push(r);
            }
        }
        assert!(disjoint(&placed));
        let bounds = Rect::new(0, 0, 48, 40);
        assert!(placed.iter().all(|r| bounds.contains(&r.rect())));
    }

    #[test]
    fn rejects_oversize() {
        let p = SkylinePacker::new(Rect::new(0, 0, 48, 40), true, SkylineHeuristic::BottomLeft, false);
        assert!(!p.can_pack(49, 41));
        assert!(p.can_pack(40, 48));
    }
}
