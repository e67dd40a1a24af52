use super::{Packer, leftovers, merge_free_list, prune_free_list};
use crate::config::{GuillotineChoice, GuillotineSplit};
use crate::model::{PlacedRect, Rect};

pub struct GuillotinePacker {
    free: Vec<Rect>,
    allow_rotation: bool,
    choice: GuillotineChoice,
    split: GuillotineSplit,
}

impl GuillotinePacker {
    pub fn new(border: Rect, allow_rotation: bool, choice: GuillotineChoice, split: GuillotineSplit) -> Self {
        Self {
            free: vec![border],
            allow_rotation,
            choice,
            split,
        }
    }

    fn score(choice: GuillotineChoice, fr: &Rect, w: u32, h: u32) -> i64 {
        let (area_fit, short_fit, long_fit) = leftovers(fr, w, h);
        match choice {
            GuillotineChoice::BestAreaFit => area_fit,
            GuillotineChoice::BestShortSideFit => short_fit,
            GuillotineChoice::BestLongSideFit => long_fit,
            GuillotineChoice::WorstAreaFit => -area_fit,
            GuillotineChoice::WorstShortSideFit => -short_fit,
            GuillotineChoice::WorstLongSideFit => -long_fit,
        }
    }

    fn choose(&self, w: u32, h: u32) -> Option<(usize, PlacedRect)> {
        let mut best: Option<(i64, usize, PlacedRect)> = None;
        for (i, fr) in self.free.iter().enumerate() {
            if fr.w >= w && fr.h >= h {
                let s = Self::score(self.choice, fr, w, h);
                if best.as_ref().is_none_or(|(b, ..)| s < *b) {
                    best = Some((s, i, PlacedRect::new(fr.x, fr.y, w, h, false)));
                }
            }
            if self.allow_rotation && w != h && fr.w >= h && fr.h >= w {
                let s = Self::score(self.choice, fr, h, w);
                if best.as_ref().is_none_or(|(b, ..)| s < *b) {
                    best = Some((s, i, PlacedRect::new(fr.x, fr.y, h, w, true)));
                }
            }
        }
        best.map(|(_, i, p)| (i, p))
    }

    /// Splits `fr` around `placed` (anchored at its origin) into the leftover
    /// far-y and far-x pieces.
    fn split(&self, fr: &Rect, placed: &Rect) -> (Option<Rect>, Option<Rect>) {
        let w_right = fr.x_end().saturating_sub(placed.x_end());
        let h_top = fr.y_end().saturating_sub(placed.y_end());

        // true: the cut runs along x, so the far-y piece spans the full width
        let split_horizontal = match self.split {
            GuillotineSplit::SplitShorterLeftoverAxis => h_top < w_right,
            GuillotineSplit::SplitLongerLeftoverAxis => h_top > w_right,
            GuillotineSplit::SplitMinimizeArea => (w_right as u64 * fr.h as u64) <= (fr.w as u64 * h_top as u64),
            GuillotineSplit::SplitMaximizeArea => (w_right as u64 * fr.h as u64) >= (fr.w as u64 * h_top as u64),
            GuillotineSplit::SplitShorterAxis => fr.h < fr.w,
            GuillotineSplit::SplitLongerAxis => fr.h > fr.w,
        };

        let (top, right) = if split_horizontal {
            (
                Rect::new(fr.x, placed.y_end(), fr.w, h_top),
                Rect::new(placed.x_end(), fr.y, w_right, placed.h),
            )
        } else {
            (
                Rect::new(fr.x, placed.y_end(), placed.w, h_top),
                Rect::new(placed.x_end(), fr.y, w_right, fr.h),
            )
        };
        let keep = |r: Rect| (r.w > 0 && r.h > 0).then_some(r);
        (keep(top), keep(right))
    }

    fn place(&mut self, idx: usize, placed: &Rect) {
        let fr = self.free.swap_remove(idx);
        let (a, b) = self.split(&fr, placed);
        self.free.extend(a);
        self.free.extend(b);
        prune_free_list(&mut self.free);
        merge_free_list(&mut self.free);
    }
}

impl Packer for GuillotinePacker {
    fn can_pack(&self, w: u32, h: u32) -> bool {
        self.choose(w, h).is_some()
    }

    fn pack(&mut self, w: u32, h: u32) -> Option<PlacedRect> {
        let (idx, place) = self.choose(w, h)?;
        self.place(idx, &place.rect());
        Some(place)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_pieces_cover_leftover() {
        let p = GuillotinePacker::new(
            Rect::new(0, 0, 48, 40),
            true,
            GuillotineChoice::BestAreaFit,
            GuillotineSplit::SplitShorterLeftoverAxis,
        );
        let fr = Rect::new(0, 0, 48, 40);
        let placed = Rect::new(0, 0, 16, 10);
        let (a, b) = p.split(&fr, &placed);
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_eq!(a.area() + b.area() + placed.area(), fr.area());
        assert!(!a.intersects(&b));
    }

    #[test]
    fn packs_rotated_into_tall_bin() {
        let mut p = GuillotinePacker::new(
            Rect::new(0, 0, 10, 30),
            true,
            GuillotineChoice::BestShortSideFit,
            GuillotineSplit::SplitLongerAxis,
        );
        let r = p.pack(30, 10).unwrap();
        assert!(r.rotated);
        assert!(p.pack(30, 10).is_none());
    }
}
