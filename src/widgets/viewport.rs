use std::ops::Range;

/// Sliding window over a longer run of rows. An unbounded viewport shows
/// everything; a capped one keeps the active row inside the window and
/// reports what was clipped through `footer`.
#[derive(Debug, Clone, Default)]
pub struct Viewport {
    offset: usize,
    limit: Option<usize>,
}

impl Viewport {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn capped(limit: usize) -> Self {
        Self {
            offset: 0,
            limit: (limit > 0).then_some(limit),
        }
    }

    pub fn set_limit(&mut self, limit: Option<usize>) {
        self.limit = limit.filter(|&n| n > 0);
    }

    /// Slides the window the minimal distance that brings `active` into
    /// view.
    pub fn follow(&mut self, active: usize, total: usize) {
        let Some(limit) = self.limit else {
            return;
        };
        if total <= limit {
            self.offset = 0;
        } else if active < self.offset {
            self.offset = active;
        } else if active + 1 > self.offset + limit {
            self.offset = active + 1 - limit;
        }
    }

    pub fn range(&self, total: usize) -> Range<usize> {
        match self.limit {
            Some(limit) => {
                let start = self.offset.min(total);
                start..(start + limit).min(total)
            }
            None => 0..total,
        }
    }

    pub fn clamp(active: &mut usize, total: usize) {
        *active = (*active).min(total.saturating_sub(1));
    }

    /// `[a-b of n]` marker with scroll arrows, present only when rows are
    /// clipped.
    pub fn footer(&self, total: usize) -> Option<String> {
        let limit = self.limit?;
        if total <= limit {
            return None;
        }
        let range = self.range(total);
        let arrow = match (range.start > 0, range.end < total) {
            (true, true) => " ↑↓",
            (true, false) => " ↑",
            (false, true) => " ↓",
            (false, false) => "",
        };
        Some(format!("[{}-{} of {}]{}", range.start + 1, range.end, total, arrow))
    }
}

#[cfg(test)]
mod tests {
    use super::Viewport;

    #[test]
    fn window_slides_minimally_to_follow_active() {
        let mut viewport = Viewport::capped(3);
        viewport.follow(5, 10);
        assert_eq!(viewport.range(10), 3..6);
        viewport.follow(4, 10);
        assert_eq!(viewport.range(10), 3..6);
        viewport.follow(0, 10);
        assert_eq!(viewport.range(10), 0..3);
    }

    #[test]
    fn unbounded_shows_everything() {
        let mut viewport = Viewport::unbounded();
        viewport.follow(9, 10);
        assert_eq!(viewport.range(10), 0..10);
        assert_eq!(viewport.footer(10), None);
    }

    #[test]
    fn footer_marks_clipping_and_direction() {
        let mut viewport = Viewport::capped(4);
        assert_eq!(viewport.footer(3), None);
        viewport.follow(5, 9);
        assert_eq!(viewport.footer(9).as_deref(), Some("[3-6 of 9] ↑↓"));
        viewport.follow(8, 9);
        assert_eq!(viewport.footer(9).as_deref(), Some("[6-9 of 9] ↑"));
    }

    #[test]
    fn clamp_pins_active_to_the_last_row() {
        let mut active = 7;
        Viewport::clamp(&mut active, 3);
        assert_eq!(active, 2);
        Viewport::clamp(&mut active, 0);
        assert_eq!(active, 0);
    }
}
