use gpui::{Pixels, ScrollHandle, px};

/// Near-bottom distance at which the transcript resumes following new messages.
const AUTO_FOLLOW_RESUME_THRESHOLD: Pixels = px(24.);
/// Small delta used to ignore floating-point scroll jitter.
const SCROLL_DELTA_EPSILON: f32 = 1.0;

/// Turns the controller's scroll-to-latest cues into transcript offsets.
pub struct ScrollManager {
    scroll_handle: ScrollHandle,
    pending_scroll_to_bottom: bool,
    follow_bottom: bool,
    last_scroll_offset: Pixels,
}

impl ScrollManager {
    pub fn new() -> Self {
        Self {
            scroll_handle: ScrollHandle::new(),
            pending_scroll_to_bottom: false,
            follow_bottom: true,
            last_scroll_offset: Pixels::ZERO,
        }
    }

    pub fn handle(&self) -> &ScrollHandle {
        &self.scroll_handle
    }

    pub fn is_following_bottom(&self) -> bool {
        self.follow_bottom
    }

    pub fn has_pending_scroll(&self) -> bool {
        self.pending_scroll_to_bottom
    }

    /// Handles one scroll-to-latest cue.
    pub fn request_scroll_to_bottom(&mut self) {
        self.pending_scroll_to_bottom = true;
        self.follow_bottom = true;
    }

    pub fn reset(&mut self) {
        self.last_scroll_offset = Pixels::ZERO;
        self.follow_bottom = true;
        self.pending_scroll_to_bottom = false;
    }

    pub fn update_follow_state(&mut self) {
        let offset = self.scroll_handle.offset().y;
        let offset_delta = f32::from(offset) - f32::from(self.last_scroll_offset);
        let user_scrolled_up = offset_delta > SCROLL_DELTA_EPSILON;

        if self.pending_scroll_to_bottom {
            self.follow_bottom = true;
        } else if self.follow_bottom && user_scrolled_up {
            self.follow_bottom = false;
        } else if !self.follow_bottom && self.is_near_bottom() {
            self.follow_bottom = true;
        }

        self.last_scroll_offset = offset;
    }

    /// Pins the transcript to its tail while a cue is pending or the reader
    /// is following; returns whether a scroll was requested.
    ///
    /// The handle resolves the bottom at prepaint, after the newest row has
    /// been laid out.
    pub fn apply_pending_scroll(&mut self) -> bool {
        let should_scroll = self.follow_bottom || self.pending_scroll_to_bottom;

        if should_scroll {
            self.scroll_handle.scroll_to_bottom();
            let max_offset = self.scroll_handle.max_offset().height;
            if max_offset > Pixels::ZERO {
                self.last_scroll_offset = -max_offset;
            }
        }

        self.pending_scroll_to_bottom = false;
        should_scroll
    }

    fn is_near_bottom(&self) -> bool {
        let max_offset = self.scroll_handle.max_offset().height;
        if max_offset <= Pixels::ZERO {
            return true;
        }

        // GPUI scrolls down with negative Y offsets, so `offset + max` reaches 0 at the tail.
        let offset = self.scroll_handle.offset().y;
        (offset + max_offset).abs() <= AUTO_FOLLOW_RESUME_THRESHOLD
    }
}

impl Default for ScrollManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpui::point;

    #[test]
    fn cue_is_consumed_by_the_next_render() {
        let mut manager = ScrollManager::new();
        manager.request_scroll_to_bottom();
        assert!(manager.has_pending_scroll());

        manager.update_follow_state();
        assert!(manager.is_following_bottom());
        assert!(manager.apply_pending_scroll());
        assert!(!manager.has_pending_scroll());
    }

    #[test]
    fn following_keeps_pinning_on_later_renders() {
        let mut manager = ScrollManager::new();
        manager.request_scroll_to_bottom();
        manager.update_follow_state();
        assert!(manager.apply_pending_scroll());

        manager.update_follow_state();
        assert!(manager.apply_pending_scroll());
    }

    #[test]
    fn scrolling_up_stops_following_until_the_next_cue() {
        let mut manager = ScrollManager::new();
        manager.update_follow_state();
        manager.apply_pending_scroll();

        manager.handle().set_offset(point(Pixels::ZERO, px(40.)));
        manager.update_follow_state();
        assert!(!manager.is_following_bottom());
        assert!(!manager.apply_pending_scroll());

        manager.request_scroll_to_bottom();
        manager.update_follow_state();
        assert!(manager.is_following_bottom());
        assert!(manager.apply_pending_scroll());
    }

    #[test]
    fn reset_drops_pending_cue() {
        let mut manager = ScrollManager::new();
        manager.request_scroll_to_bottom();
        manager.reset();

        assert!(!manager.has_pending_scroll());
        assert!(manager.is_following_bottom());
    }
}
