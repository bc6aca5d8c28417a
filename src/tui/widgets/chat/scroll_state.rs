/// Viewport offset into the rendered chat lines.
///
/// While `following`, the offset is pinned to the newest content so streamed
/// tokens stay visible. Any manual scroll releases the pin until the user
/// scrolls back down to the end.
#[derive(Debug, Clone)]
pub struct ScrollState {
    offset: usize,
    content_height: usize,
    viewport_height: usize,
    following: bool,
}

impl ScrollState {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            offset: 0,
            content_height: 0,
            viewport_height: 0,
            following: true,
        }
    }

    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    #[must_use]
    pub const fn is_following(&self) -> bool {
        self.following
    }

    #[must_use]
    pub const fn is_at_bottom(&self) -> bool {
        self.offset >= self.max_offset()
    }

    /// Records the latest geometry; called once per frame before drawing.
    pub fn resize(&mut self, content_height: usize, viewport_height: usize) {
        self.content_height = content_height;
        self.viewport_height = viewport_height;

        if self.following {
            self.offset = self.max_offset();
        } else {
            self.offset = self.offset.min(self.max_offset());
        }
    }

    pub const fn follow(&mut self) {
        self.following = true;
        self.offset = self.max_offset();
    }

    pub const fn scroll_to_top(&mut self) {
        self.offset = 0;
        self.following = false;
    }

    pub const fn scroll_up(&mut self, lines: usize) {
        self.offset = self.offset.saturating_sub(lines);
        self.following = false;
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.offset = (self.offset + lines).min(self.max_offset());
        self.following = self.is_at_bottom();
    }

    const fn max_offset(&self) -> usize {
        self.content_height.saturating_sub(self.viewport_height)
    }
}

impl Default for ScrollState {
    fn default() -> Self {
        Self::new()
    }
}
