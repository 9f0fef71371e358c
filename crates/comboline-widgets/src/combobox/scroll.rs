//! Scrolling of the list itself and of the page that hosts it.

/// Scroll offset of the entry list, in rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListScroll {
    offset: usize,
}

impl ListScroll {
    /// First visible row.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Put row `top` at the top of a `view`-row window over `content` rows.
    /// Clamped so the window never runs past the last row.
    pub fn scroll_to(&mut self, top: usize, content: usize, view: usize) {
        self.offset = top.min(content.saturating_sub(view));
    }

    /// Scroll the least amount that makes rows `top..top + height` visible.
    ///
    /// A row below the window ends up on the last line; a row above it ends
    /// up on the first. Rows already visible leave the offset alone.
    pub fn reveal(&mut self, top: usize, height: usize, view: usize) {
        if top + height > self.offset + view {
            self.offset = (top + height).saturating_sub(view);
        } else if top < self.offset {
            self.offset = top;
        }
    }

    /// Move by `delta` rows (mouse wheel), clamped to the content.
    pub fn scroll_by(&mut self, delta: isize, content: usize, view: usize) {
        let max = content.saturating_sub(view);
        self.offset = self.offset.saturating_add_signed(delta).min(max);
    }

    /// Back to the first row.
    pub fn reset(&mut self) {
        self.offset = 0;
    }
}

/// How the host should perform a page scroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    /// Animate over a few frames.
    Smooth,
    /// Move at once.
    Jump,
}

/// Request to the host to scroll its page so the open list fits on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageScroll {
    /// Rows the list extends past the bottom of the viewport.
    pub rows: u16,
    /// Requested animation.
    pub behavior: ScrollBehavior,
}

/// Rows by which a list at `top` with `height` rows overflows a viewport
/// ending (exclusive) at `viewport_bottom`.
pub fn page_overflow(top: u16, height: u16, viewport_bottom: u16) -> u16 {
    top.saturating_add(height).saturating_sub(viewport_bottom)
}
