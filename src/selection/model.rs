//! The selection rectangle and its change notification

use crate::domain::{Point, RectF};
use crate::signal::Signal;

/// Rectangle being edited, in canvas coordinates.
///
/// The stored rectangle keeps the sign of its size so a drag up and to the
/// left reads naturally; queries that care about area use
/// [`Selection::normalized`].
#[derive(Debug, Default)]
pub struct Selection {
    rect: RectF,
    changed: Signal<RectF>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rect(&self) -> RectF {
        self.rect
    }

    pub fn normalized(&self) -> RectF {
        self.rect.normalized()
    }

    pub fn width(&self) -> f32 {
        self.rect.width
    }

    pub fn height(&self) -> f32 {
        self.rect.height
    }

    pub fn is_empty(&self) -> bool {
        self.rect.normalized().is_empty()
    }

    pub fn contains(&self, p: Point) -> bool {
        self.rect.contains(p)
    }

    pub fn connect_changed(&mut self, slot: impl FnMut(&RectF) + 'static) {
        self.changed.connect(slot);
    }

    /// Replace the rectangle. Returns false, and notifies nobody, when it is
    /// unchanged.
    pub fn set_rect(&mut self, rect: RectF) -> bool {
        if rect == self.rect {
            return false;
        }
        self.rect = rect;
        self.changed.emit(&rect);
        true
    }

    pub fn clear(&mut self) -> bool {
        self.set_rect(RectF::default())
    }
}
