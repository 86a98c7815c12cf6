//! Ordered list of annotations drawn over a capture
//!
//! The document owns every trait set, keeps their derived geometry current
//! and tells observers after each change. Flattening onto the capture is
//! expensive, so it runs only once edits have paused for
//! [`crate::render::FLATTEN_DELAY`].

use std::time::Instant;

use image::RgbaImage;
use tiny_skia::Transform;

use super::compose;
use super::text::{Monospace, TextMeasure};
use super::traits::TraitSet;
use super::validity::is_visible;
use crate::domain::{Point, RectF};
use crate::render::Debouncer;
use crate::render::image::render_annotations;
use crate::signal::Signal;

/// What changed in the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentChange {
    Added(usize),
    Updated(usize),
    Removed(usize),
    Cleared,
}

pub struct AnnotationDocument {
    items: Vec<TraitSet>,
    measure: Box<dyn TextMeasure>,
    changed: Signal<DocumentChange>,
    flatten: Debouncer,
}

impl Default for AnnotationDocument {
    fn default() -> Self {
        Self::new(Box::new(Monospace))
    }
}

impl std::fmt::Debug for AnnotationDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnnotationDocument")
            .field("items", &self.items.len())
            .field("flatten", &self.flatten)
            .finish()
    }
}

impl AnnotationDocument {
    pub fn new(measure: Box<dyn TextMeasure>) -> Self {
        Self {
            items: Vec::new(),
            measure,
            changed: Signal::new(),
            flatten: Debouncer::default(),
        }
    }

    pub fn items(&self) -> &[TraitSet] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&TraitSet> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn measure(&self) -> &dyn TextMeasure {
        self.measure.as_ref()
    }

    pub fn connect_changed(&mut self, slot: impl FnMut(&DocumentChange) + 'static) {
        self.changed.connect(slot);
    }

    fn notify(&mut self, change: DocumentChange, now: Instant) {
        self.flatten.restart(now);
        self.changed.emit(&change);
    }

    /// Derive geometry for `traits` and append it on top. Returns its index.
    pub fn add(&mut self, mut traits: TraitSet, now: Instant) -> usize {
        compose::init(&mut traits, self.measure.as_ref());
        if !is_visible(&traits) {
            log::debug!("Adding annotation that draws nothing");
        }
        self.items.push(traits);
        let index = self.items.len() - 1;
        self.notify(DocumentChange::Added(index), now);
        index
    }

    /// Edit an item and rebuild its derived geometry. Returns false, and
    /// notifies nobody, when the index is out of range or nothing changed.
    pub fn update(
        &mut self,
        index: usize,
        now: Instant,
        edit: impl FnOnce(&mut TraitSet),
    ) -> bool {
        let measure = self.measure.as_ref();
        let Some(item) = self.items.get_mut(index) else {
            return false;
        };
        let mut edited = item.clone();
        edit(&mut edited);
        compose::re_init(&mut edited, measure);
        if edited == *item {
            return false;
        }
        *item = edited;
        self.notify(DocumentChange::Updated(index), now);
        true
    }

    pub fn remove(&mut self, index: usize, now: Instant) -> Option<TraitSet> {
        if index >= self.items.len() {
            return None;
        }
        let removed = self.items.remove(index);
        self.notify(DocumentChange::Removed(index), now);
        Some(removed)
    }

    pub fn clear(&mut self, now: Instant) {
        if self.items.is_empty() {
            return;
        }
        self.items.clear();
        self.notify(DocumentChange::Cleared, now);
    }

    /// Topmost visible item whose clickable region holds `point`
    pub fn item_at(&self, point: Point) -> Option<usize> {
        self.items
            .iter()
            .enumerate()
            .rev()
            .find(|(_, t)| is_visible(t) && t.mouse_path().contains(point))
            .map(|(i, _)| i)
    }

    /// Apply `ts` to one item
    pub fn transform_item(&mut self, index: usize, ts: &Transform, now: Instant) -> bool {
        if ts.is_identity() {
            return false;
        }
        let Some(item) = self.items.get_mut(index) else {
            return false;
        };
        compose::transform(ts, item);
        self.notify(DocumentChange::Updated(index), now);
        true
    }

    pub fn translate_item(&mut self, index: usize, dx: f32, dy: f32, now: Instant) -> bool {
        self.transform_item(index, &Transform::from_translate(dx, dy), now)
    }

    /// Apply `ts` to every item, as when the whole canvas is rotated or
    /// scaled
    pub fn transform_all(&mut self, ts: &Transform, now: Instant) {
        if ts.is_identity() {
            return;
        }
        for index in 0..self.items.len() {
            compose::transform(ts, &mut self.items[index]);
            self.notify(DocumentChange::Updated(index), now);
        }
    }

    /// Union of the painted bounds of all items
    pub fn visual_rect(&self) -> RectF {
        self.items
            .iter()
            .fold(RectF::default(), |acc, t| acc.united(&t.visual_rect()))
    }

    pub fn flatten_pending(&self) -> bool {
        self.flatten.is_pending()
    }

    /// Flatten onto `img` when edits have settled. Returns true when the
    /// image was redrawn.
    pub fn poll_flatten(&mut self, now: Instant, img: &mut RgbaImage, origin: Point, scale: f32) -> bool {
        if !self.flatten.poll(now) {
            return false;
        }
        self.flatten_now(img, origin, scale);
        true
    }

    /// Flatten onto `img` immediately
    pub fn flatten_now(&self, img: &mut RgbaImage, origin: Point, scale: f32) {
        render_annotations(img, &self.items, origin, scale, self.measure.as_ref());
    }
}
