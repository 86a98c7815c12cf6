//! Interactive rectangle selection over the assembled screens
//!
//! The host routes raw input to [`SelectionEditor`] and drains
//! [`EditorEvent`]s after each call. All coordinates are canvas-local
//! logical units, with the top-left of the screen union at the origin.

use std::mem;

use super::handles::{HANDLE_RADIUS_MOUSE, Handles, handle_radius};
use super::model::Selection;
use crate::capture::compose::{self, Canvas, Platform};
use crate::capture::{Capture, ImageSource, ScreenImage, gather};
use crate::config::{RegionMemory, Settings};
use crate::domain::utils::{dpr_round, dpx, rect_bounded};
use crate::domain::{
    CursorShape, InputModality, Key, Modifiers, MouseLocation, Point, PointerButton, RectF,
};

/// Width of the edge bands that resize along one axis
pub const BORDER_DRAG_AREA: f32 = 10.0;
/// Edge bands only exist on selections at least this wide and tall
pub const BORDER_DRAG_MIN_SIZE: f32 = 100.0;
/// Arrow key step without Shift, in logical units
pub const LARGE_STEP: f32 = 15.0;

/// Notifications for the host, in the order they happened
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    CursorChanged(CursorShape),
    DragLocationChanged(MouseLocation),
    HandlesRectChanged(RectF),
    MagnifierAllowedChanged(bool),
    ScreensRectChanged(RectF),
    ScreenImagesChanged,
    /// Accepted region to persist, x y width height in device pixels
    CropRegion([i32; 4]),
    Accepted(Box<Capture>),
    Cancelled,
}

#[derive(Debug)]
pub struct SelectionEditor {
    platform: Platform,
    settings: Settings,
    selection: Selection,
    device_pixel_ratio: f32,
    device_pixel: f32,
    pen_width: f32,
    screens: Vec<ScreenImage>,
    canvas: Option<Canvas>,
    screens_rect: RectF,
    /// Anchor of the current drag
    start_pos: Point,
    initial_top_left: Point,
    drag_location: MouseLocation,
    mouse_pos: Point,
    magnifier_allowed: bool,
    toggle_magnifier: bool,
    disable_arrow_keys: bool,
    handle_radius: f32,
    handles: Handles,
    cursor: CursorShape,
    events: Vec<EditorEvent>,
}

impl SelectionEditor {
    pub fn new(platform: Platform, settings: Settings) -> Self {
        let device_pixel_ratio = platform.device_pixel_ratio();
        Self {
            platform,
            settings,
            selection: Selection::new(),
            device_pixel_ratio,
            device_pixel: dpx(device_pixel_ratio),
            pen_width: dpr_round(1.0, device_pixel_ratio),
            screens: Vec::new(),
            canvas: None,
            screens_rect: RectF::default(),
            start_pos: Point::default(),
            initial_top_left: Point::default(),
            drag_location: MouseLocation::None,
            mouse_pos: Point::default(),
            magnifier_allowed: false,
            toggle_magnifier: false,
            disable_arrow_keys: false,
            handle_radius: HANDLE_RADIUS_MOUSE,
            handles: Handles::default(),
            cursor: CursorShape::Crosshair,
            events: Vec::new(),
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn device_pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio
    }

    pub fn screens_rect(&self) -> RectF {
        self.screens_rect
    }

    pub fn width(&self) -> f32 {
        self.screens_rect.width
    }

    pub fn height(&self) -> f32 {
        self.screens_rect.height
    }

    pub fn screens(&self) -> &[ScreenImage] {
        &self.screens
    }

    pub fn canvas(&self) -> Option<&Canvas> {
        self.canvas.as_ref()
    }

    pub fn drag_location(&self) -> MouseLocation {
        self.drag_location
    }

    pub fn handles(&self) -> &Handles {
        &self.handles
    }

    pub fn handles_rect(&self) -> RectF {
        self.handles.rect
    }

    pub fn handle_radius(&self) -> f32 {
        self.handle_radius
    }

    pub fn mouse_position(&self) -> Point {
        self.mouse_pos
    }

    pub fn cursor(&self) -> CursorShape {
        self.cursor
    }

    pub fn magnifier_allowed(&self) -> bool {
        self.magnifier_allowed
    }

    /// Holding Shift flips the magnifier setting for as long as it is held
    pub fn show_magnifier(&self) -> bool {
        self.magnifier_allowed && (self.settings.show_magnifier != self.toggle_magnifier)
    }

    pub fn mask_color(&self) -> [u8; 4] {
        self.settings.mask_color()
    }

    /// Drain pending notifications
    pub fn take_events(&mut self) -> Vec<EditorEvent> {
        mem::take(&mut self.events)
    }

    fn canvas_rect(&self) -> RectF {
        RectF::new(0.0, 0.0, self.screens_rect.width, self.screens_rect.height)
    }

    /// Replace the selection and refresh the handles when it changed
    pub fn set_selection(&mut self, rect: RectF) -> bool {
        if !self.selection.set_rect(rect) {
            return false;
        }
        self.update_handles();
        true
    }

    pub fn clear_selection(&mut self) -> bool {
        self.set_selection(RectF::default())
    }

    fn update_handles(&mut self) {
        let handles = Handles::compute(
            self.selection.rect(),
            self.screens_rect,
            self.handle_radius,
            self.pen_width,
        );
        let moved = handles.rect != self.handles.rect;
        self.handles = handles;
        if moved {
            self.events.push(EditorEvent::HandlesRectChanged(handles.rect));
        }
    }

    fn set_cursor(&mut self, cursor: CursorShape) {
        if self.cursor != cursor {
            self.cursor = cursor;
            self.events.push(EditorEvent::CursorChanged(cursor));
        }
    }

    fn set_drag_location(&mut self, location: MouseLocation) {
        if self.drag_location != location {
            self.drag_location = location;
            self.events.push(EditorEvent::DragLocationChanged(location));
        }
    }

    fn announce_magnifier(&mut self, was_allowed: bool) {
        if self.magnifier_allowed != was_allowed {
            self.events
                .push(EditorEvent::MagnifierAllowedChanged(self.magnifier_allowed));
        }
    }

    /// Capture the screens from `source` and show them. On error the editor
    /// keeps whatever it showed before.
    pub fn load(&mut self, source: &dyn ImageSource) -> anyhow::Result<()> {
        let screens = gather(source)?;
        self.set_screen_images(screens);
        Ok(())
    }

    pub fn set_screen_images(&mut self, screens: Vec<ScreenImage>) {
        let canvas = (!screens.is_empty()).then(|| compose::assemble(&screens, self.platform));
        let screens_rect = canvas.as_ref().map(|c| c.screens_rect).unwrap_or_default();
        self.screens = screens;
        self.canvas = canvas;
        if self.screens_rect != screens_rect {
            self.screens_rect = screens_rect;
            self.events.push(EditorEvent::ScreensRectChanged(screens_rect));
        }
        self.events.push(EditorEvent::ScreenImagesChanged);
        if self.selection.is_empty() {
            self.restore_region();
        }
        self.update_handles();
    }

    /// Offer the remembered region again, clipped to the current screens
    fn restore_region(&mut self) {
        let Some(stored) = self.settings.crop_rect() else {
            return;
        };
        let region = stored
            .scaled(1.0 / self.device_pixel_ratio)
            .intersected(&self.canvas_rect());
        if region.is_empty() {
            log::warn!("Remembered region {:?} is outside the screens, ignoring it", stored);
            return;
        }
        log::debug!("Restoring region {:?}", region);
        self.set_selection(region);
    }

    /// Classify `pos`: handles first, then the edge bands of a large enough
    /// selection, then inside or outside
    pub fn mouse_location(&self, pos: Point) -> MouseLocation {
        // No handles are shown without a selection
        if !self.selection.is_empty()
            && let Some(location) = self.handles.hit(pos, self.handle_radius)
        {
            return location;
        }

        let rect = self.selection.normalized();
        if rect.width >= BORDER_DRAG_MIN_SIZE && rect.height >= BORDER_DRAG_MIN_SIZE {
            let band = BORDER_DRAG_AREA;
            if rect.adjusted(0.0, 0.0, 0.0, -rect.height + band).contains(pos) {
                return MouseLocation::Top;
            }
            if rect.adjusted(0.0, rect.height - band, 0.0, 0.0).contains(pos) {
                return MouseLocation::Bottom;
            }
            if rect.adjusted(0.0, 0.0, -rect.width + band, 0.0).contains(pos) {
                return MouseLocation::Left;
            }
            if rect.adjusted(rect.width - band, 0.0, 0.0, 0.0).contains(pos) {
                return MouseLocation::Right;
            }
        }
        if rect.contains(pos) {
            MouseLocation::Inside
        } else {
            MouseLocation::Outside
        }
    }

    fn update_cursor(&mut self, pos: Point) {
        let cursor = self.mouse_location(pos).cursor();
        self.set_cursor(cursor);
    }

    /// Clamp a top-left x in device pixels at the left edge. Mouse drags
    /// move their anchor by the excess so the rectangle follows as soon as
    /// the pointer turns back.
    fn bounds_left(&mut self, x: i32, mouse: bool) -> i32 {
        if x < 0 {
            if mouse {
                self.start_pos.x += x as f32 * self.device_pixel;
            }
            return 0;
        }
        x
    }

    fn bounds_right(&mut self, x: i32, mouse: bool) -> i32 {
        let max_x = ((self.width() - self.selection.width()) * self.device_pixel_ratio).round() as i32;
        let excess = x - max_x;
        if excess > 0 {
            if mouse {
                self.start_pos.x += excess as f32 * self.device_pixel;
            }
            return max_x;
        }
        x
    }

    fn bounds_up(&mut self, y: i32, mouse: bool) -> i32 {
        if y < 0 {
            if mouse {
                self.start_pos.y += y as f32 * self.device_pixel;
            }
            return 0;
        }
        y
    }

    fn bounds_down(&mut self, y: i32, mouse: bool) -> i32 {
        let max_y = ((self.height() - self.selection.height()) * self.device_pixel_ratio).round() as i32;
        let excess = y - max_y;
        if excess > 0 {
            if mouse {
                self.start_pos.y += excess as f32 * self.device_pixel;
            }
            return max_y;
        }
        y
    }

    pub fn pointer_down(&mut self, pos: Point, button: PointerButton, modality: InputModality) {
        let radius = handle_radius(modality);
        if radius != self.handle_radius {
            self.handle_radius = radius;
            self.update_handles();
        }
        if button == PointerButton::Middle {
            return;
        }
        if button == PointerButton::Right && self.drag_location == MouseLocation::None {
            self.clear_selection();
        }

        let was_allowed = self.magnifier_allowed;
        self.mouse_pos = pos;
        let location = self.mouse_location(pos);
        self.set_drag_location(location);
        self.magnifier_allowed = true;
        self.disable_arrow_keys = true;

        let rect = self.selection.rect();
        match location {
            MouseLocation::Outside => self.start_pos = pos,
            MouseLocation::Inside => {
                self.start_pos = pos;
                self.magnifier_allowed = false;
                self.initial_top_left = rect.top_left();
                self.set_cursor(CursorShape::ClosedHand);
            }
            MouseLocation::Top | MouseLocation::Left | MouseLocation::TopLeft => {
                self.start_pos = rect.bottom_right();
            }
            MouseLocation::Bottom | MouseLocation::Right | MouseLocation::BottomRight => {
                self.start_pos = rect.top_left();
            }
            MouseLocation::TopRight => self.start_pos = rect.bottom_left(),
            MouseLocation::BottomLeft => self.start_pos = rect.top_right(),
            MouseLocation::None => {}
        }
        self.announce_magnifier(was_allowed);
    }

    pub fn pointer_move(&mut self, pos: Point) {
        self.mouse_pos = pos;
        let was_allowed = self.magnifier_allowed;
        self.magnifier_allowed = true;

        let start = self.start_pos;
        let dp = self.device_pixel;
        let rect = self.selection.rect();
        let after_x = pos.x >= start.x;
        let after_y = pos.y >= start.y;
        let pad_x = if after_x { dp } else { 0.0 };
        let pad_y = if after_y { dp } else { 0.0 };

        match self.drag_location {
            MouseLocation::None => {
                self.update_cursor(pos);
                self.magnifier_allowed = false;
            }
            location if location.is_corner() => {
                self.set_selection(RectF::new(
                    if after_x { start.x } else { pos.x },
                    if after_y { start.y } else { pos.y },
                    (pos.x - start.x).abs() + pad_x,
                    (pos.y - start.y).abs() + pad_y,
                ));
            }
            MouseLocation::Outside => {
                self.set_selection(RectF::new(
                    pos.x.min(start.x),
                    pos.y.min(start.y),
                    (pos.x - start.x).abs() + dp,
                    (pos.y - start.y).abs() + dp,
                ));
            }
            MouseLocation::Top | MouseLocation::Bottom => {
                self.set_selection(RectF::new(
                    rect.x,
                    if after_y { start.y } else { pos.y },
                    rect.width,
                    (pos.y - start.y).abs() + pad_y,
                ));
            }
            MouseLocation::Left | MouseLocation::Right => {
                self.set_selection(RectF::new(
                    if after_x { start.x } else { pos.x },
                    rect.y,
                    (pos.x - start.x).abs() + pad_x,
                    rect.height,
                ));
            }
            MouseLocation::Inside => {
                self.magnifier_allowed = false;
                self.drag_inside(pos);
            }
            _ => {}
        }
        self.announce_magnifier(was_allowed);
    }

    /// Translate the selection with the pointer, keeping it on the canvas
    fn drag_inside(&mut self, pos: Point) {
        let size = self.selection.rect().size();
        let dpr = self.device_pixel_ratio;
        let candidate = self.initial_top_left + (pos - self.start_pos);

        let x = (candidate.x * dpr).round() as i32;
        let x = self.bounds_left(x, true);
        let x = self.bounds_right(x, true);
        let y = (candidate.y * dpr).round() as i32;
        let y = self.bounds_up(y, true);
        let y = self.bounds_down(y, true);

        let moved = RectF::new(
            x as f32 * self.device_pixel,
            y as f32 * self.device_pixel,
            size.width,
            size.height,
        );
        let bounded = rect_bounded(moved, self.canvas_rect());
        self.set_selection(bounded);
    }

    pub fn pointer_up(&mut self, button: PointerButton) {
        let mut accept = false;
        if matches!(button, PointerButton::Left | PointerButton::Right) {
            accept = self.drag_location == MouseLocation::Outside && self.settings.release_to_capture;
            self.disable_arrow_keys = false;
            if self.drag_location == MouseLocation::Inside {
                self.set_cursor(CursorShape::OpenHand);
            }
        }
        self.set_drag_location(MouseLocation::None);
        if self.magnifier_allowed {
            self.magnifier_allowed = false;
            self.events.push(EditorEvent::MagnifierAllowedChanged(false));
        }
        if accept {
            self.accept();
        }
    }

    pub fn pointer_hover(&mut self, pos: Point) {
        self.mouse_pos = pos;
        self.update_cursor(pos);
    }

    pub fn double_click(&mut self, pos: Point, button: PointerButton) {
        self.mouse_pos = pos;
        if button == PointerButton::Left && self.selection.contains(pos) {
            self.accept();
        }
    }

    pub fn key_down(&mut self, key: Key, modifiers: Modifiers) {
        if modifiers.shift {
            self.toggle_magnifier = true;
        }
        match key {
            Key::Enter | Key::Return => {
                self.accept();
            }
            Key::Escape => self.events.push(EditorEvent::Cancelled),
            key if key.is_arrow() => self.arrow_key(key, modifiers),
            _ => {}
        }
    }

    pub fn key_up(&mut self, _key: Key, modifiers: Modifiers) {
        if self.toggle_magnifier && !modifiers.shift {
            self.toggle_magnifier = false;
        }
    }

    /// Nudge the selection, or with Alt grow and shrink it from its right
    /// and bottom edges
    fn arrow_key(&mut self, key: Key, modifiers: Modifiers) {
        if self.disable_arrow_keys {
            return;
        }
        let dpr = self.device_pixel_ratio;
        let dp = self.device_pixel;
        let resize = modifiers.alt;
        let step = if modifiers.shift {
            1
        } else {
            (dpr_round(LARGE_STEP, dpr) * dpr).round() as i32
        };

        let mut rect = self.selection.rect();
        let left = (rect.left() * dpr).round() as i32;
        let top = (rect.top() * dpr).round() as i32;
        match key {
            Key::Left | Key::Right => {
                let x = if key == Key::Left {
                    self.bounds_left(left - step, false)
                } else {
                    self.bounds_right(left + step, false)
                };
                if resize {
                    rect.width = dp * x as f32 + rect.width - rect.x;
                } else {
                    rect.x = dp * x as f32;
                }
            }
            Key::Up | Key::Down => {
                let y = if key == Key::Up {
                    self.bounds_up(top - step, false)
                } else {
                    self.bounds_down(top + step, false)
                };
                if resize {
                    rect.height = dp * y as f32 + rect.height - rect.y;
                } else {
                    rect.y = dp * y as f32;
                }
            }
            _ => return,
        }

        let rect = if resize {
            rect.normalized()
        } else {
            rect_bounded(rect, self.canvas_rect())
        };
        self.set_selection(rect);
    }

    /// Crop the current selection out of the screens and hand it to the
    /// host. An empty selection takes everything. Returns false when there
    /// is nothing to crop from.
    pub fn accept(&mut self) -> bool {
        let Some(canvas) = self.canvas.as_ref() else {
            log::warn!("Nothing captured, cannot accept selection");
            return false;
        };

        let mut region = self.selection.normalized();
        if !region.is_empty() {
            let stored = region.scaled(self.device_pixel_ratio).to_aligned_rect();
            self.settings.set_crop_rect(stored);
            if self.settings.remember_last_region == RegionMemory::Always {
                self.events
                    .push(EditorEvent::CropRegion(self.settings.crop_region));
            }
        } else {
            region = canvas.local_rect();
        }

        let capture = match self.platform {
            Platform::X11 { .. } => Capture {
                image: compose::crop_canvas(&canvas.image, region, self.device_pixel_ratio),
                device_pixel_ratio: self.device_pixel_ratio,
                region,
            },
            Platform::Wayland => compose::crop_screens(&self.screens, canvas.screens_rect, region),
        };
        log::info!(
            "Accepted {}x{} capture of {:?}",
            capture.image.width(),
            capture.image.height(),
            region
        );
        self.events.push(EditorEvent::Accepted(Box::new(capture)));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::source::tests::{FixedSource, screen};
    use image::{Rgba, RgbaImage};

    fn editor_with(settings: Settings) -> SelectionEditor {
        let mut editor = SelectionEditor::new(Platform::Wayland, settings);
        let image = RgbaImage::from_pixel(1000, 800, Rgba([10, 20, 30, 255]));
        editor.set_screen_images(vec![ScreenImage::at(Point::default(), image, 1.0)]);
        editor.take_events();
        editor
    }

    fn editor() -> SelectionEditor {
        editor_with(Settings::default())
    }

    fn press(editor: &mut SelectionEditor, x: f32, y: f32) {
        editor.pointer_down(Point::new(x, y), PointerButton::Left, InputModality::Mouse);
    }

    fn accepted(events: &[EditorEvent]) -> Option<&Capture> {
        events.iter().find_map(|e| match e {
            EditorEvent::Accepted(capture) => Some(capture.as_ref()),
            _ => None,
        })
    }

    #[test]
    fn corner_drag_keeps_opposite_corner() {
        let mut editor = editor();
        editor.set_selection(RectF::new(10.0, 10.0, 100.0, 100.0));
        press(&mut editor, 110.0, 110.0);
        assert_eq!(editor.drag_location(), MouseLocation::BottomRight);
        editor.pointer_move(Point::new(200.0, 150.0));
        // The far edge includes the pointer's own pixel
        assert_eq!(editor.selection().rect(), RectF::new(10.0, 10.0, 191.0, 141.0));
        // Crossing the anchor flips the rectangle
        editor.pointer_move(Point::new(5.0, 5.0));
        assert_eq!(editor.selection().rect(), RectF::new(5.0, 5.0, 5.0, 5.0));
    }

    #[test]
    fn hit_test_order() {
        let mut editor = editor();
        editor.set_selection(RectF::new(100.0, 100.0, 200.0, 200.0));
        assert_eq!(editor.mouse_location(Point::new(100.0, 100.0)), MouseLocation::TopLeft);
        assert_eq!(editor.mouse_location(Point::new(150.0, 105.0)), MouseLocation::Top);
        assert_eq!(editor.mouse_location(Point::new(298.0, 150.0)), MouseLocation::Right);
        assert_eq!(editor.mouse_location(Point::new(150.0, 150.0)), MouseLocation::Inside);
        assert_eq!(editor.mouse_location(Point::new(50.0, 50.0)), MouseLocation::Outside);

        // Too small for edge bands
        editor.set_selection(RectF::new(100.0, 100.0, 50.0, 50.0));
        assert_eq!(editor.mouse_location(Point::new(115.0, 120.0)), MouseLocation::Inside);
    }

    #[test]
    fn drawing_a_new_rectangle() {
        let mut editor = editor();
        press(&mut editor, 50.0, 60.0);
        assert_eq!(editor.drag_location(), MouseLocation::Outside);
        assert!(editor.magnifier_allowed());
        editor.pointer_move(Point::new(20.0, 30.0));
        assert_eq!(editor.selection().rect(), RectF::new(20.0, 30.0, 31.0, 31.0));
        editor.pointer_up(PointerButton::Left);
        assert_eq!(editor.drag_location(), MouseLocation::None);
        assert!(!editor.magnifier_allowed());
        let events = editor.take_events();
        assert!(accepted(&events).is_none());
        assert!(events.contains(&EditorEvent::DragLocationChanged(MouseLocation::None)));
    }

    #[test]
    fn right_click_clears() {
        let mut editor = editor();
        editor.set_selection(RectF::new(100.0, 100.0, 200.0, 200.0));
        editor.pointer_down(Point::new(150.0, 150.0), PointerButton::Right, InputModality::Mouse);
        assert!(editor.selection().is_empty());
        assert_eq!(editor.drag_location(), MouseLocation::Outside);
    }

    #[test]
    fn inside_drag_stays_on_canvas_and_follows_back() {
        let mut editor = editor();
        editor.set_selection(RectF::new(100.0, 100.0, 200.0, 100.0));
        press(&mut editor, 150.0, 150.0);
        assert_eq!(editor.drag_location(), MouseLocation::Inside);
        assert_eq!(editor.cursor(), CursorShape::ClosedHand);
        assert!(!editor.magnifier_allowed());

        editor.pointer_move(Point::new(0.0, 150.0));
        assert_eq!(editor.selection().rect(), RectF::new(0.0, 100.0, 200.0, 100.0));
        // The anchor moved with the clamp, so turning back moves at once
        editor.pointer_move(Point::new(50.0, 150.0));
        assert_eq!(editor.selection().rect(), RectF::new(50.0, 100.0, 200.0, 100.0));

        editor.pointer_move(Point::new(2000.0, 2000.0));
        assert_eq!(editor.selection().rect(), RectF::new(800.0, 700.0, 200.0, 100.0));

        editor.pointer_up(PointerButton::Left);
        assert_eq!(editor.cursor(), CursorShape::OpenHand);
    }

    #[test]
    fn edge_drag_changes_one_axis() {
        let mut editor = editor();
        editor.set_selection(RectF::new(100.0, 100.0, 200.0, 200.0));
        press(&mut editor, 150.0, 105.0);
        assert_eq!(editor.drag_location(), MouseLocation::Top);
        editor.pointer_move(Point::new(400.0, 50.0));
        assert_eq!(editor.selection().rect(), RectF::new(100.0, 50.0, 200.0, 250.0));
    }

    #[test]
    fn release_to_capture_accepts_new_rectangle() {
        let mut editor = editor_with(Settings {
            release_to_capture: true,
            ..Settings::default()
        });
        press(&mut editor, 10.0, 10.0);
        editor.pointer_move(Point::new(19.0, 29.0));
        editor.pointer_up(PointerButton::Left);
        let events = editor.take_events();
        let capture = accepted(&events).expect("accepted");
        assert_eq!(capture.image.dimensions(), (10, 20));
        assert_eq!(capture.image.get_pixel(0, 0).0, [10, 20, 30, 255]);
    }

    #[test]
    fn arrow_keys_move_and_resize() {
        let mut editor = editor();
        editor.set_selection(RectF::new(100.0, 100.0, 50.0, 50.0));
        editor.key_down(Key::Left, Modifiers::NONE);
        assert_eq!(editor.selection().rect(), RectF::new(85.0, 100.0, 50.0, 50.0));
        editor.key_down(Key::Right, Modifiers::shift());
        assert_eq!(editor.selection().rect(), RectF::new(86.0, 100.0, 50.0, 50.0));
        editor.key_down(Key::Right, Modifiers::alt());
        assert_eq!(editor.selection().rect(), RectF::new(86.0, 100.0, 65.0, 50.0));
        editor.key_down(Key::Down, Modifiers::alt());
        assert_eq!(editor.selection().rect(), RectF::new(86.0, 100.0, 65.0, 65.0));
        editor.key_down(Key::Up, Modifiers::NONE);
        assert_eq!(editor.selection().rect(), RectF::new(86.0, 85.0, 65.0, 65.0));

        // Shrinking past the left edge flips the rectangle
        editor.set_selection(RectF::new(100.0, 100.0, 10.0, 50.0));
        editor.key_down(Key::Left, Modifiers::alt());
        assert_eq!(editor.selection().rect(), RectF::new(95.0, 100.0, 5.0, 50.0));
        assert!(editor.selection().width() > 0.0);

        // Clamped at the canvas edge
        editor.set_selection(RectF::new(5.0, 5.0, 50.0, 50.0));
        editor.key_down(Key::Left, Modifiers::NONE);
        assert_eq!(editor.selection().rect(), RectF::new(0.0, 5.0, 50.0, 50.0));
    }

    fn x11_editor(device_pixel_ratio: f32) -> SelectionEditor {
        let mut editor = SelectionEditor::new(Platform::X11 { device_pixel_ratio }, Settings::default());
        let (w, h) = (1000.0 * device_pixel_ratio, 800.0 * device_pixel_ratio);
        let image = RgbaImage::from_pixel(w as u32, h as u32, Rgba([10, 20, 30, 255]));
        editor.set_screen_images(vec![ScreenImage::new(
            RectF::new(0.0, 0.0, 1000.0, 800.0),
            image,
            device_pixel_ratio,
        )]);
        editor.take_events();
        editor
    }

    fn assert_on_device_pixels(value: f32, dpr: f32) {
        let px = value * dpr;
        assert!((px - px.round()).abs() < 1e-3, "{value} is not on a device pixel");
    }

    fn assert_near(actual: f32, expected: f32) {
        assert!((actual - expected).abs() < 1e-3, "{actual} != {expected}");
    }

    #[test]
    fn fractional_ratio_drag_and_keys() {
        let dpr = 1.5;
        let mut editor = x11_editor(dpr);
        assert_eq!(editor.screens_rect(), RectF::new(0.0, 0.0, 1000.0, 800.0));
        editor.set_selection(RectF::new(300.0, 300.0, 200.0, 100.0));
        press(&mut editor, 400.0, 350.0);
        assert_eq!(editor.drag_location(), MouseLocation::Inside);

        // Past the right and bottom edges
        editor.pointer_move(Point::new(1000.0, 900.0));
        let rect = editor.selection().rect();
        assert_near(rect.x, 800.0);
        assert_near(rect.y, 700.0);

        // Turning back moves the rectangle straight away
        editor.pointer_move(Point::new(950.0, 850.0));
        let rect = editor.selection().rect();
        assert_near(rect.x, 750.0);
        assert_near(rect.y, 650.0);
        assert_on_device_pixels(rect.x, dpr);
        assert_on_device_pixels(rect.y, dpr);
        assert_near(rect.width, 200.0);
        editor.pointer_up(PointerButton::Left);

        // Shift steps a single device pixel
        editor.key_down(Key::Right, Modifiers::shift());
        let rect = editor.selection().rect();
        assert_near(rect.x, 750.0 + 1.0 / dpr);
        assert_on_device_pixels(rect.x, dpr);

        // The large step is rounded to whole device pixels too
        editor.key_down(Key::Down, Modifiers::NONE);
        let rect = editor.selection().rect();
        assert_near(rect.y, 650.0 + 23.0 / dpr);
        assert_on_device_pixels(rect.y, dpr);
    }

    #[test]
    fn handles_track_every_selection_change() {
        let mut editor = editor();
        let expected = |editor: &SelectionEditor| {
            Handles::compute(
                editor.selection().rect(),
                editor.screens_rect(),
                editor.handle_radius(),
                1.0,
            )
        };
        editor.set_selection(RectF::new(100.0, 100.0, 200.0, 200.0));
        assert_eq!(*editor.handles(), expected(&editor));
        assert_eq!(editor.mouse_location(Point::new(100.0, 100.0)), MouseLocation::TopLeft);

        press(&mut editor, 150.0, 150.0);
        editor.pointer_move(Point::new(250.0, 250.0));
        editor.pointer_up(PointerButton::Left);
        assert_eq!(*editor.handles(), expected(&editor));
        assert_eq!(editor.mouse_location(Point::new(200.0, 200.0)), MouseLocation::TopLeft);

        editor.key_down(Key::Right, Modifiers::alt());
        assert_eq!(*editor.handles(), expected(&editor));

        editor.clear_selection();
        assert_eq!(*editor.handles(), expected(&editor));
    }

    #[test]
    fn arrow_keys_ignored_while_dragging() {
        let mut editor = editor();
        editor.set_selection(RectF::new(100.0, 100.0, 200.0, 200.0));
        press(&mut editor, 150.0, 150.0);
        editor.key_down(Key::Left, Modifiers::NONE);
        assert_eq!(editor.selection().rect(), RectF::new(100.0, 100.0, 200.0, 200.0));
        editor.pointer_up(PointerButton::Left);
        editor.key_down(Key::Left, Modifiers::NONE);
        assert_eq!(editor.selection().rect(), RectF::new(85.0, 100.0, 200.0, 200.0));
    }

    #[test]
    fn shift_flips_magnifier_setting() {
        let mut editor = editor();
        press(&mut editor, 10.0, 10.0);
        assert!(!editor.show_magnifier());
        editor.key_down(Key::Other, Modifiers::shift());
        assert!(editor.show_magnifier());
        editor.key_up(Key::Other, Modifiers::NONE);
        assert!(!editor.show_magnifier());

        let mut editor = editor_with(Settings {
            show_magnifier: true,
            ..Settings::default()
        });
        assert!(!editor.show_magnifier());
        press(&mut editor, 10.0, 10.0);
        assert!(editor.show_magnifier());
        editor.key_down(Key::Other, Modifiers::shift());
        assert!(!editor.show_magnifier());
    }

    #[test]
    fn enter_accepts_escape_cancels() {
        let mut editor = editor();
        editor.set_selection(RectF::new(0.0, 0.0, 4.0, 3.0));
        editor.key_down(Key::Return, Modifiers::NONE);
        editor.key_down(Key::Escape, Modifiers::NONE);
        let events = editor.take_events();
        assert_eq!(accepted(&events).map(|c| c.image.dimensions()), Some((4, 3)));
        assert_eq!(events.last(), Some(&EditorEvent::Cancelled));
    }

    #[test]
    fn accept_without_screens_fails() {
        let mut editor = SelectionEditor::new(Platform::Wayland, Settings::default());
        assert!(!editor.accept());
        assert!(editor.take_events().is_empty());
    }

    #[test]
    fn empty_selection_accepts_everything() {
        let mut editor = editor();
        assert!(editor.accept());
        let events = editor.take_events();
        assert_eq!(accepted(&events).map(|c| c.image.dimensions()), Some((1000, 800)));
    }

    #[test]
    fn double_click_inside_accepts() {
        let mut editor = editor();
        editor.set_selection(RectF::new(100.0, 100.0, 200.0, 200.0));
        editor.double_click(Point::new(50.0, 50.0), PointerButton::Left);
        assert!(accepted(&editor.take_events()).is_none());
        editor.double_click(Point::new(150.0, 150.0), PointerButton::Left);
        assert!(accepted(&editor.take_events()).is_some());
    }

    #[test]
    fn region_is_reported_only_when_always_remembered() {
        let mut editor = editor();
        editor.set_selection(RectF::new(1.0, 2.0, 30.0, 40.0));
        editor.accept();
        assert!(!editor.take_events().iter().any(|e| matches!(e, EditorEvent::CropRegion(_))));
        assert_eq!(editor.settings().crop_region, [1, 2, 30, 40]);

        let mut editor = editor_with(Settings {
            remember_last_region: RegionMemory::Always,
            ..Settings::default()
        });
        editor.set_selection(RectF::new(1.0, 2.0, 30.0, 40.0));
        editor.accept();
        assert!(editor.take_events().contains(&EditorEvent::CropRegion([1, 2, 30, 40])));
    }

    #[test]
    fn remembered_region_is_restored_and_clipped() {
        let editor = editor_with(Settings {
            remember_last_region: RegionMemory::UntilClosed,
            crop_region: [900, 700, 300, 300],
            ..Settings::default()
        });
        assert_eq!(editor.selection().rect(), RectF::new(900.0, 700.0, 100.0, 100.0));

        let _ = env_logger::builder().is_test(true).try_init();
        let editor = editor_with(Settings {
            remember_last_region: RegionMemory::Always,
            crop_region: [5000, 5000, 10, 10],
            ..Settings::default()
        });
        assert!(editor.selection().is_empty());
    }

    #[test]
    fn hover_updates_cursor() {
        let mut editor = editor();
        editor.set_selection(RectF::new(100.0, 100.0, 200.0, 200.0));
        editor.take_events();
        editor.pointer_hover(Point::new(150.0, 150.0));
        editor.pointer_hover(Point::new(300.0, 300.0));
        editor.pointer_hover(Point::new(301.0, 301.0));
        assert_eq!(
            editor.take_events(),
            vec![
                EditorEvent::CursorChanged(CursorShape::OpenHand),
                EditorEvent::CursorChanged(CursorShape::ResizeDiagonalForward),
            ]
        );
    }

    #[test]
    fn handles_follow_the_selection() {
        let mut editor = editor();
        editor.set_selection(RectF::new(100.0, 100.0, 200.0, 200.0));
        let events = editor.take_events();
        assert_eq!(
            events,
            vec![EditorEvent::HandlesRectChanged(RectF::new(91.0, 91.0, 218.0, 218.0))]
        );
        editor.pointer_down(Point::new(500.0, 500.0), PointerButton::Left, InputModality::Touch);
        assert_eq!(editor.handle_radius(), 12.0);
        assert_eq!(editor.handles_rect(), RectF::new(88.0, 88.0, 224.0, 224.0));
    }

    #[test]
    fn load_rejects_inconsistent_source() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut editor = editor();
        let source = FixedSource {
            screens: vec![screen("a", RectF::new(0.0, 0.0, 10.0, 10.0), 1.0)],
            images: Vec::new(),
        };
        assert!(editor.load(&source).is_err());
        assert_eq!(editor.screens_rect(), RectF::new(0.0, 0.0, 1000.0, 800.0));

        let source = FixedSource {
            screens: vec![screen("a", RectF::new(0.0, 0.0, 10.0, 10.0), 1.0)],
            images: vec![RgbaImage::new(10, 10)],
        };
        editor.load(&source).expect("load");
        assert_eq!(editor.screens_rect(), RectF::new(0.0, 0.0, 10.0, 10.0));
        assert!(editor.take_events().contains(&EditorEvent::ScreensRectChanged(RectF::new(0.0, 0.0, 10.0, 10.0))));
    }

    #[test]
    fn x11_crops_the_canvas_in_device_pixels() {
        let mut editor = SelectionEditor::new(Platform::X11 { device_pixel_ratio: 2.0 }, Settings::default());
        let image = RgbaImage::from_pixel(100, 100, Rgba([1, 2, 3, 255]));
        editor.set_screen_images(vec![ScreenImage::new(RectF::new(0.0, 0.0, 50.0, 50.0), image, 2.0)]);
        assert_eq!(editor.screens_rect(), RectF::new(0.0, 0.0, 50.0, 50.0));
        editor.set_selection(RectF::new(10.0, 10.0, 20.0, 20.0));
        editor.accept();
        let events = editor.take_events();
        let capture = accepted(&events).expect("accepted");
        assert_eq!(capture.image.dimensions(), (40, 40));
        assert_eq!(capture.device_pixel_ratio, 2.0);
    }
}
