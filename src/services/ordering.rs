//! Ordering of the image collection and the drag sources that feed it.
//!
//! Every mutation funnels through [`apply_main_invariant`], so whatever sits
//! at index 0 afterwards is the one and only main image.

use crate::models::ImageRecord;

/// Pointer travel, in pixels, before a press turns into a drag.
pub const DEFAULT_ACTIVATION_DISTANCE: f32 = 8.0;

pub fn apply_main_invariant(images: Vec<ImageRecord>) -> Vec<ImageRecord> {
    images
        .into_iter()
        .enumerate()
        .map(|(idx, mut img)| {
            img.is_main = idx == 0;
            img
        })
        .collect()
}

/// Append freshly uploaded records.
pub fn insert(images: &[ImageRecord], new_images: Vec<ImageRecord>) -> Vec<ImageRecord> {
    let mut updated = images.to_vec();
    updated.extend(new_images);
    apply_main_invariant(updated)
}

pub fn remove(images: &[ImageRecord], index: usize) -> Option<Vec<ImageRecord>> {
    if index >= images.len() {
        return None;
    }
    let mut updated = images.to_vec();
    updated.remove(index);
    Some(apply_main_invariant(updated))
}

/// Move the record at `from` to `to`. Returns `None` when the move would not
/// change anything or either position is out of range.
pub fn reorder(images: &[ImageRecord], from: usize, to: usize) -> Option<Vec<ImageRecord>> {
    if from == to || from >= images.len() || to >= images.len() {
        return None;
    }
    let mut updated = images.to_vec();
    let moved = updated.remove(from);
    updated.insert(to, moved);
    Some(apply_main_invariant(updated))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReorderIntent {
    pub source: usize,
    pub destination: usize,
}

impl ReorderIntent {
    pub fn new(source: usize, destination: usize) -> Self {
        Self {
            source,
            destination,
        }
    }

    pub fn apply(&self, images: &[ImageRecord]) -> Option<Vec<ImageRecord>> {
        reorder(images, self.source, self.destination)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// On-screen slot of one item, in collection order.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }

    pub fn translate(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

/// Index of the slot whose centre is nearest to `target`.
pub fn closest_center(target: Point, layout: &[Rect]) -> Option<usize> {
    layout
        .iter()
        .enumerate()
        .map(|(idx, rect)| (idx, rect.center().distance(target)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(idx, _)| idx)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Space,
    Escape,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorEvent {
    PointerDown(Point),
    PointerMove(Point),
    PointerUp(Point),
    PointerCancel,
    /// A key pressed while the item at `focused` holds keyboard focus.
    Key { key: Key, focused: usize },
}

/// Any input method that can turn raw events into a reorder intent.
pub trait DragSensor {
    fn handle(&mut self, event: &SensorEvent, layout: &[Rect]) -> Option<ReorderIntent>;

    fn is_dragging(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PointerState {
    Idle,
    Pressed { source: usize, origin: Point },
    Dragging { source: usize, origin: Point },
}

#[derive(Debug, Clone)]
pub struct PointerSensor {
    activation_distance: f32,
    state: PointerState,
}

impl Default for PointerSensor {
    fn default() -> Self {
        Self::new(DEFAULT_ACTIVATION_DISTANCE)
    }
}

impl PointerSensor {
    pub fn new(activation_distance: f32) -> Self {
        Self {
            activation_distance,
            state: PointerState::Idle,
        }
    }
}

impl DragSensor for PointerSensor {
    fn handle(&mut self, event: &SensorEvent, layout: &[Rect]) -> Option<ReorderIntent> {
        match (*event, self.state) {
            (SensorEvent::PointerDown(p), PointerState::Idle) => {
                if let Some(source) = layout.iter().position(|r| r.contains(p)) {
                    self.state = PointerState::Pressed { source, origin: p };
                }
                None
            }
            (SensorEvent::PointerMove(p), PointerState::Pressed { source, origin }) => {
                if origin.distance(p) >= self.activation_distance {
                    self.state = PointerState::Dragging { source, origin };
                }
                None
            }
            (SensorEvent::PointerUp(p), PointerState::Dragging { source, origin }) => {
                self.state = PointerState::Idle;
                let dragged = layout.get(source)?.translate(p.x - origin.x, p.y - origin.y);
                let destination = closest_center(dragged.center(), layout)?;
                Some(ReorderIntent::new(source, destination))
            }
            (SensorEvent::PointerUp(_), _) | (SensorEvent::PointerCancel, _) => {
                self.state = PointerState::Idle;
                None
            }
            _ => None,
        }
    }

    fn is_dragging(&self) -> bool {
        matches!(self.state, PointerState::Dragging { .. })
    }
}

/// Pick up with Space/Enter, step with the arrow keys, drop with
/// Space/Enter, cancel with Escape.
#[derive(Debug, Clone, Default)]
pub struct KeyboardSensor {
    active: Option<(usize, usize)>,
}

impl KeyboardSensor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot the lifted item would land in right now.
    pub fn target(&self) -> Option<usize> {
        self.active.map(|(_, target)| target)
    }
}

impl DragSensor for KeyboardSensor {
    fn handle(&mut self, event: &SensorEvent, layout: &[Rect]) -> Option<ReorderIntent> {
        let SensorEvent::Key { key, focused } = *event else {
            return None;
        };
        if key == Key::Escape {
            self.active = None;
            return None;
        }
        let last = layout.len().checked_sub(1)?;

        match (key, self.active) {
            (Key::Space | Key::Enter, None) => {
                if focused <= last {
                    self.active = Some((focused, focused));
                }
                None
            }
            (Key::Space | Key::Enter, Some((source, target))) => {
                self.active = None;
                Some(ReorderIntent::new(source, target))
            }
            (Key::ArrowLeft | Key::ArrowUp, Some((source, target))) => {
                self.active = Some((source, target.saturating_sub(1)));
                None
            }
            (Key::ArrowRight | Key::ArrowDown, Some((source, target))) => {
                self.active = Some((source, (target + 1).min(last)));
                None
            }
            _ => None,
        }
    }

    fn is_dragging(&self) -> bool {
        self.active.is_some()
    }
}
