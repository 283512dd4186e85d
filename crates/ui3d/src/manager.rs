//! Panel manager - owns the panel's elements and their interaction state

use tracing::debug;
use wristpanel_render::PanelImage;

use crate::components::{
    ButtonColors, ButtonState, ElementId, PanelButton, PanelElement, PixelPoint, PixelRect,
};
use crate::layout::{RegionKind, RegionLayout};
use crate::render::{draw_cursor, draw_element, CURSOR_COLOR, CURSOR_RADIUS};
use crate::surface::{PanelAction, PanelSurface, PointerEventKind};

/// Callback id of the control panel's record button.
pub const RECORD_CALLBACK: u32 = 1;
/// Callback id of the control panel's send button.
pub const SEND_CALLBACK: u32 = 2;

const BACKGROUND: [u8; 4] = [28, 30, 36, 230];
const DRAG_STRIP_COLOR: [u8; 4] = [48, 52, 62, 255];
const RESIZE_HANDLE_COLOR: [u8; 4] = [110, 116, 130, 255];
const RECORDING_COLORS: ButtonColors = ButtonColors {
    normal: [170, 40, 40, 255],
    hover: [200, 60, 60, 255],
    pressed: [230, 90, 90, 255],
    disabled: [80, 40, 40, 128],
};

/// Owns the elements of one panel, tracks hover/press and renders on demand
pub struct PanelManager {
    width: u32,
    height: u32,
    background: [u8; 4],
    elements: Vec<(ElementId, PanelElement)>,
    next_handle: u64,
    cursor: Option<PixelPoint>,
    hovered: Option<ElementId>,
    pressed: Option<ElementId>,
    recording: bool,
    dirty: bool,
}

impl PanelManager {
    /// Create an empty panel
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            background: BACKGROUND,
            elements: Vec::new(),
            next_handle: 1,
            cursor: None,
            hovered: None,
            pressed: None,
            recording: false,
            dirty: true,
        }
    }

    /// The standard control panel: drag strip along the top, record and send
    /// buttons, resize handle in the bottom-right corner. Gesture regions are
    /// sized from `layout`.
    pub fn control_panel(width: u32, height: u32, layout: &RegionLayout) -> Self {
        let mut panel = Self::new(width, height);
        let scale = |value: f32, extent: u32| (value * extent as f32).round().clamp(0.0, extent as f32) as u32;

        let strip_height = scale(layout.drag_strip_max_v, height);
        panel.add_element(
            PanelElement::fill(PixelRect::new(0, 0, width, strip_height), DRAG_STRIP_COLOR)
                .with_region(RegionKind::DragStrip),
        );

        let margin = width / 12;
        let button_width = width.saturating_sub(margin * 2);
        let button_height = height / 5;
        let first_row = strip_height + height / 10;
        panel.add_element(PanelElement::button(
            PixelRect::new(margin, first_row, button_width, button_height),
            PanelButton::new("Record").with_callback(RECORD_CALLBACK),
        ));
        panel.add_element(PanelElement::button(
            PixelRect::new(
                margin,
                first_row + button_height + height / 20,
                button_width,
                button_height,
            ),
            PanelButton::new("Send").with_callback(SEND_CALLBACK),
        ));

        let handle_x = scale(layout.resize_min_u, width);
        let handle_y = scale(layout.resize_min_v, height);
        panel.add_element(
            PanelElement::fill(
                PixelRect::new(handle_x, handle_y, width - handle_x, height - handle_y),
                RESIZE_HANDLE_COLOR,
            )
            .with_region(RegionKind::ResizeHandle),
        );
        panel
    }

    /// Add an element on top of the existing ones
    pub fn add_element(&mut self, element: PanelElement) -> ElementId {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.elements.push((handle, element));
        self.dirty = true;
        handle
    }

    /// Look up an element
    pub fn element(&self, handle: ElementId) -> Option<&PanelElement> {
        self.elements
            .iter()
            .find(|(id, _)| *id == handle)
            .map(|(_, element)| element)
    }

    fn element_mut(&mut self, handle: ElementId) -> Option<&mut PanelElement> {
        self.elements
            .iter_mut()
            .find(|(id, _)| *id == handle)
            .map(|(_, element)| element)
    }

    /// Find the button with a given callback id
    pub fn button_with_callback(&self, callback_id: u32) -> Option<ElementId> {
        self.elements.iter().find_map(|(id, element)| {
            element
                .as_button()
                .filter(|button| button.callback_id == Some(callback_id))
                .map(|_| *id)
        })
    }

    /// Get a button's state
    pub fn button_state(&self, handle: ElementId) -> Option<ButtonState> {
        self.element(handle)
            .and_then(PanelElement::as_button)
            .map(|button| button.state)
    }

    /// Enable or disable a button
    pub fn set_enabled(&mut self, handle: ElementId, enabled: bool) {
        if self.pressed == Some(handle) && !enabled {
            self.pressed = None;
        }
        let hovered = self.hovered == Some(handle);
        if let Some(button) = self.element_mut(handle).and_then(PanelElement::as_button_mut) {
            let state = match (enabled, hovered) {
                (false, _) => ButtonState::Disabled,
                (true, true) => ButtonState::Hover,
                (true, false) => ButtonState::Normal,
            };
            if button.state != state {
                button.set_state(state);
                self.dirty = true;
            }
        }
    }

    /// Show the record button as "Stop" while recording; send is disabled
    /// until the recording stops
    pub fn set_recording(&mut self, recording: bool) {
        if self.recording == recording {
            return;
        }
        self.recording = recording;
        let Some(handle) = self.button_with_callback(RECORD_CALLBACK) else {
            return;
        };
        if let Some(button) = self.element_mut(handle).and_then(PanelElement::as_button_mut) {
            if recording {
                button.label = "Stop".to_string();
                button.colors = RECORDING_COLORS;
            } else {
                button.label = "Record".to_string();
                button.colors = ButtonColors::default();
            }
        }
        if let Some(send) = self.button_with_callback(SEND_CALLBACK) {
            self.set_enabled(send, !recording);
        }
        self.dirty = true;
    }

    /// Whether the panel shows the recording state
    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Cursor position, if shown
    pub fn cursor(&self) -> Option<PixelPoint> {
        self.cursor
    }

    /// Element under the pointer
    pub fn hovered(&self) -> Option<ElementId> {
        self.hovered
    }

    /// Element holding the current press
    pub fn pressed(&self) -> Option<ElementId> {
        self.pressed
    }

    fn set_button_state(&mut self, handle: ElementId, state: ButtonState) {
        if let Some(button) = self.element_mut(handle).and_then(PanelElement::as_button_mut) {
            if button.is_interactable() && button.state != state {
                button.set_state(state);
                self.dirty = true;
            }
        }
    }

    fn resting_state(&self, handle: ElementId) -> ButtonState {
        if self.pressed == Some(handle) {
            ButtonState::Pressed
        } else if self.hovered == Some(handle) {
            ButtonState::Hover
        } else {
            ButtonState::Normal
        }
    }

    fn set_hovered(&mut self, target: Option<ElementId>) {
        if self.hovered == target {
            return;
        }
        let previous = std::mem::replace(&mut self.hovered, target);
        for handle in previous.into_iter().chain(target) {
            let state = self.resting_state(handle);
            self.set_button_state(handle, state);
        }
    }

    fn interactable_button(&self, handle: ElementId) -> Option<&PanelButton> {
        self.element(handle)
            .and_then(PanelElement::as_button)
            .filter(|button| button.is_interactable())
    }
}

impl PanelSurface for PanelManager {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn render(&mut self) -> PanelImage {
        let mut image = PanelImage::filled(self.width, self.height, self.background);
        for (_, element) in &self.elements {
            draw_element(&mut image, element);
        }
        if let Some(cursor) = self.cursor {
            draw_cursor(&mut image, cursor, CURSOR_RADIUS, CURSOR_COLOR);
        }
        self.dirty = false;
        image
    }

    fn hit_test(&self, point: PixelPoint) -> Option<ElementId> {
        self.elements
            .iter()
            .rev()
            .find(|(_, element)| element.contains(point))
            .map(|(id, _)| *id)
    }

    fn dispatch(&mut self, kind: PointerEventKind, point: PixelPoint) -> Option<PanelAction> {
        let target = self.hit_test(point);
        match kind {
            PointerEventKind::Move => {
                self.set_hovered(target);
                None
            }
            PointerEventKind::Press => {
                self.set_hovered(target);
                let handle = target.filter(|id| self.interactable_button(*id).is_some())?;
                self.pressed = Some(handle);
                self.set_button_state(handle, ButtonState::Pressed);
                None
            }
            PointerEventKind::Release => {
                self.set_hovered(target);
                if let Some(handle) = self.pressed.take() {
                    let state = self.resting_state(handle);
                    self.set_button_state(handle, state);
                }
                None
            }
            PointerEventKind::Activate => {
                let handle = target?;
                let button = self.interactable_button(handle)?;
                debug!(element = handle, callback = ?button.callback_id, "Panel element activated");
                Some(PanelAction::Activated {
                    element: handle,
                    callback_id: button.callback_id,
                })
            }
        }
    }

    fn regions(&self) -> RegionLayout {
        let mut layout = RegionLayout {
            drag_strip_max_v: 0.0,
            resize_min_u: 1.0,
            resize_min_v: 1.0,
        };
        if self.width == 0 || self.height == 0 {
            return layout;
        }
        let (w, h) = (self.width as f32, self.height as f32);
        for (_, element) in &self.elements {
            let rect = element.rect;
            match element.region {
                RegionKind::DragStrip => {
                    layout.drag_strip_max_v = layout.drag_strip_max_v.max(rect.bottom() as f32 / h);
                }
                RegionKind::ResizeHandle => {
                    layout.resize_min_u = layout.resize_min_u.min(rect.x as f32 / w);
                    layout.resize_min_v = layout.resize_min_v.min(rect.y as f32 / h);
                }
                RegionKind::Content => {}
            }
        }
        layout
    }

    fn set_cursor(&mut self, point: Option<PixelPoint>) {
        if self.cursor != point {
            self.cursor = point;
            self.dirty = true;
        }
        if point.is_none() {
            self.set_hovered(None);
        }
    }
}
