// src/widgets/checkbox.rs
//! Checkbox widget: a square tick box with a label to its right.
//!
//! The box, tick and label rectangles are derived from the object
//! coordinates during the init pass, so a moved or resized checkbox
//! recomputes them before it is painted again.

use alloc::boxed::Box;

use embedded_graphics::mono_font::{MonoTextStyle, ascii::FONT_6X10};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::PrimitiveStyleBuilder;
use embedded_graphics::text::{Alignment, Text};
use log::warn;

use crate::area::Area;
use crate::context::{Ui, UiError};
use crate::event::Event;
use crate::obj::{Obj, ObjId};
use crate::style::{Style, StyleKey};
use crate::surface::Surface;
use crate::widget::Widget;

/// A toggling checkbox. Presses inside the box region flip the state and
/// fire the user event callback; presses on the label are ignored.
pub struct Checkbox {
    label: heapless::String<32>,
    border_color: Rgb565,
    fill_color: Rgb565,
    text_color: Rgb565,
    checked: bool,
    /// Outer box, derived on init.
    select_bg: Area,
    /// Inner tick box, derived on init.
    select: Area,
    /// Label area, derived on init.
    text_area: Area,
}

impl Checkbox {
    /// Create a checkbox object under `parent`.
    pub fn create(ui: &mut Ui, parent: ObjId) -> Result<ObjId, UiError> {
        let mut label = heapless::String::new();
        label.push_str("checkbox").ok();
        let id = ui.create_obj(
            parent,
            Box::new(Self {
                label,
                border_color: Rgb565::CSS_STEEL_BLUE,
                fill_color: Rgb565::WHITE,
                text_color: Rgb565::WHITE,
                checked: false,
                select_bg: Area::INVALID,
                select: Area::INVALID,
                text_area: Area::INVALID,
            }),
        )?;
        ui.set_clickable(id, true);
        Ok(id)
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    fn derive_rects(&mut self, coords: Area) {
        let h = coords.height();
        let margin = h / 4;
        self.select_bg = Area::new(coords.x1, coords.y1, coords.x1 + h - 1, coords.y2);
        self.select = Area::new(
            coords.x1 + margin,
            coords.y1 + margin,
            self.select_bg.x2 - margin,
            coords.y2 - margin,
        );
        self.text_area = Area::new(self.select_bg.x2 + 2, coords.y1, coords.x2, coords.y2);
    }

    fn draw(&self, surf: &mut Surface) {
        let box_style = PrimitiveStyleBuilder::new()
            .fill_color(self.fill_color)
            .stroke_color(self.border_color)
            .stroke_width(2)
            .build();
        let _ = self.select_bg.to_rectangle().into_styled(box_style).draw(surf);

        if self.checked {
            let _ = surf.fill_solid(&self.select.to_rectangle(), self.border_color);
        }

        let text_style = MonoTextStyle::new(&FONT_6X10, self.text_color);
        let baseline = Point::new(
            self.text_area.x1 as i32 + 2,
            ((self.text_area.y1 + self.text_area.y2) / 2) as i32 + 3,
        );
        let _ = Text::with_alignment(&self.label, baseline, text_style, Alignment::Left).draw(surf);
    }
}

impl Widget for Checkbox {
    fn construct(&mut self, surf: Option<&mut Surface>, obj: &mut Obj, evt: &Event) {
        match evt {
            Event::DrawInit => self.derive_rects(obj.coords()),
            Event::DrawMain => {
                if let Some(surf) = surf {
                    self.draw(surf);
                }
            }
            Event::Pressed(pos) => {
                // Only the box region toggles; label presses change
                // nothing and must not repaint.
                if pos.x < obj.coords().x1 + obj.coords().height() {
                    self.checked = !self.checked;
                    obj.emit_event(evt);
                } else {
                    obj.clear_dirty();
                }
            }
            Event::Released(_) => obj.clear_dirty(),
        }
    }

    fn set_style(&mut self, _obj: &mut Obj, style: Style) {
        match style {
            Style::Color(c) => self.border_color = c,
            Style::BgColor(c) => self.fill_color = c,
            Style::TextColor(c) => self.text_color = c,
            Style::Text(s) => self.label = s,
            Style::Status(checked) => self.checked = checked,
            other => warn!("checkbox: style {:?} not supported", other.key()),
        }
    }

    fn get_style(&self, _obj: &Obj, key: StyleKey) -> Option<Style> {
        match key {
            StyleKey::Color => Some(Style::Color(self.border_color)),
            StyleKey::BgColor => Some(Style::BgColor(self.fill_color)),
            StyleKey::TextColor => Some(Style::TextColor(self.text_color)),
            StyleKey::Text => Some(Style::Text(self.label.clone())),
            StyleKey::Status => Some(Style::Status(self.checked)),
            _ => None,
        }
    }
}
