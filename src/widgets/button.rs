// src/widgets/button.rs
//! Push-button widget with a label and pressed-state shading.

use alloc::boxed::Box;

use embedded_graphics::mono_font::{MonoTextStyle, ascii::FONT_6X10};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, RoundedRectangle};
use embedded_graphics::text::{Alignment, Text};
use log::warn;

use crate::context::{Ui, UiError};
use crate::event::Event;
use crate::obj::{Obj, ObjId};
use crate::style::{Style, StyleKey};
use crate::surface::Surface;
use crate::widget::Widget;

/// A clickable button. Fires the object's user event callback on press
/// and release; the pressed state darkens the background until release.
pub struct Button {
    label: heapless::String<32>,
    bg: Rgb565,
    text_color: Rgb565,
    pressed: bool,
}

impl Button {
    /// Create a button object under `parent`.
    pub fn create(ui: &mut Ui, parent: ObjId) -> Result<ObjId, UiError> {
        let mut label = heapless::String::new();
        label.push_str("button").ok();
        let id = ui.create_obj(
            parent,
            Box::new(Self {
                label,
                bg: Rgb565::CSS_STEEL_BLUE,
                text_color: Rgb565::WHITE,
                pressed: false,
            }),
        )?;
        ui.set_clickable(id, true);
        Ok(id)
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    fn current_bg(&self) -> Rgb565 {
        if self.pressed {
            // Darken for pressed feedback.
            Rgb565::new(
                self.bg.r().saturating_sub(4),
                self.bg.g().saturating_sub(8),
                self.bg.b().saturating_sub(4),
            )
        } else {
            self.bg
        }
    }

    fn draw(&self, surf: &mut Surface, obj: &Obj) {
        let rect = obj.coords().to_rectangle();
        let corner = Size::new(obj.radius() as u32, obj.radius() as u32);
        let _ = RoundedRectangle::with_equal_corners(rect, corner)
            .into_styled(PrimitiveStyle::with_fill(self.current_bg()))
            .draw(surf);

        let text_style = MonoTextStyle::new(&FONT_6X10, self.text_color);
        let _ = Text::with_alignment(&self.label, rect.center(), text_style, Alignment::Center)
            .draw(surf);
    }
}

impl Widget for Button {
    fn construct(&mut self, surf: Option<&mut Surface>, obj: &mut Obj, evt: &Event) {
        match evt {
            Event::DrawMain => {
                if let Some(surf) = surf {
                    self.draw(surf, obj);
                }
            }
            Event::Pressed(_) => {
                self.pressed = true;
                obj.emit_event(evt);
            }
            Event::Released(_) => {
                self.pressed = false;
                obj.emit_event(evt);
            }
            Event::DrawInit => {}
        }
    }

    fn set_style(&mut self, _obj: &mut Obj, style: Style) {
        match style {
            Style::Color(c) | Style::BgColor(c) => self.bg = c,
            Style::TextColor(c) => self.text_color = c,
            Style::Text(s) => self.label = s,
            Style::Status(pressed) => self.pressed = pressed,
            other => warn!("button: style {:?} not supported", other.key()),
        }
    }

    fn get_style(&self, _obj: &Obj, key: StyleKey) -> Option<Style> {
        match key {
            StyleKey::Color | StyleKey::BgColor => Some(Style::BgColor(self.bg)),
            StyleKey::TextColor => Some(Style::TextColor(self.text_color)),
            StyleKey::Text => Some(Style::Text(self.label.clone())),
            StyleKey::Status => Some(Style::Status(self.pressed)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use core::cell::RefCell;

    use super::*;
    use crate::area::Pos;
    use crate::testutil::test_ui;

    #[test]
    fn test_button_press_fires_callback_and_repaints() {
        let (mut ui, log) = test_ui(64, 64, 64 * 64);
        let page = ui.active_page().unwrap();
        let btn = Button::create(&mut ui, page).unwrap();
        ui.set_pos(btn, 8, 8);
        ui.set_size(btn, 40, 16);
        ui.task_handle();
        log.clear();

        let fired = Rc::new(RefCell::new(0u32));
        let fired_in_cb = fired.clone();
        ui.set_event_cb(btn, move |evt| {
            if matches!(evt, Event::Pressed(_)) {
                *fired_in_cb.borrow_mut() += 1;
            }
        });

        ui.send_event(btn, Event::Pressed(Pos::new(10, 10)));
        assert_eq!(*fired.borrow(), 1, "press must reach the user callback");
        assert!(ui.widget_ref::<Button>(btn).unwrap().is_pressed());
        ui.task_handle();
        assert!(log.flush_count() > 0, "the pressed state must repaint");

        ui.send_event(btn, Event::Released(Pos::new(10, 10)));
        assert!(!ui.widget_ref::<Button>(btn).unwrap().is_pressed());
    }

    #[test]
    fn test_button_styles() {
        let (mut ui, _log) = test_ui(64, 64, 64 * 64);
        let page = ui.active_page().unwrap();
        let btn = Button::create(&mut ui, page).unwrap();
        ui.set_style(btn, Style::text("OK")).unwrap();
        ui.set_style(btn, Style::BgColor(Rgb565::CSS_DARK_RED)).unwrap();
        assert_eq!(ui.get_style(btn, StyleKey::Text), Some(Style::text("OK")));
        assert_eq!(
            ui.get_style(btn, StyleKey::BgColor),
            Some(Style::BgColor(Rgb565::CSS_DARK_RED))
        );
        assert!(ui.get_style(btn, StyleKey::Margin).is_some());
        assert!(
            ui.get_style(btn, StyleKey::TextColor).is_some(),
            "text color is a supported key"
        );
    }
}
