//! Panel registration and the page-root widget.
//!
//! A page is the root object of a scene tree. Its widget paints the
//! page background; the framebuffer geometry and the flush driver are
//! owned by the [`Ui`](crate::Ui) context and shared by every page loaded
//! into it.

use alloc::boxed::Box;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use log::warn;

use crate::event::Event;
use crate::obj::Obj;
use crate::style::{Style, StyleKey};
use crate::surface::Surface;
use crate::widget::Widget;

/// Driver callback that moves one finished band to the physical panel.
///
/// `pixels` holds `w * h` row-major pixels for the panel region with
/// origin `(x, y)`. The transfer must be complete (or safely enqueued on
/// its own memory) before returning, because the scratch buffer is
/// reused for the next band.
pub trait PanelFlush {
    fn flush_area(&mut self, x: i16, y: i16, w: i16, h: i16, pixels: &[Rgb565]);
}

/// Framebuffer registration for a [`Ui`](crate::Ui) context.
pub struct FbConfig {
    /// Panel width in pixels.
    pub xres: i16,
    /// Panel height in pixels.
    pub yres: i16,
    /// Scratch buffer capacity in pixels. With the `double-buffer`
    /// feature this is split into two halves.
    pub buffer_pixels: usize,
    /// The flush driver receiving finished bands.
    pub panel: Box<dyn PanelFlush>,
}

/// Background widget installed on every page root.
pub(crate) struct PageRoot {
    pub(crate) color: Rgb565,
}

impl PageRoot {
    pub(crate) fn new() -> Self {
        Self {
            color: Rgb565::BLACK,
        }
    }
}

impl Widget for PageRoot {
    fn construct(&mut self, surf: Option<&mut Surface>, obj: &mut Obj, evt: &Event) {
        if *evt == Event::DrawMain
            && let Some(surf) = surf
        {
            let _ = surf.fill_solid(&obj.coords().to_rectangle(), self.color);
        }
    }

    fn set_style(&mut self, _obj: &mut Obj, style: Style) {
        match style {
            Style::Color(c) | Style::BgColor(c) => self.color = c,
            other => warn!("page: style {:?} not supported", other.key()),
        }
    }

    fn get_style(&self, _obj: &Obj, key: StyleKey) -> Option<Style> {
        match key {
            StyleKey::Color | StyleKey::BgColor => Some(Style::BgColor(self.color)),
            _ => None,
        }
    }
}
