//! The widget contract: one construct callback per object.
//!
//! A widget is the behavior half of an object. The engine dispatches the
//! whole [`Event`] set through [`Widget::construct`]: `DrawInit` with no
//! surface to recompute derived rectangles, `DrawMain` with a live
//! surface to paint one band, and the press/release pair for interactive
//! widgets. The optional style accessors back the uniform
//! [`Ui::set_style`](crate::Ui::set_style) /
//! [`Ui::get_style`](crate::Ui::get_style) API.

use core::any::Any;

use log::warn;

use crate::event::Event;
use crate::obj::Obj;
use crate::style::{Style, StyleKey};
use crate::surface::Surface;

/// Per-object polymorphic behavior.
///
/// Implementations must not assume a surface is present: it is `None` for
/// every event except `DrawMain`. During `DrawMain` a widget must only
/// touch styles and flags, never tree structure.
pub trait Widget: Any {
    /// Single entry point for draw-init, draw-main and interaction
    /// events.
    fn construct(&mut self, surf: Option<&mut Surface>, obj: &mut Obj, evt: &Event);

    /// Apply a non-geometry style. The default rejects everything.
    fn set_style(&mut self, obj: &mut Obj, style: Style) {
        let _ = obj;
        warn!("widget: style {:?} not supported", style.key());
    }

    /// Query a non-geometry style. `None` is the failure sentinel.
    fn get_style(&self, obj: &Obj, key: StyleKey) -> Option<Style> {
        let _ = (obj, key);
        None
    }
}

impl dyn Widget {
    /// Downcast to a concrete widget type.
    pub fn downcast_ref<T: Widget>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref::<T>()
    }

    /// Downcast to a concrete widget type, mutably.
    pub fn downcast_mut<T: Widget>(&mut self) -> Option<&mut T> {
        (self as &mut dyn Any).downcast_mut::<T>()
    }
}
