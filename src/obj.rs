//! The visual-object record and its arena handle.
//!
//! Objects live in the arena owned by [`Ui`](crate::Ui) and are referenced
//! by [`ObjId`], a generational index: freeing an object bumps the slot's
//! generation, so handles held past destruction are detected instead of
//! aliasing a recycled node. Tree structure is encoded on the node itself
//! as parent / first-child / next-sibling links.

use alloc::boxed::Box;

use crate::area::{Area, Extent, Pos};
use crate::event::Event;
use crate::widget::Widget;

/// Generational handle to an object in a [`Ui`](crate::Ui) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjId {
    pub(crate) index: u16,
    pub(crate) generation: u16,
}

/// How an object arranges its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    #[default]
    None,
    /// Children split the width evenly, separated by the margin.
    Horizontal,
    /// Children split the height evenly, separated by the margin.
    Vertical,
    /// Reserved. Currently behaves like `None`.
    Grid,
}

/// Placement of an object relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Center,
    TopLeft,
    TopMid,
    TopRight,
    LeftMid,
    RightMid,
    BotLeft,
    BotMid,
    BotRight,
}

impl Align {
    /// Offset of a child of size `child` inside a parent of size
    /// `parent`, relative to the parent's origin.
    pub fn offset(self, parent: Extent, child: Extent) -> Pos {
        let center_x = (parent.w - child.w) / 2;
        let center_y = (parent.h - child.h) / 2;
        let right = parent.w - child.w;
        let bottom = parent.h - child.h;
        match self {
            Self::Center => Pos::new(center_x, center_y),
            Self::TopLeft => Pos::new(0, 0),
            Self::TopMid => Pos::new(center_x, 0),
            Self::TopRight => Pos::new(right, 0),
            Self::LeftMid => Pos::new(0, center_y),
            Self::RightMid => Pos::new(right, center_y),
            Self::BotLeft => Pos::new(0, bottom),
            Self::BotMid => Pos::new(center_x, bottom),
            Self::BotRight => Pos::new(right, bottom),
        }
    }
}

/// Draw-relevant flag set of an object.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ObjFlags {
    /// Needs repaint this frame.
    pub dirty: bool,
    /// Coordinates changed; the construct callback must re-derive its
    /// sub-rectangles before the next paint.
    pub needinit: bool,
    /// Marked for removal; freed lazily by the next collection pass.
    pub destroyed: bool,
    /// Excluded from collection and painting.
    pub hidden: bool,
    /// Fully clipped away by the parent; skipped by the painter.
    pub invalid: bool,
    /// Participates in pointer hit-testing (input dispatch is external).
    pub clickable: bool,
}

/// A node of the scene tree.
///
/// Widgets receive `&mut Obj` in their construct callback and may read
/// geometry, adjust their radius, fire the user event callback, or veto a
/// repaint by clearing the dirty flag. Structural mutation goes through
/// [`Ui`](crate::Ui) only.
pub struct Obj {
    pub(crate) id: ObjId,
    /// Structural owner. A page root points at itself.
    pub(crate) parent: ObjId,
    /// Head of the owned children chain.
    pub(crate) child: Option<ObjId>,
    /// Next node owned by the same parent.
    pub(crate) sibling: Option<ObjId>,
    #[cfg(feature = "slot-dynamic")]
    pub(crate) slot_prev: Option<ObjId>,
    #[cfg(feature = "slot-dynamic")]
    pub(crate) slot_next: Option<ObjId>,
    /// Logical rectangle, stored absolute.
    pub(crate) coords: Area,
    /// Visible rectangle: `coords` clipped by the parent, cached by the
    /// collection pass.
    pub(crate) area: Area,
    pub(crate) flags: ObjFlags,
    pub(crate) layout: Layout,
    pub(crate) margin: i16,
    pub(crate) radius: i16,
    /// Taken out for the duration of a construct dispatch.
    pub(crate) widget: Option<Box<dyn Widget>>,
    pub(crate) event_cb: Option<Box<dyn FnMut(&Event)>>,
}

impl Obj {
    pub(crate) fn new(id: ObjId, parent: ObjId, widget: Box<dyn Widget>) -> Self {
        Self {
            id,
            parent,
            child: None,
            sibling: None,
            #[cfg(feature = "slot-dynamic")]
            slot_prev: None,
            #[cfg(feature = "slot-dynamic")]
            slot_next: None,
            coords: Area::INVALID,
            area: Area::INVALID,
            flags: ObjFlags {
                dirty: true,
                needinit: true,
                ..ObjFlags::default()
            },
            layout: Layout::None,
            margin: 0,
            radius: 0,
            widget: Some(widget),
            event_cb: None,
        }
    }

    pub fn id(&self) -> ObjId {
        self.id
    }

    /// True for page roots (the parent link points at the node itself).
    pub fn is_page(&self) -> bool {
        self.parent == self.id
    }

    /// Logical rectangle in absolute screen coordinates.
    pub fn coords(&self) -> Area {
        self.coords
    }

    /// Visible rectangle as of the last collection pass.
    pub fn area(&self) -> Area {
        self.area
    }

    pub fn width(&self) -> i16 {
        self.coords.width()
    }

    pub fn height(&self) -> i16 {
        self.coords.height()
    }

    pub fn radius(&self) -> i16 {
        self.radius
    }

    pub fn margin(&self) -> i16 {
        self.margin
    }

    pub fn is_dirty(&self) -> bool {
        self.flags.dirty
    }

    /// Veto the pending repaint of this object (its subtree keeps
    /// whatever flags it has).
    pub fn clear_dirty(&mut self) {
        self.flags.dirty = false;
    }

    pub fn is_hidden(&self) -> bool {
        self.flags.hidden
    }

    pub fn is_clickable(&self) -> bool {
        self.flags.clickable
    }

    pub fn set_clickable(&mut self, clickable: bool) {
        self.flags.clickable = clickable;
    }

    /// Clamp `radius` to half the smaller object dimension and store it.
    pub fn fix_radius(&mut self, radius: i16) -> i16 {
        let half_w = self.coords.width() / 2;
        let half_h = self.coords.height() / 2;
        let fixed = radius.min(half_w.min(half_h)).max(0);
        self.radius = fixed;
        fixed
    }

    /// Invoke the user event callback, if one is registered.
    pub fn emit_event(&mut self, evt: &Event) {
        if let Some(cb) = self.event_cb.as_mut() {
            cb(evt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_offsets() {
        let parent = Extent::new(100, 50);
        let child = Extent::new(20, 10);
        assert_eq!(Align::Center.offset(parent, child), Pos::new(40, 20));
        assert_eq!(Align::TopLeft.offset(parent, child), Pos::new(0, 0));
        assert_eq!(Align::BotRight.offset(parent, child), Pos::new(80, 40));
        assert_eq!(Align::LeftMid.offset(parent, child), Pos::new(0, 20));
        assert_eq!(Align::TopMid.offset(parent, child), Pos::new(40, 0));
    }
}
