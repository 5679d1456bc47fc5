//! Events delivered to an object's construct callback.

use crate::area::Pos;

/// The closed set of events a [`Widget`](crate::widget::Widget) must
/// handle through its construct callback.
///
/// `DrawInit` and `DrawMain` are issued by the engine itself; `Pressed`
/// and `Released` are routed in from whatever input dispatcher the
/// application runs, via [`Ui::send_event`](crate::Ui::send_event).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Coordinates changed; recompute derived sub-rectangles. No surface
    /// is supplied and nothing may be painted.
    DrawInit,
    /// Paint into the supplied surface, clipped to the object's visible
    /// area.
    DrawMain,
    /// Pointer went down at the given position.
    Pressed(Pos),
    /// Pointer was released at the given position.
    Released(Pos),
}

impl Event {
    /// True for the two draw-pipeline events.
    pub const fn is_draw(&self) -> bool {
        matches!(self, Self::DrawInit | Self::DrawMain)
    }
}
