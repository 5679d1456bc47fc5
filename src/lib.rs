//! Retained-mode scene graph with dirty-region band rendering for
//! microcontroller displays.
//!
//! `pictor` keeps a tree of visual objects, tracks which screen regions
//! their mutations touched, and repaints only the merged dirty rectangle,
//! sliced into horizontal bands sized to a small scratch buffer, into a
//! panel driver callback. It is `#![no_std]` with `extern crate alloc`
//! so it runs on embedded targets and compiles on desktop hosts for
//! tests and simulators.
//!
//! The frame pipeline, driven by one cooperative tick:
//!
//! ```text
//!   Ui::task_handle()
//!       │  (first call: populate the paint-order slot list)
//!       ▼
//!   dirty collection ── nothing merged ──► done (O(n) walk, no paint)
//!       │ merged
//!       ▼
//!   band renderer ──► Widget::construct(DrawMain) per band
//!       │
//!       ▼
//!   PanelFlush::flush_area per band
//! ```
//!
//! Input dispatch, animation and the panel transport are external
//! collaborators: the application routes pointer events in through
//! [`Ui::send_event`] and receives finished pixel bands through its
//! [`PanelFlush`] implementation.

#![no_std]

extern crate alloc;

pub mod area;
pub mod config;
pub mod context;
pub mod event;
pub mod obj;
pub mod page;
pub mod style;
pub mod surface;
pub mod widget;
pub mod widgets;

mod render;
mod slot;
mod tree;

#[cfg(test)]
pub(crate) mod testutil;

pub use area::{Area, Extent, Pos};
pub use context::{Ui, UiError};
pub use event::Event;
pub use obj::{Align, Layout, Obj, ObjId};
pub use page::{FbConfig, PanelFlush};
pub use style::{Style, StyleKey};
pub use surface::Surface;
pub use widget::Widget;
