//! The render context: object arena, dirty accumulator and tick entry.
//!
//! A [`Ui`] value owns everything the engine needs (the object arena,
//! the active page, the frame's dirty rectangle, the slot list and the
//! scratch surface), so independent contexts (and tests) never share
//! state. The engine is single-threaded and cooperative: the application
//! drives it by calling [`Ui::task_handle`] from its main loop or timer
//! task, after running whatever input dispatch and animation stepping it
//! uses.

use alloc::boxed::Box;
use alloc::vec::Vec;

use log::{error, warn};
use thiserror_no_std::Error;

use crate::area::{Area, Pos};
use crate::config::{OBJ_DEPTH_MAX, OBJ_POOL_SIZE};
#[cfg(not(feature = "slot-dynamic"))]
use crate::config::OBJ_SLOT_SIZE;
use crate::event::Event;
use crate::obj::{Obj, ObjId};
use crate::page::{FbConfig, PageRoot, PanelFlush};
use crate::style::{Style, StyleKey};
use crate::surface::Surface;
use crate::widget::Widget;

/// Failures of the fallible context operations.
///
/// Resource exhaustion degrades gracefully (the operation is skipped and
/// logged); stale handles and misuse are rejected. Nothing here aborts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UiError {
    /// The object arena is at [`OBJ_POOL_SIZE`] and holds no free slot.
    #[error("object pool exhausted")]
    PoolExhausted,
    /// The operation needs a registered framebuffer.
    #[error("no framebuffer registered")]
    NoFramebuffer,
    /// The framebuffer registration was rejected.
    #[error("invalid framebuffer configuration")]
    BadConfig,
    /// The handle refers to an object that has been freed.
    #[error("stale object handle")]
    StaleHandle,
    /// The operation expects a page root.
    #[error("object is not a page")]
    NotAPage,
}

/// One arena cell. The generation advances on every free, so handles to
/// the previous occupant stop resolving.
struct ArenaSlot {
    generation: u16,
    node: Option<Obj>,
}

/// The engine context. See the crate docs for the frame pipeline.
pub struct Ui {
    nodes: Vec<ArenaSlot>,
    free: Vec<u16>,
    active: Option<ObjId>,
    /// Accumulated dirty rectangle of the in-progress frame.
    pub(crate) dirty: Area,
    /// Whether the active page's slot list has been populated.
    pub(crate) started: bool,
    pub(crate) surface: Option<Surface>,
    pub(crate) panel: Option<Box<dyn PanelFlush>>,
    xres: i16,
    yres: i16,
    #[cfg(not(feature = "slot-dynamic"))]
    pub(crate) slots: heapless::Vec<ObjId, OBJ_SLOT_SIZE>,
    #[cfg(not(feature = "slot-dynamic"))]
    pub(crate) slots_stale: bool,
    #[cfg(feature = "slot-dynamic")]
    pub(crate) slot_head: Option<ObjId>,
    #[cfg(feature = "slot-dynamic")]
    pub(crate) slot_tail: Option<ObjId>,
}

impl Default for Ui {
    fn default() -> Self {
        Self::new()
    }
}

impl Ui {
    /// An empty context. Register a framebuffer and create a page before
    /// ticking.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            active: None,
            dirty: Area::INVALID,
            started: false,
            surface: None,
            panel: None,
            xres: 0,
            yres: 0,
            #[cfg(not(feature = "slot-dynamic"))]
            slots: heapless::Vec::new(),
            #[cfg(not(feature = "slot-dynamic"))]
            slots_stale: false,
            #[cfg(feature = "slot-dynamic")]
            slot_head: None,
            #[cfg(feature = "slot-dynamic")]
            slot_tail: None,
        }
    }

    /// Bind the context to a panel. The scratch buffer must hold at least
    /// one full-width row (per half, with `double-buffer`).
    pub fn register_framebuffer(&mut self, config: FbConfig) -> Result<(), UiError> {
        if config.xres < 1 || config.yres < 1 {
            error!("framebuffer rejected: {}x{}", config.xres, config.yres);
            return Err(UiError::BadConfig);
        }
        #[cfg(feature = "double-buffer")]
        let cap = config.buffer_pixels / 2;
        #[cfg(not(feature = "double-buffer"))]
        let cap = config.buffer_pixels;
        if cap < config.xres as usize {
            error!("framebuffer size is too small: {} pixels", cap);
            return Err(UiError::BadConfig);
        }
        self.surface = Some(Surface::new(config.xres, config.yres, cap));
        self.panel = Some(config.panel);
        self.xres = config.xres;
        self.yres = config.yres;
        Ok(())
    }

    /// Panel resolution, `(width, height)` in pixels.
    pub fn resolution(&self) -> (i16, i16) {
        (self.xres, self.yres)
    }

    pub(crate) fn node(&self, id: ObjId) -> Option<&Obj> {
        self.nodes
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub(crate) fn node_mut(&mut self, id: ObjId) -> Option<&mut Obj> {
        self.nodes
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    /// True while `id` refers to a live object.
    pub fn obj_alive(&self, id: ObjId) -> bool {
        self.node(id).is_some()
    }

    /// The currently loaded page, if any.
    pub fn active_page(&self) -> Option<ObjId> {
        self.active
    }

    fn alloc_node(&mut self, widget: Box<dyn Widget>) -> Result<ObjId, UiError> {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                if self.nodes.len() >= OBJ_POOL_SIZE {
                    error!("object pool exhausted, max is {}", OBJ_POOL_SIZE);
                    return Err(UiError::PoolExhausted);
                }
                self.nodes.push(ArenaSlot {
                    generation: 0,
                    node: None,
                });
                (self.nodes.len() - 1) as u16
            }
        };
        let generation = self.nodes[index as usize].generation;
        let id = ObjId { index, generation };
        self.nodes[index as usize].node = Some(Obj::new(id, id, widget));
        Ok(id)
    }

    /// Release one node and invalidate its handles. Paint-order upkeep
    /// happens first, while the links are still readable.
    pub(crate) fn free_node(&mut self, id: ObjId) {
        self.slot_forget_freed(id);
        if let Some(slot) = self.nodes.get_mut(id.index as usize)
            && slot.generation == id.generation
            && slot.node.is_some()
        {
            slot.node = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(id.index);
        }
    }

    /// Create a new page: a root object covering the whole panel, filled
    /// with the page background color. The first page created becomes the
    /// active one.
    pub fn create_page(&mut self) -> Result<ObjId, UiError> {
        if self.surface.is_none() {
            error!("create_page: no framebuffer registered");
            return Err(UiError::NoFramebuffer);
        }
        let id = self.alloc_node(Box::new(PageRoot::new()))?;
        let coords = Area::new(0, 0, self.xres - 1, self.yres - 1);
        if let Some(node) = self.node_mut(id) {
            node.coords = coords;
            node.area = coords;
            node.flags.needinit = false;
            node.flags.clickable = true;
        }
        if self.active.is_none() {
            self.active = Some(id);
        }
        Ok(id)
    }

    /// Create an object under `parent` with the given widget behavior.
    ///
    /// The new object inherits its parent's coordinates, is marked dirty
    /// and in need of init, and enters the paint order after its last
    /// sibling once the page has started rendering.
    pub fn create_obj(&mut self, parent: ObjId, widget: Box<dyn Widget>) -> Result<ObjId, UiError> {
        let Some(pnode) = self.node(parent) else {
            error!("create_obj: stale parent handle");
            return Err(UiError::StaleHandle);
        };
        let pcoords = pnode.coords;
        let id = self.alloc_node(widget)?;
        if let Some(node) = self.node_mut(id) {
            node.coords = pcoords;
        }
        self.add_child(parent, id);
        if self.started {
            self.slot_insert_created(parent, id);
        }
        self.apply_layout(parent);
        Ok(id)
    }

    /// Make `page` the active screen. Resets the dirty accumulator and
    /// the slot population flag; the previous page's tree stays alive
    /// under its caller-held handle.
    pub fn screen_load(&mut self, page: ObjId) -> Result<(), UiError> {
        let Some(node) = self.node(page) else {
            return Err(UiError::StaleHandle);
        };
        if !node.is_page() {
            return Err(UiError::NotAPage);
        }
        self.active = Some(page);
        self.started = false;
        self.dirty = Area::INVALID;
        Ok(())
    }

    /// The page root owning `id` (walks up the parent links).
    pub fn page_of(&self, id: ObjId) -> Option<ObjId> {
        let mut cur = id;
        for _ in 0..OBJ_DEPTH_MAX {
            let node = self.node(cur)?;
            if node.is_page() {
                return Some(cur);
            }
            cur = node.parent;
        }
        None
    }

    /// Logical rectangle of `id` in absolute coordinates.
    pub fn coords(&self, id: ObjId) -> Option<Area> {
        self.node(id).map(|n| n.coords)
    }

    /// Visible rectangle of `id` as of the last collection pass.
    pub fn area(&self, id: ObjId) -> Option<Area> {
        self.node(id).map(|n| n.area)
    }

    /// Position of `id` relative to its parent's origin.
    pub fn pos_of(&self, id: ObjId) -> Option<Pos> {
        let node = self.node(id)?;
        if node.is_page() {
            return Some(Pos::new(node.coords.x1, node.coords.y1));
        }
        let parent = self.node(node.parent)?;
        Some(Pos::new(
            node.coords.x1 - parent.coords.x1,
            node.coords.y1 - parent.coords.y1,
        ))
    }

    /// Whether `id` is flagged for repaint.
    pub fn is_dirty(&self, id: ObjId) -> Option<bool> {
        self.node(id).map(|n| n.flags.dirty)
    }

    /// Grow the frame's dirty rectangle.
    pub(crate) fn merge_dirty(&mut self, area: &Area) {
        self.dirty.self_merge(area);
    }

    /// Register a user callback fired by interactive widgets.
    pub fn set_event_cb(&mut self, id: ObjId, cb: impl FnMut(&Event) + 'static) {
        if let Some(node) = self.node_mut(id) {
            node.event_cb = Some(Box::new(cb));
        }
    }

    /// Route an event to `id`'s construct callback with no surface.
    ///
    /// The object is marked dirty first, so a widget that decides the
    /// event changes nothing can veto the repaint by clearing the flag.
    pub fn send_event(&mut self, id: ObjId, evt: Event) {
        if let Some(node) = self.node_mut(id) {
            node.flags.dirty = true;
        } else {
            warn!("send_event: stale object handle");
            return;
        }
        self.dispatch(id, None, &evt);
    }

    /// Invoke the widget construct callback of `id`. The widget is taken
    /// out of the node for the duration of the call so it can receive the
    /// node itself mutably.
    pub(crate) fn dispatch(&mut self, id: ObjId, surf: Option<&mut Surface>, evt: &Event) {
        let Some(mut widget) = self.node_mut(id).and_then(|n| n.widget.take()) else {
            debug_assert!(false, "dispatch: object without widget");
            return;
        };
        if let Some(node) = self.node_mut(id) {
            widget.construct(surf, node, evt);
        }
        if let Some(node) = self.node_mut(id) {
            node.widget = Some(widget);
        }
    }

    /// Mutable access to the concrete widget behind `id`.
    pub fn widget_mut<T: Widget>(&mut self, id: ObjId) -> Option<&mut T> {
        self.node_mut(id)?.widget.as_mut()?.downcast_mut::<T>()
    }

    /// Shared access to the concrete widget behind `id`.
    pub fn widget_ref<T: Widget>(&self, id: ObjId) -> Option<&T> {
        self.node(id)?.widget.as_ref()?.downcast_ref::<T>()
    }

    /// Uniform style setter. Geometry keys are serviced by the engine,
    /// everything else is forwarded to the widget; either way the object
    /// subtree is marked for repaint.
    pub fn set_style(&mut self, id: ObjId, style: Style) -> Result<(), UiError> {
        if !self.obj_alive(id) {
            return Err(UiError::StaleHandle);
        }
        match style {
            Style::PosX(x) => {
                let y = self.pos_of(id).map(|p| p.y).unwrap_or(0);
                self.set_pos(id, x, y);
            }
            Style::PosY(y) => {
                let x = self.pos_of(id).map(|p| p.x).unwrap_or(0);
                self.set_pos(id, x, y);
            }
            Style::Width(w) => {
                let h = self.coords(id).map(|c| c.height()).unwrap_or(1);
                self.set_size(id, w, h);
            }
            Style::Height(h) => {
                let w = self.coords(id).map(|c| c.width()).unwrap_or(1);
                self.set_size(id, w, h);
            }
            Style::Align(align) => self.set_align(id, align),
            Style::Layout(layout) => self.set_layout(id, layout),
            Style::Margin(margin) => self.set_margin(id, margin),
            Style::Hidden(hidden) => self.set_hidden(id, hidden),
            Style::Radius(radius) => {
                if let Some(node) = self.node_mut(id) {
                    node.fix_radius(radius);
                }
                self.set_dirty(id);
            }
            other => {
                let Some(mut widget) = self.node_mut(id).and_then(|n| n.widget.take()) else {
                    return Err(UiError::StaleHandle);
                };
                if let Some(node) = self.node_mut(id) {
                    widget.set_style(node, other);
                }
                if let Some(node) = self.node_mut(id) {
                    node.widget = Some(widget);
                }
                self.set_dirty(id);
            }
        }
        Ok(())
    }

    /// Uniform style getter; `None` when the key is unsupported.
    pub fn get_style(&self, id: ObjId, key: StyleKey) -> Option<Style> {
        let node = self.node(id)?;
        if key.is_geometry() {
            return match key {
                StyleKey::PosX => Some(Style::PosX(self.pos_of(id)?.x)),
                StyleKey::PosY => Some(Style::PosY(self.pos_of(id)?.y)),
                StyleKey::Width => Some(Style::Width(node.coords.width())),
                StyleKey::Height => Some(Style::Height(node.coords.height())),
                StyleKey::Radius => Some(Style::Radius(node.radius)),
                StyleKey::Margin => Some(Style::Margin(node.margin)),
                StyleKey::Hidden => Some(Style::Hidden(node.flags.hidden)),
                StyleKey::Layout => Some(Style::Layout(node.layout)),
                _ => None,
            };
        }
        node.widget.as_ref()?.get_style(node, key)
    }

    /// The tick entry point: one frame attempt per call.
    ///
    /// The first call after a page load populates the paint order; each
    /// call then runs the dirty-collection pass and, only when something
    /// was merged, the band renderer. A clean tree costs the O(n) walk
    /// and nothing else. Errors are logged, never returned.
    pub fn task_handle(&mut self) {
        if self.active.is_none() {
            warn!("task_handle: no active page");
            return;
        }
        if self.surface.is_none() {
            warn!("task_handle: no framebuffer registered");
            return;
        }
        if !self.started {
            self.slot_populate();
            self.started = true;
        } else {
            self.slot_sync();
        }

        if self.collect_dirty() {
            self.draw_frame();
        }

        self.dirty = Area::INVALID;
    }

    #[cfg(test)]
    pub(crate) fn is_destroyed_for_test(&self, id: ObjId) -> bool {
        self.node(id).map(|n| n.flags.destroyed).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;

    use super::*;
    use crate::config::OBJ_POOL_SIZE;
    use crate::testutil::{probe, test_ui, try_probe, ProbeWidget};

    #[test]
    fn test_pool_exhaustion_fails_gracefully() {
        let (mut ui, _log) = test_ui(64, 64, 64 * 8);
        let page = ui.active_page().unwrap();
        let mut created = 1; // the page
        loop {
            match try_probe(&mut ui, page, 0) {
                Ok(_) => created += 1,
                Err(e) => {
                    assert_eq!(e, UiError::PoolExhausted);
                    break;
                }
            }
        }
        assert_eq!(created, OBJ_POOL_SIZE);
        // Earlier objects are untouched.
        assert!(ui.obj_alive(page));
    }

    #[test]
    fn test_stale_handle_rejected_after_free() {
        let (mut ui, _log) = test_ui(64, 64, 64 * 8);
        let page = ui.active_page().unwrap();
        let a = probe(&mut ui, page, 1);
        ui.task_handle();
        ui.set_destroyed(a);
        ui.task_handle();
        assert!(!ui.obj_alive(a));
        assert_eq!(ui.set_style(a, Style::PosX(3)), Err(UiError::StaleHandle));
        assert!(ui.get_style(a, StyleKey::PosX).is_none());
    }

    #[test]
    fn test_handle_generation_protects_recycled_slot() {
        let (mut ui, _log) = test_ui(64, 64, 64 * 8);
        let page = ui.active_page().unwrap();
        let a = probe(&mut ui, page, 1);
        ui.task_handle();
        ui.set_destroyed(a);
        ui.task_handle();
        let b = probe(&mut ui, page, 2);
        // The freed index is recycled with a new generation.
        assert!(!ui.obj_alive(a));
        assert!(ui.obj_alive(b));
    }

    #[test]
    fn test_create_page_requires_framebuffer() {
        let mut ui = Ui::new();
        assert_eq!(ui.create_page().unwrap_err(), UiError::NoFramebuffer);
    }

    #[test]
    fn test_screen_load_rejects_non_page() {
        let (mut ui, _log) = test_ui(64, 64, 64 * 8);
        let page = ui.active_page().unwrap();
        let a = probe(&mut ui, page, 1);
        assert_eq!(ui.screen_load(a), Err(UiError::NotAPage));
        assert_eq!(ui.active_page(), Some(page));
    }

    #[test]
    fn test_screen_load_resets_population() {
        let (mut ui, _log) = test_ui(64, 64, 64 * 8);
        let first = ui.active_page().unwrap();
        ui.task_handle();
        let second = ui.create_page().unwrap();
        probe(&mut ui, second, 9);
        ui.screen_load(second).unwrap();
        ui.task_handle();
        assert_eq!(ui.slot_order()[0], second);
        assert!(
            ui.obj_alive(first),
            "the previous page tree is caller-managed, not freed"
        );
    }

    #[test]
    fn test_widget_downcast_by_type() {
        let (mut ui, log) = test_ui(64, 64, 64 * 8);
        let page = ui.active_page().unwrap();
        let id = ui
            .create_obj(page, Box::new(ProbeWidget::new(7, log.draw_log())))
            .unwrap();
        assert_eq!(ui.widget_ref::<ProbeWidget>(id).unwrap().tag, 7);
        assert!(ui.widget_mut::<crate::page::PageRoot>(id).is_none());
    }

    #[test]
    fn test_geometry_styles_round_trip() {
        let (mut ui, _log) = test_ui(128, 128, 128 * 8);
        let page = ui.active_page().unwrap();
        let a = probe(&mut ui, page, 1);
        ui.set_style(a, Style::PosX(12)).unwrap();
        ui.set_style(a, Style::PosY(7)).unwrap();
        ui.set_style(a, Style::Width(30)).unwrap();
        ui.set_style(a, Style::Height(20)).unwrap();
        assert_eq!(ui.get_style(a, StyleKey::PosX), Some(Style::PosX(12)));
        assert_eq!(ui.get_style(a, StyleKey::PosY), Some(Style::PosY(7)));
        assert_eq!(ui.get_style(a, StyleKey::Width), Some(Style::Width(30)));
        assert_eq!(ui.get_style(a, StyleKey::Height), Some(Style::Height(20)));
    }

    #[test]
    fn test_radius_clamped_to_half_extent() {
        let (mut ui, _log) = test_ui(128, 128, 128 * 8);
        let page = ui.active_page().unwrap();
        let a = probe(&mut ui, page, 1);
        ui.set_style(a, Style::Width(20)).unwrap();
        ui.set_style(a, Style::Height(10)).unwrap();
        ui.set_style(a, Style::Radius(50)).unwrap();
        assert_eq!(ui.get_style(a, StyleKey::Radius), Some(Style::Radius(5)));
    }
}
