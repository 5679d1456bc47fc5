//! The two render passes: dirty collection and band blitting.
//!
//! Collection walks the paint order once, settling lazy state: pending
//! destructions are finalized, moved objects re-derive their geometry,
//! dirty visible areas are merged into the frame's dirty rectangle. Only
//! when that pass merged something does the blitter run: the dirty
//! rectangle is padded, clipped to the page, and painted in horizontal
//! bands sized to the scratch surface, each band flushed to the panel
//! driver before the next is painted.

use log::{error, trace};

use crate::area::Area;
use crate::config::{DIRTY_PAD_BOTTOM, DIRTY_PAD_LEFT, DIRTY_PAD_TOP, DIRTY_PAD_WIDTH};
use crate::context::Ui;
use crate::event::Event;
use crate::obj::ObjId;
use crate::surface::Surface;

impl Ui {
    /// Settle one object during the collection pass. Returns true when
    /// the pass merged damage (the frame must render).
    fn collect_obj(&mut self, id: ObjId) -> bool {
        // Stale entries are objects freed earlier in this same pass.
        let Some(node) = self.node(id) else {
            return false;
        };
        if node.flags.hidden {
            return false;
        }

        if node.flags.destroyed {
            if self.active_page() == Some(id) {
                // The live root is immortal; drop the request.
                if let Some(node) = self.node_mut(id) {
                    node.flags.destroyed = false;
                }
                return false;
            }
            let area = node.area;
            let parent = node.parent;
            let is_page = node.is_page();
            if area.is_valid() {
                self.merge_dirty(&area);
            }
            self.detach(id);
            self.free_node(id);
            if !is_page {
                // The child set changed under the parent.
                self.apply_layout(parent);
            }
            return true;
        }

        if node.flags.needinit {
            self.dispatch(id, None, &Event::DrawInit);
            if let Some(node) = self.node_mut(id) {
                node.flags.needinit = false;
            }
        }

        let Some(node) = self.node(id) else {
            return false;
        };
        if !node.flags.dirty {
            return false;
        }
        let coords = node.coords;
        let parent_area = if node.is_page() {
            node.area
        } else {
            self.node(node.parent)
                .map(|p| p.area)
                .unwrap_or(Area::INVALID)
        };
        match parent_area.clip(&coords) {
            None => {
                // Fully clipped away: excluded from painting, flag
                // consumed.
                if let Some(node) = self.node_mut(id) {
                    node.flags.invalid = true;
                    node.flags.dirty = false;
                }
                false
            }
            Some(area) => {
                if let Some(node) = self.node_mut(id) {
                    node.area = area;
                    node.flags.invalid = false;
                    node.flags.dirty = false;
                }
                self.merge_dirty(&area);
                true
            }
        }
    }

    /// Walk the paint order merging per-object damage into the frame's
    /// dirty rectangle and finalizing lazy destruction. Returns whether
    /// anything needs painting; a clean tree costs only this walk.
    ///
    /// Damage merged between ticks (vacated areas of moved, resized or
    /// hidden objects) also forces a frame, even when no object survives
    /// with its dirty flag set.
    pub(crate) fn collect_dirty(&mut self) -> bool {
        let mut need_draw = self.dirty.is_valid();

        #[cfg(not(feature = "slot-dynamic"))]
        {
            let len = self.slots.len();
            let mut i = 0;
            while i < len {
                let id = self.slots[i];
                need_draw |= self.collect_obj(id);
                i += 1;
            }
        }

        #[cfg(feature = "slot-dynamic")]
        {
            let mut cur = self.slot_head;
            while let Some(id) = cur {
                // The successor is captured first: finalizing `id` may
                // unlink it from the list.
                let next = self.node(id).and_then(|n| n.slot_next);
                need_draw |= self.collect_obj(id);
                cur = next;
            }
        }

        // A pass that freed objects leaves stale entries behind; bring
        // the paint order back in line with the tree.
        self.slot_sync();

        need_draw
    }

    /// Paint one band: every visible object overlapping it, in paint
    /// order, clipped to its own area.
    fn draw_band(&mut self, surf: &mut Surface) {
        let band = surf.band_area();

        #[cfg(not(feature = "slot-dynamic"))]
        {
            let len = self.slots.len();
            let mut i = 0;
            while i < len {
                let id = self.slots[i];
                self.draw_band_obj(id, surf, &band);
                i += 1;
            }
        }

        #[cfg(feature = "slot-dynamic")]
        {
            let mut cur = self.slot_head;
            while let Some(id) = cur {
                let next = self.node(id).and_then(|n| n.slot_next);
                self.draw_band_obj(id, surf, &band);
                cur = next;
            }
        }
    }

    fn draw_band_obj(&mut self, id: ObjId, surf: &mut Surface, band: &Area) {
        let Some(node) = self.node(id) else { return };
        if node.flags.hidden || node.flags.invalid {
            return;
        }
        let area = node.area;
        if !area.is_valid() || !area.overlaps(band) {
            return;
        }
        surf.set_clip(area);
        self.dispatch(id, Some(surf), &Event::DrawMain);
    }

    /// Render the accumulated dirty rectangle in horizontal bands and
    /// flush each to the panel.
    pub(crate) fn draw_frame(&mut self) {
        let Some(root_area) = self.active_page().and_then(|p| self.area(p)) else {
            return;
        };
        let mut dirty = self.dirty;
        if !dirty.is_valid() {
            return;
        }

        // Widen slightly so border and press-feedback fringes repaint
        // cleanly, then clamp to the page.
        dirty.y1 = (dirty.y1 - DIRTY_PAD_TOP).max(0);
        dirty.y2 = (dirty.y2 + DIRTY_PAD_BOTTOM).min(root_area.y2);
        let x = (dirty.x1 - DIRTY_PAD_LEFT).max(0);
        let w = (dirty.x2 - dirty.x1 + DIRTY_PAD_WIDTH).min(root_area.x2 - x + 1);
        if w < 1 || dirty.y2 < dirty.y1 {
            return;
        }

        let Some(mut surf) = self.surface.take() else {
            return;
        };
        let Some(mut panel) = self.panel.take() else {
            self.surface = Some(surf);
            return;
        };

        let rows_per_band = (surf.capacity() / w as usize).min(i16::MAX as usize) as i16;
        if rows_per_band < 1 {
            error!("scratch surface narrower than the dirty width {}", w);
            self.surface = Some(surf);
            self.panel = Some(panel);
            return;
        }

        trace!(
            "draw dirty area: x = {}, y = {}, w = {}, h = {}",
            x,
            dirty.y1,
            w,
            dirty.y2 - dirty.y1 + 1
        );

        let mut y = dirty.y1;
        while y <= dirty.y2 {
            let band_h = rows_per_band.min(dirty.y2 - y + 1);
            surf.set_window(x, y, w, band_h);
            self.draw_band(&mut surf);
            panel.flush_area(x, y, w, band_h, surf.band_pixels(w as usize * band_h as usize));
            #[cfg(feature = "double-buffer")]
            surf.swap_buffers();
            y += band_h;
        }

        self.surface = Some(surf);
        self.panel = Some(panel);
    }
}
