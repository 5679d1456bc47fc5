//! Structural operations on the object tree.
//!
//! All traversals are iterative: pre-order walks follow the
//! child/sibling links down and the parent links back up, so recursion
//! is never used and the worst-case stack cost is a compile-time
//! constant. Tree-wide flag propagation (dirty, destroyed, hidden) and
//! coordinate cascades (move, set_pos) all share that traversal shape.

use log::warn;

use crate::area::{Area, Extent, Pos};
use crate::config::OBJ_POOL_SIZE;
use crate::context::Ui;
use crate::obj::{Align, Layout, Obj, ObjId};

impl Ui {
    /// Append `child` to the tail of `parent`'s sibling chain.
    pub(crate) fn add_child(&mut self, parent: ObjId, child: ObjId) {
        let Some(pnode) = self.node(parent) else {
            debug_assert!(false, "add_child: stale parent handle");
            return;
        };
        match pnode.child {
            None => {
                if let Some(pnode) = self.node_mut(parent) {
                    pnode.child = Some(child);
                }
            }
            Some(first) => {
                let mut tail = first;
                while let Some(next) = self.node(tail).and_then(|n| n.sibling) {
                    tail = next;
                }
                if let Some(tnode) = self.node_mut(tail) {
                    tnode.sibling = Some(child);
                }
            }
        }
        if let Some(cnode) = self.node_mut(child) {
            cnode.parent = parent;
            cnode.sibling = None;
        }
    }

    /// Detach `id` from its parent's child chain. Tolerates a parent that
    /// has already been freed.
    pub(crate) fn detach(&mut self, id: ObjId) {
        let Some(node) = self.node(id) else { return };
        if node.is_page() {
            return;
        }
        let parent = node.parent;
        let sibling = node.sibling;
        if let Some(pnode) = self.node(parent) {
            if pnode.child == Some(id) {
                if let Some(pnode) = self.node_mut(parent) {
                    pnode.child = sibling;
                }
            } else {
                let mut pos = pnode.child;
                while let Some(cur) = pos {
                    let next = self.node(cur).and_then(|n| n.sibling);
                    if next == Some(id) {
                        if let Some(cnode) = self.node_mut(cur) {
                            cnode.sibling = sibling;
                        }
                        break;
                    }
                    pos = next;
                }
            }
        }
        if let Some(node) = self.node_mut(id) {
            node.sibling = None;
        }
    }

    /// Remove `id` (and its subtree) from the scene: detached from the
    /// parent chain and excluded from the paint order. The object itself
    /// stays allocated and owned by the caller's handle.
    ///
    /// Silently refuses for the currently active page: the root screen
    /// object cannot be unlinked from itself.
    pub fn remove(&mut self, id: ObjId) {
        if self.active_page() == Some(id) {
            return;
        }
        if self.node(id).is_none() {
            debug_assert!(false, "remove: stale object handle");
            return;
        }
        self.detach(id);
        self.slot_forget_subtree(id);
    }

    /// First child of `id`, if any.
    pub fn first_child(&self, id: ObjId) -> Option<ObjId> {
        self.node(id).and_then(|n| n.child)
    }

    /// Next sibling of `id`, if any.
    pub fn next_sibling(&self, id: ObjId) -> Option<ObjId> {
        self.node(id).and_then(|n| n.sibling)
    }

    /// Number of direct children of `id`.
    pub fn child_count(&self, id: ObjId) -> usize {
        let mut count = 0;
        let mut cur = self.first_child(id);
        while let Some(c) = cur {
            count += 1;
            cur = self.next_sibling(c);
        }
        count
    }

    /// Apply `f` to `id` and every descendant, pre-order, without
    /// recursion.
    pub(crate) fn subtree_apply(&mut self, root: ObjId, mut f: impl FnMut(&mut Obj)) {
        for id in self.collect_subtree(root) {
            if let Some(node) = self.node_mut(id) {
                f(node);
            }
        }
    }

    /// Collect `root` and every descendant in pre-order document order.
    ///
    /// Descends along first-child links and climbs back along parent
    /// links, so the walk needs no stack and handles arbitrarily wide
    /// sibling chains.
    pub(crate) fn collect_subtree(&self, root: ObjId) -> alloc::vec::Vec<ObjId> {
        let mut out = alloc::vec::Vec::new();
        if self.node(root).is_none() {
            return out;
        }
        let mut cur = root;
        loop {
            out.push(cur);
            if out.len() > OBJ_POOL_SIZE {
                debug_assert!(false, "object tree traversal did not terminate");
                return out;
            }
            if let Some(child) = self.first_child(cur) {
                cur = child;
                continue;
            }
            loop {
                if cur == root {
                    return out;
                }
                if let Some(sibling) = self.next_sibling(cur) {
                    cur = sibling;
                    break;
                }
                match self.node(cur).map(|n| n.parent) {
                    Some(parent) if parent != cur => cur = parent,
                    _ => return out,
                }
            }
        }
    }

    /// Mark `id` and every descendant as needing repaint.
    pub fn set_dirty(&mut self, id: ObjId) {
        self.subtree_apply(id, |node| node.flags.dirty = true);
    }

    /// Mark `id` and every descendant for lazy destruction. Memory is
    /// released by the next collection pass; handles become stale then.
    pub fn set_destroyed(&mut self, id: ObjId) {
        self.subtree_apply(id, |node| node.flags.destroyed = true);
    }

    /// Hide or reveal `id` and its subtree. Hiding merges the vacated
    /// area into the frame's dirty rectangle so the background repaints.
    pub fn set_hidden(&mut self, id: ObjId, hidden: bool) {
        let Some(node) = self.node(id) else { return };
        if hidden {
            let area = node.area;
            if area.is_valid() {
                self.merge_dirty(&area);
            }
            self.subtree_apply(id, |node| node.flags.hidden = true);
        } else {
            self.subtree_apply(id, |node| {
                node.flags.hidden = false;
                node.flags.dirty = true;
            });
        }
    }

    /// Allow or forbid pointer hit-testing on `id`.
    pub fn set_clickable(&mut self, id: ObjId, clickable: bool) {
        if let Some(node) = self.node_mut(id) {
            node.flags.clickable = clickable;
        }
    }

    /// Shift `id` and every descendant by the same delta, marking each
    /// dirty and in need of re-init. This is how a parent's repositioning
    /// cascades without recomputing relative offsets.
    pub fn move_by(&mut self, id: ObjId, dx: i16, dy: i16) {
        self.subtree_apply(id, |node| {
            node.coords.x1 += dx;
            node.coords.x2 += dx;
            node.coords.y1 += dy;
            node.coords.y2 += dy;
            node.flags.dirty = true;
            node.flags.needinit = true;
        });
    }

    /// Place `id` at `(x, y)` relative to its parent's origin (absolute
    /// for a page root). The vacated area is merged into the dirty
    /// rectangle and all descendants are shifted by the same delta.
    pub fn set_pos(&mut self, id: ObjId, x: i16, y: i16) {
        let Some(node) = self.node(id) else {
            debug_assert!(false, "set_pos: stale object handle");
            return;
        };
        let origin = if node.is_page() {
            Pos::new(0, 0)
        } else {
            self.node(node.parent)
                .map(|p| Pos::new(p.coords.x1, p.coords.y1))
                .unwrap_or_default()
        };
        let old = node.coords;
        let old_area = node.area;
        let dx = origin.x + x - old.x1;
        let dy = origin.y + y - old.y1;

        if old_area.is_valid() {
            self.merge_dirty(&old_area);
        }
        if let Some(node) = self.node_mut(id) {
            node.coords = Area::new(old.x1 + dx, old.y1 + dy, old.x2 + dx, old.y2 + dy);
            node.flags.dirty = true;
            node.flags.needinit = true;
        }
        let mut child = self.first_child(id);
        while let Some(c) = child {
            let next = self.next_sibling(c);
            self.move_by(c, dx, dy);
            child = next;
        }
    }

    /// Resize `id` keeping its origin. The vacated area repaints; derived
    /// sub-rectangles are recomputed before the next draw.
    pub fn set_size(&mut self, id: ObjId, w: i16, h: i16) {
        let Some(node) = self.node(id) else {
            debug_assert!(false, "set_size: stale object handle");
            return;
        };
        if w < 1 || h < 1 {
            warn!("set_size: rejected empty size {}x{}", w, h);
            return;
        }
        let old_area = node.area;
        if old_area.is_valid() {
            self.merge_dirty(&old_area);
        }
        if let Some(node) = self.node_mut(id) {
            node.coords.x2 = node.coords.x1 + w - 1;
            node.coords.y2 = node.coords.y1 + h - 1;
            node.flags.dirty = true;
            node.flags.needinit = true;
        }
    }

    /// Position `id` inside its parent according to `align`.
    pub fn set_align(&mut self, id: ObjId, align: Align) {
        let Some(node) = self.node(id) else { return };
        let size = Extent::new(node.coords.width(), node.coords.height());
        let parent_size = if node.is_page() {
            let (xres, yres) = self.resolution();
            Extent::new(xres, yres)
        } else {
            match self.node(node.parent) {
                Some(p) => Extent::new(p.coords.width(), p.coords.height()),
                None => return,
            }
        };
        let offset = align.offset(parent_size, size);
        self.set_pos(id, offset.x, offset.y);
    }

    /// Set the margin consumed by the layout pass and re-apply it.
    pub fn set_margin(&mut self, id: ObjId, margin: i16) {
        if let Some(node) = self.node_mut(id) {
            node.margin = margin;
        }
        self.apply_layout(id);
    }

    /// Select how `id` arranges its children and reposition them now.
    pub fn set_layout(&mut self, id: ObjId, layout: Layout) {
        if let Some(node) = self.node_mut(id) {
            node.layout = layout;
        }
        self.apply_layout(id);
    }

    /// Re-run `id`'s layout over its direct children. Invoked whenever
    /// the child set changes.
    pub(crate) fn apply_layout(&mut self, id: ObjId) {
        let Some(node) = self.node(id) else { return };
        let layout = node.layout;
        let coords = node.coords;
        let margin = node.margin;
        if node.child.is_none() {
            return;
        }
        let count = self.child_count(id) as i16;
        match layout {
            Layout::None => {}
            Layout::Grid => {
                // TODO: grid layout
            }
            Layout::Horizontal => {
                let child_w = (coords.width() - margin * (count + 1)) / count;
                if child_w < 1 {
                    warn!("layout: {} children do not fit horizontally", count);
                    return;
                }
                self.set_dirty(id);
                let mut xs = coords.x1 + margin;
                let mut child = self.first_child(id);
                while let Some(c) = child {
                    if let Some(cnode) = self.node_mut(c) {
                        cnode.coords =
                            Area::new(xs, coords.y1 + margin, xs + child_w - 1, coords.y2 - margin);
                        cnode.flags.needinit = true;
                    }
                    xs += child_w + margin;
                    child = self.next_sibling(c);
                }
            }
            Layout::Vertical => {
                let child_h = (coords.height() - margin * (count + 1)) / count;
                if child_h < 1 {
                    warn!("layout: {} children do not fit vertically", count);
                    return;
                }
                self.set_dirty(id);
                let mut ys = coords.y1 + margin;
                let mut child = self.first_child(id);
                while let Some(c) = child {
                    if let Some(cnode) = self.node_mut(c) {
                        cnode.coords =
                            Area::new(coords.x1 + margin, ys, coords.x2 - margin, ys + child_h - 1);
                        cnode.flags.needinit = true;
                    }
                    ys += child_h + margin;
                    child = self.next_sibling(c);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::area::Area;
    use crate::obj::Layout;
    use crate::testutil::{probe, test_ui};

    #[test]
    fn test_add_child_appends_to_tail() {
        let (mut ui, _log) = test_ui(64, 64, 64 * 8);
        let page = ui.active_page().unwrap();
        let a = probe(&mut ui, page, 1);
        let b = probe(&mut ui, page, 2);
        assert_eq!(ui.first_child(page), Some(a));
        assert_eq!(ui.next_sibling(a), Some(b));
        assert_eq!(ui.next_sibling(b), None);
        assert_eq!(ui.child_count(page), 2);
    }

    #[test]
    fn test_set_dirty_marks_subtree() {
        let (mut ui, _log) = test_ui(64, 64, 64 * 8);
        let page = ui.active_page().unwrap();
        let parent = probe(&mut ui, page, 1);
        let child = probe(&mut ui, parent, 2);
        ui.task_handle(); // everything collected clean
        assert!(!ui.is_dirty(child).unwrap());
        ui.set_dirty(parent);
        assert!(ui.is_dirty(parent).unwrap());
        assert!(ui.is_dirty(child).unwrap());
    }

    #[test]
    fn test_move_cascade_preserves_relative_offsets() {
        let (mut ui, _log) = test_ui(128, 128, 128 * 8);
        let page = ui.active_page().unwrap();
        let parent = probe(&mut ui, page, 1);
        ui.set_pos(parent, 10, 10);
        ui.set_size(parent, 50, 50);
        let child = probe(&mut ui, parent, 2);
        ui.set_pos(child, 5, 5);
        ui.set_size(child, 10, 10);

        let offset_before = {
            let p = ui.coords(parent).unwrap();
            let c = ui.coords(child).unwrap();
            (c.x1 - p.x1, c.y1 - p.y1)
        };
        ui.set_pos(parent, 30, 40);
        ui.set_pos(parent, 2, 3);
        let p = ui.coords(parent).unwrap();
        let c = ui.coords(child).unwrap();
        assert_eq!(
            (c.x1 - p.x1, c.y1 - p.y1),
            offset_before,
            "relative layout must be preserved under translation"
        );
        assert_eq!((p.x1, p.y1), (2, 3));
        assert_eq!(c.width(), 10, "child size must survive the cascade");
    }

    #[test]
    fn test_set_pos_is_parent_relative() {
        let (mut ui, _log) = test_ui(128, 128, 128 * 8);
        let page = ui.active_page().unwrap();
        let parent = probe(&mut ui, page, 1);
        ui.set_pos(parent, 20, 20);
        ui.set_size(parent, 60, 60);
        let child = probe(&mut ui, parent, 2);
        ui.set_size(child, 10, 10);
        ui.set_pos(child, 4, 6);
        let c = ui.coords(child).unwrap();
        assert_eq!((c.x1, c.y1), (24, 26));
    }

    #[test]
    fn test_remove_refuses_active_page() {
        let (mut ui, _log) = test_ui(64, 64, 64 * 8);
        let page = ui.active_page().unwrap();
        ui.remove(page);
        assert!(ui.obj_alive(page));
        assert_eq!(ui.active_page(), Some(page));
    }

    #[test]
    fn test_remove_detaches_from_chain() {
        let (mut ui, _log) = test_ui(64, 64, 64 * 8);
        let page = ui.active_page().unwrap();
        let a = probe(&mut ui, page, 1);
        let b = probe(&mut ui, page, 2);
        let c = probe(&mut ui, page, 3);
        ui.remove(b);
        assert_eq!(ui.first_child(page), Some(a));
        assert_eq!(ui.next_sibling(a), Some(c));
        assert!(ui.obj_alive(b), "remove detaches but does not free");
    }

    #[test]
    fn test_horizontal_layout_splits_width() {
        let (mut ui, _log) = test_ui(128, 64, 128 * 8);
        let page = ui.active_page().unwrap();
        let row = probe(&mut ui, page, 1);
        ui.set_pos(row, 0, 0);
        ui.set_size(row, 110, 40);
        ui.set_margin(row, 2);
        ui.set_layout(row, Layout::Horizontal);
        let a = probe(&mut ui, row, 2);
        let b = probe(&mut ui, row, 3);
        let ca = ui.coords(a).unwrap();
        let cb = ui.coords(b).unwrap();
        assert_eq!(ca.width(), cb.width());
        assert_eq!(ca.y1, 2);
        assert_eq!(ca.y2, 37);
        assert_eq!(cb.x1, ca.x2 + 3, "two-pixel margin between children");
    }

    #[test]
    fn test_set_hidden_merges_vacated_area() {
        let (mut ui, log) = test_ui(64, 64, 64 * 64);
        let page = ui.active_page().unwrap();
        let a = probe(&mut ui, page, 1);
        ui.set_pos(a, 10, 10);
        ui.set_size(a, 8, 8);
        ui.task_handle();
        log.clear();
        ui.set_hidden(a, true);
        ui.task_handle();
        let flushes = log.flush_rects();
        assert!(!flushes.is_empty(), "hiding must repaint the vacated area");
        let band = Area::from_size(flushes[0].0, flushes[0].1, flushes[0].2, flushes[0].3);
        assert!(band.overlaps(&Area::new(10, 10, 17, 17)));
    }
}
