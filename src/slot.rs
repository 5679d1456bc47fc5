//! The slot list: flattened document-order traversal of the active tree.
//!
//! The render passes never walk the tree directly; they iterate this
//! list, so its order *is* the paint order: later siblings paint over
//! earlier ones, children paint over their parent. Two maintenance
//! strategies exist behind the `slot-dynamic` feature:
//!
//! * static (default): a bounded table rebuilt by full tree walk
//!   whenever the object set changes; overflow is reported and the
//!   overflowing objects are skipped, never corrupting earlier entries;
//! * dynamic: an intrusive doubly-linked list threaded through the
//!   nodes, spliced incrementally in O(depth).
//!
//! Either way the list is populated lazily: the first tick after a page
//! is loaded performs the one-time full walk, so building up a scene
//! before the first frame costs nothing extra.

use crate::context::Ui;
use crate::obj::ObjId;

#[cfg(not(feature = "slot-dynamic"))]
mod imp {
    use log::error;

    use super::*;

    impl Ui {
        /// Rebuild the slot table from the active tree.
        ///
        /// Each visited object's visible area is refreshed from its
        /// parent while walking, so freshly created objects enter the
        /// paint set with a usable clip.
        pub(crate) fn slot_populate(&mut self) {
            self.slots.clear();
            self.slots_stale = false;
            let Some(root) = self.active_page() else {
                return;
            };
            let mut overflowed = false;
            for id in self.collect_subtree(root) {
                self.slot_refresh_area(id);
                if self.slots.push(id).is_err() {
                    overflowed = true;
                }
            }
            if overflowed {
                error!(
                    "too many objects in one page, max is {}; extras will not render",
                    self.slots.capacity()
                );
            }
        }

        /// Note that the table no longer matches the tree. The rebuild
        /// happens at the next synchronization point, outside any
        /// in-progress iteration.
        pub(crate) fn slot_mark_stale(&mut self) {
            if self.started {
                self.slots_stale = true;
            }
        }

        /// Rebuild the table if a structural change was recorded.
        pub(crate) fn slot_sync(&mut self) {
            if self.started && self.slots_stale {
                self.slot_populate();
            }
        }

        /// A removed subtree leaves the paint order at the next rebuild.
        pub(crate) fn slot_forget_subtree(&mut self, _root: ObjId) {
            self.slot_mark_stale();
        }

        /// Paint-order maintenance for an object created after the page
        /// started rendering.
        pub(crate) fn slot_insert_created(&mut self, _parent: ObjId, _id: ObjId) {
            self.slot_mark_stale();
        }

        /// Paint-order maintenance for a freed object.
        pub(crate) fn slot_forget_freed(&mut self, _id: ObjId) {
            self.slot_mark_stale();
        }
    }
}

#[cfg(feature = "slot-dynamic")]
mod imp {
    use super::*;

    impl Ui {
        /// Rebuild the intrusive list from the active tree. Every visited
        /// node's links are rewritten, so leftovers from a previously
        /// loaded page cannot leak into the fresh list.
        pub(crate) fn slot_populate(&mut self) {
            self.slot_head = None;
            self.slot_tail = None;
            let Some(root) = self.active_page() else {
                return;
            };
            for id in self.collect_subtree(root) {
                self.slot_refresh_area(id);
                self.slot_append(id);
            }
        }

        pub(crate) fn slot_sync(&mut self) {}

        fn slot_append(&mut self, id: ObjId) {
            let tail = self.slot_tail;
            if let Some(node) = self.node_mut(id) {
                node.slot_prev = tail;
                node.slot_next = None;
            }
            match tail {
                Some(t) => {
                    if let Some(tnode) = self.node_mut(t) {
                        tnode.slot_next = Some(id);
                    }
                }
                None => self.slot_head = Some(id),
            }
            self.slot_tail = Some(id);
        }

        /// Splice `id` into the list directly after `anchor`.
        fn slot_splice_after(&mut self, anchor: ObjId, id: ObjId) {
            let Some(anode) = self.node(anchor) else {
                return;
            };
            let next = anode.slot_next;
            if let Some(node) = self.node_mut(id) {
                node.slot_prev = Some(anchor);
                node.slot_next = next;
            }
            if let Some(anode) = self.node_mut(anchor) {
                anode.slot_next = Some(id);
            }
            match next {
                Some(n) => {
                    if let Some(nnode) = self.node_mut(n) {
                        nnode.slot_prev = Some(id);
                    }
                }
                None => self.slot_tail = Some(id),
            }
        }

        fn slot_unlink(&mut self, id: ObjId) {
            let Some(node) = self.node(id) else { return };
            let prev = node.slot_prev;
            let next = node.slot_next;
            if let Some(node) = self.node_mut(id) {
                node.slot_prev = None;
                node.slot_next = None;
            }
            match prev {
                Some(p) => {
                    if let Some(pnode) = self.node_mut(p) {
                        pnode.slot_next = next;
                    }
                }
                None if self.slot_head == Some(id) => self.slot_head = next,
                None => {}
            }
            match next {
                Some(n) => {
                    if let Some(nnode) = self.node_mut(n) {
                        nnode.slot_prev = prev;
                    }
                }
                None if self.slot_tail == Some(id) => self.slot_tail = prev,
                None => {}
            }
        }

        /// Unlink a removed subtree from the paint order. Skipped when
        /// the subtree belongs to a page that is not live; its links are
        /// rewritten wholesale when that page repopulates.
        pub(crate) fn slot_forget_subtree(&mut self, root: ObjId) {
            if !self.started || self.page_of(root) != self.active_page() {
                return;
            }
            for id in self.collect_subtree(root) {
                self.slot_unlink(id);
            }
        }

        /// Splice a freshly created object after its last sibling (or
        /// directly after the parent when it is the first child), per the
        /// paint-order contract.
        pub(crate) fn slot_insert_created(&mut self, parent: ObjId, id: ObjId) {
            if self.page_of(parent) != self.active_page() {
                return;
            }
            // The new object is already chained, so its own entry is the
            // tail of the sibling list; the anchor is the one before it.
            let mut anchor = parent;
            let mut cur = self.first_child(parent);
            while let Some(c) = cur {
                if c == id {
                    break;
                }
                anchor = c;
                cur = self.next_sibling(c);
            }
            self.slot_splice_after(anchor, id);
        }

        pub(crate) fn slot_forget_freed(&mut self, id: ObjId) {
            self.slot_unlink(id);
        }
    }
}

impl Ui {
    /// Refresh an object's visible area from its parent during slot
    /// population; objects clipped entirely away are flagged invalid.
    fn slot_refresh_area(&mut self, id: ObjId) {
        let Some(node) = self.node(id) else { return };
        if node.is_page() {
            return;
        }
        let coords = node.coords;
        let clipped = self
            .node(node.parent)
            .map(|p| p.area)
            .and_then(|parent_area| parent_area.clip(&coords));
        if let Some(node) = self.node_mut(id) {
            match clipped {
                Some(area) => {
                    node.area = area;
                    node.flags.invalid = false;
                }
                None => node.flags.invalid = true,
            }
        }
    }

    /// Snapshot of the current paint order; stale entries (freed mid-pass)
    /// are reported as-is and skipped by the consumers.
    #[cfg(test)]
    pub(crate) fn slot_order(&self) -> alloc::vec::Vec<ObjId> {
        let mut out = alloc::vec::Vec::new();
        #[cfg(not(feature = "slot-dynamic"))]
        out.extend(self.slots.iter().copied());
        #[cfg(feature = "slot-dynamic")]
        {
            let mut cur = self.slot_head;
            while let Some(id) = cur {
                out.push(id);
                cur = self.node(id).and_then(|n| n.slot_next);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use crate::testutil::{probe, test_ui};

    #[test]
    fn test_slot_population_is_lazy_and_preorder() {
        let (mut ui, _log) = test_ui(64, 64, 64 * 8);
        let page = ui.active_page().unwrap();
        let a = probe(&mut ui, page, 1);
        let a1 = probe(&mut ui, a, 2);
        let b = probe(&mut ui, page, 3);
        assert!(
            ui.slot_order().is_empty(),
            "slot list must not exist before the first tick"
        );
        ui.task_handle();
        assert_eq!(ui.slot_order(), [page, a, a1, b]);
    }

    #[test]
    fn test_created_after_start_enters_paint_order() {
        let (mut ui, _log) = test_ui(64, 64, 64 * 8);
        let page = ui.active_page().unwrap();
        let a = probe(&mut ui, page, 1);
        ui.task_handle();
        let b = probe(&mut ui, page, 2);
        ui.task_handle();
        let order = ui.slot_order();
        let ia = order.iter().position(|&x| x == a).unwrap();
        let ib = order.iter().position(|&x| x == b).unwrap();
        assert!(ia < ib, "later sibling must paint over the earlier one");
    }

    #[cfg(not(feature = "slot-dynamic"))]
    #[test]
    fn test_static_slot_overflow_degrades() {
        use crate::config::OBJ_SLOT_SIZE;
        let (mut ui, _log) = test_ui(64, 64, 64 * 8);
        let page = ui.active_page().unwrap();
        // One slot is taken by the page root itself.
        for i in 0..OBJ_SLOT_SIZE + 10 {
            if crate::testutil::try_probe(&mut ui, page, i as u32).is_err() {
                break;
            }
        }
        ui.task_handle();
        let order = ui.slot_order();
        assert_eq!(
            order.len(),
            OBJ_SLOT_SIZE,
            "the table must truncate, not grow or corrupt"
        );
        assert_eq!(order[0], page, "early entries stay intact");
    }
}
