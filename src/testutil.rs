//! Shared test fixtures: a recording panel driver and a probe widget
//! that logs its draw invocations.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use embedded_graphics::pixelcolor::Rgb565;

use crate::area::Area;
use crate::context::{Ui, UiError};
use crate::event::Event;
use crate::obj::{Obj, ObjId};
use crate::page::{FbConfig, PanelFlush};
use crate::surface::Surface;
use crate::widget::Widget;

/// One flush call: `(x, y, w, h)`.
pub(crate) type FlushRec = (i16, i16, i16, i16);
/// One `DrawMain` dispatch: `(probe tag, band area)`.
pub(crate) type DrawRec = (u32, Area);

#[derive(Clone, Default)]
pub(crate) struct TestLog {
    flushes: Rc<RefCell<Vec<FlushRec>>>,
    draws: Rc<RefCell<Vec<DrawRec>>>,
}

impl TestLog {
    pub fn clear(&self) {
        self.flushes.borrow_mut().clear();
        self.draws.borrow_mut().clear();
    }

    pub fn flush_count(&self) -> usize {
        self.flushes.borrow().len()
    }

    pub fn flush_rects(&self) -> Vec<FlushRec> {
        self.flushes.borrow().clone()
    }

    pub fn draw_count(&self) -> usize {
        self.draws.borrow().len()
    }

    pub fn draw_tags(&self) -> Vec<u32> {
        self.draws.borrow().iter().map(|d| d.0).collect()
    }

    pub fn draw_log(&self) -> Rc<RefCell<Vec<DrawRec>>> {
        self.draws.clone()
    }
}

struct RecordingPanel {
    log: TestLog,
}

impl PanelFlush for RecordingPanel {
    fn flush_area(&mut self, x: i16, y: i16, w: i16, h: i16, pixels: &[Rgb565]) {
        assert_eq!(
            pixels.len(),
            w as usize * h as usize,
            "flush must receive exactly one band of pixels"
        );
        self.log.flushes.borrow_mut().push((x, y, w, h));
    }
}

/// Minimal widget for structural tests; optionally records every
/// `DrawMain` it receives.
pub(crate) struct ProbeWidget {
    pub tag: u32,
    draws: Option<Rc<RefCell<Vec<DrawRec>>>>,
}

impl ProbeWidget {
    pub fn new(tag: u32, draws: Rc<RefCell<Vec<DrawRec>>>) -> Self {
        Self {
            tag,
            draws: Some(draws),
        }
    }

    pub fn detached(tag: u32) -> Self {
        Self { tag, draws: None }
    }
}

impl Widget for ProbeWidget {
    fn construct(&mut self, surf: Option<&mut Surface>, _obj: &mut Obj, evt: &Event) {
        if *evt == Event::DrawMain
            && let Some(surf) = surf
            && let Some(draws) = &self.draws
        {
            draws.borrow_mut().push((self.tag, surf.band_area()));
        }
    }
}

/// A context bound to a recording panel, with one page loaded.
pub(crate) fn test_ui(xres: i16, yres: i16, buffer_pixels: usize) -> (Ui, TestLog) {
    let log = TestLog::default();
    let mut ui = Ui::new();
    ui.register_framebuffer(FbConfig {
        xres,
        yres,
        buffer_pixels,
        panel: Box::new(RecordingPanel { log: log.clone() }),
    })
    .expect("test framebuffer must register");
    ui.create_page().expect("test page must be created");
    (ui, log)
}

/// Create a non-recording probe object; panics on failure.
pub(crate) fn probe(ui: &mut Ui, parent: ObjId, tag: u32) -> ObjId {
    try_probe(ui, parent, tag).expect("probe creation must succeed")
}

/// Create a non-recording probe object.
pub(crate) fn try_probe(ui: &mut Ui, parent: ObjId, tag: u32) -> Result<ObjId, UiError> {
    ui.create_obj(parent, Box::new(ProbeWidget::detached(tag)))
}

/// Create a probe that records its draws into `log`.
pub(crate) fn recording_probe(ui: &mut Ui, parent: ObjId, tag: u32, log: &TestLog) -> ObjId {
    ui.create_obj(parent, Box::new(ProbeWidget::new(tag, log.draw_log())))
        .expect("probe creation must succeed")
}

/// Bounding box of everything flushed so far.
pub(crate) fn flush_union(log: &TestLog) -> Area {
    let mut acc = Area::INVALID;
    for (x, y, w, h) in log.flush_rects() {
        acc.self_merge(&Area::from_size(x, y, w, h));
    }
    acc
}
