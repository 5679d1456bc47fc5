//! The band-scratch paint target.
//!
//! A [`Surface`] is a window into the scratch pixel buffer: the renderer
//! positions it over one horizontal band of the dirty rectangle at a
//! time, widgets paint into it with embedded-graphics primitives, and the
//! finished band is handed to the panel driver. Every pixel write is
//! clipped to the band window and to the active clip rectangle, so a
//! widget cannot paint outside its own visible area no matter what its
//! draw code does.

use alloc::vec;
use alloc::vec::Vec;
use core::convert::Infallible;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::area::Area;

/// Scratch paint target for one render band.
///
/// Coordinates accepted by the `DrawTarget` impl are absolute screen
/// coordinates; the surface translates them into its buffer itself.
pub struct Surface {
    /// Band origin on the panel.
    pub(crate) x: i16,
    pub(crate) y: i16,
    /// Band dimensions in pixels.
    pub(crate) w: i16,
    pub(crate) h: i16,
    /// Full panel resolution, reported as the drawable bounding box.
    xres: i16,
    yres: i16,
    /// Pixels per scratch buffer.
    cap: usize,
    /// Active clip rectangle in absolute coordinates.
    clip: Area,
    #[cfg(not(feature = "double-buffer"))]
    buf: Vec<Rgb565>,
    #[cfg(feature = "double-buffer")]
    bufs: [Vec<Rgb565>; 2],
    #[cfg(feature = "double-buffer")]
    front: usize,
}

impl Surface {
    /// Allocate a surface with `cap` pixels of scratch per buffer.
    pub(crate) fn new(xres: i16, yres: i16, cap: usize) -> Self {
        Self {
            x: 0,
            y: 0,
            w: xres,
            h: 0,
            xres,
            yres,
            cap,
            clip: Area::new(0, 0, xres - 1, yres - 1),
            #[cfg(not(feature = "double-buffer"))]
            buf: vec![Rgb565::BLACK; cap],
            #[cfg(feature = "double-buffer")]
            bufs: [vec![Rgb565::BLACK; cap], vec![Rgb565::BLACK; cap]],
            #[cfg(feature = "double-buffer")]
            front: 0,
        }
    }

    /// Pixels per scratch buffer.
    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Area covered by the current band.
    pub fn band_area(&self) -> Area {
        Area::from_size(self.x, self.y, self.w, self.h)
    }

    /// Position the band window. `w * h` must fit the scratch capacity.
    pub(crate) fn set_window(&mut self, x: i16, y: i16, w: i16, h: i16) {
        debug_assert!(w > 0 && h > 0, "band window must not be empty");
        debug_assert!(
            w as usize * h as usize <= self.cap,
            "band window exceeds scratch capacity"
        );
        self.x = x;
        self.y = y;
        self.w = w;
        self.h = h;
    }

    /// Restrict subsequent pixel writes to `clip` (absolute coordinates).
    pub(crate) fn set_clip(&mut self, clip: Area) {
        self.clip = clip;
    }

    /// The active clip rectangle.
    pub fn clip(&self) -> Area {
        self.clip
    }

    #[cfg(not(feature = "double-buffer"))]
    fn buf(&self) -> &[Rgb565] {
        &self.buf
    }

    #[cfg(not(feature = "double-buffer"))]
    fn buf_mut(&mut self) -> &mut [Rgb565] {
        &mut self.buf
    }

    #[cfg(feature = "double-buffer")]
    fn buf(&self) -> &[Rgb565] {
        &self.bufs[self.front]
    }

    #[cfg(feature = "double-buffer")]
    fn buf_mut(&mut self) -> &mut [Rgb565] {
        let front = self.front;
        &mut self.bufs[front]
    }

    /// Swap scratch halves so the panel driver can consume the finished
    /// band while the next one is painted.
    #[cfg(feature = "double-buffer")]
    pub(crate) fn swap_buffers(&mut self) {
        self.front ^= 1;
    }

    /// The first `n` pixels of the current band, row-major.
    pub(crate) fn band_pixels(&self, n: usize) -> &[Rgb565] {
        &self.buf()[..n]
    }

    /// Read back a pixel by absolute coordinate, if it lies inside the
    /// current band window.
    pub fn pixel(&self, x: i16, y: i16) -> Option<Rgb565> {
        if x < self.x || y < self.y || x >= self.x + self.w || y >= self.y + self.h {
            return None;
        }
        let idx = (y - self.y) as usize * self.w as usize + (x - self.x) as usize;
        self.buf().get(idx).copied()
    }

    #[inline]
    fn put_pixel(&mut self, x: i16, y: i16, color: Rgb565) {
        if x < self.x || y < self.y || x >= self.x + self.w || y >= self.y + self.h {
            return;
        }
        if !self.clip.contains_pos(crate::area::Pos::new(x, y)) {
            return;
        }
        let idx = (y - self.y) as usize * self.w as usize + (x - self.x) as usize;
        if let Some(px) = self.buf_mut().get_mut(idx) {
            *px = color;
        }
    }
}

impl OriginDimensions for Surface {
    fn size(&self) -> Size {
        // Widgets address the full logical plane; the band window and
        // clip do the narrowing.
        Size::new(self.xres as u32, self.yres as u32)
    }
}

impl DrawTarget for Surface {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            if coord.x >= i16::MIN as i32
                && coord.x <= i16::MAX as i32
                && coord.y >= i16::MIN as i32
                && coord.y <= i16::MAX as i32
            {
                self.put_pixel(coord.x as i16, coord.y as i16, color);
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let mut rect = Area::from_rectangle(area);
        if !rect.is_valid() {
            return Ok(());
        }
        if !rect.self_clip(&self.clip) || !rect.self_clip(&self.band_area()) {
            return Ok(());
        }
        let w = self.w as usize;
        for y in rect.y1..=rect.y2 {
            let row = (y - self.y) as usize * w;
            let start = row + (rect.x1 - self.x) as usize;
            let end = row + (rect.x2 - self.x) as usize + 1;
            self.buf_mut()[start..end].fill(color);
        }
        Ok(())
    }
}
