use cgmath::Vector2;
use std::{
    cell::Cell,
    rc::Rc,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use super::{injected_failure, Event, Journal};
use crate::{
    blit::{OsdCanvas, PhysAddr},
    iface::{DisplayError, PrimaryDisplay, SecondaryDisplay},
};

/// A primary display with a configurable transparency flag.
#[derive(Debug)]
pub struct FakePrimary {
    journal: Journal,
    size: Vector2<u32>,
    bits_per_pixel: u32,
    transparent: Rc<Cell<bool>>,
    vsync_count: u64,
    shutdown: Option<(u64, Arc<AtomicBool>)>,
    fail_vsync: bool,
}

impl FakePrimary {
    pub fn new(journal: Journal, size: Vector2<u32>, bits_per_pixel: u32) -> Self {
        Self {
            journal,
            size,
            bits_per_pixel,
            transparent: Rc::new(Cell::new(false)),
            vsync_count: 0,
            shutdown: None,
            fail_vsync: false,
        }
    }

    /// Get a handle through which the transparency flag can be changed while
    /// the display is owned by someone else.
    pub fn transparency(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.transparent)
    }

    /// Raise `flag` on the `count`-th vertical refresh.
    pub fn raise_after_vsyncs(&mut self, count: u64, flag: Arc<AtomicBool>) {
        self.shutdown = Some((count, flag));
    }

    pub fn vsync_count(&self) -> u64 {
        self.vsync_count
    }

    /// Make every subsequent vsync wait fail.
    pub fn fail_vsync(&mut self) {
        self.fail_vsync = true;
    }
}

impl PrimaryDisplay for FakePrimary {
    fn size(&self) -> Vector2<u32> {
        self.size
    }

    fn bits_per_pixel(&self) -> u32 {
        self.bits_per_pixel
    }

    fn osd_canvas(&self) -> OsdCanvas {
        OsdCanvas::Osd0
    }

    fn wait_for_vsync(&mut self) -> Result<(), DisplayError> {
        self.journal.push(Event::WaitForVsync);
        if self.fail_vsync {
            return Err(DisplayError {
                request: "FBIO_WAITFORVSYNC",
                source: injected_failure(),
            });
        }
        self.vsync_count += 1;

        if let Some((count, flag)) = &self.shutdown {
            if self.vsync_count >= *count {
                flag.store(true, Ordering::Relaxed);
            }
        }
        Ok(())
    }

    fn is_transparency_enabled(&mut self) -> Result<bool, DisplayError> {
        self.journal.push(Event::PollTransparency);
        Ok(self.transparent.get())
    }
}

/// A secondary display counting the presented frames.
#[derive(Debug)]
pub struct FakeSecondary {
    journal: Journal,
    size: Vector2<u32>,
    bits_per_pixel: u32,
    buffer_address: PhysAddr,
    fail_commit: bool,
}

impl FakeSecondary {
    pub fn new(
        journal: Journal,
        size: Vector2<u32>,
        bits_per_pixel: u32,
        buffer_address: PhysAddr,
    ) -> Self {
        Self {
            journal,
            size,
            bits_per_pixel,
            buffer_address,
            fail_commit: false,
        }
    }

    /// Make every subsequent commit fail.
    pub fn fail_commit(&mut self) {
        self.fail_commit = true;
    }
}

impl SecondaryDisplay for FakeSecondary {
    fn size(&self) -> Vector2<u32> {
        self.size
    }

    fn bits_per_pixel(&self) -> u32 {
        self.bits_per_pixel
    }

    fn buffer_address(&self) -> PhysAddr {
        self.buffer_address
    }

    fn clear(&mut self) {
        self.journal.push(Event::Clear);
    }

    fn commit(&mut self) -> Result<(), DisplayError> {
        if self.fail_commit {
            return Err(DisplayError {
                request: "FBIOPAN_DISPLAY",
                source: injected_failure(),
            });
        }
        self.journal.push(Event::Commit);
        Ok(())
    }
}
