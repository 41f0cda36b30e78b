//! The testing backend.
//!
//! Every device of this backend lives in memory and appends the requests it
//! receives to a shared [`Journal`], so a test can drive the compositor for a
//! few ticks and then check what would have been sent to the hardware and in
//! which order. Failures can be injected into individual requests to exercise
//! the fatal-error paths.
use std::{cell::RefCell, io, rc::Rc};

use crate::{
    ge2d::{Command, ConfigParaEx, Descriptors, Ge2dPara},
    iface,
};

mod buffer;
mod decoder;
mod display;
mod engine;

pub use self::{
    buffer::FakeBuffer,
    decoder::{ScriptedDecoder, ScriptedFrame},
    display::{FakePrimary, FakeSecondary},
    engine::RecordingEngine,
};

/// The device types of the testing backend.
#[derive(Debug)]
pub enum Backend {}

impl iface::Backend for Backend {
    type Primary = FakePrimary;
    type Secondary = FakeSecondary;
    type Engine = RecordingEngine;
    type Decoder = ScriptedDecoder;
    type Buffer = FakeBuffer;
}

/// A request received by one of the testing devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    WaitForVsync,
    PollTransparency,
    Configure(ConfigParaEx),
    Execute(Command, Ge2dPara),
    Decoder(DecoderRequest),
    Clear,
    Commit,
}

/// Identifies a [`VideoDecoder`] method.
///
/// [`VideoDecoder`]: crate::iface::VideoDecoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecoderRequest {
    GetCurrentFrame,
    Canvas0Addr,
    Ge2dFormat,
    FrameSize,
    PutCurrentFrame,
}

/// A log of [`Event`]s shared by the testing devices.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    events: Rc<RefCell<Vec<Event>>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&self, event: Event) {
        self.events.borrow_mut().push(event);
    }

    /// Get a copy of the recorded events.
    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    /// Remove and return the recorded events.
    pub fn take(&self) -> Vec<Event> {
        std::mem::replace(&mut *self.events.borrow_mut(), Vec::new())
    }

    /// Get the recorded decoder requests.
    pub fn decoder_requests(&self) -> Vec<DecoderRequest> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Decoder(r) => Some(*r),
                _ => None,
            })
            .collect()
    }

    /// Reconstruct the executed blits by pairing each `Execute` with the
    /// `Configure` preceding it.
    pub fn blits(&self) -> Vec<Descriptors> {
        let mut config = None;
        let mut out = Vec::new();
        for e in self.events.borrow().iter() {
            match *e {
                Event::Configure(c) => config = Some(c),
                Event::Execute(command, para) => {
                    let config = config.expect("executed without a configuration");
                    out.push(Descriptors {
                        config,
                        command,
                        para,
                    });
                }
                _ => {}
            }
        }
        out
    }

    /// Count the events matching `pred`.
    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.events.borrow().iter().filter(|e| pred(e)).count()
    }
}

/// The error reported by an injected failure.
fn injected_failure() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "injected failure")
}
