//! The Linux backend.
//!
//! Talks to the Amlogic display stack through its device nodes:
//!
//!  - `/dev/fbN` for the displays ([`PrimaryFb`], [`SecondaryFb`])
//!  - `/dev/ion` for physically contiguous memory ([`IonDevice`])
//!  - `/dev/ge2d` for the blit engine ([`Ge2d`])
//!  - `/dev/amvideo` for decoded video frames ([`AmVideo`])
use crate::iface;

mod amvideo;
mod engine;
mod fb;
mod ioctl;
mod ion;

pub use self::{
    amvideo::AmVideo,
    engine::Ge2d,
    fb::{FrameBuffer, PrimaryFb, SecondaryFb},
    ion::{IonBuffer, IonDevice},
};

/// The device types of the Linux backend.
#[derive(Debug)]
pub enum Backend {}

impl iface::Backend for Backend {
    type Primary = PrimaryFb;
    type Secondary = SecondaryFb;
    type Engine = Ge2d;
    type Decoder = AmVideo;
    type Buffer = IonBuffer;
}

/// Open a device node for reading and writing.
fn open_rw(what: &'static str, path: &str) -> Result<std::fs::File, iface::ResourceOpenError> {
    std::fs::OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .map_err(|source| iface::ResourceOpenError {
            what,
            path: path.to_owned(),
            source,
        })
}
