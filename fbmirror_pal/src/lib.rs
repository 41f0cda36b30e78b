//! Platform abstraction layer for `fbmirror`.
//!
//! The hardware this program drives is reached through a handful of seams
//! defined in [`iface`]: the primary display (whose OSD is mirrored), the
//! secondary display (receiving the composited output), the GE2D blit engine,
//! and the video decoder's frame source. [`linux`] implements them on top of
//! the kernel's device nodes. [`testing`] implements them in memory, recording
//! every request for inspection.
pub mod blit;
pub mod ge2d;
pub mod iface;
pub mod video;

#[cfg(target_os = "linux")]
pub mod linux;
#[cfg(target_os = "linux")]
pub use linux as native;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Re-exports traits from `iface`.
pub mod prelude {
    pub use super::iface::{
        Backend, BlitEngine, ContigBuffer, PrimaryDisplay, SecondaryDisplay, VideoDecoder,
    };
}

pub use self::blit::{
    BlendFactors, BlitRequest, CanvasIndex, Layer, OsdCanvas, PhysAddr, Plane, Surface,
};
pub use self::ge2d::PixelFormat;
pub use self::iface::{AllocationError, DecoderError, DisplayError, EngineError, ResourceOpenError};
pub use self::video::{FrameSource, VideoFrame};
