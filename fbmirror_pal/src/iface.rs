//! Defines an abstract interface to the hardware.
//!
//! Every method that talks to a device is a blocking control request. A
//! failed request is reported with the name of the request so the caller can
//! produce a useful diagnostic before giving up.
use cgmath::Vector2;
use displaydoc::Display;
use std::{error::Error, io};

use crate::{
    blit::{BlitRequest, CanvasIndex, OsdCanvas, PhysAddr},
    ge2d,
};

/// A set of device types making up a backend.
pub trait Backend: 'static {
    type Primary: PrimaryDisplay;
    type Secondary: SecondaryDisplay;
    type Engine: BlitEngine;
    type Decoder: VideoDecoder;
    type Buffer: ContigBuffer;
}

/// The high-resolution display whose OSD layer is mirrored.
pub trait PrimaryDisplay {
    /// Get the visible resolution.
    fn size(&self) -> Vector2<u32>;

    fn bits_per_pixel(&self) -> u32;

    /// Get the OSD canvas the blit engine reads this display's contents from.
    fn osd_canvas(&self) -> OsdCanvas;

    /// Block until the next vertical refresh.
    fn wait_for_vsync(&mut self) -> Result<(), DisplayError>;

    /// Poll the display's transparency flag.
    fn is_transparency_enabled(&mut self) -> Result<bool, DisplayError>;
}

/// The low-resolution panel receiving the composited output.
///
/// The panel is backed by a physically contiguous buffer that the blit
/// engine writes into. Its contents are presented by [`commit`].
///
/// [`commit`]: SecondaryDisplay::commit
pub trait SecondaryDisplay {
    fn size(&self) -> Vector2<u32>;

    fn bits_per_pixel(&self) -> u32;

    /// Get the physical address of the buffer the engine writes into.
    fn buffer_address(&self) -> PhysAddr;

    /// Fill the buffer and the panel with black.
    fn clear(&mut self);

    /// Present the buffer's current contents.
    fn commit(&mut self) -> Result<(), DisplayError>;
}

/// A physically contiguous buffer usable by the blit engine.
pub trait ContigBuffer {
    fn len(&self) -> usize;

    fn phys_addr(&self) -> PhysAddr;

    fn as_mut_slice(&mut self) -> &mut [u8];
}

/// The 2D blit engine.
pub trait BlitEngine {
    /// Submit a configuration descriptor.
    fn configure(&mut self, config: &ge2d::ConfigParaEx) -> Result<(), EngineError>;

    /// Submit an operation descriptor to be executed with the current
    /// configuration.
    fn execute(&mut self, command: ge2d::Command, para: &ge2d::Ge2dPara)
        -> Result<(), EngineError>;

    /// Build the descriptors for `request` and submit them.
    fn blit(&mut self, request: &BlitRequest) -> Result<(), EngineError> {
        let desc = ge2d::build(request);
        self.configure(&desc.config)?;
        self.execute(desc.command, &desc.para)
    }
}

/// The raw control requests of a hardware video decoder's frame source.
///
/// See [`FrameSource`] for the protocol these must be issued in.
///
/// [`FrameSource`]: crate::video::FrameSource
pub trait VideoDecoder {
    /// Try to take ownership of the current frame. Returns `Ok(false)` if no
    /// frame is ready.
    fn get_current_frame(&mut self) -> Result<bool, DecoderError>;

    /// Get the canvases holding the owned frame.
    fn canvas0_addr(&mut self) -> Result<CanvasIndex, DecoderError>;

    /// Get the GE2D pixel format tag of the owned frame.
    fn ge2d_format(&mut self) -> Result<u32, DecoderError>;

    /// Get the size of the owned frame, packed as `(width << 32) | height`.
    fn frame_size(&mut self) -> Result<u64, DecoderError>;

    /// Give the owned frame back to the decoder.
    fn put_current_frame(&mut self) -> Result<(), DecoderError>;
}

// ============================================================================

/// could not open {what} at {path}: {source}
#[derive(Debug, Display)]
pub struct ResourceOpenError {
    pub what: &'static str,
    pub path: String,
    pub source: io::Error,
}

impl Error for ResourceOpenError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

/// could not allocate a contiguous buffer of {len} bytes: {source}
#[derive(Debug, Display)]
pub struct AllocationError {
    pub len: usize,
    pub source: io::Error,
}

impl Error for AllocationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

/// blit engine request {request} failed: {source}
#[derive(Debug, Display)]
pub struct EngineError {
    pub request: &'static str,
    pub source: io::Error,
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

/// video decoder request {request} failed: {source}
#[derive(Debug, Display)]
pub struct DecoderError {
    pub request: &'static str,
    pub source: io::Error,
}

impl Error for DecoderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

/// display request {request} failed: {source}
#[derive(Debug, Display)]
pub struct DisplayError {
    pub request: &'static str,
    pub source: io::Error,
}

impl Error for DisplayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}
