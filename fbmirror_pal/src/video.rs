//! The acquire/release protocol for hardware-decoded video frames.
//!
//! The decoder lends us its current frame. While we hold it, the decoder
//! won't recycle the frame's memory, so the lease must be as short as
//! possible: acquire, query the frame's metadata, submit the blit reading it,
//! and release. [`FrameSource`] enforces the ordering and [`VideoFrame`]
//! being move-only makes a use after release or a double release impossible.
use cgmath::Vector2;
use log::trace;
use std::io;

use crate::{
    blit::{CanvasIndex, Surface},
    ge2d::PixelFormat,
    iface::{DecoderError, VideoDecoder},
};

/// A frame owned by the caller until passed to [`FrameSource::release`].
#[derive(Debug, PartialEq, Eq)]
#[must_use = "an acquired frame must be released"]
pub struct VideoFrame {
    canvas: CanvasIndex,
    format: PixelFormat,
    size: Vector2<u32>,
}

impl VideoFrame {
    pub fn canvas(&self) -> CanvasIndex {
        self.canvas
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Get the size of the luma plane.
    pub fn size(&self) -> Vector2<u32> {
        self.size
    }

    pub fn aspect(&self) -> f64 {
        fitgeom::aspect_of(self.size)
    }

    /// Construct a `Surface` for reading the frame.
    pub fn surface(&self) -> Surface {
        Surface::canvas(self.canvas, self.format, self.size)
    }
}

/// Wraps a [`VideoDecoder`] to issue its requests in a valid order.
#[derive(Debug)]
pub struct FrameSource<D> {
    decoder: D,
    held: bool,
}

impl<D: VideoDecoder> FrameSource<D> {
    pub fn new(decoder: D) -> Self {
        Self {
            decoder,
            held: false,
        }
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    pub fn decoder_mut(&mut self) -> &mut D {
        &mut self.decoder
    }

    /// Check if a frame is currently held.
    pub fn is_holding(&self) -> bool {
        self.held
    }

    /// Take the decoder's current frame if there is one.
    ///
    /// `Ok(None)` means no frame is ready. Nothing has to be released in this
    /// case. A failure of a metadata query after a successful acquisition is
    /// reported as an error; the frame is considered held after that.
    ///
    /// Panics if a frame is already held.
    pub fn try_acquire(&mut self) -> Result<Option<VideoFrame>, DecoderError> {
        assert!(!self.held, "the previous frame hasn't been released yet");

        if !self.decoder.get_current_frame()? {
            trace!("No video frame is ready");
            return Ok(None);
        }
        self.held = true;

        let canvas = self.decoder.canvas0_addr()?;
        let format = PixelFormat(self.decoder.ge2d_format()?);
        let packed_size = self.decoder.frame_size()?;
        let size = Vector2::new((packed_size >> 32) as u32, packed_size as u32);

        if size.x == 0 || size.y == 0 {
            return Err(DecoderError {
                request: "AMVIDEO_EXT_CURRENT_VIDEOFRAME_GET_SIZE",
                source: io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("the decoder reported an empty frame ({:?})", size),
                ),
            });
        }

        trace!(
            "Acquired a {}x{} {:?} frame in canvases {:#08x}",
            size.x,
            size.y,
            format,
            canvas
        );

        Ok(Some(VideoFrame {
            canvas,
            format,
            size,
        }))
    }

    /// Return `frame` to the decoder.
    ///
    /// The blit reading `frame` must have been submitted already.
    pub fn release(&mut self, frame: VideoFrame) -> Result<(), DecoderError> {
        assert!(self.held, "releasing a frame that isn't held");
        drop(frame);

        self.held = false;
        self.decoder.put_current_frame()
    }
}
