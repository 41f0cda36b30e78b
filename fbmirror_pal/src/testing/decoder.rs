use cgmath::Vector2;
use std::collections::VecDeque;

use super::{injected_failure, DecoderRequest, Event, Journal};
use crate::{
    blit::CanvasIndex,
    ge2d::PixelFormat,
    iface::{DecoderError, VideoDecoder},
};

/// The metadata of a frame produced by [`ScriptedDecoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptedFrame {
    pub canvas: CanvasIndex,
    pub format: PixelFormat,
    pub size: Vector2<u32>,
}

/// A video decoder replaying a script of frames.
///
/// Each `get_current_frame` consumes one entry of the script. `None` entries
/// (and an exhausted script) are reported as "not ready".
///
/// The decoder panics when its requests are issued out of order, e.g., when
/// a frame is taken while another one is still held.
#[derive(Debug)]
pub struct ScriptedDecoder {
    journal: Journal,
    script: VecDeque<Option<ScriptedFrame>>,
    current: Option<ScriptedFrame>,
    fail_on: Option<DecoderRequest>,
}

impl ScriptedDecoder {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            script: VecDeque::new(),
            current: None,
            fail_on: None,
        }
    }

    /// Append an entry to the script.
    pub fn push(&mut self, frame: Option<ScriptedFrame>) {
        self.script.push_back(frame);
    }

    /// Make every subsequent `request` fail.
    pub fn fail_on(&mut self, request: DecoderRequest) {
        self.fail_on = Some(request);
    }

    /// Check if a frame is taken and not put back yet.
    pub fn is_holding(&self) -> bool {
        self.current.is_some()
    }

    fn record(&mut self, request: DecoderRequest) -> Result<(), DecoderError> {
        self.journal.push(Event::Decoder(request));

        if self.fail_on == Some(request) {
            return Err(DecoderError {
                request: request_name(request),
                source: injected_failure(),
            });
        }
        Ok(())
    }

    fn held_frame(&mut self, request: DecoderRequest) -> Result<ScriptedFrame, DecoderError> {
        let frame = self
            .current
            .unwrap_or_else(|| panic!("{:?} while no frame is held", request));
        self.record(request)?;
        Ok(frame)
    }
}

fn request_name(request: DecoderRequest) -> &'static str {
    match request {
        DecoderRequest::GetCurrentFrame => "AMVIDEO_EXT_GET_CURRENT_VIDEOFRAME",
        DecoderRequest::Canvas0Addr => "AMVIDEO_EXT_CURRENT_VIDEOFRAME_GET_CANVAS0ADDR",
        DecoderRequest::Ge2dFormat => "AMVIDEO_EXT_CURRENT_VIDEOFRAME_GET_GE2D_FORMAT",
        DecoderRequest::FrameSize => "AMVIDEO_EXT_CURRENT_VIDEOFRAME_GET_SIZE",
        DecoderRequest::PutCurrentFrame => "AMVIDEO_EXT_PUT_CURRENT_VIDEOFRAME",
    }
}

impl VideoDecoder for ScriptedDecoder {
    fn get_current_frame(&mut self) -> Result<bool, DecoderError> {
        assert!(
            self.current.is_none(),
            "took a frame while the previous one is still held"
        );
        self.record(DecoderRequest::GetCurrentFrame)?;

        self.current = self.script.pop_front().flatten();
        Ok(self.current.is_some())
    }

    fn canvas0_addr(&mut self) -> Result<CanvasIndex, DecoderError> {
        Ok(self.held_frame(DecoderRequest::Canvas0Addr)?.canvas)
    }

    fn ge2d_format(&mut self) -> Result<u32, DecoderError> {
        Ok(self.held_frame(DecoderRequest::Ge2dFormat)?.format.0)
    }

    fn frame_size(&mut self) -> Result<u64, DecoderError> {
        let size = self.held_frame(DecoderRequest::FrameSize)?.size;
        Ok((u64::from(size.x) << 32) | u64::from(size.y))
    }

    fn put_current_frame(&mut self) -> Result<(), DecoderError> {
        assert!(self.current.is_some(), "put back a frame that isn't held");
        self.current = None;
        self.record(DecoderRequest::PutCurrentFrame)
    }
}
