//! The vsync-driven compositing loop.
//!
//! Every tick ends at a vertical refresh of the primary display. On a
//! composite tick, the loop draws the current video frame (if any) and the
//! OSD into the secondary display's buffer before the refresh, and presents
//! the buffer after it. Other ticks only wait for the refresh.
use cgmath::Vector2;
use fbmirror_pal::{
    blit::SurfaceMemory, prelude::*, BlendFactors, BlitRequest, EngineError, FrameSource, Layer,
    PixelFormat, Surface, VideoFrame,
};
use fitgeom::{fit_rect, Rect};
use log::{debug, info, trace};
use std::{
    num::NonZeroU32,
    sync::atomic::{AtomicBool, Ordering},
};

use crate::{
    config::{Capabilities, Config},
    error::{ConfigError, Error},
};


/// The fill color of the letterbox area (`0xRRGGBBAA`).
const BLACK: u32 = 0x0000_00ff;

/// The devices the compositor drives.
pub struct Devices<B: Backend> {
    pub primary: B::Primary,
    pub secondary: B::Secondary,
    pub engine: B::Engine,
    /// The video decoder and a scratch buffer of at least
    /// [`scratch_len`]`(primary.size())` bytes. Required by
    /// `Capabilities::VIDEO_LAYER`.
    pub video: Option<(B::Decoder, B::Buffer)>,
}

/// Get the size of the scratch buffer the video layer is drawn into.
pub fn scratch_len(primary_size: Vector2<u32>) -> usize {
    primary_size.x as usize * primary_size.y as usize * 2
}

/// What a tick does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    WaitOnly,
    Composite,
}

/// Chooses the phase of each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickPolicy {
    compose_every: NonZeroU32,
}

impl TickPolicy {
    pub fn new(compose_every: NonZeroU32) -> Self {
        Self { compose_every }
    }

    /// Get the phase of the `tick`-th tick. The first tick composes.
    pub fn phase(&self, tick: u64) -> Phase {
        if tick % u64::from(self.compose_every.get()) == 0 {
            Phase::Composite
        } else {
            Phase::WaitOnly
        }
    }
}

struct VideoLayer<B: Backend> {
    source: FrameSource<B::Decoder>,
    /// Keeps the memory `scratch` refers to alive.
    _buffer: B::Buffer,
    /// A primary-sized surface the video frame is scaled into.
    scratch: Surface,
    /// The video's placement in `scratch` as of the last composited frame.
    rect: Option<Rect>,
}

impl<B: Backend> VideoLayer<B> {
    /// Scale `frame` into `rect` of the scratch surface.
    fn scale(
        &mut self,
        engine: &mut B::Engine,
        frame: &VideoFrame,
        rect: Rect,
    ) -> Result<(), EngineError> {
        if self.rect != Some(rect) {
            debug!("The video layer moved to {:?}", rect);
            // Erase the previous placement
            engine.blit(&BlitRequest::Fill {
                dst: Layer::whole(self.scratch.clone()),
                color: BLACK,
            })?;
            self.rect = Some(rect);
        }

        engine.blit(&BlitRequest::Copy {
            src: Layer::whole(frame.surface()),
            dst: Layer::new(self.scratch.clone(), rect),
        })
    }
}

pub struct Compositor<B: Backend> {
    primary: B::Primary,
    secondary: B::Secondary,
    engine: B::Engine,
    video: Option<VideoLayer<B>>,
    capabilities: Capabilities,
    policy: TickPolicy,
    tick: u64,
    target_aspect: f64,
    /// The placement of the mirrored image on the secondary display.
    osd_rect: Rect,
    osd_surface: Surface,
    secondary_surface: Surface,
}

impl<B: Backend> Compositor<B> {
    /// Validate the devices and prepare the secondary display.
    pub fn new(devices: Devices<B>, config: &Config) -> Result<Self, Error> {
        let Devices {
            primary,
            mut secondary,
            engine,
            video,
        } = devices;

        let primary_size = primary.size();
        let primary_format = PixelFormat::from_bits_per_pixel(primary.bits_per_pixel())
            .map_err(ConfigError::from)?;

        if secondary.bits_per_pixel() != 16 {
            return Err(ConfigError::SecondaryDepth(secondary.bits_per_pixel()).into());
        }
        let secondary_size = secondary.size();

        let target_aspect = config.aspect.resolve(primary_size);
        let osd_rect = fit_rect(
            secondary_size,
            fitgeom::aspect_of(secondary_size),
            target_aspect,
        );
        info!("Target aspect ratio: {}", target_aspect);
        info!(
            "The OSD ({}x{}, {:?}) is mirrored to {:?} of the secondary display ({}x{})",
            primary_size.x,
            primary_size.y,
            primary_format,
            osd_rect,
            secondary_size.x,
            secondary_size.y
        );

        let mut capabilities = config.capabilities;
        let video = match video {
            Some((decoder, buffer)) if capabilities.contains(Capabilities::VIDEO_LAYER) => {
                let required = scratch_len(primary_size);
                if buffer.len() < required {
                    return Err(ConfigError::ScratchTooSmall {
                        len: buffer.len(),
                        required,
                    }
                    .into());
                }
                let scratch = Surface::single_plane(
                    SurfaceMemory::Scratch,
                    PixelFormat::RGB565,
                    buffer.phys_addr(),
                    primary_size,
                );
                debug!("Scratch surface: {:?}", scratch);
                Some(VideoLayer {
                    source: FrameSource::new(decoder),
                    _buffer: buffer,
                    scratch,
                    rect: None,
                })
            }
            _ => None,
        };
        if video.is_none() {
            capabilities.remove(Capabilities::VIDEO_LAYER);
        }
        info!("Capabilities: {:?}", capabilities);

        let osd_surface = Surface::osd(primary.osd_canvas(), primary_format, primary_size);
        let secondary_surface = Surface::single_plane(
            SurfaceMemory::External,
            PixelFormat::RGB565,
            secondary.buffer_address(),
            secondary_size,
        );

        secondary.clear();

        Ok(Self {
            primary,
            secondary,
            engine,
            video,
            capabilities,
            policy: TickPolicy::new(config.compose_every),
            tick: 0,
            target_aspect,
            osd_rect,
            osd_surface,
            secondary_surface,
        })
    }

    /// Run ticks until `shutdown` is raised. The secondary display is blanked
    /// on return.
    pub fn run(&mut self, shutdown: &AtomicBool) -> Result<(), Error> {
        info!("Entering the compositing loop");
        while !shutdown.load(Ordering::Relaxed) {
            self.tick()?;
        }
        info!("Shutting down after {} ticks", self.tick);
        self.blank()
    }

    /// Run a single tick.
    pub fn tick(&mut self) -> Result<Phase, Error> {
        let phase = self.policy.phase(self.tick);
        self.tick = self.tick.wrapping_add(1);

        match phase {
            Phase::WaitOnly => {
                self.primary.wait_for_vsync()?;
            }
            Phase::Composite => {
                self.composite()?;

                // The engine has latched the descriptors by the refresh
                self.primary.wait_for_vsync()?;
                self.secondary.commit()?;
            }
        }

        Ok(phase)
    }

    fn composite(&mut self) -> Result<(), Error> {
        if self.primary.is_transparency_enabled()? {
            trace!("The OSD is transparent; showing it without the video layer");
            return self.composite_osd(false);
        }

        if self.video.is_some() {
            self.composite_video()?;
        }

        let blend = self
            .capabilities
            .contains(Capabilities::VIDEO_LAYER | Capabilities::OSD_BLEND);
        self.composite_osd(blend)
    }

    /// Draw the decoder's current frame into `osd_rect` of the secondary
    /// display. Does nothing if no frame is ready.
    fn composite_video(&mut self) -> Result<(), Error> {
        let Self {
            engine,
            video,
            target_aspect,
            osd_rect,
            secondary_surface,
            ..
        } = self;

        let video = match video {
            Some(video) => video,
            None => return Ok(()),
        };

        let frame = match video.source.try_acquire()? {
            Some(frame) => frame,
            None => return Ok(()),
        };

        let rect = fit_rect(video.scratch.size, *target_aspect, frame.aspect());
        let scaled = video.scale(engine, &frame, rect);

        // The descriptors referring to the frame are submitted (or the
        // submission failed), so the frame can be returned
        let released = video.source.release(frame);
        scaled?;
        released?;

        engine.blit(&BlitRequest::Copy {
            src: Layer::whole(video.scratch.clone()),
            dst: Layer::new(secondary_surface.clone(), *osd_rect),
        })?;

        Ok(())
    }

    /// Blend (or copy) the OSD into `osd_rect` of the secondary display.
    fn composite_osd(&mut self, blend: bool) -> Result<(), Error> {
        let src = Layer::whole(self.osd_surface.clone());
        let dst = Layer::new(self.secondary_surface.clone(), self.osd_rect);

        let request = if blend {
            BlitRequest::Blend {
                src,
                src2: dst.clone(),
                dst,
                factors: BlendFactors::SOURCE_OVER,
            }
        } else {
            BlitRequest::Copy { src, dst }
        };

        self.engine.blit(&request)?;
        Ok(())
    }

    fn blank(&mut self) -> Result<(), Error> {
        self.secondary.clear();
        self.secondary.commit()?;
        Ok(())
    }
}
