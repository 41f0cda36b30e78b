//! Framebuffer devices
use cgmath::Vector2;
use log::{debug, info};
use memmap2::{MmapMut, MmapOptions};
use std::{
    fs::File,
    io,
    mem::size_of,
    os::raw::c_ulong,
};

use super::{
    ioctl::{ioctl, iow},
    ion::{IonBuffer, IonDevice},
    open_rw,
};
use crate::{
    blit::{OsdCanvas, PhysAddr},
    iface::{ContigBuffer, DisplayError, PrimaryDisplay, ResourceOpenError, SecondaryDisplay},
};

const FBIOGET_VSCREENINFO: u32 = 0x4600;
const FBIOGET_FSCREENINFO: u32 = 0x4602;
const FBIOPAN_DISPLAY: u32 = 0x4606;
const FBIO_WAITFORVSYNC: u32 = iow(b'F', 0x20, size_of::<u32>());
/// Amlogic OSD extension: get the OSD's global alpha
const FBIOGET_OSD_GET_GBL_ALPHA: u32 = 0x4501;

/// `struct fb_bitfield`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
struct FbBitfield {
    offset: u32,
    length: u32,
    msb_right: u32,
}

/// `struct fb_var_screeninfo`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
struct FbVarScreenInfo {
    xres: u32,
    yres: u32,
    xres_virtual: u32,
    yres_virtual: u32,
    xoffset: u32,
    yoffset: u32,
    bits_per_pixel: u32,
    grayscale: u32,
    red: FbBitfield,
    green: FbBitfield,
    blue: FbBitfield,
    transp: FbBitfield,
    nonstd: u32,
    activate: u32,
    height: u32,
    width: u32,
    accel_flags: u32,
    pixclock: u32,
    left_margin: u32,
    right_margin: u32,
    upper_margin: u32,
    lower_margin: u32,
    hsync_len: u32,
    vsync_len: u32,
    sync: u32,
    vmode: u32,
    rotate: u32,
    colorspace: u32,
    reserved: [u32; 4],
}

/// `struct fb_fix_screeninfo`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
struct FbFixScreenInfo {
    id: [u8; 16],
    smem_start: c_ulong,
    smem_len: u32,
    type_: u32,
    type_aux: u32,
    visual: u32,
    xpanstep: u16,
    ypanstep: u16,
    ywrapstep: u16,
    line_length: u32,
    mmio_start: c_ulong,
    mmio_len: u32,
    accel: u32,
    capabilities: u16,
    reserved: [u16; 2],
}

/// An open framebuffer device.
#[derive(Debug)]
pub struct FrameBuffer {
    path: String,
    file: File,
    var: FbVarScreenInfo,
    fix: FbFixScreenInfo,
    map: Option<MmapMut>,
}

impl FrameBuffer {
    pub fn open(path: &str) -> Result<Self, ResourceOpenError> {
        let file = open_rw("framebuffer", path)?;
        let open_err = |source| ResourceOpenError {
            what: "framebuffer",
            path: path.to_owned(),
            source,
        };

        let mut var = FbVarScreenInfo::default();
        let mut fix = FbFixScreenInfo::default();
        unsafe {
            ioctl(&file, FBIOGET_VSCREENINFO, &mut var).map_err(open_err)?;
            ioctl(&file, FBIOGET_FSCREENINFO, &mut fix).map_err(open_err)?;
        }

        let this = Self {
            path: path.to_owned(),
            file,
            var,
            fix,
            map: None,
        };

        info!(
            "{}: screen info - width={}, height={}, bpp={}",
            path, var.xres, var.yres, var.bits_per_pixel
        );
        debug!(
            "{}: line_length={}, smem_start={:#x}, smem_len={}, panstep={}x{}",
            path, fix.line_length, fix.smem_start, fix.smem_len, fix.xpanstep, fix.ypanstep
        );

        Ok(this)
    }

    pub fn size(&self) -> Vector2<u32> {
        Vector2::new(self.var.xres, self.var.yres)
    }

    pub fn bits_per_pixel(&self) -> u32 {
        self.var.bits_per_pixel
    }

    /// The number of bytes per scanline.
    pub fn stride(&self) -> usize {
        self.fix.line_length as usize
    }

    /// The length of the visible part of the framebuffer memory.
    pub fn len(&self) -> usize {
        self.stride() * self.var.yres as usize
    }

    /// Map the visible part of the framebuffer memory for CPU access. Does
    /// nothing if it's already mapped.
    pub fn map(&mut self) -> Result<(), ResourceOpenError> {
        if self.map.is_some() {
            return Ok(());
        }

        let len = self.len();
        let map = unsafe { MmapOptions::new().len(len).map_mut(&self.file) }.map_err(|source| {
            ResourceOpenError {
                what: "framebuffer memory",
                path: self.path.clone(),
                source,
            }
        })?;
        self.map = Some(map);

        Ok(())
    }

    /// Get the mapped memory. Returns `None` unless [`map`] was called.
    ///
    /// [`map`]: FrameBuffer::map
    pub fn mapped_memory(&mut self) -> Option<&mut [u8]> {
        self.map.as_mut().map(|map| &mut map[..])
    }

    pub fn wait_for_vsync(&self) -> Result<(), DisplayError> {
        let mut arg: u32 = 0;
        unsafe { ioctl(&self.file, FBIO_WAITFORVSYNC, &mut arg) }
            .map(drop)
            .map_err(|source| DisplayError {
                request: "FBIO_WAITFORVSYNC",
                source,
            })
    }

    /// Get the OSD's global alpha value (`0..=0xff`).
    pub fn global_alpha(&self) -> Result<u32, DisplayError> {
        let mut alpha: u32 = 0;
        unsafe { ioctl(&self.file, FBIOGET_OSD_GET_GBL_ALPHA, &mut alpha) }
            .map(|_| alpha)
            .map_err(|source| DisplayError {
                request: "FBIOGET_OSD_GET_GBL_ALPHA",
                source,
            })
    }

    /// Check if the driver implements `FBIOPAN_DISPLAY`.
    pub fn can_pan(&self) -> bool {
        supports_panning(&self.fix)
    }

    /// Ask the driver to present the current contents.
    pub fn pan_display(&mut self) -> Result<(), DisplayError> {
        let mut var = self.var;
        unsafe { ioctl(&self.file, FBIOPAN_DISPLAY, &mut var) }
            .map(drop)
            .map_err(|source| DisplayError {
                request: "FBIOPAN_DISPLAY",
                source,
            })
    }
}

/// Drivers without a `fb_pan_display` op (most SPI panels) report zero steps
/// and reject `FBIOPAN_DISPLAY`. They scan the mapped memory out by
/// themselves.
fn supports_panning(fix: &FbFixScreenInfo) -> bool {
    fix.xpanstep != 0 || fix.ypanstep != 0 || fix.ywrapstep != 0
}

/// The RGB565 value the secondary display is cleared to (black).
const CLEAR_PIXEL: u16 = 0x0000;

fn fill_rgb565(buf: &mut [u8], pixel: u16) {
    let bytes = pixel.to_ne_bytes();
    for px in buf.chunks_exact_mut(2) {
        px.copy_from_slice(&bytes);
    }
}

// ============================================================================

/// The primary display. Its OSD is read by the blit engine directly.
#[derive(Debug)]
pub struct PrimaryFb {
    fb: FrameBuffer,
    canvas: OsdCanvas,
}

impl PrimaryFb {
    pub fn open(path: &str, canvas: OsdCanvas) -> Result<Self, ResourceOpenError> {
        Ok(Self {
            fb: FrameBuffer::open(path)?,
            canvas,
        })
    }
}

impl PrimaryDisplay for PrimaryFb {
    fn size(&self) -> Vector2<u32> {
        self.fb.size()
    }

    fn bits_per_pixel(&self) -> u32 {
        self.fb.bits_per_pixel()
    }

    fn osd_canvas(&self) -> OsdCanvas {
        self.canvas
    }

    fn wait_for_vsync(&mut self) -> Result<(), DisplayError> {
        self.fb.wait_for_vsync()
    }

    /// The OSD is considered fully transparent when its global alpha is zero.
    fn is_transparency_enabled(&mut self) -> Result<bool, DisplayError> {
        Ok(self.fb.global_alpha()? == 0)
    }
}

// ============================================================================

/// The secondary display.
///
/// The panel's framebuffer memory can't be addressed by the blit engine, so
/// the engine writes into a contiguous staging buffer, which is copied to the
/// framebuffer on commit. The copy alone presents the frame unless the driver
/// supports panning, in which case it's followed by `FBIOPAN_DISPLAY`.
#[derive(Debug)]
pub struct SecondaryFb {
    fb: FrameBuffer,
    staging: IonBuffer,
}

impl SecondaryFb {
    pub fn open(path: &str, ion: &IonDevice) -> Result<Self, ResourceOpenError> {
        let mut fb = FrameBuffer::open(path)?;
        fb.map()?;

        let size = fb.size();
        let len = (size.x as usize) * (size.y as usize) * (fb.bits_per_pixel() as usize / 8);
        let staging = ion.allocate(len).map_err(|e| ResourceOpenError {
            what: "staging buffer",
            path: ion.path().to_owned(),
            source: e.source,
        })?;

        if !fb.can_pan() {
            info!("{}: the driver can't pan; presenting by copying only", path);
        }

        Ok(Self { fb, staging })
    }

    fn copy_to_fb(&mut self) -> Result<(), DisplayError> {
        let row_len = self.staging.len() / self.fb.size().y.max(1) as usize;
        let stride = self.fb.stride();
        let src = self.staging.as_mut_slice();
        let dst = self.fb.mapped_memory().ok_or_else(|| DisplayError {
            request: "mmap",
            source: io::Error::from(io::ErrorKind::NotConnected),
        })?;

        if stride == row_len {
            dst[..src.len()].copy_from_slice(src);
        } else {
            for (dst, src) in dst.chunks_mut(stride).zip(src.chunks(row_len)) {
                dst[..row_len].copy_from_slice(src);
            }
        }

        Ok(())
    }
}

impl SecondaryDisplay for SecondaryFb {
    fn size(&self) -> Vector2<u32> {
        self.fb.size()
    }

    fn bits_per_pixel(&self) -> u32 {
        self.fb.bits_per_pixel()
    }

    fn buffer_address(&self) -> PhysAddr {
        self.staging.phys_addr()
    }

    fn clear(&mut self) {
        fill_rgb565(self.staging.as_mut_slice(), CLEAR_PIXEL);
        if let Some(map) = self.fb.mapped_memory() {
            fill_rgb565(map, CLEAR_PIXEL);
        }
    }

    fn commit(&mut self) -> Result<(), DisplayError> {
        self.copy_to_fb()?;
        if self.fb.can_pan() {
            self.fb.pan_display()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panning_follows_the_advertised_steps() {
        let mut fix = FbFixScreenInfo::default();
        assert!(!supports_panning(&fix));

        fix.ypanstep = 1;
        assert!(supports_panning(&fix));

        fix.ypanstep = 0;
        fix.xpanstep = 1;
        assert!(supports_panning(&fix));

        fix.xpanstep = 0;
        fix.ywrapstep = 1;
        assert!(supports_panning(&fix));
    }

    #[test]
    fn fill_writes_every_pixel() {
        let mut buf = [0xaau8; 8];
        fill_rgb565(&mut buf, CLEAR_PIXEL);
        assert_eq!(buf, [0; 8]);

        fill_rgb565(&mut buf, 0xf800);
        let px = 0xf800u16.to_ne_bytes();
        assert_eq!(buf, [px[0], px[1], px[0], px[1], px[0], px[1], px[0], px[1]]);
    }
}
