//! The video decoder's frame source (`/dev/amvideo`)
use log::trace;
use std::{fs::File, io, mem::size_of, os::raw::c_ulong};

use super::{
    ioctl::{io, ior, ioctl},
    open_rw,
};
use crate::{
    blit::CanvasIndex,
    iface::{DecoderError, ResourceOpenError, VideoDecoder},
};

const AMSTREAM_IOC_MAGIC: u8 = b'S';
const GET_CURRENT_VIDEOFRAME: u32 = ior(AMSTREAM_IOC_MAGIC, 0x60, size_of::<c_ulong>());
const PUT_CURRENT_VIDEOFRAME: u32 = io(AMSTREAM_IOC_MAGIC, 0x61);
const GET_CURRENT_VIDEOFRAME_GE2D_FORMAT: u32 =
    ior(AMSTREAM_IOC_MAGIC, 0x62, size_of::<c_ulong>());
const GET_CURRENT_VIDEOFRAME_SIZE: u32 = ior(AMSTREAM_IOC_MAGIC, 0x63, size_of::<u64>());
const GET_CURRENT_VIDEOFRAME_CANVAS0ADDR: u32 =
    ior(AMSTREAM_IOC_MAGIC, 0x64, size_of::<c_ulong>());

/// Check if a failed `AMVIDEO_EXT_GET_CURRENT_VIDEOFRAME` means no frame is
/// on display rather than a broken device.
///
/// The driver fails with `EFAULT` while the video layer is empty and with
/// `EAGAIN` while it's switching frames. Anything else (e.g., `ENOTTY` from a
/// node that isn't amvideo) is an error.
fn is_not_ready(e: &io::Error) -> bool {
    match e.raw_os_error() {
        Some(libc::EFAULT) | Some(libc::EAGAIN) => true,
        _ => false,
    }
}

#[derive(Debug)]
pub struct AmVideo {
    file: File,
}

impl AmVideo {
    pub fn open(path: &str) -> Result<Self, ResourceOpenError> {
        Ok(Self {
            file: open_rw("video decoder", path)?,
        })
    }

    fn query<T: Default>(&self, request: u32, name: &'static str) -> Result<T, DecoderError> {
        let mut out = T::default();
        unsafe { ioctl(&self.file, request, &mut out) }
            .map(|_| out)
            .map_err(|source| DecoderError {
                request: name,
                source,
            })
    }
}

impl VideoDecoder for AmVideo {
    fn get_current_frame(&mut self) -> Result<bool, DecoderError> {
        let mut handle: c_ulong = 0;
        match unsafe { ioctl(&self.file, GET_CURRENT_VIDEOFRAME, &mut handle) } {
            Ok(_) => Ok(true),
            Err(e) if is_not_ready(&e) => {
                trace!("AMVIDEO_EXT_GET_CURRENT_VIDEOFRAME: {}", e);
                Ok(false)
            }
            Err(source) => Err(DecoderError {
                request: "AMVIDEO_EXT_GET_CURRENT_VIDEOFRAME",
                source,
            }),
        }
    }

    fn canvas0_addr(&mut self) -> Result<CanvasIndex, DecoderError> {
        self.query::<c_ulong>(
            GET_CURRENT_VIDEOFRAME_CANVAS0ADDR,
            "AMVIDEO_EXT_CURRENT_VIDEOFRAME_GET_CANVAS0ADDR",
        )
        .map(|x| x as CanvasIndex)
    }

    fn ge2d_format(&mut self) -> Result<u32, DecoderError> {
        self.query::<c_ulong>(
            GET_CURRENT_VIDEOFRAME_GE2D_FORMAT,
            "AMVIDEO_EXT_CURRENT_VIDEOFRAME_GET_GE2D_FORMAT",
        )
        .map(|x| x as u32)
    }

    fn frame_size(&mut self) -> Result<u64, DecoderError> {
        self.query::<u64>(
            GET_CURRENT_VIDEOFRAME_SIZE,
            "AMVIDEO_EXT_CURRENT_VIDEOFRAME_GET_SIZE",
        )
    }

    fn put_current_frame(&mut self) -> Result<(), DecoderError> {
        unsafe { ioctl(&self.file, PUT_CURRENT_VIDEOFRAME, std::ptr::null_mut::<u8>()) }
            .map(drop)
            .map_err(|source| DecoderError {
                request: "AMVIDEO_EXT_PUT_CURRENT_VIDEOFRAME",
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_video_layer_is_not_ready() {
        for &errno in &[libc::EFAULT, libc::EAGAIN] {
            assert!(is_not_ready(&io::Error::from_raw_os_error(errno)), "{}", errno);
        }
    }

    #[test]
    fn other_failures_are_errors() {
        for &errno in &[libc::ENOTTY, libc::EBADF, libc::EINVAL, libc::EIO, libc::ENODEV] {
            assert!(!is_not_ready(&io::Error::from_raw_os_error(errno)), "{}", errno);
        }
        assert!(!is_not_ready(&io::Error::new(io::ErrorKind::Other, "no errno")));
    }
}
