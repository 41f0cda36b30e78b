//! Request number encoding (`asm-generic/ioctl.h`) and a checked wrapper of
//! `ioctl(2)`.
use std::{
    io,
    os::{raw::c_int, unix::io::AsRawFd},
};

const NRSHIFT: u32 = 0;
const TYPESHIFT: u32 = 8;
const SIZESHIFT: u32 = 16;
const DIRSHIFT: u32 = 30;

const NONE: u32 = 0;
const WRITE: u32 = 1;
const READ: u32 = 2;

const fn ioc(dir: u32, ty: u8, nr: u8, size: usize) -> u32 {
    (dir << DIRSHIFT)
        | ((ty as u32) << TYPESHIFT)
        | ((nr as u32) << NRSHIFT)
        | ((size as u32) << SIZESHIFT)
}

/// `_IO`
pub const fn io(ty: u8, nr: u8) -> u32 {
    ioc(NONE, ty, nr, 0)
}

/// `_IOR`
pub const fn ior(ty: u8, nr: u8, size: usize) -> u32 {
    ioc(READ, ty, nr, size)
}

/// `_IOW`
pub const fn iow(ty: u8, nr: u8, size: usize) -> u32 {
    ioc(WRITE, ty, nr, size)
}

/// `_IOWR`
pub const fn iowr(ty: u8, nr: u8, size: usize) -> u32 {
    ioc(READ | WRITE, ty, nr, size)
}

/// Issue a control request. A negative result is converted to the calling
/// thread's `errno`.
///
/// # Safety
///
/// `arg` must point to whatever `request` expects.
pub unsafe fn ioctl<T>(fd: &impl AsRawFd, request: u32, arg: *mut T) -> io::Result<c_int> {
    let ret = libc::ioctl(fd.as_raw_fd(), request as _, arg);
    if ret < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(ret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    #[test]
    fn encodes_like_the_kernel() {
        // FBIO_WAITFORVSYNC
        assert_eq!(iow(b'F', 0x20, size_of::<u32>()), 0x4004_4620);
        // ION_IOC_FREE
        assert_eq!(iowr(b'I', 1, 4), 0xc004_4901);
        assert_eq!(io(b'S', 0x61), 0x5361);
        assert_eq!(ior(b'S', 0x63, 8), 0x8008_5363);
    }
}
