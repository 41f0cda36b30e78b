//! Physically contiguous buffers from the (legacy) ION allocator.
use log::debug;
use memmap2::{MmapMut, MmapOptions};
use std::{
    fs::File,
    io,
    mem::size_of,
    os::{
        raw::{c_int, c_uint, c_ulong},
        unix::io::FromRawFd,
    },
    rc::Rc,
};

use super::{
    ioctl::{ioctl, iowr},
    open_rw,
};
use crate::{
    blit::PhysAddr,
    iface::{AllocationError, ContigBuffer, ResourceOpenError},
};

type IonUserHandle = c_int;

/// `struct ion_allocation_data`
#[repr(C)]
#[derive(Debug, Default)]
struct IonAllocationData {
    len: usize,
    align: usize,
    heap_id_mask: c_uint,
    flags: c_uint,
    handle: IonUserHandle,
}

/// `struct ion_fd_data`
#[repr(C)]
#[derive(Debug, Default)]
struct IonFdData {
    handle: IonUserHandle,
    fd: c_int,
}

/// `struct ion_handle_data`
#[repr(C)]
#[derive(Debug, Default)]
struct IonHandleData {
    handle: IonUserHandle,
}

/// `struct ion_custom_data`
#[repr(C)]
#[derive(Debug, Default)]
struct IonCustomData {
    cmd: c_uint,
    arg: c_ulong,
}

/// `struct meson_phys_data`
#[repr(C)]
#[derive(Debug, Default)]
struct MesonPhysData {
    handle: IonUserHandle,
    phys_addr: c_uint,
    size: c_uint,
}

const ION_IOC_MAGIC: u8 = b'I';
const ION_IOC_ALLOC: u32 = iowr(ION_IOC_MAGIC, 0, size_of::<IonAllocationData>());
const ION_IOC_FREE: u32 = iowr(ION_IOC_MAGIC, 1, size_of::<IonHandleData>());
const ION_IOC_MAP: u32 = iowr(ION_IOC_MAGIC, 2, size_of::<IonFdData>());
const ION_IOC_CUSTOM: u32 = iowr(ION_IOC_MAGIC, 6, size_of::<IonCustomData>());

const ION_IOC_MESON_PHYS_ADDR: c_uint = 8;

/// `1 << ION_HEAP_TYPE_CARVEOUT`
const ION_HEAP_CARVEOUT_MASK: c_uint = 1 << 2;

const PAGE_SIZE: usize = 4096;

/// An open ION device.
#[derive(Debug, Clone)]
pub struct IonDevice {
    path: String,
    file: Rc<File>,
}

impl IonDevice {
    pub fn open(path: &str) -> Result<Self, ResourceOpenError> {
        Ok(Self {
            path: path.to_owned(),
            file: Rc::new(open_rw("ION allocator", path)?),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Allocate a buffer of at least `len` bytes from the carveout heap and
    /// map it for CPU access.
    pub fn allocate(&self, len: usize) -> Result<IonBuffer, AllocationError> {
        let alloc_err = |source| AllocationError { len, source };

        let mut alloc = IonAllocationData {
            len,
            align: PAGE_SIZE,
            heap_id_mask: ION_HEAP_CARVEOUT_MASK,
            ..Default::default()
        };
        unsafe { ioctl(&*self.file, ION_IOC_ALLOC, &mut alloc) }.map_err(alloc_err)?;

        // From now on, `handle` is freed by `IonBuffer::drop` or `free_handle`
        let handle = alloc.handle;

        let result = (|| {
            let mut fd_data = IonFdData {
                handle,
                ..Default::default()
            };
            unsafe { ioctl(&*self.file, ION_IOC_MAP, &mut fd_data) }?;
            let fd = unsafe { File::from_raw_fd(fd_data.fd) };

            let mut phys = MesonPhysData {
                handle,
                ..Default::default()
            };
            let mut custom = IonCustomData {
                cmd: ION_IOC_MESON_PHYS_ADDR,
                arg: &mut phys as *mut MesonPhysData as c_ulong,
            };
            unsafe { ioctl(&*self.file, ION_IOC_CUSTOM, &mut custom) }?;

            let map = unsafe { MmapOptions::new().len(len).map_mut(&fd) }?;

            Ok::<_, io::Error>((fd, PhysAddr::from(phys.phys_addr), map))
        })();

        let (fd, phys_addr, map) = match result {
            Ok(x) => x,
            Err(e) => {
                free_handle(&self.file, handle);
                return Err(alloc_err(e));
            }
        };

        debug!(
            "Allocated {} bytes of contiguous memory at {:#x}",
            len, phys_addr
        );

        Ok(IonBuffer {
            device: Rc::clone(&self.file),
            handle,
            _fd: fd,
            phys_addr,
            len,
            map,
        })
    }
}

fn free_handle(device: &File, handle: IonUserHandle) {
    let mut data = IonHandleData { handle };
    if let Err(e) = unsafe { ioctl(device, ION_IOC_FREE, &mut data) } {
        log::warn!("ION_IOC_FREE failed: {}", e);
    }
}

/// A mapped ION buffer. It's freed when dropped.
#[derive(Debug)]
pub struct IonBuffer {
    device: Rc<File>,
    handle: IonUserHandle,
    _fd: File,
    phys_addr: PhysAddr,
    len: usize,
    map: MmapMut,
}

impl ContigBuffer for IonBuffer {
    fn len(&self) -> usize {
        self.len
    }

    fn phys_addr(&self) -> PhysAddr {
        self.phys_addr
    }

    fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.map[..]
    }
}

impl Drop for IonBuffer {
    fn drop(&mut self) {
        // `map` and `_fd` are dropped after this
        free_handle(&self.device, self.handle);
    }
}
