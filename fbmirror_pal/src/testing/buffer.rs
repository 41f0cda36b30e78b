use crate::{blit::PhysAddr, iface::ContigBuffer};

/// A heap buffer pretending to be physically contiguous at a fixed address.
#[derive(Debug, Clone)]
pub struct FakeBuffer {
    phys_addr: PhysAddr,
    data: Vec<u8>,
}

impl FakeBuffer {
    pub fn new(phys_addr: PhysAddr, len: usize) -> Self {
        Self {
            phys_addr,
            data: vec![0; len],
        }
    }
}

impl ContigBuffer for FakeBuffer {
    fn len(&self) -> usize {
        self.data.len()
    }

    fn phys_addr(&self) -> PhysAddr {
        self.phys_addr
    }

    fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }
}
