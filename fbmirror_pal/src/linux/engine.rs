//! The GE2D blit engine (`/dev/ge2d`)
use log::trace;
use std::fs::File;

use super::{ioctl::ioctl, open_rw};
use crate::{
    ge2d::{self, Command, ConfigParaEx, Ge2dPara},
    iface::{BlitEngine, EngineError, ResourceOpenError},
};

#[derive(Debug)]
pub struct Ge2d {
    file: File,
}

impl Ge2d {
    pub fn open(path: &str) -> Result<Self, ResourceOpenError> {
        Ok(Self {
            file: open_rw("blit engine", path)?,
        })
    }
}

impl BlitEngine for Ge2d {
    fn configure(&mut self, config: &ConfigParaEx) -> Result<(), EngineError> {
        // The driver doesn't write back through the pointer
        let mut config = *config;
        unsafe { ioctl(&self.file, ge2d::CONFIG_EX, &mut config) }
            .map(drop)
            .map_err(|source| EngineError {
                request: "GE2D_CONFIG_EX",
                source,
            })
    }

    fn execute(&mut self, command: Command, para: &Ge2dPara) -> Result<(), EngineError> {
        trace!("{}: {:?}", command.name(), para);

        let mut para = *para;
        unsafe { ioctl(&self.file, command as u32, &mut para) }
            .map(drop)
            .map_err(|source| EngineError {
                request: command.name(),
                source,
            })
    }
}
