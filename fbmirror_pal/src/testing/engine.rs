use super::{injected_failure, Event, Journal};
use crate::{
    ge2d::{Command, ConfigParaEx, Ge2dPara},
    iface::{BlitEngine, EngineError},
};

/// A blit engine recording the submitted descriptors.
#[derive(Debug)]
pub struct RecordingEngine {
    journal: Journal,
    fail_configure: bool,
    fail_on: Option<Command>,
}

impl RecordingEngine {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            fail_configure: false,
            fail_on: None,
        }
    }

    /// Make every subsequent configuration request fail.
    pub fn fail_configure(&mut self) {
        self.fail_configure = true;
    }

    /// Make every subsequent `command` request fail.
    pub fn fail_on(&mut self, command: Command) {
        self.fail_on = Some(command);
    }
}

impl BlitEngine for RecordingEngine {
    fn configure(&mut self, config: &ConfigParaEx) -> Result<(), EngineError> {
        if self.fail_configure {
            return Err(EngineError {
                request: "GE2D_CONFIG_EX",
                source: injected_failure(),
            });
        }
        self.journal.push(Event::Configure(*config));
        Ok(())
    }

    fn execute(&mut self, command: Command, para: &Ge2dPara) -> Result<(), EngineError> {
        if self.fail_on == Some(command) {
            return Err(EngineError {
                request: command.name(),
                source: injected_failure(),
            });
        }
        self.journal.push(Event::Execute(command, *para));
        Ok(())
    }
}
