use displaydoc::Display;
use fbmirror_pal::{ge2d::UnsupportedDepth, DecoderError, DisplayError, EngineError, ResourceOpenError};
use std::{error::Error as StdError, io};

/// A fatal error. Whatever raises it, the process exits.
#[derive(Debug, Display)]
pub enum Error {
    /// {0}
    ResourceOpen(ResourceOpenError),
    /// configuration error: {0}
    Configuration(ConfigError),
    /// {0}
    Engine(EngineError),
    /// {0}
    Decoder(DecoderError),
    /// {0}
    Display(DisplayError),
    /// could not install a signal handler: {0}
    Signal(io::Error),
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::ResourceOpen(e) => Some(e),
            Error::Configuration(e) => Some(e),
            Error::Engine(e) => Some(e),
            Error::Decoder(e) => Some(e),
            Error::Display(e) => Some(e),
            Error::Signal(e) => Some(e),
        }
    }
}

impl From<ResourceOpenError> for Error {
    fn from(x: ResourceOpenError) -> Self {
        Error::ResourceOpen(x)
    }
}

impl From<ConfigError> for Error {
    fn from(x: ConfigError) -> Self {
        Error::Configuration(x)
    }
}

impl From<EngineError> for Error {
    fn from(x: EngineError) -> Self {
        Error::Engine(x)
    }
}

impl From<DecoderError> for Error {
    fn from(x: DecoderError) -> Self {
        Error::Decoder(x)
    }
}

impl From<DisplayError> for Error {
    fn from(x: DisplayError) -> Self {
        Error::Display(x)
    }
}

/// An invalid configuration detected at startup.
#[derive(Debug, Display, Clone, PartialEq)]
pub enum ConfigError {
    /// invalid aspect ratio '{0}' (expected `A:B` or a positive decimal number)
    BadAspect(String),
    /// the compose interval must be at least 1
    ZeroComposeInterval,
    /// {0}
    UnsupportedDepth(UnsupportedDepth),
    /// the secondary display must have 16 bits per pixel, but it has {0}
    SecondaryDepth(u32),
    /// the scratch buffer has {len} bytes, but the video layer needs {required}
    ScratchTooSmall { len: usize, required: usize },
}

impl StdError for ConfigError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ConfigError::UnsupportedDepth(e) => Some(e),
            _ => None,
        }
    }
}

impl From<UnsupportedDepth> for ConfigError {
    fn from(x: UnsupportedDepth) -> Self {
        ConfigError::UnsupportedDepth(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failed_request() {
        let e = Error::from(EngineError {
            request: "GE2D_BLEND",
            source: io::Error::from_raw_os_error(22),
        });
        assert!(e.to_string().starts_with("blit engine request GE2D_BLEND failed: "));

        let e = Error::from(ConfigError::from(UnsupportedDepth(8)));
        assert_eq!(
            e.to_string(),
            "configuration error: unsupported source pixel depth: 8 bits per pixel"
        );
    }
}
