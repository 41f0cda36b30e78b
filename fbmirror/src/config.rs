//! The program configuration
use bitflags::bitflags;
use cgmath::Vector2;
use log::info;
use std::num::NonZeroU32;

use crate::error::ConfigError;

mod aspect;
mod cmdline;

pub use self::{aspect::parse_aspect, cmdline::Opt};

/// Where the target aspect ratio comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AspectSource {
    /// Use the primary display's aspect ratio.
    Derived,
    Forced(f64),
}

impl AspectSource {
    pub fn resolve(self, primary_size: Vector2<u32>) -> f64 {
        match self {
            AspectSource::Derived => fitgeom::aspect_of(primary_size),
            AspectSource::Forced(x) => x,
        }
    }
}

bitflags! {
    /// The optional parts of the compositing pipeline.
    pub struct Capabilities: u8 {
        /// Put the decoded video under the OSD.
        const VIDEO_LAYER = 1;
        /// Blend the OSD over the video layer. When unset, the OSD is copied.
        const OSD_BLEND = 1 << 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    pub aspect: AspectSource,
    pub capabilities: Capabilities,
    /// Compose on every Nth tick.
    pub compose_every: NonZeroU32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            aspect: AspectSource::Derived,
            capabilities: Capabilities::all(),
            compose_every: NonZeroU32::new(2).unwrap(),
        }
    }
}

impl Config {
    pub fn from_opt(opt: &Opt) -> Result<Self, ConfigError> {
        let aspect = match &opt.aspect {
            Some(s) => AspectSource::Forced(parse_aspect(s)?),
            None => AspectSource::Derived,
        };

        let mut capabilities = Capabilities::all();
        capabilities.set(Capabilities::VIDEO_LAYER, !opt.no_video);
        capabilities.set(Capabilities::OSD_BLEND, !opt.no_osd_blend);

        let compose_every =
            NonZeroU32::new(opt.compose_every).ok_or(ConfigError::ZeroComposeInterval)?;

        let this = Self {
            aspect,
            capabilities,
            compose_every,
        };
        info!("{:?}", this);
        Ok(this)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use structopt::StructOpt;

    fn config(args: &[&str]) -> Result<Config, ConfigError> {
        let opt = Opt::from_iter_safe(std::iter::once("fbmirror").chain(args.iter().cloned()))
            .unwrap();
        Config::from_opt(&opt)
    }

    #[test]
    fn default_options() {
        assert_eq!(config(&[]), Ok(Config::default()));
    }

    #[test]
    fn forced_aspect() {
        let c = config(&["--aspect", "4:3"]).unwrap();
        assert_eq!(c.aspect, AspectSource::Forced(4.0 / 3.0));
        assert_eq!(c.aspect.resolve(cgmath::vec2(1920, 1080)), 4.0 / 3.0);
    }

    #[test]
    fn derived_aspect() {
        let c = config(&[]).unwrap();
        assert_eq!(c.aspect.resolve(cgmath::vec2(1920, 1080)), 1920.0 / 1080.0);
    }

    #[test]
    fn capability_flags() {
        let c = config(&["--no-video"]).unwrap();
        assert_eq!(c.capabilities, Capabilities::OSD_BLEND);

        let c = config(&["--no-osd-blend"]).unwrap();
        assert_eq!(c.capabilities, Capabilities::VIDEO_LAYER);

        let c = config(&["--no-osd-blend", "--no-video"]).unwrap();
        assert!(c.capabilities.is_empty());
    }

    #[test]
    fn invalid_options() {
        assert_eq!(
            config(&["-a", "16/9"]),
            Err(ConfigError::BadAspect("16/9".to_owned()))
        );
        assert_eq!(
            config(&["--compose-every", "0"]),
            Err(ConfigError::ZeroComposeInterval)
        );
    }
}
