use log::{debug, error, info};
use std::process::exit;
use structopt::StructOpt;

mod compositor;
mod config;
mod error;

use crate::{
    config::{Config, Opt},
    error::Error,
};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let opt = Opt::from_args();
    debug!("{:?}", opt);

    if let Err(e) = run(&opt) {
        error!("{}", e);
        eprintln!("fbmirror: {}", e);
        exit(1);
    }
}

#[cfg(target_os = "linux")]
fn run(opt: &Opt) -> Result<(), Error> {
    use fbmirror_pal::{
        native::{AmVideo, Backend, Ge2d, IonDevice, PrimaryFb, SecondaryFb},
        prelude::*,
        OsdCanvas,
    };
    use std::sync::{atomic::AtomicBool, Arc};

    use crate::{
        compositor::{scratch_len, Compositor, Devices},
        config::Capabilities,
    };

    let config = Config::from_opt(opt)?;

    let shutdown = Arc::new(AtomicBool::new(false));
    for &signal in &[signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM] {
        signal_hook::flag::register(signal, Arc::clone(&shutdown)).map_err(Error::Signal)?;
    }

    let ion = IonDevice::open(&opt.ion)?;
    let primary = PrimaryFb::open(&opt.primary, OsdCanvas::Osd0)?;
    let secondary = SecondaryFb::open(&opt.secondary, &ion)?;
    let engine = Ge2d::open(&opt.ge2d)?;

    let video = if config.capabilities.contains(Capabilities::VIDEO_LAYER) {
        let decoder = AmVideo::open(&opt.video)?;
        let len = scratch_len(primary.size());
        let scratch = ion.allocate(len).map_err(|e| fbmirror_pal::ResourceOpenError {
            what: "scratch buffer",
            path: ion.path().to_owned(),
            source: e.source,
        })?;
        Some((decoder, scratch))
    } else {
        None
    };

    let mut compositor: Compositor<Backend> = Compositor::new(
        Devices {
            primary,
            secondary,
            engine,
            video,
        },
        &config,
    )?;

    compositor.run(&shutdown)?;
    info!("Bye");
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn run(opt: &Opt) -> Result<(), Error> {
    // Validate the options anyway
    Config::from_opt(opt)?;
    error!("This program only runs on Linux");
    exit(1);
}
