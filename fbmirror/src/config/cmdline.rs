//! Command-line argument parsing
use structopt::StructOpt;

/// Mirrors the primary display's OSD and the decoded video onto a secondary
/// display.
#[derive(StructOpt, Debug)]
#[structopt(name = "fbmirror")]
pub struct Opt {
    /// Force the aspect ratio of the mirrored image, given as `A:B` or a
    /// decimal number. Derived from the primary display's resolution by
    /// default.
    #[structopt(short = "a", long = "aspect")]
    pub aspect: Option<String>,

    /// The primary (OSD) framebuffer device.
    #[structopt(long = "primary", default_value = "/dev/fb0")]
    pub primary: String,

    /// The secondary framebuffer device.
    #[structopt(long = "secondary", default_value = "/dev/fb2")]
    pub secondary: String,

    /// The blit engine device.
    #[structopt(long = "ge2d", default_value = "/dev/ge2d")]
    pub ge2d: String,

    /// The contiguous memory allocator device.
    #[structopt(long = "ion", default_value = "/dev/ion")]
    pub ion: String,

    /// The video decoder's frame source device.
    #[structopt(long = "video", default_value = "/dev/amvideo")]
    pub video: String,

    /// Compose a new frame on every Nth vertical refresh.
    #[structopt(short = "n", long = "compose-every", default_value = "2")]
    pub compose_every: u32,

    /// Don't show the video layer.
    #[structopt(long = "no-video")]
    pub no_video: bool,

    /// Copy the OSD instead of blending it over the video layer.
    #[structopt(long = "no-osd-blend")]
    pub no_osd_blend: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opt = Opt::from_iter_safe(&["fbmirror"]).unwrap();
        assert_eq!(opt.aspect, None);
        assert_eq!(opt.primary, "/dev/fb0");
        assert_eq!(opt.secondary, "/dev/fb2");
        assert_eq!(opt.ge2d, "/dev/ge2d");
        assert_eq!(opt.ion, "/dev/ion");
        assert_eq!(opt.video, "/dev/amvideo");
        assert_eq!(opt.compose_every, 2);
        assert!(!opt.no_video);
        assert!(!opt.no_osd_blend);
    }

    #[test]
    fn overrides() {
        let opt = Opt::from_iter_safe(&[
            "fbmirror",
            "-a",
            "4:3",
            "--secondary",
            "/dev/fb1",
            "-n",
            "5",
            "--no-video",
        ])
        .unwrap();
        assert_eq!(opt.aspect.as_deref(), Some("4:3"));
        assert_eq!(opt.secondary, "/dev/fb1");
        assert_eq!(opt.compose_every, 5);
        assert!(opt.no_video);
        assert!(!opt.no_osd_blend);
    }
}
