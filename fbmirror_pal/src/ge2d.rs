//! Translates [`BlitRequest`]s into GE2D descriptors.
//!
//! The GE2D driver takes two requests per blit: `GE2D_CONFIG_EX` describes
//! the surfaces involved (memory kind, format, geometry, plane addresses) and
//! an operation request such as `GE2D_STRETCHBLIT_NOALPHA` carries the
//! rectangles and the blend parameters.
use fitgeom::Rect;
use std::os::raw::{c_int, c_ulong};

use crate::blit::{
    BlendFactor, BlendFactors, BlendMode, BlitRequest, Layer, OsdCanvas, Surface, SurfaceMemory,
};

mod desc;
mod format;

pub use self::desc::*;
pub use self::format::{ChromaLayout, PixelFormat, Subsampling, UnsupportedDepth};

/// The descriptors of a single blit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptors {
    pub config: ConfigParaEx,
    pub command: Command,
    pub para: Ge2dPara,
}

/// Build the descriptors for `request`.
///
/// Every rectangle in `request` must be covered by the surface it addresses.
pub fn build(request: &BlitRequest) -> Descriptors {
    let mut config = ConfigParaEx::default();
    let mut para = Ge2dPara::default();

    let command = match request {
        BlitRequest::Copy { src, dst } => {
            set_src(&mut config, &mut para, src);
            set_dst(&mut config, &mut para, dst);

            if src.rect.size() == dst.rect.size() {
                Command::BlitNoAlpha
            } else {
                Command::StretchBlitNoAlpha
            }
        }
        BlitRequest::Blend {
            src,
            src2,
            dst,
            factors,
        } => {
            set_src(&mut config, &mut para, src);
            set_src2(&mut config, &mut para, src2);
            set_dst(&mut config, &mut para, dst);
            para.op = encode_blend(factors) as c_int;

            Command::Blend
        }
        BlitRequest::Fill { dst, color } => {
            // The engine still reads the source configuration, so point it
            // at the destination
            set_src(&mut config, &mut para, dst);
            set_dst(&mut config, &mut para, dst);
            para.color = *color;

            Command::FillRectangle
        }
    };

    Descriptors {
        config,
        command,
        para,
    }
}

fn set_src(config: &mut ConfigParaEx, para: &mut Ge2dPara, layer: &Layer) {
    config.src_para = surface_para(&layer.surface, &layer.rect);
    set_planes(&mut config.src_planes, &layer.surface);
    para.src1_rect = rectangle(&layer.rect);
}

fn set_src2(config: &mut ConfigParaEx, para: &mut Ge2dPara, layer: &Layer) {
    config.src2_para = surface_para(&layer.surface, &layer.rect);
    set_planes(&mut config.src2_planes, &layer.surface);
    para.src2_rect = rectangle(&layer.rect);
}

fn set_dst(config: &mut ConfigParaEx, para: &mut Ge2dPara, layer: &Layer) {
    debug_assert_eq!(
        layer.surface.format,
        PixelFormat::RGB565,
        "the secondary display's native format is the only supported destination format"
    );
    config.dst_para = surface_para(&layer.surface, &layer.rect);
    set_planes(&mut config.dst_planes, &layer.surface);
    para.dst_rect = rectangle(&layer.rect);
}

fn surface_para(surface: &Surface, rect: &Rect) -> SrcDstParaEx {
    debug_assert!(
        surface.covers(rect),
        "{:?} does not cover {:?}",
        surface,
        rect
    );

    let (mem_type, canvas_index) = match surface.memory {
        SurfaceMemory::Osd(OsdCanvas::Osd0) => (CANVAS_OSD0, 0),
        SurfaceMemory::Osd(OsdCanvas::Osd1) => (CANVAS_OSD1, 0),
        // The engine uses `canvas_index` as is for this memory type
        SurfaceMemory::Canvas(index) => (CANVAS_TYPE_INVALID, index as c_int),
        SurfaceMemory::External | SurfaceMemory::Scratch => (CANVAS_ALLOC, 0),
    };

    SrcDstParaEx {
        canvas_index,
        mem_type,
        format: surface.format.0 as c_int,
        left: surface.origin.x,
        top: surface.origin.y,
        width: surface.size.x as c_int,
        height: surface.size.y as c_int,
        ..Default::default()
    }
}

fn set_planes(out: &mut [ConfigPlanes; 4], surface: &Surface) {
    if let SurfaceMemory::Canvas(_) = surface.memory {
        return;
    }
    for (out, plane) in out.iter_mut().zip(surface.planes.iter()) {
        *out = ConfigPlanes {
            addr: plane.addr as c_ulong,
            w: plane.width,
            h: plane.height,
        };
    }
}

fn rectangle(rect: &Rect) -> Rectangle {
    Rectangle {
        x: rect.x,
        y: rect.y,
        w: rect.width,
        h: rect.height,
    }
}

fn encode_blend(f: &BlendFactors) -> u32 {
    blendop(
        encode_mode(f.color_mode),
        encode_factor(f.color_src),
        encode_factor(f.color_dst),
        encode_mode(f.alpha_mode),
        encode_factor(f.alpha_src),
        encode_factor(f.alpha_dst),
    )
}

fn encode_mode(x: BlendMode) -> u32 {
    match x {
        BlendMode::Add => OPERATION_ADD,
        BlendMode::Subtract => OPERATION_SUB,
        BlendMode::ReverseSubtract => OPERATION_REVERSE_SUB,
        BlendMode::Min => OPERATION_MIN,
        BlendMode::Max => OPERATION_MAX,
    }
}

fn encode_factor(x: BlendFactor) -> u32 {
    match x {
        BlendFactor::Zero => COLOR_FACTOR_ZERO,
        BlendFactor::One => COLOR_FACTOR_ONE,
        BlendFactor::SrcColor => COLOR_FACTOR_SRC_COLOR,
        BlendFactor::OneMinusSrcColor => COLOR_FACTOR_ONE_MINUS_SRC_COLOR,
        BlendFactor::DstColor => COLOR_FACTOR_DST_COLOR,
        BlendFactor::OneMinusDstColor => COLOR_FACTOR_ONE_MINUS_DST_COLOR,
        BlendFactor::SrcAlpha => COLOR_FACTOR_SRC_ALPHA,
        BlendFactor::OneMinusSrcAlpha => COLOR_FACTOR_ONE_MINUS_SRC_ALPHA,
        BlendFactor::DstAlpha => COLOR_FACTOR_DST_ALPHA,
        BlendFactor::OneMinusDstAlpha => COLOR_FACTOR_ONE_MINUS_DST_ALPHA,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::vec2;

    fn osd() -> Layer {
        Layer::whole(Surface::osd(
            OsdCanvas::Osd0,
            PixelFormat::ARGB8888,
            vec2(1920, 1080),
        ))
    }

    fn lcd(rect: Rect) -> Layer {
        Layer::new(
            Surface::single_plane(
                SurfaceMemory::External,
                PixelFormat::RGB565,
                0x3e00_0000,
                vec2(480, 320),
            ),
            rect,
        )
    }

    #[test]
    fn stretch_copy() {
        let desc = build(&BlitRequest::Copy {
            src: osd(),
            dst: lcd(Rect::new(0, 25, 480, 270)),
        });

        assert_eq!(desc.command, Command::StretchBlitNoAlpha);

        let c = &desc.config;
        assert_eq!(c.src_para.mem_type, CANVAS_OSD0);
        assert_eq!(c.src_para.format, PixelFormat::ARGB8888.0 as c_int);
        assert_eq!((c.src_para.width, c.src_para.height), (1920, 1080));
        assert_eq!(c.src_planes[0], ConfigPlanes::default());

        assert_eq!(c.src2_para.mem_type, CANVAS_TYPE_INVALID);

        assert_eq!(c.dst_para.mem_type, CANVAS_ALLOC);
        assert_eq!(c.dst_para.format, PixelFormat::RGB565.0 as c_int);
        assert_eq!(
            c.dst_planes[0],
            ConfigPlanes {
                addr: 0x3e00_0000,
                w: 480,
                h: 320
            }
        );
        assert_eq!(c.dst_planes[1], ConfigPlanes::default());

        let p = &desc.para;
        assert_eq!(p.src1_rect, Rectangle { x: 0, y: 0, w: 1920, h: 1080 });
        assert_eq!(p.dst_rect, Rectangle { x: 0, y: 25, w: 480, h: 270 });
        assert_eq!(p.op, 0);
    }

    #[test]
    fn unscaled_copy_uses_plain_blit() {
        let full = Rect::new(0, 0, 480, 320);
        let desc = build(&BlitRequest::Copy {
            src: lcd(full),
            dst: lcd(full),
        });
        assert_eq!(desc.command, Command::BlitNoAlpha);
    }

    #[test]
    fn blend_populates_both_sources() {
        let rect = Rect::new(0, 25, 480, 270);
        let desc = build(&BlitRequest::Blend {
            src: osd(),
            src2: lcd(rect),
            dst: lcd(rect),
            factors: BlendFactors::SOURCE_OVER,
        });

        assert_eq!(desc.command, Command::Blend);
        assert_eq!(desc.config.src_para.mem_type, CANVAS_OSD0);
        assert_eq!(desc.config.src2_para.mem_type, CANVAS_ALLOC);
        assert_eq!(desc.config.src2_planes[0].addr, 0x3e00_0000);
        assert_eq!(desc.para.src2_rect, desc.para.dst_rect);
        assert_eq!(desc.para.src1_rect.w, 1920);

        // add(src_alpha, 1 - src_color) for both channels
        assert_eq!(desc.para.op, 0x0063_0063);
    }

    #[test]
    fn fill_sets_color() {
        let desc = build(&BlitRequest::Fill {
            dst: lcd(Rect::new(0, 0, 480, 320)),
            color: 0x0000_00ff,
        });
        assert_eq!(desc.command, Command::FillRectangle);
        assert_eq!(desc.para.color, 0xff);
        assert_eq!(desc.config.src_para, desc.config.dst_para);
    }

    #[test]
    fn video_canvas_is_forwarded() {
        let video = Surface::canvas(0x0000_2726, PixelFormat::NV21, vec2(1280, 720));
        let desc = build(&BlitRequest::Copy {
            src: Layer::whole(video),
            dst: lcd(Rect::new(0, 0, 480, 270)),
        });

        let c = &desc.config;
        assert_eq!(c.src_para.mem_type, CANVAS_TYPE_INVALID);
        assert_eq!(c.src_para.canvas_index, 0x2726);
        assert_eq!(c.src_para.format, PixelFormat::NV21.0 as c_int);
        assert_eq!((c.src_para.width, c.src_para.height), (1280, 720));
        // The canvases carry the plane addresses
        assert_eq!(c.src_planes, [ConfigPlanes::default(); 4]);

        assert_eq!(c.dst_para.canvas_index, 0);
        assert_eq!(desc.para.src1_rect, Rectangle { x: 0, y: 0, w: 1280, h: 720 });
    }
}
