//! Engine-agnostic blit requests.
//!
//! A [`BlitRequest`] is an immutable value built fresh for every blit. It is
//! translated into the engine's descriptors by [`ge2d::build`].
//!
//! [`ge2d::build`]: crate::ge2d::build
use arrayvec::ArrayVec;
use cgmath::{Point2, Vector2};
use fitgeom::Rect;

use crate::ge2d::PixelFormat;

/// A physical address as understood by the blit engine. It is never
/// dereferenced by the CPU.
pub type PhysAddr = u64;

/// A packed set of display canvas indices, one byte per plane with the luma
/// plane's in the lowest byte. The engine looks up the planes' addresses in
/// the display controller's canvas table.
pub type CanvasIndex = u32;

/// The maximum number of planes a surface can have.
pub const MAX_PLANES: usize = 4;

/// Identifies one of the display controller's OSD canvases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsdCanvas {
    Osd0,
    Osd1,
}

/// Describes where a surface's pixels live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceMemory {
    /// A display controller's OSD canvas. The engine locates the memory by
    /// itself, so the surface has no planes.
    Osd(OsdCanvas),
    /// Canvases set up by someone else, e.g., the video decoder. The planes
    /// only describe the geometry; their `addr` is unused.
    Canvas(CanvasIndex),
    /// A fixed buffer owned by someone else, e.g., the secondary display's
    /// buffer.
    External,
    /// A scratch buffer the engine allocates a canvas for.
    Scratch,
}

/// One plane of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Plane {
    pub addr: PhysAddr,
    /// The width in pixels (or chroma samples).
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    pub memory: SurfaceMemory,
    pub format: PixelFormat,
    pub origin: Point2<i32>,
    pub size: Vector2<u32>,
    pub planes: ArrayVec<[Plane; MAX_PLANES]>,
}

impl Surface {
    /// Construct a `Surface` representing an OSD canvas.
    pub fn osd(canvas: OsdCanvas, format: PixelFormat, size: Vector2<u32>) -> Self {
        Self {
            memory: SurfaceMemory::Osd(canvas),
            format,
            origin: Point2::new(0, 0),
            size,
            planes: ArrayVec::new(),
        }
    }

    /// Construct a `Surface` addressed by `canvas`. The plane geometry is
    /// derived from `format`.
    pub fn canvas(canvas: CanvasIndex, format: PixelFormat, size: Vector2<u32>) -> Self {
        let planes = format
            .plane_extents(size)
            .iter()
            .map(|extent| Plane {
                addr: 0,
                width: extent.x,
                height: extent.y,
            })
            .collect();
        Self {
            memory: SurfaceMemory::Canvas(canvas),
            format,
            origin: Point2::new(0, 0),
            size,
            planes,
        }
    }

    /// Construct a `Surface` backed by a single-plane buffer at `addr`.
    pub fn single_plane(
        memory: SurfaceMemory,
        format: PixelFormat,
        addr: PhysAddr,
        size: Vector2<u32>,
    ) -> Self {
        let mut planes = ArrayVec::new();
        planes.push(Plane {
            addr,
            width: size.x,
            height: size.y,
        });
        Self {
            memory,
            format,
            origin: Point2::new(0, 0),
            size,
            planes,
        }
    }

    /// Check if `rect` can be used to address this surface.
    pub fn covers(&self, rect: &Rect) -> bool {
        let extent = match self.planes.first() {
            Some(plane) => Vector2::new(plane.width, plane.height),
            None => self.size,
        };
        rect.is_within(extent)
    }
}

/// A surface and the rectangle addressing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    pub surface: Surface,
    pub rect: Rect,
}

impl Layer {
    pub fn new(surface: Surface, rect: Rect) -> Self {
        Self { surface, rect }
    }

    /// Construct a `Layer` addressing the whole of `surface`.
    pub fn whole(surface: Surface) -> Self {
        let rect = Rect::from_size(surface.size);
        Self { surface, rect }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendMode {
    Add,
    Subtract,
    ReverseSubtract,
    Min,
    Max,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    DstColor,
    OneMinusDstColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
}

/// The weighting of a two-source blend.
///
/// `src` is the top layer (the primary source), `dst` is the bottom layer
/// (the secondary source).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendFactors {
    pub color_mode: BlendMode,
    pub color_src: BlendFactor,
    pub color_dst: BlendFactor,
    pub alpha_mode: BlendMode,
    pub alpha_src: BlendFactor,
    pub alpha_dst: BlendFactor,
}

impl BlendFactors {
    /// The blend used to put the OSD over the video layer.
    pub const SOURCE_OVER: Self = Self {
        color_mode: BlendMode::Add,
        color_src: BlendFactor::SrcAlpha,
        color_dst: BlendFactor::OneMinusSrcColor,
        alpha_mode: BlendMode::Add,
        alpha_src: BlendFactor::SrcAlpha,
        alpha_dst: BlendFactor::OneMinusSrcColor,
    };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlitRequest {
    /// Copy `src` into `dst`, scaling and converting the pixel format as
    /// needed.
    Copy { src: Layer, dst: Layer },
    /// Blend `src` over `src2` and write the result into `dst`.
    Blend {
        src: Layer,
        src2: Layer,
        dst: Layer,
        factors: BlendFactors,
    },
    /// Fill a rectangle of `dst` with an opaque color (`0xRRGGBBAA`).
    Fill { dst: Layer, color: u32 },
}
