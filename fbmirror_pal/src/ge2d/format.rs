//! GE2D pixel format tags.
use arrayvec::ArrayVec;
use cgmath::Vector2;
use displaydoc::Display;
use std::{error::Error, fmt};

use crate::blit::MAX_PLANES;

const LITTLE_ENDIAN: u32 = 1 << 24;
const COLOR_MAP_SHIFT: u32 = 20;

const FMT_S16_RGB: u32 = LITTLE_ENDIAN | 0x00100;
const FMT_S24_RGB: u32 = LITTLE_ENDIAN | 0x00200;
const FMT_S32_RGBA: u32 = LITTLE_ENDIAN | 0x00300;
const FMT_M24_YUV420: u32 = 0x20007;
const FMT_M24_YUV422: u32 = 0x20006;
const FMT_M24_YUV444: u32 = 0x20004;
const FMT_M24_YUV420SP: u32 = 0x20207;

/// Set for formats whose components are stored in separate planes.
const MULTI_PLANE_BIT: u32 = 0x4;
/// The chroma subsampling of a multi-plane format.
const SUBSAMPLE_MASK: u32 = 0x3;
const SUBSAMPLE_420: u32 = 0x3;
const SUBSAMPLE_422: u32 = 0x2;
/// Distinguishes semi-planar (interleaved chroma) layouts.
const SEMI_PLANAR_MASK: u32 = 0x300;
const SEMI_PLANAR: u32 = 0x200;

/// A GE2D pixel format tag.
///
/// Tags reported by the video decoder are passed through unmodified, so this
/// is a transparent wrapper rather than an enumeration.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelFormat(pub u32);

impl PixelFormat {
    pub const RGB565: Self = Self(FMT_S16_RGB | (5 << COLOR_MAP_SHIFT));
    pub const RGB888: Self = Self(FMT_S24_RGB);
    pub const ARGB8888: Self = Self(FMT_S32_RGBA | (1 << COLOR_MAP_SHIFT));
    pub const YUV420: Self = Self(FMT_M24_YUV420);
    pub const YUV422: Self = Self(FMT_M24_YUV422);
    pub const YUV444: Self = Self(FMT_M24_YUV444);
    pub const NV21: Self = Self(FMT_M24_YUV420SP | (14 << COLOR_MAP_SHIFT));
    pub const NV12: Self = Self(FMT_M24_YUV420SP | (15 << COLOR_MAP_SHIFT));

    /// Map a framebuffer's depth to the corresponding RGB format.
    pub fn from_bits_per_pixel(bpp: u32) -> Result<Self, UnsupportedDepth> {
        match bpp {
            16 => Ok(Self::RGB565),
            24 => Ok(Self::RGB888),
            32 => Ok(Self::ARGB8888),
            _ => Err(UnsupportedDepth(bpp)),
        }
    }

    pub fn chroma_layout(self) -> ChromaLayout {
        if self.0 & MULTI_PLANE_BIT == 0 {
            return ChromaLayout::Packed;
        }

        let subsampling = match self.0 & SUBSAMPLE_MASK {
            SUBSAMPLE_420 => Subsampling::Yuv420,
            SUBSAMPLE_422 => Subsampling::Yuv422,
            _ => Subsampling::Yuv444,
        };

        if self.0 & SEMI_PLANAR_MASK == SEMI_PLANAR {
            ChromaLayout::SemiPlanar(subsampling)
        } else {
            ChromaLayout::Planar(subsampling)
        }
    }

    /// Get the height of the chroma plane(s) of a frame whose luma plane has
    /// the given height. Returns `None` for packed formats.
    pub fn chroma_height(self, luma_height: u32) -> Option<u32> {
        match self.chroma_layout() {
            ChromaLayout::Packed => None,
            ChromaLayout::SemiPlanar(s) | ChromaLayout::Planar(s) => Some(match s {
                Subsampling::Yuv420 => (luma_height + 1) / 2,
                Subsampling::Yuv422 | Subsampling::Yuv444 => luma_height,
            }),
        }
    }

    /// Get the extents of the planes of a frame of this format.
    ///
    /// Packed formats have a single plane. Multi-plane formats have the luma
    /// plane first, followed by the chroma plane(s).
    pub fn plane_extents(self, size: Vector2<u32>) -> ArrayVec<[Vector2<u32>; MAX_PLANES]> {
        let mut extents = ArrayVec::new();
        extents.push(size);

        let chroma_height = match self.chroma_height(size.y) {
            Some(h) => h,
            None => return extents,
        };

        match self.chroma_layout() {
            ChromaLayout::Packed => {}
            ChromaLayout::SemiPlanar(_) => {
                // Cb and Cr are interleaved, so the plane is as wide as luma
                extents.push(Vector2::new(size.x, chroma_height));
            }
            ChromaLayout::Planar(s) => {
                let chroma_width = match s {
                    Subsampling::Yuv420 | Subsampling::Yuv422 => (size.x + 1) / 2,
                    Subsampling::Yuv444 => size.x,
                };
                for _ in 0..2 {
                    extents.push(Vector2::new(chroma_width, chroma_height));
                }
            }
        }

        extents
    }
}

impl fmt::Debug for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match *self {
            Self::RGB565 => "RGB565",
            Self::RGB888 => "RGB888",
            Self::ARGB8888 => "ARGB8888",
            Self::YUV420 => "YUV420",
            Self::YUV422 => "YUV422",
            Self::YUV444 => "YUV444",
            Self::NV21 => "NV21",
            Self::NV12 => "NV12",
            _ => return write!(f, "PixelFormat({:#010x})", self.0),
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subsampling {
    Yuv420,
    Yuv422,
    Yuv444,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChromaLayout {
    /// All components are interleaved in a single plane.
    Packed,
    /// A luma plane followed by an interleaved chroma plane.
    SemiPlanar(Subsampling),
    /// A luma plane followed by two chroma planes.
    Planar(Subsampling),
}

/// unsupported source pixel depth: {0} bits per pixel
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub struct UnsupportedDepth(pub u32);

impl Error for UnsupportedDepth {}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::vec2;

    #[test]
    fn depth_mapping() {
        assert_eq!(PixelFormat::from_bits_per_pixel(16), Ok(PixelFormat::RGB565));
        assert_eq!(PixelFormat::from_bits_per_pixel(24), Ok(PixelFormat::RGB888));
        assert_eq!(PixelFormat::from_bits_per_pixel(32), Ok(PixelFormat::ARGB8888));
        for &bpp in &[0, 1, 8, 15, 18, 31, 64] {
            assert_eq!(
                PixelFormat::from_bits_per_pixel(bpp),
                Err(UnsupportedDepth(bpp))
            );
        }
    }

    #[test]
    fn chroma_height_depends_on_format() {
        assert_eq!(PixelFormat::NV21.chroma_height(1080), Some(540));
        assert_eq!(PixelFormat::NV12.chroma_height(1081), Some(541));
        assert_eq!(PixelFormat::YUV420.chroma_height(720), Some(360));
        assert_eq!(PixelFormat::YUV422.chroma_height(720), Some(720));
        assert_eq!(PixelFormat::YUV444.chroma_height(720), Some(720));
        assert_eq!(PixelFormat::RGB565.chroma_height(720), None);
        assert_eq!(PixelFormat::ARGB8888.chroma_height(720), None);
    }

    #[test]
    fn semi_planar_extents() {
        assert_eq!(
            &PixelFormat::NV21.plane_extents(vec2(1920, 1080))[..],
            &[vec2(1920, 1080), vec2(1920, 540)]
        );
    }

    #[test]
    fn planar_extents() {
        assert_eq!(
            &PixelFormat::YUV420.plane_extents(vec2(641, 480))[..],
            &[vec2(641, 480), vec2(321, 240), vec2(321, 240)]
        );
        assert_eq!(PixelFormat::YUV444.plane_extents(vec2(64, 32))[2], vec2(64, 32));
    }

    #[test]
    fn packed_extents() {
        assert_eq!(&PixelFormat::ARGB8888.plane_extents(vec2(64, 32))[..], &[vec2(64, 32)]);
    }

    #[test]
    fn debug_names_unknown_tags() {
        assert_eq!(format!("{:?}", PixelFormat::NV12), "NV12");
        assert_eq!(format!("{:?}", PixelFormat(0x1234)), "PixelFormat(0x00001234)");
    }
}
