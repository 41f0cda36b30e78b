//! The GE2D driver's descriptor layouts and request numbers.
use std::os::raw::{c_int, c_uint, c_ulong};

/// `GE2D_CONFIG_EX`
pub const CONFIG_EX: u32 = 0x46fa;

/// An operation request executed with the current configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Command {
    /// `GE2D_BLEND`
    Blend = 0x4700,
    /// `GE2D_BLIT_NOALPHA`
    BlitNoAlpha = 0x4701,
    /// `GE2D_STRETCHBLIT_NOALPHA`
    StretchBlitNoAlpha = 0x4702,
    /// `GE2D_FILLRECTANGLE`
    FillRectangle = 0x46fd,
}

impl Command {
    /// Get the driver's name for the request, used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Command::Blend => "GE2D_BLEND",
            Command::BlitNoAlpha => "GE2D_BLIT_NOALPHA",
            Command::StretchBlitNoAlpha => "GE2D_STRETCHBLIT_NOALPHA",
            Command::FillRectangle => "GE2D_FILLRECTANGLE",
        }
    }
}

// `ge2d_src_canvas_type`
pub const CANVAS_OSD0: c_int = 0;
pub const CANVAS_OSD1: c_int = 1;
pub const CANVAS_ALLOC: c_int = 2;
pub const CANVAS_TYPE_INVALID: c_int = 3;

// Blend modes
pub const OPERATION_ADD: u32 = 0;
pub const OPERATION_SUB: u32 = 1;
pub const OPERATION_REVERSE_SUB: u32 = 2;
pub const OPERATION_MIN: u32 = 3;
pub const OPERATION_MAX: u32 = 4;

// Blend factors
pub const COLOR_FACTOR_ZERO: u32 = 0;
pub const COLOR_FACTOR_ONE: u32 = 1;
pub const COLOR_FACTOR_SRC_COLOR: u32 = 2;
pub const COLOR_FACTOR_ONE_MINUS_SRC_COLOR: u32 = 3;
pub const COLOR_FACTOR_DST_COLOR: u32 = 4;
pub const COLOR_FACTOR_ONE_MINUS_DST_COLOR: u32 = 5;
pub const COLOR_FACTOR_SRC_ALPHA: u32 = 6;
pub const COLOR_FACTOR_ONE_MINUS_SRC_ALPHA: u32 = 7;
pub const COLOR_FACTOR_DST_ALPHA: u32 = 8;
pub const COLOR_FACTOR_ONE_MINUS_DST_ALPHA: u32 = 9;

/// Pack blend parameters into `Ge2dPara::op` (`blendop` in the driver
/// headers).
pub const fn blendop(
    color_mode: u32,
    color_src: u32,
    color_dst: u32,
    alpha_mode: u32,
    alpha_src: u32,
    alpha_dst: u32,
) -> u32 {
    (color_mode << 24)
        | (color_src << 20)
        | (color_dst << 16)
        | (alpha_mode << 8)
        | (alpha_src << 4)
        | alpha_dst
}

/// `struct rectangle_s`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rectangle {
    pub x: c_int,
    pub y: c_int,
    pub w: c_int,
    pub h: c_int,
}

/// `struct ge2d_para_s`, the operation descriptor.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Ge2dPara {
    pub color: c_uint,
    pub src1_rect: Rectangle,
    pub src2_rect: Rectangle,
    pub dst_rect: Rectangle,
    pub op: c_int,
}

/// `struct src_dst_para_ex_s`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SrcDstParaEx {
    pub canvas_index: c_int,
    pub top: c_int,
    pub left: c_int,
    pub width: c_int,
    pub height: c_int,
    pub format: c_int,
    pub mem_type: c_int,
    pub color: c_int,
    pub x_rev: u8,
    pub y_rev: u8,
    pub fill_color_en: u8,
    pub fill_mode: u8,
}

impl Default for SrcDstParaEx {
    fn default() -> Self {
        Self {
            canvas_index: 0,
            top: 0,
            left: 0,
            width: 0,
            height: 0,
            format: 0,
            mem_type: CANVAS_TYPE_INVALID,
            color: 0,
            x_rev: 0,
            y_rev: 0,
            fill_color_en: 0,
            fill_mode: 0,
        }
    }
}

/// `struct src_key_ctrl_s`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SrcKeyCtrl {
    pub key_enable: c_int,
    pub key_color: c_int,
    pub key_mask: c_int,
    pub key_mode: c_int,
}

/// `struct config_planes_s`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ConfigPlanes {
    pub addr: c_ulong,
    pub w: c_uint,
    pub h: c_uint,
}

/// `struct config_para_ex_s`, the configuration descriptor.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ConfigParaEx {
    pub src_para: SrcDstParaEx,
    pub src2_para: SrcDstParaEx,
    pub dst_para: SrcDstParaEx,

    pub src_key: SrcKeyCtrl,
    pub src2_key: SrcKeyCtrl,

    pub alu_const_color: c_int,
    pub src1_gb_alpha: c_uint,
    pub op_mode: c_uint,
    pub bitmask_en: u8,
    pub bytemask_only: u8,
    pub bitmask: c_uint,
    pub dst_xy_swap: u8,

    pub hf_init_phase: c_uint,
    pub hf_rpt_num: c_int,
    pub hsc_start_phase_step: c_uint,
    pub hsc_phase_slope: c_int,
    pub vf_init_phase: c_uint,
    pub vf_rpt_num: c_int,
    pub vsc_start_phase_step: c_uint,
    pub vsc_phase_slope: c_int,
    pub src1_vsc_phase0_always_en: u8,
    pub src1_hsc_phase0_always_en: u8,
    pub src1_hsc_rpt_ctrl: u8,
    pub src1_vsc_rpt_ctrl: u8,

    pub src_planes: [ConfigPlanes; 4],
    pub src2_planes: [ConfigPlanes; 4],
    pub dst_planes: [ConfigPlanes; 4],
}
