//! Typed view of fixed-function render states.
//!
//! Effects store render states as raw `D3DRENDERSTATETYPE` values. The enums below mirror the
//! native enumerations value for value; anything outside them is rejected as unsupported rather
//! than silently clamped.

use bitflags::bitflags;
use tracing::trace;

use super::table::*;
use super::{State, StateClass, StateValueKind};
use crate::error::{EffectError, Result};

mod d3d9 {
    // D3DZBUFFERTYPE.
    pub const D3DZB_FALSE: u32 = 0;
    pub const D3DZB_TRUE: u32 = 1;
    pub const D3DZB_USEW: u32 = 2;

    // D3DFILLMODE.
    pub const D3DFILL_POINT: u32 = 1;
    pub const D3DFILL_WIREFRAME: u32 = 2;
    pub const D3DFILL_SOLID: u32 = 3;

    // Blend factors.
    pub const D3DBLEND_ZERO: u32 = 1;
    pub const D3DBLEND_ONE: u32 = 2;
    pub const D3DBLEND_SRCCOLOR: u32 = 3;
    pub const D3DBLEND_INVSRCCOLOR: u32 = 4;
    pub const D3DBLEND_SRCALPHA: u32 = 5;
    pub const D3DBLEND_INVSRCALPHA: u32 = 6;
    pub const D3DBLEND_DESTALPHA: u32 = 7;
    pub const D3DBLEND_INVDESTALPHA: u32 = 8;
    pub const D3DBLEND_DESTCOLOR: u32 = 9;
    pub const D3DBLEND_INVDESTCOLOR: u32 = 10;
    pub const D3DBLEND_SRCALPHASAT: u32 = 11;
    pub const D3DBLEND_BOTHSRCALPHA: u32 = 12;
    pub const D3DBLEND_BOTHINVSRCALPHA: u32 = 13;
    pub const D3DBLEND_BLENDFACTOR: u32 = 14;
    pub const D3DBLEND_INVBLENDFACTOR: u32 = 15;
    pub const D3DBLEND_SRCCOLOR2: u32 = 16;
    pub const D3DBLEND_INVSRCCOLOR2: u32 = 17;

    // Blend ops.
    pub const D3DBLENDOP_ADD: u32 = 1;
    pub const D3DBLENDOP_SUBTRACT: u32 = 2;
    pub const D3DBLENDOP_REVSUBTRACT: u32 = 3;
    pub const D3DBLENDOP_MIN: u32 = 4;
    pub const D3DBLENDOP_MAX: u32 = 5;

    // Compare funcs.
    pub const D3DCMP_NEVER: u32 = 1;
    pub const D3DCMP_LESS: u32 = 2;
    pub const D3DCMP_EQUAL: u32 = 3;
    pub const D3DCMP_LESSEQUAL: u32 = 4;
    pub const D3DCMP_GREATER: u32 = 5;
    pub const D3DCMP_NOTEQUAL: u32 = 6;
    pub const D3DCMP_GREATEREQUAL: u32 = 7;
    pub const D3DCMP_ALWAYS: u32 = 8;

    // Stencil ops.
    pub const D3DSTENCILOP_KEEP: u32 = 1;
    pub const D3DSTENCILOP_ZERO: u32 = 2;
    pub const D3DSTENCILOP_REPLACE: u32 = 3;
    pub const D3DSTENCILOP_INCRSAT: u32 = 4;
    pub const D3DSTENCILOP_DECRSAT: u32 = 5;
    pub const D3DSTENCILOP_INVERT: u32 = 6;
    pub const D3DSTENCILOP_INCR: u32 = 7;
    pub const D3DSTENCILOP_DECR: u32 = 8;

    // Cull modes.
    pub const D3DCULL_NONE: u32 = 1;
    pub const D3DCULL_CW: u32 = 2;
    pub const D3DCULL_CCW: u32 = 3;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    InvSrcColor,
    SrcAlpha,
    InvSrcAlpha,
    DestAlpha,
    InvDestAlpha,
    DestColor,
    InvDestColor,
    SrcAlphaSat,
    BothSrcAlpha,
    BothInvSrcAlpha,
    BlendFactor,
    InvBlendFactor,
    SrcColor2,
    InvSrcColor2,
}

impl BlendFactor {
    pub fn from_d3d9(value: u32) -> Option<Self> {
        Some(match value {
            d3d9::D3DBLEND_ZERO => Self::Zero,
            d3d9::D3DBLEND_ONE => Self::One,
            d3d9::D3DBLEND_SRCCOLOR => Self::SrcColor,
            d3d9::D3DBLEND_INVSRCCOLOR => Self::InvSrcColor,
            d3d9::D3DBLEND_SRCALPHA => Self::SrcAlpha,
            d3d9::D3DBLEND_INVSRCALPHA => Self::InvSrcAlpha,
            d3d9::D3DBLEND_DESTALPHA => Self::DestAlpha,
            d3d9::D3DBLEND_INVDESTALPHA => Self::InvDestAlpha,
            d3d9::D3DBLEND_DESTCOLOR => Self::DestColor,
            d3d9::D3DBLEND_INVDESTCOLOR => Self::InvDestColor,
            d3d9::D3DBLEND_SRCALPHASAT => Self::SrcAlphaSat,
            d3d9::D3DBLEND_BOTHSRCALPHA => Self::BothSrcAlpha,
            d3d9::D3DBLEND_BOTHINVSRCALPHA => Self::BothInvSrcAlpha,
            d3d9::D3DBLEND_BLENDFACTOR => Self::BlendFactor,
            d3d9::D3DBLEND_INVBLENDFACTOR => Self::InvBlendFactor,
            d3d9::D3DBLEND_SRCCOLOR2 => Self::SrcColor2,
            d3d9::D3DBLEND_INVSRCCOLOR2 => Self::InvSrcColor2,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendOp {
    Add,
    Subtract,
    RevSubtract,
    Min,
    Max,
}

impl BlendOp {
    pub fn from_d3d9(value: u32) -> Option<Self> {
        Some(match value {
            d3d9::D3DBLENDOP_ADD => Self::Add,
            d3d9::D3DBLENDOP_SUBTRACT => Self::Subtract,
            d3d9::D3DBLENDOP_REVSUBTRACT => Self::RevSubtract,
            d3d9::D3DBLENDOP_MIN => Self::Min,
            d3d9::D3DBLENDOP_MAX => Self::Max,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareFunc {
    Never,
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Always,
}

impl CompareFunc {
    pub fn from_d3d9(value: u32) -> Option<Self> {
        Some(match value {
            d3d9::D3DCMP_NEVER => Self::Never,
            d3d9::D3DCMP_LESS => Self::Less,
            d3d9::D3DCMP_EQUAL => Self::Equal,
            d3d9::D3DCMP_LESSEQUAL => Self::LessEqual,
            d3d9::D3DCMP_GREATER => Self::Greater,
            d3d9::D3DCMP_NOTEQUAL => Self::NotEqual,
            d3d9::D3DCMP_GREATEREQUAL => Self::GreaterEqual,
            d3d9::D3DCMP_ALWAYS => Self::Always,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StencilOp {
    Keep,
    Zero,
    Replace,
    IncrSat,
    DecrSat,
    Invert,
    Incr,
    Decr,
}

impl StencilOp {
    pub fn from_d3d9(value: u32) -> Option<Self> {
        Some(match value {
            d3d9::D3DSTENCILOP_KEEP => Self::Keep,
            d3d9::D3DSTENCILOP_ZERO => Self::Zero,
            d3d9::D3DSTENCILOP_REPLACE => Self::Replace,
            d3d9::D3DSTENCILOP_INCRSAT => Self::IncrSat,
            d3d9::D3DSTENCILOP_DECRSAT => Self::DecrSat,
            d3d9::D3DSTENCILOP_INVERT => Self::Invert,
            d3d9::D3DSTENCILOP_INCR => Self::Incr,
            d3d9::D3DSTENCILOP_DECR => Self::Decr,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CullMode {
    None,
    CW,
    CCW,
}

impl CullMode {
    pub fn from_d3d9(value: u32) -> Option<Self> {
        Some(match value {
            d3d9::D3DCULL_NONE => Self::None,
            d3d9::D3DCULL_CW => Self::CW,
            d3d9::D3DCULL_CCW => Self::CCW,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FillMode {
    Point,
    Wireframe,
    Solid,
}

impl FillMode {
    pub fn from_d3d9(value: u32) -> Option<Self> {
        Some(match value {
            d3d9::D3DFILL_POINT => Self::Point,
            d3d9::D3DFILL_WIREFRAME => Self::Wireframe,
            d3d9::D3DFILL_SOLID => Self::Solid,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZBufferType {
    Disabled,
    Z,
    W,
}

impl ZBufferType {
    pub fn from_d3d9(value: u32) -> Option<Self> {
        Some(match value {
            d3d9::D3DZB_FALSE => Self::Disabled,
            d3d9::D3DZB_TRUE => Self::Z,
            d3d9::D3DZB_USEW => Self::W,
            _ => return None,
        })
    }
}

bitflags! {
    /// `D3DCOLORWRITEENABLE_*`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ColorWriteMask: u32 {
        const RED = 1 << 0;
        const GREEN = 1 << 1;
        const BLUE = 1 << 2;
        const ALPHA = 1 << 3;
    }
}

/// A render-state value translated into its typed form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderValue {
    Bool(bool),
    BlendFactor(BlendFactor),
    BlendOp(BlendOp),
    Compare(CompareFunc),
    Stencil(StencilOp),
    Cull(CullMode),
    Fill(FillMode),
    ZBuffer(ZBufferType),
    ColorWrite(ColorWriteMask),
    /// States without a closed enumeration (reference values, masks, colors, floats stored as
    /// bits).
    Raw(u32),
}

fn unsupported(what: &'static str, value: u32) -> EffectError {
    EffectError::unsupported(what, value)
}

fn boolean(value: u32) -> Result<RenderValue> {
    match value {
        0 => Ok(RenderValue::Bool(false)),
        1 => Ok(RenderValue::Bool(true)),
        _ => Err(unsupported("render state boolean", value)),
    }
}

/// Translates the raw value of render state `op` (a `D3DRENDERSTATETYPE`).
pub fn translate_render_state(op: u32, value: u32) -> Result<RenderValue> {
    let translated = match op {
        D3DRS_ZENABLE => ZBufferType::from_d3d9(value)
            .map(RenderValue::ZBuffer)
            .ok_or_else(|| unsupported("z-buffer type", value))?,
        D3DRS_FILLMODE => FillMode::from_d3d9(value)
            .map(RenderValue::Fill)
            .ok_or_else(|| unsupported("fill mode", value))?,
        D3DRS_CULLMODE => CullMode::from_d3d9(value)
            .map(RenderValue::Cull)
            .ok_or_else(|| unsupported("cull mode", value))?,
        D3DRS_SRCBLEND | D3DRS_DESTBLEND | D3DRS_SRCBLENDALPHA | D3DRS_DESTBLENDALPHA => {
            BlendFactor::from_d3d9(value)
                .map(RenderValue::BlendFactor)
                .ok_or_else(|| unsupported("blend factor", value))?
        }
        D3DRS_BLENDOP | D3DRS_BLENDOPALPHA => BlendOp::from_d3d9(value)
            .map(RenderValue::BlendOp)
            .ok_or_else(|| unsupported("blend op", value))?,
        D3DRS_ZFUNC | D3DRS_ALPHAFUNC | D3DRS_STENCILFUNC | D3DRS_CCW_STENCILFUNC => {
            CompareFunc::from_d3d9(value)
                .map(RenderValue::Compare)
                .ok_or_else(|| unsupported("compare function", value))?
        }
        D3DRS_STENCILFAIL
        | D3DRS_STENCILZFAIL
        | D3DRS_STENCILPASS
        | D3DRS_CCW_STENCILFAIL
        | D3DRS_CCW_STENCILZFAIL
        | D3DRS_CCW_STENCILPASS => StencilOp::from_d3d9(value)
            .map(RenderValue::Stencil)
            .ok_or_else(|| unsupported("stencil op", value))?,
        D3DRS_COLORWRITEENABLE
        | D3DRS_COLORWRITEENABLE1
        | D3DRS_COLORWRITEENABLE2
        | D3DRS_COLORWRITEENABLE3 => ColorWriteMask::from_bits(value)
            .map(RenderValue::ColorWrite)
            .ok_or_else(|| unsupported("color write mask", value))?,
        D3DRS_ZWRITEENABLE
        | D3DRS_ALPHATESTENABLE
        | D3DRS_LASTPIXEL
        | D3DRS_DITHERENABLE
        | D3DRS_ALPHABLENDENABLE
        | D3DRS_FOGENABLE
        | D3DRS_SPECULARENABLE
        | D3DRS_RANGEFOGENABLE
        | D3DRS_STENCILENABLE
        | D3DRS_CLIPPING
        | D3DRS_LIGHTING
        | D3DRS_COLORVERTEX
        | D3DRS_LOCALVIEWER
        | D3DRS_NORMALIZENORMALS
        | D3DRS_POINTSPRITEENABLE
        | D3DRS_POINTSCALEENABLE
        | D3DRS_MULTISAMPLEANTIALIAS
        | D3DRS_INDEXEDVERTEXBLENDENABLE
        | D3DRS_SCISSORTESTENABLE
        | D3DRS_ANTIALIASEDLINEENABLE
        | D3DRS_ENABLEADAPTIVETESSELLATION
        | D3DRS_TWOSIDEDSTENCILMODE
        | D3DRS_SRGBWRITEENABLE
        | D3DRS_SEPARATEALPHABLENDENABLE => boolean(value)?,
        _ => RenderValue::Raw(value),
    };
    Ok(translated)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlendState {
    pub enable: Option<bool>,
    pub src: Option<BlendFactor>,
    pub dst: Option<BlendFactor>,
    pub op: Option<BlendOp>,
    pub separate_alpha: Option<bool>,
    pub src_alpha: Option<BlendFactor>,
    pub dst_alpha: Option<BlendFactor>,
    pub op_alpha: Option<BlendOp>,
    /// Write masks of render targets 0..=3.
    pub write_mask: [Option<ColorWriteMask>; 4],
    /// `D3DCOLOR` (ARGB).
    pub blend_factor: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StencilFaceState {
    pub fail: Option<StencilOp>,
    pub depth_fail: Option<StencilOp>,
    pub pass: Option<StencilOp>,
    pub func: Option<CompareFunc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepthStencilState {
    pub depth: Option<ZBufferType>,
    pub depth_write: Option<bool>,
    pub depth_func: Option<CompareFunc>,
    pub stencil_enable: Option<bool>,
    pub two_sided: Option<bool>,
    pub front: StencilFaceState,
    /// Counter-clockwise faces when two-sided stencil is enabled.
    pub back: StencilFaceState,
    pub stencil_ref: Option<u32>,
    pub stencil_read_mask: Option<u32>,
    pub stencil_write_mask: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RasterizerState {
    pub fill: Option<FillMode>,
    pub cull: Option<CullMode>,
    pub scissor_test: Option<bool>,
    pub antialiased_lines: Option<bool>,
    pub multisample: Option<bool>,
    /// Stored as `f32` bits.
    pub depth_bias: Option<u32>,
    /// Stored as `f32` bits.
    pub slope_scaled_depth_bias: Option<u32>,
}

/// Pipeline overrides requested by a pass. A record is `None` when the pass sets none of its
/// states.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassOverrides {
    pub blend: Option<BlendState>,
    pub depth_stencil: Option<DepthStencilState>,
    pub rasterizer: Option<RasterizerState>,
}

impl PassOverrides {
    /// Collects the constant render states of `states`. Expression-driven and referenced
    /// states are resolved at apply time and are skipped here.
    pub fn from_states(states: &[State]) -> Result<Self> {
        let mut out = Self::default();
        for state in states {
            let info = state.info();
            if info.class != StateClass::RenderState {
                continue;
            }
            if state.kind != StateValueKind::Constant {
                trace!(state = info.name, kind = ?state.kind, "skipping non-constant render state");
                continue;
            }
            let raw = state.raw_value()?;
            let value = translate_render_state(info.op, raw)?;
            out.apply(info.op, raw, value);
        }
        Ok(out)
    }

    fn blend(&mut self) -> &mut BlendState {
        self.blend.get_or_insert_with(BlendState::default)
    }

    fn depth_stencil(&mut self) -> &mut DepthStencilState {
        self.depth_stencil
            .get_or_insert_with(DepthStencilState::default)
    }

    fn rasterizer(&mut self) -> &mut RasterizerState {
        self.rasterizer.get_or_insert_with(RasterizerState::default)
    }

    fn apply(&mut self, op: u32, raw: u32, value: RenderValue) {
        use RenderValue as V;

        match (op, value) {
            (D3DRS_ALPHABLENDENABLE, V::Bool(b)) => self.blend().enable = Some(b),
            (D3DRS_SRCBLEND, V::BlendFactor(f)) => self.blend().src = Some(f),
            (D3DRS_DESTBLEND, V::BlendFactor(f)) => self.blend().dst = Some(f),
            (D3DRS_BLENDOP, V::BlendOp(o)) => self.blend().op = Some(o),
            (D3DRS_SEPARATEALPHABLENDENABLE, V::Bool(b)) => self.blend().separate_alpha = Some(b),
            (D3DRS_SRCBLENDALPHA, V::BlendFactor(f)) => self.blend().src_alpha = Some(f),
            (D3DRS_DESTBLENDALPHA, V::BlendFactor(f)) => self.blend().dst_alpha = Some(f),
            (D3DRS_BLENDOPALPHA, V::BlendOp(o)) => self.blend().op_alpha = Some(o),
            (D3DRS_BLENDFACTOR, _) => self.blend().blend_factor = Some(raw),
            (D3DRS_COLORWRITEENABLE, V::ColorWrite(m)) => self.blend().write_mask[0] = Some(m),
            (D3DRS_COLORWRITEENABLE1, V::ColorWrite(m)) => self.blend().write_mask[1] = Some(m),
            (D3DRS_COLORWRITEENABLE2, V::ColorWrite(m)) => self.blend().write_mask[2] = Some(m),
            (D3DRS_COLORWRITEENABLE3, V::ColorWrite(m)) => self.blend().write_mask[3] = Some(m),

            (D3DRS_ZENABLE, V::ZBuffer(z)) => self.depth_stencil().depth = Some(z),
            (D3DRS_ZWRITEENABLE, V::Bool(b)) => self.depth_stencil().depth_write = Some(b),
            (D3DRS_ZFUNC, V::Compare(f)) => self.depth_stencil().depth_func = Some(f),
            (D3DRS_STENCILENABLE, V::Bool(b)) => self.depth_stencil().stencil_enable = Some(b),
            (D3DRS_TWOSIDEDSTENCILMODE, V::Bool(b)) => self.depth_stencil().two_sided = Some(b),
            (D3DRS_STENCILFAIL, V::Stencil(s)) => self.depth_stencil().front.fail = Some(s),
            (D3DRS_STENCILZFAIL, V::Stencil(s)) => self.depth_stencil().front.depth_fail = Some(s),
            (D3DRS_STENCILPASS, V::Stencil(s)) => self.depth_stencil().front.pass = Some(s),
            (D3DRS_STENCILFUNC, V::Compare(f)) => self.depth_stencil().front.func = Some(f),
            (D3DRS_CCW_STENCILFAIL, V::Stencil(s)) => self.depth_stencil().back.fail = Some(s),
            (D3DRS_CCW_STENCILZFAIL, V::Stencil(s)) => self.depth_stencil().back.depth_fail = Some(s),
            (D3DRS_CCW_STENCILPASS, V::Stencil(s)) => self.depth_stencil().back.pass = Some(s),
            (D3DRS_CCW_STENCILFUNC, V::Compare(f)) => self.depth_stencil().back.func = Some(f),
            (D3DRS_STENCILREF, _) => self.depth_stencil().stencil_ref = Some(raw),
            (D3DRS_STENCILMASK, _) => self.depth_stencil().stencil_read_mask = Some(raw),
            (D3DRS_STENCILWRITEMASK, _) => self.depth_stencil().stencil_write_mask = Some(raw),

            (D3DRS_FILLMODE, V::Fill(f)) => self.rasterizer().fill = Some(f),
            (D3DRS_CULLMODE, V::Cull(c)) => self.rasterizer().cull = Some(c),
            (D3DRS_SCISSORTESTENABLE, V::Bool(b)) => self.rasterizer().scissor_test = Some(b),
            (D3DRS_ANTIALIASEDLINEENABLE, V::Bool(b)) => {
                self.rasterizer().antialiased_lines = Some(b)
            }
            (D3DRS_MULTISAMPLEANTIALIAS, V::Bool(b)) => self.rasterizer().multisample = Some(b),
            (D3DRS_DEPTHBIAS, _) => self.rasterizer().depth_bias = Some(raw),
            (D3DRS_SLOPESCALEDEPTHBIAS, _) => self.rasterizer().slope_scaled_depth_bias = Some(raw),

            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::model::Parameter;
    use crate::state::StateOperation;
    use pretty_assertions::assert_eq;

    fn rs_state(op: u32, value: u32) -> State {
        let index = find(StateClass::RenderState, op).unwrap();
        State::constant(
            StateOperation::from_index(index as u32).unwrap(),
            0,
            Parameter::int("", value as i32),
        )
    }

    #[test]
    fn translates_native_codes() {
        assert_eq!(
            translate_render_state(D3DRS_SRCBLEND, 5).unwrap(),
            RenderValue::BlendFactor(BlendFactor::SrcAlpha)
        );
        assert_eq!(
            translate_render_state(D3DRS_DESTBLEND, 13).unwrap(),
            RenderValue::BlendFactor(BlendFactor::BothInvSrcAlpha)
        );
        assert_eq!(
            translate_render_state(D3DRS_ZFUNC, 4).unwrap(),
            RenderValue::Compare(CompareFunc::LessEqual)
        );
        assert_eq!(
            translate_render_state(D3DRS_CULLMODE, 3).unwrap(),
            RenderValue::Cull(CullMode::CCW)
        );
        assert_eq!(
            translate_render_state(D3DRS_ZENABLE, 2).unwrap(),
            RenderValue::ZBuffer(ZBufferType::W)
        );
        assert_eq!(
            translate_render_state(D3DRS_COLORWRITEENABLE, 0b0111).unwrap(),
            RenderValue::ColorWrite(ColorWriteMask::RED | ColorWriteMask::GREEN | ColorWriteMask::BLUE)
        );
        assert_eq!(
            translate_render_state(D3DRS_STENCILREF, 0x80).unwrap(),
            RenderValue::Raw(0x80)
        );
    }

    #[test]
    fn rejects_out_of_range_codes() {
        for (op, value) in [
            (D3DRS_SRCBLEND, 0),
            (D3DRS_SRCBLEND, 18),
            (D3DRS_BLENDOP, 6),
            (D3DRS_ZFUNC, 9),
            (D3DRS_STENCILPASS, 0),
            (D3DRS_CULLMODE, 4),
            (D3DRS_FILLMODE, 0),
            (D3DRS_ZENABLE, 3),
            (D3DRS_COLORWRITEENABLE, 16),
            (D3DRS_ALPHABLENDENABLE, 2),
        ] {
            let err = translate_render_state(op, value).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Unsupported, "op {op} value {value}");
        }
    }

    #[test]
    fn pass_overrides_group_states() {
        let states = vec![
            rs_state(D3DRS_ALPHABLENDENABLE, 1),
            rs_state(D3DRS_SRCBLEND, 5),
            rs_state(D3DRS_DESTBLEND, 6),
            rs_state(D3DRS_ZWRITEENABLE, 0),
            rs_state(D3DRS_CULLMODE, 1),
        ];
        let overrides = PassOverrides::from_states(&states).unwrap();

        let blend = overrides.blend.unwrap();
        assert_eq!(blend.enable, Some(true));
        assert_eq!(blend.src, Some(BlendFactor::SrcAlpha));
        assert_eq!(blend.dst, Some(BlendFactor::InvSrcAlpha));
        assert_eq!(blend.op, None);

        let ds = overrides.depth_stencil.unwrap();
        assert_eq!(ds.depth_write, Some(false));
        assert_eq!(ds.depth_func, None);

        assert_eq!(overrides.rasterizer.unwrap().cull, Some(CullMode::None));
    }

    #[test]
    fn pass_without_render_states_has_no_overrides() {
        assert_eq!(PassOverrides::from_states(&[]).unwrap(), PassOverrides::default());
    }
}
