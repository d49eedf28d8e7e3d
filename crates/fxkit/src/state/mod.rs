//! Pass and sampler states.

mod render;
pub mod table;

pub use render::{
    translate_render_state, BlendFactor, BlendOp, BlendState, ColorWriteMask, CompareFunc,
    CullMode, DepthStencilState, FillMode, PassOverrides, RasterizerState, RenderValue,
    StencilFaceState, StencilOp, ZBufferType,
};
pub use table::{StateInfo, STATE_TABLE};

use crate::error::{EffectError, Result};
use crate::model::{Expression, Parameter};

/// Category of a [`StateInfo`] entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateClass {
    RenderState,
    TextureStage,
    NPatchMode,
    Fvf,
    Transform,
    Material,
    Light,
    LightEnable,
    VertexShader,
    PixelShader,
    ShaderConstant,
    Texture,
    SamplerState,
    /// Sets a whole sampler parameter.
    Sampler,
}

/// Index into [`STATE_TABLE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateOperation(u32);

impl StateOperation {
    pub fn from_index(index: u32) -> Option<Self> {
        ((index as usize) < STATE_TABLE.len()).then_some(Self(index))
    }

    /// Looks up an operation by its table name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        table::find_by_name(name).map(|i| Self(i as u32))
    }

    pub fn index(self) -> u32 {
        self.0
    }

    pub fn info(self) -> &'static StateInfo {
        &STATE_TABLE[self.0 as usize]
    }
}

/// How a [`State`] obtains its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateValueKind {
    /// The value is stored in the state's parameter.
    Constant,
    /// The value is read from the top-level parameter named by the state's parameter.
    ParameterReference,
    /// The value is computed by the state's preshader.
    Expression,
    /// The value is an element of an array parameter, selected by the state's preshader.
    ExpressionIndex,
}

impl StateValueKind {
    pub fn from_raw(raw: u8) -> Option<Self> {
        Some(match raw {
            0 => Self::Constant,
            1 => Self::ParameterReference,
            2 => Self::Expression,
            3 => Self::ExpressionIndex,
            _ => return None,
        })
    }

    pub fn raw(self) -> u8 {
        match self {
            Self::Constant => 0,
            Self::ParameterReference => 1,
            Self::Expression => 2,
            Self::ExpressionIndex => 3,
        }
    }
}

/// One state assignment of a pass or sampler.
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    pub operation: StateOperation,
    /// Stage, light, sampler or register index the state applies to.
    pub index: u32,
    pub kind: StateValueKind,
    pub parameter: Parameter,
}

impl State {
    pub fn constant(operation: StateOperation, index: u32, parameter: Parameter) -> Self {
        Self {
            operation,
            index,
            kind: StateValueKind::Constant,
            parameter,
        }
    }

    pub fn info(&self) -> &'static StateInfo {
        self.operation.info()
    }

    pub fn name(&self) -> &'static str {
        self.info().name
    }

    /// The preshader for `Expression` and `ExpressionIndex` states.
    pub fn expression(&self) -> Option<&Expression> {
        match self.kind {
            StateValueKind::Expression | StateValueKind::ExpressionIndex => {
                self.parameter.expression()
            }
            _ => None,
        }
    }

    /// First 32-bit word of a constant numeric value.
    pub fn raw_value(&self) -> Result<u32> {
        self.parameter.as_u32().ok_or_else(|| {
            EffectError::corrupt(
                "state value",
                format!("{} has no numeric value", self.name()),
            )
        })
    }

    /// Typed value of a constant render state. `None` for other states.
    pub fn render_value(&self) -> Option<Result<RenderValue>> {
        let info = self.info();
        if info.class != StateClass::RenderState || self.kind != StateValueKind::Constant {
            return None;
        }
        Some(
            self.raw_value()
                .and_then(|raw| translate_render_state(info.op, raw)),
        )
    }

    /// The texture parameter name bound by a sampler's `Texture` state.
    pub(crate) fn texture_reference(&self) -> Option<&str> {
        (self.info().class == StateClass::Texture && self.kind == StateValueKind::ParameterReference)
            .then_some(self.parameter.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::model::{ParameterData, ParameterType};

    #[test]
    fn operations_are_bounded() {
        assert!(StateOperation::from_index(0).is_some());
        assert!(StateOperation::from_index(STATE_TABLE.len() as u32).is_none());
        let op = StateOperation::from_name("alphablendenable").unwrap();
        assert_eq!(op.info().class, StateClass::RenderState);
        assert_eq!(op.info().op, table::D3DRS_ALPHABLENDENABLE);
    }

    #[test]
    fn value_kind_raw_round_trips() {
        for raw in 0..4 {
            assert_eq!(StateValueKind::from_raw(raw).unwrap().raw(), raw);
        }
        assert_eq!(StateValueKind::from_raw(4), None);
    }

    #[test]
    fn render_value_only_for_constant_render_states() {
        let blend = State::constant(
            StateOperation::from_name("SrcBlend").unwrap(),
            0,
            Parameter::int("", 2),
        );
        assert_eq!(
            blend.render_value().unwrap().unwrap(),
            RenderValue::BlendFactor(BlendFactor::One)
        );

        let texture = State::constant(
            StateOperation::from_name("Texture").unwrap(),
            0,
            Parameter::object("", ParameterType::Texture, ParameterData::Shared(0)),
        );
        assert!(texture.render_value().is_none());
    }

    #[test]
    fn render_state_without_number_is_corrupt() {
        let state = State::constant(
            StateOperation::from_name("ZFunc").unwrap(),
            0,
            Parameter::object("", ParameterType::String, ParameterData::Shared(0)),
        );
        assert_eq!(
            state.render_value().unwrap().unwrap_err().kind(),
            ErrorKind::Corrupt
        );
    }
}
