//! Decoding and re-encoding of D3DX-style shader effect bundles.
//!
//! Two container formats decode into the same [`Effect`] graph:
//!
//! - [`legacy::parse_bundle`] reads compiled `fx_2_0` bundles, resolving shared objects and
//!   resource records in a second pass once every record has been read.
//! - [`compact::read_effect`] / [`compact::write_effect`] handle the compact, versioned cache
//!   format used at runtime.
//!
//! States driven by preshader expressions are evaluated through [`expression`], on top of
//! the interpreter in [`fxkit_preshader`].
//!
//! All input is treated as untrusted: malformed bytes produce an [`EffectError`], never a
//! panic. See [`limits`] for the bounds applied to counts read from the input.

#![forbid(unsafe_code)]

pub mod compact;
pub mod cursor;
mod error;
pub mod expression;
pub mod legacy;
pub mod limits;
pub mod model;
pub mod shader;
pub mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use crate::error::{EffectError, ErrorKind, Result};
pub use crate::expression::{evaluate_constant, ExpressionBinding, ExpressionError};
pub use crate::model::{
    Effect, Expression, ObjectId, Parameter, ParameterClass, ParameterData, ParameterType, Pass,
    Technique,
};
pub use crate::shader::{ShaderBlob, ShaderError, ShaderStage};
pub use crate::state::{State, StateOperation, StateValueKind};

pub use fxkit_preshader::{ParameterSource, ParameterValue, Preshader, PreshaderError};

/// Decodes `bytes` as either container format, chosen by its leading magic or tag.
pub fn read_any(bytes: &[u8]) -> Result<Effect> {
    if bytes.starts_with(&compact::MAGIC) {
        compact::read_effect(bytes)
    } else {
        legacy::parse_bundle(bytes)
    }
}
