//! Preshader bytecode for D3DX-style effects.
//!
//! A preshader is a short straight-line program produced by the offline effect compiler. It
//! derives shader constants (or array indices) from effect parameter values before a draw call.
//!
//! This crate provides:
//!
//! - A bounds-checked decoder for the `FX` preshader token stream (`CLIT`/`FXLC`/`CTAB` comment
//!   blocks), optionally wrapped in a `PRES` comment as found inside shader bytecode.
//! - A parser for legacy constant tables (`CTAB`), shared with shader reflection.
//! - [`PreshaderVm`], a register-based interpreter evaluating a decoded [`Preshader`].
//!
//! Malformed bytes are reported as [`PreshaderError`]. Decoded programs are trusted: register
//! bounds violations during evaluation are programming errors and panic.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Parser for legacy Direct3D constant tables (`CTAB`).
pub mod ctab;
mod error;
mod opcode;
mod parse;
mod program;
mod vm;

/// Helpers for assembling synthetic preshader bytecode in tests.
///
/// Only available when compiling this crate's own tests, or when the `test-utils` feature is
/// enabled. Not part of the stable API.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use crate::ctab::{parse_ctab, ConstantTable, CtabConstant, CtabTypeInfo};
pub use crate::error::{CtabError, PreshaderError};
pub use crate::opcode::{Opcode, OperandKind, SCALAR_OPS};
pub use crate::parse::{
    parse_preshader, parse_preshader_tokens, tokens_from_le_bytes, CLIT_FOURCC, CTAB_FOURCC,
    FXLC_FOURCC, PRES_FOURCC, PRESHADER_VERSION_MASK, PRESHADER_VERSION_TAG, PRSI_FOURCC,
};
pub use crate::program::{
    Instruction, Operand, Preshader, PreshaderSymbol, RegisterSet, MAX_REGISTERS,
};
pub use crate::vm::{InputClass, ParameterSource, ParameterValue, PreshaderVm};
