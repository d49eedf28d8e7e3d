use thiserror::Error;

use crate::opcode::Opcode;

/// Errors produced while decoding a constant table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CtabError {
    /// The table ended before a fixed-size structure could be read.
    #[error("CTAB truncated: need {needed} bytes at offset {offset}, table is {len} bytes")]
    Truncated {
        /// Offset of the structure that could not be read.
        offset: usize,
        /// Number of bytes required at `offset`.
        needed: usize,
        /// Total length of the table.
        len: usize,
    },
    /// A string offset points outside the table or the string is not NUL-terminated.
    #[error("CTAB string at offset {0} is out of bounds or unterminated")]
    BadString(usize),
    /// A constant declared a register set outside `{Bool, Int4, Float4, Sampler}`.
    #[error("CTAB constant {name:?} has invalid register set {raw}")]
    InvalidRegisterSet {
        /// Constant name.
        name: String,
        /// Raw register set value.
        raw: u16,
    },
    /// The declared constant count cannot possibly fit into the table.
    #[error("CTAB declares {count} constants, exceeding the table size")]
    TooManyConstants {
        /// Declared constant count.
        count: u32,
    },
}

/// Errors produced while decoding or evaluating a preshader.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PreshaderError {
    /// The byte length of the bytecode is not a multiple of 4.
    #[error("preshader byte length {0} is not a multiple of 4")]
    UnalignedLength(usize),
    /// The token stream ended early.
    #[error("preshader truncated while reading {0}")]
    Truncated(&'static str),
    /// The version token does not carry the `FX` tag.
    #[error("unsupported preshader version token {0:#010x}")]
    BadVersion(u32),
    /// A required comment block is missing.
    #[error("preshader is missing the {0} block")]
    MissingBlock(&'static str),
    /// A non-comment token appeared where only comment blocks are allowed.
    #[error("unexpected preshader token {token:#010x} at index {index}")]
    UnexpectedToken {
        /// The offending token.
        token: u32,
        /// Token index within the stream.
        index: usize,
    },
    /// The raw opcode does not name any known preshader operation.
    #[error("unknown preshader opcode {0:#06x}")]
    UnknownOpcode(u16),
    /// The raw operand register type is not literal/input/output/temp.
    #[error("unknown preshader operand type {0}")]
    UnknownOperandKind(u32),
    /// An instruction violates the structural limits of the instruction set.
    #[error("malformed preshader instruction {index}: {detail}")]
    MalformedInstruction {
        /// Instruction index.
        index: usize,
        /// Description of the violation.
        detail: String,
    },
    /// A constant-table symbol spans registers beyond the supported register file size.
    #[error("preshader symbol {name:?} spans registers {register_index}+{register_count}, beyond the register limit")]
    SymbolOutOfRange {
        /// Symbol name.
        name: String,
        /// First register.
        register_index: u32,
        /// Number of registers.
        register_count: u32,
    },
    /// Operands using relative (array register) addressing are valid but not implemented.
    #[error("preshader instruction {0} uses relative addressing, which is not supported")]
    RelativeAddressing(usize),
    /// The opcode exists but has no defined semantics in this interpreter.
    #[error("unsupported preshader opcode {0:?}")]
    UnsupportedOpcode(Opcode),
    /// The embedded constant table could not be parsed.
    #[error("preshader constant table: {0}")]
    Ctab(#[from] CtabError),
    /// An input symbol names a parameter the caller does not provide.
    #[error("preshader input parameter {0:?} not found")]
    MissingParameter(String),
}
