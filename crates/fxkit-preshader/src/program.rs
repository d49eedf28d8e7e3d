use crate::error::PreshaderError;
use crate::opcode::{Opcode, OperandKind};

/// Maximum number of scalar elements an instruction may produce.
pub const MAX_ELEMENTS: u8 = 4;
/// Maximum number of operands (sources + destination) of one instruction.
pub const MAX_OPERANDS: usize = 4;
/// Maximum number of 4-component registers in any register file (inputs, temps, outputs).
pub const MAX_REGISTERS: u32 = 4096;

/// Storage class a shader or preshader constant is bound to (`D3DXREGISTER_SET`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterSet {
    /// `b#` registers.
    Bool,
    /// `i#` registers.
    Int4,
    /// `c#` registers.
    Float4,
    /// `s#` registers.
    Sampler,
}

impl RegisterSet {
    /// Decodes a raw `D3DXREGISTER_SET` value.
    pub fn from_raw(raw: u32) -> Option<Self> {
        Some(match raw {
            0 => Self::Bool,
            1 => Self::Int4,
            2 => Self::Float4,
            3 => Self::Sampler,
            _ => return None,
        })
    }

    /// Returns the raw `D3DXREGISTER_SET` value.
    pub fn raw(self) -> u32 {
        match self {
            Self::Bool => 0,
            Self::Int4 => 1,
            Self::Float4 => 2,
            Self::Sampler => 3,
        }
    }
}

/// Binds an effect parameter to a range of input registers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreshaderSymbol {
    /// Name of the effect parameter feeding the registers.
    pub name: String,
    /// Register file the symbol lives in.
    pub register_set: RegisterSet,
    /// First register.
    pub register_index: u32,
    /// Number of consecutive registers.
    pub register_count: u32,
}

/// One instruction operand. `index` addresses a scalar component, not a whole register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Operand {
    /// Register file.
    pub kind: OperandKind,
    /// Component offset into the register file (`register * 4 + component`).
    pub index: u32,
}

impl Operand {
    /// Literal pool entry `index`.
    pub const fn literal(index: u32) -> Self {
        Self {
            kind: OperandKind::Literal,
            index,
        }
    }

    /// Input register component `index`.
    pub const fn input(index: u32) -> Self {
        Self {
            kind: OperandKind::Input,
            index,
        }
    }

    /// Output register component `index`.
    pub const fn output(index: u32) -> Self {
        Self {
            kind: OperandKind::Output,
            index,
        }
    }

    /// Temporary register component `index`.
    pub const fn temp(index: u32) -> Self {
        Self {
            kind: OperandKind::Temp,
            index,
        }
    }
}

/// A decoded preshader instruction. The last operand is the destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Operation.
    pub opcode: Opcode,
    /// Number of destination elements written (0..=4).
    pub element_count: u8,
    /// Source operands followed by the destination operand.
    pub operands: Vec<Operand>,
}

impl Instruction {
    /// Creates an instruction from its source operands and destination.
    pub fn new(opcode: Opcode, element_count: u8, sources: &[Operand], destination: Operand) -> Self {
        let mut operands = Vec::with_capacity(sources.len() + 1);
        operands.extend_from_slice(sources);
        operands.push(destination);
        Self {
            opcode,
            element_count,
            operands,
        }
    }

    /// Source operands.
    pub fn sources(&self) -> &[Operand] {
        match self.operands.split_last() {
            Some((_, sources)) => sources,
            None => &[],
        }
    }

    /// Destination operand.
    pub fn destination(&self) -> Option<Operand> {
        self.operands.last().copied()
    }

    fn validate(&self, index: usize) -> Result<(), PreshaderError> {
        let malformed = |detail: String| PreshaderError::MalformedInstruction { index, detail };
        if self.element_count > MAX_ELEMENTS {
            return Err(malformed(format!(
                "element count {} exceeds {MAX_ELEMENTS}",
                self.element_count
            )));
        }
        if self.operands.is_empty() || self.operands.len() > MAX_OPERANDS {
            return Err(malformed(format!(
                "operand count {} outside 1..={MAX_OPERANDS}",
                self.operands.len()
            )));
        }
        if self.opcode != Opcode::Nop && self.sources().len() != self.opcode.source_count() {
            return Err(malformed(format!(
                "{} takes {} sources, got {}",
                self.opcode.name(),
                self.opcode.source_count(),
                self.sources().len()
            )));
        }
        Ok(())
    }

    /// Highest component index (exclusive) touched by `operand_slot`.
    fn component_end(&self, operand_slot: usize) -> u32 {
        let operand = self.operands[operand_slot];
        let is_destination = operand_slot + 1 == self.operands.len();
        let span = if operand_slot == 0 && !is_destination && self.opcode.is_scalar() {
            1
        } else {
            u32::from(self.element_count.max(1))
        };
        operand.index.saturating_add(span)
    }
}

/// A decoded preshader program.
///
/// Constructed through [`Preshader::new`] (or the bytecode parser), which validates the
/// structural limits of every instruction and derives the register file sizes.
#[derive(Debug, Clone, PartialEq)]
pub struct Preshader {
    symbols: Vec<PreshaderSymbol>,
    literals: Vec<f64>,
    instructions: Vec<Instruction>,
    input_register_count: u32,
    temp_register_count: u32,
    output_register_count: u32,
}

impl Preshader {
    /// Validates `instructions` and sizes the input/temp register files.
    ///
    /// The input file covers every register named by a symbol or read by an instruction; the
    /// temp file covers every temp component read or written.
    pub fn new(
        symbols: Vec<PreshaderSymbol>,
        literals: Vec<f64>,
        instructions: Vec<Instruction>,
    ) -> Result<Self, PreshaderError> {
        let mut input_components: u32 = 0;
        for symbol in &symbols {
            let end = symbol
                .register_index
                .checked_add(symbol.register_count)
                .filter(|&end| end <= MAX_REGISTERS)
                .ok_or_else(|| PreshaderError::SymbolOutOfRange {
                    name: symbol.name.clone(),
                    register_index: symbol.register_index,
                    register_count: symbol.register_count,
                })?;
            input_components = input_components.max(end * 4);
        }
        let mut temp_components: u32 = 0;
        let mut output_components: u32 = 0;

        for (index, instruction) in instructions.iter().enumerate() {
            instruction.validate(index)?;
            for (slot, operand) in instruction.operands.iter().enumerate() {
                let end = instruction.component_end(slot);
                if operand.kind != OperandKind::Literal && end > MAX_REGISTERS * 4 {
                    return Err(PreshaderError::MalformedInstruction {
                        index,
                        detail: format!(
                            "{:?} operand {} addresses component {}, beyond {MAX_REGISTERS} registers",
                            operand.kind,
                            slot,
                            end - 1
                        ),
                    });
                }
                match operand.kind {
                    OperandKind::Input => input_components = input_components.max(end),
                    OperandKind::Temp => temp_components = temp_components.max(end),
                    OperandKind::Output => output_components = output_components.max(end),
                    OperandKind::Literal => {}
                }
            }
        }

        Ok(Self {
            symbols,
            literals,
            instructions,
            input_register_count: input_components.div_ceil(4),
            temp_register_count: temp_components.div_ceil(4),
            output_register_count: output_components.div_ceil(4),
        })
    }

    /// Parameters feeding the input registers.
    pub fn symbols(&self) -> &[PreshaderSymbol] {
        &self.symbols
    }

    /// Literal pool.
    pub fn literals(&self) -> &[f64] {
        &self.literals
    }

    /// Instructions in execution order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Number of 4-component input registers.
    pub fn input_register_count(&self) -> u32 {
        self.input_register_count
    }

    /// Number of 4-component temporary registers.
    pub fn temp_register_count(&self) -> u32 {
        self.temp_register_count
    }

    /// Number of 4-component output registers written or read by the program.
    pub fn output_register_count(&self) -> u32 {
        self.output_register_count
    }
}
