/// Preshader operations.
///
/// Variants are ordered so that every operation at or after [`SCALAR_OPS`] reads its first
/// source operand as a single scalar that is reused for every destination element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Opcode {
    /// No operation; never writes a destination.
    Nop,
    /// `dst = a`
    Mov,
    /// `dst = -a`
    Neg,
    /// `dst = 1 / a`
    Rcp,
    /// `dst = a - floor(a)`
    Frc,
    /// `dst = e^a`
    Exp,
    /// `dst = ln(a)`
    Log,
    /// `dst = 1 / sqrt(a)`
    Rsq,
    /// `dst = sin(a)`
    Sin,
    /// `dst = cos(a)`
    Cos,
    /// `dst = asin(a)`
    Asin,
    /// `dst = acos(a)`
    Acos,
    /// `dst = atan(a)`
    Atan,
    /// `dst = min(a, b)`
    Min,
    /// `dst = max(a, b)`
    Max,
    /// `dst = a < b ? 1 : 0`
    Lt,
    /// `dst = a >= b ? 1 : 0`
    Ge,
    /// `dst = a + b`
    Add,
    /// `dst = a * b`
    Mul,
    /// `dst = atan2(a, b)`
    Atan2,
    /// `dst = a / b`
    Div,
    /// `dst = a >= 0 ? b : c`
    Cmp,
    /// Conditional move. Encoded by the compiler but not supported.
    Movc,
    /// `dst.* = dot(a, b)`
    Dot,
    /// Noise. Encoded by the compiler but not supported.
    Noise,
    /// `dst = min(a.x, b)`
    MinScalar,
    /// `dst = max(a.x, b)`
    MaxScalar,
    /// `dst = a.x < b ? 1 : 0`
    LtScalar,
    /// `dst = a.x >= b ? 1 : 0`
    GeScalar,
    /// `dst = a.x + b`
    AddScalar,
    /// `dst = a.x * b`
    MulScalar,
    /// `dst = atan2(a.x, b)`
    Atan2Scalar,
    /// `dst = a.x / b`
    DivScalar,
    /// Scalar dot product. Encoded by the compiler but not supported.
    DotScalar,
    /// Scalar noise. Encoded by the compiler but not supported.
    NoiseScalar,
}

/// First opcode whose operand 0 is read as a scalar.
pub const SCALAR_OPS: Opcode = Opcode::MinScalar;

impl Opcode {
    /// Decodes the high half of an `FXLC` instruction token.
    pub fn from_raw(raw: u16) -> Option<Self> {
        Some(match raw {
            0x0000 => Self::Nop,
            0x1000 => Self::Mov,
            0x1010 => Self::Neg,
            0x1030 => Self::Rcp,
            0x1040 => Self::Frc,
            0x1050 => Self::Exp,
            0x1060 => Self::Log,
            0x1070 => Self::Rsq,
            0x1080 => Self::Sin,
            0x1090 => Self::Cos,
            0x10A0 => Self::Asin,
            0x10B0 => Self::Acos,
            0x10C0 => Self::Atan,
            0x2000 => Self::Min,
            0x2010 => Self::Max,
            0x2020 => Self::Lt,
            0x2030 => Self::Ge,
            0x2040 => Self::Add,
            0x2050 => Self::Mul,
            0x2060 => Self::Atan2,
            0x2080 => Self::Div,
            0x3000 => Self::Cmp,
            0x3010 => Self::Movc,
            0x5000 => Self::Dot,
            0x5020 => Self::Noise,
            0xA000 => Self::MinScalar,
            0xA010 => Self::MaxScalar,
            0xA020 => Self::LtScalar,
            0xA030 => Self::GeScalar,
            0xA040 => Self::AddScalar,
            0xA050 => Self::MulScalar,
            0xA060 => Self::Atan2Scalar,
            0xA080 => Self::DivScalar,
            0xD000 => Self::DotScalar,
            0xD020 => Self::NoiseScalar,
            _ => return None,
        })
    }

    /// Returns the raw `FXLC` opcode value.
    #[deny(unreachable_patterns)]
    pub fn raw(self) -> u16 {
        match self {
            Self::Nop => 0x0000,
            Self::Mov => 0x1000,
            Self::Neg => 0x1010,
            Self::Rcp => 0x1030,
            Self::Frc => 0x1040,
            Self::Exp => 0x1050,
            Self::Log => 0x1060,
            Self::Rsq => 0x1070,
            Self::Sin => 0x1080,
            Self::Cos => 0x1090,
            Self::Asin => 0x10A0,
            Self::Acos => 0x10B0,
            Self::Atan => 0x10C0,
            Self::Min => 0x2000,
            Self::Max => 0x2010,
            Self::Lt => 0x2020,
            Self::Ge => 0x2030,
            Self::Add => 0x2040,
            Self::Mul => 0x2050,
            Self::Atan2 => 0x2060,
            Self::Div => 0x2080,
            Self::Cmp => 0x3000,
            Self::Movc => 0x3010,
            Self::Dot => 0x5000,
            Self::Noise => 0x5020,
            Self::MinScalar => 0xA000,
            Self::MaxScalar => 0xA010,
            Self::LtScalar => 0xA020,
            Self::GeScalar => 0xA030,
            Self::AddScalar => 0xA040,
            Self::MulScalar => 0xA050,
            Self::Atan2Scalar => 0xA060,
            Self::DivScalar => 0xA080,
            Self::DotScalar => 0xD000,
            Self::NoiseScalar => 0xD020,
        }
    }

    /// Number of source operands the operation reads.
    pub fn source_count(self) -> usize {
        match self {
            Self::Nop => 0,
            Self::Mov
            | Self::Neg
            | Self::Rcp
            | Self::Frc
            | Self::Exp
            | Self::Log
            | Self::Rsq
            | Self::Sin
            | Self::Cos
            | Self::Asin
            | Self::Acos
            | Self::Atan
            | Self::Noise
            | Self::NoiseScalar => 1,
            Self::Cmp | Self::Movc => 3,
            _ => 2,
        }
    }

    /// `true` if operand 0 is read as a single scalar.
    pub fn is_scalar(self) -> bool {
        self >= SCALAR_OPS
    }

    /// Lower-case mnemonic, as printed by disassemblers.
    pub fn name(self) -> &'static str {
        match self {
            Self::Nop => "nop",
            Self::Mov => "mov",
            Self::Neg => "neg",
            Self::Rcp => "rcp",
            Self::Frc => "frc",
            Self::Exp => "exp",
            Self::Log => "log",
            Self::Rsq => "rsq",
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Asin => "asin",
            Self::Acos => "acos",
            Self::Atan => "atan",
            Self::Min => "min",
            Self::Max => "max",
            Self::Lt => "lt",
            Self::Ge => "ge",
            Self::Add => "add",
            Self::Mul => "mul",
            Self::Atan2 => "atan2",
            Self::Div => "div",
            Self::Cmp => "cmp",
            Self::Movc => "movc",
            Self::Dot => "dot",
            Self::Noise => "noise",
            Self::MinScalar => "min_scalar",
            Self::MaxScalar => "max_scalar",
            Self::LtScalar => "lt_scalar",
            Self::GeScalar => "ge_scalar",
            Self::AddScalar => "add_scalar",
            Self::MulScalar => "mul_scalar",
            Self::Atan2Scalar => "atan2_scalar",
            Self::DivScalar => "div_scalar",
            Self::DotScalar => "dot_scalar",
            Self::NoiseScalar => "noise_scalar",
        }
    }
}

/// Register file addressed by a preshader operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandKind {
    /// Index into the literal pool.
    Literal,
    /// Input register fed from effect parameters.
    Input,
    /// Caller-visible output register.
    Output,
    /// Scratch register private to the interpreter.
    Temp,
}

impl OperandKind {
    /// Decodes the raw `FXLC` register type.
    pub fn from_raw(raw: u32) -> Option<Self> {
        Some(match raw {
            1 => Self::Literal,
            2 => Self::Input,
            4 => Self::Output,
            7 => Self::Temp,
            _ => return None,
        })
    }

    /// Returns the raw `FXLC` register type.
    pub fn raw(self) -> u32 {
        match self {
            Self::Literal => 1,
            Self::Input => 2,
            Self::Output => 4,
            Self::Temp => 7,
        }
    }

    /// `true` for register files an instruction may write.
    pub fn is_destination(self) -> bool {
        matches!(self, Self::Output | Self::Temp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Opcode; 35] = [
        Opcode::Nop,
        Opcode::Mov,
        Opcode::Neg,
        Opcode::Rcp,
        Opcode::Frc,
        Opcode::Exp,
        Opcode::Log,
        Opcode::Rsq,
        Opcode::Sin,
        Opcode::Cos,
        Opcode::Asin,
        Opcode::Acos,
        Opcode::Atan,
        Opcode::Min,
        Opcode::Max,
        Opcode::Lt,
        Opcode::Ge,
        Opcode::Add,
        Opcode::Mul,
        Opcode::Atan2,
        Opcode::Div,
        Opcode::Cmp,
        Opcode::Movc,
        Opcode::Dot,
        Opcode::Noise,
        Opcode::MinScalar,
        Opcode::MaxScalar,
        Opcode::LtScalar,
        Opcode::GeScalar,
        Opcode::AddScalar,
        Opcode::MulScalar,
        Opcode::Atan2Scalar,
        Opcode::DivScalar,
        Opcode::DotScalar,
        Opcode::NoiseScalar,
    ];

    #[test]
    fn raw_values_are_unique_and_decode_back() {
        for op in ALL {
            assert_eq!(Opcode::from_raw(op.raw()), Some(op), "{}", op.name());
        }
        let mut raws: Vec<u16> = ALL.iter().map(|op| op.raw()).collect();
        raws.sort_unstable();
        raws.dedup();
        assert_eq!(raws.len(), ALL.len());
    }

    #[test]
    fn scalar_boundary() {
        assert!(!Opcode::Dot.is_scalar());
        assert!(!Opcode::Noise.is_scalar());
        assert!(Opcode::MinScalar.is_scalar());
        assert!(Opcode::NoiseScalar.is_scalar());
        let scalar_count = ALL.iter().filter(|op| op.is_scalar()).count();
        assert_eq!(scalar_count, 10);
    }

    #[test]
    fn unknown_raw_opcode() {
        assert_eq!(Opcode::from_raw(0x1020), None);
        assert_eq!(OperandKind::from_raw(3), None);
    }
}
