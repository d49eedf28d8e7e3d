//! Preshader bytecode decoding.
//!
//! The stream is a sequence of little-endian `u32` tokens:
//!
//! ```text
//! [comment(PRES) wrapper]
//!   version            0x4658_xxyy ("FX" + major/minor)
//!   comment(CTAB)      constant table describing the input registers
//!   comment(CLIT)      count, then `count` f64 literals (two tokens each)
//!   comment(FXLC)      count, then `count` instructions
//!   comment(PRSI)      register mapping, ignored
//!   end                0x0000_FFFF
//! ```
//!
//! A comment token is `(len << 16) | 0xFFFE`; the first of its `len` payload tokens is the
//! block FourCC.

use tracing::{debug, trace};

use crate::ctab::parse_ctab;
use crate::error::PreshaderError;
use crate::opcode::{Opcode, OperandKind};
use crate::program::{Instruction, Operand, Preshader, PreshaderSymbol, MAX_OPERANDS};

/// FourCC of the comment wrapping a preshader embedded in shader bytecode.
pub const PRES_FOURCC: u32 = u32::from_le_bytes(*b"PRES");
/// FourCC of the literal pool block.
pub const CLIT_FOURCC: u32 = u32::from_le_bytes(*b"CLIT");
/// FourCC of the instruction block.
pub const FXLC_FOURCC: u32 = u32::from_le_bytes(*b"FXLC");
/// FourCC of the constant table block.
pub const CTAB_FOURCC: u32 = u32::from_le_bytes(*b"CTAB");
/// FourCC of the register mapping block.
pub const PRSI_FOURCC: u32 = u32::from_le_bytes(*b"PRSI");

/// Mask selecting the tag half of the version token.
pub const PRESHADER_VERSION_MASK: u32 = 0xFFFF_0000;
/// Tag half of a preshader version token.
pub const PRESHADER_VERSION_TAG: u32 = 0x4658_0000;

const COMMENT_MARKER: u32 = 0xFFFE;
const END_TOKEN: u32 = 0x0000_FFFF;

/// Splits `bytes` into little-endian tokens.
pub fn tokens_from_le_bytes(bytes: &[u8]) -> Result<Vec<u32>, PreshaderError> {
    if bytes.len() % 4 != 0 {
        return Err(PreshaderError::UnalignedLength(bytes.len()));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

/// Decodes preshader bytecode given as raw bytes.
pub fn parse_preshader(bytes: &[u8]) -> Result<Preshader, PreshaderError> {
    let tokens = tokens_from_le_bytes(bytes)?;
    parse_preshader_tokens(&tokens)
}

/// Decodes preshader bytecode given as tokens.
pub fn parse_preshader_tokens(tokens: &[u32]) -> Result<Preshader, PreshaderError> {
    let tokens = unwrap_pres(tokens)?;

    let version = *tokens.first().ok_or(PreshaderError::Truncated("version"))?;
    if version & PRESHADER_VERSION_MASK != PRESHADER_VERSION_TAG {
        return Err(PreshaderError::BadVersion(version));
    }

    let mut symbols = Vec::new();
    let mut literals = Vec::new();
    let mut instructions = None;

    let mut pos = 1;
    while pos < tokens.len() {
        let token = tokens[pos];
        if token == END_TOKEN {
            break;
        }
        let Some(len) = comment_len(token) else {
            return Err(PreshaderError::UnexpectedToken { token, index: pos });
        };
        let block = tokens
            .get(pos + 1..pos + 1 + len)
            .ok_or(PreshaderError::Truncated("comment block"))?;
        pos += 1 + len;

        let Some((&fourcc, body)) = block.split_first() else {
            continue;
        };
        match fourcc {
            CLIT_FOURCC => literals = parse_literals(body)?,
            FXLC_FOURCC => instructions = Some(parse_instructions(body)?),
            CTAB_FOURCC => symbols = parse_symbols(body)?,
            PRSI_FOURCC => trace!("skipping PRSI block ({} tokens)", body.len()),
            other => debug!(
                "skipping unknown preshader block {:?}",
                String::from_utf8_lossy(&other.to_le_bytes())
            ),
        }
    }

    let instructions = instructions.ok_or(PreshaderError::MissingBlock("FXLC"))?;
    trace!(
        symbols = symbols.len(),
        literals = literals.len(),
        instructions = instructions.len(),
        "decoded preshader"
    );
    Preshader::new(symbols, literals, instructions)
}

fn comment_len(token: u32) -> Option<usize> {
    ((token & 0xFFFF) == COMMENT_MARKER).then_some(((token >> 16) & 0x7FFF) as usize)
}

/// Strips an optional `PRES` comment wrapper.
fn unwrap_pres(tokens: &[u32]) -> Result<&[u32], PreshaderError> {
    if let [first, PRES_FOURCC, ..] = tokens {
        if let Some(len) = comment_len(*first) {
            // `len` counts the FourCC itself.
            return tokens
                .get(2..1 + len)
                .ok_or(PreshaderError::Truncated("PRES block"));
        }
    }
    Ok(tokens)
}

fn parse_literals(body: &[u32]) -> Result<Vec<f64>, PreshaderError> {
    let (&count, rest) = body
        .split_first()
        .ok_or(PreshaderError::Truncated("CLIT count"))?;
    let count = count as usize;
    let needed = count
        .checked_mul(2)
        .filter(|&n| n <= rest.len())
        .ok_or(PreshaderError::Truncated("CLIT literals"))?;
    Ok(rest[..needed]
        .chunks_exact(2)
        .map(|pair| f64::from_bits(u64::from(pair[0]) | (u64::from(pair[1]) << 32)))
        .collect())
}

fn parse_symbols(body: &[u32]) -> Result<Vec<PreshaderSymbol>, PreshaderError> {
    let bytes: Vec<u8> = body.iter().flat_map(|t| t.to_le_bytes()).collect();
    let table = parse_ctab(&bytes)?;
    Ok(table
        .constants
        .into_iter()
        .map(|c| PreshaderSymbol {
            name: c.name,
            register_set: c.register_set,
            register_index: u32::from(c.register_index),
            register_count: u32::from(c.register_count),
        })
        .collect())
}

struct TokenReader<'a> {
    tokens: &'a [u32],
    pos: usize,
}

impl TokenReader<'_> {
    fn next(&mut self, what: &'static str) -> Result<u32, PreshaderError> {
        let token = *self
            .tokens
            .get(self.pos)
            .ok_or(PreshaderError::Truncated(what))?;
        self.pos += 1;
        Ok(token)
    }
}

fn parse_instructions(body: &[u32]) -> Result<Vec<Instruction>, PreshaderError> {
    let mut reader = TokenReader {
        tokens: body,
        pos: 0,
    };
    let count = reader.next("FXLC count")? as usize;
    // Every instruction takes at least two tokens.
    if count > body.len() / 2 {
        return Err(PreshaderError::Truncated("FXLC instructions"));
    }

    let mut instructions = Vec::with_capacity(count);
    for index in 0..count {
        let token = reader.next("instruction token")?;
        let raw_opcode = (token >> 16) as u16;
        let opcode =
            Opcode::from_raw(raw_opcode).ok_or(PreshaderError::UnknownOpcode(raw_opcode))?;
        let element_count = (token & 0xFF) as u8;

        let source_count = reader.next("operand count")? as usize;
        let operand_count = source_count.saturating_add(1);
        if operand_count > MAX_OPERANDS {
            return Err(PreshaderError::MalformedInstruction {
                index,
                detail: format!("{operand_count} operands"),
            });
        }

        let mut operands = Vec::with_capacity(operand_count);
        for _ in 0..operand_count {
            let array_count = reader.next("operand array count")?;
            let raw_kind = reader.next("operand type")?;
            let operand_index = reader.next("operand index")?;
            if array_count > 0 {
                return Err(PreshaderError::RelativeAddressing(index));
            }
            let kind = OperandKind::from_raw(raw_kind)
                .ok_or(PreshaderError::UnknownOperandKind(raw_kind))?;
            operands.push(Operand {
                kind,
                index: operand_index,
            });
        }

        if opcode == Opcode::Nop {
            trace!(index, "skipping nop");
            continue;
        }
        if let Some(dst) = operands.last() {
            if !dst.kind.is_destination() {
                return Err(PreshaderError::MalformedInstruction {
                    index,
                    detail: format!("destination operand is {:?}", dst.kind),
                });
            }
        }
        instructions.push(Instruction {
            opcode,
            element_count,
            operands,
        });
    }
    Ok(instructions)
}
