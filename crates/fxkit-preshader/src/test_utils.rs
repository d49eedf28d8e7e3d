//! Builders for synthetic `CTAB` tables and preshader bytecode.

use crate::ctab::CtabTypeInfo;
use crate::opcode::Opcode;
use crate::parse::{CLIT_FOURCC, CTAB_FOURCC, FXLC_FOURCC, PRESHADER_VERSION_TAG, PRES_FOURCC};
use crate::program::{Operand, RegisterSet};

const CTAB_HEADER_LEN: usize = 28;
const CTAB_ENTRY_LEN: usize = 20;
const CTAB_TYPE_LEN: usize = 16;

/// One constant for [`build_ctab`].
#[derive(Debug, Clone)]
pub struct CtabEntry {
    name: String,
    register_set: RegisterSet,
    register_index: u16,
    register_count: u16,
    type_info: Option<CtabTypeInfo>,
}

impl CtabEntry {
    /// Constant without type information.
    pub fn new(name: &str, register_set: RegisterSet, register_index: u16, register_count: u16) -> Self {
        Self {
            name: name.to_owned(),
            register_set,
            register_index,
            register_count,
            type_info: None,
        }
    }

    /// Attaches a `D3DXSHADER_TYPEINFO` record.
    pub fn with_type(mut self, class: u16, ty: u16, rows: u16, columns: u16) -> Self {
        self.type_info = Some(CtabTypeInfo {
            class,
            ty,
            rows,
            columns,
            elements: 1,
            struct_members: 0,
        });
        self
    }
}

fn push_u16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn push_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

/// Builds a constant table (without the `CTAB` FourCC), padded to a multiple of 4 bytes.
///
/// Layout: header, constant infos, type infos, then NUL-terminated strings (target first).
pub fn build_ctab(target: &str, entries: &[CtabEntry]) -> Vec<u8> {
    let types_at = CTAB_HEADER_LEN + entries.len() * CTAB_ENTRY_LEN;
    let type_count = entries.iter().filter(|e| e.type_info.is_some()).count();
    let strings_at = types_at + type_count * CTAB_TYPE_LEN;

    let mut strings = Vec::new();
    let target_offset = strings_at;
    strings.extend_from_slice(target.as_bytes());
    strings.push(0);
    let mut name_offsets = Vec::with_capacity(entries.len());
    for entry in entries {
        name_offsets.push(strings_at + strings.len());
        strings.extend_from_slice(entry.name.as_bytes());
        strings.push(0);
    }

    let mut out = Vec::new();
    push_u32(&mut out, CTAB_HEADER_LEN as u32);
    push_u32(&mut out, 0); // creator
    push_u32(&mut out, 0xFFFF_0200);
    push_u32(&mut out, entries.len() as u32);
    push_u32(&mut out, CTAB_HEADER_LEN as u32);
    push_u32(&mut out, 0); // flags
    push_u32(&mut out, target_offset as u32);

    let mut next_type = types_at;
    for (entry, &name_offset) in entries.iter().zip(&name_offsets) {
        push_u32(&mut out, name_offset as u32);
        push_u16(&mut out, entry.register_set.raw() as u16);
        push_u16(&mut out, entry.register_index);
        push_u16(&mut out, entry.register_count);
        push_u16(&mut out, 0);
        if entry.type_info.is_some() {
            push_u32(&mut out, next_type as u32);
            next_type += CTAB_TYPE_LEN;
        } else {
            push_u32(&mut out, 0);
        }
        push_u32(&mut out, 0); // default value
    }

    for info in entries.iter().filter_map(|e| e.type_info) {
        push_u16(&mut out, info.class);
        push_u16(&mut out, info.ty);
        push_u16(&mut out, info.rows);
        push_u16(&mut out, info.columns);
        push_u16(&mut out, info.elements);
        push_u16(&mut out, info.struct_members);
        push_u32(&mut out, 0);
    }

    out.extend_from_slice(&strings);
    while out.len() % 4 != 0 {
        out.push(0);
    }
    out
}

/// Wraps `payload` in a comment block tagged `fourcc`.
pub fn comment_block(fourcc: u32, payload: &[u32]) -> Vec<u32> {
    let len = (payload.len() + 1) as u32;
    let mut out = Vec::with_capacity(payload.len() + 2);
    out.push((len << 16) | 0xFFFE);
    out.push(fourcc);
    out.extend_from_slice(payload);
    out
}

fn bytes_to_tokens(bytes: &[u8]) -> Vec<u32> {
    bytes
        .chunks(4)
        .map(|c| {
            let mut word = [0u8; 4];
            word[..c.len()].copy_from_slice(c);
            u32::from_le_bytes(word)
        })
        .collect()
}

/// Assembles preshader bytecode from literals, input symbols and instructions.
#[derive(Debug, Default, Clone)]
pub struct PreshaderAssembler {
    literals: Vec<f64>,
    symbols: Vec<CtabEntry>,
    instructions: Vec<u32>,
    instruction_count: u32,
}

impl PreshaderAssembler {
    /// Empty program.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `value` to the literal pool and returns an operand addressing it.
    pub fn literal(&mut self, value: f64) -> Operand {
        self.literals.push(value);
        Operand::literal(self.literals.len() as u32 - 1)
    }

    /// Declares a `Float4` input symbol and returns an operand addressing its first component.
    pub fn input(&mut self, name: &str, register_index: u16, register_count: u16) -> Operand {
        self.symbols.push(CtabEntry::new(
            name,
            RegisterSet::Float4,
            register_index,
            register_count,
        ));
        Operand::input(u32::from(register_index) * 4)
    }

    /// Appends an instruction.
    pub fn instruction(
        &mut self,
        opcode: Opcode,
        element_count: u8,
        sources: &[Operand],
        destination: Operand,
    ) -> &mut Self {
        self.instructions
            .push((u32::from(opcode.raw()) << 16) | u32::from(element_count));
        self.instructions.push(sources.len() as u32);
        for operand in sources.iter().chain(std::iter::once(&destination)) {
            self.instructions.push(0);
            self.instructions.push(operand.kind.raw());
            self.instructions.push(operand.index);
        }
        self.instruction_count += 1;
        self
    }

    /// Token stream starting with the version token.
    pub fn assemble_tokens(&self) -> Vec<u32> {
        let mut tokens = vec![PRESHADER_VERSION_TAG | 0x0201];
        if !self.symbols.is_empty() {
            tokens.extend(comment_block(
                CTAB_FOURCC,
                &bytes_to_tokens(&build_ctab("fx_2_0", &self.symbols)),
            ));
        }
        let mut clit = vec![self.literals.len() as u32];
        for value in &self.literals {
            let bits = value.to_bits();
            clit.push(bits as u32);
            clit.push((bits >> 32) as u32);
        }
        tokens.extend(comment_block(CLIT_FOURCC, &clit));

        let mut fxlc = vec![self.instruction_count];
        fxlc.extend_from_slice(&self.instructions);
        tokens.extend(comment_block(FXLC_FOURCC, &fxlc));
        tokens.push(0x0000_FFFF);
        tokens
    }

    /// Token stream wrapped in a `PRES` comment, as embedded in shader bytecode.
    pub fn assemble_pres_tokens(&self) -> Vec<u32> {
        comment_block(PRES_FOURCC, &self.assemble_tokens())
    }

    /// Little-endian bytes of [`Self::assemble_tokens`].
    pub fn assemble(&self) -> Vec<u8> {
        self.assemble_tokens()
            .iter()
            .flat_map(|t| t.to_le_bytes())
            .collect()
    }
}
