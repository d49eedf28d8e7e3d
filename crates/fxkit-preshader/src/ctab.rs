//! `CTAB` constant tables.
//!
//! Layout (all little-endian, offsets relative to the start of the table, i.e. the byte right
//! after the `CTAB` FourCC):
//!
//! ```text
//! header (28 bytes): size, creator_offset, version, constant_count, constant_info_offset,
//!                    flags, target_offset
//! constant info (20 bytes each): name_offset, register_set:u16, register_index:u16,
//!                                register_count:u16, reserved:u16, type_info_offset,
//!                                default_value_offset
//! type info (16 bytes): class:u16, type:u16, rows:u16, columns:u16, elements:u16,
//!                       struct_members:u16, struct_member_info_offset
//! ```

use crate::error::CtabError;
use crate::program::RegisterSet;

const HEADER_LEN: usize = 28;
const CONSTANT_INFO_LEN: usize = 20;
const TYPE_INFO_LEN: usize = 16;

/// A parsed constant table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantTable {
    /// Compiler identification string, if present.
    pub creator: Option<String>,
    /// Target profile (e.g. `vs_2_0`), if present.
    pub target: Option<String>,
    /// Raw version field.
    pub version: u32,
    /// Declared constants in table order.
    pub constants: Vec<CtabConstant>,
}

/// One constant declared by a [`ConstantTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CtabConstant {
    /// Constant (parameter) name.
    pub name: String,
    /// Register file the constant is bound to.
    pub register_set: RegisterSet,
    /// First register.
    pub register_index: u16,
    /// Number of registers occupied.
    pub register_count: u16,
    /// Type description, if the table provides one.
    pub type_info: Option<CtabTypeInfo>,
}

/// `D3DXSHADER_TYPEINFO`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CtabTypeInfo {
    /// Raw `D3DXPARAMETER_CLASS`.
    pub class: u16,
    /// Raw `D3DXPARAMETER_TYPE`.
    pub ty: u16,
    /// Row count.
    pub rows: u16,
    /// Column count.
    pub columns: u16,
    /// Array element count (0 or 1 for non-arrays).
    pub elements: u16,
    /// Struct member count.
    pub struct_members: u16,
}

/// Parses a constant table. `bytes` starts right after the `CTAB` FourCC.
pub fn parse_ctab(bytes: &[u8]) -> Result<ConstantTable, CtabError> {
    let creator_offset = read_u32(bytes, 4)? as usize;
    let version = read_u32(bytes, 8)?;
    let constant_count = read_u32(bytes, 12)?;
    let constant_info_offset = read_u32(bytes, 16)? as usize;
    let target_offset = read_u32(bytes, 24)? as usize;

    let count = constant_count as usize;
    if count
        .checked_mul(CONSTANT_INFO_LEN)
        .map_or(true, |n| n > bytes.len())
    {
        return Err(CtabError::TooManyConstants {
            count: constant_count,
        });
    }

    let mut constants = Vec::with_capacity(count);
    for i in 0..count {
        let at = constant_info_offset + i * CONSTANT_INFO_LEN;
        ensure(bytes, at, CONSTANT_INFO_LEN)?;
        let name = read_cstr(bytes, read_u32(bytes, at)? as usize)?;
        let raw_set = read_u16(bytes, at + 4)?;
        let register_set = RegisterSet::from_raw(u32::from(raw_set)).ok_or_else(|| {
            CtabError::InvalidRegisterSet {
                name: name.clone(),
                raw: raw_set,
            }
        })?;
        let register_index = read_u16(bytes, at + 6)?;
        let register_count = read_u16(bytes, at + 8)?;
        let type_info_offset = read_u32(bytes, at + 12)? as usize;
        let type_info = if type_info_offset == 0 {
            None
        } else {
            Some(read_type_info(bytes, type_info_offset)?)
        };
        constants.push(CtabConstant {
            name,
            register_set,
            register_index,
            register_count,
            type_info,
        });
    }

    Ok(ConstantTable {
        creator: optional_cstr(bytes, creator_offset)?,
        target: optional_cstr(bytes, target_offset)?,
        version,
        constants,
    })
}

fn read_type_info(bytes: &[u8], at: usize) -> Result<CtabTypeInfo, CtabError> {
    ensure(bytes, at, TYPE_INFO_LEN)?;
    Ok(CtabTypeInfo {
        class: read_u16(bytes, at)?,
        ty: read_u16(bytes, at + 2)?,
        rows: read_u16(bytes, at + 4)?,
        columns: read_u16(bytes, at + 6)?,
        elements: read_u16(bytes, at + 8)?,
        struct_members: read_u16(bytes, at + 10)?,
    })
}

fn optional_cstr(bytes: &[u8], offset: usize) -> Result<Option<String>, CtabError> {
    // Offset 0 is the table header itself, which never holds a string.
    if offset == 0 || offset < HEADER_LEN {
        return Ok(None);
    }
    read_cstr(bytes, offset).map(Some)
}

fn read_cstr(bytes: &[u8], offset: usize) -> Result<String, CtabError> {
    let tail = bytes.get(offset..).ok_or(CtabError::BadString(offset))?;
    let end = tail
        .iter()
        .position(|&b| b == 0)
        .ok_or(CtabError::BadString(offset))?;
    Ok(String::from_utf8_lossy(&tail[..end]).into_owned())
}

fn ensure(bytes: &[u8], offset: usize, needed: usize) -> Result<(), CtabError> {
    match offset.checked_add(needed) {
        Some(end) if end <= bytes.len() => Ok(()),
        _ => Err(CtabError::Truncated {
            offset,
            needed,
            len: bytes.len(),
        }),
    }
}

fn read_u16(bytes: &[u8], offset: usize) -> Result<u16, CtabError> {
    ensure(bytes, offset, 2)?;
    Ok(u16::from_le_bytes([bytes[offset], bytes[offset + 1]]))
}

fn read_u32(bytes: &[u8], offset: usize) -> Result<u32, CtabError> {
    ensure(bytes, offset, 4)?;
    Ok(u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{build_ctab, CtabEntry};

    fn push_u32(out: &mut Vec<u8>, v: u32) {
        out.extend_from_slice(&v.to_le_bytes());
    }

    fn push_u16(out: &mut Vec<u8>, v: u16) {
        out.extend_from_slice(&v.to_le_bytes());
    }

    #[test]
    fn parse_ctab_constant_table_minimal() {
        let mut chunk = Vec::new();
        push_u32(&mut chunk, 28); // size
        push_u32(&mut chunk, 0); // creator offset
        push_u32(&mut chunk, 0xFFFE_0200); // version
        push_u32(&mut chunk, 1); // constant count
        push_u32(&mut chunk, 28); // constant info offset
        push_u32(&mut chunk, 0); // flags
        push_u32(&mut chunk, 48); // target offset (after entry)

        push_u32(&mut chunk, 55); // name offset
        push_u16(&mut chunk, 2); // register set (float4)
        push_u16(&mut chunk, 4); // register index
        push_u16(&mut chunk, 3); // register count
        push_u16(&mut chunk, 0); // reserved
        push_u32(&mut chunk, 0); // type info offset
        push_u32(&mut chunk, 0); // default value offset

        chunk.extend_from_slice(b"vs_2_0\0");
        chunk.extend_from_slice(b"World\0");

        let ctab = parse_ctab(&chunk).unwrap();
        assert_eq!(ctab.creator, None);
        assert_eq!(ctab.target.as_deref(), Some("vs_2_0"));
        assert_eq!(ctab.constants.len(), 1);
        let c = &ctab.constants[0];
        assert_eq!(c.name, "World");
        assert_eq!(c.register_set, RegisterSet::Float4);
        assert_eq!(c.register_index, 4);
        assert_eq!(c.register_count, 3);
        assert_eq!(c.type_info, None);
    }

    #[test]
    fn builder_output_round_trips_through_parser() {
        let bytes = build_ctab(
            "ps_2_0",
            &[
                CtabEntry::new("Diffuse", RegisterSet::Sampler, 1, 1).with_type(4, 12, 1, 1),
                CtabEntry::new("Tint", RegisterSet::Float4, 0, 1).with_type(1, 3, 1, 4),
            ],
        );
        let ctab = parse_ctab(&bytes).unwrap();
        assert_eq!(ctab.target.as_deref(), Some("ps_2_0"));
        assert_eq!(ctab.constants[0].name, "Diffuse");
        assert_eq!(ctab.constants[0].register_set, RegisterSet::Sampler);
        assert_eq!(ctab.constants[0].type_info.unwrap().ty, 12);
        assert_eq!(ctab.constants[1].type_info.unwrap().columns, 4);
    }

    #[test]
    fn rejects_unknown_register_set() {
        let mut bytes = build_ctab("vs_2_0", &[CtabEntry::new("X", RegisterSet::Float4, 0, 1)]);
        // register_set lives 4 bytes into the first constant info record.
        bytes[28 + 4] = 9;
        let err = parse_ctab(&bytes).unwrap_err();
        assert!(matches!(err, CtabError::InvalidRegisterSet { raw: 9, .. }));
    }

    #[test]
    fn rejects_truncated_header() {
        let err = parse_ctab(&[0u8; 10]).unwrap_err();
        assert!(matches!(err, CtabError::Truncated { .. }));
    }

    #[test]
    fn rejects_absurd_constant_count() {
        let mut bytes = build_ctab("vs_2_0", &[]);
        bytes[12..16].copy_from_slice(&u32::MAX.to_le_bytes());
        let err = parse_ctab(&bytes).unwrap_err();
        assert!(matches!(err, CtabError::TooManyConstants { .. }));
    }
}
