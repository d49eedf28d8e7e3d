//! Analysis of embedded D3D9 (SM1-SM3) shader bytecode.
//!
//! Only the parts an effect runtime needs are decoded: the version token, the `CTAB` constant
//! table, sampler declarations, vertex input declarations and an embedded `PRES` preshader.
//! Instructions are skipped; the bytecode itself is kept verbatim.

use fxkit_preshader::{
    parse_ctab, parse_preshader_tokens, CtabError, Preshader, PreshaderError, RegisterSet,
    CTAB_FOURCC, PRES_FOURCC,
};
use thiserror::Error;
use tracing::{debug, trace};

use crate::error::{preshader_error_kind, ErrorKind};
use crate::limits::MAX_SHADER_BYTECODE_BYTES;

const OPCODE_DCL: u32 = 0x1F;
const OPCODE_COMMENT: u32 = 0xFFFE;
const OPCODE_END: u32 = 0xFFFF;

const REGISTER_TYPE_INPUT: u32 = 1;
const REGISTER_TYPE_SAMPLER: u32 = 10;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShaderError {
    #[error("shader bytecode is empty")]
    Empty,

    #[error("shader bytecode length {0} is not a multiple of 4")]
    UnalignedLength(usize),

    #[error("shader bytecode is {len} bytes, exceeding the limit of {max}")]
    TooLarge { len: usize, max: usize },

    #[error("invalid shader version token {0:#010x}")]
    BadVersion(u32),

    #[error("instruction at token {at_token} needs {needed} tokens, only {remaining} remain")]
    Truncated {
        at_token: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("unsupported vertex input usage {0}")]
    UnknownUsage(u8),

    #[error("constant table: {0}")]
    Ctab(#[from] CtabError),

    #[error("embedded preshader: {0}")]
    Preshader(#[from] PreshaderError),
}

impl ShaderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownUsage(_) => ErrorKind::Unsupported,
            Self::Preshader(err) => preshader_error_kind(err),
            _ => ErrorKind::Corrupt,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Pixel,
}

impl ShaderStage {
    pub fn raw(self) -> u8 {
        match self {
            Self::Vertex => 0,
            Self::Pixel => 1,
        }
    }

    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Vertex),
            1 => Some(Self::Pixel),
            _ => None,
        }
    }
}

/// A constant declared by the shader's constant table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSymbol {
    pub name: String,
    pub register_set: RegisterSet,
    pub register_index: u16,
    pub register_count: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SamplerKind {
    Sampler1D,
    Sampler2D,
    Sampler3D,
    SamplerCube,
}

impl SamplerKind {
    /// From the texture type field of a sampler `dcl` token.
    fn from_dcl(raw: u32) -> Option<Self> {
        match raw {
            2 => Some(Self::Sampler2D),
            3 => Some(Self::SamplerCube),
            4 => Some(Self::Sampler3D),
            _ => None,
        }
    }

    /// From a `D3DXPARAMETER_TYPE` in the constant table.
    fn from_parameter_type(raw: u16) -> Option<Self> {
        match raw {
            11 => Some(Self::Sampler1D),
            12 => Some(Self::Sampler2D),
            13 => Some(Self::Sampler3D),
            14 => Some(Self::SamplerCube),
            _ => None,
        }
    }

    pub fn raw(self) -> u8 {
        match self {
            Self::Sampler1D => 0,
            Self::Sampler2D => 1,
            Self::Sampler3D => 2,
            Self::SamplerCube => 3,
        }
    }

    pub fn from_raw(raw: u8) -> Option<Self> {
        Some(match raw {
            0 => Self::Sampler1D,
            1 => Self::Sampler2D,
            2 => Self::Sampler3D,
            3 => Self::SamplerCube,
            _ => return None,
        })
    }
}

/// A sampler used by the shader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplerBinding {
    /// Sampler parameter name from the constant table.
    pub name: String,
    /// Texture parameter bound to the sampler. Empty until the effect's sampler states have
    /// been resolved.
    pub parameter: String,
    pub kind: SamplerKind,
    pub texture_unit: u32,
}

/// `D3DDECLUSAGE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexUsage {
    Position,
    BlendWeight,
    BlendIndices,
    Normal,
    PSize,
    TexCoord,
    Tangent,
    Binormal,
    TessFactor,
    PositionT,
    Color,
    Fog,
    Depth,
    Sample,
}

impl VertexUsage {
    pub fn from_raw(raw: u8) -> Option<Self> {
        Some(match raw {
            0 => Self::Position,
            1 => Self::BlendWeight,
            2 => Self::BlendIndices,
            3 => Self::Normal,
            4 => Self::PSize,
            5 => Self::TexCoord,
            6 => Self::Tangent,
            7 => Self::Binormal,
            8 => Self::TessFactor,
            9 => Self::PositionT,
            10 => Self::Color,
            11 => Self::Fog,
            12 => Self::Depth,
            13 => Self::Sample,
            _ => return None,
        })
    }

    pub fn raw(self) -> u8 {
        self as u8
    }
}

/// A vertex shader input declared with `dcl_<usage> v#`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexAttribute {
    pub usage: VertexUsage,
    pub usage_index: u8,
    /// Input register name, e.g. `v0`.
    pub name: String,
}

/// An analysed shader object.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderBlob {
    pub stage: ShaderStage,
    pub major: u8,
    pub minor: u8,
    pub symbols: Vec<ShaderSymbol>,
    pub samplers: Vec<SamplerBinding>,
    /// Vertex shaders only.
    pub attributes: Vec<VertexAttribute>,
    pub preshader: Option<Preshader>,
    pub bytecode: Vec<u8>,
}

impl ShaderBlob {
    pub fn parse(bytes: &[u8]) -> Result<Self, ShaderError> {
        if bytes.is_empty() {
            return Err(ShaderError::Empty);
        }
        if bytes.len() > MAX_SHADER_BYTECODE_BYTES {
            return Err(ShaderError::TooLarge {
                len: bytes.len(),
                max: MAX_SHADER_BYTECODE_BYTES,
            });
        }
        if bytes.len() % 4 != 0 {
            return Err(ShaderError::UnalignedLength(bytes.len()));
        }
        let tokens: Vec<u32> = bytes
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();

        let version = tokens[0];
        let stage = match version >> 16 {
            0xFFFE => ShaderStage::Vertex,
            0xFFFF => ShaderStage::Pixel,
            _ => return Err(ShaderError::BadVersion(version)),
        };
        let major = ((version >> 8) & 0xFF) as u8;
        let minor = (version & 0xFF) as u8;

        let mut blob = Self {
            stage,
            major,
            minor,
            symbols: Vec::new(),
            samplers: Vec::new(),
            attributes: Vec::new(),
            preshader: None,
            bytecode: bytes.to_vec(),
        };
        // Sampler texture types from `dcl_2d s#` and friends, keyed by register.
        let mut sampler_decls: Vec<(u32, SamplerKind)> = Vec::new();

        let mut pos = 1;
        while pos < tokens.len() {
            let at_token = pos;
            let token = tokens[pos];
            pos += 1;
            let opcode = token & 0xFFFF;

            if opcode == OPCODE_END {
                break;
            }

            if opcode == OPCODE_COMMENT {
                let len = ((token >> 16) & 0x7FFF) as usize;
                let payload = tokens
                    .get(pos..pos + len)
                    .ok_or(ShaderError::Truncated {
                        at_token,
                        needed: len,
                        remaining: tokens.len() - pos,
                    })?;
                match payload.first() {
                    Some(&CTAB_FOURCC) => {
                        let ctab: Vec<u8> =
                            payload[1..].iter().flat_map(|t| t.to_le_bytes()).collect();
                        blob.read_constant_table(&ctab)?;
                    }
                    Some(&PRES_FOURCC) => {
                        trace!(tokens = len, "embedded preshader");
                        blob.preshader = Some(parse_preshader_tokens(&tokens[at_token..pos + len])?);
                    }
                    _ => debug!(tokens = len, "skipping shader comment block"),
                }
                pos += len;
                continue;
            }

            let len = if major >= 2 {
                ((token >> 24) & 0xF) as usize
            } else {
                // SM1 has no length field; parameter tokens carry bit 31.
                tokens[pos..].iter().take_while(|t| *t & 0x8000_0000 != 0).count()
            };
            let operands = tokens.get(pos..pos + len).ok_or(ShaderError::Truncated {
                at_token,
                needed: len,
                remaining: tokens.len() - pos,
            })?;
            pos += len;

            if opcode == OPCODE_DCL {
                let [decl, dst, ..] = operands else {
                    return Err(ShaderError::Truncated {
                        at_token,
                        needed: 2,
                        remaining: operands.len(),
                    });
                };
                let register_type = ((dst >> 28) & 0x7) | ((dst >> 8) & 0x18);
                let register = dst & 0x7FF;
                match register_type {
                    REGISTER_TYPE_SAMPLER => {
                        if let Some(kind) = SamplerKind::from_dcl((decl >> 27) & 0xF) {
                            sampler_decls.push((register, kind));
                        }
                    }
                    REGISTER_TYPE_INPUT if stage == ShaderStage::Vertex => {
                        let raw_usage = (decl & 0x1F) as u8;
                        let usage =
                            VertexUsage::from_raw(raw_usage).ok_or(ShaderError::UnknownUsage(raw_usage))?;
                        blob.attributes.push(VertexAttribute {
                            usage,
                            usage_index: ((decl >> 16) & 0xF) as u8,
                            name: format!("v{register}"),
                        });
                    }
                    _ => {}
                }
            }
        }

        for (register, kind) in sampler_decls {
            if let Some(binding) = blob
                .samplers
                .iter_mut()
                .find(|s| s.texture_unit == register)
            {
                binding.kind = kind;
            }
        }

        trace!(
            ?stage,
            major,
            minor,
            symbols = blob.symbols.len(),
            samplers = blob.samplers.len(),
            attributes = blob.attributes.len(),
            "analysed shader"
        );
        Ok(blob)
    }

    fn read_constant_table(&mut self, bytes: &[u8]) -> Result<(), ShaderError> {
        let table = parse_ctab(bytes)?;
        for constant in table.constants {
            if constant.register_set == RegisterSet::Sampler {
                let kind = constant
                    .type_info
                    .and_then(|t| SamplerKind::from_parameter_type(t.ty))
                    .unwrap_or(SamplerKind::Sampler2D);
                self.samplers.push(SamplerBinding {
                    name: constant.name.clone(),
                    parameter: String::new(),
                    kind,
                    texture_unit: u32::from(constant.register_index),
                });
            }
            self.symbols.push(ShaderSymbol {
                name: constant.name,
                register_set: constant.register_set,
                register_index: constant.register_index,
                register_count: constant.register_count,
            });
        }
        Ok(())
    }

    pub fn symbol(&self, name: &str) -> Option<&ShaderSymbol> {
        self.symbols.iter().find(|s| s.name == name)
    }

    pub fn sampler(&self, name: &str) -> Option<&SamplerBinding> {
        self.samplers.iter().find(|s| s.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::ShaderBuilder;
    use fxkit_preshader::test_utils::{CtabEntry, PreshaderAssembler};
    use fxkit_preshader::Opcode;
    use pretty_assertions::assert_eq;

    #[test]
    fn vertex_shader_inputs_and_constants() {
        let bytes = ShaderBuilder::vertex(3, 0)
            .constants(&[CtabEntry::new("WorldViewProj", RegisterSet::Float4, 0, 4)])
            .dcl_input(0, 0, 0)
            .dcl_input(5, 1, 3)
            .build();
        let blob = ShaderBlob::parse(&bytes).unwrap();

        assert_eq!(blob.stage, ShaderStage::Vertex);
        assert_eq!((blob.major, blob.minor), (3, 0));
        assert_eq!(
            blob.symbols,
            vec![ShaderSymbol {
                name: "WorldViewProj".into(),
                register_set: RegisterSet::Float4,
                register_index: 0,
                register_count: 4,
            }]
        );
        assert_eq!(
            blob.attributes,
            vec![
                VertexAttribute {
                    usage: VertexUsage::Position,
                    usage_index: 0,
                    name: "v0".into(),
                },
                VertexAttribute {
                    usage: VertexUsage::TexCoord,
                    usage_index: 1,
                    name: "v3".into(),
                },
            ]
        );
        assert_eq!(blob.bytecode, bytes);
        assert!(blob.preshader.is_none());
    }

    #[test]
    fn pixel_shader_samplers_take_dcl_kind() {
        let bytes = ShaderBuilder::pixel(2, 0)
            .constants(&[
                CtabEntry::new("DiffuseSampler", RegisterSet::Sampler, 0, 1),
                CtabEntry::new("EnvSampler", RegisterSet::Sampler, 1, 1),
            ])
            .dcl_sampler(1, 3)
            .build();
        let blob = ShaderBlob::parse(&bytes).unwrap();

        assert_eq!(blob.stage, ShaderStage::Pixel);
        assert!(blob.attributes.is_empty());
        assert_eq!(blob.samplers.len(), 2);
        assert_eq!(blob.sampler("DiffuseSampler").unwrap().kind, SamplerKind::Sampler2D);
        let env = blob.sampler("EnvSampler").unwrap();
        assert_eq!(env.kind, SamplerKind::SamplerCube);
        assert_eq!(env.texture_unit, 1);
        assert_eq!(env.parameter, "");
    }

    #[test]
    fn embedded_preshader_is_decoded() {
        let mut pres = PreshaderAssembler::new();
        let two = pres.literal(2.0);
        pres.instruction(
            Opcode::Mov,
            1,
            &[two],
            fxkit_preshader::Operand::output(0),
        );
        let bytes = ShaderBuilder::pixel(2, 0)
            .preshader(pres.assemble_pres_tokens())
            .build();
        let blob = ShaderBlob::parse(&bytes).unwrap();
        let preshader = blob.preshader.unwrap();
        assert_eq!(preshader.literals(), &[2.0]);
        assert_eq!(preshader.instructions().len(), 1);
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(ShaderBlob::parse(&[]), Err(ShaderError::Empty));
        assert_eq!(
            ShaderBlob::parse(&[0, 1, 2]),
            Err(ShaderError::UnalignedLength(3))
        );
        assert_eq!(
            ShaderBlob::parse(&0x4658_0201u32.to_le_bytes()),
            Err(ShaderError::BadVersion(0x4658_0201))
        );

        // Comment claiming more tokens than remain.
        let mut bytes = 0xFFFF_0200u32.to_le_bytes().to_vec();
        bytes.extend_from_slice(&((8u32 << 16) | OPCODE_COMMENT).to_le_bytes());
        assert!(matches!(
            ShaderBlob::parse(&bytes),
            Err(ShaderError::Truncated { at_token: 1, .. })
        ));
    }

    #[test]
    fn unknown_vertex_usage_is_unsupported() {
        let bytes = ShaderBuilder::vertex(2, 0).dcl_input(20, 0, 0).build();
        let err = ShaderBlob::parse(&bytes).unwrap_err();
        assert_eq!(err, ShaderError::UnknownUsage(20));
        assert_eq!(err.kind(), ErrorKind::Unsupported);
    }
}
