use fxkit_preshader::{Instruction, Opcode, Operand, OperandKind, Preshader, PreshaderSymbol, RegisterSet};
use tracing::trace;

use super::*;
use crate::cursor::ByteCursor;
use crate::error::{EffectError, Result};
use crate::limits::{MAX_BLOB_BYTES, MAX_DECODED_PARAMETERS, MAX_TYPE_DEPTH};
use crate::model::{Effect, Expression, Parameter, ParameterClass, ParameterData, ParameterType, Pass, Technique};
use crate::shader::{
    SamplerBinding, SamplerKind, ShaderBlob, ShaderStage, ShaderSymbol, VertexAttribute, VertexUsage,
};
use crate::state::{State, StateOperation, StateValueKind};

/// Decodes a compact effect.
pub fn read_effect(bytes: &[u8]) -> Result<Effect> {
    let mut c = ByteCursor::new(bytes);
    if c.read_array::<4>()? != MAGIC {
        return Err(EffectError::BadMagic);
    }
    let version = c.read_u8()?;
    if version != VERSION {
        return Err(EffectError::VersionMismatch {
            found: version,
            expected: VERSION,
        });
    }

    let object_count = c.read_u8()?;
    let mut r = Reader {
        c,
        object_count: object_count.into(),
        objects: Vec::new(),
        decoded_parameters: 0,
        cloned_bytes: 0,
    };

    for _ in 0..object_count {
        let object = if r.read_bool("object presence")? {
            Some(r.parameter(0)?)
        } else {
            None
        };
        r.objects.push(object);
    }

    let parameter_count = r.c.read_u8()?;
    let mut parameters = Vec::with_capacity(parameter_count.into());
    for _ in 0..parameter_count {
        parameters.push(r.parameter(0)?);
    }

    let technique_count = r.c.read_u8()?;
    let mut techniques = Vec::with_capacity(technique_count.into());
    for _ in 0..technique_count {
        techniques.push(r.technique()?);
    }

    if r.c.remaining() != 0 {
        return Err(EffectError::corrupt(
            "trailing data",
            format!("{} bytes after the last technique", r.c.remaining()),
        ));
    }
    trace!(
        objects = object_count,
        parameters = parameter_count,
        techniques = technique_count,
        "read compact effect"
    );
    Ok(Effect::new(r.objects, parameters, techniques))
}

/// Parameter nodes and payload bytes held by `p`, including everything nested in it.
fn footprint(p: &Parameter) -> (usize, usize) {
    let own = match &p.data {
        ParameterData::Bytes(bytes) => bytes.len(),
        ParameterData::String(s) => s.len(),
        ParameterData::Shader(blob) => blob.bytecode.len(),
        _ => 0,
    };
    let states = p.sampler_states().into_iter().flatten().map(|s| &s.parameter);
    p.annotations
        .iter()
        .chain(&p.elements)
        .chain(&p.members)
        .chain(states)
        .map(footprint)
        .fold((1, own), |(n, b), (cn, cb)| (n + cn, b + cb))
}

struct Reader<'a> {
    c: ByteCursor<'a>,
    /// Size of the object table; shared ids may point at objects decoded later.
    object_count: usize,
    objects: Vec<Option<Parameter>>,
    decoded_parameters: usize,
    /// Payload bytes materialised by back-references. Inline payloads are bounded by the
    /// input length; copies are not.
    cloned_bytes: usize,
}

impl Reader<'_> {
    fn account(&mut self, nodes: usize, bytes: usize) -> Result<()> {
        self.decoded_parameters = self.decoded_parameters.saturating_add(nodes);
        self.cloned_bytes = self.cloned_bytes.saturating_add(bytes);
        if self.decoded_parameters > MAX_DECODED_PARAMETERS {
            return Err(EffectError::corrupt(
                "parameter count",
                format!("effect decodes to more than {MAX_DECODED_PARAMETERS} parameters"),
            ));
        }
        if self.cloned_bytes > MAX_BLOB_BYTES {
            return Err(EffectError::corrupt(
                "shared object references",
                format!("copies exceed {MAX_BLOB_BYTES} bytes"),
            ));
        }
        Ok(())
    }

    fn read_bool(&mut self, what: &'static str) -> Result<bool> {
        match self.c.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(EffectError::corrupt(what, format!("flag byte {other}"))),
        }
    }

    fn read_str(&mut self, what: &'static str) -> Result<String> {
        let len = self.c.read_u8()?;
        let bytes = self.c.read_bytes(len.into())?;
        String::from_utf8(bytes.to_vec())
            .map_err(|err| EffectError::corrupt(what, format!("invalid UTF-8: {err}")))
    }

    fn read_blob(&mut self, what: &'static str) -> Result<&[u8]> {
        let len = self.c.read_u32_usize()?;
        if len > MAX_BLOB_BYTES {
            return Err(EffectError::corrupt(
                what,
                format!("{len} bytes exceeds {MAX_BLOB_BYTES}"),
            ));
        }
        self.c.read_bytes(len)
    }

    fn parameter(&mut self, depth: usize) -> Result<Parameter> {
        if depth > MAX_TYPE_DEPTH {
            return Err(EffectError::corrupt(
                "parameter",
                format!("nesting exceeds {MAX_TYPE_DEPTH} levels"),
            ));
        }

        let backref = self.c.read_u8()?;
        if backref != NO_BACKREF {
            let object = self
                .objects
                .get(usize::from(backref))
                .and_then(Option::as_ref)
                .ok_or_else(|| {
                    EffectError::corrupt(
                        "shared object back-reference",
                        format!("object {backref} has not been decoded"),
                    )
                })?
                .clone();
            let (nodes, bytes) = footprint(&object);
            self.account(nodes, bytes)?;
            return Ok(object);
        }
        self.account(1, 0)?;

        let raw_class = self.c.read_u8()?;
        let class = ParameterClass::from_raw(raw_class.into()).ok_or_else(|| {
            EffectError::corrupt("parameter class", format!("unknown class {raw_class}"))
        })?;
        let name = self.read_str("parameter name")?;
        let raw_type = self.c.read_u8()?;
        let ty = ParameterType::from_raw(raw_type.into()).ok_or_else(|| {
            EffectError::corrupt("parameter type", format!("unknown type {raw_type}"))
        })?;
        let rows = self.c.read_u8()?;
        let columns = self.c.read_u8()?;
        let semantic = self.read_str("parameter semantic")?;

        let mut p = Parameter::new(&name, class, ty, rows.into(), columns.into()).with_semantic(&semantic);

        let annotation_count = self.c.read_u8()?;
        for _ in 0..annotation_count {
            let annotation = self.parameter(depth + 1)?;
            p.annotations.push(annotation);
        }

        let is_struct = self.read_bool("struct flag")?;
        let child_count = self.c.read_u8()?;
        let mut children = Vec::with_capacity(child_count.into());
        for _ in 0..child_count {
            children.push(self.parameter(depth + 1)?);
        }
        if is_struct {
            p.members = children;
        } else {
            p.elements = children;
        }

        p.data = self.data(depth)?;
        Ok(p)
    }

    fn data(&mut self, depth: usize) -> Result<ParameterData> {
        let tag = self.c.read_u8()?;
        Ok(match tag {
            DATA_NONE => ParameterData::None,
            DATA_BYTES => ParameterData::Bytes(self.read_blob("parameter bytes")?.to_vec()),
            DATA_EXPRESSION => {
                let array_name = self.read_str("expression array")?;
                let preshader = self.preshader()?;
                ParameterData::Expression(Box::new(Expression {
                    array_name,
                    preshader,
                }))
            }
            DATA_SHADER => ParameterData::Shader(Box::new(self.shader()?)),
            DATA_SAMPLERS => {
                let count = self.c.read_u8()?;
                let mut states = Vec::with_capacity(count.into());
                for _ in 0..count {
                    states.push(self.state(depth + 1)?);
                }
                ParameterData::Samplers(states)
            }
            DATA_STRING => {
                let bytes = self.read_blob("string object")?;
                let s = String::from_utf8(bytes.to_vec()).map_err(|err| {
                    EffectError::corrupt("string object", format!("invalid UTF-8: {err}"))
                })?;
                ParameterData::String(s)
            }
            DATA_SHARED => {
                let id = self.c.read_u8()?;
                if usize::from(id) >= self.object_count {
                    return Err(EffectError::corrupt(
                        "shared object id",
                        format!("object {id} of a table of {}", self.object_count),
                    ));
                }
                ParameterData::Shared(id.into())
            }
            other => {
                return Err(EffectError::corrupt(
                    "parameter data",
                    format!("unknown data tag {other}"),
                ))
            }
        })
    }

    fn state(&mut self, depth: usize) -> Result<State> {
        let raw_operation = self.c.read_u8()?;
        let operation = StateOperation::from_index(raw_operation.into()).ok_or_else(|| {
            EffectError::corrupt(
                "state operation",
                format!("{raw_operation} is not a known operation"),
            )
        })?;
        let index = self.c.read_u32()?;
        let raw_kind = self.c.read_u8()?;
        let kind = StateValueKind::from_raw(raw_kind).ok_or_else(|| {
            EffectError::corrupt("state value kind", format!("unknown kind {raw_kind}"))
        })?;
        let parameter = self.parameter(depth + 1)?;
        Ok(State {
            operation,
            index,
            kind,
            parameter,
        })
    }

    fn technique(&mut self) -> Result<Technique> {
        let name = self.read_str("technique name")?;
        let annotations = self.annotations()?;
        let pass_count = self.c.read_u8()?;
        let mut passes = Vec::with_capacity(pass_count.into());
        for _ in 0..pass_count {
            let name = self.read_str("pass name")?;
            let annotations = self.annotations()?;
            let state_count = self.c.read_u8()?;
            let mut states = Vec::with_capacity(state_count.into());
            for _ in 0..state_count {
                states.push(self.state(0)?);
            }
            passes.push(Pass {
                name,
                annotations,
                states,
            });
        }
        Ok(Technique {
            name,
            annotations,
            passes,
        })
    }

    fn annotations(&mut self) -> Result<Vec<Parameter>> {
        let count = self.c.read_u8()?;
        let mut annotations = Vec::with_capacity(count.into());
        for _ in 0..count {
            annotations.push(self.parameter(0)?);
        }
        Ok(annotations)
    }

    fn register_set(&mut self) -> Result<RegisterSet> {
        let raw = self.c.read_u8()?;
        RegisterSet::from_raw(raw.into())
            .ok_or_else(|| EffectError::corrupt("register set", format!("unknown set {raw}")))
    }

    fn preshader(&mut self) -> Result<Preshader> {
        let symbol_count = self.c.read_u8()?;
        let mut symbols = Vec::with_capacity(symbol_count.into());
        for _ in 0..symbol_count {
            symbols.push(PreshaderSymbol {
                name: self.read_str("preshader symbol")?,
                register_set: self.register_set()?,
                register_index: self.c.read_u32()?,
                register_count: self.c.read_u32()?,
            });
        }

        let literal_count = self.c.read_u16()?;
        let mut literals = Vec::with_capacity(literal_count.into());
        for _ in 0..literal_count {
            literals.push(f64::from_le_bytes(self.c.read_array()?));
        }

        let instruction_count = self.c.read_u16()?;
        let mut instructions = Vec::with_capacity(instruction_count.into());
        for _ in 0..instruction_count {
            let raw_opcode = self.c.read_u16()?;
            let opcode = Opcode::from_raw(raw_opcode).ok_or_else(|| {
                EffectError::corrupt("preshader opcode", format!("unknown opcode {raw_opcode:#06x}"))
            })?;
            let element_count = self.c.read_u8()?;
            let operand_count = self.c.read_u8()?;
            let mut operands = Vec::with_capacity(operand_count.into());
            for _ in 0..operand_count {
                let raw_kind = self.c.read_u8()?;
                let kind = OperandKind::from_raw(raw_kind.into()).ok_or_else(|| {
                    EffectError::corrupt("operand kind", format!("unknown kind {raw_kind}"))
                })?;
                operands.push(Operand {
                    kind,
                    index: self.c.read_u32()?,
                });
            }
            instructions.push(Instruction {
                opcode,
                element_count,
                operands,
            });
        }

        Ok(Preshader::new(symbols, literals, instructions)?)
    }

    fn shader(&mut self) -> Result<ShaderBlob> {
        let raw_stage = self.c.read_u8()?;
        let stage = ShaderStage::from_raw(raw_stage)
            .ok_or_else(|| EffectError::corrupt("shader stage", format!("unknown stage {raw_stage}")))?;
        let major = self.c.read_u8()?;
        let minor = self.c.read_u8()?;

        let symbol_count = self.c.read_u8()?;
        let mut symbols = Vec::with_capacity(symbol_count.into());
        for _ in 0..symbol_count {
            symbols.push(ShaderSymbol {
                name: self.read_str("shader symbol")?,
                register_set: self.register_set()?,
                register_index: self.c.read_u16()?,
                register_count: self.c.read_u16()?,
            });
        }

        let sampler_count = self.c.read_u8()?;
        let mut samplers = Vec::with_capacity(sampler_count.into());
        for _ in 0..sampler_count {
            let name = self.read_str("sampler name")?;
            let parameter = self.read_str("sampler texture")?;
            let raw_kind = self.c.read_u8()?;
            let kind = SamplerKind::from_raw(raw_kind).ok_or_else(|| {
                EffectError::corrupt("sampler kind", format!("unknown kind {raw_kind}"))
            })?;
            samplers.push(SamplerBinding {
                name,
                parameter,
                kind,
                texture_unit: self.c.read_u32()?,
            });
        }

        let attribute_count = self.c.read_u8()?;
        let mut attributes = Vec::with_capacity(attribute_count.into());
        for _ in 0..attribute_count {
            let raw_usage = self.c.read_u8()?;
            let usage = VertexUsage::from_raw(raw_usage).ok_or_else(|| {
                EffectError::corrupt("vertex usage", format!("unknown usage {raw_usage}"))
            })?;
            attributes.push(VertexAttribute {
                usage,
                usage_index: self.c.read_u8()?,
                name: self.read_str("vertex attribute")?,
            });
        }

        let preshader = if self.read_bool("preshader flag")? {
            Some(self.preshader()?)
        } else {
            None
        };
        let bytecode = self.read_blob("shader bytecode")?.to_vec();

        Ok(ShaderBlob {
            stage,
            major,
            minor,
            symbols,
            samplers,
            attributes,
            preshader,
            bytecode,
        })
    }
}
