use std::io::Write;

use fxkit_preshader::Preshader;
use tracing::trace;

use super::io::{count_u8, WriteLeExt};
use super::*;
use crate::error::{EffectError, Result};
use crate::model::{Effect, Parameter, ParameterData, Technique};
use crate::shader::ShaderBlob;
use crate::state::State;

/// Serialises `effect` into `out`.
///
/// Fails with [`EffectError::Capacity`] before producing a truncated count, and with
/// [`EffectError::Io`] if `out` fails. Output written before an error is not rolled back.
pub fn write_effect<W: Write>(effect: &Effect, mut out: W) -> Result<()> {
    let mut w = Writer {
        out: &mut out,
        objects: effect.objects(),
    };
    w.effect(effect)?;
    out.flush()?;
    Ok(())
}

/// [`write_effect`] into a fresh buffer.
pub fn write_effect_to_vec(effect: &Effect) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    write_effect(effect, &mut out)?;
    Ok(out)
}

struct Writer<'a, W: Write> {
    out: &'a mut W,
    objects: &'a [Option<Parameter>],
}

impl<W: Write> Writer<'_, W> {
    fn effect(&mut self, effect: &Effect) -> Result<()> {
        self.out.write_all(&MAGIC)?;
        self.out.write_u8(VERSION)?;

        let objects = self.objects;
        self.out.write_count("shared objects", objects.len())?;
        for (id, object) in objects.iter().enumerate() {
            self.out.write_bool(object.is_some())?;
            if let Some(object) = object {
                self.parameter(object, id)?;
            }
        }

        let parameters = effect.parameters();
        self.out.write_count("parameters", parameters.len())?;
        for parameter in parameters {
            self.parameter(parameter, objects.len())?;
        }

        let techniques = effect.techniques();
        self.out.write_count("techniques", techniques.len())?;
        for technique in techniques {
            self.technique(technique)?;
        }

        trace!(
            objects = objects.len(),
            parameters = parameters.len(),
            techniques = techniques.len(),
            "wrote compact effect"
        );
        Ok(())
    }

    /// Shared object among the first `visible` slots that equals `parameter`.
    fn backref(&self, parameter: &Parameter, visible: usize) -> Option<u8> {
        let id = self.objects[..visible]
            .iter()
            .position(|o| o.as_ref() == Some(parameter))?;
        // Object counts are checked before any entry is written, so `id < 255`.
        u8::try_from(id).ok().filter(|&id| id != NO_BACKREF)
    }

    /// Writes one entry. `visible` is the number of shared objects already written.
    fn parameter(&mut self, p: &Parameter, visible: usize) -> Result<()> {
        if let Some(id) = self.backref(p, visible) {
            return self.out.write_u8(id);
        }
        self.out.write_u8(NO_BACKREF)?;

        self.out.write_u8(p.class.raw() as u8)?;
        self.out.write_str_u8(&p.name)?;
        self.out.write_u8(p.ty.raw() as u8)?;
        self.out.write_u8(count_u8("rows", p.rows as usize)?)?;
        self.out.write_u8(count_u8("columns", p.columns as usize)?)?;
        self.out.write_str_u8(&p.semantic)?;

        self.out.write_count("annotations", p.annotations.len())?;
        for annotation in &p.annotations {
            self.parameter(annotation, visible)?;
        }

        let (is_struct, children) = match (p.elements.is_empty(), p.members.is_empty()) {
            (_, true) => (false, &p.elements),
            (true, false) => (true, &p.members),
            (false, false) => {
                return Err(EffectError::corrupt(
                    "parameter children",
                    format!("{} has both array elements and struct members", p.name),
                ))
            }
        };
        self.out.write_bool(is_struct)?;
        self.out.write_count(
            if is_struct { "struct members" } else { "array elements" },
            children.len(),
        )?;
        for child in children {
            self.parameter(child, visible)?;
        }

        self.data(&p.data, visible)
    }

    fn data(&mut self, data: &ParameterData, visible: usize) -> Result<()> {
        match data {
            ParameterData::None => self.out.write_u8(DATA_NONE),
            ParameterData::Bytes(bytes) => {
                self.out.write_u8(DATA_BYTES)?;
                self.out.write_len_prefixed_bytes_u32(bytes)
            }
            ParameterData::Expression(expression) => {
                self.out.write_u8(DATA_EXPRESSION)?;
                self.out.write_str_u8(&expression.array_name)?;
                self.preshader(&expression.preshader)
            }
            ParameterData::Shader(blob) => {
                self.out.write_u8(DATA_SHADER)?;
                self.shader(blob)
            }
            ParameterData::Samplers(states) => {
                self.out.write_u8(DATA_SAMPLERS)?;
                self.out.write_count("sampler states", states.len())?;
                for state in states {
                    self.state(state, visible)?;
                }
                Ok(())
            }
            ParameterData::String(s) => {
                self.out.write_u8(DATA_STRING)?;
                self.out.write_len_prefixed_bytes_u32(s.as_bytes())
            }
            ParameterData::Shared(id) => {
                let id = *id as usize;
                if id >= self.objects.len() {
                    return Err(EffectError::corrupt(
                        "shared object id",
                        format!("object {id} of a table of {}", self.objects.len()),
                    ));
                }
                self.out.write_u8(DATA_SHARED)?;
                self.out.write_u8(count_u8("shared object id", id)?)
            }
        }
    }

    fn state(&mut self, state: &State, visible: usize) -> Result<()> {
        self.out
            .write_u8(count_u8("state operation", state.operation.index() as usize)?)?;
        self.out.write_u32_le(state.index)?;
        self.out.write_u8(state.kind.raw())?;
        self.parameter(&state.parameter, visible)
    }

    fn technique(&mut self, technique: &Technique) -> Result<()> {
        let visible = self.objects.len();
        self.out.write_str_u8(&technique.name)?;
        self.out
            .write_count("technique annotations", technique.annotations.len())?;
        for annotation in &technique.annotations {
            self.parameter(annotation, visible)?;
        }
        self.out.write_count("passes", technique.passes.len())?;
        for pass in &technique.passes {
            self.out.write_str_u8(&pass.name)?;
            self.out.write_count("pass annotations", pass.annotations.len())?;
            for annotation in &pass.annotations {
                self.parameter(annotation, visible)?;
            }
            self.out.write_count("pass states", pass.states.len())?;
            for state in &pass.states {
                self.state(state, visible)?;
            }
        }
        Ok(())
    }

    fn preshader(&mut self, preshader: &Preshader) -> Result<()> {
        self.out
            .write_count("preshader symbols", preshader.symbols().len())?;
        for symbol in preshader.symbols() {
            self.out.write_str_u8(&symbol.name)?;
            self.out.write_u8(symbol.register_set.raw() as u8)?;
            self.out.write_u32_le(symbol.register_index)?;
            self.out.write_u32_le(symbol.register_count)?;
        }

        self.out
            .write_count_u16("preshader literals", preshader.literals().len())?;
        for &literal in preshader.literals() {
            self.out.write_f64_le(literal)?;
        }

        self.out
            .write_count_u16("preshader instructions", preshader.instructions().len())?;
        for instruction in preshader.instructions() {
            self.out.write_u16_le(instruction.opcode.raw())?;
            self.out.write_u8(instruction.element_count)?;
            self.out
                .write_count("instruction operands", instruction.operands.len())?;
            for operand in &instruction.operands {
                self.out.write_u8(operand.kind.raw() as u8)?;
                self.out.write_u32_le(operand.index)?;
            }
        }
        Ok(())
    }

    fn shader(&mut self, blob: &ShaderBlob) -> Result<()> {
        self.out.write_u8(blob.stage.raw())?;
        self.out.write_u8(blob.major)?;
        self.out.write_u8(blob.minor)?;

        self.out.write_count("shader symbols", blob.symbols.len())?;
        for symbol in &blob.symbols {
            self.out.write_str_u8(&symbol.name)?;
            self.out.write_u8(symbol.register_set.raw() as u8)?;
            self.out.write_u16_le(symbol.register_index)?;
            self.out.write_u16_le(symbol.register_count)?;
        }

        self.out.write_count("shader samplers", blob.samplers.len())?;
        for sampler in &blob.samplers {
            self.out.write_str_u8(&sampler.name)?;
            self.out.write_str_u8(&sampler.parameter)?;
            self.out.write_u8(sampler.kind.raw())?;
            self.out.write_u32_le(sampler.texture_unit)?;
        }

        self.out
            .write_count("vertex attributes", blob.attributes.len())?;
        for attribute in &blob.attributes {
            self.out.write_u8(attribute.usage.raw())?;
            self.out.write_u8(attribute.usage_index)?;
            self.out.write_str_u8(&attribute.name)?;
        }

        match &blob.preshader {
            Some(preshader) => {
                self.out.write_bool(true)?;
                self.preshader(preshader)?;
            }
            None => self.out.write_bool(false)?,
        }

        self.out.write_len_prefixed_bytes_u32(&blob.bytecode)
    }
}
