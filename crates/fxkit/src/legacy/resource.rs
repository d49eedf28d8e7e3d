//! String table, resource records and the passes that run once every record is decoded.

use std::collections::HashMap;

use fxkit_preshader::parse_preshader;
use tracing::{debug, trace};

use super::{Decoder, NONE_INDEX};
use crate::cursor::ByteCursor;
use crate::error::{EffectError, Result};
use crate::model::{Expression, Parameter, ParameterClass, ParameterData, ParameterType, Technique};
use crate::shader::ShaderBlob;
use crate::state::{State, StateValueKind};

const USAGE_CONSTANT: u32 = 0;
const USAGE_PARAMETER: u32 = 1;
const USAGE_ARRAY_SELECTOR: u32 = 2;

/// Where a resource record's state lives.
#[derive(Debug, Clone, Copy)]
enum StateAddress {
    /// State of a top-level sampler parameter, or of one element of a sampler array.
    Sampler {
        parameter: usize,
        element: Option<usize>,
        state: usize,
    },
    Pass {
        technique: usize,
        pass: usize,
        state: usize,
    },
}

impl StateAddress {
    fn get<'e>(&self, parameters: &'e [Parameter], techniques: &'e [Technique]) -> Result<&'e State> {
        match *self {
            Self::Sampler {
                parameter,
                element,
                state,
            } => {
                let mut sampler = parameters.get(parameter).ok_or_else(|| {
                    EffectError::corrupt("resource parameter index", format!("{parameter} is out of range"))
                })?;
                if let Some(element) = element {
                    sampler = sampler.elements.get(element).ok_or_else(|| {
                        EffectError::corrupt(
                            "resource element index",
                            format!("{}: {element} is out of range", sampler.name),
                        )
                    })?;
                }
                let states = sampler.sampler_states().ok_or_else(|| {
                    EffectError::corrupt(
                        "resource parameter",
                        format!("{} is not a sampler", sampler.name),
                    )
                })?;
                states.get(state).ok_or_else(|| {
                    EffectError::corrupt(
                        "resource state index",
                        format!("{}: {state} is out of range", sampler.name),
                    )
                })
            }
            Self::Pass {
                technique,
                pass,
                state,
            } => techniques
                .get(technique)
                .ok_or_else(|| {
                    EffectError::corrupt("resource technique index", format!("{technique} is out of range"))
                })?
                .passes
                .get(pass)
                .ok_or_else(|| EffectError::corrupt("resource pass index", format!("{pass} is out of range")))?
                .states
                .get(state)
                .ok_or_else(|| {
                    EffectError::corrupt("resource state index", format!("{state} is out of range"))
                }),
        }
    }

    /// Mutable counterpart of [`Self::get`]. Only called once `get` has validated the address.
    fn get_mut<'e>(
        &self,
        parameters: &'e mut [Parameter],
        techniques: &'e mut [Technique],
    ) -> Option<&'e mut State> {
        match *self {
            Self::Sampler {
                parameter,
                element,
                state,
            } => {
                let mut sampler = parameters.get_mut(parameter)?;
                if let Some(element) = element {
                    sampler = sampler.elements.get_mut(element)?;
                }
                match &mut sampler.data {
                    ParameterData::Samplers(states) => states.get_mut(state),
                    _ => None,
                }
            }
            Self::Pass {
                technique,
                pass,
                state,
            } => techniques
                .get_mut(technique)?
                .passes
                .get_mut(pass)?
                .states
                .get_mut(state),
        }
    }
}

/// What a resource record does to its state.
enum Binding {
    /// Shader bytecode for the object slot the state refers to.
    Shader { id: u32, blob: Box<ShaderBlob> },
    Expression(Box<Expression>),
    Reference(Parameter),
    ArraySelector(Box<Expression>),
}

fn index(raw: u32) -> usize {
    raw as usize
}

fn read_blob_string(c: &mut ByteCursor<'_>) -> Result<String> {
    let bytes = c.read_u32_blob_padded()?;
    let stripped: Vec<u8> = bytes.iter().copied().filter(|&b| b != 0).collect();
    Ok(String::from_utf8_lossy(&stripped).into_owned())
}

impl Decoder {
    /// `id, size, bytes`: payload of the object slot `id`, interpreted by the slot's type.
    pub(super) fn read_string(&mut self, c: &mut ByteCursor<'_>) -> Result<()> {
        let id = c.read_u32()?;
        let bytes = c.read_u32_blob_padded()?;
        let slot = self
            .objects
            .get_mut(index(id))
            .ok_or_else(|| EffectError::corrupt("string id", format!("{id} is out of range")))?
            .as_mut()
            .ok_or_else(|| {
                EffectError::corrupt("string id", format!("object {id} is not claimed by any parameter"))
            })?;

        slot.data = match slot.ty {
            ParameterType::String => {
                let text: Vec<u8> = bytes.iter().copied().filter(|&b| b != 0).collect();
                ParameterData::String(String::from_utf8_lossy(&text).into_owned())
            }
            ty if ty.is_shader() => ParameterData::Shader(Box::new(ShaderBlob::parse(bytes)?)),
            ty if ty.is_texture() => ParameterData::Bytes(bytes.to_vec()),
            ty => return Err(EffectError::unsupported("string object type", ty.raw())),
        };
        trace!(id, size = bytes.len(), ty = ?slot.ty, "object data");
        Ok(())
    }

    /// `technique, index, element, state, usage` followed by a usage-specific payload.
    pub(super) fn bind_resource(
        &mut self,
        c: &mut ByteCursor<'_>,
        parameters: &mut [Parameter],
        techniques: &mut [Technique],
        names: &HashMap<String, usize>,
    ) -> Result<()> {
        let technique = c.read_u32()?;
        let index_raw = c.read_u32()?;
        let element = c.read_u32()?;
        let state = c.read_u32()?;
        let usage = c.read_u32()?;

        let address = if technique == NONE_INDEX {
            StateAddress::Sampler {
                parameter: index(index_raw),
                element: (element != NONE_INDEX).then_some(index(element)),
                state: index(state),
            }
        } else {
            StateAddress::Pass {
                technique: index(technique),
                pass: index(index_raw),
                state: index(state),
            }
        };

        let target = address.get(parameters, techniques)?;
        trace!(?address, usage, state = target.name(), "resource");

        let binding = match usage {
            USAGE_CONSTANT => {
                let ty = target.parameter.ty;
                if ty.is_shader() {
                    let id = target.parameter.object_id().ok_or_else(|| {
                        EffectError::corrupt(
                            "shader state",
                            format!("{} has no object id", target.name()),
                        )
                    })?;
                    let bytes = c.read_u32_blob_padded()?;
                    Binding::Shader {
                        id,
                        blob: Box::new(ShaderBlob::parse(bytes)?),
                    }
                } else if matches!(
                    ty,
                    ParameterType::Bool | ParameterType::Int | ParameterType::Float
                ) {
                    let bytes = c.read_u32_blob_padded()?;
                    Binding::Expression(Box::new(Expression {
                        array_name: String::new(),
                        preshader: parse_preshader(bytes)?,
                    }))
                } else {
                    return Err(EffectError::unsupported("constant resource type", ty.raw()));
                }
            }
            USAGE_PARAMETER => {
                let name = read_blob_string(c)?;
                let referenced = names.get(&name).map(|&i| &parameters[i]).ok_or_else(|| {
                    EffectError::corrupt(
                        "parameter reference",
                        format!("{} refers to unknown parameter {name:?}", target.name()),
                    )
                })?;
                Binding::Reference(referenced.clone())
            }
            USAGE_ARRAY_SELECTOR => {
                let name = read_blob_string(c)?;
                let array = names.get(&name).map(|&i| &parameters[i]).ok_or_else(|| {
                    EffectError::corrupt(
                        "array selector",
                        format!("{} selects from unknown parameter {name:?}", target.name()),
                    )
                })?;
                if !array.is_array() {
                    return Err(EffectError::corrupt(
                        "array selector",
                        format!("{name} is not an array"),
                    ));
                }
                let bytes = c.read_u32_blob_padded()?;
                Binding::ArraySelector(Box::new(Expression {
                    array_name: name,
                    preshader: parse_preshader(bytes)?,
                }))
            }
            _ => return Err(EffectError::unsupported("resource usage", usage)),
        };

        let target = address
            .get_mut(parameters, techniques)
            .ok_or_else(|| EffectError::corrupt("resource", "state address became invalid"))?;
        match binding {
            Binding::Shader { id, blob } => {
                let slot = self.objects.get_mut(index(id)).ok_or_else(|| {
                    EffectError::corrupt("shader object id", format!("{id} is out of range"))
                })?;
                let ty = target.parameter.ty;
                let object =
                    slot.get_or_insert_with(|| Parameter::new("", ParameterClass::Object, ty, 0, 0));
                object.data = ParameterData::Shader(blob);
            }
            Binding::Expression(expression) => {
                target.kind = StateValueKind::Expression;
                target.parameter.data = ParameterData::Expression(expression);
            }
            Binding::Reference(referenced) => {
                target.kind = StateValueKind::ParameterReference;
                target.parameter = referenced;
            }
            Binding::ArraySelector(expression) => {
                target.kind = StateValueKind::ExpressionIndex;
                target.parameter.name = expression.array_name.clone();
                target.parameter.data = ParameterData::Expression(expression);
            }
        }
        Ok(())
    }
}

/// Rejects constant render states whose value is outside the native enumeration.
///
/// Runs after resource binding: states later replaced by expressions or references carry
/// placeholder values in the stream.
pub(super) fn validate_render_states(techniques: &[Technique]) -> Result<()> {
    let states = techniques
        .iter()
        .flat_map(|t| &t.passes)
        .flat_map(|p| &p.states);
    for state in states {
        if let Some(value) = state.render_value() {
            value?;
        }
    }
    Ok(())
}

/// Fills [`crate::shader::SamplerBinding::parameter`] from each sampler parameter's `Texture`
/// state.
pub(super) fn resolve_sampler_bindings(objects: &mut [Option<Parameter>], parameters: &[Parameter]) {
    let textures: HashMap<&str, &str> = parameters
        .iter()
        .filter(|p| p.ty.is_sampler())
        .filter_map(|p| {
            let states = p
                .sampler_states()
                .or_else(|| p.elements.first().and_then(Parameter::sampler_states))?;
            let texture = states.iter().find_map(State::texture_reference)?;
            Some((p.name.as_str(), texture))
        })
        .collect();

    for object in objects.iter_mut().flatten() {
        let ParameterData::Shader(blob) = &mut object.data else {
            continue;
        };
        for binding in &mut blob.samplers {
            match textures.get(binding.name.as_str()) {
                Some(texture) => binding.parameter = (*texture).to_owned(),
                None => debug!(sampler = %binding.name, "sampler has no texture state"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StateOperation;

    #[test]
    fn sampler_bindings_follow_texture_references() {
        let texture_state = State {
            operation: StateOperation::from_name("Texture").unwrap(),
            index: 0,
            kind: StateValueKind::ParameterReference,
            parameter: Parameter::object("DiffuseMap", ParameterType::Texture2D, ParameterData::Shared(0)),
        };
        let sampler = Parameter::object(
            "DiffuseSampler",
            ParameterType::Sampler2D,
            ParameterData::Samplers(vec![texture_state]),
        );
        let blob = ShaderBlob {
            stage: crate::shader::ShaderStage::Pixel,
            major: 2,
            minor: 0,
            symbols: vec![],
            samplers: vec![crate::shader::SamplerBinding {
                name: "DiffuseSampler".into(),
                parameter: String::new(),
                kind: crate::shader::SamplerKind::Sampler2D,
                texture_unit: 0,
            }],
            attributes: vec![],
            preshader: None,
            bytecode: vec![],
        };
        let mut objects = vec![Some(Parameter::object(
            "",
            ParameterType::PixelShader,
            ParameterData::Shader(Box::new(blob)),
        ))];

        resolve_sampler_bindings(&mut objects, &[sampler]);

        let blob = objects[0].as_ref().unwrap().shader().unwrap();
        assert_eq!(blob.samplers[0].parameter, "DiffuseMap");
    }
}
