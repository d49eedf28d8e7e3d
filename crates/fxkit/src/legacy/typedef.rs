//! Type definitions, initial values and state records.

use tracing::{debug, trace};

use super::Decoder;
use crate::cursor::ByteCursor;
use crate::error::{EffectError, Result};
use crate::limits::{MAX_ARRAY_ELEMENTS, MAX_STRUCT_MEMBERS, MAX_TYPE_DEPTH};
use crate::model::{ObjectId, Parameter, ParameterClass, ParameterData, ParameterType};
use crate::state::{State, StateOperation};

/// Header fields an array element inherits from its array.
pub(super) struct Inherited {
    header: Parameter,
    member_count: u32,
}

impl Decoder {
    /// Decodes a type definition.
    ///
    /// With `inherited` set, no header is read: the definition describes one element of an
    /// array and copies the array's header. Struct elements then read their member
    /// definitions from the current position, so every element re-reads the same bytes.
    pub(super) fn read_typedef(
        &mut self,
        c: &mut ByteCursor<'_>,
        inherited: Option<&Inherited>,
        depth: usize,
    ) -> Result<Parameter> {
        if depth > MAX_TYPE_DEPTH {
            return Err(EffectError::corrupt(
                "type definition",
                format!("nesting exceeds {MAX_TYPE_DEPTH} levels"),
            ));
        }
        self.account_parameter()?;

        let (mut parameter, element_count, member_count) = match inherited {
            Some(parent) => (parent.header.clone(), 0, parent.member_count),
            None => self.read_type_header(c)?,
        };

        if element_count > 0 {
            let element_of = Inherited {
                header: parameter.clone(),
                member_count,
            };
            let saved = c.tell();
            let mut elements = Vec::with_capacity(element_count as usize);
            for _ in 0..element_count {
                c.seek(saved)?;
                elements.push(self.read_typedef(c, Some(&element_of), depth + 1)?);
            }
            parameter.elements = elements;
        } else if parameter.class == ParameterClass::Struct {
            let mut members = Vec::with_capacity(member_count as usize);
            for _ in 0..member_count {
                members.push(self.read_typedef(c, None, depth + 1)?);
            }
            parameter.members = members;
        }
        Ok(parameter)
    }

    /// Reads `type, class, name, semantic, element_count` and the class-specific fields.
    fn read_type_header(&mut self, c: &mut ByteCursor<'_>) -> Result<(Parameter, u32, u32)> {
        let raw_type = c.read_u32()?;
        let raw_class = c.read_u32()?;
        let ty = ParameterType::from_raw(raw_type)
            .ok_or_else(|| EffectError::unsupported("parameter type", raw_type))?;
        let class = ParameterClass::from_raw(raw_class).ok_or_else(|| {
            EffectError::corrupt("parameter class", format!("unknown class {raw_class}"))
        })?;
        let name = self.read_name(c)?;
        let semantic = self.read_name(c)?;

        let element_count = c.read_u32()?;
        if element_count > MAX_ARRAY_ELEMENTS {
            return Err(EffectError::corrupt(
                "element count",
                format!("{name}: {element_count} exceeds {MAX_ARRAY_ELEMENTS}"),
            ));
        }

        let (rows, columns, member_count) = match class {
            ParameterClass::Vector => {
                let columns = c.read_u32()?;
                let rows = c.read_u32()?;
                (rows, columns, 0)
            }
            ParameterClass::Scalar | ParameterClass::MatrixRows | ParameterClass::MatrixColumns => {
                let rows = c.read_u32()?;
                let columns = c.read_u32()?;
                (rows, columns, 0)
            }
            ParameterClass::Struct => {
                let member_count = c.read_u32()?;
                if member_count > MAX_STRUCT_MEMBERS {
                    return Err(EffectError::corrupt(
                        "member count",
                        format!("{name}: {member_count} exceeds {MAX_STRUCT_MEMBERS}"),
                    ));
                }
                (0, 0, member_count)
            }
            ParameterClass::Object => (0, 0, 0),
        };
        if class.is_numeric() && (rows > 4 || columns > 4) {
            return Err(EffectError::corrupt(
                "parameter dimensions",
                format!("{name}: {rows}x{columns}"),
            ));
        }

        trace!(%name, ?class, ?ty, rows, columns, element_count, member_count, "type definition");
        let parameter = Parameter::new(&name, class, ty, rows, columns).with_semantic(&semantic);
        Ok((parameter, element_count, member_count))
    }

    /// Fills `parameter` with its initial value from the current position.
    pub(super) fn read_value(
        &mut self,
        c: &mut ByteCursor<'_>,
        parameter: &mut Parameter,
        depth: usize,
    ) -> Result<()> {
        if parameter.is_array() || parameter.is_struct() {
            let children = if parameter.is_array() {
                &mut parameter.elements
            } else {
                &mut parameter.members
            };
            for child in children {
                self.read_value(c, child, depth + 1)?;
            }
            return Ok(());
        }

        match parameter.class {
            ParameterClass::Scalar
            | ParameterClass::Vector
            | ParameterClass::MatrixRows
            | ParameterClass::MatrixColumns => {
                let bytes = c.read_bytes(parameter.byte_size())?;
                parameter.data = ParameterData::Bytes(bytes.to_vec());
            }
            ParameterClass::Struct => {}
            ParameterClass::Object if parameter.ty.is_shared_object() => {
                let id = c.read_u32()?;
                self.claim_object(id, parameter)?;
                parameter.data = ParameterData::Shared(id);
            }
            ParameterClass::Object if parameter.ty.is_sampler() => {
                let state_count = c.read_count("sampler state count", 16)?;
                let mut states = Vec::with_capacity(state_count);
                for _ in 0..state_count {
                    states.push(self.read_state(c, depth + 1)?);
                }
                parameter.data = ParameterData::Samplers(states);
            }
            ParameterClass::Object => {
                debug!(name = %parameter.name, ty = ?parameter.ty, "object parameter without value");
            }
        }
        Ok(())
    }

    /// Reserves object slot `id` for `parameter`. The slot's payload arrives later, from the
    /// string table or a resource record.
    fn claim_object(&mut self, id: ObjectId, parameter: &Parameter) -> Result<()> {
        let slot = self.objects.get_mut(id as usize).ok_or_else(|| {
            EffectError::corrupt(
                "object id",
                format!("{}: {id} is out of range", parameter.name),
            )
        })?;
        match slot {
            Some(existing) => {
                debug!(id, claimed_by = %existing.name, name = %parameter.name, "object already claimed");
            }
            None => {
                *slot = Some(Parameter::new(
                    &parameter.name,
                    ParameterClass::Object,
                    parameter.ty,
                    0,
                    0,
                ));
            }
        }
        Ok(())
    }

    /// `operation, index, typedef_offset, value_offset`.
    pub(super) fn read_state(&mut self, c: &mut ByteCursor<'_>, depth: usize) -> Result<State> {
        let raw_operation = c.read_u32()?;
        let operation = StateOperation::from_index(raw_operation).ok_or_else(|| {
            EffectError::corrupt(
                "state operation",
                format!("{raw_operation} is not a known operation"),
            )
        })?;
        let index = c.read_u32()?;
        let typedef_offset = c.read_u32_usize()?;
        let value_offset = c.read_u32_usize()?;

        let parameter = self.read_typed_value(c, typedef_offset, value_offset, depth + 1)?;
        trace!(state = operation.info().name, index, "state");
        Ok(State::constant(operation, index, parameter))
    }
}
