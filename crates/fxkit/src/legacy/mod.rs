//! Decoder for compiled `fx_2_0` effect bundles.
//!
//! Layout overview (all values little-endian `u32`):
//!
//! ```text
//! tag                 0xFEFF0901, or 0xBCF00BCF + header length + skipped header
//! start               offset of the record stream, relative to `base`
//! base: ...           pool of names, type definitions and values, addressed by offset
//! base + start:
//!   parameter_count, technique_count, reserved, object_count
//!   parameter records
//!   technique records
//!   string_count, resource_count
//!   string records    (id, size, bytes padded to 4)
//!   resource records  (technique, index, element, state, usage, payload)
//! ```
//!
//! Records in the stream refer back into the pool by offset. Those reads go through
//! [`ByteCursor::peek_at`] so the stream position is restored afterwards.

mod resource;
mod typedef;

use tracing::{debug, trace, warn};

use crate::cursor::ByteCursor;
use crate::error::{EffectError, Result};
use crate::limits::MAX_DECODED_PARAMETERS;
use crate::model::{build_parameter_index, Effect, Parameter, Pass, Technique};

/// Tag of a bare bundle.
pub const TAG_BARE: u32 = 0xFEFF_0901;
/// Tag of a bundle preceded by a length-prefixed header.
pub const TAG_WRAPPED: u32 = 0xBCF0_0BCF;

/// Sentinel for "no technique" / "no element" in resource records.
pub(crate) const NONE_INDEX: u32 = 0xFFFF_FFFF;

/// Decodes a legacy effect bundle.
pub fn parse_bundle(bytes: &[u8]) -> Result<Effect> {
    let mut c = ByteCursor::new(bytes);

    let mut tag = c.read_u32()?;
    if tag == TAG_WRAPPED {
        let header_len = c.read_u32_usize()?;
        let skip = header_len.checked_sub(8).ok_or_else(|| {
            EffectError::corrupt("header length", format!("{header_len} is shorter than the tag"))
        })?;
        debug!(skip, "skipping bundle header");
        c.skip(skip)?;
        tag = c.read_u32()?;
    }
    if tag != TAG_BARE {
        return Err(EffectError::BadTag(tag));
    }

    let start = c.read_u32_usize()?;
    let base = c.tell();
    let decoder = Decoder::new(base);
    c.seek(decoder.offset(start)?)?;
    decoder.decode(&mut c)
}

/// Decoding state shared by every record of one bundle.
pub(crate) struct Decoder {
    base: usize,
    objects: Vec<Option<Parameter>>,
    decoded_parameters: usize,
}

impl Decoder {
    fn new(base: usize) -> Self {
        Self {
            base,
            objects: Vec::new(),
            decoded_parameters: 0,
        }
    }

    /// Absolute position of pool offset `offset`.
    pub(crate) fn offset(&self, offset: usize) -> Result<usize> {
        self.base
            .checked_add(offset)
            .ok_or_else(|| EffectError::corrupt("offset", format!("{offset:#x} overflows")))
    }

    /// Counts every decoded parameter node so nested arrays cannot multiply without bound.
    pub(crate) fn account_parameter(&mut self) -> Result<()> {
        self.decoded_parameters += 1;
        if self.decoded_parameters > MAX_DECODED_PARAMETERS {
            return Err(EffectError::corrupt(
                "parameter count",
                format!("bundle decodes to more than {MAX_DECODED_PARAMETERS} parameters"),
            ));
        }
        Ok(())
    }

    /// Reads a `u32` pool offset and the length-prefixed name stored there.
    pub(crate) fn read_name(&mut self, c: &mut ByteCursor<'_>) -> Result<String> {
        let offset = c.read_u32_usize()?;
        let at = self.offset(offset)?;
        c.peek_at(at, |c| c.read_u32_string())
    }

    fn decode(mut self, c: &mut ByteCursor<'_>) -> Result<Effect> {
        let parameter_count = c.read_count("parameter count", 16)?;
        let technique_count = c.read_count("technique count", 12)?;
        let reserved = c.read_u32()?;
        if reserved != 0 {
            debug!(reserved, "ignoring reserved header field");
        }
        let object_count = c.read_u32_usize()?;
        if object_count > c.len() / 4 {
            return Err(EffectError::corrupt(
                "object count",
                format!("{object_count} objects cannot fit a {} byte bundle", c.len()),
            ));
        }
        self.objects = vec![None; object_count];
        trace!(parameter_count, technique_count, object_count, "bundle header");

        let mut parameters = Vec::with_capacity(parameter_count);
        for _ in 0..parameter_count {
            parameters.push(self.read_parameter(c)?);
        }

        let mut techniques = Vec::with_capacity(technique_count);
        for _ in 0..technique_count {
            techniques.push(self.read_technique(c)?);
        }

        let string_count = c.read_count("string count", 8)?;
        let resource_count = c.read_count("resource count", 20)?;
        for _ in 0..string_count {
            self.read_string(c)?;
        }

        let index = build_parameter_index(&parameters);
        for _ in 0..resource_count {
            self.bind_resource(c, &mut parameters, &mut techniques, &index)?;
        }

        resource::validate_render_states(&techniques)?;
        resource::resolve_sampler_bindings(&mut self.objects, &parameters);

        for (id, slot) in self.objects.iter().enumerate() {
            if slot.is_none() {
                warn!(id, "shared object slot is never referenced");
            }
        }

        Ok(Effect::new(self.objects, parameters, techniques))
    }

    /// Top-level parameter record.
    fn read_parameter(&mut self, c: &mut ByteCursor<'_>) -> Result<Parameter> {
        let typedef_offset = c.read_u32_usize()?;
        let value_offset = c.read_u32_usize()?;
        let flags = c.read_u32()?;
        let annotation_count = c.read_count("annotation count", 8)?;

        let annotations = self.read_annotations(c, annotation_count)?;
        let mut parameter = self.read_typed_value(c, typedef_offset, value_offset, 0)?;
        if flags != 0 {
            debug!(name = %parameter.name, flags, "ignoring parameter flags");
        }
        parameter.annotations = annotations;
        Ok(parameter)
    }

    fn read_annotations(&mut self, c: &mut ByteCursor<'_>, count: usize) -> Result<Vec<Parameter>> {
        let mut annotations = Vec::with_capacity(count);
        for _ in 0..count {
            let typedef_offset = c.read_u32_usize()?;
            let value_offset = c.read_u32_usize()?;
            annotations.push(self.read_typed_value(c, typedef_offset, value_offset, 0)?);
        }
        Ok(annotations)
    }

    /// Decodes the type definition at `typedef_offset` and fills it from `value_offset`.
    pub(crate) fn read_typed_value(
        &mut self,
        c: &mut ByteCursor<'_>,
        typedef_offset: usize,
        value_offset: usize,
        depth: usize,
    ) -> Result<Parameter> {
        let at = self.offset(typedef_offset)?;
        let mut parameter = c.peek_at(at, |c| self.read_typedef(c, None, depth))?;
        let at = self.offset(value_offset)?;
        c.peek_at(at, |c| self.read_value(c, &mut parameter, depth))?;
        Ok(parameter)
    }

    fn read_technique(&mut self, c: &mut ByteCursor<'_>) -> Result<Technique> {
        let name = self.read_name(c)?;
        let annotation_count = c.read_count("technique annotation count", 8)?;
        let pass_count = c.read_count("pass count", 12)?;
        trace!(%name, pass_count, "technique");

        let annotations = self.read_annotations(c, annotation_count)?;
        let mut passes = Vec::with_capacity(pass_count);
        for _ in 0..pass_count {
            passes.push(self.read_pass(c)?);
        }
        Ok(Technique {
            name,
            annotations,
            passes,
        })
    }

    fn read_pass(&mut self, c: &mut ByteCursor<'_>) -> Result<Pass> {
        let name = self.read_name(c)?;
        let annotation_count = c.read_count("pass annotation count", 8)?;
        let state_count = c.read_count("pass state count", 16)?;
        trace!(%name, state_count, "pass");

        let annotations = self.read_annotations(c, annotation_count)?;
        let mut states = Vec::with_capacity(state_count);
        for _ in 0..state_count {
            states.push(self.read_state(c, 0)?);
        }
        Ok(Pass {
            name,
            annotations,
            states,
        })
    }
}

#[cfg(test)]
mod tests;
