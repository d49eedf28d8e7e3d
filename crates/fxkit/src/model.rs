//! In-memory effect graph shared by the legacy parser, the compact codec and the runtime.

use std::borrow::Cow;
use std::collections::HashMap;

use fxkit_preshader::{InputClass, ParameterSource, ParameterValue, Preshader};

use crate::error::Result;
use crate::shader::ShaderBlob;
use crate::state::{PassOverrides, State, StateClass};

/// Index into [`Effect::objects`].
pub type ObjectId = u32;

/// `D3DXPARAMETER_CLASS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterClass {
    Scalar,
    Vector,
    MatrixRows,
    MatrixColumns,
    Object,
    Struct,
}

impl ParameterClass {
    pub fn from_raw(raw: u32) -> Option<Self> {
        Some(match raw {
            0 => Self::Scalar,
            1 => Self::Vector,
            2 => Self::MatrixRows,
            3 => Self::MatrixColumns,
            4 => Self::Object,
            5 => Self::Struct,
            _ => return None,
        })
    }

    pub fn raw(self) -> u32 {
        match self {
            Self::Scalar => 0,
            Self::Vector => 1,
            Self::MatrixRows => 2,
            Self::MatrixColumns => 3,
            Self::Object => 4,
            Self::Struct => 5,
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::Scalar | Self::Vector | Self::MatrixRows | Self::MatrixColumns
        )
    }
}

/// `D3DXPARAMETER_TYPE`, restricted to the types an effect bundle can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterType {
    Void,
    Bool,
    Int,
    Float,
    String,
    Texture,
    Texture1D,
    Texture2D,
    Texture3D,
    TextureCube,
    Sampler,
    Sampler1D,
    Sampler2D,
    Sampler3D,
    SamplerCube,
    PixelShader,
    VertexShader,
}

impl ParameterType {
    pub fn from_raw(raw: u32) -> Option<Self> {
        Some(match raw {
            0 => Self::Void,
            1 => Self::Bool,
            2 => Self::Int,
            3 => Self::Float,
            4 => Self::String,
            5 => Self::Texture,
            6 => Self::Texture1D,
            7 => Self::Texture2D,
            8 => Self::Texture3D,
            9 => Self::TextureCube,
            10 => Self::Sampler,
            11 => Self::Sampler1D,
            12 => Self::Sampler2D,
            13 => Self::Sampler3D,
            14 => Self::SamplerCube,
            15 => Self::PixelShader,
            16 => Self::VertexShader,
            _ => return None,
        })
    }

    pub fn raw(self) -> u32 {
        match self {
            Self::Void => 0,
            Self::Bool => 1,
            Self::Int => 2,
            Self::Float => 3,
            Self::String => 4,
            Self::Texture => 5,
            Self::Texture1D => 6,
            Self::Texture2D => 7,
            Self::Texture3D => 8,
            Self::TextureCube => 9,
            Self::Sampler => 10,
            Self::Sampler1D => 11,
            Self::Sampler2D => 12,
            Self::Sampler3D => 13,
            Self::SamplerCube => 14,
            Self::PixelShader => 15,
            Self::VertexShader => 16,
        }
    }

    pub fn is_sampler(self) -> bool {
        matches!(
            self,
            Self::Sampler | Self::Sampler1D | Self::Sampler2D | Self::Sampler3D | Self::SamplerCube
        )
    }

    pub fn is_texture(self) -> bool {
        matches!(
            self,
            Self::Texture | Self::Texture1D | Self::Texture2D | Self::Texture3D | Self::TextureCube
        )
    }

    pub fn is_shader(self) -> bool {
        matches!(self, Self::PixelShader | Self::VertexShader)
    }

    /// Object types whose value is a shared-object id.
    pub fn is_shared_object(self) -> bool {
        self == Self::String || self.is_texture() || self.is_shader()
    }
}

/// An expression attached to a state: a preshader plus, for index expressions, the name of the
/// array parameter it selects from (empty for constant expressions).
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub array_name: String,
    pub preshader: Preshader,
}

/// Payload of a [`Parameter`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ParameterData {
    /// Structural parameters (arrays, structs) and objects without a value.
    #[default]
    None,
    /// Raw little-endian numeric data, `4 * rows * columns` bytes.
    Bytes(Vec<u8>),
    /// Reference to an entry of the effect's shared-object table.
    Shared(ObjectId),
    String(String),
    Shader(Box<ShaderBlob>),
    /// Sampler state block.
    Samplers(Vec<State>),
    Expression(Box<Expression>),
}

/// A typed effect parameter. Also used for annotations and for state values.
///
/// A parameter has either array `elements` or struct `members`, never both.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    /// Empty when the parameter has no semantic.
    pub semantic: String,
    pub class: ParameterClass,
    pub ty: ParameterType,
    pub rows: u32,
    pub columns: u32,
    pub elements: Vec<Parameter>,
    pub members: Vec<Parameter>,
    pub annotations: Vec<Parameter>,
    pub data: ParameterData,
}

impl Parameter {
    /// Bare header with no children and no data.
    pub fn new(name: &str, class: ParameterClass, ty: ParameterType, rows: u32, columns: u32) -> Self {
        Self {
            name: name.to_owned(),
            semantic: String::new(),
            class,
            ty,
            rows,
            columns,
            elements: Vec::new(),
            members: Vec::new(),
            annotations: Vec::new(),
            data: ParameterData::None,
        }
    }

    /// Numeric parameter holding `values` (row-major, `rows * columns` floats).
    pub fn float(name: &str, class: ParameterClass, rows: u32, columns: u32, values: &[f32]) -> Self {
        let mut p = Self::new(name, class, ParameterType::Float, rows, columns);
        p.data = ParameterData::Bytes(bytemuck::cast_slice(values).to_vec());
        p
    }

    pub fn scalar(name: &str, value: f32) -> Self {
        Self::float(name, ParameterClass::Scalar, 1, 1, &[value])
    }

    pub fn vector(name: &str, values: &[f32]) -> Self {
        Self::float(name, ParameterClass::Vector, 1, values.len() as u32, values)
    }

    pub fn matrix(name: &str, rows: u32, columns: u32, values: &[f32]) -> Self {
        Self::float(name, ParameterClass::MatrixRows, rows, columns, values)
    }

    pub fn int(name: &str, value: i32) -> Self {
        let mut p = Self::new(name, ParameterClass::Scalar, ParameterType::Int, 1, 1);
        p.data = ParameterData::Bytes(bytemuck::bytes_of(&value).to_vec());
        p
    }

    pub fn boolean(name: &str, value: bool) -> Self {
        let mut p = Self::new(name, ParameterClass::Scalar, ParameterType::Bool, 1, 1);
        p.data = ParameterData::Bytes(bytemuck::bytes_of(&u32::from(value)).to_vec());
        p
    }

    /// Object parameter of type `ty` with payload `data`.
    pub fn object(name: &str, ty: ParameterType, data: ParameterData) -> Self {
        let mut p = Self::new(name, ParameterClass::Object, ty, 0, 0);
        p.data = data;
        p
    }

    /// Array named `name`. The parent header is taken from the first element and every
    /// element is renamed to `name`.
    pub fn array(name: &str, mut elements: Vec<Parameter>) -> Self {
        let mut p = match elements.first() {
            Some(first) => {
                let mut p = Self::new(name, first.class, first.ty, first.rows, first.columns);
                p.semantic = first.semantic.clone();
                p
            }
            None => Self::new(name, ParameterClass::Scalar, ParameterType::Void, 0, 0),
        };
        for element in &mut elements {
            element.name = name.to_owned();
        }
        p.elements = elements;
        p
    }

    pub fn structure(name: &str, members: Vec<Parameter>) -> Self {
        let mut p = Self::new(name, ParameterClass::Struct, ParameterType::Void, 0, 0);
        p.members = members;
        p
    }

    pub fn with_semantic(mut self, semantic: &str) -> Self {
        self.semantic = semantic.to_owned();
        self
    }

    pub fn with_annotations(mut self, annotations: Vec<Parameter>) -> Self {
        self.annotations = annotations;
        self
    }

    pub fn is_array(&self) -> bool {
        !self.elements.is_empty()
    }

    pub fn is_struct(&self) -> bool {
        !self.members.is_empty()
    }

    /// Size of the parameter's value in bytes, as laid out in a legacy bundle.
    pub fn byte_size(&self) -> usize {
        if self.is_array() {
            return self.elements.iter().map(Parameter::byte_size).sum();
        }
        if self.is_struct() {
            return self.members.iter().map(Parameter::byte_size).sum();
        }
        match self.class {
            ParameterClass::Struct => 0,
            ParameterClass::Object if self.ty.is_sampler() => 0,
            ParameterClass::Object => 4,
            _ => 4 * self.rows as usize * self.columns as usize,
        }
    }

    pub fn member(&self, name: &str) -> Option<&Parameter> {
        self.members.iter().find(|m| m.name == name)
    }

    pub fn annotation(&self, name: &str) -> Option<&Parameter> {
        self.annotations.iter().find(|a| a.name == name)
    }

    /// Raw bytes of a numeric parameter without children.
    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.data {
            ParameterData::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// First 32-bit word of a numeric value.
    pub fn as_u32(&self) -> Option<u32> {
        let bytes = self.bytes()?;
        Some(u32::from_le_bytes(bytes.get(..4)?.try_into().ok()?))
    }

    pub fn as_f32(&self) -> Option<f32> {
        self.as_u32().map(f32::from_bits)
    }

    /// Values of a numeric parameter converted to `f32`, flattened across array elements and
    /// struct members. `Int` values are converted numerically, `Bool` values become 0 or 1.
    pub fn to_f32_values(&self) -> Option<Vec<f32>> {
        let mut out = Vec::new();
        self.collect_f32(&mut out).then_some(out)
    }

    fn collect_f32(&self, out: &mut Vec<f32>) -> bool {
        let children = if self.is_array() {
            &self.elements
        } else {
            &self.members
        };
        if !children.is_empty() {
            return children.iter().all(|c| c.collect_f32(out));
        }
        let Some(bytes) = self.bytes() else {
            return false;
        };
        let words = bytes
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]));
        out.extend(words.map(|w| match self.ty {
            ParameterType::Int => w as i32 as f32,
            ParameterType::Bool => f32::from(u8::from(w != 0)),
            _ => f32::from_bits(w),
        }));
        true
    }

    /// The shared object this parameter refers to, if any.
    pub fn object_id(&self) -> Option<ObjectId> {
        match self.data {
            ParameterData::Shared(id) => Some(id),
            _ => None,
        }
    }

    pub fn shader(&self) -> Option<&ShaderBlob> {
        match &self.data {
            ParameterData::Shader(blob) => Some(blob),
            _ => None,
        }
    }

    pub fn string(&self) -> Option<&str> {
        match &self.data {
            ParameterData::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn sampler_states(&self) -> Option<&[State]> {
        match &self.data {
            ParameterData::Samplers(states) => Some(states),
            _ => None,
        }
    }

    pub fn expression(&self) -> Option<&Expression> {
        match &self.data {
            ParameterData::Expression(expr) => Some(expr),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Technique {
    pub name: String,
    pub annotations: Vec<Parameter>,
    pub passes: Vec<Pass>,
}

impl Technique {
    pub fn pass(&self, name: &str) -> Option<&Pass> {
        self.passes.iter().find(|p| p.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pass {
    pub name: String,
    pub annotations: Vec<Parameter>,
    pub states: Vec<State>,
}

impl Pass {
    /// Shared-object index of the pass's vertex shader.
    pub fn vertex_shader(&self) -> Option<ObjectId> {
        self.shader_object(StateClass::VertexShader)
    }

    /// Shared-object index of the pass's pixel shader.
    pub fn pixel_shader(&self) -> Option<ObjectId> {
        self.shader_object(StateClass::PixelShader)
    }

    fn shader_object(&self, class: StateClass) -> Option<ObjectId> {
        self.states
            .iter()
            .filter(|s| s.operation.info().class == class)
            .find_map(|s| s.parameter.object_id())
    }

    /// Fixed-function overrides set by the pass's constant render states.
    pub fn overrides(&self) -> Result<PassOverrides> {
        PassOverrides::from_states(&self.states)
    }
}

/// A decoded effect.
///
/// Immutable once constructed; parameter lookups by name go through an index built at
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Effect {
    objects: Vec<Option<Parameter>>,
    parameters: Vec<Parameter>,
    techniques: Vec<Technique>,
    parameter_index: HashMap<String, usize>,
}

impl Effect {
    pub fn new(
        objects: Vec<Option<Parameter>>,
        parameters: Vec<Parameter>,
        techniques: Vec<Technique>,
    ) -> Self {
        let parameter_index = build_parameter_index(&parameters);
        Self {
            objects,
            parameters,
            techniques,
            parameter_index,
        }
    }

    pub fn objects(&self) -> &[Option<Parameter>] {
        &self.objects
    }

    pub fn object(&self, id: ObjectId) -> Option<&Parameter> {
        self.objects.get(id as usize)?.as_ref()
    }

    pub fn shader(&self, id: ObjectId) -> Option<&ShaderBlob> {
        self.object(id)?.shader()
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn parameter_index(&self, name: &str) -> Option<usize> {
        self.parameter_index.get(name).copied()
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameter_index(name).map(|i| &self.parameters[i])
    }

    pub fn techniques(&self) -> &[Technique] {
        &self.techniques
    }

    pub fn technique(&self, name: &str) -> Option<&Technique> {
        self.techniques.iter().find(|t| t.name == name)
    }

    /// Follows a [`ParameterData::Shared`] reference to the shared object it names.
    pub fn resolve<'e>(&'e self, parameter: &'e Parameter) -> &'e Parameter {
        parameter
            .object_id()
            .and_then(|id| self.object(id))
            .unwrap_or(parameter)
    }

    pub fn into_parts(self) -> (Vec<Option<Parameter>>, Vec<Parameter>, Vec<Technique>) {
        (self.objects, self.parameters, self.techniques)
    }
}

/// Name → index of top-level parameters. The first declaration of a name wins.
pub(crate) fn build_parameter_index(parameters: &[Parameter]) -> HashMap<String, usize> {
    let mut index = HashMap::with_capacity(parameters.len());
    for (i, p) in parameters.iter().enumerate() {
        index.entry(p.name.clone()).or_insert(i);
    }
    index
}

impl ParameterSource for Effect {
    fn parameter_value(&self, name: &str) -> Option<ParameterValue<'_>> {
        let parameter = self.parameter(name)?;
        let class = match parameter.class {
            ParameterClass::Scalar => InputClass::Scalar,
            ParameterClass::Vector => InputClass::Vector,
            ParameterClass::MatrixRows => InputClass::MatrixRows,
            ParameterClass::MatrixColumns => InputClass::MatrixColumns,
            ParameterClass::Object | ParameterClass::Struct => return None,
        };
        Some(ParameterValue {
            class,
            rows: parameter.rows,
            columns: parameter.columns,
            values: Cow::Owned(parameter.to_f32_values()?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn byte_sizes() {
        assert_eq!(Parameter::matrix("m", 4, 4, &[0.0; 16]).byte_size(), 64);
        let arr = Parameter::array(
            "a",
            vec![Parameter::vector("x", &[0.0; 3]), Parameter::vector("x", &[0.0; 3])],
        );
        assert_eq!(arr.byte_size(), 24);
        let s = Parameter::structure("s", vec![Parameter::int("i", 0), arr]);
        assert_eq!(s.byte_size(), 28);
        assert_eq!(
            Parameter::object("t", ParameterType::Texture2D, ParameterData::Shared(0)).byte_size(),
            4
        );
        assert_eq!(
            Parameter::object("s", ParameterType::Sampler2D, ParameterData::Samplers(vec![]))
                .byte_size(),
            0
        );
    }

    #[test]
    fn array_elements_inherit_header() {
        let arr = Parameter::array(
            "Lights",
            vec![
                Parameter::vector("", &[1.0, 0.0]).with_semantic("LIGHT"),
                Parameter::vector("", &[0.0, 1.0]),
            ],
        );
        assert_eq!(arr.class, ParameterClass::Vector);
        assert_eq!(arr.columns, 2);
        assert_eq!(arr.semantic, "LIGHT");
        assert!(arr.elements.iter().all(|e| e.name == "Lights"));
        assert!(!arr.is_struct());
    }

    #[test]
    fn f32_values_convert_by_type() {
        assert_eq!(Parameter::int("i", -3).to_f32_values(), Some(vec![-3.0]));
        assert_eq!(Parameter::boolean("b", true).to_f32_values(), Some(vec![1.0]));
        let arr = Parameter::array(
            "v",
            vec![Parameter::scalar("", 10.0), Parameter::scalar("", 20.0)],
        );
        assert_eq!(arr.to_f32_values(), Some(vec![10.0, 20.0]));
        assert_eq!(
            Parameter::object("s", ParameterType::String, ParameterData::Shared(1)).to_f32_values(),
            None
        );
    }

    #[test]
    fn effect_lookup_by_name_first_wins() {
        let effect = Effect::new(
            vec![Some(Parameter::object(
                "",
                ParameterType::String,
                ParameterData::String("hello".into()),
            ))],
            vec![
                Parameter::scalar("Alpha", 0.5),
                Parameter::object("Label", ParameterType::String, ParameterData::Shared(0)),
                Parameter::scalar("Alpha", 0.75),
            ],
            vec![],
        );
        assert_eq!(effect.parameter_index("Alpha"), Some(0));
        assert_eq!(effect.parameter("Alpha").and_then(Parameter::as_f32), Some(0.5));
        let label = effect.parameter("Label").unwrap();
        assert_eq!(effect.resolve(label).string(), Some("hello"));
        assert_eq!(effect.parameter("Missing"), None);
    }

    #[test]
    fn effect_is_a_parameter_source() {
        let effect = Effect::new(
            vec![],
            vec![Parameter::matrix("World", 2, 2, &[1.0, 2.0, 3.0, 4.0])],
            vec![],
        );
        let value = effect.parameter_value("World").unwrap();
        assert_eq!(value.class, InputClass::MatrixRows);
        assert_eq!(value.values.as_ref(), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn effect_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Effect>();
    }
}
