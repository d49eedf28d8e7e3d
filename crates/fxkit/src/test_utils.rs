//! Builders for synthetic legacy bundles and D3D9 shader bytecode.

use fxkit_preshader::test_utils::{build_ctab, comment_block, CtabEntry, PreshaderAssembler};
use fxkit_preshader::{parse_preshader, Opcode, Operand, RegisterSet, CTAB_FOURCC};

use crate::legacy::{TAG_BARE, TAG_WRAPPED};
use crate::model::{
    Effect, Expression, Parameter, ParameterClass, ParameterData, ParameterType, Pass, Technique,
};
use crate::shader::ShaderBlob;
use crate::state::{State, StateOperation, StateValueKind};

fn push_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn pad4(out: &mut Vec<u8>) {
    while out.len() % 4 != 0 {
        out.push(0);
    }
}

/// `size` followed by `bytes`, padded to 4 bytes.
fn push_blob(out: &mut Vec<u8>, bytes: &[u8]) {
    push_u32(out, u32::try_from(bytes.len()).expect("blob too large"));
    out.extend_from_slice(bytes);
    pad4(out);
}

/// Assembles SM1-SM3 shader bytecode containing declarations and comment blocks only.
#[derive(Debug, Clone)]
pub struct ShaderBuilder {
    version: u32,
    tokens: Vec<u32>,
}

impl ShaderBuilder {
    pub fn vertex(major: u8, minor: u8) -> Self {
        Self {
            version: 0xFFFE_0000 | (u32::from(major) << 8) | u32::from(minor),
            tokens: Vec::new(),
        }
    }

    pub fn pixel(major: u8, minor: u8) -> Self {
        Self {
            version: 0xFFFF_0000 | (u32::from(major) << 8) | u32::from(minor),
            tokens: Vec::new(),
        }
    }

    fn major(&self) -> u8 {
        ((self.version >> 8) & 0xFF) as u8
    }

    /// Appends a `CTAB` comment declaring `entries`.
    pub fn constants(mut self, entries: &[CtabEntry]) -> Self {
        let target = if self.version >> 16 == 0xFFFE {
            "vs_2_0"
        } else {
            "ps_2_0"
        };
        let table = build_ctab(target, entries);
        let payload: Vec<u32> = table
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        self.tokens.extend(comment_block(CTAB_FOURCC, &payload));
        self
    }

    /// Appends raw tokens, typically a `PRES` comment from
    /// [`fxkit_preshader::test_utils::PreshaderAssembler::assemble_pres_tokens`].
    pub fn preshader(mut self, pres_tokens: Vec<u32>) -> Self {
        self.tokens.extend(pres_tokens);
        self
    }

    /// Appends an instruction with the given operand tokens.
    pub fn op(mut self, opcode: u32, operands: &[u32]) -> Self {
        let len = if self.major() >= 2 {
            (operands.len() as u32) << 24
        } else {
            0
        };
        self.tokens.push(opcode | len);
        self.tokens.extend(operands.iter().map(|t| t | 0x8000_0000));
        self
    }

    /// `dcl_<usage><usage_index> v<register>`.
    pub fn dcl_input(self, usage: u8, usage_index: u8, register: u32) -> Self {
        let decl = u32::from(usage) | (u32::from(usage_index) << 16);
        let dst = (1 << 28) | (0xF << 16) | register;
        self.op(0x1F, &[decl, dst])
    }

    /// `dcl_<type> s<register>`; `texture_type` is 2 (2D), 3 (cube) or 4 (volume).
    pub fn dcl_sampler(self, register: u32, texture_type: u32) -> Self {
        let decl = texture_type << 27;
        // Sampler register type 10: low bits 2 in 28..30, high bits 8 in 11..12.
        let dst = (2 << 28) | (1 << 11) | (0xF << 16) | register;
        self.op(0x1F, &[decl, dst])
    }

    pub fn build(&self) -> Vec<u8> {
        std::iter::once(self.version)
            .chain(self.tokens.iter().copied())
            .chain(std::iter::once(0x0000_FFFF))
            .flat_map(u32::to_le_bytes)
            .collect()
    }
}

/// A legacy type definition.
#[derive(Debug, Clone)]
pub struct TypeDef {
    pub name: String,
    pub semantic: String,
    pub class: ParameterClass,
    pub ty: ParameterType,
    pub rows: u32,
    pub columns: u32,
    pub elements: u32,
    pub members: Vec<TypeDef>,
}

impl TypeDef {
    pub fn new(name: &str, class: ParameterClass, ty: ParameterType, rows: u32, columns: u32) -> Self {
        Self {
            name: name.to_owned(),
            semantic: String::new(),
            class,
            ty,
            rows,
            columns,
            elements: 0,
            members: Vec::new(),
        }
    }

    pub fn scalar(name: &str, ty: ParameterType) -> Self {
        Self::new(name, ParameterClass::Scalar, ty, 1, 1)
    }

    pub fn vector(name: &str, columns: u32) -> Self {
        Self::new(name, ParameterClass::Vector, ParameterType::Float, 1, columns)
    }

    pub fn matrix(name: &str, rows: u32, columns: u32) -> Self {
        Self::new(name, ParameterClass::MatrixRows, ParameterType::Float, rows, columns)
    }

    pub fn object(name: &str, ty: ParameterType) -> Self {
        Self::new(name, ParameterClass::Object, ty, 0, 0)
    }

    pub fn structure(name: &str, members: Vec<TypeDef>) -> Self {
        let mut def = Self::new(name, ParameterClass::Struct, ParameterType::Void, 0, 0);
        def.members = members;
        def
    }

    pub fn array(mut self, elements: u32) -> Self {
        self.elements = elements;
        self
    }

    pub fn semantic(mut self, semantic: &str) -> Self {
        self.semantic = semantic.to_owned();
        self
    }
}

/// A state record: operation, index and pool offsets of its type definition and value.
#[derive(Debug, Clone, Copy)]
pub struct StateRecord {
    pub operation: u32,
    pub index: u32,
    pub typedef: u32,
    pub value: u32,
}

#[derive(Debug, Clone)]
pub struct PassRecord {
    pub name: String,
    pub annotations: Vec<(u32, u32)>,
    pub states: Vec<StateRecord>,
}

/// Assembles a legacy effect bundle.
///
/// Names, type definitions and values go into a pool addressed by offset; records are appended
/// to their sections and laid out after the pool by [`BundleBuilder::build`].
#[derive(Debug, Default, Clone)]
pub struct BundleBuilder {
    pool: Vec<u8>,
    object_count: u32,
    parameters: Vec<u8>,
    parameter_count: u32,
    techniques: Vec<u8>,
    technique_count: u32,
    strings: Vec<u8>,
    string_count: u32,
    resources: Vec<u8>,
    resource_count: u32,
}

impl BundleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn pool_offset(&self) -> u32 {
        u32::try_from(self.pool.len()).expect("pool too large")
    }

    pub fn object_count(&mut self, count: u32) -> &mut Self {
        self.object_count = count;
        self
    }

    /// Stores a length-prefixed, NUL-terminated name and returns its offset.
    pub fn name(&mut self, name: &str) -> u32 {
        let offset = self.pool_offset();
        let mut bytes = name.as_bytes().to_vec();
        bytes.push(0);
        push_blob(&mut self.pool, &bytes);
        offset
    }

    /// Stores a type definition (struct members inline) and returns its offset.
    pub fn typedef(&mut self, def: &TypeDef) -> u32 {
        let mut bytes = Vec::new();
        self.encode_typedef(def, &mut bytes);
        let offset = self.pool_offset();
        self.pool.extend_from_slice(&bytes);
        offset
    }

    fn encode_typedef(&mut self, def: &TypeDef, out: &mut Vec<u8>) {
        let name = self.name(&def.name);
        let semantic = self.name(&def.semantic);
        push_u32(out, def.ty.raw());
        push_u32(out, def.class.raw());
        push_u32(out, name);
        push_u32(out, semantic);
        push_u32(out, def.elements);
        match def.class {
            ParameterClass::Vector => {
                push_u32(out, def.columns);
                push_u32(out, def.rows);
            }
            ParameterClass::Scalar | ParameterClass::MatrixRows | ParameterClass::MatrixColumns => {
                push_u32(out, def.rows);
                push_u32(out, def.columns);
            }
            ParameterClass::Struct => {
                push_u32(out, def.members.len() as u32);
                for member in &def.members {
                    self.encode_typedef(member, out);
                }
            }
            ParameterClass::Object => {}
        }
    }

    /// Stores raw value words and returns their offset.
    pub fn value(&mut self, words: &[u32]) -> u32 {
        let offset = self.pool_offset();
        for &word in words {
            push_u32(&mut self.pool, word);
        }
        offset
    }

    pub fn floats(&mut self, values: &[f32]) -> u32 {
        let words: Vec<u32> = values.iter().map(|v| v.to_bits()).collect();
        self.value(&words)
    }

    /// Stores a sampler value (`state_count` + state records) and returns its offset.
    pub fn sampler_value(&mut self, states: &[StateRecord]) -> u32 {
        let mut words = vec![states.len() as u32];
        for s in states {
            words.extend_from_slice(&[s.operation, s.index, s.typedef, s.value]);
        }
        self.value(&words)
    }

    /// State record for operation `name` with a single-word value of type `def`.
    pub fn state(&mut self, name: &str, index: u32, def: &TypeDef, value: &[u32]) -> StateRecord {
        let operation = StateOperation::from_name(name)
            .unwrap_or_else(|| panic!("unknown state {name}"))
            .index();
        StateRecord {
            operation,
            index,
            typedef: self.typedef(def),
            value: self.value(value),
        }
    }

    /// Appends a top-level parameter record.
    pub fn parameter(&mut self, typedef: u32, value: u32, annotations: &[(u32, u32)]) -> &mut Self {
        push_u32(&mut self.parameters, typedef);
        push_u32(&mut self.parameters, value);
        push_u32(&mut self.parameters, 0); // flags
        push_u32(&mut self.parameters, annotations.len() as u32);
        for &(t, v) in annotations {
            push_u32(&mut self.parameters, t);
            push_u32(&mut self.parameters, v);
        }
        self.parameter_count += 1;
        self
    }

    pub fn technique(&mut self, name: &str, passes: &[PassRecord]) -> &mut Self {
        let name = self.name(name);
        let mut out = Vec::new();
        push_u32(&mut out, name);
        push_u32(&mut out, 0);
        push_u32(&mut out, passes.len() as u32);
        for pass in passes {
            let pass_name = self.name(&pass.name);
            push_u32(&mut out, pass_name);
            push_u32(&mut out, pass.annotations.len() as u32);
            push_u32(&mut out, pass.states.len() as u32);
            for &(t, v) in &pass.annotations {
                push_u32(&mut out, t);
                push_u32(&mut out, v);
            }
            for s in &pass.states {
                for word in [s.operation, s.index, s.typedef, s.value] {
                    push_u32(&mut out, word);
                }
            }
        }
        self.techniques.extend_from_slice(&out);
        self.technique_count += 1;
        self
    }

    /// Payload of object slot `id`.
    pub fn string(&mut self, id: u32, bytes: &[u8]) -> &mut Self {
        push_u32(&mut self.strings, id);
        push_blob(&mut self.strings, bytes);
        self.string_count += 1;
        self
    }

    /// Resource record followed by `blobs`, each written as `size + bytes`.
    pub fn resource(
        &mut self,
        technique: u32,
        index: u32,
        element: u32,
        state: u32,
        usage: u32,
        blobs: &[&[u8]],
    ) -> &mut Self {
        for word in [technique, index, element, state, usage] {
            push_u32(&mut self.resources, word);
        }
        for blob in blobs {
            push_blob(&mut self.resources, blob);
        }
        self.resource_count += 1;
        self
    }

    /// Bare bundle.
    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        push_u32(&mut out, TAG_BARE);
        push_u32(&mut out, self.pool_offset());
        out.extend_from_slice(&self.pool);
        for word in [self.parameter_count, self.technique_count, 0, self.object_count] {
            push_u32(&mut out, word);
        }
        out.extend_from_slice(&self.parameters);
        out.extend_from_slice(&self.techniques);
        push_u32(&mut out, self.string_count);
        push_u32(&mut out, self.resource_count);
        out.extend_from_slice(&self.strings);
        out.extend_from_slice(&self.resources);
        out
    }

    /// Bundle preceded by a wrapped header of `header.len()` extra bytes.
    pub fn build_wrapped(&self, header: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        push_u32(&mut out, TAG_WRAPPED);
        push_u32(&mut out, 8 + header.len() as u32);
        out.extend_from_slice(header);
        out.extend_from_slice(&self.build());
        out
    }
}

fn op(name: &str) -> StateOperation {
    StateOperation::from_name(name).unwrap_or_else(|| panic!("unknown state {name}"))
}

fn expression(array_name: &str, build: impl FnOnce(&mut PreshaderAssembler)) -> Box<Expression> {
    let mut asm = PreshaderAssembler::new();
    build(&mut asm);
    Box::new(Expression {
        array_name: array_name.to_owned(),
        preshader: parse_preshader(&asm.assemble()).expect("assembled preshader"),
    })
}

/// A hand-built effect using every payload kind: strings, an analysed pixel shader with an
/// embedded preshader, arrays, structs, annotations, sampler states and all four state kinds.
pub fn sample_effect() -> Effect {
    let mut pres = PreshaderAssembler::new();
    let tint = pres.input("Alpha", 0, 1);
    let two = pres.literal(2.0);
    pres.instruction(Opcode::Mul, 1, &[tint, two], Operand::output(0));
    let shader = ShaderBuilder::pixel(2, 0)
        .constants(&[
            CtabEntry::new("Color", RegisterSet::Float4, 0, 1),
            CtabEntry::new("DiffuseSampler", RegisterSet::Sampler, 0, 1),
        ])
        .preshader(pres.assemble_pres_tokens())
        .dcl_sampler(0, 2)
        .build();
    let mut blob = ShaderBlob::parse(&shader).expect("synthetic shader");
    blob.samplers[0].parameter = "DiffuseMap".into();

    let objects = vec![
        Some(Parameter::object(
            "UIName",
            ParameterType::String,
            ParameterData::String("Opacity".into()),
        )),
        Some(Parameter::object(
            "",
            ParameterType::PixelShader,
            ParameterData::Shader(Box::new(blob)),
        )),
        None,
        Some(Parameter::object(
            "DiffuseMap",
            ParameterType::Texture2D,
            ParameterData::Bytes(vec![0xDE, 0xAD, 0xBE, 0xEF, 0x01]),
        )),
    ];

    let diffuse_map = Parameter::object("DiffuseMap", ParameterType::Texture2D, ParameterData::Shared(3));
    let sampler_states = vec![
        State {
            operation: op("Texture"),
            index: 0,
            kind: StateValueKind::ParameterReference,
            parameter: diffuse_map.clone(),
        },
        State::constant(op("MinFilter"), 0, Parameter::int("", 2)),
    ];

    let parameters = vec![
        Parameter::scalar("Alpha", 0.5).with_annotations(vec![Parameter::object(
            "UIName",
            ParameterType::String,
            ParameterData::Shared(0),
        )]),
        Parameter::vector("Color", &[1.0, 0.5, 0.25, 1.0]).with_semantic("DIFFUSE"),
        Parameter::matrix("World", 4, 4, &[0.0; 16]).with_semantic("WORLD"),
        Parameter::array(
            "Weights",
            vec![
                Parameter::scalar("", 10.0),
                Parameter::scalar("", 20.0),
                Parameter::scalar("", 30.0),
            ],
        ),
        Parameter::structure(
            "Material",
            vec![Parameter::int("Shininess", 32), Parameter::boolean("Lit", true)],
        ),
        diffuse_map,
        Parameter::object(
            "DiffuseSampler",
            ParameterType::Sampler2D,
            ParameterData::Samplers(sampler_states),
        ),
    ];

    let point_size = expression("", |asm| {
        let alpha = asm.input("Alpha", 0, 1);
        let four = asm.literal(4.0);
        asm.instruction(Opcode::Mul, 1, &[alpha, four], Operand::output(0));
    });
    let selector = expression("Weights", |asm| {
        let one = asm.literal(1.0);
        asm.instruction(Opcode::Mov, 1, &[one], Operand::output(0));
    });

    let states = vec![
        State::constant(op("AlphaBlendEnable"), 0, Parameter::boolean("", true)),
        State::constant(op("SrcBlend"), 0, Parameter::int("", 5)),
        State::constant(
            op("PixelShader"),
            0,
            Parameter::object("", ParameterType::PixelShader, ParameterData::Shared(1)),
        ),
        State {
            operation: op("PointSize"),
            index: 0,
            kind: StateValueKind::Expression,
            parameter: Parameter::object("", ParameterType::Float, ParameterData::Expression(point_size)),
        },
        State {
            operation: op("VertexShader"),
            index: 0,
            kind: StateValueKind::ExpressionIndex,
            parameter: Parameter::object(
                "Weights",
                ParameterType::VertexShader,
                ParameterData::Expression(selector),
            ),
        },
    ];

    let techniques = vec![Technique {
        name: "Main".into(),
        annotations: vec![Parameter::int("Priority", 1)],
        passes: vec![Pass {
            name: "P0".into(),
            annotations: Vec::new(),
            states,
        }],
    }];

    Effect::new(objects, parameters, techniques)
}
