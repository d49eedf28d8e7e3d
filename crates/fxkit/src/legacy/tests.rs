use fxkit_preshader::test_utils::{CtabEntry, PreshaderAssembler};
use fxkit_preshader::{Opcode, Operand, RegisterSet};
use pretty_assertions::assert_eq;

use super::*;
use crate::error::ErrorKind;
use crate::expression::{evaluate_constant, ExpressionBinding};
use crate::model::{ParameterClass, ParameterData, ParameterType};
use crate::state::{BlendFactor, CullMode, StateValueKind};
use crate::test_utils::{BundleBuilder, PassRecord, StateRecord, TypeDef};

fn pass(name: &str, states: Vec<StateRecord>) -> PassRecord {
    PassRecord {
        name: name.to_owned(),
        annotations: Vec::new(),
        states,
    }
}

fn int_state(b: &mut BundleBuilder, name: &str, value: u32) -> StateRecord {
    b.state(name, 0, &TypeDef::scalar("", ParameterType::Int), &[value])
}

fn kind_of(bytes: &[u8]) -> ErrorKind {
    parse_bundle(bytes).unwrap_err().kind()
}

#[test]
fn numeric_parameters_and_render_states() {
    let mut b = BundleBuilder::new();
    let t = b.typedef(&TypeDef::scalar("Alpha", ParameterType::Float));
    let v = b.floats(&[0.5]);
    b.parameter(t, v, &[]);
    let t = b.typedef(&TypeDef::vector("LightDir", 3).semantic("DIRECTION"));
    let v = b.floats(&[0.0, 1.0, 0.0]);
    b.parameter(t, v, &[]);
    let t = b.typedef(&TypeDef::matrix("World", 4, 4));
    let identity: Vec<f32> = (0..16).map(|i| if i % 5 == 0 { 1.0 } else { 0.0 }).collect();
    let v = b.floats(&identity);
    b.parameter(t, v, &[]);

    let states = vec![
        int_state(&mut b, "AlphaBlendEnable", 1),
        int_state(&mut b, "SrcBlend", 5),
        int_state(&mut b, "DestBlend", 6),
        int_state(&mut b, "CullMode", 3),
        int_state(&mut b, "AlphaRef", 0x80),
    ];
    b.technique("Main", &[pass("P0", states)]);

    let effect = parse_bundle(&b.build()).unwrap();

    let names: Vec<&str> = effect.parameters().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Alpha", "LightDir", "World"]);
    assert_eq!(effect.parameter("Alpha").unwrap().as_f32(), Some(0.5));
    let dir = effect.parameter("LightDir").unwrap();
    assert_eq!((dir.class, dir.rows, dir.columns), (ParameterClass::Vector, 1, 3));
    assert_eq!(dir.semantic, "DIRECTION");
    assert_eq!(dir.to_f32_values(), Some(vec![0.0, 1.0, 0.0]));
    let world = effect.parameter("World").unwrap();
    assert_eq!(world.byte_size(), 64);
    assert_eq!(world.to_f32_values(), Some(identity));

    let technique = effect.technique("Main").unwrap();
    let p0 = technique.pass("P0").unwrap();
    assert_eq!(p0.states.len(), 5);
    assert!(p0.states.iter().all(|s| s.kind == StateValueKind::Constant));

    let overrides = p0.overrides().unwrap();
    let blend = overrides.blend.unwrap();
    assert_eq!(blend.enable, Some(true));
    assert_eq!(blend.src, Some(BlendFactor::SrcAlpha));
    assert_eq!(blend.dst, Some(BlendFactor::InvSrcAlpha));
    assert_eq!(overrides.rasterizer.unwrap().cull, Some(CullMode::CCW));
    assert!(overrides.depth_stencil.is_none());
    assert_eq!(p0.vertex_shader(), None);
}

#[test]
fn struct_and_array_parameters() {
    let mut b = BundleBuilder::new();
    let light = TypeDef::structure(
        "Lights",
        vec![TypeDef::vector("Dir", 3), TypeDef::scalar("Intensity", ParameterType::Float)],
    )
    .array(2);
    let t = b.typedef(&light);
    let v = b.floats(&[1.0, 0.0, 0.0, 0.25, 0.0, 0.0, 1.0, 0.75]);
    b.parameter(t, v, &[]);

    let t = b.typedef(&TypeDef::scalar("Weights", ParameterType::Float).array(3));
    let v = b.floats(&[10.0, 20.0, 30.0]);
    b.parameter(t, v, &[]);

    let t = b.typedef(&TypeDef::structure(
        "Material",
        vec![
            TypeDef::scalar("Shininess", ParameterType::Int),
            TypeDef::scalar("Lit", ParameterType::Bool),
        ],
    ));
    let v = b.value(&[32, 1]);
    b.parameter(t, v, &[]);

    let effect = parse_bundle(&b.build()).unwrap();

    let lights = effect.parameter("Lights").unwrap();
    assert!(lights.is_array());
    assert!(!lights.is_struct());
    assert_eq!(lights.elements.len(), 2);
    for element in &lights.elements {
        assert_eq!(element.name, "Lights");
        assert_eq!(element.class, ParameterClass::Struct);
        let member_names: Vec<&str> = element.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(member_names, ["Dir", "Intensity"]);
    }
    assert_eq!(
        lights.elements[1].member("Intensity").unwrap().as_f32(),
        Some(0.75)
    );
    assert_eq!(lights.byte_size(), 32);

    let weights = effect.parameter("Weights").unwrap();
    assert_eq!(weights.to_f32_values(), Some(vec![10.0, 20.0, 30.0]));

    let material = effect.parameter("Material").unwrap();
    assert!(material.is_struct());
    assert_eq!(material.to_f32_values(), Some(vec![32.0, 1.0]));
}

#[test]
fn string_and_texture_objects() {
    let mut b = BundleBuilder::new();
    b.object_count(2);
    let ann_t = b.typedef(&TypeDef::object("UIName", ParameterType::String));
    let ann_v = b.value(&[0]);
    let t = b.typedef(&TypeDef::object("DiffuseMap", ParameterType::Texture2D));
    let v = b.value(&[1]);
    b.parameter(t, v, &[(ann_t, ann_v)]);
    b.string(0, b"Diffuse texture\0");
    b.string(1, &[1, 2, 3, 4, 5]);

    let effect = parse_bundle(&b.build()).unwrap();

    let map = effect.parameter("DiffuseMap").unwrap();
    assert_eq!(map.object_id(), Some(1));
    let label = map.annotation("UIName").unwrap();
    assert_eq!(effect.resolve(label).string(), Some("Diffuse texture"));
    assert_eq!(effect.resolve(map).bytes(), Some(&[1u8, 2, 3, 4, 5][..]));
    assert_eq!(effect.object(0).unwrap().name, "UIName");
}

#[test]
fn shaders_and_sampler_bindings() {
    let mut b = BundleBuilder::new();
    b.object_count(2);

    let t = b.typedef(&TypeDef::object("DiffuseMap", ParameterType::Texture2D));
    let v = b.value(&[0]);
    b.parameter(t, v, &[]);

    let texture = b.state("Texture", 0, &TypeDef::object("", ParameterType::Texture), &[0]);
    let filter = int_state(&mut b, "MinFilter", 2);
    let t = b.typedef(&TypeDef::object("DiffuseSampler", ParameterType::Sampler2D));
    let v = b.sampler_value(&[texture, filter]);
    b.parameter(t, v, &[]);

    let ps = b.state("PixelShader", 0, &TypeDef::object("", ParameterType::PixelShader), &[1]);
    b.technique("Main", &[pass("P0", vec![ps])]);

    let shader = crate::test_utils::ShaderBuilder::pixel(2, 0)
        .constants(&[CtabEntry::new("DiffuseSampler", RegisterSet::Sampler, 0, 1)])
        .dcl_sampler(0, 2)
        .build();
    b.resource(NONE_INDEX, 1, NONE_INDEX, 0, 1, &[b"DiffuseMap\0"]);
    b.resource(0, 0, NONE_INDEX, 0, 0, &[&shader]);

    let effect = parse_bundle(&b.build()).unwrap();

    let sampler = effect.parameter("DiffuseSampler").unwrap();
    let states = sampler.sampler_states().unwrap();
    assert_eq!(states[0].kind, StateValueKind::ParameterReference);
    assert_eq!(states[0].parameter.name, "DiffuseMap");
    assert_eq!(states[1].name(), "MinFilter");

    let p0 = &effect.techniques()[0].passes[0];
    let id = p0.pixel_shader().unwrap();
    let blob = effect.shader(id).unwrap();
    assert_eq!(blob.bytecode, shader);
    assert_eq!(blob.sampler("DiffuseSampler").unwrap().parameter, "DiffuseMap");
}

#[test]
fn constant_expression_state() {
    let mut asm = PreshaderAssembler::new();
    let scale = asm.input("Scale", 0, 1);
    let half = asm.literal(0.5);
    asm.instruction(Opcode::Mul, 1, &[scale, half], Operand::output(0));

    let mut b = BundleBuilder::new();
    let t = b.typedef(&TypeDef::scalar("Scale", ParameterType::Float));
    let v = b.floats(&[8.0]);
    b.parameter(t, v, &[]);
    let point_size = b.state("PointSize", 0, &TypeDef::scalar("", ParameterType::Float), &[0]);
    b.technique("Main", &[pass("P0", vec![point_size])]);
    b.resource(0, 0, NONE_INDEX, 0, 0, &[&asm.assemble()]);

    let effect = parse_bundle(&b.build()).unwrap();

    let state = &effect.techniques()[0].passes[0].states[0];
    assert_eq!(state.kind, StateValueKind::Expression);
    assert!(state.render_value().is_none());
    let expression = state.expression().unwrap();
    assert_eq!(expression.array_name, "");
    assert_eq!(evaluate_constant(expression, &effect).unwrap()[0], 4.0);
}

#[test]
fn array_selector_state() {
    let mut asm = PreshaderAssembler::new();
    let one = asm.literal(1.0);
    asm.instruction(Opcode::Mov, 1, &[one], Operand::output(0));

    let mut b = BundleBuilder::new();
    b.object_count(1);
    let t = b.typedef(&TypeDef::scalar("Values", ParameterType::Float).array(3));
    let v = b.floats(&[10.0, 20.0, 30.0]);
    b.parameter(t, v, &[]);
    let vs = b.state("VertexShader", 0, &TypeDef::object("", ParameterType::VertexShader), &[0]);
    b.technique("Main", &[pass("P0", vec![vs])]);
    b.resource(0, 0, NONE_INDEX, 0, 2, &[b"Values\0", &asm.assemble()]);

    let effect = parse_bundle(&b.build()).unwrap();

    let state = &effect.techniques()[0].passes[0].states[0];
    assert_eq!(state.kind, StateValueKind::ExpressionIndex);
    assert_eq!(state.parameter.name, "Values");
    let mut binding = ExpressionBinding::for_state(state, &effect).unwrap();
    assert_eq!(binding.evaluate(&effect).unwrap().as_f32(), Some(20.0));
}

#[test]
fn wrapped_bundle_matches_bare() {
    let mut b = BundleBuilder::new();
    let t = b.typedef(&TypeDef::scalar("Alpha", ParameterType::Float));
    let v = b.floats(&[0.5]);
    b.parameter(t, v, &[]);
    let zenable = int_state(&mut b, "ZEnable", 1);
    b.technique("T", &[pass("P", vec![zenable])]);

    let bare = parse_bundle(&b.build()).unwrap();
    let wrapped = parse_bundle(&b.build_wrapped(&[0xAA; 12])).unwrap();
    assert_eq!(bare, wrapped);
}

#[test]
fn rejects_unknown_tag() {
    let bytes = [0u8; 16];
    assert!(matches!(parse_bundle(&bytes), Err(EffectError::BadTag(0))));

    let mut bytes = TAG_WRAPPED.to_le_bytes().to_vec();
    bytes.extend_from_slice(&4u32.to_le_bytes());
    assert_eq!(kind_of(&bytes), ErrorKind::Corrupt);
}

#[test]
fn rejects_unknown_state_operation() {
    let mut b = BundleBuilder::new();
    let mut state = int_state(&mut b, "ZEnable", 1);
    state.operation = 9999;
    b.technique("T", &[pass("P", vec![state])]);
    assert_eq!(kind_of(&b.build()), ErrorKind::Corrupt);
}

#[test]
fn rejects_out_of_range_render_value() {
    let mut b = BundleBuilder::new();
    let zfunc = int_state(&mut b, "ZFunc", 99);
    b.technique("T", &[pass("P", vec![zfunc])]);
    assert_eq!(kind_of(&b.build()), ErrorKind::Unsupported);
}

#[test]
fn rejects_unknown_resource_usage() {
    let mut b = BundleBuilder::new();
    let alpha_ref = int_state(&mut b, "AlphaRef", 0);
    b.technique("T", &[pass("P", vec![alpha_ref])]);
    b.resource(0, 0, NONE_INDEX, 0, 7, &[]);
    assert_eq!(kind_of(&b.build()), ErrorKind::Unsupported);
}

#[test]
fn rejects_out_of_range_resource_indices() {
    for (technique, index, state) in [(1, 0, 0), (0, 1, 0), (0, 0, 1)] {
        let mut b = BundleBuilder::new();
        let alpha_ref = int_state(&mut b, "AlphaRef", 0);
        b.technique("T", &[pass("P", vec![alpha_ref])]);
        b.resource(technique, index, NONE_INDEX, state, 1, &[b"Alpha\0"]);
        assert_eq!(kind_of(&b.build()), ErrorKind::Corrupt, "{technique} {index} {state}");
    }

    let mut b = BundleBuilder::new();
    let t = b.typedef(&TypeDef::scalar("Alpha", ParameterType::Float));
    let v = b.floats(&[1.0]);
    b.parameter(t, v, &[]);
    b.resource(NONE_INDEX, 0, NONE_INDEX, 0, 1, &[b"Alpha\0"]);
    assert_eq!(kind_of(&b.build()), ErrorKind::Corrupt);
}

#[test]
fn rejects_bad_references() {
    let mut b = BundleBuilder::new();
    let alpha_ref = int_state(&mut b, "AlphaRef", 0);
    b.technique("T", &[pass("P", vec![alpha_ref])]);
    b.resource(0, 0, NONE_INDEX, 0, 1, &[b"Missing\0"]);
    assert_eq!(kind_of(&b.build()), ErrorKind::Corrupt);

    let mut asm = PreshaderAssembler::new();
    let zero = asm.literal(0.0);
    asm.instruction(Opcode::Mov, 1, &[zero], Operand::output(0));
    let mut b = BundleBuilder::new();
    let t = b.typedef(&TypeDef::scalar("Alpha", ParameterType::Float));
    let v = b.floats(&[1.0]);
    b.parameter(t, v, &[]);
    let alpha_ref = int_state(&mut b, "AlphaRef", 0);
    b.technique("T", &[pass("P", vec![alpha_ref])]);
    b.resource(0, 0, NONE_INDEX, 0, 2, &[b"Alpha\0", &asm.assemble()]);
    assert_eq!(kind_of(&b.build()), ErrorKind::Corrupt);
}

#[test]
fn reference_state_copies_parameter() {
    let mut b = BundleBuilder::new();
    let t = b.typedef(&TypeDef::scalar("Ref", ParameterType::Int));
    let v = b.value(&[0x40]);
    b.parameter(t, v, &[]);
    let alpha_ref = int_state(&mut b, "AlphaRef", 0);
    b.technique("T", &[pass("P", vec![alpha_ref])]);
    b.resource(0, 0, NONE_INDEX, 0, 1, &[b"Ref\0"]);

    let effect = parse_bundle(&b.build()).unwrap();
    let state = &effect.techniques()[0].passes[0].states[0];
    assert_eq!(state.kind, StateValueKind::ParameterReference);
    assert_eq!(&state.parameter, effect.parameter("Ref").unwrap());
}

#[test]
fn rejects_out_of_range_object_id() {
    let mut b = BundleBuilder::new();
    b.object_count(1);
    let t = b.typedef(&TypeDef::object("Name", ParameterType::String));
    let v = b.value(&[5]);
    b.parameter(t, v, &[]);
    assert_eq!(kind_of(&b.build()), ErrorKind::Corrupt);

    let mut b = BundleBuilder::new();
    b.object_count(1);
    b.string(0, b"orphan\0");
    assert_eq!(kind_of(&b.build()), ErrorKind::Corrupt);
}

#[test]
fn unknown_parameter_type_is_unsupported() {
    let mut b = BundleBuilder::new();
    let t = b.typedef(&TypeDef::scalar("Odd", ParameterType::Float));
    let v = b.floats(&[1.0]);
    b.parameter(t, v, &[]);
    let mut bytes = b.build();
    // The typedef's type field follows the two names in the pool.
    let at = 8 + t as usize;
    bytes[at..at + 4].copy_from_slice(&99u32.to_le_bytes());
    assert_eq!(kind_of(&bytes), ErrorKind::Unsupported);
}

#[test]
fn truncated_bundles_fail_cleanly() {
    let mut b = BundleBuilder::new();
    let t = b.typedef(&TypeDef::vector("Color", 4));
    let v = b.floats(&[1.0, 0.5, 0.25, 1.0]);
    b.parameter(t, v, &[]);
    let cull = int_state(&mut b, "CullMode", 1);
    b.technique("T", &[pass("P", vec![cull])]);
    let bytes = b.build();

    assert!(parse_bundle(&bytes).is_ok());
    for len in 0..bytes.len() {
        assert!(parse_bundle(&bytes[..len]).is_err(), "prefix of {len} bytes");
    }
}

#[test]
fn unclaimed_objects_are_tolerated() {
    let mut b = BundleBuilder::new();
    b.object_count(3);
    let effect = parse_bundle(&b.build()).unwrap();
    assert_eq!(effect.objects().len(), 3);
    assert!(effect.objects().iter().all(Option::is_none));
    assert_eq!(
        Parameter::object("", ParameterType::String, ParameterData::Shared(0)).byte_size(),
        4
    );
}
