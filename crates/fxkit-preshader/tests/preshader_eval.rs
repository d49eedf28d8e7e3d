use std::borrow::Cow;
use std::collections::HashMap;

use fxkit_preshader::{
    parse_preshader, parse_preshader_tokens, InputClass, Opcode, ParameterValue, PreshaderError,
    PreshaderVm, CLIT_FOURCC, CTAB_FOURCC, FXLC_FOURCC, PRESHADER_VERSION_TAG,
};
use proptest::prelude::*;

fn comment(fourcc: u32, payload: &[u32]) -> Vec<u32> {
    let mut out = vec![(((payload.len() + 1) as u32) << 16) | 0xFFFE, fourcc];
    out.extend_from_slice(payload);
    out
}

fn literals(values: &[f64]) -> Vec<u32> {
    let mut out = vec![values.len() as u32];
    for v in values {
        let bits = v.to_bits();
        out.push(bits as u32);
        out.push((bits >> 32) as u32);
    }
    out
}

/// `CTAB` with a single Float4 constant `name` at `c{register}`.
fn single_constant_ctab(name: &str, register: u16, count: u16) -> Vec<u32> {
    let mut bytes = Vec::new();
    let name_offset = 28 + 20;
    for v in [28u32, 0, 0xFFFF_0200, 1, 28, 0, 0] {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes.extend_from_slice(&(name_offset as u32).to_le_bytes());
    bytes.extend_from_slice(&2u16.to_le_bytes());
    bytes.extend_from_slice(&register.to_le_bytes());
    bytes.extend_from_slice(&count.to_le_bytes());
    bytes.extend_from_slice(&0u16.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(name.as_bytes());
    bytes.push(0);
    while bytes.len() % 4 != 0 {
        bytes.push(0);
    }
    bytes
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

/// `(opcode, elements, [(kind, index)...])` with the destination last.
fn fxlc(instructions: &[(Opcode, u32, &[(u32, u32)])]) -> Vec<u32> {
    let mut out = vec![instructions.len() as u32];
    for (opcode, elements, operands) in instructions {
        out.push((u32::from(opcode.raw()) << 16) | elements);
        out.push(operands.len() as u32 - 1);
        for &(kind, index) in *operands {
            out.extend_from_slice(&[0, kind, index]);
        }
    }
    out
}

const LIT: u32 = 1;
const IN: u32 = 2;
const OUT: u32 = 4;
const TEMP: u32 = 7;

#[test]
fn scaled_parameter_through_temp() {
    // temp0.x = Speed.x * 0.5; out0.x = temp0.x + 1
    let mut tokens = vec![PRESHADER_VERSION_TAG | 0x0201];
    tokens.extend(comment(CTAB_FOURCC, &single_constant_ctab("Speed", 0, 1)));
    tokens.extend(comment(CLIT_FOURCC, &literals(&[0.5, 1.0])));
    tokens.extend(comment(
        FXLC_FOURCC,
        &fxlc(&[
            (Opcode::Mul, 1, &[(IN, 0), (LIT, 0), (TEMP, 0)]),
            (Opcode::AddScalar, 1, &[(LIT, 1), (TEMP, 0), (OUT, 0)]),
        ]),
    ));
    tokens.push(0x0000_FFFF);

    let pre = parse_preshader_tokens(&tokens).unwrap();
    assert_eq!(pre.temp_register_count(), 1);

    let mut params = HashMap::new();
    params.insert("Speed".to_owned(), ParameterValue::scalar(8.0));
    let mut out = [0.0f32; 4];
    PreshaderVm::new(&pre).run(&params, &mut out).unwrap();
    assert_eq!(out[0], 5.0);
}

#[test]
fn vector_parameter_dot() {
    let mut tokens = vec![PRESHADER_VERSION_TAG | 0x0201];
    tokens.extend(comment(CTAB_FOURCC, &single_constant_ctab("Dir", 2, 1)));
    tokens.extend(comment(CLIT_FOURCC, &literals(&[0.0, 1.0, 0.0, 0.0])));
    tokens.extend(comment(
        FXLC_FOURCC,
        &fxlc(&[(Opcode::Dot, 4, &[(IN, 8), (LIT, 0), (OUT, 4)])]),
    ));

    let pre = parse_preshader_tokens(&tokens).unwrap();
    let mut params = HashMap::new();
    params.insert(
        "Dir".to_owned(),
        ParameterValue {
            class: InputClass::Vector,
            rows: 1,
            columns: 3,
            values: Cow::Owned(vec![0.25, -3.0, 9.0]),
        },
    );
    let mut out = [0.0f32; 8];
    PreshaderVm::new(&pre).run(&params, &mut out).unwrap();
    assert_eq!(out, [0.0, 0.0, 0.0, 0.0, -3.0, -3.0, -3.0, -3.0]);
}

#[test]
fn the_same_program_runs_on_independent_vms() {
    let mut tokens = vec![PRESHADER_VERSION_TAG | 0x0201];
    tokens.extend(comment(CTAB_FOURCC, &single_constant_ctab("X", 0, 1)));
    tokens.extend(comment(
        FXLC_FOURCC,
        &fxlc(&[(Opcode::Neg, 1, &[(IN, 0), (OUT, 0)])]),
    ));
    let pre = parse_preshader_tokens(&tokens).unwrap();

    std::thread::scope(|scope| {
        for i in 0..4 {
            let pre = &pre;
            scope.spawn(move || {
                let mut params = HashMap::new();
                params.insert("X".to_owned(), ParameterValue::scalar(i as f32));
                let mut out = [0.0f32; 1];
                PreshaderVm::new(pre).run(&params, &mut out).unwrap();
                assert_eq!(out[0], -(i as f32));
            });
        }
    });
}

#[test]
fn unknown_opcode_is_rejected() {
    let mut tokens = vec![PRESHADER_VERSION_TAG | 0x0201];
    let mut body = fxlc(&[(Opcode::Mov, 1, &[(LIT, 0), (OUT, 0)])]);
    body[1] = (0x7777 << 16) | 1;
    tokens.extend(comment(FXLC_FOURCC, &body));
    let err = parse_preshader_tokens(&tokens).unwrap_err();
    assert_eq!(err, PreshaderError::UnknownOpcode(0x7777));
}

proptest! {
    #[test]
    fn parser_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
        let _ = parse_preshader(&bytes);
    }

    #[test]
    fn parser_never_panics_on_tagged_streams(body in proptest::collection::vec(any::<u32>(), 0..128)) {
        let mut tokens = vec![PRESHADER_VERSION_TAG | 0x0201];
        tokens.extend(comment(FXLC_FOURCC, &body));
        let _ = parse_preshader_tokens(&tokens);
    }
}
