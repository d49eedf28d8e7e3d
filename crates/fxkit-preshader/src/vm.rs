use std::borrow::Cow;
use std::collections::HashMap;
use std::hash::BuildHasher;

use tracing::trace;

use crate::error::PreshaderError;
use crate::opcode::{Opcode, OperandKind};
use crate::program::{Instruction, Operand, Preshader};

/// Shape of a numeric parameter as seen by the input loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputClass {
    /// One value per register.
    Scalar,
    /// One row.
    Vector,
    /// Row-major matrix.
    MatrixRows,
    /// Column-major matrix.
    MatrixColumns,
}

/// Current value of a numeric effect parameter.
///
/// `rows` and `columns` describe one element. Array parameters supply every element's values
/// back to back in `values`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterValue<'a> {
    /// Parameter class.
    pub class: InputClass,
    /// Rows per element.
    pub rows: u32,
    /// Columns per row.
    pub columns: u32,
    /// Row-major values.
    pub values: Cow<'a, [f32]>,
}

impl ParameterValue<'static> {
    /// A single scalar.
    pub fn scalar(value: f32) -> Self {
        Self {
            class: InputClass::Scalar,
            rows: 1,
            columns: 1,
            values: Cow::Owned(vec![value]),
        }
    }

    /// A row vector.
    pub fn vector(values: &[f32]) -> Self {
        Self {
            class: InputClass::Vector,
            rows: 1,
            columns: values.len() as u32,
            values: Cow::Owned(values.to_vec()),
        }
    }
}

/// Looks up parameter values by name for [`PreshaderVm::run`].
pub trait ParameterSource {
    /// Returns the current value of `name`, or `None` if no such numeric parameter exists.
    fn parameter_value(&self, name: &str) -> Option<ParameterValue<'_>>;
}

impl<S: BuildHasher> ParameterSource for HashMap<String, ParameterValue<'_>, S> {
    fn parameter_value(&self, name: &str) -> Option<ParameterValue<'_>> {
        self.get(name).map(|v| ParameterValue {
            class: v.class,
            rows: v.rows,
            columns: v.columns,
            values: Cow::Borrowed(&v.values),
        })
    }
}

/// Register-based interpreter for a [`Preshader`].
///
/// Owns the input and temporary register files, so a VM must not be shared between threads
/// while running. Evaluating the same program concurrently needs one VM per thread.
#[derive(Debug)]
pub struct PreshaderVm<'p> {
    program: &'p Preshader,
    inputs: Vec<f64>,
    temps: Vec<f64>,
}

impl<'p> PreshaderVm<'p> {
    /// Allocates register files sized for `program`.
    pub fn new(program: &'p Preshader) -> Self {
        Self {
            program,
            inputs: vec![0.0; program.input_register_count() as usize * 4],
            temps: vec![0.0; program.temp_register_count() as usize * 4],
        }
    }

    /// The program this VM evaluates.
    pub fn program(&self) -> &'p Preshader {
        self.program
    }

    /// Loads inputs from `params` and executes every instruction, writing results to
    /// `outputs` (addressed by scalar component).
    ///
    /// # Panics
    ///
    /// Panics if an operand addresses a literal outside the literal pool, if a destination
    /// operand is neither temp nor output, or if `outputs` is too short for an output operand.
    pub fn run<P>(&mut self, params: &P, outputs: &mut [f32]) -> Result<(), PreshaderError>
    where
        P: ParameterSource + ?Sized,
    {
        self.load_inputs(params)?;
        for instruction in self.program.instructions() {
            self.execute(instruction, outputs)?;
        }
        Ok(())
    }

    fn load_inputs<P>(&mut self, params: &P) -> Result<(), PreshaderError>
    where
        P: ParameterSource + ?Sized,
    {
        self.inputs.fill(0.0);
        for symbol in self.program.symbols() {
            let value = params
                .parameter_value(&symbol.name)
                .ok_or_else(|| PreshaderError::MissingParameter(symbol.name.clone()))?;
            let base = symbol.register_index as usize * 4;
            let register_count = symbol.register_count as usize;

            match value.class {
                InputClass::Scalar => {
                    for (i, &v) in value.values.iter().take(register_count).enumerate() {
                        self.inputs[base + i * 4] = f64::from(v);
                    }
                }
                InputClass::Vector | InputClass::MatrixRows | InputClass::MatrixColumns => {
                    let columns = value.columns.max(1) as usize;
                    let total_rows = value.values.len() / columns;
                    for (row, chunk) in value
                        .values
                        .chunks(columns)
                        .take(register_count.min(total_rows))
                        .enumerate()
                    {
                        for (col, &v) in chunk.iter().take(4).enumerate() {
                            self.inputs[base + row * 4 + col] = f64::from(v);
                        }
                    }
                }
            }
            trace!(name = %symbol.name, register = symbol.register_index, "loaded preshader input");
        }
        Ok(())
    }

    fn read(&self, operand: Operand, component: usize, outputs: &[f32]) -> f64 {
        match operand.kind {
            OperandKind::Literal => {
                let literals = self.program.literals();
                assert!(
                    component < literals.len(),
                    "literal operand {component} out of range (pool has {})",
                    literals.len()
                );
                literals[component]
            }
            OperandKind::Input => self.inputs[component],
            OperandKind::Output => f64::from(outputs[component]),
            OperandKind::Temp => self.temps[component],
        }
    }

    fn execute(&mut self, instruction: &Instruction, outputs: &mut [f32]) -> Result<(), PreshaderError> {
        let opcode = instruction.opcode;
        let elements = usize::from(instruction.element_count);
        let Some(destination) = instruction.destination() else {
            return Ok(());
        };

        let mut src = [[0.0f64; 4]; 3];
        for (slot, operand) in instruction.sources().iter().enumerate() {
            let base = operand.index as usize;
            for (e, value) in src[slot].iter_mut().enumerate().take(elements) {
                let component = if slot == 0 && opcode.is_scalar() {
                    base
                } else {
                    base + e
                };
                *value = self.read(*operand, component, outputs);
            }
        }

        let [a, b, c] = src;
        let mut dst = [0.0f64; 4];
        let unary = |f: fn(f64) -> f64, dst: &mut [f64; 4]| {
            for e in 0..elements {
                dst[e] = f(a[e]);
            }
        };
        let binary = |f: fn(f64, f64) -> f64, dst: &mut [f64; 4]| {
            for e in 0..elements {
                dst[e] = f(a[e], b[e]);
            }
        };

        match opcode {
            Opcode::Nop => return Ok(()),
            Opcode::Mov => unary(|x| x, &mut dst),
            Opcode::Neg => unary(|x| -x, &mut dst),
            Opcode::Rcp => unary(|x| 1.0 / x, &mut dst),
            Opcode::Frc => unary(|x| x - x.floor(), &mut dst),
            Opcode::Exp => unary(f64::exp, &mut dst),
            Opcode::Log => unary(f64::ln, &mut dst),
            Opcode::Rsq => unary(|x| 1.0 / x.sqrt(), &mut dst),
            Opcode::Sin => unary(f64::sin, &mut dst),
            Opcode::Cos => unary(f64::cos, &mut dst),
            Opcode::Asin => unary(f64::asin, &mut dst),
            Opcode::Acos => unary(f64::acos, &mut dst),
            Opcode::Atan => unary(f64::atan, &mut dst),
            Opcode::Min | Opcode::MinScalar => binary(f64::min, &mut dst),
            Opcode::Max | Opcode::MaxScalar => binary(f64::max, &mut dst),
            Opcode::Lt | Opcode::LtScalar => binary(|x, y| if x < y { 1.0 } else { 0.0 }, &mut dst),
            Opcode::Ge | Opcode::GeScalar => {
                binary(|x, y| if x >= y { 1.0 } else { 0.0 }, &mut dst)
            }
            Opcode::Add | Opcode::AddScalar => binary(|x, y| x + y, &mut dst),
            Opcode::Mul | Opcode::MulScalar => binary(|x, y| x * y, &mut dst),
            Opcode::Atan2 | Opcode::Atan2Scalar => binary(f64::atan2, &mut dst),
            Opcode::Div | Opcode::DivScalar => binary(|x, y| x / y, &mut dst),
            Opcode::Cmp => {
                for e in 0..elements {
                    dst[e] = if a[e] >= 0.0 { b[e] } else { c[e] };
                }
            }
            Opcode::Dot => {
                let dot: f64 = (0..elements).map(|e| a[e] * b[e]).sum();
                dst = [dot; 4];
            }
            Opcode::Movc | Opcode::Noise | Opcode::DotScalar | Opcode::NoiseScalar => {
                return Err(PreshaderError::UnsupportedOpcode(opcode));
            }
        }

        let base = destination.index as usize;
        match destination.kind {
            OperandKind::Temp => self.temps[base..base + elements].copy_from_slice(&dst[..elements]),
            OperandKind::Output => {
                for (out, &v) in outputs[base..base + elements].iter_mut().zip(&dst) {
                    *out = v as f32;
                }
            }
            kind => panic!("preshader destination must be temp or output, got {kind:?}"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::{PreshaderSymbol, RegisterSet};

    type Params = HashMap<String, ParameterValue<'static>>;

    fn program(literals: Vec<f64>, instructions: Vec<Instruction>) -> Preshader {
        Preshader::new(vec![], literals, instructions).unwrap()
    }

    fn run(pre: &Preshader, params: &Params) -> [f32; 8] {
        let mut out = [0.0f32; 8];
        PreshaderVm::new(pre).run(params, &mut out).unwrap();
        out
    }

    #[test]
    fn mov_copies_literals_elementwise() {
        let pre = program(
            vec![1.0, 2.0, 3.0, 4.0],
            vec![Instruction::new(
                Opcode::Mov,
                4,
                &[Operand::literal(0)],
                Operand::output(0),
            )],
        );
        assert_eq!(run(&pre, &Params::new())[..4], [1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn scalar_opcode_broadcasts_first_operand() {
        // literal 0 is read once and reused for all four elements.
        let pre = program(
            vec![5.0, 6.0, 7.0, 8.0, 0.0, 0.0, 0.0, 0.0],
            vec![Instruction::new(
                Opcode::AddScalar,
                4,
                &[Operand::literal(0), Operand::literal(4)],
                Operand::output(0),
            )],
        );
        assert_eq!(run(&pre, &Params::new())[..4], [5.0, 5.0, 5.0, 5.0]);
    }

    #[test]
    fn mul_of_two_literals() {
        let pre = program(
            vec![2.0, 3.0],
            vec![
                Instruction::new(
                    Opcode::Mul,
                    1,
                    &[Operand::literal(0), Operand::literal(1)],
                    Operand::temp(0),
                ),
                Instruction::new(Opcode::Mov, 1, &[Operand::temp(0)], Operand::output(0)),
            ],
        );
        let mut vm_out = [0.0f32; 1];
        let mut vm = PreshaderVm::new(&pre);
        vm.run(&Params::new(), &mut vm_out).unwrap();
        assert_eq!(vm.temps[0], 6.0);
        assert_eq!(vm_out[0], 6.0);
    }

    #[test]
    fn dot_broadcasts_sum() {
        let pre = program(
            vec![1.0, 2.0, 3.0, 4.0, 1.0, 1.0, 1.0, 1.0],
            vec![Instruction::new(
                Opcode::Dot,
                4,
                &[Operand::literal(0), Operand::literal(4)],
                Operand::output(0),
            )],
        );
        assert_eq!(run(&pre, &Params::new())[..4], [10.0; 4]);
    }

    #[test]
    fn cmp_lt_ge_select() {
        let pre = program(
            vec![-1.0, 2.0, 10.0, 20.0, 0.0, 1.0],
            vec![
                Instruction::new(
                    Opcode::Cmp,
                    2,
                    &[Operand::literal(0), Operand::literal(2), Operand::literal(3)],
                    Operand::output(0),
                ),
                Instruction::new(
                    Opcode::Lt,
                    2,
                    &[Operand::literal(0), Operand::literal(4)],
                    Operand::output(2),
                ),
                Instruction::new(
                    Opcode::Ge,
                    2,
                    &[Operand::literal(0), Operand::literal(4)],
                    Operand::output(4),
                ),
            ],
        );
        let out = run(&pre, &Params::new());
        // cmp picks src2[0] = literal 3 for -1 and src1[1] = literal 3 for 2.
        assert_eq!(out[..2], [20.0, 20.0]);
        assert_eq!(out[2..4], [1.0, 0.0]);
        assert_eq!(out[4..6], [0.0, 1.0]);
    }

    #[test]
    fn unary_functions() {
        let pre = program(
            vec![4.0, 1.25],
            vec![
                Instruction::new(Opcode::Rsq, 1, &[Operand::literal(0)], Operand::output(0)),
                Instruction::new(Opcode::Frc, 1, &[Operand::literal(1)], Operand::output(1)),
                Instruction::new(Opcode::Neg, 1, &[Operand::literal(0)], Operand::output(2)),
                Instruction::new(Opcode::Rcp, 1, &[Operand::literal(0)], Operand::output(3)),
            ],
        );
        assert_eq!(run(&pre, &Params::new())[..4], [0.5, 0.25, -4.0, 0.25]);
    }

    #[test]
    fn loads_scalar_inputs_one_per_register() {
        let symbols = vec![PreshaderSymbol {
            name: "Weights".into(),
            register_set: RegisterSet::Float4,
            register_index: 0,
            register_count: 2,
        }];
        let pre = Preshader::new(
            symbols,
            vec![],
            vec![
                Instruction::new(Opcode::Mov, 1, &[Operand::input(0)], Operand::output(0)),
                Instruction::new(Opcode::Mov, 1, &[Operand::input(4)], Operand::output(1)),
                Instruction::new(Opcode::Mov, 1, &[Operand::input(1)], Operand::output(2)),
            ],
        )
        .unwrap();
        let mut params = Params::new();
        params.insert(
            "Weights".into(),
            ParameterValue {
                class: InputClass::Scalar,
                rows: 1,
                columns: 1,
                values: Cow::Owned(vec![3.0, 7.0]),
            },
        );
        assert_eq!(run(&pre, &params)[..3], [3.0, 7.0, 0.0]);
    }

    #[test]
    fn loads_matrix_rows_up_to_register_count() {
        let symbols = vec![PreshaderSymbol {
            name: "M".into(),
            register_set: RegisterSet::Float4,
            register_index: 1,
            register_count: 1,
        }];
        let pre = Preshader::new(
            symbols,
            vec![],
            vec![Instruction::new(
                Opcode::Mov,
                4,
                &[Operand::input(4)],
                Operand::output(0),
            )],
        )
        .unwrap();
        let mut params = Params::new();
        params.insert(
            "M".into(),
            ParameterValue {
                class: InputClass::MatrixRows,
                rows: 2,
                columns: 2,
                values: Cow::Owned(vec![1.0, 2.0, 3.0, 4.0]),
            },
        );
        let mut vm_out = [0.0f32; 4];
        let mut vm = PreshaderVm::new(&pre);
        vm.run(&params, &mut vm_out).unwrap();
        assert_eq!(vm_out, [1.0, 2.0, 0.0, 0.0]);
        // Only one register was declared; the second row is dropped.
        assert_eq!(vm.inputs.len(), 8);
    }

    #[test]
    fn missing_parameter_is_an_error() {
        let symbols = vec![PreshaderSymbol {
            name: "Absent".into(),
            register_set: RegisterSet::Float4,
            register_index: 0,
            register_count: 1,
        }];
        let pre = Preshader::new(symbols, vec![], vec![]).unwrap();
        let err = PreshaderVm::new(&pre)
            .run(&Params::new(), &mut [])
            .unwrap_err();
        assert_eq!(err, PreshaderError::MissingParameter("Absent".into()));
    }

    #[test]
    fn unsupported_opcodes_fail_loudly() {
        for (opcode, sources) in [
            (Opcode::Movc, 3),
            (Opcode::Noise, 1),
            (Opcode::DotScalar, 2),
            (Opcode::NoiseScalar, 1),
        ] {
            let operands = vec![Operand::literal(0); sources];
            let pre = program(
                vec![0.0; 4],
                vec![Instruction::new(opcode, 1, &operands, Operand::output(0))],
            );
            let err = PreshaderVm::new(&pre)
                .run(&Params::new(), &mut [0.0; 4])
                .unwrap_err();
            assert_eq!(err, PreshaderError::UnsupportedOpcode(opcode));
        }
    }

    #[test]
    #[should_panic(expected = "literal operand")]
    fn literal_out_of_range_panics() {
        let pre = program(
            vec![1.0],
            vec![Instruction::new(
                Opcode::Mov,
                2,
                &[Operand::literal(0)],
                Operand::output(0),
            )],
        );
        let _ = PreshaderVm::new(&pre).run(&Params::new(), &mut [0.0; 4]);
    }

    #[test]
    #[should_panic(expected = "destination must be temp or output")]
    fn input_destination_panics() {
        let pre = program(
            vec![1.0],
            vec![Instruction::new(
                Opcode::Mov,
                1,
                &[Operand::literal(0)],
                Operand::input(0),
            )],
        );
        let _ = PreshaderVm::new(&pre).run(&Params::new(), &mut [0.0; 4]);
    }
}
