//! Evaluation of state expressions.
//!
//! `Expression` states compute their value with a preshader; `ExpressionIndex` states compute
//! an index into an array parameter. Both read their inputs through a [`ParameterSource`].

use fxkit_preshader::{ParameterSource, PreshaderError, PreshaderVm};
use thiserror::Error;

use crate::model::{Effect, Expression, Parameter};
use crate::state::{State, StateValueKind};

/// Errors produced while binding or evaluating a state expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpressionError {
    /// The computed index does not address an element of the bound array.
    #[error("expression selects element {index} of {array:?}, which has {len} elements")]
    IndexOutOfRange {
        /// Name of the bound array parameter.
        array: String,
        /// Index after truncation towards zero.
        index: i64,
        /// Number of elements in the array.
        len: usize,
    },

    /// The preshader produced NaN or an infinity where an index was expected.
    #[error("expression for {array:?} produced non-finite index {value}")]
    NonFiniteIndex {
        /// Name of the bound array parameter.
        array: String,
        /// Raw value of output register 0.
        value: f32,
    },

    /// The state is not an `ExpressionIndex` state.
    #[error("state {0} does not select an array element")]
    NotAnIndexExpression(&'static str),

    /// No top-level parameter has the name the expression selects from.
    #[error("array parameter {0:?} not found")]
    UnknownArray(String),

    /// The named parameter exists but has no elements.
    #[error("{0:?} is not an array parameter")]
    NotAnArray(String),

    /// Evaluating the preshader failed.
    #[error(transparent)]
    Preshader(#[from] PreshaderError),
}

/// Scratch output area large enough for `expression`, at least one register.
fn output_scratch(expression: &Expression) -> Vec<f32> {
    let registers = expression.preshader.output_register_count().max(1) as usize;
    vec![0.0; registers * 4]
}

/// Runs a value expression and returns its first output register.
pub fn evaluate_constant<P>(expression: &Expression, params: &P) -> Result<[f32; 4], ExpressionError>
where
    P: ParameterSource + ?Sized,
{
    let mut outputs = output_scratch(expression);
    PreshaderVm::new(&expression.preshader).run(params, &mut outputs)?;
    Ok([outputs[0], outputs[1], outputs[2], outputs[3]])
}

/// An index expression bound to the array it selects from.
#[derive(Debug)]
pub struct ExpressionBinding<'e> {
    expression: &'e Expression,
    array: &'e Parameter,
    vm: PreshaderVm<'e>,
    outputs: Vec<f32>,
}

impl<'e> ExpressionBinding<'e> {
    /// Binds `expression` to `array`, which must be an array parameter.
    pub fn new(expression: &'e Expression, array: &'e Parameter) -> Result<Self, ExpressionError> {
        if !array.is_array() {
            return Err(ExpressionError::NotAnArray(array.name.clone()));
        }
        Ok(Self {
            expression,
            array,
            vm: PreshaderVm::new(&expression.preshader),
            outputs: output_scratch(expression),
        })
    }

    /// Binds an `ExpressionIndex` state to the top-level array of `effect` it names.
    pub fn for_state(state: &'e State, effect: &'e Effect) -> Result<Self, ExpressionError> {
        let expression = match state.kind {
            StateValueKind::ExpressionIndex => state.expression(),
            _ => None,
        }
        .ok_or(ExpressionError::NotAnIndexExpression(state.name()))?;
        let array = effect
            .parameter(&expression.array_name)
            .ok_or_else(|| ExpressionError::UnknownArray(expression.array_name.clone()))?;
        Self::new(expression, array)
    }

    /// The bound index expression.
    pub fn expression(&self) -> &'e Expression {
        self.expression
    }

    /// The array parameter elements are selected from.
    pub fn array(&self) -> &'e Parameter {
        self.array
    }

    /// Runs the preshader and returns the array element selected by output register 0,
    /// truncated towards zero.
    pub fn evaluate<P>(&mut self, params: &P) -> Result<&'e Parameter, ExpressionError>
    where
        P: ParameterSource + ?Sized,
    {
        self.outputs.fill(0.0);
        self.vm.run(params, &mut self.outputs)?;
        let value = self.outputs[0];
        if !value.is_finite() {
            return Err(ExpressionError::NonFiniteIndex {
                array: self.array.name.clone(),
                value,
            });
        }
        let index = value.trunc() as i64;
        let elements = &self.array.elements;
        usize::try_from(index)
            .ok()
            .and_then(|i| elements.get(i))
            .ok_or_else(|| ExpressionError::IndexOutOfRange {
                array: self.array.name.clone(),
                index,
                len: elements.len(),
            })
    }
}
