//! Compact runtime cache format.
//!
//! ```text
//! magic "FXKC", version u8
//! object_count u8,    object_count x (present u8, [entry])
//! parameter_count u8, parameter_count x entry
//! technique_count u8, technique_count x technique
//! ```
//!
//! A parameter entry starts with a back-reference byte. Anything other than [`NO_BACKREF`]
//! names an already decoded shared object whose copy stands for the whole entry. Otherwise
//! the entry carries its header, annotations, children and a tagged payload.
//!
//! Every list is counted with a single byte. [`write_effect`] rejects models that do not fit
//! with [`crate::EffectError::Capacity`].
//!
//! The format is closed: the version byte must match [`VERSION`] exactly.

mod io;
mod reader;
mod writer;

pub use reader::read_effect;
pub use writer::{write_effect, write_effect_to_vec};

pub const MAGIC: [u8; 4] = *b"FXKC";
pub const VERSION: u8 = 1;

/// Back-reference byte of an entry that is not a copy of a shared object.
pub const NO_BACKREF: u8 = 0xFF;

const DATA_NONE: u8 = 0;
const DATA_BYTES: u8 = 1;
const DATA_EXPRESSION: u8 = 2;
const DATA_SHADER: u8 = 3;
const DATA_SAMPLERS: u8 = 4;
const DATA_STRING: u8 = 5;
const DATA_SHARED: u8 = 6;
