//! Hard limits applied while decoding effect bundles.
//!
//! Bundles are treated as untrusted input. Counts read from the stream are validated against
//! these limits (and against the bytes actually remaining) before anything is allocated.

/// Maximum nesting depth of struct/array type definitions.
///
/// Real effects nest structs a handful of levels deep at most; the limit keeps recursion on
/// hostile input bounded.
pub const MAX_TYPE_DEPTH: usize = 32;

/// Maximum number of elements of a single array parameter.
pub const MAX_ARRAY_ELEMENTS: u32 = 1 << 16;

/// Maximum number of members of a single struct parameter.
pub const MAX_STRUCT_MEMBERS: u32 = 1 << 12;

/// Maximum number of parameter nodes (including array elements, struct members, annotations
/// and state values) decoded from one bundle.
pub const MAX_DECODED_PARAMETERS: usize = 1 << 20;

/// Maximum length of a name, semantic or string object, in bytes.
pub const MAX_STRING_BYTES: usize = 1 << 16;

/// Maximum size of an embedded blob (shader bytecode, preshader, raw texture data).
pub const MAX_BLOB_BYTES: usize = 64 * 1024 * 1024; // 64 MiB

/// Maximum shader bytecode size accepted by the shader analyser.
pub const MAX_SHADER_BYTECODE_BYTES: usize = 1024 * 1024; // 1 MiB

/// Every counted list in the compact format stores its length in one byte.
pub const COMPACT_MAX_COUNT: usize = u8::MAX as usize;
