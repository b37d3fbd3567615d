//! Limits for vertex attributes, varyings, uniforms and texture units.

/// Maximal count of user-defined attributes per vertex.
pub const MAX_ATTRIBUTES: usize = 16;

/// Maximal count of varyings per vertex.
pub const MAX_VARYINGS: usize = 32;

/// Maximal count of uniform locations per program.
pub const MAX_UNIFORM_LOCATIONS: usize = 1024;

/// Maximal count of texture units.
pub const MAX_TEXTURE_UNITS: usize = 16;
