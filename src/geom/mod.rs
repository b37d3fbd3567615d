//! Geometry primitives shared by the pipeline stages: the vertex record, edge functions, linear
//! interpolators and the block barycentric evaluator.

pub mod barycentric;
pub mod edge;
pub mod interp;
pub mod limits;
pub mod vertex;

pub use barycentric::{BarycentricBlock, BlockCoverage};
pub use edge::{EdgeFunction, EdgeFunctionFixed};
pub use interp::{LerpValue, LinearInterpolator1d, LinearInterpolator2d, StepValue};
pub use vertex::{lerp_vertex, Vertex, VertexFlags};
