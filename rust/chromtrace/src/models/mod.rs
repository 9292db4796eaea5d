pub mod arrays;
pub mod trace;
pub mod trace_group;

pub use arrays::Array2D;
pub use trace::{
    Trace,
    TraceDimension,
};
pub use trace_group::{
    TraceGroup,
    TraceLevel,
};
