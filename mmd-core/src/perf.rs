mod perf_recorder;

pub use perf_recorder::*;
