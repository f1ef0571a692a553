//! Common imports for typical harness usage.
pub use crate::{
    GenerateBuilder, GenerationParams, Harness, HarnessBuilder, HarnessError, ModelRef,
    ProviderId, RunOutput, RunStream, StreamEvent,
};
