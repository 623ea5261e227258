//! Core interfaces of experience buffers.
mod replay_buffer;
pub use replay_buffer::{ExperienceBufferBase, ReplayBufferBase};
