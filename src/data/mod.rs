pub mod buffer;
pub mod overrides;
pub mod sample;
pub mod selection;
pub mod synapse;
