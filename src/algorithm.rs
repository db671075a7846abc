pub(crate) mod components;

pub use components::{partition, Component};
