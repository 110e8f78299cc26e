pub mod compositor;
pub mod control;
pub mod pipeline;
