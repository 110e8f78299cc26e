pub mod capture_stream;
pub mod text_renderer;
