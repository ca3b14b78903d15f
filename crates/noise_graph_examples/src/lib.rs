#![forbid(unsafe_code)]

mod rendering;

pub use rendering::{init_tracing, render_buffer_to_png, Palette};
