mod buffer;
mod terminal;

pub use buffer::BufferSurface;
pub use terminal::TerminalSurface;
