//! Shared pieces of the compression machinery

pub mod bitio;
pub mod lzhash;
pub mod mtf;
pub mod ring_buffer;
pub mod vlc;
