//! Pure text geometry for the line editor: rendered-coordinate layout and
//! phrase boundary scanning. No I/O; everything here is driven with literal
//! widths, prompts, and buffers in tests.

mod layout;
mod phrase;

pub use layout::{BufferPos, buffer_pos_at, rel_coord, rendered_height};
pub use phrase::PhraseScanner;
