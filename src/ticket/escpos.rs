//! # ESC/POS Byte Encoding
//!
//! Frames rendered receipt text for a thermal printer: initialize,
//! select character size, emit the UTF-8 text with trailing feed, then
//! partial-cut. Size selection uses `GS !` with 0x11 (double width and
//! height) for the large font and 0x00 otherwise.

use super::layout::TicketConfig;

/// ESC @ - reset the printer to its power-on state
const INIT: [u8; 2] = [0x1B, 0x40];

/// GS ! n - select character size
const SELECT_SIZE: [u8; 2] = [0x1D, 0x21];

const SIZE_NORMAL: u8 = 0x00;
const SIZE_DOUBLE: u8 = 0x11;

/// GS V B 3 - feed 3 units then partial cut
const FEED_AND_CUT: [u8; 4] = [0x1D, 0x56, 0x42, 0x03];

/// Blank lines pushed before the cut so the last text clears the blade
const TRAILING_FEED: &[u8] = b"\n\n\n";

/// Encode rendered receipt text into a complete ESC/POS job.
pub fn encode(text: &str, config: &TicketConfig) -> Vec<u8> {
    let size = if config.font_size == "large" {
        SIZE_DOUBLE
    } else {
        SIZE_NORMAL
    };

    let mut job = Vec::with_capacity(text.len() + 16);
    job.extend_from_slice(&INIT);
    job.extend_from_slice(&SELECT_SIZE);
    job.push(size);
    job.extend_from_slice(text.as_bytes());
    job.extend_from_slice(TRAILING_FEED);
    job.extend_from_slice(&FEED_AND_CUT);
    job
}
