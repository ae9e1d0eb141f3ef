//! Mode S demodulation from raw receiver samples
//!
//! The pipeline runs in four stages:
//! 1. Decode 12-bit little-endian samples
//! 2. Convert to signal power at 10 MHz
//! 3. Slide a window over the power stream and detect preambles
//! 4. Extract 112-bit frames and verify CRC-24

pub mod capture;
pub mod detect;
pub mod power;
pub mod samples;
pub mod window;

pub use capture::{spawn_capture, SampleSource, SampleStream};
pub use detect::{Demodulator, DetectorStats};
pub use power::{PowerComputer, PowerSource};
pub use samples::SampleDecoder;
pub use window::PowerWindow;
