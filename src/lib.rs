//! Client for the 3DS input redirection protocol.
//!
//! Keeps the state of a virtual pad (buttons, touch screen, circle pad, C-stick)
//! and sends it to the console as 20-byte UDP frames from a single worker thread.

pub mod config;
pub mod console;
pub mod dump;
pub mod frame;
pub mod input;
pub mod session;
pub mod transport;
