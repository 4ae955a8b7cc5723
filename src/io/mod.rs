//! File I/O helpers for offline processing.

pub mod wav;
