//! End-to-end scenario suite
