//! Shared harness lives in `tests/support`; this crate has no library code.
