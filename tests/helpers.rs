#![allow(dead_code)]

//! Small helpers shared by tests that bubble errors instead of unwrapping.

pub type Anyhow = anyhow::Result<()>;
