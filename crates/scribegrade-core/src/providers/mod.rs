//! External provider boundaries consumed by the grading pipeline.

pub mod judge;
