//! Utility functions shared by the compiler and the codec

pub mod sql;
pub mod time;
