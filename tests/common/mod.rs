#![allow(dead_code)]

pub mod fixtures;
pub mod mocks;

pub use mocks::MockFile;
