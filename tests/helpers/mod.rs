#![allow(dead_code)]

mod memory;
mod writer;

pub use self::memory::Memory;
pub use self::writer::Writer;
