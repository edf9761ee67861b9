pub mod memory;

pub use memory::MemoryIdentity;
