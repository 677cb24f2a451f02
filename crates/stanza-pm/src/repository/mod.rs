mod inline;
mod memory;
mod traits;

pub use memory::MemoryRepository;
pub use traits::Repository;
