mod pool;
mod resolver;

pub use pool::{Candidate, Pool, PoolPolicy};
pub use resolver::Resolver;
