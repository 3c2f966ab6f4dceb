pub mod job;
pub mod pool;

pub use job::{is_supported_image, Job};
pub use pool::WorkerPool;
