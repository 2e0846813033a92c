//! Resume PDF compilation: a Redis-backed queue and the worker that drains it.

pub mod queue;
pub mod worker;

pub use queue::enqueue_compile;
pub use worker::run_compile_worker;
