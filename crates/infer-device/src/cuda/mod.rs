pub mod error;
pub mod ffi;
pub mod runtime;

pub use runtime::CudaRuntime;
