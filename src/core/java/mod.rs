pub mod runtime;

pub use runtime::{ensure_runtime, java_exe, locate_java_binary, runtime_bundle_url, runtime_id};
