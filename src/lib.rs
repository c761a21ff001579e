pub mod clock;
pub mod config;
pub mod continuation;
pub mod coroutine;
pub mod driver;
pub mod errors;
pub mod generator;
pub mod init;
pub mod scheduler;
pub mod types;
pub mod values;

// Re-export main types
pub use types::*;

pub use clock::EventQueue;
pub use config::Config;
pub use continuation::{CancelToken, Continuation};
pub use coroutine::{from_fn, Coroutine, CoroutineState, Flow, Frame, Resume, Step};
pub use driver::{block_on, block_on_with, drive};
pub use errors::{Fault, FaultInfo};
pub use generator::Generator;
pub use init::init_tracing;
pub use scheduler::{begin_async, begin_async_with, AsyncYield, Registrar, TaskHandle};
pub use values::{json_to_val, val_to_json, Val};
