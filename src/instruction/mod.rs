//!
//! Instruction dispatch. A [`Registry`] maps mnemonics to descriptors that declare the shape of
//! each instruction's operands; a [`Dispatcher`] resolves a parsed line's tokens into
//! [`Target`]s, validates them against that shape and hands them to the instruction's handler.
//!

pub mod dispatcher;
pub mod error;
pub mod impls;
pub mod registry;
pub mod target;

pub use dispatcher::{Dispatcher, HandlerInstance};
pub use error::ExecError;
pub use registry::{HandlerFn, HandlerGroup, OperationDescriptor, Registry};
pub use target::{OperandKind, Target};
