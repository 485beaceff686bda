//! A model-based WebAssembly binary encoder.
//!
//! Unlike a streaming encoder, this crate builds a complete in-memory
//! [`Module`] value first (ordered collections of types, functions, tables,
//! memories, globals, segments, imports and exports) and then serializes the
//! whole thing to the canonical binary container format in one pass. The
//! encoder is a producer only: it neither decodes existing binaries nor
//! validates that the model makes semantic sense (a dangling function index
//! encodes just fine and is left for an external validator to reject).
//!
//! # Example
//!
//! Building and encoding this module:
//!
//! ```wasm
//! (module
//!   (type (func (param i32 i32) (result i32)))
//!   (func (type 0)
//!     local.get 0
//!     local.get 1
//!     i32.add)
//!   (export "add" (func 0)))
//! ```
//!
//! ```
//! use wasm_emit::{Export, ExportKind, Func, FuncType, Instruction, Module, ValType};
//!
//! let mut module = Module::new();
//! module.types.push(FuncType {
//!     params: vec![ValType::I32, ValType::I32],
//!     results: vec![ValType::I32],
//! });
//! module.funcs.push(Func {
//!     type_index: 0,
//!     locals: vec![],
//!     body: vec![
//!         Instruction::LocalGet(0),
//!         Instruction::LocalGet(1),
//!         Instruction::I32Add,
//!     ],
//! });
//! module.exports.push(Export {
//!     name: "add".to_string(),
//!     kind: ExportKind::Func,
//!     index: 0,
//! });
//!
//! let wasm = module.to_bytes().unwrap();
//! assert!(wasmparser::validate(&wasm).is_ok());
//! ```

#![deny(missing_docs)]

mod encode;
mod error;
mod instructions;
pub mod leb128;
mod module;
mod types;

pub use encode::SectionId;
pub use error::EncodeError;
pub use instructions::*;
pub use module::*;
pub use types::*;

/// Anything that can serialize itself into the binary format.
///
/// Implementations append to a byte buffer; integer immediates go through
/// [`leb128`]. Encoding can fail only with a range violation; sink I/O is
/// the module assembler's concern, not the per-item encoders'.
pub trait Encode {
    /// Append the binary encoding of `self` to `sink`.
    fn encode(&self, sink: &mut Vec<u8>) -> Result<(), EncodeError>;
}

impl<T: Encode + ?Sized> Encode for &'_ T {
    fn encode(&self, sink: &mut Vec<u8>) -> Result<(), EncodeError> {
        T::encode(self, sink)
    }
}

/// Check that a count fits the u32 range the format requires.
pub(crate) fn check_count(what: &'static str, len: usize) -> Result<u32, EncodeError> {
    u32::try_from(len).map_err(|_| EncodeError::CountOverflow { what, len })
}

/// Write a vector length, rejecting lengths outside the u32 range.
pub(crate) fn encode_vec_len(
    sink: &mut Vec<u8>,
    what: &'static str,
    len: usize,
) -> Result<(), EncodeError> {
    let len = check_count(what, len)?;
    leb128::write_u32(sink, len);
    Ok(())
}

/// Write a length-prefixed UTF-8 string.
pub(crate) fn encode_name(sink: &mut Vec<u8>, name: &str) -> Result<(), EncodeError> {
    encode_vec_len(sink, "name", name.len())?;
    sink.extend_from_slice(name.as_bytes());
    Ok(())
}
