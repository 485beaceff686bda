//! The type model: value types, reference/heap types, limits, and the
//! composite function, table, memory and global types.

use crate::{encode_vec_len, leb128, Encode, EncodeError};

/// The type of a WebAssembly value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValType {
    /// The `i32` type.
    I32,
    /// The `i64` type.
    I64,
    /// The `f32` type.
    F32,
    /// The `f64` type.
    F64,
    /// The `v128` vector type.
    V128,
    /// A typed reference.
    Ref(RefType),
}

impl Encode for ValType {
    fn encode(&self, sink: &mut Vec<u8>) -> Result<(), EncodeError> {
        match self {
            ValType::I32 => sink.push(0x7F),
            ValType::I64 => sink.push(0x7E),
            ValType::F32 => sink.push(0x7D),
            ValType::F64 => sink.push(0x7C),
            ValType::V128 => sink.push(0x7B),
            ValType::Ref(ty) => ty.encode(sink)?,
        }
        Ok(())
    }
}

impl From<RefType> for ValType {
    fn from(ty: RefType) -> Self {
        ValType::Ref(ty)
    }
}

/// A reference type: a nullability flag plus the referent's heap type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RefType {
    /// Whether null is an inhabitant of this type.
    pub nullable: bool,
    /// What the reference points at.
    pub heap_type: HeapType,
}

impl RefType {
    /// The `funcref` type: a nullable reference to any function.
    pub const FUNCREF: RefType = RefType {
        nullable: true,
        heap_type: HeapType::Func,
    };

    /// The `externref` type: a nullable reference to an external value.
    pub const EXTERNREF: RefType = RefType {
        nullable: true,
        heap_type: HeapType::Extern,
    };

    /// A nullable reference to `heap_type`.
    pub fn nullable(heap_type: HeapType) -> RefType {
        RefType {
            nullable: true,
            heap_type,
        }
    }

    /// A non-nullable reference to `heap_type`.
    pub fn non_nullable(heap_type: HeapType) -> RefType {
        RefType {
            nullable: false,
            heap_type,
        }
    }
}

impl Encode for RefType {
    fn encode(&self, sink: &mut Vec<u8>) -> Result<(), EncodeError> {
        if self.nullable {
            sink.push(0x6C);
            self.heap_type.encode(sink)
        } else if let HeapType::Index(_) = self.heap_type {
            sink.push(0x6B);
            self.heap_type.encode(sink)
        } else {
            // Short form: a non-nullable abstract heap type is its own opcode.
            self.heap_type.encode(sink)
        }
    }
}

/// The referent category of a reference value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HeapType {
    /// Any function.
    Func,
    /// An external value.
    Extern,
    /// A declared function type, by type index.
    Index(u32),
}

impl Encode for HeapType {
    fn encode(&self, sink: &mut Vec<u8>) -> Result<(), EncodeError> {
        match *self {
            HeapType::Func => sink.push(0x70),
            HeapType::Extern => sink.push(0x6F),
            // A type index is its own payload, as a signed LEB128.
            HeapType::Index(i) => leb128::write_s64(sink, i64::from(i)),
        }
        Ok(())
    }
}

/// The input/output signature of a structured control instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockType {
    /// No inputs, no results.
    Empty,
    /// No inputs, a single result.
    Result(ValType),
    /// A full signature, by type index.
    FunctionType(u32),
}

impl Encode for BlockType {
    fn encode(&self, sink: &mut Vec<u8>) -> Result<(), EncodeError> {
        match *self {
            BlockType::Empty => {
                sink.push(0x40);
                Ok(())
            }
            BlockType::Result(ty) => ty.encode(sink),
            BlockType::FunctionType(i) => {
                leb128::write_s64(sink, i64::from(i));
                Ok(())
            }
        }
    }
}

/// Size bounds of a table or memory, in elements or pages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Limits {
    /// The minimum size.
    pub min: u32,
    /// The optional maximum size; unbounded when absent.
    pub max: Option<u32>,
}

impl Limits {
    /// Limits with a minimum only.
    pub fn at_least(min: u32) -> Limits {
        Limits { min, max: None }
    }

    /// Limits bounded on both ends.
    pub fn bounded(min: u32, max: u32) -> Limits {
        Limits {
            min,
            max: Some(max),
        }
    }
}

impl Encode for Limits {
    fn encode(&self, sink: &mut Vec<u8>) -> Result<(), EncodeError> {
        match self.max {
            None => {
                sink.push(0x00);
                leb128::write_u32(sink, self.min);
            }
            Some(max) => {
                sink.push(0x01);
                leb128::write_u32(sink, self.min);
                leb128::write_u32(sink, max);
            }
        }
        Ok(())
    }
}

/// The signature of a function: parameter and result types.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct FuncType {
    /// Parameter types, in order.
    pub params: Vec<ValType>,
    /// Result types, in order.
    pub results: Vec<ValType>,
}

impl FuncType {
    /// A function type with the given parameters and results.
    pub fn new(
        params: impl IntoIterator<Item = ValType>,
        results: impl IntoIterator<Item = ValType>,
    ) -> FuncType {
        FuncType {
            params: params.into_iter().collect(),
            results: results.into_iter().collect(),
        }
    }
}

impl Encode for FuncType {
    fn encode(&self, sink: &mut Vec<u8>) -> Result<(), EncodeError> {
        sink.push(0x60);
        encode_vec_len(sink, "params", self.params.len())?;
        for ty in &self.params {
            ty.encode(sink)?;
        }
        encode_vec_len(sink, "results", self.results.len())?;
        for ty in &self.results {
            ty.encode(sink)?;
        }
        Ok(())
    }
}

/// The type of a table: its element reference type and size limits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TableType {
    /// The element type.
    pub element: RefType,
    /// How many elements the table may hold.
    pub limits: Limits,
}

impl Encode for TableType {
    fn encode(&self, sink: &mut Vec<u8>) -> Result<(), EncodeError> {
        self.element.encode(sink)?;
        self.limits.encode(sink)
    }
}

/// The type of a global: its value type and mutability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GlobalType {
    /// The type of the global's value.
    pub val_type: ValType,
    /// Whether the global can be reassigned.
    pub mutable: bool,
}

impl Encode for GlobalType {
    fn encode(&self, sink: &mut Vec<u8>) -> Result<(), EncodeError> {
        self.val_type.encode(sink)?;
        sink.push(self.mutable as u8);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(item: impl Encode) -> Vec<u8> {
        let mut sink = Vec::new();
        item.encode(&mut sink).unwrap();
        sink
    }

    #[test]
    fn val_types_are_single_opcodes() {
        assert_eq!(encoded(ValType::I32), [0x7F]);
        assert_eq!(encoded(ValType::I64), [0x7E]);
        assert_eq!(encoded(ValType::F32), [0x7D]);
        assert_eq!(encoded(ValType::F64), [0x7C]);
        assert_eq!(encoded(ValType::V128), [0x7B]);
    }

    #[test]
    fn ref_type_short_form() {
        // Non-nullable abstract heap types collapse to the heap type opcode.
        assert_eq!(encoded(RefType::non_nullable(HeapType::Func)), [0x70]);
        assert_eq!(encoded(RefType::non_nullable(HeapType::Extern)), [0x6F]);
    }

    #[test]
    fn ref_type_marker_forms() {
        assert_eq!(
            encoded(RefType::non_nullable(HeapType::Index(1))),
            [0x6B, 0x01]
        );
        assert_eq!(encoded(RefType::FUNCREF), [0x6C, 0x70]);
        assert_eq!(encoded(RefType::EXTERNREF), [0x6C, 0x6F]);
        assert_eq!(encoded(RefType::nullable(HeapType::Index(3))), [0x6C, 0x03]);
    }

    #[test]
    fn heap_type_index_is_signed() {
        // Indices at or above 2^6 need a second signed-LEB group.
        assert_eq!(encoded(HeapType::Index(0x3F)), [0x3F]);
        assert_eq!(encoded(HeapType::Index(0x40)), [0xC0, 0x00]);
    }

    #[test]
    fn limits() {
        assert_eq!(encoded(Limits::at_least(1)), [0x00, 0x01]);
        assert_eq!(encoded(Limits::bounded(1, 5)), [0x01, 0x01, 0x05]);
    }

    #[test]
    fn func_type() {
        let ty = FuncType::new([ValType::I32, ValType::I32], [ValType::I64]);
        assert_eq!(encoded(ty), [0x60, 0x02, 0x7F, 0x7F, 0x01, 0x7E]);
        assert_eq!(encoded(FuncType::default()), [0x60, 0x00, 0x00]);
    }

    #[test]
    fn table_type() {
        let ty = TableType {
            element: RefType::FUNCREF,
            limits: Limits::bounded(0, 16),
        };
        assert_eq!(encoded(ty), [0x6C, 0x70, 0x01, 0x00, 0x10]);
    }

    #[test]
    fn global_type() {
        let var = GlobalType {
            val_type: ValType::I32,
            mutable: true,
        };
        let konst = GlobalType {
            val_type: ValType::F64,
            mutable: false,
        };
        assert_eq!(encoded(var), [0x7F, 0x01]);
        assert_eq!(encoded(konst), [0x7C, 0x00]);
    }

    #[test]
    fn block_types() {
        assert_eq!(encoded(BlockType::Empty), [0x40]);
        assert_eq!(encoded(BlockType::Result(ValType::I32)), [0x7F]);
        assert_eq!(encoded(BlockType::FunctionType(2)), [0x02]);
    }
}
