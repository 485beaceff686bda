//! The instruction model and its binary encoding.
//!
//! [`Instruction`] is one closed enum covering the modeled instruction set;
//! structured control instructions own their nested bodies, so the encoder
//! rather than the caller is responsible for the `else`/`end` framing bytes.
//! [`ConstInstr`] is the constant-expression subset, a separate type so that
//! initializer positions are restricted at compile time rather than checked
//! at run time.

use crate::{encode_vec_len, leb128, BlockType, Encode, EncodeError, HeapType, ValType};

/// The alignment and offset immediates of a memory access.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MemArg {
    /// Alignment exponent: the access promises alignment to `2^align` bytes.
    pub align: u32,
    /// Static byte offset added to the dynamic address.
    pub offset: u32,
}

impl MemArg {
    /// A memarg with the given alignment exponent and byte offset.
    pub fn new(align: u32, offset: u32) -> MemArg {
        MemArg { align, offset }
    }
}

impl Encode for MemArg {
    fn encode(&self, sink: &mut Vec<u8>) -> Result<(), EncodeError> {
        leb128::write_u32(sink, self.align);
        leb128::write_u32(sink, self.offset);
        Ok(())
    }
}

/// Opcode for terminating blocks, bodies and constant expressions.
const END: u8 = 0x0B;
/// Opcode separating the two branches of an `if`.
const ELSE: u8 = 0x05;

/// Write a `0xFC`-prefixed operator: the prefix byte, then the sub-opcode.
fn misc_op(sink: &mut Vec<u8>, op: u32) {
    sink.push(0xFC);
    leb128::write_u32(sink, op);
}

/// A WebAssembly instruction.
///
/// Grouped by category: control, parametric, variable, table, memory,
/// numeric, reference. Each variant carries exactly its immediates; indices
/// are `u32` by construction, so no range checking is deferred to encoding.
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub enum Instruction {
    // Control instructions.
    Unreachable,
    Nop,
    Block {
        ty: BlockType,
        body: Vec<Instruction>,
    },
    Loop {
        ty: BlockType,
        body: Vec<Instruction>,
    },
    If {
        ty: BlockType,
        then_body: Vec<Instruction>,
        else_body: Vec<Instruction>,
    },
    Br(u32),
    BrIf(u32),
    BrTable {
        labels: Vec<u32>,
        default: u32,
    },
    BrOnNull(u32),
    BrOnNonNull(u32),
    Return,
    Call(u32),
    CallIndirect {
        type_index: u32,
        table_index: u32,
    },
    CallRef(u32),

    // Parametric instructions.
    Drop,
    /// `select` with no type vector is the legacy untyped form; with a type
    /// it is the explicitly-typed form introduced with reference types.
    Select(Option<ValType>),

    // Variable instructions.
    LocalGet(u32),
    LocalSet(u32),
    LocalTee(u32),
    GlobalGet(u32),
    GlobalSet(u32),

    // Table instructions.
    TableGet(u32),
    TableSet(u32),
    TableSize(u32),
    TableGrow(u32),
    TableFill(u32),
    TableCopy {
        dst_table: u32,
        src_table: u32,
    },
    TableInit {
        elem_index: u32,
        table_index: u32,
    },
    ElemDrop(u32),

    // Memory instructions.
    I32Load(MemArg),
    I64Load(MemArg),
    F32Load(MemArg),
    F64Load(MemArg),
    I32Load8S(MemArg),
    I32Load8U(MemArg),
    I32Load16S(MemArg),
    I32Load16U(MemArg),
    I64Load8S(MemArg),
    I64Load8U(MemArg),
    I64Load16S(MemArg),
    I64Load16U(MemArg),
    I64Load32S(MemArg),
    I64Load32U(MemArg),
    I32Store(MemArg),
    I64Store(MemArg),
    F32Store(MemArg),
    F64Store(MemArg),
    I32Store8(MemArg),
    I32Store16(MemArg),
    I64Store8(MemArg),
    I64Store16(MemArg),
    I64Store32(MemArg),
    MemorySize(u32),
    MemoryGrow(u32),
    MemoryFill(u32),
    MemoryCopy {
        dst_mem: u32,
        src_mem: u32,
    },
    MemoryInit {
        data_index: u32,
        mem_index: u32,
    },
    DataDrop(u32),

    // Numeric instructions.
    I32Const(i32),
    I64Const(i64),
    F32Const(f32),
    F64Const(f64),
    I32Eqz,
    I32Eq,
    I32Ne,
    I32LtS,
    I32LtU,
    I32GtS,
    I32GtU,
    I32LeS,
    I32LeU,
    I32GeS,
    I32GeU,
    I64Eqz,
    I64Eq,
    I64Ne,
    I64LtS,
    I64LtU,
    I64GtS,
    I64GtU,
    I64LeS,
    I64LeU,
    I64GeS,
    I64GeU,
    F32Eq,
    F32Ne,
    F32Lt,
    F32Gt,
    F32Le,
    F32Ge,
    F64Eq,
    F64Ne,
    F64Lt,
    F64Gt,
    F64Le,
    F64Ge,
    I32Clz,
    I32Ctz,
    I32Popcnt,
    I32Add,
    I32Sub,
    I32Mul,
    I32DivS,
    I32DivU,
    I32RemS,
    I32RemU,
    I32And,
    I32Or,
    I32Xor,
    I32Shl,
    I32ShrS,
    I32ShrU,
    I32Rotl,
    I32Rotr,
    I64Clz,
    I64Ctz,
    I64Popcnt,
    I64Add,
    I64Sub,
    I64Mul,
    I64DivS,
    I64DivU,
    I64RemS,
    I64RemU,
    I64And,
    I64Or,
    I64Xor,
    I64Shl,
    I64ShrS,
    I64ShrU,
    I64Rotl,
    I64Rotr,
    F32Abs,
    F32Neg,
    F32Ceil,
    F32Floor,
    F32Trunc,
    F32Nearest,
    F32Sqrt,
    F32Add,
    F32Sub,
    F32Mul,
    F32Div,
    F32Min,
    F32Max,
    F32Copysign,
    F64Abs,
    F64Neg,
    F64Ceil,
    F64Floor,
    F64Trunc,
    F64Nearest,
    F64Sqrt,
    F64Add,
    F64Sub,
    F64Mul,
    F64Div,
    F64Min,
    F64Max,
    F64Copysign,
    I32WrapI64,
    I32TruncF32S,
    I32TruncF32U,
    I32TruncF64S,
    I32TruncF64U,
    I64ExtendI32S,
    I64ExtendI32U,
    I64TruncF32S,
    I64TruncF32U,
    I64TruncF64S,
    I64TruncF64U,
    F32ConvertI32S,
    F32ConvertI32U,
    F32ConvertI64S,
    F32ConvertI64U,
    F32DemoteF64,
    F64ConvertI32S,
    F64ConvertI32U,
    F64ConvertI64S,
    F64ConvertI64U,
    F64PromoteF32,
    I32ReinterpretF32,
    I64ReinterpretF64,
    F32ReinterpretI32,
    F64ReinterpretI64,
    I32Extend8S,
    I32Extend16S,
    I64Extend8S,
    I64Extend16S,
    I64Extend32S,
    I32TruncSatF32S,
    I32TruncSatF32U,
    I32TruncSatF64S,
    I32TruncSatF64U,
    I64TruncSatF32S,
    I64TruncSatF32U,
    I64TruncSatF64S,
    I64TruncSatF64U,

    // Reference instructions.
    RefNull(HeapType),
    RefIsNull,
    RefFunc(u32),
    RefAsNonNull,
}

/// Encode a nested instruction sequence and its terminating `end`.
fn encode_body(body: &[Instruction], sink: &mut Vec<u8>) -> Result<(), EncodeError> {
    for instruction in body {
        instruction.encode(sink)?;
    }
    sink.push(END);
    Ok(())
}

impl Encode for Instruction {
    fn encode(&self, sink: &mut Vec<u8>) -> Result<(), EncodeError> {
        match *self {
            // Control instructions.
            Instruction::Unreachable => sink.push(0x00),
            Instruction::Nop => sink.push(0x01),
            Instruction::Block { ty, ref body } => {
                sink.push(0x02);
                ty.encode(sink)?;
                encode_body(body, sink)?;
            }
            Instruction::Loop { ty, ref body } => {
                sink.push(0x03);
                ty.encode(sink)?;
                encode_body(body, sink)?;
            }
            Instruction::If {
                ty,
                ref then_body,
                ref else_body,
            } => {
                sink.push(0x04);
                ty.encode(sink)?;
                for instruction in then_body {
                    instruction.encode(sink)?;
                }
                // ELSE is written even for an empty else branch.
                sink.push(ELSE);
                for instruction in else_body {
                    instruction.encode(sink)?;
                }
                sink.push(END);
            }
            Instruction::Br(label) => {
                sink.push(0x0C);
                leb128::write_u32(sink, label);
            }
            Instruction::BrIf(label) => {
                sink.push(0x0D);
                leb128::write_u32(sink, label);
            }
            Instruction::BrTable {
                ref labels,
                default,
            } => {
                sink.push(0x0E);
                encode_vec_len(sink, "br_table labels", labels.len())?;
                for &label in labels {
                    leb128::write_u32(sink, label);
                }
                leb128::write_u32(sink, default);
            }
            Instruction::BrOnNull(label) => {
                sink.push(0xD4);
                leb128::write_u32(sink, label);
            }
            Instruction::BrOnNonNull(label) => {
                sink.push(0xD6);
                leb128::write_u32(sink, label);
            }
            Instruction::Return => sink.push(0x0F),
            Instruction::Call(func) => {
                sink.push(0x10);
                leb128::write_u32(sink, func);
            }
            Instruction::CallIndirect {
                type_index,
                table_index,
            } => {
                sink.push(0x11);
                leb128::write_u32(sink, type_index);
                leb128::write_u32(sink, table_index);
            }
            Instruction::CallRef(type_index) => {
                sink.push(0x14);
                leb128::write_u32(sink, type_index);
            }

            // Parametric instructions.
            Instruction::Drop => sink.push(0x1A),
            Instruction::Select(None) => sink.push(0x1B),
            Instruction::Select(Some(ty)) => {
                sink.push(0x1C);
                leb128::write_u32(sink, 1);
                ty.encode(sink)?;
            }

            // Variable instructions.
            Instruction::LocalGet(local) => {
                sink.push(0x20);
                leb128::write_u32(sink, local);
            }
            Instruction::LocalSet(local) => {
                sink.push(0x21);
                leb128::write_u32(sink, local);
            }
            Instruction::LocalTee(local) => {
                sink.push(0x22);
                leb128::write_u32(sink, local);
            }
            Instruction::GlobalGet(global) => {
                sink.push(0x23);
                leb128::write_u32(sink, global);
            }
            Instruction::GlobalSet(global) => {
                sink.push(0x24);
                leb128::write_u32(sink, global);
            }

            // Table instructions.
            Instruction::TableGet(table) => {
                sink.push(0x25);
                leb128::write_u32(sink, table);
            }
            Instruction::TableSet(table) => {
                sink.push(0x26);
                leb128::write_u32(sink, table);
            }
            Instruction::TableInit {
                elem_index,
                table_index,
            } => {
                misc_op(sink, 12);
                leb128::write_u32(sink, elem_index);
                leb128::write_u32(sink, table_index);
            }
            Instruction::ElemDrop(elem) => {
                misc_op(sink, 13);
                leb128::write_u32(sink, elem);
            }
            Instruction::TableCopy {
                dst_table,
                src_table,
            } => {
                misc_op(sink, 14);
                leb128::write_u32(sink, dst_table);
                leb128::write_u32(sink, src_table);
            }
            Instruction::TableGrow(table) => {
                misc_op(sink, 15);
                leb128::write_u32(sink, table);
            }
            Instruction::TableSize(table) => {
                misc_op(sink, 16);
                leb128::write_u32(sink, table);
            }
            Instruction::TableFill(table) => {
                misc_op(sink, 17);
                leb128::write_u32(sink, table);
            }

            // Memory instructions.
            Instruction::I32Load(memarg) => {
                sink.push(0x28);
                memarg.encode(sink)?;
            }
            Instruction::I64Load(memarg) => {
                sink.push(0x29);
                memarg.encode(sink)?;
            }
            Instruction::F32Load(memarg) => {
                sink.push(0x2A);
                memarg.encode(sink)?;
            }
            Instruction::F64Load(memarg) => {
                sink.push(0x2B);
                memarg.encode(sink)?;
            }
            Instruction::I32Load8S(memarg) => {
                sink.push(0x2C);
                memarg.encode(sink)?;
            }
            Instruction::I32Load8U(memarg) => {
                sink.push(0x2D);
                memarg.encode(sink)?;
            }
            Instruction::I32Load16S(memarg) => {
                sink.push(0x2E);
                memarg.encode(sink)?;
            }
            Instruction::I32Load16U(memarg) => {
                sink.push(0x2F);
                memarg.encode(sink)?;
            }
            Instruction::I64Load8S(memarg) => {
                sink.push(0x30);
                memarg.encode(sink)?;
            }
            Instruction::I64Load8U(memarg) => {
                sink.push(0x31);
                memarg.encode(sink)?;
            }
            Instruction::I64Load16S(memarg) => {
                sink.push(0x32);
                memarg.encode(sink)?;
            }
            Instruction::I64Load16U(memarg) => {
                sink.push(0x33);
                memarg.encode(sink)?;
            }
            Instruction::I64Load32S(memarg) => {
                sink.push(0x34);
                memarg.encode(sink)?;
            }
            Instruction::I64Load32U(memarg) => {
                sink.push(0x35);
                memarg.encode(sink)?;
            }
            Instruction::I32Store(memarg) => {
                sink.push(0x36);
                memarg.encode(sink)?;
            }
            Instruction::I64Store(memarg) => {
                sink.push(0x37);
                memarg.encode(sink)?;
            }
            Instruction::F32Store(memarg) => {
                sink.push(0x38);
                memarg.encode(sink)?;
            }
            Instruction::F64Store(memarg) => {
                sink.push(0x39);
                memarg.encode(sink)?;
            }
            Instruction::I32Store8(memarg) => {
                sink.push(0x3A);
                memarg.encode(sink)?;
            }
            Instruction::I32Store16(memarg) => {
                sink.push(0x3B);
                memarg.encode(sink)?;
            }
            Instruction::I64Store8(memarg) => {
                sink.push(0x3C);
                memarg.encode(sink)?;
            }
            Instruction::I64Store16(memarg) => {
                sink.push(0x3D);
                memarg.encode(sink)?;
            }
            Instruction::I64Store32(memarg) => {
                sink.push(0x3E);
                memarg.encode(sink)?;
            }
            Instruction::MemorySize(mem) => {
                sink.push(0x3F);
                leb128::write_u32(sink, mem);
            }
            Instruction::MemoryGrow(mem) => {
                sink.push(0x40);
                leb128::write_u32(sink, mem);
            }
            Instruction::MemoryInit {
                data_index,
                mem_index,
            } => {
                misc_op(sink, 8);
                leb128::write_u32(sink, data_index);
                leb128::write_u32(sink, mem_index);
            }
            Instruction::DataDrop(data) => {
                misc_op(sink, 9);
                leb128::write_u32(sink, data);
            }
            Instruction::MemoryCopy { dst_mem, src_mem } => {
                misc_op(sink, 10);
                leb128::write_u32(sink, dst_mem);
                leb128::write_u32(sink, src_mem);
            }
            Instruction::MemoryFill(mem) => {
                misc_op(sink, 11);
                leb128::write_u32(sink, mem);
            }

            // Numeric instructions.
            Instruction::I32Const(value) => {
                sink.push(0x41);
                leb128::write_s64(sink, value.into());
            }
            Instruction::I64Const(value) => {
                sink.push(0x42);
                leb128::write_s64(sink, value);
            }
            Instruction::F32Const(value) => {
                sink.push(0x43);
                sink.extend_from_slice(&value.to_le_bytes());
            }
            Instruction::F64Const(value) => {
                sink.push(0x44);
                sink.extend_from_slice(&value.to_le_bytes());
            }
            Instruction::I32Eqz => sink.push(0x45),
            Instruction::I32Eq => sink.push(0x46),
            Instruction::I32Ne => sink.push(0x47),
            Instruction::I32LtS => sink.push(0x48),
            Instruction::I32LtU => sink.push(0x49),
            Instruction::I32GtS => sink.push(0x4A),
            Instruction::I32GtU => sink.push(0x4B),
            Instruction::I32LeS => sink.push(0x4C),
            Instruction::I32LeU => sink.push(0x4D),
            Instruction::I32GeS => sink.push(0x4E),
            Instruction::I32GeU => sink.push(0x4F),
            Instruction::I64Eqz => sink.push(0x50),
            Instruction::I64Eq => sink.push(0x51),
            Instruction::I64Ne => sink.push(0x52),
            Instruction::I64LtS => sink.push(0x53),
            Instruction::I64LtU => sink.push(0x54),
            Instruction::I64GtS => sink.push(0x55),
            Instruction::I64GtU => sink.push(0x56),
            Instruction::I64LeS => sink.push(0x57),
            Instruction::I64LeU => sink.push(0x58),
            Instruction::I64GeS => sink.push(0x59),
            Instruction::I64GeU => sink.push(0x5A),
            Instruction::F32Eq => sink.push(0x5B),
            Instruction::F32Ne => sink.push(0x5C),
            Instruction::F32Lt => sink.push(0x5D),
            Instruction::F32Gt => sink.push(0x5E),
            Instruction::F32Le => sink.push(0x5F),
            Instruction::F32Ge => sink.push(0x60),
            Instruction::F64Eq => sink.push(0x61),
            Instruction::F64Ne => sink.push(0x62),
            Instruction::F64Lt => sink.push(0x63),
            Instruction::F64Gt => sink.push(0x64),
            Instruction::F64Le => sink.push(0x65),
            Instruction::F64Ge => sink.push(0x66),
            Instruction::I32Clz => sink.push(0x67),
            Instruction::I32Ctz => sink.push(0x68),
            Instruction::I32Popcnt => sink.push(0x69),
            Instruction::I32Add => sink.push(0x6A),
            Instruction::I32Sub => sink.push(0x6B),
            Instruction::I32Mul => sink.push(0x6C),
            Instruction::I32DivS => sink.push(0x6D),
            Instruction::I32DivU => sink.push(0x6E),
            Instruction::I32RemS => sink.push(0x6F),
            Instruction::I32RemU => sink.push(0x70),
            Instruction::I32And => sink.push(0x71),
            Instruction::I32Or => sink.push(0x72),
            Instruction::I32Xor => sink.push(0x73),
            Instruction::I32Shl => sink.push(0x74),
            Instruction::I32ShrS => sink.push(0x75),
            Instruction::I32ShrU => sink.push(0x76),
            Instruction::I32Rotl => sink.push(0x77),
            Instruction::I32Rotr => sink.push(0x78),
            Instruction::I64Clz => sink.push(0x79),
            Instruction::I64Ctz => sink.push(0x7A),
            Instruction::I64Popcnt => sink.push(0x7B),
            Instruction::I64Add => sink.push(0x7C),
            Instruction::I64Sub => sink.push(0x7D),
            Instruction::I64Mul => sink.push(0x7E),
            Instruction::I64DivS => sink.push(0x7F),
            Instruction::I64DivU => sink.push(0x80),
            Instruction::I64RemS => sink.push(0x81),
            Instruction::I64RemU => sink.push(0x82),
            Instruction::I64And => sink.push(0x83),
            Instruction::I64Or => sink.push(0x84),
            Instruction::I64Xor => sink.push(0x85),
            Instruction::I64Shl => sink.push(0x86),
            Instruction::I64ShrS => sink.push(0x87),
            Instruction::I64ShrU => sink.push(0x88),
            Instruction::I64Rotl => sink.push(0x89),
            Instruction::I64Rotr => sink.push(0x8A),
            Instruction::F32Abs => sink.push(0x8B),
            Instruction::F32Neg => sink.push(0x8C),
            Instruction::F32Ceil => sink.push(0x8D),
            Instruction::F32Floor => sink.push(0x8E),
            Instruction::F32Trunc => sink.push(0x8F),
            Instruction::F32Nearest => sink.push(0x90),
            Instruction::F32Sqrt => sink.push(0x91),
            Instruction::F32Add => sink.push(0x92),
            Instruction::F32Sub => sink.push(0x93),
            Instruction::F32Mul => sink.push(0x94),
            Instruction::F32Div => sink.push(0x95),
            Instruction::F32Min => sink.push(0x96),
            Instruction::F32Max => sink.push(0x97),
            Instruction::F32Copysign => sink.push(0x98),
            Instruction::F64Abs => sink.push(0x99),
            Instruction::F64Neg => sink.push(0x9A),
            Instruction::F64Ceil => sink.push(0x9B),
            Instruction::F64Floor => sink.push(0x9C),
            Instruction::F64Trunc => sink.push(0x9D),
            Instruction::F64Nearest => sink.push(0x9E),
            Instruction::F64Sqrt => sink.push(0x9F),
            Instruction::F64Add => sink.push(0xA0),
            Instruction::F64Sub => sink.push(0xA1),
            Instruction::F64Mul => sink.push(0xA2),
            Instruction::F64Div => sink.push(0xA3),
            Instruction::F64Min => sink.push(0xA4),
            Instruction::F64Max => sink.push(0xA5),
            Instruction::F64Copysign => sink.push(0xA6),
            Instruction::I32WrapI64 => sink.push(0xA7),
            Instruction::I32TruncF32S => sink.push(0xA8),
            Instruction::I32TruncF32U => sink.push(0xA9),
            Instruction::I32TruncF64S => sink.push(0xAA),
            Instruction::I32TruncF64U => sink.push(0xAB),
            Instruction::I64ExtendI32S => sink.push(0xAC),
            Instruction::I64ExtendI32U => sink.push(0xAD),
            Instruction::I64TruncF32S => sink.push(0xAE),
            Instruction::I64TruncF32U => sink.push(0xAF),
            Instruction::I64TruncF64S => sink.push(0xB0),
            Instruction::I64TruncF64U => sink.push(0xB1),
            Instruction::F32ConvertI32S => sink.push(0xB2),
            Instruction::F32ConvertI32U => sink.push(0xB3),
            Instruction::F32ConvertI64S => sink.push(0xB4),
            Instruction::F32ConvertI64U => sink.push(0xB5),
            Instruction::F32DemoteF64 => sink.push(0xB6),
            Instruction::F64ConvertI32S => sink.push(0xB7),
            Instruction::F64ConvertI32U => sink.push(0xB8),
            Instruction::F64ConvertI64S => sink.push(0xB9),
            Instruction::F64ConvertI64U => sink.push(0xBA),
            Instruction::F64PromoteF32 => sink.push(0xBB),
            Instruction::I32ReinterpretF32 => sink.push(0xBC),
            Instruction::I64ReinterpretF64 => sink.push(0xBD),
            Instruction::F32ReinterpretI32 => sink.push(0xBE),
            Instruction::F64ReinterpretI64 => sink.push(0xBF),
            Instruction::I32Extend8S => sink.push(0xC0),
            Instruction::I32Extend16S => sink.push(0xC1),
            Instruction::I64Extend8S => sink.push(0xC2),
            Instruction::I64Extend16S => sink.push(0xC3),
            Instruction::I64Extend32S => sink.push(0xC4),
            Instruction::I32TruncSatF32S => misc_op(sink, 0),
            Instruction::I32TruncSatF32U => misc_op(sink, 1),
            Instruction::I32TruncSatF64S => misc_op(sink, 2),
            Instruction::I32TruncSatF64U => misc_op(sink, 3),
            Instruction::I64TruncSatF32S => misc_op(sink, 4),
            Instruction::I64TruncSatF32U => misc_op(sink, 5),
            Instruction::I64TruncSatF64S => misc_op(sink, 6),
            Instruction::I64TruncSatF64U => misc_op(sink, 7),

            // Reference instructions.
            Instruction::RefNull(heap_type) => {
                sink.push(0xD0);
                heap_type.encode(sink)?;
            }
            Instruction::RefIsNull => sink.push(0xD1),
            Instruction::RefFunc(func) => {
                sink.push(0xD2);
                leb128::write_u32(sink, func);
            }
            Instruction::RefAsNonNull => sink.push(0xD3),
        }
        Ok(())
    }
}

/// An instruction permitted inside a constant expression.
///
/// Only this subset is legal in initializer positions (global initializers,
/// element and data offsets, element items). The restriction is a type-level
/// distinction of the encoder, not a semantic check; for instance, nothing
/// verifies that a `GlobalGet` names an immutable, previously defined global.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConstInstr {
    /// An `i32` constant.
    I32Const(i32),
    /// An `i64` constant.
    I64Const(i64),
    /// An `f32` constant; the bit pattern is preserved exactly.
    F32Const(f32),
    /// An `f64` constant; the bit pattern is preserved exactly.
    F64Const(f64),
    /// A null reference of the given heap type.
    RefNull(HeapType),
    /// A reference to the function at the given index.
    RefFunc(u32),
    /// The value of the global at the given index.
    GlobalGet(u32),
}

impl Encode for ConstInstr {
    fn encode(&self, sink: &mut Vec<u8>) -> Result<(), EncodeError> {
        match *self {
            ConstInstr::I32Const(value) => {
                sink.push(0x41);
                leb128::write_s64(sink, value.into());
            }
            ConstInstr::I64Const(value) => {
                sink.push(0x42);
                leb128::write_s64(sink, value);
            }
            ConstInstr::F32Const(value) => {
                sink.push(0x43);
                sink.extend_from_slice(&value.to_le_bytes());
            }
            ConstInstr::F64Const(value) => {
                sink.push(0x44);
                sink.extend_from_slice(&value.to_le_bytes());
            }
            ConstInstr::RefNull(heap_type) => {
                sink.push(0xD0);
                heap_type.encode(sink)?;
            }
            ConstInstr::RefFunc(func) => {
                sink.push(0xD2);
                leb128::write_u32(sink, func);
            }
            ConstInstr::GlobalGet(global) => {
                sink.push(0x23);
                leb128::write_u32(sink, global);
            }
        }
        Ok(())
    }
}

impl From<ConstInstr> for Instruction {
    fn from(instr: ConstInstr) -> Instruction {
        match instr {
            ConstInstr::I32Const(v) => Instruction::I32Const(v),
            ConstInstr::I64Const(v) => Instruction::I64Const(v),
            ConstInstr::F32Const(v) => Instruction::F32Const(v),
            ConstInstr::F64Const(v) => Instruction::F64Const(v),
            ConstInstr::RefNull(ty) => Instruction::RefNull(ty),
            ConstInstr::RefFunc(f) => Instruction::RefFunc(f),
            ConstInstr::GlobalGet(g) => Instruction::GlobalGet(g),
        }
    }
}

/// A constant expression: a sequence of [`ConstInstr`]s used in initializer
/// positions. The terminating `end` opcode is written by the encoder.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConstExpr(pub Vec<ConstInstr>);

impl ConstExpr {
    /// An expression built from the given instructions.
    pub fn new(instructions: impl IntoIterator<Item = ConstInstr>) -> ConstExpr {
        ConstExpr(instructions.into_iter().collect())
    }

    /// An expression with no instructions (encodes as a bare `end`).
    pub fn empty() -> ConstExpr {
        ConstExpr(Vec::new())
    }

    /// A single `i32.const`.
    pub fn i32_const(value: i32) -> ConstExpr {
        ConstExpr(vec![ConstInstr::I32Const(value)])
    }

    /// A single `i64.const`.
    pub fn i64_const(value: i64) -> ConstExpr {
        ConstExpr(vec![ConstInstr::I64Const(value)])
    }

    /// A single `f32.const`.
    pub fn f32_const(value: f32) -> ConstExpr {
        ConstExpr(vec![ConstInstr::F32Const(value)])
    }

    /// A single `f64.const`.
    pub fn f64_const(value: f64) -> ConstExpr {
        ConstExpr(vec![ConstInstr::F64Const(value)])
    }

    /// A single `ref.null`.
    pub fn ref_null(heap_type: HeapType) -> ConstExpr {
        ConstExpr(vec![ConstInstr::RefNull(heap_type)])
    }

    /// A single `ref.func`.
    pub fn ref_func(func: u32) -> ConstExpr {
        ConstExpr(vec![ConstInstr::RefFunc(func)])
    }

    /// A single `global.get`.
    pub fn global_get(global: u32) -> ConstExpr {
        ConstExpr(vec![ConstInstr::GlobalGet(global)])
    }
}

impl Encode for ConstExpr {
    fn encode(&self, sink: &mut Vec<u8>) -> Result<(), EncodeError> {
        for instruction in &self.0 {
            instruction.encode(sink)?;
        }
        sink.push(END);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BlockType, HeapType, ValType};

    fn encoded(item: impl Encode) -> Vec<u8> {
        let mut sink = Vec::new();
        item.encode(&mut sink).unwrap();
        sink
    }

    #[test]
    fn branches() {
        assert_eq!(encoded(Instruction::Br(1)), [0x0C, 0x01]);
        assert_eq!(encoded(Instruction::BrIf(1)), [0x0D, 0x01]);
        assert_eq!(encoded(Instruction::BrOnNull(1)), [0xD4, 0x01]);
        assert_eq!(encoded(Instruction::BrOnNonNull(1)), [0xD6, 0x01]);
        assert_eq!(
            encoded(Instruction::BrTable {
                labels: vec![0, 1, 2, 3],
                default: 4,
            }),
            [0x0E, 0x04, 0x00, 0x01, 0x02, 0x03, 0x04]
        );
    }

    #[test]
    fn calls() {
        assert_eq!(encoded(Instruction::Call(64)), [0x10, 0x40]);
        assert_eq!(
            encoded(Instruction::CallIndirect {
                type_index: 32,
                table_index: 1,
            }),
            [0x11, 0x20, 0x01]
        );
        assert_eq!(encoded(Instruction::CallRef(33)), [0x14, 0x21]);
    }

    #[test]
    fn block_owns_its_terminator() {
        let block = Instruction::Block {
            ty: BlockType::Empty,
            body: vec![Instruction::Nop],
        };
        assert_eq!(encoded(block), [0x02, 0x40, 0x01, 0x0B]);

        let looped = Instruction::Loop {
            ty: BlockType::Result(ValType::I32),
            body: vec![Instruction::I32Const(1)],
        };
        assert_eq!(encoded(looped), [0x03, 0x7F, 0x41, 0x01, 0x0B]);
    }

    #[test]
    fn if_with_both_branches() {
        let instr = Instruction::If {
            ty: BlockType::Empty,
            then_body: vec![Instruction::I32Const(1), Instruction::Drop],
            else_body: vec![Instruction::I32Const(0), Instruction::Drop],
        };
        assert_eq!(
            encoded(instr),
            [0x04, 0x40, 0x41, 0x01, 0x1A, 0x05, 0x41, 0x00, 0x1A, 0x0B]
        );
    }

    #[test]
    fn if_with_empty_else_still_writes_the_else_opcode() {
        let instr = Instruction::If {
            ty: BlockType::Empty,
            then_body: vec![Instruction::Nop],
            else_body: vec![],
        };
        assert_eq!(encoded(instr), [0x04, 0x40, 0x01, 0x05, 0x0B]);
    }

    #[test]
    fn nested_blocks() {
        let instr = Instruction::Block {
            ty: BlockType::Empty,
            body: vec![Instruction::Block {
                ty: BlockType::Empty,
                body: vec![Instruction::Br(1)],
            }],
        };
        assert_eq!(encoded(instr), [0x02, 0x40, 0x02, 0x40, 0x0C, 0x01, 0x0B, 0x0B]);
    }

    #[test]
    fn memory_accesses() {
        assert_eq!(
            encoded(Instruction::I32Load(MemArg::new(2, 1))),
            [0x28, 0x02, 0x01]
        );
        assert_eq!(
            encoded(Instruction::F64Store(MemArg::new(3, 0))),
            [0x39, 0x03, 0x00]
        );
        assert_eq!(
            encoded(Instruction::I64Load32U(MemArg::new(2, 8))),
            [0x35, 0x02, 0x08]
        );
    }

    #[test]
    fn memory_operators() {
        assert_eq!(encoded(Instruction::MemorySize(0)), [0x3F, 0x00]);
        assert_eq!(encoded(Instruction::MemoryGrow(0)), [0x40, 0x00]);
        assert_eq!(encoded(Instruction::MemoryFill(0)), [0xFC, 0x0B, 0x00]);
        assert_eq!(
            encoded(Instruction::MemoryCopy {
                dst_mem: 0,
                src_mem: 0,
            }),
            [0xFC, 0x0A, 0x00, 0x00]
        );
        assert_eq!(
            encoded(Instruction::MemoryInit {
                data_index: 2,
                mem_index: 0,
            }),
            [0xFC, 0x08, 0x02, 0x00]
        );
        assert_eq!(encoded(Instruction::DataDrop(2)), [0xFC, 0x09, 0x02]);
    }

    #[test]
    fn table_operators() {
        assert_eq!(encoded(Instruction::TableGet(32)), [0x25, 0x20]);
        assert_eq!(encoded(Instruction::TableSet(2)), [0x26, 0x02]);
        assert_eq!(encoded(Instruction::TableSize(4)), [0xFC, 0x10, 0x04]);
        assert_eq!(encoded(Instruction::TableGrow(8)), [0xFC, 0x0F, 0x08]);
        assert_eq!(encoded(Instruction::TableFill(16)), [0xFC, 0x11, 0x10]);
        assert_eq!(
            encoded(Instruction::TableCopy {
                dst_table: 32,
                src_table: 16,
            }),
            [0xFC, 0x0E, 0x20, 0x10]
        );
        assert_eq!(
            encoded(Instruction::TableInit {
                elem_index: 16,
                table_index: 32,
            }),
            [0xFC, 0x0C, 0x10, 0x20]
        );
        assert_eq!(encoded(Instruction::ElemDrop(32)), [0xFC, 0x0D, 0x20]);
    }

    #[test]
    fn select_forms() {
        assert_eq!(encoded(Instruction::Select(None)), [0x1B]);
        assert_eq!(
            encoded(Instruction::Select(Some(ValType::F64))),
            [0x1C, 0x01, 0x7C]
        );
    }

    #[test]
    fn integer_constants() {
        assert_eq!(encoded(ConstInstr::I32Const(127)), [0x41, 0xFF, 0x00]);
        assert_eq!(encoded(ConstInstr::I32Const(-1)), [0x41, 0x7F]);
        assert_eq!(
            encoded(ConstInstr::I64Const(i64::from(u32::MAX))),
            [0x42, 0xFF, 0xFF, 0xFF, 0xFF, 0x0F]
        );
    }

    #[test]
    fn float_constants_preserve_bits() {
        assert_eq!(
            encoded(ConstInstr::F32Const(5.5)),
            [0x43, 0x00, 0x00, 0xB0, 0x40]
        );
        assert_eq!(
            encoded(ConstInstr::F32Const(f32::NAN)),
            [0x43, 0x00, 0x00, 0xC0, 0x7F]
        );
        assert_eq!(
            encoded(ConstInstr::F64Const(3.14)),
            [0x44, 0x1F, 0x85, 0xEB, 0x51, 0xB8, 0x1E, 0x09, 0x40]
        );
        // A NaN with a nonstandard payload must round-trip bit-for-bit.
        let weird = f64::from_bits(0x7FF8_0000_DEAD_BEEF);
        let bytes = encoded(ConstInstr::F64Const(weird));
        assert_eq!(bytes[0], 0x44);
        assert_eq!(f64::from_le_bytes(bytes[1..].try_into().unwrap()).to_bits(), weird.to_bits());
    }

    #[test]
    fn reference_instructions() {
        assert_eq!(
            encoded(Instruction::RefNull(HeapType::Func)),
            [0xD0, 0x70]
        );
        assert_eq!(encoded(Instruction::RefIsNull), [0xD1]);
        assert_eq!(encoded(Instruction::RefFunc(5)), [0xD2, 0x05]);
        assert_eq!(encoded(Instruction::RefAsNonNull), [0xD3]);
    }

    #[test]
    fn trunc_sat_is_prefixed() {
        assert_eq!(encoded(Instruction::I32TruncSatF32S), [0xFC, 0x00]);
        assert_eq!(encoded(Instruction::I64TruncSatF64U), [0xFC, 0x07]);
    }

    #[test]
    fn const_expr_terminates_itself() {
        assert_eq!(encoded(ConstExpr::empty()), [0x0B]);
        assert_eq!(encoded(ConstExpr::i32_const(42)), [0x41, 0x2A, 0x0B]);
        assert_eq!(
            encoded(ConstExpr::ref_null(HeapType::Func)),
            [0xD0, 0x70, 0x0B]
        );
        assert_eq!(encoded(ConstExpr::global_get(0)), [0x23, 0x00, 0x0B]);
    }

    #[test]
    fn const_instrs_lift_into_instructions() {
        let lifted: Instruction = ConstInstr::I32Const(7).into();
        assert_eq!(encoded(lifted), encoded(ConstInstr::I32Const(7)));
    }
}
