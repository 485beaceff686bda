//! Assembly of a [`Module`] into the binary container format.
//!
//! Section contents are built in scratch buffers first, because each
//! section's header carries its content length. Empty sections are omitted
//! entirely, so an empty module is exactly the 8-byte header.

use std::io;

use crate::{
    encode_name, encode_vec_len, leb128, Data, DataMode, Elem, ElemKind, Elements, Encode,
    EncodeError, EntityType, Export, Func, Global, Import, Module, Table, ValType,
};

/// The four magic bytes opening every binary module: `\0asm`.
const MAGIC: [u8; 4] = [0x00, 0x61, 0x73, 0x6D];

/// The binary format version, little-endian.
const VERSION: [u8; 4] = [0x01, 0x00, 0x00, 0x00];

/// Known section identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SectionId {
    /// A custom, uninterpreted section.
    Custom = 0,
    /// The function-signature declarations.
    Type = 1,
    /// Imported items.
    Import = 2,
    /// Signature indices of the module's own functions.
    Function = 3,
    /// Table declarations.
    Table = 4,
    /// Memory declarations.
    Memory = 5,
    /// Global declarations and initializers.
    Global = 6,
    /// Exported items.
    Export = 7,
    /// The start function.
    Start = 8,
    /// Element segments.
    Element = 9,
    /// Function bodies.
    Code = 10,
    /// Data segments.
    Data = 11,
    /// The count of data segments, preceding the code section.
    DataCount = 12,
}

impl Module {
    /// Encode this module into `sink` as a complete binary: header first,
    /// then every non-empty section in the order the format requires.
    pub fn encode(&self, sink: &mut impl io::Write) -> Result<(), EncodeError> {
        sink.write_all(&MAGIC)?;
        sink.write_all(&VERSION)?;

        write_section(sink, SectionId::Type, &items_section("types", &self.types)?)?;
        write_section(
            sink,
            SectionId::Import,
            &items_section("imports", &self.imports)?,
        )?;
        write_section(sink, SectionId::Function, &self.function_section()?)?;
        write_section(sink, SectionId::Table, &items_section("tables", &self.tables)?)?;
        write_section(
            sink,
            SectionId::Memory,
            &items_section("memories", &self.memories)?,
        )?;
        write_section(
            sink,
            SectionId::Global,
            &items_section("globals", &self.globals)?,
        )?;
        write_section(
            sink,
            SectionId::Export,
            &items_section("exports", &self.exports)?,
        )?;
        if let Some(start) = self.start {
            let mut content = Vec::new();
            leb128::write_u32(&mut content, start);
            write_section(sink, SectionId::Start, &content)?;
        }
        write_section(
            sink,
            SectionId::Element,
            &items_section("element segments", &self.elems)?,
        )?;
        if !self.datas.is_empty() {
            let mut content = Vec::new();
            encode_vec_len(&mut content, "data segments", self.datas.len())?;
            write_section(sink, SectionId::DataCount, &content)?;
        }
        write_section(sink, SectionId::Code, &items_section("functions", &self.funcs)?)?;
        write_section(
            sink,
            SectionId::Data,
            &items_section("data segments", &self.datas)?,
        )?;
        Ok(())
    }

    /// Encode this module into a fresh byte vector.
    pub fn to_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        let mut bytes = Vec::new();
        self.encode(&mut bytes)?;
        Ok(bytes)
    }

    fn function_section(&self) -> Result<Vec<u8>, EncodeError> {
        let mut content = Vec::new();
        if self.funcs.is_empty() {
            return Ok(content);
        }
        encode_vec_len(&mut content, "functions", self.funcs.len())?;
        for func in &self.funcs {
            leb128::write_u32(&mut content, func.type_index);
        }
        Ok(content)
    }
}

/// Write one section: id byte, content length, content. Empty content means
/// the section is skipped.
fn write_section(
    sink: &mut impl io::Write,
    id: SectionId,
    content: &[u8],
) -> Result<(), EncodeError> {
    if content.is_empty() {
        return Ok(());
    }
    let mut header = vec![id as u8];
    let len = u32::try_from(content.len()).map_err(|_| EncodeError::CountOverflow {
        what: "section content",
        len: content.len(),
    })?;
    leb128::write_u32(&mut header, len);
    sink.write_all(&header)?;
    sink.write_all(content)?;
    Ok(())
}

/// Build a section content buffer: item count then each item in turn.
/// Returns an empty buffer for an empty item list, per the omission rule.
fn items_section<T: Encode>(what: &'static str, items: &[T]) -> Result<Vec<u8>, EncodeError> {
    let mut content = Vec::new();
    if items.is_empty() {
        return Ok(content);
    }
    encode_vec_len(&mut content, what, items.len())?;
    for item in items {
        item.encode(&mut content)?;
    }
    Ok(content)
}

impl Encode for Import {
    fn encode(&self, sink: &mut Vec<u8>) -> Result<(), EncodeError> {
        encode_name(sink, &self.module)?;
        encode_name(sink, &self.name)?;
        match self.ty {
            EntityType::Function(type_index) => {
                sink.push(0x00);
                leb128::write_u32(sink, type_index);
            }
            EntityType::Table(ty) => {
                sink.push(0x01);
                ty.encode(sink)?;
            }
            EntityType::Memory(limits) => {
                sink.push(0x02);
                limits.encode(sink)?;
            }
            EntityType::Global(ty) => {
                sink.push(0x03);
                ty.encode(sink)?;
            }
        }
        Ok(())
    }
}

impl Encode for Table {
    fn encode(&self, sink: &mut Vec<u8>) -> Result<(), EncodeError> {
        match &self.init {
            // Short declaration form: just the table type.
            None => self.ty.encode(sink),
            // Explicit form: marker bytes, table type, initializer.
            Some(init) => {
                sink.push(0x40);
                sink.push(0x00);
                self.ty.encode(sink)?;
                init.encode(sink)
            }
        }
    }
}

impl Encode for Global {
    fn encode(&self, sink: &mut Vec<u8>) -> Result<(), EncodeError> {
        self.ty.encode(sink)?;
        self.init.encode(sink)
    }
}

impl Encode for Export {
    fn encode(&self, sink: &mut Vec<u8>) -> Result<(), EncodeError> {
        encode_name(sink, &self.name)?;
        sink.push(self.kind as u8);
        leb128::write_u32(sink, self.index);
        Ok(())
    }
}

impl Encode for Elem {
    fn encode(&self, sink: &mut Vec<u8>) -> Result<(), EncodeError> {
        // Flags bitfield: bit 0 marks a non-implicitly-active segment, bit 1
        // distinguishes declarative (or an explicit table index) from
        // passive, bit 2 selects expression items over function indices.
        let base: u32 = match self.kind {
            ElemKind::Active { table: None, .. } => 0,
            ElemKind::Passive => 1,
            ElemKind::Active { table: Some(_), .. } => 2,
            ElemKind::Declarative => 3,
        };
        let flags = match self.items {
            Elements::Functions(_) => base,
            Elements::Expressions(..) => base | 0b100,
        };
        leb128::write_u32(sink, flags);

        if let ElemKind::Active { table, ref offset } = self.kind {
            if let Some(table) = table {
                leb128::write_u32(sink, table);
            }
            offset.encode(sink)?;
        }
        match &self.items {
            Elements::Functions(funcs) => {
                // Forms other than the implicitly-active one carry an
                // elemkind byte; 0x00 is the only defined kind.
                if base != 0 {
                    sink.push(0x00);
                }
                encode_vec_len(sink, "element functions", funcs.len())?;
                for &func in funcs {
                    leb128::write_u32(sink, func);
                }
            }
            Elements::Expressions(ty, exprs) => {
                if base != 0 {
                    ty.encode(sink)?;
                }
                encode_vec_len(sink, "element expressions", exprs.len())?;
                for expr in exprs {
                    expr.encode(sink)?;
                }
            }
        }
        Ok(())
    }
}

impl Encode for Func {
    fn encode(&self, sink: &mut Vec<u8>) -> Result<(), EncodeError> {
        // Body framing requires the byte length up front, so build the
        // entry in a scratch buffer.
        let mut body = Vec::new();

        // A run is never longer than the whole local list, so this one
        // range check keeps every group count in range.
        crate::check_count("locals", self.locals.len())?;
        let mut groups: Vec<(u32, ValType)> = Vec::new();
        for &ty in &self.locals {
            match groups.last_mut() {
                Some((count, last)) if *last == ty => *count += 1,
                _ => groups.push((1, ty)),
            }
        }
        encode_vec_len(&mut body, "local groups", groups.len())?;
        for (count, ty) in groups {
            leb128::write_u32(&mut body, count);
            ty.encode(&mut body)?;
        }

        for instruction in &self.body {
            instruction.encode(&mut body)?;
        }
        body.push(0x0B);

        encode_vec_len(sink, "function body", body.len())?;
        sink.extend_from_slice(&body);
        Ok(())
    }
}

impl Encode for Data {
    fn encode(&self, sink: &mut Vec<u8>) -> Result<(), EncodeError> {
        match &self.mode {
            DataMode::Active { memory: 0, offset } => {
                sink.push(0x00);
                offset.encode(sink)?;
            }
            DataMode::Passive => sink.push(0x01),
            DataMode::Active { memory, offset } => {
                sink.push(0x02);
                leb128::write_u32(sink, *memory);
                offset.encode(sink)?;
            }
        }
        encode_vec_len(sink, "data bytes", self.init.len())?;
        sink.extend_from_slice(&self.init);
        Ok(())
    }
}
