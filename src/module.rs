//! The module model: an in-memory description of a complete WebAssembly
//! module, assembled field by field and handed to the encoder as an
//! immutable snapshot.

use crate::{ConstExpr, GlobalType, Instruction, Limits, RefType, TableType, ValType};

/// An in-memory WebAssembly module.
///
/// Fields are plain `Vec`s in definition order; the index space of each kind
/// is the order of its vector (imports of that kind come first, as usual).
/// The model performs no semantic validation: indices are not checked
/// against the spaces they name, and nothing orders your type section for
/// you. What the encoder guarantees is a structurally well-formed binary:
/// correct magic, version, section order, and framing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Module {
    /// Function signatures referenced by index elsewhere in the module.
    pub types: Vec<crate::FuncType>,
    /// Imported functions, tables, memories, and globals.
    pub imports: Vec<Import>,
    /// Functions defined in this module.
    pub funcs: Vec<Func>,
    /// Tables defined in this module.
    pub tables: Vec<Table>,
    /// Memories defined in this module, each described by its limits.
    pub memories: Vec<Limits>,
    /// Globals defined in this module.
    pub globals: Vec<Global>,
    /// Exported items.
    pub exports: Vec<Export>,
    /// The start function, if any, by function index.
    pub start: Option<u32>,
    /// Element segments.
    pub elems: Vec<Elem>,
    /// Data segments.
    pub datas: Vec<Data>,
}

impl Module {
    /// An empty module. Encodes to exactly the 8-byte header.
    pub fn new() -> Module {
        Module::default()
    }
}

/// A function defined in the module: its signature, extra locals, and body.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Func {
    /// Index into [`Module::types`] of this function's signature.
    pub type_index: u32,
    /// Local declarations beyond the parameters, in order. Adjacent runs of
    /// the same type are compressed by the encoder.
    pub locals: Vec<ValType>,
    /// The body. The trailing `end` is written by the encoder.
    pub body: Vec<Instruction>,
}

impl Func {
    /// A function with the given signature index and no locals or body.
    pub fn new(type_index: u32) -> Func {
        Func {
            type_index,
            ..Func::default()
        }
    }
}

/// A table defined in the module.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    /// The table's element type and size limits.
    pub ty: TableType,
    /// Optional initializer for every element. `None` selects the short
    /// declaration form; `Some` selects the explicit form carrying the
    /// initializer expression.
    pub init: Option<ConstExpr>,
}

impl Table {
    /// A table declared without an initializer.
    pub fn new(ty: TableType) -> Table {
        Table { ty, init: None }
    }

    /// A table whose elements all start as the result of `init`.
    pub fn with_init(ty: TableType, init: ConstExpr) -> Table {
        Table {
            ty,
            init: Some(init),
        }
    }
}

/// A global defined in the module.
#[derive(Clone, Debug, PartialEq)]
pub struct Global {
    /// The global's value type and mutability.
    pub ty: GlobalType,
    /// The initializer expression.
    pub init: ConstExpr,
}

/// An import: where it comes from and what kind of item it binds.
#[derive(Clone, Debug, PartialEq)]
pub struct Import {
    /// The module name to import from.
    pub module: String,
    /// The item name within that module.
    pub name: String,
    /// What is being imported.
    pub ty: EntityType,
}

impl Import {
    /// An import of `ty` named `module`.`name`.
    pub fn new(module: impl Into<String>, name: impl Into<String>, ty: EntityType) -> Import {
        Import {
            module: module.into(),
            name: name.into(),
            ty,
        }
    }
}

/// The type of an importable item.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EntityType {
    /// A function, by signature index.
    Function(u32),
    /// A table of the given type.
    Table(TableType),
    /// A memory with the given limits.
    Memory(Limits),
    /// A global of the given type.
    Global(GlobalType),
}

/// An export: a name bound to an item in one of the four index spaces.
#[derive(Clone, Debug, PartialEq)]
pub struct Export {
    /// The name the item is exported under.
    pub name: String,
    /// Which index space `index` refers to.
    pub kind: ExportKind,
    /// The index of the exported item.
    pub index: u32,
}

impl Export {
    /// An export of `kind` item `index` under `name`.
    pub fn new(name: impl Into<String>, kind: ExportKind, index: u32) -> Export {
        Export {
            name: name.into(),
            kind,
            index,
        }
    }
}

/// The index space an export refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExportKind {
    /// A function export.
    Func = 0,
    /// A table export.
    Table = 1,
    /// A memory export.
    Memory = 2,
    /// A global export.
    Global = 3,
}

/// An element segment: a mode plus its items.
#[derive(Clone, Debug, PartialEq)]
pub struct Elem {
    /// Whether and where the segment is applied at instantiation.
    pub kind: ElemKind,
    /// The segment's items.
    pub items: Elements,
}

/// The mode of an element segment.
#[derive(Clone, Debug, PartialEq)]
pub enum ElemKind {
    /// Available to `table.init` but not applied automatically.
    Passive,
    /// Never applied; only declares its items for `ref.func` purposes.
    Declarative,
    /// Copied into a table at instantiation. A `table` of `None` names
    /// table 0 implicitly, selecting the shorter active encodings.
    Active {
        /// The target table, or `None` for the implicit table 0 forms.
        table: Option<u32>,
        /// Where in the table the items land.
        offset: ConstExpr,
    },
}

/// The items of an element segment.
#[derive(Clone, Debug, PartialEq)]
pub enum Elements {
    /// Function indices, always of type `funcref`.
    Functions(Vec<u32>),
    /// Constant expressions, each evaluating to the given reference type.
    Expressions(RefType, Vec<ConstExpr>),
}

/// A data segment: a byte payload plus a mode.
#[derive(Clone, Debug, PartialEq)]
pub struct Data {
    /// The payload, copied verbatim into the binary.
    pub init: Vec<u8>,
    /// Whether and where the payload is applied at instantiation.
    pub mode: DataMode,
}

impl Data {
    /// An active segment writing `init` into memory `memory` at `offset`.
    pub fn active(memory: u32, offset: ConstExpr, init: impl Into<Vec<u8>>) -> Data {
        Data {
            init: init.into(),
            mode: DataMode::Active { memory, offset },
        }
    }

    /// A passive segment, available to `memory.init`.
    pub fn passive(init: impl Into<Vec<u8>>) -> Data {
        Data {
            init: init.into(),
            mode: DataMode::Passive,
        }
    }
}

/// The mode of a data segment.
#[derive(Clone, Debug, PartialEq)]
pub enum DataMode {
    /// Available to `memory.init` but not applied automatically.
    Passive,
    /// Copied into a memory at instantiation.
    Active {
        /// The target memory. Memory 0 uses the shorter indicator.
        memory: u32,
        /// Where in the memory the payload lands.
        offset: ConstExpr,
    },
}
