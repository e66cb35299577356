//! Primitive parameter kinds and the typed values coerced into them

use std::fmt;

/// Primitive kinds a command parameter may declare
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// `bool`
    Bool,
    /// `i8`
    I8,
    /// `i16`
    I16,
    /// `i32`
    I32,
    /// `i64`
    I64,
    /// `u8`
    U8,
    /// `u16`
    U16,
    /// `u32`
    U32,
    /// `u64`
    U64,
    /// `f32`
    F32,
    /// `f64`
    F64,
    /// `char`
    Char,
    /// `String`
    String,
}

impl ParamKind {
    /// Every supported kind
    pub const ALL: [ParamKind; 13] = [
        Self::Bool,
        Self::I8,
        Self::I16,
        Self::I32,
        Self::I64,
        Self::U8,
        Self::U16,
        Self::U32,
        Self::U64,
        Self::F32,
        Self::F64,
        Self::Char,
        Self::String,
    ];

    /// Resolve a declared type name.
    ///
    /// Accepts Rust primitive names and the short host names shown in
    /// parameter hints. Returns `None` for anything else.
    pub fn from_type_name(name: &str) -> Option<Self> {
        let kind = match name.trim() {
            "bool" => Self::Bool,
            "i8" | "sbyte" => Self::I8,
            "i16" | "short" => Self::I16,
            "i32" | "int" => Self::I32,
            "i64" | "long" => Self::I64,
            "u8" | "byte" => Self::U8,
            "u16" | "ushort" => Self::U16,
            "u32" | "uint" => Self::U32,
            "u64" | "ulong" => Self::U64,
            "f32" | "float" => Self::F32,
            "f64" | "double" => Self::F64,
            "char" => Self::Char,
            "String" | "string" | "str" | "&str" => Self::String,
            _ => return None,
        };
        Some(kind)
    }

    /// Rust type name used when declaring this kind
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Char => "char",
            Self::String => "String",
        }
    }

    /// Short name for parameter hints
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "sbyte",
            Self::I16 => "short",
            Self::I32 => "int",
            Self::I64 => "long",
            Self::U8 => "byte",
            Self::U16 => "ushort",
            Self::U32 => "uint",
            Self::U64 => "ulong",
            Self::F32 => "float",
            Self::F64 => "double",
            Self::Char => "char",
            Self::String => "string",
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// A coerced argument value
#[derive(Clone, Debug, PartialEq)]
pub enum ArgValue {
    /// Boolean
    Bool(bool),
    /// 8-bit signed
    I8(i8),
    /// 16-bit signed
    I16(i16),
    /// 32-bit signed
    I32(i32),
    /// 64-bit signed
    I64(i64),
    /// 8-bit unsigned
    U8(u8),
    /// 16-bit unsigned
    U16(u16),
    /// 32-bit unsigned
    U32(u32),
    /// 64-bit unsigned
    U64(u64),
    /// Single precision float
    F32(f32),
    /// Double precision float
    F64(f64),
    /// Character
    Char(char),
    /// String
    Str(String),
}

impl ArgValue {
    /// Kind of this value
    #[must_use]
    pub fn kind(&self) -> ParamKind {
        match self {
            Self::Bool(_) => ParamKind::Bool,
            Self::I8(_) => ParamKind::I8,
            Self::I16(_) => ParamKind::I16,
            Self::I32(_) => ParamKind::I32,
            Self::I64(_) => ParamKind::I64,
            Self::U8(_) => ParamKind::U8,
            Self::U16(_) => ParamKind::U16,
            Self::U32(_) => ParamKind::U32,
            Self::U64(_) => ParamKind::U64,
            Self::F32(_) => ParamKind::F32,
            Self::F64(_) => ParamKind::F64,
            Self::Char(_) => ParamKind::Char,
            Self::Str(_) => ParamKind::String,
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::I8(v) => write!(f, "{v}"),
            Self::I16(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}"),
            Self::I64(v) => write!(f, "{v}"),
            Self::U8(v) => write!(f, "{v}"),
            Self::U16(v) => write!(f, "{v}"),
            Self::U32(v) => write!(f, "{v}"),
            Self::U64(v) => write!(f, "{v}"),
            Self::F32(v) => write!(f, "{v}"),
            Self::F64(v) => write!(f, "{v}"),
            Self::Char(v) => write!(f, "{v}"),
            Self::Str(v) => f.write_str(v),
        }
    }
}
