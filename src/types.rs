//! Canonical scalar kinds and the C spelling table
//!
//! The generator only ever reasons about a closed set of primitive kinds.
//! [`PrimitiveType::from_spelling`] is the single translation boundary from
//! raw C type text to a kind; everything downstream (format specifier,
//! parse-function name, canonical C name) dispatches on the enum.
//!
//! A member whose spelling is not in this table is not reflectable and is
//! silently omitted from the generated registrations.

/// Canonical scalar kinds the runtime macro layer can reflect.
///
/// `Byte` is the 8-bit kind used for `bool`; it prints and parses as an
/// unsigned byte but is kept distinct so the table stays a faithful closed
/// enumeration of the runtime's supported kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    Byte,
}

impl PrimitiveType {
    /// Look up a raw C type spelling (as it appears in normalized member
    /// text, e.g. `"unsigned long long int"`). Returns `None` for anything
    /// the runtime cannot reflect: pointers, app-defined types, `char` with
    /// qualifiers we don't model, and so on.
    pub fn from_spelling(spelling: &str) -> Option<Self> {
        use PrimitiveType::*;

        let kind = match spelling {
            "bool" => Byte,

            "int8_t" | "char" | "signed char" => I8,
            "uint8_t" | "unsigned char" => U8,

            "int16_t" | "short" | "short int" | "signed short" | "signed short int" => I16,
            "uint16_t" | "unsigned short" | "unsigned short int" => U16,

            "int32_t" | "int" | "signed" | "signed int" => I32,
            "uint32_t" | "unsigned" | "unsigned int" => U32,

            "int64_t" | "long" | "long int" | "signed long" | "signed long int" | "long long"
            | "long long int" | "signed long long" | "signed long long int" => I64,
            "uint64_t" | "unsigned long" | "unsigned long int" | "unsigned long long"
            | "unsigned long long int" => U64,

            "float" => F32,
            "double" => F64,

            _ => return None,
        };

        Some(kind)
    }

    /// Canonical C spelling emitted into the generated macro call. This is
    /// the type the runtime macro declares its scratch variable with, so it
    /// must be a valid C type name.
    pub fn c_name(self) -> &'static str {
        use PrimitiveType::*;
        match self {
            I8 => "int8_t",
            U8 => "uint8_t",
            I16 => "int16_t",
            U16 => "uint16_t",
            I32 => "int32_t",
            U32 => "uint32_t",
            I64 => "int64_t",
            U64 => "uint64_t",
            F32 => "float",
            F64 => "double",
            Byte => "uint8_t",
        }
    }

    /// printf format specifier used by the generated print lambda.
    pub fn display_format(self) -> &'static str {
        use PrimitiveType::*;
        match self {
            I8 | I16 | I32 => "%d",
            U8 | U16 | U32 | Byte => "%u",
            I64 => "%lld",
            U64 => "%llu",
            F32 => "%f",
            F64 => "%lf",
        }
    }

    /// Name of the string-to-number wrapper the generated set lambda calls.
    /// Never executed by this tool; it only has to match the runtime's
    /// jstrings helpers.
    pub fn parse_function(self) -> &'static str {
        use PrimitiveType::*;
        match self {
            I8 | I16 | I32 | I64 => "stol",
            U8 | U16 | U32 | U64 | Byte => "stoul_0x",
            F32 | F64 => "stod",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_width_spellings() {
        assert_eq!(PrimitiveType::from_spelling("uint32_t"), Some(PrimitiveType::U32));
        assert_eq!(PrimitiveType::from_spelling("int64_t"), Some(PrimitiveType::I64));
    }

    #[test]
    fn test_multi_word_spellings() {
        assert_eq!(
            PrimitiveType::from_spelling("unsigned long long int"),
            Some(PrimitiveType::U64)
        );
        assert_eq!(
            PrimitiveType::from_spelling("signed short int"),
            Some(PrimitiveType::I16)
        );
    }

    #[test]
    fn test_bool_is_byte_kind() {
        assert_eq!(PrimitiveType::from_spelling("bool"), Some(PrimitiveType::Byte));
        assert_eq!(PrimitiveType::Byte.c_name(), "uint8_t");
    }

    #[test]
    fn test_unreflectable_spellings() {
        assert_eq!(PrimitiveType::from_spelling("const char *"), None);
        assert_eq!(PrimitiveType::from_spelling("std::string"), None);
        assert_eq!(PrimitiveType::from_spelling("struct Foo"), None);
    }

    #[test]
    fn test_output_tags() {
        assert_eq!(PrimitiveType::I64.display_format(), "%lld");
        assert_eq!(PrimitiveType::U32.parse_function(), "stoul_0x");
        assert_eq!(PrimitiveType::F64.parse_function(), "stod");
    }
}
