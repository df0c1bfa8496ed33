//! Semantic types.
//!
//! Types are plain values: compared structurally, cloned deeply and never
//! shared between nodes. Unit is the empty tuple.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Str,
    Tuple(Vec<Type>),
    Function(FunctionType),
    /// Type of expressions that never produce a value (`return`).
    Never,
    /// Sentinel for expressions whose type could not be determined.
    /// Never equal to anything, itself included.
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionType {
    pub params: Vec<Type>,
    pub ret: Box<Type>,
}

impl FunctionType {
    pub fn new(params: Vec<Type>, ret: Type) -> Self {
        FunctionType {
            params,
            ret: Box::new(ret),
        }
    }
}

impl Type {
    pub fn unit() -> Type {
        Type::Tuple(Vec::new())
    }

    /// Primitive type names usable in type position.
    pub fn from_name(name: &str) -> Option<Type> {
        Some(match name {
            "bool" => Type::Bool,
            "i8" => Type::I8,
            "i16" => Type::I16,
            "i32" => Type::I32,
            "i64" => Type::I64,
            "u8" => Type::U8,
            "u16" => Type::U16,
            "u32" => Type::U32,
            "u64" => Type::U64,
            "f32" => Type::F32,
            "f64" => Type::F64,
            "str" => Type::Str,
            _ => return None,
        })
    }

    pub fn is_unit(&self) -> bool {
        matches!(self, Type::Tuple(elems) if elems.is_empty())
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Type::I8
                | Type::I16
                | Type::I32
                | Type::I64
                | Type::U8
                | Type::U16
                | Type::U32
                | Type::U64
        )
    }

    pub fn is_signed(&self) -> bool {
        matches!(self, Type::I8 | Type::I16 | Type::I32 | Type::I64)
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Type::F32 | Type::F64)
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float()
    }

    pub fn contains_unknown(&self) -> bool {
        match self {
            Type::Unknown => true,
            Type::Tuple(elems) => elems.iter().any(Type::contains_unknown),
            Type::Function(func) => {
                func.params.iter().any(Type::contains_unknown) || func.ret.contains_unknown()
            }
            _ => false,
        }
    }
}

/// Structural type equality.
///
/// Function types compare parameter lists only; the return type is not
/// part of the comparison. `Unknown` is unequal to every type.
pub fn type_equals(lhs: &Type, rhs: &Type) -> bool {
    match (lhs, rhs) {
        (Type::Unknown, _) | (_, Type::Unknown) => false,
        (Type::Tuple(l), Type::Tuple(r)) => {
            l.len() == r.len() && l.iter().zip(r).all(|(l, r)| type_equals(l, r))
        }
        (Type::Function(l), Type::Function(r)) => {
            l.params.len() == r.params.len()
                && l.params.iter().zip(&r.params).all(|(l, r)| type_equals(l, r))
        }
        (Type::Tuple(_), _) | (Type::Function(_), _) => false,
        _ => std::mem::discriminant(lhs) == std::mem::discriminant(rhs),
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Bool => f.write_str("bool"),
            Type::I8 => f.write_str("i8"),
            Type::I16 => f.write_str("i16"),
            Type::I32 => f.write_str("i32"),
            Type::I64 => f.write_str("i64"),
            Type::U8 => f.write_str("u8"),
            Type::U16 => f.write_str("u16"),
            Type::U32 => f.write_str("u32"),
            Type::U64 => f.write_str("u64"),
            Type::F32 => f.write_str("f32"),
            Type::F64 => f.write_str("f64"),
            Type::Str => f.write_str("str"),
            Type::Tuple(elems) => {
                f.write_str("(")?;
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{elem}")?;
                }
                if elems.len() == 1 {
                    f.write_str(",")?;
                }
                f.write_str(")")
            }
            Type::Function(func) => write!(f, "{func}"),
            Type::Never => f.write_str("!"),
            Type::Unknown => f.write_str("{unknown}"),
        }
    }
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("fn(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{param}")?;
        }
        f.write_str(")")?;
        if !self.ret.is_unit() {
            write!(f, " -> {}", self.ret)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_compare_by_tag() {
        assert!(type_equals(&Type::I32, &Type::I32));
        assert!(!type_equals(&Type::I32, &Type::I64));
        assert!(!type_equals(&Type::I32, &Type::U32));
        assert!(type_equals(&Type::unit(), &Type::Tuple(vec![])));
        assert!(!type_equals(&Type::unit(), &Type::Never));
    }

    #[test]
    fn unknown_is_never_equal() {
        assert!(!type_equals(&Type::Unknown, &Type::Unknown));
        assert!(!type_equals(&Type::Unknown, &Type::I32));
        let tuple = Type::Tuple(vec![Type::I32, Type::Unknown]);
        assert!(!type_equals(&tuple, &tuple.clone()));
        assert!(tuple.contains_unknown());
    }

    #[test]
    fn function_types_ignore_return_type() {
        let a = Type::Function(FunctionType::new(vec![Type::I32], Type::Bool));
        let b = Type::Function(FunctionType::new(vec![Type::I32], Type::F64));
        let c = Type::Function(FunctionType::new(vec![Type::I64], Type::Bool));
        assert!(type_equals(&a, &b));
        assert!(!type_equals(&a, &c));
    }

    #[test]
    fn clones_are_equal_and_independent() {
        let original = Type::Function(FunctionType::new(
            vec![Type::Tuple(vec![Type::I8, Type::F32])],
            Type::U64,
        ));
        let mut copy = original.clone();
        assert!(type_equals(&original, &copy));
        assert_eq!(original, copy);

        if let Type::Function(func) = &mut copy {
            func.params[0] = Type::Bool;
            *func.ret = Type::Str;
        }
        assert!(!type_equals(&original, &copy));
        assert_eq!(original.to_string(), "fn((i8, f32)) -> u64");
    }

    #[test]
    fn renders_like_rust() {
        assert_eq!(Type::unit().to_string(), "()");
        assert_eq!(Type::Never.to_string(), "!");
        assert_eq!(Type::Tuple(vec![Type::I32]).to_string(), "(i32,)");
        assert_eq!(
            Type::Function(FunctionType::new(vec![Type::I32, Type::Bool], Type::unit()))
                .to_string(),
            "fn(i32, bool)"
        );
        assert_eq!(Type::from_name("u16"), Some(Type::U16));
        assert_eq!(Type::from_name("String"), None);
    }
}
