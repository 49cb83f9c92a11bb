//! Tensor types: component datatypes, dimensions and shapes.

use serde::{Deserialize, Serialize};

/// Kind of a scalar component, used for datatype promotion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DatatypeKind {
    Bool,
    UInt,
    Int,
    Float,
    Complex,
}

/// Component datatype of a tensor or literal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Datatype {
    Bool,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    /// Complex number made of two `Float32` components
    Complex64,
    /// Complex number made of two `Float64` components
    Complex128,
}

impl Datatype {
    pub fn kind(&self) -> DatatypeKind {
        match self {
            Datatype::Bool => DatatypeKind::Bool,
            Datatype::UInt8 | Datatype::UInt16 | Datatype::UInt32 | Datatype::UInt64 => {
                DatatypeKind::UInt
            }
            Datatype::Int8 | Datatype::Int16 | Datatype::Int32 | Datatype::Int64 => {
                DatatypeKind::Int
            }
            Datatype::Float32 | Datatype::Float64 => DatatypeKind::Float,
            Datatype::Complex64 | Datatype::Complex128 => DatatypeKind::Complex,
        }
    }

    /// Number of bits used to store one component.
    pub fn num_bits(&self) -> usize {
        match self {
            Datatype::Bool | Datatype::UInt8 | Datatype::Int8 => 8,
            Datatype::UInt16 | Datatype::Int16 => 16,
            Datatype::UInt32 | Datatype::Int32 | Datatype::Float32 => 32,
            Datatype::UInt64 | Datatype::Int64 | Datatype::Float64 | Datatype::Complex64 => 64,
            Datatype::Complex128 => 128,
        }
    }

    pub fn is_complex(&self) -> bool {
        self.kind() == DatatypeKind::Complex
    }

    pub fn is_float(&self) -> bool {
        self.kind() == DatatypeKind::Float
    }

    /// Smallest datatype of `kind` that stores at least `bits` bits.
    fn of_kind(kind: DatatypeKind, bits: usize) -> Datatype {
        match kind {
            DatatypeKind::Bool => Datatype::Bool,
            DatatypeKind::UInt => match bits {
                0..=8 => Datatype::UInt8,
                9..=16 => Datatype::UInt16,
                17..=32 => Datatype::UInt32,
                _ => Datatype::UInt64,
            },
            DatatypeKind::Int => match bits {
                0..=8 => Datatype::Int8,
                9..=16 => Datatype::Int16,
                17..=32 => Datatype::Int32,
                _ => Datatype::Int64,
            },
            DatatypeKind::Float => {
                if bits <= 32 {
                    Datatype::Float32
                } else {
                    Datatype::Float64
                }
            }
            DatatypeKind::Complex => {
                if bits <= 64 {
                    Datatype::Complex64
                } else {
                    Datatype::Complex128
                }
            }
        }
    }

    /// Promote two datatypes to one that can represent both.
    ///
    /// The more general kind wins (`Bool < UInt < Int < Float < Complex`) and
    /// the result is wide enough for both operands. A float promoted to a
    /// complex keeps its precision per component.
    pub fn max(a: Datatype, b: Datatype) -> Datatype {
        if a == b {
            return a;
        }
        let kind = a.kind().max(b.kind());
        let component_bits = |t: Datatype| {
            if kind == DatatypeKind::Complex && !t.is_complex() {
                t.num_bits() * 2
            } else {
                t.num_bits()
            }
        };
        Datatype::of_kind(kind, component_bits(a).max(component_bits(b)))
    }
}

/// Size of one tensor mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Dimension {
    /// Size only known at runtime
    #[default]
    Variable,
    /// Size fixed at compile time
    Fixed(usize),
}

impl Dimension {
    pub fn fixed(size: usize) -> Self {
        Dimension::Fixed(size)
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self, Dimension::Fixed(_))
    }

    pub fn size(&self) -> Option<usize> {
        match self {
            Dimension::Fixed(size) => Some(*size),
            Dimension::Variable => None,
        }
    }

    /// Two dimensions are compatible unless both are fixed to different sizes.
    pub fn is_compatible_with(&self, other: &Dimension) -> bool {
        match (self, other) {
            (Dimension::Fixed(a), Dimension::Fixed(b)) => a == b,
            _ => true,
        }
    }
}

/// Type of a tensor: component datatype and the dimension of every mode.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Type {
    pub datatype: Datatype,
    pub shape: Vec<Dimension>,
}

impl Type {
    pub fn new(datatype: Datatype, shape: Vec<Dimension>) -> Self {
        Type { datatype, shape }
    }

    /// Order-0 type.
    pub fn scalar(datatype: Datatype) -> Self {
        Type {
            datatype,
            shape: Vec::new(),
        }
    }

    /// Type with every mode fixed to the given sizes.
    pub fn fixed(datatype: Datatype, sizes: &[usize]) -> Self {
        Type {
            datatype,
            shape: sizes.iter().copied().map(Dimension::Fixed).collect(),
        }
    }

    pub fn order(&self) -> usize {
        self.shape.len()
    }

    pub fn dimension(&self, mode: usize) -> Option<Dimension> {
        self.shape.get(mode).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datatype_promotion() {
        assert_eq!(Datatype::max(Datatype::Int32, Datatype::Int64), Datatype::Int64);
        assert_eq!(Datatype::max(Datatype::UInt8, Datatype::Int16), Datatype::Int16);
        assert_eq!(
            Datatype::max(Datatype::Int64, Datatype::Float32),
            Datatype::Float64
        );
        assert_eq!(
            Datatype::max(Datatype::Float32, Datatype::Complex64),
            Datatype::Complex64
        );
        assert_eq!(
            Datatype::max(Datatype::Float64, Datatype::Complex64),
            Datatype::Complex128
        );
        assert_eq!(Datatype::max(Datatype::Bool, Datatype::Bool), Datatype::Bool);
    }

    #[test]
    fn test_dimension_compatibility() {
        let three = Dimension::fixed(3);
        assert!(three.is_compatible_with(&Dimension::Fixed(3)));
        assert!(!three.is_compatible_with(&Dimension::Fixed(4)));
        assert!(three.is_compatible_with(&Dimension::Variable));
        assert_eq!(three.size(), Some(3));
        assert_eq!(Dimension::Variable.size(), None);
    }

    #[test]
    fn test_type_order() {
        let ty = Type::fixed(Datatype::Float64, &[3, 4]);
        assert_eq!(ty.order(), 2);
        assert_eq!(ty.dimension(1), Some(Dimension::Fixed(4)));
        assert_eq!(ty.dimension(2), None);
        assert_eq!(Type::scalar(Datatype::Int32).order(), 0);
    }
}
