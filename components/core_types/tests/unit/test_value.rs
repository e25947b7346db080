//! Unit tests for Operand, ValueType and Precision

use core_types::{Operand, Precision, ValueType, Vec2};

#[cfg(test)]
mod operand_type_tests {
    use super::*;

    #[test]
    fn test_operand_int_type() {
        assert_eq!(Operand::Int(-3).value_type(), ValueType::Int);
    }

    #[test]
    fn test_operand_string_type() {
        assert_eq!(Operand::from("hi").value_type(), ValueType::String);
    }

    #[test]
    fn test_operand_void_type() {
        assert_eq!(Operand::Void.value_type(), ValueType::Void);
    }

    #[test]
    fn test_is_vector_only_for_vec2() {
        assert!(Operand::Vec2(Vec2::new(1.0, 1.0)).is_vector());
        assert!(!Operand::Double(1.0).is_vector());
        assert!(!Operand::Str("[1, 1]".to_string()).is_vector());
    }

    #[test]
    fn test_numeric_accessors() {
        assert_eq!(Operand::Int(4).as_number(), Some(4.0));
        assert_eq!(Operand::Int(4).as_float(), None);
        assert_eq!(Operand::Float(0.5).as_float(), Some(0.5));
        assert_eq!(Operand::Bool(true).as_number(), None);
    }
}

#[cfg(test)]
mod precision_tests {
    use super::*;

    #[test]
    fn test_precision_from_flag() {
        assert_eq!(Precision::from_use_double(true), Precision::Double);
        assert_eq!(Precision::from_use_double(false), Precision::Single);
        assert_eq!(Precision::default(), Precision::Single);
    }

    #[test]
    fn test_float_constructor_respects_precision() {
        assert_eq!(Operand::float(0.25, Precision::Single), Operand::Float(0.25));
        assert_eq!(Operand::float(0.25, Precision::Double), Operand::Double(0.25));
    }

    #[test]
    fn test_int_widens_on_coerce() {
        assert_eq!(
            Operand::Int(3).coerce_to(ValueType::Float, Precision::Single),
            Some(Operand::Float(3.0))
        );
    }

    #[test]
    fn test_float_never_narrows_to_int() {
        assert_eq!(Operand::Float(3.0).coerce_to(ValueType::Int, Precision::Single), None);
    }
}

#[cfg(test)]
mod vec2_tests {
    use super::*;

    #[test]
    fn test_magnitude() {
        assert_eq!(Vec2::new(3.0, 4.0).magnitude(), 5.0);
    }

    #[test]
    fn test_dot() {
        assert_eq!(Vec2::new(1.0, 2.0).dot(&Vec2::new(3.0, 4.0)), 11.0);
    }

    #[test]
    fn test_angle_of_unit_y() {
        let angle = Vec2::new(0.0, 1.0).angle();
        assert!((angle - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }
}

#[cfg(test)]
mod serde_tests {
    use super::*;

    #[test]
    fn test_operand_json() {
        let json = serde_json::to_string(&Operand::Int(5)).unwrap();
        assert_eq!(json, r#"{"Int":5}"#);
        let back: Operand = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Operand::Int(5));
    }

    #[test]
    fn test_vec2_json() {
        let json = serde_json::to_string(&Operand::Vec2(Vec2::new(1.0, 2.0))).unwrap();
        assert_eq!(json, r#"{"Vec2":{"x":1.0,"y":2.0}}"#);
    }
}
