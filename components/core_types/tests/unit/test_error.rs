//! Unit tests for the error taxonomy

use core_types::{
    CompileError, LexError, LinkError, NativeError, RuntimeFault, ScriptInvocationError,
    SourcePosition, ValueType, VarStoreError,
};
use std::error::Error;

#[cfg(test)]
mod compile_error_tests {
    use super::*;

    #[test]
    fn test_lex_error_converts() {
        let lex = LexError::UnterminatedString {
            position: SourcePosition::new(1, 9, 8),
        };
        let err: CompileError = lex.clone().into();
        assert_eq!(err, CompileError::Lex(lex));
        assert_eq!(err.position().map(|p| p.offset), Some(8));
    }

    #[test]
    fn test_type_mismatch_message() {
        let err = CompileError::type_mismatch(ValueType::Int, ValueType::String, SourcePosition::new(3, 2, 40));
        assert_eq!(
            err.to_string(),
            "type mismatch at 3:2 (offset 40): expected int, found string"
        );
    }

    #[test]
    fn test_unresolved_symbol_names_symbol() {
        let err = CompileError::Link(LinkError::UnresolvedSymbol {
            name: "drawSprite".to_string(),
            position: SourcePosition::new(1, 20, 19),
        });
        let text = err.to_string();
        assert!(text.contains("drawSprite"));
        assert!(text.contains("offset 19"));
    }

    #[test]
    fn test_duplicate_native_has_no_position() {
        let err = CompileError::Link(LinkError::DuplicateNative {
            signature: "print(int)".to_string(),
        });
        assert_eq!(err.position(), None);
    }
}

#[cfg(test)]
mod runtime_error_tests {
    use super::*;

    #[test]
    fn test_invocation_error_exposes_cause() {
        let err = ScriptInvocationError::new(
            "Tick",
            3,
            RuntimeFault::VarStore(VarStoreError::Missing {
                name: "tick".to_string(),
            }),
        );
        assert!(err.source().is_some());
        assert!(err.to_string().contains("no variable named 'tick'"));
    }

    #[test]
    fn test_native_fault_chain() {
        let fault = RuntimeFault::Native {
            name: "strToInt".to_string(),
            source: NativeError::InvalidArgument("'abc' is not an int".to_string()),
        };
        assert!(fault.source().is_some());
        assert!(fault.to_string().starts_with("native 'strToInt' failed"));
    }

    #[test]
    fn test_var_store_type_mismatch_message() {
        let err = VarStoreError::TypeMismatch {
            name: "k".to_string(),
            expected: ValueType::Float,
            found: ValueType::Int,
        };
        assert_eq!(err.to_string(), "variable 'k' holds int, not float");
    }
}
