use std::fmt;

/// Error codes for all declaration-time diagnostics.
///
/// Format: E#### where the first digit indicates the phase:
/// - E2xxx: Type declaration errors
/// - E3xxx: Pattern errors
/// - E9xxx: Internal errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Declaration Errors (E2xxx)
    /// Alternative name declared twice in one union
    E2001,
    /// Field name declared twice in one aggregate
    E2002,
    /// Constant declared twice in one enum
    E2003,
    /// Union declared without alternatives
    E2004,
    /// Fallback-to-empty policy names an undeclared alternative
    E2005,
    /// Empty alternative payload has no default value
    E2006,
    /// Extension selector bound to more than one discriminator
    E2007,
    /// Type declared but never defined
    E2008,
    /// Type name declared twice
    E2009,
    /// Extension piece label declared twice
    E2010,
    /// Extension discriminator declared twice
    E2011,

    // Pattern Errors (E3xxx)
    /// Alternative selector not declared on the subject type
    E3001,
    /// Field not present on the aggregate
    E3002,
    /// Sequence pattern arity mismatch
    E3003,
    /// Literal pattern type mismatch
    E3004,
    /// Null or dereference pattern on a non-pointer type
    E3005,
    /// Alternative pattern on a type without alternatives
    E3006,
    /// Aggregate pattern on a non-aggregate type
    E3007,
    /// Aggregate pattern on a type with non-public fields
    E3008,
    /// Identifier bound more than once in one pattern
    E3009,
    /// Field listed more than once in one field pattern
    E3010,
    /// Unknown enum constant in literal pattern
    E3011,
    /// Subject count does not match pattern count
    E3012,

    // Internal Errors (E9xxx)
    /// Reference to a type the registry does not know
    E9001,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            // Declaration
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            ErrorCode::E2008 => "E2008",
            ErrorCode::E2009 => "E2009",
            ErrorCode::E2010 => "E2010",
            ErrorCode::E2011 => "E2011",
            // Pattern
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3003 => "E3003",
            ErrorCode::E3004 => "E3004",
            ErrorCode::E3005 => "E3005",
            ErrorCode::E3006 => "E3006",
            ErrorCode::E3007 => "E3007",
            ErrorCode::E3008 => "E3008",
            ErrorCode::E3009 => "E3009",
            ErrorCode::E3010 => "E3010",
            ErrorCode::E3011 => "E3011",
            ErrorCode::E3012 => "E3012",
            // Internal
            ErrorCode::E9001 => "E9001",
        }
    }

    /// Whether this code belongs to type declaration validation.
    pub fn is_declaration_error(&self) -> bool {
        self.as_str().starts_with("E2")
    }

    /// Whether this code belongs to pattern checking.
    pub fn is_pattern_error(&self) -> bool {
        self.as_str().starts_with("E3")
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E3001.to_string(), "E3001");
        assert_eq!(ErrorCode::E2007.as_str(), "E2007");
    }

    #[test]
    fn test_error_code_phase() {
        assert!(ErrorCode::E2004.is_declaration_error());
        assert!(!ErrorCode::E2004.is_pattern_error());
        assert!(ErrorCode::E3012.is_pattern_error());
        assert!(!ErrorCode::E9001.is_pattern_error());
    }
}
