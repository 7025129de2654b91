use std::fmt;

/// Error codes for all pipeline diagnostics.
///
/// Format: E#### where the first digit indicates the phase:
/// - E0xxx: Lexer errors
/// - E1xxx: Parser errors
/// - E2xxx: Lowering errors
/// - E3xxx: Resolution errors
/// - E4xxx: Runtime faults
/// - E5xxx: Driver, artifact and process errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, serde::Serialize, serde::Deserialize)]
pub enum ErrorCode {
    // Lexer Errors (E0xxx)
    /// Unterminated string literal
    E0001,
    /// Invalid character in source
    E0002,
    /// Invalid number literal
    E0003,
    /// Foreign block without a matching end marker
    E0004,
    /// Literal aggregate without a closing `}>`
    E0005,
    /// Semicolon
    E0006,
    /// Forbidden reserved keyword (`var`, `let`, `const`)
    E0007,
    /// Source larger than 4 GiB
    E0008,

    // Parser Errors (E1xxx)
    /// Unexpected token
    E1001,
    /// Expected expression
    E1002,
    /// Unclosed delimiter
    E1003,
    /// Closing brace with no open block
    E1004,
    /// Expected identifier
    E1005,
    /// Missing mandatory `trash_cleaner` directive
    E1006,
    /// Directive given more than once
    E1007,
    /// Directive value is not a boolean
    E1008,
    /// Invalid pattern
    E1009,
    /// Directive outside the top level
    E1010,

    // Lowering Errors (E2xxx)
    /// Construct matched a pass trigger but is malformed
    E2001,
    /// Invocation of an undefined macro
    E2002,
    /// Macro argument count mismatch
    E2003,
    /// Recursive macro expansion
    E2004,
    /// Invalid state machine declaration
    E2005,
    /// Invalid record declaration
    E2006,
    /// Invalid match block
    E2007,
    /// Lowered tree failed validation
    E2008,

    // Resolution Errors (E3xxx)
    /// Module path not in the module mapping
    E3001,
    /// Package import cycle
    E3002,
    /// Package not found in any search directory
    E3003,
    /// A mapped target is unavailable
    E3004,
    /// Imported package failed to compile
    E3005,

    // Runtime Faults (E4xxx)
    /// Uncaught runtime error
    E4001,
    /// Foreign bridge failure
    E4002,
    /// Memory runtime failure
    E4003,

    // Driver Errors (E5xxx)
    /// Could not read or write a file
    E5001,
    /// Artifact has the wrong magic header
    E5002,
    /// Artifact from a different pipeline version
    E5003,
    /// Artifact payload could not be decoded
    E5004,
    /// Execution timed out
    E5005,
    /// Execution was cancelled
    E5006,
    /// Child process failed to start or exited abnormally
    E5007,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "E0001",
            ErrorCode::E0002 => "E0002",
            ErrorCode::E0003 => "E0003",
            ErrorCode::E0004 => "E0004",
            ErrorCode::E0005 => "E0005",
            ErrorCode::E0006 => "E0006",
            ErrorCode::E0007 => "E0007",
            ErrorCode::E0008 => "E0008",
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E1006 => "E1006",
            ErrorCode::E1007 => "E1007",
            ErrorCode::E1008 => "E1008",
            ErrorCode::E1009 => "E1009",
            ErrorCode::E1010 => "E1010",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            ErrorCode::E2008 => "E2008",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3003 => "E3003",
            ErrorCode::E3004 => "E3004",
            ErrorCode::E3005 => "E3005",
            ErrorCode::E4001 => "E4001",
            ErrorCode::E4002 => "E4002",
            ErrorCode::E4003 => "E4003",
            ErrorCode::E5001 => "E5001",
            ErrorCode::E5002 => "E5002",
            ErrorCode::E5003 => "E5003",
            ErrorCode::E5004 => "E5004",
            ErrorCode::E5005 => "E5005",
            ErrorCode::E5006 => "E5006",
            ErrorCode::E5007 => "E5007",
        }
    }

    /// Taxonomy name shown as the error kind when nothing more specific is known.
    pub fn default_kind(&self) -> &'static str {
        match self {
            ErrorCode::E0001
            | ErrorCode::E0002
            | ErrorCode::E0003
            | ErrorCode::E0004
            | ErrorCode::E0005
            | ErrorCode::E0006
            | ErrorCode::E0007
            | ErrorCode::E0008
            | ErrorCode::E1001
            | ErrorCode::E1002
            | ErrorCode::E1003
            | ErrorCode::E1004
            | ErrorCode::E1005
            | ErrorCode::E1006
            | ErrorCode::E1007
            | ErrorCode::E1008
            | ErrorCode::E1009
            | ErrorCode::E1010 => "SyntaxError",
            ErrorCode::E2001
            | ErrorCode::E2002
            | ErrorCode::E2003
            | ErrorCode::E2004
            | ErrorCode::E2005
            | ErrorCode::E2006
            | ErrorCode::E2007
            | ErrorCode::E2008 => "LoweringError",
            ErrorCode::E3002 => "PackageCycle",
            ErrorCode::E3001 | ErrorCode::E3003 | ErrorCode::E3004 | ErrorCode::E3005 => {
                "ModuleNotFound"
            }
            ErrorCode::E4001 | ErrorCode::E4002 | ErrorCode::E4003 => "RuntimeFault",
            ErrorCode::E5001
            | ErrorCode::E5002
            | ErrorCode::E5003
            | ErrorCode::E5004
            | ErrorCode::E5005
            | ErrorCode::E5006
            | ErrorCode::E5007 => "ExecutionError",
        }
    }

    /// Resolution failures exit with a distinct status.
    pub fn is_resolution(&self) -> bool {
        matches!(
            self,
            ErrorCode::E3001
                | ErrorCode::E3002
                | ErrorCode::E3003
                | ErrorCode::E3004
                | ErrorCode::E3005
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_phase() {
        assert_eq!(ErrorCode::E0006.default_kind(), "SyntaxError");
        assert_eq!(ErrorCode::E1006.default_kind(), "SyntaxError");
        assert_eq!(ErrorCode::E2002.default_kind(), "LoweringError");
        assert_eq!(ErrorCode::E3001.default_kind(), "ModuleNotFound");
        assert_eq!(ErrorCode::E3002.default_kind(), "PackageCycle");
        assert_eq!(ErrorCode::E4001.default_kind(), "RuntimeFault");
    }

    #[test]
    fn only_resolution_codes_are_resolution() {
        assert!(ErrorCode::E3002.is_resolution());
        assert!(ErrorCode::E3005.is_resolution());
        assert!(!ErrorCode::E2001.is_resolution());
        assert!(!ErrorCode::E5003.is_resolution());
    }

    #[test]
    fn display_is_code() {
        assert_eq!(ErrorCode::E5003.to_string(), "E5003");
    }
}
