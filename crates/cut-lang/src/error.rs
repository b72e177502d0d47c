/// Errors produced while compiling a cut/variable expression string.
///
/// All variants are fatal at startup: a selection containing any
/// uncompilable cut never processes events.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// The expression string is malformed. `detail` carries the parser's
    /// description of the offending input.
    #[error("syntax error in `{expression}`: {detail}")]
    SyntaxError { expression: String, detail: String },

    /// A field reference names a collection that was not declared by the
    /// caller.
    #[error("unknown collection `{collection}` referenced in `{expression}`")]
    UnknownCollection {
        collection: String,
        expression: String,
    },

    /// A function call's argument count does not match its signature.
    #[error(
        "function `{function}` in `{expression}` takes {expected} argument(s), found {found}"
    )]
    ArityMismatch {
        function: String,
        expected: usize,
        found: usize,
        expression: String,
    },
}
