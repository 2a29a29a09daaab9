use miette::Diagnostic;
use thiserror::Error;

/// Lexical failure while reading a witness document.
///
/// Both adapters route through this one error channel; a malformed input is
/// always fatal for the load.
#[derive(Debug, Error, Diagnostic)]
pub enum DocError {
    #[error("malformed XML: {message}")]
    #[diagnostic(code(shrike::doc::xml))]
    Xml { message: String },

    #[error("malformed YAML: {message}")]
    #[diagnostic(code(shrike::doc::yaml))]
    Yaml { message: String },

    #[error("unsupported YAML structure: {message}")]
    #[diagnostic(
        code(shrike::doc::yaml_structure),
        help("witness documents use string-keyed mappings, sequences, and scalars only")
    )]
    YamlStructure { message: String },
}
