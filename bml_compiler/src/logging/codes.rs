//! Consolidated error codes and classification system
//!
//! Single source of truth for every code emitted by the compiler and the
//! runtime, together with the metadata used to classify and report it.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

// ============================================================================
// CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// File processing error codes
pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const INVALID_EXTENSION: Code = Code::new("E006");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const EMPTY_FILE: Code = Code::new("E008");
    pub const PERMISSION_DENIED: Code = Code::new("E009");
    pub const INVALID_ENCODING: Code = Code::new("E010");
    pub const IO_ERROR: Code = Code::new("E011");
}

/// Markup tokenizer error codes
pub mod lexical {
    use super::Code;

    pub const INVALID_CHARACTER: Code = Code::new("E020");
    pub const UNTERMINATED_CONSTRUCT: Code = Code::new("E021");
    pub const UNKNOWN_ENTITY: Code = Code::new("E022");
    pub const NAME_TOO_LONG: Code = Code::new("E023");
    pub const TEXT_TOO_LARGE: Code = Code::new("E024");
    pub const COMMENT_TOO_LONG: Code = Code::new("E026");
    pub const TOO_MANY_TOKENS: Code = Code::new("E027");
}

/// Markup tree error codes
pub mod syntax {
    use super::Code;

    pub const UNEXPECTED_TOKEN: Code = Code::new("E040");
    pub const MISMATCHED_END_TAG: Code = Code::new("E041");
    pub const UNCLOSED_ELEMENT: Code = Code::new("E042");
    pub const MULTIPLE_ROOTS: Code = Code::new("E043");
    pub const MISSING_ROOT: Code = Code::new("E044");
    pub const TEXT_OUTSIDE_ROOT: Code = Code::new("E045");
    pub const DUPLICATE_ATTRIBUTE: Code = Code::new("E046");
    pub const MAX_NESTING_DEPTH: Code = Code::new("E047");
    pub const TOO_MANY_ATTRIBUTES: Code = Code::new("E048");
}

/// Expression compiler and evaluator codes
pub mod expression {
    use super::Code;

    pub const PARSE_ERROR: Code = Code::new("E060");
    pub const EXPRESSION_TOO_LONG: Code = Code::new("E061");
    pub const UNBOUND_PARAMETER: Code = Code::new("W060");
}

/// AST construction (format) error codes
pub mod ast {
    use super::Code;

    pub const WRONG_ROOT_ELEMENT: Code = Code::new("E080");
    pub const UNKNOWN_ELEMENT: Code = Code::new("E081");
    pub const INVALID_TYPE_QUALIFIER: Code = Code::new("E082");
    pub const INVALID_ORIENTATION: Code = Code::new("E083");
    pub const UNKNOWN_ATTRIBUTE: Code = Code::new("W080");
}

/// Reference resolution error codes
pub mod references {
    use super::Code;

    pub const UNRESOLVED_REFERENCE: Code = Code::new("E110");
    pub const LABEL_TOO_LONG: Code = Code::new("E111");
}

/// Structural validation error codes
pub mod validation {
    use super::Code;

    pub const MISSING_BULLET_DESCRIPTION: Code = Code::new("E120");
    pub const ORPHANED_ACTION: Code = Code::new("E121");
}

/// Task interpreter codes
pub mod runtime {
    use super::Code;

    pub const SPAWN_FAILED: Code = Code::new("W140");
    pub const DETACHED_ENTITY: Code = Code::new("W141");
    pub const NO_ENTRY_POINT: Code = Code::new("E142");
    pub const UNRESOLVED_AT_RUNTIME: Code = Code::new("E143");
    pub const TASK_LIMIT_EXCEEDED: Code = Code::new("E144");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I006");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const ELEMENT_TREE_COMPLETE: Code = Code::new("I040");
    pub const AST_CONSTRUCTION_COMPLETE: Code = Code::new("I050");
    pub const REFERENCE_RESOLUTION_COMPLETE: Code = Code::new("I060");
    pub const VALIDATION_COMPLETE: Code = Code::new("I070");
    pub const PATTERN_LOADED: Code = Code::new("I080");
    pub const ENTITY_BOUND: Code = Code::new("I090");
    pub const SIMULATION_COMPLETE: Code = Code::new("I091");
}

// ============================================================================
// METADATA REGISTRY
// ============================================================================

type Row = (
    &'static str,
    &'static str,
    Severity,
    bool,
    bool,
    &'static str,
    &'static str,
);

#[rustfmt::skip]
const REGISTRY_ROWS: &[Row] = &[
    // code, category, severity, recoverable, requires_halt, description, action
    ("ERR001", "System", Severity::Critical, false, true, "Critical internal engine error", "File a bug report with the pattern that triggered it"),
    ("ERR002", "System", Severity::Critical, false, true, "Logging or configuration initialization failure", "Check configuration files and environment variables"),

    ("E005", "FileProcessing", Severity::High, false, true, "Pattern file not found", "Check the file path"),
    ("E006", "FileProcessing", Severity::Medium, true, false, "Pattern file has an unexpected extension", "Rename the file to .xml or .bulletml or relax the extension preference"),
    ("E007", "FileProcessing", Severity::High, false, true, "Pattern file exceeds the size limit", "Split the pattern into smaller files"),
    ("E008", "FileProcessing", Severity::Medium, false, true, "Pattern file is empty", "Provide a bulletml document"),
    ("E009", "FileProcessing", Severity::High, false, true, "Permission denied reading pattern file", "Check file permissions"),
    ("E010", "FileProcessing", Severity::High, false, true, "Pattern file is not valid UTF-8", "Re-encode the file as UTF-8"),
    ("E011", "FileProcessing", Severity::High, false, true, "I/O error reading pattern file", "Retry or check the storage device"),

    ("E020", "Lexical", Severity::High, false, true, "Invalid character in markup", "Remove or escape the character"),
    ("E021", "Lexical", Severity::High, false, true, "Unterminated tag, comment, string or declaration", "Close the construct"),
    ("E022", "Lexical", Severity::High, false, true, "Unknown character entity", "Use &lt; &gt; &amp; &quot; &apos; or a numeric reference"),
    ("E023", "Lexical", Severity::Medium, false, true, "Element or attribute name too long", "Shorten the name"),
    ("E024", "Lexical", Severity::Medium, false, true, "Text or attribute value too large", "Shorten the value"),
    ("E026", "Lexical", Severity::Medium, false, true, "Comment too long", "Shorten the comment"),
    ("E027", "Lexical", Severity::High, false, true, "Too many markup tokens", "Split the pattern"),

    ("E040", "Syntax", Severity::High, false, true, "Unexpected markup token", "Check the element structure"),
    ("E041", "Syntax", Severity::High, false, true, "End tag does not match the open element", "Fix the element nesting"),
    ("E042", "Syntax", Severity::High, false, true, "Element is never closed", "Add the missing end tag"),
    ("E043", "Syntax", Severity::High, false, true, "More than one document element", "Wrap everything in a single bulletml element"),
    ("E044", "Syntax", Severity::High, false, true, "No document element", "Add a bulletml element"),
    ("E045", "Syntax", Severity::Medium, false, true, "Text outside the document element", "Move the text inside an element"),
    ("E046", "Syntax", Severity::Medium, false, true, "Attribute given twice on one element", "Remove the duplicate"),
    ("E047", "Syntax", Severity::High, false, true, "Element nesting too deep", "Flatten the pattern using references"),
    ("E048", "Syntax", Severity::Medium, false, true, "Too many attributes on one element", "Remove unused attributes"),

    ("E060", "Expression", Severity::High, false, true, "Malformed arithmetic expression", "Check operators, parentheses and $ variables"),
    ("E061", "Expression", Severity::Medium, false, true, "Expression too long", "Simplify the expression"),
    ("W060", "Expression", Severity::Low, true, false, "Parameter has no value anywhere up the owner chain; 0 used", "Pass the parameter from the referencing node"),

    ("E080", "Format", Severity::High, false, true, "Document element is not bulletml", "Use <bulletml> as the root element"),
    ("E081", "Format", Severity::High, false, true, "Unknown pattern element", "Use one of the bulletml element names"),
    ("E082", "Format", Severity::High, false, true, "Invalid type qualifier", "Use none, aim, absolute, relative or sequence"),
    ("E083", "Format", Severity::High, false, true, "Invalid document orientation", "Use none, vertical or horizontal"),
    ("W080", "Format", Severity::Low, true, false, "Attribute ignored by the pattern language", "Remove the attribute"),

    ("E110", "Reference", Severity::High, false, true, "Reference label does not resolve to a node of the expected kind", "Define the labelled node or fix the label"),
    ("E111", "Reference", Severity::Medium, false, true, "Label too long", "Shorten the label"),

    ("E120", "Validation", Severity::High, false, true, "Fire has neither a bullet nor a bulletRef", "Add a bullet description to the fire"),
    ("E121", "Validation", Severity::Critical, false, true, "Action node without a parent", "File a bug report"),

    ("W140", "Runtime", Severity::Low, true, false, "Host could not create an entity; fire skipped", "Raise the host entity limit"),
    ("W141", "Runtime", Severity::Low, true, false, "Created entity is not attached to the emitting context; fire skipped", "Attach created entities to the requested emitter"),
    ("E142", "Runtime", Severity::Medium, true, false, "Pattern has no top or top1..top9 action; entity removed", "Label an action top"),
    ("E143", "Runtime", Severity::Critical, false, true, "Reference reached the interpreter without validation", "Load patterns through the pipeline"),
    ("E144", "Runtime", Severity::High, true, false, "Task tree exceeds the per-entity task limit", "Check for self-referencing actions"),

    ("I004", "Success", Severity::Low, true, false, "Logging system initialized", "None"),
    ("I006", "Success", Severity::Low, true, false, "Pattern file read", "Continue to tokenization"),
    ("I020", "Success", Severity::Low, true, false, "Markup tokenized", "Continue to element tree construction"),
    ("I040", "Success", Severity::Low, true, false, "Element tree built", "Continue to AST construction"),
    ("I050", "Success", Severity::Low, true, false, "AST built", "Continue to validation"),
    ("I060", "Success", Severity::Low, true, false, "References resolved", "Continue to structural checks"),
    ("I070", "Success", Severity::Low, true, false, "Pattern validated", "Pattern ready for binding"),
    ("I080", "Success", Severity::Low, true, false, "Pattern loaded", "Bind entities to the pattern"),
    ("I090", "Success", Severity::Low, true, false, "Entity bound to pattern", "Step the entity every tick"),
    ("I091", "Success", Severity::Low, true, false, "Simulation finished", "None"),
];

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        REGISTRY_ROWS
            .iter()
            .map(
                |&(code, category, severity, recoverable, requires_halt, description, action)| {
                    (
                        code,
                        ErrorMetadata {
                            code,
                            category,
                            severity,
                            recoverable,
                            requires_halt,
                            description,
                            recommended_action: action,
                        },
                    )
                },
            )
            .collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

pub fn get_severity(code: &str) -> Severity {
    get_error_metadata(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

pub fn is_recoverable(code: &str) -> bool {
    get_error_metadata(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

pub fn requires_halt(code: &str) -> bool {
    get_error_metadata(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

pub fn get_description(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

pub fn get_action(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

pub fn get_category(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_constant_has_metadata() {
        let all = [
            system::INTERNAL_ERROR,
            file_processing::FILE_NOT_FOUND,
            lexical::UNKNOWN_ENTITY,
            syntax::MISMATCHED_END_TAG,
            expression::UNBOUND_PARAMETER,
            ast::WRONG_ROOT_ELEMENT,
            references::UNRESOLVED_REFERENCE,
            validation::MISSING_BULLET_DESCRIPTION,
            runtime::SPAWN_FAILED,
            success::PATTERN_LOADED,
        ];
        for code in all {
            assert!(
                get_error_metadata(code.as_str()).is_some(),
                "missing metadata for {}",
                code
            );
        }
    }

    #[test]
    fn test_recovered_conditions_do_not_halt() {
        for code in [expression::UNBOUND_PARAMETER, runtime::SPAWN_FAILED] {
            assert!(is_recoverable(code.as_str()));
            assert!(!requires_halt(code.as_str()));
        }
        assert!(requires_halt(references::UNRESOLVED_REFERENCE.as_str()));
    }

    #[test]
    fn test_unknown_code_defaults() {
        assert_eq!(get_category("X999"), "Unknown");
        assert_eq!(get_description("X999"), "Unknown error");
        assert_eq!(get_severity("X999"), Severity::Medium);
    }
}
