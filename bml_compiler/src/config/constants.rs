pub mod compile_time {
    pub mod file_processing {
        /// Maximum pattern file size allowed for loading (4MB)
        /// SECURITY: Prevents memory exhaustion via oversized scripts
        pub const MAX_FILE_SIZE: u64 = 4 * 1024 * 1024;

        /// Files above this size are reported as large in load metrics
        pub const LARGE_FILE_THRESHOLD: u64 = 256 * 1024;

        /// Canonical pattern file extension
        pub const PATTERN_EXTENSION: &str = "xml";

        /// Alternate extension accepted alongside the canonical one
        pub const ALTERNATE_PATTERN_EXTENSION: &str = "bulletml";
    }

    pub mod lexical {
        /// Maximum length of an element or attribute name
        /// SECURITY: Prevents tokenizer complexity attacks
        pub const MAX_NAME_LENGTH: usize = 128;

        /// Maximum length of a single attribute value
        pub const MAX_ATTRIBUTE_VALUE_LENGTH: usize = 4_096;

        /// Maximum length of a single text run
        pub const MAX_TEXT_LENGTH: usize = 65_536;

        /// Maximum comment length
        /// SECURITY: Limits resource consumption per comment
        pub const MAX_COMMENT_LENGTH: usize = 65_536;

        /// Maximum number of markup tokens allowed in a single script
        /// SECURITY: Prevents DoS via token explosion
        pub const MAX_TOKEN_COUNT: usize = 1_000_000;
    }

    pub mod syntax {
        /// Maximum element nesting depth
        /// SECURITY: Prevents stack overflow in recursive tree construction
        pub const MAX_NESTING_DEPTH: usize = 128;

        /// Maximum number of attributes on one element
        pub const MAX_ATTRIBUTES_PER_ELEMENT: usize = 32;

        /// Name of the required document element
        pub const ROOT_ELEMENT: &str = "bulletml";
    }

    pub mod expression {
        /// Maximum length of one inline expression
        /// SECURITY: Bounds parser work per node
        pub const MAX_EXPRESSION_LENGTH: usize = 4_096;

        /// Maximum parenthesis / unary nesting inside one expression
        pub const MAX_EXPRESSION_DEPTH: usize = 64;

        /// Highest positional parameter index accepted ($1..$N)
        pub const MAX_PARAMETER_INDEX: usize = 64;
    }

    pub mod references {
        /// Maximum label length
        pub const MAX_LABEL_LENGTH: usize = 255;

        /// Label of the single entry-point action
        pub const TOP_LABEL: &str = "top";

        /// Numbered entry points are top1..topN
        pub const MAX_NUMBERED_ENTRY_POINTS: usize = 9;
    }

    pub mod runtime {
        /// Durations with a magnitude below this are treated as one tick
        pub const DEGENERATE_DURATION_EPSILON: f32 = 0.01;

        /// Maximum number of tasks instantiated for one bound entity
        /// SECURITY: Guards against runaway self-referencing patterns
        pub const MAX_TASKS_PER_TREE: usize = 100_000;

        /// Maximum actionRef expansion depth while building a task tree
        pub const MAX_REFERENCE_EXPANSION_DEPTH: usize = 64;
    }

    pub mod logging {
        /// Maximum error collection size
        pub const MAX_ERROR_COLLECTION: usize = 1_000;

        /// Maximum log events recorded per file
        pub const MAX_LOG_EVENTS_PER_FILE: usize = 1_000;

        /// Maximum log message length before truncation
        pub const MAX_LOG_MESSAGE_LENGTH: usize = 10_000;
    }
}
