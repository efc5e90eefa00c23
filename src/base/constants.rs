//! Language constants: reserved words, primitive types and built-in classes.
//!
//! All lookups are case-insensitive because Apex identifiers are.

/// Maximum length of a declared identifier.
pub const MAX_IDENTIFIER_LENGTH: usize = 255;

/// The current-instance keyword.
pub const THIS_KEYWORD: &str = "this";

/// The built-in class exposing trigger context variables.
pub const TRIGGER_CLASS: &str = "Trigger";

/// Annotation that marks a class or method as a test.
pub const TEST_ANNOTATION: &str = "IsTest";

/// Legacy modifier keyword equivalent to the test annotation.
pub const TEST_METHOD_MODIFIER: &str = "testMethod";

/// Annotation marking a symbol as deprecated.
pub const DEPRECATED_ANNOTATION: &str = "Deprecated";

/// Reserved words that cannot be used as declared identifiers.
pub const RESERVED_WORDS: &[&str] = &[
    "abstract", "activate", "and", "any", "array", "as", "asc", "autonomous", "begin",
    "bigdecimal", "blob", "break", "bulk", "by", "byte", "case", "cast", "catch", "char",
    "class", "collect", "commit", "const", "continue", "default", "delete", "desc", "do",
    "else", "end", "enum", "exception", "exit", "export", "extends", "false", "final",
    "finally", "float", "for", "from", "global", "goto", "group", "having", "hint", "if",
    "implements", "import", "in", "inner", "insert", "instanceof", "interface", "into",
    "join", "like", "limit", "list", "loop", "map", "merge", "new", "not", "null", "nulls",
    "number", "object", "of", "on", "or", "outer", "override", "package", "parallel",
    "pragma", "private", "protected", "public", "retrieve", "return", "rollback", "select",
    "set", "short", "sort", "static", "super", "switch", "synchronized", "system",
    "testmethod", "then", "this", "throw", "transaction", "trigger", "true", "try",
    "undelete", "update", "upsert", "using", "virtual", "void", "webservice", "when",
    "where", "while",
];

/// Primitive types of the language.
pub const PRIMITIVE_TYPES: &[&str] = &[
    "Blob", "Boolean", "Date", "Datetime", "Decimal", "Double", "ID", "Integer", "Long",
    "Object", "String", "Time", "void",
];

/// Standard-library classes and namespaces that are always available.
///
/// Used by chain narrowing (a chain root matching one of these is a class reference)
/// and by validators (these never produce "type not found").
pub const BUILTIN_CLASSES: &[&str] = &[
    "Approval", "Auth", "Cache", "Crypto", "Database", "DmlException", "EncodingUtil",
    "Exception", "Http", "HttpRequest", "HttpResponse", "JSON", "JSONGenerator",
    "JSONParser", "Limits", "List", "Map", "Math", "Messaging", "Pattern", "Matcher",
    "QueryException", "Schema", "Search", "Set", "SObject", "System", "Test", "Trigger",
    "Type", "UserInfo", "Url", "NullPointerException", "ListException", "MathException",
    "StringException", "TypeException", "Account", "Contact", "Lead", "Opportunity",
    "Case", "User", "Task", "Event",
];

/// Trigger context variables (`Trigger.new`, `Trigger.oldMap`, ...).
pub const TRIGGER_CONTEXT_VARIABLES: &[&str] = &[
    "new", "old", "newMap", "oldMap", "isInsert", "isUpdate", "isDelete", "isUndelete",
    "isBefore", "isAfter", "isExecuting", "operationType", "size",
];

/// Compound assignment operators (the target is both read and written).
pub const COMPOUND_ASSIGNMENT_OPERATORS: &[&str] = &[
    "+=", "-=", "*=", "/=", "&=", "|=", "^=", "<<=", ">>=", ">>>=",
];

fn contains_ignore_case(list: &[&str], name: &str) -> bool {
    list.iter().any(|candidate| candidate.eq_ignore_ascii_case(name))
}

/// Returns true if `name` is a reserved word.
pub fn is_reserved_word(name: &str) -> bool {
    contains_ignore_case(RESERVED_WORDS, name)
}

/// Returns true if `name` is a primitive type.
pub fn is_primitive_type(name: &str) -> bool {
    contains_ignore_case(PRIMITIVE_TYPES, name)
}

/// Returns true if `name` is a built-in standard-library class or namespace.
pub fn is_builtin_class(name: &str) -> bool {
    contains_ignore_case(BUILTIN_CLASSES, name)
}

/// Returns true if the type name never needs resolution against the graph.
///
/// Qualified names rooted at a built-in namespace (`Schema.SObjectField`,
/// `System.Url`) count as built-in.
pub fn is_builtin_type(name: &str) -> bool {
    if is_primitive_type(name) || is_builtin_class(name) {
        return true;
    }
    match name.split_once('.') {
        Some((root, _)) => is_builtin_class(root),
        None => name.ends_with("__c") || name.ends_with("__mdt") || name.ends_with("__e"),
    }
}

/// Returns true if `name` is a trigger context variable.
pub fn is_trigger_context_variable(name: &str) -> bool {
    contains_ignore_case(TRIGGER_CONTEXT_VARIABLES, name)
}

/// Returns true if the assignment operator reads its target before writing it.
pub fn is_compound_assignment(operator: &str) -> bool {
    COMPOUND_ASSIGNMENT_OPERATORS.contains(&operator.trim())
}
