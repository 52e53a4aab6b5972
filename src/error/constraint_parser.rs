use regex::Regex;
use std::sync::OnceLock;

/// Utility for parsing PostgreSQL constraint violation messages.
///
/// Constraint names follow the PostgreSQL defaults used by the migrations
/// (`users_email_key`, `user_profiles_class_name_fkey`, ...), so the table
/// and column can usually be read straight off the name.
pub struct ConstraintParser;

struct RegexPatterns {
    key_value: Regex,
    column_name: Regex,
    table_name: Regex,
}

static REGEX_PATTERNS: OnceLock<RegexPatterns> = OnceLock::new();

/// Default PostgreSQL constraint suffixes
const CONSTRAINT_SUFFIXES: &[&str] = &["_key", "_fkey", "_check", "_not_null", "_idx"];

impl ConstraintParser {
    fn patterns() -> &'static RegexPatterns {
        REGEX_PATTERNS.get_or_init(|| RegexPatterns {
            // "Key (email)=(a@x.com) already exists."
            key_value: Regex::new(r"Key \(([^)]+)\)=\(([^)]*)\)").expect("valid key/value pattern"),
            column_name: Regex::new(r#"column "([^"]+)""#).expect("valid column pattern"),
            table_name: Regex::new(r#"(?:table|relation) "([^"]+)""#).expect("valid table pattern"),
        })
    }

    /// Parses a unique violation into `(entity, field, value)`.
    pub fn parse_unique_violation(
        message: &str,
        constraint_name: Option<&str>,
    ) -> Option<(String, String, String)> {
        let key_value = Self::extract_key_value(message);

        if let Some((entity, field)) = constraint_name.and_then(Self::parse_constraint_name) {
            let value = key_value
                .map(|(_, value)| value)
                .unwrap_or_else(|| "duplicate_value".to_string());
            return Some((entity, field, value));
        }

        let (field, value) = key_value?;
        let entity = Self::extract_table(message).unwrap_or_else(|| "resource".to_string());
        Some((entity, field, value))
    }

    /// Parses a not-null violation into `(entity, field)`.
    pub fn parse_not_null_violation(
        message: &str,
        constraint_name: Option<&str>,
    ) -> Option<(String, String)> {
        let field = Self::extract_column(message)?;
        let entity = Self::extract_table(message)
            .or_else(|| constraint_name.and_then(Self::parse_constraint_name).map(|(e, _)| e))
            .unwrap_or_else(|| "resource".to_string());
        Some((entity, field))
    }

    /// Parses a foreign key violation into `(entity, field, referenced_value)`.
    pub fn parse_foreign_key_violation(
        message: &str,
        constraint_name: Option<&str>,
    ) -> Option<(String, String, String)> {
        let (entity, field) = constraint_name.and_then(Self::parse_constraint_name)?;
        let value = Self::extract_key_value(message)
            .map(|(_, value)| value)
            .unwrap_or_else(|| "unknown".to_string());
        Some((entity, field, value))
    }

    /// Parses a check violation into `(entity, field)`.
    pub fn parse_check_violation(
        message: &str,
        constraint_name: Option<&str>,
    ) -> Option<(String, String)> {
        constraint_name
            .and_then(Self::parse_constraint_name)
            .or_else(|| {
                let field = Self::extract_column(message)?;
                let entity = Self::extract_table(message).unwrap_or_else(|| "resource".to_string());
                Some((entity, field))
            })
    }

    /// Splits `<table>_<column>_<suffix>` into `(table, column)`.
    ///
    /// Only the tables this service owns are recognised, since table names
    /// themselves may contain underscores.
    pub fn parse_constraint_name(constraint: &str) -> Option<(String, String)> {
        let stem = CONSTRAINT_SUFFIXES
            .iter()
            .find_map(|suffix| constraint.strip_suffix(suffix))?;

        const TABLES: &[&str] = &["user_profiles", "users", "classes", "sections", "roles"];
        TABLES.iter().find_map(|table| {
            let column = stem.strip_prefix(table)?.strip_prefix('_')?;
            (!column.is_empty()).then(|| (table.to_string(), column.to_string()))
        })
    }

    fn extract_key_value(message: &str) -> Option<(String, String)> {
        let caps = Self::patterns().key_value.captures(message)?;
        Some((caps[1].to_string(), caps[2].to_string()))
    }

    fn extract_column(message: &str) -> Option<String> {
        let caps = Self::patterns().column_name.captures(message)?;
        Some(caps[1].to_string())
    }

    fn extract_table(message: &str) -> Option<String> {
        let caps = Self::patterns().table_name.captures(message)?;
        Some(caps[1].to_string())
    }
}
