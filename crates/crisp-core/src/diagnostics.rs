//! Diagnostic aggregation model (spec §3, §6, §7).
//!
//! Every stage receives a `Diagnostics` bag and appends to it; stages never
//! unwind the call stack over a semantic problem. Diagnostics carry a stable
//! `DiagnosticCode` (the `BS00NN` registry in spec §6) so downstream tooling
//! can correlate messages across compiler versions.

use crate::span::Span;

/// Severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        f.write_str(s)
    }
}

/// A stable diagnostic code from the registry in spec §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiagnosticCode(pub &'static str);

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

macro_rules! diagnostic_codes {
    ($($const_name:ident => $code:literal, $severity:expr, $default_message:literal;)*) => {
        impl DiagnosticCode {
            $(pub const $const_name: DiagnosticCode = DiagnosticCode($code);)*

            /// The severity a code carries when no override is requested.
            pub fn default_severity(self) -> Severity {
                match self.0 {
                    $($code => $severity,)*
                    _ => Severity::Error,
                }
            }

            /// The printf-style message template registered for this code.
            pub fn default_message(self) -> &'static str {
                match self.0 {
                    $($code => $default_message,)*
                    _ => "",
                }
            }
        }
    };
}

diagnostic_codes! {
    NAME_NOT_FOUND       => "BS0001", Severity::Error,   "name not found: {}";
    SYNTAX_ERROR         => "BS0002", Severity::Error,   "syntax error";
    ARG_COUNT_MISMATCH   => "BS0005", Severity::Error,   "expected {} arguments, found {}";
    ARG_TYPE_MISMATCH     => "BS0006", Severity::Error,   "argument type mismatch";
    NON_BOOL_IN_CHECK    => "BS0007", Severity::Error,   "check condition must be Bool";
    NON_BTSTATUS_RETURN  => "BS0008", Severity::Error,   "action must return BtStatus";
    OBSOLETE_MEMBER      => "BS0010", Severity::Warning, "member is obsolete";
    UNUSED_TREE          => "BS0020", Severity::Warning, "tree is never referenced";
    UNKNOWN_DEFDEC       => "BS0023", Severity::Error,   "unknown decorator: {}";
    DEFDEC_ARITY         => "BS0024", Severity::Error,   "decorator {} expects {} arguments, found {}";
    DEFDEC_CYCLE         => "BS0025", Severity::Error,   "decorator {} is self-referential";
    MACRO_ARITY          => "BS0032", Severity::Error,   "macro {} expects {} arguments, found {}";
    MACRO_DEPTH          => "BS0033", Severity::Error,   "macro expansion exceeded the depth limit";
    MACRO_CYCLE          => "BS0034", Severity::Error,   "macro {} expands into itself";
    MACRO_LOWER_FAIL     => "BS0035", Severity::Error,   "macro expansion produced an invalid tree";
    PARAM_UNSUBSTITUTED  => "BS0036", Severity::Warning, "parameter {} survived expansion into the final tree";
    TREE_REF_CYCLE       => "BS0037", Severity::Error,   "reference cycle: {}";
    TREE_REF_UNDEFINED   => "BS0038", Severity::Error,   "undefined tree reference: {}";
    AMBIGUOUS_MEMBER     => "BS0104", Severity::Warning, "ambiguous member access";
    UNREACHABLE          => "BS0301", Severity::Warning, "unreachable node";
    IF_WITHOUT_ELSE      => "BS0302", Severity::Info,    "if without else falls through to Failure";
}

/// A single diagnostic record: code, severity, span, and rendered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub severity: Severity,
    pub span: Span,
    pub message: String,
}

/// Append-only collection of diagnostics gathered across a compilation.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start building a diagnostic at `code.default_severity()`, using the
    /// code's default message template unless `.message(..)` overrides it.
    pub fn report(&mut self, code: DiagnosticCode, span: Span) -> DiagnosticBuilder<'_> {
        DiagnosticBuilder {
            sink: self,
            code,
            severity: code.default_severity(),
            span,
            message: None,
        }
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn error_count(&self) -> usize {
        self.items
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Builder for a single diagnostic. Must call `.emit()` or the diagnostic is
/// silently dropped.
#[must_use = "diagnostic not recorded, call .emit()"]
pub struct DiagnosticBuilder<'a> {
    sink: &'a mut Diagnostics,
    code: DiagnosticCode,
    severity: Severity,
    span: Span,
    message: Option<String>,
}

impl<'a> DiagnosticBuilder<'a> {
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn emit(self) {
        let message = self
            .message
            .unwrap_or_else(|| self.code.default_message().to_string());
        self.sink.push(Diagnostic {
            code: self.code,
            severity: self.severity,
            span: self.span,
            message,
        });
    }
}

#[cfg(test)]
mod diagnostics_tests {
    use super::*;

    #[test]
    fn report_without_override_uses_the_default_message() {
        let mut bag = Diagnostics::new();
        bag.report(DiagnosticCode::TREE_REF_UNDEFINED, Span::new(0, 1))
            .emit();
        let d = bag.iter().next().unwrap();
        assert_eq!(d.severity, Severity::Error);
        assert_eq!(d.message, "undefined tree reference: {}");
    }

    #[test]
    fn report_with_override_replaces_the_message() {
        let mut bag = Diagnostics::new();
        bag.report(DiagnosticCode::TREE_REF_CYCLE, Span::new(0, 1))
            .message("A \u{2192} B \u{2192} A")
            .emit();
        assert_eq!(bag.error_count(), 1);
        assert!(bag.iter().next().unwrap().message.contains('\u{2192}'));
    }

    #[test]
    fn has_errors_ignores_warnings_and_info() {
        let mut bag = Diagnostics::new();
        bag.report(DiagnosticCode::UNUSED_TREE, Span::new(0, 1)).emit();
        bag.report(DiagnosticCode::IF_WITHOUT_ELSE, Span::new(0, 1))
            .emit();
        assert!(!bag.has_errors());
        assert_eq!(bag.len(), 2);
    }
}
