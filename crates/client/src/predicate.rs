//! Predicate expressions of the content API query language.

use std::fmt::{self, Display, Formatter};

use serde_json::Value;

/// Operator of a single predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    At,
    Any,
    Not,
    Fulltext,
    DateMonth,
    DateYear,
}

impl Operator {
    /// Name of the operator as written on the wire.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Operator::At => "at",
            Operator::Any => "any",
            Operator::Not => "not",
            Operator::Fulltext => "fulltext",
            Operator::DateMonth => "date.month",
            Operator::DateYear => "date.year",
        }
    }
}

/// One server side filter condition.
///
/// `path` is either a document attribute path (`document.type`) or a custom
/// field path (`my.article.title`). All predicates of a query are ANDed.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub path: String,
    pub operator: Operator,
    pub operand: Value,
}

impl Predicate {
    pub fn new(operator: Operator, path: impl Into<String>, operand: impl Into<Value>) -> Self {
        Self {
            path: path.into(),
            operator,
            operand: operand.into(),
        }
    }

    pub fn at(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(Operator::At, path, value)
    }

    pub fn any(path: impl Into<String>, values: impl Into<Value>) -> Self {
        Self::new(Operator::Any, path, values)
    }

    pub fn not(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(Operator::Not, path, value)
    }

    /// Full text search over the whole document.
    pub fn fulltext(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(Operator::Fulltext, path, text.into())
    }

    pub fn date_month(path: impl Into<String>, month: u32) -> Self {
        Self::new(Operator::DateMonth, path, month)
    }

    pub fn date_year(path: impl Into<String>, year: i32) -> Self {
        Self::new(Operator::DateYear, path, year)
    }
}

impl Display for Predicate {
    /// Renders `[at(document.type, "article")]`.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}({}, {})]",
            self.operator.wire_name(),
            self.path,
            self.operand
        )
    }
}

/// Render the `q` parameter for a list of predicates: `[[at(..)][any(..)]]`.
pub fn render_predicates(predicates: &[Predicate]) -> String {
    let body: String = predicates.iter().map(ToString::to_string).collect();
    format!("[{}]", body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_at_renders_string_operand() {
        let predicate = Predicate::at("document.type", "article");
        assert_eq!(predicate.to_string(), r#"[at(document.type, "article")]"#);
    }

    #[test]
    fn test_any_renders_list_operand() {
        let predicate = Predicate::any("document.tags", json!(["news", "tech"]));
        assert_eq!(predicate.to_string(), r#"[any(document.tags, ["news","tech"])]"#);
    }

    #[test]
    fn test_date_predicates_use_dotted_operator_names() {
        assert_eq!(
            Predicate::date_month("document.first_publication_date", 5).to_string(),
            "[date.month(document.first_publication_date, 5)]"
        );
        assert_eq!(
            Predicate::date_year("document.first_publication_date", 2019).to_string(),
            "[date.year(document.first_publication_date, 2019)]"
        );
    }

    #[test]
    fn test_render_predicates_wraps_all_conditions() {
        let q = render_predicates(&[
            Predicate::at("document.type", "article"),
            Predicate::fulltext("document", "rust"),
        ]);
        assert_eq!(
            q,
            r#"[[at(document.type, "article")][fulltext(document, "rust")]]"#
        );
    }

    #[test]
    fn test_render_no_predicates() {
        assert_eq!(render_predicates(&[]), "[]");
    }
}
