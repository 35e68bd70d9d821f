//! Predicate trees rendered onto `sqlx::QueryBuilder`.
//!
//! A filter is plain data: leaf comparisons combined by `All` (AND group) and
//! `Any` (OR alternatives). Every group renders inside its own parentheses, so
//! the tree shape is exactly the SQL precedence; nothing is merged implicitly.
//!
//! ```rust,ignore
//! let criteria = Criteria::new()
//!     .filter(Condition::any([
//!         Condition::all([
//!             Condition::contains(ProvinceColumn::ProvinceName, "江"),
//!             Condition::contains(ProvinceColumn::ProvinceCode, "X"),
//!         ]),
//!         Condition::eq(ProvinceColumn::ProvinceName, "山东"),
//!     ]))
//!     .order_by(ProvinceColumn::ProvinceCode, SortDir::Desc);
//! ```

use sqlx::{Postgres, QueryBuilder};

/// Maps a typed column identifier to its SQL column name.
pub trait Column: Copy + std::fmt::Debug + Send + Sync {
    fn name(self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy<C> {
    pub column: C,
    pub dir: SortDir,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition<C> {
    /// Column contains the value as a substring
    Contains(C, String),
    Eq(C, String),
    In(C, Vec<String>),
    /// Every condition holds; an empty group is always true
    All(Vec<Condition<C>>),
    /// At least one condition holds; an empty group is always false
    Any(Vec<Condition<C>>),
}

impl<C: Column> Condition<C> {
    pub fn contains(column: C, value: impl Into<String>) -> Self {
        Condition::Contains(column, value.into())
    }

    pub fn eq(column: C, value: impl Into<String>) -> Self {
        Condition::Eq(column, value.into())
    }

    pub fn is_in<I, V>(column: C, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Condition::In(column, values.into_iter().map(Into::into).collect())
    }

    pub fn all(conditions: impl IntoIterator<Item = Condition<C>>) -> Self {
        Condition::All(conditions.into_iter().collect())
    }

    pub fn any(conditions: impl IntoIterator<Item = Condition<C>>) -> Self {
        Condition::Any(conditions.into_iter().collect())
    }

    /// Append this condition as a self-contained boolean expression.
    pub fn push_sql(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        match self {
            Condition::Contains(column, value) => {
                qb.push(column.name())
                    .push(" LIKE ")
                    .push_bind(format!("%{}%", escape_like(value)))
                    .push(" ESCAPE '\\'");
            }
            Condition::Eq(column, value) => {
                qb.push(column.name()).push(" = ").push_bind(value.clone());
            }
            Condition::In(_, values) if values.is_empty() => {
                qb.push("FALSE");
            }
            Condition::In(column, values) => {
                qb.push(column.name()).push(" IN (");
                let mut list = qb.separated(", ");
                for value in values {
                    list.push_bind(value.clone());
                }
                qb.push(")");
            }
            Condition::All(conditions) => push_group(qb, conditions, " AND ", "TRUE"),
            Condition::Any(conditions) => push_group(qb, conditions, " OR ", "FALSE"),
        }
    }
}

fn push_group<C: Column>(
    qb: &mut QueryBuilder<'_, Postgres>,
    conditions: &[Condition<C>],
    joiner: &str,
    empty: &str,
) {
    if conditions.is_empty() {
        qb.push(empty);
        return;
    }

    qb.push("(");
    for (i, condition) in conditions.iter().enumerate() {
        if i > 0 {
            qb.push(joiner);
        }
        condition.push_sql(qb);
    }
    qb.push(")");
}

/// Escape LIKE metacharacters so the value matches literally
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// A filter plus ordering, the unit handed to repositories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Criteria<C> {
    pub condition: Option<Condition<C>>,
    pub order: Vec<OrderBy<C>>,
}

impl<C: Column> Default for Criteria<C> {
    fn default() -> Self {
        Self {
            condition: None,
            order: Vec::new(),
        }
    }
}

impl<C: Column> Criteria<C> {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn filter(mut self, condition: Condition<C>) -> Self {
        self.condition = Some(condition);
        self
    }

    #[must_use]
    pub fn order_by(mut self, column: C, dir: SortDir) -> Self {
        self.order.push(OrderBy { column, dir });
        self
    }

    /// Append ` WHERE ...` and ` ORDER BY ...` clauses (each only when present).
    pub fn push_sql(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        if let Some(condition) = &self.condition {
            qb.push(" WHERE ");
            condition.push_sql(qb);
        }

        if !self.order.is_empty() {
            qb.push(" ORDER BY ");
            for (i, key) in self.order.iter().enumerate() {
                if i > 0 {
                    qb.push(", ");
                }
                qb.push(key.column.name()).push(" ").push(key.dir.as_sql());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy)]
    enum TestColumn {
        Name,
        Code,
    }

    impl Column for TestColumn {
        fn name(self) -> &'static str {
            match self {
                TestColumn::Name => "name",
                TestColumn::Code => "code",
            }
        }
    }

    fn render(criteria: &Criteria<TestColumn>) -> String {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM t");
        criteria.push_sql(&mut qb);
        qb.sql().to_string()
    }

    #[test]
    fn test_and_group_stays_one_or_term() {
        let criteria = Criteria::new()
            .filter(Condition::any([
                Condition::all([
                    Condition::contains(TestColumn::Name, "a"),
                    Condition::contains(TestColumn::Code, "b"),
                ]),
                Condition::eq(TestColumn::Name, "c"),
                Condition::is_in(TestColumn::Code, ["d", "e"]),
            ]))
            .order_by(TestColumn::Code, SortDir::Desc)
            .order_by(TestColumn::Name, SortDir::Asc);

        assert_eq!(
            render(&criteria),
            "SELECT * FROM t WHERE ((name LIKE $1 ESCAPE '\\' AND code LIKE $2 ESCAPE '\\') \
             OR name = $3 OR code IN ($4, $5)) ORDER BY code DESC, name ASC"
        );
    }

    #[test]
    fn test_empty_groups_render_constants() {
        let all = Criteria::new().filter(Condition::<TestColumn>::all([]));
        assert_eq!(render(&all), "SELECT * FROM t WHERE TRUE");

        let any = Criteria::new().filter(Condition::<TestColumn>::any([]));
        assert_eq!(render(&any), "SELECT * FROM t WHERE FALSE");

        let empty_in = Criteria::new().filter(Condition::is_in(
            TestColumn::Code,
            Vec::<String>::new(),
        ));
        assert_eq!(render(&empty_in), "SELECT * FROM t WHERE FALSE");
    }

    #[test]
    fn test_no_filter_no_order() {
        assert_eq!(render(&Criteria::new()), "SELECT * FROM t");
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
        assert_eq!(escape_like("江"), "江");
    }
}
