//! Builds parameterized SELECT and COUNT statements from plans and table descriptors.
//! Identifiers come from the catalog only; operands are always bound parameters.

use crate::query::{CountPlan, Operator, Predicate, RetrievalPlan, SortDirection};
use crate::schema::{ColumnType, TableDescriptor};
use crate::sql::PgBindValue;

/// Quote identifier for PostgreSQL (safe: only from the catalog).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Full qualified table name.
fn qualified_table(schema: &str, table: &str) -> String {
    format!("{}.{}", quoted(schema), quoted(table))
}

#[derive(Debug, Default)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<PgBindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        Self::default()
    }

    fn push_param(&mut self, v: PgBindValue) -> u32 {
        self.params.push(v);
        self.params.len() as u32
    }
}

/// SELECT list: numeric columns as float8 so rows decode into JSON numbers.
fn select_column_list(table: &TableDescriptor) -> String {
    table
        .columns
        .iter()
        .map(|c| {
            let q = quoted(&c.name);
            if c.column_type == ColumnType::Number {
                format!("{}::float8 AS {}", q, q)
            } else {
                q
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Escapes LIKE metacharacters and wraps the operand for substring matching.
fn like_pattern(raw: &str) -> String {
    let escaped = raw.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Integer, number, boolean and timestamp columns compare natively when every operand
/// coerced; anything else compares as text.
fn predicate_sql(q: &mut QueryBuf, table: &TableDescriptor, p: &Predicate) -> Option<String> {
    let column_type = table.column(&p.column)?.column_type;
    let col = quoted(&p.column);
    if p.op == Operator::Like {
        let raw = p.values.first()?.as_text();
        let n = q.push_param(PgBindValue::Text(like_pattern(&raw)));
        return Some(format!("{}::text LIKE ${}", col, n));
    }

    let native = matches!(
        column_type,
        ColumnType::Integer | ColumnType::Number | ColumnType::Boolean | ColumnType::Timestamp
    ) && p.values.iter().all(|v| v.matches_type(column_type));
    let lhs = if native { col } else { format!("{}::text", col) };
    let mut placeholders = p.values.iter().map(|v| {
        let bind = if native {
            PgBindValue::from_filter(v)
        } else {
            PgBindValue::text_of(v)
        };
        format!("${}", q.push_param(bind))
    });

    let sql = match p.op {
        Operator::In => format!("{} IN ({})", lhs, placeholders.collect::<Vec<_>>().join(", ")),
        op => {
            let symbol = match op {
                Operator::Eq => "=",
                Operator::Ne => "<>",
                Operator::Gte => ">=",
                Operator::Lte => "<=",
                Operator::Like | Operator::In => unreachable!("handled above"),
            };
            format!("{} {} {}", lhs, symbol, placeholders.next()?)
        }
    };
    Some(sql)
}

fn where_clause(q: &mut QueryBuf, table: &TableDescriptor, predicates: &[Predicate]) -> String {
    let parts: Vec<String> = predicates
        .iter()
        .filter_map(|p| predicate_sql(q, table, p))
        .collect();
    if parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", parts.join(" AND "))
    }
}

/// SELECT with filters, requested order (primary key when none), LIMIT/OFFSET from the window.
pub fn select(table: &TableDescriptor, schema: &str, plan: &RetrievalPlan) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_clause = where_clause(&mut q, table, &plan.predicates);
    let order = if plan.sort.is_empty() {
        quoted(&table.primary_key)
    } else {
        plan.sort
            .iter()
            .map(|s| {
                let dir = match s.direction {
                    SortDirection::Asc => "ASC",
                    SortDirection::Desc => "DESC",
                };
                format!("{} {}", quoted(&s.column), dir)
            })
            .collect::<Vec<_>>()
            .join(", ")
    };
    let limit_clause = plan.window.limit().map(|n| format!(" LIMIT {}", n)).unwrap_or_default();
    let offset_clause = if plan.window.start > 0 {
        format!(" OFFSET {}", plan.window.start)
    } else {
        String::new()
    };
    q.sql = format!(
        "SELECT {} FROM {}{} ORDER BY {}{}{}",
        select_column_list(table),
        qualified_table(schema, &table.name),
        where_clause,
        order,
        limit_clause,
        offset_clause
    );
    q
}

/// COUNT(*) with the same filters and nothing else.
pub fn count(table: &TableDescriptor, schema: &str, plan: &CountPlan) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_clause = where_clause(&mut q, table, &plan.predicates);
    q.sql = format!(
        "SELECT COUNT(*) FROM {}{}",
        qualified_table(schema, &table.name),
        where_clause
    );
    q
}

/// Plain filtered (or unfiltered) fetch in primary-key order, used for embedding.
pub fn select_filtered(table: &TableDescriptor, schema: &str, predicates: &[Predicate]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_clause = where_clause(&mut q, table, predicates);
    q.sql = format!(
        "SELECT {} FROM {}{} ORDER BY {}",
        select_column_list(table),
        qualified_table(schema, &table.name),
        where_clause,
        quoted(&table.primary_key)
    );
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{FilterValue, SortField, Window};
    use crate::schema::ColumnDescriptor;

    fn users() -> TableDescriptor {
        let col = |name: &str, column_type| ColumnDescriptor {
            name: name.into(),
            column_type,
            nullable: true,
            is_primary_key: name == "id",
            reference: None,
        };
        TableDescriptor {
            name: "app_users".into(),
            resource: "users".into(),
            columns: vec![
                col("id", ColumnType::Integer),
                col("fullName", ColumnType::Text),
                col("score", ColumnType::Number),
            ],
            primary_key: "id".into(),
            relations: vec![],
        }
    }

    fn pred(column: &str, op: Operator, values: Vec<FilterValue>) -> Predicate {
        Predicate { column: column.into(), op, values }
    }

    #[test]
    fn select_without_filters() {
        let plan = RetrievalPlan {
            predicates: vec![],
            sort: vec![],
            window: Window { start: 0, end: Some(10) },
        };
        let q = select(&users(), "public", &plan);
        assert_eq!(
            q.sql,
            r#"SELECT "id", "fullName", "score"::float8 AS "score" FROM "public"."app_users" ORDER BY "id" LIMIT 10"#
        );
        assert!(q.params.is_empty());
    }

    #[test]
    fn select_with_filters_sort_and_window() {
        let plan = RetrievalPlan {
            predicates: vec![
                pred("fullName", Operator::Like, vec![FilterValue::Text("50%_off".into())]),
                pred("id", Operator::In, vec![FilterValue::Int(1), FilterValue::Int(2)]),
                pred("score", Operator::Gte, vec![FilterValue::Float(1.5)]),
            ],
            sort: vec![SortField { column: "fullName".into(), direction: SortDirection::Desc }],
            window: Window { start: 5, end: Some(10) },
        };
        let q = select(&users(), "public", &plan);
        assert_eq!(
            q.sql,
            r#"SELECT "id", "fullName", "score"::float8 AS "score" FROM "public"."app_users" WHERE "fullName"::text LIKE $1 AND "id" IN ($2, $3) AND "score" >= $4 ORDER BY "fullName" DESC LIMIT 5 OFFSET 5"#
        );
        assert_eq!(
            q.params,
            vec![
                PgBindValue::Text(r"%50\%\_off%".into()),
                PgBindValue::I64(1),
                PgBindValue::I64(2),
                PgBindValue::F64(1.5),
            ]
        );
    }

    #[test]
    fn uncoerced_operands_compare_as_text() {
        let plan = CountPlan {
            predicates: vec![
                pred("id", Operator::Eq, vec![FilterValue::Text("abc".into())]),
                pred("fullName", Operator::Ne, vec![FilterValue::Text("Ann".into())]),
            ],
        };
        let q = count(&users(), "blog", &plan);
        assert_eq!(
            q.sql,
            r#"SELECT COUNT(*) FROM "blog"."app_users" WHERE "id"::text = $1 AND "fullName"::text <> $2"#
        );
        assert_eq!(q.params, vec![PgBindValue::Text("abc".into()), PgBindValue::Text("Ann".into())]);
    }

    #[test]
    fn unbounded_window_has_no_limit() {
        let plan = RetrievalPlan {
            predicates: vec![],
            sort: vec![],
            window: Window { start: 3, end: None },
        };
        let q = select(&users(), "public", &plan);
        assert!(q.sql.ends_with(r#"ORDER BY "id" OFFSET 3"#));
    }

    #[test]
    fn related_fetch_orders_by_key() {
        let q = select_filtered(&users(), "public", &[]);
        assert_eq!(
            q.sql,
            r#"SELECT "id", "fullName", "score"::float8 AS "score" FROM "public"."app_users" ORDER BY "id""#
        );
    }
}
