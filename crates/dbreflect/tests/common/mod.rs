//! Scripted mock connection and shared fixtures.
//!
//! The mock matches incoming SQL against substring rules in registration
//! order and replays canned rows. Queries matching no rule return an empty
//! result, which conveniently makes every unscripted capability canary
//! probe as "available".

use async_trait::async_trait;

use dbreflect::{BoxError, CatalogRow, CatalogValue, Connection};

pub fn v(value: impl Into<CatalogValue>) -> CatalogValue {
    value.into()
}

pub const NULL: CatalogValue = CatalogValue::Null;

enum Outcome {
    Rows(Vec<Vec<CatalogValue>>),
    Error(String),
}

struct Rule {
    needles: Vec<String>,
    outcome: Outcome,
}

pub struct MockConnection {
    rules: Vec<Rule>,
    pub log: Vec<String>,
}

impl MockConnection {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            log: Vec::new(),
        }
    }

    /// Replay `rows` for any query containing all `needles`.
    pub fn on(mut self, needles: &[&str], rows: Vec<Vec<CatalogValue>>) -> Self {
        self.rules.push(Rule {
            needles: needles.iter().map(|s| s.to_string()).collect(),
            outcome: Outcome::Rows(rows),
        });
        self
    }

    /// Fail any query containing all `needles`.
    pub fn fail_on(mut self, needles: &[&str], message: &str) -> Self {
        self.rules.push(Rule {
            needles: needles.iter().map(|s| s.to_string()).collect(),
            outcome: Outcome::Error(message.to_string()),
        });
        self
    }

    /// Number of executed queries containing `needle`.
    pub fn executed(&self, needle: &str) -> usize {
        self.log.iter().filter(|sql| sql.contains(needle)).count()
    }
}

#[async_trait]
impl Connection for MockConnection {
    async fn query(
        &mut self,
        sql: &str,
        _params: &[&str],
    ) -> std::result::Result<Vec<CatalogRow>, BoxError> {
        self.log.push(sql.to_string());
        for rule in &self.rules {
            if rule.needles.iter().all(|n| sql.contains(n.as_str())) {
                return match &rule.outcome {
                    Outcome::Rows(rows) => {
                        Ok(rows.iter().cloned().map(CatalogRow::new).collect())
                    }
                    Outcome::Error(message) => Err(message.clone().into()),
                };
            }
        }
        Ok(Vec::new())
    }
}

/// One author/book fixture in Postgres catalog shape:
/// `author(id pk identity, name)` and
/// `book(id pk, author_id fk -> author.id, title)`, plus a `mood` enum, a
/// `book_title_idx` index, and an `author_id_seq` sequence left entirely at
/// database defaults.
pub fn author_book_connection() -> MockConnection {
    MockConnection::new()
        .on(&["FROM pg_catalog.pg_namespace"], vec![vec![v("public")]])
        .on(
            &["pg_get_viewdef"],
            vec![
                vec![v("public"), v("author"), v("r"), NULL, NULL],
                vec![v("public"), v("book"), v("r"), NULL, NULL],
            ],
        )
        .on(
            &["FROM information_schema.columns"],
            vec![
                column_row("author", "id", 1, "int4", true, true),
                column_row("author", "name", 2, "varchar", false, true),
                column_row("book", "id", 1, "int4", false, false),
                column_row("book", "author_id", 2, "int4", false, false),
                column_row("book", "title", 3, "varchar", false, true),
            ],
        )
        .on(
            &["constraint_type = 'PRIMARY KEY'"],
            vec![
                vec![v("public"), v("author"), v("author_pkey"), v("id"), v(1)],
                vec![v("public"), v("book"), v("book_pkey"), v("id"), v(1)],
            ],
        )
        .on(
            &["referential_constraints"],
            vec![vec![
                v("public"),
                v("book"),
                v("book_author_id_fkey"),
                v("author_id"),
                v(1),
                v("public"),
                v("author_pkey"),
            ]],
        )
        .on(
            &["pg_index"],
            vec![vec![
                v("public"),
                v("book"),
                v("book_title_idx"),
                v(false),
                v("title"),
                v(1),
                v(false),
            ]],
        )
        .on(
            &["pg_enum"],
            vec![
                vec![v("public"), v("mood"), v("LOW")],
                vec![v("public"), v("mood"), v("MEDIUM")],
                vec![v("public"), v("mood"), v("HIGH")],
            ],
        )
        .on(
            &["pg_sequence s", "seqstart"],
            vec![vec![
                v("public"),
                v("author_id_seq"),
                v("bigint"),
                v("1"),
                v("1"),
                v("1"),
                v(i64::MAX.to_string()),
                v(false),
            ]],
        )
}

/// A Postgres information_schema.columns row in the shape the bundle
/// selects.
pub fn column_row(
    table: &str,
    name: &str,
    ordinal: i64,
    type_name: &str,
    identity: bool,
    nullable: bool,
) -> Vec<CatalogValue> {
    vec![
        v("public"),
        v(table),
        v(name),
        v(ordinal),
        v(type_name),
        NULL,
        NULL,
        NULL,
        v(if nullable { "YES" } else { "NO" }),
        if identity {
            v("nextval('author_id_seq'::regclass)")
        } else {
            NULL
        },
        v(identity),
        NULL,
        NULL,
        v("pg_catalog"),
        NULL,
    ]
}
