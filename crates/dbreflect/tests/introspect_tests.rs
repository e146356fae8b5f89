//! Full-pass introspection scenarios against a scripted catalog.

mod common;

use common::{author_book_connection, column_row, v, MockConnection, NULL};
use dbreflect::{
    Capability, Dialect, IntrospectConfig, Introspector, ReflectError, Session, TableKind,
};

fn introspector(config: IntrospectConfig) -> Introspector {
    Introspector::new(config).expect("valid config")
}

fn pg_all_schemas() -> Introspector {
    introspector(IntrospectConfig::new("postgres", vec![]))
}

#[tokio::test]
async fn author_book_yields_one_resolved_foreign_key() {
    let mut conn = author_book_connection();
    let graph = pg_all_schemas().introspect(&mut conn).await.unwrap();

    let author_id = graph.table_id("public", "author").unwrap();
    let author = graph.table(author_id);
    let book = graph.table_by_name("public", "book").unwrap();

    assert_eq!(book.foreign_keys.len(), 1);
    let fk = &book.foreign_keys[0];
    assert_eq!(fk.name, "book_author_id_fkey");
    assert_eq!(fk.columns, vec!["author_id".to_string()]);
    assert_eq!(fk.referenced_table, author_id);
    assert_eq!(fk.referenced_key, "author_pkey");
    assert_eq!(fk.referenced_columns, vec!["id".to_string()]);

    // Referencing and referenced columns are element-wise type-comparable.
    let fk_col = book.column("author_id").unwrap();
    let pk_col = author.column("id").unwrap();
    assert!(fk_col.data_type.equivalent_to(&pk_col.data_type));

    // Inbound references live on the referenced key, not on the table.
    assert!(author.foreign_keys.is_empty());
    let pk = author.primary_key().unwrap();
    let inbound = graph.referencing_foreign_keys(pk);
    assert_eq!(inbound.len(), 1);
    assert_eq!(inbound[0].name, "book_author_id_fkey");
}

#[tokio::test]
async fn column_ordinals_are_renumbered_gapless() {
    // Catalog ordinals 3 and 7: a table that lost columns to ALTER TABLE.
    let mut conn = MockConnection::new()
        .on(&["FROM pg_catalog.pg_namespace"], vec![vec![v("public")]])
        .on(
            &["pg_get_viewdef"],
            vec![vec![v("public"), v("author"), v("r"), NULL, NULL]],
        )
        .on(
            &["FROM information_schema.columns"],
            vec![
                column_row("author", "id", 3, "int4", false, false),
                column_row("author", "name", 7, "varchar", false, true),
            ],
        );
    let graph = pg_all_schemas().introspect(&mut conn).await.unwrap();

    let author = graph.table_by_name("public", "author").unwrap();
    let ordinals: Vec<i32> = author.columns.iter().map(|c| c.ordinal).collect();
    assert_eq!(ordinals, vec![1, 2]);
    let names: Vec<&str> = author.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["id", "name"]);
}

#[tokio::test]
async fn repeated_passes_produce_equal_graphs() {
    let introspector = pg_all_schemas();
    let mut first = author_book_connection();
    let mut second = author_book_connection();

    let a = introspector.introspect(&mut first).await.unwrap();
    let b = introspector.introspect(&mut second).await.unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn similar_references_counted_per_target_table() {
    let mut conn = MockConnection::new()
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
                column_row("author", "id", 1, "int4", false, false),
                column_row("book", "id", 1, "int4", false, false),
                column_row("book", "author_id", 2, "int4", false, false),
                column_row("book", "co_author_id", 3, "int4", false, true),
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
            vec![
                vec![
                    v("public"),
                    v("book"),
                    v("book_author_id_fkey"),
                    v("author_id"),
                    v(1),
                    v("public"),
                    v("author_pkey"),
                ],
                vec![
                    v("public"),
                    v("book"),
                    v("book_co_author_id_fkey"),
                    v("co_author_id"),
                    v(1),
                    v("public"),
                    v("author_pkey"),
                ],
            ],
        );
    let graph = pg_all_schemas().introspect(&mut conn).await.unwrap();

    let book = graph.table_by_name("public", "book").unwrap();
    assert_eq!(book.foreign_keys.len(), 2);
    for fk in &book.foreign_keys {
        assert_eq!(graph.count_similar_references(fk), 2);
    }
}

#[tokio::test]
async fn enum_label_order_is_preserved() {
    let mut conn = author_book_connection();
    let graph = pg_all_schemas().introspect(&mut conn).await.unwrap();

    assert_eq!(graph.enums().len(), 1);
    let mood = &graph.enums()[0];
    assert_eq!(mood.name, "mood");
    assert_eq!(mood.labels, vec!["LOW", "MEDIUM", "HIGH"]);
}

#[tokio::test]
async fn dangling_foreign_key_is_dropped_not_fatal() {
    // The referenced key lives in a schema outside the pass.
    let mut conn = MockConnection::new()
        .on(&["FROM pg_catalog.pg_namespace"], vec![vec![v("public")]])
        .on(
            &["pg_get_viewdef"],
            vec![vec![v("public"), v("book"), v("r"), NULL, NULL]],
        )
        .on(
            &["FROM information_schema.columns"],
            vec![
                column_row("book", "id", 1, "int4", false, false),
                column_row("book", "author_id", 2, "int4", false, false),
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
                v("archive"),
                v("author_pkey"),
            ]],
        );
    let graph = pg_all_schemas().introspect(&mut conn).await.unwrap();

    let book = graph.table_by_name("public", "book").unwrap();
    assert!(book.foreign_keys.is_empty());
}

#[tokio::test]
async fn multi_parent_inheritance_is_skipped() {
    let mut conn = MockConnection::new()
        .on(&["FROM pg_catalog.pg_namespace"], vec![vec![v("public")]])
        .on(
            &["pg_get_viewdef"],
            vec![
                vec![v("public"), v("cities"), v("r"), NULL, NULL],
                vec![v("public"), v("capitals"), v("r"), NULL, NULL],
                vec![v("public"), v("landmarks"), v("r"), NULL, NULL],
            ],
        )
        .on(
            &["pg_inherits"],
            vec![
                vec![v("public"), v("capitals"), v("public"), v("cities")],
                vec![v("public"), v("capitals"), v("public"), v("landmarks")],
            ],
        );
    let graph = pg_all_schemas().introspect(&mut conn).await.unwrap();

    let capitals = graph.table_by_name("public", "capitals").unwrap();
    assert_eq!(capitals.parent, None);
    let cities = graph.table_by_name("public", "cities").unwrap();
    assert!(cities.children.is_empty());
}

#[tokio::test]
async fn single_parent_inheritance_is_linked_both_ways() {
    let mut conn = MockConnection::new()
        .on(&["FROM pg_catalog.pg_namespace"], vec![vec![v("public")]])
        .on(
            &["pg_get_viewdef"],
            vec![
                vec![v("public"), v("cities"), v("r"), NULL, NULL],
                vec![v("public"), v("capitals"), v("r"), NULL, NULL],
            ],
        )
        .on(
            &["pg_inherits"],
            vec![vec![v("public"), v("capitals"), v("public"), v("cities")]],
        );
    let graph = pg_all_schemas().introspect(&mut conn).await.unwrap();

    let cities_id = graph.table_id("public", "cities").unwrap();
    let capitals_id = graph.table_id("public", "capitals").unwrap();
    assert_eq!(graph.table(capitals_id).parent, Some(cities_id));
    assert_eq!(graph.table(cities_id).children, vec![capitals_id]);
}

#[tokio::test]
async fn expression_index_is_skipped_whole() {
    let mut conn = MockConnection::new()
        .on(&["FROM pg_catalog.pg_namespace"], vec![vec![v("public")]])
        .on(
            &["pg_get_viewdef"],
            vec![vec![v("public"), v("book"), v("r"), NULL, NULL]],
        )
        .on(
            &["FROM information_schema.columns"],
            vec![
                column_row("book", "id", 1, "int4", false, false),
                column_row("book", "title", 2, "varchar", false, true),
            ],
        )
        .on(
            &["pg_index"],
            vec![
                // lower(title): the expression element reports no column.
                vec![
                    v("public"),
                    v("book"),
                    v("book_lower_title_idx"),
                    v(false),
                    NULL,
                    v(1),
                    v(false),
                ],
                vec![
                    v("public"),
                    v("book"),
                    v("book_title_idx"),
                    v(true),
                    v("title"),
                    v(1),
                    v(false),
                ],
            ],
        );
    let graph = pg_all_schemas().introspect(&mut conn).await.unwrap();

    let book = graph.table_by_name("public", "book").unwrap();
    assert_eq!(book.indexes.len(), 1);
    assert_eq!(book.indexes[0].name, "book_title_idx");
    assert!(book.indexes[0].unique);
    assert_eq!(book.indexes[0].columns.len(), 1);
    assert_eq!(book.indexes[0].columns[0].ordinal, 1);
}

#[tokio::test]
async fn foreign_key_column_count_mismatch_is_fatal() {
    let mut conn = MockConnection::new()
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
                column_row("author", "tenant", 1, "int4", false, false),
                column_row("author", "id", 2, "int4", false, false),
                column_row("book", "id", 1, "int4", false, false),
                column_row("book", "author_id", 2, "int4", false, false),
            ],
        )
        .on(
            &["constraint_type = 'PRIMARY KEY'"],
            vec![
                vec![v("public"), v("author"), v("author_pkey"), v("tenant"), v(1)],
                vec![v("public"), v("author"), v("author_pkey"), v("id"), v(2)],
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
        );

    let err = pg_all_schemas().introspect(&mut conn).await.unwrap_err();
    assert!(matches!(err, ReflectError::Structural(_)));
}

#[tokio::test]
async fn catalog_query_failure_aborts_the_pass() {
    let mut conn = MockConnection::new()
        .on(&["FROM pg_catalog.pg_namespace"], vec![vec![v("public")]])
        .fail_on(&["pg_get_viewdef"], "permission denied for pg_class");

    let err = pg_all_schemas().introspect(&mut conn).await.unwrap_err();
    match err {
        ReflectError::Catalog {
            dialect,
            kind,
            message,
        } => {
            assert_eq!(dialect, Dialect::Postgres);
            assert_eq!(kind.to_string(), "tables");
            assert!(message.contains("permission denied"));
        }
        other => panic!("expected Catalog error, got {other:?}"),
    }
}

#[tokio::test]
async fn capability_probe_is_memoized() {
    let mut conn = MockConnection::new();
    {
        let mut session = Session::new(&mut conn, Dialect::Postgres, vec![]);
        let canary = "select count(*) over () from pg_catalog.pg_class limit 1";
        assert!(session.probe(Capability::WindowFunctions, canary).await);
        assert!(session.probe(Capability::WindowFunctions, canary).await);
        assert!(session.probe(Capability::WindowFunctions, canary).await);
    }
    assert_eq!(conn.executed("count(*) over ()"), 1);
}

#[tokio::test]
async fn failed_probe_selects_degraded_sequence_query() {
    let mut conn = MockConnection::new()
        .on(&["FROM pg_catalog.pg_namespace"], vec![vec![v("public")]])
        .fail_on(&["seqrelid", "limit 1"], "relation pg_sequence does not exist")
        .on(
            &["information_schema.sequences"],
            vec![vec![
                v("public"),
                v("invoice_seq"),
                v("bigint"),
                v("100"),
                v("1"),
                v("1"),
                v(i64::MAX.to_string()),
                v("NO"),
            ]],
        );
    let graph = pg_all_schemas().introspect(&mut conn).await.unwrap();

    assert_eq!(conn.executed("information_schema.sequences"), 1);
    assert_eq!(graph.sequences().len(), 1);
    let seq = &graph.sequences()[0];
    assert_eq!(seq.name, "invoice_seq");
    assert_eq!(seq.start, Some(100));
    // Everything else sat at the database default.
    assert_eq!(seq.increment, None);
    assert_eq!(seq.min, None);
    assert_eq!(seq.max, None);
    assert!(!seq.cycle);
}

#[tokio::test]
async fn sequence_defaults_normalize_to_none() {
    let mut conn = author_book_connection();
    let graph = pg_all_schemas().introspect(&mut conn).await.unwrap();

    assert_eq!(graph.sequences().len(), 1);
    let seq = &graph.sequences()[0];
    assert_eq!(seq.name, "author_id_seq");
    assert_eq!(seq.start, None);
    assert_eq!(seq.increment, None);
    assert_eq!(seq.min, None);
    assert_eq!(seq.max, None);
}

#[tokio::test]
async fn configured_schema_order_is_preserved() {
    let mut conn = MockConnection::new().on(
        &["FROM pg_catalog.pg_namespace"],
        vec![vec![v("audit")], vec![v("billing")]],
    );
    let introspector = introspector(IntrospectConfig::new(
        "postgres",
        vec!["billing".to_string(), "audit".to_string()],
    ));
    let graph = introspector.introspect(&mut conn).await.unwrap();

    let names: Vec<&str> = graph.schemas().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["billing", "audit"]);
}

#[tokio::test]
async fn missing_requested_schema_is_skipped() {
    let mut conn = MockConnection::new().on(
        &["FROM pg_catalog.pg_namespace"],
        vec![vec![v("public")]],
    );
    let introspector = introspector(IntrospectConfig::new(
        "postgres",
        vec!["public".to_string(), "missing".to_string()],
    ));
    let graph = introspector.introspect(&mut conn).await.unwrap();

    let names: Vec<&str> = graph.schemas().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["public"]);
}

#[tokio::test]
async fn duplicate_table_kinds_tie_break_by_priority() {
    let mut conn = MockConnection::new()
        .on(&["FROM pg_catalog.pg_namespace"], vec![vec![v("public")]])
        .on(
            &["pg_get_viewdef"],
            vec![
                vec![v("public"), v("stats"), v("v"), v("select 1"), NULL],
                vec![v("public"), v("stats"), v("r"), NULL, NULL],
            ],
        );
    let graph = pg_all_schemas().introspect(&mut conn).await.unwrap();

    assert_eq!(graph.tables().len(), 1);
    assert_eq!(graph.tables()[0].kind, TableKind::Table);
}

#[tokio::test]
async fn table_filter_excludes_table_and_its_references() {
    let mut conn = author_book_connection();
    let mut config = IntrospectConfig::new("postgres", vec![]);
    config.filters.tables.exclude = Some("book".to_string());
    let graph = introspector(config).introspect(&mut conn).await.unwrap();

    assert_eq!(graph.tables().len(), 1);
    let author = graph.table_by_name("public", "author").unwrap();
    // The excluded table's foreign key vanished with it; nothing dangles.
    let pk = author.primary_key().unwrap();
    assert!(graph.referencing_foreign_keys(pk).is_empty());
}

#[tokio::test]
async fn set_returning_functions_surface_as_table_functions() {
    let mut conn = MockConnection::new()
        .on(&["FROM pg_catalog.pg_namespace"], vec![vec![v("public")]])
        .on(
            &["proretset"],
            vec![vec![v("public"), v("active_books"), NULL]],
        );
    let graph = pg_all_schemas().introspect(&mut conn).await.unwrap();

    let tvf = graph.table_by_name("public", "active_books").unwrap();
    assert_eq!(tvf.kind, TableKind::TableFunction);
    assert!(tvf.columns.is_empty());
}

#[tokio::test]
async fn routine_overloads_follow_specific_name_order() {
    let mut conn = MockConnection::new()
        .on(&["FROM pg_catalog.pg_namespace"], vec![vec![v("public")]])
        .on(
            &["prokind"],
            vec![
                vec![v("public"), v("area"), v("area_201"), v("f"), v("numeric")],
                vec![v("public"), v("area"), v("area_105"), v("f"), v("numeric")],
                vec![v("public"), v("mean"), v("mean_300"), v("a"), v("numeric")],
                vec![v("public"), v("log_event"), v("log_event_42"), v("p"), NULL],
            ],
        );
    let graph = pg_all_schemas().introspect(&mut conn).await.unwrap();

    let area: Vec<_> = graph
        .routines()
        .iter()
        .filter(|r| r.name == "area")
        .collect();
    assert_eq!(area.len(), 2);
    // Specific-name string order, not declaration order.
    assert_eq!(area[0].specific_name, "area_105");
    assert_eq!(area[0].overload, Some(1));
    assert_eq!(area[1].specific_name, "area_201");
    assert_eq!(area[1].overload, Some(2));

    let mean = graph.routines().iter().find(|r| r.name == "mean").unwrap();
    assert!(mean.aggregate);
    assert_eq!(mean.overload, None);

    let log_event = graph
        .routines()
        .iter()
        .find(|r| r.name == "log_event")
        .unwrap();
    assert_eq!(log_event.kind, dbreflect::RoutineKind::Procedure);
    assert!(log_event.return_type.is_none());
}
