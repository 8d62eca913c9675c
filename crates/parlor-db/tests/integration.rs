use parlor_db::{init_schema, ConnectionState, DbSettings, RequestContext, SCHEMA};

#[test]
fn init_schema_then_close_releases_the_store() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let db_path = dir.path().join("test.db");
    assert!(!db_path.exists());

    let settings = DbSettings::new(db_path.to_string_lossy());
    let mut ctx = RequestContext::new();

    let conn = ctx.get_connection(&settings).expect("failed to open store");
    init_schema(conn, SCHEMA).expect("failed to apply schema");

    assert!(db_path.exists(), "store file should exist after init");

    let mut stmt = conn
        .prepare(
            "SELECT name FROM sqlite_master
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
             ORDER BY name",
        )
        .expect("failed to prepare table query");
    let tables: Vec<String> = stmt
        .query_map([], |row| row.get(0))
        .expect("failed to query tables")
        .map(|r| r.expect("failed to read table name"))
        .collect();
    drop(stmt);

    assert_eq!(tables, vec!["messages", "users"]);

    ctx.close_connection();
    assert_eq!(ctx.state(), ConnectionState::Closed);

    // No live handle remains: the file can be removed out from under us.
    std::fs::remove_file(&db_path).expect("store file should not be held open");
}

#[test]
fn fresh_context_opens_a_fresh_connection() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let settings = DbSettings::new(dir.path().join("test.db").to_string_lossy());

    let mut first = RequestContext::new();
    first
        .get_connection(&settings)
        .expect("failed to open store")
        .execute_batch("CREATE TEMP TABLE probe (id INTEGER);")
        .expect("failed to create temp table");
    first.close_connection();

    // A new context never sees the old context's connection-local state.
    let mut second = RequestContext::new();
    let count: i64 = second
        .get_connection(&settings)
        .expect("failed to open store")
        .query_row(
            "SELECT COUNT(*) FROM sqlite_temp_master WHERE name = 'probe'",
            [],
            |row| row.get(0),
        )
        .expect("failed to query temp master");

    assert_eq!(count, 0, "fresh context should hold a fresh connection");
}

#[test]
fn rows_are_addressable_by_position_and_name() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let settings = DbSettings::new(dir.path().join("test.db").to_string_lossy());

    let mut ctx = RequestContext::new();
    let conn = ctx.get_connection(&settings).expect("failed to open store");
    init_schema(conn, SCHEMA).expect("failed to apply schema");

    conn.execute(
        "INSERT INTO users (username, password_hash) VALUES ('casey', 'x$y')",
        [],
    )
    .expect("failed to insert user");

    let (by_index, by_name): (String, String) = conn
        .query_row("SELECT username FROM users", [], |row| {
            Ok((row.get(0)?, row.get("username")?))
        })
        .expect("failed to read user row");

    assert_eq!(by_index, "casey");
    assert_eq!(by_name, "casey");
}
