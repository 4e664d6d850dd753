// Integration tests for the migration framework

use rusqlite::Connection;

fn setup_test_db() -> Connection {
    Connection::open_in_memory().expect("Failed to create in-memory database")
}

fn get_table_names(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
        .unwrap();
    stmt.query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap()
}

#[test]
fn test_apply_migrations_on_empty_db() {
    // Given: An empty SQLite database
    let mut conn = setup_test_db();

    // When: Migrations are applied
    let result = filevault_store::migrations::apply_migrations(&mut conn);

    // Then: They succeed and create exactly the expected tables
    assert!(result.is_ok(), "Migrations should succeed: {:?}", result.err());
    assert_eq!(
        get_table_names(&conn),
        vec!["file_records".to_string(), "schema_version".to_string()]
    );
}

#[test]
fn test_migration_idempotency() {
    // Given: A database with migrations already applied
    let mut conn = setup_test_db();
    filevault_store::migrations::apply_migrations(&mut conn).unwrap();

    // When: Migrations are applied again
    let result = filevault_store::migrations::apply_migrations(&mut conn);

    // Then: Nothing is re-applied
    assert!(result.is_ok());
    let version_count: i64 = conn
        .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version_count, 1);
}

#[test]
fn test_negative_content_size_rejected_by_schema() {
    // Given: A migrated database
    let mut conn = setup_test_db();
    filevault_store::migrations::apply_migrations(&mut conn).unwrap();

    // When: A row with a negative size is inserted directly
    let result = conn.execute(
        "INSERT INTO file_records (id, name, mime_type, external_id, content_size, creation_time)
         VALUES ('r1', 'a', 'text/plain', NULL, -1, 0)",
        [],
    );

    // Then: The CHECK constraint refuses it
    assert!(result.is_err());
}

#[test]
fn test_external_id_is_unique() {
    // Given: A migrated database with one record
    let mut conn = setup_test_db();
    filevault_store::migrations::apply_migrations(&mut conn).unwrap();
    conn.execute(
        "INSERT INTO file_records (id, name, mime_type, external_id, content_size, creation_time)
         VALUES ('r1', 'a', 'text/plain', 'blob-1', 1, 0)",
        [],
    )
    .unwrap();

    // When: A second record points at the same blob
    let result = conn.execute(
        "INSERT INTO file_records (id, name, mime_type, external_id, content_size, creation_time)
         VALUES ('r2', 'b', 'text/plain', 'blob-1', 1, 0)",
        [],
    );

    // Then: It is rejected
    assert!(result.is_err());
}
