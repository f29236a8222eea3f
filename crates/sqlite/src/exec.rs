//! Execution of scripts holding any number of statements.
//!
//! [`run_script`] walks the script statement by statement and threads one flat parameter list
//! through all of them: every statement consumes as many parameters as it has slots, in source
//! order. The typed helpers on [`Connection`] are built on top of it.

use std::ops::ControlFlow;
use std::path::Path;

use crate::{Bindable, Connection, Error, Extractable, Result, Row};

/// A result shape that can be filled from a row, column by column.
///
/// Implemented for every [`Extractable`] type (filled from the first column) and for tuples of
/// them (filled positionally). Columns beyond the row's column count are skipped, fields without a
/// matching column keep their current value.
pub trait FromRow {
    fn assign(&mut self, row: &Row<'_>) -> Result<()>;
}

impl<T: Extractable> FromRow for T {
    fn assign(&mut self, row: &Row<'_>) -> Result<()> {
        if row.column_count()? > 0 {
            *self = row.get(0)?;
        }

        Ok(())
    }
}

macro_rules! tuple_from_row {
    ($(($($field:ident $index:tt),+))+) => {
        $(
            impl<$($field: Extractable),+> FromRow for ($($field,)+) {
                fn assign(&mut self, row: &Row<'_>) -> Result<()> {
                    let count = row.column_count()?;
                    $(
                        if $index < count {
                            self.$index = row.get($index)?;
                        }
                    )+
                    Ok(())
                }
            }
        )+
    };
}

tuple_from_row! {
    (A 0)
    (A 0, B 1)
    (A 0, B 1, C 2)
    (A 0, B 1, C 2, D 3)
    (A 0, B 1, C 2, D 3, E 4)
    (A 0, B 1, C 2, D 3, E 4, F 5)
    (A 0, B 1, C 2, D 3, E 4, F 5, G 6)
    (A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7)
    (A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8)
    (A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9)
    (A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9, K 10)
    (A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9, K 10, L 11)
}

/// Runs every statement in `sql` in order.
///
/// Each statement binds the next `bind_parameter_count` entries of `params` to its slots 1..n,
/// binding stops early when `params` runs out. `on_row` is called for every row any statement
/// produces, returning [`ControlFlow::Break`] stops the script right away.
///
/// A failing statement aborts the script, statements that already ran are not rolled back.
pub fn run_script<F>(conn: &Connection, sql: &str, params: &[&dyn Bindable], mut on_row: F) -> Result<ControlFlow<()>>
where
    F: FnMut(&Row<'_>) -> Result<ControlFlow<()>>,
{
    if !conn.is_open() {
        return Err(Error::InvalidArgument("connection".to_string()));
    }

    let mut params = params.iter();
    let mut rest = sql;
    while !rest.is_empty() {
        let (mut stmt, tail) = conn.prepare(rest)?;
        if tail.len() == rest.len() {
            // the engine stops at a nul byte without consuming it
            return Err(Error::InvalidArgument("sql contains a nul byte".to_string()));
        }
        rest = tail;

        if !stmt.is_prepared() {
            continue;
        }

        let slots = stmt.bind_parameter_count()?;
        for (slot, param) in (1..=slots).zip(params.by_ref()) {
            stmt.bind(slot, *param)?;
        }

        while let Some(row) = stmt.next_row()? {
            if on_row(&row)?.is_break() {
                log::debug!("Script stopped by row callback");
                return Ok(ControlFlow::Break(()));
            }
        }

        stmt.finalize()?;
    }

    if params.len() > 0 {
        log::debug!("{} parameter(s) left unbound by script", params.len());
    }

    Ok(ControlFlow::Continue(()))
}

impl Connection {
    /// Runs the script, ignoring any rows it produces
    pub fn execute(&self, sql: &str, params: &[&dyn Bindable]) -> Result<()> {
        run_script(self, sql, params, |_| Ok(ControlFlow::Continue(())))?;
        Ok(())
    }

    pub fn execute_sql_file(&self, sql_path: &Path) -> Result<()> {
        let sql_contents =
            std::fs::read_to_string(sql_path).map_err(|e| Error::Runtime(format!("Failed to open sql file: {}", e)))?;
        self.execute(&sql_contents, &[])
    }

    /// Runs the script and returns a single result.
    ///
    /// Every row produced is assigned onto the same result, so when several rows come back the
    /// last one wins. Without any row the result keeps its default value.
    pub fn exec<R: FromRow + Default>(&self, sql: &str, params: &[&dyn Bindable]) -> Result<R> {
        let mut result = R::default();
        run_script(self, sql, params, |row| {
            result.assign(row)?;
            Ok(ControlFlow::Continue(()))
        })?;

        Ok(result)
    }

    /// Runs the script and returns one result per row produced
    pub fn vexec<R: FromRow + Default>(&self, sql: &str, params: &[&dyn Bindable]) -> Result<Vec<R>> {
        let mut results = Vec::new();
        run_script(self, sql, params, |row| {
            let mut result = R::default();
            result.assign(row)?;
            results.push(result);
            Ok(ControlFlow::Continue(()))
        })?;

        Ok(results)
    }

    /// Runs the script, handing every row to `on_row`.
    /// Returns [`ControlFlow::Break`] when the callback stopped the script early.
    pub fn exec_with<F>(&self, sql: &str, params: &[&dyn Bindable], on_row: F) -> Result<ControlFlow<()>>
    where
        F: FnMut(&Row<'_>) -> Result<ControlFlow<()>>,
    {
        run_script(self, sql, params, on_row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Null, StatusKind, params};

    const CHILDREN: i64 = 161;
    const EQUATOR: i64 = 40_071_875_498;
    const MERIDIAN: i64 = 40_007_862_917;
    const AREA: i64 = 510_072_675_965_685;

    fn earth() -> Result<Connection> {
        let conn = Connection::open_in_memory()?;
        conn.execute(
            r#"CREATE TABLE "table" (key TEXT PRIMARY KEY, value INTEGER);
               INSERT INTO "table" VALUES ('children', ?), ('equator', ?), ('meridian', ?), ('area', ?);"#,
            params![CHILDREN, EQUATOR, MERIDIAN, AREA],
        )?;
        Ok(conn)
    }

    #[test_log::test]
    fn test_exec_single_value() -> Result<()> {
        let conn = earth()?;
        let value: i64 = conn.exec(r#"SELECT value FROM "table" WHERE key = ?"#, params!["equator"])?;
        assert_eq!(value, EQUATOR);

        let value: Option<i64> = conn.exec(r#"SELECT value FROM "table" WHERE key = ?"#, params!["moon"])?;
        assert_eq!(value, None);
        Ok(())
    }

    #[test_log::test]
    fn test_exec_narrowing_failure_surfaces() -> Result<()> {
        let conn = earth()?;
        let result = conn.exec::<i32>(r#"SELECT value FROM "table" WHERE key = 'area'"#, &[]);
        assert!(matches!(result, Err(Error::Overflow(_))));

        let result = conn.exec::<u8>("SELECT -1", &[]);
        assert!(matches!(result, Err(Error::Underflow(_))));
        Ok(())
    }

    #[test_log::test]
    fn test_exec_null_string_is_empty() -> Result<()> {
        let conn = Connection::open_in_memory()?;
        let value: String = conn.exec("SELECT NULL", &[])?;
        assert_eq!(value, "");
        Ok(())
    }

    #[test_log::test]
    fn test_exec_tuple_with_fewer_columns_keeps_defaults() -> Result<()> {
        let conn = Connection::open_in_memory()?;
        let value: (i32, String, f64) = conn.exec("SELECT 7, 'seven'", &[])?;
        assert_eq!(value, (7, "seven".to_string(), 0.0));
        Ok(())
    }

    #[test_log::test]
    fn test_exec_last_row_wins() -> Result<()> {
        let conn = earth()?;
        let value: (String, i64) = conn.exec(r#"SELECT key, value FROM "table" ORDER BY value"#, &[])?;
        assert_eq!(value, ("area".to_string(), AREA));

        // a later, narrower row only overwrites the columns it has
        let value: (i32, i32) = conn.exec("SELECT 1, 2; SELECT 3", &[])?;
        assert_eq!(value, (3, 2));
        Ok(())
    }

    #[test_log::test]
    fn test_vexec_collects_every_row() -> Result<()> {
        let conn = earth()?;
        let rows: Vec<(String, i64)> = conn.vexec(
            r#"SELECT key, value FROM "table" WHERE value < ? ORDER BY value"#,
            params![MERIDIAN + 1],
        )?;

        assert_eq!(
            rows,
            vec![
                ("children".to_string(), CHILDREN),
                ("meridian".to_string(), MERIDIAN),
            ]
        );

        let rows: Vec<(i32, i32)> = conn.vexec("SELECT 1, 2; SELECT 3", &[])?;
        assert_eq!(rows, vec![(1, 2), (3, 0)]);
        Ok(())
    }

    #[test_log::test]
    fn test_parameters_are_consumed_across_statements() -> Result<()> {
        let conn = Connection::open_in_memory()?;
        conn.execute(
            "CREATE TABLE a (x INTEGER);
             CREATE TABLE b (y INTEGER, z INTEGER);
             INSERT INTO a VALUES (?);
             INSERT INTO b VALUES (?, ?);",
            params![10, 20, 30],
        )?;

        assert_eq!(conn.exec::<i32>("SELECT x FROM a", &[])?, 10);
        assert_eq!(conn.exec::<(i32, i32)>("SELECT y, z FROM b", &[])?, (20, 30));
        Ok(())
    }

    #[test_log::test]
    fn test_missing_parameters_stay_null() -> Result<()> {
        let conn = Connection::open_in_memory()?;
        let value: (Option<i32>, Option<i32>) = conn.exec("SELECT ?, ?", params![5])?;
        assert_eq!(value, (Some(5), None));

        let value: Option<String> = conn.exec("SELECT ?", params![Null, "unused"])?;
        assert_eq!(value, None);
        Ok(())
    }

    #[test_log::test]
    fn test_exec_with_aborts() -> Result<()> {
        let conn = earth()?;

        let mut values = Vec::new();
        let flow = conn.exec_with(r#"SELECT value FROM "table" ORDER BY value"#, &[], |row| {
            values.push(row.get::<i64>(0)?);
            Ok(ControlFlow::Break(()))
        })?;
        assert!(flow.is_break());
        assert_eq!(values, vec![CHILDREN]);

        let mut names = Vec::new();
        let flow = conn.exec_with(r#"SELECT key AS name FROM "table" WHERE key = 'children'"#, &[], |row| {
            assert_eq!(row.column_count()?, 1);
            names.push(row.column_name(0)?.to_string());
            Ok(ControlFlow::Continue(()))
        })?;
        assert!(flow.is_continue());
        assert_eq!(names, vec!["name".to_string()]);
        Ok(())
    }

    #[test_log::test]
    fn test_script_failure_keeps_completed_statements() -> Result<()> {
        let conn = Connection::open_in_memory()?;
        let err = conn
            .execute(
                "CREATE TABLE t (x INTEGER UNIQUE); INSERT INTO t VALUES (1); INSERT INTO t VALUES (1); INSERT INTO t VALUES (2);",
                &[],
            )
            .expect_err("unique violation");
        assert_eq!(err.status_kind(), Some(StatusKind::ConstraintUnique));

        let rows: Vec<i32> = conn.vexec("SELECT x FROM t", &[])?;
        assert_eq!(rows, vec![1]);
        Ok(())
    }

    #[test_log::test]
    fn test_script_with_comments_and_blank_statements() -> Result<()> {
        let conn = Connection::open_in_memory()?;
        let value: i32 = conn.exec("-- leading comment\n;; SELECT 42; /* trailing */ ", &[])?;
        assert_eq!(value, 42);
        Ok(())
    }

    #[test_log::test]
    fn test_script_with_nul_byte_is_rejected() -> Result<()> {
        let conn = Connection::open_in_memory()?;
        assert!(matches!(conn.execute("SELECT 1;\0SELECT 2", &[]), Err(Error::InvalidArgument(_))));
        Ok(())
    }

    #[test_log::test]
    fn test_execute_sql_file() -> Result<()> {
        let tmp = tempfile::TempDir::new()?;
        let sql_path = tmp.path().join("schema.sql");
        std::fs::write(&sql_path, "CREATE TABLE t (x); INSERT INTO t VALUES ('file');")?;

        let conn = Connection::open_in_memory()?;
        conn.execute_sql_file(&sql_path)?;
        assert_eq!(conn.exec::<String>("SELECT x FROM t", &[])?, "file");

        assert!(matches!(
            conn.execute_sql_file(&tmp.path().join("missing.sql")),
            Err(Error::Runtime(_))
        ));
        Ok(())
    }
}
