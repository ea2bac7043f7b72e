//! Employee directory persistence for local runs.
//!
//! # Invariants
//! - `upsert_employee` replaces the full role set in one transaction.
//! - Listing sorts only by whitelisted columns; ties break on `uuid ASC` so
//!   pages are stable.

use crate::model::employee::{Employee, RoleTag, StaffId};
use crate::repo::{parse_uuid, RepoError, RepoResult};
use crate::service::wire::{PageRequest, SortDir};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeSet;

pub trait EmployeeRepository {
    fn upsert_employee(&self, employee: &Employee) -> RepoResult<()>;
    fn get_employee(&self, id: StaffId) -> RepoResult<Option<Employee>>;
    /// Returns one page and the total row count.
    fn list_employees(&self, request: &PageRequest) -> RepoResult<(Vec<Employee>, u64)>;
}

pub struct SqliteEmployeeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEmployeeRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl EmployeeRepository for SqliteEmployeeRepository<'_> {
    fn upsert_employee(&self, employee: &Employee) -> RepoResult<()> {
        let uuid = employee.id.to_string();
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO employees (uuid, full_name, email) VALUES (?1, ?2, ?3)
             ON CONFLICT(uuid) DO UPDATE SET full_name = excluded.full_name, email = excluded.email;",
            params![uuid, employee.full_name, employee.email],
        )?;
        tx.execute("DELETE FROM employee_roles WHERE employee_uuid = ?1;", [&uuid])?;
        for role in &employee.roles {
            tx.execute(
                "INSERT INTO employee_roles (employee_uuid, role) VALUES (?1, ?2);",
                params![uuid, role.as_str()],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn get_employee(&self, id: StaffId) -> RepoResult<Option<Employee>> {
        let row = self
            .conn
            .query_row(
                "SELECT uuid, full_name, email FROM employees WHERE uuid = ?1;",
                [id.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((uuid, full_name, email)) => {
                let mut employee =
                    Employee::new(parse_uuid(&uuid, "employees.uuid")?, full_name, email);
                employee.roles = load_roles(self.conn, &uuid)?;
                Ok(Some(employee))
            }
            None => Ok(None),
        }
    }

    fn list_employees(&self, request: &PageRequest) -> RepoResult<(Vec<Employee>, u64)> {
        let column = sort_column(&request.sort_by)?;
        let direction = match request.sort_dir {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        };
        let total: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM employees;", [], |row| row.get(0))?;

        let mut stmt = self.conn.prepare(&format!(
            "SELECT uuid, full_name, email FROM employees
             ORDER BY {column} {direction}, uuid ASC
             LIMIT ?1 OFFSET ?2;"
        ))?;
        let offset = i64::from(request.page) * i64::from(request.size);
        let mut rows = stmt.query(params![i64::from(request.size), offset])?;

        let mut employees = Vec::new();
        while let Some(row) = rows.next()? {
            let uuid: String = row.get(0)?;
            let full_name: String = row.get(1)?;
            let email: String = row.get(2)?;
            let mut employee = Employee::new(parse_uuid(&uuid, "employees.uuid")?, full_name, email);
            employee.roles = load_roles(self.conn, &uuid)?;
            employees.push(employee);
        }

        Ok((employees, u64::try_from(total).unwrap_or_default()))
    }
}

pub(crate) fn load_roles(conn: &Connection, employee_uuid: &str) -> RepoResult<BTreeSet<RoleTag>> {
    let mut stmt =
        conn.prepare("SELECT role FROM employee_roles WHERE employee_uuid = ?1 ORDER BY role;")?;
    let roles = stmt
        .query_map([employee_uuid], |row| row.get::<_, String>(0))?
        .map(|role| role.map(RoleTag::new))
        .collect::<Result<BTreeSet<_>, _>>()?;
    Ok(roles)
}

fn sort_column(sort_by: &str) -> RepoResult<&'static str> {
    match sort_by.trim() {
        "fullName" | "full_name" | "name" => Ok("full_name COLLATE NOCASE"),
        "email" => Ok("email COLLATE NOCASE"),
        "id" | "uuid" => Ok("uuid"),
        other => Err(RepoError::InvalidQuery(format!(
            "unsupported employee sort field `{other}`"
        ))),
    }
}
