//! Member repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `members` table.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `Member::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - `list_members` order (`id ASC`) is the batch enumeration order.

use crate::db::{ensure_ready, DbError};
use crate::model::level::Level;
use crate::model::member::{Member, MemberId, MemberValidationError};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const MEMBER_SELECT_SQL: &str = "SELECT
    id,
    name,
    password,
    level,
    login_count,
    recommend_count,
    email
FROM members";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for member persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(MemberValidationError),
    Db(DbError),
    NotFound(MemberId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "member not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted member data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<MemberValidationError> for RepoError {
    fn from(value: MemberValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence contract for members.
pub trait MemberRepository {
    fn add_member(&self, member: &Member) -> RepoResult<()>;
    fn get_member(&self, id: &str) -> RepoResult<Option<Member>>;
    /// Returns every member ordered by id.
    fn list_members(&self) -> RepoResult<Vec<Member>>;
    /// Overwrites the stored row for `member.id`.
    fn update_member(&self, member: &Member) -> RepoResult<()>;
    /// Removes every member and returns the number of removed rows.
    fn delete_all(&self) -> RepoResult<usize>;
    fn count(&self) -> RepoResult<usize>;
}

/// SQLite-backed member repository.
///
/// Borrows a connection (or a transaction scope's connection), so writes made
/// through it belong to whatever transaction the caller has open.
pub struct SqliteMemberRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMemberRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_ready(conn, &["members"])?;
        Ok(Self { conn })
    }
}

impl MemberRepository for SqliteMemberRepository<'_> {
    fn add_member(&self, member: &Member) -> RepoResult<()> {
        member.validate()?;

        self.conn.execute(
            "INSERT INTO members (
                id,
                name,
                password,
                level,
                login_count,
                recommend_count,
                email
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                member.id.as_str(),
                member.name.as_str(),
                member.password.as_str(),
                member.level().to_db(),
                member.login_count,
                member.recommend_count,
                member.email.as_str(),
            ],
        )?;

        Ok(())
    }

    fn get_member(&self, id: &str) -> RepoResult<Option<Member>> {
        let row = self
            .conn
            .query_row(
                &format!("{MEMBER_SELECT_SQL} WHERE id = ?1;"),
                [id],
                |row| Ok(parse_member_row(row)),
            )
            .optional()?;

        row.transpose()
    }

    fn list_members(&self) -> RepoResult<Vec<Member>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MEMBER_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut members = Vec::new();

        while let Some(row) = rows.next()? {
            members.push(parse_member_row(row)?);
        }

        Ok(members)
    }

    fn update_member(&self, member: &Member) -> RepoResult<()> {
        member.validate()?;

        let changed = self.conn.execute(
            "UPDATE members
             SET
                name = ?1,
                password = ?2,
                level = ?3,
                login_count = ?4,
                recommend_count = ?5,
                email = ?6
             WHERE id = ?7;",
            params![
                member.name.as_str(),
                member.password.as_str(),
                member.level().to_db(),
                member.login_count,
                member.recommend_count,
                member.email.as_str(),
                member.id.as_str(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(member.id.clone()));
        }

        Ok(())
    }

    fn delete_all(&self) -> RepoResult<usize> {
        Ok(self.conn.execute("DELETE FROM members;", [])?)
    }

    fn count(&self) -> RepoResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM members;", [], |row| row.get(0))?;
        usize::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative member count `{count}`")))
    }
}

fn parse_member_row(row: &Row<'_>) -> RepoResult<Member> {
    let id: String = row.get("id")?;

    let level_value: i64 = row.get("level")?;
    let level = Level::from_db(level_value).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid level `{level_value}` in members.level for `{id}`"
        ))
    })?;

    let member = Member::restore(
        id,
        row.get::<_, String>("name")?,
        row.get::<_, String>("password")?,
        row.get::<_, String>("email")?,
        level,
    )
    .with_counts(row.get("login_count")?, row.get("recommend_count")?);

    member.validate()?;
    Ok(member)
}
