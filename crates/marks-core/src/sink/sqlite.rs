//! SQLite-backed record sink.

use std::path::Path;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info, warn};

use super::{RecordSink, SubjectInsertReport};
use crate::error::PersistenceError;
use crate::models::record::{FieldName, ScalarFields, SubjectRecord, TextSource};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS students (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    register_number TEXT NOT NULL,
    mother_name TEXT,
    guardian_name TEXT,
    school_name TEXT,
    source TEXT NOT NULL,
    extracted_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS subject_marks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    student_id INTEGER NOT NULL REFERENCES students(id) ON DELETE CASCADE,
    subject_code TEXT,
    subject_name TEXT NOT NULL CHECK (length(subject_name) > 0),
    theory INTEGER,
    practical INTEGER,
    total INTEGER NOT NULL CHECK (total >= 0),
    total_in_words TEXT,
    grade TEXT
);
CREATE INDEX IF NOT EXISTS idx_subject_marks_student ON subject_marks (student_id);
";

const INSERT_STUDENT: &str = "INSERT INTO students
    (name, register_number, mother_name, guardian_name, school_name, source, extracted_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";

const INSERT_SUBJECT: &str = "INSERT INTO subject_marks
    (student_id, subject_code, subject_name, theory, practical, total, total_in_words, grade)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";

/// Sink writing to a SQLite database. The connection closes on drop.
pub struct SqliteSink {
    conn: Connection,
}

impl SqliteSink {
    /// Open (or create) the database file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        info!("Opened database {}", path.display());
        Self::with_connection(conn)
    }

    /// Private in-memory database.
    pub fn open_in_memory() -> Result<Self, PersistenceError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, PersistenceError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    /// Number of stored students.
    pub fn student_count(&self) -> Result<i64, PersistenceError> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM students", [], |row| row.get(0))?)
    }

    /// Register number stored for a student.
    pub fn register_number(&self, student_id: i64) -> Result<Option<String>, PersistenceError> {
        Ok(self
            .conn
            .query_row(
                "SELECT register_number FROM students WHERE id = ?1",
                params![student_id],
                |row| row.get(0),
            )
            .optional()?)
    }

    /// Subject rows for a student in insertion order.
    pub fn subjects(&self, student_id: i64) -> Result<Vec<SubjectRecord>, PersistenceError> {
        let mut stmt = self.conn.prepare(
            "SELECT subject_code, subject_name, theory, practical, total, total_in_words, grade
             FROM subject_marks WHERE student_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![student_id], |row| {
            Ok(SubjectRecord {
                code: row.get(0)?,
                name: row.get(1)?,
                theory: row.get(2)?,
                practical: row.get(3)?,
                total: row.get(4)?,
                total_in_words: row.get(5)?,
                grade: row.get(6)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

impl RecordSink for SqliteSink {
    fn ensure_schema(&mut self) -> Result<(), PersistenceError> {
        self.conn.execute_batch(SCHEMA)?;
        debug!("Schema ready");
        Ok(())
    }

    fn insert_student(
        &mut self,
        scalars: &ScalarFields,
        source: TextSource,
    ) -> Result<i64, PersistenceError> {
        self.conn.execute(
            INSERT_STUDENT,
            params![
                scalars.get(FieldName::StudentName),
                scalars.get(FieldName::RegisterNumber),
                scalars.known(FieldName::MotherName),
                scalars.known(FieldName::GuardianName),
                scalars.known(FieldName::SchoolName),
                source.as_str(),
                Utc::now().to_rfc3339(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!("Inserted student {}", id);
        Ok(id)
    }

    fn insert_subjects(
        &mut self,
        student_id: i64,
        subjects: &[SubjectRecord],
    ) -> Result<SubjectInsertReport, PersistenceError> {
        let mut report = SubjectInsertReport::default();
        // Nests inside the document transaction when one is open.
        let mut batch = self.conn.savepoint()?;

        for subject in subjects {
            // A failed row rolls back only its own savepoint.
            let sp = batch.savepoint()?;
            let result = sp.execute(
                INSERT_SUBJECT,
                params![
                    student_id,
                    subject.code,
                    subject.name,
                    subject.theory,
                    subject.practical,
                    subject.total,
                    subject.total_in_words,
                    subject.grade,
                ],
            );
            match result {
                Ok(_) => {
                    sp.commit()?;
                    report.inserted += 1;
                }
                Err(e) => {
                    warn!("Failed to insert subject {:?}: {}", subject.identifier(), e);
                    report.failed += 1;
                }
            }
        }

        batch.commit()?;
        Ok(report)
    }

    fn begin(&mut self) -> Result<(), PersistenceError> {
        self.conn.execute_batch("BEGIN")?;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), PersistenceError> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), PersistenceError> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("ROLLBACK")?;
            debug!("Rolled back document");
        }
        Ok(())
    }
}
