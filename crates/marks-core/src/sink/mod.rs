//! Persistence sinks for extracted records.

mod sqlite;

pub use sqlite::SqliteSink;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::PersistenceError;
use crate::models::record::{ExtractedRecord, ScalarFields, SubjectRecord, TextSource};

/// Outcome of inserting one student's subject rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SubjectInsertReport {
    pub inserted: usize,
    pub failed: usize,
}

/// What [`persist_record`] wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Persisted {
    /// Generated student id.
    pub student_id: i64,
    /// Subject insert counts.
    pub subjects: SubjectInsertReport,
}

/// Relational store for student records.
///
/// Each operation can fail on its own. Implementations must not abort the
/// remaining subject rows when one of them fails.
pub trait RecordSink {
    /// Create tables if they do not exist.
    fn ensure_schema(&mut self) -> Result<(), PersistenceError>;

    /// Insert the student row and return its generated id.
    fn insert_student(
        &mut self,
        scalars: &ScalarFields,
        source: TextSource,
    ) -> Result<i64, PersistenceError>;

    /// Insert subject rows for a student, best effort per row.
    fn insert_subjects(
        &mut self,
        student_id: i64,
        subjects: &[SubjectRecord],
    ) -> Result<SubjectInsertReport, PersistenceError>;

    /// Start the unit of work for one document.
    fn begin(&mut self) -> Result<(), PersistenceError> {
        Ok(())
    }

    /// Make the current document's writes durable.
    fn commit(&mut self) -> Result<(), PersistenceError> {
        Ok(())
    }

    /// Discard the current document's writes.
    fn rollback(&mut self) -> Result<(), PersistenceError> {
        Ok(())
    }
}

/// Store a record.
///
/// A record without subjects is not persisted and the sink is never touched.
/// The student row and its subject rows are written in one unit of work: if
/// the student insert, the subject batch or the commit fails, nothing from
/// this document is kept.
pub fn persist_record(
    sink: &mut dyn RecordSink,
    record: &ExtractedRecord,
) -> Result<Option<Persisted>, PersistenceError> {
    if !record.has_subjects() {
        warn!("No subject marks extracted, skipping persistence");
        return Ok(None);
    }

    sink.ensure_schema()?;
    sink.begin()?;

    let written = write_record(sink, record).and_then(|persisted| {
        sink.commit()?;
        Ok(persisted)
    });
    let Persisted {
        student_id,
        subjects,
    } = match written {
        Ok(persisted) => persisted,
        Err(e) => {
            if let Err(rollback) = sink.rollback() {
                warn!("Rollback failed: {}", rollback);
            }
            return Err(e);
        }
    };

    if subjects.failed > 0 {
        warn!(
            "Student {}: {} of {} subject rows failed",
            student_id,
            subjects.failed,
            record.subjects.len()
        );
    }
    info!("Stored student {} with {} subject(s)", student_id, subjects.inserted);

    Ok(Some(Persisted {
        student_id,
        subjects,
    }))
}

fn write_record(
    sink: &mut dyn RecordSink,
    record: &ExtractedRecord,
) -> Result<Persisted, PersistenceError> {
    let student_id = sink.insert_student(&record.scalars, record.source)?;
    let subjects = sink.insert_subjects(student_id, &record.subjects)?;
    Ok(Persisted {
        student_id,
        subjects,
    })
}
