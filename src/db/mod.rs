//! Database Module
//!
//! SQLite 데이터베이스 관리

mod schema;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, OptionalExtension, Row};

use crate::error::StudyError;
use crate::models::{Author, Note, Quiz, QuizItem, Subject, Summary};

const NOTE_COLUMNS: &str = "id, author_id, subject_id, title, content, pdf_path, created_at";

/// 데이터베이스 상태 (HTTP 핸들러 간 공유)
pub struct DbState(pub Mutex<Database>);

impl DbState {
    pub fn new(db: Database) -> Self {
        Self(Mutex::new(db))
    }

    /// 잠금 획득. 가드를 `.await` 너머로 들고 있으면 안 된다.
    pub fn lock(&self) -> Result<MutexGuard<'_, Database>, StudyError> {
        self.0.lock().map_err(|_| StudyError::LockPoisoned)
    }
}

/// 저장 전 노트 입력값
#[derive(Debug, Clone)]
pub struct NewNote<'a> {
    pub author_id: i64,
    pub subject_id: i64,
    pub title: &'a str,
    pub content: &'a str,
}

/// 데이터베이스 래퍼
pub struct Database {
    conn: Connection,
}

fn note_from_row(row: &Row<'_>) -> rusqlite::Result<Note> {
    Ok(Note {
        id: row.get(0)?,
        author_id: row.get(1)?,
        subject_id: row.get(2)?,
        title: row.get(3)?,
        content: row.get(4)?,
        pdf_path: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn summary_from_row(row: &Row<'_>) -> rusqlite::Result<Summary> {
    Ok(Summary {
        id: row.get(0)?,
        note_id: row.get(1)?,
        content: row.get(2)?,
    })
}

fn quiz_from_row(row: &Row<'_>) -> rusqlite::Result<Quiz> {
    Ok(Quiz {
        id: row.get(0)?,
        summary_id: row.get(1)?,
        question: row.get(2)?,
        answer: row.get(3)?,
        explanation: row.get(4)?,
    })
}

impl Database {
    /// 새 데이터베이스 연결 생성
    pub fn new(path: &Path) -> Result<Self, StudyError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(schema::CONNECTION_PRAGMAS)?;
        Ok(Self { conn })
    }

    /// 메모리 DB (테스트용)
    pub fn open_in_memory() -> Result<Self, StudyError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(schema::CONNECTION_PRAGMAS)?;
        Ok(Self { conn })
    }

    /// 데이터베이스 스키마 초기화
    pub fn initialize(&self) -> Result<(), StudyError> {
        self.conn.execute_batch(schema::CREATE_SCHEMA)?;
        Ok(())
    }

    // ---------------------------------------------------------------
    // authors
    // ---------------------------------------------------------------

    pub fn get_or_create_author(&self, username: &str) -> Result<Author, StudyError> {
        self.conn.execute(
            "INSERT INTO authors (username) VALUES (?1) ON CONFLICT(username) DO NOTHING",
            [username],
        )?;
        let author = self.conn.query_row(
            "SELECT id, username FROM authors WHERE username = ?1",
            [username],
            |row| {
                Ok(Author {
                    id: row.get(0)?,
                    username: row.get(1)?,
                })
            },
        )?;
        Ok(author)
    }

    #[cfg(test)]
    pub fn delete_author(&self, author_id: i64) -> Result<(), StudyError> {
        self.conn
            .execute("DELETE FROM authors WHERE id = ?1", [author_id])?;
        Ok(())
    }

    // ---------------------------------------------------------------
    // subjects
    // ---------------------------------------------------------------

    /// 이름으로 과목 조회, 없으면 생성 (UNIQUE 제약 + upsert 로 원자적)
    pub fn get_or_create_subject(&self, name: &str) -> Result<Subject, StudyError> {
        self.conn.execute(
            "INSERT INTO subjects (name) VALUES (?1) ON CONFLICT(name) DO NOTHING",
            [name],
        )?;
        let subject = self.conn.query_row(
            "SELECT id, name FROM subjects WHERE name = ?1",
            [name],
            |row| {
                Ok(Subject {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )?;
        Ok(subject)
    }

    pub fn get_subject(&self, subject_id: i64) -> Result<Subject, StudyError> {
        self.conn
            .query_row(
                "SELECT id, name FROM subjects WHERE id = ?1",
                [subject_id],
                |row| {
                    Ok(Subject {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?
            .ok_or(StudyError::SubjectNotFound(subject_id))
    }

    /// 과목 목록 (이름순)
    pub fn list_subjects(&self) -> Result<Vec<Subject>, StudyError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM subjects ORDER BY name")?;
        let iter = stmt.query_map([], |row| {
            Ok(Subject {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;

        let mut subjects = Vec::new();
        for subject in iter {
            subjects.push(subject?);
        }
        Ok(subjects)
    }

    /// 과목 삭제 (노트, 요약, 퀴즈까지 연쇄 삭제)
    pub fn delete_subject(&self, subject_id: i64) -> Result<(), StudyError> {
        let changed = self
            .conn
            .execute("DELETE FROM subjects WHERE id = ?1", [subject_id])?;
        if changed == 0 {
            return Err(StudyError::SubjectNotFound(subject_id));
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // notes
    // ---------------------------------------------------------------

    pub fn insert_note(&self, note: &NewNote<'_>) -> Result<Note, StudyError> {
        self.conn.execute(
            "INSERT INTO notes (author_id, subject_id, title, content, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            (
                note.author_id,
                note.subject_id,
                note.title,
                note.content,
                chrono::Utc::now().timestamp_millis(),
            ),
        )?;
        self.get_note(self.conn.last_insert_rowid())
    }

    /// 노트 생성과 파일 저장을 한 트랜잭션으로 처리
    ///
    /// `store_file` 은 새 노트 id 를 받아 파일을 기록하고 저장 경로를 돌려준다.
    /// 파일 기록이 실패하면 노트 행도 롤백된다.
    pub fn insert_note_with_file<F>(
        &self,
        note: &NewNote<'_>,
        store_file: F,
    ) -> Result<Note, StudyError>
    where
        F: FnOnce(i64) -> Result<String, StudyError>,
    {
        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            "INSERT INTO notes (author_id, subject_id, title, content, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            (
                note.author_id,
                note.subject_id,
                note.title,
                note.content,
                chrono::Utc::now().timestamp_millis(),
            ),
        )?;
        let note_id = tx.last_insert_rowid();

        let stored_path = store_file(note_id)?;
        tx.execute(
            "UPDATE notes SET pdf_path = ?1 WHERE id = ?2",
            (&stored_path, note_id),
        )?;

        tx.commit()?;
        self.get_note(note_id)
    }

    pub fn update_note_content(&self, note_id: i64, content: &str) -> Result<(), StudyError> {
        let changed = self.conn.execute(
            "UPDATE notes SET content = ?1 WHERE id = ?2",
            (content, note_id),
        )?;
        if changed == 0 {
            return Err(StudyError::NoteNotFound(note_id));
        }
        Ok(())
    }

    pub fn get_note(&self, note_id: i64) -> Result<Note, StudyError> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM notes WHERE id = ?1", NOTE_COLUMNS),
                [note_id],
                note_from_row,
            )
            .optional()?
            .ok_or(StudyError::NoteNotFound(note_id))
    }

    /// 전체 노트 (최신순)
    pub fn list_notes(&self) -> Result<Vec<Note>, StudyError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM notes ORDER BY created_at DESC, id DESC",
            NOTE_COLUMNS
        ))?;
        let iter = stmt.query_map([], note_from_row)?;

        let mut notes = Vec::new();
        for note in iter {
            notes.push(note?);
        }
        Ok(notes)
    }

    /// 과목별 노트 (최신순)
    pub fn list_notes_by_subject(&self, subject_id: i64) -> Result<Vec<Note>, StudyError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM notes WHERE subject_id = ?1 ORDER BY created_at DESC, id DESC",
            NOTE_COLUMNS
        ))?;
        let iter = stmt.query_map([subject_id], note_from_row)?;

        let mut notes = Vec::new();
        for note in iter {
            notes.push(note?);
        }
        Ok(notes)
    }

    pub fn delete_note(&self, note_id: i64) -> Result<(), StudyError> {
        let changed = self
            .conn
            .execute("DELETE FROM notes WHERE id = ?1", [note_id])?;
        if changed == 0 {
            return Err(StudyError::NoteNotFound(note_id));
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // summaries
    // ---------------------------------------------------------------

    pub fn get_summary_for_note(&self, note_id: i64) -> Result<Option<Summary>, StudyError> {
        let summary = self
            .conn
            .query_row(
                "SELECT id, note_id, content FROM summaries WHERE note_id = ?1",
                [note_id],
                summary_from_row,
            )
            .optional()?;
        Ok(summary)
    }

    /// 노트의 요약을 생성하거나 덮어쓴다 (노트당 1개 유지)
    pub fn upsert_summary(&self, note_id: i64, content: &str) -> Result<Summary, StudyError> {
        self.conn.execute(
            "INSERT INTO summaries (note_id, content) VALUES (?1, ?2)
             ON CONFLICT(note_id) DO UPDATE SET content = excluded.content",
            (note_id, content),
        )?;
        self.get_summary_for_note(note_id)?
            .ok_or(StudyError::NoteNotFound(note_id))
    }

    pub fn list_summaries_by_subject(&self, subject_id: i64) -> Result<Vec<Summary>, StudyError> {
        let mut stmt = self.conn.prepare(
            "SELECT s.id, s.note_id, s.content
             FROM summaries s JOIN notes n ON n.id = s.note_id
             WHERE n.subject_id = ?1
             ORDER BY n.created_at DESC, n.id DESC",
        )?;
        let iter = stmt.query_map([subject_id], summary_from_row)?;

        let mut summaries = Vec::new();
        for summary in iter {
            summaries.push(summary?);
        }
        Ok(summaries)
    }

    // ---------------------------------------------------------------
    // quizzes
    // ---------------------------------------------------------------

    /// 퀴즈 항목 추가 (기존 문항은 유지)
    pub fn insert_quizzes(
        &self,
        summary_id: i64,
        items: &[QuizItem],
    ) -> Result<Vec<Quiz>, StudyError> {
        let tx = self.conn.unchecked_transaction()?;
        let mut created = Vec::with_capacity(items.len());

        for item in items {
            tx.execute(
                "INSERT INTO quizzes (summary_id, question, answer, explanation)
                 VALUES (?1, ?2, ?3, ?4)",
                (summary_id, &item.question, item.answer, &item.explanation),
            )?;
            created.push(Quiz {
                id: tx.last_insert_rowid(),
                summary_id,
                question: item.question.clone(),
                answer: item.answer,
                explanation: item.explanation.clone(),
            });
        }

        tx.commit()?;
        Ok(created)
    }

    /// 요약에 속한 퀴즈 (생성순)
    pub fn list_quizzes(&self, summary_id: i64) -> Result<Vec<Quiz>, StudyError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, summary_id, question, answer, explanation
             FROM quizzes WHERE summary_id = ?1 ORDER BY id",
        )?;
        let iter = stmt.query_map([summary_id], quiz_from_row)?;

        let mut quizzes = Vec::new();
        for quiz in iter {
            quizzes.push(quiz?);
        }
        Ok(quizzes)
    }

    #[cfg(test)]
    pub fn count_quizzes(&self) -> Result<i64, StudyError> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM quizzes", [], |row| row.get(0))?;
        Ok(count)
    }

    #[cfg(test)]
    pub fn count_summaries(&self) -> Result<i64, StudyError> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM summaries", [], |row| row.get(0))?;
        Ok(count)
    }
}
