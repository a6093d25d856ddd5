//! Database Schema
//!
//! SQLite 테이블 스키마 정의

/// 연결마다 적용해야 하는 PRAGMA (SQLite 는 외래키 검사가 기본 비활성화)
pub const CONNECTION_PRAGMAS: &str = r#"
PRAGMA foreign_keys = ON;
"#;

/// 데이터베이스 스키마 생성 SQL
pub const CREATE_SCHEMA: &str = r#"
-- 작성자 테이블
CREATE TABLE IF NOT EXISTS authors (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE
);

-- 과목 테이블 (이름 기준 get-or-create)
CREATE TABLE IF NOT EXISTS subjects (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

-- 노트 테이블
CREATE TABLE IF NOT EXISTS notes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    author_id INTEGER NOT NULL,
    subject_id INTEGER NOT NULL,
    title TEXT NOT NULL,
    content TEXT NOT NULL DEFAULT '',
    pdf_path TEXT,
    created_at INTEGER NOT NULL,
    FOREIGN KEY (author_id) REFERENCES authors(id) ON DELETE CASCADE,
    FOREIGN KEY (subject_id) REFERENCES subjects(id) ON DELETE CASCADE
);

-- 노트 인덱스
CREATE INDEX IF NOT EXISTS idx_notes_subject ON notes(subject_id);
CREATE INDEX IF NOT EXISTS idx_notes_author ON notes(author_id);
CREATE INDEX IF NOT EXISTS idx_notes_created ON notes(created_at);

-- 요약 테이블 (노트당 1개)
CREATE TABLE IF NOT EXISTS summaries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    note_id INTEGER NOT NULL UNIQUE,
    content TEXT NOT NULL,
    FOREIGN KEY (note_id) REFERENCES notes(id) ON DELETE CASCADE
);

-- 내용이 빈 노트에는 요약을 만들 수 없음
CREATE TRIGGER IF NOT EXISTS trg_summaries_require_content
BEFORE INSERT ON summaries
WHEN (SELECT trim(content) FROM notes WHERE id = NEW.note_id) = ''
BEGIN
    SELECT RAISE(ABORT, 'note content is empty');
END;

-- OX 퀴즈 테이블
CREATE TABLE IF NOT EXISTS quizzes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    summary_id INTEGER NOT NULL,
    question TEXT NOT NULL,
    answer INTEGER NOT NULL CHECK (answer IN (0, 1)),
    explanation TEXT NOT NULL DEFAULT '',
    FOREIGN KEY (summary_id) REFERENCES summaries(id) ON DELETE CASCADE
);

-- 퀴즈 인덱스
CREATE INDEX IF NOT EXISTS idx_quizzes_summary ON quizzes(summary_id);
"#;
