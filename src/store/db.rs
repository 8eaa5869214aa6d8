//! SQLite persistence for tests, questions and results.

use std::fs;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use thiserror::Error;

use crate::store::schema::{
    NewQuestion, Question, QuestionAnswer, QuestionAnswerDetail, QuestionType, Test, TestResult,
    TestResultWithName,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("could not encode options: {0}")]
    Json(#[from] serde_json::Error),
    #[error("could not create database directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0} not found")]
    NotFound(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS tests (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS questions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    test_id INTEGER NOT NULL,
    question_text TEXT NOT NULL,
    question_type TEXT NOT NULL
        CHECK(question_type IN ('multiple_choice', 'true_false', 'short_answer')),
    options TEXT NOT NULL DEFAULT '',
    correct_answer TEXT NOT NULL,
    explanation TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL,
    FOREIGN KEY (test_id) REFERENCES tests(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS test_results (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    test_id INTEGER NOT NULL,
    score REAL NOT NULL,
    total_questions INTEGER NOT NULL,
    correct_answers INTEGER NOT NULL,
    time_taken INTEGER NOT NULL,
    completed_at TEXT NOT NULL,
    FOREIGN KEY (test_id) REFERENCES tests(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS question_answers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    result_id INTEGER NOT NULL,
    question_id INTEGER NOT NULL,
    user_answer TEXT NOT NULL,
    is_correct BOOLEAN NOT NULL,
    FOREIGN KEY (result_id) REFERENCES test_results(id) ON DELETE CASCADE,
    FOREIGN KEY (question_id) REFERENCES questions(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_questions_test ON questions(test_id);
CREATE INDEX IF NOT EXISTS idx_results_test ON test_results(test_id);
CREATE INDEX IF NOT EXISTS idx_answers_result ON question_answers(result_id);
"#;

const QUESTION_COLUMNS: &str =
    "id, test_id, question_text, question_type, options, correct_answer, explanation, created_at";

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Self::init(Connection::open(path)?)
    }

    pub fn in_memory() -> StoreResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    // Tests

    pub fn create_test(&self, name: &str, description: &str) -> StoreResult<Test> {
        let now = timestamp(Utc::now());
        self.conn.execute(
            "INSERT INTO tests (name, description, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
            params![name, description, now],
        )?;
        self.get_test(self.conn.last_insert_rowid())
    }

    pub fn get_test(&self, id: i64) -> StoreResult<Test> {
        self.conn
            .query_row(
                "SELECT id, name, description, created_at, updated_at FROM tests WHERE id = ?1",
                params![id],
                parse_test_row,
            )
            .optional()?
            .ok_or_else(|| StoreError::NotFound(format!("test {id}")))
    }

    /// Newest first.
    pub fn get_all_tests(&self) -> StoreResult<Vec<Test>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, description, created_at, updated_at FROM tests
             ORDER BY created_at DESC, id DESC",
        )?;
        let tests = stmt
            .query_map([], parse_test_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tests)
    }

    /// Removes the test and every row that depends on it in one transaction.
    pub fn delete_test(&mut self, test_id: i64) -> StoreResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM question_answers
             WHERE question_id IN (SELECT id FROM questions WHERE test_id = ?1)
                OR result_id IN (SELECT id FROM test_results WHERE test_id = ?1)",
            params![test_id],
        )?;
        tx.execute("DELETE FROM test_results WHERE test_id = ?1", params![test_id])?;
        tx.execute("DELETE FROM questions WHERE test_id = ?1", params![test_id])?;
        tx.execute("DELETE FROM tests WHERE id = ?1", params![test_id])?;
        tx.commit()?;
        Ok(())
    }

    // Questions

    pub fn create_question(&self, test_id: i64, question: &NewQuestion) -> StoreResult<Question> {
        let options = if question.options.is_empty() {
            String::new()
        } else {
            serde_json::to_string(&question.options)?
        };
        self.conn.execute(
            "INSERT INTO questions
                (test_id, question_text, question_type, options, correct_answer, explanation, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                test_id,
                question.question_text,
                question.question_type.as_str(),
                options,
                question.correct_answer,
                question.explanation,
                timestamp(Utc::now()),
            ],
        )?;
        self.get_question(self.conn.last_insert_rowid())
    }

    pub fn get_question(&self, id: i64) -> StoreResult<Question> {
        self.conn
            .query_row(
                &format!("SELECT {QUESTION_COLUMNS} FROM questions WHERE id = ?1"),
                params![id],
                parse_question_row,
            )
            .optional()?
            .ok_or_else(|| StoreError::NotFound(format!("question {id}")))
    }

    /// Ascending id order, which is insertion order.
    pub fn get_questions_by_test_id(&self, test_id: i64) -> StoreResult<Vec<Question>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions WHERE test_id = ?1 ORDER BY id"
        ))?;
        let questions = stmt
            .query_map(params![test_id], parse_question_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(questions)
    }

    pub fn count_questions(&self, test_id: i64) -> StoreResult<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM questions WHERE test_id = ?1",
            params![test_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    // Results

    pub fn save_test_result(
        &self,
        test_id: i64,
        score: f64,
        total_questions: u32,
        correct_answers: u32,
        time_taken: u64,
    ) -> StoreResult<TestResult> {
        let completed_at = Utc::now();
        self.conn.execute(
            "INSERT INTO test_results
                (test_id, score, total_questions, correct_answers, time_taken, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                test_id,
                score,
                total_questions,
                correct_answers,
                time_taken as i64,
                timestamp(completed_at),
            ],
        )?;
        Ok(TestResult {
            id: self.conn.last_insert_rowid(),
            test_id,
            score,
            total_questions,
            correct_answers,
            time_taken,
            completed_at,
        })
    }

    pub fn get_test_results(&self, test_id: i64) -> StoreResult<Vec<TestResult>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, test_id, score, total_questions, correct_answers, time_taken, completed_at
             FROM test_results WHERE test_id = ?1
             ORDER BY completed_at DESC, id DESC",
        )?;
        let results = stmt
            .query_map(params![test_id], |row| {
                Ok(TestResult {
                    id: row.get(0)?,
                    test_id: row.get(1)?,
                    score: row.get(2)?,
                    total_questions: row.get(3)?,
                    correct_answers: row.get(4)?,
                    time_taken: row.get::<_, i64>(5)?.max(0) as u64,
                    completed_at: parse_timestamp(row, 6)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(results)
    }

    /// Every result across all tests, newest first, joined with its test name.
    pub fn get_all_test_results(&self) -> StoreResult<Vec<TestResultWithName>> {
        let mut stmt = self.conn.prepare(
            "SELECT tr.id, tr.test_id, t.name, tr.score, tr.total_questions, tr.correct_answers,
                    tr.time_taken, tr.completed_at
             FROM test_results tr
             JOIN tests t ON tr.test_id = t.id
             ORDER BY tr.completed_at DESC, tr.id DESC",
        )?;
        let results = stmt
            .query_map([], |row| {
                Ok(TestResultWithName {
                    id: row.get(0)?,
                    test_id: row.get(1)?,
                    test_name: row.get(2)?,
                    score: row.get(3)?,
                    total_questions: row.get(4)?,
                    correct_answers: row.get(5)?,
                    time_taken: row.get::<_, i64>(6)?.max(0) as u64,
                    completed_at: parse_timestamp(row, 7)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(results)
    }

    pub fn save_question_answer(
        &self,
        result_id: i64,
        question_id: i64,
        user_answer: &str,
        is_correct: bool,
    ) -> StoreResult<QuestionAnswer> {
        self.conn.execute(
            "INSERT INTO question_answers (result_id, question_id, user_answer, is_correct)
             VALUES (?1, ?2, ?3, ?4)",
            params![result_id, question_id, user_answer, is_correct],
        )?;
        Ok(QuestionAnswer {
            id: self.conn.last_insert_rowid(),
            result_id,
            question_id,
            user_answer: user_answer.to_string(),
            is_correct,
        })
    }

    pub fn get_test_result_answers(&self, result_id: i64) -> StoreResult<Vec<QuestionAnswerDetail>> {
        let mut stmt = self.conn.prepare(
            "SELECT qa.id, qa.result_id, qa.question_id, q.question_text, qa.user_answer,
                    q.correct_answer, qa.is_correct, q.explanation
             FROM question_answers qa
             JOIN questions q ON qa.question_id = q.id
             WHERE qa.result_id = ?1
             ORDER BY qa.question_id",
        )?;
        let answers = stmt
            .query_map(params![result_id], |row| {
                Ok(QuestionAnswerDetail {
                    id: row.get(0)?,
                    result_id: row.get(1)?,
                    question_id: row.get(2)?,
                    question_text: row.get(3)?,
                    user_answer: row.get(4)?,
                    correct_answer: row.get(5)?,
                    is_correct: row.get(6)?,
                    explanation: row.get(7)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(answers)
    }

    pub fn delete_test_result(&mut self, result_id: i64) -> StoreResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM question_answers WHERE result_id = ?1",
            params![result_id],
        )?;
        tx.execute("DELETE FROM test_results WHERE id = ?1", params![result_id])?;
        tx.commit()?;
        Ok(())
    }

    /// Makes every question insert past the first `allowed` fail.
    #[cfg(test)]
    pub(crate) fn fail_question_inserts_after(&self, allowed: usize) {
        self.conn
            .execute_batch(&format!(
                "CREATE TRIGGER questions_cap BEFORE INSERT ON questions
                 WHEN (SELECT COUNT(*) FROM questions) >= {allowed}
                 BEGIN SELECT RAISE(ABORT, 'question insert rejected'); END;"
            ))
            .unwrap();
    }
}

/// Fixed-width RFC 3339 so that text ordering matches time ordering.
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_test_row(row: &Row<'_>) -> rusqlite::Result<Test> {
    Ok(Test {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        created_at: parse_timestamp(row, 3)?,
        updated_at: parse_timestamp(row, 4)?,
    })
}

fn parse_question_row(row: &Row<'_>) -> rusqlite::Result<Question> {
    let kind: String = row.get(3)?;
    let question_type = kind.parse::<QuestionType>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, Type::Text, e.into())
    })?;
    let options_json: String = row.get(4)?;
    let options = if options_json.is_empty() {
        Vec::new()
    } else {
        serde_json::from_str(&options_json).unwrap_or_default()
    };
    Ok(Question {
        id: row.get(0)?,
        test_id: row.get(1)?,
        question_text: row.get(2)?,
        question_type,
        options,
        correct_answer: row.get(5)?,
        explanation: row.get(6)?,
        created_at: parse_timestamp(row, 7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mc(text: &str, options: &[&str], answer: &str) -> NewQuestion {
        NewQuestion {
            question_text: text.to_string(),
            question_type: QuestionType::MultipleChoice,
            options: options.iter().map(|o| o.to_string()).collect(),
            correct_answer: answer.to_string(),
            explanation: String::new(),
        }
    }

    fn short(text: &str, answer: &str) -> NewQuestion {
        NewQuestion {
            question_text: text.to_string(),
            question_type: QuestionType::ShortAnswer,
            correct_answer: answer.to_string(),
            explanation: "because".to_string(),
            ..Default::default()
        }
    }

    fn count(store: &Store, table: &str) -> i64 {
        store
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn test_create_and_get_test() {
        let store = Store::in_memory().unwrap();
        let test = store.create_test("Biology", "Cells").unwrap();
        assert_eq!(test.name, "Biology");
        assert_eq!(test.description, "Cells");
        assert_eq!(store.get_test(test.id).unwrap(), test);
    }

    #[test]
    fn test_missing_test_is_not_found() {
        let store = Store::in_memory().unwrap();
        assert!(matches!(store.get_test(42), Err(StoreError::NotFound(_))));
        assert!(matches!(store.get_question(42), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_all_tests_newest_first() {
        let store = Store::in_memory().unwrap();
        let first = store.create_test("first", "").unwrap();
        let second = store.create_test("second", "").unwrap();
        let ids: Vec<i64> = store.get_all_tests().unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn test_question_options_round_trip_and_order() {
        let store = Store::in_memory().unwrap();
        let test = store.create_test("t", "").unwrap();
        let q1 = store
            .create_question(test.id, &mc("Capital of France?", &["Paris", "Rome", "", ""], "A"))
            .unwrap();
        let q2 = store.create_question(test.id, &short("Name a noble gas", "neon")).unwrap();

        assert_eq!(q1.options, vec!["Paris", "Rome", "", ""]);
        assert_eq!(q1.question_type, QuestionType::MultipleChoice);
        assert!(q2.options.is_empty());
        assert_eq!(q2.explanation, "because");

        let listed = store.get_questions_by_test_id(test.id).unwrap();
        assert_eq!(listed.iter().map(|q| q.id).collect::<Vec<_>>(), vec![q1.id, q2.id]);
        assert_eq!(store.count_questions(test.id).unwrap(), 2);
    }

    #[test]
    fn test_options_with_quotes_survive() {
        let store = Store::in_memory().unwrap();
        let test = store.create_test("t", "").unwrap();
        let q = store
            .create_question(test.id, &mc("Which?", &["say \"hi\"", "a, b"], "B"))
            .unwrap();
        assert_eq!(q.options, vec!["say \"hi\"", "a, b"]);
    }

    #[test]
    fn test_malformed_options_fall_back_to_empty() {
        let store = Store::in_memory().unwrap();
        let test = store.create_test("t", "").unwrap();
        let q = store.create_question(test.id, &mc("Which?", &["x", "y"], "A")).unwrap();
        store
            .conn
            .execute("UPDATE questions SET options = 'not json' WHERE id = ?1", params![q.id])
            .unwrap();
        assert!(store.get_question(q.id).unwrap().options.is_empty());
    }

    #[test]
    fn test_results_joined_with_name_newest_first() {
        let store = Store::in_memory().unwrap();
        let a = store.create_test("Alpha", "").unwrap();
        let b = store.create_test("Beta", "").unwrap();
        let r1 = store.save_test_result(a.id, 50.0, 2, 1, 30).unwrap();
        let r2 = store.save_test_result(b.id, 100.0, 1, 1, 12).unwrap();

        let all = store.get_all_test_results().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, r2.id);
        assert_eq!(all[0].test_name, "Beta");
        assert_eq!(all[1].id, r1.id);
        assert_eq!(all[1].time_taken, 30);

        let for_a = store.get_test_results(a.id).unwrap();
        assert_eq!(for_a.len(), 1);
        assert_eq!(for_a[0].correct_answers, 1);
    }

    #[test]
    fn test_answer_details_ordered_by_question() {
        let store = Store::in_memory().unwrap();
        let test = store.create_test("t", "").unwrap();
        let q1 = store.create_question(test.id, &short("First question", "one")).unwrap();
        let q2 = store.create_question(test.id, &short("Second question", "two")).unwrap();
        let result = store.save_test_result(test.id, 50.0, 2, 1, 5).unwrap();
        store.save_question_answer(result.id, q2.id, "nope", false).unwrap();
        store.save_question_answer(result.id, q1.id, "one", true).unwrap();

        let details = store.get_test_result_answers(result.id).unwrap();
        assert_eq!(details.len(), 2);
        assert_eq!(details[0].question_id, q1.id);
        assert!(details[0].is_correct);
        assert_eq!(details[0].correct_answer, "one");
        assert_eq!(details[1].user_answer, "nope");
        assert!(!details[1].is_correct);
    }

    #[test]
    fn test_delete_test_removes_all_dependants() {
        let mut store = Store::in_memory().unwrap();
        let keep = store.create_test("keep", "").unwrap();
        let kept_q = store.create_question(keep.id, &short("Kept question", "x")).unwrap();
        let test = store.create_test("doomed", "").unwrap();
        let q = store.create_question(test.id, &short("Doomed question", "x")).unwrap();
        let result = store.save_test_result(test.id, 100.0, 1, 1, 3).unwrap();
        store.save_question_answer(result.id, q.id, "x", true).unwrap();

        store.delete_test(test.id).unwrap();

        assert!(store.get_questions_by_test_id(test.id).unwrap().is_empty());
        assert!(store.get_test_results(test.id).unwrap().is_empty());
        assert!(store.get_test_result_answers(result.id).unwrap().is_empty());
        assert_eq!(count(&store, "question_answers"), 0);
        assert!(matches!(store.get_test(test.id), Err(StoreError::NotFound(_))));

        assert_eq!(store.get_question(kept_q.id).unwrap().test_id, keep.id);
        assert_eq!(count(&store, "tests"), 1);
    }

    #[test]
    fn test_delete_result_removes_answers_only() {
        let mut store = Store::in_memory().unwrap();
        let test = store.create_test("t", "").unwrap();
        let q = store.create_question(test.id, &short("Some question", "x")).unwrap();
        let result = store.save_test_result(test.id, 0.0, 1, 0, 3).unwrap();
        store.save_question_answer(result.id, q.id, "y", false).unwrap();

        store.delete_test_result(result.id).unwrap();

        assert!(store.get_all_test_results().unwrap().is_empty());
        assert_eq!(count(&store, "question_answers"), 0);
        assert_eq!(store.count_questions(test.id).unwrap(), 1);
    }

    #[test]
    fn test_open_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("quiz.db");
        let store = Store::open(&path).unwrap();
        store.create_test("persisted", "").unwrap();
        drop(store);

        let reopened = Store::open(&path).unwrap();
        assert_eq!(reopened.get_all_tests().unwrap()[0].name, "persisted");
    }
}
