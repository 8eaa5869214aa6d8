use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent};

use crate::engine::scoring::{answer_matches, format_duration, grade, review_matches, tally};
use crate::session::{Message, Nav, Services, is_confirm, is_down, is_up, step_cursor};
use crate::store::db::StoreResult;
use crate::store::schema::{OPTION_LETTERS, Question, QuestionType, Test};
use crate::ui::line_input::{InputResult, LineInput};

const TF_CHOICES: [&str; 2] = ["true", "false"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunMode {
    Answering,
    /// Score summary after the last question.
    Finished,
    /// Paging through answers; holds the question index.
    Review(usize),
}

pub struct TestRun {
    pub test: Test,
    pub questions: Vec<Question>,
    pub current: usize,
    /// Option cursor for multiple choice and true/false questions.
    pub cursor: usize,
    pub answer_input: LineInput,
    pub answers: HashMap<i64, String>,
    pub started: Instant,
    /// Elapsed time frozen when the last question is answered.
    pub finished_after: Option<Duration>,
    pub mode: RunMode,
    pub message: Option<Message>,
}

impl TestRun {
    pub fn new(test: Test, questions: Vec<Question>) -> Self {
        Self {
            test,
            questions,
            current: 0,
            cursor: 0,
            answer_input: LineInput::new(""),
            answers: HashMap::new(),
            started: Instant::now(),
            finished_after: None,
            mode: RunMode::Answering,
            message: None,
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    pub fn elapsed(&self) -> Duration {
        self.finished_after.unwrap_or_else(|| self.started.elapsed())
    }

    pub fn progress_line(&self) -> String {
        format!(
            "Question {} of {} | Time: {}",
            (self.current + 1).min(self.questions.len()),
            self.questions.len(),
            format_duration(self.elapsed())
        )
    }

    /// Returns (correct, percent).
    pub fn score(&self) -> (usize, f64) {
        tally(&self.questions, &self.answers)
    }

    pub fn score_line(&self) -> String {
        let (correct, percent) = self.score();
        format!(
            "Score: {percent:.1}% ({correct}/{} correct)",
            self.questions.len()
        )
    }

    /// Number of selectable choices for the current question.
    fn choice_count(&self) -> usize {
        match self.current_question().map(|q| q.question_type) {
            Some(QuestionType::MultipleChoice) => self
                .current_question()
                .map_or(0, |q| q.options.len().min(OPTION_LETTERS.len())),
            Some(QuestionType::TrueFalse) => TF_CHOICES.len(),
            _ => 0,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, svc: &mut Services) -> Nav {
        self.message = None;
        match self.mode {
            RunMode::Answering => {
                self.handle_answering(key);
                Nav::Stay
            }
            RunMode::Finished => self.handle_finished(key, svc),
            RunMode::Review(index) => {
                self.handle_review(key, index);
                Nav::Stay
            }
        }
    }

    fn handle_answering(&mut self, key: KeyEvent) {
        let Some(question) = self.current_question() else {
            self.finish();
            return;
        };
        let (id, kind) = (question.id, question.question_type);

        if kind == QuestionType::ShortAnswer {
            if self.answer_input.handle(key) == InputResult::Submit {
                let answer = self.answer_input.value().trim().to_string();
                if answer.is_empty() {
                    self.message = Some(Message::error("Please enter an answer"));
                    return;
                }
                self.answers.insert(id, answer);
                self.advance();
            }
            return;
        }

        if is_up(&key) || is_down(&key) {
            let len = self.choice_count();
            step_cursor(&mut self.cursor, len, is_down(&key));
            return;
        }
        if !is_confirm(&key) {
            return;
        }
        match kind {
            QuestionType::MultipleChoice => {
                // A question saved without options can only be skipped.
                if self.choice_count() > 0 {
                    if let Some(letter) = OPTION_LETTERS.get(self.cursor) {
                        self.answers.insert(id, letter.to_string());
                    }
                }
            }
            QuestionType::TrueFalse => {
                if let Some(choice) = TF_CHOICES.get(self.cursor) {
                    self.answers.insert(id, choice.to_string());
                }
            }
            QuestionType::ShortAnswer => {}
        }
        self.advance();
    }

    fn advance(&mut self) {
        self.cursor = 0;
        self.answer_input = LineInput::new("");
        self.current += 1;
        if self.current >= self.questions.len() {
            self.finish();
        }
    }

    fn finish(&mut self) {
        self.finished_after = Some(self.started.elapsed());
        self.mode = RunMode::Finished;
        let (correct, percent) = self.score();
        tracing::info!(test_id = self.test.id, correct, percent, "test finished");
    }

    fn handle_finished(&mut self, key: KeyEvent, svc: &mut Services) -> Nav {
        match key.code {
            KeyCode::Enter => {
                let flash = match self.save(svc) {
                    Ok(percent) => {
                        Message::info(format!("Result saved: {percent:.1}% ({})", grade(percent)))
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to save test result");
                        Message::error(format!("Failed to save results: {e}"))
                    }
                };
                Nav::Menu(Some(flash))
            }
            KeyCode::Char('r') if !self.questions.is_empty() => {
                self.mode = RunMode::Review(0);
                Nav::Stay
            }
            _ => Nav::Stay,
        }
    }

    /// Writes the aggregate result and one answer row per answered question.
    fn save(&self, svc: &Services) -> StoreResult<f64> {
        let (correct, percent) = self.score();
        let result = svc.store.save_test_result(
            self.test.id,
            percent,
            self.questions.len() as u32,
            correct as u32,
            self.elapsed().as_secs(),
        )?;
        for question in &self.questions {
            if let Some(answer) = self.answers.get(&question.id) {
                let is_correct =
                    answer_matches(question.question_type, answer, &question.correct_answer);
                svc.store
                    .save_question_answer(result.id, question.id, answer, is_correct)?;
            }
        }
        Ok(percent)
    }

    fn handle_review(&mut self, key: KeyEvent, index: usize) {
        let last = self.questions.len().saturating_sub(1);
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => {
                self.mode = RunMode::Review(index.saturating_sub(1));
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.mode = RunMode::Review((index + 1).min(last));
            }
            KeyCode::Char('b') => self.mode = RunMode::Finished,
            _ => {}
        }
    }

    /// Display text for a recorded answer; multiple choice shows the option text too.
    pub fn answer_label(question: &Question, answer: &str) -> String {
        if question.question_type == QuestionType::MultipleChoice {
            if let Some(text) = OPTION_LETTERS
                .iter()
                .position(|l| l.eq_ignore_ascii_case(answer.trim()))
                .and_then(|i| question.options.get(i))
            {
                return format!("{answer}) {text}");
            }
        }
        answer.to_string()
    }

    /// Correctness mark shown while reviewing.
    pub fn review_verdict(&self, index: usize) -> Option<&'static str> {
        let question = self.questions.get(index)?;
        let answer = self.answers.get(&question.id).map_or("", String::as_str);
        Some(if review_matches(answer, &question.correct_answer) {
            "✓ CORRECT"
        } else {
            "✗ INCORRECT"
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::testing::services;
    use crate::store::schema::NewQuestion;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn seeded(svc: &Services) -> TestRun {
        let test = svc.store.create_test("Geography", "").unwrap();
        let rows = [
            (QuestionType::MultipleChoice, vec!["Paris", "Rome", "Oslo"], "B"),
            (QuestionType::TrueFalse, vec![], "false"),
            (QuestionType::ShortAnswer, vec![], "Danube"),
        ];
        for (kind, options, answer) in rows {
            svc.store
                .create_question(
                    test.id,
                    &NewQuestion {
                        question_text: format!("{kind} question"),
                        question_type: kind,
                        options: options.iter().map(|o| o.to_string()).collect(),
                        correct_answer: answer.to_string(),
                        explanation: String::new(),
                    },
                )
                .unwrap();
        }
        let questions = svc.store.get_questions_by_test_id(test.id).unwrap();
        TestRun::new(test, questions)
    }

    fn type_text(run: &mut TestRun, svc: &mut Services, text: &str) {
        for ch in text.chars() {
            run.handle_key(key(KeyCode::Char(ch)), svc);
        }
        run.handle_key(key(KeyCode::Enter), svc);
    }

    #[test]
    fn test_answers_are_recorded_per_type() {
        let mut svc = services();
        let mut run = seeded(&svc);
        let ids: Vec<i64> = run.questions.iter().map(|q| q.id).collect();

        // cursor is clamped to the three options
        for _ in 0..5 {
            run.handle_key(key(KeyCode::Down), &mut svc);
        }
        assert_eq!(run.cursor, 2);
        run.handle_key(key(KeyCode::Up), &mut svc);
        run.handle_key(key(KeyCode::Enter), &mut svc);
        assert_eq!(run.answers[&ids[0]], "B");
        assert_eq!(run.cursor, 0);

        run.handle_key(key(KeyCode::Down), &mut svc);
        run.handle_key(key(KeyCode::Down), &mut svc);
        run.handle_key(key(KeyCode::Char(' ')), &mut svc);
        assert_eq!(run.answers[&ids[1]], "false");

        type_text(&mut run, &mut svc, "  danube ");
        assert_eq!(run.answers[&ids[2]], "danube");
        assert_eq!(run.mode, RunMode::Finished);
        assert_eq!(run.score_line(), "Score: 100.0% (3/3 correct)");
    }

    #[test]
    fn test_blank_short_answer_is_rejected() {
        let mut svc = services();
        let mut run = seeded(&svc);
        run.current = 2;
        type_text(&mut run, &mut svc, "   ");
        assert_eq!(run.current, 2);
        assert_eq!(run.message, Some(Message::error("Please enter an answer")));
        assert_eq!(run.mode, RunMode::Answering);
    }

    #[test]
    fn test_progress_line() {
        let svc = services();
        let run = seeded(&svc);
        assert_eq!(run.progress_line(), "Question 1 of 3 | Time: 0:00");
    }

    #[test]
    fn test_review_pages_are_clamped() {
        let mut svc = services();
        let mut run = seeded(&svc);
        run.handle_key(key(KeyCode::Enter), &mut svc);
        run.handle_key(key(KeyCode::Enter), &mut svc);
        type_text(&mut run, &mut svc, "Danube");
        run.handle_key(key(KeyCode::Char('r')), &mut svc);
        assert_eq!(run.mode, RunMode::Review(0));

        run.handle_key(key(KeyCode::Left), &mut svc);
        assert_eq!(run.mode, RunMode::Review(0));
        for _ in 0..5 {
            run.handle_key(key(KeyCode::Char('l')), &mut svc);
        }
        assert_eq!(run.mode, RunMode::Review(2));
        assert_eq!(run.review_verdict(0), Some("✗ INCORRECT"));
        assert_eq!(run.review_verdict(1), Some("✗ INCORRECT"));
        assert_eq!(run.review_verdict(2), Some("✓ CORRECT"));

        run.handle_key(key(KeyCode::Char('b')), &mut svc);
        assert_eq!(run.mode, RunMode::Finished);
    }

    #[test]
    fn test_save_writes_result_and_answers() {
        let mut svc = services();
        let mut run = seeded(&svc);
        run.handle_key(key(KeyCode::Down), &mut svc);
        run.handle_key(key(KeyCode::Enter), &mut svc);
        run.handle_key(key(KeyCode::Enter), &mut svc);
        type_text(&mut run, &mut svc, "Danube");

        let nav = run.handle_key(key(KeyCode::Enter), &mut svc);
        match nav {
            Nav::Menu(Some(msg)) => {
                assert!(!msg.is_error());
                assert_eq!(msg.text(), "Result saved: 66.7% (D)");
            }
            _ => panic!("expected return to menu"),
        }

        let results = svc.store.get_test_results(run.test.id).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].correct_answers, 2);
        assert_eq!(results[0].total_questions, 3);
        let answers = svc.store.get_test_result_answers(results[0].id).unwrap();
        assert_eq!(answers.len(), 3);
        assert_eq!(answers.iter().filter(|a| a.is_correct).count(), 2);
    }

    #[test]
    fn test_save_failure_still_returns_to_menu() {
        let mut svc = services();
        let mut run = seeded(&svc);
        run.test.id = 9999;
        run.mode = RunMode::Finished;
        match run.handle_key(key(KeyCode::Enter), &mut svc) {
            Nav::Menu(Some(msg)) => {
                assert!(msg.is_error());
                assert!(msg.text().starts_with("Failed to save results:"));
            }
            _ => panic!("expected return to menu"),
        }
    }

    #[test]
    fn test_answer_label_shows_option_text() {
        let svc = services();
        let run = seeded(&svc);
        assert_eq!(TestRun::answer_label(&run.questions[0], "B"), "B) Rome");
        assert_eq!(TestRun::answer_label(&run.questions[1], "true"), "true");
    }
}
