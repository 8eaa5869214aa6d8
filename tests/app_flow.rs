use std::fs;
use std::path::Path;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::TestBackend;

use pdfquiz::app::{App, Screen};
use pdfquiz::config::Config;
use pdfquiz::generator::{GenerateError, GeneratedQuestion, QuestionGenerator};
use pdfquiz::pdf::{PdfError, TextExtractor};
use pdfquiz::session::Services;
use pdfquiz::session::pdf_wizard::WizardStep;
use pdfquiz::session::question_gen::GenStatus;
use pdfquiz::session::results::ResultsView;
use pdfquiz::session::test_run::RunMode;
use pdfquiz::store::db::Store;
use pdfquiz::store::schema::QuestionType;
use pdfquiz::ui;
use pdfquiz::ui::theme::Theme;

struct FakeExtractor;

impl TextExtractor for FakeExtractor {
    fn extract_text(&self, path: &Path) -> Result<String, PdfError> {
        if path.to_string_lossy().contains("broken") {
            return Err(PdfError::NoText);
        }
        Ok("Photosynthesis converts light into chemical energy.".to_string())
    }

    fn validate_pdf(&self, _path: &Path) -> Result<(), PdfError> {
        Ok(())
    }
}

enum FakeGenerator {
    Questions(Vec<GeneratedQuestion>),
    Fails,
}

impl QuestionGenerator for FakeGenerator {
    fn generate(
        &self,
        _text: &str,
        count: usize,
        _types: &[QuestionType],
    ) -> Result<Vec<GeneratedQuestion>, GenerateError> {
        match self {
            FakeGenerator::Questions(qs) => Ok(qs.iter().take(count).cloned().collect()),
            FakeGenerator::Fails => Err(GenerateError::Api {
                status: 429,
                body: "rate limited".to_string(),
            }),
        }
    }
}

fn sample_questions() -> Vec<GeneratedQuestion> {
    vec![
        GeneratedQuestion {
            question: "What does photosynthesis produce?".to_string(),
            kind: QuestionType::MultipleChoice,
            options: vec!["Chemical energy".into(), "Sound".into(), "Rust".into()],
            correct_answer: "A".to_string(),
            explanation: "Light becomes chemical energy.".to_string(),
        },
        GeneratedQuestion {
            question: "Photosynthesis needs light.".to_string(),
            kind: QuestionType::TrueFalse,
            options: Vec::new(),
            correct_answer: "true".to_string(),
            explanation: String::new(),
        },
    ]
}

fn app_with(generator: FakeGenerator, pdf_dir: &Path) -> App {
    let config = Config {
        pdf_dir: pdf_dir.to_path_buf(),
        ..Config::default()
    };
    let services = Services {
        store: Store::in_memory().unwrap(),
        extractor: Box::new(FakeExtractor),
        generator: Box::new(generator),
        config,
        config_path: None,
    };
    App::new(services, Theme::default())
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn press_all(app: &mut App, codes: &[KeyCode]) {
    for &code in codes {
        app.press(key(code));
    }
}

fn type_line(app: &mut App, text: &str) {
    for ch in text.chars() {
        app.press(key(KeyCode::Char(ch)));
    }
    app.press(key(KeyCode::Enter));
}

fn flash(app: &App) -> String {
    app.menu
        .flash
        .as_ref()
        .map(|m| m.text().to_string())
        .unwrap_or_default()
}

fn screen_text(app: &App) -> String {
    let mut terminal = Terminal::new(TestBackend::new(100, 32)).unwrap();
    terminal.draw(|frame| ui::render(frame, app)).unwrap();
    let buffer = terminal.backend().buffer();
    let mut out = String::new();
    for y in 0..buffer.area.height {
        for x in 0..buffer.area.width {
            out.push_str(buffer[(x, y)].symbol());
        }
        out.push('\n');
    }
    out
}

#[test]
fn test_pdf_generation_flow_saves_test() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("biology.pdf"), "").unwrap();
    let mut app = app_with(FakeGenerator::Questions(sample_questions()), dir.path());

    app.press(key(KeyCode::Char('1')));
    assert!(matches!(app.screen, Screen::FileSelection));
    assert_eq!(app.files.files.len(), 1);

    app.press(key(KeyCode::Enter));
    app.press(key(KeyCode::Enter));
    match &app.screen {
        Screen::PdfProcess(wizard) => {
            assert_eq!(wizard.step, WizardStep::Configure);
            assert!(wizard.text.is_some());
        }
        _ => panic!("expected the PDF wizard"),
    }

    press_all(&mut app, &[KeyCode::Enter, KeyCode::Enter]);
    assert!(matches!(app.screen, Screen::MainMenu));
    assert_eq!(
        flash(&app),
        "Successfully generated 2 questions for 'Generated Test'!"
    );

    let tests = app.services.store.get_all_tests().unwrap();
    assert_eq!(tests.len(), 1);
    assert_eq!(tests[0].description, "Test generated from PDF");
    assert_eq!(app.services.store.count_questions(tests[0].id).unwrap(), 2);
}

#[test]
fn test_generation_failure_offers_retry() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("notes.pdf"), "").unwrap();
    let mut app = app_with(FakeGenerator::Fails, dir.path());

    press_all(
        &mut app,
        &[KeyCode::Char('1'), KeyCode::Enter, KeyCode::Enter, KeyCode::Enter, KeyCode::Enter],
    );
    match &app.screen {
        Screen::QuestionGen(generation) => match &generation.status {
            GenStatus::Failed(reason) => assert!(reason.contains("rate limited")),
            GenStatus::Generating => panic!("generation should have run"),
        },
        _ => panic!("expected the generation screen"),
    }
    assert!(screen_text(&app).contains("Generation failed"));

    app.press(key(KeyCode::Char('r')));
    match &app.screen {
        Screen::PdfProcess(wizard) => assert_eq!(wizard.step, WizardStep::Generate),
        _ => panic!("expected the wizard again"),
    }
    assert!(app.services.store.get_all_tests().unwrap().is_empty());
}

#[test]
fn test_extraction_failure_stays_on_extract_step() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("broken.pdf"), "").unwrap();
    let mut app = app_with(FakeGenerator::Fails, dir.path());

    press_all(&mut app, &[KeyCode::Char('1'), KeyCode::Enter, KeyCode::Enter]);
    match &app.screen {
        Screen::PdfProcess(wizard) => {
            assert_eq!(wizard.step, WizardStep::Extract);
            assert!(!wizard.loading);
            let message = wizard.message.as_ref().unwrap();
            assert!(message.text().starts_with("Failed to extract text:"));
        }
        _ => panic!("expected the PDF wizard"),
    }
}

#[test]
fn test_input_is_ignored_while_a_job_is_pending() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("doc.pdf"), "").unwrap();
    let mut app = app_with(FakeGenerator::Fails, dir.path());

    press_all(&mut app, &[KeyCode::Char('1'), KeyCode::Enter]);
    app.handle_key(key(KeyCode::Enter));
    assert!(app.is_busy());
    assert!(screen_text(&app).contains("Extracting text from PDF..."));

    app.handle_key(key(KeyCode::Esc));
    assert!(matches!(app.screen, Screen::PdfProcess(_)));

    app.run_pending();
    assert!(!app.is_busy());
}

fn create_custom_true_false_test(app: &mut App) {
    app.press(key(KeyCode::Char('2')));
    app.press(key(KeyCode::Enter));
    app.press(key(KeyCode::Char('t')));
    app.press(key(KeyCode::Down));
    app.press(key(KeyCode::Char('q')));
    type_line(app, "Water boils at 100C at sea level.");
    press_all(app, &[KeyCode::Down, KeyCode::Down]);
    app.press(key(KeyCode::Char('a')));
    type_line(app, "true");
    app.press(key(KeyCode::Char('s')));
    app.press(key(KeyCode::Char('f')));
    app.press(key(KeyCode::Enter));
}

#[test]
fn test_custom_test_then_take_and_review() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app_with(FakeGenerator::Fails, dir.path());

    create_custom_true_false_test(&mut app);
    assert!(matches!(app.screen, Screen::MainMenu));
    assert_eq!(flash(&app), "Saved 'Custom Test' with 1 questions");

    app.press(key(KeyCode::Char('3')));
    app.press(key(KeyCode::Enter));
    assert!(matches!(app.screen, Screen::TestTaking(_)));
    app.press(key(KeyCode::Enter));
    match &app.screen {
        Screen::TestTaking(run) => {
            assert_eq!(run.mode, RunMode::Finished);
            assert_eq!(run.score_line(), "Score: 100.0% (1/1 correct)");
        }
        _ => panic!("expected the finished test"),
    }
    app.press(key(KeyCode::Enter));
    assert_eq!(flash(&app), "Result saved: 100.0% (A)");

    app.press(key(KeyCode::Char('4')));
    app.press(key(KeyCode::Enter));
    app.press(key(KeyCode::Enter));
    match &app.screen {
        Screen::TestResults(browser) => {
            assert_eq!(browser.view, ResultsView::Detail);
            assert_eq!(browser.details.len(), 1);
            assert!(browser.details[0].is_correct);
        }
        _ => panic!("expected the results browser"),
    }
    assert!(screen_text(&app).contains("Water boils at 100C"));
}

#[test]
fn test_esc_discards_test_in_progress() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app_with(FakeGenerator::Fails, dir.path());
    create_custom_true_false_test(&mut app);

    press_all(&mut app, &[KeyCode::Char('3'), KeyCode::Enter, KeyCode::Enter]);
    app.press(key(KeyCode::Esc));
    assert!(matches!(app.screen, Screen::MainMenu));
    assert!(app.services.store.get_all_test_results().unwrap().is_empty());
}

#[test]
fn test_directory_prompt_esc_only_closes_prompt() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app_with(FakeGenerator::Fails, dir.path());

    app.press(key(KeyCode::Char('1')));
    app.press(key(KeyCode::Char('c')));
    assert!(app.files.is_editing());
    app.press(key(KeyCode::Esc));
    assert!(matches!(app.screen, Screen::FileSelection));
    assert!(!app.files.is_editing());

    app.press(key(KeyCode::Char('c')));
    app.press(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
    type_line(&mut app, "/no/such/pdfquiz/dir");
    let message = app.files.message.as_ref().unwrap();
    assert_eq!(message.text(), "Directory does not exist");
    assert_eq!(app.files.dir, dir.path());
}

#[test]
fn test_every_screen_renders() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("chapter.pdf"), "").unwrap();
    let mut app = app_with(FakeGenerator::Questions(sample_questions()), dir.path());

    assert!(screen_text(&app).contains("PDF Test Generator"));
    app.press(key(KeyCode::Char('1')));
    assert!(screen_text(&app).contains("chapter.pdf"));
    app.press(key(KeyCode::Enter));
    assert!(screen_text(&app).contains("Step 1 of 3"));
    app.press(key(KeyCode::Enter));
    assert!(screen_text(&app).contains("Number of questions: 5"));
    app.press(key(KeyCode::Esc));

    app.press(key(KeyCode::Char('2')));
    assert!(screen_text(&app).contains("Create Custom Test"));
    app.press(key(KeyCode::Esc));

    app.press(key(KeyCode::Char('3')));
    assert!(screen_text(&app).contains("No tests yet"));
    app.press(key(KeyCode::Esc));

    app.press(key(KeyCode::Char('4')));
    assert!(screen_text(&app).contains("View Tests"));
}
