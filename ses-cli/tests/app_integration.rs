//! Integration tests driving the CLI application context end to end.

use pretty_assertions::assert_eq;
use ses_cli::app::{App, CaseDraft, CaseNotFound, RemoveOutcome};
use ses_cli::config::{AppConfig, Overrides};
use ses_core::{Case, CaseField, StepDirection, Totals};
use tempfile::TempDir;

fn sqlite_config(dir: &TempDir) -> AppConfig {
    AppConfig::default().apply(Overrides {
        db: Some(dir.path().join("cases.db").display().to_string()),
        ..Default::default()
    })
}

fn memory_config() -> AppConfig {
    AppConfig::default().apply(Overrides {
        backend: Some("memory".to_string()),
        ..Default::default()
    })
}

#[tokio::test]
async fn test_new_session_shows_sample_totals() {
    let app = App::open(&memory_config(), false).await.unwrap();

    let table = app.table();

    assert_eq!(table.rows.len(), 1);
    assert_eq!(
        table.totals,
        Totals {
            sales: 5_400_000,
            profit: 1_800_000,
        }
    );
}

#[tokio::test]
async fn test_tax_mode_is_per_session() {
    let app = App::open(&memory_config(), true).await.unwrap();

    assert!(app.store().tax_included());
    assert_eq!(
        app.table().totals,
        Totals {
            sales: 5_940_000,
            profit: 1_980_000,
        }
    );
}

#[tokio::test]
async fn test_add_with_draft_coerces_fields() {
    let mut app = App::open(&memory_config(), false).await.unwrap();
    let draft = CaseDraft {
        name: Some("INFRA".to_string()),
        sales: Some("700,000".to_string()),
        cost: Some("-1".to_string()),
        duration: Some("4.5".to_string()),
    };

    let case = app.add_case(&draft).await.unwrap();

    assert_eq!(
        case,
        Case {
            id: 2,
            name: "INFRA".to_string(),
            sales: 700_000,
            cost: 0,
            duration: 4,
        }
    );
}

#[tokio::test]
async fn test_edits_persist_between_sessions() {
    let dir = TempDir::new().unwrap();
    let config = sqlite_config(&dir);

    {
        let mut app = App::open(&config, false).await.unwrap();
        app.add_case(&CaseDraft::default()).await.unwrap();
        app.set_field(2, CaseField::Sales, "500000").await.unwrap();
        app.step_field(2, CaseField::Cost, StepDirection::Up).await.unwrap();
        app.step_field(2, CaseField::Duration, StepDirection::Up).await.unwrap();
    }

    let app = App::open(&config, false).await.unwrap();

    assert_eq!(
        app.store().get(2),
        Some(&Case {
            id: 2,
            name: String::new(),
            sales: 500_000,
            cost: 10_000,
            duration: 2,
        })
    );
}

#[tokio::test]
async fn test_set_field_on_unknown_case_fails() {
    let mut app = App::open(&memory_config(), false).await.unwrap();

    let err = app.set_field(42, CaseField::Name, "ghost").await.unwrap_err();

    assert_eq!(err.downcast_ref::<CaseNotFound>(), Some(&CaseNotFound(42)));
    assert_eq!(err.to_string(), "no case with id 42");
    assert_eq!(app.store().cases(), &[Case::sample()]);
}

#[tokio::test]
async fn test_step_field_on_unknown_case_fails() {
    let mut app = App::open(&memory_config(), false).await.unwrap();

    let err = app
        .step_field(7, CaseField::Sales, StepDirection::Up)
        .await
        .unwrap_err();

    assert_eq!(err.downcast_ref::<CaseNotFound>(), Some(&CaseNotFound(7)));
}

#[tokio::test]
async fn test_remove_respects_confirmation() {
    let mut app = App::open(&memory_config(), false).await.unwrap();

    let cancelled = app.remove_case(1, |_| Ok(false)).await.unwrap();
    assert_eq!(cancelled, RemoveOutcome::Cancelled);
    assert_eq!(app.store().cases().len(), 1);

    let removed = app.remove_case(1, |_| Ok(true)).await.unwrap();
    assert_eq!(removed, RemoveOutcome::Removed(Case::sample()));
    assert!(app.store().cases().is_empty());
}

#[tokio::test]
async fn test_remove_unknown_case_skips_confirmation() {
    let mut app = App::open(&memory_config(), false).await.unwrap();

    let outcome = app
        .remove_case(9, |_| panic!("confirmation should not be asked"))
        .await
        .unwrap();

    assert_eq!(outcome, RemoveOutcome::NotFound);
}

#[tokio::test]
async fn test_export_writes_csv_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cases.csv");
    let app = App::open(&memory_config(), false).await.unwrap();

    let written = app.export(&path).unwrap();

    assert_eq!(written, 1);
    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[2], ",TOTAL,,,,5400000,1800000,tax excl.");
}

#[tokio::test]
async fn test_reset_forgets_saved_cases() {
    let dir = TempDir::new().unwrap();
    let config = sqlite_config(&dir);

    {
        let mut app = App::open(&config, false).await.unwrap();
        app.remove_case(1, |_| Ok(true)).await.unwrap();
        app.reset().await.unwrap();
    }

    let app = App::open(&config, false).await.unwrap();

    assert_eq!(app.store().cases(), &[Case::sample()]);
}

#[tokio::test]
async fn test_unknown_backend_fails_to_open() {
    let config = AppConfig::default().apply(Overrides {
        backend: Some("postgres".to_string()),
        ..Default::default()
    });

    let err = App::open(&config, false).await.err().unwrap();

    assert!(format!("{err:#}").contains("unknown backend 'postgres'"), "{err:#}");
}
