//! Commit sequencing, partial failure and replay behaviour

mod common;

use anyhow::Result;
use common::{Call, FakeBackend, ready_configuration};
use pms_wizard::wizard::{CommitCoordinator, CommitError, CommitPhase, PhaseStatus, ReplayPolicy, WizardConfiguration};
use std::sync::Arc;

fn coordinator(backend: &Arc<FakeBackend>, policy: ReplayPolicy) -> CommitCoordinator {
    CommitCoordinator::new(backend.clone(), policy)
}

#[tokio::test]
async fn test_commit_runs_phases_in_order() -> Result<()> {
    let backend = Arc::new(FakeBackend::new());
    let mut config = ready_configuration();

    let report = coordinator(&backend, ReplayPolicy::default()).commit(&mut config).await?;

    assert_eq!(backend.calls(), vec![Call::Register, Call::UploadMapping, Call::UploadTranslator]);
    assert_eq!(report.executed, CommitPhase::ALL.to_vec());
    assert!(report.skipped.is_empty());
    assert!(config.commit_saga().is_complete());

    let registration = backend.registrations.lock().unwrap()[0].clone();
    assert_eq!(registration.code, "cb");
    assert_eq!(registration.description, "Cloud PMS");
    assert!(!registration.combined_avail_rate);

    let uploads = backend.uploads.lock().unwrap().clone();
    assert_eq!(uploads[0], (Call::UploadMapping, "cb".to_string(), "pms_code: cb\n".to_string()));
    assert_eq!(uploads[1].0, Call::UploadTranslator);
    Ok(())
}

#[tokio::test]
async fn test_mapping_upload_failure_stops_before_translator() {
    let backend = Arc::new(FakeBackend::new());
    backend.fail(Call::UploadMapping);
    let mut config = ready_configuration();

    let err = coordinator(&backend, ReplayPolicy::default())
        .commit(&mut config)
        .await
        .unwrap_err();

    assert_eq!(err.phase(), Some(CommitPhase::MappingUpload));
    assert!(err.to_string().starts_with("mapping upload failed"));
    assert_eq!(backend.count(Call::UploadTranslator), 0);
    assert_eq!(config.commit_saga().status(CommitPhase::Registration), &PhaseStatus::Done);
    assert!(matches!(
        config.commit_saga().status(CommitPhase::MappingUpload),
        PhaseStatus::Failed(reason) if reason.contains("503")
    ));
}

#[tokio::test]
async fn test_replay_all_registers_again() -> Result<()> {
    let backend = Arc::new(FakeBackend::new());
    backend.fail(Call::UploadMapping);
    let coordinator = coordinator(&backend, ReplayPolicy::ReplayAll);
    let mut config = ready_configuration();

    assert!(coordinator.commit(&mut config).await.is_err());

    backend.succeed(Call::UploadMapping);
    let report = coordinator.commit(&mut config).await?;

    assert_eq!(backend.count(Call::Register), 2);
    assert_eq!(backend.count(Call::UploadMapping), 2);
    assert_eq!(backend.count(Call::UploadTranslator), 1);
    assert!(report.skipped.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_resume_skips_completed_registration() -> Result<()> {
    let backend = Arc::new(FakeBackend::new());
    backend.fail(Call::UploadMapping);
    let coordinator = coordinator(&backend, ReplayPolicy::ResumeFromFailure);
    let mut config = ready_configuration();

    assert!(coordinator.commit(&mut config).await.is_err());

    backend.succeed(Call::UploadMapping);
    let report = coordinator.commit(&mut config).await?;

    assert_eq!(backend.count(Call::Register), 1);
    assert_eq!(report.skipped, vec![CommitPhase::Registration]);
    assert_eq!(report.executed, vec![CommitPhase::MappingUpload, CommitPhase::TranslatorUpload]);
    assert!(config.commit_saga().is_complete());
    Ok(())
}

#[tokio::test]
async fn test_registration_failure_reports_registration_phase() {
    let backend = Arc::new(FakeBackend::new());
    backend.fail(Call::Register);
    let mut config = ready_configuration();

    let err = coordinator(&backend, ReplayPolicy::default())
        .commit(&mut config)
        .await
        .unwrap_err();

    assert_eq!(err.phase(), Some(CommitPhase::Registration));
    assert_eq!(backend.calls(), vec![Call::Register]);
}

#[tokio::test]
async fn test_incomplete_configuration_makes_no_calls() {
    let backend = Arc::new(FakeBackend::new());
    let mut config = WizardConfiguration::new();
    config.pms_code = "cb".to_string();
    config.pms_name = "Cloudbeds".to_string();

    let err = coordinator(&backend, ReplayPolicy::default())
        .commit(&mut config)
        .await
        .unwrap_err();

    assert!(matches!(err, CommitError::Incomplete { ref missing } if missing.len() == 2));
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_regenerated_artifacts_are_uploaded_again() -> Result<()> {
    let backend = Arc::new(FakeBackend::new());
    let coordinator = coordinator(&backend, ReplayPolicy::ResumeFromFailure);
    let mut config = ready_configuration();
    coordinator.commit(&mut config).await?;

    config.store_generated(pms_wizard::api::GenerateResponse {
        translator_code: "class Translator2:\n    pass\n".to_string(),
        mapping_yaml: "pms_code: cb\nversion: 2\n".to_string(),
    });
    let report = coordinator.commit(&mut config).await?;

    assert_eq!(report.skipped, vec![CommitPhase::Registration]);
    assert_eq!(backend.count(Call::UploadMapping), 2);
    assert_eq!(backend.count(Call::UploadTranslator), 2);
    Ok(())
}

#[tokio::test]
async fn test_changed_code_is_registered_before_uploads() -> Result<()> {
    let backend = Arc::new(FakeBackend::new());
    backend.fail(Call::UploadMapping);
    let coordinator = coordinator(&backend, ReplayPolicy::ResumeFromFailure);
    let mut config = ready_configuration();

    assert!(coordinator.commit(&mut config).await.is_err());

    config.pms_code = "cloudbeds".to_string();
    config.store_generated(pms_wizard::api::GenerateResponse {
        translator_code: "class Translator:\n    pass\n".to_string(),
        mapping_yaml: "pms_code: cloudbeds\n".to_string(),
    });
    backend.succeed(Call::UploadMapping);
    let report = coordinator.commit(&mut config).await?;

    let registered: Vec<_> = backend.registrations.lock().unwrap().iter().map(|r| r.code.clone()).collect();
    assert_eq!(registered, vec!["cb".to_string(), "cloudbeds".to_string()]);
    assert!(report.skipped.is_empty());
    assert_eq!(report.executed, CommitPhase::ALL.to_vec());

    let uploads = backend.uploads.lock().unwrap().clone();
    assert_eq!(uploads.len(), 2);
    assert!(uploads.iter().all(|(_, code, _)| code == "cloudbeds"));
    assert_eq!(config.commit_saga().registered().map(|r| r.code.as_str()), Some("cloudbeds"));
    Ok(())
}

#[tokio::test]
async fn test_changed_description_after_full_commit_registers_again() -> Result<()> {
    let backend = Arc::new(FakeBackend::new());
    let coordinator = coordinator(&backend, ReplayPolicy::ResumeFromFailure);
    let mut config = ready_configuration();
    coordinator.commit(&mut config).await?;

    config.description = "Cloud-hosted PMS".to_string();
    let report = coordinator.commit(&mut config).await?;

    assert_eq!(backend.count(Call::Register), 2);
    assert_eq!(backend.count(Call::UploadMapping), 2);
    assert!(report.skipped.is_empty());
    Ok(())
}
