use design_lens::common::CommonParams;
use design_lens::config::{API_URL_ENV, Config, PROVIDER_ENV};
use design_lens::types::ScoreLevel;
use design_lens::{AnalysisError, ImageFile, Provider, ServiceFactory};
use std::collections::HashMap;
use std::fs;
use tempfile::TempDir;

fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |name| vars.get(name).cloned()
}

#[test]
fn test_file_then_env_precedence() {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let path = temp_dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
default_provider = "openai"

[providers.openai]
api_key = "sk-from-file"
model = "gpt-4o-mini"
"#,
    )
    .expect("Failed to write config file");

    let mut config = Config::load_from(&path).expect("Failed to load config");
    config
        .apply_env_with(env(&[
            (PROVIDER_ENV, "openai"),
            ("OPENAI_API_KEY", "sk-from-env"),
            (API_URL_ENV, "http://127.0.0.1:1/v1/chat/completions"),
        ]))
        .expect("Failed to apply env");

    let openai = config.default_provider_config();
    assert_eq!(openai.credential(), Some("sk-from-env"));
    assert_eq!(openai.effective_model(), Some("gpt-4o-mini"));
    assert_eq!(
        openai.api_url.as_deref(),
        Some("http://127.0.0.1:1/v1/chat/completions")
    );
}

#[test]
fn test_invalid_file_is_reported_with_path() {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let path = temp_dir.path().join("config.toml");
    fs::write(&path, "default_provider = \"midjourney\"\n").expect("Failed to write config file");

    let err = Config::load_from(&path).expect_err("unknown provider tag");
    assert!(format!("{err:#}").contains("config.toml"));
}

#[test]
fn test_common_params_override_default_provider() {
    let mut config = Config::default();
    let common = CommonParams {
        provider: Some("gemini".to_string()),
    };
    common
        .apply_to_config(&mut config)
        .expect("Failed to apply params");

    let factory = ServiceFactory::new(config);
    let err = factory.default_service().err().expect("no Gemini key");
    assert!(matches!(err, AnalysisError::MissingCredential(Provider::Gemini)));
}

#[tokio::test]
async fn test_default_mock_flow_from_disk() {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let image_path = temp_dir.path().join("mockup.jpg");
    let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
    bytes.resize(50 * 1024, 0x11);
    fs::write(&image_path, &bytes).expect("Failed to write image");

    let mut config = Config::default();
    config.analysis.mock_delay_ms = 0;
    let factory = ServiceFactory::new(config);

    let image = ImageFile::from_path(&image_path, factory.config().analysis.max_file_size)
        .await
        .expect("Failed to load image");
    let result = factory
        .analyze(&image, None)
        .await
        .expect("mock analysis never fails");

    assert_eq!(result.file_name(), "mockup.jpg");
    assert_eq!(result.image_ref(), image_path.display().to_string());
    assert_eq!(result.overall_score(), result.computed_overall_score());
    assert!(ScoreLevel::from_score(result.overall_score()) >= ScoreLevel::NeedsWork);
    for (_, entry) in result.dimensions().iter() {
        assert!((60..=94).contains(&entry.score));
        assert_eq!(entry.suggestions.len(), 3);
    }

    let json = serde_json::to_value(&result).expect("Failed to serialize result");
    assert!(json.get("overallScore").is_some());
    assert!(json["dimensions"]["hierarchy"]["issues"].is_array());
}

#[tokio::test]
async fn test_oversized_file_is_rejected_before_analysis() {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let image_path = temp_dir.path().join("huge.png");
    let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
    bytes.resize(2048, 0);
    fs::write(&image_path, &bytes).expect("Failed to write image");

    let err = ImageFile::from_path(&image_path, 1024)
        .await
        .expect_err("over the limit");
    assert!(matches!(
        err,
        AnalysisError::FileTooLarge {
            size: 2048,
            limit: 1024
        }
    ));
}
