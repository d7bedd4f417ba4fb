use newsletter_brands::config::{ConfigError, ConfigLoader};
use std::{
    env, fs,
    path::PathBuf,
    sync::{Mutex, MutexGuard, OnceLock},
};
use tempfile::TempDir;

fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

fn env_guard() -> MutexGuard<'static, ()> {
    env_lock()
        .lock()
        .unwrap_or_else(|poison| poison.into_inner())
}

fn clear_env() {
    unsafe {
        env::remove_var("NEWSLETTER_PROFILE");
        env::remove_var("NEWSLETTER_LOG_LEVEL");
        env::remove_var("NEWSLETTER_LOG_FORMAT");
        env::remove_var("NEWSLETTER_DATABASE_URL");
        env::remove_var("NEWSLETTER_RESOLVER_CONFLICT_RETRY_LIMIT");
        env::remove_var("NEWSLETTER_RESOLVER_SLUG_SUFFIX_LIMIT");
        env::remove_var("NEWSLETTER_SUMMARIZER_MAX_INPUT_CHARS");
    }
}

fn write_env_file(dir: &TempDir, name: &str, contents: &str) {
    let path = dir.path().join(name);
    fs::write(path, contents).unwrap();
}

#[test]
fn loads_defaults_when_no_env_present() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    let loader = ConfigLoader::with_base_dir(PathBuf::from(temp_dir.path()));
    let cfg = loader.load().expect("config loads with defaults");

    assert_eq!(cfg.profile, "local");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.log_format, "json");
    assert_eq!(cfg.resolver.conflict_retry_limit, 3);
    assert_eq!(cfg.resolver.slug_suffix_limit, None);
    assert_eq!(cfg.summarizer.max_input_chars, 4000);
    clear_env();
}

#[test]
fn layered_env_files_apply_in_order() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(
        &temp_dir,
        ".env",
        "NEWSLETTER_DATABASE_URL=sqlite://base.db\nNEWSLETTER_RESOLVER_CONFLICT_RETRY_LIMIT=2\n",
    );
    write_env_file(
        &temp_dir,
        ".env.test",
        "NEWSLETTER_DATABASE_URL=sqlite://test.db\n",
    );
    write_env_file(
        &temp_dir,
        ".env.test.local",
        "NEWSLETTER_DATABASE_URL=sqlite://test-local.db\n",
    );

    // Select profile via .env.local before profile-specific files load.
    write_env_file(
        &temp_dir,
        ".env.local",
        "NEWSLETTER_PROFILE=test\nNEWSLETTER_DATABASE_URL=sqlite://local.db\nUNRELATED_KEY=ignored\n",
    );

    let loader = ConfigLoader::with_base_dir(PathBuf::from(temp_dir.path()));
    let cfg = loader.load().expect("config loads with layered env files");

    assert_eq!(cfg.profile, "test");
    assert_eq!(cfg.database_url, "sqlite://test-local.db");
    assert_eq!(cfg.resolver.conflict_retry_limit, 2);
    clear_env();
}

#[test]
fn os_environment_has_highest_precedence() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(
        &temp_dir,
        ".env",
        "NEWSLETTER_LOG_FORMAT=json\nNEWSLETTER_RESOLVER_SLUG_SUFFIX_LIMIT=50\n",
    );

    unsafe {
        env::set_var("NEWSLETTER_LOG_FORMAT", "Pretty");
        env::set_var("NEWSLETTER_RESOLVER_SLUG_SUFFIX_LIMIT", "500");
    }

    let loader = ConfigLoader::with_base_dir(PathBuf::from(temp_dir.path()));
    let cfg = loader.load().expect("config loads with env override");
    assert_eq!(cfg.log_format, "pretty");
    assert_eq!(cfg.resolver.slug_suffix_limit, Some(500));

    clear_env();
}

#[test]
fn invalid_numeric_value_names_the_variable() {
    let _guard = env_guard();
    clear_env();

    unsafe {
        env::set_var("NEWSLETTER_SUMMARIZER_MAX_INPUT_CHARS", "lots");
    }

    let temp_dir = TempDir::new().unwrap();
    let loader = ConfigLoader::with_base_dir(PathBuf::from(temp_dir.path()));
    let err = loader.load().expect_err("non-numeric value should fail");
    assert!(format!("{}", err).contains("NEWSLETTER_SUMMARIZER_MAX_INPUT_CHARS"));

    clear_env();
}

#[test]
fn out_of_range_retry_limit_is_rejected() {
    let _guard = env_guard();
    clear_env();

    unsafe {
        env::set_var("NEWSLETTER_RESOLVER_CONFLICT_RETRY_LIMIT", "0");
    }

    let temp_dir = TempDir::new().unwrap();
    let loader = ConfigLoader::with_base_dir(PathBuf::from(temp_dir.path()));
    let err = loader.load().expect_err("zero retries should fail");
    assert!(matches!(
        err,
        ConfigError::InvalidConflictRetryLimit { value: 0 }
    ));

    clear_env();
}
