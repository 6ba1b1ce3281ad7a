use super::*;
use serial_test::serial;
use std::env;
use std::path::PathBuf;

use crate::gateway::GatewayConfig;

fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, value) in vars {
        unsafe { env::set_var(key, value) };
    }

    let result = f();

    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, _) in vars {
        unsafe { env::remove_var(key) };
    }

    result
}

fn clear_relevance_env() {
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    unsafe {
        env::remove_var("RELEVANCE_MAX_CALLS");
        env::remove_var("RELEVANCE_WINDOW_SECS");
        env::remove_var("RELEVANCE_CACHE_CAPACITY");
        env::remove_var("RELEVANCE_WORKER_POOL_SIZE");
        env::remove_var("RELEVANCE_INIT_RETRY_COUNT");
        env::remove_var("RELEVANCE_INIT_BACKOFF_MS");
        env::remove_var("RELEVANCE_MODEL_PATH");
        env::remove_var("RELEVANCE_DEVICE");
    }
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.max_calls_per_window, 1000);
    assert_eq!(config.window_secs, 3600);
    assert_eq!(config.window(), Duration::from_secs(3600));
    assert_eq!(config.cache_capacity, 1000);
    assert_eq!(config.worker_pool_size, 4);
    assert_eq!(config.init_retry_count, 3);
    assert_eq!(config.init_backoff_base, Duration::from_secs(1));
    assert!(config.model_path.is_none());
    assert_eq!(config.device, DevicePreference::Auto);
}

#[test]
#[serial]
fn test_from_env_with_defaults() {
    clear_relevance_env();

    let config = Config::from_env().expect("should parse with defaults");

    assert_eq!(config, Config::default());
}

#[test]
#[serial]
fn test_full_config_parse() {
    clear_relevance_env();

    let config = with_env_vars(
        &[
            ("RELEVANCE_MAX_CALLS", "50"),
            ("RELEVANCE_WINDOW_SECS", "60"),
            ("RELEVANCE_CACHE_CAPACITY", "200"),
            ("RELEVANCE_WORKER_POOL_SIZE", "2"),
            ("RELEVANCE_INIT_RETRY_COUNT", "5"),
            ("RELEVANCE_INIT_BACKOFF_MS", "250"),
            ("RELEVANCE_MODEL_PATH", "/models/minilm"),
            ("RELEVANCE_DEVICE", "cpu"),
        ],
        Config::from_env,
    )
    .expect("should parse full config");

    assert_eq!(config.max_calls_per_window, 50);
    assert_eq!(config.window_secs, 60);
    assert_eq!(config.cache_capacity, 200);
    assert_eq!(config.worker_pool_size, 2);
    assert_eq!(config.init_retry_count, 5);
    assert_eq!(config.init_backoff_base, Duration::from_millis(250));
    assert_eq!(config.model_path, Some(PathBuf::from("/models/minilm")));
    assert_eq!(config.device, DevicePreference::Cpu);
}

#[test]
#[serial]
fn test_from_env_trims_numbers() {
    clear_relevance_env();

    let config = with_env_vars(&[("RELEVANCE_MAX_CALLS", " 42 ")], Config::from_env)
        .expect("should parse padded number");

    assert_eq!(config.max_calls_per_window, 42);
}

#[test]
#[serial]
fn test_invalid_number() {
    clear_relevance_env();

    let result = with_env_vars(&[("RELEVANCE_CACHE_CAPACITY", "lots")], Config::from_env);

    match result {
        Err(ConfigError::InvalidNumber { name, value, .. }) => {
            assert_eq!(name, "RELEVANCE_CACHE_CAPACITY");
            assert_eq!(value, "lots");
        }
        other => panic!("expected InvalidNumber, got {other:?}"),
    }
}

#[test]
#[serial]
fn test_negative_number_rejected() {
    clear_relevance_env();

    let result = with_env_vars(&[("RELEVANCE_WINDOW_SECS", "-5")], Config::from_env);

    assert!(matches!(result, Err(ConfigError::InvalidNumber { .. })));
}

#[test]
#[serial]
fn test_retry_count_overflow_rejected() {
    clear_relevance_env();

    let result = with_env_vars(
        &[("RELEVANCE_INIT_RETRY_COUNT", "99999999999")],
        Config::from_env,
    );

    assert!(matches!(result, Err(ConfigError::InvalidNumber { .. })));
}

#[test]
#[serial]
fn test_invalid_device() {
    clear_relevance_env();

    let result = with_env_vars(&[("RELEVANCE_DEVICE", "tpu")], Config::from_env);

    assert!(matches!(result, Err(ConfigError::InvalidDevice { .. })));
}

#[test]
#[serial]
fn test_gpu_device_names_parse() {
    clear_relevance_env();

    let cuda = with_env_vars(&[("RELEVANCE_DEVICE", "cuda")], Config::from_env)
        .expect("cuda should parse");
    let metal = with_env_vars(&[("RELEVANCE_DEVICE", "METAL")], Config::from_env)
        .expect("metal should parse");

    assert_eq!(cuda.device, DevicePreference::Cuda);
    assert_eq!(metal.device, DevicePreference::Metal);
}

#[test]
#[serial]
fn test_blank_model_path_is_none() {
    clear_relevance_env();

    let config = with_env_vars(&[("RELEVANCE_MODEL_PATH", "   ")], Config::from_env)
        .expect("should parse");

    assert!(config.model_path.is_none());
}

#[test]
fn test_validate_success_with_defaults() {
    assert!(Config::default().validate().is_ok());
}

#[test]
fn test_validate_rejects_zero_values() {
    let cases = [
        (
            Config {
                max_calls_per_window: 0,
                ..Default::default()
            },
            "RELEVANCE_MAX_CALLS",
        ),
        (
            Config {
                window_secs: 0,
                ..Default::default()
            },
            "RELEVANCE_WINDOW_SECS",
        ),
        (
            Config {
                cache_capacity: 0,
                ..Default::default()
            },
            "RELEVANCE_CACHE_CAPACITY",
        ),
        (
            Config {
                worker_pool_size: 0,
                ..Default::default()
            },
            "RELEVANCE_WORKER_POOL_SIZE",
        ),
        (
            Config {
                init_retry_count: 0,
                ..Default::default()
            },
            "RELEVANCE_INIT_RETRY_COUNT",
        ),
    ];

    for (config, expected) in cases {
        match config.validate() {
            Err(ConfigError::ZeroValue { name }) => assert_eq!(name, expected),
            other => panic!("expected ZeroValue for {expected}, got {other:?}"),
        }
    }
}

#[test]
fn test_zero_backoff_is_allowed() {
    let config = Config {
        init_backoff_base: Duration::ZERO,
        ..Default::default()
    };
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_nonexistent_model_path() {
    let config = Config {
        model_path: Some(PathBuf::from("/nonexistent/model/dir")),
        ..Default::default()
    };

    assert!(matches!(
        config.validate(),
        Err(ConfigError::PathNotFound { .. })
    ));
}

#[test]
fn test_validate_model_path_is_file() {
    let file = tempfile::NamedTempFile::new().expect("temp file");
    let config = Config {
        model_path: Some(file.path().to_path_buf()),
        ..Default::default()
    };

    assert!(matches!(
        config.validate(),
        Err(ConfigError::NotADirectory { .. })
    ));
}

#[test]
fn test_validate_success_with_model_dir() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = Config {
        model_path: Some(dir.path().to_path_buf()),
        ..Default::default()
    };

    assert!(config.validate().is_ok());
}

#[test]
fn test_gateway_config_from_config() {
    let config = Config {
        max_calls_per_window: 10,
        window_secs: 30,
        cache_capacity: 5,
        worker_pool_size: 2,
        init_retry_count: 4,
        init_backoff_base: Duration::from_millis(10),
        ..Default::default()
    };

    let gateway = GatewayConfig::from(&config);

    assert_eq!(gateway.max_calls, 10);
    assert_eq!(gateway.window, Duration::from_secs(30));
    assert_eq!(gateway.cache_capacity, 5);
    assert_eq!(gateway.worker_pool_size, 2);
    assert_eq!(gateway.init_retry_count, 4);
    assert_eq!(gateway.init_backoff_base, Duration::from_millis(10));
}

#[test]
fn test_error_messages_are_descriptive() {
    let err = ConfigError::ZeroValue {
        name: "RELEVANCE_CACHE_CAPACITY",
    };
    assert!(err.to_string().contains("RELEVANCE_CACHE_CAPACITY"));

    let err = ConfigError::PathNotFound {
        path: PathBuf::from("/missing"),
    };
    assert!(err.to_string().contains("/missing"));

    let err = ConfigError::InvalidDevice {
        value: "tpu".to_string(),
    };
    assert!(err.to_string().contains("tpu"));
}
