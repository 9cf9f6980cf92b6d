use crate::config::Config;
use std::env;
use std::sync::Mutex;
use std::sync::OnceLock;

// Global lock to prevent race conditions when modifying environment variables in tests
static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn get_env_lock() -> &'static Mutex<()> {
    ENV_LOCK.get_or_init(|| Mutex::new(()))
}

const ALL_VARS: &[&str] = &[
    "MODEL_PATH",
    "CATALOG_PATH",
    "REFERENCE_YEAR",
    "HEURISTIC_BASE_MIN",
    "HEURISTIC_BASE_MAX",
    "DEPRECIATION_RATE",
    "PREMIUM_MULTIPLIER",
    "ECONOMY_MULTIPLIER",
    "PRICE_ROUNDING_STEP",
    "MIN_PRICE",
    "PREMIUM_BRANDS",
    "ECONOMY_BRANDS",
];

fn clear_env() {
    for var in ALL_VARS {
        unsafe { env::remove_var(var) };
    }
}

#[test]
fn test_defaults() {
    let _guard = get_env_lock().lock().unwrap();
    clear_env();

    let config = Config::from_env().unwrap();

    assert_eq!(config.heuristic_base_min, 20_000.0);
    assert_eq!(config.heuristic_base_max, 30_000.0);
    assert_eq!(config.depreciation_rate, 0.12);
    assert_eq!(config.premium_multiplier, 1.6);
    assert_eq!(config.economy_multiplier, 0.8);
    assert_eq!(config.price_rounding_step, 100.0);
    assert_eq!(config.min_price, 1_500.0);
    assert!(config.catalog_path.is_none());
    assert!(config.premium_brands.contains(&"bmw".to_string()));
    assert!(config.economy_brands.contains(&"dodge".to_string()));
}

#[test]
fn test_overrides() {
    let _guard = get_env_lock().lock().unwrap();
    clear_env();

    unsafe {
        env::set_var("REFERENCE_YEAR", "2020");
        env::set_var("DEPRECIATION_RATE", "0.10");
        env::set_var("PREMIUM_BRANDS", " Tesla , Rivian ");
    }

    let config = Config::from_env().unwrap();
    clear_env();

    assert_eq!(config.reference_year, 2020);
    assert_eq!(config.depreciation_rate, 0.10);
    assert_eq!(
        config.premium_brands,
        vec!["tesla".to_string(), "rivian".to_string()]
    );
}

#[test]
fn test_invalid_band_is_rejected() {
    let _guard = get_env_lock().lock().unwrap();
    clear_env();

    unsafe {
        env::set_var("HEURISTIC_BASE_MIN", "30000");
        env::set_var("HEURISTIC_BASE_MAX", "20000");
    }

    let result = Config::from_env();
    clear_env();

    assert!(result.is_err());
}

#[test]
fn test_unparseable_rate_is_rejected() {
    let _guard = get_env_lock().lock().unwrap();
    clear_env();

    unsafe { env::set_var("DEPRECIATION_RATE", "lots") };

    let result = Config::from_env();
    clear_env();

    assert!(result.is_err());
}
