//! Server configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use kalakriti_cart::domain::pricing::PricingPolicy;
use kalakriti_infra::backend::DEFAULT_BASE_URL;
use rust_decimal::Decimal;

use crate::error::AppError;

/// Default file holding the persisted cart and session.
pub const DEFAULT_STORE_PATH: &str = "kalakriti-store.json";

/// Runtime configuration for the API server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Storefront backend base URL.
    pub backend_url: String,
    /// JSON file backing the cart and session stores.
    pub store_path: PathBuf,
    /// Shipping and tax parameters.
    pub pricing: PricingPolicy,
}

impl AppConfig {
    /// Reads configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which returns a variable's value
    /// or `None` when unset.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?,
            None => 3000,
        };
        let backend_url =
            lookup("KALAKRITI_BACKEND_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let store_path = lookup("KALAKRITI_STORE_PATH")
            .map_or_else(|| PathBuf::from(DEFAULT_STORE_PATH), PathBuf::from);

        let defaults = PricingPolicy::default();
        let pricing = PricingPolicy {
            free_shipping_threshold: decimal_var(
                &lookup,
                "KALAKRITI_FREE_SHIPPING_THRESHOLD",
                defaults.free_shipping_threshold,
            )?,
            flat_shipping_fee: decimal_var(
                &lookup,
                "KALAKRITI_FLAT_SHIPPING_FEE",
                defaults.flat_shipping_fee,
            )?,
            tax_rate: decimal_var(&lookup, "KALAKRITI_TAX_RATE", defaults.tax_rate)?,
        };
        if pricing.tax_rate > Decimal::ONE {
            return Err(AppError::Config(
                "KALAKRITI_TAX_RATE must be a fraction between 0 and 1".to_string(),
            ));
        }

        Ok(Self {
            host,
            port,
            backend_url,
            store_path,
            pricing,
        })
    }

    /// The address to listen on.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `HOST:PORT` is not a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

fn decimal_var(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: Decimal,
) -> Result<Decimal, AppError> {
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    let value = Decimal::from_str(raw.trim())
        .map_err(|e| AppError::Config(format!("{key} must be a decimal number: {e}")))?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(AppError::Config(format!("{key} must not be negative")));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig, AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.backend_url, "http://127.0.0.1:8000/api/user");
        assert_eq!(config.store_path, PathBuf::from("kalakriti-store.json"));
        assert_eq!(config.pricing, PricingPolicy::default());
    }

    #[test]
    fn test_overrides_are_applied() {
        // Arrange
        let vars = [
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("KALAKRITI_STORE_PATH", "/tmp/cart.json"),
            ("KALAKRITI_FREE_SHIPPING_THRESHOLD", "999"),
            ("KALAKRITI_FLAT_SHIPPING_FEE", "79.50"),
            ("KALAKRITI_TAX_RATE", "0.12"),
        ];

        // Act
        let config = config_from(&vars).unwrap();

        // Assert
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:8080");
        assert_eq!(config.store_path, PathBuf::from("/tmp/cart.json"));
        assert_eq!(config.pricing.free_shipping_threshold, Decimal::new(999, 0));
        assert_eq!(config.pricing.flat_shipping_fee, Decimal::new(7950, 2));
        assert_eq!(config.pricing.tax_rate, Decimal::new(12, 2));
    }

    #[test]
    fn test_invalid_port_is_a_config_error() {
        let result = config_from(&[("PORT", "not-a-port")]);

        match result.unwrap_err() {
            AppError::Config(message) => assert!(message.contains("PORT")),
            other => panic!("expected Config, got {other:?}"),
        }
    }

    #[test]
    fn test_negative_fee_is_rejected() {
        let result = config_from(&[("KALAKRITI_FLAT_SHIPPING_FEE", "-5")]);

        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_tax_rate_above_one_is_rejected() {
        let result = config_from(&[("KALAKRITI_TAX_RATE", "18")]);

        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
