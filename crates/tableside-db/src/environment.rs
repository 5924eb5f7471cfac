//! # Deployment Environment
//!
//! Decides the collection-name prefix so environments sharing one database
//! never see each other's documents.
//!
//! | Environment | Prefix  | `orders` collection |
//! |-------------|---------|---------------------|
//! | production  | (none)  | `orders`            |
//! | staging     | `stg_`  | `stg_orders`        |
//! | test        | `test_` | `test_orders`       |
//! | development | `dev_`  | `dev_orders`        |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    Staging,
    Test,
    #[default]
    Development,
}

impl Environment {
    /// Maps an `APP_ENV` value. Anything unrecognised is development.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            "staging" | "stg" => Environment::Staging,
            "test" => Environment::Test,
            _ => Environment::Development,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Environment::Production => "production",
            Environment::Staging => "staging",
            Environment::Test => "test",
            Environment::Development => "development",
        }
    }

    pub const fn collection_prefix(&self) -> &'static str {
        match self {
            Environment::Production => "",
            Environment::Staging => "stg_",
            Environment::Test => "test_",
            Environment::Development => "dev_",
        }
    }

    /// Physical collection name for a logical one.
    pub fn collection_name(&self, base: &str) -> String {
        format!("{}{}", self.collection_prefix(), base)
    }

    pub const fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl FromStr for Environment {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Environment::from_name(s))
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixes() {
        assert_eq!(Environment::Production.collection_name("orders"), "orders");
        assert_eq!(Environment::Staging.collection_name("orders"), "stg_orders");
        assert_eq!(Environment::Test.collection_name("orders"), "test_orders");
        assert_eq!(Environment::Development.collection_name("orders"), "dev_orders");
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Environment::from_name("production"), Environment::Production);
        assert_eq!(Environment::from_name(" Staging "), Environment::Staging);
        assert_eq!(Environment::from_name("test"), Environment::Test);
        assert_eq!(Environment::from_name(""), Environment::Development);
        assert_eq!(Environment::from_name("qa"), Environment::Development);
    }
}
