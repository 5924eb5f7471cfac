//! # Domain Types
//!
//! Stores, seats and managers: the entities around an order session.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐        │
//! │  │    Manager      │   │     Store       │   │      Seat       │        │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │        │
//! │  │  email (key)    │   │  id  store_...  │◄──│  store_id (FK)  │        │
//! │  │  password_hash  │   │  name, email    │   │  id  seat_...   │        │
//! │  │  admin          │   │  password_hash  │   │  name           │        │
//! │  └─────────────────┘   │  address, phone │   └─────────────────┘        │
//! │                        └─────────────────┘           ▲                  │
//! │                                                      │                  │
//! │                        OrderSession.store_id / seat_id                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Types holding a password hash have a `*View` projection for responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::id::IdPrefix;
use crate::validation::{validate_email, ValidationResult};

// =============================================================================
// Store
// =============================================================================

/// Store registration input, before hashing and id assignment.
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export)]
pub struct StoreDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
}

impl StoreDraft {
    /// Lists every required field that is blank.
    pub fn validate_required_fields(&self) -> ValidationResult<()> {
        let fields = [
            ("name", &self.name),
            ("email", &self.email),
            ("password", &self.password),
            ("address", &self.address),
            ("phone", &self.phone),
        ];

        let empty: Vec<String> = fields
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name.to_string())
            .collect();

        if empty.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::Required { fields: empty })
        }
    }
}

/// Partial store edit. Absent fields keep their stored value; a supplied
/// password is re-hashed by the caller.
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export)]
pub struct StoreUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

impl StoreUpdate {
    /// Supplied fields may not be blank.
    pub fn validate_supplied_fields(&self) -> ValidationResult<()> {
        let fields = [
            ("name", &self.name),
            ("email", &self.email),
            ("password", &self.password),
            ("address", &self.address),
            ("phone", &self.phone),
        ];

        let blank: Vec<String> = fields
            .iter()
            .filter(|(_, value)| value.as_deref().is_some_and(|v| v.trim().is_empty()))
            .map(|(name, _)| name.to_string())
            .collect();

        if blank.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::Required { fields: blank })
        }
    }

    /// Writes the supplied fields into `store` and bumps `updated_at`.
    /// `password_hash` replaces the stored hash when given.
    pub fn apply_to(self, store: &mut Store, password_hash: Option<String>) {
        let trimmed = |v: String| v.trim().to_string();

        if let Some(name) = self.name {
            store.name = trimmed(name);
        }
        if let Some(email) = self.email {
            store.email = trimmed(email);
        }
        if let Some(address) = self.address {
            store.address = trimmed(address);
        }
        if let Some(phone) = self.phone {
            store.phone = trimmed(phone);
        }
        if let Some(hash) = password_hash {
            store.password_hash = hash;
        }
        store.updated_at = Utc::now();
    }
}

/// A registered store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub address: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Store {
    /// Builds a store from validated input. The draft's plaintext password
    /// is dropped here.
    pub fn from_draft(draft: StoreDraft, password_hash: String) -> Self {
        let now = Utc::now();
        let mut store = Store {
            id: String::new(),
            name: draft.name.trim().to_string(),
            email: draft.email.trim().to_string(),
            password_hash,
            address: draft.address.trim().to_string(),
            phone: draft.phone.trim().to_string(),
            created_at: now,
            updated_at: now,
        };
        store.reset_meta_fields();
        store
    }

    /// Assigns a fresh id and resets both timestamps.
    pub fn reset_meta_fields(&mut self) {
        let now = Utc::now();
        self.id = IdPrefix::STORE.generate();
        self.created_at = now;
        self.updated_at = now;
    }
}

/// Store as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StoreView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub address: String,
    pub phone: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl From<&Store> for StoreView {
    fn from(store: &Store) -> Self {
        StoreView {
            id: store.id.clone(),
            name: store.name.clone(),
            email: store.email.clone(),
            address: store.address.clone(),
            phone: store.phone.clone(),
            created_at: store.created_at,
            updated_at: store.updated_at,
        }
    }
}

// =============================================================================
// Seat
// =============================================================================

/// A table or counter position with its own QR code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Seat {
    pub id: String,
    pub store_id: String,
    /// Display name, e.g. "Table 4".
    pub name: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Seat {
    pub fn new(store_id: impl Into<String>, name: impl Into<String>) -> ValidationResult<Self> {
        let store_id = store_id.into();
        let name = name.into().trim().to_string();

        let mut empty = Vec::new();
        if store_id.trim().is_empty() {
            empty.push("store_id".to_string());
        }
        if name.is_empty() {
            empty.push("name".to_string());
        }
        if !empty.is_empty() {
            return Err(ValidationError::Required { fields: empty });
        }

        Ok(Seat {
            id: IdPrefix::SEAT.generate(),
            store_id,
            name,
            created_at: Utc::now(),
        })
    }
}

// =============================================================================
// Manager
// =============================================================================

/// A manager account. Keyed by email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manager {
    pub email: String,
    pub password_hash: String,
    pub admin: bool,
    pub created_at: DateTime<Utc>,
}

impl Manager {
    pub fn new(
        email: impl Into<String>,
        password_hash: String,
        admin: bool,
    ) -> ValidationResult<Self> {
        let email = email.into().trim().to_string();
        validate_email(&email)?;

        Ok(Manager {
            email,
            password_hash,
            admin,
            created_at: Utc::now(),
        })
    }
}

/// Manager as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ManagerView {
    pub email: String,
    pub admin: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl From<&Manager> for ManagerView {
    fn from(manager: &Manager) -> Self {
        ManagerView {
            email: manager.email.clone(),
            admin: manager.admin,
            created_at: manager.created_at,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> StoreDraft {
        StoreDraft {
            name: "Blue Door Cafe".into(),
            email: "owner@bluedoor.test".into(),
            password: "s3cret-pass".into(),
            address: "1 Harbour St".into(),
            phone: "555-0100".into(),
        }
    }

    #[test]
    fn test_store_draft_valid() {
        assert!(draft().validate_required_fields().is_ok());
    }

    #[test]
    fn test_store_draft_lists_blank_fields_in_order() {
        let input = StoreDraft {
            name: "  ".into(),
            phone: String::new(),
            ..draft()
        };
        assert_eq!(
            input.validate_required_fields(),
            Err(ValidationError::Required {
                fields: vec!["name".to_string(), "phone".to_string()]
            })
        );

        let all_blank = StoreDraft::default().validate_required_fields().unwrap_err();
        assert_eq!(
            all_blank.to_string(),
            "required fields are empty: name, email, password, address, phone"
        );
    }

    #[test]
    fn test_store_from_draft_resets_meta() {
        let store = Store::from_draft(draft(), "hash".into());
        assert!(IdPrefix::STORE.matches(&store.id));
        assert_eq!(store.created_at, store.updated_at);
        assert_eq!(store.password_hash, "hash");

        let mut again = store.clone();
        again.reset_meta_fields();
        assert_ne!(again.id, store.id);
    }

    #[test]
    fn test_store_update_rejects_blank_supplied_fields() {
        let update = StoreUpdate {
            name: Some("  ".into()),
            phone: Some(String::new()),
            ..StoreUpdate::default()
        };
        assert_eq!(
            update.validate_supplied_fields(),
            Err(ValidationError::Required {
                fields: vec!["name".to_string(), "phone".to_string()]
            })
        );
        assert!(StoreUpdate::default().validate_supplied_fields().is_ok());
    }

    #[test]
    fn test_store_update_keeps_absent_fields() {
        let mut store = Store::from_draft(draft(), "old-hash".into());
        let before = store.clone();

        StoreUpdate {
            name: Some(" Red Door ".into()),
            ..StoreUpdate::default()
        }
        .apply_to(&mut store, None);

        assert_eq!(store.name, "Red Door");
        assert_eq!(store.id, before.id);
        assert_eq!(store.email, before.email);
        assert_eq!(store.password_hash, "old-hash");
        assert_eq!(store.created_at, before.created_at);
        assert!(store.updated_at >= before.updated_at);

        StoreUpdate::default().apply_to(&mut store, Some("new-hash".into()));
        assert_eq!(store.password_hash, "new-hash");
    }

    #[test]
    fn test_store_view_hides_hash() {
        let store = Store::from_draft(draft(), "hash".into());
        let json = serde_json::to_value(StoreView::from(&store)).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["name"], "Blue Door Cafe");
    }

    #[test]
    fn test_seat_new() {
        let seat = Seat::new("store_1", " Table 4 ").unwrap();
        assert!(IdPrefix::SEAT.matches(&seat.id));
        assert_eq!(seat.name, "Table 4");

        assert_eq!(
            Seat::new("", ""),
            Err(ValidationError::Required {
                fields: vec!["store_id".to_string(), "name".to_string()]
            })
        );
    }

    #[test]
    fn test_manager_new() {
        let manager = Manager::new(" boss@cafe.test ", "hash".into(), false).unwrap();
        assert_eq!(manager.email, "boss@cafe.test");
        assert!(Manager::new("not-an-email", "hash".into(), false).is_err());

        let view = serde_json::to_value(ManagerView::from(&manager)).unwrap();
        assert!(view.get("password_hash").is_none());
    }
}
