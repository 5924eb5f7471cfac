//! # Documents
//!
//! Maps each domain type to its logical collection and its key.

use serde::de::DeserializeOwned;
use serde::Serialize;

use tableside_core::{Manager, OrderSession, Seat, Store};

/// A value that can be stored in a [`Repository`](crate::Repository).
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Logical collection name, before the environment prefix.
    const COLLECTION: &'static str;

    /// Key the document is stored under.
    fn document_id(&self) -> String;
}

impl Document for OrderSession {
    const COLLECTION: &'static str = "orders";

    fn document_id(&self) -> String {
        self.id().to_string()
    }
}

impl Document for Store {
    const COLLECTION: &'static str = "stores";

    fn document_id(&self) -> String {
        self.id.clone()
    }
}

impl Document for Seat {
    const COLLECTION: &'static str = "seats";

    fn document_id(&self) -> String {
        self.id.clone()
    }
}

/// Managers are keyed by email.
impl Document for Manager {
    const COLLECTION: &'static str = "managers";

    fn document_id(&self) -> String {
        self.email.clone()
    }
}
