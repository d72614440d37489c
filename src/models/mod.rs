//! Record types for the hosted entity collections.
//!
//! Every collection gets three shapes: the stored record (with the id the
//! store assigned), a `New*` shape the caller assembles for `create`, and a
//! `*Patch` shape that carries only the fields a transition touches.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// A string-valued field with a known set of values. Stored records may carry
/// values outside the set; those decode to an unrecognized variant instead of
/// failing the whole collection.
pub trait OpenEnum {
    const KNOWN: &'static [&'static str];

    fn as_str(&self) -> &str;

    fn is_known(&self) -> bool {
        Self::KNOWN.contains(&self.as_str())
    }
}

/// Declares a snake_case string enum that keeps unknown values verbatim in
/// `Unrecognized`.
macro_rules! open_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $raw:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
            Unrecognized(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $( $name::$variant => $raw, )+
                    $name::Unrecognized(raw) => raw,
                }
            }
        }

        impl $crate::models::OpenEnum for $name {
            const KNOWN: &'static [&'static str] = &[$( $raw ),+];

            fn as_str(&self) -> &str {
                $name::as_str(self)
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                match raw.as_str() {
                    $( $raw => $name::$variant, )+
                    _ => $name::Unrecognized(raw),
                }
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                match value {
                    $name::Unrecognized(raw) => raw,
                    known => known.as_str().to_string(),
                }
            }
        }
    };
}

pub mod complaint;
pub mod inventory;
pub mod laundry;
pub mod prescription;
pub mod triage_case;

pub use complaint::{
    ComplaintCategory, ComplaintPatch, ComplaintPriority, ComplaintStatus, ComplaintTicket,
    NewComplaintTicket,
};
pub use inventory::{InventoryItem, InventoryPatch, NewInventoryItem};
pub use laundry::{
    LaundryItem, LaundryPatch, LaundryPriority, LaundryRequest, LaundryStatus, NewLaundryRequest,
};
pub use prescription::{
    Medication, NewPrescription, Prescription, PrescriptionPatch, PrescriptionStatus,
};
pub use triage_case::{
    NewTriageCase, SeverityLevel, TriageCase, TriageCasePatch, TriageStatus, Vitals,
};

/// Named collections in the hosted entity store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    TriageCase,
    Prescription,
    InventoryItem,
    LaundryRequest,
    ComplaintTicket,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::TriageCase,
        Collection::Prescription,
        Collection::InventoryItem,
        Collection::LaundryRequest,
        Collection::ComplaintTicket,
    ];

    /// Entity name as the hosted store spells it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::TriageCase => "TriageCase",
            Collection::Prescription => "Prescription",
            Collection::InventoryItem => "InventoryItem",
            Collection::LaundryRequest => "LaundryRequest",
            Collection::ComplaintTicket => "ComplaintTicket",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort order requested from the store: a field name, `-` prefixed for descending.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortKey {
    pub field: String,
    pub descending: bool,
}

impl SortKey {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix('-') {
            Some(field) => Self::descending(field),
            None => Self::ascending(raw),
        }
    }

    /// Newest records first.
    pub fn newest_first() -> Self {
        Self::descending("created_date")
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.descending {
            write!(f, "-{}", self.field)
        } else {
            f.write_str(&self.field)
        }
    }
}

/// Ties a record type to its collection and its create/patch shapes.
pub trait Entity: DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: Collection;
    type New: Serialize + Send + Sync;
    type Patch: Serialize + Send + Sync;

    fn id(&self) -> &str;
}

pub(crate) fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}
