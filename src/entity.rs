//! Entity traits for hubs, links and lookup tables
//!
//! Each entity type declares its identifiers through a static
//! [`EntityDescriptor`]; key accessors are written out per type, so nothing is
//! discovered at runtime.

use crate::error::Result;
use crate::naming::{lookup_table_name, upper_snake_case, EntityDescriptor};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Common surface of every data vault entity
pub trait DvEntity: Serialize + DeserializeOwned + Send + Sync + 'static {
    fn descriptor() -> &'static EntityDescriptor;

    /// Primary key, if the record carries one
    fn id(&self) -> Option<&str>;

    fn exists(&self) -> bool {
        self.id().is_some_and(|id| !id.trim().is_empty())
    }

    /// The hub/link record (the part stored under the entity's table property)
    fn record_data(&self) -> Result<Value> {
        let value = serde_json::to_value(self)?;
        Ok(value
            .get(Self::descriptor().data_property())
            .cloned()
            .filter(|v| !v.is_null())
            .unwrap_or_else(|| Value::Object(Map::new())))
    }

    /// Everything except the hub/link record: the satellite payload
    fn satellite_data(&self) -> Result<Value> {
        let mut value = serde_json::to_value(self)?;
        if let Value::Object(map) = &mut value {
            map.remove(Self::descriptor().data_property());
        }
        Ok(value)
    }
}

/// Independent business object identified by a business key
pub trait HubEntity: DvEntity {
    fn business_key(&self) -> Option<&str>;
}

/// Association between hubs, identified only by its own key
pub trait LinkEntity: DvEntity {
    /// Foreign key value for the hub whose PK column is `pk_column`
    fn foreign_key(&self, pk_column: &str) -> Option<&str>;
}

/// Marker for lookup (reference) tables; the table name is derived from the type name
pub trait Lookup {
    const TYPE_NAME: &'static str;

    fn table_name() -> String {
        lookup_table_name(Self::TYPE_NAME)
    }
}

/// A hub, link or satellite part that can be used as a filter object. Its
/// table name is the upper snake case of the type name.
pub trait DvRecord: Serialize {
    const TYPE_NAME: &'static str;

    fn table_name() -> String {
        upper_snake_case(Self::TYPE_NAME)
    }
}

/// One row of a lookup table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LookupItem {
    #[serde(rename = "CODE")]
    pub code: String,
    #[serde(rename = "NAME", default)]
    pub name: String,
}

/// A JSON value with nothing worth persisting: null, empty string, empty
/// array, or an object whose fields are all blank.
pub fn is_blank_json(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.values().all(is_blank_json),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::EntityKind;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize, Default)]
    struct DvCustomer {
        #[serde(rename = "HUB_CUSTOMER", default, skip_serializing_if = "Option::is_none")]
        hub: Option<HubCustomer>,
        #[serde(rename = "SAT_CUSTOMER_DETAIL", default, skip_serializing_if = "Option::is_none")]
        detail: Option<SatCustomerDetail>,
    }

    #[derive(Debug, Serialize, Deserialize, Default)]
    struct HubCustomer {
        #[serde(rename = "PK_CUSTOMER_ID", skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(rename = "BK_CUSTOMER_NUMBER", skip_serializing_if = "Option::is_none")]
        number: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize, Default)]
    struct SatCustomerDetail {
        #[serde(rename = "NAME")]
        name: Option<String>,
    }

    impl DvEntity for DvCustomer {
        fn descriptor() -> &'static EntityDescriptor {
            crate::dv_descriptor!(Hub, DvCustomer)
        }

        fn id(&self) -> Option<&str> {
            self.hub.as_ref()?.id.as_deref()
        }
    }

    #[test]
    fn test_descriptor_is_shared() {
        let a = DvCustomer::descriptor();
        let b = DvCustomer::descriptor();
        assert!(std::ptr::eq(a, b));
        assert_eq!(a.kind, EntityKind::Hub);
        assert_eq!(a.table_name, "HUB_CUSTOMER");
    }

    #[test]
    fn test_record_and_satellite_split() {
        let customer = DvCustomer {
            hub: Some(HubCustomer { id: None, number: Some("C-1".to_string()) }),
            detail: Some(SatCustomerDetail { name: Some("Ann".to_string()) }),
        };

        assert_eq!(customer.record_data().unwrap(), json!({"BK_CUSTOMER_NUMBER": "C-1"}));
        assert_eq!(
            customer.satellite_data().unwrap(),
            json!({"SAT_CUSTOMER_DETAIL": {"NAME": "Ann"}})
        );
        assert!(!customer.exists());
    }

    #[test]
    fn test_blank_payload_detection() {
        assert!(is_blank_json(&json!({})));
        assert!(is_blank_json(&json!({"A": null, "B": "", "C": [], "D": {}})));
        assert!(is_blank_json(&json!({"SAT_CUSTOMER_DETAIL": {"NAME": null}})));
        assert!(!is_blank_json(&json!({"A": null, "B": {"NAME": "x"}})));
        assert!(!is_blank_json(&json!({"A": 0})));
    }

    #[test]
    fn test_record_table_name() {
        impl DvRecord for SatCustomerDetail {
            const TYPE_NAME: &'static str = "SatCustomerDetail";
        }
        assert_eq!(SatCustomerDetail::table_name(), "SAT_CUSTOMER_DETAIL");
    }

    #[test]
    fn test_lookup_table_from_type_name() {
        struct CountryCode;
        impl Lookup for CountryCode {
            const TYPE_NAME: &'static str = "CountryCode";
        }
        assert_eq!(CountryCode::table_name(), "COUNTRY_CODE");
    }
}
