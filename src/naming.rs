//! Naming & mapping conventions
//!
//! Derives database identifiers (tables, key columns, stored procedures) from an
//! entity's kind and declared type name. Everything here is pure; descriptors are
//! built once per entity type and shared as static data.

use std::fmt;

/// Domain prefix carried by every entity type name (`DvCustomer`)
pub const DV_ENTITY_PREFIX: &str = "Dv";
pub const HUB_TABLE_PREFIX: &str = "HUB_";
pub const LINK_TABLE_PREFIX: &str = "LNK_";
pub const PK_COLUMN_PREFIX: &str = "PK_";
pub const PK_COLUMN_SUFFIX: &str = "_ID";
pub const BK_COLUMN_PREFIX: &str = "BK_";
pub const BK_COLUMN_SUFFIX: &str = "_NUMBER";
pub const SEQUENCE_PREFIX: &str = "SEQ-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Hub,
    Link,
}

impl EntityKind {
    pub fn table_prefix(&self) -> &'static str {
        match self {
            EntityKind::Hub => HUB_TABLE_PREFIX,
            EntityKind::Link => LINK_TABLE_PREFIX,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Hub => write!(f, "hub"),
            EntityKind::Link => write!(f, "link"),
        }
    }
}

/// Upper-snake-case: an underscore before every uppercase letter after the
/// first character, then the whole string uppercased.
///
/// `CustomerUser` -> `CUSTOMER_USER`
pub fn upper_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if i > 0 && ch.is_uppercase() {
            out.push('_');
        }
        out.extend(ch.to_uppercase());
    }
    out
}

/// Declared type name with the `Dv` prefix stripped
pub fn entity_short_name(type_name: &str) -> &str {
    type_name.strip_prefix(DV_ENTITY_PREFIX).unwrap_or(type_name)
}

pub fn db_entity_name(type_name: &str) -> String {
    upper_snake_case(entity_short_name(type_name))
}

pub fn table_name(kind: EntityKind, type_name: &str) -> String {
    format!("{}{}", kind.table_prefix(), db_entity_name(type_name))
}

pub fn pk_column_name(type_name: &str) -> String {
    format!("{}{}{}", PK_COLUMN_PREFIX, db_entity_name(type_name), PK_COLUMN_SUFFIX)
}

pub fn bk_column_name(type_name: &str) -> String {
    format!("{}{}{}", BK_COLUMN_PREFIX, db_entity_name(type_name), BK_COLUMN_SUFFIX)
}

pub fn lookup_table_name(type_name: &str) -> String {
    upper_snake_case(type_name)
}

/// Lookup table names are case insensitive on the way in
pub fn normalize_table_name(table: &str) -> String {
    if table.trim().is_empty() {
        String::new()
    } else {
        table.to_uppercase()
    }
}

/// Stored procedures that make up the server-side contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoredProcedure {
    ReadRecord,
    CreateRecord,
    LinkRecord,
    UpdateRecord,
    UpdateLink,
    DeleteRecord,
    UnLinkRecord,
    ReadRecords,
    ReadLinks,
    ReadView,
    ReadLookup,
    ReadLookups,
    GetUniqueSequence,
}

impl StoredProcedure {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReadRecord => "ReadRecord",
            Self::CreateRecord => "CreateRecord",
            Self::LinkRecord => "LinkRecord",
            Self::UpdateRecord => "UpdateRecord",
            Self::UpdateLink => "UpdateLink",
            Self::DeleteRecord => "DeleteRecord",
            Self::UnLinkRecord => "UnLinkRecord",
            Self::ReadRecords => "ReadRecords",
            Self::ReadLinks => "ReadLinks",
            Self::ReadView => "ReadView",
            Self::ReadLookup => "ReadLookup",
            Self::ReadLookups => "ReadLookups",
            Self::GetUniqueSequence => "GetUniqueSequence",
        }
    }

    /// Full procedure name for an entity (or view) short name
    pub fn for_entity(&self, short_name: &str) -> String {
        format!("{}{}", self.as_str(), short_name)
    }
}

/// Every identifier derived for one entity type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDescriptor {
    pub kind: EntityKind,
    pub type_name: String,
    pub short_name: String,
    pub db_name: String,
    pub table_name: String,
    pub pk_column: String,
    /// Only hubs carry a business key
    pub bk_column: Option<String>,
    pub sequence_name: String,
}

impl EntityDescriptor {
    pub fn new(kind: EntityKind, type_name: &str) -> Self {
        let short_name = entity_short_name(type_name).to_string();
        let bk_column = match kind {
            EntityKind::Hub => Some(bk_column_name(type_name)),
            EntityKind::Link => None,
        };

        Self {
            kind,
            type_name: type_name.to_string(),
            db_name: db_entity_name(type_name),
            table_name: table_name(kind, type_name),
            pk_column: pk_column_name(type_name),
            bk_column,
            sequence_name: format!("{}{}", SEQUENCE_PREFIX, short_name.to_uppercase()),
            short_name,
        }
    }

    pub fn procedure(&self, procedure: StoredProcedure) -> String {
        procedure.for_entity(&self.short_name)
    }

    /// JSON property holding the hub/link record inside an entity payload
    pub fn data_property(&self) -> &str {
        &self.table_name
    }

    /// `TABLE.COLUMN`, the qualified form used inside filter strings
    pub fn qualified(&self, column: &str) -> String {
        format!("{}.{}", self.table_name, column)
    }

    pub fn qualified_pk(&self) -> String {
        self.qualified(&self.pk_column)
    }
}

/// Build (once) and return the static descriptor of an entity type.
///
/// ```ignore
/// fn descriptor() -> &'static EntityDescriptor {
///     datavault::dv_descriptor!(Hub, DvCustomer)
/// }
/// ```
#[macro_export]
macro_rules! dv_descriptor {
    ($kind:ident, $type_name:ident) => {{
        static DESCRIPTOR: $crate::__private::Lazy<$crate::naming::EntityDescriptor> =
            $crate::__private::Lazy::new(|| {
                $crate::naming::EntityDescriptor::new(
                    $crate::naming::EntityKind::$kind,
                    stringify!($type_name),
                )
            });
        &*DESCRIPTOR
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_upper_snake_case() {
        assert_eq!(upper_snake_case("Customer"), "CUSTOMER");
        assert_eq!(upper_snake_case("CustomerUser"), "CUSTOMER_USER");
        assert_eq!(upper_snake_case("CountryCode"), "COUNTRY_CODE");
        assert_eq!(upper_snake_case(""), "");
    }

    #[test]
    fn test_hub_names() {
        let desc = EntityDescriptor::new(EntityKind::Hub, "DvCustomer");
        assert_eq!(desc.short_name, "Customer");
        assert_eq!(desc.table_name, "HUB_CUSTOMER");
        assert_eq!(desc.pk_column, "PK_CUSTOMER_ID");
        assert_eq!(desc.bk_column.as_deref(), Some("BK_CUSTOMER_NUMBER"));
        assert_eq!(desc.sequence_name, "SEQ-CUSTOMER");
        assert_eq!(desc.qualified_pk(), "HUB_CUSTOMER.PK_CUSTOMER_ID");
    }

    #[test]
    fn test_link_names() {
        let desc = EntityDescriptor::new(EntityKind::Link, "DvCustomerUser");
        assert_eq!(desc.table_name, "LNK_CUSTOMER_USER");
        assert_eq!(desc.pk_column, "PK_CUSTOMER_USER_ID");
        assert_eq!(desc.bk_column, None);
        assert_eq!(desc.procedure(StoredProcedure::LinkRecord), "LinkRecordCustomerUser");
        assert_eq!(desc.procedure(StoredProcedure::UnLinkRecord), "UnLinkRecordCustomerUser");
    }

    #[test]
    fn test_prefix_only_stripped_at_start() {
        assert_eq!(entity_short_name("DvAdvisor"), "Advisor");
        assert_eq!(entity_short_name("Advisor"), "Advisor");
        assert_eq!(table_name(EntityKind::Hub, "DvDvdTitle"), "HUB_DVD_TITLE");
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let a = EntityDescriptor::new(EntityKind::Hub, "DvOrderLine");
        let b = EntityDescriptor::new(EntityKind::Hub, "DvOrderLine");
        assert_eq!(a, b);
        assert_eq!(pk_column_name("DvOrderLine"), a.pk_column);
    }

    #[test]
    fn test_derivation_is_injective_within_kind() {
        let names = [
            "DvCustomer", "DvUser", "DvCustomerUser", "DvOrder", "DvOrderLine",
            "DvOrderLines", "DvAbc", "DvABC", "DvAb", "DvA", "DvAccountDocument",
        ];

        let tables: HashSet<_> = names.iter().map(|n| table_name(EntityKind::Hub, n)).collect();
        let pks: HashSet<_> = names.iter().map(|n| pk_column_name(n)).collect();
        let bks: HashSet<_> = names.iter().map(|n| bk_column_name(n)).collect();

        assert_eq!(tables.len(), names.len());
        assert_eq!(pks.len(), names.len());
        assert_eq!(bks.len(), names.len());
    }

    #[test]
    fn test_lookup_table_name() {
        assert_eq!(lookup_table_name("CountryCode"), "COUNTRY_CODE");
        assert_eq!(normalize_table_name("country_code"), "COUNTRY_CODE");
        assert_eq!(normalize_table_name("  "), "");
    }
}
