use std::fmt;
use std::str::FromStr;

/// Comparison operators of a literal predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryOperator {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Like,
    In,
    Null,
}

impl QueryOperator {
    pub fn sql(&self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::Like => "LIKE",
            Self::In => "IN",
            Self::Null => "IS NULL",
        }
    }
}

impl fmt::Display for QueryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sql())
    }
}

impl FromStr for QueryOperator {
    type Err = String;

    /// Accepts the SQL symbol or the operator name (`eq`, `ne`, `lt`, ...)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "=" | "eq" | "equal" => Ok(Self::Equal),
            "!=" | "<>" | "ne" | "not-equal" => Ok(Self::NotEqual),
            "<" | "lt" | "less-than" => Ok(Self::LessThan),
            "<=" | "le" | "less-than-or-equal" => Ok(Self::LessThanOrEqual),
            ">" | "gt" | "greater-than" => Ok(Self::GreaterThan),
            ">=" | "ge" | "greater-than-or-equal" => Ok(Self::GreaterThanOrEqual),
            "like" => Ok(Self::Like),
            "in" => Ok(Self::In),
            "null" | "is-null" => Ok(Self::Null),
            other => Err(format!("Unknown operator: {}", other)),
        }
    }
}

/// How a condition joins the ones before it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicOperator {
    None,
    And,
    Or,
}

impl LogicOperator {
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::And => Some("AND"),
            Self::Or => Some("OR"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "ASC"),
            Self::Desc => write!(f, "DESC"),
        }
    }
}
