//! Parameter names of the stored-procedure contract

/// Output: business status code (0 = success)
pub const STATUS_CODE: &str = "STATUS_CODE";
/// Output: JSON payload, or a JSON error object with a `message` field
pub const RESULT: &str = "RESULT";
pub const RETURN_VALUE: &str = "@ReturnValue";

pub const HUB_DATA: &str = "HUB_DATA";
pub const SAT_DATA: &str = "SAT_DATA";
pub const SAT_QUERY: &str = "SAT_QUERY";
pub const FK: &str = "FK";
pub const HUB_PK: &str = "HUB_PK";
pub const LINK_PK: &str = "LINK_PK";
pub const MD: &str = "MD";
pub const LKP_TABLE: &str = "LKP_TABLE";
pub const LKP_CODE_VALUE: &str = "LKP_CODE_VALUE";
pub const SEQ_NAME: &str = "SeqName";
