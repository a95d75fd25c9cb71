pub mod json_patch;
pub mod pagination;
pub mod revoked_tokens;
