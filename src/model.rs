//! Wire payloads exchanged with the configuration / identity service.
//!
//! Request types serialise every field. Response types are tolerant: missing
//! fields default and unknown fields are ignored, so a newer server does not
//! break an older cockpit.

use serde::{Deserialize, Serialize};

/* ---- Identity ---- */

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistrationDetails {
    pub email: String,
    pub name: String,
    pub org: String,
    pub password: String,
    pub surname: String,
    pub username: String,
}

/* ---- Configuration ---- */

/// Identifies one versioned configuration inside an organization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfigReference {
    pub org: String,
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Param {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NamedParamSet {
    pub name: String,
    pub param_set: Vec<Param>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConfigGroup {
    pub org: String,
    pub name: String,
    pub version: String,
    pub created_at: String,
    pub param_sets: Vec<NamedParamSet>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConfigGroupResponse {
    pub group: ConfigGroup,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StandaloneConfig {
    pub org: String,
    pub name: String,
    pub version: String,
    pub created_at: String,
    pub param_set: Vec<Param>,
}

/* ---- Schema validation ---- */

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SchemaDetails {
    pub org: String,
    pub schema_name: String,
    pub version: String,
}

/// `configuration` carries the raw file text; the server parses it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationRequest {
    pub schema_details: SchemaDetails,
    pub configuration: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ValidationResponse {
    pub message: String,
}
