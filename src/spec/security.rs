//! Security schemes and requirements

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::extendable::{Extendable, KnownFields};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityScheme {
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub scheme_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "in", default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flows: Option<Extendable<OAuthFlows>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_id_connect_url: Option<String>,
}

impl KnownFields for SecurityScheme {
    const FIELDS: &'static [&'static str] = &[
        "type",
        "description",
        "name",
        "in",
        "scheme",
        "bearerFormat",
        "flows",
        "openIdConnectUrl",
    ];
}

impl SecurityScheme {
    /// Typed view of `type`; `None` for values outside the closed set
    pub fn kind(&self) -> Option<SecuritySchemeType> {
        self.scheme_type.parse().ok()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthFlows {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implicit: Option<Extendable<OAuthFlow>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<Extendable<OAuthFlow>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_credentials: Option<Extendable<OAuthFlow>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_code: Option<Extendable<OAuthFlow>>,
}

impl KnownFields for OAuthFlows {
    const FIELDS: &'static [&'static str] = &[
        "implicit",
        "password",
        "clientCredentials",
        "authorizationCode",
    ];
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthFlow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scopes: Option<IndexMap<String, String>>,
}

impl KnownFields for OAuthFlow {
    const FIELDS: &'static [&'static str] = &["authorizationUrl", "tokenUrl", "refreshUrl", "scopes"];
}

/// Security scheme name -> required scopes
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecurityRequirement {
    pub schemes: IndexMap<String, Vec<String>>,
}

impl SecurityRequirement {
    pub fn new(name: impl Into<String>, scopes: Vec<String>) -> Self {
        let mut schemes = IndexMap::new();
        schemes.insert(name.into(), scopes);
        Self { schemes }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecuritySchemeType {
    ApiKey,
    Http,
    MutualTls,
    OAuth2,
    OpenIdConnect,
}

impl SecuritySchemeType {
    pub const ALL: [SecuritySchemeType; 5] = [
        SecuritySchemeType::ApiKey,
        SecuritySchemeType::Http,
        SecuritySchemeType::MutualTls,
        SecuritySchemeType::OAuth2,
        SecuritySchemeType::OpenIdConnect,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SecuritySchemeType::ApiKey => "apiKey",
            SecuritySchemeType::Http => "http",
            SecuritySchemeType::MutualTls => "mutualTLS",
            SecuritySchemeType::OAuth2 => "oauth2",
            SecuritySchemeType::OpenIdConnect => "openIdConnect",
        }
    }

    /// Whether requirements on this scheme may list scopes
    pub fn has_scopes(&self) -> bool {
        matches!(self, SecuritySchemeType::OAuth2 | SecuritySchemeType::OpenIdConnect)
    }
}

impl FromStr for SecuritySchemeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown security scheme type '{}'", s))
    }
}

impl fmt::Display for SecuritySchemeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Location of an API key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiKeyLocation {
    Query,
    Header,
    Cookie,
}

impl FromStr for ApiKeyLocation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "query" => Ok(ApiKeyLocation::Query),
            "header" => Ok(ApiKeyLocation::Header),
            "cookie" => Ok(ApiKeyLocation::Cookie),
            other => Err(format!("unknown api key location '{}'", other)),
        }
    }
}
