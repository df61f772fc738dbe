//! Security scheme and requirement rules

use crate::extendable::Extendable;
use crate::spec::{
    ApiKeyLocation, OAuthFlow, OAuthFlows, SecurityRequirement, SecurityScheme, SecuritySchemeType,
};

use super::{join, ValidationCode, Validator};

impl<'a> Validator<'a> {
    pub(super) fn check_security_scheme(&mut self, scheme: &'a Extendable<SecurityScheme>, path: &str) {
        let Some(spec) = self.open(scheme, path) else { return };

        if spec.scheme_type.is_empty() {
            self.require(false, path, "type");
            return;
        }
        let Some(kind) = spec.kind() else {
            self.report(
                &join(path, "type"),
                ValidationCode::InvalidValue,
                format!(
                    "'{}' is not one of apiKey, http, mutualTLS, oauth2, openIdConnect",
                    spec.scheme_type
                ),
            );
            return;
        };

        match kind {
            SecuritySchemeType::ApiKey => {
                self.require(spec.name.as_deref().map_or(false, |n| !n.is_empty()), path, "name");
                match &spec.location {
                    None => self.require(false, path, "in"),
                    Some(location) => {
                        if let Err(message) = location.parse::<ApiKeyLocation>() {
                            self.report(&join(path, "in"), ValidationCode::InvalidValue, message);
                        }
                    }
                }
            }
            SecuritySchemeType::Http => {
                self.require(spec.scheme.as_deref().map_or(false, |s| !s.is_empty()), path, "scheme");
            }
            SecuritySchemeType::OAuth2 => match &spec.flows {
                Some(flows) => self.check_oauth_flows(flows, &join(path, "flows")),
                None => self.require(false, path, "flows"),
            },
            SecuritySchemeType::OpenIdConnect => match &spec.open_id_connect_url {
                Some(url) => self.check_url(Some(url), &join(path, "openIdConnectUrl")),
                None => self.require(false, path, "openIdConnectUrl"),
            },
            SecuritySchemeType::MutualTls => {}
        }
    }

    fn check_oauth_flows(&mut self, flows: &'a Extendable<OAuthFlows>, path: &str) {
        let Some(spec) = self.open(flows, path) else { return };

        let all = [
            ("implicit", &spec.implicit, true, false),
            ("password", &spec.password, false, true),
            ("clientCredentials", &spec.client_credentials, false, true),
            ("authorizationCode", &spec.authorization_code, true, true),
        ];
        for (name, flow, needs_authorization, needs_token) in all {
            if let Some(flow) = flow {
                self.check_oauth_flow(flow, &join(path, name), needs_authorization, needs_token);
            }
        }
    }

    fn check_oauth_flow(
        &mut self,
        flow: &'a Extendable<OAuthFlow>,
        path: &str,
        needs_authorization: bool,
        needs_token: bool,
    ) {
        let Some(spec) = self.open(flow, path) else { return };

        if needs_authorization {
            self.require(spec.authorization_url.is_some(), path, "authorizationUrl");
        }
        if needs_token {
            self.require(spec.token_url.is_some(), path, "tokenUrl");
        }
        self.require(spec.scopes.is_some(), path, "scopes");

        self.check_url(spec.authorization_url.as_deref(), &join(path, "authorizationUrl"));
        self.check_url(spec.token_url.as_deref(), &join(path, "tokenUrl"));
        self.check_url(spec.refresh_url.as_deref(), &join(path, "refreshUrl"));
    }

    pub(super) fn check_security_requirement(&mut self, requirement: &'a SecurityRequirement, path: &str) {
        let schemes = self
            .components
            .and_then(Extendable::spec)
            .and_then(|components| components.security_schemes.as_ref());

        for (name, scopes) in &requirement.schemes {
            let scheme_path = join(path, name);
            let Some(cell) = schemes.and_then(|schemes| schemes.get(name)) else {
                self.report(
                    &scheme_path,
                    ValidationCode::UndefinedSecurityScheme,
                    format!("security scheme '{}' is not defined in components", name),
                );
                continue;
            };

            let kind = self
                .quiet(cell)
                .and_then(Extendable::spec)
                .and_then(SecurityScheme::kind);
            if let Some(kind) = kind {
                if !scopes.is_empty() && !kind.has_scopes() {
                    self.report(
                        &scheme_path,
                        ValidationCode::InvalidValue,
                        format!("scopes are only allowed for oauth2 and openIdConnect, '{}' is {}", name, kind),
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{codes, minimal, run};
    use super::super::ValidationCode;
    use serde_json::json;

    #[test]
    fn test_scheme_requirements() {
        let mut raw = minimal();
        raw["components"] = json!({
            "securitySchemes": {
                "key": {"type": "apiKey", "in": "body"},
                "basic": {"type": "http"},
                "oauth": {"type": "oauth2"},
                "oidc": {"type": "openIdConnect", "openIdConnectUrl": "not a url"},
                "tls": {"type": "mutualTLS"},
                "custom": {"type": "kerberos"}
            }
        });

        let found = codes(&run(raw));
        let at = "components.securitySchemes";
        assert_eq!(
            found,
            vec![
                (format!("{}.key.name", at), ValidationCode::MissingField),
                (format!("{}.key.in", at), ValidationCode::InvalidValue),
                (format!("{}.basic.scheme", at), ValidationCode::MissingField),
                (format!("{}.oauth.flows", at), ValidationCode::MissingField),
                (format!("{}.oidc.openIdConnectUrl", at), ValidationCode::InvalidUrl),
                (format!("{}.custom.type", at), ValidationCode::InvalidValue),
            ]
        );
    }

    #[test]
    fn test_oauth_flows() {
        let mut raw = minimal();
        raw["components"] = json!({
            "securitySchemes": {
                "oauth": {"type": "oauth2", "flows": {
                    "implicit": {"scopes": {}},
                    "authorizationCode": {
                        "authorizationUrl": "https://example.com/auth",
                        "tokenUrl": "https://example.com/token"
                    }
                }}
            }
        });

        let found = codes(&run(raw));
        let at = "components.securitySchemes.oauth.flows";
        assert_eq!(
            found,
            vec![
                (format!("{}.implicit.authorizationUrl", at), ValidationCode::MissingField),
                (format!("{}.authorizationCode.scopes", at), ValidationCode::MissingField),
            ]
        );
    }

    #[test]
    fn test_security_requirements() {
        let mut raw = minimal();
        raw["components"] = json!({
            "securitySchemes": {
                "key": {"type": "apiKey", "name": "api_key", "in": "header"},
                "oauth": {"type": "oauth2", "flows": {
                    "clientCredentials": {"tokenUrl": "https://example.com/token", "scopes": {"read": "read"}}
                }}
            }
        });
        raw["security"] = json!([
            {"oauth": ["read"]},
            {"key": ["admin"]},
            {"missing": []}
        ]);

        let found = codes(&run(raw));
        assert_eq!(
            found,
            vec![
                ("security[1].key".to_string(), ValidationCode::InvalidValue),
                ("security[2].missing".to_string(), ValidationCode::UndefinedSecurityScheme),
            ]
        );
    }
}
