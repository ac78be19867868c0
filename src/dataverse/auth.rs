use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use crate::error::DataverseError;

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
}

/// Asks the organization which authority issues its tokens. An anonymous call to
/// the Web API answers 401 with `WWW-Authenticate: Bearer authorization_uri=...`.
pub async fn discover_authority(http: &Client, api_base: &str) -> Result<String, DataverseError> {
    let resp = http.get(format!("{}/", api_base)).send().await?;
    if resp.status() != StatusCode::UNAUTHORIZED {
        return Err(DataverseError::Auth(format!(
            "expected an authentication challenge from {}, got {}",
            api_base,
            resp.status()
        )));
    }

    let challenge = resp
        .headers()
        .get(header::WWW_AUTHENTICATE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| DataverseError::Auth("no WWW-Authenticate header in challenge".to_string()))?;

    let uri = parse_authorization_uri(challenge)
        .ok_or_else(|| DataverseError::Auth(format!("no authorization_uri in challenge '{}'", challenge)))?;

    Ok(authority_from_authorization_uri(&uri))
}

/// Client-credentials grant against `<authority>/oauth2/v2.0/token`.
pub async fn acquire_token(
    http: &Client,
    authority: &str,
    client_id: &str,
    client_secret: &str,
    resource: &str,
) -> Result<String, DataverseError> {
    let token_url = format!("{}/oauth2/v2.0/token", authority.trim_end_matches('/'));
    let scope = format!("{}/.default", resource.trim_end_matches('/'));

    let resp = http
        .post(&token_url)
        .form(&[
            ("grant_type", "client_credentials"),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("scope", scope.as_str()),
        ])
        .send()
        .await?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(DataverseError::Auth(format!("token endpoint returned {}: {}", status, body)));
    }

    let token: TokenResponse = resp
        .json()
        .await
        .map_err(|e| DataverseError::Auth(format!("malformed token response: {}", e)))?;

    if let Some(kind) = token.token_type.as_deref() {
        if !kind.eq_ignore_ascii_case("bearer") {
            return Err(DataverseError::Auth(format!("unsupported token type '{}'", kind)));
        }
    }
    Ok(token.access_token)
}

pub fn parse_authorization_uri(challenge: &str) -> Option<String> {
    let params = challenge.trim().strip_prefix("Bearer").unwrap_or(challenge);
    params.split(',').find_map(|param| {
        let (key, value) = param.trim().split_once('=')?;
        if key.trim().eq_ignore_ascii_case("authorization_uri") {
            Some(value.trim().trim_matches('"').to_string())
        } else {
            None
        }
    })
}

fn authority_from_authorization_uri(uri: &str) -> String {
    let uri = uri.trim_end_matches('/');
    uri.strip_suffix("/oauth2/authorize")
        .or_else(|| uri.strip_suffix("/oauth2/v2.0/authorize"))
        .unwrap_or(uri)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_authority_from_challenge() {
        let challenge = "Bearer authorization_uri=https://login.microsoftonline.com/0000-tenant/oauth2/authorize, resource_id=https://org.crm.dynamics.com/";
        let uri = parse_authorization_uri(challenge).unwrap();
        assert_eq!(uri, "https://login.microsoftonline.com/0000-tenant/oauth2/authorize");
        assert_eq!(authority_from_authorization_uri(&uri), "https://login.microsoftonline.com/0000-tenant");
    }

    #[test]
    fn quoted_values() {
        let challenge = r#"Bearer resource_id="r", authorization_uri="https://login.example/t/oauth2/v2.0/authorize""#;
        let uri = parse_authorization_uri(challenge).unwrap();
        assert_eq!(authority_from_authorization_uri(&uri), "https://login.example/t");
    }

    #[test]
    fn missing_uri() {
        assert!(parse_authorization_uri("Bearer realm=\"x\"").is_none());
    }
}
