//! Signature verification over real HTTP.

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use hmacgate_auth::Signature;
    use hmacgate_core::AccessKey;
    use hmacgate_http::sign_headers;

    use crate::{signed_headers, spawn_gateway};

    const FORBIDDEN_BODY: &str = r#"{"detail":"Incorrect authentication credentials."}"#;

    #[tokio::test]
    async fn test_should_authenticate_correctly_signed_request() {
        let gateway = spawn_gateway().await;
        gateway.register("bob", "bob-key", "bob-secret");
        let body = br#"{"foo":"bar"}"#;

        let resp = reqwest::Client::new()
            .post(gateway.url("/"))
            .headers(signed_headers("bob-key", "bob-secret", body))
            .body(body.to_vec())
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let json: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(json["principal"], "bob");
        assert_eq!(json["data"], serde_json::json!({ "foo": "bar" }));
    }

    #[tokio::test]
    async fn test_should_accept_signature_over_reordered_keys() {
        let gateway = spawn_gateway().await;
        gateway.register("bob", "bob-key", "bob-secret");

        // Signed as {"a":1,"b":2} but sent with keys reversed and spacing.
        let headers = signed_headers("bob-key", "bob-secret", br#"{"a":1,"b":2}"#);
        let resp = reqwest::Client::new()
            .post(gateway.url("/"))
            .headers(headers)
            .body(r#"{ "b": 2, "a": 1 }"#)
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_should_reject_replayed_signature_on_ambiguous_body() {
        let gateway = spawn_gateway().await;
        gateway.register("bob", "bob-key", "bob-secret");
        let client = reqwest::Client::new();

        let replays: [(&[u8], &str); 2] = [
            (br#"{"to":"bob"}"#, r#"{"to":"eve","to":"bob"}"#),
            (br#"{"amount":0.1}"#, r#"{"amount":0.10000000000000000001}"#),
        ];
        for (signed, sent) in replays {
            let resp = client
                .post(gateway.url("/"))
                .headers(signed_headers("bob-key", "bob-secret", signed))
                .body(sent)
                .send()
                .await
                .unwrap();

            assert_eq!(resp.status(), StatusCode::FORBIDDEN);
            assert_eq!(resp.text().await.unwrap(), FORBIDDEN_BODY);
        }
    }

    #[tokio::test]
    async fn test_should_reject_invalid_signature() {
        let gateway = spawn_gateway().await;
        gateway.register("bob", "bob-key", "bob-secret");

        let mut headers = reqwest::header::HeaderMap::new();
        sign_headers(
            &mut headers,
            &AccessKey::new("bob-key"),
            &Signature::new(b"invalid".to_vec()),
        )
        .unwrap();

        let resp = reqwest::Client::new()
            .post(gateway.url("/"))
            .headers(headers)
            .body(r#"{"foo":"bar"}"#)
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert_eq!(resp.text().await.unwrap(), FORBIDDEN_BODY);
    }

    #[tokio::test]
    async fn test_should_reject_omitted_signature() {
        let gateway = spawn_gateway().await;
        gateway.register("bob", "bob-key", "bob-secret");

        let resp = reqwest::Client::new()
            .post(gateway.url("/"))
            .header("Key", "bob-key")
            .body(r#"{"foo":"bar"}"#)
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert_eq!(resp.text().await.unwrap(), FORBIDDEN_BODY);
    }

    #[tokio::test]
    async fn test_should_reject_tampered_body() {
        let gateway = spawn_gateway().await;
        gateway.register("bob", "bob-key", "bob-secret");

        let resp = reqwest::Client::new()
            .post(gateway.url("/"))
            .headers(signed_headers("bob-key", "bob-secret", br#"{"amount":1}"#))
            .body(r#"{"amount":1000}"#)
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_should_reject_signature_made_with_another_principals_secret() {
        let gateway = spawn_gateway().await;
        gateway.register("bob", "bob-key", "bob-secret");
        gateway.register("eve", "eve-key", "eve-secret");
        let body = br#"{"foo":"bar"}"#;

        let resp = reqwest::Client::new()
            .post(gateway.url("/"))
            .headers(signed_headers("bob-key", "eve-secret", body))
            .body(body.to_vec())
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_should_reject_unknown_key_like_any_other_failure() {
        let gateway = spawn_gateway().await;
        let body = br#"{"foo":"bar"}"#;

        let resp = reqwest::Client::new()
            .post(gateway.url("/"))
            .headers(signed_headers("nobody", "whatever", body))
            .body(body.to_vec())
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert_eq!(resp.text().await.unwrap(), FORBIDDEN_BODY);
    }

    #[tokio::test]
    async fn test_should_authenticate_provisioned_principal() {
        let gateway = spawn_gateway().await;
        let credential = gateway
            .store
            .provision(&hmacgate_core::Principal::new("alice"));
        let secret = String::from_utf8(credential.secret.expose().to_vec()).unwrap();

        let resp = reqwest::Client::new()
            .post(gateway.url("/"))
            .headers(signed_headers(credential.key.as_str(), &secret, b""))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let json: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(json["principal"], "alice");
        assert_eq!(json["data"], serde_json::json!({}));
    }
}
