//! Header transport and gateway plumbing.

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use crate::{signed_headers, spawn_gateway};

    #[tokio::test]
    async fn test_should_reject_plain_text_signature() {
        let gateway = spawn_gateway().await;
        gateway.register("bob", "bob-key", "bob-secret");

        // The right bytes, but sent as text instead of a byte sequence.
        let mut headers = signed_headers("bob-key", "bob-secret", b"{}");
        let encoded = headers
            .get("signature")
            .unwrap()
            .to_str()
            .unwrap()
            .trim_matches(':')
            .to_owned();
        headers.insert("signature", encoded.parse().unwrap());

        let resp = reqwest::Client::new()
            .post(gateway.url("/"))
            .headers(headers)
            .body("{}")
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_should_serve_health_check_without_credentials() {
        let gateway = spawn_gateway().await;

        let resp = reqwest::get(gateway.url("/_health")).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let json: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(json["status"], "running");
    }

    #[tokio::test]
    async fn test_should_tag_every_response_with_request_id() {
        let gateway = spawn_gateway().await;

        let resp = reqwest::Client::new()
            .post(gateway.url("/"))
            .body("{}")
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert!(resp.headers().get("x-request-id").is_some());
        assert_eq!(resp.headers().get("server").unwrap(), "hmacgate");
    }
}
