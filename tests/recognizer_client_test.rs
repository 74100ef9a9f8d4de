#[cfg(test)]
mod recognizer_client_integration_tests {
    use face_linebot::recognizer::{RecognitionBackend, RecognizerClient};
    use face_linebot::BotError;
    use mockito::Matcher;
    use std::io::Write;
    use std::time::Duration;

    const EMAIL: &str = "admin@example.com";
    const TOKEN: &str = "admin-token";

    fn client(server: &mockito::Server) -> RecognizerClient {
        client_with_timeout(server, Duration::from_secs(5))
    }

    fn client_with_timeout(server: &mockito::Server, timeout: Duration) -> RecognizerClient {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("client");
        RecognizerClient::with_credentials(http, &server.url(), EMAIL, TOKEN)
    }

    async fn stalled_endpoint(server: &mut mockito::Server, method: &str, path: &str) {
        server
            .mock(method, path)
            .with_status(200)
            .with_chunked_body(|w| {
                std::thread::sleep(Duration::from_millis(500));
                w.write_all(br#"{"success": true}"#)
            })
            .create_async()
            .await;
    }

    #[tokio::test]
    async fn test_recognize_sends_credentials_and_data_uri() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/recognize.json")
            .match_header("X-User-Email", EMAIL)
            .match_header("X-User-Token", TOKEN)
            .match_body(Matcher::Json(serde_json::json!({
                "image": "data:image/jpeg;base64,AAEC"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"faces": [{
                    "bounding": [{"x": 10, "y": 10}, {"x": 30, "y": 50}],
                    "angle": {"roll": 15.0},
                    "recognize": [{"label": {"id": 2, "name": "Bob"}, "value": 0.91}]
                }]}"#,
            )
            .create_async()
            .await;

        let result = client(&server)
            .recognize_faces("image/jpeg", &[0, 1, 2])
            .await
            .expect("recognition succeeds");

        mock.assert_async().await;
        assert_eq!(result.faces.len(), 1);
        let face = &result.faces[0];
        assert_eq!(face.angle.roll, 15.0);
        assert_eq!(face.top().map(|c| c.label.name.as_str()), Some("Bob"));
        assert_eq!(face.crop().width, 24);
    }

    #[tokio::test]
    async fn test_inferences_query_lists_every_label() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/inferences.json")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("min_score".into(), "0.5".into()),
                Matcher::UrlEncoded("label_id[]".into(), "3".into()),
                Matcher::UrlEncoded("label_id[]".into(), "7".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"inferences": [{"id": 1, "score": 0.8}, {"id": 2, "score": 0.6}]}"#)
            .create_async()
            .await;

        let inferences = client(&server)
            .inferences(&[3, 7])
            .await
            .expect("inferences succeed");

        mock.assert_async().await;
        assert_eq!(inferences.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_labels_query() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/labels.json")
            .match_query(Matcher::UrlEncoded("q".into(), "Alice Smith".into()))
            .with_status(200)
            .with_body(r#"[{"id": 3, "name": "Alice Smith", "twitter": "@alice"}]"#)
            .create_async()
            .await;

        let labels = client(&server).labels("Alice Smith").await.expect("labels");

        mock.assert_async().await;
        assert_eq!(labels[0].id, 3);
        assert_eq!(labels[0].profile_handle(), Some("alice"));
    }

    #[tokio::test]
    async fn test_non_200_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/labels.json")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"error": "unauthorized"}"#)
            .create_async()
            .await;

        let result = client(&server).labels("x").await;

        assert!(matches!(result, Err(BotError::Status(401))));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_slow_recognition_times_out() {
        let mut server = mockito::Server::new_async().await;
        stalled_endpoint(&mut server, "POST", "/recognize.json").await;

        let result = client_with_timeout(&server, Duration::from_millis(50))
            .recognize_faces("image/jpeg", b"jpeg")
            .await;

        assert!(matches!(result, Err(BotError::Timeout)), "got {result:?}");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_slow_accept_times_out() {
        let mut server = mockito::Server::new_async().await;
        stalled_endpoint(&mut server, "POST", "/inferences/77/accept.json").await;

        let result = client_with_timeout(&server, Duration::from_millis(50))
            .accept_inference(77)
            .await;

        assert!(matches!(result, Err(BotError::Timeout)), "got {result:?}");
    }

    #[tokio::test]
    async fn test_malformed_body_is_a_decode_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/recognize.json")
            .with_status(200)
            .with_body("<html>oops</html>")
            .create_async()
            .await;

        let result = client(&server).recognize_faces("image/png", b"png").await;

        assert!(matches!(result, Err(BotError::Decode(_))));
    }

    #[tokio::test]
    async fn test_accept_returns_result_url() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/inferences/77/accept.json")
            .match_header("X-User-Token", TOKEN)
            .with_status(200)
            .with_body(r#"{"success": true, "result_url": "https://face.example.com/faces/5"}"#)
            .create_async()
            .await;

        let response = client(&server).accept_inference(77).await.expect("accepted");

        mock.assert_async().await;
        assert_eq!(
            response.result_url.as_deref(),
            Some("https://face.example.com/faces/5")
        );
    }

    #[tokio::test]
    async fn test_failure_flag_is_a_backend_failure() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/inferences/77/reject.json")
            .with_status(200)
            .with_body(r#"{"success": false}"#)
            .expect(1)
            .create_async()
            .await;

        let result = client(&server).reject_inference(77).await;

        mock.assert_async().await;
        assert!(matches!(result, Err(BotError::BackendFailure(_))));
    }

    #[tokio::test]
    async fn test_register_user() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/users.json")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "email": "U4af4980629@line.me"
            })))
            .with_status(200)
            .with_body(r#"{"authentication_token": "user-token"}"#)
            .create_async()
            .await;

        let token = client(&server)
            .register_user("U4af4980629", "Taro")
            .await
            .expect("registered");

        mock.assert_async().await;
        assert_eq!(token, "user-token");
    }

    #[tokio::test]
    async fn test_fetch_image_restricted_to_backend_origin() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/faces/4/image")
            .with_status(200)
            .with_header("content-type", "image/png")
            .with_body(b"\x89PNG")
            .create_async()
            .await;
        let client = client(&server);

        let (content_type, body) = client
            .fetch_image(&format!("{}/faces/4/image", server.url()))
            .await
            .expect("image fetched");
        mock.assert_async().await;
        assert_eq!(content_type, "image/png");
        assert_eq!(&body[..], b"\x89PNG");

        let foreign = client.fetch_image("https://evil.example.com/faces/4/image").await;
        assert!(matches!(foreign, Err(BotError::Validation(_))));
    }
}
