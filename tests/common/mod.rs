//! Shared fixtures: a fake Direct Line service on wiremock.

#![allow(dead_code)]

use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SECRET: &str = "s1";
pub const TOKEN: &str = "t1";
pub const CONVERSATION_ID: &str = "c1";

pub fn schema_document(server: &MockServer) -> Value {
    json!({
        "swagger": "2.0",
        "info": { "title": "Bot Connector - Direct Line API - v3.0", "version": "v3" },
        "host": server.address().to_string(),
        "schemes": ["http"],
        "paths": {
            "/v3/directline/conversations": {
                "post": { "operationId": "Conversations_StartConversation" }
            },
            "/v3/directline/conversations/{conversationId}/activities": {
                "get": { "operationId": "Conversations_GetActivities" },
                "post": { "operationId": "Conversations_PostActivity" }
            },
            "/v3/directline/tokens/generate": {
                "post": { "operationId": "Tokens_GenerateTokenForNewConversation" }
            }
        }
    })
}

pub fn schema_url(server: &MockServer) -> String {
    format!("{}/swagger.json", server.uri())
}

pub async fn mount_schema(server: &MockServer) {
    // Served as text with surrounding whitespace, like the real document.
    let body = format!("\n{}\n", schema_document(server));
    Mock::given(method("GET"))
        .and(path("/swagger.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

pub async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v3/directline/tokens/generate"))
        .and(header("authorization", format!("Bearer {SECRET}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "conversationId": "pre-issued",
            "token": TOKEN,
            "expires_in": 1800
        })))
        .expect(1)
        .mount(server)
        .await;
}

pub async fn mount_start_conversation(server: &MockServer, stream_url: &str) {
    Mock::given(method("POST"))
        .and(path("/v3/directline/conversations"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "conversationId": CONVERSATION_ID,
            "token": TOKEN,
            "expires_in": 1800,
            "streamUrl": stream_url
        })))
        .expect(1)
        .mount(server)
        .await;
}

pub async fn mount_post_activity(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(format!("/v3/directline/conversations/{CONVERSATION_ID}/activities")))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "c1|0000001" })))
        .mount(server)
        .await;
}

/// A fake service that completes the whole bootstrap sequence.
pub async fn direct_line_service(stream_url: &str) -> MockServer {
    let server = MockServer::start().await;
    mount_schema(&server).await;
    mount_token(&server).await;
    mount_start_conversation(&server, stream_url).await;
    mount_post_activity(&server).await;
    server
}
