use async_trait::async_trait;
use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use remote_brain::dispatch::generate_with;
use remote_brain::providers::{backend_for, TextBackend};
use remote_brain::{
  generate_script, Error, Provider, ResolvedTarget, Settings
};

const SYSTEM: &str = "system instruction";

/// Settings pointing every backend at one mock server
fn mock_settings(server: &MockServer) -> Settings
{   Settings
    {   openai_api_key: Some("sk-openai".to_string())
      , anthropic_api_key: Some("sk-anthropic".to_string())
      , groq_api_key: Some("gsk-groq".to_string())
      , openai_base_url: server.uri()
      , anthropic_base_url: server.uri()
      , groq_base_url: format!("{}/openai/v1", server.uri())
      , request_timeout_secs: 5
      , ..Settings::default()
    }
}

#[tokio::test]
async fn test_openai_responses_backend()
{   let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/responses"))
      .and(header("authorization", "Bearer sk-openai"))
      .and(body_partial_json(json!({
        "model": "gpt-4o-mini"
      , "input": [
          {"role": "system", "content": SYSTEM}
        , {"role": "user", "content": "add a cube"}
        ]
      })))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "id": "resp_1"
      , "output": [
          {"type": "reasoning", "content": []}
        , {"type": "message", "content": [
            {"type": "output_text", "text": "```python\n"}
          , {"type": "output_text", "text": "cube()\n```"}
          ]}
        ]
      })))
      .expect(1)
      .mount(&server)
      .await;

    let settings = mock_settings(&server);
    let result = assert_ok!(
      generate_script("add a cube", Some("openai/gpt-4o-mini"), SYSTEM, &settings)
        .await
    );
    assert_eq!(result.code, "cube()");
    assert_eq!(result.provider, Provider::OpenAI);
    assert_eq!(result.qualified_model, "openai/gpt-4o-mini");
}

#[tokio::test]
async fn test_openai_prefers_output_text()
{   let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/responses"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "output_text": "print('hi')"
      , "output": []
      })))
      .mount(&server)
      .await;

    let settings = mock_settings(&server);
    let result = assert_ok!(
      generate_script("say hi", None, SYSTEM, &settings).await
    );
    assert_eq!(result.code, "print('hi')");
    assert_eq!(result.qualified_model, "openai/gpt-4o-mini");
}

#[tokio::test]
async fn test_anthropic_messages_backend()
{   let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/v1/messages"))
      .and(header("x-api-key", "sk-anthropic"))
      .and(header("anthropic-version", "2023-06-01"))
      .and(body_partial_json(json!({
        "model": "claude-3-5-sonnet-latest"
      , "max_tokens": 2000
      , "system": SYSTEM
      , "messages": [{"role": "user", "content": "add a light"}]
      })))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "id": "msg_1"
      , "content": [
          {"type": "text", "text": "```python\nlight()"}
        , {"type": "tool_use", "id": "t1", "name": "noop", "input": {}}
        , {"type": "text", "text": "```"}
        ]
      })))
      .expect(1)
      .mount(&server)
      .await;

    let settings = mock_settings(&server);
    let result = assert_ok!(
      generate_script(
        "add a light"
      , Some("anthropic/claude-3-5-sonnet-latest")
      , SYSTEM
      , &settings
      ).await
    );
    assert_eq!(result.code, "light()");
    assert_eq!(result.provider, Provider::Anthropic);
    assert_eq!(result.qualified_model, "anthropic/claude-3-5-sonnet-latest");
}

#[tokio::test]
async fn test_groq_chat_backend()
{   let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/openai/v1/chat/completions"))
      .and(header("authorization", "Bearer gsk-groq"))
      .and(body_partial_json(json!({
        "model": "llama-3.3-70b-versatile"
      , "temperature": 0.2
      , "messages": [
          {"role": "system", "content": SYSTEM}
        , {"role": "user", "content": "add a camera"}
        ]
      })))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "choices": [
          {"message": {"role": "assistant", "content": "camera()"}
          , "finish_reason": "stop"}
        ]
      })))
      .expect(1)
      .mount(&server)
      .await;

    let settings = mock_settings(&server);
    let result = assert_ok!(
      generate_script(
        "add a camera"
      , Some("llama-3.3-70b-versatile")
      , SYSTEM
      , &settings
      ).await
    );
    assert_eq!(result.code, "camera()");
    assert_eq!(result.provider, Provider::Groq);
    assert_eq!(result.qualified_model, "groq/llama-3.3-70b-versatile");
}

#[tokio::test]
async fn test_blank_reply_is_empty_response()
{   let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/openai/v1/chat/completions"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{"message": {"role": "assistant", "content": "  \n"}}]
      })))
      .mount(&server)
      .await;
    Mock::given(method("POST"))
      .and(path("/v1/messages"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "content": []
      })))
      .mount(&server)
      .await;

    let settings = mock_settings(&server);

    let err = assert_err!(
      generate_script("x", Some("groq/llama-3.1-8b"), SYSTEM, &settings).await
    );
    assert_eq!(err, Error::EmptyResponse("Groq response was empty.".to_string()));

    let err = assert_err!(
      generate_script("x", Some("claude-3-opus"), SYSTEM, &settings).await
    );
    assert_eq!(
      err
    , Error::EmptyResponse("Anthropic response was empty.".to_string())
    );
}

#[tokio::test]
async fn test_empty_fenced_block_is_empty_response()
{   let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/responses"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "output_text": "```python\n```"
      })))
      .mount(&server)
      .await;

    let settings = mock_settings(&server);
    let err = assert_err!(
      generate_script("x", Some("gpt-4o"), SYSTEM, &settings).await
    );
    assert!(matches!(err, Error::EmptyResponse(_)), "{:?}", err);
}

#[tokio::test]
async fn test_non_success_status_is_api_error()
{   let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/responses"))
      .respond_with(
        ResponseTemplate::new(429).set_body_string("rate limited")
      )
      .mount(&server)
      .await;

    let settings = mock_settings(&server);
    let err = assert_err!(
      generate_script("x", None, SYSTEM, &settings).await
    );
    match err
    {   Error::ApiError(msg) => {
          assert!(msg.contains("429"), "{}", msg);
          assert!(msg.contains("rate limited"), "{}", msg);
        }
      , other => panic!("unexpected error: {:?}", other)
    }
}

#[tokio::test]
async fn test_missing_key_fails_before_network()
{   let server = MockServer::start().await;
    Mock::given(method("POST"))
      .respond_with(ResponseTemplate::new(200))
      .expect(0)
      .mount(&server)
      .await;

    let settings = Settings
    {   anthropic_api_key: None
      , ..mock_settings(&server)
    };
    let err = assert_err!(
      generate_script("x", Some("claude-3-haiku"), SYSTEM, &settings).await
    );
    assert_eq!(
      err
    , Error::Configuration("ANTHROPIC_API_KEY is not configured.".to_string())
    );

    let settings = Settings
    {   groq_api_key: Some("   ".to_string())
      , ..mock_settings(&server)
    };
    assert!(matches!(
      backend_for(Provider::Groq, &settings)
    , Err(Error::Configuration(_))
    ));
}

// ===== Dispatcher over an in-process backend =====

struct CannedBackend
{   reply: &'static str
}

#[async_trait]
impl TextBackend for CannedBackend
{   fn provider(&self) -> Provider
    {   Provider::OpenAI
    }

    async fn generate_text(
      &self
    , _model: &str
    , _system_prompt: &str
    , _user_prompt: &str
    ) -> remote_brain::Result<String>
    {   Ok(self.reply.to_string())
    }
}

#[tokio::test]
async fn test_generate_with_extracts_code()
{   let backend = CannedBackend
    {   reply: "Sure!\n```python\nimport math\nprint(math.pi)\n```\nDone."
    };
    let target = ResolvedTarget
    {   provider: Provider::OpenAI
      , model: "gpt-4.1".to_string()
    };

    let result = assert_ok!(
      generate_with(&backend, &target, "pi", SYSTEM).await
    );
    assert_eq!(result.code, "import math\nprint(math.pi)");
    assert_eq!(result.qualified_model, "openai/gpt-4.1");
}

#[tokio::test]
async fn test_generate_with_rejects_foreign_target()
{   let backend = CannedBackend
    {   reply: "print(1)"
    };
    let target = ResolvedTarget
    {   provider: Provider::Anthropic
      , model: "claude-3-5-sonnet-latest".to_string()
    };

    let err = assert_err!(
      generate_with(&backend, &target, "x", SYSTEM).await
    );
    assert!(matches!(err, Error::InvalidInput(_)), "{:?}", err);
}
