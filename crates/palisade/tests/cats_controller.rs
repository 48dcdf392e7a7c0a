//! A small cats API wired through the full pipeline.
//!
//! Global stages mirror a typical service setup: every response passes
//! through `LoggingInterceptor` and `TransformInterceptor`, so successful
//! responses arrive as `{"data": ...}`.

use std::time::Duration;

use http::StatusCode;
use palisade::prelude::*;
use serde_json::json;

const DEMO_UUID: &str = "550e8400-e29b-41d4-a716-446655440000";

fn cats_registry() -> MetadataRegistry {
    let descriptors = vec![
        HandlerDescriptor::new("cats.create").with_param(ParamPipeSpec::body().pipe(ValidationPipe)),
        HandlerDescriptor::new("cats.findAll"),
        HandlerDescriptor::new("cats.builtinInt").with_param(ParamPipeSpec::param("id").pipe(ParseIntPipe)),
        HandlerDescriptor::new("cats.builtinFloat")
            .with_param(ParamPipeSpec::param("value").pipe(ParseFloatPipe)),
        HandlerDescriptor::new("cats.builtinBool").with_param(ParamPipeSpec::param("flag").pipe(ParseBoolPipe)),
        HandlerDescriptor::new("cats.builtinUuid")
            .with_param(ParamPipeSpec::param("uuid").pipe(ParseUuidPipe::new())),
        HandlerDescriptor::new("cats.builtinArray")
            .with_param(ParamPipeSpec::query("ids").pipe(ParseArrayPipe::new())),
        HandlerDescriptor::new("cats.builtinDefault")
            .with_param(ParamPipeSpec::query("page").pipe(DefaultValuePipe::new(1)))
            .with_param(ParamPipeSpec::query("limit").pipe(DefaultValuePipe::new(10))),
        HandlerDescriptor::new("cats.lowercase")
            .with_param(ParamPipeSpec::param("name").pipe(ToLowerCasePipe)),
        HandlerDescriptor::new("cats.combined")
            .with_param(ParamPipeSpec::param("id").pipe(ParseIntPipe))
            .with_param(ParamPipeSpec::query("name").pipe(TrimPipe).pipe(ToLowerCasePipe)),
        HandlerDescriptor::new("cats.guardAuth").with_guard(BearerTokenGuard::new().with_scheme("Bearer")),
        HandlerDescriptor::new("cats.guardAdmin")
            .with_guard(AuthGuard)
            .with_role("admin"),
        HandlerDescriptor::new("cats.guardUserId")
            .with_guard(AuthGuard)
            .with_param(ParamPipeSpec::principal_field("id")),
        HandlerDescriptor::new("cats.cache").with_interceptor(CacheInterceptor::new()),
        HandlerDescriptor::new("cats.timeout").with_interceptor(TimeoutInterceptor::new()),
        HandlerDescriptor::new("cats.exception").with_interceptor(ExceptionInterceptor),
    ];

    descriptors
        .into_iter()
        .try_fold(MetadataRegistry::builder(), |builder, d| builder.register(d))
        .expect("cats routes register")
        .build()
}

fn cats_executor() -> PipelineExecutor {
    let config = PalisadeConfig::default();
    palisade::executor_builder(cats_registry(), &config)
        .global_interceptor(LoggingInterceptor)
        .global_interceptor(TransformInterceptor)
        .build()
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[tokio::test]
async fn create_requires_body() {
    let executor = cats_executor();

    let envelope = executor
        .execute(RequestContext::new("POST", "/cats"), "cats.create", |_| async {
            Ok(json!("This action adds a new cat"))
        })
        .await
        .unwrap_err();
    assert_eq!(envelope.status_code, 400);

    let request = RequestContext::new("POST", "/cats").with_body(json!({"name": "Tom", "age": 3}));
    let response = executor
        .execute(request, "cats.create", |params| async move {
            let name = params.get(0).and_then(|b| b["name"].as_str()).unwrap_or_default().to_string();
            Ok(json!(format!("This action adds a new cat named {name}")))
        })
        .await
        .unwrap();
    assert_eq!(response, json!({"data": "This action adds a new cat named Tom"}));
}

#[tokio::test]
async fn builtin_parse_pipes() {
    let executor = cats_executor();

    let request = RequestContext::new("GET", "/cats/builtin/float/3.14").with_route_param("value", "3.14");
    let response = executor
        .execute(request, "cats.builtinFloat", |params| async move {
            Ok(json!(format!("Float value: {}", text(&params.into_inner()[0]))))
        })
        .await
        .unwrap();
    assert_eq!(response, json!({"data": "Float value: 3.14"}));

    let request = RequestContext::new("GET", "/cats/builtin/bool/1").with_route_param("flag", "1");
    let response = executor
        .execute(request, "cats.builtinBool", |params| async move {
            Ok(json!(format!("Boolean flag: {}", text(&params.into_inner()[0]))))
        })
        .await
        .unwrap();
    assert_eq!(response, json!({"data": "Boolean flag: true"}));

    let request = RequestContext::new("GET", "/cats/builtin/uuid").with_route_param("uuid", DEMO_UUID);
    let response = executor
        .execute(request, "cats.builtinUuid", |params| async move {
            Ok(json!(format!("UUID: {}", text(&params.into_inner()[0]))))
        })
        .await
        .unwrap();
    assert_eq!(response, json!({"data": format!("UUID: {DEMO_UUID}")}));

    let request = RequestContext::new("GET", "/cats/builtin/uuid/nope").with_route_param("uuid", "nope");
    let envelope = executor
        .execute(request, "cats.builtinUuid", |_| async { Ok(Value::Null) })
        .await
        .unwrap_err();
    assert_eq!(envelope.status_code, 400);
    assert_eq!(envelope.message, json!("Validation failed (uuid is expected)"));
}

#[tokio::test]
async fn builtin_array_and_defaults() {
    let executor = cats_executor();

    let request = RequestContext::new("GET", "/cats/builtin/array").with_query("ids", "1,2,3");
    let response = executor
        .execute(request, "cats.builtinArray", |params| async move {
            params
                .parse::<Vec<String>>(0)
                .map(|ids| json!(format!("Array of IDs: {}", ids.join(", "))))
        })
        .await
        .unwrap();
    assert_eq!(response, json!({"data": "Array of IDs: 1, 2, 3"}));

    let request = RequestContext::new("GET", "/cats/builtin/default").with_query("limit", "25");
    let response = executor
        .execute(request, "cats.builtinDefault", |params| async move {
            let values = params.into_inner();
            Ok(json!(format!("Page: {}, Limit: {}", text(&values[0]), text(&values[1]))))
        })
        .await
        .unwrap();
    assert_eq!(response, json!({"data": "Page: 1, Limit: 25"}));
}

#[tokio::test]
async fn custom_pipes_compose() {
    let executor = cats_executor();

    let request = RequestContext::new("GET", "/cats/custom/lowercase/FLUFFY").with_route_param("name", "FLUFFY");
    let response = executor
        .execute(request, "cats.lowercase", |params| async move {
            Ok(json!(format!("Name in lowercase: {}", text(&params.into_inner()[0]))))
        })
        .await
        .unwrap();
    assert_eq!(response, json!({"data": "Name in lowercase: fluffy"}));

    let request = RequestContext::new("GET", "/cats/combined/5")
        .with_route_param("id", "5")
        .with_query("name", "  Tom  ");
    let response = executor
        .execute(request, "cats.combined", |params| async move {
            let values = params.into_inner();
            Ok(json!(format!("ID: {}, Name: {}", values[0], text(&values[1]))))
        })
        .await
        .unwrap();
    assert_eq!(response, json!({"data": "ID: 5, Name: tom"}));

    let request = RequestContext::new("GET", "/cats/combined/x").with_route_param("id", "x");
    let envelope = executor
        .execute(request, "cats.combined", |_| async { Ok(Value::Null) })
        .await
        .unwrap_err();
    assert_eq!(envelope.status_code, 400);
}

#[tokio::test]
async fn guards_protect_routes() {
    let executor = cats_executor();

    let envelope = executor
        .execute(RequestContext::new("GET", "/cats/guard/auth"), "cats.guardAuth", |_| async {
            Ok(json!("This route is protected by AuthGuard"))
        })
        .await
        .unwrap_err();
    assert_eq!(envelope.status_code, 401);

    let request = RequestContext::new("GET", "/cats/guard/auth").with_header("Authorization", "Bearer secret");
    let response = executor
        .execute(request, "cats.guardAuth", |_| async {
            Ok(json!("This route is protected by AuthGuard"))
        })
        .await
        .unwrap();
    assert_eq!(response, json!({"data": "This route is protected by AuthGuard"}));

    let request = RequestContext::new("GET", "/cats/guard/admin")
        .with_principal(Principal::new("u1").with_role("user"));
    let envelope = executor
        .execute(request, "cats.guardAdmin", |_| async { Ok(json!("This route is only for admins")) })
        .await
        .unwrap_err();
    assert_eq!(envelope.status_code, 403);
    assert_eq!(envelope.message, json!("Forbidden resource"));

    let request = RequestContext::new("GET", "/cats/guard/admin")
        .with_principal(Principal::new("u2").with_roles(["admin"]));
    let response = executor
        .execute(request, "cats.guardAdmin", |_| async { Ok(json!("This route is only for admins")) })
        .await
        .unwrap();
    assert_eq!(response, json!({"data": "This route is only for admins"}));
}

#[tokio::test]
async fn principal_field_is_injected() {
    let executor = cats_executor();

    let request = RequestContext::new("GET", "/cats/guard/user-id").with_principal(Principal::new("42"));
    let response = executor
        .execute(request, "cats.guardUserId", |params| async move {
            Ok(json!(format!("Your user ID is: {}", text(&params.into_inner()[0]))))
        })
        .await
        .unwrap();
    assert_eq!(response, json!({"data": "Your user ID is: 42"}));
}

#[tokio::test]
async fn cache_serves_repeat_requests() {
    let executor = cats_executor();

    let first = executor
        .execute(RequestContext::new("GET", "/cats/interceptor/cache"), "cats.cache", |_| async {
            Ok(json!("first"))
        })
        .await
        .unwrap();
    let second = executor
        .execute(RequestContext::new("GET", "/cats/interceptor/cache"), "cats.cache", |_| async {
            Ok(json!("second"))
        })
        .await
        .unwrap();

    assert_eq!(first, json!({"data": "first"}));
    assert_eq!(second, first);
}

#[tokio::test(start_paused = true)]
async fn timeout_interceptor_aborts_slow_handler() {
    let executor = cats_executor();

    let envelope = executor
        .execute(RequestContext::new("GET", "/cats/interceptor/timeout"), "cats.timeout", |_| async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(json!("This should timeout"))
        })
        .await
        .unwrap_err();

    assert_eq!(envelope.status_code, 408);
    assert_eq!(envelope.path, "/cats/interceptor/timeout");
}

#[tokio::test]
async fn exception_interceptor_hides_internal_errors() {
    let executor = cats_executor();

    let envelope = executor
        .execute(RequestContext::new("GET", "/cats/interceptor/exception"), "cats.exception", |_| async {
            Err(PipelineError::internal("This is a test error"))
        })
        .await
        .unwrap_err();

    assert_eq!(envelope.status_code, 500);
    assert_eq!(envelope.message, json!("Internal server error"));
}

#[tokio::test]
async fn handler_http_error_keeps_status() {
    let executor = cats_executor();

    let request = RequestContext::new("GET", "/cats/builtin/int/99").with_route_param("id", "99");
    let envelope = executor
        .execute(request, "cats.builtinInt", |params| async move {
            params.parse::<i64>(0).and_then(|id| {
                Err(PipelineError::http(StatusCode::NOT_FOUND, format!("Cat #{id} not found")))
            })
        })
        .await
        .unwrap_err();

    assert_eq!(envelope.status_code, 404);
    assert_eq!(envelope.message, json!("Cat #99 not found"));
}
