use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::web::Data;
use actix_web::{test, App};
use authgate::code;
use authgate::connections::{ApiKeyRecord, MemoryConnections, UserRecord};
use authgate::controller::ControllerRegistry;
use authgate::permission::{Grants, PermissionTable};
use authgate::response::CommonResponse;
use authgate::restful::{self, HealthzResponse};
use authgate::whitelist::{Whitelist, WhitelistRule};
use authgate::{Gate, Router};
use once_cell::sync::Lazy;

static GATE: Lazy<Arc<Gate>> = Lazy::new(|| {
    let controllers = ControllerRegistry::new()
        .with("widgets", ["getWidget", "postWidget"])
        .with("status", ["getStatus"]);
    let permissions = PermissionTable::new()
        .with("widgets", "getWidget", 1)
        .with("widgets", "postWidget", 3)
        .with("status", "getStatus", 0);
    let whitelist = Whitelist::new(vec![WhitelistRule::controller("status")]);
    let users = vec![UserRecord {
        name: String::from("alice"),
        password: code::sha256("secret-salt"),
        salt: String::from("-salt"),
    }];
    let api_keys = vec![ApiKeyRecord {
        key: String::from("reader"),
        owner: String::from("42"),
        grants: Grants::new().with("widgets", 1),
    }];
    let conns = MemoryConnections::new(users, api_keys).unwrap();

    let gate = Gate::builder()
        .router(Router::new("/api"))
        .controllers(controllers)
        .permissions(permissions)
        .whitelist(whitelist)
        .connections(Arc::new(conns))
        .build()
        .unwrap();
    Arc::new(gate)
});

macro_rules! init_app {
    () => {
        test::init_service(
            App::new()
                .app_data(Data::new(GATE.clone()))
                .configure(restful::configure),
        )
        .await
    };
}

#[actix_web::test]
async fn test_pass_headers() {
    let app = init_app!();

    let req = test::TestRequest::get()
        .uri("/api/widgets/5")
        .insert_header(("Authorization", "Global reader"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let headers = resp.headers();
    assert_eq!(headers.get(restful::HEADER_GATE_CONTROLLER).unwrap(), "widgets");
    assert_eq!(headers.get(restful::HEADER_GATE_METHOD).unwrap(), "getWidget");
    assert_eq!(headers.get(restful::HEADER_GATE_RESOURCE_ID).unwrap(), "5");
    assert_eq!(headers.get(restful::HEADER_GATE_IDENTITY).unwrap(), "42");

    // Basic credentials, "me" becomes the user name.
    let auth = format!("Basic {}", code::base64_encode("alice:secret"));
    let req = test::TestRequest::get()
        .uri("/api/widgets/me")
        .insert_header(("Authorization", auth))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let headers = resp.headers();
    assert_eq!(headers.get(restful::HEADER_GATE_RESOURCE_ID).unwrap(), "alice");
    assert_eq!(headers.get(restful::HEADER_GATE_IDENTITY).unwrap(), "alice");

    let req = test::TestRequest::get().uri("/api/status").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().get(restful::HEADER_GATE_IDENTITY).is_none());
}

#[actix_web::test]
async fn test_rejections() {
    let app = init_app!();

    let req = test::TestRequest::get().uri("/api/widgets/5").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: CommonResponse = test::read_body_json(resp).await;
    assert_eq!(body.code, 401);

    let req = test::TestRequest::get()
        .uri("/api/widgets/5")
        .insert_header(("Authorization", "Hawk id=1"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: CommonResponse = test::read_body_json(resp).await;
    assert_eq!(
        body.message.as_deref(),
        Some("Unknown authentication scheme 'Hawk'")
    );

    let req = test::TestRequest::post()
        .uri("/api/widgets/5")
        .insert_header(("Authorization", "Global reader"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get().uri("/api/gadgets").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::delete().uri("/api/widgets/5").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(resp.headers().get("Allow").unwrap(), "GET,POST");
    assert_eq!(
        resp.headers().get("Access-Control-Allow-Methods").unwrap(),
        "GET,POST"
    );
}

#[actix_web::test]
async fn test_options() {
    let app = init_app!();

    let req = test::TestRequest::default()
        .method(actix_web::http::Method::OPTIONS)
        .uri("/api/widgets/5")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(resp.headers().get("Allow").unwrap(), "GET,POST");

    let body = test::read_body(resp).await;
    assert!(body.is_empty());
}

#[actix_web::test]
async fn test_healthz() {
    let app = init_app!();

    let req = test::TestRequest::get().uri(restful::HEALTHZ_PATH).to_request();
    let resp: HealthzResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp.version, env!("CARGO_PKG_VERSION"));
    assert!(resp.now > 0);
}
