//! Wire-format emission through the transport boundary.

use frontline::{
    App, BufferTransport, ControllerRef, Request, Response, RouteDef, RouteTable, Router,
    Transport, WireTransport,
};
use http::StatusCode;

fn dispatch_wire(router: Router, request: Request) -> String {
    let mut app = App::new(router, request);
    let mut transport = WireTransport::new(Vec::new());
    app.run(&mut transport);
    String::from_utf8(transport.into_inner()).expect("utf-8 wire output")
}

#[test]
fn response_emits_status_headers_blank_line_body() {
    let table = RouteTable::new().route(
        "/page",
        RouteDef::new(ControllerRef::from_fn(|_, _| {
            Ok(Response::builder()
                .status(StatusCode::OK)
                .header("x-served-by", "frontline")
                .body("content")
                .build()
                .into())
        })),
    );

    let wire = dispatch_wire(Router::new(table), Request::builder().url("/page").build());
    assert_eq!(
        wire,
        "HTTP/1.1 200 OK\r\nx-served-by: frontline\r\n\r\ncontent"
    );
}

#[test]
fn scalar_result_bypasses_response_path() {
    let table = RouteTable::new().route(
        "/raw",
        RouteDef::new(ControllerRef::from_fn(|_, _| Ok("raw text".into()))),
    );

    // a raw scalar gets the implicit default status
    let wire = dispatch_wire(Router::new(table), Request::builder().url("/raw").build());
    assert_eq!(wire, "HTTP/1.1 200 OK\r\n\r\nraw text");
}

#[test]
fn not_found_report_on_the_wire() {
    let wire = dispatch_wire(
        Router::new(RouteTable::new()),
        Request::builder().url("/none").build(),
    );
    assert_eq!(wire, "HTTP/1.1 404 Not Found\r\n\r\nError 404");
}

#[test]
fn already_sent_transport_suppresses_second_status() {
    let table = RouteTable::new().route(
        "/page",
        RouteDef::new(ControllerRef::from_fn(|_, _| {
            Ok(Response::empty(StatusCode::NO_CONTENT).into())
        })),
    );

    let mut app = App::new(Router::new(table), Request::builder().url("/page").build());
    let mut transport = BufferTransport::new();
    // something upstream already emitted output
    transport.send_status(StatusCode::OK);
    app.run(&mut transport);

    assert_eq!(transport.status(), Some(StatusCode::OK));
}
