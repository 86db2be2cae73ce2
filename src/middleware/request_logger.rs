//! Request logging middleware.
//!
//! Every request gets a UUIDv7 request id, echoed back in `X-Request-Id`.
//! Query strings are not logged: lookups and filters may carry a DNI.

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::header::{HeaderName, HeaderValue};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};
use std::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::auth::session_token;

/// Response header carrying the request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request logger middleware factory.
pub struct RequestLogger;

impl<S, B> Transform<S, ServiceRequest> for RequestLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestLoggerMiddleware { service }))
    }
}

/// Request logger middleware service.
pub struct RequestLoggerMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let request_id = Uuid::now_v7();
        let method = req.method().to_string();
        let path = req.path().to_string();
        let remote_addr = req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or("unknown")
            .to_string();
        let has_session = session_token(req.request()).is_some();

        info!(
            target: "api",
            request_id = %request_id,
            method = %method,
            path = %path,
            remote_addr = %remote_addr,
            session = has_session,
            "Request started"
        );

        let fut = self.service.call(req);

        Box::pin(async move {
            let mut res = fut.await?;
            let elapsed = start.elapsed().as_millis();
            let status = res.status();

            if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
                res.headers_mut()
                    .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
            }

            if status.is_server_error() {
                error!(
                    target: "api",
                    request_id = %request_id,
                    method = %method,
                    path = %path,
                    status = status.as_u16(),
                    duration_ms = elapsed,
                    "Server error"
                );
            } else if status.is_client_error() {
                warn!(
                    target: "api",
                    request_id = %request_id,
                    method = %method,
                    path = %path,
                    status = status.as_u16(),
                    duration_ms = elapsed,
                    "Client error"
                );
            } else {
                info!(
                    target: "api",
                    request_id = %request_id,
                    method = %method,
                    path = %path,
                    status = status.as_u16(),
                    duration_ms = elapsed,
                    "Request completed"
                );
            }

            Ok(res)
        })
    }
}
