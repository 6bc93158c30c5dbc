//! Bearer token middleware for the payments server.
//! This middleware can be placed on any route or scope.
//!
//! It reads the `Authorization: Bearer <token>` header and verifies the token. If the token is valid, its claims are
//! stored in the request extensions (handlers can pick them up with `web::ReqData<JwtClaims>`) and the request is
//! allowed to continue. Otherwise, a 401 Unauthorized response is returned.
use std::{pin::Pin, rc::Rc};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
    HttpMessage,
};
use futures::{
    future::{ok, Ready},
    Future,
};
use log::debug;

use crate::{
    auth::{bearer_token, TokenIssuer},
    errors::ServerError,
};

pub struct JwtAuthMiddlewareFactory {
    issuer: Rc<TokenIssuer>,
}

impl JwtAuthMiddlewareFactory {
    pub fn new(issuer: TokenIssuer) -> Self {
        JwtAuthMiddlewareFactory { issuer: Rc::new(issuer) }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = JwtAuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(JwtAuthMiddlewareService { issuer: Rc::clone(&self.issuer), service: Rc::new(service) })
    }
}

pub struct JwtAuthMiddlewareService<S> {
    issuer: Rc<TokenIssuer>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let issuer = Rc::clone(&self.issuer);
        Box::pin(async move {
            let claims = bearer_token(req.headers()).and_then(|token| issuer.verify(token));
            match claims {
                Ok(claims) => {
                    req.extensions_mut().insert(claims);
                    service.call(req).await
                },
                Err(e) => {
                    debug!("🔑️ Denied {} {}. {e}", req.method(), req.path());
                    Err(ServerError::from(e).into())
                },
            }
        })
    }
}
