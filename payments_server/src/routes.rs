//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Database calls are async, and password hashing is pushed onto the
//! blocking thread pool by the engine, so no handler here blocks its worker.
//!
//! Request bodies are taken as raw bytes and decoded explicitly, so that a malformed document produces the standard
//! error envelope naming the offending field, rather than actix's default plain-text rejection.
use actix_web::{get, http::header, web, HttpResponse, Responder, ResponseError};
use log::*;
use payments_engine::{
    db_types::{payment_location, Payment},
    traits::{AccountManagement, PaymentManagement},
    AccountApi,
    PaymentApi,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::{
    auth::{JwtClaims, TokenIssuer},
    data_objects::{AuthenticatedAccount, Credentials, Envelope},
    errors::{ServerError, INVALID_UUID},
};

pub const PAYMENTS_PATH: &str = "/v1/payments";

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

/// Fallback for unknown paths, so that they also get an envelope.
pub async fn not_found() -> HttpResponse {
    ServerError::NotFound("Resource not found".into()).error_response()
}

fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, ServerError> {
    serde_json::from_slice(body).map_err(|e| {
        debug!("💻️ Could not decode request body. {e}");
        ServerError::InvalidJson(e.to_string())
    })
}

fn parse_payment_id(id: &str) -> Result<Uuid, ServerError> {
    Uuid::parse_str(id).map_err(|e| {
        debug!("💻️ {id} is not a valid payment id. {e}");
        ServerError::ValidationError(INVALID_UUID.into())
    })
}

fn caller(claims: &Option<web::ReqData<JwtClaims>>) -> String {
    match claims {
        Some(claims) => format!("account #{}", claims.sub),
        None => "anonymous caller".into(),
    }
}

//----------------------------------------------   Accounts  ----------------------------------------------------
route!(register => Post "/v1/accounts" impl AccountManagement);
/// Creates a new account and returns it, along with an access token, with status 201.
pub async fn register<B: AccountManagement>(
    body: web::Bytes,
    api: web::Data<AccountApi<B>>,
    signer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Received registration request");
    let credentials = decode_json::<Option<Credentials>>(&body)?.unwrap_or_default();
    let account = api.register(&credentials.email, &credentials.password).await?;
    let token = signer.issue_token(account.id)?;
    info!("💻️ Registered account #{} for {}", account.id, account.email);
    Ok(HttpResponse::Created().json(Envelope::success(AuthenticatedAccount::new(account, token))))
}

route!(login => Post "/v1/login" impl AccountManagement);
/// Checks the supplied credentials and issues a new access token.
pub async fn login<B: AccountManagement>(
    body: web::Bytes,
    api: web::Data<AccountApi<B>>,
    signer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Received login request");
    let credentials = decode_json::<Option<Credentials>>(&body)?.unwrap_or_default();
    let account = api.authenticate(&credentials.email, &credentials.password).await?;
    let token = signer.issue_token(account.id)?;
    debug!("💻️ Account #{} logged in", account.id);
    Ok(HttpResponse::Ok().json(Envelope::success(AuthenticatedAccount::new(account, token))))
}

//----------------------------------------------   Payments  ----------------------------------------------------
// These routes are registered inside the `/v1/payments` scope.
route!(create_payment => Post "" impl PaymentManagement);
pub async fn create_payment<B: PaymentManagement>(
    body: web::Bytes,
    claims: Option<web::ReqData<JwtClaims>>,
    api: web::Data<PaymentApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let payment = decode_json::<Payment>(&body)?;
    debug!("💻️ POST payment {} from {}", payment.id, caller(&claims));
    let location = api.create_payment(payment).await?;
    Ok(HttpResponse::Created().insert_header((header::LOCATION, location)).finish())
}

route!(payments => Get "" impl PaymentManagement);
pub async fn payments<B: PaymentManagement>(api: web::Data<PaymentApi<B>>) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET payments");
    let payments = api.payments().await?;
    Ok(HttpResponse::Ok().json(Envelope::success(payments).with_self_link(PAYMENTS_PATH)))
}

route!(payment_by_id => Get "/{id}" impl PaymentManagement);
pub async fn payment_by_id<B: PaymentManagement>(
    path: web::Path<String>,
    api: web::Data<PaymentApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = parse_payment_id(&path)?;
    trace!("💻️ GET payment {id}");
    let payment = api.payment_by_id(&id).await?;
    Ok(HttpResponse::Ok().json(Envelope::success(payment).with_self_link(payment_location(&id))))
}

route!(update_payment => Put "/{id}" impl PaymentManagement);
/// Replaces the whole payment document. The id in the body must match the id in the path.
pub async fn update_payment<B: PaymentManagement>(
    path: web::Path<String>,
    body: web::Bytes,
    claims: Option<web::ReqData<JwtClaims>>,
    api: web::Data<PaymentApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = parse_payment_id(&path)?;
    let payment = decode_json::<Payment>(&body)?;
    debug!("💻️ PUT payment {id} from {}", caller(&claims));
    let location = api.update_payment(&id, payment).await?;
    Ok(HttpResponse::NoContent().insert_header((header::LOCATION, location)).finish())
}

route!(delete_payment => Delete "/{id}" impl PaymentManagement);
pub async fn delete_payment<B: PaymentManagement>(
    path: web::Path<String>,
    claims: Option<web::ReqData<JwtClaims>>,
    api: web::Data<PaymentApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = parse_payment_id(&path)?;
    debug!("💻️ DELETE payment {id} from {}", caller(&claims));
    api.delete_payment(&id).await?;
    Ok(HttpResponse::NoContent().finish())
}
