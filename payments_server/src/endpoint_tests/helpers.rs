use actix_web::{
    body::to_bytes,
    http::{header::HeaderMap, StatusCode},
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use chrono::{DateTime, Duration, Utc};
use log::debug;
use payments_engine::{
    db_types::{Account, Payment},
    AccountApi,
    PaymentApi,
};
use serde_json::Value;
use uuid::Uuid;

use super::mocks::{MockAccountManager, MockPaymentManager};
use crate::{
    auth::TokenIssuer,
    config::AuthConfig,
    middleware::JwtAuthMiddlewareFactory,
    routes::{
        CreatePaymentRoute,
        DeletePaymentRoute,
        LoginRoute,
        PaymentByIdRoute,
        PaymentsRoute,
        RegisterRoute,
        UpdatePaymentRoute,
        PAYMENTS_PATH,
    },
};

// Creates a test `AuthConfig` for issuing tokens. DO NOT re-use this secret anywhere.
pub fn get_auth_config() -> AuthConfig {
    AuthConfig::new("925842e11914fdd0c9a2ab8a38dac9de57b3e392372cde1661b1a84b1d8e430e", Duration::hours(12))
}

pub fn issue_token(account_id: i64, issued_at: DateTime<Utc>) -> String {
    TokenIssuer::new(&get_auth_config()).issue_token_at(account_id, issued_at).expect("Failed to sign token")
}

pub fn bearer(account_id: i64) -> String {
    format!("Bearer {}", issue_token(account_id, Utc::now()))
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("Response body is not JSON")
    }

    pub fn errors(&self) -> Vec<String> {
        let json = self.json();
        assert!(json["data"].is_null(), "Error responses must not carry data");
        serde_json::from_value(json["errors"].clone()).expect("errors is not a list of strings")
    }

    pub fn location(&self) -> Option<&str> {
        self.headers.get("Location").and_then(|v| v.to_str().ok())
    }
}

/// Sends `req` to an app built by `configure`. Errors raised by middleware are rendered the same way the server
/// would render them.
pub async fn send_request<F>(req: TestRequest, configure: F) -> TestResponse
where F: FnOnce(&mut ServiceConfig) {
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    match test::try_call_service(&service, req.to_request()).await {
        Ok(res) => {
            let status = res.status();
            let headers = res.headers().clone();
            let body = test::read_body(res).await;
            TestResponse { status, headers, body: String::from_utf8_lossy(&body).into_owned() }
        },
        Err(e) => {
            let res = e.error_response();
            let status = res.status();
            let headers = res.headers().clone();
            let body = to_bytes(res.into_body()).await.expect("Could not read error body");
            TestResponse { status, headers, body: String::from_utf8_lossy(&body).into_owned() }
        },
    }
}

pub fn configure_accounts(accounts: MockAccountManager) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(AccountApi::new(accounts)))
            .app_data(web::Data::new(TokenIssuer::new(&get_auth_config())))
            .service(RegisterRoute::<MockAccountManager>::new())
            .service(LoginRoute::<MockAccountManager>::new());
    }
}

pub fn configure_payments(payments: MockPaymentManager) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let scope = web::scope(PAYMENTS_PATH)
            .wrap(JwtAuthMiddlewareFactory::new(TokenIssuer::new(&get_auth_config())))
            .service(CreatePaymentRoute::<MockPaymentManager>::new())
            .service(PaymentsRoute::<MockPaymentManager>::new())
            .service(PaymentByIdRoute::<MockPaymentManager>::new())
            .service(UpdatePaymentRoute::<MockPaymentManager>::new())
            .service(DeletePaymentRoute::<MockPaymentManager>::new());
        cfg.app_data(web::Data::new(PaymentApi::new(payments))).service(scope);
    }
}

pub fn account(id: i64, email: &str, password_hash: &str) -> Account {
    Account {
        id,
        email: email.to_string(),
        password_hash: password_hash.to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub const PAYMENT_ID: &str = "4ee3a8d8-ca7b-11e9-9cb5-2a2ae2dbcce4";

pub fn payment_json(id: &str) -> Value {
    serde_json::json!({
        "type": "Payment",
        "id": id,
        "version": 0,
        "organisation_id": "743d5b63-8e6f-432e-a8fa-c5d8d2ee5fcb",
        "attributes": {
            "amount": "100.21",
            "currency": "GBP",
            "end_to_end_reference": "Wil piano Jan",
            "numeric_reference": "1002001",
            "payment_id": "123456789012345678",
            "payment_purpose": "Paying for goods/services",
            "payment_scheme": "FPS",
            "payment_type": "Credit",
            "processing_date": "2017-01-18",
            "reference": "Payment for Em's piano lessons",
            "scheme_payment_sub_type": "InternetBanking",
            "scheme_payment_type": "ImmediatePayment",
            "beneficiary_party": {
                "account_name": "W Owens",
                "account_number": "31926819",
                "account_number_code": "BBAN",
                "account_type": 0,
                "address": "1 The Beneficiary Localtown SE2",
                "bank_id": "403000",
                "bank_id_code": "GBDSC",
                "name": "Wilfred Jeremiah Owens"
            },
            "debtor_party": {
                "account_name": "EJ Brown Black",
                "account_number": "GB29XABC10161234567801",
                "account_number_code": "IBAN",
                "address": "10 Debtor Crescent Sourcetown NE1",
                "bank_id": "203301",
                "bank_id_code": "GBDSC",
                "name": "Emelia Jane Brown"
            },
            "sponsor_party": {
                "account_number": "56781234",
                "bank_id": "123123",
                "bank_id_code": "GBDSC"
            },
            "charges_information": {
                "bearer_code": "SHAR",
                "sender_charges": [
                    { "amount": "5.00", "currency": "GBP" },
                    { "amount": "10.00", "currency": "USD" }
                ],
                "receiver_charges_amount": "1.00",
                "receiver_charges_currency": "USD"
            },
            "fx": {
                "contract_reference": "FX123",
                "exchange_rate": "2.00000",
                "original_amount": "200.42",
                "original_currency": "USD"
            }
        }
    })
}

pub fn payment(id: &str) -> Payment {
    serde_json::from_value(payment_json(id)).expect("Invalid test payment")
}

pub fn payment_uuid() -> Uuid {
    Uuid::parse_str(PAYMENT_ID).expect("Invalid test uuid")
}
