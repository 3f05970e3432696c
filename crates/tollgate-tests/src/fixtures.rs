//! Downstream response bodies.

use serde_json::{Value, json};

pub const VERIFICATION_KEY: &str = "f56dffef-b136-429a-97dc-57a6ef035829";

pub fn happy_customer() -> Value {
    json!({
        "id": "cus_123abc",
        "email": "bob@domain.com",
        "card": {"brand": "Visa", "last4": "4242", "exp_month": 11, "exp_year": 2019}
    })
}

/// bob's subscriptions: one for his private modules, one for `bigco`.
pub fn bob_subscriptions() -> Value {
    json!([
        {
            "id": "sub_abcd",
            "current_period_end": 1439766874,
            "current_period_start": 1437088474,
            "quantity": 1,
            "status": "active",
            "interval": "month",
            "amount": 700,
            "license_id": 7,
            "npm_org": "_private-modules-bob",
            "npm_user": "bob",
            "product_id": "b5822d32-4137-4b0c-bb7d-8d7b4ebb1ee4"
        },
        {
            "id": "sub_12346",
            "current_period_end": 1436995358,
            "current_period_start": 1434403358,
            "quantity": 2,
            "status": "active",
            "interval": "month",
            "amount": 1200,
            "license_id": 1,
            "npm_org": "bigco",
            "npm_user": "bob",
            "product_id": "1031405a-70b7-4a3f-b552-8609d9e1428e"
        }
    ])
}

pub fn bigco() -> Value {
    json!({
        "name": "bigco",
        "description": "bigco organization",
        "resource": {},
        "created": "2015-06-19T23:35:42.659Z",
        "updated": "2015-06-19T23:35:42.659Z",
        "deleted": null
    })
}

pub fn bigco_users() -> Value {
    json!({
        "count": 1,
        "items": [
            {"name": "bob", "role": "super-admin", "created": "2015-06-19T23:35:42.659Z"}
        ]
    })
}

pub fn bigco_added_users() -> Value {
    json!({
        "count": 2,
        "items": [
            {"name": "bob", "role": "super-admin"},
            {"name": "betty", "role": "developer"}
        ]
    })
}

pub fn membership(deleted: Option<&str>) -> Value {
    json!({
        "created": "2015-08-05T15:26:46.970Z",
        "deleted": deleted,
        "org_id": 1,
        "role": "developer",
        "updated": "2015-08-05T15:26:46.970Z",
        "user_id": 15
    })
}

pub fn sponsorship(verified: Option<bool>, deleted: Option<&str>) -> Value {
    json!({
        "created": "2015-08-05T20:55:54.759Z",
        "deleted": deleted,
        "id": 15,
        "license_id": 1,
        "npm_user": "betty",
        "updated": "2015-08-05T20:55:54.759Z",
        "verification_key": VERIFICATION_KEY,
        "verified": verified
    })
}
