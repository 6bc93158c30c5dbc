//! Sqlite database operations for payment aggregates.
//!
//! A payment is spread over one parent table and six sub-tables. Reads fetch each table with an explicit query and
//! stitch the rows back together in memory; writes touch every table and must therefore run inside a transaction.
//! None of the write functions here open a transaction themselves. Pass `&mut *tx` as the connection argument.
use std::collections::HashMap;

use chrono::NaiveDate;
use log::{debug, trace};
use sqlx::{sqlite::SqliteRow, FromRow, QueryBuilder, Sqlite, SqliteConnection};
use uuid::Uuid;

use crate::{
    db_types::{ChargesInformation, Charge, Fx, Party, PartyRole, Payment, PaymentAttributes, SponsorParty},
    traits::PaymentApiError,
};

//--------------------------------------     Row types       ---------------------------------------------------------

#[derive(Debug, FromRow)]
struct PaymentRow {
    id: String,
    resource_type: String,
    version: i64,
    organisation_id: String,
    amount: String,
    currency: String,
    end_to_end_reference: String,
    numeric_reference: String,
    scheme_payment_id: String,
    payment_purpose: String,
    payment_scheme: String,
    payment_type: String,
    processing_date: Option<NaiveDate>,
    reference: String,
    scheme_payment_sub_type: String,
    scheme_payment_type: String,
}

#[derive(Debug, FromRow)]
struct PartyRow {
    payment_id: String,
    role: String,
    account_name: String,
    account_number: String,
    account_number_code: String,
    account_type: Option<i64>,
    address: String,
    bank_id: String,
    bank_id_code: String,
    name: String,
}

impl From<PartyRow> for Party {
    fn from(row: PartyRow) -> Self {
        Party {
            account_name: row.account_name,
            account_number: row.account_number,
            account_number_code: row.account_number_code,
            account_type: row.account_type,
            address: row.address,
            bank_id: row.bank_id,
            bank_id_code: row.bank_id_code,
            name: row.name,
        }
    }
}

#[derive(Debug, FromRow)]
struct SponsorRow {
    payment_id: String,
    account_number: String,
    bank_id: String,
    bank_id_code: String,
}

#[derive(Debug, FromRow)]
struct ChargesInformationRow {
    payment_id: String,
    bearer_code: String,
    receiver_charges_amount: String,
    receiver_charges_currency: String,
}

#[derive(Debug, FromRow)]
struct ChargeRow {
    payment_id: String,
    amount: String,
    currency: String,
}

#[derive(Debug, FromRow)]
struct FxRow {
    payment_id: String,
    contract_reference: String,
    exchange_rate: String,
    original_amount: String,
    original_currency: String,
}

/// All sub-records for a set of payments, keyed by payment id.
#[derive(Default)]
struct SubRecords {
    parties: HashMap<String, Vec<PartyRow>>,
    sponsors: HashMap<String, SponsorRow>,
    charges_information: HashMap<String, ChargesInformationRow>,
    charges: HashMap<String, Vec<ChargeRow>>,
    fx: HashMap<String, FxRow>,
}

impl SubRecords {
    async fn fetch(id: Option<&str>, conn: &mut SqliteConnection) -> Result<Self, sqlx::Error> {
        let mut parties = HashMap::<String, Vec<PartyRow>>::new();
        for row in fetch_rows::<PartyRow>("SELECT * FROM parties", id, None, conn).await? {
            parties.entry(row.payment_id.clone()).or_default().push(row);
        }
        let mut charges = HashMap::<String, Vec<ChargeRow>>::new();
        let charge_rows = fetch_rows::<ChargeRow>(
            "SELECT payment_id, amount, currency FROM sender_charges",
            id,
            Some("payment_id, position"),
            conn,
        )
        .await?;
        for row in charge_rows {
            charges.entry(row.payment_id.clone()).or_default().push(row);
        }
        let sponsors = fetch_rows::<SponsorRow>("SELECT * FROM sponsor_parties", id, None, conn)
            .await?
            .into_iter()
            .map(|r| (r.payment_id.clone(), r))
            .collect();
        let charges_information =
            fetch_rows::<ChargesInformationRow>("SELECT * FROM charges_information", id, None, conn)
                .await?
                .into_iter()
                .map(|r| (r.payment_id.clone(), r))
                .collect();
        let fx = fetch_rows::<FxRow>("SELECT * FROM fx", id, None, conn)
            .await?
            .into_iter()
            .map(|r| (r.payment_id.clone(), r))
            .collect();
        Ok(Self { parties, sponsors, charges_information, charges, fx })
    }

    /// Moves the sub-records for `row` out of the collection and builds the full aggregate.
    fn assemble(&mut self, row: PaymentRow) -> Result<Payment, PaymentApiError> {
        let id = parse_uuid(&row.id, "payment id")?;
        let organisation_id = parse_uuid(&row.organisation_id, "organisation id")?;
        let mut beneficiary_party = None;
        let mut debtor_party = None;
        for party in self.parties.remove(&row.id).unwrap_or_default() {
            let role = party.role.parse::<PartyRole>().map_err(PaymentApiError::DatabaseError)?;
            match role {
                PartyRole::Beneficiary => beneficiary_party = Some(party.into()),
                PartyRole::Debtor => debtor_party = Some(party.into()),
            }
        }
        let sponsor_party = self.sponsors.remove(&row.id).map(|s| SponsorParty {
            account_number: s.account_number,
            bank_id: s.bank_id,
            bank_id_code: s.bank_id_code,
        });
        let sender_charges = self
            .charges
            .remove(&row.id)
            .unwrap_or_default()
            .into_iter()
            .map(|c| Charge { amount: c.amount, currency: c.currency })
            .collect::<Vec<_>>();
        let charges_information = self.charges_information.remove(&row.id).map(|c| ChargesInformation {
            bearer_code: c.bearer_code,
            sender_charges,
            receiver_charges_amount: c.receiver_charges_amount,
            receiver_charges_currency: c.receiver_charges_currency,
        });
        let fx = self.fx.remove(&row.id).map(|f| Fx {
            contract_reference: f.contract_reference,
            exchange_rate: f.exchange_rate,
            original_amount: f.original_amount,
            original_currency: f.original_currency,
        });
        let attributes = PaymentAttributes {
            amount: row.amount,
            currency: row.currency,
            end_to_end_reference: row.end_to_end_reference,
            numeric_reference: row.numeric_reference,
            payment_id: row.scheme_payment_id,
            payment_purpose: row.payment_purpose,
            payment_scheme: row.payment_scheme,
            payment_type: row.payment_type,
            processing_date: row.processing_date,
            reference: row.reference,
            scheme_payment_sub_type: row.scheme_payment_sub_type,
            scheme_payment_type: row.scheme_payment_type,
            beneficiary_party,
            debtor_party,
            sponsor_party,
            charges_information,
            fx,
        };
        Ok(Payment { resource_type: row.resource_type, id, version: row.version, organisation_id, attributes })
    }
}

fn parse_uuid(value: &str, what: &str) -> Result<Uuid, PaymentApiError> {
    Uuid::parse_str(value)
        .map_err(|e| PaymentApiError::DatabaseError(format!("Invalid {what} ({value}) stored in database. {e}")))
}

async fn fetch_rows<T>(
    select: &str,
    id: Option<&str>,
    order_by: Option<&str>,
    conn: &mut SqliteConnection,
) -> Result<Vec<T>, sqlx::Error>
where
    T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    let mut builder = QueryBuilder::<Sqlite>::new(select);
    if let Some(id) = id {
        builder.push(" WHERE payment_id = ");
        builder.push_bind(id.to_string());
    }
    if let Some(order) = order_by {
        builder.push(" ORDER BY ");
        builder.push(order);
    }
    builder.build_query_as::<T>().fetch_all(conn).await
}

const SELECT_PAYMENTS: &str = r#"
    SELECT
        payments.id,
        payments.resource_type,
        payments.version,
        payments.organisation_id,
        payment_attributes.amount,
        payment_attributes.currency,
        payment_attributes.end_to_end_reference,
        payment_attributes.numeric_reference,
        payment_attributes.scheme_payment_id,
        payment_attributes.payment_purpose,
        payment_attributes.payment_scheme,
        payment_attributes.payment_type,
        payment_attributes.processing_date,
        payment_attributes.reference,
        payment_attributes.scheme_payment_sub_type,
        payment_attributes.scheme_payment_type
    FROM payments INNER JOIN payment_attributes ON payment_attributes.payment_id = payments.id
"#;

//--------------------------------------     Queries       -----------------------------------------------------------

pub async fn payment_exists(id: &Uuid, conn: &mut SqliteConnection) -> Result<bool, PaymentApiError> {
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT 1 FROM payments WHERE id = $1").bind(id.to_string()).fetch_optional(conn).await?;
    Ok(row.is_some())
}

/// Fetches the full aggregate for a single payment.
pub async fn fetch_payment(id: &Uuid, conn: &mut SqliteConnection) -> Result<Option<Payment>, PaymentApiError> {
    let id = id.to_string();
    let query = format!("{SELECT_PAYMENTS} WHERE payments.id = $1");
    let row: Option<PaymentRow> = sqlx::query_as(&query).bind(&id).fetch_optional(&mut *conn).await?;
    let row = match row {
        Some(row) => row,
        None => {
            trace!("🗃️ Payment {id} not found");
            return Ok(None);
        },
    };
    let mut sub_records = SubRecords::fetch(Some(&id), conn).await?;
    sub_records.assemble(row).map(Some)
}

/// Fetches every payment aggregate, oldest first.
pub async fn fetch_all_payments(conn: &mut SqliteConnection) -> Result<Vec<Payment>, PaymentApiError> {
    let query = format!("{SELECT_PAYMENTS} ORDER BY payments.created_at, payments.rowid");
    let rows: Vec<PaymentRow> = sqlx::query_as(&query).fetch_all(&mut *conn).await?;
    trace!("🗃️ Fetched {} payment rows", rows.len());
    let mut sub_records = if rows.is_empty() { SubRecords::default() } else { SubRecords::fetch(None, conn).await? };
    rows.into_iter().map(|row| sub_records.assemble(row)).collect()
}

/// Inserts a new payment aggregate. This is not atomic. Embed the call in a transaction.
pub async fn insert_payment(payment: &Payment, conn: &mut SqliteConnection) -> Result<(), PaymentApiError> {
    let result = sqlx::query(
        r#"
            INSERT INTO payments (id, resource_type, version, organisation_id)
            VALUES ($1, $2, $3, $4);
        "#,
    )
    .bind(payment.id.to_string())
    .bind(&payment.resource_type)
    .bind(payment.version)
    .bind(payment.organisation_id.to_string())
    .execute(&mut *conn)
    .await;
    match result {
        Ok(_) => {},
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            return Err(PaymentApiError::PaymentAlreadyExists(payment.id));
        },
        Err(e) => return Err(e.into()),
    }
    insert_sub_records(payment, conn).await?;
    debug!("🗃️ {payment} inserted");
    Ok(())
}

/// Overwrites the parent row and replaces every sub-record. Returns `false` if the payment does not exist.
/// This is not atomic. Embed the call in a transaction.
pub async fn replace_payment(payment: &Payment, conn: &mut SqliteConnection) -> Result<bool, PaymentApiError> {
    let id = payment.id.to_string();
    let result = sqlx::query(
        r#"
            UPDATE payments SET resource_type = $1, version = $2, organisation_id = $3
            WHERE id = $4;
        "#,
    )
    .bind(&payment.resource_type)
    .bind(payment.version)
    .bind(payment.organisation_id.to_string())
    .bind(&id)
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() == 0 {
        return Ok(false);
    }
    delete_sub_records(&id, conn).await?;
    insert_sub_records(payment, conn).await?;
    debug!("🗃️ {payment} replaced");
    Ok(true)
}

/// Deletes a payment. Sub-records are removed by the `ON DELETE CASCADE` constraints.
pub async fn delete_payment(id: &Uuid, conn: &mut SqliteConnection) -> Result<bool, PaymentApiError> {
    let result = sqlx::query("DELETE FROM payments WHERE id = $1").bind(id.to_string()).execute(conn).await?;
    let deleted = result.rows_affected() > 0;
    if deleted {
        debug!("🗃️ Payment {id} deleted");
    }
    Ok(deleted)
}

async fn delete_sub_records(id: &str, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    for table in ["sender_charges", "charges_information", "fx", "sponsor_parties", "parties", "payment_attributes"] {
        sqlx::query(&format!("DELETE FROM {table} WHERE payment_id = $1")).bind(id).execute(&mut *conn).await?;
    }
    Ok(())
}

async fn insert_sub_records(payment: &Payment, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    let id = payment.id.to_string();
    let attrs = &payment.attributes;
    sqlx::query(
        r#"
            INSERT INTO payment_attributes (
                payment_id,
                amount,
                currency,
                end_to_end_reference,
                numeric_reference,
                scheme_payment_id,
                payment_purpose,
                payment_scheme,
                payment_type,
                processing_date,
                reference,
                scheme_payment_sub_type,
                scheme_payment_type
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13);
        "#,
    )
    .bind(&id)
    .bind(&attrs.amount)
    .bind(&attrs.currency)
    .bind(&attrs.end_to_end_reference)
    .bind(&attrs.numeric_reference)
    .bind(&attrs.payment_id)
    .bind(&attrs.payment_purpose)
    .bind(&attrs.payment_scheme)
    .bind(&attrs.payment_type)
    .bind(attrs.processing_date)
    .bind(&attrs.reference)
    .bind(&attrs.scheme_payment_sub_type)
    .bind(&attrs.scheme_payment_type)
    .execute(&mut *conn)
    .await?;

    let parties = [(PartyRole::Beneficiary, &attrs.beneficiary_party), (PartyRole::Debtor, &attrs.debtor_party)];
    for (role, party) in parties {
        let Some(party) = party else { continue };
        sqlx::query(
            r#"
                INSERT INTO parties (
                    payment_id,
                    role,
                    account_name,
                    account_number,
                    account_number_code,
                    account_type,
                    address,
                    bank_id,
                    bank_id_code,
                    name
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10);
            "#,
        )
        .bind(&id)
        .bind(role.as_str())
        .bind(&party.account_name)
        .bind(&party.account_number)
        .bind(&party.account_number_code)
        .bind(party.account_type)
        .bind(&party.address)
        .bind(&party.bank_id)
        .bind(&party.bank_id_code)
        .bind(&party.name)
        .execute(&mut *conn)
        .await?;
    }

    if let Some(sponsor) = &attrs.sponsor_party {
        sqlx::query(
            "INSERT INTO sponsor_parties (payment_id, account_number, bank_id, bank_id_code) VALUES ($1, $2, $3, $4)",
        )
        .bind(&id)
        .bind(&sponsor.account_number)
        .bind(&sponsor.bank_id)
        .bind(&sponsor.bank_id_code)
        .execute(&mut *conn)
        .await?;
    }

    if let Some(charges) = &attrs.charges_information {
        sqlx::query(
            r#"
                INSERT INTO charges_information (
                    payment_id,
                    bearer_code,
                    receiver_charges_amount,
                    receiver_charges_currency
                ) VALUES ($1, $2, $3, $4);
            "#,
        )
        .bind(&id)
        .bind(&charges.bearer_code)
        .bind(&charges.receiver_charges_amount)
        .bind(&charges.receiver_charges_currency)
        .execute(&mut *conn)
        .await?;
        if !charges.sender_charges.is_empty() {
            let mut builder =
                QueryBuilder::<Sqlite>::new("INSERT INTO sender_charges (payment_id, position, amount, currency) ");
            builder.push_values(charges.sender_charges.iter().enumerate(), |mut values, (position, charge)| {
                #[allow(clippy::cast_possible_wrap)]
                let position = position as i64;
                values
                    .push_bind(id.clone())
                    .push_bind(position)
                    .push_bind(charge.amount.clone())
                    .push_bind(charge.currency.clone());
            });
            builder.build().execute(&mut *conn).await?;
        }
    }

    if let Some(fx) = &attrs.fx {
        sqlx::query(
            r#"
                INSERT INTO fx (payment_id, contract_reference, exchange_rate, original_amount, original_currency)
                VALUES ($1, $2, $3, $4, $5);
            "#,
        )
        .bind(&id)
        .bind(&fx.contract_reference)
        .bind(&fx.exchange_rate)
        .bind(&fx.original_amount)
        .bind(&fx.original_currency)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}
