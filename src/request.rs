//! Core CDT request document, terms, statuses and draft validation
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};

use crate::actor::{Actor, AuditStamp, Role};
use crate::error::ValidationError;
use crate::interest::{self, InterestBasis};

/// Client-created requests must keep the amount inside this range. Admin
/// edits bypass the floor but still honor the ceiling.
pub const MIN_AMOUNT: u64 = 250_000;
pub const MAX_AMOUNT: u64 = 500_000_000;

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Product {
    #[n(0)]
    Tradicional,
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Product::Tradicional => write!(f, "CDT Tradicional"),
        }
    }
}

/// The fixed menu of terms a deposit can be opened for. Each term maps to
/// exactly one effective annual rate, assigned when the term is chosen and
/// only re-derived when the term changes.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermMonths {
    #[n(0)]
    M6,
    #[n(1)]
    M12,
    #[n(2)]
    M18,
    #[n(3)]
    M24,
}

impl TermMonths {
    pub const ALL: [TermMonths; 4] = [
        TermMonths::M6,
        TermMonths::M12,
        TermMonths::M18,
        TermMonths::M24,
    ];

    pub fn from_months(months: u32) -> Result<Self, ValidationError> {
        match months {
            6 => Ok(TermMonths::M6),
            12 => Ok(TermMonths::M12),
            18 => Ok(TermMonths::M18),
            24 => Ok(TermMonths::M24),
            other => Err(ValidationError::TermNotAllowed(other)),
        }
    }

    pub fn months(self) -> u32 {
        match self {
            TermMonths::M6 => 6,
            TermMonths::M12 => 12,
            TermMonths::M18 => 18,
            TermMonths::M24 => 24,
        }
    }

    /// Effective annual rate for this term, in basis points.
    pub fn annual_rate_bps(self) -> u32 {
        match self {
            TermMonths::M6 => 1_100,
            TermMonths::M12 => 1_250,
            TermMonths::M18 => 1_280,
            TermMonths::M24 => 1_320,
        }
    }
}

impl fmt::Display for TermMonths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} meses", self.months())
    }
}

/// Lifecycle state of a request. Canonical wire names are the uppercase
/// Spanish constants; parsing also accepts the legacy free-text spellings
/// that older records carry.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    #[n(0)]
    Draft,
    #[n(1)]
    InValidation,
    #[n(2)]
    Approved,
    #[n(3)]
    Rejected,
    #[n(4)]
    Cancelled,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 5] = [
        RequestStatus::Draft,
        RequestStatus::InValidation,
        RequestStatus::Approved,
        RequestStatus::Rejected,
        RequestStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Draft => "BORRADOR",
            RequestStatus::InValidation => "EN_VALIDACION",
            RequestStatus::Approved => "APROBADA",
            RequestStatus::Rejected => "RECHAZADA",
            RequestStatus::Cancelled => "CANCELADA",
        }
    }

    /// Terminal states block further edits in the client flow.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RequestStatus::Approved | RequestStatus::Rejected | RequestStatus::Cancelled
        )
    }

    pub fn client_editable(self) -> bool {
        matches!(self, RequestStatus::Draft | RequestStatus::InValidation)
    }

    pub fn client_deletable(self) -> bool {
        matches!(self, RequestStatus::Draft)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "BORRADOR" | "Borrador" => Ok(RequestStatus::Draft),
            "EN_VALIDACION" | "En Validación" | "En Validacion" => Ok(RequestStatus::InValidation),
            "APROBADA" | "Aprobada" | "Aprobado" => Ok(RequestStatus::Approved),
            "RECHAZADA" | "Rechazada" | "Rechazado" => Ok(RequestStatus::Rejected),
            "CANCELADA" | "Cancelada" | "Cancelado" => Ok(RequestStatus::Cancelled),
            other => Err(ValidationError::UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeStamp<T: TimeZone>(DateTime<T>);

impl TimeStamp<Utc> {
    pub fn new() -> Self {
        Self(Utc::now())
    }
    pub fn new_with(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Self {
        Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
            .unwrap()
            .into()
    }
    pub fn to_datetime_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

impl<T: TimeZone> From<DateTime<T>> for TimeStamp<T> {
    fn from(value: DateTime<T>) -> Self {
        TimeStamp(value)
    }
}

impl<T: TimeZone + PartialEq> PartialOrd for TimeStamp<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.0.cmp(&other.0))
    }
}

impl<T: TimeZone + Eq> Ord for TimeStamp<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl<C> minicbor::Encode<C> for TimeStamp<Utc> {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        if let Some(nsec) = self.0.timestamp_nanos_opt() {
            return e.i64(nsec)?.ok();
        }

        Err(minicbor::encode::Error::message(
            "failed to encode timestamp. timestamp_nanos_opt returned None",
        ))
    }
}

impl<'b, C> minicbor::Decode<'b, C> for TimeStamp<Utc> {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        let nsecs = d.i64()?;

        Ok(TimeStamp(DateTime::from_timestamp_nanos(nsecs)))
    }
}

/// A stored term deposit request. Key in the store is
/// `{owner_id}/{id}`, so the id alone never addresses a document.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct CdtRequest {
    #[n(0)]
    pub id: String,
    #[n(1)]
    pub owner_id: String,
    #[n(2)]
    pub product: Product,
    #[n(3)]
    pub amount: u64, // whole COP
    #[n(4)]
    pub term: TermMonths,
    #[n(5)]
    pub annual_rate_bps: u32,
    #[n(6)]
    pub status: RequestStatus,
    // Derived fields. Optional because records written before the
    // projection existed never carried them.
    #[n(7)]
    pub estimated_interest: Option<u64>,
    #[n(8)]
    pub maturity_value: Option<u64>,
    #[n(9)]
    pub created_at: TimeStamp<Utc>,
    #[n(10)]
    pub updated_at: TimeStamp<Utc>,
    #[n(11)]
    pub audit: Option<AuditStamp>,
}

impl CdtRequest {
    /// Recompute the derived fields from the current amount, term and
    /// rate. Called whenever any of the three changes so the stored
    /// projection never drifts.
    pub fn reproject(&mut self, basis: InterestBasis) {
        let p = interest::project(self.amount, self.annual_rate_bps, self.term, basis);
        self.estimated_interest = Some(p.estimated_interest);
        self.maturity_value = Some(p.maturity_value);
    }
}

/// Fields a create submission carries before validation. Mirrors the
/// request form: the rate is never entered directly, it follows the term.
#[derive(Debug, Default, Clone)]
pub struct RequestDraft {
    product: Option<Product>,
    amount: u64,
    term: Option<TermMonths>,
}

/// The outcome of a successful validation, with the rate derived from
/// the chosen term.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedDraft {
    pub product: Product,
    pub amount: u64,
    pub term: TermMonths,
    pub annual_rate_bps: u32,
}

impl RequestDraft {
    /// Construct a new draft, this becomes the basis for a submission
    pub fn new() -> Self {
        Self::default()
    }
    pub fn set_product(mut self, product: Product) -> Self {
        self.product = Some(product);
        self
    }
    pub fn set_amount(mut self, amount: u64) -> Self {
        self.amount = amount;
        self
    }
    pub fn set_term(mut self, term: TermMonths) -> Self {
        self.term = Some(term);
        self
    }

    /// Run the creation rules in order, stopping at the first failure:
    /// authenticated actor, product chosen, amount in range, term chosen.
    /// Pure, no store access.
    pub fn validate(&self, actor: &Actor) -> Result<ValidatedDraft, ValidationError> {
        if actor.uid.is_empty() {
            return Err(ValidationError::NotAuthenticated);
        }
        let product = self.product.ok_or(ValidationError::ProductRequired)?;
        check_amount(self.amount, Role::Client)?;
        let term = self.term.ok_or(ValidationError::TermRequired)?;

        Ok(ValidatedDraft {
            product,
            amount: self.amount,
            term,
            annual_rate_bps: term.annual_rate_bps(),
        })
    }
}

/// Amount rule shared by create and update. Clients are held to the full
/// range; admins skip the floor but keep the ceiling.
pub fn check_amount(amount: u64, role: Role) -> Result<(), ValidationError> {
    match role {
        Role::Client => {
            if amount < MIN_AMOUNT || amount > MAX_AMOUNT {
                return Err(ValidationError::AmountOutOfRange);
            }
        }
        Role::Admin => {
            if amount == 0 {
                return Err(ValidationError::AmountNotPositive);
            }
            if amount > MAX_AMOUNT {
                return Err(ValidationError::AmountAboveCeiling);
            }
        }
    }
    Ok(())
}
