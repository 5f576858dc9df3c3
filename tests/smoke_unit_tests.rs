//! Smoke Screen Unit tests for the CDT request core components
//!
//! These test are unit tests that span the codebase, testing behavior in
//! isolation from integration scenarios. These are intended as smoke-screen
//! and generally test the happy-path.
//!
#![allow(unused_imports)]

use neocdt::actor::{self, Actor, AuditStamp, Role};
use neocdt::error::{PermissionError, ValidationError};
use neocdt::interest::{self, InterestBasis};
use neocdt::request::{
    check_amount, CdtRequest, Product, RequestDraft, RequestStatus, TermMonths, TimeStamp,
    MAX_AMOUNT, MIN_AMOUNT,
};
use neocdt::utils::{format_cop, new_uuid_to_bech32};

// UTILS MODULE TESTS
#[cfg(test)]
mod utils_tests {
    use super::*;

    /// Test that new_uuid_to_bech32 generates valid bech32-encoded strings
    /// with the correct human-readable prefix
    #[test]
    fn generates_valid_bech32_with_hrp() {
        let result = new_uuid_to_bech32("cdt");
        assert!(result.is_ok());

        let encoded = result.unwrap();
        assert!(encoded.starts_with("cdt1"));
        assert!(encoded.len() > 10); // UUID should produce substantial output
    }

    /// Test that the function handles empty strings appropriately
    #[test]
    fn handles_empty_hrp() {
        // Empty string should fail
        let result = new_uuid_to_bech32("");
        assert!(result.is_err());
    }

    /// Test that multiple calls generate unique identifiers
    #[test]
    fn generates_unique_ids() {
        let id1 = new_uuid_to_bech32("cdt").unwrap();
        let id2 = new_uuid_to_bech32("cdt").unwrap();
        let id3 = new_uuid_to_bech32("cdt").unwrap();

        assert_ne!(id1, id2);
        assert_ne!(id2, id3);
        assert_ne!(id1, id3);
    }

    /// Test COP rendering with dot grouping and the dash default for
    /// records that never carried derived fields
    #[test]
    fn renders_cop_amounts() {
        assert_eq!(format_cop(Some(11_250_000)), "$ 11.250.000");
        assert_eq!(format_cop(None), "—");
    }
}

// TERM / RATE TABLE TESTS
#[cfg(test)]
mod term_tests {
    use super::*;

    /// Every term in the menu maps to exactly one rate
    #[test]
    fn rate_table_matches_product_sheet() {
        assert_eq!(TermMonths::M6.annual_rate_bps(), 1_100);
        assert_eq!(TermMonths::M12.annual_rate_bps(), 1_250);
        assert_eq!(TermMonths::M18.annual_rate_bps(), 1_280);
        assert_eq!(TermMonths::M24.annual_rate_bps(), 1_320);
    }

    #[test]
    fn from_months_accepts_only_the_menu() {
        assert_eq!(TermMonths::from_months(6).unwrap(), TermMonths::M6);
        assert_eq!(TermMonths::from_months(24).unwrap(), TermMonths::M24);

        let err = TermMonths::from_months(9).unwrap_err();
        assert_eq!(err, ValidationError::TermNotAllowed(9));
        assert_eq!(err.to_string(), "9 months is not an allowed term");
    }

    #[test]
    fn displays_in_months() {
        assert_eq!(TermMonths::M18.to_string(), "18 meses");
    }
}

// STATUS TESTS
#[cfg(test)]
mod status_tests {
    use super::*;

    /// Canonical names are the uppercase Spanish constants
    #[test]
    fn canonical_names() {
        assert_eq!(RequestStatus::Draft.as_str(), "BORRADOR");
        assert_eq!(RequestStatus::InValidation.as_str(), "EN_VALIDACION");
        assert_eq!(RequestStatus::Approved.as_str(), "APROBADA");
        assert_eq!(RequestStatus::Rejected.as_str(), "RECHAZADA");
        assert_eq!(RequestStatus::Cancelled.as_str(), "CANCELADA");
    }

    /// Both vocabularies normalize into the same enum
    #[test]
    fn legacy_vocabulary_is_accepted() {
        for (spelling, expected) in [
            ("Borrador", RequestStatus::Draft),
            ("En Validación", RequestStatus::InValidation),
            ("En Validacion", RequestStatus::InValidation),
            ("Aprobado", RequestStatus::Approved),
            ("Rechazado", RequestStatus::Rejected),
            ("Cancelado", RequestStatus::Cancelled),
        ] {
            assert_eq!(spelling.parse::<RequestStatus>().unwrap(), expected);
        }
    }

    #[test]
    fn unknown_spelling_names_itself_in_the_error() {
        let err = "Pendiente".parse::<RequestStatus>().unwrap_err();
        assert_eq!(err, ValidationError::UnknownStatus("Pendiente".to_string()));
        assert!(err.to_string().contains("Pendiente"));
    }

    #[test]
    fn lifecycle_gates() {
        assert!(RequestStatus::Draft.client_editable());
        assert!(RequestStatus::InValidation.client_editable());
        assert!(!RequestStatus::Approved.client_editable());

        assert!(RequestStatus::Draft.client_deletable());
        assert!(!RequestStatus::InValidation.client_deletable());

        assert!(!RequestStatus::Draft.is_terminal());
        assert!(!RequestStatus::InValidation.is_terminal());
        assert!(RequestStatus::Approved.is_terminal());
        assert!(RequestStatus::Rejected.is_terminal());
        assert!(RequestStatus::Cancelled.is_terminal());
    }
}

// INTEREST CALCULATOR TESTS
#[cfg(test)]
mod interest_tests {
    use super::*;

    /// The worked example from the product sheet: 10,000,000 COP, 12
    /// months at 12.5% simple proportional
    #[test]
    fn simple_proportional_round_trip() {
        let p = interest::project(10_000_000, 1_250, TermMonths::M12, InterestBasis::Simple);
        assert_eq!(p.estimated_interest, 1_250_000);
        assert_eq!(p.maturity_value, 11_250_000);
    }

    #[test]
    fn simple_partial_years() {
        // 1,000,000 * 0.11 * 6/12
        let p = interest::project(1_000_000, 1_100, TermMonths::M6, InterestBasis::Simple);
        assert_eq!(p.estimated_interest, 55_000);

        // 1,000,000 * 0.128 * 18/12
        let p = interest::project(1_000_000, 1_280, TermMonths::M18, InterestBasis::Simple);
        assert_eq!(p.estimated_interest, 192_000);
    }

    /// Over exactly one year the E.A. compounding collapses to the flat
    /// rate, so both variants agree
    #[test]
    fn bases_agree_on_a_full_year() {
        let simple = interest::project(10_000_000, 1_250, TermMonths::M12, InterestBasis::Simple);
        let compound = interest::project(
            10_000_000,
            1_250,
            TermMonths::M12,
            InterestBasis::CompoundEffective,
        );
        assert_eq!(simple, compound);
    }

    #[test]
    fn outputs_are_whole_pesos() {
        // an amount picked so the raw product is fractional
        let p = interest::project(333_333, 1_100, TermMonths::M6, InterestBasis::CompoundEffective);
        assert_eq!(p.maturity_value, 333_333 + p.estimated_interest);
    }
}

// DRAFT VALIDATION TESTS
#[cfg(test)]
mod validation_tests {
    use super::*;

    fn full_draft() -> RequestDraft {
        RequestDraft::new()
            .set_product(Product::Tradicional)
            .set_amount(10_000_000)
            .set_term(TermMonths::M12)
    }

    #[test]
    fn valid_draft_derives_the_rate() {
        let actor = Actor::client("u1", "Carolina");
        let valid = full_draft().validate(&actor).unwrap();

        assert_eq!(valid.amount, 10_000_000);
        assert_eq!(valid.term, TermMonths::M12);
        assert_eq!(valid.annual_rate_bps, 1_250);
    }

    /// Rules fire in order and stop at the first failure
    #[test]
    fn checks_short_circuit_in_order() {
        let anon = Actor::client("", "");
        // an otherwise empty draft still reports authentication first
        assert_eq!(
            RequestDraft::new().validate(&anon).unwrap_err(),
            ValidationError::NotAuthenticated
        );

        let actor = Actor::client("u1", "Carolina");
        assert_eq!(
            RequestDraft::new().validate(&actor).unwrap_err(),
            ValidationError::ProductRequired
        );

        // amount is checked before the missing term is noticed
        let no_term = RequestDraft::new()
            .set_product(Product::Tradicional)
            .set_amount(100);
        assert_eq!(
            no_term.validate(&actor).unwrap_err(),
            ValidationError::AmountOutOfRange
        );

        let no_term = RequestDraft::new()
            .set_product(Product::Tradicional)
            .set_amount(10_000_000);
        assert_eq!(
            no_term.validate(&actor).unwrap_err(),
            ValidationError::TermRequired
        );
    }

    #[test]
    fn boundary_amounts() {
        let actor = Actor::client("u1", "Carolina");

        for amount in [MIN_AMOUNT, MAX_AMOUNT] {
            assert!(full_draft().set_amount(amount).validate(&actor).is_ok());
        }
        for amount in [0, MIN_AMOUNT - 1, MAX_AMOUNT + 1] {
            assert_eq!(
                full_draft().set_amount(amount).validate(&actor).unwrap_err(),
                ValidationError::AmountOutOfRange
            );
        }
    }

    /// Admins skip the floor but keep the ceiling
    #[test]
    fn admin_amount_rule() {
        assert!(check_amount(100, Role::Admin).is_ok());
        assert!(check_amount(MIN_AMOUNT - 1, Role::Admin).is_ok());
        assert_eq!(
            check_amount(0, Role::Admin).unwrap_err(),
            ValidationError::AmountNotPositive
        );
        assert_eq!(
            check_amount(MAX_AMOUNT + 1, Role::Admin).unwrap_err(),
            ValidationError::AmountAboveCeiling
        );
    }
}

// AUTHORIZATION POLICY TESTS
#[cfg(test)]
mod policy_tests {
    use super::*;

    fn request_with(owner: &str, status: RequestStatus) -> CdtRequest {
        let now = TimeStamp::new();
        CdtRequest {
            id: "cdt1test".to_string(),
            owner_id: owner.to_string(),
            product: Product::Tradicional,
            amount: 1_000_000,
            term: TermMonths::M6,
            annual_rate_bps: 1_100,
            status,
            estimated_interest: None,
            maturity_value: None,
            created_at: now.clone(),
            updated_at: now,
            audit: None,
        }
    }

    #[test]
    fn owner_edits_only_while_editable() {
        let owner = Actor::client("u1", "Carolina");

        assert!(actor::authorize_edit(&owner, &request_with("u1", RequestStatus::Draft)).is_ok());
        assert!(
            actor::authorize_edit(&owner, &request_with("u1", RequestStatus::InValidation))
                .is_ok()
        );
        assert_eq!(
            actor::authorize_edit(&owner, &request_with("u1", RequestStatus::Rejected))
                .unwrap_err(),
            PermissionError::EditLocked(RequestStatus::Rejected)
        );
    }

    #[test]
    fn admin_bypasses_every_gate() {
        let admin = Actor::admin("a1", "Mesa de Control");
        for status in RequestStatus::ALL {
            assert!(actor::authorize_edit(&admin, &request_with("u1", status)).is_ok());
            assert!(actor::authorize_delete(&admin, &request_with("u1", status)).is_ok());
        }
    }

    #[test]
    fn ownership_is_checked_before_status() {
        let stranger = Actor::client("u2", "Mallory");
        assert_eq!(
            actor::authorize_edit(&stranger, &request_with("u1", RequestStatus::Draft))
                .unwrap_err(),
            PermissionError::NotOwner
        );
    }

    #[test]
    fn audit_stamp_only_for_admins() {
        let owner = Actor::client("u1", "Carolina");
        let admin = Actor::admin("a1", "Mesa de Control");

        assert!(AuditStamp::of(&owner).is_none());
        let stamp = AuditStamp::of(&admin).unwrap();
        assert_eq!(stamp.admin_id, "a1");
        assert_eq!(stamp.admin_name, "Mesa de Control");
    }
}

// DOCUMENT ENCODING TESTS
#[cfg(test)]
mod encoding_tests {
    use super::*;

    /// A full request document survives the wire codec
    #[test]
    fn request_cbor_roundtrip() {
        let now = TimeStamp::new();
        let original = CdtRequest {
            id: "cdt1example".to_string(),
            owner_id: "u1".to_string(),
            product: Product::Tradicional,
            amount: 10_000_000,
            term: TermMonths::M12,
            annual_rate_bps: 1_250,
            status: RequestStatus::InValidation,
            estimated_interest: Some(1_250_000),
            maturity_value: Some(11_250_000),
            created_at: now.clone(),
            updated_at: now,
            audit: Some(AuditStamp {
                admin_id: "a1".to_string(),
                admin_name: "Mesa de Control".to_string(),
            }),
        };

        let encoded = minicbor::to_vec(&original).unwrap();
        let decoded: CdtRequest = minicbor::decode(&encoded).unwrap();

        assert_eq!(original, decoded);
    }
}
