use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use fleetdesk_operations::{LineItem, Quote, QuoteStatus, SlaCountdown, SlaStatus, latest_version};
use proptest::prelude::*;

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, hour, minute, 0).unwrap()
}

#[test]
fn sla_moves_from_on_track_to_at_risk_to_breached() {
    let sla = SlaCountdown::new(at(8, 0), TimeDelta::hours(4)).unwrap();
    assert_eq!(sla.deadline(), at(12, 0));

    assert_eq!(sla.status(at(9, 0)), SlaStatus::OnTrack { remaining: TimeDelta::hours(3) });
    assert_eq!(sla.status(at(11, 0)), SlaStatus::AtRisk { remaining: TimeDelta::hours(1) });
    assert_eq!(sla.status(at(12, 0)), SlaStatus::Breached { overdue: TimeDelta::zero() });
    assert_eq!(sla.status(at(12, 12)), SlaStatus::Breached { overdue: TimeDelta::minutes(12) });
}

#[test]
fn at_risk_boundary_is_inclusive() {
    let sla = SlaCountdown::new(at(8, 0), TimeDelta::hours(4)).unwrap();
    assert_eq!(sla.status(at(10, 59)).label(), "on-track");
    assert_eq!(sla.status(at(11, 0)).label(), "at-risk");
}

#[test]
fn remaining_saturates_and_formats() {
    let sla = SlaCountdown::new(at(8, 0), TimeDelta::days(2)).unwrap();
    assert_eq!(sla.format_remaining(at(9, 55)), "1d 22h 05m");

    let short = SlaCountdown::new(at(8, 0), TimeDelta::hours(3)).unwrap();
    assert_eq!(short.format_remaining(at(8, 55)), "02h 05m");
    assert_eq!(short.format_remaining(at(10, 55)), "05m");
    assert_eq!(short.format_remaining(at(11, 12)), "overdue 12m");
    assert_eq!(short.remaining(at(11, 12)), TimeDelta::zero());
}

fn quote(id: &str, status: QuoteStatus) -> Quote {
    Quote {
        id: id.to_owned(),
        number: "Q-2026-0042".to_owned(),
        version: 1,
        parent_id: None,
        customer: "Initech".to_owned(),
        vehicle_class: "Compact SUV".to_owned(),
        line_items: vec![
            LineItem { description: "Weekly rate".into(), quantity: 2, unit_price_cents: 45_000 },
            LineItem { description: "Insurance".into(), quantity: 14, unit_price_cents: 1_250 },
        ],
        status,
        created_at: at(8, 0),
    }
}

#[test]
fn versions_chain_back_to_the_root() {
    let v1 = quote("q1", QuoteStatus::Sent);
    let v2 = v1.new_version("q2", at(9, 0)).unwrap();
    let v3 = v2.new_version("q3", at(10, 0)).unwrap();

    assert_eq!((v2.version, v3.version), (2, 3));
    assert_eq!(v2.parent_id.as_deref(), Some("q1"));
    assert_eq!(v3.parent_id.as_deref(), Some("q1"));
    assert_eq!(v3.number, v1.number);
    assert_eq!(v3.status, QuoteStatus::Draft);
    assert_eq!(v3.created_at, at(10, 0));
    assert_eq!(v3.line_items, v1.line_items);

    let all = [v1, v3.clone(), v2];
    assert_eq!(latest_version(&all, "Q-2026-0042"), Some(&v3));
    assert_eq!(latest_version(&all, "Q-0000"), None);
}

#[test]
fn cancelled_quotes_are_not_versioned() {
    let err = quote("q1", QuoteStatus::Cancelled).new_version("q2", at(9, 0)).unwrap_err();
    assert_eq!(err.kind(), "NotVersionable");
}

#[test]
fn quote_total_sums_lines() {
    assert_eq!(quote("q1", QuoteStatus::Draft).total().unwrap(), 107_500);
}

#[test]
fn quote_round_trips_through_json_in_camel_case() {
    let original = quote("q1", QuoteStatus::Accepted);
    let json = serde_json::to_value(&original).unwrap();
    assert_eq!(json["vehicleClass"], "Compact SUV");
    assert_eq!(json["lineItems"][0]["unitPriceCents"], 45_000);
    assert_eq!(serde_json::from_value::<Quote>(json).unwrap(), original);
}

proptest! {
    #[test]
    fn remaining_never_exceeds_sla(sla_minutes in 1_i64..100_000, elapsed in 0_i64..200_000) {
        let opened = at(0, 0);
        let sla = SlaCountdown::new(opened, TimeDelta::minutes(sla_minutes)).unwrap();
        let now = opened + TimeDelta::minutes(elapsed);

        let remaining = sla.remaining(now);
        prop_assert!(remaining >= TimeDelta::zero());
        prop_assert!(remaining <= TimeDelta::minutes((sla_minutes - elapsed).max(0)));
        prop_assert_eq!(sla.status(now).is_breached(), elapsed >= sla_minutes);
    }
}
