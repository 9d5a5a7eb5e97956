//! Integration test: revenue reports over a live store.
//!
//! Exercises the complete report lifecycle:
//! 1. Seed users, courses and orders through `coursemart_db::queries`
//! 2. Build platform and instructor reports through `coursemart_revenue`
//! 3. Verify the platform/creator split for staff and instructor courses
//! 4. Change the attribution percentage between reports
//! 5. Verify ISO week bucketing across year boundaries
//! 6. Verify order status transitions and inclusive date ranges
//!
//! The store is shared behind a `tokio::sync::Mutex`, as in the daemon.

use std::sync::Arc;

use chrono::NaiveDate;
use coursemart_db::queries::{catalog, orders, settings, users};
use coursemart_revenue::attribution::{self, INSTRUCTOR_PERCENTAGE_KEY};
use coursemart_revenue::report::{build_report, ReportRequest};
use coursemart_revenue::RevenueError;
use coursemart_types::order::{OrderStatus, UserRole};
use coursemart_types::report::ReportMode;
use rusqlite::Connection;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::Mutex;

/// 2024-01-10 00:00:00 UTC.
const JAN_10_2024: i64 = 1_704_844_800;
const HOUR: i64 = 3_600;
const DAY: i64 = 86_400;

fn noon(y: i32, m: u32, d: u32) -> i64 {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(12, 0, 0))
        .expect("valid date")
        .and_utc()
        .timestamp()
}

/// Helper: an instructor, a staff member, three students and two courses.
fn setup_catalog(conn: &Connection) {
    users::insert(conn, "inst", "Ines Ortega", "ines@example.com", None, UserRole::Instructor, 1)
        .expect("instructor");
    users::insert(conn, "staff", "Sam Staff", "sam@example.com", None, UserRole::Staff, 1)
        .expect("staff");
    for s in ["s1", "s2", "s3"] {
        users::insert(conn, s, s, &format!("{s}@example.com"), None, UserRole::Student, 1)
            .expect("student");
    }
    catalog::insert_category(conn, "dev", "Development").expect("category");
    catalog::insert_course(conn, "rust-101", "Rust 101", None, "inst", Some("dev"), Some(4.7), 1)
        .expect("instructor course");
    catalog::insert_course(conn, "onboard", "Onboarding", None, "staff", None, None, 1)
        .expect("staff course");
}

/// Helper: record a completed single-item order.
fn complete_sale(conn: &Connection, order: &str, buyer: &str, course: &str, price: Decimal, at: i64) {
    orders::insert_order(conn, order, buyer, OrderStatus::Completed, price, at, Some(at))
        .expect("order");
    orders::insert_item(conn, order, course, price).expect("item");
}

fn shared_store() -> Arc<Mutex<Connection>> {
    let conn = coursemart_db::open_memory().expect("open DB");
    setup_catalog(&conn);
    Arc::new(Mutex::new(conn))
}

fn monthly() -> ReportRequest {
    ReportRequest {
        granularity: Some("month".to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn platform_and_instructor_reports_for_mixed_month() {
    let db = shared_store();
    {
        let conn = db.lock().await;
        complete_sale(&conn, "o1", "s1", "rust-101", dec!(300000), JAN_10_2024);
        complete_sale(&conn, "o2", "s2", "onboard", dec!(500000), JAN_10_2024 + HOUR);
    }

    // =========================================================
    // Platform view: staff revenue kept whole, instructor revenue split 30/70
    // =========================================================
    let mut conn = db.lock().await;
    let platform = build_report(&mut conn, &monthly()).expect("platform report");
    assert_eq!(platform.mode, ReportMode::Platform);
    assert_eq!(platform.gross_revenue, dec!(800000));
    assert_eq!(platform.platform_share, dec!(590000));
    assert_eq!(platform.creator_share, dec!(210000));
    assert_eq!(platform.total_revenue, dec!(590000));
    assert_eq!(platform.details.len(), 1);
    assert_eq!(platform.details[0].period, "2024-01");
    assert_eq!(platform.details[0].order_count, 2);
    assert_eq!(platform.total_students, 2);
    assert_eq!(platform.average_revenue_per_course, dec!(295000));

    // =========================================================
    // Instructor view: only the instructor's own course
    // =========================================================
    let request = ReportRequest {
        creator_id: Some("inst".to_string()),
        ..monthly()
    };
    let instructor = build_report(&mut conn, &request).expect("instructor report");
    assert_eq!(instructor.mode, ReportMode::Instructor);
    assert_eq!(instructor.gross_revenue, dec!(300000));
    assert_eq!(instructor.creator_share, dec!(210000));
    assert_eq!(instructor.platform_share, dec!(90000));
    assert_eq!(instructor.total_revenue, dec!(210000));
    assert_eq!(instructor.total_courses, 1);
}

#[tokio::test]
async fn percentage_change_applies_to_later_reports_only() {
    let db = shared_store();
    {
        let conn = db.lock().await;
        complete_sale(&conn, "o1", "s1", "rust-101", dec!(300000), JAN_10_2024);
    }

    let before = {
        let mut conn = db.lock().await;
        build_report(&mut conn, &monthly()).expect("report")
    };

    // An administrator edits the percentage from another task.
    let admin = Arc::clone(&db);
    tokio::spawn(async move {
        let conn = admin.lock().await;
        let value = attribution::parse_percentage("80").expect("valid percentage");
        attribution::store_percentage(&conn, value).expect("store");
    })
    .await
    .expect("admin task");

    let after = {
        let mut conn = db.lock().await;
        build_report(&mut conn, &monthly()).expect("report")
    };

    assert_eq!(before.instructor_percentage, dec!(70));
    assert_eq!(before.creator_share, dec!(210000));
    assert_eq!(before.platform_share, dec!(90000));
    assert_eq!(after.instructor_percentage, dec!(80));
    assert_eq!(after.creator_share, dec!(240000));
    assert_eq!(after.platform_share, dec!(60000));
}

#[tokio::test]
async fn hand_edited_percentage_is_clamped() {
    let db = shared_store();
    let mut conn = db.lock().await;
    complete_sale(&conn, "o1", "s1", "rust-101", dec!(1000), JAN_10_2024);

    settings::set(&conn, INSTRUCTOR_PERCENTAGE_KEY, "140").expect("hand edit");
    let report = build_report(&mut conn, &monthly()).expect("report");
    assert_eq!(report.instructor_percentage, dec!(100));
    assert_eq!(report.creator_share, dec!(1000));
    assert_eq!(report.platform_share, Decimal::ZERO);

    settings::set(&conn, INSTRUCTOR_PERCENTAGE_KEY, "lots").expect("hand edit");
    let report = build_report(&mut conn, &monthly()).expect("report");
    assert_eq!(report.instructor_percentage, dec!(70));
}

#[tokio::test]
async fn iso_week_buckets_cross_year_boundaries() {
    let db = shared_store();
    let mut conn = db.lock().await;
    complete_sale(&conn, "o1", "s1", "rust-101", dec!(100), noon(2024, 12, 31));
    complete_sale(&conn, "o2", "s2", "rust-101", dec!(200), noon(2024, 1, 1));
    complete_sale(&conn, "o3", "s3", "rust-101", dec!(300), noon(2021, 1, 1));

    let request = ReportRequest {
        granularity: Some("week".to_string()),
        ..Default::default()
    };
    let report = build_report(&mut conn, &request).expect("report");
    let periods: Vec<_> = report.details.iter().map(|d| d.period.as_str()).collect();
    assert_eq!(periods, vec!["2020-53", "2024-01", "2025-01"]);

    let last = &report.details[2];
    assert_eq!(last.year, Some(2025));
    assert_eq!(last.week, Some(1));
    assert_eq!(last.start_date, NaiveDate::from_ymd_opt(2024, 12, 30).expect("date"));
    assert_eq!(last.end_date, NaiveDate::from_ymd_opt(2025, 1, 5).expect("date"));

    let first_of_2024 = &report.details[1];
    assert_eq!(first_of_2024.start_date, NaiveDate::from_ymd_opt(2024, 1, 1).expect("date"));

    let week_53 = &report.details[0];
    assert_eq!(week_53.year, Some(2020));
    assert_eq!(week_53.start_date, NaiveDate::from_ymd_opt(2020, 12, 28).expect("date"));

    // 200 -> 100
    assert_eq!(report.growth_rate_percent, dec!(-50.0));
}

#[tokio::test]
async fn only_completed_orders_count() {
    let db = shared_store();
    let mut conn = db.lock().await;

    orders::insert_order(&conn, "o1", "s1", OrderStatus::Pending, dec!(500), JAN_10_2024, None)
        .expect("order");
    orders::insert_item(&conn, "o1", "rust-101", dec!(500)).expect("item");

    let report = build_report(&mut conn, &monthly()).expect("report");
    assert!(report.details.is_empty(), "pending orders are invisible");

    orders::update_status(&conn, "o1", OrderStatus::Completed, JAN_10_2024 + DAY).expect("complete");
    let report = build_report(&mut conn, &monthly()).expect("report");
    assert_eq!(report.gross_revenue, dec!(500));
    assert_eq!(report.total_orders, 1);

    orders::update_status(&conn, "o1", OrderStatus::Refunded, JAN_10_2024 + 2 * DAY).expect("refund");
    let report = build_report(&mut conn, &monthly()).expect("report");
    assert_eq!(report.gross_revenue, Decimal::ZERO);
}

#[tokio::test]
async fn multi_course_order_counts_once() {
    let db = shared_store();
    let mut conn = db.lock().await;
    orders::insert_order(
        &conn,
        "o1",
        "s1",
        OrderStatus::Completed,
        dec!(750),
        JAN_10_2024,
        Some(JAN_10_2024),
    )
    .expect("order");
    orders::insert_item(&conn, "o1", "rust-101", dec!(250)).expect("item");
    orders::insert_item(&conn, "o1", "onboard", dec!(500)).expect("item");

    let report = build_report(&mut conn, &monthly()).expect("report");
    assert_eq!(report.total_orders, 1);
    assert_eq!(report.details[0].order_count, 1);
    assert_eq!(report.total_courses, 2);
    assert_eq!(report.total_students, 1);
    // 500 staff + round(250 * 30%) = 575; round(250 * 70%) = 175
    assert_eq!(report.platform_share, dec!(575));
    assert_eq!(report.creator_share, dec!(175));
}

#[tokio::test]
async fn date_range_end_is_inclusive() {
    let db = shared_store();
    let mut conn = db.lock().await;
    let jan_31_last_second = noon(2024, 1, 31) + 12 * HOUR - 1;
    complete_sale(&conn, "o1", "s1", "rust-101", dec!(100), jan_31_last_second);
    complete_sale(&conn, "o2", "s2", "rust-101", dec!(900), jan_31_last_second + 1);

    let request = ReportRequest {
        granularity: Some("day".to_string()),
        start_date: Some("2024-01-01".to_string()),
        end_date: Some("2024-01-31".to_string()),
        ..Default::default()
    };
    let report = build_report(&mut conn, &request).expect("report");
    assert_eq!(report.gross_revenue, dec!(100));
    assert_eq!(report.details.len(), 1);
    assert_eq!(report.details[0].period, "2024-01-31");
    assert_eq!(report.details[0].day, Some(31));
    assert_eq!(report.start_date, NaiveDate::from_ymd_opt(2024, 1, 1));
}

#[tokio::test]
async fn empty_store_yields_zero_report() {
    let db = shared_store();
    let mut conn = db.lock().await;
    for granularity in ["day", "week", "month", "year"] {
        let request = ReportRequest {
            granularity: Some(granularity.to_string()),
            ..Default::default()
        };
        let report = build_report(&mut conn, &request).expect("report");
        assert_eq!(report.granularity, granularity);
        assert!(report.details.is_empty());
        assert_eq!(report.total_revenue, Decimal::ZERO);
        assert_eq!(report.growth_rate_percent, Decimal::ZERO);
        assert_eq!(report.average_revenue_per_course, Decimal::ZERO);
    }
}

#[tokio::test]
async fn repeated_reports_are_identical() {
    let db = shared_store();
    let mut conn = db.lock().await;
    for (i, day) in [3_i64, 9, 17, 40, 41, 75].into_iter().enumerate() {
        let course = if i % 2 == 0 { "rust-101" } else { "onboard" };
        complete_sale(
            &conn,
            &format!("o{i}"),
            "s1",
            course,
            Decimal::from(1000 + i as i64 * 333),
            JAN_10_2024 + day * DAY,
        );
    }

    for granularity in ["day", "week", "month", "year"] {
        let request = ReportRequest {
            granularity: Some(granularity.to_string()),
            ..Default::default()
        };
        let first = build_report(&mut conn, &request).expect("first");
        let second = build_report(&mut conn, &request).expect("second");
        assert_eq!(first, second, "{granularity}");

        let json_first = serde_json::to_string(&first).expect("serialize");
        let json_second = serde_json::to_string(&second).expect("serialize");
        assert_eq!(json_first, json_second);
    }
}

#[tokio::test]
async fn invalid_requests_fail_without_side_effects() {
    let db = shared_store();
    let mut conn = db.lock().await;

    let request = ReportRequest {
        granularity: Some("fortnight".to_string()),
        ..Default::default()
    };
    let err = build_report(&mut conn, &request).expect_err("invalid granularity");
    assert!(matches!(err, RevenueError::InvalidGranularity(_)));
    assert!(!err.is_retryable());

    let request = ReportRequest {
        start_date: Some("2024-05-01".to_string()),
        end_date: Some("2024-04-01".to_string()),
        ..monthly()
    };
    assert!(matches!(
        build_report(&mut conn, &request),
        Err(RevenueError::InvalidDateRange { .. })
    ));

    // The connection is still usable and outside any transaction.
    assert!(conn.is_autocommit());
    assert!(build_report(&mut conn, &monthly()).is_ok());
}
