//! Order and order line item query functions.
//!
//! Only orders in status `completed` are visible to revenue reads.

use coursemart_types::order::{OrderLineItem, OrderStatus};
use rust_decimal::Decimal;
use rusqlite::Connection;

use crate::queries::users::parse_role;
use crate::{parse_decimal, DbError, Result};

/// Insert an order header.
pub fn insert_order(
    conn: &Connection,
    id: &str,
    user_id: &str,
    status: OrderStatus,
    total_price: Decimal,
    created_at: i64,
    completed_at: Option<i64>,
) -> Result<()> {
    ensure_non_negative("total_price", total_price)?;
    conn.execute(
        "INSERT INTO orders (id, user_id, status, total_price, created_at, completed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            id,
            user_id,
            status.as_str(),
            total_price.to_string(),
            created_at,
            completed_at,
        ],
    )?;
    Ok(())
}

/// Insert a purchased course into an order.
pub fn insert_item(conn: &Connection, order_id: &str, course_id: &str, price: Decimal) -> Result<()> {
    ensure_non_negative("price", price)?;
    conn.execute(
        "INSERT INTO order_items (order_id, course_id, price) VALUES (?1, ?2, ?3)",
        rusqlite::params![order_id, course_id, price.to_string()],
    )?;
    Ok(())
}

/// Move an order to `status`. `completed_at` is recorded when completing.
pub fn update_status(
    conn: &Connection,
    order_id: &str,
    status: OrderStatus,
    at: i64,
) -> Result<()> {
    let completed_at = (status == OrderStatus::Completed).then_some(at);
    let updated = conn.execute(
        "UPDATE orders SET status = ?1, completed_at = COALESCE(?2, completed_at) WHERE id = ?3",
        rusqlite::params![status.as_str(), completed_at, order_id],
    )?;
    if updated == 0 {
        return Err(DbError::NotFound(format!("order '{order_id}'")));
    }
    Ok(())
}

/// Filter for [`list_completed_line_items`]. Bounds are inclusive Unix seconds.
#[derive(Debug, Clone, Default)]
pub struct LineItemFilter<'a> {
    pub creator_id: Option<&'a str>,
    pub completed_from: Option<i64>,
    pub completed_to: Option<i64>,
}

/// List line items of completed orders, oldest first.
pub fn list_completed_line_items(
    conn: &Connection,
    filter: &LineItemFilter<'_>,
) -> Result<Vec<OrderLineItem>> {
    let mut stmt = conn.prepare(
        "SELECT oi.order_id, oi.course_id, o.user_id, oi.price, o.completed_at,
                c.creator_id, u.role
         FROM order_items oi
         JOIN orders o ON o.id = oi.order_id
         JOIN courses c ON c.id = oi.course_id
         JOIN users u ON u.id = c.creator_id
         WHERE o.status = 'completed'
           AND o.completed_at IS NOT NULL
           AND (?1 IS NULL OR c.creator_id = ?1)
           AND (?2 IS NULL OR o.completed_at >= ?2)
           AND (?3 IS NULL OR o.completed_at <= ?3)
         ORDER BY o.completed_at, oi.order_id, oi.course_id",
    )?;

    let raw = stmt
        .query_map(
            rusqlite::params![filter.creator_id, filter.completed_from, filter.completed_to],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, i64>(4)?,
                    row.get::<_, String>(5)?,
                    parse_role(row.get::<_, String>(6)?, 6)?,
                ))
            },
        )?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    raw.into_iter()
        .map(
            |(order_id, course_id, user_id, price, completed_at, creator_id, role)| {
                Ok(OrderLineItem {
                    order_id,
                    course_id,
                    user_id,
                    price: parse_decimal(&price)?,
                    completed_at,
                    creator_id,
                    creator_role: role.creator_role(),
                })
            },
        )
        .collect()
}

/// Every course sale from completed orders.
pub fn list_completed_sales(conn: &Connection) -> Result<Vec<SaleRow>> {
    let mut stmt = conn.prepare(
        "SELECT oi.order_id, oi.course_id, oi.price
         FROM order_items oi JOIN orders o ON o.id = oi.order_id
         WHERE o.status = 'completed'
         ORDER BY oi.course_id, oi.order_id",
    )?;

    let raw = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    raw.into_iter()
        .map(|(order_id, course_id, price)| {
            Ok(SaleRow {
                order_id,
                course_id,
                price: parse_decimal(&price)?,
            })
        })
        .collect()
}

/// `(user_id, total_price)` of every completed order.
pub fn list_completed_totals(conn: &Connection) -> Result<Vec<(String, Decimal)>> {
    let mut stmt = conn.prepare(
        "SELECT user_id, total_price FROM orders WHERE status = 'completed' ORDER BY user_id",
    )?;

    let raw = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    raw.into_iter()
        .map(|(user_id, total)| Ok((user_id, parse_decimal(&total)?)))
        .collect()
}

fn ensure_non_negative(field: &str, value: Decimal) -> Result<()> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(DbError::Constraint(format!("{field} must be >= 0, got {value}")));
    }
    Ok(())
}

/// One course sold in a completed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleRow {
    pub order_id: String,
    pub course_id: String,
    pub price: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::{catalog, users};
    use coursemart_types::order::{CreatorRole, UserRole};
    use rust_decimal_macros::dec;

    fn test_db() -> Connection {
        let conn = crate::open_memory().expect("open test db");
        users::insert(&conn, "i1", "Ivy", "ivy@example.com", None, UserRole::Instructor, 1)
            .expect("insert");
        users::insert(&conn, "s1", "Sam", "sam@example.com", None, UserRole::Staff, 1)
            .expect("insert");
        users::insert(&conn, "u1", "Ana", "ana@example.com", None, UserRole::Student, 1)
            .expect("insert");
        catalog::insert_course(&conn, "c1", "Rust", None, "i1", None, None, 1).expect("course");
        catalog::insert_course(&conn, "c2", "SQL", None, "s1", None, None, 1).expect("course");
        conn
    }

    fn completed(conn: &Connection, id: &str, at: i64, items: &[(&str, Decimal)]) {
        let total: Decimal = items.iter().map(|(_, p)| *p).sum();
        insert_order(conn, id, "u1", OrderStatus::Completed, total, at, Some(at)).expect("order");
        for (course, price) in items {
            insert_item(conn, id, course, *price).expect("item");
        }
    }

    #[test]
    fn test_only_completed_orders_visible() {
        let conn = test_db();
        completed(&conn, "o1", 1_000, &[("c1", dec!(300000))]);
        insert_order(&conn, "o2", "u1", OrderStatus::Pending, dec!(500000), 1_000, None)
            .expect("order");
        insert_item(&conn, "o2", "c2", dec!(500000)).expect("item");

        let items = list_completed_line_items(&conn, &LineItemFilter::default()).expect("list");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].price, dec!(300000));
        assert_eq!(items[0].creator_role, CreatorRole::IndependentInstructor);
        assert_eq!(items[0].user_id, "u1");
    }

    #[test]
    fn test_completing_order_makes_it_visible() {
        let conn = test_db();
        insert_order(&conn, "o1", "u1", OrderStatus::Pending, dec!(10), 1_000, None)
            .expect("order");
        insert_item(&conn, "o1", "c2", dec!(10)).expect("item");
        update_status(&conn, "o1", OrderStatus::Completed, 2_000).expect("complete");

        let items = list_completed_line_items(&conn, &LineItemFilter::default()).expect("list");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].completed_at, 2_000);
        assert_eq!(items[0].creator_role, CreatorRole::PlatformStaff);

        assert!(matches!(
            update_status(&conn, "missing", OrderStatus::Refunded, 3_000),
            Err(DbError::NotFound(_))
        ));
    }

    #[test]
    fn test_filters() {
        let conn = test_db();
        completed(&conn, "o1", 1_000, &[("c1", dec!(1))]);
        completed(&conn, "o2", 2_000, &[("c2", dec!(2))]);
        completed(&conn, "o3", 3_000, &[("c1", dec!(3))]);

        let by_creator = list_completed_line_items(
            &conn,
            &LineItemFilter {
                creator_id: Some("i1"),
                ..Default::default()
            },
        )
        .expect("list");
        assert_eq!(by_creator.len(), 2);

        let by_range = list_completed_line_items(
            &conn,
            &LineItemFilter {
                creator_id: None,
                completed_from: Some(2_000),
                completed_to: Some(3_000),
            },
        )
        .expect("list");
        let ids: Vec<_> = by_range.iter().map(|i| i.order_id.as_str()).collect();
        assert_eq!(ids, vec!["o2", "o3"]);
    }

    #[test]
    fn test_negative_price_rejected() {
        let conn = test_db();
        insert_order(&conn, "o1", "u1", OrderStatus::Pending, dec!(0), 1, None).expect("order");
        let result = insert_item(&conn, "o1", "c1", dec!(-5));
        assert!(matches!(result, Err(DbError::Constraint(_))));
    }

    #[test]
    fn test_sales_and_totals() {
        let conn = test_db();
        completed(&conn, "o1", 1_000, &[("c1", dec!(100)), ("c2", dec!(50.5))]);

        let sales = list_completed_sales(&conn).expect("sales");
        assert_eq!(sales.len(), 2);
        assert_eq!(sales[1].price, dec!(50.5));

        let totals = list_completed_totals(&conn).expect("totals");
        assert_eq!(totals, vec![("u1".to_string(), dec!(150.5))]);
    }
}
