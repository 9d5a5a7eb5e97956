//! Inputs owned by the order and catalog modules.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{CourseId, OrderId, ParseEnumError, UserId};

/// Role of the user who owns a course, as seen by revenue attribution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ts_rs::TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum CreatorRole {
    /// Course owned by platform staff; never split.
    PlatformStaff,
    /// Course owned by an independent instructor; split at the attribution percentage.
    IndependentInstructor,
}

/// Account role stored on a user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ts_rs::TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum UserRole {
    Student,
    Instructor,
    Staff,
    Admin,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Instructor => "instructor",
            Self::Staff => "staff",
            Self::Admin => "admin",
        }
    }

    /// Attribution class of courses created by a user with this role.
    ///
    /// Students cannot publish courses; if one ever appears as a creator the
    /// course is treated as platform-owned so it is never paid out.
    pub fn creator_role(self) -> CreatorRole {
        match self {
            Self::Instructor => CreatorRole::IndependentInstructor,
            Self::Staff | Self::Admin | Self::Student => CreatorRole::PlatformStaff,
        }
    }
}

impl FromStr for UserRole {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Self::Student),
            "instructor" => Ok(Self::Instructor),
            "staff" => Ok(Self::Staff),
            "admin" => Ok(Self::Admin),
            other => Err(ParseEnumError::new("user role", other)),
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of an order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            "refunded" => Ok(Self::Refunded),
            other => Err(ParseEnumError::new("order status", other)),
        }
    }
}

/// Lifecycle status of an enrollment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    Pending,
    Completed,
    Cancelled,
}

impl EnrollmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// One course purchased inside a completed order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItem {
    pub order_id: OrderId,
    pub course_id: CourseId,
    /// Buying user.
    pub user_id: UserId,
    /// Price paid for this course, `>= 0`.
    pub price: Decimal,
    /// Unix seconds at which the parent order completed.
    pub completed_at: i64,
    pub creator_id: UserId,
    pub creator_role: CreatorRole,
}
