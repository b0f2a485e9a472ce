use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(UserRole {
    Admin => "admin",
    Staff => "staff",
    Patient => "patient",
});

str_enum!(Sex {
    Male => "male",
    Female => "female",
});

str_enum!(VisitStatus {
    Completed => "completed",
    Pending => "pending",
    Rejected => "rejected",
});

str_enum!(AppointmentStatus {
    Approved => "approved",
    Completed => "completed",
    Cancelled => "cancelled",
});

str_enum!(PaymentMethod {
    Cash => "cash",
    Maya => "maya",
    Hmo => "hmo",
});

str_enum!(PaymentStatus {
    Paid => "paid",
    Unpaid => "unpaid",
});

str_enum!(PeriodType {
    Month => "month",
    Promo => "promo",
});

str_enum!(GoalStatus {
    Active => "active",
    Done => "done",
    Missed => "missed",
});

str_enum!(GoalMetric {
    TotalVisits => "total_visits",
    Revenue => "revenue",
    AppointmentCompletionRate => "appointment_completion_rate",
    ServiceAvailment => "service_availment",
    PackagePromoAvailment => "package_promo_availment",
});

impl AppointmentStatus {
    /// The appointment status a visit outcome implies.
    pub fn from_visit(status: VisitStatus) -> Self {
        match status {
            VisitStatus::Completed => Self::Completed,
            VisitStatus::Pending => Self::Approved,
            VisitStatus::Rejected => Self::Cancelled,
        }
    }
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] = [Self::Cash, Self::Maya, Self::Hmo];
}
