//! Roles and the static role to approval type mapping

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// One of the four roles allowed to decide approvals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManagerRole {
    InventoryManager,
    LogisticsManager,
    SustainabilityManager,
    FinanceManager,
}

/// Category of an approval, fixed by the role that handles it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalType {
    SpoilageAction,
    RouteOptimization,
    CarbonVerification,
    CostApproval,
}

/// Role to approval type table, one entry per manager role.
pub const ROLE_APPROVAL_TYPES: [(ManagerRole, ApprovalType); 4] = [
    (ManagerRole::InventoryManager, ApprovalType::SpoilageAction),
    (ManagerRole::LogisticsManager, ApprovalType::RouteOptimization),
    (
        ManagerRole::SustainabilityManager,
        ApprovalType::CarbonVerification,
    ),
    (ManagerRole::FinanceManager, ApprovalType::CostApproval),
];

impl ManagerRole {
    pub const ALL: [ManagerRole; 4] = [
        ManagerRole::InventoryManager,
        ManagerRole::LogisticsManager,
        ManagerRole::SustainabilityManager,
        ManagerRole::FinanceManager,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            ManagerRole::InventoryManager => "inventory_manager",
            ManagerRole::LogisticsManager => "logistics_manager",
            ManagerRole::SustainabilityManager => "sustainability_manager",
            ManagerRole::FinanceManager => "finance_manager",
        }
    }

    /// The approval type this role is accountable for
    pub const fn approval_type(self) -> ApprovalType {
        match self {
            ManagerRole::InventoryManager => ApprovalType::SpoilageAction,
            ManagerRole::LogisticsManager => ApprovalType::RouteOptimization,
            ManagerRole::SustainabilityManager => ApprovalType::CarbonVerification,
            ManagerRole::FinanceManager => ApprovalType::CostApproval,
        }
    }
}

impl fmt::Display for ManagerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ManagerRole {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ManagerRole::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownValue::new("role", s))
    }
}

impl ApprovalType {
    pub const fn as_str(self) -> &'static str {
        match self {
            ApprovalType::SpoilageAction => "spoilage_action",
            ApprovalType::RouteOptimization => "route_optimization",
            ApprovalType::CarbonVerification => "carbon_verification",
            ApprovalType::CostApproval => "cost_approval",
        }
    }
}

impl fmt::Display for ApprovalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApprovalType {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ROLE_APPROVAL_TYPES
            .into_iter()
            .map(|(_, approval_type)| approval_type)
            .find(|approval_type| approval_type.as_str() == s)
            .ok_or_else(|| UnknownValue::new("approval type", s))
    }
}

/// Role carried by an authenticated caller
///
/// Roles outside the manager set and `admin` are kept verbatim so they can be
/// reported, but they grant nothing in this service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserRole {
    Manager(ManagerRole),
    Admin,
    Other(String),
}

impl UserRole {
    pub fn as_str(&self) -> &str {
        match self {
            UserRole::Manager(role) => role.as_str(),
            UserRole::Admin => "admin",
            UserRole::Other(role) => role,
        }
    }

    pub fn manager_role(&self) -> Option<ManagerRole> {
        match self {
            UserRole::Manager(role) => Some(*role),
            _ => None,
        }
    }
}

impl From<&str> for UserRole {
    fn from(s: &str) -> Self {
        if s == "admin" {
            return UserRole::Admin;
        }
        match s.parse::<ManagerRole>() {
            Ok(role) => UserRole::Manager(role),
            Err(_) => UserRole::Other(s.to_string()),
        }
    }
}

impl From<ManagerRole> for UserRole {
    fn from(role: ManagerRole) -> Self {
        UserRole::Manager(role)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for UserRole {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(UserRole::from(raw.as_str()))
    }
}

/// A string that names none of the values of a closed set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownValue {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownValue {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
