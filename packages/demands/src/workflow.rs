// ABOUTME: Demand validation workflow
// ABOUTME: Explicit (role, decision) transition table and predecessor tracking

use std::fmt;
use std::str::FromStr;

use procura_users::AppRole;

use crate::types::DemandStatus;

/// A validation verdict, supplied by the caller as the status suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Approved => "APPROVED",
            Decision::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Decision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "APPROVED" => Ok(Decision::Approved),
            "REJECTED" => Ok(Decision::Rejected),
            other => Err(format!("unknown decision: {other}")),
        }
    }
}

/// Target state for a validation by the given role. None means the pair has
/// no state in the machine (e.g. a MANAGER decision on a demand).
pub fn decide(role: AppRole, decision: Decision) -> Option<DemandStatus> {
    match (role, decision) {
        (AppRole::Responsible, Decision::Approved) => Some(DemandStatus::ResponsibleApproved),
        (AppRole::Responsible, Decision::Rejected) => Some(DemandStatus::ResponsibleRejected),
        (AppRole::Technician, Decision::Approved) => Some(DemandStatus::TechnicianApproved),
        (AppRole::Technician, Decision::Rejected) => Some(DemandStatus::TechnicianRejected),
        _ => None,
    }
}

/// The state a demand is expected to be in before moving to `target`.
/// Validation does not enforce this precondition (out-of-order validations
/// are accepted and logged), so this map only feeds the warning path.
pub fn expected_predecessor(target: DemandStatus) -> Option<DemandStatus> {
    match target {
        DemandStatus::ResponsibleApproved | DemandStatus::ResponsibleRejected => {
            Some(DemandStatus::Created)
        }
        DemandStatus::TechnicianApproved | DemandStatus::TechnicianRejected => {
            Some(DemandStatus::ResponsibleApproved)
        }
        DemandStatus::InProgress => Some(DemandStatus::TechnicianApproved),
        DemandStatus::Done => Some(DemandStatus::InProgress),
        DemandStatus::Created => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_parse() {
        assert_eq!("approved".parse::<Decision>().unwrap(), Decision::Approved);
        assert_eq!("REJECTED".parse::<Decision>().unwrap(), Decision::Rejected);
        assert!("MAYBE".parse::<Decision>().is_err());
    }

    #[test]
    fn test_transition_table_covers_validating_roles() {
        assert_eq!(
            decide(AppRole::Responsible, Decision::Approved),
            Some(DemandStatus::ResponsibleApproved)
        );
        assert_eq!(
            decide(AppRole::Responsible, Decision::Rejected),
            Some(DemandStatus::ResponsibleRejected)
        );
        assert_eq!(
            decide(AppRole::Technician, Decision::Approved),
            Some(DemandStatus::TechnicianApproved)
        );
        assert_eq!(
            decide(AppRole::Technician, Decision::Rejected),
            Some(DemandStatus::TechnicianRejected)
        );
    }

    #[test]
    fn test_transition_table_rejects_other_roles() {
        for role in [
            AppRole::Admin,
            AppRole::Agent,
            AppRole::Provider,
            AppRole::Manager,
        ] {
            assert_eq!(decide(role, Decision::Approved), None);
            assert_eq!(decide(role, Decision::Rejected), None);
        }
    }

    #[test]
    fn test_expected_predecessors() {
        assert_eq!(
            expected_predecessor(DemandStatus::TechnicianApproved),
            Some(DemandStatus::ResponsibleApproved)
        );
        assert_eq!(expected_predecessor(DemandStatus::Created), None);
    }
}
