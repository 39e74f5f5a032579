use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::teams::{SELLING_TEAM_NAME, SUPPORT_TEAM_NAME};

pub type UserId = i64;

/// Teams an identity may belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Selling,
    Support,
}

impl Team {
    pub const ALL: [Team; 2] = [Team::Selling, Team::Support];

    /// Name of the team row in persistence
    pub fn name(&self) -> &'static str {
        match self {
            Team::Selling => SELLING_TEAM_NAME,
            Team::Support => SUPPORT_TEAM_NAME,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Team::ALL.into_iter().find(|team| team.name() == name)
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Team {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "selling" | "selling team" => Ok(Team::Selling),
            "support" | "support team" => Ok(Team::Support),
            other => Err(format!("unknown team '{other}' (expected selling or support)")),
        }
    }
}

/// Identity represents the authenticated actor with its flags and team memberships
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: UserId,
    pub is_superuser: bool,
    pub is_staff: bool,
    pub teams: HashSet<Team>,
}

impl Identity {
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            is_superuser: false,
            is_staff: false,
            teams: HashSet::new(),
        }
    }

    pub fn staff(mut self) -> Self {
        self.is_staff = true;
        self
    }

    pub fn superuser(mut self) -> Self {
        self.is_superuser = true;
        self
    }

    pub fn with_teams(mut self, teams: impl IntoIterator<Item = Team>) -> Self {
        self.teams = teams.into_iter().collect();
        self
    }

    pub fn is_superuser(&self) -> bool {
        self.is_superuser
    }

    pub fn is_staff(&self) -> bool {
        self.is_staff
    }

    pub fn in_team(&self, team: Team) -> bool {
        self.teams.contains(&team)
    }

    /// Team memberships in a stable order, for responses and logs
    pub fn sorted_teams(&self) -> Vec<Team> {
        Team::ALL.into_iter().filter(|team| self.in_team(*team)).collect()
    }
}
