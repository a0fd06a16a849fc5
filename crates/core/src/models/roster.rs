use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Usernames that never appear on the roster.
pub const EXCLUDED_USERNAMES: [&str; 4] = ["bristymarjia", "mdmahfuzrp", "charliecres", "snpsujon"];

/// A guild member as seen at poll-open time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub user_id: u64,
    pub username: String,
    /// Per-guild nickname, if one is set.
    pub nickname: Option<String>,
    pub bot: bool,
}

impl Member {
    /// Nickname when set, otherwise the account username.
    pub fn display_name(&self) -> &str {
        self.nickname.as_deref().unwrap_or(&self.username)
    }
}

/// Snapshot of the members expected to mark attendance during one cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    members: Vec<Member>,
}

impl Roster {
    /// Keep every member that is not a bot and whose username is not in
    /// `excluded`. Usernames are matched exactly, case included.
    pub fn resolve<I>(members: I, excluded: &[&str]) -> Self
    where
        I: IntoIterator<Item = Member>,
    {
        let excluded: HashSet<&str> = excluded.iter().copied().collect();
        let mut seen = HashSet::new();

        let members = members
            .into_iter()
            .filter(|member| !member.bot)
            .filter(|member| !excluded.contains(member.username.as_str()))
            .filter(|member| seen.insert(member.user_id))
            .collect();

        Self { members }
    }

    /// [`Roster::resolve`] against the built-in exclusion list.
    pub fn from_guild<I>(members: I) -> Self
    where
        I: IntoIterator<Item = Member>,
    {
        Self::resolve(members, &EXCLUDED_USERNAMES)
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn contains(&self, user_id: u64) -> bool {
        self.members.iter().any(|member| member.user_id == user_id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
