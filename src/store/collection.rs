use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::profile::{NameIndex, Profile, ProfileId};

/// Every stored profile plus the id counter, as persisted in one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileCollection {
    #[serde(default)]
    next_id: ProfileId,
    #[serde(default)]
    profiles: Vec<Profile>,
}

impl ProfileCollection {
    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn get(&self, id: ProfileId) -> AppResult<&Profile> {
        self.profiles
            .iter()
            .find(|profile| profile.id == id)
            .ok_or_else(|| AppError::NotFound(format!("profile #{id}")))
    }

    pub fn global(&self) -> Vec<&Profile> {
        self.profiles.iter().filter(|profile| profile.global).collect()
    }

    pub fn default_profile(&self) -> Option<&Profile> {
        self.profiles.iter().find(|profile| profile.default)
    }

    pub fn visible_to(&self, user: &str) -> Vec<&Profile> {
        self.profiles
            .iter()
            .filter(|profile| profile.is_visible_to(user))
            .collect()
    }

    /// Stores a new profile under a fresh id.
    pub fn insert(&mut self, mut profile: Profile) -> AppResult<Profile> {
        self.ensure_name_free(&profile, None)?;

        self.next_id = self
            .next_id
            .max(self.profiles.iter().map(|p| p.id).max().unwrap_or(0))
            + 1;
        profile.id = self.next_id;

        if profile.default {
            self.clear_default();
        }

        tracing::info!(
            id = profile.id,
            owner = %profile.owner,
            name = %profile.name,
            "profile stored"
        );
        self.profiles.push(profile.clone());
        Ok(profile)
    }

    /// Swaps the stored profile with the same id for `profile`.
    pub fn replace(&mut self, profile: Profile) -> AppResult<Profile> {
        let index = self.position(profile.id)?;
        self.ensure_name_free(&profile, Some(profile.id))?;

        if profile.default {
            self.clear_default();
        }

        tracing::info!(id = profile.id, name = %profile.name, "profile replaced");
        self.profiles[index] = profile.clone();
        Ok(profile)
    }

    pub fn remove(&mut self, id: ProfileId) -> AppResult<Profile> {
        let index = self.position(id)?;
        tracing::info!(id, "profile removed");
        Ok(self.profiles.remove(index))
    }

    /// Marks `id` as the default profile; the previous default loses the flag.
    pub fn make_default(&mut self, id: ProfileId) -> AppResult<Profile> {
        let index = self.position(id)?;
        self.clear_default();
        self.profiles[index].default = true;
        tracing::info!(id, "default profile changed");
        Ok(self.profiles[index].clone())
    }

    pub fn share(&mut self, id: ProfileId, users: &[String]) -> AppResult<Profile> {
        let index = self.position(id)?;
        let profile = &mut self.profiles[index];

        for user in users.iter().map(|user| user.trim()) {
            if user.is_empty() || user == profile.owner {
                continue;
            }
            profile.shared_with.insert(user.to_string());
        }

        Ok(profile.clone())
    }

    fn position(&self, id: ProfileId) -> AppResult<usize> {
        self.profiles
            .iter()
            .position(|profile| profile.id == id)
            .ok_or_else(|| AppError::NotFound(format!("profile #{id}")))
    }

    fn ensure_name_free(&self, profile: &Profile, except: Option<ProfileId>) -> AppResult<()> {
        if self.name_taken(&profile.owner, &profile.name, except) {
            return Err(AppError::Conflict(format!(
                "{} already has a profile named `{}`",
                profile.owner, profile.name
            )));
        }

        Ok(())
    }

    fn clear_default(&mut self) {
        for profile in &mut self.profiles {
            profile.default = false;
        }
    }
}

impl NameIndex for ProfileCollection {
    fn name_taken(&self, owner: &str, name: &str, except: Option<ProfileId>) -> bool {
        self.profiles.name_taken(owner, name, except)
    }
}
