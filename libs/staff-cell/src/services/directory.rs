use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{RegisterStaffRequest, StaffError, StaffMember, StaffSearchQuery};

/// In-process staff registry. The scheduling cell consults it to validate
/// generation targets and to resolve specialty filters to staff ids.
pub struct StaffDirectory {
    members: RwLock<HashMap<Uuid, StaffMember>>,
}

impl StaffDirectory {
    pub fn new() -> Self {
        Self {
            members: RwLock::new(HashMap::new()),
        }
    }

    pub async fn register(&self, request: RegisterStaffRequest) -> Result<StaffMember, StaffError> {
        if request.full_name.trim().is_empty() {
            return Err(StaffError::ValidationError("Name must not be empty".to_string()));
        }
        if request.specialty.trim().is_empty() {
            return Err(StaffError::ValidationError("Specialty must not be empty".to_string()));
        }
        if request.site.trim().is_empty() {
            return Err(StaffError::ValidationError("Site must not be empty".to_string()));
        }

        let member = StaffMember {
            id: Uuid::new_v4(),
            full_name: request.full_name.trim().to_string(),
            specialty: request.specialty.trim().to_string(),
            site: request.site.trim().to_string(),
            active: true,
            created_at: Utc::now(),
        };

        let mut members = self.members.write().await;
        members.insert(member.id, member.clone());

        info!("Registered staff member {} ({})", member.id, member.specialty);
        Ok(member)
    }

    pub async fn get(&self, staff_id: Uuid) -> Result<StaffMember, StaffError> {
        let members = self.members.read().await;
        members.get(&staff_id).cloned().ok_or(StaffError::NotFound)
    }

    /// Active members matching the query, ordered by name for stable output.
    pub async fn search(&self, query: &StaffSearchQuery) -> Vec<StaffMember> {
        let members = self.members.read().await;

        let mut found: Vec<StaffMember> = members
            .values()
            .filter(|m| m.active)
            .filter(|m| {
                query
                    .specialty
                    .as_deref()
                    .map_or(true, |s| m.specialty.eq_ignore_ascii_case(s))
            })
            .filter(|m| {
                query
                    .site
                    .as_deref()
                    .map_or(true, |s| m.site.eq_ignore_ascii_case(s))
            })
            .cloned()
            .collect();

        found.sort_by(|a, b| a.full_name.cmp(&b.full_name).then(a.id.cmp(&b.id)));
        found
    }

    pub async fn deactivate(&self, staff_id: Uuid) -> Result<StaffMember, StaffError> {
        let mut members = self.members.write().await;
        let member = members.get_mut(&staff_id).ok_or(StaffError::NotFound)?;
        member.active = false;

        debug!("Deactivated staff member {}", staff_id);
        Ok(member.clone())
    }

    /// Resolve a specialty to the ids of active members holding it.
    pub async fn resolve_specialty(&self, specialty: &str) -> Vec<Uuid> {
        let members = self.members.read().await;
        members
            .values()
            .filter(|m| m.active && m.specialty.eq_ignore_ascii_case(specialty))
            .map(|m| m.id)
            .collect()
    }

}

impl Default for StaffDirectory {
    fn default() -> Self {
        Self::new()
    }
}
