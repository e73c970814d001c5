//! # Guest Lifecycle
//!
//! Waiver submission, group waivers and guest-group resolution at the
//! sales counter.
//!
//! ## Waiver Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Waiver Lifecycle                                 │
//! │                                                                         │
//! │  Walk-in guest fills waiver form                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  submit_waiver() ──► new Guest, waiver_signed_on = now                 │
//! │       │                                                                 │
//! │       │  (returning guest re-signs after expiry)                       │
//! │       ▼                                                                 │
//! │  submit_waiver() with existing id ──► same Guest, new timestamp        │
//! │                                                                         │
//! │  Family signs together                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  submit_group_waiver() ──► shared group_id stamped on every member     │
//! │                                                                         │
//! │  Guests are never hard-deleted; an expired waiver is just a status.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use uuid::Uuid;

use crate::error::{CoreResult, ValidationError};
use crate::types::Guest;
use crate::validation::{validate_guest_name, validate_phone, validate_search_query};

// =============================================================================
// Waiver Submission
// =============================================================================

/// The details captured by the waiver form.
#[derive(Debug, Clone)]
pub struct WaiverSubmission {
    /// Existing guest id when a returning guest re-signs; `None` creates a
    /// new guest.
    pub guest_id: Option<String>,

    /// Full name.
    pub name: String,

    /// Date of birth.
    pub dob: NaiveDate,

    /// Contact email.
    pub email: String,

    /// Contact phone.
    pub phone: String,

    /// Guardian counter-signature, required by the form for minors.
    pub guardian_name: Option<String>,
}

/// Records a signed waiver, creating the guest or refreshing an existing one.
///
/// ## Behavior
/// - `submission.guest_id` matching an existing guest: that guest's details
///   and waiver timestamp are updated in place.
/// - Otherwise a new guest is appended with a fresh id.
///
/// ## Returns
/// The id of the created or updated guest.
pub fn submit_waiver(
    guests: &mut Vec<Guest>,
    submission: WaiverSubmission,
    now: DateTime<Utc>,
) -> CoreResult<String> {
    validate_guest_name(&submission.name)?;
    validate_phone(&submission.phone)?;

    if let Some(existing) = submission
        .guest_id
        .as_deref()
        .and_then(|id| guests.iter_mut().find(|g| g.id == id))
    {
        existing.name = submission.name;
        existing.dob = submission.dob;
        existing.email = submission.email;
        existing.phone = submission.phone;
        existing.guardian_name = submission.guardian_name;
        existing.waiver_signed_on = Some(now);
        return Ok(existing.id.clone());
    }

    let guest = Guest {
        id: Uuid::new_v4().to_string(),
        name: submission.name,
        dob: submission.dob,
        email: submission.email,
        phone: submission.phone,
        waiver_signed_on: Some(now),
        guardian_name: submission.guardian_name,
        group_id: None,
        group_waiver_date: None,
    };
    let id = guest.id.clone();
    guests.push(guest);
    Ok(id)
}

/// Records a shared waiver for a group signing together.
///
/// Every member is created/updated as by [`submit_waiver`], then stamped
/// with one generated group code and the shared signing time.
///
/// ## Returns
/// The generated group code.
pub fn submit_group_waiver(
    guests: &mut Vec<Guest>,
    submissions: Vec<WaiverSubmission>,
    now: DateTime<Utc>,
) -> CoreResult<String> {
    if submissions.is_empty() {
        return Err(ValidationError::Required {
            field: "group members".to_string(),
        }
        .into());
    }

    let group_id = new_group_code();
    for submission in submissions {
        let id = submit_waiver(guests, submission, now)?;
        if let Some(guest) = guests.iter_mut().find(|g| g.id == id) {
            guest.group_id = Some(group_id.clone());
            guest.group_waiver_date = Some(now);
        }
    }
    Ok(group_id)
}

/// Generates a group code for a shared waiver session.
///
/// Short enough to read over the counter ("your group code is grp_3f9a21c4").
pub fn new_group_code() -> String {
    let uuid = Uuid::new_v4().simple().to_string();
    let short = uuid.get(..8).unwrap_or(uuid.as_str());
    format!("grp_{short}")
}

// =============================================================================
// Age
// =============================================================================

/// Completed years between `dob` and `on`.
pub fn age_on(dob: NaiveDate, on: NaiveDate) -> i32 {
    let mut age = on.year() - dob.year();
    if (on.month(), on.day()) < (dob.month(), dob.day()) {
        age -= 1;
    }
    age
}

// =============================================================================
// Guest Group Resolution
// =============================================================================

/// A resolved guest group: who is standing at the counter.
#[derive(Debug, Clone)]
pub struct GuestGroup {
    /// The phone number the group is keyed by at the register.
    pub primary_phone: String,

    /// All guests in the group, in registration order.
    pub members: Vec<Guest>,
}

/// Resolves a counter search into a guest group.
///
/// ## Resolution Order
/// 1. Exact phone match
/// 2. Group code match (case-insensitive)
/// 3. Case-insensitive name fragment
///
/// A phone or name hit pulls in everyone sharing the matched guest's phone;
/// a group-code hit pulls in everyone stamped with that code.
///
/// ## Returns
/// `Ok(None)` when nothing matches - "guest not found, please sign the
/// waiver" is a normal outcome at the counter, not an error.
pub fn resolve_guest_group(guests: &[Guest], query: &str) -> CoreResult<Option<GuestGroup>> {
    let query = validate_search_query(query)?;
    if query.is_empty() {
        return Ok(None);
    }
    let needle = query.to_lowercase();

    if let Some(found) = guests.iter().find(|g| g.phone == query) {
        return Ok(Some(group_by_phone(guests, &found.phone)));
    }

    if let Some(found) = guests
        .iter()
        .find(|g| g.group_id.as_deref().is_some_and(|gid| gid.eq_ignore_ascii_case(&needle)))
    {
        let code = found.group_id.clone().unwrap_or_default();
        let members: Vec<Guest> = guests
            .iter()
            .filter(|g| g.group_id.as_deref().is_some_and(|gid| gid.eq_ignore_ascii_case(&code)))
            .cloned()
            .collect();
        let primary_phone = members
            .first()
            .map(|g| g.phone.clone())
            .unwrap_or_default();
        return Ok(Some(GuestGroup {
            primary_phone,
            members,
        }));
    }

    if let Some(found) = guests
        .iter()
        .find(|g| g.name.to_lowercase().contains(&needle))
    {
        return Ok(Some(group_by_phone(guests, &found.phone)));
    }

    Ok(None)
}

fn group_by_phone(guests: &[Guest], phone: &str) -> GuestGroup {
    GuestGroup {
        primary_phone: phone.to_string(),
        members: guests.iter().filter(|g| g.phone == phone).cloned().collect(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(name: &str, phone: &str) -> WaiverSubmission {
        WaiverSubmission {
            guest_id: None,
            name: name.to_string(),
            dob: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            phone: phone.to_string(),
            guardian_name: None,
        }
    }

    #[test]
    fn test_submit_waiver_creates_guest() {
        let mut guests = Vec::new();
        let now = Utc::now();

        let id = submit_waiver(&mut guests, submission("Aarav Sharma", "9876543210"), now)
            .unwrap();

        assert_eq!(guests.len(), 1);
        assert_eq!(guests[0].id, id);
        assert_eq!(guests[0].waiver_signed_on, Some(now));
    }

    #[test]
    fn test_submit_waiver_resigns_existing_guest() {
        let mut guests = Vec::new();
        let first_signing = Utc::now() - chrono::Duration::days(400);
        let id = submit_waiver(
            &mut guests,
            submission("Karan Malhotra", "7777777777"),
            first_signing,
        )
        .unwrap();

        let now = Utc::now();
        let mut resign = submission("Karan Malhotra", "7777777777");
        resign.guest_id = Some(id.clone());
        let same_id = submit_waiver(&mut guests, resign, now).unwrap();

        assert_eq!(same_id, id);
        assert_eq!(guests.len(), 1, "re-signing must not duplicate the guest");
        assert_eq!(guests[0].waiver_signed_on, Some(now));
    }

    #[test]
    fn test_submit_waiver_rejects_blank_name() {
        let mut guests = Vec::new();
        let result = submit_waiver(&mut guests, submission("  ", "9876543210"), Utc::now());
        assert!(result.is_err());
        assert!(guests.is_empty());
    }

    #[test]
    fn test_group_waiver_stamps_shared_code() {
        let mut guests = Vec::new();
        let now = Utc::now();

        let code = submit_group_waiver(
            &mut guests,
            vec![
                submission("Anjali Verma", "8888888888"),
                submission("Ravi Verma", "8888888888"),
                submission("Sita Verma", "8888888888"),
            ],
            now,
        )
        .unwrap();

        assert!(code.starts_with("grp_"));
        assert_eq!(guests.len(), 3);
        for guest in &guests {
            assert_eq!(guest.group_id.as_deref(), Some(code.as_str()));
            assert_eq!(guest.group_waiver_date, Some(now));
        }
    }

    #[test]
    fn test_age_on() {
        let dob = NaiveDate::from_ymd_opt(2010, 6, 15).unwrap();
        assert_eq!(age_on(dob, NaiveDate::from_ymd_opt(2026, 6, 14).unwrap()), 15);
        assert_eq!(age_on(dob, NaiveDate::from_ymd_opt(2026, 6, 15).unwrap()), 16);
        assert_eq!(age_on(dob, NaiveDate::from_ymd_opt(2026, 8, 1).unwrap()), 16);
    }

    #[test]
    fn test_resolve_by_phone_pulls_whole_family() {
        let mut guests = Vec::new();
        let now = Utc::now();
        submit_waiver(&mut guests, submission("Anjali Verma", "8888888888"), now).unwrap();
        submit_waiver(&mut guests, submission("Ravi Verma", "8888888888"), now).unwrap();
        submit_waiver(&mut guests, submission("Rohan Mehta", "9876543212"), now).unwrap();

        let group = resolve_guest_group(&guests, "8888888888").unwrap().unwrap();
        assert_eq!(group.primary_phone, "8888888888");
        assert_eq!(group.members.len(), 2);
    }

    #[test]
    fn test_resolve_by_name_fragment() {
        let mut guests = Vec::new();
        let now = Utc::now();
        submit_waiver(&mut guests, submission("Saanvi Gupta", "1234567890"), now).unwrap();

        let group = resolve_guest_group(&guests, "saanvi").unwrap().unwrap();
        assert_eq!(group.primary_phone, "1234567890");
        assert_eq!(group.members.len(), 1);
    }

    #[test]
    fn test_resolve_by_group_code() {
        let mut guests = Vec::new();
        let now = Utc::now();
        let code = submit_group_waiver(
            &mut guests,
            vec![
                submission("Anjali Verma", "8888888888"),
                submission("Ravi Verma", "8888888888"),
            ],
            now,
        )
        .unwrap();

        let group = resolve_guest_group(&guests, &code.to_uppercase())
            .unwrap()
            .unwrap();
        assert_eq!(group.members.len(), 2);
    }

    #[test]
    fn test_resolve_unknown_is_none_not_error() {
        let guests = Vec::new();
        assert!(resolve_guest_group(&guests, "nobody").unwrap().is_none());
        assert!(resolve_guest_group(&guests, "   ").unwrap().is_none());
    }
}
