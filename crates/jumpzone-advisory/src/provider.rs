//! # Suggestion Provider
//!
//! The pluggable backend interface and the [`Advisor`] wrapper that makes
//! every request safe to call from the sales counter: bounded by a timeout,
//! falling back to a canned string on any failure.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::warn;

use crate::prompts;
use jumpzone_core::{CashDrawerSession, Money, Sale, Transaction};

// =============================================================================
// Errors
// =============================================================================

/// Failures a suggestion backend may report.
///
/// Callers of [`Advisor`] never see these; the advisor converts every one
/// of them into a fallback string.
#[derive(Debug, Error)]
pub enum AdvisoryError {
    /// The backend could not be reached or returned a transport error.
    #[error("suggestion backend unavailable: {0}")]
    Unavailable(String),

    /// No backend is configured.
    #[error("suggestion backend disabled")]
    Disabled,

    /// The backend replied with something unusable.
    #[error("malformed suggestion payload: {0}")]
    Malformed(String),
}

// =============================================================================
// Provider Trait
// =============================================================================

/// An opaque string-producing backend (an LLM API, in practice).
///
/// Implementations should do their own transport-level retries if they want
/// any; the [`Advisor`] adds exactly one timeout on top and nothing else.
#[allow(async_fn_in_trait)]
pub trait SuggestionProvider: Send + Sync {
    /// Produces advisory text for the given prompt.
    async fn generate(&self, prompt: &str) -> Result<String, AdvisoryError>;
}

/// Provider used when no LLM backend is configured.
///
/// Every request fails with [`AdvisoryError::Disabled`], which means every
/// advisor call resolves to its static fallback - the POS works fully
/// offline.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSuggestions;

impl SuggestionProvider for NoSuggestions {
    async fn generate(&self, _prompt: &str) -> Result<String, AdvisoryError> {
        Err(AdvisoryError::Disabled)
    }
}

// =============================================================================
// Fallback Texts
// =============================================================================

/// Shown when the waiver boilerplate cannot be generated.
pub const FALLBACK_WAIVER_TEXT: &str =
    "I acknowledge the risks of trampoline activities, including serious injury, \
     and agree to the park rules and terms.";

/// Shown when no safety tip arrives.
pub const FALLBACK_SAFETY_TIP: &str = "Remember to always jump safely and have fun!";

/// Shown when no transaction tip arrives.
pub const FALLBACK_TRANSACTION_TIP: &str = "Check if guests need socks for their jump time!";

/// Shown when no discrepancy narrative arrives.
pub const FALLBACK_DISCREPANCY_NOTE: &str =
    "Cash count recorded at close; see the cashier's stated reason for details.";

// =============================================================================
// Advisor
// =============================================================================

/// Default ceiling on a single suggestion request.
pub const DEFAULT_SUGGESTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Wraps a [`SuggestionProvider`] with the degradation contract: every call
/// returns a usable `String` within the timeout, no matter what the backend
/// does.
#[derive(Debug, Clone)]
pub struct Advisor<P> {
    provider: P,
    timeout: Duration,
}

impl<P: SuggestionProvider> Advisor<P> {
    /// Creates an advisor with the default timeout.
    pub fn new(provider: P) -> Self {
        Advisor {
            provider,
            timeout: DEFAULT_SUGGESTION_TIMEOUT,
        }
    }

    /// Overrides the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Runs one request against the provider, degrading to `fallback`.
    async fn fetch(&self, prompt: String, fallback: &str) -> String {
        match tokio::time::timeout(self.timeout, self.provider.generate(&prompt)).await {
            Ok(Ok(text)) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(Ok(_)) => {
                warn!("suggestion backend returned empty text; using fallback");
                fallback.to_string()
            }
            Ok(Err(err)) => {
                warn!(error = %err, "suggestion backend failed; using fallback");
                fallback.to_string()
            }
            Err(_) => {
                warn!(timeout_ms = self.timeout.as_millis() as u64, "suggestion backend timed out; using fallback");
                fallback.to_string()
            }
        }
    }

    /// Liability waiver boilerplate for the signing kiosk.
    pub async fn waiver_text(&self) -> String {
        self.fetch(prompts::waiver_text_prompt(), FALLBACK_WAIVER_TEXT)
            .await
    }

    /// A short safety tip for the kiosk's idle screen.
    pub async fn safety_tip(&self) -> String {
        self.fetch(prompts::safety_tip_prompt(), FALLBACK_SAFETY_TIP)
            .await
    }

    /// A cashier-facing tip about the active transaction.
    pub async fn transaction_tip(
        &self,
        tx: &Transaction,
        sales: &[Sale],
        now: DateTime<Utc>,
    ) -> String {
        self.fetch(
            prompts::transaction_tip_prompt(tx, sales, now),
            FALLBACK_TRANSACTION_TIP,
        )
        .await
    }

    /// A neutral narrative of a closed session's discrepancy, for history
    /// screens.
    pub async fn discrepancy_narrative(
        &self,
        session: &CashDrawerSession,
        discrepancy: Money,
    ) -> String {
        let counted = session
            .closing_balance_paise
            .map(Money::from_paise)
            .unwrap_or_default();
        let prompt = prompts::discrepancy_prompt(
            &session.opened_by,
            &Money::from_paise(session.opening_balance_paise).to_string(),
            &counted.to_string(),
            &discrepancy.to_string(),
            session.discrepancy_reason.as_deref(),
        );
        self.fetch(prompt, FALLBACK_DISCREPANCY_NOTE).await
    }

    /// Proposes a jumper assignment for the active transaction's unassigned
    /// tickets.
    ///
    /// The result feeds `Transaction::bulk_assign`, which is lenient about
    /// stale indices and unknown guest ids - so a confused reply is at
    /// worst a no-op, never a hazard. An unusable reply yields an empty map.
    pub async fn assignment_suggestion(
        &self,
        tx: &Transaction,
        now: DateTime<Utc>,
    ) -> BTreeMap<usize, String> {
        let ticket_indices: Vec<usize> = tx
            .cart
            .iter()
            .enumerate()
            .filter(|(_, e)| e.carries_assignment())
            .map(|(i, _)| i)
            .collect();
        if tx.guests.is_empty() || ticket_indices.is_empty() {
            return BTreeMap::new();
        }

        let prompt = prompts::assignment_prompt(&tx.guests, &ticket_indices, now);
        let reply = match tokio::time::timeout(self.timeout, self.provider.generate(&prompt)).await
        {
            Ok(Ok(text)) => text,
            Ok(Err(err)) => {
                warn!(error = %err, "assignment suggestion failed; no proposal");
                return BTreeMap::new();
            }
            Err(_) => {
                warn!("assignment suggestion timed out; no proposal");
                return BTreeMap::new();
            }
        };

        match parse_assignment_reply(&reply) {
            Some(map) => map,
            None => {
                warn!("assignment suggestion unparseable; no proposal");
                BTreeMap::new()
            }
        }
    }
}

/// Extracts an `entry index -> guest id` map from a provider reply.
///
/// Accepts bare JSON or JSON wrapped in prose/code fences; anything that is
/// not an object of string keys and values yields `None`. Non-numeric keys
/// are dropped individually.
fn parse_assignment_reply(reply: &str) -> Option<BTreeMap<usize, String>> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    if end < start {
        return None;
    }
    let body = reply.get(start..=end)?;

    let raw: BTreeMap<String, String> = serde_json::from_str(body).ok()?;
    Some(
        raw.into_iter()
            .filter_map(|(k, v)| k.trim().parse::<usize>().ok().map(|i| (i, v)))
            .collect(),
    )
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use jumpzone_core::guests::GuestGroup;
    use jumpzone_core::register::TransactionPool;
    use jumpzone_core::{CatalogItem, Guest, ItemKind};

    struct Canned(&'static str);

    impl SuggestionProvider for Canned {
        async fn generate(&self, _prompt: &str) -> Result<String, AdvisoryError> {
            Ok(self.0.to_string())
        }
    }

    struct Failing;

    impl SuggestionProvider for Failing {
        async fn generate(&self, _prompt: &str) -> Result<String, AdvisoryError> {
            Err(AdvisoryError::Unavailable("connection refused".to_string()))
        }
    }

    struct Hanging;

    impl SuggestionProvider for Hanging {
        async fn generate(&self, _prompt: &str) -> Result<String, AdvisoryError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("too late".to_string())
        }
    }

    fn guest(id: &str) -> Guest {
        Guest {
            id: id.to_string(),
            name: format!("Guest {id}"),
            dob: NaiveDate::from_ymd_opt(1995, 5, 20).unwrap(),
            email: format!("{id}@example.com"),
            phone: "9876543210".to_string(),
            waiver_signed_on: Some(Utc::now()),
            guardian_name: None,
            group_id: None,
            group_waiver_date: None,
        }
    }

    fn transaction_with_ticket() -> Transaction {
        let now = Utc::now();
        let mut pool = TransactionPool::new();
        pool.start_or_resume(GuestGroup {
            primary_phone: "9876543210".to_string(),
            members: vec![guest("g1"), guest("g2")],
        });
        let ticket = CatalogItem {
            id: "tkt_60".to_string(),
            name: "1 hour jump".to_string(),
            price_paise: 50_000,
            kind: ItemKind::Ticket,
            duration_minutes: Some(60),
        };
        pool.active_mut().unwrap().add_entry(&ticket, now).unwrap();
        pool.into_parts().0.remove(0)
    }

    #[tokio::test]
    async fn test_successful_suggestion_passes_through() {
        let advisor = Advisor::new(Canned("  Always land on two feet!  "));
        assert_eq!(advisor.safety_tip().await, "Always land on two feet!");
    }

    #[tokio::test]
    async fn test_failure_degrades_to_fallback() {
        let advisor = Advisor::new(Failing);
        assert_eq!(advisor.safety_tip().await, FALLBACK_SAFETY_TIP);
        assert_eq!(advisor.waiver_text().await, FALLBACK_WAIVER_TEXT);
    }

    #[tokio::test]
    async fn test_empty_reply_degrades_to_fallback() {
        let advisor = Advisor::new(Canned("   "));
        assert_eq!(advisor.safety_tip().await, FALLBACK_SAFETY_TIP);
    }

    #[tokio::test]
    async fn test_timeout_degrades_to_fallback() {
        let advisor = Advisor::new(Hanging).with_timeout(Duration::from_millis(20));
        let tx = transaction_with_ticket();
        let tip = advisor.transaction_tip(&tx, &[], Utc::now()).await;
        assert_eq!(tip, FALLBACK_TRANSACTION_TIP);
    }

    #[tokio::test]
    async fn test_no_suggestions_provider_is_all_fallbacks() {
        let advisor = Advisor::new(NoSuggestions);
        assert_eq!(advisor.safety_tip().await, FALLBACK_SAFETY_TIP);
    }

    #[tokio::test]
    async fn test_assignment_suggestion_parses_fenced_json() {
        let advisor = Advisor::new(Canned(
            "Here you go:\n```json\n{\"0\": \"g2\"}\n```\nHave a nice day.",
        ));
        let tx = transaction_with_ticket();

        let map = advisor.assignment_suggestion(&tx, Utc::now()).await;
        assert_eq!(map.get(&0).map(String::as_str), Some("g2"));
    }

    #[tokio::test]
    async fn test_assignment_suggestion_garbage_yields_empty_map() {
        let advisor = Advisor::new(Canned("sorry, I cannot help with that"));
        let tx = transaction_with_ticket();
        assert!(advisor.assignment_suggestion(&tx, Utc::now()).await.is_empty());
    }

    #[tokio::test]
    async fn test_assignment_suggestion_skips_without_tickets() {
        let advisor = Advisor::new(Canned("{\"0\": \"g1\"}"));
        let tx = Transaction::new("9876543210", vec![guest("g1")]);
        assert!(advisor.assignment_suggestion(&tx, Utc::now()).await.is_empty());
    }

    #[test]
    fn test_parse_assignment_reply() {
        assert_eq!(
            parse_assignment_reply("{\"0\": \"a\", \"2\": \"b\"}"),
            Some(BTreeMap::from([(0, "a".to_string()), (2, "b".to_string())]))
        );
        // Non-numeric keys are dropped individually.
        assert_eq!(
            parse_assignment_reply("{\"x\": \"a\", \"1\": \"b\"}"),
            Some(BTreeMap::from([(1, "b".to_string())]))
        );
        assert_eq!(parse_assignment_reply("no json here"), None);
        assert_eq!(parse_assignment_reply("{not json}"), None);
    }
}
