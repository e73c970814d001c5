//! # Prompt Construction
//!
//! Pure string builders for every advisory request. Kept separate from the
//! provider plumbing so they can be unit-tested without any async machinery.

use chrono::{DateTime, Utc};

use jumpzone_core::guests::age_on;
use jumpzone_core::register::last_visit;
use jumpzone_core::{Guest, Sale, Transaction};

/// The park the texts are written for.
pub const PARK_NAME: &str = "Jump India Fun Zone";

/// Prompt for generating the liability waiver boilerplate.
pub fn waiver_text_prompt() -> String {
    format!(
        "Generate a comprehensive liability waiver for a trampoline park named \
         '{PARK_NAME}' located in Mumbai, India. The waiver should be legally sound \
         under Indian law, covering risks of injury, including serious injury or \
         death, from activities like jumping on trampolines, foam pits, dodgeball, \
         and climbing walls. It must include clauses for assumption of risk, release \
         of liability, indemnification, and a declaration of physical fitness. The \
         participant must acknowledge they have read and understood the rules. Also \
         include a section for a parent or legal guardian to sign for participants \
         under 18 years of age. The tone should be serious and legally protective, \
         but clear and understandable for a layperson. Structure it with clear \
         headings and paragraphs."
    )
}

/// Prompt for a short safety tip shown on the waiver kiosk.
pub fn safety_tip_prompt() -> String {
    "Provide a short, friendly, and important safety tip for a trampoline park \
     visitor. Make it easy to remember and under 15 words. For example: 'Always \
     land on two feet!' or 'One person per trampoline!'"
        .to_string()
}

/// Prompt for a cashier-facing tip about the current transaction.
pub fn transaction_tip_prompt(tx: &Transaction, sales: &[Sale], now: DateTime<Utc>) -> String {
    let today = now.date_naive();
    let guest_details: String = tx
        .guests
        .iter()
        .map(|g| {
            format!(
                "- {} (Age: {}, Waiver: {:?})",
                g.name,
                age_on(g.dob, today),
                g.waiver_status(now)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let cart_details = if tx.cart.is_empty() {
        "Cart is empty.".to_string()
    } else {
        tx.cart
            .iter()
            .map(|e| format!("- {}", e.name))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let previous = sales
        .iter()
        .filter(|s| tx.guests.iter().any(|g| g.id == s.customer_id))
        .count();
    let last = match last_visit(sales, &tx.guests) {
        Some(date) => format!("Last visit was on: {}.", date.format("%d/%m/%Y")),
        None => "This is their first visit.".to_string(),
    };

    format!(
        "You are an intelligent assistant for a trampoline park cashier. Your goal \
         is to provide a brief, helpful suggestion or observation to improve the \
         customer's experience or remind the cashier of something important. Keep \
         the suggestion under 25 words.\n\n\
         Here is the current transaction information:\n\
         - Customer Group Phone: {}\n\
         - Guests in Group:\n{}\n\
         - Items in Cart:\n{}\n\
         - Customer History:\n\
         This group has made {} previous transactions. {}\n\n\
         Based on this, what is a helpful tip for the cashier?\n\
         Example suggestions:\n\
         - \"The kids have jump passes but no socks in the cart. Remind the parent they are required.\"\n\
         - \"This is their 5th visit! Thank them for being a loyal customer.\"\n\
         - \"One guest's waiver is expired. They will need to re-sign before jumping.\"",
        tx.phone, guest_details, cart_details, previous, last
    )
}

/// Prompt for a one-paragraph narrative of a drawer discrepancy, for the
/// history screen's notes column.
pub fn discrepancy_prompt(
    opened_by: &str,
    opening_balance: &str,
    counted: &str,
    discrepancy: &str,
    reason: Option<&str>,
) -> String {
    format!(
        "Write a single short paragraph summarising a cash register discrepancy \
         for a manager reviewing shift history at {PARK_NAME}. Shift opened by staff \
         code {opened_by} with a float of {opening_balance}. Counted cash at close: \
         {counted}. Discrepancy: {discrepancy}. Cashier's stated reason: {}. Be \
         factual and neutral; do not speculate about misconduct.",
        reason.unwrap_or("none given")
    )
}

/// Prompt asking for a jumper-assignment proposal.
///
/// The reply must be a JSON object mapping cart entry index to guest id;
/// the provider wrapper parses it leniently and an unusable reply simply
/// yields no proposal.
pub fn assignment_prompt(guests: &[Guest], ticket_indices: &[usize], now: DateTime<Utc>) -> String {
    let today = now.date_naive();
    let guest_list: String = guests
        .iter()
        .map(|g| {
            format!(
                "- Guest ID: {}, Name: {}, Age: {}",
                g.id,
                g.name,
                age_on(g.dob, today)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    let ticket_list = ticket_indices
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Assign each jump ticket to a different guest so that families are kept \
         together and adults are matched before children.\n\
         Guests:\n{guest_list}\n\
         Ticket entry indices: {ticket_list}\n\
         Reply with ONLY a JSON object mapping ticket entry index to guest id, \
         for example {{\"0\": \"cust_1\", \"1\": \"cust_2\"}}. Assign each guest \
         at most once."
    )
}

// =============================================================================
// Unit Tests
// =============================================================================
