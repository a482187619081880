//! Formats the session's appointments for display.

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::collaborators::repository::AppointmentRow;
use crate::node::{Node, NodeContext, NodeError};
use crate::state::DialogueState;
use crate::types::NodeId;

pub struct ListAppointmentsNode;

#[async_trait]
impl Node for ListAppointmentsNode {
    async fn run(
        &self,
        mut state: DialogueState,
        _ctx: NodeContext,
    ) -> Result<DialogueState, NodeError> {
        let first_name = state
            .user_record
            .as_ref()
            .and_then(|r| r.full_name.split_whitespace().next())
            .map(str::to_string);

        let mut text = match first_name {
            Some(name) => format!("Dear {name}, your upcoming appointments are:\n\n"),
            None => "Your upcoming appointments are:\n\n".to_string(),
        };
        text.push_str(&format_appointments(&state.appointments));

        // Staged for ActionResponse, which appends the closing line and
        // writes the single history entry for this turn.
        state.pending_reply = Some(text);
        state.current_node = Some(NodeId::ListAppointments);
        Ok(state)
    }
}

fn format_appointments(appointments: &[AppointmentRow]) -> String {
    if appointments.is_empty() {
        return "You have no appointments scheduled.".to_string();
    }
    let mut text = String::new();
    for (idx, row) in appointments.iter().enumerate() {
        let (date, time) = humanize_start(&row.starts_at);
        let when = if time.is_empty() {
            date
        } else {
            format!("{date} at {time}")
        };
        text.push_str(&format!(
            "Appointment {n}. {reason} - {when}\n\
             \u{2022} Status: {status}\n\
             \u{2022} Provider: Dr. {provider} ({specialty})\n\
             \u{2022} Location: {clinic}\n\
             \u{2022} Address: {address}, {city}, {state} {postal}\n\n",
            n = idx + 1,
            reason = row.reason,
            status = row.status,
            provider = row.provider.full_name,
            specialty = row.provider.specialty,
            clinic = row.clinic.name,
            address = row.clinic.address_line1,
            city = row.clinic.city,
            state = row.clinic.state,
            postal = row.clinic.postal_code,
        ));
    }
    text.trim_end().to_string()
}

/// Best-effort humanization of a stored timestamp; unparseable values are
/// shown verbatim.
fn humanize_start(raw: &str) -> (String, String) {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return (
            dt.format("%B %d, %Y").to_string(),
            dt.format("%I:%M %p").to_string(),
        );
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return (
                dt.format("%B %d, %Y").to_string(),
                dt.format("%I:%M %p").to_string(),
            );
        }
    }
    (raw.to_string(), String::new())
}
