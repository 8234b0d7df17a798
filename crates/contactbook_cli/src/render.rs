//! Plain-text rendering of contact read models.

use contactbook_core::{Contact, ContactSummary, MergeReport};

pub fn summary_line(summary: &ContactSummary) -> String {
    format!(
        "[{}] {} | phones: {}",
        summary.id,
        summary.name,
        join_or_dash(&summary.phones)
    )
}

pub fn contact_block(contact: &Contact) -> String {
    let mut block = format!(
        "[{}] {}\n  phones:    {}\n  emails:    {}\n  addresses: {}",
        contact.id,
        contact.name,
        join_or_dash(&contact.phones),
        join_or_dash(&contact.emails),
        join_or_dash(&contact.addresses),
    );
    if !contact.notes.is_empty() {
        block.push_str("\n  notes:     ");
        block.push_str(&contact.notes.replace('\n', "\n             "));
    }
    block
}

pub fn merge_line(report: &MergeReport) -> String {
    format!(
        "Merged into contact {}: {} new value(s){}.",
        report.contact_id,
        report.added_count(),
        if report.notes_changed {
            ", notes updated"
        } else {
            ""
        }
    )
}

fn join_or_dash(values: &[String]) -> String {
    if values.is_empty() {
        "-".to_string()
    } else {
        values.join(", ")
    }
}
