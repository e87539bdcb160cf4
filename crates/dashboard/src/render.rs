use mun_core::schema::{Committee, CommitteeSummary, Event, EventKind};
use mun_core::stats::{Analytics, SortDirection, SortField, SortOrder};

const MOTIONS_NOTE: &str =
    "Motions are not included in individual delegate statistics as they represent procedural actions.";

pub fn render_committee_index(committees: &[CommitteeSummary]) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.push("# Committees".to_string());
    lines.push(String::new());

    if committees.is_empty() {
        lines.push("_No committees yet._".to_string());
        return lines.join("\n");
    }

    lines.push("| Committee | Portfolios | Password | Created |".to_string());
    lines.push("|---|---:|---|---|".to_string());
    for c in committees {
        lines.push(format!(
            "| {} | {} | {} | {} |",
            escape_cell(&c.name),
            c.portfolio_count,
            if c.has_password { "yes" } else { "no" },
            c.created_at
        ));
    }

    lines.join("\n")
}

/// Header, roster and event log for one committee.
pub fn render_dashboard(committee: &Committee, events: &[Event]) -> String {
    let mut md = String::new();
    md.push_str(&format!("# {}\n\n", committee.name));

    if committee.portfolios.is_empty() {
        md.push_str("Upload portfolios to begin tracking\n\n");
    } else {
        md.push_str(&format!(
            "Tracking {} portfolios\n\n",
            committee.portfolios.len()
        ));
        md.push_str("## Portfolios\n\n");
        for portfolio in &committee.portfolios {
            md.push_str(&format!("- {portfolio}\n"));
        }
        md.push('\n');
    }

    md.push_str("## Event History\n\n");
    if events.is_empty() {
        md.push_str("_No events recorded yet._\n");
        return md;
    }

    for event in events {
        md.push_str(&format!(
            "- `{}` **{}** {}\n",
            event.timestamp,
            event.kind.label(),
            event_line(event)
        ));
        if let Some(duration) = &event.duration {
            md.push_str(&format!("  - Duration: {duration}\n"));
        }
        if let Some(description) = &event.description {
            md.push_str(&format!("  - {description}\n"));
        }
    }

    md
}

/// One-line summary of an event, without the timestamp and kind badge.
pub fn event_line(event: &Event) -> String {
    match event.kind {
        EventKind::Speech => format!("{} spoke", event.portfolio),
        EventKind::PointOfOrder | EventKind::PointOfInformation => format!(
            "{} → {}",
            event.portfolio,
            event.target_portfolio.as_deref().unwrap_or("")
        ),
        EventKind::Motion => {
            let motion = event
                .motion_type
                .as_deref()
                .map(|t| t.replace('_', " "))
                .unwrap_or_default();
            let status = event.motion_status.unwrap_or_default();
            format!("{} - {} ({})", event.portfolio, motion, status)
        }
    }
}

pub fn render_analytics(analytics: &Analytics, roster_len: usize, order: SortOrder) -> String {
    let totals = analytics.totals;
    let mut lines: Vec<String> = Vec::new();

    lines.push("## Delegate Participation Analytics".to_string());
    lines.push(String::new());
    lines.push(format!("- Total Speeches: {}", totals.speeches));
    lines.push(format!("- Points of Order: {}", totals.points_of_order));
    lines.push(format!(
        "- Points of Information: {}",
        totals.points_of_information
    ));
    lines.push(format!(
        "- Active Delegates: {} of {} total",
        analytics.active_delegates, roster_len
    ));
    lines.push(String::new());

    let header: Vec<String> = SortField::ALL
        .iter()
        .map(|field| format!("{} {}", column_title(*field), sort_marker(*field, order)))
        .collect();
    lines.push(format!("| {} |", header.join(" | ")));
    lines.push("|---|---:|---:|---:|---:|".to_string());

    if analytics.delegates.is_empty() {
        lines.push("| No delegate data available | | | | |".to_string());
        return lines.join("\n");
    }

    for d in &analytics.delegates {
        lines.push(format!(
            "| {} | {} | {} | {} | **{}** |",
            escape_cell(&d.portfolio),
            d.speeches,
            d.points_of_order,
            d.points_of_information,
            d.total_participation
        ));
    }

    lines.push(String::new());
    lines.push(format!(
        "**Note:** Delegates are sorted by {} ({}). {MOTIONS_NOTE}",
        column_title(order.field).to_lowercase(),
        match order.direction {
            SortDirection::Asc => "ascending",
            SortDirection::Desc => "descending",
        }
    ));

    lines.join("\n")
}

fn column_title(field: SortField) -> &'static str {
    match field {
        SortField::Portfolio => "Portfolio",
        SortField::Speeches => "Speeches",
        SortField::PointsOfOrder => "Points of Order",
        SortField::PointsOfInformation => "Points of Information",
        SortField::TotalParticipation => "Total Participation",
    }
}

fn sort_marker(field: SortField, order: SortOrder) -> &'static str {
    if field != order.field {
        return "↕";
    }
    match order.direction {
        SortDirection::Asc => "↑",
        SortDirection::Desc => "↓",
    }
}

fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use mun_core::schema::MotionStatus;
    use mun_core::stats::analyze;

    fn event(kind: EventKind, portfolio: &str) -> Event {
        Event {
            id: format!("{kind}-{portfolio}"),
            committee_id: "c1".to_string(),
            kind,
            portfolio: portfolio.to_string(),
            target_portfolio: None,
            duration: None,
            description: None,
            motion_type: None,
            motion_status: None,
            timestamp: "2024-03-01T10:00:00.000Z".to_string(),
        }
    }

    fn committee(portfolios: &[&str]) -> Committee {
        Committee {
            id: "c1".to_string(),
            name: "Security Council".to_string(),
            portfolios: portfolios.iter().map(|p| p.to_string()).collect(),
            created_at: "2024-03-01T09:00:00.000Z".to_string(),
            portfolio_count: portfolios.len(),
            has_password: true,
        }
    }

    #[test]
    fn event_lines_per_kind() {
        let mut poi = event(EventKind::PointOfInformation, "France");
        poi.target_portfolio = Some("USA".to_string());
        assert_eq!(event_line(&poi), "France → USA");

        let mut motion = event(EventKind::Motion, "USA");
        motion.motion_type = Some("unmoderated_caucus_extension".to_string());
        motion.motion_status = Some(MotionStatus::Passed);
        assert_eq!(
            event_line(&motion),
            "USA - unmoderated caucus extension (passed)"
        );

        assert_eq!(event_line(&event(EventKind::Speech, "Chad")), "Chad spoke");
    }

    #[test]
    fn dashboard_header_depends_on_roster() {
        let empty = render_dashboard(&committee(&[]), &[]);
        assert!(empty.contains("Upload portfolios to begin tracking"));
        assert!(empty.contains("_No events recorded yet._"));

        let mut speech = event(EventKind::Speech, "USA");
        speech.duration = Some("2 minutes".to_string());
        let md = render_dashboard(&committee(&["France", "USA"]), &[speech]);
        assert!(md.contains("Tracking 2 portfolios"));
        assert!(md.contains("- France\n- USA\n"));
        assert!(md.contains("**Speech** USA spoke"));
        assert!(md.contains("  - Duration: 2 minutes"));
    }

    #[test]
    fn analytics_table_marks_the_sorted_column() {
        let roster = vec!["USA".to_string(), "France".to_string()];
        let events = vec![
            event(EventKind::Speech, "USA"),
            event(EventKind::PointOfOrder, "France"),
            event(EventKind::Speech, "USA"),
        ];
        let order = SortOrder::new(SortField::Speeches, SortDirection::Asc);
        let md = render_analytics(&analyze(&events, &roster, order), roster.len(), order);

        assert!(md.contains("- Total Speeches: 2"));
        assert!(md.contains("- Active Delegates: 2 of 2 total"));
        assert!(md.contains("| Portfolio ↕ | Speeches ↑ |"));

        let france = md.find("| France |").unwrap();
        let usa = md.find("| USA |").unwrap();
        assert!(france < usa);
        assert!(md.contains("| USA | 2 | 0 | 0 | **2** |"));
        assert!(md.contains(MOTIONS_NOTE));
    }

    #[test]
    fn empty_roster_shows_placeholder_row() {
        let order = SortOrder::default();
        let md = render_analytics(&analyze(&[], &[], order), 0, order);
        assert!(md.contains("No delegate data available"));
        assert!(!md.contains("**Note:**"));
        assert!(md.contains("Total Participation ↓"));
    }

    #[test]
    fn committee_index_escapes_names() {
        let summaries = vec![CommitteeSummary {
            id: "c1".to_string(),
            name: "A|B".to_string(),
            created_at: "2024-03-01T09:00:00.000Z".to_string(),
            portfolio_count: 3,
            has_password: false,
        }];
        let md = render_committee_index(&summaries);
        assert!(md.contains("| A\\|B | 3 | no |"));
        assert!(render_committee_index(&[]).contains("_No committees yet._"));
    }
}
