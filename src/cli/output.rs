use serde::Serialize;
use serde_json::{Value, json};

use crate::model::container::{Container, ContainerKind, ContainerRef};
use crate::model::item::LeafItem;
use crate::model::project::{Methodology, Project};
use crate::ops::reorder::DragChange;
use crate::sync::persistence::SyncOutcome;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct ItemJson {
    pub id: u64,
    pub name: String,
    pub budget_hours: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

#[derive(Serialize)]
pub struct ContainerJson {
    pub kind: ContainerKind,
    pub id: u64,
    pub name: String,
    pub budget_hours: f64,
    pub items: Vec<ItemJson>,
}

#[derive(Serialize)]
pub struct BoardJson {
    pub project: u64,
    pub name: String,
    pub methodology: Methodology,
    pub containers: Vec<ContainerJson>,
}

#[derive(Serialize)]
pub struct BudgetEntryJson {
    pub container: ContainerRef,
    pub name: String,
    pub budget_hours: f64,
}

#[derive(Serialize)]
pub struct BudgetJson {
    pub containers: Vec<BudgetEntryJson>,
    pub total: f64,
}

pub fn item_to_json(item: &LeafItem) -> ItemJson {
    ItemJson {
        id: item.id,
        name: item.name.clone(),
        budget_hours: item.budget_hours,
        start_date: item.start_date.map(|d| d.to_string()),
        end_date: item.end_date.map(|d| d.to_string()),
    }
}

pub fn container_to_json(kind: ContainerKind, container: &Container) -> ContainerJson {
    ContainerJson {
        kind,
        id: container.id,
        name: container.name.clone(),
        budget_hours: container.budget_hours,
        items: container.items.iter().map(item_to_json).collect(),
    }
}

pub fn board_to_json(project: &Project, kinds: &[ContainerKind]) -> BoardJson {
    BoardJson {
        project: project.id,
        name: project.name.clone(),
        methodology: project.methodology,
        containers: kinds
            .iter()
            .flat_map(|&kind| {
                project
                    .containers(kind)
                    .iter()
                    .map(move |c| container_to_json(kind, c))
            })
            .collect(),
    }
}

pub fn change_to_json(change: &DragChange) -> Value {
    match change {
        DragChange::Unchanged => json!({ "type": "unchanged" }),
        DragChange::ContainerMoved {
            container,
            from,
            to,
        } => json!({
            "type": "container_moved",
            "container": container,
            "from": from,
            "to": to,
        }),
        DragChange::ContainerRemoved { container, index } => json!({
            "type": "container_removed",
            "container": container,
            "index": index,
        }),
        DragChange::ItemReordered {
            container,
            item_id,
            from,
            to,
        } => json!({
            "type": "item_reordered",
            "container": container,
            "item": item_id,
            "from": from,
            "to": to,
        }),
        DragChange::ItemMoved(change) => json!({
            "type": "item_moved",
            "item": change.item.id,
            "from": change.from,
            "to": change.to,
            "index": change.index,
        }),
    }
}

pub fn sync_to_json(outcome: Option<&SyncOutcome>) -> Value {
    match outcome {
        None => json!({ "status": "skipped" }),
        Some(SyncOutcome::Synced) => json!({ "status": "synced" }),
        Some(SyncOutcome::Failed(error)) => json!({ "status": "failed", "error": error }),
    }
}

// ---------------------------------------------------------------------------
// Text output
// ---------------------------------------------------------------------------

/// `8h`, `2.5h`; rounded to two places so float sums read cleanly.
pub fn format_hours(hours: f64) -> String {
    let fixed = format!("{:.2}", hours);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" => "0h".to_string(),
        _ => format!("{}h", trimmed),
    }
}

fn format_dates(start: Option<chrono::NaiveDate>, end: Option<chrono::NaiveDate>) -> String {
    match (start, end) {
        (None, None) => String::new(),
        (s, e) => format!(
            "  {}..{}",
            s.map(|d| d.to_string()).unwrap_or_default(),
            e.map(|d| d.to_string()).unwrap_or_default()
        ),
    }
}

fn methodology_label(methodology: Methodology) -> &'static str {
    match methodology {
        Methodology::Waterfall => "waterfall",
        Methodology::Agile => "agile",
    }
}

pub fn format_item_line(index: usize, item: &LeafItem) -> String {
    format!(
        "  {}. [{}] {}  {}{}",
        index,
        item.id,
        item.name,
        format_hours(item.budget_hours),
        format_dates(item.start_date, item.end_date)
    )
}

pub fn format_container(index: usize, kind: ContainerKind, container: &Container) -> Vec<String> {
    let mut lines = vec![format!(
        "{}. {}  ({} {})  {}{}",
        index,
        container.name,
        kind,
        container.id,
        format_hours(container.budget_hours),
        format_dates(container.start_date, container.end_date)
    )];
    if container.items.is_empty() {
        lines.push(format!("  (no {})", kind.items_endpoint()));
    }
    for (i, item) in container.items.iter().enumerate() {
        lines.push(format_item_line(i, item));
    }
    lines
}

pub fn format_board(project: &Project, kinds: &[ContainerKind]) -> Vec<String> {
    let mut lines = vec![format!(
        "{}  ({}, project {})",
        project.name,
        methodology_label(project.methodology),
        project.id
    )];
    for &kind in kinds {
        let containers = project.containers(kind);
        lines.push(String::new());
        if containers.is_empty() {
            lines.push(format!("(no {})", kind.endpoint()));
        }
        for (i, container) in containers.iter().enumerate() {
            lines.extend(format_container(i, kind, container));
        }
    }
    lines
}

pub fn format_change(kind: ContainerKind, change: &DragChange) -> String {
    match change {
        DragChange::Unchanged => "nothing moved".to_string(),
        DragChange::ContainerMoved {
            container,
            from,
            to,
        } => format!("moved {} from position {} to {}", container, from, to),
        DragChange::ContainerRemoved { container, index } => {
            format!("removed {} (was at position {})", container, index)
        }
        DragChange::ItemReordered {
            container,
            item_id,
            from,
            to,
        } => format!(
            "moved {} {} in {} from position {} to {}",
            kind.item_label(),
            item_id,
            container,
            from,
            to
        ),
        DragChange::ItemMoved(change) => format!(
            "moved {} {} from {} to {} at position {}",
            kind.item_label(),
            change.item.id,
            change.from,
            change.to,
            change.index
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::container::Container;
    use crate::model::item::LeafItem;
    use crate::ops::reorder::ParentChange;

    #[test]
    fn hours_drop_trailing_zero() {
        assert_eq!(format_hours(8.0), "8h");
        assert_eq!(format_hours(2.5), "2.5h");
        assert_eq!(format_hours(0.0), "0h");
        assert_eq!(format_hours(10.0), "10h");
    }

    #[test]
    fn hours_round_float_sums() {
        assert_eq!(format_hours(0.1 + 0.2), "0.3h");
        assert_eq!(format_hours(1.0 / 3.0), "0.33h");
        assert_eq!(format_hours(-0.001), "0h");
    }

    #[test]
    fn empty_container_says_so() {
        let lines = format_container(0, ContainerKind::Sprint, &Container::new(4, "Sprint 1"));
        assert_eq!(lines[0], "0. Sprint 1  (sprint 4)  0h");
        assert_eq!(lines[1], "  (no stories)");
    }

    #[test]
    fn item_moved_text_and_json() {
        let change = DragChange::ItemMoved(ParentChange {
            item: LeafItem::new(2, "API", 3.0),
            from: ContainerRef::Phase(10),
            to: ContainerRef::Phase(20),
            index: 0,
        });
        assert_eq!(
            format_change(ContainerKind::Phase, &change),
            "moved task 2 from phase 10 to phase 20 at position 0"
        );
        let value = change_to_json(&change);
        assert_eq!(value["type"], "item_moved");
        assert_eq!(value["item"], 2);
    }
}
