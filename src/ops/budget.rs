use indexmap::IndexMap;

use crate::model::container::{Container, ContainerKind, ContainerRef};
use crate::model::project::Project;

/// Sum of the container's item hours. Non-finite values count as 0.
pub fn sum_budget_hours(container: &Container) -> f64 {
    container
        .items
        .iter()
        .map(|i| i.budget_hours)
        .filter(|h| h.is_finite())
        .sum()
}

/// Overwrite the container's stored total with a fresh sum and return it.
pub fn recompute_budget_hours(container: &mut Container) -> f64 {
    let total = sum_budget_hours(container);
    container.budget_hours = total;
    total
}

/// Recompute every container of one list.
pub fn recompute_all(project: &mut Project, kind: ContainerKind) {
    for container in project.containers_mut(kind) {
        recompute_budget_hours(container);
    }
}

/// Recompute both container lists. Used after loading server data, whose
/// stored totals are not authoritative.
pub fn recompute_project(project: &mut Project) {
    recompute_all(project, ContainerKind::Phase);
    recompute_all(project, ContainerKind::Sprint);
}

/// Per-container totals of the active list, in display order.
pub fn budget_totals(project: &Project) -> IndexMap<ContainerRef, f64> {
    let kind = project.active_kind();
    project
        .containers(kind)
        .iter()
        .map(|c| (ContainerRef::new(kind, c.id), sum_budget_hours(c)))
        .collect()
}

/// Containers whose stored total disagrees with their items.
pub fn stale_containers(project: &Project, kind: ContainerKind) -> Vec<ContainerRef> {
    project
        .containers(kind)
        .iter()
        .filter(|c| (c.budget_hours - sum_budget_hours(c)).abs() > f64::EPSILON)
        .map(|c| ContainerRef::new(kind, c.id))
        .collect()
}
