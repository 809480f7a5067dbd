//! Department hierarchy: forest reconstruction and top-level ancestor lookup.
//!
//! Departments arrive as one flat table with optional parent references.
//! Rows are held in an arena and linked by index, never by reference.
//! Nothing here fails on malformed input: dangling parents, stale names,
//! and cycles degrade to absent results.

use std::collections::HashMap;

use serde::Serialize;

use crate::model::{Department, DepartmentId};

/// A department with its descendants attached, for hierarchy display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentNode {
    pub id: DepartmentId,
    pub name: String,
    pub parent_id: Option<DepartmentId>,
    pub depth: i32,
    pub active: bool,
    pub children: Vec<DepartmentNode>,
}

impl DepartmentNode {
    fn leaf(department: &Department) -> Self {
        Self {
            id: department.id,
            name: department.name.clone(),
            parent_id: department.parent_id,
            depth: department.depth,
            active: department.active,
            children: Vec::new(),
        }
    }
}

/// Departments keyed by id and by name.
///
/// When two rows share an id or a name, the first one wins.
#[derive(Debug, Clone, Default)]
pub struct DepartmentIndex {
    rows: Vec<Department>,
    by_id: HashMap<DepartmentId, usize>,
    by_name: HashMap<String, usize>,
}

impl DepartmentIndex {
    #[must_use]
    pub fn new(rows: Vec<Department>) -> Self {
        let mut by_id = HashMap::with_capacity(rows.len());
        let mut by_name = HashMap::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            by_id.entry(row.id).or_insert(i);
            by_name.entry(row.name.clone()).or_insert(i);
        }
        Self {
            rows,
            by_id,
            by_name,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: DepartmentId) -> Option<&Department> {
        self.by_id.get(&id).map(|&i| &self.rows[i])
    }

    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&Department> {
        self.by_name.get(name).map(|&i| &self.rows[i])
    }

    /// Active departments in table order.
    #[must_use]
    pub fn active(&self) -> impl Iterator<Item = &Department> {
        self.rows.iter().filter(|d| d.active)
    }

    /// Name of the depth-0 department above `name`, or `name` itself at depth 0.
    ///
    /// Returns `None` for an unknown name, a chain that ends without reaching
    /// depth 0, a dangling parent, or a cycle. The walk is capped at one hop
    /// per row, which no well-formed chain exceeds.
    #[must_use]
    pub fn top_level_ancestor_of(&self, name: &str) -> Option<&str> {
        let mut current = self.by_name(name)?;
        for _ in 0..self.rows.len() {
            if current.depth == 0 {
                return Some(current.name.as_str());
            }
            let Some(parent_id) = current.parent_id else {
                log::debug!("department '{name}' has no top-level ancestor");
                return None;
            };
            let Some(parent) = self.get(parent_id) else {
                log::debug!("department '{}' points at missing parent {parent_id}", current.name);
                return None;
            };
            current = parent;
        }
        log::warn!("department chain from '{name}' does not terminate; treating as absent");
        None
    }
}

/// The department hierarchy as a forest of roots.
///
/// Built in two passes over the flat table: index every row by id,
/// then link each row under its parent or, with no parent, as a root.
/// Rows whose parent does not exist are left out of the forest.
#[derive(Debug, Clone, Default)]
pub struct DepartmentForest {
    index: DepartmentIndex,
    children: Vec<Vec<usize>>,
    roots: Vec<usize>,
}

impl DepartmentForest {
    #[must_use]
    pub fn build(rows: Vec<Department>) -> Self {
        let index = DepartmentIndex::new(rows);
        let mut children = vec![Vec::new(); index.rows.len()];
        let mut roots = Vec::new();

        for (i, row) in index.rows.iter().enumerate() {
            // Duplicate ids: only the indexed row takes part.
            if index.by_id.get(&row.id) != Some(&i) {
                continue;
            }
            match row.parent_id {
                None => roots.push(i),
                Some(parent_id) => match index.by_id.get(&parent_id) {
                    Some(&parent) => children[parent].push(i),
                    None => log::warn!(
                        "department {} ('{}') has missing parent {parent_id}; omitted from tree",
                        row.id,
                        row.name
                    ),
                },
            }
        }

        Self {
            index,
            children,
            roots,
        }
    }

    /// The lookup view over the same rows.
    #[must_use]
    pub fn index(&self) -> &DepartmentIndex {
        &self.index
    }

    /// Consumes the forest, keeping only the lookup view.
    #[must_use]
    pub fn into_index(self) -> DepartmentIndex {
        self.index
    }

    /// Every root with its descendants, in table order.
    #[must_use]
    pub fn roots(&self) -> Vec<DepartmentNode> {
        let mut visited = vec![false; self.index.rows.len()];
        self.roots
            .iter()
            .map(|&i| self.materialize(i, &mut visited))
            .collect()
    }

    /// One department with its descendants.
    #[must_use]
    pub fn subtree(&self, id: DepartmentId) -> Option<DepartmentNode> {
        let &i = self.index.by_id.get(&id)?;
        let mut visited = vec![false; self.index.rows.len()];
        Some(self.materialize(i, &mut visited))
    }

    fn materialize(&self, i: usize, visited: &mut [bool]) -> DepartmentNode {
        visited[i] = true;
        let mut node = DepartmentNode::leaf(&self.index.rows[i]);
        for &child in &self.children[i] {
            // A cycle can only be entered through `subtree`; stop at the repeat.
            if visited[child] {
                continue;
            }
            node.children.push(self.materialize(child, visited));
        }
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dept(id: DepartmentId, name: &str, parent_id: Option<DepartmentId>, depth: i32) -> Department {
        Department {
            id,
            name: name.into(),
            parent_id,
            depth,
            active: true,
        }
    }

    fn sample_rows() -> Vec<Department> {
        vec![
            dept(1, "Sales", None, 0),
            dept(2, "Sales/East", Some(1), 1),
            dept(3, "Sales/East/Retail", Some(2), 2),
            dept(4, "Engineering", None, 0),
            dept(5, "Platform", Some(4), 1),
        ]
    }

    #[test]
    fn builds_forest_with_children() {
        let forest = DepartmentForest::build(sample_rows());
        let roots = forest.roots();

        assert_eq!(roots.len(), 2);
        assert_eq!(roots[0].name, "Sales");
        assert_eq!(roots[0].children.len(), 1);
        assert_eq!(roots[0].children[0].name, "Sales/East");
        assert_eq!(roots[0].children[0].children[0].name, "Sales/East/Retail");
        assert_eq!(roots[1].name, "Engineering");
        assert_eq!(roots[1].children[0].name, "Platform");
    }

    #[test]
    fn empty_table_builds_empty_forest() {
        let forest = DepartmentForest::build(Vec::new());
        assert!(forest.roots().is_empty());
        assert!(forest.index().is_empty());
    }

    #[test]
    fn orphan_is_left_out_of_forest() {
        let mut rows = sample_rows();
        rows.push(dept(9, "Ghost", Some(99), 1));
        let forest = DepartmentForest::build(rows);

        let names: Vec<_> = forest.roots().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Sales", "Engineering"]);
    }

    #[test]
    fn subtree_returns_descendants() {
        let forest = DepartmentForest::build(sample_rows());
        let east = forest.subtree(2).unwrap();

        assert_eq!(east.name, "Sales/East");
        assert_eq!(east.children.len(), 1);
        assert!(forest.subtree(42).is_none());
    }

    #[test]
    fn subtree_terminates_on_cycle() {
        let rows = vec![dept(1, "A", Some(2), 1), dept(2, "B", Some(1), 1)];
        let forest = DepartmentForest::build(rows);

        assert!(forest.roots().is_empty());
        let a = forest.subtree(1).unwrap();
        assert_eq!(a.children.len(), 1);
        assert!(a.children[0].children.is_empty());
    }

    #[test]
    fn every_department_resolves_to_its_top_level() {
        let index = DepartmentIndex::new(sample_rows());

        assert_eq!(index.top_level_ancestor_of("Sales"), Some("Sales"));
        assert_eq!(index.top_level_ancestor_of("Sales/East"), Some("Sales"));
        assert_eq!(index.top_level_ancestor_of("Sales/East/Retail"), Some("Sales"));
        assert_eq!(index.top_level_ancestor_of("Platform"), Some("Engineering"));
    }

    #[test]
    fn unknown_name_has_no_ancestor() {
        let index = DepartmentIndex::new(sample_rows());
        assert_eq!(index.top_level_ancestor_of("Disbanded"), None);
    }

    #[test]
    fn broken_chain_has_no_ancestor() {
        let rows = vec![
            dept(1, "Floating", None, 2),
            dept(2, "Dangling", Some(77), 1),
        ];
        let index = DepartmentIndex::new(rows);

        assert_eq!(index.top_level_ancestor_of("Floating"), None);
        assert_eq!(index.top_level_ancestor_of("Dangling"), None);
    }

    #[test]
    fn cycle_has_no_ancestor() {
        let rows = vec![
            dept(1, "A", Some(2), 1),
            dept(2, "B", Some(3), 1),
            dept(3, "C", Some(1), 1),
        ];
        let index = DepartmentIndex::new(rows);

        assert_eq!(index.top_level_ancestor_of("A"), None);
    }

    #[test]
    fn duplicate_names_keep_first_row() {
        let rows = vec![
            dept(1, "Sales", None, 0),
            dept(2, "Support", None, 0),
            dept(3, "Desk", Some(1), 1),
            dept(4, "Desk", Some(2), 1),
        ];
        let index = DepartmentIndex::new(rows);

        assert_eq!(index.by_name("Desk").map(|d| d.id), Some(3));
        assert_eq!(index.top_level_ancestor_of("Desk"), Some("Sales"));
    }

    #[test]
    fn active_filters_inactive_rows() {
        let mut rows = sample_rows();
        rows[4].active = false;
        let index = DepartmentIndex::new(rows);

        let names: Vec<_> = index.active().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Sales", "Sales/East", "Sales/East/Retail", "Engineering"]);
    }
}
