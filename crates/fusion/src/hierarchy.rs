//! Parent/child containment among fused elements.
//!
//! An element contains another when the child's center falls inside the
//! container's box and the child is sufficiently smaller. Single O(n^2)
//! pass; element counts per request are small (<50).

use crate::types::DetectedElement;

#[derive(Debug, Clone)]
pub struct HierarchyBuilder {
    /// A child's box area must be below this fraction of its container's
    pub max_child_area_ratio: f64,
}

impl Default for HierarchyBuilder {
    fn default() -> Self {
        Self {
            max_child_area_ratio: 0.9,
        }
    }
}

impl HierarchyBuilder {
    /// `container` holds `child` iff the child's center lies within the
    /// container's bounds and the child's area is sufficiently smaller.
    /// Zero-area boxes are never containers.
    pub fn contains(&self, container: &DetectedElement, child: &DetectedElement) -> bool {
        let container_area = container.bounding_box.area();
        if container_area <= 0.0 {
            return false;
        }
        container
            .bounding_box
            .contains_point(child.bounding_box.center())
            && child.bounding_box.area() < self.max_child_area_ratio * container_area
    }

    /// Fill in `children`, `parent_id`, `is_container`, and `is_child`
    /// for every element. The parent is the smallest-area containing
    /// element; ties keep the earlier one in input order.
    pub fn build(&self, elements: &mut [DetectedElement]) {
        let n = elements.len();
        let mut children: Vec<Vec<String>> = vec![Vec::new(); n];
        let mut parents: Vec<Option<String>> = vec![None; n];

        for i in 0..n {
            let mut best_parent: Option<usize> = None;
            for j in 0..n {
                if i == j {
                    continue;
                }
                if self.contains(&elements[j], &elements[i]) {
                    let better = match best_parent {
                        None => true,
                        Some(k) => {
                            elements[j].bounding_box.area() < elements[k].bounding_box.area()
                        }
                    };
                    if better {
                        best_parent = Some(j);
                    }
                }
                if self.contains(&elements[i], &elements[j]) {
                    children[i].push(elements[j].id.clone());
                }
            }
            parents[i] = best_parent.map(|j| elements[j].id.clone());
        }

        for (i, element) in elements.iter_mut().enumerate() {
            element.children = std::mem::take(&mut children[i]);
            element.parent_id = parents[i].take();
            element.is_container = !element.children.is_empty();
            element.is_child = element.parent_id.is_some();
        }
    }
}
