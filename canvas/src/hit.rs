#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::doc::DocStore;
use crate::geom::Point;

/// Identifiers of every registered, visible object containing `p`, in
/// registry order.
#[must_use]
pub fn hits_at(doc: &DocStore, p: Point) -> Vec<String> {
    doc.registered()
        .filter(|(_, obj)| obj.is_position_hit(p))
        .map(|(id, _)| id.to_owned())
        .collect()
}
