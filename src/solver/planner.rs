use crate::types::SolverError;

use super::constraint_table::ConstraintTable;

/// Derives the permutation of cell positions the odometer uses as its
/// significance order, position 0 being incremented fastest.
///
/// Two passes, both probing predicates against the all-lower-bound
/// assignment. The first ranks constraints so the cheapest and most
/// selective run first. The second pushes every cell those constraints
/// read toward the most significant end of the order, so a failure
/// propagates into a high position and prunes the whole subtree of
/// unread cells below it.
pub fn make_increment_order(
    table: &mut ConstraintTable,
    num_cells: usize,
) -> Result<Vec<usize>, SolverError> {
    let mut touches = vec![false; num_cells];

    // Rank constraints by how little they read. Return values are
    // deliberately ignored; only the touch pattern matters here.
    for entry in table.entries_mut() {
        entry.clear_touches();
        entry.evaluate()?;
        touches.fill(false);
        entry.collect_touches(&mut touches);
        let touched = touches.iter().filter(|&&t| t).count();
        entry.estimated_quality = num_cells - touched;
    }
    table.sort_by_quality_desc();

    // Cells no constraint reads stay least significant. Each sort is
    // stable, so cells read only by later (heavier) constraints end up
    // in front of cells read by earlier (cheaper) ones.
    let mut order: Vec<usize> = (0..num_cells).collect();
    let mut cumulative = vec![false; num_cells];
    for entry in table.entries() {
        entry.clear_touches();
        entry.evaluate()?;
        touches.fill(false);
        entry.collect_touches(&mut touches);
        for (seen, &touch) in cumulative.iter_mut().zip(&touches) {
            *seen |= touch;
        }
        order.sort_by_key(|&cell| cumulative[cell]);
    }

    Ok(order)
}
