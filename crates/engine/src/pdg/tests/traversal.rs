use crate::PathTraversal;

fn diamond() -> Vec<Vec<usize>> {
    vec![vec![1, 2], vec![3], vec![3], vec![]]
}

#[test]
fn yields_start_then_pops_last_pushed() {
    let adj = diamond();
    let order: Vec<_> = PathTraversal::new(&adj, 0).collect();
    assert_eq!(order, vec![0, 2, 3, 1, 3]);
}

#[test]
fn continue_next_path_skips_successors() {
    let adj = diamond();
    let mut walk = PathTraversal::new(&adj, 0);
    let mut order = Vec::new();
    while let Some(n) = walk.next() {
        order.push(n);
        if n == 2 {
            walk.continue_next_path();
        }
    }
    assert_eq!(order, vec![0, 2, 1, 3]);
}

#[test]
fn out_of_range_start_is_empty() {
    let adj = diamond();
    assert_eq!(PathTraversal::new(&adj, 9).count(), 0);
}
